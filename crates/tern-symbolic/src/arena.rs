//! Cell arena: the append-only graph of typed symbolic values.
//!
//! Cells carry an immutable type and three kinds of structural edges:
//! `has` edges (set/sequence members, relation pairs), and `dom`/`cdm`
//! edges (a function's domain set and codomain relation). The arena has
//! no solver dependency; solver terms for cells live in the rewriter.
//!
//! Every operation consumes the arena and returns a new value layered
//! over the previous one. The store is append-only, so cloning an arena
//! gives a snapshot that stays valid as the lineage grows.

use tern_ir::CellId;
use tern_types::Type;

use crate::{EncodeError, EncodeResult};

/// One `has` edge. Edges flagged `smt: false` are recorded for
/// bookkeeping (counterexample reconstruction) only; the rewriter never
/// creates membership flags for them.
#[derive(Debug, Clone)]
struct HasEdge {
    child: CellId,
    smt: bool,
}

/// Per-cell data: type and outgoing edges.
#[derive(Debug, Clone)]
struct CellData {
    ty: Type,
    has: Vec<HasEdge>,
    dom: Option<CellId>,
    cdm: Option<CellId>,
}

/// The append-only cell store.
#[derive(Debug, Clone, Default)]
pub struct Arena {
    cells: Vec<CellData>,
}

impl Arena {
    /// Create an empty arena.
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate a fresh cell of the given type. The returned id is
    /// strictly greater than every id previously allocated in this
    /// lineage.
    pub fn alloc(mut self, ty: Type) -> (Self, CellId) {
        let id = CellId::from_index(self.cells.len());
        self.cells.push(CellData {
            ty,
            has: Vec::new(),
            dom: None,
            cdm: None,
        });
        (self, id)
    }

    /// Append `has` edges from `cell` to `children`.
    pub fn append_has(self, cell: CellId, children: &[CellId]) -> EncodeResult<Self> {
        self.append(cell, children, true)
    }

    /// Append `has` edges without solver-visible membership: used for
    /// structure that exists only for decoding, like relation pairs.
    pub fn append_has_no_smt(self, cell: CellId, children: &[CellId]) -> EncodeResult<Self> {
        self.append(cell, children, false)
    }

    fn append(mut self, cell: CellId, children: &[CellId], smt: bool) -> EncodeResult<Self> {
        let data = &self.cells[cell.index()];
        if !matches!(
            data.ty,
            Type::Set(_) | Type::Seq(_) | Type::Tuple(_) | Type::Record(_) | Type::Variant(_)
        ) {
            return Err(EncodeError::Contract(format!(
                "has edges appended to {} of non-collection type {}",
                cell, data.ty
            )));
        }
        self.cells[cell.index()]
            .has
            .extend(children.iter().map(|&child| HasEdge { child, smt }));
        Ok(self)
    }

    /// Set the domain edge of a function cell. Exactly one per cell.
    pub fn set_dom(mut self, cell: CellId, dom: CellId) -> EncodeResult<Self> {
        let data = &mut self.cells[cell.index()];
        if !matches!(data.ty, Type::Fun(_, _)) {
            return Err(EncodeError::Contract(format!(
                "dom edge set on {} of non-function type {}",
                cell, data.ty
            )));
        }
        if data.dom.is_some() {
            return Err(EncodeError::Contract(format!("dom edge of {} set twice", cell)));
        }
        data.dom = Some(dom);
        Ok(self)
    }

    /// Set the codomain edge of a function cell. Exactly one per cell.
    pub fn set_cdm(mut self, cell: CellId, cdm: CellId) -> EncodeResult<Self> {
        let data = &mut self.cells[cell.index()];
        if !matches!(data.ty, Type::Fun(_, _)) {
            return Err(EncodeError::Contract(format!(
                "cdm edge set on {} of non-function type {}",
                cell, data.ty
            )));
        }
        if data.cdm.is_some() {
            return Err(EncodeError::Contract(format!("cdm edge of {} set twice", cell)));
        }
        data.cdm = Some(cdm);
        Ok(self)
    }

    /// The `has` children of a cell, in insertion order.
    pub fn has(&self, cell: CellId) -> Vec<CellId> {
        self.cells[cell.index()]
            .has
            .iter()
            .map(|e| e.child)
            .collect()
    }

    /// The domain cell of a function cell.
    pub fn dom(&self, cell: CellId) -> EncodeResult<CellId> {
        let data = &self.cells[cell.index()];
        if !matches!(data.ty, Type::Fun(_, _)) {
            return Err(EncodeError::Contract(format!(
                "dom edge read off {} of non-function type {}",
                cell, data.ty
            )));
        }
        data.dom.ok_or_else(|| {
            EncodeError::Contract(format!("dom edge of function cell {} never set", cell))
        })
    }

    /// The codomain relation cell of a function cell.
    pub fn cdm(&self, cell: CellId) -> EncodeResult<CellId> {
        let data = &self.cells[cell.index()];
        if !matches!(data.ty, Type::Fun(_, _)) {
            return Err(EncodeError::Contract(format!(
                "cdm edge read off {} of non-function type {}",
                cell, data.ty
            )));
        }
        data.cdm.ok_or_else(|| {
            EncodeError::Contract(format!("cdm edge of function cell {} never set", cell))
        })
    }

    /// The immutable type of a cell.
    pub fn cell_type(&self, cell: CellId) -> &Type {
        &self.cells[cell.index()].ty
    }

    /// Number of cells allocated in this lineage.
    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alloc_is_monotonic() {
        let arena = Arena::new();
        let (arena, a) = arena.alloc(Type::Int);
        let (arena, b) = arena.alloc(Type::Bool);
        assert!(b > a);
        assert_eq!(arena.cell_count(), 2);
        assert_eq!(arena.cell_type(a), &Type::Int);
    }

    #[test]
    fn test_has_edges_in_order() {
        let arena = Arena::new();
        let (arena, x) = arena.alloc(Type::Int);
        let (arena, y) = arena.alloc(Type::Int);
        let (arena, s) = arena.alloc(Type::Set(Box::new(Type::Int)));
        let arena = arena.append_has(s, &[x, y]).unwrap();
        assert_eq!(arena.has(s), vec![x, y]);
    }

    #[test]
    fn test_set_dom_on_non_function_is_contract_violation() {
        let arena = Arena::new();
        let (arena, b) = arena.alloc(Type::Bool);
        let (arena, d) = arena.alloc(Type::Set(Box::new(Type::Int)));
        let err = arena.set_dom(b, d).unwrap_err();
        assert!(matches!(err, EncodeError::Contract(_)));
    }

    #[test]
    fn test_dom_read_before_set_is_contract_violation() {
        let arena = Arena::new();
        let (arena, f) = arena.alloc(Type::Fun(Box::new(Type::Int), Box::new(Type::Int)));
        assert!(matches!(arena.dom(f), Err(EncodeError::Contract(_))));
    }

    #[test]
    fn test_snapshot_stays_valid() {
        let arena = Arena::new();
        let (arena, a) = arena.alloc(Type::Int);
        let snapshot = arena.clone();
        let (grown, _) = arena.alloc(Type::Bool);
        assert_eq!(snapshot.cell_count(), 1);
        assert_eq!(grown.cell_count(), 2);
        assert_eq!(snapshot.cell_type(a), &Type::Int);
    }

    #[test]
    fn test_append_has_to_scalar_is_contract_violation() {
        let arena = Arena::new();
        let (arena, a) = arena.alloc(Type::Int);
        let (arena, b) = arena.alloc(Type::Int);
        assert!(matches!(
            arena.append_has(a, &[b]),
            Err(EncodeError::Contract(_))
        ));
    }
}
