//! The rewriter: rule dispatch and the rewrite-to-fixpoint loop.
//!
//! `rewrite_until_done` repeatedly matches the outermost construct of
//! the pending expression against the rule table and invokes the rule,
//! until the expression is a bare cell reference. Rules recursively call
//! back into the rewriter for their sub-expressions; termination is
//! structural, since rules only ever introduce cell references.
//!
//! The rewriter owns the session-scoped solver handle (by reference),
//! the lazy equality cache, the membership-flag table, the literal cell
//! cache, and the string intern table. It asserts constraints but never
//! checks satisfiability.

use std::collections::HashMap;

use tern_ir::{CellId, Expr};
use tern_types::Type;
use tracing::trace;
use z3::ast::{Array, Bool, Dynamic, Int};
use z3::Solver;

use crate::arena::Arena;
use crate::sorts::{self, ScalarSort};
use crate::state::SymbState;
use crate::{rules, EncodeError, EncodeResult};

/// Key for the literal cell cache.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub(crate) enum LiteralKey {
    Bool(bool),
    Int(i64),
    Str(String),
}

/// How a cell is represented on the solver side.
enum CellRepr {
    /// A single constant of a scalar sort.
    Scalar(ScalarSort),
    /// A constant array from argument sort to result sort.
    Fun(ScalarSort, ScalarSort),
    /// Structure only: child cells and membership flags, no term.
    Structural,
}

/// The rewriting session.
pub struct Rewriter<'a> {
    solver: &'a Solver,
    /// Asserted equality terms, keyed by ordered cell pair.
    pub(crate) eq_cache: HashMap<(CellId, CellId), Bool>,
    /// Membership flags, keyed by (element, set).
    in_flags: HashMap<(CellId, CellId), Bool>,
    /// Cells already allocated for literal values.
    pub(crate) literals: HashMap<LiteralKey, CellId>,
    /// String literal interning: position is the integer id.
    strings: Vec<String>,
    /// Solver terms of solver-visible cells.
    cell_terms: HashMap<CellId, Dynamic>,
    /// One "not bound here" marker per result sort, shared by every
    /// function cell in the session.
    unbound_markers: HashMap<ScalarSort, Dynamic>,
    assertions: usize,
}

impl<'a> Rewriter<'a> {
    /// Create a rewriter for one encoding session over the given solver.
    pub fn new(solver: &'a Solver) -> Self {
        Self {
            solver,
            eq_cache: HashMap::new(),
            in_flags: HashMap::new(),
            literals: HashMap::new(),
            strings: Vec::new(),
            cell_terms: HashMap::new(),
            unbound_markers: HashMap::new(),
            assertions: 0,
        }
    }

    /// Rewrite the state's expression until it is a bare cell reference.
    pub fn rewrite_until_done(&mut self, mut state: SymbState) -> EncodeResult<SymbState> {
        loop {
            if state.done() {
                return Ok(state);
            }
            trace!(construct = state.expr.kind.describe(), "rewriting");
            let rule = rules::lookup(&state.expr).ok_or_else(|| {
                EncodeError::Unsupported(format!(
                    "{} of type {}",
                    state.expr.kind.describe(),
                    state.expr.ty
                ))
            })?;
            state = rule(self, state)?;
        }
    }

    /// Rewrite a sub-expression in place of the state's expression and
    /// return the resulting cell alongside the advanced state.
    pub(crate) fn rewrite_sub(
        &mut self,
        state: SymbState,
        sub: Expr,
    ) -> EncodeResult<(SymbState, CellId)> {
        let state = self.rewrite_until_done(state.with_expr(sub))?;
        let cell = state.expr_cell()?;
        Ok((state, cell))
    }

    /// Allocate a cell and declare its solver term, if its type has one.
    pub(crate) fn alloc_cell(
        &mut self,
        arena: Arena,
        ty: Type,
    ) -> EncodeResult<(Arena, CellId)> {
        let repr = classify(&ty)?;
        let (arena, cell) = arena.alloc(ty);
        match repr {
            CellRepr::Scalar(sort) => {
                let term = sorts::fresh_const(sort, cell.to_string());
                self.cell_terms.insert(cell, term);
            }
            CellRepr::Fun(arg, res) => {
                let arr = Array::new_const(
                    cell.to_string(),
                    &sorts::z3_sort(arg),
                    &sorts::z3_sort(res),
                );
                self.cell_terms.insert(cell, Dynamic::from_ast(&arr));
            }
            CellRepr::Structural => {}
        }
        trace!(cell = %cell, "allocated");
        Ok((arena, cell))
    }

    /// The solver term of a solver-visible cell.
    pub fn cell_term(&self, cell: CellId) -> EncodeResult<Dynamic> {
        self.cell_terms.get(&cell).cloned().ok_or_else(|| {
            EncodeError::Contract(format!("cell {} has no solver term", cell))
        })
    }

    pub(crate) fn bool_term(&self, cell: CellId) -> EncodeResult<Bool> {
        self.cell_term(cell)?.as_bool().ok_or_else(|| {
            EncodeError::Contract(format!("cell {} is not of Bool sort", cell))
        })
    }

    pub(crate) fn int_term(&self, cell: CellId) -> EncodeResult<Int> {
        self.cell_term(cell)?.as_int().ok_or_else(|| {
            EncodeError::Contract(format!("cell {} is not of Int sort", cell))
        })
    }

    pub(crate) fn array_term(&self, cell: CellId) -> EncodeResult<Array> {
        self.cell_term(cell)?.as_array().ok_or_else(|| {
            EncodeError::Contract(format!("cell {} is not of array sort", cell))
        })
    }

    /// The session's unbound-value marker for a result sort, declared on
    /// first use. Function cells share it as their constant-array
    /// default, so extensionally equal functions have identical array
    /// terms.
    pub(crate) fn unbound_marker(&mut self, sort: ScalarSort) -> Dynamic {
        self.unbound_markers
            .entry(sort)
            .or_insert_with(|| {
                let name = match sort {
                    ScalarSort::Bool => "unbound_bool",
                    ScalarSort::Int => "unbound_int",
                };
                sorts::fresh_const(sort, name.to_string())
            })
            .clone()
    }

    /// The membership flag for `elem` in `set`, declared on first use.
    pub(crate) fn in_flag(&mut self, elem: CellId, set: CellId) -> Bool {
        self.in_flags
            .entry((elem, set))
            .or_insert_with(|| {
                Bool::new_const(format!("in_{}_{}", elem.index(), set.index()))
            })
            .clone()
    }

    /// Derive "elem belongs to set" as an OR over the set's elements:
    /// element equality (through the lazy cache) AND element presence.
    /// Works for symbolic membership because both conjuncts are terms.
    pub(crate) fn member_term(
        &mut self,
        state: SymbState,
        elem: CellId,
        set: CellId,
    ) -> EncodeResult<(SymbState, Bool)> {
        let elems = state.arena.has(set);
        let pairs: Vec<(CellId, CellId)> = elems.iter().map(|&y| (elem, y)).collect();
        let state = self.cache_eq_constraints(state, &pairs)?;
        let mut disjuncts = Vec::with_capacity(elems.len());
        for y in elems {
            let eq = self.eq_term(elem, y)?;
            let present = self.in_flag(y, set);
            disjuncts.push(Bool::and(&[eq, present]));
        }
        Ok((state, sorts::or_any(&disjuncts)))
    }

    /// Assert a constraint into the session solver.
    pub(crate) fn assert(&mut self, term: &Bool) {
        self.solver.assert(term);
        self.assertions += 1;
    }

    /// Number of assertions made so far in this session.
    pub fn assertion_count(&self) -> usize {
        self.assertions
    }

    /// Intern a string literal, returning its integer id.
    pub(crate) fn intern_str(&mut self, s: &str) -> i64 {
        if let Some(pos) = self.strings.iter().position(|t| t == s) {
            pos as i64
        } else {
            self.strings.push(s.to_string());
            (self.strings.len() - 1) as i64
        }
    }

    /// The string intern table (id = position), for decoding.
    pub fn string_table(&self) -> &[String] {
        &self.strings
    }
}

fn classify(ty: &Type) -> EncodeResult<CellRepr> {
    if let Some(sort) = sorts::scalar_sort(ty) {
        return Ok(CellRepr::Scalar(sort));
    }
    match ty {
        Type::Fun(arg, res) => {
            let arg_sort = sorts::scalar_sort(arg).ok_or_else(|| {
                EncodeError::Unsupported(format!(
                    "function over non-scalar argument type {}",
                    arg
                ))
            })?;
            let res_sort = sorts::scalar_sort(res).ok_or_else(|| {
                EncodeError::Unsupported(format!(
                    "function with non-scalar result type {}",
                    res
                ))
            })?;
            Ok(CellRepr::Fun(arg_sort, res_sort))
        }
        Type::Oper(_, _) => Err(EncodeError::Unsupported(
            "operator-typed cell (operators are inlined before encoding)".into(),
        )),
        Type::Var(v) => Err(EncodeError::Unsupported(format!(
            "cell with unresolved type variable {}",
            v
        ))),
        _ => Ok(CellRepr::Structural),
    }
}
