//! Tuple and sequence rules.
//!
//! Both are structural cells whose `has` children are the components in
//! order; a sequence literal is a tuple whose components share a type.

use tern_ir::ExprKind;

use crate::rewriter::Rewriter;
use crate::rules;
use crate::state::SymbState;
use crate::{EncodeError, EncodeResult};

pub(crate) fn tuple_rule(rw: &mut Rewriter<'_>, state: SymbState) -> EncodeResult<SymbState> {
    let ty = state.expr.ty.clone();
    let ExprKind::Tuple(elems) = state.expr.kind.clone() else {
        return Err(EncodeError::Contract(
            "tuple rule invoked on non-tuple".into(),
        ));
    };
    build(rw, state, ty, elems)
}

pub(crate) fn seq_rule(rw: &mut Rewriter<'_>, state: SymbState) -> EncodeResult<SymbState> {
    let ty = state.expr.ty.clone();
    let ExprKind::SeqEnum(elems) = state.expr.kind.clone() else {
        return Err(EncodeError::Contract(
            "sequence rule invoked on non-sequence".into(),
        ));
    };
    build(rw, state, ty, elems)
}

fn build(
    rw: &mut Rewriter<'_>,
    mut state: SymbState,
    ty: tern_types::Type,
    elems: Vec<tern_ir::Expr>,
) -> EncodeResult<SymbState> {
    let mut cells = Vec::with_capacity(elems.len());
    for elem in elems {
        let (next, cell) = rw.rewrite_sub(state, elem)?;
        state = next;
        cells.push(cell);
    }
    let tup = rules::alloc(rw, &mut state, ty)?;
    rules::wire_has_no_smt(&mut state, tup, &cells)?;
    Ok(state.with_cell(tup))
}

pub(crate) fn proj_rule(rw: &mut Rewriter<'_>, state: SymbState) -> EncodeResult<SymbState> {
    let ExprKind::Proj { base, index } = state.expr.kind.clone() else {
        return Err(EncodeError::Contract(
            "projection rule invoked on non-projection".into(),
        ));
    };
    let (state, b) = rw.rewrite_sub(state, *base)?;
    let children = state.arena.has(b);
    let cell = children.get(index).copied().ok_or_else(|| {
        EncodeError::Contract(format!(
            "projection index {} out of bounds for {} with {} components",
            index,
            b,
            children.len()
        ))
    })?;
    Ok(state.with_cell(cell))
}
