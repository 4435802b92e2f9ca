//! Record and variant rules.
//!
//! A record cell's `has` children are the field cells in the row's
//! canonical (sorted) field order; access is positional against that
//! order. A variant cell has exactly two children, the interned tag
//! cell first and the payload cell second.

use tern_ir::ExprKind;
use tern_types::Type;

use crate::rewriter::Rewriter;
use crate::rules::{self, literals};
use crate::state::SymbState;
use crate::{EncodeError, EncodeResult};

pub(crate) fn record_rule(rw: &mut Rewriter<'_>, state: SymbState) -> EncodeResult<SymbState> {
    let ty = state.expr.ty.clone();
    let Type::Record(row) = &ty else {
        return Err(EncodeError::Contract(format!(
            "record constructor typed as {}",
            ty
        )));
    };
    let ExprKind::Record(fields) = state.expr.kind.clone() else {
        return Err(EncodeError::Contract(
            "record rule invoked on non-record".into(),
        ));
    };
    let order: Vec<String> = row
        .closed_fields()
        .iter()
        .map(|(name, _)| name.to_string())
        .collect();
    let mut state = state;
    let mut cells = Vec::with_capacity(order.len());
    for name in &order {
        let expr = fields
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, e)| e.clone())
            .ok_or_else(|| {
                EncodeError::Contract(format!("record constructor missing field {}", name))
            })?;
        let (next, cell) = rw.rewrite_sub(state, expr)?;
        state = next;
        cells.push(cell);
    }
    let rec = rules::alloc(rw, &mut state, ty)?;
    rules::wire_has_no_smt(&mut state, rec, &cells)?;
    Ok(state.with_cell(rec))
}

pub(crate) fn field_rule(rw: &mut Rewriter<'_>, state: SymbState) -> EncodeResult<SymbState> {
    let ExprKind::Field { base, field } = state.expr.kind.clone() else {
        return Err(EncodeError::Contract(
            "field rule invoked on non-field-access".into(),
        ));
    };
    let (state, b) = rw.rewrite_sub(state, *base)?;
    let Type::Record(row) = state.arena.cell_type(b).clone() else {
        return Err(EncodeError::Contract(format!(
            "field access on {} of non-record type {}",
            b,
            state.arena.cell_type(b)
        )));
    };
    let pos = row
        .closed_fields()
        .iter()
        .position(|(name, _)| *name == field)
        .ok_or_else(|| {
            EncodeError::Contract(format!("record cell {} has no field {}", b, field))
        })?;
    let children = state.arena.has(b);
    let cell = children.get(pos).copied().ok_or_else(|| {
        EncodeError::Contract(format!("record cell {} missing child for field {}", b, field))
    })?;
    Ok(state.with_cell(cell))
}

pub(crate) fn variant_rule(rw: &mut Rewriter<'_>, state: SymbState) -> EncodeResult<SymbState> {
    let ty = state.expr.ty.clone();
    if !matches!(ty, Type::Variant(_)) {
        return Err(EncodeError::Contract(format!(
            "variant constructor typed as {}",
            ty
        )));
    }
    let ExprKind::Variant { tag, value } = state.expr.kind.clone() else {
        return Err(EncodeError::Contract(
            "variant rule invoked on non-variant".into(),
        ));
    };
    let (state, val) = rw.rewrite_sub(state, *value)?;
    let (mut state, tag_cell) = literals::str_cell(rw, state, &tag)?;
    let var = rules::alloc(rw, &mut state, ty)?;
    // Tag first, payload second.
    rules::wire_has_no_smt(&mut state, var, &[tag_cell, val])?;
    Ok(state.with_cell(var))
}
