//! Literal and name rules.
//!
//! Literal cells are cached per session: the second occurrence of the
//! same literal reuses the first cell. String literals are interned to
//! integer ids.

use tern_ir::{CellId, ExprKind};
use tern_types::Type;
use z3::ast::{Bool, Int};

use crate::rewriter::{LiteralKey, Rewriter};
use crate::rules;
use crate::state::SymbState;
use crate::{EncodeError, EncodeResult};

pub(crate) fn literal_rule(
    rw: &mut Rewriter<'_>,
    state: SymbState,
) -> EncodeResult<SymbState> {
    match state.expr.kind.clone() {
        ExprKind::Bool(b) => {
            let (state, cell) = bool_cell(rw, state, b)?;
            Ok(state.with_cell(cell))
        }
        ExprKind::Int(n) => {
            let (state, cell) = int_cell(rw, state, n)?;
            Ok(state.with_cell(cell))
        }
        ExprKind::Str(s) => {
            let (state, cell) = str_cell(rw, state, &s)?;
            Ok(state.with_cell(cell))
        }
        other => Err(EncodeError::Contract(format!(
            "literal rule invoked on {}",
            other.describe()
        ))),
    }
}

pub(crate) fn name_rule(
    _rw: &mut Rewriter<'_>,
    state: SymbState,
) -> EncodeResult<SymbState> {
    let ExprKind::Name(name) = state.expr.kind.clone() else {
        return Err(EncodeError::Contract("name rule invoked on non-name".into()));
    };
    let cell = state
        .binding
        .lookup(&name)
        .ok_or(EncodeError::Unbound(name))?;
    Ok(state.with_cell(cell))
}

/// Cell for a boolean literal.
pub(crate) fn bool_cell(
    rw: &mut Rewriter<'_>,
    mut state: SymbState,
    b: bool,
) -> EncodeResult<(SymbState, CellId)> {
    let key = LiteralKey::Bool(b);
    if let Some(&cell) = rw.literals.get(&key) {
        return Ok((state, cell));
    }
    let cell = rules::alloc(rw, &mut state, Type::Bool)?;
    let term = rw.bool_term(cell)?;
    rw.assert(&term.iff(&Bool::from_bool(b)));
    rw.literals.insert(key, cell);
    Ok((state, cell))
}

/// Cell for an integer literal.
pub(crate) fn int_cell(
    rw: &mut Rewriter<'_>,
    mut state: SymbState,
    n: i64,
) -> EncodeResult<(SymbState, CellId)> {
    let key = LiteralKey::Int(n);
    if let Some(&cell) = rw.literals.get(&key) {
        return Ok((state, cell));
    }
    let cell = rules::alloc(rw, &mut state, Type::Int)?;
    let term = rw.int_term(cell)?;
    rw.assert(&term.eq(&Int::from_i64(n)));
    rw.literals.insert(key, cell);
    Ok((state, cell))
}

/// Cell for a string literal, interned to its integer id.
pub(crate) fn str_cell(
    rw: &mut Rewriter<'_>,
    mut state: SymbState,
    s: &str,
) -> EncodeResult<(SymbState, CellId)> {
    let key = LiteralKey::Str(s.to_string());
    if let Some(&cell) = rw.literals.get(&key) {
        return Ok((state, cell));
    }
    let id = rw.intern_str(s);
    let cell = rules::alloc(rw, &mut state, Type::Str)?;
    let term = rw.int_term(cell)?;
    rw.assert(&term.eq(&Int::from_i64(id)));
    rw.literals.insert(key, cell);
    Ok((state, cell))
}
