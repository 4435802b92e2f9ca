//! Boolean connectives, negation, and the equality construct.

use tern_ir::{BinOp, ExprKind, UnaryOp};
use tern_types::Type;
use z3::ast::Bool;

use crate::rewriter::Rewriter;
use crate::rules;
use crate::state::SymbState;
use crate::{EncodeError, EncodeResult};

pub(crate) fn connective_rule(
    rw: &mut Rewriter<'_>,
    state: SymbState,
) -> EncodeResult<SymbState> {
    let ExprKind::Binary { op, left, right } = state.expr.kind.clone() else {
        return Err(EncodeError::Contract(
            "connective rule invoked on non-binary expression".into(),
        ));
    };
    let (state, l) = rw.rewrite_sub(state, *left)?;
    let (mut state, r) = rw.rewrite_sub(state, *right)?;
    let lt = rw.bool_term(l)?;
    let rt = rw.bool_term(r)?;
    let term = match op {
        BinOp::And => Bool::and(&[lt, rt]),
        BinOp::Or => Bool::or(&[lt, rt]),
        BinOp::Implies => lt.implies(&rt),
        BinOp::Iff => lt.iff(&rt),
        other => {
            return Err(EncodeError::Contract(format!(
                "connective rule invoked on {:?}",
                other
            )))
        }
    };
    let res = rules::alloc(rw, &mut state, Type::Bool)?;
    let res_t = rw.bool_term(res)?;
    rw.assert(&res_t.iff(&term));
    Ok(state.with_cell(res))
}

pub(crate) fn not_rule(rw: &mut Rewriter<'_>, state: SymbState) -> EncodeResult<SymbState> {
    let ExprKind::Unary { op: UnaryOp::Not, operand } = state.expr.kind.clone() else {
        return Err(EncodeError::Contract(
            "negation rule invoked on non-negation".into(),
        ));
    };
    let (mut state, x) = rw.rewrite_sub(state, *operand)?;
    let x_t = rw.bool_term(x)?;
    let res = rules::alloc(rw, &mut state, Type::Bool)?;
    let res_t = rw.bool_term(res)?;
    rw.assert(&res_t.iff(&x_t.not()));
    Ok(state.with_cell(res))
}

/// Equality and disequality over cells of any encodable type, routed
/// through the lazy equality cache.
pub(crate) fn eq_rule(rw: &mut Rewriter<'_>, state: SymbState) -> EncodeResult<SymbState> {
    let ExprKind::Binary { op, left, right } = state.expr.kind.clone() else {
        return Err(EncodeError::Contract(
            "equality rule invoked on non-binary expression".into(),
        ));
    };
    let (state, l) = rw.rewrite_sub(state, *left)?;
    let (state, r) = rw.rewrite_sub(state, *right)?;
    let mut state = rw.cache_eq_constraints(state, &[(l, r)])?;
    let eq = rw.eq_term(l, r)?;
    let term = match op {
        BinOp::Eq => eq,
        BinOp::Ne => eq.not(),
        other => {
            return Err(EncodeError::Contract(format!(
                "equality rule invoked on {:?}",
                other
            )))
        }
    };
    let res = rules::alloc(rw, &mut state, Type::Bool)?;
    let res_t = rw.bool_term(res)?;
    rw.assert(&res_t.iff(&term));
    Ok(state.with_cell(res))
}
