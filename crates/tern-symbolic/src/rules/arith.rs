//! Integer arithmetic and comparisons.

use tern_ir::{BinOp, ExprKind, UnaryOp};
use tern_types::Type;
use z3::ast::Int;

use crate::rewriter::Rewriter;
use crate::rules;
use crate::state::SymbState;
use crate::{EncodeError, EncodeResult};

pub(crate) fn arith_rule(rw: &mut Rewriter<'_>, state: SymbState) -> EncodeResult<SymbState> {
    let ExprKind::Binary { op, left, right } = state.expr.kind.clone() else {
        return Err(EncodeError::Contract(
            "arithmetic rule invoked on non-binary expression".into(),
        ));
    };
    let (state, l) = rw.rewrite_sub(state, *left)?;
    let (mut state, r) = rw.rewrite_sub(state, *right)?;
    let lt = rw.int_term(l)?;
    let rt = rw.int_term(r)?;
    let term = match op {
        BinOp::Add => Int::add(&[lt, rt]),
        BinOp::Sub => Int::sub(&[lt, rt]),
        BinOp::Mul => Int::mul(&[lt, rt]),
        BinOp::Div => lt.div(&rt),
        BinOp::Mod => lt.modulo(&rt),
        other => {
            return Err(EncodeError::Contract(format!(
                "arithmetic rule invoked on {:?}",
                other
            )))
        }
    };
    let res = rules::alloc(rw, &mut state, Type::Int)?;
    let res_t = rw.int_term(res)?;
    rw.assert(&res_t.eq(&term));
    Ok(state.with_cell(res))
}

pub(crate) fn cmp_rule(rw: &mut Rewriter<'_>, state: SymbState) -> EncodeResult<SymbState> {
    let ExprKind::Binary { op, left, right } = state.expr.kind.clone() else {
        return Err(EncodeError::Contract(
            "comparison rule invoked on non-binary expression".into(),
        ));
    };
    let (state, l) = rw.rewrite_sub(state, *left)?;
    let (mut state, r) = rw.rewrite_sub(state, *right)?;
    let lt = rw.int_term(l)?;
    let rt = rw.int_term(r)?;
    let term = match op {
        BinOp::Lt => lt.lt(&rt),
        BinOp::Le => lt.le(&rt),
        BinOp::Gt => lt.gt(&rt),
        BinOp::Ge => lt.ge(&rt),
        other => {
            return Err(EncodeError::Contract(format!(
                "comparison rule invoked on {:?}",
                other
            )))
        }
    };
    let res = rules::alloc(rw, &mut state, Type::Bool)?;
    let res_t = rw.bool_term(res)?;
    rw.assert(&res_t.iff(&term));
    Ok(state.with_cell(res))
}

pub(crate) fn neg_rule(rw: &mut Rewriter<'_>, state: SymbState) -> EncodeResult<SymbState> {
    let ExprKind::Unary { op: UnaryOp::Neg, operand } = state.expr.kind.clone() else {
        return Err(EncodeError::Contract(
            "arithmetic negation rule invoked on non-negation".into(),
        ));
    };
    let (mut state, x) = rw.rewrite_sub(state, *operand)?;
    let x_t = rw.int_term(x)?;
    let res = rules::alloc(rw, &mut state, Type::Int)?;
    let res_t = rw.int_term(res)?;
    rw.assert(&res_t.eq(&x_t.unary_minus()));
    Ok(state.with_cell(res))
}
