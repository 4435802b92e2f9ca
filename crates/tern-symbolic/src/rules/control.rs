//! Conditionals, let bindings, and bounded quantifiers.

use tern_ir::ExprKind;
use tern_types::Type;
use z3::ast::Bool;

use crate::rewriter::Rewriter;
use crate::rules;
use crate::sorts;
use crate::state::SymbState;
use crate::{EncodeError, EncodeResult};

pub(crate) fn if_rule(rw: &mut Rewriter<'_>, state: SymbState) -> EncodeResult<SymbState> {
    let ty = state.expr.ty.clone();
    let ExprKind::If { cond, then_branch, else_branch } = state.expr.kind.clone() else {
        return Err(EncodeError::Contract(
            "conditional rule invoked on non-conditional".into(),
        ));
    };
    let (state, c) = rw.rewrite_sub(state, *cond)?;
    let (state, t) = rw.rewrite_sub(state, *then_branch)?;
    let (mut state, e) = rw.rewrite_sub(state, *else_branch)?;
    let cond_t = rw.bool_term(c)?;

    if sorts::scalar_sort(&ty).is_some() {
        let res = rules::alloc(rw, &mut state, ty)?;
        let t_t = rw.cell_term(t)?;
        let e_t = rw.cell_term(e)?;
        let picked = sorts::dynamic_ite(&cond_t, &t_t, &e_t)?;
        let res_t = rw.cell_term(res)?;
        let eq = sorts::dynamic_eq(&res_t, &picked)?;
        rw.assert(&eq);
        return Ok(state.with_cell(res));
    }

    if matches!(ty, Type::Set(_)) {
        // The result set collects both branches' elements; the condition
        // gates which side's membership is live. A cell held by both
        // branches gets one edge and one flag fed by both sides.
        let elems_t = state.arena.has(t);
        let elems_e = state.arena.has(e);
        let mut children: Vec<_> = Vec::new();
        for &x in elems_t.iter().chain(elems_e.iter()) {
            if !children.contains(&x) {
                children.push(x);
            }
        }
        let res = rules::alloc(rw, &mut state, ty)?;
        rules::wire_has(&mut state, res, &children)?;
        for &x in &children {
            let mut sources = Vec::new();
            if elems_t.contains(&x) {
                let in_t = rw.in_flag(x, t);
                sources.push(Bool::and(&[cond_t.clone(), in_t]));
            }
            if elems_e.contains(&x) {
                let in_e = rw.in_flag(x, e);
                sources.push(Bool::and(&[cond_t.not(), in_e]));
            }
            let in_res = rw.in_flag(x, res);
            rw.assert(&in_res.iff(&sorts::or_any(&sources)));
        }
        return Ok(state.with_cell(res));
    }

    Err(EncodeError::Unsupported(format!(
        "conditional over {} values",
        ty
    )))
}

pub(crate) fn let_rule(rw: &mut Rewriter<'_>, state: SymbState) -> EncodeResult<SymbState> {
    let ExprKind::Let { name, value, body } = state.expr.kind.clone() else {
        return Err(EncodeError::Contract(
            "let rule invoked on non-let".into(),
        ));
    };
    let (mut state, v) = rw.rewrite_sub(state, *value)?;
    state.binding.push(name, v);
    let (mut state, b) = rw.rewrite_sub(state, *body)?;
    state.binding.pop();
    Ok(state.with_cell(b))
}

/// Bounded quantifiers expand over the domain's element cells. Each
/// instance is guarded by the element's presence: an absent element
/// neither strengthens a universal nor witnesses an existential.
pub(crate) fn quant_rule(rw: &mut Rewriter<'_>, state: SymbState) -> EncodeResult<SymbState> {
    let (var, domain, body, universal) = match state.expr.kind.clone() {
        ExprKind::Forall { var, domain, body } => (var, domain, body, true),
        ExprKind::Exists { var, domain, body } => (var, domain, body, false),
        _ => {
            return Err(EncodeError::Contract(
                "quantifier rule invoked on non-quantifier".into(),
            ))
        }
    };
    let (mut state, s) = rw.rewrite_sub(state, *domain)?;
    let elems = state.arena.has(s);
    let mut instances = Vec::with_capacity(elems.len());
    for d in elems {
        state.binding.push(var.clone(), d);
        let (next, b) = rw.rewrite_sub(state, (*body).clone())?;
        state = next;
        state.binding.pop();
        let b_t = rw.bool_term(b)?;
        let present = rw.in_flag(d, s);
        instances.push(if universal {
            present.implies(&b_t)
        } else {
            Bool::and(&[present, b_t])
        });
    }
    let term = if universal {
        sorts::and_all(&instances)
    } else {
        sorts::or_any(&instances)
    };
    let res = rules::alloc(rw, &mut state, Type::Bool)?;
    let res_t = rw.bool_term(res)?;
    rw.assert(&res_t.iff(&term));
    Ok(state.with_cell(res))
}
