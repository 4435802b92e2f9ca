//! Function rules: construction, application, and the domain query.
//!
//! A function cell is a constant array from the argument sort to the
//! result sort. Construction starts from the session's shared
//! unbound-value marker and stores one entry per domain element,
//! guarded by that element's membership: an absent element maps back to
//! the marker, so two constructions over the same effective domain and
//! body produce identical arrays and function equality is extensional.
//! The domain set and a relation of argument/result pairs are wired as
//! bookkeeping edges for counterexample reconstruction.

use tern_ir::{CellId, ExprKind};
use tern_types::Type;
use z3::ast::Array;

use crate::rewriter::Rewriter;
use crate::rules;
use crate::sorts;
use crate::state::SymbState;
use crate::{EncodeError, EncodeResult};

pub(crate) fn ctor_rule(rw: &mut Rewriter<'_>, state: SymbState) -> EncodeResult<SymbState> {
    let ty = state.expr.ty.clone();
    let Type::Fun(arg_ty, res_ty) = ty.clone() else {
        return Err(EncodeError::Contract(format!(
            "function constructor typed as {}",
            ty
        )));
    };
    let ExprKind::FunCtor { var, domain, body } = state.expr.kind.clone() else {
        return Err(EncodeError::Contract(
            "function constructor rule invoked on non-constructor".into(),
        ));
    };

    let (mut state, dom_cell) = rw.rewrite_sub(state, *domain)?;
    match state.arena.cell_type(dom_cell) {
        Type::Set(elem) if **elem == *arg_ty => {}
        other => {
            return Err(EncodeError::Contract(format!(
                "function over {} domain {} of type {}",
                arg_ty, dom_cell, other
            )))
        }
    }

    let elems = state.arena.has(dom_cell);
    let mut pairs: Vec<(CellId, CellId)> = Vec::with_capacity(elems.len());
    for d in elems {
        state.binding.push(var.clone(), d);
        let (next, r) = rw.rewrite_sub(state, (*body).clone())?;
        state = next;
        state.binding.pop();
        pairs.push((d, r));
    }

    let fun = rules::alloc(rw, &mut state, ty)?;

    // Bookkeeping structure for decoding: the relation of argument and
    // result pairs, hung off the function's codomain edge.
    let pair_ty = Type::Tuple(vec![(*arg_ty).clone(), (*res_ty).clone()]);
    let rel = rules::alloc_no_smt(&mut state, Type::Set(Box::new(pair_ty.clone())));
    let mut pair_cells = Vec::with_capacity(pairs.len());
    for &(d, r) in &pairs {
        let pair = rules::alloc_no_smt(&mut state, pair_ty.clone());
        rules::wire_has_no_smt(&mut state, pair, &[d, r])?;
        pair_cells.push(pair);
    }
    rules::wire_has_no_smt(&mut state, rel, &pair_cells)?;
    let arena = std::mem::take(&mut state.arena);
    state.arena = arena.set_dom(fun, dom_cell)?.set_cdm(fun, rel)?;

    let arg_sort = sorts::scalar_sort(&arg_ty).ok_or_else(|| {
        EncodeError::Contract(format!("function cell {} without scalar argument sort", fun))
    })?;
    let res_sort = sorts::scalar_sort(&res_ty).ok_or_else(|| {
        EncodeError::Contract(format!("function cell {} without scalar result sort", fun))
    })?;
    let unbound = rw.unbound_marker(res_sort);
    let mut arr = Array::const_array(&sorts::z3_sort(arg_sort), &unbound);
    for (d, r) in pairs {
        let (next, member) = rw.member_term(state, d, dom_cell)?;
        state = next;
        let d_t = rw.cell_term(d)?;
        let r_t = rw.cell_term(r)?;
        // An absent domain element maps back to the unbound marker,
        // keeping the array canonical over the effective domain.
        let val = sorts::dynamic_ite(&member, &r_t, &unbound)?;
        arr = arr.store(&d_t, &val);
    }
    let fun_arr = rw.array_term(fun)?;
    rw.assert(&fun_arr.eq(&arr));
    Ok(state.with_cell(fun))
}

pub(crate) fn app_rule(rw: &mut Rewriter<'_>, state: SymbState) -> EncodeResult<SymbState> {
    let ExprKind::App { fun, arg } = state.expr.kind.clone() else {
        return Err(EncodeError::Contract(
            "application rule invoked on non-application".into(),
        ));
    };
    let (state, f) = rw.rewrite_sub(state, *fun)?;
    let (mut state, x) = rw.rewrite_sub(state, *arg)?;
    let res_ty = match state.arena.cell_type(f) {
        Type::Fun(_, res) => (**res).clone(),
        other => {
            return Err(EncodeError::Contract(format!(
                "application of {} of non-function type {}",
                f, other
            )))
        }
    };
    let res = rules::alloc(rw, &mut state, res_ty)?;
    let f_arr = rw.array_term(f)?;
    let x_t = rw.cell_term(x)?;
    let selected = f_arr.select(&x_t);
    let res_t = rw.cell_term(res)?;
    let eq = sorts::dynamic_eq(&res_t, &selected)?;
    rw.assert(&eq);
    Ok(state.with_cell(res))
}

pub(crate) fn dom_rule(rw: &mut Rewriter<'_>, state: SymbState) -> EncodeResult<SymbState> {
    let ExprKind::Dom(fun) = state.expr.kind.clone() else {
        return Err(EncodeError::Contract(
            "domain rule invoked on non-domain-query".into(),
        ));
    };
    let (state, f) = rw.rewrite_sub(state, *fun)?;
    let dom = state.arena.dom(f)?;
    Ok(state.with_cell(dom))
}
