//! Set rules: enumeration, integer ranges, membership, the binary set
//! operations, and the subset test.
//!
//! A set cell carries no solver term. Its content is the `has` children
//! plus one membership flag per child; for an enumeration the flags are
//! asserted true, while derived sets (union, intersection, difference,
//! conditional) constrain their flags relative to the source sets.

use tern_ir::{BinOp, ExprKind};
use tern_types::Type;
use z3::ast::Bool;

use crate::rewriter::Rewriter;
use crate::rules::{self, literals};
use crate::sorts;
use crate::state::SymbState;
use crate::{EncodeError, EncodeResult};

pub(crate) fn enum_rule(rw: &mut Rewriter<'_>, state: SymbState) -> EncodeResult<SymbState> {
    let ty = state.expr.ty.clone();
    let ExprKind::SetEnum(elems) = state.expr.kind.clone() else {
        return Err(EncodeError::Contract(
            "set enumeration rule invoked on non-enumeration".into(),
        ));
    };
    let mut state = state;
    let mut cells = Vec::with_capacity(elems.len());
    for elem in elems {
        let (next, cell) = rw.rewrite_sub(state, elem)?;
        state = next;
        cells.push(cell);
    }
    let set = rules::alloc(rw, &mut state, ty)?;
    rules::wire_has(&mut state, set, &cells)?;
    // Enumerated elements are unconditionally present.
    for cell in cells {
        let flag = rw.in_flag(cell, set);
        rw.assert(&flag);
    }
    Ok(state.with_cell(set))
}

/// A standalone range becomes an explicit set, one cell per value. This
/// requires literal bounds; a range with symbolic bounds only makes
/// sense under a membership test, where no expansion is needed.
pub(crate) fn range_rule(rw: &mut Rewriter<'_>, state: SymbState) -> EncodeResult<SymbState> {
    let ty = state.expr.ty.clone();
    let ExprKind::Range { lo, hi } = state.expr.kind.clone() else {
        return Err(EncodeError::Contract(
            "range rule invoked on non-range".into(),
        ));
    };
    let (ExprKind::Int(l), ExprKind::Int(h)) = (&lo.kind, &hi.kind) else {
        return Err(EncodeError::Unsupported(
            "integer range with symbolic bounds outside a membership test".into(),
        ));
    };
    let (l, h) = (*l, *h);
    let mut state = state;
    let mut cells = Vec::new();
    for k in l..=h {
        let (next, cell) = literals::int_cell(rw, state, k)?;
        state = next;
        cells.push(cell);
    }
    let set = rules::alloc(rw, &mut state, ty)?;
    rules::wire_has(&mut state, set, &cells)?;
    for cell in cells {
        let flag = rw.in_flag(cell, set);
        rw.assert(&flag);
    }
    Ok(state.with_cell(set))
}

/// Membership in an integer range is pure arithmetic: the range is
/// never expanded, so symbolic bounds are fine here.
pub(crate) fn in_range_rule(rw: &mut Rewriter<'_>, state: SymbState) -> EncodeResult<SymbState> {
    let ExprKind::Binary { op, left, right } = state.expr.kind.clone() else {
        return Err(EncodeError::Contract(
            "range membership rule invoked on non-binary expression".into(),
        ));
    };
    let ExprKind::Range { lo, hi } = right.kind else {
        return Err(EncodeError::Contract(
            "range membership rule invoked without a range operand".into(),
        ));
    };
    let (state, e) = rw.rewrite_sub(state, *left)?;
    let (state, l) = rw.rewrite_sub(state, *lo)?;
    let (mut state, h) = rw.rewrite_sub(state, *hi)?;
    let e_t = rw.int_term(e)?;
    let l_t = rw.int_term(l)?;
    let h_t = rw.int_term(h)?;
    let inside = Bool::and(&[e_t.ge(&l_t), e_t.le(&h_t)]);
    let term = match op {
        BinOp::In => inside,
        BinOp::NotIn => inside.not(),
        other => {
            return Err(EncodeError::Contract(format!(
                "range membership rule invoked on {:?}",
                other
            )))
        }
    };
    let res = rules::alloc(rw, &mut state, Type::Bool)?;
    let res_t = rw.bool_term(res)?;
    rw.assert(&res_t.iff(&term));
    Ok(state.with_cell(res))
}

pub(crate) fn in_set_rule(rw: &mut Rewriter<'_>, state: SymbState) -> EncodeResult<SymbState> {
    let ExprKind::Binary { op, left, right } = state.expr.kind.clone() else {
        return Err(EncodeError::Contract(
            "membership rule invoked on non-binary expression".into(),
        ));
    };
    let (state, e) = rw.rewrite_sub(state, *left)?;
    let (state, s) = rw.rewrite_sub(state, *right)?;
    let (mut state, member) = rw.member_term(state, e, s)?;
    let term = match op {
        BinOp::In => member,
        BinOp::NotIn => member.not(),
        other => {
            return Err(EncodeError::Contract(format!(
                "membership rule invoked on {:?}",
                other
            )))
        }
    };
    let res = rules::alloc(rw, &mut state, Type::Bool)?;
    let res_t = rw.bool_term(res)?;
    rw.assert(&res_t.iff(&term));
    Ok(state.with_cell(res))
}

/// Union, intersection, and difference. The result cell reuses the
/// operand element cells; only the membership flags differ.
pub(crate) fn binop_rule(rw: &mut Rewriter<'_>, state: SymbState) -> EncodeResult<SymbState> {
    let ty = state.expr.ty.clone();
    let ExprKind::Binary { op, left, right } = state.expr.kind.clone() else {
        return Err(EncodeError::Contract(
            "set operation rule invoked on non-binary expression".into(),
        ));
    };
    let (state, a) = rw.rewrite_sub(state, *left)?;
    let (mut state, b) = rw.rewrite_sub(state, *right)?;
    let elems_a = state.arena.has(a);
    let elems_b = state.arena.has(b);
    let res = rules::alloc(rw, &mut state, ty)?;
    match op {
        BinOp::Union => {
            // Literal caching means both operands may hold the very same
            // element cell; such a cell gets one edge and one flag fed by
            // both sides.
            let mut children: Vec<_> = Vec::new();
            for &x in elems_a.iter().chain(elems_b.iter()) {
                if !children.contains(&x) {
                    children.push(x);
                }
            }
            rules::wire_has(&mut state, res, &children)?;
            for &x in &children {
                let mut sources = Vec::new();
                if elems_a.contains(&x) {
                    sources.push(rw.in_flag(x, a));
                }
                if elems_b.contains(&x) {
                    sources.push(rw.in_flag(x, b));
                }
                let in_res = rw.in_flag(x, res);
                rw.assert(&in_res.iff(&sorts::or_any(&sources)));
            }
        }
        BinOp::Intersect => {
            rules::wire_has(&mut state, res, &elems_a)?;
            for &x in &elems_a {
                let (next, in_b) = rw.member_term(state, x, b)?;
                state = next;
                let in_res = rw.in_flag(x, res);
                let in_a = rw.in_flag(x, a);
                rw.assert(&in_res.iff(&Bool::and(&[in_a, in_b])));
            }
        }
        BinOp::Diff => {
            rules::wire_has(&mut state, res, &elems_a)?;
            for &x in &elems_a {
                let (next, in_b) = rw.member_term(state, x, b)?;
                state = next;
                let in_res = rw.in_flag(x, res);
                let in_a = rw.in_flag(x, a);
                rw.assert(&in_res.iff(&Bool::and(&[in_a, in_b.not()])));
            }
        }
        other => {
            return Err(EncodeError::Contract(format!(
                "set operation rule invoked on {:?}",
                other
            )))
        }
    }
    Ok(state.with_cell(res))
}

pub(crate) fn subseteq_rule(rw: &mut Rewriter<'_>, state: SymbState) -> EncodeResult<SymbState> {
    let ExprKind::Binary { op: BinOp::Subseteq, left, right } = state.expr.kind.clone() else {
        return Err(EncodeError::Contract(
            "subset rule invoked on non-subset expression".into(),
        ));
    };
    let (state, a) = rw.rewrite_sub(state, *left)?;
    let (mut state, b) = rw.rewrite_sub(state, *right)?;
    let elems_a = state.arena.has(a);
    let mut conjuncts = Vec::with_capacity(elems_a.len());
    for &x in &elems_a {
        let (next, in_b) = rw.member_term(state, x, b)?;
        state = next;
        let in_a = rw.in_flag(x, a);
        conjuncts.push(in_a.implies(&in_b));
    }
    // The empty set is a subset of anything: empty conjunction.
    let term = sorts::and_all(&conjuncts);
    let res = rules::alloc(rw, &mut state, Type::Bool)?;
    let res_t = rw.bool_term(res)?;
    rw.assert(&res_t.iff(&term));
    Ok(state.with_cell(res))
}
