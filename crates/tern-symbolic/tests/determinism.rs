//! Encoding the same expression must produce the same arena shape and
//! the same number of assertions, run to run.

use proptest::prelude::*;
use tern_ir::{BinOp, Expr, ExprKind};
use tern_symbolic::{Rewriter, SymbState};
use tern_types::Type;
use z3::Solver;

fn arb_int_expr() -> impl Strategy<Value = Expr> {
    let leaf = (-5i64..5).prop_map(Expr::int);
    leaf.prop_recursive(3, 24, 2, |inner| {
        (
            prop_oneof![Just(BinOp::Add), Just(BinOp::Sub), Just(BinOp::Mul)],
            inner.clone(),
            inner,
        )
            .prop_map(|(op, l, r)| Expr::binary(op, l, r, Type::Int))
    })
}

fn arb_bool_expr() -> impl Strategy<Value = Expr> {
    let cmp = (
        prop_oneof![
            Just(BinOp::Eq),
            Just(BinOp::Lt),
            Just(BinOp::Le),
            Just(BinOp::Ge)
        ],
        arb_int_expr(),
        arb_int_expr(),
    )
        .prop_map(|(op, l, r)| Expr::binary(op, l, r, Type::Bool));
    let membership = (arb_int_expr(), proptest::collection::vec(-5i64..5, 0..4)).prop_map(
        |(elem, values)| {
            let set = Expr::new(
                ExprKind::SetEnum(values.into_iter().map(Expr::int).collect()),
                Type::Set(Box::new(Type::Int)),
            );
            Expr::binary(BinOp::In, elem, set, Type::Bool)
        },
    );
    let leaf = prop_oneof![any::<bool>().prop_map(Expr::bool), cmp, membership];
    leaf.prop_recursive(3, 24, 2, |inner| {
        (
            prop_oneof![
                Just(BinOp::And),
                Just(BinOp::Or),
                Just(BinOp::Implies),
                Just(BinOp::Iff)
            ],
            inner.clone(),
            inner,
        )
            .prop_map(|(op, l, r)| Expr::binary(op, l, r, Type::Bool))
    })
}

/// Arena size and assertion count for one fresh encoding session.
fn encode_shape(expr: Expr) -> (usize, usize) {
    let solver = Solver::new();
    let mut rw = Rewriter::new(&solver);
    let state = rw
        .rewrite_until_done(SymbState::new(expr))
        .expect("encoding failed");
    (state.arena.cell_count(), rw.assertion_count())
}

proptest! {
    #[test]
    fn encoding_is_deterministic(expr in arb_bool_expr()) {
        let first = encode_shape(expr.clone());
        let second = encode_shape(expr);
        prop_assert_eq!(first, second);
    }

    #[test]
    fn bool_expressions_end_in_a_bool_cell(expr in arb_bool_expr()) {
        let solver = Solver::new();
        let mut rw = Rewriter::new(&solver);
        let state = rw.rewrite_until_done(SymbState::new(expr)).unwrap();
        let cell = state.expr_cell().unwrap();
        prop_assert_eq!(state.arena.cell_type(cell), &Type::Bool);
        prop_assert!(rw.cell_term(cell).unwrap().as_bool().is_some());
    }

    #[test]
    fn int_expressions_end_in_an_int_cell(expr in arb_int_expr()) {
        let solver = Solver::new();
        let mut rw = Rewriter::new(&solver);
        let state = rw.rewrite_until_done(SymbState::new(expr)).unwrap();
        let cell = state.expr_cell().unwrap();
        prop_assert_eq!(state.arena.cell_type(cell), &Type::Int);
    }
}
