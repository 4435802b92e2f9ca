//! End-to-end encoding tests: rewrite an expression, assert the result
//! cell, and check satisfiability.

use tern_ir::{BinOp, CellId, Expr, ExprKind, UnaryOp};
use tern_symbolic::{EncodeError, Rewriter, SymbState};
use tern_types::{Row, Type};
use z3::{SatResult, Solver};

fn int_ty() -> Type {
    Type::Int
}

fn int_set_ty() -> Type {
    Type::Set(Box::new(Type::Int))
}

fn set_of(elems: &[i64]) -> Expr {
    Expr::new(
        ExprKind::SetEnum(elems.iter().map(|&n| Expr::int(n)).collect()),
        int_set_ty(),
    )
}

fn eq(left: Expr, right: Expr) -> Expr {
    Expr::binary(BinOp::Eq, left, right, Type::Bool)
}

/// Encode `expr`, assert its boolean result cell (negated if asked),
/// and return the solver verdict.
fn check(expr: Expr, negate: bool) -> SatResult {
    let solver = Solver::new();
    let mut rw = Rewriter::new(&solver);
    let state = rw
        .rewrite_until_done(SymbState::new(expr))
        .expect("encoding failed");
    let cell = state.expr_cell().expect("no result cell");
    let term = rw
        .cell_term(cell)
        .expect("result cell has no term")
        .as_bool()
        .expect("result cell is not boolean");
    let asserted = if negate { term.not() } else { term };
    solver.assert(&asserted);
    solver.check()
}

fn assert_valid(expr: Expr) {
    assert_eq!(check(expr.clone(), false), SatResult::Sat);
    assert_eq!(check(expr, true), SatResult::Unsat);
}

fn assert_unsatisfiable(expr: Expr) {
    assert_eq!(check(expr, false), SatResult::Unsat);
}

#[test]
fn test_arithmetic_identity() {
    let sum = Expr::binary(BinOp::Add, Expr::int(2), Expr::int(3), int_ty());
    assert_valid(eq(sum, Expr::int(5)));
}

#[test]
fn test_arithmetic_negation() {
    let neg = Expr::unary(UnaryOp::Neg, Expr::int(7), int_ty());
    assert_valid(eq(neg, Expr::int(-7)));
}

#[test]
fn test_connectives() {
    let both = Expr::binary(BinOp::And, Expr::bool(true), Expr::bool(false), Type::Bool);
    assert_unsatisfiable(both);
    let either = Expr::binary(BinOp::Or, Expr::bool(true), Expr::bool(false), Type::Bool);
    assert_valid(either);
}

#[test]
fn test_membership_in_enumeration() {
    let e = Expr::binary(BinOp::In, Expr::int(2), set_of(&[1, 2, 3]), Type::Bool);
    assert_valid(e);
    let e = Expr::binary(BinOp::In, Expr::int(9), set_of(&[1, 2, 3]), Type::Bool);
    assert_unsatisfiable(e);
}

#[test]
fn test_membership_in_empty_set() {
    let e = Expr::binary(BinOp::In, Expr::int(3), set_of(&[]), Type::Bool);
    assert_unsatisfiable(e);
    let e = Expr::binary(BinOp::NotIn, Expr::int(3), set_of(&[]), Type::Bool);
    assert_valid(e);
}

#[test]
fn test_membership_in_range_is_arithmetic() {
    let range = Expr::new(
        ExprKind::Range {
            lo: Box::new(Expr::int(1)),
            hi: Box::new(Expr::int(10)),
        },
        int_set_ty(),
    );
    let e = Expr::binary(BinOp::In, Expr::int(5), range.clone(), Type::Bool);
    assert_valid(e);
    let e = Expr::binary(BinOp::NotIn, Expr::int(11), range, Type::Bool);
    assert_valid(e);
}

#[test]
fn test_standalone_range_expands() {
    let range = Expr::new(
        ExprKind::Range {
            lo: Box::new(Expr::int(1)),
            hi: Box::new(Expr::int(3)),
        },
        int_set_ty(),
    );
    assert_valid(eq(range, set_of(&[3, 2, 1])));
}

#[test]
fn test_standalone_range_with_symbolic_bounds_is_unsupported() {
    let range = Expr::new(
        ExprKind::Range {
            lo: Box::new(Expr::binary(BinOp::Add, Expr::int(0), Expr::int(1), int_ty())),
            hi: Box::new(Expr::int(3)),
        },
        int_set_ty(),
    );
    let solver = Solver::new();
    let mut rw = Rewriter::new(&solver);
    let err = rw.rewrite_until_done(SymbState::new(range)).unwrap_err();
    assert!(matches!(err, EncodeError::Unsupported(_)));
}

#[test]
fn test_set_equality_is_extensional() {
    assert_valid(eq(set_of(&[1, 2]), set_of(&[2, 1])));
    assert_unsatisfiable(eq(set_of(&[1, 2]), set_of(&[1, 3])));
}

#[test]
fn test_union_intersection_difference() {
    let union = Expr::binary(BinOp::Union, set_of(&[1]), set_of(&[2]), int_set_ty());
    assert_valid(eq(union, set_of(&[1, 2])));

    let inter = Expr::binary(BinOp::Intersect, set_of(&[1, 2]), set_of(&[2, 3]), int_set_ty());
    assert_valid(eq(inter, set_of(&[2])));

    let diff = Expr::binary(BinOp::Diff, set_of(&[1, 2]), set_of(&[2, 3]), int_set_ty());
    assert_valid(eq(diff, set_of(&[1])));
}

#[test]
fn test_subset() {
    let e = Expr::binary(BinOp::Subseteq, set_of(&[1, 2]), set_of(&[3, 2, 1]), Type::Bool);
    assert_valid(e);
    let e = Expr::binary(BinOp::Subseteq, set_of(&[1, 4]), set_of(&[1, 2]), Type::Bool);
    assert_unsatisfiable(e);
    // The empty set is a subset of anything, including itself.
    let e = Expr::binary(BinOp::Subseteq, set_of(&[]), set_of(&[]), Type::Bool);
    assert_valid(e);
}

fn fun_succ(domain: Expr) -> Expr {
    // [x \in domain |-> x + 1]
    let body = Expr::binary(
        BinOp::Add,
        Expr::name("x", int_ty()),
        Expr::int(1),
        int_ty(),
    );
    Expr::new(
        ExprKind::FunCtor {
            var: "x".into(),
            domain: Box::new(domain),
            body: Box::new(body),
        },
        Type::Fun(Box::new(Type::Int), Box::new(Type::Int)),
    )
}

fn apply(fun: Expr, arg: Expr, res_ty: Type) -> Expr {
    Expr::new(
        ExprKind::App {
            fun: Box::new(fun),
            arg: Box::new(arg),
        },
        res_ty,
    )
}

#[test]
fn test_function_application() {
    let app = apply(fun_succ(set_of(&[1, 2])), Expr::int(1), int_ty());
    assert_valid(eq(app.clone(), Expr::int(2)));
    assert_unsatisfiable(eq(app, Expr::int(3)));
}

#[test]
fn test_successor_over_pair_scenario() {
    // [x \in {1,2} |-> x + 1]: value at 1 is 2, at 2 is 3, both at once.
    let at_one = eq(
        apply(fun_succ(set_of(&[1, 2])), Expr::int(1), int_ty()),
        Expr::int(2),
    );
    let at_two = eq(
        apply(fun_succ(set_of(&[1, 2])), Expr::int(2), int_ty()),
        Expr::int(3),
    );
    assert_valid(at_one.clone());
    assert_valid(at_two.clone());
    assert_valid(Expr::binary(BinOp::And, at_one, at_two, Type::Bool));
}

#[test]
fn test_function_domain_query() {
    let dom = Expr::new(ExprKind::Dom(Box::new(fun_succ(set_of(&[1, 2])))), int_set_ty());
    assert_valid(eq(dom, set_of(&[1, 2])));
}

#[test]
fn test_relation_holds_one_pair_per_domain_element() {
    let solver = Solver::new();
    let mut rw = Rewriter::new(&solver);
    let state = rw
        .rewrite_until_done(SymbState::new(fun_succ(set_of(&[1, 2, 3]))))
        .unwrap();
    let fun = state.expr_cell().unwrap();
    let rel = state.arena.cdm(fun).unwrap();
    let pairs = state.arena.has(rel);
    assert_eq!(pairs.len(), 3);
    for pair in pairs {
        assert_eq!(state.arena.has(pair).len(), 2);
    }
}

#[test]
fn test_empty_domain_function_is_unconstrained() {
    let solver = Solver::new();
    let mut rw = Rewriter::new(&solver);
    let state = rw
        .rewrite_until_done(SymbState::new(fun_succ(set_of(&[]))))
        .unwrap();
    let fun = state.expr_cell().unwrap();
    let rel = state.arena.cdm(fun).unwrap();
    assert!(state.arena.has(rel).is_empty());

    // With no domain element observed, any application result is possible.
    let app = apply(fun_succ(set_of(&[])), Expr::int(5), int_ty());
    assert_eq!(check(eq(app.clone(), Expr::int(42)), false), SatResult::Sat);
    assert_eq!(check(eq(app, Expr::int(17)), false), SatResult::Sat);
}

#[test]
fn test_value_outside_domain_is_unconstrained() {
    let app = apply(fun_succ(set_of(&[1, 2])), Expr::int(9), int_ty());
    assert_eq!(check(eq(app.clone(), Expr::int(0)), false), SatResult::Sat);
    assert_eq!(check(eq(app, Expr::int(100)), false), SatResult::Sat);
}

#[test]
fn test_functions_over_reordered_domains_are_equal() {
    // Same mapping built in opposite construction order; the shared
    // unbound marker makes the two array terms coincide.
    let e = eq(fun_succ(set_of(&[1, 2])), fun_succ(set_of(&[2, 1])));
    assert_valid(e);
}

#[test]
fn test_quantifiers() {
    let ge = |bound: i64| {
        Expr::new(
            ExprKind::Forall {
                var: "x".into(),
                domain: Box::new(set_of(&[1, 2])),
                body: Box::new(Expr::binary(
                    BinOp::Ge,
                    Expr::name("x", int_ty()),
                    Expr::int(bound),
                    Type::Bool,
                )),
            },
            Type::Bool,
        )
    };
    assert_valid(ge(1));
    assert_unsatisfiable(ge(2));

    let witness = Expr::new(
        ExprKind::Exists {
            var: "x".into(),
            domain: Box::new(set_of(&[1, 2])),
            body: Box::new(eq(Expr::name("x", int_ty()), Expr::int(2))),
        },
        Type::Bool,
    );
    assert_valid(witness);
}

#[test]
fn test_forall_over_empty_domain_holds() {
    let e = Expr::new(
        ExprKind::Forall {
            var: "x".into(),
            domain: Box::new(set_of(&[])),
            body: Box::new(Expr::bool(false)),
        },
        Type::Bool,
    );
    assert_valid(e);
}

#[test]
fn test_let_binding() {
    let e = Expr::new(
        ExprKind::Let {
            name: "n".into(),
            value: Box::new(Expr::int(5)),
            body: Box::new(eq(
                Expr::binary(BinOp::Add, Expr::name("n", int_ty()), Expr::int(1), int_ty()),
                Expr::int(6),
            )),
        },
        Type::Bool,
    );
    assert_valid(e);
}

#[test]
fn test_conditional_over_scalars() {
    let e = Expr::new(
        ExprKind::If {
            cond: Box::new(Expr::bool(true)),
            then_branch: Box::new(Expr::int(1)),
            else_branch: Box::new(Expr::int(2)),
        },
        int_ty(),
    );
    assert_valid(eq(e, Expr::int(1)));
}

#[test]
fn test_conditional_over_sets() {
    let e = Expr::new(
        ExprKind::If {
            cond: Box::new(Expr::bool(false)),
            then_branch: Box::new(set_of(&[1])),
            else_branch: Box::new(set_of(&[2])),
        },
        int_set_ty(),
    );
    assert_valid(eq(e, set_of(&[2])));
}

fn record_ty() -> Type {
    Type::Record(Row::closed([
        ("a".to_string(), Type::Int),
        ("b".to_string(), Type::Bool),
    ]))
}

#[test]
fn test_record_field_access() {
    let rec = Expr::new(
        ExprKind::Record(vec![
            ("b".to_string(), Expr::bool(true)),
            ("a".to_string(), Expr::int(1)),
        ]),
        record_ty(),
    );
    let a = Expr::new(
        ExprKind::Field {
            base: Box::new(rec),
            field: "a".into(),
        },
        int_ty(),
    );
    assert_valid(eq(a.clone(), Expr::int(1)));
    assert_unsatisfiable(eq(a, Expr::int(2)));
}

#[test]
fn test_tuple_projection() {
    let tup = Expr::new(
        ExprKind::Tuple(vec![Expr::int(1), Expr::bool(true)]),
        Type::Tuple(vec![Type::Int, Type::Bool]),
    );
    let first = Expr::new(
        ExprKind::Proj {
            base: Box::new(tup),
            index: 0,
        },
        int_ty(),
    );
    assert_valid(eq(first, Expr::int(1)));
}

fn variant_ty() -> Type {
    Type::Variant(Row::closed([
        ("none".to_string(), Type::Tuple(vec![])),
        ("some".to_string(), Type::Int),
    ]))
}

fn some_of(n: i64) -> Expr {
    Expr::new(
        ExprKind::Variant {
            tag: "some".into(),
            value: Box::new(Expr::int(n)),
        },
        variant_ty(),
    )
}

#[test]
fn test_variant_equality() {
    assert_valid(eq(some_of(1), some_of(1)));
    assert_unsatisfiable(eq(some_of(1), some_of(2)));
}

#[test]
fn test_variants_with_distinct_tags_are_unequal() {
    let none = Expr::new(
        ExprKind::Variant {
            tag: "none".into(),
            value: Box::new(Expr::new(ExprKind::Tuple(vec![]), Type::Tuple(vec![]))),
        },
        variant_ty(),
    );
    assert_unsatisfiable(eq(some_of(1), none));
}

#[test]
fn test_unbound_name_is_reported() {
    let solver = Solver::new();
    let mut rw = Rewriter::new(&solver);
    let err = rw
        .rewrite_until_done(SymbState::new(Expr::name("ghost", int_ty())))
        .unwrap_err();
    match err {
        EncodeError::Unbound(name) => assert_eq!(name, "ghost"),
        other => panic!("expected unbound name, got {}", other),
    }
}

#[test]
fn test_literal_cells_are_shared() {
    let solver = Solver::new();
    let mut rw = Rewriter::new(&solver);
    let state = rw
        .rewrite_until_done(SymbState::new(Expr::int(4)))
        .unwrap();
    let first = state.expr_cell().unwrap();
    let state = rw
        .rewrite_until_done(state.with_expr(Expr::int(4)))
        .unwrap();
    assert_eq!(state.expr_cell().unwrap(), first);
}

#[test]
fn test_equality_cache_asserts_once() {
    let solver = Solver::new();
    let mut rw = Rewriter::new(&solver);
    let state = rw
        .rewrite_until_done(SymbState::new(eq(set_of(&[1, 2]), set_of(&[2, 1]))))
        .unwrap();
    let before = rw.assertion_count();
    let sets: Vec<CellId> = (0..state.arena.cell_count())
        .map(CellId::from_index)
        .filter(|&c| matches!(state.arena.cell_type(c), Type::Set(_)))
        .collect();
    let pair = [(sets[0], sets[1])];
    let first = rw.eq_term(sets[0], sets[1]).unwrap();
    rw.cache_eq_constraints(state, &pair).unwrap();
    assert_eq!(rw.assertion_count(), before);
    assert_eq!(rw.eq_term(sets[0], sets[1]).unwrap(), first);
}

#[test]
fn test_string_interning_is_stable() {
    let solver = Solver::new();
    let mut rw = Rewriter::new(&solver);
    let state = rw
        .rewrite_until_done(SymbState::new(eq(Expr::str("a"), Expr::str("b"))))
        .unwrap();
    rw.rewrite_until_done(state.with_expr(Expr::str("a"))).unwrap();
    assert_eq!(rw.string_table(), &["a".to_string(), "b".to_string()]);
}
