//! Construct rules and the dispatch table.
//!
//! One rule per specification-language construct. Each rule is a free
//! function over `(rewriter, state)`: it rewrites its sub-expressions by
//! calling back into the rewriter, allocates a result cell, wires arena
//! edges, asserts the relating constraints, and returns a state whose
//! expression is a bare reference to the new cell.

pub(crate) mod arith;
pub(crate) mod control;
pub(crate) mod fun;
pub(crate) mod literals;
pub(crate) mod logic;
pub(crate) mod record;
pub(crate) mod set;
pub(crate) mod tuple;

use tern_ir::{BinOp, CellId, Expr, ExprKind, UnaryOp};
use tern_types::Type;

use crate::rewriter::Rewriter;
use crate::state::SymbState;
use crate::EncodeResult;

/// A rewriting rule.
pub(crate) type RuleFn = fn(&mut Rewriter<'_>, SymbState) -> EncodeResult<SymbState>;

/// Look up the rule for an expression's outermost construct.
///
/// Dispatch is by syntactic shape; where a construct is overloaded, the
/// operand shape refines the choice: membership in an integer range
/// becomes arithmetic bounds, membership in anything else an OR-chain
/// over the set's elements.
pub(crate) fn lookup(expr: &Expr) -> Option<RuleFn> {
    Some(match &expr.kind {
        ExprKind::Cell(_) => return None,

        ExprKind::Bool(_) | ExprKind::Int(_) | ExprKind::Str(_) => literals::literal_rule,
        ExprKind::Name(_) => literals::name_rule,

        ExprKind::Unary { op: UnaryOp::Not, .. } => logic::not_rule,
        ExprKind::Unary { op: UnaryOp::Neg, .. } => arith::neg_rule,

        ExprKind::Binary { op, right, .. } => match op {
            BinOp::And | BinOp::Or | BinOp::Implies | BinOp::Iff => logic::connective_rule,
            BinOp::Eq | BinOp::Ne => logic::eq_rule,
            BinOp::Add | BinOp::Sub | BinOp::Mul | BinOp::Div | BinOp::Mod => {
                arith::arith_rule
            }
            BinOp::Lt | BinOp::Le | BinOp::Gt | BinOp::Ge => arith::cmp_rule,
            BinOp::In | BinOp::NotIn => match right.kind {
                ExprKind::Range { .. } => set::in_range_rule,
                _ => set::in_set_rule,
            },
            BinOp::Union | BinOp::Intersect | BinOp::Diff => set::binop_rule,
            BinOp::Subseteq => set::subseteq_rule,
        },

        ExprKind::SetEnum(_) => set::enum_rule,
        ExprKind::Range { .. } => set::range_rule,
        ExprKind::SeqEnum(_) => tuple::seq_rule,
        ExprKind::Tuple(_) => tuple::tuple_rule,
        ExprKind::Proj { .. } => tuple::proj_rule,
        ExprKind::Record(_) => record::record_rule,
        ExprKind::Field { .. } => record::field_rule,
        ExprKind::Variant { .. } => record::variant_rule,

        ExprKind::FunCtor { .. } => fun::ctor_rule,
        ExprKind::App { .. } => fun::app_rule,
        ExprKind::Dom(_) => fun::dom_rule,

        ExprKind::If { .. } => control::if_rule,
        ExprKind::Let { .. } => control::let_rule,
        ExprKind::Forall { .. } | ExprKind::Exists { .. } => control::quant_rule,
    })
}

/// Allocate a solver-visible cell into the state's arena.
pub(crate) fn alloc(
    rw: &mut Rewriter<'_>,
    state: &mut SymbState,
    ty: Type,
) -> EncodeResult<CellId> {
    let arena = std::mem::take(&mut state.arena);
    let (arena, cell) = rw.alloc_cell(arena, ty)?;
    state.arena = arena;
    Ok(cell)
}

/// Allocate a bookkeeping-only cell: no solver term is ever declared.
pub(crate) fn alloc_no_smt(state: &mut SymbState, ty: Type) -> CellId {
    let arena = std::mem::take(&mut state.arena);
    let (arena, cell) = arena.alloc(ty);
    state.arena = arena;
    cell
}

/// Append `has` edges into the state's arena.
pub(crate) fn wire_has(
    state: &mut SymbState,
    cell: CellId,
    children: &[CellId],
) -> EncodeResult<()> {
    let arena = std::mem::take(&mut state.arena);
    state.arena = arena.append_has(cell, children)?;
    Ok(())
}

/// Append bookkeeping-only `has` edges into the state's arena.
pub(crate) fn wire_has_no_smt(
    state: &mut SymbState,
    cell: CellId,
    children: &[CellId],
) -> EncodeResult<()> {
    let arena = std::mem::take(&mut state.arena);
    state.arena = arena.append_has_no_smt(cell, children)?;
    Ok(())
}
