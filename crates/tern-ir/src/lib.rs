//! Typed expression tree for Tern.
//!
//! The front-end parses and type-checks specification source into this
//! representation; the symbolic engine rewrites it into cell references.
//! `CellId` lives here because a fully rewritten expression is nothing
//! but a bare cell reference.

pub mod expr;

pub use expr::{BinOp, CellId, Expr, ExprKind, UnaryOp};
