//! Symbolic state: the value triple threaded through every rule.

use tern_ir::{CellId, Expr, ExprKind};

use crate::arena::Arena;
use crate::{EncodeError, EncodeResult};

/// Ordered name-to-cell environment. Entering a construct with a bound
/// variable pushes one binding; it is popped once that construct's
/// encoding is complete. Lookup finds the innermost binding.
#[derive(Debug, Clone, Default)]
pub struct Binding {
    entries: Vec<(String, CellId)>,
}

impl Binding {
    /// Create an empty binding environment.
    pub fn new() -> Self {
        Self::default()
    }

    /// Push a binding for a bound variable.
    pub fn push(&mut self, name: impl Into<String>, cell: CellId) {
        self.entries.push((name.into(), cell));
    }

    /// Pop the most recent binding.
    pub fn pop(&mut self) {
        self.entries.pop();
    }

    /// Resolve a name to its innermost bound cell.
    pub fn lookup(&self, name: &str) -> Option<CellId> {
        self.entries
            .iter()
            .rev()
            .find(|(n, _)| n == name)
            .map(|&(_, cell)| cell)
    }

    /// Number of active bindings.
    pub fn depth(&self) -> usize {
        self.entries.len()
    }
}

/// A symbolic state: arena, binding environment, and the expression
/// currently being rewritten. Treated as a value: rewriting produces a
/// new state and never mutates a previously returned one.
#[derive(Debug, Clone)]
pub struct SymbState {
    pub arena: Arena,
    pub binding: Binding,
    pub expr: Expr,
}

impl SymbState {
    /// Start a state from a fresh arena and an expression to rewrite.
    pub fn new(expr: Expr) -> Self {
        Self {
            arena: Arena::new(),
            binding: Binding::new(),
            expr,
        }
    }

    /// Replace the pending expression, keeping arena and binding.
    pub fn with_expr(mut self, expr: Expr) -> Self {
        self.expr = expr;
        self
    }

    /// Replace the pending expression with a bare reference to `cell`.
    pub fn with_cell(mut self, cell: CellId) -> Self {
        let ty = self.arena.cell_type(cell).clone();
        self.expr = Expr::cell(cell, ty);
        self
    }

    /// True once the expression is a bare cell reference.
    pub fn done(&self) -> bool {
        matches!(self.expr.kind, ExprKind::Cell(_))
    }

    /// The result cell of a finished state.
    pub fn expr_cell(&self) -> EncodeResult<CellId> {
        match self.expr.kind {
            ExprKind::Cell(cell) => Ok(cell),
            _ => Err(EncodeError::Contract(format!(
                "rewriting left a pending {}",
                self.expr.kind.describe()
            ))),
        }
    }
}
