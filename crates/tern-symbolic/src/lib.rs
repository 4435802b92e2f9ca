//! Symbolic rewriting engine for Tern.
//!
//! Translates typed specification expressions into quantifier-free Z3
//! constraints. Expressions are rewritten construct by construct into
//! typed symbolic values ("cells") held in an append-only arena; each
//! rewriting rule allocates result cells and asserts the constraints
//! relating them to their constituents. The engine only asserts:
//! satisfiability checking and model extraction belong to the caller.

pub mod arena;
mod eq;
pub mod rewriter;
mod rules;
mod sorts;
pub mod state;

pub use arena::Arena;
pub use rewriter::Rewriter;
pub use state::{Binding, SymbState};

use thiserror::Error;
use z3::{Params, Solver};

/// Encoding error.
///
/// None of these are retried: a failure aborts the encoding of the
/// current top-level expression and is reported upward. There is no
/// partial success.
#[derive(Debug, Error)]
pub enum EncodeError {
    /// No rewriting rule is registered for this construct/type combination.
    #[error("cannot encode construct: {0}")]
    Unsupported(String),

    /// A programming contract was violated (bad edge access, sort misuse,
    /// malformed binder). Indicates a defect, not a user error.
    #[error("encoding contract violated: {0}")]
    Contract(String),

    /// A name had no binding at the point of use.
    #[error("unbound name: {0}")]
    Unbound(String),
}

pub type EncodeResult<T> = Result<T, EncodeError>;

/// Arm a session-level solver timeout. The engine itself never checks
/// satisfiability; this is for the orchestration layer that does.
pub fn apply_solver_timeout(solver: &Solver, timeout_ms: Option<u64>) {
    if let Some(ms) = timeout_ms {
        let mut params = Params::new();
        params.set_u32("timeout", ms.min(u32::MAX as u64) as u32);
        solver.set_params(&params);
    }
}
