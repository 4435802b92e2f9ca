//! Type representation for the Tern specification language.
//!
//! This crate defines the internal algebraic types the symbolic engine
//! consumes. The translation from source-level type syntax into this
//! representation is owned by the front-end; the engine assumes every
//! expression it receives is already annotated with a well-formed `Type`.

pub mod types;

pub use types::{Row, Type, TypeVar, TypeVarCtx};
