//! Mapping from Tern types to solver sorts and typed term helpers.
//!
//! Only scalars carry a direct solver sort: Bool maps to the Bool sort,
//! Int to Int, and strings and named constants are interned to Int ids.
//! Collections are structural: a set or record cell has no term of its
//! own, only membership flags and child cells. Function cells are the
//! exception: they are represented as constant arrays over the argument
//! sort (see the function construction rule).

use tern_types::Type;
use z3::ast::{Bool, Dynamic, Int};
use z3::Sort;

use crate::{EncodeError, EncodeResult};

/// The solver sort of a scalar cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) enum ScalarSort {
    Bool,
    Int,
}

/// The scalar sort for a type, if it has one.
pub(crate) fn scalar_sort(ty: &Type) -> Option<ScalarSort> {
    match ty {
        Type::Bool => Some(ScalarSort::Bool),
        Type::Int | Type::Str | Type::Const(_) => Some(ScalarSort::Int),
        _ => None,
    }
}

/// The z3 sort object for a scalar sort.
pub(crate) fn z3_sort(sort: ScalarSort) -> Sort {
    match sort {
        ScalarSort::Bool => Sort::bool(),
        ScalarSort::Int => Sort::int(),
    }
}

/// Declare a fresh constant of the given scalar sort.
pub(crate) fn fresh_const(sort: ScalarSort, name: String) -> Dynamic {
    match sort {
        ScalarSort::Bool => Dynamic::from_ast(&Bool::new_const(name)),
        ScalarSort::Int => Dynamic::from_ast(&Int::new_const(name)),
    }
}

/// Conjunction that tolerates an empty term list (vacuously true).
pub(crate) fn and_all(terms: &[Bool]) -> Bool {
    if terms.is_empty() {
        Bool::from_bool(true)
    } else {
        Bool::and(terms)
    }
}

/// Disjunction that tolerates an empty term list (vacuously false).
pub(crate) fn or_any(terms: &[Bool]) -> Bool {
    if terms.is_empty() {
        Bool::from_bool(false)
    } else {
        Bool::or(terms)
    }
}

/// Equality between two dynamic terms of the same scalar sort.
pub(crate) fn dynamic_eq(a: &Dynamic, b: &Dynamic) -> EncodeResult<Bool> {
    if let (Some(ai), Some(bi)) = (a.as_int(), b.as_int()) {
        Ok(ai.eq(&bi))
    } else if let (Some(ab), Some(bb)) = (a.as_bool(), b.as_bool()) {
        Ok(ab.eq(&bb))
    } else {
        Err(EncodeError::Contract(
            "equality between terms of mismatched sorts".into(),
        ))
    }
}

/// If-then-else over two dynamic terms of the same scalar sort.
pub(crate) fn dynamic_ite(cond: &Bool, then: &Dynamic, els: &Dynamic) -> EncodeResult<Dynamic> {
    if let (Some(ti), Some(ei)) = (then.as_int(), els.as_int()) {
        Ok(Dynamic::from_ast(&cond.ite(&ti, &ei)))
    } else if let (Some(tb), Some(eb)) = (then.as_bool(), els.as_bool()) {
        Ok(Dynamic::from_ast(&cond.ite(&tb, &eb)))
    } else {
        Err(EncodeError::Contract(
            "if-then-else between terms of mismatched sorts".into(),
        ))
    }
}
