//! Internal algebraic types: scalars, collections, and row types.

use std::collections::BTreeMap;
use std::fmt;

use tracing::warn;

/// A Tern type.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Type {
    /// Boolean type.
    Bool,
    /// Integer type.
    Int,
    /// String type.
    Str,
    /// Named uninterpreted constant type (a model-level parameter sort).
    Const(String),
    /// Type variable, scoped to a single conversion (see [`TypeVarCtx`]).
    Var(TypeVar),
    /// Set type `Set[T]`.
    Set(Box<Type>),
    /// Sequence type `Seq[T]`.
    Seq(Box<Type>),
    /// Function type `T -> U`.
    Fun(Box<Type>, Box<Type>),
    /// Operator type: argument list to result. Operators are inlined
    /// before encoding, so the engine only ever sees this at interfaces.
    Oper(Vec<Type>, Box<Type>),
    /// Tuple type `(T1, T2, ...)`.
    Tuple(Vec<Type>),
    /// Record type as a row of named fields.
    Record(Row),
    /// Variant type as a row of tagged alternatives.
    Variant(Row),
}

impl Type {
    /// Check if this type maps to a single solver sort (Bool or Int;
    /// strings and named constants are interned to Int).
    pub fn is_scalar(&self) -> bool {
        matches!(self, Type::Bool | Type::Int | Type::Str | Type::Const(_))
    }

    /// Check if this is a collection type (Set, Seq, or Fun).
    pub fn is_collection(&self) -> bool {
        matches!(self, Type::Set(_) | Type::Seq(_) | Type::Fun(_, _))
    }

    /// Check if this type contains any type variables.
    pub fn has_vars(&self) -> bool {
        match self {
            Type::Var(_) => true,
            Type::Set(t) | Type::Seq(t) => t.has_vars(),
            Type::Fun(a, r) => a.has_vars() || r.has_vars(),
            Type::Oper(args, r) => args.iter().any(|t| t.has_vars()) || r.has_vars(),
            Type::Tuple(elems) => elems.iter().any(|t| t.has_vars()),
            Type::Record(row) | Type::Variant(row) => {
                row.tail.is_some() || row.fields.values().any(|t| t.has_vars())
            }
            _ => false,
        }
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Bool => write!(f, "Bool"),
            Type::Int => write!(f, "Int"),
            Type::Str => write!(f, "Str"),
            Type::Const(name) => write!(f, "{}", name),
            Type::Var(v) => write!(f, "{}", v),
            Type::Set(t) => write!(f, "Set[{}]", t),
            Type::Seq(t) => write!(f, "Seq[{}]", t),
            Type::Fun(a, r) => write!(f, "({} -> {})", a, r),
            Type::Oper(args, r) => {
                write!(f, "(")?;
                for (i, ty) in args.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", ty)?;
                }
                write!(f, ") => {}", r)
            }
            Type::Tuple(elems) => {
                write!(f, "<<")?;
                for (i, ty) in elems.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", ty)?;
                }
                write!(f, ">>")
            }
            Type::Record(row) => write!(f, "{{ {} }}", row),
            Type::Variant(row) => write!(f, "[ {} ]", row),
        }
    }
}

/// A row: an ordered field map with an optional open tail variable
/// standing for additional fields of unknown arity.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Row {
    /// Field names to types, in canonical (sorted) order.
    pub fields: BTreeMap<String, Type>,
    /// Open tail variable, if the row is open.
    pub tail: Option<TypeVar>,
}

impl Row {
    /// Create a closed row from field definitions.
    pub fn closed(fields: impl IntoIterator<Item = (String, Type)>) -> Self {
        Self {
            fields: fields.into_iter().collect(),
            tail: None,
        }
    }

    /// Create an open row with the given tail variable.
    pub fn open(fields: impl IntoIterator<Item = (String, Type)>, tail: TypeVar) -> Self {
        Self {
            fields: fields.into_iter().collect(),
            tail: Some(tail),
        }
    }

    /// Get the type of a field.
    pub fn get(&self, name: &str) -> Option<&Type> {
        self.fields.get(name)
    }

    /// The field list in canonical order, closing an open tail.
    ///
    /// An open tail cannot be flattened into a fixed cell layout, so it is
    /// treated as closed here. This is a deliberate approximation carried
    /// over from the source semantics; the warning marks the spot.
    pub fn closed_fields(&self) -> Vec<(&str, &Type)> {
        if let Some(tail) = self.tail {
            warn!(%tail, "open row tail treated as closed during flattening");
        }
        self.fields.iter().map(|(k, v)| (k.as_str(), v)).collect()
    }
}

impl fmt::Display for Row {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (name, ty)) in self.fields.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}: {}", name, ty)?;
        }
        if let Some(tail) = self.tail {
            write!(f, " | {}", tail)?;
        }
        Ok(())
    }
}

/// A type variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeVar(pub u32);

impl fmt::Display for TypeVar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "?{}", self.0)
    }
}

/// Fresh type-variable numbering, scoped to one top-level conversion.
///
/// Created per conversion call so independent conversions never share
/// variable names; never stored as ambient global state.
#[derive(Debug, Default)]
pub struct TypeVarCtx {
    next_id: u32,
}

impl TypeVarCtx {
    /// Create a new context for one conversion.
    pub fn new() -> Self {
        Self { next_id: 0 }
    }

    /// Generate a fresh type variable.
    pub fn fresh(&mut self) -> TypeVar {
        let var = TypeVar(self.next_id);
        self.next_id += 1;
        var
    }
}
