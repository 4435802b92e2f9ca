//! Expression nodes, each annotated with its type.

use std::fmt;

use tern_types::Type;

/// Identifier of a symbolic cell.
///
/// Identity is positional: each arena lineage hands out strictly
/// increasing ids, and an id is never reused for a different type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CellId(u32);

impl CellId {
    /// Build a cell id from its position in the arena.
    pub fn from_index(index: usize) -> Self {
        Self(index as u32)
    }

    /// Position of this cell in the arena.
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for CellId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "c{}", self.0)
    }
}

/// A typed expression.
#[derive(Debug, Clone, PartialEq)]
pub struct Expr {
    /// The construct.
    pub kind: ExprKind,
    /// Type assigned by the front-end; the engine does not re-validate it.
    pub ty: Type,
}

impl Expr {
    /// Build an expression from a construct and its type.
    pub fn new(kind: ExprKind, ty: Type) -> Self {
        Self { kind, ty }
    }

    /// Boolean literal.
    pub fn bool(b: bool) -> Self {
        Self::new(ExprKind::Bool(b), Type::Bool)
    }

    /// Integer literal.
    pub fn int(n: i64) -> Self {
        Self::new(ExprKind::Int(n), Type::Int)
    }

    /// String literal.
    pub fn str(s: impl Into<String>) -> Self {
        Self::new(ExprKind::Str(s.into()), Type::Str)
    }

    /// Name reference with the given type.
    pub fn name(name: impl Into<String>, ty: Type) -> Self {
        Self::new(ExprKind::Name(name.into()), ty)
    }

    /// Bare cell reference with the given type.
    pub fn cell(cell: CellId, ty: Type) -> Self {
        Self::new(ExprKind::Cell(cell), ty)
    }

    /// Binary operation with the given result type.
    pub fn binary(op: BinOp, left: Expr, right: Expr, ty: Type) -> Self {
        Self::new(
            ExprKind::Binary {
                op,
                left: Box::new(left),
                right: Box::new(right),
            },
            ty,
        )
    }

    /// Unary operation with the given result type.
    pub fn unary(op: UnaryOp, operand: Expr, ty: Type) -> Self {
        Self::new(
            ExprKind::Unary {
                op,
                operand: Box::new(operand),
            },
            ty,
        )
    }
}

/// An expression construct.
#[derive(Debug, Clone, PartialEq)]
pub enum ExprKind {
    // === Literals ===
    /// Boolean literal.
    Bool(bool),
    /// Integer literal.
    Int(i64),
    /// String literal.
    Str(String),

    // === References ===
    /// Free or bound name, resolved through the binding.
    Name(String),
    /// Reference to an already-rewritten cell. Terminal for the rewriter.
    Cell(CellId),

    // === Operations ===
    /// Binary operation.
    Binary {
        op: BinOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    /// Unary operation.
    Unary { op: UnaryOp, operand: Box<Expr> },

    // === Collections ===
    /// Set enumeration `{e1, ..., en}`.
    SetEnum(Vec<Expr>),
    /// Integer interval `lo..hi` (as a set).
    Range { lo: Box<Expr>, hi: Box<Expr> },
    /// Sequence enumeration `<<e1, ..., en>>` typed as a sequence.
    SeqEnum(Vec<Expr>),
    /// Tuple constructor.
    Tuple(Vec<Expr>),
    /// Record constructor with named fields.
    Record(Vec<(String, Expr)>),
    /// Variant constructor tagging a payload with a discriminant label.
    Variant { tag: String, value: Box<Expr> },

    // === Functions ===
    /// Function constructor `[x \in S |-> e]`.
    FunCtor {
        var: String,
        domain: Box<Expr>,
        body: Box<Expr>,
    },
    /// Function application `f[x]`.
    App { fun: Box<Expr>, arg: Box<Expr> },
    /// Domain query `DOMAIN f`.
    Dom(Box<Expr>),

    // === Access ===
    /// Record field access.
    Field { base: Box<Expr>, field: String },
    /// Tuple projection (zero-based index, fixed by the front-end).
    Proj { base: Box<Expr>, index: usize },

    // === Control ===
    /// Conditional.
    If {
        cond: Box<Expr>,
        then_branch: Box<Expr>,
        else_branch: Box<Expr>,
    },
    /// Let binding.
    Let {
        name: String,
        value: Box<Expr>,
        body: Box<Expr>,
    },

    // === Quantifiers ===
    /// Universal quantifier over a set.
    Forall {
        var: String,
        domain: Box<Expr>,
        body: Box<Expr>,
    },
    /// Existential quantifier over a set.
    Exists {
        var: String,
        domain: Box<Expr>,
        body: Box<Expr>,
    },
}

impl ExprKind {
    /// Short construct name, used in diagnostics.
    pub fn describe(&self) -> &'static str {
        match self {
            ExprKind::Bool(_) => "boolean literal",
            ExprKind::Int(_) => "integer literal",
            ExprKind::Str(_) => "string literal",
            ExprKind::Name(_) => "name",
            ExprKind::Cell(_) => "cell reference",
            ExprKind::Binary { op, .. } => op.describe(),
            ExprKind::Unary { op, .. } => op.describe(),
            ExprKind::SetEnum(_) => "set enumeration",
            ExprKind::Range { .. } => "integer range",
            ExprKind::SeqEnum(_) => "sequence enumeration",
            ExprKind::Tuple(_) => "tuple constructor",
            ExprKind::Record(_) => "record constructor",
            ExprKind::Variant { .. } => "variant constructor",
            ExprKind::FunCtor { .. } => "function constructor",
            ExprKind::App { .. } => "function application",
            ExprKind::Dom(_) => "domain query",
            ExprKind::Field { .. } => "field access",
            ExprKind::Proj { .. } => "tuple projection",
            ExprKind::If { .. } => "conditional",
            ExprKind::Let { .. } => "let binding",
            ExprKind::Forall { .. } => "universal quantifier",
            ExprKind::Exists { .. } => "existential quantifier",
        }
    }
}

/// Binary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    // Logical
    And,
    Or,
    Implies,
    Iff,
    // Comparison
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    // Arithmetic
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    // Sets
    In,
    NotIn,
    Union,
    Intersect,
    Diff,
    Subseteq,
}

impl BinOp {
    /// Short operator name, used in diagnostics.
    pub fn describe(self) -> &'static str {
        match self {
            BinOp::And => "conjunction",
            BinOp::Or => "disjunction",
            BinOp::Implies => "implication",
            BinOp::Iff => "equivalence",
            BinOp::Eq => "equality",
            BinOp::Ne => "inequality",
            BinOp::Lt | BinOp::Le | BinOp::Gt | BinOp::Ge => "comparison",
            BinOp::Add | BinOp::Sub | BinOp::Mul | BinOp::Div | BinOp::Mod => "arithmetic",
            BinOp::In => "set membership",
            BinOp::NotIn => "negated set membership",
            BinOp::Union => "set union",
            BinOp::Intersect => "set intersection",
            BinOp::Diff => "set difference",
            BinOp::Subseteq => "subset test",
        }
    }
}

/// Unary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    /// Logical negation.
    Not,
    /// Arithmetic negation.
    Neg,
}

impl UnaryOp {
    /// Short operator name, used in diagnostics.
    pub fn describe(self) -> &'static str {
        match self {
            UnaryOp::Not => "logical negation",
            UnaryOp::Neg => "arithmetic negation",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cell_id_roundtrip() {
        let id = CellId::from_index(7);
        assert_eq!(id.index(), 7);
        assert_eq!(id.to_string(), "c7");
    }

    #[test]
    fn test_literal_builders() {
        assert_eq!(Expr::int(3).ty, Type::Int);
        assert_eq!(Expr::bool(true).kind, ExprKind::Bool(true));
        assert_eq!(Expr::str("a").ty, Type::Str);
    }

    #[test]
    fn test_describe() {
        let e = Expr::binary(BinOp::In, Expr::int(1), Expr::int(2), Type::Bool);
        assert_eq!(e.kind.describe(), "set membership");
    }
}
