//! Abstract Syntax Tree (AST) for query expressions.

use std::fmt;

/// A binary operator.
///
/// Operators fall into five classes, listed from lowest to highest
/// precedence: logical OR, logical AND, comparison, additive and
/// multiplicative.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryOp {
    // ==================== Logical ====================
    /// `&`
    And,
    /// `|`
    Or,

    // ==================== Equality ====================
    /// `==`, strict equality.
    StrictEq,
    /// `!==`, strict inequality.
    StrictNotEq,
    /// `=`, loose equality.
    LooseEq,
    /// `!=`, loose inequality.
    LooseNotEq,

    // ==================== Containment ====================
    /// `??`, strict "any element equals".
    StrictIn,
    /// `!??`
    StrictNotIn,
    /// `?`, loose "any element equals".
    LooseIn,
    /// `!?`
    LooseNotIn,

    // ==================== Ordering ====================
    /// `>`
    Gt,
    /// `<`
    Lt,
    /// `>=`
    Gte,
    /// `<=`
    Lte,

    // ==================== Arithmetic ====================
    /// `+`
    Add,
    /// `-`
    Sub,
    /// `*`
    Mul,
    /// `/`
    Div,
    /// `%`
    Rem,
}

impl BinaryOp {
    /// Returns the operator as written in query text.
    pub fn symbol(self) -> &'static str {
        match self {
            BinaryOp::And => "&",
            BinaryOp::Or => "|",
            BinaryOp::StrictEq => "==",
            BinaryOp::StrictNotEq => "!==",
            BinaryOp::LooseEq => "=",
            BinaryOp::LooseNotEq => "!=",
            BinaryOp::StrictIn => "??",
            BinaryOp::StrictNotIn => "!??",
            BinaryOp::LooseIn => "?",
            BinaryOp::LooseNotIn => "!?",
            BinaryOp::Gt => ">",
            BinaryOp::Lt => "<",
            BinaryOp::Gte => ">=",
            BinaryOp::Lte => "<=",
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Rem => "%",
        }
    }

    /// `&` or `|`.
    pub fn is_logical(self) -> bool {
        matches!(self, BinaryOp::And | BinaryOp::Or)
    }

    /// `==`, `!==`, `=` or `!=`.
    pub fn is_equality(self) -> bool {
        matches!(
            self,
            BinaryOp::StrictEq | BinaryOp::StrictNotEq | BinaryOp::LooseEq | BinaryOp::LooseNotEq
        )
    }

    /// `??`, `!??`, `?` or `!?`. The right operand must be a list.
    pub fn is_containment(self) -> bool {
        matches!(
            self,
            BinaryOp::StrictIn | BinaryOp::StrictNotIn | BinaryOp::LooseIn | BinaryOp::LooseNotIn
        )
    }

    /// `>`, `<`, `>=` or `<=`.
    pub fn is_ordering(self) -> bool {
        matches!(self, BinaryOp::Gt | BinaryOp::Lt | BinaryOp::Gte | BinaryOp::Lte)
    }

    /// Any operator sitting at the comparison precedence level.
    pub fn is_comparison(self) -> bool {
        self.is_equality() || self.is_containment() || self.is_ordering()
    }

    /// `+`, `-`, `*`, `/` or `%`.
    pub fn is_arithmetic(self) -> bool {
        matches!(
            self,
            BinaryOp::Add | BinaryOp::Sub | BinaryOp::Mul | BinaryOp::Div | BinaryOp::Rem
        )
    }

    /// True for the negated equality and containment operators.
    pub fn is_negated(self) -> bool {
        matches!(
            self,
            BinaryOp::StrictNotEq
                | BinaryOp::LooseNotEq
                | BinaryOp::StrictNotIn
                | BinaryOp::LooseNotIn
        )
    }

    /// True for operators that compare strictly (`==`, `!==`, `??`, `!??`).
    pub fn is_strict(self) -> bool {
        matches!(
            self,
            BinaryOp::StrictEq | BinaryOp::StrictNotEq | BinaryOp::StrictIn | BinaryOp::StrictNotIn
        )
    }
}

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// A literal value written in the query.
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    /// A numeric literal.
    Number(f64),
    /// A quoted string.
    String(String),
    /// `true` or `false`.
    Boolean(bool),
}

/// A parsed query expression.
///
/// Produced once per query string by [`QueryParser`](super::QueryParser) and
/// never mutated afterwards.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// A binary operation.
    Binary {
        /// The operator.
        op: BinaryOp,
        /// Left operand.
        left: Box<Expr>,
        /// Right operand.
        right: Box<Expr>,
    },

    /// A parenthesized sub-expression.
    Group(Box<Expr>),

    /// A field reference, resolved through the field registry.
    Identifier(String),

    /// A literal value.
    Literal(Literal),

    /// A regex literal (`/pattern/`), matched case-insensitively.
    Regex(String),

    /// A bracketed list, only valid as the right operand of a containment operator.
    List(Vec<Expr>),
}

impl Expr {
    /// Creates a binary expression.
    ///
    /// # Example
    ///
    /// ```
    /// use buildql::query::{BinaryOp, Expr};
    ///
    /// let expr = Expr::binary(BinaryOp::Gt, Expr::ident("xp"), Expr::number(0.0));
    /// assert!(matches!(expr, Expr::Binary { op: BinaryOp::Gt, .. }));
    /// ```
    pub fn binary(op: BinaryOp, left: Expr, right: Expr) -> Self {
        Expr::Binary {
            op,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    /// Creates a group around an expression.
    pub fn group(inner: Expr) -> Self {
        Expr::Group(Box::new(inner))
    }

    /// Creates an identifier.
    pub fn ident(name: impl Into<String>) -> Self {
        Expr::Identifier(name.into())
    }

    /// Creates a numeric literal.
    pub fn number(value: f64) -> Self {
        Expr::Literal(Literal::Number(value))
    }

    /// Creates a string literal.
    pub fn string(value: impl Into<String>) -> Self {
        Expr::Literal(Literal::String(value.into()))
    }

    /// Creates a boolean literal.
    pub fn boolean(value: bool) -> Self {
        Expr::Literal(Literal::Boolean(value))
    }

    /// Creates a regex literal.
    pub fn regex(pattern: impl Into<String>) -> Self {
        Expr::Regex(pattern.into())
    }

    /// Creates a list.
    pub fn list(elements: Vec<Expr>) -> Self {
        Expr::List(elements)
    }

    /// Returns the node with any enclosing groups removed.
    pub fn ungrouped(&self) -> &Expr {
        match self {
            Expr::Group(inner) => inner.ungrouped(),
            other => other,
        }
    }

    /// Height of the expression tree. Leaves have depth 1.
    pub fn depth(&self) -> usize {
        match self {
            Expr::Binary { left, right, .. } => 1 + left.depth().max(right.depth()),
            Expr::Group(inner) => 1 + inner.depth(),
            Expr::List(elements) => 1 + elements.iter().map(Expr::depth).max().unwrap_or(0),
            Expr::Identifier(_) | Expr::Literal(_) | Expr::Regex(_) => 1,
        }
    }

    /// Short name of the node kind, used in error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Expr::Binary { .. } => "binary expression",
            Expr::Group(_) => "group",
            Expr::Identifier(_) => "identifier",
            Expr::Literal(_) => "literal",
            Expr::Regex(_) => "regex",
            Expr::List(_) => "list",
        }
    }
}
