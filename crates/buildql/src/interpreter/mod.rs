//! Query compilation and evaluation.
//!
//! An [`Interpreter`] turns a parsed [`Expr`] into a [`Predicate`]. Compiling
//! resolves every identifier through the field registry, checks operand types
//! and compiles regex literals, so a query that compiles can only fail on a
//! record through its data (division by zero, a value that is not a number).
//!
//! # Example
//!
//! ```
//! use buildql::fields::{face_independent, FieldRegistry, FieldType, FieldValue};
//! use buildql::{parse, Interpreter};
//!
//! struct Card {
//!     xp: u32,
//! }
//!
//! let registry = FieldRegistry::<Card, ()>::builder()
//!     .register(
//!         "xp",
//!         FieldType::Number,
//!         face_independent(|card: &Card, _: &(), _| FieldValue::from(card.xp)),
//!     )
//!     .build()
//!     .unwrap();
//!
//! let expr = parse("xp ?? [1, 3, 5]").unwrap();
//! let predicate = Interpreter::new(&registry, &()).evaluate(&expr).unwrap();
//!
//! assert!(predicate.matches(&Card { xp: 3 }).unwrap());
//! assert!(!predicate.matches(&Card { xp: 2 }).unwrap());
//! ```

mod compare;

use std::fmt;
use std::sync::Arc;

use regex::{Regex, RegexBuilder};

use crate::error::{QueryError, QueryResult};
use crate::fields::{ComparisonContext, FieldDescriptor, FieldRegistry, FieldType, FieldValue, Operand};
use crate::fuzzy::NeedleCache;
use crate::query::{BinaryOp, Expr, Literal};

use compare::{Matcher, Side};

pub use compare::to_number;

/// Compiles expressions against a field registry and a resolution context.
pub struct Interpreter<'r, 'c, R, C> {
    registry: &'r FieldRegistry<R, C>,
    context: &'c C,
    needles: Arc<NeedleCache>,
}

impl<'r, 'c, R, C> Interpreter<'r, 'c, R, C> {
    /// Creates an interpreter with its own needle cache.
    pub fn new(registry: &'r FieldRegistry<R, C>, context: &'c C) -> Self {
        Self {
            registry,
            context,
            needles: Arc::new(NeedleCache::default()),
        }
    }

    /// Shares an existing needle cache with the predicates this interpreter builds.
    pub fn with_needle_cache(mut self, needles: Arc<NeedleCache>) -> Self {
        self.needles = needles;
        self
    }

    /// Compiles an expression into a predicate.
    ///
    /// # Errors
    ///
    /// - `QueryError::UnknownField` if an identifier is not registered
    /// - `QueryError::TypeMismatch` if two fields of different types share an operator
    /// - `QueryError::InvalidRegex` if a regex literal does not compile
    /// - `QueryError::InvalidNodeUsage` if a list, regex or arithmetic
    ///   expression is used as a condition, or a containment operator has no list
    /// - `QueryError::DivisionByZero` for `/ 0` or `% 0` written in the query
    pub fn evaluate(&self, expr: &Expr) -> QueryResult<Predicate<'c, R, C>> {
        let root = self.compile_node(expr)?;
        tracing::debug!(root = expr.kind(), "compiled query");

        Ok(Predicate {
            root,
            context: self.context,
            needles: Arc::clone(&self.needles),
        })
    }

    fn compile_node(&self, expr: &Expr) -> QueryResult<Node<R, C>> {
        match expr {
            Expr::Group(inner) => self.compile_node(inner),

            Expr::Binary { op, left, right } if op.is_logical() => Ok(Node::Logical {
                op: *op,
                left: Box::new(self.compile_node(left)?),
                right: Box::new(self.compile_node(right)?),
            }),

            Expr::Binary { op, left, right } if op.is_comparison() => {
                self.compile_comparison(*op, left, right)
            }

            Expr::Binary { op, .. } => Err(QueryError::invalid_node(format!(
                "arithmetic '{}' cannot be used as a condition; compare its result with a value",
                op
            ))),

            Expr::Identifier(_) | Expr::Literal(_) => Ok(Node::Truthy(self.compile_term(expr)?)),

            Expr::List(_) => Err(QueryError::invalid_node(
                "lists cannot be evaluated as boolean",
            )),

            Expr::Regex(pattern) => Err(QueryError::invalid_node(format!(
                "regex /{}/ cannot be evaluated as boolean",
                pattern
            ))),
        }
    }

    fn compile_comparison(&self, op: BinaryOp, left: &Expr, right: &Expr) -> QueryResult<Node<R, C>> {
        let field_type = self.governing_type(left, right)?;
        let left = self.compile_term(left)?;

        let right = if op.is_containment() {
            match right.ungrouped() {
                Expr::List(elements) => Term::List(
                    elements
                        .iter()
                        .map(|element| self.compile_term(element))
                        .collect::<QueryResult<_>>()?,
                ),
                other => {
                    return Err(QueryError::invalid_node(format!(
                        "operator '{}' expects a list, found {}",
                        op,
                        other.kind()
                    )))
                }
            }
        } else {
            self.compile_term(right)?
        };

        Ok(Node::Compare {
            op,
            field_type,
            left,
            right,
        })
    }

    /// Compiles an operand of a comparison or arithmetic expression.
    fn compile_term(&self, expr: &Expr) -> QueryResult<Term<R, C>> {
        match expr {
            Expr::Group(inner) => self.compile_term(inner),

            Expr::Identifier(name) => Ok(Term::Field(Arc::clone(self.registry.resolve(name)?))),

            Expr::Literal(literal) => Ok(Term::Value(literal_value(literal))),

            Expr::Regex(pattern) => compile_regex(pattern).map(Term::Pattern),

            Expr::Binary { op, left, right } if op.is_arithmetic() => {
                self.governing_type(left, right)?;
                let left = self.compile_term(left)?;
                let right = self.compile_term(right)?;

                if matches!(op, BinaryOp::Div | BinaryOp::Rem) && right.is_literal_zero() {
                    return Err(QueryError::DivisionByZero {
                        operator: compare::operator_name(*op),
                    });
                }

                Ok(Term::Arithmetic {
                    op: *op,
                    left: Box::new(left),
                    right: Box::new(right),
                })
            }

            Expr::Binary { op, .. } => Err(QueryError::invalid_node(format!(
                "'{}' expression cannot be used as a value",
                op
            ))),

            Expr::List(_) => Err(QueryError::invalid_node(
                "lists are only allowed on the right side of ??, !??, ? and !?",
            )),
        }
    }

    /// Checks identifier operands and returns the type that governs the comparison.
    ///
    /// Only direct identifiers carry a type; the left one wins when both do,
    /// and both must then agree.
    fn governing_type(&self, left: &Expr, right: &Expr) -> QueryResult<Option<FieldType>> {
        let left_type = self.identifier_type(left)?;
        let right_type = self.identifier_type(right)?;

        match (left_type, right_type) {
            (Some(left), Some(right)) if left != right => {
                Err(QueryError::TypeMismatch { left, right })
            }
            (left, right) => Ok(left.or(right)),
        }
    }

    fn identifier_type(&self, expr: &Expr) -> QueryResult<Option<FieldType>> {
        match expr {
            Expr::Identifier(name) => Ok(Some(self.registry.resolve(name)?.field_type())),
            _ => Ok(None),
        }
    }
}

impl<R, C> fmt::Debug for Interpreter<'_, '_, R, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Interpreter")
            .field("registry", self.registry)
            .finish_non_exhaustive()
    }
}

fn literal_value(literal: &Literal) -> FieldValue {
    match literal {
        Literal::Number(n) => FieldValue::Number(*n),
        Literal::String(s) => FieldValue::String(s.clone()),
        Literal::Boolean(b) => FieldValue::Bool(*b),
    }
}

/// Compiles a regex literal. Matching is case-insensitive and Unicode-aware.
fn compile_regex(pattern: &str) -> QueryResult<Regex> {
    RegexBuilder::new(pattern)
        .case_insensitive(true)
        .unicode(true)
        .build()
        .map_err(|e| QueryError::InvalidRegex {
            pattern: pattern.to_string(),
            message: e.to_string(),
        })
}

/// A compiled condition.
enum Node<R, C> {
    Logical {
        op: BinaryOp,
        left: Box<Node<R, C>>,
        right: Box<Node<R, C>>,
    },
    Compare {
        op: BinaryOp,
        field_type: Option<FieldType>,
        left: Term<R, C>,
        right: Term<R, C>,
    },
    /// A bare field or literal used as a condition.
    Truthy(Term<R, C>),
}

/// A compiled operand.
enum Term<R, C> {
    Value(FieldValue),
    Pattern(Regex),
    Field(Arc<FieldDescriptor<R, C>>),
    Arithmetic {
        op: BinaryOp,
        left: Box<Term<R, C>>,
        right: Box<Term<R, C>>,
    },
    List(Vec<Term<R, C>>),
}

impl<R, C> Term<R, C> {
    fn is_literal_zero(&self) -> bool {
        matches!(self, Term::Value(FieldValue::Number(n)) if *n == 0.0)
    }
}

/// A query compiled against a resolution context.
///
/// A predicate holds no per-record state. It is `Send + Sync` whenever the
/// context is `Sync`, so records can be matched from several threads at once.
pub struct Predicate<'c, R, C> {
    root: Node<R, C>,
    context: &'c C,
    needles: Arc<NeedleCache>,
}

impl<'c, R, C> Predicate<'c, R, C> {
    /// Returns true if the record satisfies the query.
    ///
    /// # Errors
    ///
    /// Returns `QueryError::DivisionByZero` or `QueryError::Coercion` when the
    /// record's data makes an arithmetic or ordering operand invalid.
    pub fn matches(&self, record: &R) -> QueryResult<bool> {
        self.eval_node(&self.root, record)
    }

    /// Returns the records that satisfy the query, in order.
    ///
    /// # Errors
    ///
    /// Stops at the first record whose evaluation fails.
    pub fn filter<'b>(&self, records: &'b [R]) -> QueryResult<Vec<&'b R>> {
        let mut matched = Vec::new();
        for record in records {
            if self.matches(record)? {
                matched.push(record);
            }
        }
        Ok(matched)
    }

    /// Borrows the predicate as a plain closure.
    pub fn as_fn(&self) -> impl Fn(&R) -> QueryResult<bool> + '_ {
        move |record| self.matches(record)
    }

    fn eval_node(&self, node: &Node<R, C>, record: &R) -> QueryResult<bool> {
        match node {
            Node::Logical { op, left, right } => match op {
                BinaryOp::And => Ok(self.eval_node(left, record)? && self.eval_node(right, record)?),
                _ => Ok(self.eval_node(left, record)? || self.eval_node(right, record)?),
            },

            Node::Truthy(term) => {
                let operand = self.resolve(term, record, None)?;
                Ok(operand.as_value().is_some_and(FieldValue::is_truthy))
            }

            Node::Compare {
                op,
                field_type,
                left,
                right,
            } => self.eval_comparison(*op, *field_type, left, right, record),
        }
    }

    fn eval_comparison(
        &self,
        op: BinaryOp,
        field_type: Option<FieldType>,
        left: &Term<R, C>,
        right: &Term<R, C>,
        record: &R,
    ) -> QueryResult<bool> {
        let matcher = Matcher::new(op.is_strict(), field_type, &self.needles);

        if op.is_containment() {
            let list = self.resolve(right, record, None)?;
            let comparison = ComparisonContext {
                operator: op,
                other: &list,
            };
            let left = self.resolve(left, record, Some(&comparison))?;

            return Ok(if op.is_negated() {
                matcher.not_contains(Side::from(&left), Side::from(&list))
            } else {
                matcher.equals(Side::from(&left), Side::from(&list))
            });
        }

        // Both sides see each other: the right with the first-pass left, then
        // the left again with the resolved right.
        let first_pass = self.resolve(left, record, None)?;
        let right = self.resolve(
            right,
            record,
            Some(&ComparisonContext {
                operator: op,
                other: &first_pass,
            }),
        )?;
        let left = self.resolve(
            left,
            record,
            Some(&ComparisonContext {
                operator: op,
                other: &right,
            }),
        )?;

        if op.is_ordering() {
            return compare::ordering(op, Side::from(&left), Side::from(&right));
        }

        Ok(if op.is_negated() {
            matcher.not_equals(Side::from(&left), Side::from(&right))
        } else {
            matcher.equals(Side::from(&left), Side::from(&right))
        })
    }

    fn resolve(
        &self,
        term: &Term<R, C>,
        record: &R,
        comparison: Option<&ComparisonContext<'_>>,
    ) -> QueryResult<Operand> {
        match term {
            Term::Value(value) => Ok(Operand::Value(value.clone())),
            Term::Pattern(regex) => Ok(Operand::Pattern(regex.clone())),
            Term::Field(descriptor) => Ok(Operand::Value(descriptor.lookup(
                record,
                self.context,
                comparison,
            ))),
            Term::Arithmetic { op, left, right } => {
                let left = self.resolve(left, record, None)?;
                let right = self.resolve(right, record, None)?;
                compare::arithmetic(*op, Side::from(&left), Side::from(&right)).map(Operand::Value)
            }
            Term::List(elements) => elements
                .iter()
                .map(|element| self.resolve(element, record, None))
                .collect::<QueryResult<Vec<_>>>()
                .map(Operand::List),
        }
    }
}

impl<R, C> fmt::Debug for Predicate<'_, R, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Predicate")
            .field("needles", &self.needles)
            .finish_non_exhaustive()
    }
}
