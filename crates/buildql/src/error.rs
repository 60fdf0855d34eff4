//! Error types for parsing, compiling and evaluating queries.

use thiserror::Error;

use crate::fields::FieldType;

/// A specialized Result type for query operations.
pub type QueryResult<T> = Result<T, QueryError>;

/// Errors that can occur while parsing, compiling or evaluating a query.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum QueryError {
    /// The query text is malformed.
    #[error("syntax error at position {position}: {message}")]
    Syntax {
        /// What went wrong.
        message: String,
        /// Byte offset of the offending token or character.
        position: usize,
    },

    /// An identifier does not name a registered field.
    #[error("unknown field: {name}{}", suggestion_suffix(.suggestion))]
    UnknownField {
        /// The identifier as written in the query.
        name: String,
        /// A close registered name, if any.
        suggestion: Option<String>,
    },

    /// Two fields of different types were combined in one binary expression.
    #[error("type mismatch: cannot compare {left} field with {right} field")]
    TypeMismatch {
        /// Type of the left-hand field.
        left: FieldType,
        /// Type of the right-hand field.
        right: FieldType,
    },

    /// A value could not be converted to a number.
    #[error("cannot convert {value} to number")]
    Coercion {
        /// Description of the offending value.
        value: String,
    },

    /// Division or modulo by zero.
    #[error("{operator} by zero")]
    DivisionByZero {
        /// "division" or "modulo".
        operator: &'static str,
    },

    /// A node was used somewhere it cannot be evaluated.
    #[error("{message}")]
    InvalidNodeUsage {
        /// Description of the misuse.
        message: String,
    },

    /// A regex literal failed to compile.
    #[error("invalid regex /{pattern}/: {message}")]
    InvalidRegex {
        /// The pattern as written.
        pattern: String,
        /// The regex engine's complaint.
        message: String,
    },

    /// A field name or alias was registered twice.
    #[error("field registered twice: {name}")]
    DuplicateField {
        /// The duplicated name.
        name: String,
    },
}

fn suggestion_suffix(suggestion: &Option<String>) -> String {
    match suggestion {
        Some(s) => format!(" (did you mean '{}'?)", s),
        None => String::new(),
    }
}

impl QueryError {
    /// Creates a syntax error at the given byte position.
    pub fn syntax(message: impl Into<String>, position: usize) -> Self {
        QueryError::Syntax {
            message: message.into(),
            position,
        }
    }

    /// Creates an unknown field error.
    pub fn unknown_field(name: impl Into<String>, suggestion: Option<String>) -> Self {
        QueryError::UnknownField {
            name: name.into(),
            suggestion,
        }
    }

    /// Creates a coercion error.
    pub fn coercion(value: impl Into<String>) -> Self {
        QueryError::Coercion {
            value: value.into(),
        }
    }

    /// Creates an invalid node usage error.
    pub fn invalid_node(message: impl Into<String>) -> Self {
        QueryError::InvalidNodeUsage {
            message: message.into(),
        }
    }

    /// Returns true if the error condemns the query as a whole rather than
    /// a single record.
    ///
    /// Division by zero and coercion failures can depend on record data; every
    /// other error is independent of the record being evaluated.
    pub fn is_query_fatal(&self) -> bool {
        !matches!(
            self,
            QueryError::DivisionByZero { .. } | QueryError::Coercion { .. }
        )
    }
}
