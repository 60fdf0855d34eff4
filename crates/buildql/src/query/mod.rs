//! Lexer, parser and AST for the field-query language.
//!
//! A query is a boolean expression over record fields:
//!
//! ```text
//! (xp == 0 | xp == 2) & cost < 3
//! name = /^the/ | trait ? ["spell", "ritual"]
//! health + sanity > 10
//! ```
//!
//! # Operators
//!
//! - `&`, `|` - logical AND / OR
//! - `==`, `!==` - strict equality / inequality
//! - `=`, `!=` - loose equality / inequality
//! - `??`, `!??` - strict membership in a list
//! - `?`, `!?` - loose membership in a list
//! - `>`, `<`, `>=`, `<=` - numeric ordering
//! - `+`, `-`, `*`, `/`, `%` - arithmetic inside comparisons
//! - `()` - grouping
//!
//! # Operands
//!
//! Field identifiers (`xp`, `back:name`), numbers, quoted strings, `true` /
//! `false`, regex literals (`/pattern/`) and lists (`[a, b, c]`).

mod ast;
mod lexer;
mod parser;

pub use ast::{BinaryOp, Expr, Literal};
pub use lexer::{Lexer, LexerError, LexerErrorKind, LexerResult, PositionedToken, QueryToken};
pub use parser::{QueryParser, MAX_NESTING_DEPTH};

/// Parses a query string. Shorthand for [`QueryParser::parse`].
pub fn parse(input: &str) -> crate::QueryResult<Expr> {
    QueryParser::parse(input)
}

#[cfg(test)]
mod tests;
