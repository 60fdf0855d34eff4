//! Recursive descent parser for query expressions.

use crate::error::{QueryError, QueryResult};

use super::ast::{BinaryOp, Expr, Literal};
use super::lexer::{Lexer, LexerResult, PositionedToken, QueryToken};

/// Parser for query expressions.
///
/// # Grammar
///
/// ```text
/// expression     ::= or_expr
/// or_expr        ::= and_expr ("|" and_expr)*
/// and_expr       ::= comparison ("&" comparison)*
/// comparison     ::= additive (cmp_op additive | contain_op list)?
/// additive       ::= multiplicative (("+" | "-") multiplicative)*
/// multiplicative ::= primary (("*" | "/" | "%") primary)*
/// primary        ::= number | "-" number | string | boolean | regex
///                  | identifier | "(" expression ")"
/// list           ::= "[" (additive ("," additive)*)? "]"
/// cmp_op         ::= "==" | "!==" | "=" | "!=" | ">" | "<" | ">=" | "<="
/// contain_op     ::= "??" | "!??" | "?" | "!?"
/// ```
///
/// # Operator Precedence (highest to lowest)
///
/// 1. `*`, `/`, `%` - left-associative
/// 2. `+`, `-` - left-associative
/// 3. comparison and containment - non-associative
/// 4. `&` (AND) - left-associative
/// 5. `|` (OR) - left-associative
///
/// Regex literals may only be operands of equality or containment operators,
/// and lists may only follow a containment operator. Expressions nested
/// deeper than [`MAX_NESTING_DEPTH`] are rejected.
///
/// # Example
///
/// ```
/// use buildql::query::{BinaryOp, Expr, QueryParser};
///
/// let expr = QueryParser::parse("xp > 0 & cost < 3").unwrap();
/// assert!(matches!(expr, Expr::Binary { op: BinaryOp::And, .. }));
/// ```
pub struct QueryParser {
    tokens: Vec<PositionedToken>,
    position: usize,
    input_len: usize,
    nesting: usize,
}

/// Deepest expression tree the parser accepts, counting groups and chained
/// operators.
pub const MAX_NESTING_DEPTH: usize = 256;

impl QueryParser {
    /// Parses a query string into an [`Expr`].
    ///
    /// # Errors
    ///
    /// Returns `QueryError::Syntax` for empty input, characters that start no
    /// token, unbalanced brackets, misplaced lists or regexes, chained
    /// comparisons and trailing tokens.
    pub fn parse(input: &str) -> QueryResult<Expr> {
        if input.trim().is_empty() {
            return Err(QueryError::syntax("query is empty", 0));
        }

        let LexerResult { tokens, errors } = Lexer::new(input).tokenize_with_errors();
        if let Some(error) = errors.first() {
            return Err(QueryError::syntax(error.to_string(), error.position));
        }

        let mut parser = Self {
            tokens,
            position: 0,
            input_len: input.len(),
            nesting: 0,
        };
        let expr = parser.parse_expression()?;

        // Check that we consumed all tokens
        if let Some(remaining) = parser.peek() {
            return Err(QueryError::syntax(
                format!("unexpected token '{}'", remaining.token.describe()),
                remaining.position,
            ));
        }

        tracing::debug!(query = input, "parsed query");
        Ok(expr)
    }

    /// Returns the current token without consuming it.
    fn peek(&self) -> Option<&PositionedToken> {
        self.tokens.get(self.position)
    }

    /// Consumes and returns the current token.
    fn advance(&mut self) -> Option<PositionedToken> {
        let token = self.tokens.get(self.position).cloned();
        if token.is_some() {
            self.position += 1;
        }
        token
    }

    /// Checks if the current token matches the expected token.
    fn check(&self, expected: &QueryToken) -> bool {
        self.peek().is_some_and(|t| &t.token == expected)
    }

    /// Byte offset of the current token, or the end of input.
    fn current_position(&self) -> usize {
        self.peek().map_or(self.input_len, |t| t.position)
    }

    /// Joins two operands, rejecting trees deeper than [`MAX_NESTING_DEPTH`].
    fn join(&self, op: BinaryOp, left: Expr, right: Expr, position: usize) -> QueryResult<Expr> {
        let expr = Expr::binary(op, left, right);
        if expr.depth() > MAX_NESTING_DEPTH {
            return Err(too_deep(position));
        }
        Ok(expr)
    }

    /// Parses the top-level expression (OR expression).
    fn parse_expression(&mut self) -> QueryResult<Expr> {
        self.parse_or_expr()
    }

    /// Parses OR expressions: `and_expr ("|" and_expr)*`
    fn parse_or_expr(&mut self) -> QueryResult<Expr> {
        let mut left = self.parse_and_expr()?;

        while self.check(&QueryToken::Or) {
            let position = self.current_position();
            self.advance(); // consume '|'
            let right = self.parse_and_expr()?;
            left = self.join(BinaryOp::Or, left, right, position)?;
        }

        Ok(left)
    }

    /// Parses AND expressions: `comparison ("&" comparison)*`
    fn parse_and_expr(&mut self) -> QueryResult<Expr> {
        let mut left = self.parse_comparison()?;

        while self.check(&QueryToken::And) {
            let position = self.current_position();
            self.advance(); // consume '&'
            let right = self.parse_comparison()?;
            left = self.join(BinaryOp::And, left, right, position)?;
        }

        Ok(left)
    }

    /// Parses a single, non-associative comparison.
    fn parse_comparison(&mut self) -> QueryResult<Expr> {
        let left_position = self.current_position();
        let left = self.parse_additive()?;

        let Some(op) = self.peek_comparison_op() else {
            ensure_not_regex(&left, left_position, "a boolean")?;
            return Ok(left);
        };
        let op_position = self.current_position();
        self.advance(); // consume the operator

        let right_position = self.current_position();
        let right = if op.is_containment() {
            self.parse_list(op)?
        } else {
            self.parse_additive()?
        };

        if op.is_ordering() {
            ensure_not_regex(&left, left_position, "an ordering operand")?;
            ensure_not_regex(&right, right_position, "an ordering operand")?;
        }

        if let Some(next) = self.peek_comparison_op() {
            return Err(QueryError::syntax(
                format!(
                    "comparison operators cannot be chained; join '{}' and '{}' with & or |",
                    op, next
                ),
                self.current_position(),
            ));
        }

        self.join(op, left, right, op_position)
    }

    /// Parses a bracketed list following a containment operator.
    fn parse_list(&mut self, op: BinaryOp) -> QueryResult<Expr> {
        let open_position = self.current_position();
        if !self.check(&QueryToken::OpenBracket) {
            return Err(QueryError::syntax(
                format!("operator '{}' expects a list like [a, b]", op),
                open_position,
            ));
        }
        self.advance(); // consume '['

        let mut elements = Vec::new();
        if self.check(&QueryToken::CloseBracket) {
            self.advance();
            return Ok(Expr::list(elements));
        }

        loop {
            elements.push(self.parse_additive()?);

            match self.advance() {
                Some(PositionedToken {
                    token: QueryToken::Comma,
                    ..
                }) => continue,
                Some(PositionedToken {
                    token: QueryToken::CloseBracket,
                    ..
                }) => break,
                Some(other) => {
                    return Err(QueryError::syntax(
                        format!("expected ',' or ']' but found '{}'", other.token.describe()),
                        other.position,
                    ))
                }
                None => return Err(QueryError::syntax("unclosed list", open_position)),
            }
        }

        Ok(Expr::list(elements))
    }

    /// Parses additive expressions: `multiplicative (("+" | "-") multiplicative)*`
    fn parse_additive(&mut self) -> QueryResult<Expr> {
        let left_position = self.current_position();
        let mut left = self.parse_multiplicative()?;

        while let Some(op) = self.peek_additive_op() {
            ensure_not_regex(&left, left_position, "an arithmetic operand")?;
            let op_position = self.current_position();
            self.advance();
            let right_position = self.current_position();
            let right = self.parse_multiplicative()?;
            ensure_not_regex(&right, right_position, "an arithmetic operand")?;
            left = self.join(op, left, right, op_position)?;
        }

        Ok(left)
    }

    /// Parses multiplicative expressions: `primary (("*" | "/" | "%") primary)*`
    fn parse_multiplicative(&mut self) -> QueryResult<Expr> {
        let left_position = self.current_position();
        let mut left = self.parse_primary()?;

        while let Some(op) = self.peek_multiplicative_op() {
            ensure_not_regex(&left, left_position, "an arithmetic operand")?;
            let op_position = self.current_position();
            self.advance();
            let right_position = self.current_position();
            let right = self.parse_primary()?;
            ensure_not_regex(&right, right_position, "an arithmetic operand")?;
            left = self.join(op, left, right, op_position)?;
        }

        Ok(left)
    }

    /// Parses primary expressions.
    fn parse_primary(&mut self) -> QueryResult<Expr> {
        let Some(PositionedToken { token, position }) = self.advance() else {
            return Err(QueryError::syntax(
                "unexpected end of query",
                self.input_len,
            ));
        };

        match token {
            QueryToken::Number(n) => Ok(Expr::number(n)),
            QueryToken::String(s) => Ok(Expr::string(s)),
            QueryToken::Boolean(b) => Ok(Expr::boolean(b)),
            QueryToken::Regex(pattern) => Ok(Expr::regex(pattern)),
            QueryToken::Identifier(name) => Ok(Expr::ident(name)),

            // Negative number literal
            QueryToken::Minus => match self.advance() {
                Some(PositionedToken {
                    token: QueryToken::Number(n),
                    ..
                }) => Ok(Expr::Literal(Literal::Number(-n))),
                _ => Err(QueryError::syntax("expected a number after '-'", position)),
            },

            // Parenthesized expression
            QueryToken::OpenParen => {
                if self.nesting >= MAX_NESTING_DEPTH {
                    return Err(too_deep(position));
                }
                self.nesting += 1;
                let inner = self.parse_expression();
                self.nesting -= 1;
                let inner = inner?;
                if !self.check(&QueryToken::CloseParen) {
                    return Err(QueryError::syntax("unclosed parenthesis", position));
                }
                self.advance(); // consume ')'
                Ok(Expr::group(inner))
            }

            QueryToken::OpenBracket => Err(QueryError::syntax(
                "lists are only allowed on the right side of ??, !??, ? and !?",
                position,
            )),

            other => Err(QueryError::syntax(
                format!("unexpected token '{}'", other.describe()),
                position,
            )),
        }
    }

    fn peek_comparison_op(&self) -> Option<BinaryOp> {
        let op = match &self.peek()?.token {
            QueryToken::StrictEq => BinaryOp::StrictEq,
            QueryToken::StrictNotEq => BinaryOp::StrictNotEq,
            QueryToken::LooseEq => BinaryOp::LooseEq,
            QueryToken::LooseNotEq => BinaryOp::LooseNotEq,
            QueryToken::StrictIn => BinaryOp::StrictIn,
            QueryToken::StrictNotIn => BinaryOp::StrictNotIn,
            QueryToken::LooseIn => BinaryOp::LooseIn,
            QueryToken::LooseNotIn => BinaryOp::LooseNotIn,
            QueryToken::Gt => BinaryOp::Gt,
            QueryToken::Lt => BinaryOp::Lt,
            QueryToken::Gte => BinaryOp::Gte,
            QueryToken::Lte => BinaryOp::Lte,
            _ => return None,
        };
        Some(op)
    }

    fn peek_additive_op(&self) -> Option<BinaryOp> {
        match self.peek()?.token {
            QueryToken::Plus => Some(BinaryOp::Add),
            QueryToken::Minus => Some(BinaryOp::Sub),
            _ => None,
        }
    }

    fn peek_multiplicative_op(&self) -> Option<BinaryOp> {
        match self.peek()?.token {
            QueryToken::Star => Some(BinaryOp::Mul),
            QueryToken::Slash => Some(BinaryOp::Div),
            QueryToken::Percent => Some(BinaryOp::Rem),
            _ => None,
        }
    }
}

fn too_deep(position: usize) -> QueryError {
    QueryError::syntax(
        format!("query is nested more than {MAX_NESTING_DEPTH} levels deep"),
        position,
    )
}

/// Rejects a regex literal used where it cannot be evaluated.
fn ensure_not_regex(expr: &Expr, position: usize, role: &str) -> QueryResult<()> {
    if let Expr::Regex(pattern) = expr.ungrouped() {
        return Err(QueryError::syntax(
            format!(
                "regex /{}/ cannot be used as {}; compare it with =, ==, != or !==",
                pattern, role
            ),
            position,
        ));
    }
    Ok(())
}
