//! Lexer (tokenizer) for query expressions.

use std::iter::Peekable;
use std::str::Chars;

/// What went wrong while tokenizing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LexerErrorKind {
    /// A character that starts no token.
    UnexpectedCharacter(char),
    /// A quoted string without its closing quote.
    UnterminatedString,
    /// A regex literal without its closing slash.
    UnterminatedRegex,
}

/// Error encountered during lexical analysis.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LexerError {
    /// The kind of error.
    pub kind: LexerErrorKind,
    /// The position (0-indexed byte offset) where the error occurred.
    pub position: usize,
}

impl std::fmt::Display for LexerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.kind {
            LexerErrorKind::UnexpectedCharacter(c) => {
                write!(f, "unexpected character '{}'", c)
            }
            LexerErrorKind::UnterminatedString => write!(f, "unterminated string"),
            LexerErrorKind::UnterminatedRegex => write!(f, "unterminated regex"),
        }
    }
}

impl std::error::Error for LexerError {}

/// Result of tokenizing a query expression.
#[derive(Debug, Clone, PartialEq)]
pub struct LexerResult {
    /// The tokens successfully parsed, with their positions.
    pub tokens: Vec<PositionedToken>,
    /// Any errors encountered.
    pub errors: Vec<LexerError>,
}

/// A token with its position in the input.
#[derive(Debug, Clone, PartialEq)]
pub struct PositionedToken {
    /// The token.
    pub token: QueryToken,
    /// The byte position where the token starts (0-indexed).
    pub position: usize,
}

/// A token in a query expression.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryToken {
    // ==================== Operands ====================
    /// A field name, possibly `back:`-prefixed.
    Identifier(String),

    /// A numeric literal.
    Number(f64),

    /// A quoted string with escapes resolved.
    String(String),

    /// `true` or `false`.
    Boolean(bool),

    /// A regex literal; holds the pattern between the slashes.
    Regex(String),

    // ==================== Logical ====================
    /// `&`
    And,
    /// `|`
    Or,

    // ==================== Comparison ====================
    /// `==`
    StrictEq,
    /// `!==`
    StrictNotEq,
    /// `=`
    LooseEq,
    /// `!=`
    LooseNotEq,
    /// `??`
    StrictIn,
    /// `!??`
    StrictNotIn,
    /// `?`
    LooseIn,
    /// `!?`
    LooseNotIn,
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
    Plus,
    /// `-`
    Minus,
    /// `*`
    Star,
    /// `/` in operator position.
    Slash,
    /// `%`
    Percent,

    // ==================== Punctuation ====================
    /// `(`
    OpenParen,
    /// `)`
    CloseParen,
    /// `[`
    OpenBracket,
    /// `]`
    CloseBracket,
    /// `,`
    Comma,
}

impl QueryToken {
    /// True if the token can end an operand, which makes a following `/` a
    /// division rather than the start of a regex.
    fn ends_operand(&self) -> bool {
        matches!(
            self,
            QueryToken::Identifier(_)
                | QueryToken::Number(_)
                | QueryToken::String(_)
                | QueryToken::Boolean(_)
                | QueryToken::Regex(_)
                | QueryToken::CloseParen
                | QueryToken::CloseBracket
        )
    }

    /// Renders the token roughly as it was written, for error messages.
    pub fn describe(&self) -> String {
        match self {
            QueryToken::Identifier(name) => name.clone(),
            QueryToken::Number(n) => n.to_string(),
            QueryToken::String(s) => format!("\"{}\"", s),
            QueryToken::Boolean(b) => b.to_string(),
            QueryToken::Regex(p) => format!("/{}/", p),
            QueryToken::And => "&".into(),
            QueryToken::Or => "|".into(),
            QueryToken::StrictEq => "==".into(),
            QueryToken::StrictNotEq => "!==".into(),
            QueryToken::LooseEq => "=".into(),
            QueryToken::LooseNotEq => "!=".into(),
            QueryToken::StrictIn => "??".into(),
            QueryToken::StrictNotIn => "!??".into(),
            QueryToken::LooseIn => "?".into(),
            QueryToken::LooseNotIn => "!?".into(),
            QueryToken::Gt => ">".into(),
            QueryToken::Lt => "<".into(),
            QueryToken::Gte => ">=".into(),
            QueryToken::Lte => "<=".into(),
            QueryToken::Plus => "+".into(),
            QueryToken::Minus => "-".into(),
            QueryToken::Star => "*".into(),
            QueryToken::Slash => "/".into(),
            QueryToken::Percent => "%".into(),
            QueryToken::OpenParen => "(".into(),
            QueryToken::CloseParen => ")".into(),
            QueryToken::OpenBracket => "[".into(),
            QueryToken::CloseBracket => "]".into(),
            QueryToken::Comma => ",".into(),
        }
    }
}

/// Lexer for tokenizing query expressions.
pub struct Lexer<'a> {
    chars: Peekable<Chars<'a>>,
    /// Current byte position in the input string.
    position: usize,
    /// Whether the previously emitted token ends an operand.
    after_operand: bool,
    /// Errors encountered during tokenization.
    errors: Vec<LexerError>,
}

impl<'a> Lexer<'a> {
    /// Creates a new lexer for the given input string.
    pub fn new(input: &'a str) -> Self {
        Self {
            chars: input.chars().peekable(),
            position: 0,
            after_operand: false,
            errors: Vec::new(),
        }
    }

    /// Peeks at the next character without consuming it.
    fn peek(&mut self) -> Option<&char> {
        self.chars.peek()
    }

    /// Consumes and returns the next character, updating position.
    fn next_char(&mut self) -> Option<char> {
        let c = self.chars.next();
        if let Some(ch) = c {
            self.position += ch.len_utf8();
        }
        c
    }

    /// Consumes the next character if it equals `expected`.
    fn eat(&mut self, expected: char) -> bool {
        if self.peek() == Some(&expected) {
            self.next_char();
            true
        } else {
            false
        }
    }

    /// Skips whitespace characters.
    fn skip_whitespace(&mut self) {
        while let Some(&c) = self.peek() {
            if c.is_whitespace() {
                self.next_char();
            } else {
                break;
            }
        }
    }

    /// Reads an identifier: letters, digits, `_` and `:`.
    fn read_identifier(&mut self) -> String {
        let mut ident = String::new();
        while let Some(&c) = self.peek() {
            if c.is_alphanumeric() || c == '_' || c == ':' {
                ident.push(c);
                self.next_char();
            } else {
                break;
            }
        }
        ident
    }

    /// Reads an unsigned decimal number with an optional fraction.
    fn read_number(&mut self) -> f64 {
        let mut digits = String::new();
        while let Some(&c) = self.peek() {
            if c.is_ascii_digit() {
                digits.push(c);
                self.next_char();
            } else {
                break;
            }
        }

        // A fraction needs a digit after the dot; "1." leaves the dot alone.
        let mut lookahead = self.chars.clone();
        if lookahead.next() == Some('.') && lookahead.peek().is_some_and(|c| c.is_ascii_digit())
        {
            digits.push('.');
            self.next_char();
            while let Some(&c) = self.peek() {
                if c.is_ascii_digit() {
                    digits.push(c);
                    self.next_char();
                } else {
                    break;
                }
            }
        }

        digits.parse().unwrap_or_default()
    }

    /// Reads a quoted string (single or double quotes).
    fn read_quoted_string(&mut self, quote_char: char, start: usize) -> String {
        // Consume the opening quote
        self.next_char();

        let mut result = String::new();
        loop {
            match self.next_char() {
                Some(c) if c == quote_char => return result,
                Some('\\') => {
                    if let Some(escaped) = self.next_char() {
                        result.push(escaped);
                    }
                }
                Some(c) => result.push(c),
                None => {
                    self.errors.push(LexerError {
                        kind: LexerErrorKind::UnterminatedString,
                        position: start,
                    });
                    return result;
                }
            }
        }
    }

    /// Reads a regex literal body. Escapes are kept for the regex engine,
    /// except `\/` which becomes a plain slash.
    fn read_regex(&mut self, start: usize) -> String {
        // Consume the opening slash
        self.next_char();

        let mut pattern = String::new();
        loop {
            match self.next_char() {
                Some('/') => return pattern,
                Some('\\') => match self.next_char() {
                    Some('/') => pattern.push('/'),
                    Some(escaped) => {
                        pattern.push('\\');
                        pattern.push(escaped);
                    }
                    None => pattern.push('\\'),
                },
                Some(c) => pattern.push(c),
                None => {
                    self.errors.push(LexerError {
                        kind: LexerErrorKind::UnterminatedRegex,
                        position: start,
                    });
                    return pattern;
                }
            }
        }
    }

    /// Returns the next token with its position, or None if at end of input.
    pub fn next_token(&mut self) -> Option<PositionedToken> {
        let token = self.scan()?;
        self.after_operand = token.token.ends_operand();
        Some(token)
    }

    fn scan(&mut self) -> Option<PositionedToken> {
        loop {
            self.skip_whitespace();

            let c = *self.peek()?;
            let position = self.position;

            if let Some(token) = self.read_token(c, position) {
                return Some(PositionedToken { token, position });
            }
        }
    }

    /// Reads the token starting at `c`. Returns None after recording an
    /// error for input that starts no token.
    fn read_token(&mut self, c: char, position: usize) -> Option<QueryToken> {
        let token = match c {
            '&' => {
                self.next_char();
                QueryToken::And
            }
            '|' => {
                self.next_char();
                QueryToken::Or
            }
            '(' => {
                self.next_char();
                QueryToken::OpenParen
            }
            ')' => {
                self.next_char();
                QueryToken::CloseParen
            }
            '[' => {
                self.next_char();
                QueryToken::OpenBracket
            }
            ']' => {
                self.next_char();
                QueryToken::CloseBracket
            }
            ',' => {
                self.next_char();
                QueryToken::Comma
            }
            '+' => {
                self.next_char();
                QueryToken::Plus
            }
            '-' => {
                self.next_char();
                QueryToken::Minus
            }
            '*' => {
                self.next_char();
                QueryToken::Star
            }
            '%' => {
                self.next_char();
                QueryToken::Percent
            }

            // Equality (== or =)
            '=' => {
                self.next_char();
                if self.eat('=') {
                    QueryToken::StrictEq
                } else {
                    QueryToken::LooseEq
                }
            }

            // Negated operators (!==, !=, !??, !?)
            '!' => {
                self.next_char();
                if self.eat('=') {
                    if self.eat('=') {
                        QueryToken::StrictNotEq
                    } else {
                        QueryToken::LooseNotEq
                    }
                } else if self.eat('?') {
                    if self.eat('?') {
                        QueryToken::StrictNotIn
                    } else {
                        QueryToken::LooseNotIn
                    }
                } else {
                    self.errors.push(LexerError {
                        kind: LexerErrorKind::UnexpectedCharacter('!'),
                        position,
                    });
                    return None;
                }
            }

            // Containment (?? or ?)
            '?' => {
                self.next_char();
                if self.eat('?') {
                    QueryToken::StrictIn
                } else {
                    QueryToken::LooseIn
                }
            }

            // Ordering
            '>' => {
                self.next_char();
                if self.eat('=') {
                    QueryToken::Gte
                } else {
                    QueryToken::Gt
                }
            }
            '<' => {
                self.next_char();
                if self.eat('=') {
                    QueryToken::Lte
                } else {
                    QueryToken::Lt
                }
            }

            // Division or regex, depending on what precedes it
            '/' => {
                if self.after_operand {
                    self.next_char();
                    QueryToken::Slash
                } else {
                    QueryToken::Regex(self.read_regex(position))
                }
            }

            '"' | '\'' => QueryToken::String(self.read_quoted_string(c, position)),

            _ if c.is_ascii_digit() => QueryToken::Number(self.read_number()),

            _ if c.is_alphabetic() || c == '_' => {
                let ident = self.read_identifier();
                match ident.as_str() {
                    "true" => QueryToken::Boolean(true),
                    "false" => QueryToken::Boolean(false),
                    _ => QueryToken::Identifier(ident),
                }
            }

            // Unknown character - record error and continue
            _ => {
                self.next_char();
                self.errors.push(LexerError {
                    kind: LexerErrorKind::UnexpectedCharacter(c),
                    position,
                });
                return None;
            }
        };

        Some(token)
    }

    /// Collects all tokens into a vector (without positions).
    #[cfg(test)]
    pub fn tokenize(self) -> Vec<QueryToken> {
        self.tokenize_with_errors()
            .tokens
            .into_iter()
            .map(|pt| pt.token)
            .collect()
    }

    /// Collects all tokens and any errors encountered.
    pub fn tokenize_with_errors(mut self) -> LexerResult {
        let mut tokens = Vec::new();
        while let Some(positioned_token) = self.next_token() {
            tokens.push(positioned_token);
        }
        LexerResult {
            tokens,
            errors: self.errors,
        }
    }
}
