//! Part 21 (STEP physical file format) lexer.
//!
//! Splits an ISO 10303-21 byte stream into tokens. Records may span any
//! number of lines; line breaks are plain whitespace here, so a record is
//! only terminated by its `;`.

use crate::error::StepError;

/// A token in a STEP file.
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    /// Keyword or identifier (e.g., `CARTESIAN_POINT`, `DATA`), upper-cased.
    Keyword(String),
    /// Entity reference (`#123`).
    EntityRef(u64),
    /// String literal (contents without quotes, `''` unescaped).
    String(String),
    /// Real number.
    Real(f64),
    /// Integer number.
    Integer(i64),
    /// Enumeration (`.T.` becomes `Enum("T")`).
    Enum(String),
    /// `(`
    LParen,
    /// `)`
    RParen,
    /// `,`
    Comma,
    /// `;`
    Semicolon,
    /// `=`
    Equals,
    /// `*` (derived value marker).
    Asterisk,
    /// `$` (unset value marker).
    Dollar,
}

/// Position in the source file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Position {
    /// Line number (1-indexed).
    pub line: usize,
    /// Column number (1-indexed).
    pub col: usize,
}

/// A token with the position where it starts.
#[derive(Debug, Clone)]
pub struct SpannedToken {
    /// The token.
    pub token: Token,
    /// Start position.
    pub pos: Position,
}

/// Lexer for Part 21 STEP files.
pub struct Lexer<'a> {
    input: &'a [u8],
    offset: usize,
    pos: Position,
}

impl<'a> Lexer<'a> {
    /// Create a new lexer for the given input.
    pub fn new(input: &'a [u8]) -> Self {
        Self {
            input,
            offset: 0,
            pos: Position { line: 1, col: 1 },
        }
    }

    /// Tokenize the entire input.
    pub fn tokenize(&mut self) -> Result<Vec<SpannedToken>, StepError> {
        let mut tokens = Vec::new();
        while let Some(tok) = self.next_token()? {
            tokens.push(tok);
        }
        Ok(tokens)
    }

    /// Get the next token, or `None` at end of input.
    pub fn next_token(&mut self) -> Result<Option<SpannedToken>, StepError> {
        self.skip_trivia()?;

        let Some(ch) = self.peek() else {
            return Ok(None);
        };
        let start = self.pos;

        let token = match ch {
            b'(' => self.single(Token::LParen),
            b')' => self.single(Token::RParen),
            b',' => self.single(Token::Comma),
            b';' => self.single(Token::Semicolon),
            b'=' => self.single(Token::Equals),
            b'*' => self.single(Token::Asterisk),
            b'$' => self.single(Token::Dollar),
            b'#' => self.entity_ref()?,
            b'\'' => self.string()?,
            b'.' if self.peek_at(1).is_some_and(|c| c.is_ascii_digit()) => self.number()?,
            b'.' => self.enumeration()?,
            b'-' | b'+' if self.peek_at(1).is_some_and(|c| c.is_ascii_digit() || c == b'.') => {
                self.number()?
            }
            b'0'..=b'9' => self.number()?,
            b'A'..=b'Z' | b'a'..=b'z' | b'_' => self.keyword(),
            other => return Err(self.error(format!("unexpected character: '{}'", other as char))),
        };

        Ok(Some(SpannedToken { token, pos: start }))
    }

    fn peek(&self) -> Option<u8> {
        self.input.get(self.offset).copied()
    }

    fn peek_at(&self, ahead: usize) -> Option<u8> {
        self.input.get(self.offset + ahead).copied()
    }

    fn bump(&mut self) -> Option<u8> {
        let ch = self.peek()?;
        self.offset += 1;
        if ch == b'\n' {
            self.pos.line += 1;
            self.pos.col = 1;
        } else {
            self.pos.col += 1;
        }
        Some(ch)
    }

    fn single(&mut self, token: Token) -> Token {
        self.bump();
        token
    }

    fn error(&self, message: impl Into<String>) -> StepError {
        StepError::lexer(self.pos.line, self.pos.col, message)
    }

    /// Consume bytes while `pred` holds and return them as a string slice.
    fn take_while(&mut self, pred: impl Fn(u8) -> bool) -> &'a str {
        let begin = self.offset;
        while self.peek().is_some_and(&pred) {
            self.bump();
        }
        let input: &'a [u8] = self.input;
        // only ASCII bytes pass the predicates used by this lexer
        std::str::from_utf8(&input[begin..self.offset]).unwrap_or_default()
    }

    fn skip_trivia(&mut self) -> Result<(), StepError> {
        loop {
            while self.peek().is_some_and(|c| c.is_ascii_whitespace()) {
                self.bump();
            }
            if self.peek() == Some(b'/') && self.peek_at(1) == Some(b'*') {
                let opened = self.pos;
                self.bump();
                self.bump();
                loop {
                    match (self.peek(), self.peek_at(1)) {
                        (Some(b'*'), Some(b'/')) => {
                            self.bump();
                            self.bump();
                            break;
                        }
                        (Some(_), _) => {
                            self.bump();
                        }
                        (None, _) => {
                            return Err(StepError::lexer(
                                opened.line,
                                opened.col,
                                "unterminated comment",
                            ));
                        }
                    }
                }
                continue;
            }
            return Ok(());
        }
    }

    fn entity_ref(&mut self) -> Result<Token, StepError> {
        let start = self.pos;
        self.bump();
        let digits = self.take_while(|c| c.is_ascii_digit());
        if digits.is_empty() {
            return Err(StepError::lexer(start.line, start.col, "expected digits after '#'"));
        }
        digits
            .parse()
            .map(Token::EntityRef)
            .map_err(|_| {
                StepError::lexer(start.line, start.col, format!("invalid entity ID: {digits}"))
            })
    }

    fn string(&mut self) -> Result<Token, StepError> {
        let start = self.pos;
        self.bump();
        let mut content = Vec::new();
        loop {
            match self.bump() {
                None => return Err(StepError::lexer(start.line, start.col, "unterminated string")),
                Some(b'\'') if self.peek() == Some(b'\'') => {
                    self.bump();
                    content.push(b'\'');
                }
                Some(b'\'') => break,
                Some(ch) => content.push(ch),
            }
        }
        Ok(Token::String(String::from_utf8_lossy(&content).into_owned()))
    }

    fn enumeration(&mut self) -> Result<Token, StepError> {
        let start = self.pos;
        self.bump();
        let name = self.take_while(|c| c.is_ascii_alphanumeric() || c == b'_');
        if self.bump() != Some(b'.') {
            return Err(StepError::lexer(start.line, start.col, "unterminated enumeration"));
        }
        if name.is_empty() {
            return Err(StepError::lexer(start.line, start.col, "empty enumeration"));
        }
        Ok(Token::Enum(name.to_ascii_uppercase()))
    }

    fn number(&mut self) -> Result<Token, StepError> {
        let start = self.pos;
        let begin = self.offset;
        let mut is_real = false;

        if matches!(self.peek(), Some(b'-' | b'+')) {
            self.bump();
        }
        self.take_while(|c| c.is_ascii_digit());
        if self.peek() == Some(b'.') {
            is_real = true;
            self.bump();
            self.take_while(|c| c.is_ascii_digit());
        }
        if matches!(self.peek(), Some(b'E' | b'e')) {
            is_real = true;
            self.bump();
            if matches!(self.peek(), Some(b'-' | b'+')) {
                self.bump();
            }
            self.take_while(|c| c.is_ascii_digit());
        }

        let text = std::str::from_utf8(&self.input[begin..self.offset]).unwrap_or_default();
        let invalid = || StepError::lexer(start.line, start.col, format!("invalid number: {text}"));
        if is_real {
            // Part 21 allows "1." with no fractional digits
            text.parse::<f64>().map(Token::Real).map_err(|_| invalid())
        } else {
            text.parse::<i64>().map(Token::Integer).map_err(|_| invalid())
        }
    }

    fn keyword(&mut self) -> Token {
        // hyphens appear in ISO-10303-21 / END-ISO-10303-21
        let name = self.take_while(|c| c.is_ascii_alphanumeric() || c == b'_' || c == b'-');
        Token::Keyword(name.to_ascii_uppercase())
    }
}
