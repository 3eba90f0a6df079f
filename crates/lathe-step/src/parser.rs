//! Part 21 parser: builds a raw entity graph from tokens.
//!
//! Entities are stored untyped (id, type name, argument tree); the
//! decoders in [`crate::entities`] give them meaning.

use std::collections::BTreeMap;

use crate::error::StepError;
use crate::lexer::{Lexer, Position, SpannedToken, Token};

/// A single argument value in a STEP entity.
#[derive(Debug, Clone, PartialEq)]
pub enum StepValue {
    /// Entity reference (`#123`).
    EntityRef(u64),
    /// String literal.
    String(String),
    /// Real number.
    Real(f64),
    /// Integer number.
    Integer(i64),
    /// Enumeration (`.T.`).
    Enum(String),
    /// Nested list of values.
    List(Vec<StepValue>),
    /// Derived value (`*`).
    Derived,
    /// Unset value (`$`).
    Null,
    /// Inline typed value, e.g. `LENGTH_MEASURE(2.5)` or one part of a complex entity.
    Typed {
        /// The type name.
        type_name: String,
        /// Arguments.
        args: Vec<StepValue>,
    },
}

impl StepValue {
    /// Try to get as an entity reference.
    pub fn as_entity_ref(&self) -> Option<u64> {
        match self {
            StepValue::EntityRef(id) => Some(*id),
            _ => None,
        }
    }

    /// Try to get as a real number (also accepts integers and typed measures).
    pub fn as_real(&self) -> Option<f64> {
        match self {
            StepValue::Real(v) => Some(*v),
            StepValue::Integer(v) => Some(*v as f64),
            StepValue::Typed { args, .. } if args.len() == 1 => args[0].as_real(),
            _ => None,
        }
    }

    /// Try to get as an integer.
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            StepValue::Integer(v) => Some(*v),
            _ => None,
        }
    }

    /// Try to get as a string.
    pub fn as_string(&self) -> Option<&str> {
        match self {
            StepValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// Try to get as an enum.
    pub fn as_enum(&self) -> Option<&str> {
        match self {
            StepValue::Enum(s) => Some(s),
            _ => None,
        }
    }

    /// Try to get as a list.
    pub fn as_list(&self) -> Option<&[StepValue]> {
        match self {
            StepValue::List(v) => Some(v),
            _ => None,
        }
    }

    /// Check if this is an unset value.
    pub fn is_null(&self) -> bool {
        matches!(self, StepValue::Null)
    }

    /// Check if this is a derived value.
    pub fn is_derived(&self) -> bool {
        matches!(self, StepValue::Derived)
    }
}

/// A parsed STEP entity.
#[derive(Debug, Clone)]
pub struct StepEntity {
    /// Entity ID (from `#123`); 0 for header entities.
    pub id: u64,
    /// Entity type name (e.g., `CARTESIAN_POINT`). For complex entities
    /// `(A(..) B(..))` this is the first part's name and every part is kept
    /// as a [`StepValue::Typed`] argument.
    pub type_name: String,
    /// Arguments to the entity constructor.
    pub args: Vec<StepValue>,
}

/// The complete parsed content of a STEP file.
#[derive(Debug, Clone, Default)]
pub struct StepFile {
    /// Header section entities.
    pub header: Vec<StepEntity>,
    /// Data section entities, ordered by ID.
    pub entities: BTreeMap<u64, StepEntity>,
}

impl StepFile {
    /// Get an entity by ID.
    pub fn get(&self, id: u64) -> Option<&StepEntity> {
        self.entities.get(&id)
    }

    /// Get an entity by ID, returning an error if not found.
    pub fn require(&self, id: u64) -> Result<&StepEntity, StepError> {
        self.entities.get(&id).ok_or(StepError::MissingEntity(id))
    }

    /// All entities of a given type, in ascending ID order.
    pub fn entities_of_type<'a>(
        &'a self,
        type_name: &'a str,
    ) -> impl Iterator<Item = &'a StepEntity> + 'a {
        self.entities.values().filter(move |e| e.type_name == type_name)
    }
}

/// Parser for Part 21 STEP files.
pub struct Parser {
    tokens: Vec<SpannedToken>,
    pos: usize,
}

impl Parser {
    /// Parse a STEP file from bytes.
    pub fn parse(input: &[u8]) -> Result<StepFile, StepError> {
        let tokens = Lexer::new(input).tokenize()?;
        Parser { tokens, pos: 0 }.parse_file()
    }

    fn parse_file(&mut self) -> Result<StepFile, StepError> {
        let mut file = StepFile::default();

        self.expect_keyword("ISO-10303-21")?;
        self.expect_token(&Token::Semicolon)?;

        while !self.is_at_end() {
            if self.eat_keyword("HEADER") {
                self.expect_token(&Token::Semicolon)?;
                file.header = self.parse_header_entities()?;
                self.expect_keyword("ENDSEC")?;
                self.expect_token(&Token::Semicolon)?;
            } else if self.eat_keyword("DATA") {
                // DATA may carry a parameter list in edition 3 files
                if self.check_token(&Token::LParen) {
                    self.parse_args(None)?;
                }
                self.expect_token(&Token::Semicolon)?;
                for entity in self.parse_data_entities()? {
                    if let Some(previous) = file.entities.insert(entity.id, entity) {
                        return Err(StepError::parser(Some(previous.id), "duplicate entity id"));
                    }
                }
                self.expect_keyword("ENDSEC")?;
                self.expect_token(&Token::Semicolon)?;
            } else if self.eat_keyword("END-ISO-10303-21") {
                self.expect_token(&Token::Semicolon)?;
                break;
            } else {
                return Err(self.unexpected(None, "section keyword"));
            }
        }

        Ok(file)
    }

    fn parse_header_entities(&mut self) -> Result<Vec<StepEntity>, StepError> {
        let mut entities = Vec::new();
        while let Some(Token::Keyword(type_name)) = self.peek_token().cloned() {
            if type_name == "ENDSEC" {
                break;
            }
            self.advance();
            let args = self.parse_args(None)?;
            self.expect_token(&Token::Semicolon)?;
            entities.push(StepEntity { id: 0, type_name, args });
        }
        Ok(entities)
    }

    fn parse_data_entities(&mut self) -> Result<Vec<StepEntity>, StepError> {
        let mut entities = Vec::new();
        while let Some(Token::EntityRef(id)) = self.peek_token().cloned() {
            self.advance();
            self.expect_token(&Token::Equals)?;

            let (type_name, args) = match self.peek_token().cloned() {
                Some(Token::Keyword(name)) => {
                    self.advance();
                    (name, self.parse_args(Some(id))?)
                }
                Some(Token::LParen) => self.parse_complex(id)?,
                _ => return Err(self.unexpected(Some(id), "entity type name")),
            };
            self.expect_token(&Token::Semicolon)?;

            entities.push(StepEntity { id, type_name, args });
        }
        Ok(entities)
    }

    /// `(TYPE_A(..) TYPE_B(..) ...)`: one entity instantiating several types.
    fn parse_complex(&mut self, id: u64) -> Result<(String, Vec<StepValue>), StepError> {
        self.expect_token(&Token::LParen)?;
        let mut parts = Vec::new();
        while let Some(Token::Keyword(type_name)) = self.peek_token().cloned() {
            self.advance();
            let args = self.parse_args(Some(id))?;
            parts.push(StepValue::Typed { type_name, args });
        }
        self.expect_token(&Token::RParen)?;

        let first = match parts.first() {
            Some(StepValue::Typed { type_name, .. }) => type_name.clone(),
            _ => return Err(StepError::parser(Some(id), "empty complex entity")),
        };
        Ok((first, parts))
    }

    fn parse_args(&mut self, id: Option<u64>) -> Result<Vec<StepValue>, StepError> {
        self.expect_token(&Token::LParen)?;
        let mut args = Vec::new();
        if !self.check_token(&Token::RParen) {
            args.push(self.parse_value(id)?);
            while self.eat_token(&Token::Comma) {
                args.push(self.parse_value(id)?);
            }
        }
        self.expect_token(&Token::RParen)?;
        Ok(args)
    }

    fn parse_value(&mut self, id: Option<u64>) -> Result<StepValue, StepError> {
        let Some(token) = self.peek_token().cloned() else {
            return Err(self.unexpected(id, "value"));
        };
        let value = match token {
            Token::EntityRef(r) => StepValue::EntityRef(r),
            Token::String(s) => StepValue::String(s),
            Token::Real(v) => StepValue::Real(v),
            Token::Integer(v) => StepValue::Integer(v),
            Token::Enum(s) => StepValue::Enum(s),
            Token::Asterisk => StepValue::Derived,
            Token::Dollar => StepValue::Null,
            Token::LParen => return Ok(StepValue::List(self.parse_args(id)?)),
            Token::Keyword(type_name) => {
                self.advance();
                let args = self.parse_args(id)?;
                return Ok(StepValue::Typed { type_name, args });
            }
            _ => return Err(self.unexpected(id, "value")),
        };
        self.advance();
        Ok(value)
    }

    fn peek_token(&self) -> Option<&Token> {
        self.tokens.get(self.pos).map(|t| &t.token)
    }

    fn position(&self) -> Option<Position> {
        self.tokens.get(self.pos).map(|t| t.pos)
    }

    fn advance(&mut self) {
        self.pos += 1;
    }

    fn is_at_end(&self) -> bool {
        self.pos >= self.tokens.len()
    }

    fn check_token(&self, expected: &Token) -> bool {
        self.peek_token() == Some(expected)
    }

    fn eat_token(&mut self, expected: &Token) -> bool {
        let matched = self.check_token(expected);
        if matched {
            self.advance();
        }
        matched
    }

    fn eat_keyword(&mut self, name: &str) -> bool {
        let matched = matches!(self.peek_token(), Some(Token::Keyword(k)) if k == name);
        if matched {
            self.advance();
        }
        matched
    }

    fn expect_token(&mut self, expected: &Token) -> Result<(), StepError> {
        if self.eat_token(expected) {
            Ok(())
        } else {
            Err(self.unexpected(None, &format!("{expected:?}")))
        }
    }

    fn expect_keyword(&mut self, name: &str) -> Result<(), StepError> {
        if self.eat_keyword(name) {
            Ok(())
        } else {
            Err(self.unexpected(None, &format!("keyword '{name}'")))
        }
    }

    fn unexpected(&self, id: Option<u64>, wanted: &str) -> StepError {
        let found = self.peek_token().cloned();
        let at = self
            .position()
            .map(|p| format!(" (line {}, column {})", p.line, p.col))
            .unwrap_or_else(|| " (end of input)".into());
        StepError::parser(id, format!("expected {wanted}, got {found:?}{at}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple() {
        let input = r#"
ISO-10303-21;
HEADER;
FILE_DESCRIPTION((''), '2;1');
ENDSEC;
DATA;
#1 = CARTESIAN_POINT('origin', (0.0, 0.0, 0.0));
#2 = DIRECTION('x', (1.0, 0.0, 0.0));
ENDSEC;
END-ISO-10303-21;
"#;
        let file = Parser::parse(input.as_bytes()).unwrap();
        assert_eq!(file.header.len(), 1);
        assert_eq!(file.entities.len(), 2);

        let p1 = file.get(1).unwrap();
        assert_eq!(p1.type_name, "CARTESIAN_POINT");
        assert_eq!(p1.args[0].as_string(), Some("origin"));
        assert_eq!(p1.args[1].as_list().map(|l| l.len()), Some(3));
    }

    #[test]
    fn test_parse_null_derived_and_typed() {
        let input = r#"
ISO-10303-21;
HEADER;
ENDSEC;
DATA;
#1 = SOME_ENTITY($, *, 'value', LENGTH_MEASURE(2.5));
ENDSEC;
END-ISO-10303-21;
"#;
        let file = Parser::parse(input.as_bytes()).unwrap();
        let e = file.get(1).unwrap();
        assert!(e.args[0].is_null());
        assert!(e.args[1].is_derived());
        assert_eq!(e.args[2].as_string(), Some("value"));
        assert_eq!(e.args[3].as_real(), Some(2.5));
    }

    #[test]
    fn test_parse_complex_entity() {
        let input = r#"
ISO-10303-21;
HEADER;
ENDSEC;
DATA;
#7 = ( LENGTH_UNIT() NAMED_UNIT(*) SI_UNIT(.MILLI.,.METRE.) );
ENDSEC;
END-ISO-10303-21;
"#;
        let file = Parser::parse(input.as_bytes()).unwrap();
        let e = file.get(7).unwrap();
        assert_eq!(e.type_name, "LENGTH_UNIT");
        assert_eq!(e.args.len(), 3);
        assert!(matches!(&e.args[2], StepValue::Typed { type_name, .. } if type_name == "SI_UNIT"));
    }

    #[test]
    fn test_entities_of_type_in_id_order() {
        let input = r#"
ISO-10303-21;
HEADER;
ENDSEC;
DATA;
#9 = CARTESIAN_POINT('', (1.0, 0.0, 0.0));
#2 = DIRECTION('', (1.0, 0.0, 0.0));
#3 = CARTESIAN_POINT('', (0.0, 0.0, 0.0));
ENDSEC;
END-ISO-10303-21;
"#;
        let file = Parser::parse(input.as_bytes()).unwrap();
        let ids: Vec<u64> = file.entities_of_type("CARTESIAN_POINT").map(|e| e.id).collect();
        assert_eq!(ids, vec![3, 9]);
    }

    #[test]
    fn test_duplicate_id_is_rejected() {
        let input = "ISO-10303-21;\nDATA;\n#1 = A();\n#1 = B();\nENDSEC;\nEND-ISO-10303-21;\n";
        assert!(matches!(
            Parser::parse(input.as_bytes()),
            Err(StepError::Parser { entity_id: Some(1), .. })
        ));
    }

    #[test]
    fn test_error_reports_position() {
        let input = "ISO-10303-21;\nDATA;\n#1 = A(1 2);\nENDSEC;\n";
        let err = Parser::parse(input.as_bytes()).unwrap_err();
        assert!(err.to_string().contains("line 3"), "{err}");
    }
}
