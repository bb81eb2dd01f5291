use thiserror::Error;
use tracing::debug;

use super::ast::{is_identifier_char, is_identifier_start, BooleanOperator, Expr, FieldOperator, Valuer};
use super::literal::unquote;

const OPERATOR_CHARS: &[char] = &[':', '=', '!', '~', '<', '>'];

/// Deepest expression tree the parser builds. Bounds both the parser's own
/// recursion and the recursion of everything that later walks the tree.
pub const MAX_DEPTH: usize = 256;

pub struct Parser<'a> {
    source_name: &'a str,
    input: &'a str,
    pos: usize,
    // Open parentheses and `not`s around the current position.
    nesting: usize,
    // Height of the expression most recently parsed.
    height: usize,
}

#[derive(Debug, Clone, PartialEq, Error)]
#[error("{source_name}:{line}:{column} ({offset}): {kind}")]
pub struct ParseError {
    pub source_name: String,
    pub line: usize,
    pub column: usize,
    pub offset: usize,
    pub kind: ParseErrorKind,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParseErrorKind {
    #[error("unknown boolean operator {0:?}")]
    UnknownBooleanOperator(String),
    #[error("unknown compare operator {0:?}")]
    UnknownCompareOperator(String),
    #[error("invalid number literal {0:?}")]
    InvalidNumber(String),
    #[error("invalid string literal: {0}")]
    InvalidString(String),
    #[error("expression nests deeper than {0} levels")]
    TooDeep(usize),
    #[error("expected {expected}, found {found}")]
    Unexpected {
        expected: &'static str,
        found: String,
    },
}

impl<'a> Parser<'a> {
    pub fn new(source_name: &'a str, input: &'a str) -> Self {
        Self {
            source_name,
            input,
            pos: 0,
            nesting: 0,
            height: 0,
        }
    }

    pub fn parse(mut self) -> Result<Expr, ParseError> {
        let expr = self.parse_or()?;
        self.skip_whitespace();
        if !self.at_end() {
            return Err(self.unexpected("boolean operator or end of input"));
        }
        Ok(expr)
    }

    fn parse_or(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.parse_and()?;
        while self.match_connective(BooleanOperator::Or)? {
            let left_height = self.height;
            let right = self.parse_and()?;
            self.set_height(left_height.max(self.height) + 1)?;
            left = Expr::or(left, right);
        }
        Ok(left)
    }

    fn parse_and(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.parse_not()?;
        while self.match_connective(BooleanOperator::And)? {
            let left_height = self.height;
            let right = self.parse_not()?;
            self.set_height(left_height.max(self.height) + 1)?;
            left = Expr::and(left, right);
        }
        Ok(left)
    }

    fn parse_not(&mut self) -> Result<Expr, ParseError> {
        self.skip_whitespace();
        if self.match_not_keyword() {
            self.enter()?;
            let inner = self.parse_not()?;
            self.nesting -= 1;
            self.set_height(self.height + 1)?;
            return Ok(Expr::negate(inner));
        }
        self.parse_primary()
    }

    fn parse_primary(&mut self) -> Result<Expr, ParseError> {
        self.skip_whitespace();

        if self.match_char('(') {
            self.enter()?;
            let expr = self.parse_or()?;
            self.skip_whitespace();
            if !self.match_char(')') {
                return Err(self.unexpected("')'"));
            }
            self.nesting -= 1;
            return Ok(expr);
        }

        self.parse_field()
    }

    fn parse_field(&mut self) -> Result<Expr, ParseError> {
        let field = self.parse_identifier("field name or '('")?;
        self.skip_whitespace();
        let op = self.parse_operator()?;
        self.skip_whitespace();
        let value = self.parse_value()?;
        self.height = 1;
        Ok(Expr::Field { field, op, value })
    }

    fn enter(&mut self) -> Result<(), ParseError> {
        self.nesting += 1;
        if self.nesting > MAX_DEPTH {
            return Err(self.error(ParseErrorKind::TooDeep(MAX_DEPTH)));
        }
        Ok(())
    }

    fn set_height(&mut self, height: usize) -> Result<(), ParseError> {
        if height > MAX_DEPTH {
            return Err(self.error(ParseErrorKind::TooDeep(MAX_DEPTH)));
        }
        self.height = height;
        Ok(())
    }

    fn parse_identifier(&mut self, expected: &'static str) -> Result<String, ParseError> {
        match self.peek_word() {
            Some(word) => {
                self.pos += word.len();
                Ok(word.to_string())
            }
            None => Err(self.unexpected(expected)),
        }
    }

    fn parse_operator(&mut self) -> Result<FieldOperator, ParseError> {
        let start = self.pos;
        let len = self
            .remaining()
            .find(|c: char| !OPERATOR_CHARS.contains(&c))
            .unwrap_or(self.remaining().len());
        if len == 0 {
            return Err(self.unexpected("comparison operator"));
        }
        let token = &self.input[start..start + len];
        let op = token.parse::<FieldOperator>().map_err(|kind| self.error(kind))?;
        self.pos += len;
        Ok(op)
    }

    fn parse_value(&mut self) -> Result<Valuer, ParseError> {
        match self.current_char() {
            Some('"') => self.parse_string(),
            Some('[') => self.parse_one_of(),
            Some(c) if c.is_ascii_digit() || c == '-' || c == '+' => self.parse_number(),
            Some(c) if is_identifier_start(c) => {
                let id = self.parse_identifier("value")?;
                Ok(Valuer::Identifier(id))
            }
            _ => Err(self.unexpected("value")),
        }
    }

    fn parse_string(&mut self) -> Result<Valuer, ParseError> {
        let start = self.pos;
        let mut escaped = false;
        let mut end = None;

        for (i, c) in self.remaining().char_indices().skip(1) {
            match c {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => {
                    end = Some(start + i + 1);
                    break;
                }
                '\n' => break,
                _ => {}
            }
        }

        let Some(end) = end else {
            let kind = ParseErrorKind::InvalidString("unterminated string literal".to_string());
            return Err(self.error(kind));
        };

        let value = unquote(&self.input[start..end])
            .map_err(|reason| self.error(ParseErrorKind::InvalidString(reason)))?;
        self.pos = end;
        Ok(Valuer::String(value))
    }

    fn parse_number(&mut self) -> Result<Valuer, ParseError> {
        let start = self.pos;
        if matches!(self.current_char(), Some('-' | '+')) {
            self.pos += 1;
        }
        let int_digits = self.skip_digits();
        let mut well_formed = int_digits > 0;
        if self.match_char('.') {
            well_formed &= self.skip_digits() > 0;
        }

        // Swallow whatever is glued to the number so the error shows all of it.
        let tail = self
            .remaining()
            .find(|c: char| !is_identifier_char(c))
            .unwrap_or(self.remaining().len());
        if tail > 0 {
            well_formed = false;
            self.pos += tail;
        }

        let text = &self.input[start..self.pos];
        if well_formed {
            if let Ok(i) = text.parse::<i64>() {
                return Ok(Valuer::Integer(i));
            }
            if let Ok(n) = text.parse::<f64>() {
                if n.is_finite() {
                    return Ok(Valuer::Number(n));
                }
            }
        }

        let kind = ParseErrorKind::InvalidNumber(text.to_string());
        Err(self.error_at(start, kind))
    }

    fn parse_one_of(&mut self) -> Result<Valuer, ParseError> {
        self.match_char('[');
        self.enter()?;
        self.skip_whitespace();

        let mut values = Vec::new();
        if self.match_char(']') {
            self.nesting -= 1;
            return Ok(Valuer::OneOf(values));
        }

        loop {
            self.skip_whitespace();
            let value = match self.parse_value()? {
                Valuer::Identifier(id) => Valuer::String(id),
                v => v,
            };
            values.push(value);

            self.skip_whitespace();
            if self.match_char(',') {
                continue;
            }
            if self.match_char(']') {
                self.nesting -= 1;
                return Ok(Valuer::OneOf(values));
            }
            return Err(self.unexpected("',' or ']'"));
        }
    }

    /// Consumes `op`'s keyword if it comes next. Errors on a mixed-case
    /// spelling of either connective.
    fn match_connective(&mut self, op: BooleanOperator) -> Result<bool, ParseError> {
        self.skip_whitespace();
        let Some(word) = self.peek_word() else {
            return Ok(false);
        };
        if !word.eq_ignore_ascii_case(op.keyword()) {
            return Ok(false);
        }
        word.parse::<BooleanOperator>().map_err(|kind| self.error(kind))?;
        self.pos += word.len();
        Ok(true)
    }

    /// `not` followed by a comparison operator names a field instead.
    fn match_not_keyword(&mut self) -> bool {
        let Some(word) = self.peek_word() else {
            return false;
        };
        if word != "not" && word != "NOT" {
            return false;
        }
        let after = self.input[self.pos + word.len()..].trim_start();
        if after.starts_with(OPERATOR_CHARS) {
            return false;
        }
        self.pos += word.len();
        true
    }

    fn peek_word(&self) -> Option<&'a str> {
        let rest = &self.input[self.pos..];
        let first = rest.chars().next()?;
        if !is_identifier_start(first) {
            return None;
        }
        let len = rest.find(|c: char| !is_identifier_char(c)).unwrap_or(rest.len());
        Some(&rest[..len])
    }

    fn skip_digits(&mut self) -> usize {
        let len = self
            .remaining()
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(self.remaining().len());
        self.pos += len;
        len
    }

    fn skip_whitespace(&mut self) {
        let rest = self.remaining();
        self.pos += rest.len() - rest.trim_start().len();
    }

    fn remaining(&self) -> &'a str {
        &self.input[self.pos..]
    }

    fn at_end(&self) -> bool {
        self.pos >= self.input.len()
    }

    fn current_char(&self) -> Option<char> {
        self.remaining().chars().next()
    }

    fn match_char(&mut self, c: char) -> bool {
        if self.current_char() == Some(c) {
            self.pos += c.len_utf8();
            true
        } else {
            false
        }
    }

    fn unexpected(&self, expected: &'static str) -> ParseError {
        let found = match self.current_char() {
            Some(c) => format!("{:?}", c),
            None => "end of input".to_string(),
        };
        self.error(ParseErrorKind::Unexpected { expected, found })
    }

    fn error(&self, kind: ParseErrorKind) -> ParseError {
        self.error_at(self.pos, kind)
    }

    fn error_at(&self, offset: usize, kind: ParseErrorKind) -> ParseError {
        let before = &self.input[..offset];
        let line = before.matches('\n').count() + 1;
        let line_start = before.rfind('\n').map_or(0, |i| i + 1);
        let column = before[line_start..].chars().count() + 1;
        ParseError {
            source_name: self.source_name.to_string(),
            line,
            column,
            offset,
            kind,
        }
    }
}

/// Parses `input` into an expression tree. `source_name` only labels errors.
pub fn parse(source_name: &str, input: &str) -> Result<Expr, ParseError> {
    match Parser::new(source_name, input).parse() {
        Ok(expr) => {
            debug!(source = source_name, query = %expr, "parsed query");
            Ok(expr)
        }
        Err(err) => {
            debug!(source = source_name, error = %err, "query failed to parse");
            Err(err)
        }
    }
}
