use std::fmt;
use std::str::FromStr;

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

use super::literal::quote;
use super::parser::ParseErrorKind;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Expr {
    Binary {
        left: Box<Expr>,
        op: BooleanOperator,
        right: Box<Expr>,
    },
    Not(#[serde(serialize_with = "serialize_negated")] Box<Expr>),
    Field {
        field: String,
        op: FieldOperator,
        value: Valuer,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BooleanOperator {
    And,
    Or,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldOperator {
    Equal,
    NotEqual,
    Like,
    GreaterThan,
    GreaterThanOrEqual,
    LessThan,
    LessThanOrEqual,
}

/// Right-hand operand of a field expression.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Valuer {
    String(String),
    Integer(i64),
    Number(f64),
    /// Bare word in value position, compared as a string.
    Identifier(String),
    OneOf(Vec<Valuer>),
}

impl Expr {
    pub fn and(left: Expr, right: Expr) -> Self {
        Expr::Binary {
            left: Box::new(left),
            op: BooleanOperator::And,
            right: Box::new(right),
        }
    }

    pub fn or(left: Expr, right: Expr) -> Self {
        Expr::Binary {
            left: Box::new(left),
            op: BooleanOperator::Or,
            right: Box::new(right),
        }
    }

    pub fn negate(inner: Expr) -> Self {
        Expr::Not(Box::new(inner))
    }

    pub fn field(field: impl Into<String>, op: FieldOperator, value: Valuer) -> Self {
        Expr::Field {
            field: field.into(),
            op,
            value,
        }
    }

    /// Renders the expression back into query syntax, fully parenthesized.
    ///
    /// Unlike the prefix form produced by `Display`, the result parses back
    /// into an equal tree.
    pub fn to_query(&self) -> String {
        let mut out = String::new();
        write_query(self, &mut out);
        out
    }
}

// YAML cannot tag a value that is itself a tagged enum, so the negated
// expression goes under a key.
fn serialize_negated<S: Serializer>(inner: &Expr, serializer: S) -> Result<S::Ok, S::Error> {
    let mut map = serializer.serialize_map(Some(1))?;
    map.serialize_entry("expr", inner)?;
    map.end()
}

fn write_query(expr: &Expr, out: &mut String) {
    match expr {
        Expr::Binary { left, op, right } => {
            out.push('(');
            write_query(left, out);
            out.push(' ');
            out.push_str(op.keyword());
            out.push(' ');
            write_query(right, out);
            out.push(')');
        }
        Expr::Not(inner) => {
            out.push_str("not (");
            write_query(inner, out);
            out.push(')');
        }
        Expr::Field { field, op, value } => {
            out.push_str(field);
            out.push_str(op.token());
            write_query_value(value, out);
        }
    }
}

fn write_query_value(value: &Valuer, out: &mut String) {
    match value {
        Valuer::String(s) => out.push_str(&quote(s)),
        Valuer::Integer(i) => out.push_str(&i.to_string()),
        Valuer::Number(n) => {
            // f64's Display never uses exponents, so only the dot can be missing.
            let text = n.to_string();
            out.push_str(&text);
            if !text.contains('.') {
                out.push_str(".0");
            }
        }
        Valuer::Identifier(id) if is_identifier(id) => out.push_str(id),
        Valuer::Identifier(id) => out.push_str(&quote(id)),
        Valuer::OneOf(values) => {
            out.push('[');
            for (i, v) in values.iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                write_query_value(v, out);
            }
            out.push(']');
        }
    }
}

pub(crate) fn is_identifier_start(c: char) -> bool {
    c.is_alphabetic()
}

pub(crate) fn is_identifier_char(c: char) -> bool {
    c.is_alphanumeric() || c == '.' || c == '_'
}

fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    chars.next().is_some_and(is_identifier_start) && chars.all(is_identifier_char)
}

impl BooleanOperator {
    pub fn keyword(self) -> &'static str {
        match self {
            BooleanOperator::And => "and",
            BooleanOperator::Or => "or",
        }
    }
}

impl FromStr for BooleanOperator {
    type Err = ParseErrorKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "and" | "AND" => Ok(BooleanOperator::And),
            "or" | "OR" => Ok(BooleanOperator::Or),
            _ => Err(ParseErrorKind::UnknownBooleanOperator(s.to_string())),
        }
    }
}

impl FieldOperator {
    /// Token used when rendering a query; `Display` uses the prefix symbol.
    pub fn token(self) -> &'static str {
        match self {
            FieldOperator::Equal => ":",
            FieldOperator::NotEqual => "!=",
            FieldOperator::Like => "~",
            FieldOperator::GreaterThan => ">",
            FieldOperator::GreaterThanOrEqual => ">=",
            FieldOperator::LessThan => "<",
            FieldOperator::LessThanOrEqual => "<=",
        }
    }
}

impl FromStr for FieldOperator {
    type Err = ParseErrorKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            ":" | "=" => Ok(FieldOperator::Equal),
            "!:" | "!=" => Ok(FieldOperator::NotEqual),
            "~" => Ok(FieldOperator::Like),
            ">=" => Ok(FieldOperator::GreaterThanOrEqual),
            ">" => Ok(FieldOperator::GreaterThan),
            "<=" => Ok(FieldOperator::LessThanOrEqual),
            "<" => Ok(FieldOperator::LessThan),
            _ => Err(ParseErrorKind::UnknownCompareOperator(s.to_string())),
        }
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Binary { left, op, right } => write!(f, "({} {} {})", op, left, right),
            Expr::Not(inner) => write!(f, "(not {})", inner),
            Expr::Field { field, op, value } => write!(f, "({} {} {})", op, field, value),
        }
    }
}

impl fmt::Display for BooleanOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

impl fmt::Display for FieldOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let symbol = match self {
            FieldOperator::Equal => "=",
            FieldOperator::NotEqual => "!=",
            FieldOperator::Like => "~",
            FieldOperator::GreaterThan => ">",
            FieldOperator::GreaterThanOrEqual => ">=",
            FieldOperator::LessThan => "<",
            FieldOperator::LessThanOrEqual => "<=",
        };
        f.write_str(symbol)
    }
}

impl fmt::Display for Valuer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Valuer::String(s) => f.write_str(&quote(s)),
            Valuer::Integer(i) => write!(f, "{}", i),
            Valuer::Number(n) => write!(f, "{:.6}", n),
            Valuer::Identifier(id) => f.write_str(id),
            Valuer::OneOf(values) => {
                f.write_str("[")?;
                for (i, v) in values.iter().enumerate() {
                    if i > 0 {
                        f.write_str(" ")?;
                    }
                    write!(f, "{}", v)?;
                }
                f.write_str("]")
            }
        }
    }
}
