pub mod ast;
pub mod eval;
pub mod literal;
pub mod parser;
pub mod scalar;

pub use ast::{BooleanOperator, Expr, FieldOperator, Valuer};
pub use eval::Matcher;
pub use parser::{parse, ParseError, ParseErrorKind, Parser, MAX_DEPTH};
pub use scalar::{Scalar, ToScalar};
