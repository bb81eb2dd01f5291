//! A small query language for filtering in-memory records.
//!
//! A query such as `status:200 and (role:["admin", "owner"] or not age < 18)`
//! is parsed once with [`query::parse`] and then evaluated against any number
//! of records with [`Expr::matches`]. How a field name turns into a value is
//! decided by a [`Matcher`]; [`DefaultMatcher`] resolves fields through the
//! [`Record`] trait, implemented for structs via [`impl_record!`], for string
//! keyed maps and for YAML mappings.

pub mod error;
pub mod files;
pub mod frontmatter;
pub mod query;
pub mod record;
pub mod yaml;

pub use error::{Error, Result};
pub use query::{parse, Expr, Matcher, ParseError, Scalar, ToScalar, Valuer};
pub use record::{DefaultMatcher, Record};
