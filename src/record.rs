//! Default field resolution.
//!
//! A [`Record`] maps a query field name to one of its attributes. Structs
//! usually get their implementation from [`impl_record!`], which scans the
//! declared attributes in order and prefers an attribute's alias over its own
//! name:
//!
//! ```
//! use recql::{impl_record, query, DefaultMatcher};
//!
//! struct User {
//!     id: i64,
//!     full_name: String,
//!     score: f64,
//! }
//!
//! impl_record!(User {
//!     id,
//!     full_name => "name",
//!     score,
//! });
//!
//! let user = User { id: 1, full_name: "John Doe".into(), score: 4.5 };
//! let expr = query::parse("example", r#"name~"John" and score > 4.0"#).unwrap();
//! assert!(expr.matches(&user, &DefaultMatcher));
//! ```
//!
//! Field names are flat keys. A dotted name such as `req.ext` is looked up as
//! is; nothing walks into nested values.

use std::collections::{BTreeMap, HashMap};

use tracing::trace;

use crate::query::{FieldOperator, Matcher, Scalar, ToScalar, Valuer};

pub trait Record {
    /// Returns the value behind `field`, or `None` when the record has no
    /// queryable attribute of that name.
    fn resolve(&self, field: &str) -> Option<Scalar<'_>>;
}

/// Implements [`Record`] for a struct from a list of its attributes.
///
/// Each entry is `attribute` or `attribute => "alias"`. An aliased attribute
/// answers to its alias only. When two entries answer to the same name the
/// first one wins.
#[macro_export]
macro_rules! impl_record {
    (@key $attr:ident) => {
        stringify!($attr)
    };
    (@key $attr:ident $alias:literal) => {
        $alias
    };
    ($ty:ty { $($attr:ident $(=> $alias:literal)?),* $(,)? }) => {
        impl $crate::Record for $ty {
            fn resolve(&self, field: &str) -> Option<$crate::query::Scalar<'_>> {
                $(
                    if field == $crate::impl_record!(@key $attr $($alias)?) {
                        return $crate::query::ToScalar::to_scalar(&self.$attr);
                    }
                )*
                None
            }
        }
    };
}

impl<V: ToScalar> Record for HashMap<String, V> {
    fn resolve(&self, field: &str) -> Option<Scalar<'_>> {
        self.get(field).and_then(ToScalar::to_scalar)
    }
}

impl<V: ToScalar> Record for BTreeMap<String, V> {
    fn resolve(&self, field: &str) -> Option<Scalar<'_>> {
        self.get(field).and_then(ToScalar::to_scalar)
    }
}

impl<R: Record + ?Sized> Record for &R {
    fn resolve(&self, field: &str) -> Option<Scalar<'_>> {
        (**self).resolve(field)
    }
}

/// Matches any [`Record`] by resolving fields through [`Record::resolve`].
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultMatcher;

impl<R: Record + ?Sized> Matcher<R> for DefaultMatcher {
    fn match_field(&self, target: &R, field: &str, value: &Valuer, op: FieldOperator) -> bool {
        match target.resolve(field) {
            Some(resolved) => <Self as Matcher<R>>::match_value(self, &resolved, value, op),
            None => {
                trace!(field, "field did not resolve");
                false
            }
        }
    }
}
