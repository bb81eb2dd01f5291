use super::ast::{BooleanOperator, Expr, FieldOperator, Valuer};
use super::scalar::Scalar;

/// Matching strategy for records of type `T`.
///
/// Only [`Matcher::match_field`] is required. The provided connectives
/// short-circuit: the right side is skipped once the left side decides the
/// result.
pub trait Matcher<T: ?Sized> {
    fn match_and(&self, target: &T, left: &Expr, right: &Expr) -> bool {
        left.matches(target, self) && right.matches(target, self)
    }

    fn match_or(&self, target: &T, left: &Expr, right: &Expr) -> bool {
        left.matches(target, self) || right.matches(target, self)
    }

    fn match_not(&self, target: &T, expr: &Expr) -> bool {
        !expr.matches(target, self)
    }

    /// Resolves `field` on `target` and compares it. A field that cannot be
    /// resolved is a non-match, never an error.
    fn match_field(&self, target: &T, field: &str, value: &Valuer, op: FieldOperator) -> bool;

    fn match_value(&self, resolved: &Scalar<'_>, value: &Valuer, op: FieldOperator) -> bool {
        value.matches(resolved, op)
    }
}

impl Expr {
    pub fn matches<T, M>(&self, target: &T, matcher: &M) -> bool
    where
        T: ?Sized,
        M: Matcher<T> + ?Sized,
    {
        match self {
            Expr::Binary {
                left,
                op: BooleanOperator::And,
                right,
            } => matcher.match_and(target, left, right),
            Expr::Binary {
                left,
                op: BooleanOperator::Or,
                right,
            } => matcher.match_or(target, left, right),
            Expr::Not(inner) => matcher.match_not(target, inner),
            Expr::Field { field, op, value } => matcher.match_field(target, field, value, *op),
        }
    }

    /// Returns the items that match, in their original order.
    pub fn filter<'a, T, M>(&self, items: &'a [T], matcher: &M) -> Vec<&'a T>
    where
        M: Matcher<T> + ?Sized,
    {
        items.iter().filter(|item| self.matches(*item, matcher)).collect()
    }
}

impl Valuer {
    /// Compares a resolved value against this operand. Values of a different
    /// kind never match, whatever the operator.
    pub fn matches(&self, resolved: &Scalar<'_>, op: FieldOperator) -> bool {
        match (self, resolved) {
            (Valuer::String(s) | Valuer::Identifier(s), Scalar::String(r)) => compare_str(r, s, op),
            (Valuer::Integer(i), Scalar::Integer(r)) => compare_ordered(r, i, op),
            (Valuer::Number(n), Scalar::Float(r)) => compare_ordered(r, n, op),
            (Valuer::OneOf(values), _) => match op {
                FieldOperator::Equal | FieldOperator::Like => {
                    values.iter().any(|v| v.matches(resolved, op))
                }
                _ => false,
            },
            _ => false,
        }
    }
}

fn compare_str(resolved: &str, operand: &str, op: FieldOperator) -> bool {
    match op {
        FieldOperator::Equal => resolved == operand,
        FieldOperator::NotEqual => resolved != operand,
        FieldOperator::Like => resolved.contains(operand),
        _ => false,
    }
}

fn compare_ordered<T: PartialOrd>(resolved: &T, operand: &T, op: FieldOperator) -> bool {
    match op {
        FieldOperator::Equal => resolved == operand,
        FieldOperator::NotEqual => resolved != operand,
        FieldOperator::GreaterThan => resolved > operand,
        FieldOperator::GreaterThanOrEqual => resolved >= operand,
        FieldOperator::LessThan => resolved < operand,
        FieldOperator::LessThanOrEqual => resolved <= operand,
        FieldOperator::Like => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::collections::HashMap;

    /// Resolves fields from a map and records every field it was asked for.
    struct RecordingMatcher {
        seen: RefCell<Vec<String>>,
    }

    impl RecordingMatcher {
        fn new() -> Self {
            Self {
                seen: RefCell::new(Vec::new()),
            }
        }
    }

    impl Matcher<HashMap<&'static str, i64>> for RecordingMatcher {
        fn match_field(
            &self,
            target: &HashMap<&'static str, i64>,
            field: &str,
            value: &Valuer,
            op: FieldOperator,
        ) -> bool {
            self.seen.borrow_mut().push(field.to_string());
            match target.get(field) {
                Some(v) => self.match_value(&Scalar::Integer(*v), value, op),
                None => false,
            }
        }
    }

    fn eq(field: &str, value: i64) -> Expr {
        Expr::field(field, FieldOperator::Equal, Valuer::Integer(value))
    }

    fn target() -> HashMap<&'static str, i64> {
        HashMap::from([("a", 1), ("b", 2)])
    }

    #[test]
    fn test_and_short_circuits() {
        let matcher = RecordingMatcher::new();
        assert!(!Expr::and(eq("a", 0), eq("b", 2)).matches(&target(), &matcher));
        assert_eq!(*matcher.seen.borrow(), vec!["a"]);
    }

    #[test]
    fn test_or_short_circuits() {
        let matcher = RecordingMatcher::new();
        assert!(Expr::or(eq("a", 1), eq("b", 0)).matches(&target(), &matcher));
        assert_eq!(*matcher.seen.borrow(), vec!["a"]);
    }

    #[test]
    fn test_connectives() {
        let matcher = RecordingMatcher::new();
        let t = target();
        assert!(Expr::and(eq("a", 1), eq("b", 2)).matches(&t, &matcher));
        assert!(!Expr::and(eq("a", 1), eq("b", 3)).matches(&t, &matcher));
        assert!(Expr::or(eq("a", 0), eq("b", 2)).matches(&t, &matcher));
        assert!(!Expr::or(eq("a", 0), eq("b", 0)).matches(&t, &matcher));
        assert!(Expr::negate(eq("a", 0)).matches(&t, &matcher));
        assert!(!eq("missing", 0).matches(&t, &matcher));
        assert!(Expr::negate(eq("missing", 0)).matches(&t, &matcher));
    }

    #[test]
    fn test_filter_keeps_order() {
        let matcher = RecordingMatcher::new();
        let items = vec![
            HashMap::from([("a", 3)]),
            HashMap::from([("a", 1)]),
            HashMap::from([("a", 5)]),
        ];
        let expr = Expr::field("a", FieldOperator::GreaterThan, Valuer::Integer(2));
        let kept: Vec<i64> = expr.filter(&items, &matcher).iter().map(|m| m["a"]).collect();
        assert_eq!(kept, vec![3, 5]);
    }

    #[test]
    fn test_string_operators() {
        let john = Scalar::String("John Doe");
        let s = |v: &str| Valuer::String(v.to_string());
        assert!(s("John Doe").matches(&john, FieldOperator::Equal));
        assert!(!s("Jane").matches(&john, FieldOperator::Equal));
        assert!(s("Jane").matches(&john, FieldOperator::NotEqual));
        assert!(s("John").matches(&john, FieldOperator::Like));
        assert!(!s("john").matches(&john, FieldOperator::Like));
        for op in [
            FieldOperator::GreaterThan,
            FieldOperator::GreaterThanOrEqual,
            FieldOperator::LessThan,
            FieldOperator::LessThanOrEqual,
        ] {
            assert!(!s("A").matches(&john, op));
        }
    }

    #[test]
    fn test_identifier_compares_as_string() {
        let admin = Scalar::String("admin");
        assert!(Valuer::Identifier("admin".into()).matches(&admin, FieldOperator::Equal));
        assert!(Valuer::Identifier("dm".into()).matches(&admin, FieldOperator::Like));
    }

    #[test]
    fn test_integer_operators() {
        let thirty = Scalar::Integer(30);
        let i = Valuer::Integer;
        assert!(i(30).matches(&thirty, FieldOperator::Equal));
        assert!(i(31).matches(&thirty, FieldOperator::NotEqual));
        assert!(i(20).matches(&thirty, FieldOperator::GreaterThan));
        assert!(!i(30).matches(&thirty, FieldOperator::GreaterThan));
        assert!(i(30).matches(&thirty, FieldOperator::GreaterThanOrEqual));
        assert!(i(40).matches(&thirty, FieldOperator::LessThan));
        assert!(i(30).matches(&thirty, FieldOperator::LessThanOrEqual));
        assert!(!i(30).matches(&thirty, FieldOperator::Like));
    }

    #[test]
    fn test_float_operators() {
        let eps = Scalar::Float(0.003);
        let n = Valuer::Number;
        assert!(!n(0.003).matches(&eps, FieldOperator::LessThan));
        assert!(n(0.003).matches(&eps, FieldOperator::LessThanOrEqual));
        assert!(n(0.001).matches(&eps, FieldOperator::GreaterThan));
        assert!(n(0.003).matches(&eps, FieldOperator::Equal));
        assert!(!n(0.003).matches(&eps, FieldOperator::Like));
    }

    #[test]
    fn test_kind_mismatch_never_matches() {
        let ops = [
            FieldOperator::Equal,
            FieldOperator::NotEqual,
            FieldOperator::Like,
            FieldOperator::GreaterThan,
            FieldOperator::LessThanOrEqual,
        ];
        for op in ops {
            assert!(!Valuer::Integer(1).matches(&Scalar::String("1"), op));
            assert!(!Valuer::Number(30.0).matches(&Scalar::Integer(30), op));
            assert!(!Valuer::String("4.5".into()).matches(&Scalar::Float(4.5), op));
        }
    }

    #[test]
    fn test_one_of() {
        let admin = Scalar::String("admin");
        let roles = Valuer::OneOf(vec![
            Valuer::String("admin".into()),
            Valuer::String("superuser".into()),
        ]);
        assert!(roles.matches(&admin, FieldOperator::Equal));
        assert!(!roles.matches(&Scalar::String("user"), FieldOperator::Equal));
        assert!(!roles.matches(&admin, FieldOperator::NotEqual));

        let fragments = Valuer::OneOf(vec![Valuer::String("dm".into()), Valuer::String("zz".into())]);
        assert!(fragments.matches(&admin, FieldOperator::Like));

        let ages = Valuer::OneOf(vec![Valuer::Integer(25), Valuer::Integer(30)]);
        assert!(ages.matches(&Scalar::Integer(30), FieldOperator::Equal));
        assert!(!ages.matches(&Scalar::Integer(30), FieldOperator::GreaterThan));
    }

    #[test]
    fn test_empty_one_of_never_matches() {
        let empty = Valuer::OneOf(Vec::new());
        assert!(!empty.matches(&Scalar::String(""), FieldOperator::Equal));
        assert!(!empty.matches(&Scalar::Integer(0), FieldOperator::Like));
    }
}
