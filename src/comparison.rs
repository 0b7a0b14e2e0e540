//! Typed value comparison for filter expressions.
//!
//! Comparison is four-valued: two values are less, equal, greater, or
//! incomparable. Each of the six comparison operators accepts a subset of
//! those outcomes; incomparable fails every ordering operator but passes
//! `!=`. Values are typed by their YAML tag, and only compatible pairs
//! (both numeric, or both the same kind) ever order or equate.

use crate::node::{YamlKind, YamlNode};

/// The outcome of comparing two typed values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Comparison {
    LessThan,
    Equal,
    GreaterThan,
    Incomparable,
}

/// A comparison operator appearing in a filter expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Comparator {
    Equal,
    NotEqual,
    GreaterThan,
    GreaterThanOrEqual,
    LessThan,
    LessThanOrEqual,
}

impl Comparator {
    /// Returns true if the operator accepts the given comparison outcome.
    pub(crate) fn accepts(self, c: Comparison) -> bool {
        match self {
            Comparator::Equal => c == Comparison::Equal,
            Comparator::NotEqual => c != Comparison::Equal,
            Comparator::GreaterThan => c == Comparison::GreaterThan,
            Comparator::GreaterThanOrEqual => {
                c == Comparison::GreaterThan || c == Comparison::Equal
            }
            Comparator::LessThan => c == Comparison::LessThan,
            Comparator::LessThanOrEqual => c == Comparison::LessThan || c == Comparison::Equal,
        }
    }
}

/// The tag-derived kind of a typed value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ValueKind {
    Null,
    Boolean,
    Integer,
    Float,
    String,
}

/// A scalar's textual content paired with its tag-derived kind.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct TypedValue {
    pub(crate) kind: ValueKind,
    pub(crate) text: String,
}

impl TypedValue {
    pub(crate) fn new(kind: ValueKind, text: impl Into<String>) -> Self {
        TypedValue {
            kind,
            text: text.into(),
        }
    }

    /// Derives a typed value from a scalar node's tag and text.
    ///
    /// Non-scalar nodes carry no typed value and take no part in
    /// comparisons.
    pub(crate) fn from_node(node: &YamlNode) -> Option<TypedValue> {
        if node.kind() != YamlKind::Scalar {
            return None;
        }
        let kind = match node.tag() {
            "!!null" => ValueKind::Null,
            "!!bool" => ValueKind::Boolean,
            "!!int" => ValueKind::Integer,
            "!!float" => ValueKind::Float,
            _ => ValueKind::String,
        };
        Some(TypedValue::new(kind, node.value()))
    }

    pub(crate) fn is_numeric(&self) -> bool {
        self.kind == ValueKind::Integer || self.kind == ValueKind::Float
    }

    /// Returns true if the pair can meaningfully compare: both numeric in
    /// any combination, or both of the same kind.
    pub(crate) fn compatible_with(&self, other: &TypedValue) -> bool {
        (self.is_numeric() && other.is_numeric()) || self.kind == other.kind
    }
}

/// Compares two typed values, yielding one of the four outcomes.
pub(crate) fn compare_typed_values(lhs: &TypedValue, rhs: &TypedValue) -> Comparison {
    if lhs.is_numeric() && rhs.is_numeric() {
        let (l, r) = match (lhs.text.parse::<f64>(), rhs.text.parse::<f64>()) {
            (Ok(l), Ok(r)) => (l, r),
            _ => return Comparison::Incomparable,
        };
        return match l.partial_cmp(&r) {
            Some(std::cmp::Ordering::Less) => Comparison::LessThan,
            Some(std::cmp::Ordering::Equal) => Comparison::Equal,
            Some(std::cmp::Ordering::Greater) => Comparison::GreaterThan,
            None => Comparison::Incomparable,
        };
    }
    match (lhs.kind, rhs.kind) {
        (ValueKind::String, ValueKind::String) => {
            if lhs.text == rhs.text {
                Comparison::Equal
            } else {
                Comparison::Incomparable
            }
        }
        (ValueKind::Boolean, ValueKind::Boolean) => {
            // compare truth values, not surface forms: True and true agree
            if lhs.text.eq_ignore_ascii_case("true") == rhs.text.eq_ignore_ascii_case("true") {
                Comparison::Equal
            } else {
                Comparison::Incomparable
            }
        }
        (ValueKind::Null, ValueKind::Null) => Comparison::Equal,
        _ => Comparison::Incomparable,
    }
}
