//! Value comparators used to validate and order field values.

use std::cmp::Ordering;
use std::fmt;

use crate::decimal::DecimalComparator;
use crate::value::Value;

/// Orders the values of one field.
///
/// Implementations return `None` for values they cannot compare; the derived
/// predicates then report `false`.
pub trait ValueComparator: Send + Sync + fmt::Debug {
    /// Compares two values.
    fn ordering(&self, a: &Value, b: &Value) -> Option<Ordering>;

    /// True when both values are equal.
    fn equals(&self, a: &Value, b: &Value) -> bool {
        self.ordering(a, b) == Some(Ordering::Equal)
    }

    /// True when `a` is lower than `b`.
    fn lower_than(&self, a: &Value, b: &Value) -> bool {
        self.ordering(a, b) == Some(Ordering::Less)
    }

    /// True when `a` is higher than `b`.
    fn higher_than(&self, a: &Value, b: &Value) -> bool {
        self.ordering(a, b) == Some(Ordering::Greater)
    }
}

/// Natural ordering of same-typed values.
///
/// Numbers are ordered through [`DecimalComparator`] so integers and decimals
/// mix without precision loss; a date compares as midnight UTC against a
/// date-time.
#[derive(Debug, Clone, Copy, Default)]
pub struct NaturalComparator;

impl ValueComparator for NaturalComparator {
    fn ordering(&self, a: &Value, b: &Value) -> Option<Ordering> {
        match (a, b) {
            (Value::Integer(x), Value::Integer(y)) => Some(x.cmp(y)),
            (Value::Integer(_) | Value::Decimal(_), Value::Integer(_) | Value::Decimal(_)) => {
                DecimalComparator.ordering(a, b)
            }
            (Value::Text(x), Value::Text(y)) => Some(x.cmp(y)),
            (Value::Boolean(x), Value::Boolean(y)) => Some(x.cmp(y)),
            (Value::Date(x), Value::Date(y)) => Some(x.cmp(y)),
            (Value::DateTime(x), Value::DateTime(y)) => Some(x.cmp(y)),
            (Value::Date(x), Value::DateTime(y)) => {
                x.and_hms_opt(0, 0, 0).map(|d| d.and_utc().cmp(y))
            }
            (Value::DateTime(x), Value::Date(y)) => {
                y.and_hms_opt(0, 0, 0).map(|d| x.cmp(&d.and_utc()))
            }
            _ => None,
        }
    }
}
