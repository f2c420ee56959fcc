//! Value types held by a [`ValuesBag`](crate::ValuesBag).

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};

use crate::decimal::{DecimalComparator, NumberLocale};
use crate::error::{SearchError, SearchResult};

/// A single model value.
///
/// The `Display` implementation is the view representation used by the
/// StringQuery exporter.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "type", content = "value", rename_all = "lowercase"))]
pub enum Value {
    /// Signed integer.
    Integer(i64),
    /// Canonical decimal text, e.g. `100.10` (see [`DecimalComparator`]).
    Decimal(String),
    /// Free text.
    Text(String),
    /// Boolean.
    Boolean(bool),
    /// Calendar date.
    Date(NaiveDate),
    /// Point in time.
    DateTime(DateTime<Utc>),
}

impl Value {
    /// Creates a decimal value from `.`-separated input, canonicalizing it.
    ///
    /// ```rust
    /// use search_condition::Value;
    ///
    /// assert_eq!(Value::decimal("5.5").unwrap(), Value::Decimal("5.50".to_string()));
    /// assert!(Value::decimal("5,5.5").is_err());
    /// ```
    pub fn decimal(input: &str) -> SearchResult<Self> {
        DecimalComparator::sanitize(&NumberLocale::c(), input).map(Value::Decimal)
    }

    /// Creates a text value.
    pub fn text(value: impl Into<String>) -> Self {
        Value::Text(value.into())
    }

    /// Returns true for values that render as bare numbers.
    pub fn is_numeric(&self) -> bool {
        matches!(self, Value::Integer(_) | Value::Decimal(_))
    }

    /// Short name of the value type, used in diagnostics.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Integer(_) => "integer",
            Value::Decimal(_) => "decimal",
            Value::Text(_) => "text",
            Value::Boolean(_) => "boolean",
            Value::Date(_) => "date",
            Value::DateTime(_) => "datetime",
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Integer(i) => write!(f, "{}", i),
            Value::Decimal(d) => f.write_str(d),
            Value::Text(s) => f.write_str(s),
            Value::Boolean(b) => write!(f, "{}", b),
            Value::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
            Value::DateTime(dt) => f.write_str(&dt.to_rfc3339_opts(SecondsFormat::AutoSi, true)),
        }
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Integer(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Integer(i64::from(value))
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Boolean(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Text(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Text(value)
    }
}

impl From<NaiveDate> for Value {
    fn from(value: NaiveDate) -> Self {
        Value::Date(value)
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(value: DateTime<Utc>) -> Self {
        Value::DateTime(value)
    }
}

/// A range of values: `lower ~ upper`.
///
/// Bounds are inclusive unless marked otherwise.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Range {
    /// Lower bound.
    pub lower: Value,
    /// Upper bound.
    pub upper: Value,
    /// Whether the lower bound itself is part of the range.
    pub inclusive_lower: bool,
    /// Whether the upper bound itself is part of the range.
    pub inclusive_upper: bool,
}

impl Range {
    /// Creates a range with explicit inclusivity.
    pub fn new(
        lower: impl Into<Value>,
        upper: impl Into<Value>,
        inclusive_lower: bool,
        inclusive_upper: bool,
    ) -> Self {
        Self {
            lower: lower.into(),
            upper: upper.into(),
            inclusive_lower,
            inclusive_upper,
        }
    }

    /// Creates a range including both bounds.
    pub fn inclusive(lower: impl Into<Value>, upper: impl Into<Value>) -> Self {
        Self::new(lower, upper, true, true)
    }
}

/// Comparison operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CompareOperator {
    /// `=`
    Equal,
    /// `<>`
    NotEqual,
    /// `>`
    Greater,
    /// `<`
    Lower,
    /// `>=`
    GreaterOrEqual,
    /// `<=`
    LowerOrEqual,
}

impl CompareOperator {
    /// All operators, in declaration order.
    pub const ALL: [CompareOperator; 6] = [
        CompareOperator::Equal,
        CompareOperator::NotEqual,
        CompareOperator::Greater,
        CompareOperator::Lower,
        CompareOperator::GreaterOrEqual,
        CompareOperator::LowerOrEqual,
    ];

    /// The textual operator.
    pub fn as_str(&self) -> &'static str {
        match self {
            CompareOperator::Equal => "=",
            CompareOperator::NotEqual => "<>",
            CompareOperator::Greater => ">",
            CompareOperator::Lower => "<",
            CompareOperator::GreaterOrEqual => ">=",
            CompareOperator::LowerOrEqual => "<=",
        }
    }

    /// True for `>`, `<`, `>=` and `<=`.
    pub fn is_ordering(&self) -> bool {
        !matches!(self, CompareOperator::Equal | CompareOperator::NotEqual)
    }
}

impl fmt::Display for CompareOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CompareOperator {
    type Err = SearchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CompareOperator::ALL
            .into_iter()
            .find(|op| op.as_str() == s)
            .ok_or_else(|| SearchError::unsupported("", format!("comparison operator '{}'", s)))
    }
}

/// A comparison: `operator value`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Compare {
    /// The operator.
    pub operator: CompareOperator,
    /// The value compared against.
    pub value: Value,
}

impl Compare {
    /// Creates a comparison.
    pub fn new(operator: CompareOperator, value: impl Into<Value>) -> Self {
        Self {
            operator,
            value: value.into(),
        }
    }
}

/// Pattern match types.
///
/// Every positive type has a `Not*` counterpart; negation is derived from the
/// type rather than stored separately.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "SCREAMING_SNAKE_CASE"))]
pub enum PatternMatchType {
    /// Substring match.
    Contains,
    /// Prefix match.
    StartsWith,
    /// Suffix match.
    EndsWith,
    /// Exact match.
    Equals,
    /// Regular expression match.
    Regex,
    /// Negated [`Contains`](Self::Contains).
    NotContains,
    /// Negated [`StartsWith`](Self::StartsWith).
    NotStartsWith,
    /// Negated [`EndsWith`](Self::EndsWith).
    NotEndsWith,
    /// Negated [`Equals`](Self::Equals).
    NotEquals,
    /// Negated [`Regex`](Self::Regex).
    NotRegex,
}

impl PatternMatchType {
    /// All pattern types, in declaration order.
    pub const ALL: [PatternMatchType; 10] = [
        PatternMatchType::Contains,
        PatternMatchType::StartsWith,
        PatternMatchType::EndsWith,
        PatternMatchType::Equals,
        PatternMatchType::Regex,
        PatternMatchType::NotContains,
        PatternMatchType::NotStartsWith,
        PatternMatchType::NotEndsWith,
        PatternMatchType::NotEquals,
        PatternMatchType::NotRegex,
    ];

    /// True for the `Not*` types.
    pub fn is_exclusive(&self) -> bool {
        matches!(
            self,
            PatternMatchType::NotContains
                | PatternMatchType::NotStartsWith
                | PatternMatchType::NotEndsWith
                | PatternMatchType::NotEquals
                | PatternMatchType::NotRegex
        )
    }

    /// The positive counterpart (identity for positive types).
    pub fn positive(&self) -> PatternMatchType {
        match self {
            PatternMatchType::NotContains => PatternMatchType::Contains,
            PatternMatchType::NotStartsWith => PatternMatchType::StartsWith,
            PatternMatchType::NotEndsWith => PatternMatchType::EndsWith,
            PatternMatchType::NotEquals => PatternMatchType::Equals,
            PatternMatchType::NotRegex => PatternMatchType::Regex,
            positive => *positive,
        }
    }

    /// The negated counterpart (identity for negated types).
    pub fn negated(&self) -> PatternMatchType {
        match self {
            PatternMatchType::Contains => PatternMatchType::NotContains,
            PatternMatchType::StartsWith => PatternMatchType::NotStartsWith,
            PatternMatchType::EndsWith => PatternMatchType::NotEndsWith,
            PatternMatchType::Equals => PatternMatchType::NotEquals,
            PatternMatchType::Regex => PatternMatchType::NotRegex,
            negated => *negated,
        }
    }

    /// Upper-case name, e.g. `NOT_STARTS_WITH`.
    pub fn as_str(&self) -> &'static str {
        match self {
            PatternMatchType::Contains => "CONTAINS",
            PatternMatchType::StartsWith => "STARTS_WITH",
            PatternMatchType::EndsWith => "ENDS_WITH",
            PatternMatchType::Equals => "EQUALS",
            PatternMatchType::Regex => "REGEX",
            PatternMatchType::NotContains => "NOT_CONTAINS",
            PatternMatchType::NotStartsWith => "NOT_STARTS_WITH",
            PatternMatchType::NotEndsWith => "NOT_ENDS_WITH",
            PatternMatchType::NotEquals => "NOT_EQUALS",
            PatternMatchType::NotRegex => "NOT_REGEX",
        }
    }
}

impl fmt::Display for PatternMatchType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PatternMatchType {
    type Err = SearchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.to_ascii_uppercase();
        PatternMatchType::ALL
            .into_iter()
            .find(|t| t.as_str() == upper)
            .ok_or_else(|| SearchError::unsupported("", format!("pattern type '{}'", s)))
    }
}

/// A pattern match against a text value.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PatternMatch {
    /// The pattern (plain text, or a regular expression for `Regex` types).
    pub value: String,
    /// The match type.
    pub pattern_type: PatternMatchType,
    /// Whether matching ignores case.
    pub case_insensitive: bool,
}

impl PatternMatch {
    /// Creates a case-sensitive pattern match.
    pub fn new(value: impl Into<String>, pattern_type: PatternMatchType) -> Self {
        Self {
            value: value.into(),
            pattern_type,
            case_insensitive: false,
        }
    }

    /// Creates a case-insensitive pattern match.
    pub fn case_insensitive(value: impl Into<String>, pattern_type: PatternMatchType) -> Self {
        Self {
            value: value.into(),
            pattern_type,
            case_insensitive: true,
        }
    }

    /// True when the match type is negated.
    pub fn is_exclusive(&self) -> bool {
        self.pattern_type.is_exclusive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_display() {
        assert_eq!(Value::Integer(-5).to_string(), "-5");
        assert_eq!(Value::Decimal("100.10".into()).to_string(), "100.10");
        assert_eq!(Value::Boolean(true).to_string(), "true");
        let date = NaiveDate::from_ymd_opt(2001, 1, 15).unwrap();
        assert_eq!(Value::Date(date).to_string(), "2001-01-15");
        let dt = date.and_hms_opt(10, 30, 0).unwrap().and_utc();
        assert_eq!(Value::DateTime(dt).to_string(), "2001-01-15T10:30:00Z");
    }

    #[test]
    fn test_compare_operator_from_str() {
        assert_eq!("<>".parse::<CompareOperator>().unwrap(), CompareOperator::NotEqual);
        assert_eq!(">=".parse::<CompareOperator>().unwrap(), CompareOperator::GreaterOrEqual);
        assert!(matches!(
            "!=".parse::<CompareOperator>(),
            Err(SearchError::UnsupportedValueKind { .. })
        ));
    }

    #[test]
    fn test_compare_operator_classes() {
        assert!(CompareOperator::Greater.is_ordering());
        assert!(CompareOperator::LowerOrEqual.is_ordering());
        assert!(!CompareOperator::Equal.is_ordering());
        assert!(!CompareOperator::NotEqual.is_ordering());
    }

    #[test]
    fn test_pattern_type_negation() {
        for t in PatternMatchType::ALL {
            assert!(!t.positive().is_exclusive());
            assert!(t.negated().is_exclusive());
            assert_eq!(t.positive().negated(), t.negated());
        }
        assert_eq!(PatternMatchType::NotRegex.positive(), PatternMatchType::Regex);
    }

    #[test]
    fn test_pattern_type_from_str() {
        assert_eq!(
            "not_ends_with".parse::<PatternMatchType>().unwrap(),
            PatternMatchType::NotEndsWith
        );
        assert!("LIKE".parse::<PatternMatchType>().is_err());
    }

    #[test]
    fn test_decimal_value_is_canonical() {
        assert_eq!(Value::decimal("007").unwrap(), Value::Decimal("7.00".into()));
        assert_eq!(Value::decimal("-1.5").unwrap(), Value::Decimal("-1.50".into()));
    }
}
