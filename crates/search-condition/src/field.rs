//! Field registry: which fields a condition may reference and how their
//! values are typed, compared and displayed.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};
use indexmap::IndexMap;

use crate::comparator::{NaturalComparator, ValueComparator};
use crate::decimal::{DecimalComparator, NumberLocale};
use crate::error::{SearchError, SearchResult};
use crate::value::Value;

/// The value type of a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum FieldType {
    /// Free text.
    Text,
    /// Signed 64-bit integer.
    Integer,
    /// Arbitrary-precision decimal.
    Decimal,
    /// Calendar date, `YYYY-MM-DD`.
    Date,
    /// RFC 3339 date-time.
    DateTime,
    /// Date-time displayed as Unix seconds.
    Timestamp,
    /// `true` / `false`.
    Boolean,
}

impl FieldType {
    /// Value kinds a field of this type accepts unless configured otherwise.
    pub fn default_value_kinds(&self) -> ValueKinds {
        match self {
            FieldType::Text => ValueKinds {
                ranges: false,
                comparisons: false,
                pattern_matches: true,
            },
            FieldType::Integer
            | FieldType::Decimal
            | FieldType::Date
            | FieldType::DateTime
            | FieldType::Timestamp => ValueKinds {
                ranges: true,
                comparisons: true,
                pattern_matches: false,
            },
            FieldType::Boolean => ValueKinds::default(),
        }
    }

    /// Comparator used unless configured otherwise.
    pub fn default_comparator(&self) -> Arc<dyn ValueComparator> {
        match self {
            FieldType::Decimal => Arc::new(DecimalComparator),
            _ => Arc::new(NaturalComparator),
        }
    }

    /// Converts the textual (view) form of a value into a model value.
    pub fn parse_value(&self, field: &str, raw: &str) -> SearchResult<Value> {
        let invalid = |message: &str| SearchError::InvalidValue {
            field: field.to_string(),
            value: raw.to_string(),
            message: message.to_string(),
        };

        match self {
            FieldType::Text => Ok(Value::Text(raw.to_string())),
            FieldType::Integer => raw
                .parse::<i64>()
                .map(Value::Integer)
                .map_err(|_| invalid("expected an integer")),
            FieldType::Decimal => DecimalComparator::sanitize(&NumberLocale::c(), raw)
                .map(Value::Decimal)
                .map_err(|_| invalid("expected a decimal number")),
            FieldType::Date => NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .map(Value::Date)
                .map_err(|_| invalid("expected a date (YYYY-MM-DD)")),
            FieldType::DateTime => DateTime::parse_from_rfc3339(raw)
                .map(|dt| Value::DateTime(dt.with_timezone(&Utc)))
                .map_err(|_| invalid("expected an RFC 3339 date-time")),
            FieldType::Timestamp => raw
                .parse::<i64>()
                .ok()
                .and_then(|secs| DateTime::from_timestamp(secs, 0))
                .map(Value::DateTime)
                .ok_or_else(|| invalid("expected a Unix timestamp")),
            FieldType::Boolean => match raw.to_ascii_lowercase().as_str() {
                "true" | "1" | "yes" => Ok(Value::Boolean(true)),
                "false" | "0" | "no" => Ok(Value::Boolean(false)),
                _ => Err(invalid("expected true or false")),
            },
        }
    }

    /// Renders a model value in its textual (view) form.
    pub fn format_value(&self, value: &Value) -> String {
        match (self, value) {
            (FieldType::Timestamp, Value::DateTime(dt)) => dt.timestamp().to_string(),
            _ => value.to_string(),
        }
    }
}

/// Which value kinds a field accepts besides simple and excluded values.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ValueKinds {
    /// Ranges and excluded ranges.
    pub ranges: bool,
    /// Comparisons.
    pub comparisons: bool,
    /// Pattern matches.
    pub pattern_matches: bool,
}

impl ValueKinds {
    /// Accept every value kind.
    pub fn all() -> Self {
        Self {
            ranges: true,
            comparisons: true,
            pattern_matches: true,
        }
    }
}

/// A field option value.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(untagged))]
pub enum OptionValue {
    /// Boolean option.
    Bool(bool),
    /// Integer option.
    Integer(i64),
    /// Text option.
    Text(String),
}

impl fmt::Display for OptionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OptionValue::Bool(b) => write!(f, "{}", b),
            OptionValue::Integer(i) => write!(f, "{}", i),
            OptionValue::Text(s) => f.write_str(s),
        }
    }
}

impl From<bool> for OptionValue {
    fn from(value: bool) -> Self {
        OptionValue::Bool(value)
    }
}

impl From<i64> for OptionValue {
    fn from(value: i64) -> Self {
        OptionValue::Integer(value)
    }
}

impl From<&str> for OptionValue {
    fn from(value: &str) -> Self {
        OptionValue::Text(value.to_string())
    }
}

impl From<String> for OptionValue {
    fn from(value: String) -> Self {
        OptionValue::Text(value)
    }
}

/// Free-form field options, handed to conversion hooks as-is.
pub type FieldOptions = BTreeMap<String, OptionValue>;

/// Configuration of one registered field.
#[derive(Debug, Clone)]
pub struct FieldConfig {
    name: String,
    field_type: FieldType,
    options: FieldOptions,
    value_kinds: ValueKinds,
    comparator: Arc<dyn ValueComparator>,
}

impl FieldConfig {
    /// Creates a field with the defaults of its type.
    pub fn new(name: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            name: name.into(),
            field_type,
            options: FieldOptions::new(),
            value_kinds: field_type.default_value_kinds(),
            comparator: field_type.default_comparator(),
        }
    }

    /// Sets an option.
    pub fn with_option(mut self, key: impl Into<String>, value: impl Into<OptionValue>) -> Self {
        self.options.insert(key.into(), value.into());
        self
    }

    /// Sets the `label` option.
    pub fn with_label(self, label: impl Into<String>) -> Self {
        self.with_option("label", label.into())
    }

    /// Overrides the accepted value kinds.
    pub fn with_value_kinds(mut self, value_kinds: ValueKinds) -> Self {
        self.value_kinds = value_kinds;
        self
    }

    /// Overrides the comparator.
    pub fn with_comparator(mut self, comparator: Arc<dyn ValueComparator>) -> Self {
        self.comparator = comparator;
        self
    }

    /// Field name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Value type.
    pub fn field_type(&self) -> FieldType {
        self.field_type
    }

    /// All options.
    pub fn options(&self) -> &FieldOptions {
        &self.options
    }

    /// A single option.
    pub fn option(&self, key: &str) -> Option<&OptionValue> {
        self.options.get(key)
    }

    /// The `label` option, or the field name.
    pub fn label(&self) -> String {
        match self.options.get("label") {
            Some(label) => label.to_string(),
            None => self.name.clone(),
        }
    }

    /// Accepted value kinds.
    pub fn value_kinds(&self) -> ValueKinds {
        self.value_kinds
    }

    /// The comparator for this field's values.
    pub fn comparator(&self) -> &dyn ValueComparator {
        self.comparator.as_ref()
    }
}

/// The registry of fields a condition may reference.
///
/// Immutable once built; share it behind an `Arc`.
///
/// # Example
///
/// ```rust
/// use search_condition::{FieldConfig, FieldSet, FieldType};
///
/// let fields = FieldSet::builder()
///     .add("id", FieldType::Integer)
///     .field(FieldConfig::new("name", FieldType::Text).with_label("customer-name"))
///     .build();
///
/// assert!(fields.contains("id"));
/// assert_eq!(fields.get("name").unwrap().label(), "customer-name");
/// assert!(fields.get("missing").is_err());
/// ```
#[derive(Debug, Clone, Default)]
pub struct FieldSet {
    fields: IndexMap<String, FieldConfig>,
}

impl FieldSet {
    /// Creates a new builder.
    pub fn builder() -> FieldSetBuilder {
        FieldSetBuilder::default()
    }

    /// Looks up a field.
    pub fn get(&self, name: &str) -> SearchResult<&FieldConfig> {
        self.fields
            .get(name)
            .ok_or_else(|| SearchError::UnknownField(name.to_string()))
    }

    /// Returns true if the field is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    /// All fields in registration order.
    pub fn all(&self) -> impl Iterator<Item = &FieldConfig> + '_ {
        self.fields.values()
    }

    /// Number of fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Returns true if no fields are registered.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Builder for [`FieldSet`].
#[derive(Debug, Clone, Default)]
pub struct FieldSetBuilder {
    fields: IndexMap<String, FieldConfig>,
}

impl FieldSetBuilder {
    /// Adds a field with the defaults of its type.
    pub fn add(self, name: impl Into<String>, field_type: FieldType) -> Self {
        self.field(FieldConfig::new(name, field_type))
    }

    /// Adds a field and adjusts its configuration in place.
    pub fn add_with<F>(self, name: impl Into<String>, field_type: FieldType, configure: F) -> Self
    where
        F: FnOnce(FieldConfig) -> FieldConfig,
    {
        self.field(configure(FieldConfig::new(name, field_type)))
    }

    /// Adds a configured field, replacing any field with the same name.
    pub fn field(mut self, config: FieldConfig) -> Self {
        self.fields.insert(config.name.clone(), config);
        self
    }

    /// Builds the field set.
    pub fn build(self) -> FieldSet {
        FieldSet {
            fields: self.fields,
        }
    }

    /// Builds the field set behind an `Arc`.
    pub fn build_shared(self) -> Arc<FieldSet> {
        Arc::new(self.build())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_value_kinds() {
        assert!(FieldType::Text.default_value_kinds().pattern_matches);
        assert!(!FieldType::Text.default_value_kinds().ranges);
        assert!(FieldType::Integer.default_value_kinds().ranges);
        assert!(FieldType::Date.default_value_kinds().comparisons);
        assert_eq!(FieldType::Boolean.default_value_kinds(), ValueKinds::default());
    }

    #[test]
    fn test_parse_values() {
        assert_eq!(FieldType::Integer.parse_value("f", "-12").unwrap(), Value::Integer(-12));
        assert_eq!(
            FieldType::Decimal.parse_value("f", "5.5").unwrap(),
            Value::Decimal("5.50".into())
        );
        assert_eq!(
            FieldType::Timestamp.parse_value("f", "979516800").unwrap().to_string(),
            "2001-01-15T00:00:00Z"
        );
        assert_eq!(FieldType::Boolean.parse_value("f", "No").unwrap(), Value::Boolean(false));
        assert!(matches!(
            FieldType::Integer.parse_value("f", "1.5"),
            Err(SearchError::InvalidValue { .. })
        ));
        assert!(FieldType::Date.parse_value("f", "15-01-2001").is_err());
    }

    #[test]
    fn test_timestamp_view() {
        let value = FieldType::Timestamp.parse_value("f", "979516800").unwrap();
        assert_eq!(FieldType::Timestamp.format_value(&value), "979516800");
        assert_eq!(FieldType::DateTime.format_value(&value), "2001-01-15T00:00:00Z");
    }

    #[test]
    fn test_label_falls_back_to_name() {
        let field = FieldConfig::new("customer", FieldType::Integer);
        assert_eq!(field.label(), "customer");
        let field = field.with_label("klant");
        assert_eq!(field.label(), "klant");
    }

    #[test]
    fn test_field_set_preserves_order() {
        let fields = FieldSet::builder()
            .add("b", FieldType::Text)
            .add("a", FieldType::Integer)
            .build();
        let names: Vec<_> = fields.all().map(|f| f.name()).collect();
        assert_eq!(names, vec!["b", "a"]);
        assert_eq!(fields.len(), 2);
    }
}
