//! StringQuery exporter.
//!
//! Serializes a condition into the compact StringQuery notation:
//!
//! ```text
//! id: 2, 5, !3, 10 ~ 20, !]30 ~ 40[, > 100; name: ~i* foo; *( id: 7; status: open )
//! ```
//!
//! Values of one field are written in bag order (simple, excluded, ranges,
//! excluded ranges, comparisons, pattern matches). The exporter is a
//! structural serialization; [`StringQueryParser`](crate::StringQueryParser)
//! reads its output back into an equal tree.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use tracing::debug;

use crate::condition::{BagEntry, GroupLogical, SearchCondition, ValuesBag, ValuesGroup};
use crate::error::{SearchError, SearchResult};
use crate::field::{FieldConfig, FieldType};
use crate::value::{PatternMatch, PatternMatchType, Range, Value};

/// Resolves the label a field is written as.
pub type LabelResolver = Arc<dyn Fn(&FieldConfig) -> String + Send + Sync>;

pub(crate) fn default_label_resolver() -> LabelResolver {
    Arc::new(|field: &FieldConfig| field.label())
}

/// Characters that force a value to be quoted.
pub(crate) const STRUCTURAL_CHARS: &[char] = &[
    '<', '>', '[', ']', '(', ')', ',', ';', '~', '!', '*', '?', '=', '&', '"',
];

/// Quotes a value when it contains structural characters or whitespace,
/// doubling embedded quotes.
///
/// Empty values are quoted as well so they survive a round-trip.
pub fn quote_value(value: &str) -> String {
    let needs_quotes = value.is_empty()
        || value
            .chars()
            .any(|c| c.is_whitespace() || STRUCTURAL_CHARS.contains(&c));

    if needs_quotes {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

/// The `~[i][!]<symbol>` operator of a pattern match.
pub fn pattern_operator(pattern: &PatternMatch) -> String {
    let mut operator = String::from(if pattern.case_insensitive { "~i" } else { "~" });
    if pattern.is_exclusive() {
        operator.push('!');
    }
    operator.push(match pattern.pattern_type {
        PatternMatchType::Contains | PatternMatchType::NotContains => '*',
        PatternMatchType::StartsWith | PatternMatchType::NotStartsWith => '>',
        PatternMatchType::EndsWith | PatternMatchType::NotEndsWith => '<',
        PatternMatchType::Regex | PatternMatchType::NotRegex => '?',
        PatternMatchType::Equals | PatternMatchType::NotEquals => '=',
    });
    operator
}

/// Exports conditions as StringQuery text.
#[derive(Clone)]
pub struct StringQueryExporter {
    label_resolver: LabelResolver,
}

impl fmt::Debug for StringQueryExporter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StringQueryExporter").finish_non_exhaustive()
    }
}

impl Default for StringQueryExporter {
    fn default() -> Self {
        Self::new()
    }
}

impl StringQueryExporter {
    /// Creates an exporter that writes each field's `label` option, or its
    /// name.
    pub fn new() -> Self {
        Self {
            label_resolver: default_label_resolver(),
        }
    }

    /// Creates an exporter with a custom label resolver.
    pub fn with_label_resolver<F>(resolver: F) -> Self
    where
        F: Fn(&FieldConfig) -> String + Send + Sync + 'static,
    {
        Self {
            label_resolver: Arc::new(resolver),
        }
    }

    /// Exports a condition.
    ///
    /// Fails with [`SearchError::UnknownField`] when the tree references a
    /// field missing from the condition's field set.
    pub fn export(&self, condition: &SearchCondition) -> SearchResult<String> {
        let field_set = condition.field_set();
        let labels: HashMap<&str, (String, FieldType)> = field_set
            .all()
            .map(|f| (f.name(), ((self.label_resolver)(f), f.field_type())))
            .collect();

        let group = condition.values_group();
        let body = Self::export_group(group, &labels)?;
        let mut output = String::with_capacity(body.len() + 2);
        if group.logical() == GroupLogical::Or {
            output.push('*');
            // `*(` opens an OR subgroup; keep the root marker apart from it
            if body.starts_with(['(', '*']) {
                output.push(' ');
            }
        }
        output.push_str(&body);

        debug!(
            values = group.count_values(),
            length = output.len(),
            "exported condition as string query"
        );
        Ok(output)
    }

    fn export_group(
        group: &ValuesGroup,
        labels: &HashMap<&str, (String, FieldType)>,
    ) -> SearchResult<String> {
        let mut result = String::new();

        for (name, bag) in group.fields() {
            if bag.is_empty() {
                continue;
            }
            let (label, field_type) = labels
                .get(name.as_str())
                .ok_or_else(|| SearchError::UnknownField(name.clone()))?;
            result.push_str(label);
            result.push_str(": ");
            result.push_str(&Self::export_values(bag, *field_type));
            result.push_str("; ");
        }

        for nested in group.groups() {
            let inner = Self::export_group(nested, labels)?;
            let inner = inner.trim_matches(|c| c == ' ' || c == ';');
            if nested.logical() == GroupLogical::Or {
                result.push('*');
            }
            result.push_str("( ");
            result.push_str(inner);
            result.push_str(" ); ");
        }

        Ok(result.trim().to_string())
    }

    fn export_values(bag: &ValuesBag, field_type: FieldType) -> String {
        let view = |value: &Value| quote_value(&field_type.format_value(value));

        bag.entries()
            .map(|entry| match entry {
                BagEntry::Simple(value) => view(value),
                BagEntry::Excluded(value) => format!("!{}", view(value)),
                BagEntry::Range(range) => Self::export_range(range, field_type),
                BagEntry::ExcludedRange(range) => {
                    format!("!{}", Self::export_range(range, field_type))
                }
                BagEntry::Compare(compare) => {
                    format!("{} {}", compare.operator, view(&compare.value))
                }
                BagEntry::PatternMatch(pattern) => {
                    format!("{} {}", pattern_operator(pattern), quote_value(&pattern.value))
                }
            })
            .collect::<Vec<_>>()
            .join(", ")
    }

    fn export_range(range: &Range, field_type: FieldType) -> String {
        format!(
            "{}{} ~ {}{}",
            if range.inclusive_lower { "" } else { "]" },
            quote_value(&field_type.format_value(&range.lower)),
            quote_value(&field_type.format_value(&range.upper)),
            if range.inclusive_upper { "" } else { "[" },
        )
    }
}
