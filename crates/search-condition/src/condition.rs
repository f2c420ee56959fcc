//! The condition tree: groups of per-field value bags.

use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;

use crate::error::{SearchError, SearchResult};
use crate::field::FieldSet;
use crate::value::{Compare, PatternMatch, Range, Value};

/// How the members of a group are combined.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "UPPERCASE"))]
pub enum GroupLogical {
    /// All members must match.
    #[default]
    And,
    /// At least one member must match.
    Or,
}

impl GroupLogical {
    /// `AND` or `OR`.
    pub fn as_str(&self) -> &'static str {
        match self {
            GroupLogical::And => "AND",
            GroupLogical::Or => "OR",
        }
    }
}

impl fmt::Display for GroupLogical {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One value of a bag, tagged with its kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BagEntry<'a> {
    /// A value the field must equal.
    Simple(&'a Value),
    /// A value the field must not equal.
    Excluded(&'a Value),
    /// A range the field must fall in.
    Range(&'a Range),
    /// A range the field must fall outside of.
    ExcludedRange(&'a Range),
    /// A comparison.
    Compare(&'a Compare),
    /// A pattern match.
    PatternMatch(&'a PatternMatch),
}

impl BagEntry<'_> {
    /// Kind name used in diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            BagEntry::Simple(_) => "simple value",
            BagEntry::Excluded(_) => "excluded value",
            BagEntry::Range(_) => "range",
            BagEntry::ExcludedRange(_) => "excluded range",
            BagEntry::Compare(_) => "comparison",
            BagEntry::PatternMatch(_) => "pattern match",
        }
    }
}

/// All values given for one field within one group.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ValuesBag {
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Vec::is_empty"))]
    simple: Vec<Value>,
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Vec::is_empty"))]
    excluded: Vec<Value>,
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Vec::is_empty"))]
    ranges: Vec<Range>,
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Vec::is_empty"))]
    excluded_ranges: Vec<Range>,
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Vec::is_empty"))]
    comparisons: Vec<Compare>,
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Vec::is_empty"))]
    pattern_matches: Vec<PatternMatch>,
}

impl ValuesBag {
    /// Creates an empty bag.
    pub fn new() -> Self {
        Self::default()
    }

    /// Simple values.
    pub fn simple_values(&self) -> &[Value] {
        &self.simple
    }

    /// Excluded simple values.
    pub fn excluded_values(&self) -> &[Value] {
        &self.excluded
    }

    /// Ranges.
    pub fn ranges(&self) -> &[Range] {
        &self.ranges
    }

    /// Excluded ranges.
    pub fn excluded_ranges(&self) -> &[Range] {
        &self.excluded_ranges
    }

    /// Comparisons.
    pub fn comparisons(&self) -> &[Compare] {
        &self.comparisons
    }

    /// Pattern matches.
    pub fn pattern_matches(&self) -> &[PatternMatch] {
        &self.pattern_matches
    }

    /// Adds a simple value.
    pub fn add_simple_value(&mut self, value: impl Into<Value>) {
        self.simple.push(value.into());
    }

    /// Adds an excluded simple value.
    pub fn add_excluded_value(&mut self, value: impl Into<Value>) {
        self.excluded.push(value.into());
    }

    /// Adds a range.
    pub fn add_range(&mut self, range: Range) {
        self.ranges.push(range);
    }

    /// Adds an excluded range.
    pub fn add_excluded_range(&mut self, range: Range) {
        self.excluded_ranges.push(range);
    }

    /// Adds a comparison.
    pub fn add_comparison(&mut self, compare: Compare) {
        self.comparisons.push(compare);
    }

    /// Adds a pattern match.
    pub fn add_pattern_match(&mut self, pattern: PatternMatch) {
        self.pattern_matches.push(pattern);
    }

    /// Appends every value of `other`, keeping per-kind order.
    pub fn merge(&mut self, other: ValuesBag) {
        self.simple.extend(other.simple);
        self.excluded.extend(other.excluded);
        self.ranges.extend(other.ranges);
        self.excluded_ranges.extend(other.excluded_ranges);
        self.comparisons.extend(other.comparisons);
        self.pattern_matches.extend(other.pattern_matches);
    }

    /// Total number of values.
    pub fn count(&self) -> usize {
        self.simple.len()
            + self.excluded.len()
            + self.ranges.len()
            + self.excluded_ranges.len()
            + self.comparisons.len()
            + self.pattern_matches.len()
    }

    /// Returns true if the bag holds no values.
    pub fn is_empty(&self) -> bool {
        self.count() == 0
    }

    /// Every value in bag order: simple, excluded, ranges, excluded ranges,
    /// comparisons, pattern matches.
    pub fn entries(&self) -> impl Iterator<Item = BagEntry<'_>> + '_ {
        self.simple
            .iter()
            .map(BagEntry::Simple)
            .chain(self.excluded.iter().map(BagEntry::Excluded))
            .chain(self.ranges.iter().map(BagEntry::Range))
            .chain(self.excluded_ranges.iter().map(BagEntry::ExcludedRange))
            .chain(self.comparisons.iter().map(BagEntry::Compare))
            .chain(self.pattern_matches.iter().map(BagEntry::PatternMatch))
    }
}

/// A node of the condition tree.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ValuesGroup {
    logical: GroupLogical,
    fields: IndexMap<String, ValuesBag>,
    groups: Vec<ValuesGroup>,
}

impl ValuesGroup {
    /// Creates an empty group.
    pub fn new(logical: GroupLogical) -> Self {
        Self {
            logical,
            fields: IndexMap::new(),
            groups: Vec::new(),
        }
    }

    /// The logical operator.
    pub fn logical(&self) -> GroupLogical {
        self.logical
    }

    /// Field bags in insertion order.
    pub fn fields(&self) -> &IndexMap<String, ValuesBag> {
        &self.fields
    }

    /// The bag of a field, if present.
    pub fn field(&self, name: &str) -> Option<&ValuesBag> {
        self.fields.get(name)
    }

    /// Nested groups.
    pub fn groups(&self) -> &[ValuesGroup] {
        &self.groups
    }

    /// Adds values for a field, merging into an existing bag.
    pub fn add_field(&mut self, name: impl Into<String>, bag: ValuesBag) {
        self.fields.entry(name.into()).or_default().merge(bag);
    }

    /// Adds a nested group.
    pub fn add_group(&mut self, group: ValuesGroup) {
        self.groups.push(group);
    }

    /// Returns true if any bag, here or nested, holds a value.
    pub fn has_values(&self) -> bool {
        self.fields.values().any(|bag| !bag.is_empty()) || self.groups.iter().any(|g| g.has_values())
    }

    /// Number of values, here and nested.
    pub fn count_values(&self) -> usize {
        self.fields.values().map(ValuesBag::count).sum::<usize>()
            + self.groups.iter().map(ValuesGroup::count_values).sum::<usize>()
    }

    /// Checks every field against the field set.
    ///
    /// Fields must be registered, accept the value kinds given for them, and
    /// ranges must not have a lower bound higher than their upper bound.
    pub fn validate(&self, field_set: &FieldSet) -> SearchResult<()> {
        for (name, bag) in &self.fields {
            let config = field_set.get(name)?;
            let kinds = config.value_kinds();

            for entry in bag.entries() {
                let supported = match entry {
                    BagEntry::Simple(_) | BagEntry::Excluded(_) => true,
                    BagEntry::Range(_) | BagEntry::ExcludedRange(_) => kinds.ranges,
                    BagEntry::Compare(_) => kinds.comparisons,
                    BagEntry::PatternMatch(_) => kinds.pattern_matches,
                };
                if !supported {
                    return Err(SearchError::unsupported(name, entry.kind()));
                }
            }

            for range in bag.ranges().iter().chain(bag.excluded_ranges()) {
                if config.comparator().higher_than(&range.lower, &range.upper) {
                    return Err(SearchError::InvalidRange {
                        field: name.clone(),
                        lower: range.lower.to_string(),
                        upper: range.upper.to_string(),
                    });
                }
            }
        }

        self.groups.iter().try_for_each(|g| g.validate(field_set))
    }
}

/// A complete search query: a root group bound to the field set it was
/// built against.
#[derive(Debug, Clone)]
pub struct SearchCondition {
    field_set: Arc<FieldSet>,
    values_group: ValuesGroup,
}

impl SearchCondition {
    /// Validates the tree against the field set and wraps it.
    pub fn new(field_set: Arc<FieldSet>, values_group: ValuesGroup) -> SearchResult<Self> {
        values_group.validate(&field_set)?;
        Ok(Self::new_unchecked(field_set, values_group))
    }

    /// Wraps a tree without validating it.
    ///
    /// Consumers still reject unknown fields when they reach them.
    pub fn new_unchecked(field_set: Arc<FieldSet>, values_group: ValuesGroup) -> Self {
        Self {
            field_set,
            values_group,
        }
    }

    /// The field set.
    pub fn field_set(&self) -> &Arc<FieldSet> {
        &self.field_set
    }

    /// The root group.
    pub fn values_group(&self) -> &ValuesGroup {
        &self.values_group
    }

    /// Returns true if the condition holds no values.
    pub fn is_empty(&self) -> bool {
        !self.values_group.has_values()
    }

    /// Consumes the condition, returning its root group.
    pub fn into_values_group(self) -> ValuesGroup {
        self.values_group
    }
}

impl PartialEq for SearchCondition {
    fn eq(&self, other: &Self) -> bool {
        self.values_group == other.values_group
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::{FieldSet, FieldType};
    use crate::value::{CompareOperator, PatternMatchType};

    fn fields() -> FieldSet {
        FieldSet::builder()
            .add("id", FieldType::Integer)
            .add("name", FieldType::Text)
            .build()
    }

    #[test]
    fn test_bag_entries_order() {
        let mut bag = ValuesBag::new();
        bag.add_comparison(Compare::new(CompareOperator::Greater, 5));
        bag.add_excluded_value(3);
        bag.add_simple_value(1);
        bag.add_range(Range::inclusive(1, 9));

        let kinds: Vec<_> = bag.entries().map(|e| e.kind()).collect();
        assert_eq!(kinds, vec!["simple value", "excluded value", "range", "comparison"]);
        assert_eq!(bag.count(), 4);
    }

    #[test]
    fn test_add_field_merges() {
        let mut group = ValuesGroup::new(GroupLogical::And);
        let mut a = ValuesBag::new();
        a.add_simple_value(1);
        let mut b = ValuesBag::new();
        b.add_simple_value(2);
        group.add_field("id", a);
        group.add_field("id", b);

        assert_eq!(group.fields().len(), 1);
        assert_eq!(
            group.field("id").unwrap().simple_values(),
            &[Value::Integer(1), Value::Integer(2)]
        );
    }

    #[test]
    fn test_has_values_nested() {
        let mut root = ValuesGroup::new(GroupLogical::And);
        root.add_group(ValuesGroup::new(GroupLogical::Or));
        assert!(!root.has_values());

        let mut child = ValuesGroup::new(GroupLogical::Or);
        let mut bag = ValuesBag::new();
        bag.add_simple_value(1);
        child.add_field("id", bag);
        root.add_group(child);
        assert!(root.has_values());
        assert_eq!(root.count_values(), 1);
    }

    #[test]
    fn test_validate_unknown_field() {
        let mut group = ValuesGroup::default();
        group.add_field("missing", ValuesBag::new());
        assert_eq!(
            group.validate(&fields()),
            Err(SearchError::UnknownField("missing".into()))
        );
    }

    #[test]
    fn test_validate_unsupported_kind() {
        let mut group = ValuesGroup::default();
        let mut bag = ValuesBag::new();
        bag.add_pattern_match(PatternMatch::new("1", PatternMatchType::Contains));
        group.add_field("id", bag);
        assert!(matches!(
            group.validate(&fields()),
            Err(SearchError::UnsupportedValueKind { .. })
        ));
    }

    #[test]
    fn test_validate_inverted_range() {
        let mut group = ValuesGroup::default();
        let mut bag = ValuesBag::new();
        bag.add_range(Range::inclusive(10, 2));
        group.add_field("id", bag);
        assert!(matches!(
            group.validate(&fields()),
            Err(SearchError::InvalidRange { .. })
        ));
    }
}
