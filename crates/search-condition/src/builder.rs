//! Fluent builder for search conditions.
//!
//! # Example
//!
//! ```rust
//! use search_condition::{
//!     CompareOperator, FieldSet, FieldType, GroupLogical, Range, SearchConditionBuilder,
//! };
//!
//! let fields = FieldSet::builder()
//!     .add("id", FieldType::Integer)
//!     .add("name", FieldType::Text)
//!     .build_shared();
//!
//! let condition = SearchConditionBuilder::new(fields)
//!     .field("id", |bag| bag.simple(2).simple(5).excluded(3))
//!     .group(GroupLogical::Or, |g| {
//!         g.field("id", |bag| bag.range(Range::inclusive(10, 20)))
//!             .field("id", |bag| bag.compare(CompareOperator::Greater, 100))
//!     })
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(condition.values_group().count_values(), 5);
//! ```

use std::sync::Arc;

use crate::condition::{GroupLogical, SearchCondition, ValuesBag, ValuesGroup};
use crate::error::SearchResult;
use crate::field::FieldSet;
use crate::value::{Compare, CompareOperator, PatternMatch, Range, Value};

/// Collects the values of one field.
#[derive(Debug, Clone, Default)]
pub struct ValuesBagBuilder {
    bag: ValuesBag,
}

impl ValuesBagBuilder {
    /// Adds a simple value.
    pub fn simple(mut self, value: impl Into<Value>) -> Self {
        self.bag.add_simple_value(value);
        self
    }

    /// Adds an excluded simple value.
    pub fn excluded(mut self, value: impl Into<Value>) -> Self {
        self.bag.add_excluded_value(value);
        self
    }

    /// Adds a range.
    pub fn range(mut self, range: Range) -> Self {
        self.bag.add_range(range);
        self
    }

    /// Adds an excluded range.
    pub fn excluded_range(mut self, range: Range) -> Self {
        self.bag.add_excluded_range(range);
        self
    }

    /// Adds a comparison.
    pub fn compare(mut self, operator: CompareOperator, value: impl Into<Value>) -> Self {
        self.bag.add_comparison(Compare::new(operator, value));
        self
    }

    /// Adds a pattern match.
    pub fn pattern(mut self, pattern: PatternMatch) -> Self {
        self.bag.add_pattern_match(pattern);
        self
    }

    fn finish(self) -> ValuesBag {
        self.bag
    }
}

/// Builds one group of a condition.
#[derive(Debug, Clone, Default)]
pub struct GroupBuilder {
    group: ValuesGroup,
}

impl GroupBuilder {
    /// Creates a builder for an empty group.
    pub fn new(logical: GroupLogical) -> Self {
        Self {
            group: ValuesGroup::new(logical),
        }
    }

    /// Adds values for a field; repeated calls for one field share its bag.
    pub fn field<F>(mut self, name: impl Into<String>, values: F) -> Self
    where
        F: FnOnce(ValuesBagBuilder) -> ValuesBagBuilder,
    {
        let bag = values(ValuesBagBuilder::default()).finish();
        self.group.add_field(name, bag);
        self
    }

    /// Adds a nested group.
    pub fn group<F>(mut self, logical: GroupLogical, build: F) -> Self
    where
        F: FnOnce(GroupBuilder) -> GroupBuilder,
    {
        let nested = build(GroupBuilder::new(logical)).finish();
        self.group.add_group(nested);
        self
    }

    /// Returns the group without validation.
    pub fn finish(self) -> ValuesGroup {
        self.group
    }
}

/// Builds a validated [`SearchCondition`].
#[derive(Debug, Clone)]
pub struct SearchConditionBuilder {
    field_set: Arc<FieldSet>,
    root: GroupBuilder,
}

impl SearchConditionBuilder {
    /// Creates a builder whose root group is AND-combined.
    pub fn new(field_set: Arc<FieldSet>) -> Self {
        Self::with_logical(field_set, GroupLogical::And)
    }

    /// Creates a builder with the given root operator.
    pub fn with_logical(field_set: Arc<FieldSet>, logical: GroupLogical) -> Self {
        Self {
            field_set,
            root: GroupBuilder::new(logical),
        }
    }

    /// Adds values for a field of the root group.
    pub fn field<F>(mut self, name: impl Into<String>, values: F) -> Self
    where
        F: FnOnce(ValuesBagBuilder) -> ValuesBagBuilder,
    {
        self.root = self.root.field(name, values);
        self
    }

    /// Adds a nested group to the root group.
    pub fn group<F>(mut self, logical: GroupLogical, build: F) -> Self
    where
        F: FnOnce(GroupBuilder) -> GroupBuilder,
    {
        self.root = self.root.group(logical, build);
        self
    }

    /// Validates and builds the condition.
    pub fn build(self) -> SearchResult<SearchCondition> {
        SearchCondition::new(self.field_set, self.root.finish())
    }
}
