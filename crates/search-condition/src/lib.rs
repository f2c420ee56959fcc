//! # search-condition
//!
//! A structured search condition model with a compact, human-writable
//! text notation.
//!
//! This crate provides:
//! - **Condition model**: nested AND/OR groups of per-field value bags
//!   (simple values, exclusions, ranges, comparisons, pattern matches)
//! - **Field registry**: which fields exist, how their values are typed and
//!   compared
//! - **Decimal comparator**: exact, string-based comparison of decimals of
//!   any magnitude and scale
//! - **StringQuery**: an exporter and a parser for the text notation
//!
//! ## Building a condition
//!
//! ```rust
//! use search_condition::{
//!     CompareOperator, FieldSet, FieldType, GroupLogical, PatternMatch, PatternMatchType,
//!     Range, SearchConditionBuilder, StringQueryExporter,
//! };
//!
//! let fields = FieldSet::builder()
//!     .add("id", FieldType::Integer)
//!     .add("name", FieldType::Text)
//!     .build_shared();
//!
//! let condition = SearchConditionBuilder::new(fields)
//!     .field("id", |b| b.simple(2).simple(5).range(Range::inclusive(10, 20)))
//!     .group(GroupLogical::Or, |g| {
//!         g.field("name", |b| b.pattern(PatternMatch::new("foo", PatternMatchType::Contains)))
//!     })
//!     .build()
//!     .unwrap();
//!
//! let text = StringQueryExporter::new().export(&condition).unwrap();
//! assert_eq!(text, "id: 2, 5, 10 ~ 20; *( name: ~* foo );");
//! ```
//!
//! ## StringQuery syntax quick reference
//!
//! | Notation | Meaning | Example |
//! |----------|---------|---------|
//! | `v` | Simple value | `id: 2, 5` |
//! | `!v` | Excluded value | `id: !3` |
//! | `lo ~ hi` | Inclusive range | `id: 1 ~ 10` |
//! | `]lo ~ hi[` | Exclusive bounds | `id: ]1 ~ 10[` |
//! | `!lo ~ hi` | Excluded range | `id: !1 ~ 10` |
//! | `op v` | Comparison (`=`, `<>`, `>`, `<`, `>=`, `<=`) | `id: >= 5` |
//! | `~[i][!]s v` | Pattern match (`*` contains, `>` starts, `<` ends, `?` regex, `=` equals) | `name: ~i!> foo` |
//! | `( ... )` | AND subgroup | `( id: 1; name: x )` |
//! | `*( ... )` | OR subgroup | `*( id: 1; name: x )` |
//! | leading `*` | OR root group | `*id: 1; name: x` |
//!
//! Values containing whitespace or any of `<>[](),;~!*?=&"` are quoted with
//! `"`, doubling embedded quotes.

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

mod builder;
mod comparator;
mod condition;
mod decimal;
mod error;
mod exporter;
mod field;
mod parser;
mod value;

pub use builder::{GroupBuilder, SearchConditionBuilder, ValuesBagBuilder};
pub use comparator::{NaturalComparator, ValueComparator};
pub use condition::{BagEntry, GroupLogical, SearchCondition, ValuesBag, ValuesGroup};
pub use decimal::{DecimalComparator, NumberLocale};
pub use error::{SearchError, SearchResult};
pub use exporter::{pattern_operator, quote_value, LabelResolver, StringQueryExporter};
pub use field::{
    FieldConfig, FieldOptions, FieldSet, FieldSetBuilder, FieldType, OptionValue, ValueKinds,
};
pub use parser::StringQueryParser;
pub use value::{Compare, CompareOperator, PatternMatch, PatternMatchType, Range, Value};
