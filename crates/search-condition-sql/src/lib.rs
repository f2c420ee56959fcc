//! # search-condition-sql
//!
//! Compiles [`search_condition`] conditions into SQL `WHERE` predicates.
//!
//! Fields are mapped to physical columns through a [`ColumnMap`]. A field
//! can be spread over several columns (a *combined field*), in which case
//! its predicate is OR'd over every column. Per-field conversion hooks can
//! rewrite the column reference or the literal values, optionally choosing a
//! strategy per value.
//!
//! ## Quick Start
//!
//! ```rust
//! use search_condition::{
//!     FieldSet, FieldType, GroupLogical, PatternMatch, PatternMatchType, SearchConditionBuilder,
//! };
//! use search_condition_sql::{ColumnMap, PredicateCompiler};
//!
//! let fields = FieldSet::builder()
//!     .add("customer", FieldType::Integer)
//!     .add("customer_name", FieldType::Text)
//!     .build_shared();
//!
//! let mut columns = ColumnMap::new();
//! columns
//!     .set_field("customer", "customer", Some("I"), None)
//!     .set_field("customer_name", "name", Some("C"), None);
//!
//! let condition = SearchConditionBuilder::new(fields)
//!     .field("customer", |bag| bag.simple(2))
//!     .group(GroupLogical::And, |group| {
//!         group.field("customer_name", |bag| {
//!             bag.pattern(PatternMatch::new("foo", PatternMatchType::StartsWith))
//!         })
//!     })
//!     .build()?;
//!
//! let compiler = PredicateCompiler::new(columns);
//! assert_eq!(
//!     compiler.where_clause(&condition, "WHERE ")?,
//!     "WHERE ((I.customer IN(2)) AND ((C.name LIKE 'foo%' ESCAPE '\\')))"
//! );
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Rendering
//!
//! | Value kind | SQL |
//! |------------|-----|
//! | simple values | `col IN(a, b)` |
//! | excluded values | `col NOT IN(a, b)` |
//! | range `a ~ b` | `(col >= a AND col <= b)` |
//! | excluded range `!a ~ b` | `(col <= a OR col >= b)` |
//! | comparison | `col > a` |
//! | contains / starts / ends | `col LIKE '%a%' ESCAPE '\'` |
//! | equals | `col = 'a'` |
//! | regex | `RW_REGEXP('a', col, 'u')` |
//!
//! Groups and fields are always parenthesized. An empty condition compiles
//! to an empty predicate.

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

mod cache;
mod compiler;
mod config;
mod conversion;
mod error;
mod mapping;
mod result;

// Public re-exports
pub use cache::{CacheStats, CachedCompiler};
pub use compiler::PredicateCompiler;
pub use config::{CacheConfig, CompilerConfig, CompilerConfigBuilder, ParameterStyle};
pub use conversion::{
    AnsiConnection, ColumnConversion, Connection, ConversionHints, ConversionStrategy,
    FieldConversion, ValueConversion,
};
pub use error::{CompileError, CompileResult, ConversionError};
pub use mapping::{ColumnMap, QueryField};
pub use result::CompiledPredicate;

// Re-export commonly used types from the condition crate for convenience
pub use search_condition::{FieldOptions, SearchCondition, Value};
