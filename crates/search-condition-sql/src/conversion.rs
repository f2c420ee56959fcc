//! Conversion hooks.
//!
//! A field may carry hooks that rewrite its column reference (for example a
//! cast or a function call) or its literal values. A strategy hook picks an
//! integer strategy per value first, so one field can render structurally
//! different values with different SQL.

use std::fmt;
use std::sync::Arc;

use search_condition::{FieldOptions, Value};

use crate::error::ConversionError;
use crate::mapping::QueryField;

/// Quotes string literals for the target database.
pub trait Connection: Send + Sync {
    /// Returns `value` as a quoted SQL string literal.
    fn quote(&self, value: &str) -> String;
}

/// ANSI SQL quoting: single quotes, embedded quotes doubled, NUL dropped.
#[derive(Debug, Clone, Copy, Default)]
pub struct AnsiConnection;

impl Connection for AnsiConnection {
    fn quote(&self, value: &str) -> String {
        let mut quoted = String::with_capacity(value.len() + 2);
        quoted.push('\'');
        for c in value.chars() {
            match c {
                '\'' => quoted.push_str("''"),
                '\0' => {}
                c => quoted.push(c),
            }
        }
        quoted.push('\'');
        quoted
    }
}

/// Context handed to a conversion hook for one value/column pair.
#[derive(Clone, Copy)]
pub struct ConversionHints<'a> {
    /// The mapped column being rendered.
    pub field: &'a QueryField,
    /// The raw column reference (`alias.column`).
    pub column: &'a str,
    /// Strategy selected for the current value, when a strategy hook exists.
    pub conversion_strategy: Option<u32>,
    /// Connection used for quoting.
    pub connection: &'a dyn Connection,
}

impl fmt::Debug for ConversionHints<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConversionHints")
            .field("field", self.field)
            .field("column", &self.column)
            .field("conversion_strategy", &self.conversion_strategy)
            .finish_non_exhaustive()
    }
}

/// Rewrites the column reference of a field.
pub trait ColumnConversion: Send + Sync {
    /// Returns the SQL expression used in place of `column`.
    fn convert_column(
        &self,
        column: &str,
        options: &FieldOptions,
        hints: &ConversionHints<'_>,
    ) -> Result<String, ConversionError>;
}

/// Rewrites the literal values of a field.
pub trait ValueConversion: Send + Sync {
    /// Returns the SQL expression used in place of `value`.
    fn convert_value(
        &self,
        value: &Value,
        options: &FieldOptions,
        hints: &ConversionHints<'_>,
    ) -> Result<String, ConversionError>;
}

/// Selects a conversion strategy per value.
pub trait ConversionStrategy: Send + Sync {
    /// Returns the strategy id for `value`.
    fn conversion_strategy(
        &self,
        value: &Value,
        options: &FieldOptions,
        hints: &ConversionHints<'_>,
    ) -> Result<u32, ConversionError>;
}

/// The conversion hooks of one field.
///
/// # Example
///
/// ```rust
/// use std::sync::Arc;
/// use search_condition::FieldOptions;
/// use search_condition_sql::{
///     ColumnConversion, ConversionError, ConversionHints, FieldConversion,
/// };
///
/// struct CastColumn;
///
/// impl ColumnConversion for CastColumn {
///     fn convert_column(
///         &self,
///         column: &str,
///         _options: &FieldOptions,
///         _hints: &ConversionHints<'_>,
///     ) -> Result<String, ConversionError> {
///         Ok(format!("CAST({} AS customer_type)", column))
///     }
/// }
///
/// let conversion = FieldConversion::new().with_column(Arc::new(CastColumn));
/// assert!(!conversion.converts_values());
/// ```
#[derive(Clone, Default)]
pub struct FieldConversion {
    column: Option<Arc<dyn ColumnConversion>>,
    value: Option<Arc<dyn ValueConversion>>,
    strategy: Option<Arc<dyn ConversionStrategy>>,
}

impl fmt::Debug for FieldConversion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldConversion")
            .field("column", &self.column.is_some())
            .field("value", &self.value.is_some())
            .field("strategy", &self.strategy.is_some())
            .finish()
    }
}

impl FieldConversion {
    /// Creates an empty set of hooks.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the column hook.
    pub fn with_column(mut self, conversion: Arc<dyn ColumnConversion>) -> Self {
        self.column = Some(conversion);
        self
    }

    /// Sets the value hook.
    pub fn with_value(mut self, conversion: Arc<dyn ValueConversion>) -> Self {
        self.value = Some(conversion);
        self
    }

    /// Sets the strategy hook.
    pub fn with_strategy(mut self, strategy: Arc<dyn ConversionStrategy>) -> Self {
        self.strategy = Some(strategy);
        self
    }

    /// The column hook.
    pub fn column(&self) -> Option<&dyn ColumnConversion> {
        self.column.as_deref()
    }

    /// The value hook.
    pub fn value(&self) -> Option<&dyn ValueConversion> {
        self.value.as_deref()
    }

    /// The strategy hook.
    pub fn strategy(&self) -> Option<&dyn ConversionStrategy> {
        self.strategy.as_deref()
    }

    /// True when values must be rendered one by one: a value or strategy
    /// hook is present.
    pub fn converts_values(&self) -> bool {
        self.value.is_some() || self.strategy.is_some()
    }
}
