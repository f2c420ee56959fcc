//! Compiled predicate type.

use std::fmt;

use search_condition::Value;

/// A compiled boolean predicate plus the literals it uses.
///
/// With [`ParameterStyle::Positional`](crate::ParameterStyle::Positional)
/// the SQL holds a `?` per literal and `parameters` lists the values to
/// bind, in order.
///
/// # Example
///
/// ```rust
/// use search_condition_sql::CompiledPredicate;
///
/// let predicate = CompiledPredicate::new("((I.customer IN(2, 5)))", vec![2.into(), 5.into()]);
/// assert_eq!(predicate.with_prefix("WHERE "), "WHERE ((I.customer IN(2, 5)))");
/// assert_eq!(CompiledPredicate::empty().with_prefix("WHERE "), "");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompiledPredicate {
    /// The predicate SQL; empty when the condition holds no values.
    pub sql: String,
    /// Literal values in render order.
    pub parameters: Vec<Value>,
}

impl CompiledPredicate {
    /// Creates a predicate.
    pub fn new(sql: impl Into<String>, parameters: Vec<Value>) -> Self {
        Self {
            sql: sql.into(),
            parameters,
        }
    }

    /// Creates an empty predicate.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Returns true if there is no predicate.
    pub fn is_empty(&self) -> bool {
        self.sql.is_empty()
    }

    /// The SQL preceded by `prefix`, or an empty string for an empty
    /// predicate.
    pub fn with_prefix(&self, prefix: &str) -> String {
        if self.sql.is_empty() {
            String::new()
        } else {
            format!("{}{}", prefix, self.sql)
        }
    }
}

impl fmt::Display for CompiledPredicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.sql)
    }
}
