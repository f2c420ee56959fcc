//! Error types for building, parsing and exporting search conditions.

use thiserror::Error;

/// Errors that can occur while working with search conditions.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SearchError {
    /// Input could not be parsed as a number in the requested format.
    #[error("invalid number format '{input}': {message}")]
    Format {
        /// The rejected input.
        input: String,
        /// Description of the problem.
        message: String,
    },

    /// The field is not registered in the field set.
    #[error("unknown field: {0}")]
    UnknownField(String),

    /// A value kind, comparison operator or pattern type that is not supported.
    #[error("unsupported value kind {kind} for field '{field}'")]
    UnsupportedValueKind {
        /// Field the value was given for (empty when not known).
        field: String,
        /// The offending kind, operator or token.
        kind: String,
    },

    /// StringQuery syntax error at a specific position in the input.
    #[error("parse error at position {position}: {message}")]
    Parse {
        /// Position in the input where the error occurred.
        position: usize,
        /// Description of the error.
        message: String,
    },

    /// A textual value could not be converted into the field's value type.
    #[error("invalid value '{value}' for field '{field}': {message}")]
    InvalidValue {
        /// Field the value was given for.
        field: String,
        /// The rejected value.
        value: String,
        /// Description of the problem.
        message: String,
    },

    /// A range whose lower bound is higher than its upper bound.
    #[error("invalid range for field '{field}': lower bound {lower} is higher than upper bound {upper}")]
    InvalidRange {
        /// Field the range was given for.
        field: String,
        /// Lower bound.
        lower: String,
        /// Upper bound.
        upper: String,
    },
}

impl SearchError {
    pub(crate) fn format(input: &str, message: impl Into<String>) -> Self {
        SearchError::Format {
            input: input.to_string(),
            message: message.into(),
        }
    }

    pub(crate) fn unsupported(field: &str, kind: impl Into<String>) -> Self {
        SearchError::UnsupportedValueKind {
            field: field.to_string(),
            kind: kind.into(),
        }
    }
}

/// Result type for search condition operations.
pub type SearchResult<T> = std::result::Result<T, SearchError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_unknown_field() {
        let err = SearchError::UnknownField("customer".to_string());
        assert_eq!(err.to_string(), "unknown field: customer");
    }

    #[test]
    fn test_error_display_parse() {
        let err = SearchError::Parse {
            position: 12,
            message: "expected ':'".to_string(),
        };
        assert_eq!(err.to_string(), "parse error at position 12: expected ':'");
    }

    #[test]
    fn test_error_display_unsupported() {
        let err = SearchError::unsupported("price", "!=");
        assert_eq!(err.to_string(), "unsupported value kind != for field 'price'");
    }
}
