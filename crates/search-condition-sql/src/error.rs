//! Error types for predicate compilation.

use thiserror::Error;

/// A conversion hook rejected a value or column it cannot handle.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("conversion failed for field '{field}': {message}")]
pub struct ConversionError {
    /// Field being converted.
    pub field: String,
    /// Description of the problem.
    pub message: String,
}

impl ConversionError {
    /// Creates a conversion error.
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Errors that can occur while compiling a condition into a predicate.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CompileError {
    /// The field is neither in the field set nor mapped to a column.
    #[error("unknown field: {0}")]
    UnknownField(String),

    /// A conversion hook failed.
    #[error(transparent)]
    Conversion(#[from] ConversionError),
}

/// Result type for compile operations.
pub type CompileResult<T> = std::result::Result<T, CompileError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_unknown_field() {
        let err = CompileError::UnknownField("customer".to_string());
        assert_eq!(err.to_string(), "unknown field: customer");
    }

    #[test]
    fn test_error_display_conversion() {
        let err: CompileError = ConversionError::new("birthday", "only dates are accepted").into();
        assert_eq!(
            err.to_string(),
            "conversion failed for field 'birthday': only dates are accepted"
        );
    }

    #[test]
    fn test_conversion_error_fields() {
        let err = ConversionError::new("age", "negative");
        assert_eq!(err.field, "age");
        assert_eq!(err.message, "negative");
        assert!(matches!(CompileError::from(err), CompileError::Conversion(_)));
    }
}
