//! Configuration types for the predicate compiler.

use std::time::Duration;

/// How literal values end up in the compiled SQL.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ParameterStyle {
    /// Literals are quoted into the SQL text.
    #[default]
    Inline,
    /// Literals are replaced by `?` and returned for binding.
    Positional,
}

/// Configuration for the predicate compiler.
///
/// # Example
///
/// ```rust
/// use search_condition_sql::{CacheConfig, CompilerConfig, ParameterStyle};
/// use std::time::Duration;
///
/// let config = CompilerConfig::builder()
///     .with_parameter_style(ParameterStyle::Positional)
///     .with_case_fold_function("UPPER")
///     .with_cache(CacheConfig {
///         max_entries: 500,
///         ttl: Duration::from_secs(60),
///     })
///     .build();
///
/// assert_eq!(config.regex_function, "RW_REGEXP");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompilerConfig {
    /// Literal rendering.
    pub parameter_style: ParameterStyle,
    /// Function wrapped around both operands of case-insensitive matches.
    pub case_fold_function: String,
    /// Function called as `f(pattern, column, flags)` for regex matches.
    pub regex_function: String,
    /// Escape character of `LIKE` patterns.
    pub like_escape: char,
    /// Skip fields without a column mapping instead of failing.
    pub ignore_unmapped_fields: bool,
    /// Cache configuration (None = caching disabled).
    pub cache: Option<CacheConfig>,
}

impl Default for CompilerConfig {
    fn default() -> Self {
        Self {
            parameter_style: ParameterStyle::Inline,
            case_fold_function: "LOWER".to_string(),
            regex_function: "RW_REGEXP".to_string(),
            like_escape: '\\',
            ignore_unmapped_fields: false,
            cache: None,
        }
    }
}

impl CompilerConfig {
    /// Creates a new builder for CompilerConfig.
    pub fn builder() -> CompilerConfigBuilder {
        CompilerConfigBuilder::default()
    }
}

/// Builder for CompilerConfig.
#[derive(Debug, Clone, Default)]
pub struct CompilerConfigBuilder {
    config: CompilerConfig,
}

impl CompilerConfigBuilder {
    /// Sets the literal rendering style.
    pub fn with_parameter_style(mut self, style: ParameterStyle) -> Self {
        self.config.parameter_style = style;
        self
    }

    /// Sets the case-folding function.
    pub fn with_case_fold_function(mut self, function: impl Into<String>) -> Self {
        self.config.case_fold_function = function.into();
        self
    }

    /// Sets the regex function.
    pub fn with_regex_function(mut self, function: impl Into<String>) -> Self {
        self.config.regex_function = function.into();
        self
    }

    /// Sets the `LIKE` escape character.
    pub fn with_like_escape(mut self, escape: char) -> Self {
        self.config.like_escape = escape;
        self
    }

    /// Skips unmapped fields instead of failing.
    pub fn with_ignore_unmapped_fields(mut self, ignore: bool) -> Self {
        self.config.ignore_unmapped_fields = ignore;
        self
    }

    /// Enables caching with the given configuration.
    pub fn with_cache(mut self, cache: CacheConfig) -> Self {
        self.config.cache = Some(cache);
        self
    }

    /// Builds the CompilerConfig.
    pub fn build(self) -> CompilerConfig {
        self.config
    }
}

/// Configuration for the compilation cache.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheConfig {
    /// Maximum number of cached predicates.
    pub max_entries: usize,
    /// Time-to-live for cached entries.
    pub ttl: Duration,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_entries: 1_000,
            ttl: Duration::from_secs(300),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compiler_config_default() {
        let config = CompilerConfig::default();
        assert_eq!(config.parameter_style, ParameterStyle::Inline);
        assert_eq!(config.case_fold_function, "LOWER");
        assert_eq!(config.regex_function, "RW_REGEXP");
        assert_eq!(config.like_escape, '\\');
        assert!(!config.ignore_unmapped_fields);
        assert!(config.cache.is_none());
    }

    #[test]
    fn test_compiler_config_builder() {
        let config = CompilerConfig::builder()
            .with_parameter_style(ParameterStyle::Positional)
            .with_regex_function("REGEXP_LIKE")
            .with_like_escape('!')
            .with_ignore_unmapped_fields(true)
            .with_cache(CacheConfig::default())
            .build();

        assert_eq!(config.parameter_style, ParameterStyle::Positional);
        assert_eq!(config.regex_function, "REGEXP_LIKE");
        assert_eq!(config.like_escape, '!');
        assert!(config.ignore_unmapped_fields);
        assert!(config.cache.is_some());
    }

    #[test]
    fn test_cache_config_default() {
        let cache = CacheConfig::default();
        assert_eq!(cache.max_entries, 1_000);
        assert_eq!(cache.ttl, Duration::from_secs(300));
    }
}
