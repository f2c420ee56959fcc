//! Predicate compiler: turns a search condition into a SQL boolean
//! expression.

use std::fmt;
use std::sync::Arc;

use search_condition::{
    Compare, FieldConfig, FieldSet, GroupLogical, PatternMatch, PatternMatchType, Range,
    SearchCondition, Value, ValuesBag, ValuesGroup,
};
use tracing::{debug, trace, warn};

use crate::config::{CompilerConfig, ParameterStyle};
use crate::conversion::{AnsiConnection, Connection, ConversionHints, FieldConversion};
use crate::error::{CompileError, CompileResult};
use crate::mapping::{ColumnMap, QueryField};
use crate::result::CompiledPredicate;

/// Compiles [`SearchCondition`]s into SQL predicates.
///
/// The compiler is immutable once built; one instance can serve any number of
/// threads.
///
/// # Example
///
/// ```rust
/// use search_condition::{FieldSet, FieldType, SearchConditionBuilder};
/// use search_condition_sql::{ColumnMap, PredicateCompiler};
///
/// let fields = FieldSet::builder()
///     .add("customer", FieldType::Integer)
///     .build_shared();
///
/// let mut columns = ColumnMap::new();
/// columns.set_field("customer", "customer", Some("I"), None);
///
/// let condition = SearchConditionBuilder::new(fields)
///     .field("customer", |bag| bag.simple(2).simple(5))
///     .build()?;
///
/// let compiler = PredicateCompiler::new(columns);
/// let predicate = compiler.compile(&condition)?;
/// assert_eq!(predicate.sql, "((I.customer IN(2, 5)))");
/// assert_eq!(predicate.parameters.len(), 2);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub struct PredicateCompiler {
    columns: ColumnMap,
    config: CompilerConfig,
    connection: Arc<dyn Connection>,
}

impl PredicateCompiler {
    /// Creates a compiler with default configuration and ANSI quoting.
    pub fn new(columns: ColumnMap) -> Self {
        Self::with_config(columns, CompilerConfig::default())
    }

    /// Creates a compiler with custom configuration.
    ///
    /// # Arguments
    ///
    /// * `columns` - Column mappings and conversion hooks
    /// * `config` - Compiler configuration
    pub fn with_config(columns: ColumnMap, config: CompilerConfig) -> Self {
        Self {
            columns,
            config,
            connection: Arc::new(AnsiConnection),
        }
    }

    /// Replaces the connection used to quote literals.
    pub fn with_connection(mut self, connection: Arc<dyn Connection>) -> Self {
        self.connection = connection;
        self
    }

    /// Returns the compiler configuration.
    pub fn config(&self) -> &CompilerConfig {
        &self.config
    }

    /// Returns the column mappings.
    pub fn columns(&self) -> &ColumnMap {
        &self.columns
    }

    /// Compiles a condition.
    ///
    /// An empty condition compiles to an empty predicate. Any error aborts
    /// the whole compilation.
    ///
    /// # Errors
    ///
    /// * [`CompileError::UnknownField`] - a field is not registered, or has no
    ///   column mapping and unmapped fields are not ignored
    /// * [`CompileError::Conversion`] - a conversion hook rejected a value
    pub fn compile(&self, condition: &SearchCondition) -> CompileResult<CompiledPredicate> {
        let group = condition.values_group();
        debug!(
            fields = group.fields().len(),
            groups = group.groups().len(),
            "compiling search condition"
        );

        let mut compilation = Compilation {
            compiler: self,
            field_set: condition.field_set(),
            parameters: Vec::new(),
        };
        let sql = compilation.group(group)?;

        debug!(
            sql_len = sql.len(),
            parameters = compilation.parameters.len(),
            "compiled search condition"
        );
        Ok(CompiledPredicate::new(sql, compilation.parameters))
    }

    /// Compiles a condition and prepends `prefix` (e.g. `"WHERE "`) when the
    /// predicate is not empty.
    pub fn where_clause(&self, condition: &SearchCondition, prefix: &str) -> CompileResult<String> {
        Ok(self.compile(condition)?.with_prefix(prefix))
    }
}

impl fmt::Debug for PredicateCompiler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PredicateCompiler")
            .field("columns", &self.columns)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

/// The column a field is being rendered against.
#[derive(Clone, Copy)]
struct Target<'c> {
    query_field: &'c QueryField,
    config: &'c FieldConfig,
    conversion: Option<&'c FieldConversion>,
}

impl Target<'_> {
    fn converts_values(&self) -> bool {
        self.conversion.is_some_and(FieldConversion::converts_values)
    }
}

/// State of one compile call.
struct Compilation<'a> {
    compiler: &'a PredicateCompiler,
    field_set: &'a FieldSet,
    parameters: Vec<Value>,
}

impl<'a> Compilation<'a> {
    fn group(&mut self, group: &ValuesGroup) -> CompileResult<String> {
        let mut terms = Vec::new();

        for (name, bag) in group.fields() {
            let term = self.field(name, bag)?;
            if !term.is_empty() {
                terms.push(term);
            }
        }

        for child in group.groups() {
            let term = self.group(child)?;
            if !term.is_empty() {
                terms.push(term);
            }
        }

        if terms.is_empty() {
            return Ok(String::new());
        }

        let separator = match group.logical() {
            GroupLogical::And => " AND ",
            GroupLogical::Or => " OR ",
        };
        Ok(format!("({})", terms.join(separator)))
    }

    fn field(&mut self, name: &str, bag: &ValuesBag) -> CompileResult<String> {
        let compiler = self.compiler;
        let field_set = self.field_set;
        let config = field_set
            .get(name)
            .map_err(|_| CompileError::UnknownField(name.to_string()))?;

        if bag.is_empty() {
            return Ok(String::new());
        }

        let Some(columns) = compiler.columns.lookup(name) else {
            if compiler.config.ignore_unmapped_fields {
                warn!(field = name, "skipping field without column mapping");
                return Ok(String::new());
            }
            return Err(CompileError::UnknownField(name.to_string()));
        };

        trace!(field = name, columns = columns.len(), values = bag.count(), "compiling field");

        let conversion = compiler.columns.conversion(name);
        let mut alternatives = Vec::with_capacity(columns.len());
        for query_field in columns {
            let target = Target {
                query_field,
                config,
                conversion,
            };
            alternatives.push(self.column_terms(target, bag)?);
        }

        if let [terms] = alternatives.as_slice() {
            return Ok(format!("({})", terms.join(" AND ")));
        }

        let alternatives: Vec<String> = alternatives
            .into_iter()
            .map(|terms| wrap_if_many(terms, " AND "))
            .collect();
        Ok(format!("(({}))", alternatives.join(" OR ")))
    }

    /// Every term of one bag against one column, in compile order.
    fn column_terms(&mut self, target: Target<'_>, bag: &ValuesBag) -> CompileResult<Vec<String>> {
        let mut terms = Vec::new();

        if !bag.simple_values().is_empty() {
            terms.push(self.value_set(target, bag.simple_values(), false)?);
        }
        if !bag.excluded_values().is_empty() {
            terms.push(self.value_set(target, bag.excluded_values(), true)?);
        }

        if !bag.ranges().is_empty() {
            let mut parts = Vec::with_capacity(bag.ranges().len());
            for range in bag.ranges() {
                parts.push(self.range(target, range, false)?);
            }
            terms.push(wrap_if_many(parts, " OR "));
        }
        if !bag.excluded_ranges().is_empty() {
            let mut parts = Vec::with_capacity(bag.excluded_ranges().len());
            for range in bag.excluded_ranges() {
                parts.push(self.range(target, range, true)?);
            }
            terms.push(wrap_if_many(parts, " AND "));
        }

        let (ordering, equality): (Vec<&Compare>, Vec<&Compare>) = bag
            .comparisons()
            .iter()
            .partition(|compare| compare.operator.is_ordering());
        if !ordering.is_empty() {
            let mut parts = Vec::with_capacity(ordering.len());
            for compare in ordering {
                parts.push(self.compare(target, compare)?);
            }
            terms.push(wrap_if_many(parts, " AND "));
        }
        for compare in equality {
            terms.push(self.compare(target, compare)?);
        }

        let (negated, positive): (Vec<&PatternMatch>, Vec<&PatternMatch>) = bag
            .pattern_matches()
            .iter()
            .partition(|pattern| pattern.is_exclusive());
        if !positive.is_empty() {
            let mut parts = Vec::with_capacity(positive.len());
            for pattern in positive {
                parts.push(self.pattern(target, pattern)?);
            }
            terms.push(wrap_if_many(parts, " OR "));
        }
        if !negated.is_empty() {
            let mut parts = Vec::with_capacity(negated.len());
            for pattern in negated {
                parts.push(self.pattern(target, pattern)?);
            }
            terms.push(wrap_if_many(parts, " AND "));
        }

        Ok(terms)
    }

    /// `col IN(..)` / `col NOT IN(..)`, or per-value equality when the field
    /// converts its values.
    fn value_set(&mut self, target: Target<'_>, values: &[Value], excluded: bool) -> CompileResult<String> {
        if target.converts_values() {
            let (operator, separator) = if excluded { ("<>", " AND ") } else { ("=", " OR ") };
            let mut parts = Vec::with_capacity(values.len());
            for value in values {
                let strategy = self.strategy(target, value)?;
                let column = self.column(target, strategy)?;
                let value = self.value(target, value, strategy)?;
                parts.push(format!("{} {} {}", column, operator, value));
            }
            return Ok(wrap_if_many(parts, separator));
        }

        let column = self.column(target, None)?;
        let list = values
            .iter()
            .map(|value| self.literal(value))
            .collect::<Vec<_>>()
            .join(", ");
        let operator = if excluded { "NOT IN" } else { "IN" };
        Ok(format!("{} {}({})", column, operator, list))
    }

    /// A bound pair. Excluded ranges invert both operators and join them
    /// with `OR`. Each bound selects its own conversion strategy.
    fn range(&mut self, target: Target<'_>, range: &Range, excluded: bool) -> CompileResult<String> {
        let (lower_column, lower) = self.operand(target, &range.lower)?;
        let (upper_column, upper) = self.operand(target, &range.upper)?;

        let sql = if excluded {
            let lower_op = if range.inclusive_lower { "<=" } else { "<" };
            let upper_op = if range.inclusive_upper { ">=" } else { ">" };
            format!("({lower_column} {lower_op} {lower} OR {upper_column} {upper_op} {upper})")
        } else {
            let lower_op = if range.inclusive_lower { ">=" } else { ">" };
            let upper_op = if range.inclusive_upper { "<=" } else { "<" };
            format!("({lower_column} {lower_op} {lower} AND {upper_column} {upper_op} {upper})")
        };
        Ok(sql)
    }

    /// Column and value for one operand, each converted with the strategy
    /// the operand selects.
    fn operand(&mut self, target: Target<'_>, value: &Value) -> CompileResult<(String, String)> {
        let strategy = self.strategy(target, value)?;
        let column = self.column(target, strategy)?;
        let value = self.value(target, value, strategy)?;
        Ok((column, value))
    }

    fn compare(&mut self, target: Target<'_>, compare: &Compare) -> CompileResult<String> {
        let (column, value) = self.operand(target, &compare.value)?;
        Ok(format!("{} {} {}", column, compare.operator.as_str(), value))
    }

    /// Pattern values are never converted, but the column is, with the
    /// strategy chosen for the pattern text.
    fn pattern(&mut self, target: Target<'_>, pattern: &PatternMatch) -> CompileResult<String> {
        let strategy = self.strategy(target, &Value::Text(pattern.value.clone()))?;
        let column = self.column(target, strategy)?;
        let column = column.as_str();
        let compiler = self.compiler;
        let config = &compiler.config;
        let negated = pattern.is_exclusive();
        let fold = |expr: &str| {
            if pattern.case_insensitive {
                format!("{}({})", config.case_fold_function, expr)
            } else {
                expr.to_string()
            }
        };

        let like = |value: &str| escape_like(value, config.like_escape);
        let like_value = match pattern.pattern_type {
            PatternMatchType::Contains | PatternMatchType::NotContains => {
                Some(format!("%{}%", like(&pattern.value)))
            }
            PatternMatchType::StartsWith | PatternMatchType::NotStartsWith => {
                Some(format!("{}%", like(&pattern.value)))
            }
            PatternMatchType::EndsWith | PatternMatchType::NotEndsWith => {
                Some(format!("%{}", like(&pattern.value)))
            }
            PatternMatchType::Equals
            | PatternMatchType::NotEquals
            | PatternMatchType::Regex
            | PatternMatchType::NotRegex => None,
        };

        if let Some(like_value) = like_value {
            let literal = self.literal(&Value::Text(like_value));
            let operator = if negated { "NOT LIKE" } else { "LIKE" };
            let escape = compiler.connection.quote(&config.like_escape.to_string());
            return Ok(format!(
                "{} {} {} ESCAPE {}",
                fold(column),
                operator,
                fold(&literal),
                escape
            ));
        }

        let literal = self.literal(&Value::Text(pattern.value.clone()));
        let sql = match pattern.pattern_type.positive() {
            PatternMatchType::Regex => {
                let flags = if pattern.case_insensitive { "ui" } else { "u" };
                format!(
                    "{}{}({}, {}, {})",
                    if negated { "NOT " } else { "" },
                    config.regex_function,
                    literal,
                    column,
                    compiler.connection.quote(flags)
                )
            }
            _ => {
                let operator = if negated { "<>" } else { "=" };
                format!("{} {} {}", fold(column), operator, fold(&literal))
            }
        };
        Ok(sql)
    }

    fn strategy(&self, target: Target<'_>, value: &Value) -> CompileResult<Option<u32>> {
        let Some(strategy) = target.conversion.and_then(FieldConversion::strategy) else {
            return Ok(None);
        };
        let column = target.query_field.column_ref();
        let hints = self.hints(target.query_field, &column, None);
        let selected = strategy.conversion_strategy(value, target.config.options(), &hints)?;
        Ok(Some(selected))
    }

    fn column(&self, target: Target<'_>, strategy: Option<u32>) -> CompileResult<String> {
        let column = target.query_field.column_ref();
        match target.conversion.and_then(FieldConversion::column) {
            Some(conversion) => {
                let hints = self.hints(target.query_field, &column, strategy);
                Ok(conversion.convert_column(&column, target.config.options(), &hints)?)
            }
            None => Ok(column),
        }
    }

    fn value(&mut self, target: Target<'_>, value: &Value, strategy: Option<u32>) -> CompileResult<String> {
        match target.conversion.and_then(FieldConversion::value) {
            Some(conversion) => {
                let column = target.query_field.column_ref();
                let hints = self.hints(target.query_field, &column, strategy);
                Ok(conversion.convert_value(value, target.config.options(), &hints)?)
            }
            None => Ok(self.literal(value)),
        }
    }

    fn hints<'h>(
        &'h self,
        field: &'h QueryField,
        column: &'h str,
        conversion_strategy: Option<u32>,
    ) -> ConversionHints<'h> {
        ConversionHints {
            field,
            column,
            conversion_strategy,
            connection: self.compiler.connection.as_ref(),
        }
    }

    /// Renders a literal and records it as a parameter.
    fn literal(&mut self, value: &Value) -> String {
        let compiler = self.compiler;
        let sql = match compiler.config.parameter_style {
            ParameterStyle::Positional => "?".to_string(),
            ParameterStyle::Inline => match value {
                Value::Integer(i) => i.to_string(),
                Value::Decimal(d) => d.clone(),
                Value::Boolean(true) => "TRUE".to_string(),
                Value::Boolean(false) => "FALSE".to_string(),
                other => compiler.connection.quote(&other.to_string()),
            },
        };
        self.parameters.push(value.clone());
        sql
    }
}

/// Joins `parts` and parenthesizes the result when there is more than one.
fn wrap_if_many(parts: Vec<String>, separator: &str) -> String {
    if parts.len() == 1 {
        parts.into_iter().next().unwrap_or_default()
    } else {
        format!("({})", parts.join(separator))
    }
}

/// Escapes `LIKE` wildcards and the escape character itself.
fn escape_like(value: &str, escape: char) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        if c == '%' || c == '_' || c == escape {
            escaped.push(escape);
        }
        escaped.push(c);
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;
    use search_condition::{FieldType, SearchConditionBuilder};

    fn fields() -> Arc<FieldSet> {
        FieldSet::builder()
            .add("id", FieldType::Integer)
            .add("name", FieldType::Text)
            .build_shared()
    }

    fn compiler(config: CompilerConfig) -> PredicateCompiler {
        let mut columns = ColumnMap::new();
        columns.set_field("id", "id", Some("T"), None);
        columns.set_field("name", "name", Some("T"), None);
        PredicateCompiler::with_config(columns, config)
    }

    #[test]
    fn test_escape_like() {
        assert_eq!(escape_like("100%_a\\b", '\\'), "100\\%\\_a\\\\b");
        assert_eq!(escape_like("plain", '!'), "plain");
        assert_eq!(escape_like("a!b", '!'), "a!!b");
    }

    #[test]
    fn test_wrap_if_many() {
        assert_eq!(wrap_if_many(vec!["a".into()], " OR "), "a");
        assert_eq!(wrap_if_many(vec!["a".into(), "b".into()], " OR "), "(a OR b)");
    }

    #[test]
    fn test_literal_rendering() {
        let condition = SearchConditionBuilder::new(fields())
            .field("name", |bag| bag.simple("it's"))
            .build()
            .unwrap();
        let predicate = compiler(CompilerConfig::default()).compile(&condition).unwrap();
        assert_eq!(predicate.sql, "((T.name IN('it''s')))");
        assert_eq!(predicate.parameters, vec![Value::text("it's")]);
    }

    #[test]
    fn test_positional_parameters() {
        let config = CompilerConfig::builder()
            .with_parameter_style(ParameterStyle::Positional)
            .build();
        let condition = SearchConditionBuilder::new(fields())
            .field("id", |bag| bag.simple(1).range(Range::inclusive(5, 9)))
            .field("name", |bag| bag.pattern(PatternMatch::new("a%", PatternMatchType::Contains)))
            .build()
            .unwrap();
        let predicate = compiler(config).compile(&condition).unwrap();

        assert_eq!(
            predicate.sql,
            "((T.id IN(?) AND (T.id >= ? AND T.id <= ?)) AND (T.name LIKE ? ESCAPE '\\'))"
        );
        assert_eq!(
            predicate.parameters,
            vec![
                Value::Integer(1),
                Value::Integer(5),
                Value::Integer(9),
                Value::text("%a\\%%"),
            ]
        );
    }

    #[test]
    fn test_empty_condition() {
        let condition = SearchConditionBuilder::new(fields()).build().unwrap();
        let predicate = compiler(CompilerConfig::default()).compile(&condition).unwrap();
        assert!(predicate.is_empty());
        assert!(predicate.parameters.is_empty());
    }
}
