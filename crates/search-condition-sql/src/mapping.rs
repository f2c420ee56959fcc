//! Column mapping registry.
//!
//! Maps search fields to physical columns. A field mapped through names of
//! the form `field#suffix` is a combined field: one logical field stored in
//! several columns, whose predicates are OR'd.

use std::collections::HashMap;

use crate::conversion::FieldConversion;

/// One physical column a search field maps to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryField {
    /// The name the mapping was registered under (`field` or `field#suffix`).
    pub mapping_name: String,
    /// The search field name.
    pub field_name: String,
    /// Column name.
    pub column: String,
    /// Table alias, if any.
    pub alias: Option<String>,
    /// Database type, if declared.
    pub db_type: Option<String>,
}

impl QueryField {
    /// The column reference: `alias.column`, or `column` without an alias.
    pub fn column_ref(&self) -> String {
        match &self.alias {
            Some(alias) if !alias.is_empty() => format!("{}.{}", alias, self.column),
            _ => self.column.clone(),
        }
    }
}

/// Splits `field#suffix` into the field name and whether it is a combined
/// mapping.
fn split_mapping_name(mapping_name: &str) -> (&str, bool) {
    match mapping_name.split_once('#') {
        Some((field, _)) => (field, true),
        None => (mapping_name, false),
    }
}

/// Registry of column mappings and conversion hooks.
///
/// # Example
///
/// ```rust
/// use search_condition_sql::ColumnMap;
///
/// let mut columns = ColumnMap::new();
/// columns
///     .set_field("customer", "customer", Some("I"), Some("integer"))
///     .set_field("number#1", "id", None, None)
///     .set_field("number#2", "number2", Some("C"), None);
///
/// assert_eq!(columns.lookup("customer").unwrap()[0].column_ref(), "I.customer");
/// assert_eq!(columns.lookup("number").unwrap().len(), 2);
/// ```
#[derive(Debug, Clone, Default)]
pub struct ColumnMap {
    fields: HashMap<String, Vec<QueryField>>,
    conversions: HashMap<String, FieldConversion>,
}

impl ColumnMap {
    /// Creates an empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Maps a field (or one column of a combined field) to a column.
    ///
    /// A plain name replaces every column of the field. A `field#suffix`
    /// name replaces a plain mapping and the column registered under the
    /// same suffix, keeping the other columns.
    pub fn set_field(
        &mut self,
        mapping_name: &str,
        column: &str,
        alias: Option<&str>,
        db_type: Option<&str>,
    ) -> &mut Self {
        let (field_name, combined) = split_mapping_name(mapping_name);
        let query_field = QueryField {
            mapping_name: mapping_name.to_string(),
            field_name: field_name.to_string(),
            column: column.to_string(),
            alias: alias.map(str::to_string),
            db_type: db_type.map(str::to_string),
        };

        let columns = self.fields.entry(field_name.to_string()).or_default();
        if !combined {
            columns.clear();
            columns.push(query_field);
            return self;
        }

        columns.retain(|f| f.mapping_name != field_name);
        match columns.iter_mut().find(|f| f.mapping_name == mapping_name) {
            Some(existing) => *existing = query_field,
            None => columns.push(query_field),
        }
        self
    }

    /// Attaches conversion hooks to a field.
    pub fn set_conversion(&mut self, field_name: &str, conversion: FieldConversion) -> &mut Self {
        self.conversions.insert(field_name.to_string(), conversion);
        self
    }

    /// Columns of a field, in registration order.
    pub fn lookup(&self, field_name: &str) -> Option<&[QueryField]> {
        self.fields
            .get(field_name)
            .map(Vec::as_slice)
            .filter(|columns| !columns.is_empty())
    }

    /// Returns true if the field has at least one column.
    pub fn contains(&self, field_name: &str) -> bool {
        self.lookup(field_name).is_some()
    }

    /// Conversion hooks of a field.
    pub fn conversion(&self, field_name: &str) -> Option<&FieldConversion> {
        self.conversions.get(field_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_column_ref() {
        let mut columns = ColumnMap::new();
        columns.set_field("customer", "customer", Some("I"), None);
        columns.set_field("status", "status", None, None);

        assert_eq!(columns.lookup("customer").unwrap()[0].column_ref(), "I.customer");
        assert_eq!(columns.lookup("status").unwrap()[0].column_ref(), "status");
    }

    #[test]
    fn test_plain_mapping_replaces_columns() {
        let mut columns = ColumnMap::new();
        columns.set_field("customer#1", "id", None, None);
        columns.set_field("customer#2", "number2", None, None);
        columns.set_field("customer", "customer", Some("I"), None);

        let mapped = columns.lookup("customer").unwrap();
        assert_eq!(mapped.len(), 1);
        assert_eq!(mapped[0].column, "customer");
    }

    #[test]
    fn test_combined_mapping_replaces_plain() {
        let mut columns = ColumnMap::new();
        columns.set_field("customer", "customer", Some("I"), Some("integer"));
        columns.set_field("customer#1", "id", None, None);
        columns.set_field("customer#2", "number2", Some("C"), Some("string"));

        let mapped: Vec<_> = columns
            .lookup("customer")
            .unwrap()
            .iter()
            .map(QueryField::column_ref)
            .collect();
        assert_eq!(mapped, vec!["id", "C.number2"]);
    }

    #[test]
    fn test_combined_mapping_replaces_same_suffix() {
        let mut columns = ColumnMap::new();
        columns.set_field("customer#1", "id", None, None);
        columns.set_field("customer#2", "number2", None, None);
        columns.set_field("customer#1", "other", None, None);

        let mapped: Vec<_> = columns
            .lookup("customer")
            .unwrap()
            .iter()
            .map(|f| f.column.as_str())
            .collect();
        assert_eq!(mapped, vec!["other", "number2"]);
        assert_eq!(columns.lookup("customer").unwrap()[0].field_name, "customer");
    }

    #[test]
    fn test_unmapped() {
        let columns = ColumnMap::new();
        assert!(columns.lookup("missing").is_none());
        assert!(!columns.contains("missing"));
        assert!(columns.conversion("missing").is_none());
    }
}
