//! Partial-update `SET` clause builder.
//!
//! Turns an ordered set of `field -> value` pairs into a `SET` fragment with
//! positional placeholders plus the matching parameter list:
//!
//! ```text
//! {firstName: "Aliya", age: 32}  with  {firstName: "first_name"}
//!   => set_cols: "first_name"=$1, "age"=$2
//!      values:   ["Aliya", 32]
//! ```
//!
//! The builder knows nothing about tables or which columns are legal. Callers
//! only hand it keys from a closed set (see [`crate::models::JobPatch`]).

use crate::error::{JobError, JobResult};
use crate::sql::SqlParam;
use std::sync::Arc;
use tokio_postgres::types::ToSql;

/// Field-name translation table: `(field, column)` pairs.
pub type ColumnMap<'a> = &'a [(&'a str, &'a str)];

/// Insertion-ordered mapping of field names to new values.
///
/// Inserting an existing key replaces its value in place, keeping the original
/// position.
#[derive(Debug, Clone, Default)]
pub struct FieldMap {
    entries: Vec<(String, SqlParam)>,
}

impl FieldMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set `field` to `value`.
    pub fn insert<T>(&mut self, field: impl Into<String>, value: T) -> &mut Self
    where
        T: ToSql + Sync + Send + 'static,
    {
        self.insert_value(field, Arc::new(value))
    }

    /// Set `field` to an already type-erased value.
    pub fn insert_value(&mut self, field: impl Into<String>, value: SqlParam) -> &mut Self {
        let field = field.into();
        match self.entries.iter_mut().find(|entry| entry.0 == field) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((field, value)),
        }
        self
    }

    /// Set `field` only when `value` is present.
    pub fn insert_opt<T>(&mut self, field: impl Into<String>, value: Option<T>) -> &mut Self
    where
        T: ToSql + Sync + Send + 'static,
    {
        if let Some(v) = value {
            self.insert(field, v);
        }
        self
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Field names in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }
}

/// Output of [`sql_for_partial_update`].
#[derive(Debug)]
pub struct PartialUpdate {
    /// Comma-joined `"column"=$n` assignments.
    pub set_cols: String,
    /// `values[n - 1]` binds placeholder `$n`.
    pub values: Vec<SqlParam>,
}

impl PartialUpdate {
    /// Index of the first placeholder free after the `SET` values.
    pub fn next_index(&self) -> usize {
        self.values.len() + 1
    }
}

/// Build a `SET` clause fragment and ordered values for a partial update.
///
/// Each field is translated through `column_map`, falling back to the field
/// name itself. Fails with `InvalidInput` when `data` is empty.
pub fn sql_for_partial_update(data: &FieldMap, column_map: ColumnMap<'_>) -> JobResult<PartialUpdate> {
    if data.is_empty() {
        return Err(JobError::invalid_input("No data"));
    }

    let mut cols = Vec::with_capacity(data.len());
    let mut values = Vec::with_capacity(data.len());
    for (idx, (field, value)) in data.entries.iter().enumerate() {
        let column = column_map
            .iter()
            .find(|(f, _)| *f == field.as_str())
            .map(|(_, c)| *c)
            .unwrap_or(field.as_str());
        cols.push(format!("\"{}\"=${}", column, idx + 1));
        values.push(Arc::clone(value));
    }

    Ok(PartialUpdate {
        set_cols: cols.join(", "),
        values,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_field() {
        let mut data = FieldMap::new();
        data.insert("firstName", "Alyssa".to_string());

        let out = sql_for_partial_update(&data, &[("firstName", "firstName"), ("age", "age")])
            .unwrap();
        assert_eq!(out.set_cols, "\"firstName\"=$1");
        assert_eq!(out.values.len(), 1);
        assert_eq!(out.next_index(), 2);
    }

    #[test]
    fn untranslated_fields_fall_back_to_their_name() {
        let mut data = FieldMap::new();
        data.insert("firstName", "Alyssa".to_string()).insert("age", 35_i32);

        let out = sql_for_partial_update(&data, &[("age", "age")]).unwrap();
        assert_eq!(out.set_cols, "\"firstName\"=$1, \"age\"=$2");
        assert_eq!(out.values.len(), 2);
    }

    #[test]
    fn translates_field_names() {
        let mut data = FieldMap::new();
        data.insert("companyHandle", "c2".to_string())
            .insert("salary", 10_i32);

        let out = sql_for_partial_update(&data, &[("companyHandle", "company_handle")]).unwrap();
        assert_eq!(out.set_cols, "\"company_handle\"=$1, \"salary\"=$2");
    }

    #[test]
    fn empty_data_is_invalid_input() {
        let err = sql_for_partial_update(&FieldMap::new(), &[]).unwrap_err();
        assert!(err.is_invalid_input());
        assert_eq!(err.to_string(), "Invalid input: No data");
    }

    #[test]
    fn placeholders_count_up_from_one() {
        let mut data = FieldMap::new();
        for i in 0..6_i32 {
            data.insert(format!("f{i}"), i);
        }

        let out = sql_for_partial_update(&data, &[]).unwrap();
        let fragments: Vec<&str> = out.set_cols.split(", ").collect();
        assert_eq!(fragments.len(), data.len());
        assert_eq!(out.values.len(), data.len());
        for (i, frag) in fragments.iter().enumerate() {
            assert_eq!(*frag, format!("\"f{i}\"=${}", i + 1));
        }
    }

    #[test]
    fn reinserting_a_field_keeps_one_column() {
        let mut data = FieldMap::new();
        data.insert("title", "a".to_string())
            .insert("salary", 1_i32)
            .insert("title", "b".to_string());

        assert_eq!(data.keys().collect::<Vec<_>>(), vec!["title", "salary"]);
        let out = sql_for_partial_update(&data, &[]).unwrap();
        assert_eq!(out.set_cols, "\"title\"=$1, \"salary\"=$2");
        assert_eq!(out.values.len(), 2);
    }

    #[test]
    fn insert_opt_skips_none() {
        let mut data = FieldMap::new();
        data.insert_opt("salary", None::<i32>)
            .insert_opt("title", Some("x".to_string()));
        assert_eq!(data.keys().collect::<Vec<_>>(), vec!["title"]);
    }
}
