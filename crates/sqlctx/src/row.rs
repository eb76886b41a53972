//! Row mapping traits and utilities

use crate::error::{DbError, DbResult};
use crate::value::{FromValue, Value};
use chrono::{NaiveDate, NaiveDateTime};
use std::sync::Arc;

/// A driver-neutral result row: column names plus one [`Value`] per column.
///
/// Column names are shared between all rows of one result set.
#[derive(Clone, Debug, PartialEq)]
pub struct Row {
    columns: Arc<[String]>,
    values: Vec<Value>,
}

impl Row {
    /// Create a row. `values` must be aligned with `columns`.
    pub fn new(columns: Arc<[String]>, values: Vec<Value>) -> Self {
        debug_assert_eq!(columns.len(), values.len());
        Self { columns, values }
    }

    /// Column names in select order.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Cell values in select order.
    pub fn values(&self) -> &[Value] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Raw cell for `column`, if present.
    pub fn get_value(&self, column: &str) -> Option<&Value> {
        self.columns
            .iter()
            .position(|c| c == column)
            .and_then(|idx| self.values.get(idx))
    }

    /// Decode the cell named `column`.
    pub fn try_get<T: FromValue>(&self, column: &str) -> DbResult<T> {
        let value = self
            .get_value(column)
            .ok_or_else(|| DbError::decode(column, "no such column in result set"))?;
        T::from_value(value, column)
    }

    /// Decode the cell at position `idx`.
    pub fn try_get_idx<T: FromValue>(&self, idx: usize) -> DbResult<T> {
        let value = self.values.get(idx).ok_or_else(|| {
            DbError::decode(format!("#{idx}"), "column index out of range")
        })?;
        let column = self.columns.get(idx).map_or("", String::as_str);
        T::from_value(value, column)
    }
}

/// Trait for converting a database row into a Rust value.
///
/// This trait should typically be derived using `#[derive(FromRow)]`
/// from the `sqlctx-derive` crate. Scalars decode the first column, which
/// covers aggregate queries such as `count(id) as total`.
///
/// # Example
///
/// ```ignore
/// use sqlctx::FromRow;
///
/// #[derive(FromRow)]
/// struct User {
///     id: u64,
///     name: String,
///     #[orm(column = "email_address")]
///     email: Option<String>,
/// }
/// ```
pub trait FromRow: Sized {
    /// Convert a database row into Self
    fn from_row(row: &Row) -> DbResult<Self>;
}

/// Ahead-of-time column mapping for a destination type.
///
/// Select statements built without an explicit projection list these columns
/// instead of `*`, so adding a column to the table does not break existing
/// destination types. An empty list falls back to `*`.
///
/// Usually derived with `#[derive(Columns)]`; the list is a `'static` constant,
/// resolved once per type at compile time.
pub trait Columns {
    /// Column names in field declaration order.
    fn columns() -> &'static [&'static str];
}

impl FromRow for Row {
    fn from_row(row: &Row) -> DbResult<Self> {
        Ok(row.clone())
    }
}

impl Columns for Row {
    fn columns() -> &'static [&'static str] {
        &[]
    }
}

macro_rules! impl_scalar_row {
    ($($ty:ty),*) => {
        $(
            impl FromRow for $ty {
                fn from_row(row: &Row) -> DbResult<Self> {
                    row.try_get_idx(0)
                }
            }

            impl Columns for $ty {
                fn columns() -> &'static [&'static str] {
                    &[]
                }
            }
        )*
    };
}

impl_scalar_row!(
    i8,
    i16,
    i32,
    i64,
    u8,
    u16,
    u32,
    u64,
    f32,
    f64,
    bool,
    String,
    Vec<u8>,
    NaiveDate,
    NaiveDateTime,
    serde_json::Value,
    Value
);

impl<T: FromValue> FromRow for Option<T> {
    fn from_row(row: &Row) -> DbResult<Self> {
        row.try_get_idx(0)
    }
}

impl<T> Columns for Option<T> {
    fn columns() -> &'static [&'static str] {
        &[]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row() -> Row {
        Row::new(
            Arc::from(vec!["id".to_string(), "name".to_string()]),
            vec![Value::UInt(3), Value::Text("allen".into())],
        )
    }

    #[test]
    fn test_try_get_by_name() {
        let row = row();
        assert_eq!(row.try_get::<u64>("id").unwrap(), 3);
        assert_eq!(row.try_get::<String>("name").unwrap(), "allen");
    }

    #[test]
    fn test_missing_column_is_decode_error() {
        let err = row().try_get::<i64>("age").unwrap_err();
        assert!(matches!(err, DbError::Decode { ref column, .. } if column == "age"));
    }

    #[test]
    fn test_misaligned_row_reports_missing_value() {
        let row = Row {
            columns: Arc::from(vec!["id".to_string(), "name".to_string()]),
            values: vec![Value::Int(1)],
        };
        assert_eq!(row.get_value("id"), Some(&Value::Int(1)));
        assert_eq!(row.get_value("name"), None);
        assert!(row.try_get::<String>("name").is_err());
    }

    #[test]
    fn test_scalar_reads_first_column() {
        assert_eq!(i64::from_row(&row()).unwrap(), 3);
        assert!(<i64 as Columns>::columns().is_empty());
    }
}
