//! [`Driver`] implementation over `sqlx::MySqlPool`.
//!
//! Enabled with the `mysql` feature.
//!
//! ```ignore
//! let pool = sqlx::MySqlPool::connect("mysql://root@localhost/app").await?;
//! let db = sqlctx::Db::new(pool, Duration::from_secs(3));
//! ```

use crate::client::{Driver, ExecResult, Executor, Transaction};
use crate::error::{DbError, DbResult};
use crate::row::Row;
use crate::value::Value;
use sqlx::mysql::{MySql, MySqlArguments, MySqlQueryResult, MySqlRow};
use sqlx::query::Query;
use sqlx::{Column as _, MySqlPool, Row as _, TypeInfo as _};
use std::sync::Arc;

type MySqlQuery<'q> = Query<'q, MySql, MySqlArguments>;

fn bind_values<'q>(mut query: MySqlQuery<'q>, params: &[Value]) -> MySqlQuery<'q> {
    for param in params {
        query = match param.clone() {
            Value::Null => query.bind(None::<String>),
            Value::Bool(v) => query.bind(v),
            Value::Int(v) => query.bind(v),
            Value::UInt(v) => query.bind(v),
            Value::Float(v) => query.bind(v),
            Value::Text(v) => query.bind(v),
            Value::Bytes(v) => query.bind(v),
            Value::Date(v) => query.bind(v),
            Value::DateTime(v) => query.bind(v),
            Value::Json(v) => query.bind(sqlx::types::Json(v)),
        };
    }
    query
}

fn exec_result(res: &MySqlQueryResult) -> ExecResult {
    let result = ExecResult::new(res.rows_affected());
    // MySQL reports 0 when the statement generated no id.
    match res.last_insert_id() {
        0 => result,
        id => result.with_last_insert_id(id),
    }
}

fn cell<T>(row: &MySqlRow, idx: usize, wrap: fn(T) -> Value) -> DbResult<Value>
where
    T: for<'r> sqlx::Decode<'r, MySql> + sqlx::Type<MySql>,
{
    row.try_get::<Option<T>, _>(idx)
        .map(|v| v.map_or(Value::Null, wrap))
        .map_err(|e| DbError::decode(row.column(idx).name(), e.to_string()))
}

fn decode_cell(row: &MySqlRow, idx: usize) -> DbResult<Value> {
    let type_name = row.column(idx).type_info().name();
    match type_name {
        "NULL" => Ok(Value::Null),
        "BOOLEAN" => cell(row, idx, Value::Bool),
        "TINYINT" | "SMALLINT" | "MEDIUMINT" | "INT" | "BIGINT" => cell(row, idx, Value::Int),
        "FLOAT" | "DOUBLE" => cell(row, idx, Value::Float),
        "DATE" => cell(row, idx, Value::Date),
        "DATETIME" | "TIMESTAMP" => cell(row, idx, Value::DateTime),
        "JSON" => cell(row, idx, Value::Json),
        "BINARY" | "VARBINARY" | "TINYBLOB" | "BLOB" | "MEDIUMBLOB" | "LONGBLOB" => {
            cell(row, idx, Value::Bytes)
        }
        name if name.ends_with("UNSIGNED") => cell(row, idx, Value::UInt),
        // DECIMAL, TIME, ENUM, SET and the text types come back as text.
        _ => row
            .try_get_unchecked::<Option<String>, _>(idx)
            .map(|v| v.map_or(Value::Null, Value::Text))
            .map_err(|e| DbError::decode(row.column(idx).name(), e.to_string())),
    }
}

fn convert_rows(rows: &[MySqlRow]) -> DbResult<Vec<Row>> {
    let Some(first) = rows.first() else {
        return Ok(Vec::new());
    };
    let columns: Arc<[String]> = first
        .columns()
        .iter()
        .map(|c| c.name().to_string())
        .collect();

    rows.iter()
        .map(|row| {
            let values = (0..row.len())
                .map(|idx| decode_cell(row, idx))
                .collect::<DbResult<Vec<_>>>()?;
            Ok(Row::new(Arc::clone(&columns), values))
        })
        .collect()
}

fn first_row(row: Option<MySqlRow>) -> DbResult<Row> {
    let row = row.ok_or_else(|| DbError::not_found("query returned no rows"))?;
    convert_rows(std::slice::from_ref(&row))?
        .pop()
        .ok_or_else(|| DbError::not_found("query returned no rows"))
}

impl Executor for MySqlPool {
    async fn execute(&self, sql: &str, params: &[Value]) -> DbResult<ExecResult> {
        let res = bind_values(sqlx::query(sql), params).execute(self).await?;
        Ok(exec_result(&res))
    }

    async fn fetch_one(&self, sql: &str, params: &[Value]) -> DbResult<Row> {
        let row = bind_values(sqlx::query(sql), params)
            .fetch_optional(self)
            .await?;
        first_row(row)
    }

    async fn fetch_all(&self, sql: &str, params: &[Value]) -> DbResult<Vec<Row>> {
        let rows = bind_values(sqlx::query(sql), params).fetch_all(self).await?;
        convert_rows(&rows)
    }
}

impl Driver for MySqlPool {
    type Tx = MySqlTx;

    async fn begin(&self) -> DbResult<MySqlTx> {
        let tx = sqlx::Pool::begin(self).await?;
        Ok(MySqlTx {
            inner: tokio::sync::Mutex::new(tx),
        })
    }
}

/// An open MySQL transaction.
///
/// Statements are serialized on the underlying connection. Dropping it
/// without commit rolls back when the connection returns to the pool.
pub struct MySqlTx {
    inner: tokio::sync::Mutex<sqlx::Transaction<'static, MySql>>,
}

impl std::fmt::Debug for MySqlTx {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MySqlTx").finish_non_exhaustive()
    }
}

impl Executor for MySqlTx {
    async fn execute(&self, sql: &str, params: &[Value]) -> DbResult<ExecResult> {
        let mut tx = self.inner.lock().await;
        let res = bind_values(sqlx::query(sql), params)
            .execute(&mut **tx)
            .await?;
        Ok(exec_result(&res))
    }

    async fn fetch_one(&self, sql: &str, params: &[Value]) -> DbResult<Row> {
        let mut tx = self.inner.lock().await;
        let row = bind_values(sqlx::query(sql), params)
            .fetch_optional(&mut **tx)
            .await?;
        first_row(row)
    }

    async fn fetch_all(&self, sql: &str, params: &[Value]) -> DbResult<Vec<Row>> {
        let mut tx = self.inner.lock().await;
        let rows = bind_values(sqlx::query(sql), params)
            .fetch_all(&mut **tx)
            .await?;
        convert_rows(&rows)
    }
}

impl Transaction for MySqlTx {
    async fn commit(self) -> DbResult<()> {
        Ok(self.inner.into_inner().commit().await?)
    }

    async fn rollback(self) -> DbResult<()> {
        Ok(self.inner.into_inner().rollback().await?)
    }
}
