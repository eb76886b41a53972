//! Write terminal operations.

use super::Context;
use crate::client::{Driver, ExecResult};
use crate::error::{DbError, DbResult};
use crate::sql;
use crate::value::Value;

impl<D: Driver> Context<'_, D> {
    /// Insert one row from `(column, value)` pairs.
    ///
    /// Column order follows the iteration order of `data`; with a `HashMap`
    /// that order is unspecified, use a `BTreeMap` or a `Vec` when it matters.
    ///
    /// # Example
    ///
    /// ```ignore
    /// let res = db
    ///     .acquire()
    ///     .name("users")
    ///     .insert([("name", Value::from("allen")), ("age", Value::from(18))])
    ///     .await?;
    /// ```
    pub async fn insert<I, K, V>(self, data: I) -> DbResult<ExecResult>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        let (fields, row): (Vec<String>, Vec<Value>) = data
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .unzip();
        if fields.is_empty() {
            return Err(DbError::malformed("insert needs at least one column"));
        }
        self.insert_batch(fields, [row]).await
    }

    /// Insert several rows: `insert into <table> (<fields>) values (?, …), …`.
    ///
    /// Every row must have exactly `fields.len()` values; otherwise
    /// [`DbError::RowLength`] is returned and nothing is executed.
    pub async fn insert_batch<F, S, R>(mut self, fields: F, rows: R) -> DbResult<ExecResult>
    where
        F: IntoIterator<Item = S>,
        S: Into<String>,
        R: IntoIterator<Item = Vec<Value>>,
    {
        self.state_mut().take_build_error()?;
        let fields: Vec<String> = fields.into_iter().map(Into::into).collect();
        let (query, params) = self
            .state()
            .insert_sql(&fields, rows.into_iter().collect())?;
        self.run_exec(&query, &params).await
    }

    /// `update <table> set <set_clause> <where>`; returns rows affected.
    ///
    /// `args` bind the markers in `set_clause` and come before the filter
    /// params.
    pub async fn update<I>(mut self, set_clause: &str, args: I) -> DbResult<u64>
    where
        I: IntoIterator,
        I::Item: Into<Value>,
    {
        self.state_mut().take_build_error()?;
        let args: Vec<Value> = args.into_iter().map(Into::into).collect();
        let (query, params) = self.state_mut().update_sql(set_clause, args);
        let res = self.run_exec(&query, &params).await?;
        Ok(res.rows_affected)
    }

    /// Update from `(column, value)` pairs, rendered as `col=?, …`.
    ///
    /// Same ordering caveat as [`insert`](Self::insert).
    pub async fn update_map<I, K, V>(self, data: I) -> DbResult<u64>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        let (columns, args): (Vec<String>, Vec<Value>) = data
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .unzip();
        if columns.is_empty() {
            return Err(DbError::malformed("update needs at least one column"));
        }
        let set_clause = sql::set_clause(&columns);
        self.update(&set_clause, args).await
    }

    /// `delete from <table> <where>`; returns rows affected.
    pub async fn delete(mut self) -> DbResult<u64> {
        self.state_mut().take_build_error()?;
        let (query, params) = self.state_mut().delete_sql();
        let res = self.run_exec(&query, &params).await?;
        Ok(res.rows_affected)
    }

    /// Execute caller-supplied SQL verbatim.
    pub async fn exec<I>(mut self, query: impl Into<String>, params: I) -> DbResult<ExecResult>
    where
        I: IntoIterator,
        I::Item: Into<Value>,
    {
        let query = query.into();
        let params: Vec<Value> = params.into_iter().map(Into::into).collect();
        self.state_mut().raw_sql = Some(query.clone());
        self.run_exec(&query, &params).await
    }

    /// Execute a DDL statement such as `create table …`.
    pub async fn create(self, ddl: impl Into<String>) -> DbResult<ExecResult> {
        self.exec(ddl, Vec::<Value>::new()).await
    }

    /// `DROP TABLE IF EXISTS <table>`.
    pub async fn drop_table(self) -> DbResult<ExecResult> {
        if self.state().table.is_empty() {
            return Err(DbError::malformed("drop_table needs a table name"));
        }
        let ddl = format!("DROP TABLE IF EXISTS {}", self.state().table);
        self.exec(ddl, Vec::<Value>::new()).await
    }
}
