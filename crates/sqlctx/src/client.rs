//! Driver traits for unified database access.
//!
//! sqlctx builds SQL text and parameter lists; executing them is delegated to
//! whatever implements these traits. A driver owns its own connection pool.
//! Transactions expose the same [`Executor`] surface so a builder context can
//! run against either one.

use crate::error::DbResult;
use crate::row::Row;
use crate::value::Value;
use std::future::Future;
use std::sync::Arc;

/// Outcome of a statement that does not return rows.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ExecResult {
    /// Number of rows changed by the statement.
    pub rows_affected: u64,
    /// Auto-increment id generated by an insert, if the driver reports one.
    pub last_insert_id: Option<u64>,
}

impl ExecResult {
    pub fn new(rows_affected: u64) -> Self {
        Self {
            rows_affected,
            last_insert_id: None,
        }
    }

    pub fn with_last_insert_id(mut self, id: u64) -> Self {
        self.last_insert_id = Some(id);
        self
    }
}

/// The statement-level surface shared by connections and transactions.
///
/// Deadlines are applied by the caller: the returned futures are wrapped in
/// `tokio::time::timeout` and dropped on expiry, so implementations must be
/// cancel-safe with respect to their own resources.
pub trait Executor: Send + Sync {
    /// Execute a statement and report affected rows.
    fn execute(
        &self,
        sql: &str,
        params: &[Value],
    ) -> impl Future<Output = DbResult<ExecResult>> + Send;

    /// Execute a query and return the **first** row.
    ///
    /// Returns `DbError::NotFound` if no rows are returned.
    fn fetch_one(&self, sql: &str, params: &[Value]) -> impl Future<Output = DbResult<Row>> + Send;

    /// Execute a query and return all rows.
    fn fetch_all(
        &self,
        sql: &str,
        params: &[Value],
    ) -> impl Future<Output = DbResult<Vec<Row>>> + Send;
}

/// A transaction opened by a [`Driver`].
///
/// Dropping a transaction without calling `commit` or `rollback` must roll it
/// back (this is what pooled drivers do when the connection is returned).
pub trait Transaction: Executor {
    fn commit(self) -> impl Future<Output = DbResult<()>> + Send;

    fn rollback(self) -> impl Future<Output = DbResult<()>> + Send;
}

/// A database client able to open transactions.
pub trait Driver: Executor {
    type Tx: Transaction;

    fn begin(&self) -> impl Future<Output = DbResult<Self::Tx>> + Send;
}

// ===== Reference implementations =====

impl<E: Executor> Executor for &E {
    fn execute(
        &self,
        sql: &str,
        params: &[Value],
    ) -> impl Future<Output = DbResult<ExecResult>> + Send {
        (**self).execute(sql, params)
    }

    fn fetch_one(&self, sql: &str, params: &[Value]) -> impl Future<Output = DbResult<Row>> + Send {
        (**self).fetch_one(sql, params)
    }

    fn fetch_all(
        &self,
        sql: &str,
        params: &[Value],
    ) -> impl Future<Output = DbResult<Vec<Row>>> + Send {
        (**self).fetch_all(sql, params)
    }
}

impl<E: Executor> Executor for Arc<E> {
    fn execute(
        &self,
        sql: &str,
        params: &[Value],
    ) -> impl Future<Output = DbResult<ExecResult>> + Send {
        (**self).execute(sql, params)
    }

    fn fetch_one(&self, sql: &str, params: &[Value]) -> impl Future<Output = DbResult<Row>> + Send {
        (**self).fetch_one(sql, params)
    }

    fn fetch_all(
        &self,
        sql: &str,
        params: &[Value],
    ) -> impl Future<Output = DbResult<Vec<Row>>> + Send {
        (**self).fetch_all(sql, params)
    }
}

impl<D: Driver> Driver for Arc<D> {
    type Tx = D::Tx;

    fn begin(&self) -> impl Future<Output = DbResult<Self::Tx>> + Send {
        (**self).begin()
    }
}
