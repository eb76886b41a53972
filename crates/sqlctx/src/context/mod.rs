//! Fluent builder context.
//!
//! A [`Context`] is checked out of a [`Db`]'s pool, configured with chained
//! calls, and consumed by exactly one terminal operation:
//!
//! ```ignore
//! let users: Vec<User> = db
//!     .acquire()
//!     .name("users")
//!     .where_("age > ?", params![18])
//!     .where_in("status", ["active", "invited"])
//!     .order("id desc")
//!     .limit(20)
//!     .find_many()
//!     .await?;
//! ```
//!
//! Terminal operations take the context by value, and the pooled state goes
//! back to the pool when the context is dropped, whether the operation
//! succeeded, failed, timed out, panicked or was cancelled.

mod mutate;
mod select;
mod state;

pub(crate) use state::ContextState;

use crate::client::{Driver, ExecResult, Executor};
use crate::db::Db;
use crate::error::{DbError, DbResult};
use crate::row::Row;
use crate::sql;
use crate::trace::StatementKind;
use crate::value::Value;

/// A checked-out builder context.
pub struct Context<'a, D: Driver> {
    db: &'a Db<D>,
    tx: Option<&'a D::Tx>,
    state: Option<Box<ContextState>>,
}

impl<'a, D: Driver> Context<'a, D> {
    pub(crate) fn new(db: &'a Db<D>, tx: Option<&'a D::Tx>, state: Box<ContextState>) -> Self {
        Self {
            db,
            tx,
            state: Some(state),
        }
    }

    fn state(&self) -> &ContextState {
        match self.state.as_deref() {
            Some(state) => state,
            None => unreachable!("builder state is only taken on drop"),
        }
    }

    fn state_mut(&mut self) -> &mut ContextState {
        match self.state.as_deref_mut() {
            Some(state) => state,
            None => unreachable!("builder state is only taken on drop"),
        }
    }

    /// Allocation id of the pooled state backing this context.
    pub fn id(&self) -> u64 {
        self.state().id
    }

    /// Whether statements run inside a transaction.
    pub fn in_transaction(&self) -> bool {
        self.tx.is_some()
    }

    /// Parameters bound so far, in placeholder order.
    pub fn params(&self) -> &[Value] {
        &self.state().args
    }

    // ==================== Configuration ====================

    /// Set the table name.
    pub fn name(mut self, table: impl Into<String>) -> Self {
        self.state_mut().table = table.into();
        self
    }

    /// Set the projection.
    ///
    /// Without one, select statements list the destination type's
    /// [`Columns`](crate::Columns), falling back to `*`.
    pub fn what<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let state = self.state_mut();
        state.what.clear();
        state.what.extend(columns.into_iter().map(Into::into));
        self
    }

    /// Append a filter; filters are joined with `and`.
    ///
    /// `params` bind the filter's `?` markers, in order.
    pub fn where_<I>(mut self, filter: impl Into<String>, params: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<Value>,
    {
        self.state_mut()
            .push_where(filter.into(), params.into_iter().map(Into::into));
        self
    }

    /// Append `field in (?, ?, …)` with one marker per value.
    ///
    /// An empty value list cannot produce valid SQL; it is reported as
    /// [`DbError::MalformedInput`] by the terminal operation.
    pub fn where_in<I>(mut self, field: &str, values: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<Value>,
    {
        let values: Vec<Value> = values.into_iter().map(Into::into).collect();
        let state = self.state_mut();
        if values.is_empty() {
            state.record_error(DbError::malformed(format!(
                "where_in on `{field}` needs at least one value"
            )));
            return self;
        }
        state.push_where(sql::in_clause(field, values.len()), values);
        self
    }

    /// Set the order by expression.
    pub fn order(mut self, order: impl Into<String>) -> Self {
        self.state_mut().order = order.into();
        self
    }

    /// Set the group by expression.
    pub fn group(mut self, group: impl Into<String>) -> Self {
        self.state_mut().group = group.into();
        self
    }

    /// Set the having expression. Its params are appended after the filter
    /// params declared so far.
    pub fn having<I>(mut self, having: impl Into<String>, params: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<Value>,
    {
        let state = self.state_mut();
        state.having = having.into();
        state.args.extend(params.into_iter().map(Into::into));
        self
    }

    /// Maximum number of rows; `0` disables the limit clause.
    pub fn limit(mut self, limit: u64) -> Self {
        self.state_mut().limit = limit;
        self
    }

    /// Rows to skip. Only rendered together with a non-zero limit.
    pub fn offset(mut self, offset: u64) -> Self {
        self.state_mut().offset = offset;
        self
    }

    /// Exclusive row lock (`for update`).
    ///
    /// Not checked against [`lock_s`](Self::lock_s); setting both is a caller error.
    pub fn lock_x(mut self) -> Self {
        self.state_mut().lock_x = true;
        self
    }

    /// Shared row lock (`lock in share mode`).
    ///
    /// Not checked against [`lock_x`](Self::lock_x); setting both is a caller error.
    pub fn lock_s(mut self) -> Self {
        self.state_mut().lock_s = true;
        self
    }

    // ==================== Execution ====================

    async fn run_exec(&self, query: &str, params: &[Value]) -> DbResult<ExecResult> {
        self.db
            .tracer()
            .statement(StatementKind::Exec, self.id(), query, params);
        match self.tx {
            Some(tx) => self.db.run(tx.execute(query, params)).await,
            None => self.db.run(self.db.driver().execute(query, params)).await,
        }
    }

    async fn run_fetch_one(&self, query: &str, params: &[Value]) -> DbResult<Row> {
        self.db
            .tracer()
            .statement(StatementKind::FindOne, self.id(), query, params);
        match self.tx {
            Some(tx) => self.db.run(tx.fetch_one(query, params)).await,
            None => self.db.run(self.db.driver().fetch_one(query, params)).await,
        }
    }

    async fn run_fetch_all(&self, query: &str, params: &[Value]) -> DbResult<Vec<Row>> {
        self.db
            .tracer()
            .statement(StatementKind::FindMany, self.id(), query, params);
        match self.tx {
            Some(tx) => self.db.run(tx.fetch_all(query, params)).await,
            None => self.db.run(self.db.driver().fetch_all(query, params)).await,
        }
    }
}

impl<D: Driver> Drop for Context<'_, D> {
    fn drop(&mut self) {
        if let Some(state) = self.state.take() {
            self.db.pool().release(state);
        }
    }
}

impl<D: Driver> std::fmt::Debug for Context<'_, D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Context")
            .field("in_transaction", &self.tx.is_some())
            .field("state", &self.state)
            .finish()
    }
}
