//! Read terminal operations.

use super::Context;
use crate::client::Driver;
use crate::error::DbResult;
use crate::row::{Columns, FromRow};
use crate::value::Value;

impl<D: Driver> Context<'_, D> {
    /// Render the select statement for destination type `T` without running it.
    pub fn select_sql<T: Columns>(&self) -> String {
        let state = self.state();
        match &state.raw_sql {
            Some(raw) => raw.clone(),
            None => state.select_sql(T::columns()),
        }
    }

    /// Fetch the first matching row into `T`.
    ///
    /// Returns `DbError::NotFound` when nothing matches.
    ///
    /// # Example
    ///
    /// ```ignore
    /// let user: User = db.acquire().name("users").where_("id=?", params![1]).find_one().await?;
    /// let total: i64 = db.acquire().name("users").what(["count(id) as total"]).find_one().await?;
    /// ```
    pub async fn find_one<T: FromRow + Columns>(mut self) -> DbResult<T> {
        self.state_mut().take_build_error()?;
        let query = self.select_sql::<T>();
        let row = self.run_fetch_one(&query, &self.state().args).await?;
        T::from_row(&row)
    }

    /// Fetch every matching row into `T`.
    pub async fn find_many<T: FromRow + Columns>(mut self) -> DbResult<Vec<T>> {
        self.state_mut().take_build_error()?;
        let query = self.select_sql::<T>();
        let rows = self.run_fetch_all(&query, &self.state().args).await?;
        rows.iter().map(T::from_row).collect()
    }

    /// Run caller-supplied SQL and fetch the first row into `T`.
    ///
    /// Built fields are ignored.
    pub async fn get<T, I>(mut self, query: impl Into<String>, params: I) -> DbResult<T>
    where
        T: FromRow,
        I: IntoIterator,
        I::Item: Into<Value>,
    {
        self.set_raw(query.into(), params);
        let state = self.state();
        let query = state.raw_sql.as_deref().unwrap_or_default();
        let row = self.run_fetch_one(query, &state.args).await?;
        T::from_row(&row)
    }

    /// Run caller-supplied SQL and fetch every row into `T`.
    ///
    /// Built fields are ignored.
    pub async fn select<T, I>(mut self, query: impl Into<String>, params: I) -> DbResult<Vec<T>>
    where
        T: FromRow,
        I: IntoIterator,
        I::Item: Into<Value>,
    {
        self.set_raw(query.into(), params);
        let state = self.state();
        let query = state.raw_sql.as_deref().unwrap_or_default();
        let rows = self.run_fetch_all(query, &state.args).await?;
        rows.iter().map(T::from_row).collect()
    }

    fn set_raw<I>(&mut self, query: String, params: I)
    where
        I: IntoIterator,
        I::Item: Into<Value>,
    {
        let state = self.state_mut();
        state.raw_sql = Some(query);
        state.args.clear();
        state.args.extend(params.into_iter().map(Into::into));
    }
}
