//! Transactions: an explicit [`Tx`] handle, the [`Db::with_tx`] helper and the
//! [`transaction!`] macro.
//!
//! All three share one completion rule: commit when the work succeeds, roll
//! back when it fails. A failed rollback is reported as
//! [`DbError::Rollback`] carrying both errors.
//!
//! # Example
//!
//! ```ignore
//! let id = db
//!     .with_tx(
//!         |tx, name: String| {
//!             Box::pin(async move {
//!                 let res = tx.acquire().name("users").insert([("name", name)]).await?;
//!                 tx.acquire()
//!                     .name("audit")
//!                     .insert([("user_id", res.last_insert_id)])
//!                     .await?;
//!                 Ok(res.last_insert_id)
//!             })
//!         },
//!         "allen".to_string(),
//!     )
//!     .await?;
//! ```

use crate::client::{Driver, Transaction};
use crate::context::Context;
use crate::db::Db;
use crate::error::{DbError, DbResult};
use std::future::Future;
use std::pin::Pin;

/// Boxed future returned by [`Db::with_tx`] work closures.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// An open transaction on a [`Db`].
///
/// Dropping a `Tx` without [`commit`](Self::commit) or
/// [`rollback`](Self::rollback) leaves cleanup to the driver, which rolls back.
pub struct Tx<'db, D: Driver> {
    db: &'db Db<D>,
    inner: D::Tx,
}

impl<'db, D: Driver> Tx<'db, D> {
    pub(crate) fn inner(&self) -> &D::Tx {
        &self.inner
    }

    /// Check out a builder context whose statements run in this transaction.
    pub fn acquire(&self) -> Context<'_, D> {
        self.db.acquire_bound(&self.inner)
    }

    pub async fn commit(self) -> DbResult<()> {
        let result = self.db.run(self.inner.commit()).await;
        match &result {
            Ok(()) => tracing::debug!(target: "sqlctx.tx", "commit"),
            Err(e) => tracing::debug!(target: "sqlctx.tx", error = %e, "commit failed"),
        }
        result
    }

    pub async fn rollback(self) -> DbResult<()> {
        let result = self.db.run(self.inner.rollback()).await;
        match &result {
            Ok(()) => tracing::debug!(target: "sqlctx.tx", "rollback"),
            Err(e) => tracing::warn!(target: "sqlctx.tx", error = %e, "rollback failed"),
        }
        result
    }

    /// Commit on `Ok`, roll back on `Err`.
    ///
    /// The work's error is returned unchanged when the rollback succeeds.
    pub async fn finish<R>(self, result: DbResult<R>) -> DbResult<R> {
        match result {
            Ok(value) => {
                self.commit().await?;
                Ok(value)
            }
            Err(cause) => match self.rollback().await {
                Ok(()) => Err(cause),
                Err(rollback) => Err(DbError::Rollback {
                    rollback: Box::new(rollback),
                    cause: Box::new(cause),
                }),
            },
        }
    }
}

impl<D: Driver> std::fmt::Debug for Tx<'_, D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Tx").finish_non_exhaustive()
    }
}

impl<D: Driver> Db<D> {
    /// Open a transaction.
    pub async fn begin(&self) -> DbResult<Tx<'_, D>> {
        let inner = self.run(self.driver().begin()).await?;
        tracing::debug!(target: "sqlctx.tx", "begin");
        Ok(Tx { db: self, inner })
    }

    /// Run `work(tx, arg)` inside a transaction.
    ///
    /// - Begin fails: that error is returned and `work` never runs.
    /// - `work` succeeds: commit, returning the commit error if any.
    /// - `work` fails: roll back and return its error, or
    ///   [`DbError::Rollback`] if the rollback fails too.
    pub async fn with_tx<'db, A, R, F>(&'db self, work: F, arg: A) -> DbResult<R>
    where
        F: for<'t> FnOnce(&'t Tx<'db, D>, A) -> BoxFuture<'t, DbResult<R>>,
    {
        let tx = self.begin().await?;
        let result = work(&tx, arg).await;
        tx.finish(result).await
    }
}

/// Runs the given block inside a transaction on a [`Db`].
///
/// - Begins via `$db.begin().await?`.
/// - Commits on `Ok(_)`.
/// - Rolls back on `Err(_)`.
///
/// The block must evaluate to `sqlctx::DbResult<T>`.
///
/// # Example
///
/// ```ignore
/// let moved = sqlctx::transaction!(db, tx, {
///     tx.acquire().name("accounts").where_("id=?", params![1]).update("balance=balance-?", params![100]).await?;
///     tx.acquire().name("accounts").where_("id=?", params![2]).update("balance=balance+?", params![100]).await
/// })?;
/// ```
#[macro_export]
macro_rules! transaction {
    ($db:expr, $tx:ident, $body:block) => {{
        match ($db).begin().await {
            Ok($tx) => {
                let __sqlctx_tx_result = async { $body }.await;
                $tx.finish(__sqlctx_tx_result).await
            }
            Err(e) => Err(e),
        }
    }};
}
