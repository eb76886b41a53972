//! The database handle.

use crate::client::Driver;
use crate::config::DbConfig;
use crate::context::Context;
use crate::error::{DbError, DbResult};
use crate::pool::ContextPool;
use crate::trace::SqlTracer;
use crate::transaction::Tx;
use std::future::Future;
use std::time::Duration;

/// A driver plus the settings every builder context shares.
///
/// `Db` is cheap to share behind an `Arc` or a `&'static`; all methods take
/// `&self` and the context pool is internally synchronized.
///
/// # Example
///
/// ```ignore
/// let db = Db::new(pool, Duration::from_secs(3));
/// let n = db.acquire().name("users").where_("id=?", params![7]).delete().await?;
/// ```
pub struct Db<D: Driver> {
    driver: D,
    timeout: Duration,
    pool: ContextPool,
    tracer: SqlTracer,
}

impl<D: Driver> Db<D> {
    /// Wrap `driver` with a per-statement deadline and default settings.
    pub fn new(driver: D, timeout: Duration) -> Self {
        Self {
            driver,
            timeout,
            pool: ContextPool::default(),
            tracer: SqlTracer::default(),
        }
    }

    /// Wrap `driver` using `config`.
    pub fn with_config(driver: D, config: &DbConfig) -> DbResult<Self> {
        config.validate()?;
        Ok(Self {
            driver,
            timeout: config.query_timeout,
            pool: ContextPool::new(config.max_idle_contexts),
            tracer: SqlTracer::from_config(config),
        })
    }

    pub fn driver(&self) -> &D {
        &self.driver
    }

    /// Deadline applied to each statement.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn pool(&self) -> &ContextPool {
        &self.pool
    }

    pub(crate) fn tracer(&self) -> &SqlTracer {
        &self.tracer
    }

    /// Check out a fresh builder context bound to the driver.
    pub fn acquire(&self) -> Context<'_, D> {
        Context::new(self, None, self.pool.acquire())
    }

    /// Check out a fresh builder context bound to `tx`.
    ///
    /// Every terminal operation of the returned context runs inside the
    /// transaction.
    pub fn acquire_tx<'a>(&'a self, tx: &'a Tx<'_, D>) -> Context<'a, D> {
        self.acquire_bound(tx.inner())
    }

    pub(crate) fn acquire_bound<'a>(&'a self, tx: &'a D::Tx) -> Context<'a, D> {
        Context::new(self, Some(tx), self.pool.acquire())
    }

    /// Await `fut` under the handle's deadline.
    ///
    /// On expiry the future is dropped and `DbError::Timeout` is returned.
    pub(crate) async fn run<T>(&self, fut: impl Future<Output = DbResult<T>>) -> DbResult<T> {
        match tokio::time::timeout(self.timeout, fut).await {
            Ok(result) => result,
            Err(_) => Err(DbError::Timeout(self.timeout)),
        }
    }
}

impl<D: Driver + std::fmt::Debug> std::fmt::Debug for Db<D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Db")
            .field("driver", &self.driver)
            .field("timeout", &self.timeout)
            .field("pool", &self.pool)
            .finish()
    }
}
