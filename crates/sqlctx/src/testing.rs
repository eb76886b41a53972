//! An in-memory driver that records what it is asked to run.
//!
//! Enabled with the `testing` feature. Nothing is parsed or stored: statements
//! are appended to a log, result rows come from a script, and failures and
//! latency can be injected.
//!
//! ```ignore
//! let driver = RecordingDriver::new();
//! driver.push_rows(RecordingDriver::rows(&["id"], vec![vec![Value::Int(7)]]));
//! let db = Db::new(driver.clone(), Duration::from_secs(1));
//! let id: i64 = db.acquire().name("users").what(["id"]).find_one().await?;
//! assert_eq!(driver.statements()[0].sql, "select id from users");
//! ```

use crate::client::{Driver, ExecResult, Executor, Transaction};
use crate::error::{DbError, DbResult};
use crate::row::Row;
use crate::trace::StatementKind;
use crate::value::Value;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

/// One statement as the driver received it.
#[derive(Debug, Clone, PartialEq)]
pub struct Recorded {
    pub kind: StatementKind,
    pub sql: String,
    pub params: Vec<Value>,
    /// Id of the transaction it ran in, if any.
    pub tx: Option<u64>,
}

/// Transaction lifecycle calls, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TxEvent {
    Begin(u64),
    Commit(u64),
    Rollback(u64),
}

#[derive(Debug, Default)]
struct Script {
    statements: Vec<Recorded>,
    tx_events: Vec<TxEvent>,
    results: VecDeque<Vec<Row>>,
    rows_affected: u64,
    last_insert_id: Option<u64>,
    latency: Option<Duration>,
    fail_statements: Option<String>,
    fail_begin: Option<String>,
    fail_commit: Option<String>,
    fail_rollback: Option<String>,
}

#[derive(Debug, Default)]
struct Inner {
    script: Mutex<Script>,
    next_tx: AtomicU64,
}

/// A cloneable recording [`Driver`]; clones share one log and script.
#[derive(Debug, Clone, Default)]
pub struct RecordingDriver {
    inner: Arc<Inner>,
}

impl RecordingDriver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a result set sharing one column list.
    pub fn rows(columns: &[&str], data: Vec<Vec<Value>>) -> Vec<Row> {
        let columns: Arc<[String]> = columns.iter().map(|c| c.to_string()).collect();
        data.into_iter()
            .map(|values| Row::new(Arc::clone(&columns), values))
            .collect()
    }

    /// Queue the result set for the next fetch. Fetches with nothing queued
    /// see an empty result.
    pub fn push_rows(&self, rows: Vec<Row>) {
        self.script().results.push_back(rows);
    }

    /// What every subsequent execute reports.
    pub fn set_exec_result(&self, rows_affected: u64, last_insert_id: Option<u64>) {
        let mut script = self.script();
        script.rows_affected = rows_affected;
        script.last_insert_id = last_insert_id;
    }

    /// Delay every statement and transaction call by `latency`.
    pub fn set_latency(&self, latency: Duration) {
        self.script().latency = Some(latency);
    }

    /// Make every statement fail with `message`.
    pub fn fail_statements(&self, message: impl Into<String>) {
        self.script().fail_statements = Some(message.into());
    }

    pub fn fail_begin(&self, message: impl Into<String>) {
        self.script().fail_begin = Some(message.into());
    }

    pub fn fail_commit(&self, message: impl Into<String>) {
        self.script().fail_commit = Some(message.into());
    }

    pub fn fail_rollback(&self, message: impl Into<String>) {
        self.script().fail_rollback = Some(message.into());
    }

    /// Statements received so far.
    pub fn statements(&self) -> Vec<Recorded> {
        self.script().statements.clone()
    }

    /// The most recent statement.
    pub fn last(&self) -> Option<Recorded> {
        self.script().statements.last().cloned()
    }

    pub fn tx_events(&self) -> Vec<TxEvent> {
        self.script().tx_events.clone()
    }

    fn script(&self) -> MutexGuard<'_, Script> {
        self.inner
            .script
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    // The guard is dropped before any await.
    async fn delay(&self) {
        let latency = self.script().latency;
        if let Some(latency) = latency {
            tokio::time::sleep(latency).await;
        }
    }

    async fn statement(
        &self,
        kind: StatementKind,
        sql: &str,
        params: &[Value],
        tx: Option<u64>,
    ) -> DbResult<Vec<Row>> {
        self.script().statements.push(Recorded {
            kind,
            sql: sql.to_string(),
            params: params.to_vec(),
            tx,
        });
        self.delay().await;

        let mut script = self.script();
        if let Some(message) = &script.fail_statements {
            return Err(DbError::driver(message.clone()));
        }
        match kind {
            StatementKind::Exec => Ok(Vec::new()),
            StatementKind::FindOne | StatementKind::FindMany => {
                Ok(script.results.pop_front().unwrap_or_default())
            }
        }
    }

    fn exec_result(&self) -> ExecResult {
        let script = self.script();
        ExecResult {
            rows_affected: script.rows_affected,
            last_insert_id: script.last_insert_id,
        }
    }

    async fn tx_call(&self, event: TxEvent) -> DbResult<()> {
        self.delay().await;
        let mut script = self.script();
        let failure = match event {
            TxEvent::Begin(_) => script.fail_begin.clone(),
            TxEvent::Commit(_) => script.fail_commit.clone(),
            TxEvent::Rollback(_) => script.fail_rollback.clone(),
        };
        match failure {
            // A failed begin never opened anything.
            Some(message) if matches!(event, TxEvent::Begin(_)) => Err(DbError::driver(message)),
            Some(message) => {
                script.tx_events.push(event);
                Err(DbError::driver(message))
            }
            None => {
                script.tx_events.push(event);
                Ok(())
            }
        }
    }

    async fn do_execute(&self, sql: &str, params: &[Value], tx: Option<u64>) -> DbResult<ExecResult> {
        self.statement(StatementKind::Exec, sql, params, tx).await?;
        Ok(self.exec_result())
    }

    async fn do_fetch_one(&self, sql: &str, params: &[Value], tx: Option<u64>) -> DbResult<Row> {
        let rows = self.statement(StatementKind::FindOne, sql, params, tx).await?;
        rows.into_iter()
            .next()
            .ok_or_else(|| DbError::not_found("query returned no rows"))
    }

    async fn do_fetch_all(&self, sql: &str, params: &[Value], tx: Option<u64>) -> DbResult<Vec<Row>> {
        self.statement(StatementKind::FindMany, sql, params, tx).await
    }
}

impl Executor for RecordingDriver {
    async fn execute(&self, sql: &str, params: &[Value]) -> DbResult<ExecResult> {
        self.do_execute(sql, params, None).await
    }

    async fn fetch_one(&self, sql: &str, params: &[Value]) -> DbResult<Row> {
        self.do_fetch_one(sql, params, None).await
    }

    async fn fetch_all(&self, sql: &str, params: &[Value]) -> DbResult<Vec<Row>> {
        self.do_fetch_all(sql, params, None).await
    }
}

impl Driver for RecordingDriver {
    type Tx = RecordingTx;

    async fn begin(&self) -> DbResult<RecordingTx> {
        let id = self.inner.next_tx.fetch_add(1, Ordering::Relaxed);
        self.tx_call(TxEvent::Begin(id)).await?;
        Ok(RecordingTx {
            driver: self.clone(),
            id,
        })
    }
}

/// Transaction handle of a [`RecordingDriver`].
#[derive(Debug)]
pub struct RecordingTx {
    driver: RecordingDriver,
    id: u64,
}

impl RecordingTx {
    pub fn id(&self) -> u64 {
        self.id
    }
}

impl Executor for RecordingTx {
    async fn execute(&self, sql: &str, params: &[Value]) -> DbResult<ExecResult> {
        self.driver.do_execute(sql, params, Some(self.id)).await
    }

    async fn fetch_one(&self, sql: &str, params: &[Value]) -> DbResult<Row> {
        self.driver.do_fetch_one(sql, params, Some(self.id)).await
    }

    async fn fetch_all(&self, sql: &str, params: &[Value]) -> DbResult<Vec<Row>> {
        self.driver.do_fetch_all(sql, params, Some(self.id)).await
    }
}

impl Transaction for RecordingTx {
    async fn commit(self) -> DbResult<()> {
        self.driver.tx_call(TxEvent::Commit(self.id)).await
    }

    async fn rollback(self) -> DbResult<()> {
        self.driver.tx_call(TxEvent::Rollback(self.id)).await
    }
}
