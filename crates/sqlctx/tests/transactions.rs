//! Commit and rollback behaviour of `Db::with_tx`, `Tx` and `transaction!`.

use sqlctx::testing::{RecordingDriver, TxEvent};
use sqlctx::{Db, DbError, Row, params};
use std::error::Error as _;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

fn db() -> (Db<RecordingDriver>, RecordingDriver) {
    let driver = RecordingDriver::new();
    (Db::new(driver.clone(), Duration::from_secs(5)), driver)
}

#[tokio::test]
async fn with_tx_commits_on_success() {
    let (db, driver) = db();
    driver.set_exec_result(1, Some(11));

    let id = db
        .with_tx(
            |tx, name: String| {
                Box::pin(async move {
                    let res = tx.acquire().name("users").insert([("name", name)]).await?;
                    tx.acquire()
                        .name("audit")
                        .where_("id=?", params![1])
                        .update("user_id=?", params![res.last_insert_id])
                        .await?;
                    Ok::<_, DbError>(res.last_insert_id)
                })
            },
            "allen".to_string(),
        )
        .await
        .unwrap();

    assert_eq!(id, Some(11));
    assert_eq!(driver.tx_events(), vec![TxEvent::Begin(0), TxEvent::Commit(0)]);
    let statements = driver.statements();
    assert_eq!(statements.len(), 2);
    assert!(statements.iter().all(|s| s.tx == Some(0)));
    assert_eq!(statements[0].params, params!["allen"]);
    assert_eq!(statements[1].params, params![11_u64, 1]);
    // the second context reuses the state the first one released
    assert_eq!(db.pool().allocated(), 1);
    assert_eq!(db.pool().idle_count(), 1);
}

#[tokio::test]
async fn with_tx_returns_commit_failure() {
    let (db, driver) = db();
    driver.fail_commit("commit refused");

    let err = db
        .with_tx(
            |tx, _: ()| Box::pin(async move { tx.acquire().name("t").delete().await }),
            (),
        )
        .await
        .unwrap_err();

    assert!(matches!(err, DbError::Driver(_)));
    assert_eq!(driver.tx_events(), vec![TxEvent::Begin(0), TxEvent::Commit(0)]);
}

#[tokio::test]
async fn with_tx_rolls_back_and_returns_work_error() {
    let (db, driver) = db();

    let err = db
        .with_tx(
            |tx, id: i64| {
                Box::pin(async move {
                    tx.acquire()
                        .name("users")
                        .where_("id=?", params![id])
                        .find_one::<Row>()
                        .await
                })
            },
            7,
        )
        .await
        .unwrap_err();

    assert!(err.is_not_found());
    assert_eq!(driver.tx_events(), vec![TxEvent::Begin(0), TxEvent::Rollback(0)]);
}

#[tokio::test]
async fn with_tx_reports_failed_rollback_with_cause() {
    let (db, driver) = db();
    driver.fail_rollback("connection lost");

    let err = db
        .with_tx(
            |_tx, _: ()| Box::pin(async move { Err::<(), _>(DbError::not_found("user 7")) }),
            (),
        )
        .await
        .unwrap_err();

    assert!(matches!(err, DbError::Rollback { .. }));
    assert_eq!(err.to_string(), "Rollback failed: Driver error: connection lost");
    assert!(err.rollback_cause().is_some_and(DbError::is_not_found));
    assert_eq!(
        err.source().map(ToString::to_string).as_deref(),
        Some("Not found: user 7")
    );
    assert_eq!(driver.tx_events(), vec![TxEvent::Begin(0), TxEvent::Rollback(0)]);
}

#[tokio::test]
async fn with_tx_begin_failure_skips_work() {
    let (db, driver) = db();
    driver.fail_begin("too many connections");
    let ran = Arc::new(AtomicBool::new(false));

    let err = db
        .with_tx(
            |_tx, ran: Arc<AtomicBool>| {
                Box::pin(async move {
                    ran.store(true, Ordering::SeqCst);
                    Ok::<_, DbError>(())
                })
            },
            Arc::clone(&ran),
        )
        .await
        .unwrap_err();

    assert!(matches!(err, DbError::Driver(_)));
    assert!(!ran.load(Ordering::SeqCst));
    assert!(driver.tx_events().is_empty());
    assert!(driver.statements().is_empty());
}

#[tokio::test]
async fn begin_is_bounded_by_timeout() {
    let driver = RecordingDriver::new();
    driver.set_latency(Duration::from_millis(500));
    let db = Db::new(driver, Duration::from_millis(20));

    let err = db.begin().await.unwrap_err();
    assert!(err.is_timeout());
}

#[tokio::test]
async fn explicit_tx_rollback() {
    let (db, driver) = db();
    let tx = db.begin().await.unwrap();
    db.acquire_tx(&tx).name("t").delete().await.unwrap();
    tx.rollback().await.unwrap();

    assert_eq!(driver.tx_events(), vec![TxEvent::Begin(0), TxEvent::Rollback(0)]);
}

async fn transfer(db: &Db<RecordingDriver>, amount: i64) -> sqlctx::DbResult<u64> {
    sqlctx::transaction!(db, tx, {
        tx.acquire()
            .name("accounts")
            .where_("id=?", params![1])
            .update("balance=balance-?", params![amount])
            .await?;
        if amount > 100 {
            return Err(DbError::malformed("amount over limit"));
        }
        tx.acquire()
            .name("accounts")
            .where_("id=?", params![2])
            .update("balance=balance+?", params![amount])
            .await
    })
}

#[tokio::test]
async fn transaction_macro_commits_and_rolls_back() {
    let (db, driver) = db();

    transfer(&db, 50).await.unwrap();
    assert_eq!(driver.tx_events(), vec![TxEvent::Begin(0), TxEvent::Commit(0)]);

    let err = transfer(&db, 500).await.unwrap_err();
    assert!(err.is_malformed_input());
    assert_eq!(
        driver.tx_events()[2..],
        [TxEvent::Begin(1), TxEvent::Rollback(1)]
    );
}
