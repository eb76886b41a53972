//! # sqlctx
//!
//! A fluent, MySQL-dialect query builder over pooled, reusable builder
//! contexts.
//!
//! ## Features
//!
//! - **Fluent builder**: table, projection, filters, grouping, ordering, paging and row locks
//! - **Pooled contexts**: builder state is recycled through a free-list and reset on every use
//! - **One terminal per context**: terminal operations consume the context, which goes back to the pool on drop
//! - **Driver agnostic**: SQL text plus [`Value`] params, executed by any [`Driver`]
//! - **Timeouts everywhere**: every statement and transaction call runs under the handle's deadline
//! - **Transactions**: [`Db::with_tx`], [`Tx`] and the [`transaction!`] macro commit or roll back for you
//!
//! ## Example
//!
//! ```ignore
//! use sqlctx::{Db, FromRow, Columns, params};
//!
//! #[derive(FromRow, Columns)]
//! struct User {
//!     #[orm(column = "id")]
//!     id: i64,
//!     #[orm(column = "name")]
//!     name: String,
//! }
//!
//! let db = Db::new(pool, Duration::from_secs(3));
//!
//! // SELECT id, name FROM users WHERE age > ? ORDER BY id desc LIMIT 0, 10
//! let users: Vec<User> = db
//!     .acquire()
//!     .name("users")
//!     .where_("age > ?", params![18])
//!     .order("id desc")
//!     .limit(10)
//!     .find_many()
//!     .await?;
//!
//! // INSERT
//! db.acquire().name("users").insert([("name", "alice")]).await?;
//!
//! // UPDATE
//! db.acquire()
//!     .name("users")
//!     .where_("id=?", params![7])
//!     .update("name=?", params!["bob"])
//!     .await?;
//! ```

pub mod client;
pub mod config;
pub mod context;
pub mod db;
pub mod error;
pub mod pool;
pub mod row;
pub mod sql;
pub mod trace;
pub mod transaction;
pub mod value;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

#[cfg(feature = "mysql")]
pub mod mysql;

pub use client::{Driver, ExecResult, Executor, Transaction};
pub use config::DbConfig;
pub use context::Context;
pub use db::Db;
pub use error::{BoxError, DbError, DbResult};
pub use pool::ContextPool;
pub use row::{Columns, FromRow, Row};
pub use trace::StatementKind;
pub use transaction::{BoxFuture, Tx};
pub use value::{FromValue, Value};

#[cfg(feature = "derive")]
pub use sqlctx_derive::{Columns, FromRow};
