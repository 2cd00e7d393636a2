//! SQLite backend for the Payday persistence layer.
//!
//! Wraps [`tokio_rusqlite`] so all database access runs on a dedicated
//! thread without blocking the async runtime. Mutation safety is delegated
//! to per-row `version` columns (optimistic concurrency); there is no
//! application-level locking and no in-process caching of query results.

mod encode;
mod schema;
mod store;

pub mod error;

pub use error::{Error, Result};
pub use store::SqliteStore;

#[cfg(test)]
mod tests;
