//! Core types and trait definitions for the Payday persistence layer.
//!
//! This crate is deliberately free of database dependencies. It holds the
//! domain entities, the paging/filter/sort query components (all pure
//! functions), the response DTOs, and the store traits that backends
//! (e.g. `payday-store-sqlite`) implement.

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod company;
pub mod contract;
pub mod employee;
pub mod error;
pub mod filter;
pub mod page;
pub mod sort;
pub mod store;

pub use error::{Error, Result};
