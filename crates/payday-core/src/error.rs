//! Error types for `payday-core`.
//!
//! Absent records on read paths are `Option::None`, never an error. Lost
//! optimistic-concurrency races are reported through
//! [`UpdateOutcome`](crate::store::UpdateOutcome), not through this enum.

use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum Error {
  /// A page size of zero or less is rejected before any storage access.
  #[error("page size must be positive, got {0}")]
  InvalidPageSize(i64),

  /// A contract was created against an employee that does not exist or has
  /// been soft-deleted.
  #[error("employee not found or deleted: {0}")]
  MissingEmployee(Uuid),

  /// A contract was created against a company that does not exist or has
  /// been soft-deleted.
  #[error("company not found or deleted: {0}")]
  MissingCompany(Uuid),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
