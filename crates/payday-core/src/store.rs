//! The store traits and the tagged mutation outcome.
//!
//! The traits are implemented by storage backends (e.g.
//! `payday-store-sqlite`). Callers depend on these abstractions, not on any
//! concrete backend.

use std::future::Future;

use uuid::Uuid;

use crate::{
  company::Company,
  contract::{Contract, ContractResponse, NewContract},
  employee::Employee,
  page::{PageQuery, PageResult},
};

// ─── Mutation outcome ────────────────────────────────────────────────────────

/// The outcome of an optimistic-concurrency update.
///
/// Callers branch on a tagged value instead of catching a storage-specific
/// exception type. A lost race is never silently retried by the store.
#[derive(Debug, Clone, PartialEq)]
pub enum UpdateOutcome<T> {
  /// The write landed; the stored entity carries the bumped version.
  Updated(T),
  /// No active record with that identifier exists any more (deleted or never
  /// created).
  NotFound,
  /// The record still exists but was concurrently modified; the caller's
  /// version token is stale.
  Conflict,
}

impl<T> UpdateOutcome<T> {
  pub fn is_conflict(&self) -> bool { matches!(self, Self::Conflict) }

  pub fn is_not_found(&self) -> bool { matches!(self, Self::NotFound) }

  /// The updated entity, if the write landed.
  pub fn updated(self) -> Option<T> {
    match self {
      Self::Updated(entity) => Some(entity),
      _ => None,
    }
  }
}

// ─── Contract store ──────────────────────────────────────────────────────────

/// Abstraction over the contract persistence backend.
///
/// Read paths always exclude soft-deleted rows unless the method says
/// otherwise, and eagerly load the relations the response shape needs.
///
/// All methods return `Send` futures so the trait can be used in
/// multi-threaded async runtimes.
pub trait ContractStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Reads ─────────────────────────────────────────────────────────────

  /// The primary read entry point: one page of the filtered, sorted,
  /// active contract set.
  ///
  /// The count and the fetch run against the same connection, but are not
  /// one transaction; totals may be stale under concurrent writes.
  fn list_page<'a>(
    &'a self,
    query: &'a PageQuery,
  ) -> impl Future<Output = Result<PageResult<ContractResponse>, Self::Error>> + Send + 'a;

  /// Retrieve an active contract by id. Returns `None` if absent or
  /// soft-deleted.
  fn get_contract(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<ContractResponse>, Self::Error>> + Send + '_;

  /// Retrieve a contract regardless of its soft-delete state.
  fn get_contract_any(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<ContractResponse>, Self::Error>> + Send + '_;

  /// All active contracts held with one company, default order.
  fn list_by_company(
    &self,
    company_id: Uuid,
  ) -> impl Future<Output = Result<Vec<ContractResponse>, Self::Error>> + Send + '_;

  // ── Mutations ─────────────────────────────────────────────────────────

  /// Persist a new contract. The referenced employee and company must exist
  /// and be active; otherwise the input is rejected before persistence.
  fn add_contract(
    &self,
    input: NewContract,
  ) -> impl Future<Output = Result<Contract, Self::Error>> + Send + '_;

  /// Full-replace update keyed by id, guarded by the entity's `version`.
  fn update_contract(
    &self,
    contract: Contract,
  ) -> impl Future<Output = Result<UpdateOutcome<Contract>, Self::Error>> + Send + '_;

  /// Mark a contract deleted. Returns `false` when there is no active
  /// record to delete — including when it was already soft-deleted, so a
  /// second call is a no-op.
  fn soft_delete_contract(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  // ── Referents ─────────────────────────────────────────────────────────

  /// Create an employee that contracts can reference.
  fn add_employee(
    &self,
    name: String,
  ) -> impl Future<Output = Result<Employee, Self::Error>> + Send + '_;

  /// Soft-delete an employee. Existing contracts keep their reference;
  /// read paths surface the relation as `None` from then on.
  fn soft_delete_employee(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;
}

// ─── Company store ───────────────────────────────────────────────────────────

/// Abstraction over the company persistence backend.
pub trait CompanyStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  fn add_company(
    &self,
    company_name: String,
  ) -> impl Future<Output = Result<Company, Self::Error>> + Send + '_;

  /// Retrieve an active company by id.
  fn get_company(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Company>, Self::Error>> + Send + '_;

  fn update_company(
    &self,
    company: Company,
  ) -> impl Future<Output = Result<UpdateOutcome<Company>, Self::Error>> + Send + '_;

  fn soft_delete_company(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;
}
