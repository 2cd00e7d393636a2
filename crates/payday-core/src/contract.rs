//! Contract — the central entity of the salary-management domain.
//!
//! A contract always references exactly one employee and one company at
//! creation time. The referenced rows may later be soft-deleted; read paths
//! then surface the relation as `None` rather than failing.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ─── Entity ──────────────────────────────────────────────────────────────────

/// A stored contract, as the storage layer holds it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Contract {
  pub contract_id: Uuid,
  pub job:         String,
  pub start_date:  NaiveDate,
  pub end_date:    Option<NaiveDate>,
  pub employee_id: Uuid,
  pub company_id:  Uuid,
  pub created_at:  DateTime<Utc>,
  /// The soft-delete marker; non-null rows are invisible to read paths.
  pub deleted_at:  Option<DateTime<Utc>>,
  /// Optimistic-concurrency token; starts at 0, bumped on every update.
  pub version:     i64,
}

/// Input for creating a contract. The store assigns id, timestamps and the
/// initial version.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewContract {
  pub job:         String,
  pub start_date:  NaiveDate,
  pub end_date:    Option<NaiveDate>,
  pub employee_id: Uuid,
  pub company_id:  Uuid,
}

// ─── Eagerly-loaded record ───────────────────────────────────────────────────

/// A contract together with its relations, loaded in the same storage round
/// trip as the contract itself. Projection never fetches anything further.
#[derive(Debug, Clone)]
pub struct ContractRecord {
  pub contract: Contract,
  /// `None` when the referenced employee has been soft-deleted.
  pub employee: Option<EmployeeSummary>,
  /// `None` when the referenced company has been soft-deleted.
  pub company:  Option<CompanySummary>,
}

/// The slice of an employee embedded in contract responses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmployeeSummary {
  pub employee_id: Uuid,
  pub name:        String,
}

/// The slice of a company embedded in contract responses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompanySummary {
  pub company_id:   Uuid,
  pub company_name: String,
}

// ─── Response DTO ────────────────────────────────────────────────────────────

/// The external shape of a contract, nested relations included.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContractResponse {
  pub contract_id: Uuid,
  pub job:         String,
  pub start_date:  NaiveDate,
  pub end_date:    Option<NaiveDate>,
  pub employee:    Option<EmployeeSummary>,
  pub company:     Option<CompanySummary>,
  pub created_at:  DateTime<Utc>,
  pub deleted_at:  Option<DateTime<Utc>>,
}

impl ContractResponse {
  /// Field-by-field projection from an eagerly-loaded record. Deterministic
  /// and side-effect free; null-ness of soft-deleted relations is preserved.
  pub fn project(record: ContractRecord) -> Self {
    let ContractRecord { contract, employee, company } = record;
    Self {
      contract_id: contract.contract_id,
      job:         contract.job,
      start_date:  contract.start_date,
      end_date:    contract.end_date,
      employee,
      company,
      created_at:  contract.created_at,
      deleted_at:  contract.deleted_at,
    }
  }
}
