//! Employee — the worker side of a contract.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// An employee record. Contracts reference employees by id; the employee
/// itself carries only identity and the soft-delete marker.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Employee {
  pub employee_id: Uuid,
  pub name:        String,
  /// Set when the employee is logically deleted; rows are never removed.
  pub deleted_at:  Option<DateTime<Utc>>,
}
