//! Company — the partner side of a contract.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A partner company. Updates are guarded by `version`, which the storage
/// layer bumps on every successful write.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Company {
  pub company_id:   Uuid,
  pub company_name: String,
  pub deleted_at:   Option<DateTime<Utc>>,
  /// Optimistic-concurrency token; starts at 0.
  pub version:      i64,
}
