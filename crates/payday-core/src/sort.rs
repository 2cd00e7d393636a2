//! Sort resolver — a static whitelist of caller-facing sort keys.
//!
//! Sort keys arrive as free strings; resolution maps them onto a closed enum
//! so no runtime string ever reaches an ORDER BY clause. Unknown or absent
//! keys fall back to the default order rather than failing the request,
//! which keeps pagination a well-defined total order for any input.

use std::cmp::Ordering;

use strum::EnumString;

use crate::contract::Contract;

/// The whitelisted sort keys for contract listings.
///
/// Wire names are camelCase: `id`, `job`, `startDate`, `endDate`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, EnumString)]
#[strum(serialize_all = "camelCase")]
pub enum ContractSortKey {
  #[default]
  Id,
  Job,
  StartDate,
  EndDate,
}

impl ContractSortKey {
  /// Resolve a caller-supplied key. Anything outside the whitelist — or no
  /// key at all — resolves to the default ([`ContractSortKey::Id`]).
  pub fn resolve(raw: Option<&str>) -> Self {
    raw.and_then(|s| s.parse().ok()).unwrap_or_default()
  }

  /// The reference ordering for this key.
  ///
  /// `descending` reverses the key comparison only; ties are always broken
  /// by contract id ascending, so paging is deterministic across calls and
  /// no row can appear on two pages or be skipped (absent concurrent
  /// writes). `None` values order before `Some`, matching SQL NULL
  /// ordering.
  pub fn compare(
    self,
    a: &Contract,
    b: &Contract,
    descending: bool,
  ) -> Ordering {
    let key_order = match self {
      Self::Id => a.contract_id.cmp(&b.contract_id),
      Self::Job => a.job.cmp(&b.job),
      Self::StartDate => a.start_date.cmp(&b.start_date),
      Self::EndDate => a.end_date.cmp(&b.end_date),
    };

    let key_order = if descending { key_order.reverse() } else { key_order };
    key_order.then_with(|| a.contract_id.cmp(&b.contract_id))
  }
}
