//! Filter compiler — keyword search plus soft-delete exclusion.
//!
//! The filter exists in two equivalent forms: [`SearchFilter::matches`], the
//! pure in-memory predicate that defines the semantics, and
//! [`SearchFilter::like_pattern`], which backends compile into
//! `LOWER(col) LIKE` clauses over the same searchable fields.

use crate::contract::ContractRecord;

/// A compiled read-path filter for contracts.
///
/// Searchable fields: contract job, employee name, company name. A missing
/// relation (soft-deleted employee or company) is "no match" for that field,
/// never an error. Soft-deleted contracts are always excluded.
///
/// Case folding is ASCII-only in both forms, matching SQLite's `LOWER()`.
#[derive(Debug, Clone, Default)]
pub struct SearchFilter {
  /// ASCII-lower-cased keyword; `None` means the filter is soft-delete
  /// exclusion only.
  keyword: Option<String>,
}

impl SearchFilter {
  /// Build a filter from an already-normalised keyword (trimmed, blank means
  /// none — see [`PageQuery::normalize`](crate::page::PageQuery::normalize)).
  pub fn new(keyword: Option<&str>) -> Self {
    Self { keyword: keyword.map(|k| k.to_ascii_lowercase()) }
  }

  /// The SQL `LIKE` pattern for the keyword, lower-cased, wrapped in
  /// wildcards, with `\`, `%` and `_` escaped so the keyword matches
  /// literally. Backends must pair this with `ESCAPE '\'`. `None` when
  /// there is no keyword to match.
  pub fn like_pattern(&self) -> Option<String> {
    self.keyword.as_deref().map(|k| {
      let mut pattern = String::with_capacity(k.len() + 2);
      pattern.push('%');
      for ch in k.chars() {
        if matches!(ch, '\\' | '%' | '_') {
          pattern.push('\\');
        }
        pattern.push(ch);
      }
      pattern.push('%');
      pattern
    })
  }

  /// The reference predicate: does this eagerly-loaded record pass the
  /// filter?
  pub fn matches(&self, record: &ContractRecord) -> bool {
    if record.contract.deleted_at.is_some() {
      return false;
    }

    let Some(keyword) = self.keyword.as_deref() else {
      return true;
    };

    let job_hit = record.contract.job.to_ascii_lowercase().contains(keyword);
    let employee_hit = record
      .employee
      .as_ref()
      .is_some_and(|e| e.name.to_ascii_lowercase().contains(keyword));
    let company_hit = record
      .company
      .as_ref()
      .is_some_and(|c| c.company_name.to_ascii_lowercase().contains(keyword));

    job_hit || employee_hit || company_hit
  }
}
