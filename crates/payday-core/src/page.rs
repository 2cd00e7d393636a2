//! Paging — the normalised query, the page-window arithmetic, and the
//! page-shaped result envelope.
//!
//! All of this is pure; the storage backend executes the window that
//! [`PageWindow::compute`] produces.

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// The page size callers should fall back to when the client supplies none.
pub const DEFAULT_PAGE_SIZE: i64 = 10;

// ─── Normalised query ────────────────────────────────────────────────────────

/// A validated paging/filter/sort request. Construct via
/// [`PageQuery::normalize`]; backends may assume the invariants hold.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageQuery {
  /// Requested page, 1-based. Always ≥ 1 after normalisation; it is still
  /// clamped against the total page count at execution time.
  pub page_number: i64,
  /// Always > 0 after normalisation.
  pub page_size:   i64,
  /// Raw sort key; validated by the sort resolver, not here.
  pub sort_by:     Option<String>,
  pub descending:  bool,
  /// Trimmed free-text keyword; blank input normalises to `None`.
  pub keyword:     Option<String>,
}

impl PageQuery {
  /// Normalise raw caller input.
  ///
  /// - `page_number < 1` clamps to 1.
  /// - `page_size <= 0` is rejected with [`Error::InvalidPageSize`] — a
  ///   sensible default ([`DEFAULT_PAGE_SIZE`]) belongs upstream.
  /// - `keyword` is trimmed; blank becomes `None`.
  /// - `sort_by` passes through untouched: unknown keys are the sort
  ///   resolver's concern and fall back to the default order there.
  pub fn normalize(
    page_number: i64,
    page_size: i64,
    sort_by: Option<String>,
    descending: bool,
    keyword: Option<String>,
  ) -> Result<Self> {
    if page_size <= 0 {
      return Err(Error::InvalidPageSize(page_size));
    }

    let keyword = keyword
      .as_deref()
      .map(str::trim)
      .filter(|k| !k.is_empty())
      .map(str::to_owned);

    Ok(Self {
      page_number: page_number.max(1),
      page_size,
      sort_by,
      descending,
      keyword,
    })
  }
}

// ─── Window arithmetic ───────────────────────────────────────────────────────

/// The concrete slice of the filtered, sorted sequence a page request
/// resolves to once the total count is known.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
  /// Requested page clamped into `[1, max(total_pages, 1)]`.
  pub current_page: i64,
  /// `ceil(total_count / page_size)`, 0 when the set is empty.
  pub total_pages:  i64,
  /// Row offset of the first result, floored at 0.
  pub offset:       i64,
}

impl PageWindow {
  pub fn compute(total_count: i64, query: &PageQuery) -> Self {
    let total_pages = (total_count + query.page_size - 1) / query.page_size;
    let total_pages = total_pages.max(0);

    let current_page = query.page_number.clamp(1, total_pages.max(1));
    let offset = ((current_page - 1) * query.page_size).max(0);

    Self { current_page, total_pages, offset }
  }
}

// ─── Result envelope ─────────────────────────────────────────────────────────

/// One bounded page of results plus its position within the whole set.
///
/// Invariants: `total_pages = ceil(total_count / items_per_page)` (0 when
/// empty); `1 <= current_page <= max(total_pages, 1)`;
/// `results.len() <= items_per_page`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageResult<T> {
  pub results:        Vec<T>,
  pub current_page:   i64,
  pub total_pages:    i64,
  pub items_per_page: i64,
  pub total_count:    i64,
}

impl<T> PageResult<T> {
  /// Assemble an envelope from a fetched page and its computed window.
  pub fn new(
    results: Vec<T>,
    window: PageWindow,
    page_size: i64,
    total_count: i64,
  ) -> Self {
    Self {
      results,
      current_page: window.current_page,
      total_pages: window.total_pages,
      items_per_page: page_size,
      total_count,
    }
  }
}
