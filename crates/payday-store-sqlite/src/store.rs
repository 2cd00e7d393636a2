//! [`SqliteStore`] — the SQLite implementation of [`ContractStore`] and
//! [`CompanyStore`].

use std::path::Path;

use chrono::Utc;
use rusqlite::OptionalExtension as _;
use uuid::Uuid;

use payday_core::{
  company::Company,
  contract::{Contract, ContractResponse, NewContract},
  employee::Employee,
  filter::SearchFilter,
  page::{PageQuery, PageResult, PageWindow},
  sort::ContractSortKey,
  store::{CompanyStore, ContractStore, UpdateOutcome},
};

use crate::{
  encode::{encode_date, encode_dt, encode_uuid, RawCompany, RawContractRow},
  schema::SCHEMA,
  Error, Result,
};

// ─── SQL fragments ───────────────────────────────────────────────────────────

/// Column list for contract reads; relation columns come from the joins
/// below and are NULL for soft-deleted referents.
const CONTRACT_COLUMNS: &str = "c.contract_id, c.job, c.start_date, c.end_date,
   c.employee_id, c.company_id, c.created_at, c.deleted_at, c.version,
   e.name, p.company_name";

/// Eager-loading joins. The `deleted_at IS NULL` join conditions are what
/// make a soft-deleted referent surface as a NULL relation rather than a
/// stale row. Everything the projection needs is loaded here, in the same
/// round trip — no per-row follow-up fetches.
const CONTRACT_JOINS: &str = "LEFT JOIN employees e
     ON e.employee_id = c.employee_id AND e.deleted_at IS NULL
   LEFT JOIN companies p
     ON p.company_id = c.company_id AND p.deleted_at IS NULL";

/// Keyword predicate over the searchable text fields. The single pattern
/// parameter is already lower-cased, wildcard-wrapped, and backslash-escaped
/// (see [`SearchFilter::like_pattern`]), so the keyword itself always
/// matches literally. A NULL relation column makes its LIKE false, so a
/// missing referent is "no match".
const KEYWORD_PREDICATE: &str = "(LOWER(c.job) LIKE ?1 ESCAPE '\\'
    OR LOWER(e.name) LIKE ?1 ESCAPE '\\'
    OR LOWER(p.company_name) LIKE ?1 ESCAPE '\\')";

/// Translate a resolved sort key into a static ORDER BY clause. Ties always
/// break by contract id ascending so pagination is a total order; the
/// requested direction applies to the key column only. No caller-supplied
/// string ever reaches the clause.
fn order_clause(key: ContractSortKey, descending: bool) -> String {
  let column = match key {
    ContractSortKey::Id => "c.contract_id",
    ContractSortKey::Job => "c.job",
    ContractSortKey::StartDate => "c.start_date",
    ContractSortKey::EndDate => "c.end_date",
  };
  let direction = if descending { "DESC" } else { "ASC" };
  format!("{column} {direction}, c.contract_id ASC")
}

fn map_contract_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawContractRow> {
  Ok(RawContractRow {
    contract_id:   row.get(0)?,
    job:           row.get(1)?,
    start_date:    row.get(2)?,
    end_date:      row.get(3)?,
    employee_id:   row.get(4)?,
    company_id:    row.get(5)?,
    created_at:    row.get(6)?,
    deleted_at:    row.get(7)?,
    version:       row.get(8)?,
    employee_name: row.get(9)?,
    company_name:  row.get(10)?,
  })
}

// ─── Store ───────────────────────────────────────────────────────────────────

/// A Payday store backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted. Each
/// operation is one or more sequential statements on the connection's worker
/// thread; the caller only ever suspends on the channel to that thread.
/// Writes are single statements, so a caller that stops waiting (deadline,
/// drop) can never leave a mutation half-committed: the statement either ran
/// to completion on the worker thread or never started.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let path = path.as_ref().to_owned();
    let conn = tokio_rusqlite::Connection::open(path.clone()).await?;
    let store = Self { conn };
    store.init_schema().await?;
    tracing::info!(path = %path.display(), "opened payday store");
    Ok(store)
  }

  /// Open an in-memory store — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Fetch one eagerly-loaded contract row by id.
  async fn fetch_contract(
    &self,
    id: Uuid,
    include_deleted: bool,
  ) -> Result<Option<ContractResponse>> {
    let id_str = encode_uuid(id);

    let raw: Option<RawContractRow> = self
      .conn
      .call(move |conn| {
        let deleted_cond =
          if include_deleted { "" } else { "AND c.deleted_at IS NULL" };
        let sql = format!(
          "SELECT {CONTRACT_COLUMNS}
           FROM contracts c
           {CONTRACT_JOINS}
           WHERE c.contract_id = ?1 {deleted_cond}"
        );
        Ok(
          conn
            .query_row(&sql, rusqlite::params![id_str], map_contract_row)
            .optional()?,
        )
      })
      .await?;

    raw
      .map(|r| r.into_record().map(ContractResponse::project))
      .transpose()
  }
}

// ─── ContractStore impl ──────────────────────────────────────────────────────

impl ContractStore for SqliteStore {
  type Error = Error;

  // ── Reads ─────────────────────────────────────────────────────────────────

  async fn list_page(
    &self,
    query: &PageQuery,
  ) -> Result<PageResult<ContractResponse>> {
    let filter = SearchFilter::new(query.keyword.as_deref());
    let pattern = filter.like_pattern();
    let key = ContractSortKey::resolve(query.sort_by.as_deref());
    let order = order_clause(key, query.descending);
    let query = query.clone();

    // Count and fetch run as sequential statements on the same connection.
    // They are not one transaction: a write committed between them can make
    // the count stale relative to the page. Accepted and documented on
    // [`ContractStore::list_page`].
    let (raws, window, page_size, total_count) = self
      .conn
      .call(move |conn| {
        let total_count: i64 = if let Some(p) = pattern.as_deref() {
          let sql = format!(
            "SELECT COUNT(*)
             FROM contracts c
             {CONTRACT_JOINS}
             WHERE c.deleted_at IS NULL AND {KEYWORD_PREDICATE}"
          );
          conn.query_row(&sql, rusqlite::params![p], |r| r.get(0))?
        } else {
          conn.query_row(
            "SELECT COUNT(*) FROM contracts c WHERE c.deleted_at IS NULL",
            [],
            |r| r.get(0),
          )?
        };

        let window = PageWindow::compute(total_count, &query);

        let raws = if let Some(p) = pattern.as_deref() {
          let sql = format!(
            "SELECT {CONTRACT_COLUMNS}
             FROM contracts c
             {CONTRACT_JOINS}
             WHERE c.deleted_at IS NULL AND {KEYWORD_PREDICATE}
             ORDER BY {order}
             LIMIT ?2 OFFSET ?3"
          );
          let mut stmt = conn.prepare(&sql)?;
          stmt
            .query_map(
              rusqlite::params![p, query.page_size, window.offset],
              map_contract_row,
            )?
            .collect::<rusqlite::Result<Vec<_>>>()?
        } else {
          let sql = format!(
            "SELECT {CONTRACT_COLUMNS}
             FROM contracts c
             {CONTRACT_JOINS}
             WHERE c.deleted_at IS NULL
             ORDER BY {order}
             LIMIT ?1 OFFSET ?2"
          );
          let mut stmt = conn.prepare(&sql)?;
          stmt
            .query_map(
              rusqlite::params![query.page_size, window.offset],
              map_contract_row,
            )?
            .collect::<rusqlite::Result<Vec<_>>>()?
        };

        Ok((raws, window, query.page_size, total_count))
      })
      .await?;

    tracing::debug!(
      total_count,
      current_page = window.current_page,
      rows = raws.len(),
      "contract page query"
    );

    let results = raws
      .into_iter()
      .map(|r| r.into_record().map(ContractResponse::project))
      .collect::<Result<Vec<_>>>()?;

    Ok(PageResult::new(results, window, page_size, total_count))
  }

  async fn get_contract(&self, id: Uuid) -> Result<Option<ContractResponse>> {
    self.fetch_contract(id, false).await
  }

  async fn get_contract_any(
    &self,
    id: Uuid,
  ) -> Result<Option<ContractResponse>> {
    self.fetch_contract(id, true).await
  }

  async fn list_by_company(
    &self,
    company_id: Uuid,
  ) -> Result<Vec<ContractResponse>> {
    let company_id_str = encode_uuid(company_id);

    let raws: Vec<RawContractRow> = self
      .conn
      .call(move |conn| {
        let sql = format!(
          "SELECT {CONTRACT_COLUMNS}
           FROM contracts c
           {CONTRACT_JOINS}
           WHERE c.company_id = ?1 AND c.deleted_at IS NULL
           ORDER BY c.contract_id ASC"
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(rusqlite::params![company_id_str], map_contract_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws
      .into_iter()
      .map(|r| r.into_record().map(ContractResponse::project))
      .collect()
  }

  // ── Mutations ─────────────────────────────────────────────────────────────

  async fn add_contract(&self, input: NewContract) -> Result<Contract> {
    // Validate referents before persistence. A referent soft-deleted between
    // this check and the insert still satisfies the foreign key (the row
    // exists); read paths will simply surface it as NULL.
    let employee_id_str = encode_uuid(input.employee_id);
    let company_id_str = encode_uuid(input.company_id);

    let (employee_ok, company_ok): (bool, bool) = self
      .conn
      .call(move |conn| {
        let employee_ok: bool = conn
          .query_row(
            "SELECT 1 FROM employees
             WHERE employee_id = ?1 AND deleted_at IS NULL",
            rusqlite::params![employee_id_str],
            |_| Ok(true),
          )
          .optional()?
          .unwrap_or(false);

        let company_ok: bool = conn
          .query_row(
            "SELECT 1 FROM companies
             WHERE company_id = ?1 AND deleted_at IS NULL",
            rusqlite::params![company_id_str],
            |_| Ok(true),
          )
          .optional()?
          .unwrap_or(false);

        Ok((employee_ok, company_ok))
      })
      .await?;

    if !employee_ok {
      return Err(payday_core::Error::MissingEmployee(input.employee_id).into());
    }
    if !company_ok {
      return Err(payday_core::Error::MissingCompany(input.company_id).into());
    }

    let contract = Contract {
      contract_id: Uuid::new_v4(),
      job:         input.job,
      start_date:  input.start_date,
      end_date:    input.end_date,
      employee_id: input.employee_id,
      company_id:  input.company_id,
      created_at:  Utc::now(),
      deleted_at:  None,
      version:     0,
    };

    let id_str = encode_uuid(contract.contract_id);
    let job = contract.job.clone();
    let start_str = encode_date(contract.start_date);
    let end_str = contract.end_date.map(encode_date);
    let employee_id_str = encode_uuid(contract.employee_id);
    let company_id_str = encode_uuid(contract.company_id);
    let created_str = encode_dt(contract.created_at);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO contracts (
             contract_id, job, start_date, end_date,
             employee_id, company_id, created_at, deleted_at, version
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, NULL, 0)",
          rusqlite::params![
            id_str,
            job,
            start_str,
            end_str,
            employee_id_str,
            company_id_str,
            created_str,
          ],
        )?;
        Ok(())
      })
      .await?;

    tracing::debug!(contract_id = %contract.contract_id, "contract added");
    Ok(contract)
  }

  async fn update_contract(
    &self,
    contract: Contract,
  ) -> Result<UpdateOutcome<Contract>> {
    let id_str = encode_uuid(contract.contract_id);
    let job = contract.job.clone();
    let start_str = encode_date(contract.start_date);
    let end_str = contract.end_date.map(encode_date);
    let employee_id_str = encode_uuid(contract.employee_id);
    let company_id_str = encode_uuid(contract.company_id);
    let expected_version = contract.version;

    // The guarded UPDATE and the existence re-check run in the same
    // connection call. Zero rows affected means the version token was stale
    // or the row is gone; the re-check distinguishes the two.
    let (updated, current_version): (bool, Option<i64>) = self
      .conn
      .call(move |conn| {
        let rows = conn.execute(
          "UPDATE contracts
           SET job = ?1, start_date = ?2, end_date = ?3,
               employee_id = ?4, company_id = ?5,
               version = version + 1
           WHERE contract_id = ?6 AND version = ?7 AND deleted_at IS NULL",
          rusqlite::params![
            job,
            start_str,
            end_str,
            employee_id_str,
            company_id_str,
            id_str,
            expected_version,
          ],
        )?;

        if rows > 0 {
          return Ok((true, None));
        }

        let current: Option<i64> = conn
          .query_row(
            "SELECT version FROM contracts
             WHERE contract_id = ?1 AND deleted_at IS NULL",
            rusqlite::params![id_str],
            |r| r.get(0),
          )
          .optional()?;

        Ok((false, current))
      })
      .await?;

    if updated {
      tracing::debug!(contract_id = %contract.contract_id, "contract updated");
      return Ok(UpdateOutcome::Updated(Contract {
        version: expected_version + 1,
        ..contract
      }));
    }

    match current_version {
      Some(_) => {
        tracing::debug!(
          contract_id = %contract.contract_id,
          expected_version,
          "contract update lost optimistic-concurrency race"
        );
        Ok(UpdateOutcome::Conflict)
      }
      None => Ok(UpdateOutcome::NotFound),
    }
  }

  async fn soft_delete_contract(&self, id: Uuid) -> Result<bool> {
    let id_str = encode_uuid(id);
    let now_str = encode_dt(Utc::now());

    let rows = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "UPDATE contracts SET deleted_at = ?1
           WHERE contract_id = ?2 AND deleted_at IS NULL",
          rusqlite::params![now_str, id_str],
        )?)
      })
      .await?;

    if rows > 0 {
      tracing::debug!(contract_id = %id, "contract soft-deleted");
    }
    Ok(rows > 0)
  }

  // ── Referents ─────────────────────────────────────────────────────────────

  async fn add_employee(&self, name: String) -> Result<Employee> {
    let employee = Employee {
      employee_id: Uuid::new_v4(),
      name,
      deleted_at:  None,
    };

    let id_str = encode_uuid(employee.employee_id);
    let name = employee.name.clone();

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO employees (employee_id, name, deleted_at)
           VALUES (?1, ?2, NULL)",
          rusqlite::params![id_str, name],
        )?;
        Ok(())
      })
      .await?;

    Ok(employee)
  }

  async fn soft_delete_employee(&self, id: Uuid) -> Result<bool> {
    let id_str = encode_uuid(id);
    let now_str = encode_dt(Utc::now());

    let rows = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "UPDATE employees SET deleted_at = ?1
           WHERE employee_id = ?2 AND deleted_at IS NULL",
          rusqlite::params![now_str, id_str],
        )?)
      })
      .await?;

    Ok(rows > 0)
  }
}

// ─── CompanyStore impl ───────────────────────────────────────────────────────

impl CompanyStore for SqliteStore {
  type Error = Error;

  async fn add_company(&self, company_name: String) -> Result<Company> {
    let company = Company {
      company_id: Uuid::new_v4(),
      company_name,
      deleted_at: None,
      version:    0,
    };

    let id_str = encode_uuid(company.company_id);
    let name = company.company_name.clone();

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO companies (company_id, company_name, deleted_at, version)
           VALUES (?1, ?2, NULL, 0)",
          rusqlite::params![id_str, name],
        )?;
        Ok(())
      })
      .await?;

    tracing::debug!(company_id = %company.company_id, "company added");
    Ok(company)
  }

  async fn get_company(&self, id: Uuid) -> Result<Option<Company>> {
    let id_str = encode_uuid(id);

    let raw: Option<RawCompany> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT company_id, company_name, deleted_at, version
               FROM companies
               WHERE company_id = ?1 AND deleted_at IS NULL",
              rusqlite::params![id_str],
              |row| {
                Ok(RawCompany {
                  company_id:   row.get(0)?,
                  company_name: row.get(1)?,
                  deleted_at:   row.get(2)?,
                  version:      row.get(3)?,
                })
              },
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawCompany::into_company).transpose()
  }

  async fn update_company(
    &self,
    company: Company,
  ) -> Result<UpdateOutcome<Company>> {
    let id_str = encode_uuid(company.company_id);
    let name = company.company_name.clone();
    let expected_version = company.version;

    let (updated, current_version): (bool, Option<i64>) = self
      .conn
      .call(move |conn| {
        let rows = conn.execute(
          "UPDATE companies
           SET company_name = ?1, version = version + 1
           WHERE company_id = ?2 AND version = ?3 AND deleted_at IS NULL",
          rusqlite::params![name, id_str, expected_version],
        )?;

        if rows > 0 {
          return Ok((true, None));
        }

        let current: Option<i64> = conn
          .query_row(
            "SELECT version FROM companies
             WHERE company_id = ?1 AND deleted_at IS NULL",
            rusqlite::params![id_str],
            |r| r.get(0),
          )
          .optional()?;

        Ok((false, current))
      })
      .await?;

    if updated {
      tracing::debug!(company_id = %company.company_id, "company updated");
      return Ok(UpdateOutcome::Updated(Company {
        version: expected_version + 1,
        ..company
      }));
    }

    match current_version {
      Some(_) => Ok(UpdateOutcome::Conflict),
      None => Ok(UpdateOutcome::NotFound),
    }
  }

  async fn soft_delete_company(&self, id: Uuid) -> Result<bool> {
    let id_str = encode_uuid(id);
    let now_str = encode_dt(Utc::now());

    let rows = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "UPDATE companies SET deleted_at = ?1
           WHERE company_id = ?2 AND deleted_at IS NULL",
          rusqlite::params![now_str, id_str],
        )?)
      })
      .await?;

    if rows > 0 {
      tracing::debug!(company_id = %id, "company soft-deleted");
    }
    Ok(rows > 0)
  }
}
