//! Encoding and decoding helpers between Rust domain types and the
//! plain-text representations stored in SQLite columns.
//!
//! Timestamps are stored as RFC 3339 strings, dates as `YYYY-MM-DD`, UUIDs
//! as hyphenated lowercase strings. The lexical ordering of every encoding
//! matches the domain ordering, so ORDER BY over the raw columns is correct.

use chrono::{DateTime, NaiveDate, Utc};
use payday_core::{
  company::Company,
  contract::{CompanySummary, Contract, ContractRecord, EmployeeSummary},
};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Uuid ────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── NaiveDate ───────────────────────────────────────────────────────────────

pub fn encode_date(d: NaiveDate) -> String {
  d.format("%Y-%m-%d").to_string()
}

pub fn decode_date(s: &str) -> Result<NaiveDate> {
  NaiveDate::parse_from_str(s, "%Y-%m-%d")
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw strings read from a `contracts` row joined with its relations.
/// Relation columns are NULL either when the referent was soft-deleted
/// (excluded by the join condition) or, never in a consistent database,
/// genuinely absent — both decode to `None`.
pub struct RawContractRow {
  // contracts columns
  pub contract_id:  String,
  pub job:          String,
  pub start_date:   String,
  pub end_date:     Option<String>,
  pub employee_id:  String,
  pub company_id:   String,
  pub created_at:   String,
  pub deleted_at:   Option<String>,
  pub version:      i64,
  // employees join
  pub employee_name: Option<String>,
  // companies join
  pub company_name:  Option<String>,
}

impl RawContractRow {
  pub fn into_record(self) -> Result<ContractRecord> {
    let employee_id = decode_uuid(&self.employee_id)?;
    let company_id = decode_uuid(&self.company_id)?;

    let contract = Contract {
      contract_id: decode_uuid(&self.contract_id)?,
      job:         self.job,
      start_date:  decode_date(&self.start_date)?,
      end_date:    self.end_date.as_deref().map(decode_date).transpose()?,
      employee_id,
      company_id,
      created_at:  decode_dt(&self.created_at)?,
      deleted_at:  self.deleted_at.as_deref().map(decode_dt).transpose()?,
      version:     self.version,
    };

    let employee = self
      .employee_name
      .map(|name| EmployeeSummary { employee_id, name });

    let company = self
      .company_name
      .map(|company_name| CompanySummary { company_id, company_name });

    Ok(ContractRecord { contract, employee, company })
  }
}

/// Raw strings read directly from a `companies` row.
pub struct RawCompany {
  pub company_id:   String,
  pub company_name: String,
  pub deleted_at:   Option<String>,
  pub version:      i64,
}

impl RawCompany {
  pub fn into_company(self) -> Result<Company> {
    Ok(Company {
      company_id:   decode_uuid(&self.company_id)?,
      company_name: self.company_name,
      deleted_at:   self.deleted_at.as_deref().map(decode_dt).transpose()?,
      version:      self.version,
    })
  }
}
