//! Integration tests for `SqliteStore` against an in-memory database.

use chrono::NaiveDate;
use uuid::Uuid;

use payday_core::{
  company::Company,
  contract::{Contract, NewContract},
  employee::Employee,
  page::PageQuery,
  store::{CompanyStore, ContractStore, UpdateOutcome},
};

use crate::SqliteStore;

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
  NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

async fn seed_parties(s: &SqliteStore) -> (Employee, Company) {
  let employee = s.add_employee("Alice Liddell".into()).await.unwrap();
  let company = s.add_company("Acme Corp".into()).await.unwrap();
  (employee, company)
}

fn new_contract(
  job: &str,
  employee_id: Uuid,
  company_id: Uuid,
  start: NaiveDate,
) -> NewContract {
  NewContract {
    job: job.into(),
    start_date: start,
    end_date: None,
    employee_id,
    company_id,
  }
}

fn page(page_number: i64, page_size: i64) -> PageQuery {
  PageQuery::normalize(page_number, page_size, None, false, None).unwrap()
}

fn page_with(
  page_number: i64,
  page_size: i64,
  sort_by: Option<&str>,
  descending: bool,
  keyword: Option<&str>,
) -> PageQuery {
  PageQuery::normalize(
    page_number,
    page_size,
    sort_by.map(str::to_owned),
    descending,
    keyword.map(str::to_owned),
  )
  .unwrap()
}

// ─── Add / get ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn add_and_get_contract() {
  let s = store().await;
  let (employee, company) = seed_parties(&s).await;

  let contract = s
    .add_contract(new_contract(
      "Engineer",
      employee.employee_id,
      company.company_id,
      date(2023, 1, 1),
    ))
    .await
    .unwrap();
  assert_eq!(contract.version, 0);

  let fetched = s.get_contract(contract.contract_id).await.unwrap().unwrap();
  assert_eq!(fetched.contract_id, contract.contract_id);
  assert_eq!(fetched.job, "Engineer");
  assert_eq!(fetched.employee.unwrap().name, "Alice Liddell");
  assert_eq!(fetched.company.unwrap().company_name, "Acme Corp");
  assert!(fetched.deleted_at.is_none());
}

#[tokio::test]
async fn get_contract_missing_returns_none() {
  let s = store().await;
  let result = s.get_contract(Uuid::new_v4()).await.unwrap();
  assert!(result.is_none());
}

#[tokio::test]
async fn add_contract_missing_employee_rejected() {
  let s = store().await;
  let (_, company) = seed_parties(&s).await;

  let err = s
    .add_contract(new_contract(
      "Engineer",
      Uuid::new_v4(),
      company.company_id,
      date(2023, 1, 1),
    ))
    .await
    .unwrap_err();
  assert!(matches!(
    err,
    crate::Error::Core(payday_core::Error::MissingEmployee(_))
  ));
}

#[tokio::test]
async fn add_contract_soft_deleted_company_rejected() {
  let s = store().await;
  let (employee, company) = seed_parties(&s).await;
  assert!(s.soft_delete_company(company.company_id).await.unwrap());

  let err = s
    .add_contract(new_contract(
      "Engineer",
      employee.employee_id,
      company.company_id,
      date(2023, 1, 1),
    ))
    .await
    .unwrap_err();
  assert!(matches!(
    err,
    crate::Error::Core(payday_core::Error::MissingCompany(_))
  ));
}

// ─── Paging ──────────────────────────────────────────────────────────────────

async fn seed_contracts(s: &SqliteStore, count: usize) -> Vec<Contract> {
  let (employee, company) = seed_parties(s).await;
  let mut contracts = Vec::with_capacity(count);
  for i in 0..count {
    contracts.push(
      s.add_contract(new_contract(
        &format!("Job {i}"),
        employee.employee_id,
        company.company_id,
        date(2023, 1, 1 + i as u32),
      ))
      .await
      .unwrap(),
    );
  }
  contracts
}

#[tokio::test]
async fn total_pages_formula_holds() {
  let s = store().await;
  seed_contracts(&s, 7).await;

  let result = s.list_page(&page(1, 3)).await.unwrap();
  assert_eq!(result.total_count, 7);
  assert_eq!(result.total_pages, 3);
  assert_eq!(result.items_per_page, 3);
  assert_eq!(result.results.len(), 3);

  let last = s.list_page(&page(3, 3)).await.unwrap();
  assert_eq!(last.results.len(), 1);
}

#[tokio::test]
async fn empty_store_yields_page_one_of_zero() {
  let s = store().await;
  let result = s.list_page(&page(4, 10)).await.unwrap();
  assert!(result.results.is_empty());
  assert_eq!(result.total_count, 0);
  assert_eq!(result.total_pages, 0);
  assert_eq!(result.current_page, 1);
}

#[tokio::test]
async fn page_number_clamps_at_both_ends() {
  let s = store().await;
  seed_contracts(&s, 15).await;

  // Page 0 clamps to 1 at normalisation.
  let first = s.list_page(&page(0, 3)).await.unwrap();
  assert_eq!(first.current_page, 1);

  // Past-the-end clamps to the last page and still returns rows.
  let last = s.list_page(&page(99, 3)).await.unwrap();
  assert_eq!(last.total_pages, 5);
  assert_eq!(last.current_page, 5);
  assert_eq!(last.results.len(), 3);
}

#[tokio::test]
async fn pages_concatenate_to_the_full_set_without_overlap() {
  let s = store().await;
  let contracts = seed_contracts(&s, 10).await;

  let mut expected: Vec<Uuid> =
    contracts.iter().map(|c| c.contract_id).collect();
  expected.sort();

  let mut seen = Vec::new();
  let first = s.list_page(&page(1, 3)).await.unwrap();
  seen.extend(first.results.iter().map(|r| r.contract_id));
  for n in 2..=first.total_pages {
    let p = s.list_page(&page(n, 3)).await.unwrap();
    assert!(p.results.len() <= 3);
    seen.extend(p.results.iter().map(|r| r.contract_id));
  }

  // Default order is id ascending, so the concatenation must equal the
  // sorted id list exactly — no duplicates, no omissions.
  assert_eq!(seen, expected);
}

// ─── Keyword search ──────────────────────────────────────────────────────────

#[tokio::test]
async fn keyword_filters_by_job_case_insensitively() {
  let s = store().await;
  let (employee, company) = seed_parties(&s).await;

  let engineer = s
    .add_contract(new_contract(
      "Engineer",
      employee.employee_id,
      company.company_id,
      date(2023, 1, 1),
    ))
    .await
    .unwrap();
  s.add_contract(new_contract(
    "Driver",
    employee.employee_id,
    company.company_id,
    date(2023, 1, 2),
  ))
  .await
  .unwrap();

  let result = s
    .list_page(&page_with(1, 10, None, false, Some("eng")))
    .await
    .unwrap();
  assert_eq!(result.total_count, 1);
  assert_eq!(result.results[0].contract_id, engineer.contract_id);

  // Mixed-case keyword matches the same row.
  let result = s
    .list_page(&page_with(1, 10, None, false, Some("ENGiNeer")))
    .await
    .unwrap();
  assert_eq!(result.total_count, 1);
}

#[tokio::test]
async fn keyword_matches_employee_and_company_names() {
  let s = store().await;
  let alice = s.add_employee("Alice Liddell".into()).await.unwrap();
  let bob = s.add_employee("Bob Hatter".into()).await.unwrap();
  let acme = s.add_company("Acme Corp".into()).await.unwrap();
  let wonder = s.add_company("Wonderland Ltd".into()).await.unwrap();

  let via_employee = s
    .add_contract(new_contract(
      "Driver",
      alice.employee_id,
      acme.company_id,
      date(2023, 1, 1),
    ))
    .await
    .unwrap();
  let via_company = s
    .add_contract(new_contract(
      "Clerk",
      bob.employee_id,
      wonder.company_id,
      date(2023, 1, 2),
    ))
    .await
    .unwrap();

  let by_name = s
    .list_page(&page_with(1, 10, None, false, Some("liddell")))
    .await
    .unwrap();
  assert_eq!(by_name.total_count, 1);
  assert_eq!(by_name.results[0].contract_id, via_employee.contract_id);

  let by_company = s
    .list_page(&page_with(1, 10, None, false, Some("wonder")))
    .await
    .unwrap();
  assert_eq!(by_company.total_count, 1);
  assert_eq!(by_company.results[0].contract_id, via_company.contract_id);
}

#[tokio::test]
async fn wildcard_characters_in_keyword_match_literally() {
  let s = store().await;
  let (employee, company) = seed_parties(&s).await;

  let allocated = s
    .add_contract(new_contract(
      "100% Allocation",
      employee.employee_id,
      company.company_id,
      date(2023, 1, 1),
    ))
    .await
    .unwrap();
  s.add_contract(new_contract(
    "Engineer",
    employee.employee_id,
    company.company_id,
    date(2023, 1, 2),
  ))
  .await
  .unwrap();

  // "%" and "_" are literal substring characters, never LIKE wildcards.
  let percent = s
    .list_page(&page_with(1, 10, None, false, Some("100%")))
    .await
    .unwrap();
  assert_eq!(percent.total_count, 1);
  assert_eq!(percent.results[0].contract_id, allocated.contract_id);

  let bare = s
    .list_page(&page_with(1, 10, None, false, Some("%")))
    .await
    .unwrap();
  assert_eq!(bare.total_count, 1, "a bare '%' must not match everything");

  let underscore = s
    .list_page(&page_with(1, 10, None, false, Some("Eng_neer")))
    .await
    .unwrap();
  assert_eq!(underscore.total_count, 0);
}

#[tokio::test]
async fn keyword_against_deleted_employee_is_no_match() {
  let s = store().await;
  let (employee, company) = seed_parties(&s).await;
  s.add_contract(new_contract(
    "Driver",
    employee.employee_id,
    company.company_id,
    date(2023, 1, 1),
  ))
  .await
  .unwrap();

  assert!(s.soft_delete_employee(employee.employee_id).await.unwrap());

  // The employee-name field no longer matches, but the query itself is fine.
  let result = s
    .list_page(&page_with(1, 10, None, false, Some("alice")))
    .await
    .unwrap();
  assert_eq!(result.total_count, 0);

  // Without a keyword the contract is still listed, relation surfaced null.
  let all = s.list_page(&page(1, 10)).await.unwrap();
  assert_eq!(all.total_count, 1);
  assert!(all.results[0].employee.is_none());
  assert!(all.results[0].company.is_some());
}

// ─── Soft delete ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn soft_deleted_contract_is_excluded_from_reads() {
  let s = store().await;
  let (employee, company) = seed_parties(&s).await;
  let contract = s
    .add_contract(new_contract(
      "Engineer",
      employee.employee_id,
      company.company_id,
      date(2023, 1, 1),
    ))
    .await
    .unwrap();

  assert!(s.soft_delete_contract(contract.contract_id).await.unwrap());

  assert!(s.get_contract(contract.contract_id).await.unwrap().is_none());
  let listed = s.list_page(&page(1, 10)).await.unwrap();
  assert_eq!(listed.total_count, 0);

  // The include-deleted path still sees the row, marker set.
  let any = s
    .get_contract_any(contract.contract_id)
    .await
    .unwrap()
    .unwrap();
  assert!(any.deleted_at.is_some());
}

#[tokio::test]
async fn soft_delete_twice_is_a_noop_returning_false() {
  let s = store().await;
  let (employee, company) = seed_parties(&s).await;
  let contract = s
    .add_contract(new_contract(
      "Engineer",
      employee.employee_id,
      company.company_id,
      date(2023, 1, 1),
    ))
    .await
    .unwrap();

  assert!(s.soft_delete_contract(contract.contract_id).await.unwrap());
  assert!(!s.soft_delete_contract(contract.contract_id).await.unwrap());
}

#[tokio::test]
async fn soft_delete_unknown_contract_returns_false() {
  let s = store().await;
  assert!(!s.soft_delete_contract(Uuid::new_v4()).await.unwrap());
}

// ─── Sorting ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn sort_by_start_date_in_both_directions() {
  let s = store().await;
  let (employee, company) = seed_parties(&s).await;

  let mut ids = Vec::new();
  for (job, start) in [
    ("Middle", date(2023, 6, 1)),
    ("Earliest", date(2022, 1, 1)),
    ("Latest", date(2024, 12, 1)),
  ] {
    let c = s
      .add_contract(new_contract(
        job,
        employee.employee_id,
        company.company_id,
        start,
      ))
      .await
      .unwrap();
    ids.push((job, c.contract_id));
  }

  let asc = s
    .list_page(&page_with(1, 10, Some("startDate"), false, None))
    .await
    .unwrap();
  let jobs: Vec<_> = asc.results.iter().map(|r| r.job.as_str()).collect();
  assert_eq!(jobs, ["Earliest", "Middle", "Latest"]);

  let desc = s
    .list_page(&page_with(1, 10, Some("startDate"), true, None))
    .await
    .unwrap();
  let jobs: Vec<_> = desc.results.iter().map(|r| r.job.as_str()).collect();
  assert_eq!(jobs, ["Latest", "Middle", "Earliest"]);
}

#[tokio::test]
async fn sort_ties_break_by_id_ascending_regardless_of_direction() {
  let s = store().await;
  let (employee, company) = seed_parties(&s).await;

  // Same start date: the sort key cannot distinguish them.
  let mut tied = Vec::new();
  for _ in 0..3 {
    tied.push(
      s.add_contract(new_contract(
        "Engineer",
        employee.employee_id,
        company.company_id,
        date(2023, 1, 1),
      ))
      .await
      .unwrap()
      .contract_id,
    );
  }
  tied.sort();

  for descending in [false, true] {
    let result = s
      .list_page(&page_with(1, 10, Some("startDate"), descending, None))
      .await
      .unwrap();
    let ids: Vec<_> = result.results.iter().map(|r| r.contract_id).collect();
    assert_eq!(ids, tied, "descending = {descending}");
  }
}

#[tokio::test]
async fn unknown_sort_key_falls_back_to_id_ascending() {
  let s = store().await;
  let contracts = seed_contracts(&s, 5).await;
  let mut expected: Vec<Uuid> =
    contracts.iter().map(|c| c.contract_id).collect();
  expected.sort();

  let result = s
    .list_page(&page_with(1, 10, Some("nonexistent_field"), false, None))
    .await
    .unwrap();
  let ids: Vec<_> = result.results.iter().map(|r| r.contract_id).collect();
  assert_eq!(ids, expected);
}

// ─── Optimistic concurrency ──────────────────────────────────────────────────

#[tokio::test]
async fn update_bumps_version_and_persists() {
  let s = store().await;
  let (employee, company) = seed_parties(&s).await;
  let mut contract = s
    .add_contract(new_contract(
      "Engineer",
      employee.employee_id,
      company.company_id,
      date(2023, 1, 1),
    ))
    .await
    .unwrap();

  contract.job = "Senior Engineer".into();
  contract.end_date = Some(date(2025, 1, 1));

  let outcome = s.update_contract(contract.clone()).await.unwrap();
  let updated = outcome.updated().expect("update should land");
  assert_eq!(updated.version, 1);

  let fetched = s.get_contract(contract.contract_id).await.unwrap().unwrap();
  assert_eq!(fetched.job, "Senior Engineer");
  assert_eq!(fetched.end_date, Some(date(2025, 1, 1)));
}

#[tokio::test]
async fn update_with_stale_version_conflicts() {
  let s = store().await;
  let (employee, company) = seed_parties(&s).await;
  let contract = s
    .add_contract(new_contract(
      "Engineer",
      employee.employee_id,
      company.company_id,
      date(2023, 1, 1),
    ))
    .await
    .unwrap();

  // First writer wins.
  let mut first = contract.clone();
  first.job = "Senior Engineer".into();
  assert!(matches!(
    s.update_contract(first).await.unwrap(),
    UpdateOutcome::Updated(_)
  ));

  // Second writer still holds version 0 — the record exists but the token
  // is stale, so this is a conflict, never a silent retry.
  let mut second = contract;
  second.job = "Staff Engineer".into();
  assert!(s.update_contract(second).await.unwrap().is_conflict());
}

#[tokio::test]
async fn update_of_vanished_contract_reports_not_found() {
  let s = store().await;
  let (employee, company) = seed_parties(&s).await;
  let contract = s
    .add_contract(new_contract(
      "Engineer",
      employee.employee_id,
      company.company_id,
      date(2023, 1, 1),
    ))
    .await
    .unwrap();

  assert!(s.soft_delete_contract(contract.contract_id).await.unwrap());

  // Concurrently deleted: distinguished from a genuine conflicting write.
  assert!(s.update_contract(contract).await.unwrap().is_not_found());
}

#[tokio::test]
async fn update_of_never_created_contract_reports_not_found() {
  let s = store().await;
  let (employee, company) = seed_parties(&s).await;

  let ghost = Contract {
    contract_id: Uuid::new_v4(),
    job:         "Engineer".into(),
    start_date:  date(2023, 1, 1),
    end_date:    None,
    employee_id: employee.employee_id,
    company_id:  company.company_id,
    created_at:  chrono::Utc::now(),
    deleted_at:  None,
    version:     0,
  };
  assert!(s.update_contract(ghost).await.unwrap().is_not_found());
}

// ─── By company ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn list_by_company_returns_only_that_companys_active_contracts() {
  let s = store().await;
  let employee = s.add_employee("Alice Liddell".into()).await.unwrap();
  let acme = s.add_company("Acme Corp".into()).await.unwrap();
  let other = s.add_company("Other GmbH".into()).await.unwrap();

  let kept = s
    .add_contract(new_contract(
      "Engineer",
      employee.employee_id,
      acme.company_id,
      date(2023, 1, 1),
    ))
    .await
    .unwrap();
  let deleted = s
    .add_contract(new_contract(
      "Driver",
      employee.employee_id,
      acme.company_id,
      date(2023, 1, 2),
    ))
    .await
    .unwrap();
  s.add_contract(new_contract(
    "Clerk",
    employee.employee_id,
    other.company_id,
    date(2023, 1, 3),
  ))
  .await
  .unwrap();

  assert!(s.soft_delete_contract(deleted.contract_id).await.unwrap());

  let listed = s.list_by_company(acme.company_id).await.unwrap();
  assert_eq!(listed.len(), 1);
  assert_eq!(listed[0].contract_id, kept.contract_id);
}

// ─── Companies ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn add_and_get_company() {
  let s = store().await;
  let company = s.add_company("Acme Corp".into()).await.unwrap();
  assert_eq!(company.version, 0);

  let fetched = s.get_company(company.company_id).await.unwrap().unwrap();
  assert_eq!(fetched.company_name, "Acme Corp");
}

#[tokio::test]
async fn update_company_with_stale_version_conflicts() {
  let s = store().await;
  let company = s.add_company("Acme Corp".into()).await.unwrap();

  let mut first = company.clone();
  first.company_name = "Acme Holdings".into();
  let updated = s.update_company(first).await.unwrap().updated().unwrap();
  assert_eq!(updated.version, 1);

  let mut stale = company;
  stale.company_name = "Acme Industries".into();
  assert!(s.update_company(stale).await.unwrap().is_conflict());
}

#[tokio::test]
async fn soft_deleted_company_is_gone_from_get() {
  let s = store().await;
  let company = s.add_company("Acme Corp".into()).await.unwrap();

  assert!(s.soft_delete_company(company.company_id).await.unwrap());
  assert!(s.get_company(company.company_id).await.unwrap().is_none());
  assert!(!s.soft_delete_company(company.company_id).await.unwrap());

  assert!(
    s.update_company(company).await.unwrap().is_not_found(),
    "update of a soft-deleted company reports not-found"
  );
}
