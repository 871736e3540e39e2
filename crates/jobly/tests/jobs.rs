//! Job operations against a live PostgreSQL database.
//!
//! Each test builds the schema inside a throwaway Postgres schema in a
//! transaction that is never committed. Tests are skipped when
//! `DATABASE_URL` is not set.

#![cfg(feature = "migrate")]

use jobly::migrate::SCHEMA_SQL;
use jobly::{ErrorKind, Job, JobError, JobFilter, JobPatch, JobResult, NewJob, sql};
use rust_decimal::Decimal;
use tokio_postgres::{Client, NoTls, Transaction};

async fn try_connect() -> Option<Client> {
    let database_url = std::env::var("DATABASE_URL").ok()?;
    let (client, connection) = tokio_postgres::connect(&database_url, NoTls)
        .await
        .expect("Failed to connect to DATABASE_URL with NoTls");
    tokio::spawn(async move {
        let _ = connection.await;
    });
    Some(client)
}

/// Create the tables in a fresh schema and seed three companies and three jobs.
///
/// Returns the ids of `j1`, `j2`, `j3`.
async fn seed(tx: &Transaction<'_>) -> JobResult<[i32; 3]> {
    let schema = format!("jobly_test_{}", uuid::Uuid::new_v4().simple());
    tx.batch_execute(&format!(
        "CREATE SCHEMA {schema}; SET LOCAL search_path TO {schema};"
    ))
    .await
    .map_err(JobError::from_db_error)?;
    tx.batch_execute(SCHEMA_SQL)
        .await
        .map_err(JobError::from_db_error)?;

    sql("INSERT INTO companies (handle, name, num_employees, description, logo_url) \
         VALUES ('c1', 'C1', 1, 'Desc1', 'http://c1.img'), \
                ('c2', 'C2', 2, 'Desc2', 'http://c2.img'), \
                ('c3', 'C3', 3, 'Desc3', 'http://c3.img')")
    .execute(tx)
    .await?;

    let rows = sql("INSERT INTO jobs (title, salary, equity, company_handle) \
                    VALUES ('j1', 100, 0.1, 'c1'), ('j2', 200, 0.2, 'c1'), ('j3', 300, 0, 'c1') \
                    RETURNING id")
    .fetch_all(tx)
    .await?;
    let ids: Vec<i32> = rows.iter().map(|r| r.get(0)).collect();
    Ok([ids[0], ids[1], ids[2]])
}

macro_rules! connect_or_skip {
    ($name:literal) => {
        match try_connect().await {
            Some(c) => c,
            None => {
                eprintln!("DATABASE_URL not set; skipping {}", $name);
                return Ok(());
            }
        }
    };
}

fn titles(jobs: &[jobly::JobListItem]) -> Vec<&str> {
    jobs.iter().map(|j| j.title.as_str()).collect()
}

#[tokio::test]
async fn create_returns_job_with_generated_id() -> JobResult<()> {
    let mut client = connect_or_skip!("create_returns_job_with_generated_id");
    let tx = client.transaction().await.map_err(JobError::from_db_error)?;
    let [j1, j2, j3] = seed(&tx).await?;

    let job = Job::create(
        &tx,
        NewJob::new("new", "c1").salary(500).equity(Decimal::new(5, 1)),
    )
    .await?;
    assert!(![j1, j2, j3].contains(&job.id));
    assert_eq!(job.title, "new");
    assert_eq!(job.salary, Some(500));
    assert_eq!(job.equity, Some(Decimal::new(5, 1)));
    assert_eq!(job.company_handle, "c1");

    let fetched = Job::get(&tx, job.id).await?;
    assert_eq!(fetched.job, job);

    tx.rollback().await.map_err(JobError::from_db_error)?;
    Ok(())
}

#[tokio::test]
async fn create_rejects_duplicate_title() -> JobResult<()> {
    let mut client = connect_or_skip!("create_rejects_duplicate_title");
    let tx = client.transaction().await.map_err(JobError::from_db_error)?;
    seed(&tx).await?;

    let err = Job::create(&tx, NewJob::new("j1", "c2")).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::DuplicateEntry);
    assert_eq!(err.status_code(), 400);
    assert_eq!(err.to_string(), "Duplicate job: j1");

    tx.rollback().await.map_err(JobError::from_db_error)?;
    Ok(())
}

#[tokio::test]
async fn create_rejects_invalid_payload_before_touching_the_table() -> JobResult<()> {
    let mut client = connect_or_skip!("create_rejects_invalid_payload_before_touching_the_table");
    let tx = client.transaction().await.map_err(JobError::from_db_error)?;
    seed(&tx).await?;

    let err = Job::create(&tx, NewJob::new("", "c1").salary(-1))
        .await
        .unwrap_err();
    assert!(err.is_invalid_input());

    let all = Job::find_all(&tx, &JobFilter::default()).await?;
    assert_eq!(all.len(), 3);

    tx.rollback().await.map_err(JobError::from_db_error)?;
    Ok(())
}

#[tokio::test]
async fn find_all_without_filters_lists_every_job_by_title() -> JobResult<()> {
    let mut client = connect_or_skip!("find_all_without_filters_lists_every_job_by_title");
    let tx = client.transaction().await.map_err(JobError::from_db_error)?;
    let [j1, ..] = seed(&tx).await?;

    let jobs = Job::find_all(&tx, &JobFilter::default()).await?;
    assert_eq!(titles(&jobs), ["j1", "j2", "j3"]);

    let first = &jobs[0];
    assert_eq!(first.id, j1);
    assert_eq!(first.salary, Some(100));
    assert_eq!(first.equity, Some(Decimal::new(1, 1)));
    assert_eq!(first.company_handle, "c1");
    assert_eq!(first.company_name.as_deref(), Some("C1"));

    tx.rollback().await.map_err(JobError::from_db_error)?;
    Ok(())
}

#[tokio::test]
async fn find_all_applies_each_filter() -> JobResult<()> {
    let mut client = connect_or_skip!("find_all_applies_each_filter");
    let tx = client.transaction().await.map_err(JobError::from_db_error)?;
    seed(&tx).await?;

    let by_title = JobFilter {
        title: Some("J2".to_string()),
        ..Default::default()
    };
    assert_eq!(titles(&Job::find_all(&tx, &by_title).await?), ["j2"]);

    let by_salary = JobFilter {
        min_salary: Some(250),
        ..Default::default()
    };
    assert_eq!(titles(&Job::find_all(&tx, &by_salary).await?), ["j3"]);

    let with_equity = JobFilter {
        has_equity: Some(true),
        ..Default::default()
    };
    assert_eq!(titles(&Job::find_all(&tx, &with_equity).await?), ["j1", "j2"]);

    let equity_off = JobFilter {
        has_equity: Some(false),
        ..Default::default()
    };
    assert_eq!(Job::find_all(&tx, &equity_off).await?.len(), 3);

    let nothing = JobFilter {
        title: Some("nope".to_string()),
        ..Default::default()
    };
    assert!(Job::find_all(&tx, &nothing).await?.is_empty());

    tx.rollback().await.map_err(JobError::from_db_error)?;
    Ok(())
}

#[tokio::test]
async fn find_all_combines_filters_with_and() -> JobResult<()> {
    let mut client = connect_or_skip!("find_all_combines_filters_with_and");
    let tx = client.transaction().await.map_err(JobError::from_db_error)?;
    seed(&tx).await?;

    let filter = JobFilter {
        title: Some("j".to_string()),
        min_salary: Some(150),
        has_equity: Some(true),
    };
    assert_eq!(titles(&Job::find_all(&tx, &filter).await?), ["j2"]);

    tx.rollback().await.map_err(JobError::from_db_error)?;
    Ok(())
}

#[tokio::test]
async fn get_attaches_company() -> JobResult<()> {
    let mut client = connect_or_skip!("get_attaches_company");
    let tx = client.transaction().await.map_err(JobError::from_db_error)?;
    let [j1, ..] = seed(&tx).await?;

    let found = Job::get(&tx, j1).await?;
    assert_eq!(found.job.title, "j1");
    let company = found.company.expect("company attached");
    assert_eq!(company.handle, "c1");
    assert_eq!(company.name, "C1");
    assert_eq!(company.num_employees, Some(1));
    assert_eq!(company.logo_url.as_deref(), Some("http://c1.img"));

    let body = jobly::response::job(&Job::get(&tx, j1).await?).expect("serializable");
    assert_eq!(body["job"]["companyHandle"], "c1");
    assert_eq!(body["job"]["company"]["numEmployees"], 1);

    tx.rollback().await.map_err(JobError::from_db_error)?;
    Ok(())
}

#[tokio::test]
async fn get_with_missing_company_leaves_it_out() -> JobResult<()> {
    let mut client = connect_or_skip!("get_with_missing_company_leaves_it_out");
    let tx = client.transaction().await.map_err(JobError::from_db_error)?;
    seed(&tx).await?;

    tx.batch_execute("ALTER TABLE jobs DROP CONSTRAINT jobs_company_handle_fkey")
        .await
        .map_err(JobError::from_db_error)?;
    let row = sql("INSERT INTO jobs (title, salary, equity, company_handle) \
                   VALUES ('orphan', 10, NULL, 'gone') RETURNING id")
    .fetch_opt(&tx)
    .await?
    .expect("inserted row");
    let id: i32 = row.get(0);

    let found = Job::get(&tx, id).await?;
    assert_eq!(found.job.company_handle, "gone");
    assert!(found.company.is_none());

    let body = jobly::response::job(&found).expect("serializable");
    let job = body["job"].as_object().expect("job object");
    assert!(!job.contains_key("company"));
    assert_eq!(job["companyHandle"], "gone");

    let listed = Job::find_all(&tx, &JobFilter::default()).await?;
    let orphan = listed.iter().find(|j| j.id == id).expect("listed");
    assert_eq!(orphan.company_name, None);

    tx.rollback().await.map_err(JobError::from_db_error)?;
    Ok(())
}

#[tokio::test]
async fn get_unknown_id_is_not_found() -> JobResult<()> {
    let mut client = connect_or_skip!("get_unknown_id_is_not_found");
    let tx = client.transaction().await.map_err(JobError::from_db_error)?;
    seed(&tx).await?;

    let err = Job::get(&tx, 0).await.unwrap_err();
    assert!(err.is_not_found());
    assert_eq!(err.to_string(), "No job: 0");

    tx.rollback().await.map_err(JobError::from_db_error)?;
    Ok(())
}

#[tokio::test]
async fn update_changes_only_present_fields() -> JobResult<()> {
    let mut client = connect_or_skip!("update_changes_only_present_fields");
    let tx = client.transaction().await.map_err(JobError::from_db_error)?;
    let [j1, ..] = seed(&tx).await?;

    let patch = JobPatch {
        salary: Some(Some(999)),
        ..Default::default()
    };
    let job = Job::update(&tx, j1, patch).await?;
    assert_eq!(job.id, j1);
    assert_eq!(job.title, "j1");
    assert_eq!(job.salary, Some(999));
    assert_eq!(job.equity, Some(Decimal::new(1, 1)));
    assert_eq!(job.company_handle, "c1");

    let patch = JobPatch::from_json(serde_json::json!({
        "title": "renamed",
        "companyHandle": "c2",
    }))?;
    let job = Job::update(&tx, j1, patch).await?;
    assert_eq!(job.title, "renamed");
    assert_eq!(job.salary, Some(999));
    assert_eq!(job.company_handle, "c2");

    let found = Job::get(&tx, j1).await?;
    assert_eq!(found.company.map(|c| c.handle).as_deref(), Some("c2"));

    tx.rollback().await.map_err(JobError::from_db_error)?;
    Ok(())
}

#[tokio::test]
async fn update_with_null_clears_nullable_columns() -> JobResult<()> {
    let mut client = connect_or_skip!("update_with_null_clears_nullable_columns");
    let tx = client.transaction().await.map_err(JobError::from_db_error)?;
    let [j1, ..] = seed(&tx).await?;

    let patch = JobPatch::from_json(serde_json::json!({ "equity": null }))?;
    let job = Job::update(&tx, j1, patch).await?;
    assert_eq!(job.equity, None);
    assert_eq!(job.salary, Some(100));

    let patch = JobPatch::from_json(serde_json::json!({ "title": "j1b", "salary": null }))?;
    Job::update(&tx, j1, patch).await?;

    let found = Job::get(&tx, j1).await?.job;
    assert_eq!(found.title, "j1b");
    assert_eq!(found.salary, None);
    assert_eq!(found.equity, None);

    let with_equity = JobFilter {
        has_equity: Some(true),
        ..Default::default()
    };
    assert_eq!(titles(&Job::find_all(&tx, &with_equity).await?), ["j2"]);

    tx.rollback().await.map_err(JobError::from_db_error)?;
    Ok(())
}

#[tokio::test]
async fn update_rejects_empty_patch_and_unknown_id() -> JobResult<()> {
    let mut client = connect_or_skip!("update_rejects_empty_patch_and_unknown_id");
    let tx = client.transaction().await.map_err(JobError::from_db_error)?;
    let [j1, ..] = seed(&tx).await?;

    let err = Job::update(&tx, j1, JobPatch::default()).await.unwrap_err();
    assert!(err.is_invalid_input());
    assert_eq!(err.to_string(), "Invalid input: No data");

    let patch = JobPatch {
        title: Some("x".to_string()),
        ..Default::default()
    };
    let err = Job::update(&tx, 0, patch).await.unwrap_err();
    assert!(err.is_not_found());
    assert_eq!(err.to_string(), "No job: 0");

    let unchanged = Job::get(&tx, j1).await?;
    assert_eq!(unchanged.job.title, "j1");

    tx.rollback().await.map_err(JobError::from_db_error)?;
    Ok(())
}

#[tokio::test]
async fn update_to_unknown_company_is_invalid_input() -> JobResult<()> {
    let mut client = connect_or_skip!("update_to_unknown_company_is_invalid_input");
    let tx = client.transaction().await.map_err(JobError::from_db_error)?;
    let [j1, ..] = seed(&tx).await?;

    let patch = JobPatch {
        company_handle: Some("nope".to_string()),
        ..Default::default()
    };
    // Aborts the transaction; keep it last.
    let err = Job::update(&tx, j1, patch).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidInput);

    tx.rollback().await.map_err(JobError::from_db_error)?;
    Ok(())
}

#[tokio::test]
async fn delete_removes_job() -> JobResult<()> {
    let mut client = connect_or_skip!("delete_removes_job");
    let tx = client.transaction().await.map_err(JobError::from_db_error)?;
    let [j1, ..] = seed(&tx).await?;

    Job::delete(&tx, j1).await?;
    assert!(Job::get(&tx, j1).await.unwrap_err().is_not_found());
    assert_eq!(titles(&Job::find_all(&tx, &JobFilter::default()).await?), ["j2", "j3"]);

    let err = Job::delete(&tx, j1).await.unwrap_err();
    assert!(err.is_not_found());
    assert_eq!(err.to_string(), format!("No job: {j1}"));

    tx.rollback().await.map_err(JobError::from_db_error)?;
    Ok(())
}
