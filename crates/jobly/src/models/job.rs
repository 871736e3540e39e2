use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};
use tokio_postgres::Row;

use super::company::Company;
use crate::client::GenericClient;
use crate::condition::Condition;
use crate::error::{JobError, JobResult};
use crate::partial_update::{ColumnMap, FieldMap, sql_for_partial_update};
use crate::row::{FromRow, RowExt};
use crate::sql::{Sql, sql};
use crate::validate::{ValidationCode, ValidationError, ValidationErrors};

/// Columns every write returns, aliased to the external field names.
const JOB_RETURNING: &str = r#"id, title, salary, equity, company_handle AS "companyHandle""#;

const LIST_SELECT: &str = r#"SELECT j.id,
       j.title,
       j.salary,
       j.equity,
       j.company_handle AS "companyHandle",
       c.name AS "companyName"
FROM jobs AS j
LEFT JOIN companies AS c ON c.handle = j.company_handle"#;

/// External field name -> `jobs` column, for fields whose names differ.
pub const JOB_COLUMN_MAP: ColumnMap<'static> = &[("companyHandle", "company_handle")];

/// A job posting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Job {
    pub id: i32,
    pub title: String,
    pub salary: Option<i32>,
    pub equity: Option<Decimal>,
    pub company_handle: String,
}

impl FromRow for Job {
    fn from_row(row: &Row) -> JobResult<Self> {
        Ok(Self {
            id: row.try_get_column("id")?,
            title: row.try_get_column("title")?,
            salary: row.try_get_column("salary")?,
            equity: row.try_get_column("equity")?,
            company_handle: row.try_get_column("companyHandle")?,
        })
    }
}

/// A row of the job listing: the job plus its company's name only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JobListItem {
    pub id: i32,
    pub title: String,
    pub salary: Option<i32>,
    pub equity: Option<Decimal>,
    pub company_handle: String,
    /// `None` when the handle matches no company.
    pub company_name: Option<String>,
}

impl FromRow for JobListItem {
    fn from_row(row: &Row) -> JobResult<Self> {
        Ok(Self {
            id: row.try_get_column("id")?,
            title: row.try_get_column("title")?,
            salary: row.try_get_column("salary")?,
            equity: row.try_get_column("equity")?,
            company_handle: row.try_get_column("companyHandle")?,
            company_name: row.try_get_column("companyName")?,
        })
    }
}

/// A job with its full company record attached.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JobWithCompany {
    #[serde(flatten)]
    pub job: Job,
    /// Absent when the job references a company that does not exist.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company: Option<Company>,
}

/// Payload for [`Job::create`].
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct NewJob {
    pub title: String,
    #[serde(default)]
    pub salary: Option<i32>,
    #[serde(default)]
    pub equity: Option<Decimal>,
    pub company_handle: String,
}

impl NewJob {
    pub fn new(title: impl Into<String>, company_handle: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            salary: None,
            equity: None,
            company_handle: company_handle.into(),
        }
    }

    pub fn salary(mut self, salary: i32) -> Self {
        self.salary = Some(salary);
        self
    }

    pub fn equity(mut self, equity: Decimal) -> Self {
        self.equity = Some(equity);
        self
    }

    /// Parse a JSON request body, rejecting unknown fields.
    pub fn from_json(value: serde_json::Value) -> JobResult<Self> {
        serde_json::from_value(value).map_err(|e| JobError::invalid_input(e.to_string()))
    }

    pub fn validate(&self) -> ValidationErrors {
        let mut errs = ValidationErrors::default();
        errs.require_non_empty("title", &self.title);
        errs.require_non_empty("companyHandle", &self.company_handle);
        if let Some(salary) = self.salary {
            errs.require_min("salary", salary, 0);
        }
        if let Some(equity) = self.equity {
            errs.require_between("equity", equity, Decimal::ZERO, Decimal::ONE);
        }
        errs
    }
}

/// Partial update for a job: the closed set of updatable fields.
///
/// `None` leaves a field untouched. The nullable columns use
/// `Some(None)` for an explicit `null`, which sets the column to `NULL`.
/// `id` is not part of the set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct JobPatch {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub salary: Option<Option<i32>>,
    #[serde(default, deserialize_with = "nullable")]
    pub equity: Option<Option<Decimal>>,
    #[serde(default)]
    pub company_handle: Option<String>,
}

/// Present keys deserialize to `Some`, so a `null` value becomes `Some(None)`.
fn nullable<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

impl JobPatch {
    /// External names of the updatable fields, in clause order.
    pub const FIELDS: &'static [&'static str] = &["title", "salary", "equity", "companyHandle"];

    /// Fields backed by `NOT NULL` columns.
    const REQUIRED: &'static [&'static str] = &["title", "companyHandle"];

    /// Parse a JSON request body.
    ///
    /// Every key outside [`JobPatch::FIELDS`] is reported as an
    /// [`ValidationCode::UnknownField`] error, and a `null` for a required
    /// field as [`ValidationCode::Required`], before anything is built.
    pub fn from_json(value: serde_json::Value) -> JobResult<Self> {
        let serde_json::Value::Object(map) = &value else {
            return Err(JobError::invalid_input("patch must be a JSON object"));
        };

        let mut errs = ValidationErrors::default();
        for (key, value) in map {
            if !Self::FIELDS.contains(&key.as_str()) {
                errs.push(ValidationError::new(
                    key.clone(),
                    ValidationCode::UnknownField,
                    format!("{key} is not an updatable field"),
                ));
            } else if value.is_null() && Self::REQUIRED.contains(&key.as_str()) {
                errs.push(ValidationError::new(
                    key.clone(),
                    ValidationCode::Required,
                    format!("{key} must not be null"),
                ));
            }
        }
        errs.into_result()?;

        serde_json::from_value(value).map_err(|e| JobError::invalid_input(e.to_string()))
    }

    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.salary.is_none()
            && self.equity.is_none()
            && self.company_handle.is_none()
    }

    pub fn validate(&self) -> ValidationErrors {
        let mut errs = ValidationErrors::default();
        if let Some(title) = &self.title {
            errs.require_non_empty("title", title);
        }
        if let Some(handle) = &self.company_handle {
            errs.require_non_empty("companyHandle", handle);
        }
        if let Some(Some(salary)) = self.salary {
            errs.require_min("salary", salary, 0);
        }
        if let Some(Some(equity)) = self.equity {
            errs.require_between("equity", equity, Decimal::ZERO, Decimal::ONE);
        }
        errs
    }

    /// The present fields, keyed by external name, in [`JobPatch::FIELDS`] order.
    ///
    /// An explicit `null` is kept and binds SQL `NULL`.
    pub fn to_field_map(&self) -> FieldMap {
        let mut data = FieldMap::new();
        data.insert_opt("title", self.title.clone())
            .insert_opt("salary", self.salary)
            .insert_opt("equity", self.equity)
            .insert_opt("companyHandle", self.company_handle.clone());
        data
    }
}

/// Optional listing filters. A missing key places no constraint.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct JobFilter {
    /// Case-insensitive substring of the title.
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub min_salary: Option<i32>,
    /// Only `true` constrains; `false` is the same as absent.
    #[serde(default)]
    pub has_equity: Option<bool>,
}

impl JobFilter {
    pub fn validate(&self) -> ValidationErrors {
        let mut errs = ValidationErrors::default();
        if let Some(min) = self.min_salary {
            errs.require_min("minSalary", min, 0);
        }
        errs
    }

    /// One `AND`-joined predicate per present filter.
    pub fn conditions(&self) -> JobResult<Vec<Condition>> {
        let mut conditions = Vec::new();

        if let Some(title) = self.title.as_deref().filter(|t| !t.is_empty()) {
            conditions.push(Condition::ilike("j.title", format!("%{title}%"))?);
        }
        if let Some(min) = self.min_salary {
            conditions.push(Condition::gte("j.salary", min)?);
        }
        if self.has_equity == Some(true) {
            conditions.push(Condition::raw("j.equity > 0"));
        }

        Ok(conditions)
    }

    /// The full listing statement for this filter.
    pub fn to_sql(&self) -> JobResult<Sql> {
        let mut q = sql(LIST_SELECT);
        q.push_where_and(&self.conditions()?);
        q.push(" ORDER BY j.title");
        Ok(q)
    }
}

impl Job {
    /// Insert a new job and return it with its generated id.
    ///
    /// Fails with `DuplicateEntry` when a job with the same title exists.
    pub async fn create(conn: &impl GenericClient, data: NewJob) -> JobResult<Job> {
        data.validate().into_result()?;

        let duplicate = sql("SELECT title FROM jobs WHERE title = $1")
            .bind(data.title.clone())
            .fetch_opt(conn)
            .await?;
        if duplicate.is_some() {
            return Err(JobError::duplicate(format!("Duplicate job: {}", data.title)));
        }

        let job: Job = sql(format!(
            "INSERT INTO jobs (title, salary, equity, company_handle) \
             VALUES ($1, $2, $3, $4) \
             RETURNING {JOB_RETURNING}"
        ))
        .bind(data.title)
        .bind(data.salary)
        .bind(data.equity)
        .bind(data.company_handle)
        .fetch_one_as(conn)
        .await?;

        tracing::info!(target: "jobly", id = job.id, title = %job.title, "job created");
        Ok(job)
    }

    /// List jobs matching `filter`, ordered by title.
    pub async fn find_all(conn: &impl GenericClient, filter: &JobFilter) -> JobResult<Vec<JobListItem>> {
        filter.validate().into_result()?;

        let jobs: Vec<JobListItem> = filter.to_sql()?.fetch_all_as(conn).await?;
        tracing::debug!(target: "jobly", count = jobs.len(), ?filter, "jobs listed");
        Ok(jobs)
    }

    /// Fetch one job and attach its company.
    ///
    /// The company is looked up with a second query; a dangling handle leaves
    /// `company` empty instead of failing.
    pub async fn get(conn: &impl GenericClient, id: i32) -> JobResult<JobWithCompany> {
        let job: Job = sql(format!("SELECT {JOB_RETURNING} FROM jobs WHERE id = $1"))
            .bind(id)
            .fetch_opt_as(conn)
            .await?
            .ok_or_else(|| JobError::not_found(format!("No job: {id}")))?;

        let company = Company::find_by_handle(conn, &job.company_handle).await?;
        if company.is_none() {
            tracing::warn!(target: "jobly", id, handle = %job.company_handle, "job references a missing company");
        }

        Ok(JobWithCompany { job, company })
    }

    /// Build the `UPDATE` statement for `patch` without running it.
    pub fn update_sql(id: i32, patch: &JobPatch) -> JobResult<Sql> {
        let update = sql_for_partial_update(&patch.to_field_map(), JOB_COLUMN_MAP)?;
        let mut q = sql(format!(
            "UPDATE jobs SET {} WHERE id = ${} RETURNING {JOB_RETURNING}",
            update.set_cols,
            update.next_index()
        ));
        for value in update.values {
            q = q.bind_value(value);
        }
        Ok(q.bind(id))
    }

    /// Apply a partial update and return the updated job.
    ///
    /// Fails with `InvalidInput` for an empty patch and `NotFound` when no job
    /// has this id.
    pub async fn update(conn: &impl GenericClient, id: i32, patch: JobPatch) -> JobResult<Job> {
        patch.validate().into_result()?;

        let job: Job = Self::update_sql(id, &patch)?
            .fetch_opt_as(conn)
            .await?
            .ok_or_else(|| JobError::not_found(format!("No job: {id}")))?;

        tracing::info!(target: "jobly", id, "job updated");
        Ok(job)
    }

    /// Delete a job by id.
    pub async fn delete(conn: &impl GenericClient, id: i32) -> JobResult<()> {
        let deleted = sql("DELETE FROM jobs WHERE id = $1 RETURNING id")
            .bind(id)
            .fetch_opt(conn)
            .await?;
        if deleted.is_none() {
            return Err(JobError::not_found(format!("No job: {id}")));
        }

        tracing::info!(target: "jobly", id, "job deleted");
        Ok(())
    }
}
