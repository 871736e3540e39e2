use serde::{Deserialize, Serialize};
use tokio_postgres::Row;

use crate::client::GenericClient;
use crate::error::JobResult;
use crate::row::{FromRow, RowExt};
use crate::sql::sql;

/// A company as stored in `companies`. Read-only from the job operations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Company {
    pub handle: String,
    pub name: String,
    pub description: String,
    pub num_employees: Option<i32>,
    pub logo_url: Option<String>,
}

impl FromRow for Company {
    fn from_row(row: &Row) -> JobResult<Self> {
        Ok(Self {
            handle: row.try_get_column("handle")?,
            name: row.try_get_column("name")?,
            description: row.try_get_column("description")?,
            num_employees: row.try_get_column("numEmployees")?,
            logo_url: row.try_get_column("logoUrl")?,
        })
    }
}

impl Company {
    /// Look up a company by handle; `None` when no such company exists.
    pub async fn find_by_handle(
        conn: &impl GenericClient,
        handle: &str,
    ) -> JobResult<Option<Company>> {
        sql(r#"SELECT handle,
                      name,
                      description,
                      num_employees AS "numEmployees",
                      logo_url AS "logoUrl"
               FROM companies
               WHERE handle = $1"#)
        .bind(handle.to_string())
        .fetch_opt_as(conn)
        .await
    }
}
