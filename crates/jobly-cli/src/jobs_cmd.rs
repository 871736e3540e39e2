use crate::cli::JobsCommand;
use jobly::{
    Caller, GenericClient, Job, JobError, JobPatch, LoggedClient, Operation, Settings, authorize,
    response,
};
use serde_json::Value;
use tracing::Level;

pub async fn run(settings: &Settings, admin: bool, cmd: JobsCommand) -> anyhow::Result<()> {
    let caller = if admin {
        Caller::admin(std::env::var("USER").unwrap_or_else(|_| "cli".to_string()))
    } else {
        Caller::anonymous()
    };

    let pool = jobly::create_pool_from_settings(settings)?;
    let client = pool.get().await.map_err(JobError::from)?;
    let level = if settings.log.log_sql {
        Level::INFO
    } else {
        Level::DEBUG
    };
    let conn = LoggedClient::new(client).level(level);

    match execute(&conn, &caller, cmd).await {
        Ok(body) => {
            println!("{}", serde_json::to_string_pretty(&body)?);
            Ok(())
        }
        Err(e) => {
            println!("{}", serde_json::to_string_pretty(&response::error(&e))?);
            anyhow::bail!("{} {}", e.status_code(), e)
        }
    }
}

fn operation(cmd: &JobsCommand) -> Operation {
    match cmd {
        JobsCommand::List(_) => Operation::FindAll,
        JobsCommand::Get(_) => Operation::Get,
        JobsCommand::Create(_) => Operation::Create,
        JobsCommand::Update(..) => Operation::Update,
        JobsCommand::Delete(_) => Operation::Delete,
    }
}

async fn execute(
    conn: &impl GenericClient,
    caller: &Caller,
    cmd: JobsCommand,
) -> Result<Value, JobError> {
    authorize(caller, operation(&cmd))?;

    let body = match cmd {
        JobsCommand::List(filter) => response::jobs(&Job::find_all(conn, &filter).await?),
        JobsCommand::Get(id) => response::job(&Job::get(conn, id).await?),
        JobsCommand::Create(data) => response::job(&Job::create(conn, data).await?),
        JobsCommand::Update(id, patch) => {
            let patch = JobPatch::from_json(patch)?;
            response::job(&Job::update(conn, id, patch).await?)
        }
        JobsCommand::Delete(id) => {
            Job::delete(conn, id).await?;
            Ok(response::deleted(id))
        }
    };
    body.map_err(|e| JobError::decode("response", e.to_string()))
}
