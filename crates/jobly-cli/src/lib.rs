mod cli;
mod jobs_cmd;
mod logging;

use anyhow::Context;
use jobly::Settings;

pub async fn run(args: Vec<String>) -> anyhow::Result<()> {
    let cmd = cli::parse_args(&args)?;
    match cmd {
        cli::Command::Help(topic) => {
            cli::print_help(topic);
            Ok(())
        }
        cli::Command::Migrate(global) => {
            let settings = load_settings(&global)?;
            let pool = jobly::create_pool_from_settings(&settings)?;
            let report = jobly::migrate::run_pool(&pool).await?;
            let applied: Vec<String> = report
                .applied_migrations()
                .iter()
                .map(|m| format!("V{}__{}", m.version(), m.name()))
                .collect();
            println!("{}", serde_json::json!({ "applied": applied }));
            Ok(())
        }
        cli::Command::Jobs(global, cmd) => {
            let settings = load_settings(&global)?;
            jobs_cmd::run(&settings, global.admin, cmd).await
        }
    }
}

/// Load [`Settings`] and install logging; `--database` wins over every other source.
fn load_settings(global: &cli::GlobalArgs) -> anyhow::Result<Settings> {
    let mut settings =
        Settings::load(global.config.as_deref()).context("failed to load configuration")?;
    if let Some(url) = &global.database {
        settings.database.url = Some(url.clone());
    }
    logging::init(&settings.log.filter)?;
    Ok(settings)
}
