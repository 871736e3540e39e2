use tracing_subscriber::EnvFilter;

/// Third-party targets kept quiet unless the filter names them.
const QUIET: &[(&str, &str)] = &[("tokio_postgres", "warn"), ("refinery_core", "warn")];

fn directives(filter: &str) -> String {
    let mut directives = vec![filter.to_string()];
    for (target, level) in QUIET {
        if !filter.contains(target) {
            directives.push(format!("{target}={level}"));
        }
    }
    directives.join(",")
}

fn build_env_filter(filter: &str) -> anyhow::Result<EnvFilter> {
    EnvFilter::try_new(directives(filter))
        .map_err(|e| anyhow::anyhow!("invalid log filter {filter:?}: {e}"))
}

/// Install the global subscriber. Logs go to stderr; stdout carries JSON only.
pub fn init(filter: &str) -> anyhow::Result<()> {
    let filter = build_env_filter(filter)?;
    // A second init (tests, embedding) keeps the first subscriber.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .try_init();
    Ok(())
}
