use jobly::{JobFilter, NewJob};
use rust_decimal::Decimal;
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HelpTopic {
    Root,
    Jobs,
    Migrate,
}

#[derive(Debug, Clone)]
pub enum Command {
    Help(HelpTopic),
    Migrate(GlobalArgs),
    Jobs(GlobalArgs, JobsCommand),
}

/// Options accepted by every command that talks to the database.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GlobalArgs {
    pub config: Option<PathBuf>,
    pub database: Option<String>,
    pub admin: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobsCommand {
    List(JobFilter),
    Get(i32),
    Create(NewJob),
    /// The patch stays raw JSON so unknown fields surface as validation errors.
    Update(i32, serde_json::Value),
    Delete(i32),
}

pub fn parse_args(args: &[String]) -> anyhow::Result<Command> {
    let mut it = args.iter().skip(1);
    let Some(first) = it.next() else {
        return Ok(Command::Help(HelpTopic::Root));
    };

    match first.as_str() {
        "-h" | "--help" | "help" => Ok(Command::Help(HelpTopic::Root)),
        "jobs" => parse_jobs(it.map(|s| s.as_str())),
        "migrate" => parse_migrate(it.map(|s| s.as_str())),
        _ => anyhow::bail!("unknown command: {first}"),
    }
}

/// Consume a global option if `token` is one. Returns `false` otherwise.
fn take_global<'a>(
    token: &str,
    it: &mut impl Iterator<Item = &'a str>,
    global: &mut GlobalArgs,
) -> anyhow::Result<bool> {
    match token {
        "--admin" => global.admin = true,
        "--config" => {
            let Some(v) = it.next() else {
                anyhow::bail!("--config requires a value");
            };
            global.config = Some(PathBuf::from(v));
        }
        _ if token.starts_with("--config=") => {
            global.config = Some(PathBuf::from(token.trim_start_matches("--config=")));
        }
        "--database" => {
            let Some(v) = it.next() else {
                anyhow::bail!("--database requires a value");
            };
            global.database = Some(v.to_string());
        }
        _ if token.starts_with("--database=") => {
            global.database = Some(token.trim_start_matches("--database=").to_string());
        }
        _ => return Ok(false),
    }
    Ok(true)
}

fn parse_migrate<'a>(mut it: impl Iterator<Item = &'a str>) -> anyhow::Result<Command> {
    let mut global = GlobalArgs::default();
    while let Some(token) = it.next() {
        if matches!(token, "-h" | "--help") {
            return Ok(Command::Help(HelpTopic::Migrate));
        }
        if !take_global(token, &mut it, &mut global)? {
            anyhow::bail!("unexpected argument: {token}");
        }
    }
    Ok(Command::Migrate(global))
}

fn parse_jobs<'a>(mut it: impl Iterator<Item = &'a str>) -> anyhow::Result<Command> {
    let mut global = GlobalArgs::default();
    let mut subcmd: Option<&str> = None;
    let mut positional: Vec<&str> = Vec::new();

    let mut title: Option<String> = None;
    let mut company: Option<String> = None;
    let mut salary: Option<i32> = None;
    let mut equity: Option<Decimal> = None;
    let mut min_salary: Option<i32> = None;
    let mut has_equity = false;

    while let Some(token) = it.next() {
        match token {
            "-h" | "--help" => return Ok(Command::Help(HelpTopic::Jobs)),
            "list" | "get" | "create" | "update" | "delete" if subcmd.is_none() => {
                subcmd = Some(token);
            }
            "--title" => title = Some(value(&mut it, "--title")?.to_string()),
            "--company" => company = Some(value(&mut it, "--company")?.to_string()),
            "--salary" => salary = Some(number(value(&mut it, "--salary")?, "--salary")?),
            "--min-salary" => {
                min_salary = Some(number(value(&mut it, "--min-salary")?, "--min-salary")?)
            }
            "--equity" => {
                let v = value(&mut it, "--equity")?;
                equity = Some(
                    v.parse()
                        .map_err(|_| anyhow::anyhow!("--equity expects a decimal, got {v}"))?,
                );
            }
            "--has-equity" => has_equity = true,
            _ if take_global(token, &mut it, &mut global)? => {}
            _ if token.starts_with("--") => anyhow::bail!("unknown option: {token}"),
            _ => positional.push(token),
        }
    }

    let Some(subcmd) = subcmd else {
        return Ok(Command::Help(HelpTopic::Jobs));
    };

    let cmd = match subcmd {
        "list" => {
            no_positional(&positional, "list")?;
            JobsCommand::List(JobFilter {
                title,
                min_salary,
                has_equity: has_equity.then_some(true),
            })
        }
        "get" => JobsCommand::Get(single_id(&positional, "get")?),
        "delete" => JobsCommand::Delete(single_id(&positional, "delete")?),
        "create" => {
            no_positional(&positional, "create")?;
            let Some(title) = title else {
                anyhow::bail!("create requires --title");
            };
            let Some(company) = company else {
                anyhow::bail!("create requires --company");
            };
            let mut data = NewJob::new(title, company);
            data.salary = salary;
            data.equity = equity;
            JobsCommand::Create(data)
        }
        "update" => {
            let [id, patch] = positional.as_slice() else {
                anyhow::bail!("usage: jobly jobs update <ID> <JSON>");
            };
            let id = number(id, "job id")?;
            let patch: serde_json::Value = serde_json::from_str(patch)
                .map_err(|e| anyhow::anyhow!("patch is not valid JSON: {e}"))?;
            JobsCommand::Update(id, patch)
        }
        other => anyhow::bail!("unknown subcommand: {other}"),
    };

    Ok(Command::Jobs(global, cmd))
}

fn value<'a>(it: &mut impl Iterator<Item = &'a str>, flag: &str) -> anyhow::Result<&'a str> {
    it.next()
        .ok_or_else(|| anyhow::anyhow!("{flag} requires a value"))
}

fn number(v: &str, what: &str) -> anyhow::Result<i32> {
    v.parse()
        .map_err(|_| anyhow::anyhow!("{what} expects an integer, got {v}"))
}

fn single_id(positional: &[&str], subcmd: &str) -> anyhow::Result<i32> {
    let [id] = positional else {
        anyhow::bail!("usage: jobly jobs {subcmd} <ID>");
    };
    number(id, "job id")
}

fn no_positional(positional: &[&str], subcmd: &str) -> anyhow::Result<()> {
    if let Some(extra) = positional.first() {
        anyhow::bail!("unexpected argument for {subcmd}: {extra}");
    }
    Ok(())
}

pub fn print_help(topic: HelpTopic) {
    match topic {
        HelpTopic::Root => {
            println!(
                "\
jobly - job board over PostgreSQL

USAGE:
  jobly <COMMAND> [OPTIONS]

COMMANDS:
  jobs          List, show, create, update and delete job postings
  migrate       Apply pending schema migrations
  help          Show this message

Run `jobly <command> --help` for more."
            );
        }
        HelpTopic::Jobs => {
            println!(
                "\
USAGE:
  jobly jobs list [--title <TEXT>] [--min-salary <N>] [--has-equity]
  jobly jobs get <ID>
  jobly jobs create --title <TEXT> --company <HANDLE> [--salary <N>] [--equity <D>]
  jobly jobs update <ID> <JSON>
  jobly jobs delete <ID>

GLOBAL OPTIONS:
  --config <FILE>       Config file path (default: jobly.toml if present)
  --database <URL>      Override the configured database URL
  --admin               Act as an administrator (required for create/update/delete)

Output is a JSON envelope on stdout: {{\"job\": ..}}, {{\"jobs\": [..]}},
{{\"deleted\": ID}} or {{\"error\": {{\"message\": .., \"status\": ..}}}}."
            );
        }
        HelpTopic::Migrate => {
            println!(
                "\
USAGE:
  jobly migrate [--config <FILE>] [--database <URL>]

Applies the embedded schema migrations and prints the applied versions."
            );
        }
    }
}
