use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use std::path::PathBuf;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;
use worklog_store::sync::{DEFAULT_INCREMENT, round_up_with};
use worklog_store::{Envelope, NewWorklog, StoreConfig, WorklogPatch, WorklogService};

#[derive(Parser)]
#[command(name = "worklog")]
#[command(about = "Local worklog store with issue-tracker sync state")]
struct Cli {
    /// Directory holding worklogs.json and its backups
    #[arg(long, env = "WORKLOG_DATA_DIR")]
    data_dir: PathBuf,

    /// Disable the read cache
    #[arg(long)]
    no_cache: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List records, all of them unless a filter is given
    List {
        #[arg(long, conflicts_with_all = ["from", "to", "pending"])]
        date: Option<String>,
        #[arg(long, requires = "to", conflicts_with = "pending")]
        from: Option<String>,
        #[arg(long, requires = "from", conflicts_with = "pending")]
        to: Option<String>,
        #[arg(long)]
        pending: bool,
    },
    /// Show one record by id or unique id prefix
    Get { id: String },
    Add(AddArgs),
    Update(UpdateArgs),
    Delete { id: String },
    MarkSynced { id: String, external_worklog_id: String },
    MarkError { id: String, message: String },
    /// Print the container path
    Path,
    Stats,
    /// List backups, newest first
    Backups,
    /// Round minutes up to the reporting increment
    Round {
        minutes: u32,
        #[arg(long, default_value_t = DEFAULT_INCREMENT)]
        increment: u32,
    },
}

#[derive(Args)]
struct AddArgs {
    #[arg(long)]
    task: String,
    #[arg(long)]
    key: Option<String>,
    #[arg(long)]
    date: String,
    #[arg(long)]
    start: String,
    #[arg(long)]
    end: String,
    #[arg(long)]
    minutes: u32,
    #[arg(long, default_value = "")]
    description: String,
}

#[derive(Args)]
struct UpdateArgs {
    id: String,
    #[arg(long)]
    task: Option<String>,
    #[arg(long, conflicts_with = "clear_key")]
    key: Option<String>,
    /// Remove the external key
    #[arg(long)]
    clear_key: bool,
    #[arg(long)]
    date: Option<String>,
    #[arg(long)]
    start: Option<String>,
    #[arg(long)]
    end: Option<String>,
    #[arg(long)]
    minutes: Option<u32>,
    #[arg(long)]
    description: Option<String>,
}

impl UpdateArgs {
    fn into_patch(self) -> (String, WorklogPatch) {
        let external_key = match (self.key, self.clear_key) {
            (_, true) => Some(None),
            (Some(key), false) => Some(Some(key)),
            (None, false) => None,
        };
        let patch = WorklogPatch {
            task_id: self.task,
            external_key,
            date: self.date,
            start_time: self.start,
            end_time: self.end,
            duration_minutes: self.minutes,
            description: self.description,
        };
        (self.id, patch)
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct BackupView {
    name: String,
    path: PathBuf,
    modified: chrono::DateTime<chrono::Utc>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .with_env_var("WORKLOG_LOG")
                .from_env_lossy(),
        )
        .init();

    let cli = Cli::parse();
    let mut config = StoreConfig::new(&cli.data_dir);
    if cli.no_cache {
        config = config.without_cache();
    }
    let service = WorklogService::open(&config);

    match cli.command {
        Command::List {
            date,
            from,
            to,
            pending,
        } => match (date, from, to) {
            (Some(date), _, _) => print(&service.list_by_date(&date)),
            (None, Some(from), Some(to)) => print(&service.list_by_range(&from, &to)),
            _ if pending => print(&service.list_pending()),
            _ => print(&service.list_all()),
        },
        Command::Get { id } => print(&service.get(&id)),
        Command::Add(args) => print(&service.add(NewWorklog {
            task_id: args.task,
            external_key: args.key,
            date: args.date,
            start_time: args.start,
            end_time: args.end,
            duration_minutes: args.minutes,
            description: args.description,
        })),
        Command::Update(args) => {
            let (id, patch) = args.into_patch();
            print(&resolved(&service, &id, |id| service.update(id, patch)))
        }
        Command::Delete { id } => print(&resolved(&service, &id, |id| service.delete(id))),
        Command::MarkSynced {
            id,
            external_worklog_id,
        } => print(&resolved(&service, &id, |id| {
            service.mark_synced(id, &external_worklog_id)
        })),
        Command::MarkError { id, message } => {
            print(&resolved(&service, &id, |id| service.mark_error(id, &message)))
        }
        Command::Path => print(&service.store_path()),
        Command::Stats => print(&service.stats()),
        Command::Backups => {
            let backups = service.with_store(|store| store.backups().list_backups());
            let views = backups.map(|entries| {
                entries
                    .into_iter()
                    .map(|entry| BackupView {
                        name: entry.name,
                        path: entry.path,
                        modified: entry.modified.into(),
                    })
                    .collect::<Vec<_>>()
            });
            print(&Envelope::from(views))
        }
        Command::Round { minutes, increment } => {
            print(&Envelope::ok(round_up_with(minutes, increment)))
        }
    }
}

/// Runs `op` on the full id behind an id or unique id prefix.
fn resolved<T>(
    service: &WorklogService,
    id_or_prefix: &str,
    op: impl FnOnce(&str) -> Envelope<T>,
) -> Envelope<T> {
    match service.resolve_id(id_or_prefix) {
        Ok(id) => op(&id),
        Err(err) => Envelope::err(err.to_string()),
    }
}

fn print<T: Serialize>(envelope: &Envelope<T>) -> Result<()> {
    let json = serde_json::to_string_pretty(envelope).context("Failed to serialize response")?;
    println!("{}", json);
    if !envelope.success {
        std::process::exit(1);
    }
    Ok(())
}
