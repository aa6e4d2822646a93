//! Command-line front end for the family graph core.
//!
//! # Responsibility
//! - Sync a JSON draft into a local store and print the committed snapshot.
//! - Print a stored snapshot for inspection.
//! - Keep a tiny `ping` probe for linkage checks.

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use familytree_core::db::open_db;
use familytree_core::logging::{LOG_DIR_ENV, LOG_LEVEL_ENV};
use familytree_core::{init_logging, FamilyDraft, FamilyService, FamilyTreeSnapshot, LoggingConfig};
use std::path::PathBuf;
use std::process::ExitCode;
use uuid::Uuid;

#[derive(Debug, Parser)]
#[command(name = "familytree", version, about = "Family tree sync engine tooling")]
struct Cli {
    /// trace|debug|info|warn|error. Defaults by build mode.
    #[arg(long, global = true, env = LOG_LEVEL_ENV)]
    log_level: Option<String>,
    /// Absolute directory for rolling log files. Logging is off when unset.
    #[arg(long, global = true, env = LOG_DIR_ENV)]
    log_dir: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Print core ping and version.
    Ping,
    /// Reconcile a JSON draft into the store.
    Sync(SyncArgs),
    /// Print a stored tree as JSON.
    Show(ShowArgs),
}

#[derive(Debug, Args)]
struct SyncArgs {
    #[arg(long)]
    db: PathBuf,
    #[arg(long)]
    requester: Uuid,
    #[arg(long)]
    group: Uuid,
    /// Path to the draft JSON file.
    #[arg(long)]
    draft: PathBuf,
}

#[derive(Debug, Args)]
struct ShowArgs {
    #[arg(long)]
    db: PathBuf,
    #[arg(long, conflicts_with = "group", required_unless_present = "group")]
    family: Option<Uuid>,
    #[arg(long)]
    group: Option<Uuid>,
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    start_logging(cli.log_level.as_deref(), cli.log_dir.as_ref())?;

    match cli.command {
        Command::Ping => {
            println!("familytree_core ping={}", familytree_core::ping());
            println!("familytree_core version={}", familytree_core::core_version());
            Ok(ExitCode::SUCCESS)
        }
        Command::Sync(args) => run_sync(&args),
        Command::Show(args) => run_show(&args),
    }
}

fn start_logging(level: Option<&str>, log_dir: Option<&PathBuf>) -> Result<()> {
    let Some(log_dir) = log_dir else {
        if level.is_some() {
            bail!("--log-level requires --log-dir");
        }
        return Ok(());
    };

    let config = match level {
        Some(level) => LoggingConfig::new(level, log_dir),
        None => LoggingConfig::with_default_level(log_dir),
    }?;
    init_logging(&config)?;
    Ok(())
}

fn run_sync(args: &SyncArgs) -> Result<ExitCode> {
    let raw = std::fs::read_to_string(&args.draft)
        .with_context(|| format!("failed to read draft `{}`", args.draft.display()))?;
    let draft: FamilyDraft = serde_json::from_str(&raw)
        .with_context(|| format!("draft `{}` is not a valid family draft", args.draft.display()))?;

    let mut conn = open_db(&args.db)
        .with_context(|| format!("failed to open store `{}`", args.db.display()))?;
    let mut service = FamilyService::try_new(&mut conn)?;
    let snapshot = service
        .sync(args.requester, args.group, &draft)
        .with_context(|| format!("sync of family {} failed", draft.family.id))?;

    print_snapshot(&snapshot)?;
    Ok(ExitCode::SUCCESS)
}

fn run_show(args: &ShowArgs) -> Result<ExitCode> {
    let mut conn = open_db(&args.db)
        .with_context(|| format!("failed to open store `{}`", args.db.display()))?;
    let service = FamilyService::try_new(&mut conn)?;

    let snapshot = match (args.family, args.group) {
        (Some(family_id), _) => service.load_tree(family_id)?,
        (None, Some(group_id)) => service.load_tree_for_group(group_id)?,
        (None, None) => bail!("either --family or --group is required"),
    };

    match snapshot {
        Some(snapshot) => {
            print_snapshot(&snapshot)?;
            Ok(ExitCode::SUCCESS)
        }
        None => {
            eprintln!("no family tree stored");
            Ok(ExitCode::FAILURE)
        }
    }
}

fn print_snapshot(snapshot: &FamilyTreeSnapshot) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(snapshot)?);
    Ok(())
}
