//! Demonstration driver for `tradebook_core`.
//!
//! # Responsibility
//! - Open (or create) the store and run a fixed CRUD walkthrough.
//! - Keep going after individual operation failures; they are reported on
//!   stderr and the walkthrough continues.

use anyhow::{bail, Context};
use clap::Parser;
use std::path::PathBuf;
use tradebook_core::db::{open_db_with, DbOptions, DbTarget};

mod demo;

#[derive(Debug, Parser)]
#[command(name = "tradebook")]
#[command(about = "Users, companies and share transactions in SQLite", long_about = None)]
struct Cli {
    /// SQLite database file, created when absent.
    #[arg(long, default_value = "app.db")]
    db: PathBuf,

    /// Use a throwaway in-memory database instead of `--db`.
    #[arg(long, conflicts_with = "db")]
    in_memory: bool,

    /// trace|debug|info|warn|error. Defaults by build mode.
    #[arg(long)]
    log_level: Option<String>,

    /// Absolute directory for rolling log files; stderr when omitted.
    #[arg(long)]
    log_dir: Option<String>,

    /// Reject transactions that reference missing users or companies.
    #[arg(long)]
    enforce_foreign_keys: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let level = cli
        .log_level
        .as_deref()
        .unwrap_or(tradebook_core::default_log_level());
    let logging = match cli.log_dir.as_deref() {
        Some(dir) => tradebook_core::init_logging(level, dir),
        None => tradebook_core::init_stderr_logging(level),
    };
    if let Err(message) = logging {
        bail!("failed to initialize logging: {message}");
    }

    let target = if cli.in_memory {
        DbTarget::Memory
    } else {
        DbTarget::File(cli.db.clone())
    };
    let options = DbOptions {
        enforce_foreign_keys: cli.enforce_foreign_keys,
        ..DbOptions::default()
    };
    let conn = open_db_with(&target, &options)
        .with_context(|| format!("failed to open database {target:?}"))?;
    println!(
        "Database initialized successfully! (tradebook_core {})",
        tradebook_core::core_version()
    );

    demo::run(&conn)
}
