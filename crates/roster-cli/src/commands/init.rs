//! Init command implementation.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use roster_core::Collection;
use roster_local::SqliteStore;

use crate::{output, paths};

#[derive(Args, Debug)]
pub struct InitArgs {
    /// SQLite database file (defaults to the platform data directory)
    #[arg(long, env = "ROSTER_DB")]
    pub db: Option<PathBuf>,
}

pub async fn run(args: InitArgs) -> Result<()> {
    let db = paths::database(args.db)?;

    SqliteStore::open(&db)
        .with_context(|| format!("Failed to initialize database {}", db.display()))?;

    output::success("Database ready");
    output::field("Path", &db.display().to_string());
    let tables: Vec<_> = Collection::ALL.iter().map(|c| c.as_str()).collect();
    output::field("Tables", &tables.join(", "));

    Ok(())
}
