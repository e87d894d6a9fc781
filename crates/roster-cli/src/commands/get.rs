//! Get command implementation.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use roster_core::{Collection, RecordId, RecordStore};
use roster_local::SqliteStore;

use crate::{output, paths};

#[derive(Args, Debug)]
pub struct GetArgs {
    /// Collection name (e.g., students)
    pub collection: String,

    /// Record id
    pub id: String,

    /// SQLite database file (defaults to the platform data directory)
    #[arg(long, env = "ROSTER_DB")]
    pub db: Option<PathBuf>,
}

pub async fn run(args: GetArgs) -> Result<()> {
    let collection: Collection = args.collection.parse().context("Invalid collection")?;
    let id = RecordId::new(&args.id).context("Invalid record id")?;
    let db = paths::database(args.db)?;

    let store = SqliteStore::open(&db)
        .with_context(|| format!("Failed to open database {}", db.display()))?;

    let record = store
        .get(collection, &id)
        .await
        .context("Failed to get record")?
        .with_context(|| format!("No record {} in {}", id, collection))?;

    output::json_pretty(&record.fields)?;

    Ok(())
}
