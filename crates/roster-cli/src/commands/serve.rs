//! Serve command implementation.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use tracing::{info, warn};

use roster_live::{LiveConfig, LiveServer, PatchService};
use roster_local::{FileSessionDirectory, SqliteStore};

use crate::paths;

#[derive(Args, Debug)]
pub struct ServeArgs {
    /// Address to listen on
    #[arg(long, env = "ROSTER_LISTEN", default_value = "127.0.0.1:3000")]
    pub listen: String,

    /// SQLite database file (defaults to the platform data directory)
    #[arg(long, env = "ROSTER_DB")]
    pub db: Option<PathBuf>,

    /// Login users file (or token map) listing active sessions
    #[arg(long, env = "ROSTER_SESSIONS")]
    pub sessions: Option<PathBuf>,

    /// Deadline for each store or session lookup, in milliseconds
    #[arg(long, env = "ROSTER_STORE_TIMEOUT_MS", default_value_t = 5000)]
    pub store_timeout_ms: u64,
}

pub async fn run(args: ServeArgs) -> Result<()> {
    let db = paths::database(args.db)?;
    let sessions = paths::sessions(args.sessions)?;

    let store = SqliteStore::open(&db)
        .with_context(|| format!("Failed to open database {}", db.display()))?;

    if !sessions.exists() {
        warn!(path = %sessions.display(), "Session file not found; every request will be unauthorized");
    }
    let directory = FileSessionDirectory::new(&sessions);

    let config =
        LiveConfig::default().with_store_timeout(Duration::from_millis(args.store_timeout_ms));
    info!(db = %db.display(), sessions = %directory.path().display(), "Store ready");
    let service = PatchService::new(Arc::new(store), Arc::new(directory), config);

    let server = LiveServer::bind(args.listen.as_str(), service)
        .await
        .with_context(|| format!("Failed to listen on {}", args.listen))?;
    let addr = server.local_addr()?;

    eprintln!("{} ws://{}", "Listening on".dimmed(), addr);
    eprintln!("{}", "Press Ctrl+C to stop.".dimmed());

    server
        .run_until(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                warn!(error = %e, "Cannot listen for Ctrl+C");
                std::future::pending::<()>().await;
            }
        })
        .await?;

    Ok(())
}
