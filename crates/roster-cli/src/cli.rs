//! CLI argument definitions.

use clap::{Parser, Subcommand};

use crate::commands::{get::GetArgs, init::InitArgs, patch::PatchArgs, serve::ServeArgs};

/// Live record-patch channel for the roster scheduling backend.
#[derive(Parser, Debug)]
#[command(name = "roster")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Output logs as JSON
    #[arg(long, global = true)]
    pub json_logs: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the live channel server
    Serve(ServeArgs),

    /// Create the database and its tables
    Init(InitArgs),

    /// Print one record
    Get(GetArgs),

    /// Send a patch to a running server
    Patch(PatchArgs),
}
