//! Subcommand implementations.

pub mod get;
pub mod init;
pub mod patch;
pub mod serve;
