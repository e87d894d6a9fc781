#![allow(dead_code)]

use std::path::Path;
use std::process::{Command, Output};

/// Token written by [`write_sessions`].
pub const TOKEN: &str = "tok-front-desk";

/// Run the CLI binary with arguments, isolated from the user's environment.
pub fn run_cli(args: &[&str], home: &Path) -> Output {
    command(args, home).output().expect("Failed to execute CLI")
}

/// Run the CLI and expect success.
pub fn run_cli_success(args: &[&str], home: &Path) -> String {
    let output = run_cli(args, home);
    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        panic!("CLI command failed: {:?}\nstderr: {}", args, stderr);
    }
    String::from_utf8_lossy(&output.stdout).to_string()
}

/// Build a CLI command without running it.
pub fn command(args: &[&str], home: &Path) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_roster"));
    cmd.args(args);
    cmd.env("HOME", home);
    cmd.env("XDG_DATA_HOME", home.join("data"));
    for var in [
        "ROSTER_LISTEN",
        "ROSTER_DB",
        "ROSTER_SESSIONS",
        "ROSTER_STORE_TIMEOUT_MS",
        "ROSTER_URL",
        "ROSTER_TOKEN",
        "RUST_LOG",
    ] {
        cmd.env_remove(var);
    }
    cmd
}

/// Insert a student row directly, bypassing the CLI.
pub fn seed_student(db: &Path, id: &str, name: &str) {
    let conn = rusqlite::Connection::open(db).unwrap();
    conn.execute(
        "INSERT INTO students (id, name) VALUES (?1, ?2)",
        rusqlite::params![id, name],
    )
    .unwrap();
}

/// Write a login users file where [`TOKEN`] is an active session.
pub fn write_sessions(path: &Path) {
    let body = serde_json::json!([
        {
            "username": "front-desk",
            "secureCode": "a1b2c3",
            "activeSessions": [TOKEN]
        },
        { "username": "old", "secureCode": "d4e5f6", "activeSessions": [] }
    ]);
    std::fs::write(path, body.to_string()).unwrap();
}
