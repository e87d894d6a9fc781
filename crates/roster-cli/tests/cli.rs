//! CLI integration tests against a temporary database.

mod common;

use std::net::TcpListener;
use std::path::Path;
use std::process::{Child, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use tempfile::TempDir;

use common::{TOKEN, command, run_cli, run_cli_success, seed_student, write_sessions};

fn path_str(path: &Path) -> &str {
    path.to_str().unwrap()
}

#[test]
fn test_init_creates_tables() {
    let temp_dir = TempDir::new().unwrap();
    let db = temp_dir.path().join("nested").join("roster.db");

    let stdout = run_cli_success(&["init", "--db", path_str(&db)], temp_dir.path());

    assert!(db.exists());
    assert!(stdout.contains("students"));
    assert!(stdout.contains("packs"));

    let conn = rusqlite::Connection::open(&db).unwrap();
    let tables: i64 = conn
        .query_row(
            "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table'",
            [],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(tables, 5);
}

#[test]
fn test_init_uses_data_dir_by_default() {
    let temp_dir = TempDir::new().unwrap();

    run_cli_success(&["init"], temp_dir.path());

    let found = walk(temp_dir.path()).into_iter().any(|p| p.ends_with("roster.db"));
    assert!(found, "no roster.db under {}", temp_dir.path().display());
}

fn walk(dir: &Path) -> Vec<std::path::PathBuf> {
    let mut out = Vec::new();
    for entry in std::fs::read_dir(dir).unwrap().flatten() {
        let path = entry.path();
        if path.is_dir() {
            out.extend(walk(&path));
        } else {
            out.push(path);
        }
    }
    out
}

#[test]
fn test_get_record() {
    let temp_dir = TempDir::new().unwrap();
    let db = temp_dir.path().join("roster.db");
    run_cli_success(&["init", "--db", path_str(&db)], temp_dir.path());
    seed_student(&db, "s1", "Ann");

    let stdout = run_cli_success(
        &["get", "--db", path_str(&db), "students", "s1"],
        temp_dir.path(),
    );

    let record: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(record["id"], "s1");
    assert_eq!(record["name"], "Ann");
    assert!(record["surname"].is_null());
}

#[test]
fn test_get_failures() {
    let temp_dir = TempDir::new().unwrap();
    let db = temp_dir.path().join("roster.db");
    run_cli_success(&["init", "--db", path_str(&db)], temp_dir.path());

    let output = run_cli(&["get", "--db", path_str(&db), "ghosts", "s1"], temp_dir.path());
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("ghosts"));

    let output = run_cli(&["get", "--db", path_str(&db), "students", "s9"], temp_dir.path());
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("s9"));
}

/// Kills the server when the test ends, pass or fail.
struct Server(Child);

impl Drop for Server {
    fn drop(&mut self) {
        let _ = self.0.kill();
        let _ = self.0.wait();
    }
}

fn free_port() -> u16 {
    TcpListener::bind("127.0.0.1:0")
        .unwrap()
        .local_addr()
        .unwrap()
        .port()
}

#[test]
fn test_serve_and_patch() {
    let temp_dir = TempDir::new().unwrap();
    let home = temp_dir.path();
    let db = home.join("roster.db");
    let sessions = home.join("sessions.json");
    run_cli_success(&["init", "--db", path_str(&db)], home);
    seed_student(&db, "s1", "Ann");
    write_sessions(&sessions);

    let listen = format!("127.0.0.1:{}", free_port());
    let url = format!("ws://{}", listen);
    let _server = Server(
        command(
            &[
                "serve",
                "--listen",
                &listen,
                "--db",
                path_str(&db),
                "--sessions",
                path_str(&sessions),
            ],
            home,
        )
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .unwrap(),
    );

    let patch = |token: &str, extra: &[&str]| {
        let mut args = vec!["patch", "--url", url.as_str(), "--token", token, "students", "s1"];
        args.extend_from_slice(extra);
        run_cli(&args, home)
    };

    // Wait for the server to accept connections.
    let deadline = Instant::now() + Duration::from_secs(10);
    let output = loop {
        let output = patch(TOKEN, &["--set", "name=Anna", "--set", "shoeSize=42"]);
        let stderr = String::from_utf8_lossy(&output.stderr).to_string();
        if output.status.success() || !stderr.contains("Failed to connect") {
            break output;
        }
        assert!(Instant::now() < deadline, "server never came up: {}", stderr);
        thread::sleep(Duration::from_millis(100));
    };

    assert!(
        output.status.success(),
        "patch failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("\"recordFound\": true"));
    assert!(stdout.contains("\"applied\""));
    assert!(stdout.contains("\"rejected\""));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("name applied"));
    assert!(stderr.contains("shoeSize rejected: unknown column"));

    let stdout = run_cli_success(&["get", "--db", path_str(&db), "students", "s1"], home);
    let record: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(record["name"], "Anna");

    let output = patch("session_logged_out", &["--set", "name=Mallory"]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("Unauthorized"));
}
