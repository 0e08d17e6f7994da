//! CLI Integration Tests for wayfarer
//!
//! Runs the built binary for the non-interactive commands: help, version,
//! init and config.

use std::fs;
use std::process::{Command, Output, Stdio};
use tempfile::TempDir;

/// Run wayfarer with arguments, without colors and with an empty environment
/// for the secrets.
fn run_wayfarer(args: &[&str], working_dir: Option<&std::path::Path>) -> Output {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_wayfarer"));
    cmd.arg("--no-color")
        .args(args)
        .env_remove("WAYFARER_AI_API_KEY")
        .env_remove("WAYFARER_SUPABASE_URL")
        .env_remove("WAYFARER_SUPABASE_ANON_KEY")
        .stdin(Stdio::null());

    if let Some(dir) = working_dir {
        cmd.current_dir(dir);
    }

    cmd.output().expect("Failed to execute wayfarer")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

// =============================================================================
// Help and Version Tests
// =============================================================================

#[test]
fn test_help_command() {
    let output = run_wayfarer(&["--help"], None);

    assert!(output.status.success());
    let text = stdout(&output);
    assert!(text.contains("Wayfarer"));
    assert!(text.contains("Usage"));
    assert!(text.contains("init"));
    assert!(text.contains("config"));
    assert!(text.contains("run"));
    assert!(text.contains("--lang"));
}

#[test]
fn test_version_command() {
    let output = run_wayfarer(&["--version"], None);

    assert!(output.status.success());
    assert!(stdout(&output).contains("wayfarer"));
}

#[test]
fn test_unknown_language_fails() {
    let output = run_wayfarer(&["--lang", "fr", "config"], None);
    assert!(!output.status.success());
}

// =============================================================================
// Init Command Tests
// =============================================================================

#[test]
fn test_init_writes_config_and_env_template() {
    let dir = TempDir::new().unwrap();
    let output = run_wayfarer(&["init"], Some(dir.path()));

    assert!(output.status.success(), "init failed: {:?}", output);
    let config = fs::read_to_string(dir.path().join("wayfarer.toml")).unwrap();
    assert!(config.contains("[ai]"));
    assert!(config.contains("[persistence]"));
    assert!(config.contains("saved_itineraries"));

    let env = fs::read_to_string(dir.path().join(".env.example")).unwrap();
    assert!(env.contains("WAYFARER_SUPABASE_URL="));
    assert!(env.contains("WAYFARER_SUPABASE_ANON_KEY="));
}

#[test]
fn test_init_twice_without_force_fails() {
    let dir = TempDir::new().unwrap();
    assert!(run_wayfarer(&["init"], Some(dir.path())).status.success());

    let second = run_wayfarer(&["init"], Some(dir.path()));
    assert!(!second.status.success());

    let forced = run_wayfarer(&["init", "--force"], Some(dir.path()));
    assert!(forced.status.success());
}

#[test]
fn test_init_with_ollama() {
    let dir = TempDir::new().unwrap();
    let target = dir.path().join("trip");
    let output = run_wayfarer(&["init", target.to_str().unwrap(), "--ollama"], None);

    assert!(output.status.success());
    let config = fs::read_to_string(target.join("wayfarer.toml")).unwrap();
    assert!(config.contains("ollama"));
    assert!(config.contains("localhost:11434"));
}

// =============================================================================
// Config Command Tests
// =============================================================================

#[test]
fn test_config_prints_loaded_configuration() {
    let dir = TempDir::new().unwrap();
    run_wayfarer(&["init"], Some(dir.path()));

    let output = run_wayfarer(&["config"], Some(dir.path()));
    assert!(output.status.success());
    let text = stdout(&output);
    assert!(text.contains("doubao-pro-32k"));
    assert!(text.contains("is valid"));
}

#[test]
fn test_config_validate_warns_about_missing_secrets() {
    let dir = TempDir::new().unwrap();
    run_wayfarer(&["init"], Some(dir.path()));

    let output = run_wayfarer(&["config", "--validate"], Some(dir.path()));
    assert!(output.status.success());
    let text = stdout(&output);
    assert!(text.contains("WAYFARER_AI_API_KEY"));
    assert!(!text.contains("[ai]"));
}

#[test]
fn test_config_without_file_fails() {
    let dir = TempDir::new().unwrap();
    let output = run_wayfarer(&["config"], Some(dir.path()));
    assert!(!output.status.success());
}

#[test]
fn test_config_rejects_invalid_values() {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join("wayfarer.toml"),
        "[ai]\nmax_search_results = 0\n",
    )
    .unwrap();
    let output = run_wayfarer(&["config", "--validate"], Some(dir.path()));
    assert!(!output.status.success());
}
