//! Integration tests for the `aab` binary
//!
//! These tests run the built CLI end-to-end against books in temporary
//! directories. A config file with the cheapest key derivation cost keeps
//! encrypted saves fast.

#![allow(clippy::uninlined_format_args)]

use std::path::PathBuf;
use std::process::{Command, Output, Stdio};

use tempfile::TempDir;

const PASSWORD: &str = "Str0ngPass!";

/// Temporary config directory plus a book path inside it
struct Workspace {
    dir: TempDir,
}

impl Workspace {
    fn new() -> Self {
        let dir = TempDir::new().unwrap();
        let config = dir.path().join("config");
        std::fs::create_dir_all(&config).unwrap();
        std::fs::write(
            config.join("config.toml"),
            "[security.kdf]\nmemory_kib = 1024\niterations = 1\nparallelism = 1\n",
        )
        .unwrap();
        Self { dir }
    }

    fn book(&self) -> PathBuf {
        self.dir.path().join("office.aab")
    }

    fn book_str(&self) -> String {
        self.book().display().to_string()
    }

    /// Runs the CLI with the workspace config and the given password
    fn run(&self, args: &[&str], password: Option<&str>) -> Output {
        let mut cmd = Command::new(env!("CARGO_BIN_EXE_aab"));
        cmd.env("AAB_CONFIG_DIR", self.dir.path().join("config"))
            .env_remove("AAB_PASSWORD")
            .env_remove("AAB_NEW_PASSWORD")
            .env_remove("AAB_COMPUTER_PASSWORD")
            .env_remove("AAB_ROUTER_PASSWORD")
            .stdin(Stdio::null());
        if let Some(password) = password {
            cmd.env("AAB_PASSWORD", password);
        }
        cmd.args(args).output().expect("Failed to execute CLI")
    }

    /// Creates an encrypted book with "Office/PC1"
    fn office_book(&self) {
        let book = self.book_str();
        assert_success(&self.run(&["new", &book, "--name", "Work"], Some(PASSWORD)));
        assert_success(&self.run(&["group", "add", &book, "Office"], Some(PASSWORD)));
        assert_success(&self.run(
            &[
                "computer",
                "add",
                &book,
                "PC1",
                "--group",
                "Office",
                "--address",
                "192.168.1.5",
                "--user",
                "admin",
            ],
            Some(PASSWORD),
        ));
    }
}

/// Helper to get stdout as string
fn stdout_str(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).to_string()
}

/// Helper to get stderr as string
fn stderr_str(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).to_string()
}

fn assert_success(output: &Output) {
    assert!(
        output.status.success(),
        "command failed: {}",
        stderr_str(output)
    );
}

fn read_json(output: &Output) -> serde_json::Value {
    assert_success(output);
    serde_json::from_slice(&output.stdout).expect("stdout should be JSON")
}

// ============================================================================
// Help
// ============================================================================

#[test]
fn test_help_command() {
    let output = Command::new(env!("CARGO_BIN_EXE_aab"))
        .arg("--help")
        .output()
        .unwrap();
    assert!(output.status.success(), "Help command should succeed");

    let stdout = stdout_str(&output);
    for command in [
        "new", "info", "tree", "group", "computer", "resolve", "encrypt", "router", "config",
    ] {
        assert!(stdout.contains(command), "Help should mention {command}");
    }
}

// ============================================================================
// Book lifecycle
// ============================================================================

#[test]
fn test_office_scenario() {
    let ws = Workspace::new();
    ws.office_book();
    let book = ws.book_str();

    let contents = std::fs::read(ws.book()).unwrap();
    assert!(contents.starts_with(b"AABK"));
    assert!(!contents.windows(11).any(|w| w == b"192.168.1.5"));

    let tree = ws.run(&["tree", &book], Some(PASSWORD));
    assert_success(&tree);
    assert_eq!(
        stdout_str(&tree),
        "Work\n  Office/\n    PC1  [192.168.1.5]\n"
    );

    let info = read_json(&ws.run(&["info", &book, "--format", "json"], Some(PASSWORD)));
    assert_eq!(info["name"], "Work");
    assert_eq!(info["encryption"], "chacha20_poly1305");
    assert_eq!(info["groups"], 1);
    assert_eq!(info["computers"], 1);
    assert_eq!(info["kdf"]["memory_kib"], 1024);

    let show = read_json(&ws.run(
        &["computer", "show", &book, "Office/PC1", "--format", "json"],
        Some(PASSWORD),
    ));
    assert_eq!(show["address"], "192.168.1.5");
    assert_eq!(show["username"], "admin");
    assert_eq!(show["path"], "Office/PC1");
}

#[test]
fn test_wrong_password_exit_code() {
    let ws = Workspace::new();
    ws.office_book();

    let output = ws.run(&["tree", &ws.book_str()], Some("wrong-password"));
    assert_eq!(output.status.code(), Some(2));
    assert!(stderr_str(&output).contains("Unable to decrypt"));
}

#[test]
fn test_corrupted_file_exit_code() {
    let ws = Workspace::new();
    std::fs::write(ws.book(), b"definitely not an address book").unwrap();

    let output = ws.run(&["info", &ws.book_str()], None);
    assert_eq!(output.status.code(), Some(3));
}

#[test]
fn test_tampered_file_is_authentication_failure() {
    let ws = Workspace::new();
    ws.office_book();

    let mut bytes = std::fs::read(ws.book()).unwrap();
    let last = bytes.len() - 1;
    bytes[last] ^= 0x01;
    std::fs::write(ws.book(), &bytes).unwrap();

    let output = ws.run(&["tree", &ws.book_str()], Some(PASSWORD));
    assert_eq!(output.status.code(), Some(2));
}

#[test]
fn test_new_refuses_overwrite() {
    let ws = Workspace::new();
    let book = ws.book_str();
    assert_success(&ws.run(&["new", &book, "--encryption", "none"], None));

    let output = ws.run(&["new", &book, "--encryption", "none"], None);
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr_str(&output).contains("already exists"));

    assert_success(&ws.run(&["new", &book, "--encryption", "none", "--force"], None));
}

#[test]
fn test_new_rejects_empty_name() {
    let ws = Workspace::new();
    let output = ws.run(&["new", &ws.book_str(), "-e", "none", "--name", ""], None);
    assert_eq!(output.status.code(), Some(1));
    assert!(!ws.book().exists());
}

#[test]
fn test_plain_book_needs_no_password() {
    let ws = Workspace::new();
    let book = ws.book_str();
    assert_success(&ws.run(&["new", &book, "-e", "none", "--name", "Plain"], None));
    assert_success(&ws.run(&["group", "add", &book, "Lab"], None));

    let contents = std::fs::read(ws.book()).unwrap();
    assert!(contents.windows(3).any(|w| w == b"Lab"));

    let info = read_json(&ws.run(&["info", &book, "-f", "json"], None));
    assert_eq!(info["encryption"], "none");
    assert!(info["kdf"].is_null());
}

#[test]
fn test_encrypt_and_decrypt() {
    let ws = Workspace::new();
    ws.office_book();
    let book = ws.book_str();

    assert_success(&ws.run(&["encrypt", &book, "-e", "none"], Some(PASSWORD)));
    let info = read_json(&ws.run(&["info", &book, "-f", "json"], None));
    assert_eq!(info["encryption"], "none");

    assert_success(&ws.run(
        &["encrypt", &book, "--new-password", "An0therPass!"],
        None,
    ));
    assert_eq!(ws.run(&["info", &book], Some(PASSWORD)).status.code(), Some(2));
    assert_success(&ws.run(&["info", &book], Some("An0therPass!")));
}

// ============================================================================
// Groups and computers
// ============================================================================

#[test]
fn test_delete_group_requires_confirmation() {
    let ws = Workspace::new();
    ws.office_book();
    let book = ws.book_str();
    let before = std::fs::read(ws.book()).unwrap();

    let output = ws.run(&["group", "delete", &book, "Office"], Some(PASSWORD));
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr_str(&output).contains("1 computer(s)"));
    assert_eq!(std::fs::read(ws.book()).unwrap(), before);

    let output = ws.run(&["--yes", "group", "delete", &book, "Office"], Some(PASSWORD));
    assert_success(&output);
    let info = read_json(&ws.run(&["info", &book, "-f", "json"], Some(PASSWORD)));
    assert_eq!(info["groups"], 0);
    assert_eq!(info["computers"], 0);
}

#[test]
fn test_root_group_cannot_be_deleted() {
    let ws = Workspace::new();
    ws.office_book();

    let output = ws.run(&["-y", "group", "delete", &ws.book_str(), "/"], Some(PASSWORD));
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr_str(&output).contains("root group"));
}

#[test]
fn test_group_move_rejects_cycle() {
    let ws = Workspace::new();
    ws.office_book();
    let book = ws.book_str();
    assert_success(&ws.run(
        &["group", "add", &book, "Servers", "--parent", "Office"],
        Some(PASSWORD),
    ));

    let output = ws.run(&["group", "move", &book, "Office", "Office/Servers"], Some(PASSWORD));
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr_str(&output).contains("cycle"));
}

#[test]
fn test_computer_copy_move_update() {
    let ws = Workspace::new();
    ws.office_book();
    let book = ws.book_str();

    assert_success(&ws.run(&["computer", "copy", &book, "Office/PC1"], Some(PASSWORD)));
    assert_success(&ws.run(&["computer", "move", &book, "Office/PC1 (copy)", "/"], Some(PASSWORD)));
    assert_success(&ws.run(
        &[
            "computer",
            "update",
            &book,
            "PC1 (copy)",
            "--name",
            "PC2",
            "--address",
            "192.168.1.6",
            "--session",
            "view",
        ],
        Some(PASSWORD),
    ));

    let show = read_json(&ws.run(
        &["computer", "show", &book, "PC2", "-f", "json"],
        Some(PASSWORD),
    ));
    assert_eq!(show["address"], "192.168.1.6");
    assert_eq!(show["session_type"], "desktop_view");
    assert_eq!(show["username"], "admin");
}

#[test]
fn test_invalid_user_name_rejected() {
    let ws = Workspace::new();
    ws.office_book();

    let output = ws.run(
        &["computer", "update", &ws.book_str(), "Office/PC1", "--user", "bad user"],
        Some(PASSWORD),
    );
    assert_eq!(output.status.code(), Some(1));
}

// ============================================================================
// Resolver and router
// ============================================================================

#[test]
fn test_resolve_through_book_router() {
    let ws = Workspace::new();
    ws.office_book();
    let book = ws.book_str();
    assert_success(&ws.run(
        &["computer", "add", &book, "Remote", "--address", "123456789"],
        Some(PASSWORD),
    ));

    let output = ws.run(&["resolve", &book, "Remote"], Some(PASSWORD));
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr_str(&output).contains("router is not configured"));

    assert_success(&ws.run(
        &[
            "router",
            "set",
            &book,
            "--address",
            "router.corp",
            "--user",
            "operator",
            "--router-password",
            "routerpw",
        ],
        Some(PASSWORD),
    ));

    let resolved = read_json(&ws.run(&["resolve", &book, "Remote", "-f", "json"], Some(PASSWORD)));
    assert_eq!(resolved["connection"], "router");
    assert_eq!(resolved["host_id"], "123456789");
    assert_eq!(resolved["router"]["address"], "router.corp");

    let direct = read_json(&ws.run(
        &["resolve", &book, "Office/PC1", "-f", "json"],
        Some(PASSWORD),
    ));
    assert_eq!(direct["connection"], "direct");
    assert_eq!(direct["address"], "192.168.1.5");

    let table = ws.run(&["router", "show", &book], Some(PASSWORD));
    assert_success(&table);
    assert!(!stdout_str(&table).contains("routerpw"));
}

// ============================================================================
// Settings
// ============================================================================

#[test]
fn test_config_set_and_show() {
    let ws = Workspace::new();

    assert_success(&ws.run(&["config", "set", "kdf-memory", "2048"], None));
    assert_success(&ws.run(&["config", "set", "default-encryption", "none"], None));

    let shown = read_json(&ws.run(&["config", "show", "-f", "json"], None));
    assert_eq!(shown["settings"]["security"]["kdf"]["memory_kib"], 2048);
    assert_eq!(shown["settings"]["security"]["kdf"]["iterations"], 1);
    assert_eq!(shown["settings"]["security"]["default_encryption"], "none");

    // New books pick up the configured default encryption
    assert_success(&ws.run(&["new", &ws.book_str()], None));
    let info = read_json(&ws.run(&["info", &ws.book_str(), "-f", "json"], None));
    assert_eq!(info["encryption"], "none");
}

#[test]
fn test_config_set_rejects_out_of_bounds_value() {
    let ws = Workspace::new();
    let settings = ws.dir.path().join("config").join("config.toml");
    let before = std::fs::read(&settings).unwrap();

    let output = ws.run(&["config", "set", "kdf-iterations", "0"], None);
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr_str(&output).contains("security.kdf"));
    assert_eq!(std::fs::read(&settings).unwrap(), before);
}

#[test]
fn test_config_reset() {
    let ws = Workspace::new();
    assert_success(&ws.run(&["config", "reset"], None));

    let shown = read_json(&ws.run(&["config", "show", "-f", "json"], None));
    assert_eq!(shown["settings"]["security"]["kdf"]["memory_kib"], 65536);
    assert_eq!(
        shown["settings"]["security"]["default_encryption"],
        "chacha20_poly1305"
    );
}
