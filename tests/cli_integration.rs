//! End-to-end tests for the office-ticket binary

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;
use std::path::Path;
use tempfile::TempDir;

/// A throwaway installation: settings file, database and uploads in one directory
struct Workspace {
    dir: TempDir,
}

impl Workspace {
    fn new() -> Self {
        let dir = TempDir::new().unwrap();
        let config = format!(
            "[database]\npath = '{}'\n\n[uploads]\ndir = '{}'\n\n[notifications]\nenabled = false\n",
            dir.path().join("tickets.db").display(),
            dir.path().join("uploads").display(),
        );
        std::fs::write(dir.path().join("config.toml"), config).unwrap();
        Self { dir }
    }

    fn path(&self) -> &Path {
        self.dir.path()
    }

    #[allow(deprecated)]
    fn cmd(&self) -> Command {
        let mut cmd = Command::cargo_bin("office-ticket").unwrap();
        cmd.env_remove("OFFICE_TICKET_TOKEN")
            .env_remove("RUST_LOG")
            .env("NO_COLOR", "1")
            .arg("--config")
            .arg(self.path().join("config.toml"));
        cmd
    }

    fn init(&self) {
        self.cmd().arg("init").assert().success();
    }

    fn json(&self, args: &[&str]) -> Value {
        let output = self.cmd().arg("--json").args(args).output().unwrap();
        assert!(
            output.status.success(),
            "command {args:?} failed: {}",
            String::from_utf8_lossy(&output.stderr)
        );
        serde_json::from_slice(&output.stdout).unwrap()
    }

    fn login(&self, email: &str, password: &str) -> String {
        let login = self.json(&["login", "--email", email, "--password", password]);
        login["token"].as_str().unwrap().to_string()
    }

    fn file_ticket(&self, email: &str, department: &str) -> String {
        let created = self.json(&[
            "new",
            "--name",
            "Dana Reyes",
            "--email",
            email,
            "--department",
            department,
            "--location",
            "HQ",
            "--category",
            "Printer",
            "--description",
            "Printer shows offline",
        ]);
        created["ticket_no"].as_str().unwrap().to_string()
    }
}

#[test]
#[allow(deprecated)]
fn test_help_lists_commands() {
    let mut cmd = Command::cargo_bin("office-ticket").unwrap();
    cmd.arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("freeze"))
        .stdout(predicate::str::contains("export"));
}

#[test]
fn test_init_seeds_default_accounts_once() {
    let workspace = Workspace::new();

    workspace
        .cmd()
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("Initialized database"))
        .stdout(predicate::str::contains("admin@office.com"));
    assert!(workspace.path().join("tickets.db").exists());
    assert!(workspace.path().join("uploads").is_dir());

    workspace
        .cmd()
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("Default accounts already exist"));
}

#[test]
fn test_anonymous_ticket_is_numbered_and_viewable() {
    let workspace = Workspace::new();
    workspace.init();

    let first = workspace.file_ticket("dana@office.com", "Accounts");
    let second = workspace.file_ticket("dana@office.com", "Accounts");
    assert!(predicate::str::is_match(r"^OFF-\d{4}-0001$").unwrap().eval(&first));
    assert!(second.ends_with("-0002"));

    workspace
        .cmd()
        .args(["show", &first])
        .assert()
        .success()
        .stdout(predicate::str::contains("Ticket created"))
        .stdout(predicate::str::contains("Printer shows offline"));
}

#[test]
fn test_missing_field_is_reported() {
    let workspace = Workspace::new();
    workspace.init();

    workspace
        .cmd()
        .args(["new", "--name", "Dana Reyes", "--email", "dana@office.com"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Missing required field: department"));
}

#[test]
fn test_list_requires_login() {
    let workspace = Workspace::new();
    workspace.init();

    workspace
        .cmd()
        .arg("list")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Authentication required"))
        .stderr(predicate::str::contains("office-ticket login"));
}

#[test]
fn test_bad_password_is_rejected() {
    let workspace = Workspace::new();
    workspace.init();

    workspace
        .cmd()
        .args(["login", "--email", "admin@office.com", "--password", "nope"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid credentials"));
}

#[test]
fn test_admin_resolves_and_exports() {
    let workspace = Workspace::new();
    workspace.init();
    let ticket_no = workspace.file_ticket("dana@office.com", "Accounts");
    let token = workspace.login("admin@office.com", "admin123");

    workspace
        .cmd()
        .args(["--token", &token, "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains(ticket_no.as_str()));

    let updated = workspace.json(&[
        "--token",
        &token,
        "status",
        &ticket_no,
        "Resolved",
        "--comment",
        "Replaced toner",
    ]);
    assert_eq!(updated["ticket"]["status"], "Resolved");
    assert!(updated["ticket"]["resolved_at"].is_string());

    // Resolved moments ago, so still inside the reopen window.
    let sweep = workspace.json(&["--token", &token, "freeze"]);
    assert_eq!(sweep["frozen"], 0);

    let export_path = workspace.path().join("tickets.csv");
    workspace
        .cmd()
        .args(["--token", &token, "export", "--format", "csv", "--output"])
        .arg(&export_path)
        .assert()
        .success();
    let csv = std::fs::read_to_string(&export_path).unwrap();
    assert!(csv.starts_with("ticket_no,employee_name,"));
    assert!(csv.contains(&format!("{ticket_no},Dana Reyes")));
    assert!(csv.contains(",Resolved,"));
}

#[test]
fn test_token_from_environment() {
    let workspace = Workspace::new();
    workspace.init();
    let token = workspace.login("admin@office.com", "admin123");

    let stats: Value = {
        let output = workspace
            .cmd()
            .env("OFFICE_TICKET_TOKEN", &token)
            .args(["--json", "stats"])
            .output()
            .unwrap();
        assert!(output.status.success());
        serde_json::from_slice(&output.stdout).unwrap()
    };
    assert_eq!(stats["total"], 0);
    assert!(stats["department"].is_null());
}

#[test]
fn test_roles_are_enforced() {
    let workspace = Workspace::new();
    workspace.init();
    let admin = workspace.login("admin@office.com", "admin123");

    workspace
        .cmd()
        .args([
            "--token",
            &admin,
            "user",
            "add",
            "--name",
            "Sam Lee",
            "--email",
            "sam@office.com",
            "--password",
            "secret",
            "--department",
            "Accounts",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Created employee account"));

    let own = workspace.file_ticket("sam@office.com", "Accounts");
    let other = workspace.file_ticket("dana@office.com", "Accounts");
    let sam = workspace.login("sam@office.com", "secret");

    let mine = workspace.json(&["--token", &sam, "list"]);
    let numbers: Vec<&str> = mine
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["ticket_no"].as_str().unwrap())
        .collect();
    assert_eq!(numbers, vec![own.as_str()]);

    workspace
        .cmd()
        .args(["--token", &sam, "status", &own, "Closed"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Permission denied"));

    workspace
        .cmd()
        .args(["--token", &sam, "comment", &other, "Mine too"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Permission denied"));

    workspace
        .cmd()
        .args(["--token", &sam, "comment", &own, "Still offline"])
        .assert()
        .success();

    let manager = workspace.login("manager@office.com", "manager123");
    workspace
        .cmd()
        .args(["--token", &manager, "assign", &own, "alex@office.com"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Permission denied"));
}

#[test]
fn test_reopen_after_resolution() {
    let workspace = Workspace::new();
    workspace.init();
    let ticket_no = workspace.file_ticket("dana@office.com", "Accounts");
    let token = workspace.login("admin@office.com", "admin123");

    workspace
        .cmd()
        .args(["--token", &token, "status", &ticket_no, "Open"])
        .assert()
        .success();

    // Only resolved tickets can be reopened.
    workspace
        .cmd()
        .args(["--token", &token, "status", &ticket_no, "Reopened"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("cannot be reopened"));

    workspace
        .cmd()
        .args(["--token", &token, "status", &ticket_no, "Resolved"])
        .assert()
        .success();
    let reopened = workspace.json(&["--token", &token, "status", &ticket_no, "reopened"]);
    assert_eq!(reopened["ticket"]["status"], "Reopened");
    assert!(reopened["ticket"]["resolved_at"].is_null());
}
