//! Integration tests for Aquatrace

mod cli_tests {
    use assert_cmd::Command;
    use predicates::prelude::*;
    use tempfile::TempDir;

    /// Build a command isolated to its own state directory
    fn aquatrace(state: &TempDir) -> Command {
        let mut cmd = Command::cargo_bin("aquatrace").unwrap();
        cmd.env("AQUATRACE_STATE_DIR", state.path())
            .env("AQUATRACE_CONFIG", state.path().join("config.toml"))
            .arg("--no-local");
        cmd
    }

    #[test]
    fn help_displays() {
        let state = TempDir::new().unwrap();
        aquatrace(&state)
            .arg("--help")
            .assert()
            .success()
            .stdout(predicate::str::contains("Ledger-Backed Filter Lifecycle"));
    }

    #[test]
    fn version_displays() {
        let state = TempDir::new().unwrap();
        aquatrace(&state)
            .arg("--version")
            .assert()
            .success()
            .stdout(predicate::str::contains("aquatrace"));
    }

    #[test]
    fn config_show() {
        let state = TempDir::new().unwrap();
        aquatrace(&state)
            .args(["config", "show"])
            .assert()
            .success()
            .stdout(predicate::str::contains("[general]"))
            .stdout(predicate::str::contains("[ledger]"));
    }

    #[test]
    fn config_path() {
        let state = TempDir::new().unwrap();
        aquatrace(&state)
            .args(["config", "path"])
            .assert()
            .success()
            .stdout(predicate::str::contains("config.toml"));
    }

    #[test]
    fn register_rejects_malformed_ids() {
        let state = TempDir::new().unwrap();
        aquatrace(&state)
            .args(["register", "--batch", "not-a-batch", "--units", "b-2024-u-001"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("does not match"));
    }

    #[test]
    fn read_missing_unit_fails_with_hint() {
        let state = TempDir::new().unwrap();
        aquatrace(&state)
            .args(["read", "b-2024-u-404"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("not found"))
            .stderr(predicate::str::contains("Register the unit"));
    }

    #[test]
    fn recent_empty_cache() {
        let state = TempDir::new().unwrap();
        aquatrace(&state)
            .args(["recent"])
            .assert()
            .success()
            .stdout(predicate::str::contains("No events"));
    }

    #[test]
    fn full_lifecycle_via_cli() {
        let state = TempDir::new().unwrap();

        aquatrace(&state)
            .args([
                "register",
                "--batch",
                "batch-2024-001",
                "--units",
                "b-2024-u-001,b-2024-u-002",
            ])
            .assert()
            .success()
            .stdout(predicate::str::contains("Registered 2 unit(s)"));

        // duplicate registration conflicts
        aquatrace(&state)
            .args([
                "register",
                "--batch",
                "batch-2024-002",
                "--units",
                "b-2024-u-001",
            ])
            .assert()
            .failure()
            .stderr(predicate::str::contains("already exists"));

        // ship resolves units from the cache
        aquatrace(&state)
            .args(["ship", "--batch", "batch-2024-001", "--destination", "Nairobi"])
            .assert()
            .success()
            .stdout(predicate::str::contains("Shipped 2 unit(s)"));

        aquatrace(&state)
            .args(["receive", "--unit", "b-2024-u-001", "--warehouse", "WH-001"])
            .assert()
            .success()
            .stdout(predicate::str::contains("Received 1 unit(s)"));

        aquatrace(&state)
            .args([
                "verify",
                "--unit",
                "b-2024-u-001",
                "--site",
                "SITE-1",
                "--verifier",
                "agent-1",
            ])
            .assert()
            .success()
            .stdout(predicate::str::contains("Verified"));

        // replacement unit must exist first
        aquatrace(&state)
            .args([
                "replace",
                "--old-unit",
                "b-2024-u-001",
                "--new-unit",
                "b-2024-u-003",
                "--site",
                "SITE-1",
            ])
            .assert()
            .failure()
            .stderr(predicate::str::contains("not found"));

        aquatrace(&state)
            .args([
                "register",
                "--batch",
                "batch-2024-002",
                "--units",
                "b-2024-u-003",
            ])
            .assert()
            .success();

        aquatrace(&state)
            .args([
                "replace",
                "--old-unit",
                "b-2024-u-001",
                "--new-unit",
                "b-2024-u-003",
                "--site",
                "SITE-1",
            ])
            .assert()
            .success()
            .stdout(predicate::str::contains("Replaced"));

        // the old unit is terminal now
        aquatrace(&state)
            .args(["read", "b-2024-u-001"])
            .assert()
            .success()
            .stdout(predicate::str::contains("REPLACED"));

        aquatrace(&state)
            .args(["flag", "--unit", "b-2024-u-002", "--reason", "LOST"])
            .assert()
            .success()
            .stdout(predicate::str::contains("LOST"));

        // a second flag names the terminal state
        aquatrace(&state)
            .args(["flag", "--unit", "b-2024-u-002", "--reason", "DAMAGED"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("LOST_OR_DAMAGED"));

        aquatrace(&state)
            .args(["stats"])
            .assert()
            .success()
            .stdout(predicate::str::contains("units:  3"))
            .stdout(predicate::str::contains("replacement compliance: 50%"));

        aquatrace(&state)
            .args(["batch", "batch-2024-001"])
            .assert()
            .success()
            .stdout(predicate::str::contains("2 unit(s)"));

        aquatrace(&state)
            .args(["search", "b-2024-u-003"])
            .assert()
            .success()
            .stdout(predicate::str::contains("VERIFIED"));

        aquatrace(&state)
            .args(["events", "b-2024-u-001"])
            .assert()
            .success()
            .stdout(predicate::str::contains("REGISTERED"))
            .stdout(predicate::str::contains("REPLACED"));
    }

    #[test]
    fn ledger_state_survives_processes() {
        let state = TempDir::new().unwrap();

        aquatrace(&state)
            .args([
                "register",
                "--batch",
                "batch-2024-001",
                "--units",
                "b-2024-u-001",
            ])
            .assert()
            .success();

        // separate process invocation reads the persisted snapshot
        aquatrace(&state)
            .args(["read", "b-2024-u-001"])
            .assert()
            .success()
            .stdout(predicate::str::contains("REGISTERED"))
            .stdout(predicate::str::contains("batch-2024-001"));
    }
}
