//! Integration tests for the isobridge binary.
//!
//! Runs the built executable against the JSON fixtures and checks exit
//! status, console output and the generated tree.

#![allow(non_snake_case)]

use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;

fn fixture(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures").join(name)
}

/// Run the binary inside `dir` so no stray isobridge.toml is picked up
fn isobridge(dir: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_isobridge"))
        .current_dir(dir)
        .env_remove("RUST_LOG")
        .args(args)
        .output()
        .unwrap()
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

// =============================================================================
// Generate Command Tests
// =============================================================================

mod generate {
    use super::*;

    #[test]
    fn generate___valid_round___exits_zero_and_writes_tree() {
        let dir = TempDir::new().unwrap();
        let input = fixture("calculator.json");

        let output = isobridge(
            dir.path(),
            &["generate", "-i", input.to_str().unwrap(), "-o", "out"],
        );

        assert!(output.status.success(), "{}", stderr(&output));
        assert!(stdout(&output).contains("Generated 5 file(s) for 4 element(s)"));
        let bridge = fs::read_to_string(dir.path().join("out/com/acme/CalculatorBridgeGen.java")).unwrap();
        assert!(bridge.starts_with("package com.acme;"));
        assert!(dir.path().join("out/META-INF/isobridge/com.acme.WorkerFactory").is_file());
    }

    #[test]
    fn generate___config_in_working_directory___applied() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("isobridge.toml"),
            "[generator]\noutput = \"gen\"\nheader = \"Generated, do not edit.\"\n",
        )
        .unwrap();
        let input = fixture("calculator.json");

        let output = isobridge(dir.path(), &["generate", "-i", input.to_str().unwrap()]);

        assert!(output.status.success(), "{}", stderr(&output));
        let factory = fs::read_to_string(dir.path().join("gen/com/acme/CalculatorFactoryGen.java")).unwrap();
        assert!(factory.starts_with("// Generated, do not edit.\n"));
    }

    #[test]
    fn generate___invalid_round___exits_nonzero_with_diagnostic() {
        let dir = TempDir::new().unwrap();
        let input = fixture("invalid.json");

        let output = isobridge(
            dir.path(),
            &["generate", "-i", input.to_str().unwrap(), "-o", "out"],
        );

        assert!(!output.status.success());
        let stderr = stderr(&output);
        assert!(stderr.contains("error: com.acme.CalculatorBridge"));
        assert!(stderr.contains("must implement `ForeignObject`"));
        assert!(dir.path().join("out/com/acme/CalculatorFactoryGen.java").is_file());
    }

    #[test]
    fn generate___unknown_log_level___exits_nonzero() {
        let dir = TempDir::new().unwrap();
        let input = fixture("calculator.json");

        let output = isobridge(
            dir.path(),
            &["--log-level", "loud", "generate", "-i", input.to_str().unwrap()],
        );

        assert!(!output.status.success());
        assert!(stderr(&output).contains("--log-level"));
    }

    #[test]
    fn generate___twice___identical_tree() {
        let dir = TempDir::new().unwrap();
        let input = fixture("calculator.json");
        let input = input.to_str().unwrap();

        isobridge(dir.path(), &["generate", "-i", input, "-o", "first"]);
        isobridge(dir.path(), &["generate", "-i", input, "-o", "second"]);

        for path in [
            "com/acme/CalculatorBridgeGen.java",
            "com/acme/CalculatorFactoryGen.java",
            "com/acme/WorkerBridgeGen.java",
            "com/acme/WorkerFactoryGen.java",
            "META-INF/isobridge/com.acme.WorkerFactory",
        ] {
            let first = fs::read(dir.path().join("first").join(path)).unwrap();
            let second = fs::read(dir.path().join("second").join(path)).unwrap();
            assert_eq!(first, second, "{path}");
        }
    }
}

// =============================================================================
// Check Command Tests
// =============================================================================

mod check {
    use super::*;

    #[test]
    fn check___valid_round___summarizes_without_writing() {
        let dir = TempDir::new().unwrap();
        let input = fixture("calculator.json");

        let output = isobridge(dir.path(), &["check", "-i", input.to_str().unwrap()]);

        assert!(output.status.success(), "{}", stderr(&output));
        assert!(stdout(&output).contains("Checked 4 element(s): 0 failed, 0 error(s)"));
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn check___json___prints_report() {
        let dir = TempDir::new().unwrap();
        let input = fixture("invalid.json");

        let output = isobridge(dir.path(), &["check", "-i", input.to_str().unwrap(), "--json"]);

        assert!(!output.status.success());
        let report: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
        assert_eq!(report["errors"], 1);
        assert_eq!(report["failed"][0], "com.acme.CalculatorBridge");
    }

    #[test]
    fn check___missing_input___exits_nonzero() {
        let dir = TempDir::new().unwrap();

        let output = isobridge(dir.path(), &["check", "-i", "absent.json"]);

        assert!(!output.status.success());
        assert!(stderr(&output).contains("absent.json"));
    }
}
