use std::path::PathBuf;

use assert_cmd::Command;
use assert_fs::prelude::*;
use predicates::prelude::*;
use serde_json::Value;

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

fn formflow(config_dir: &assert_fs::TempDir) -> Command {
    let config = config_dir.child("formflow.toml");
    if !config.path().exists() {
        config.write_str("log_level = \"error\"\n").expect("config");
    }
    let mut cmd = Command::cargo_bin("formflow").expect("binary");
    cmd.arg("--config").arg(config.path());
    cmd
}

#[test]
fn forms_lists_built_in_forms() {
    let temp = assert_fs::TempDir::new().expect("tempdir");
    formflow(&temp)
        .arg("forms")
        .assert()
        .success()
        .stdout(predicate::str::contains("checkout"))
        .stdout(predicate::str::contains("loan"));
}

#[test]
fn schema_prints_definition_and_json_schema() {
    let temp = assert_fs::TempDir::new().expect("tempdir");
    let output = formflow(&temp)
        .args(["schema", "checkout"])
        .output()
        .expect("run");
    assert!(output.status.success());
    let spec: Value = serde_json::from_slice(&output.stdout).expect("json");
    assert_eq!(spec["id"], "checkout");
    assert_eq!(spec["steps"].as_array().map(Vec::len), Some(5));

    formflow(&temp)
        .args(["schema", "--json-schema"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"FormSpec\""));

    formflow(&temp)
        .args(["schema", "survey"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown form 'survey'"));
}

#[test]
fn validate_reports_each_error() {
    let temp = assert_fs::TempDir::new().expect("tempdir");
    formflow(&temp)
        .args(["validate", "checkout", "--answers"])
        .arg(fixture("checkout.answers.json"))
        .assert()
        .success()
        .stdout(predicate::str::contains("valid"));

    formflow(&temp)
        .args(["validate", "checkout", "--step", "3", "--answers"])
        .arg(fixture("checkout-bad-zip.answers.json"))
        .assert()
        .failure()
        .stdout(predicate::str::contains("zip: Please enter a number ZIP code"))
        .stderr(predicate::str::contains("1 validation error(s)"));
}

#[test]
fn validate_emits_json_reports() {
    let temp = assert_fs::TempDir::new().expect("tempdir");
    let answers = temp.child("answers.json");
    answers
        .write_str(r#"{ "method": "card" }"#)
        .expect("answers");

    let output = formflow(&temp)
        .args(["--format", "json", "validate", "checkout", "--step", "4", "--answers"])
        .arg(answers.path())
        .output()
        .expect("run");
    assert!(!output.status.success());
    let report: Value = serde_json::from_slice(&output.stdout).expect("json");
    assert_eq!(report["valid"], false);
    assert_eq!(report["errors"][0]["path"], "cvc");
    assert_eq!(report["errors"][0]["kind"], "cross_field");
}

#[test]
fn run_submits_checkout_to_file() {
    let temp = assert_fs::TempDir::new().expect("tempdir");
    let out = temp.child("out/checkout.json");

    formflow(&temp)
        .args(["run", "checkout", "--answers"])
        .arg(fixture("checkout.answers.json"))
        .arg("--out")
        .arg(out.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("submitted"))
        .stdout(predicate::str::contains("Card Payment"));

    out.assert(predicate::path::exists());
    let written: Value =
        serde_json::from_str(&std::fs::read_to_string(out.path()).expect("read")).expect("json");
    assert_eq!(written["form"], "checkout");
    assert_eq!(written["record"]["cardNumber"], "4242 4242 4242 4242");
    assert_eq!(written["record"]["expiry"], "12 / 30");
    assert_eq!(written["record"]["phone"], "+256772123456");
}

#[test]
fn run_stops_at_blocked_step() {
    let temp = assert_fs::TempDir::new().expect("tempdir");
    let out = temp.child("never.json");

    formflow(&temp)
        .args(["run", "checkout", "--answers"])
        .arg(fixture("checkout-bad-zip.answers.json"))
        .arg("--out")
        .arg(out.path())
        .assert()
        .failure()
        .stdout(predicate::str::contains("blocked at step 3 (shipping)"))
        .stderr(predicate::str::contains("blocked at step 3"));
    out.assert(predicate::path::missing());
}

#[test]
fn run_submits_loan_with_configured_country() {
    let temp = assert_fs::TempDir::new().expect("tempdir");
    temp.child("formflow.toml")
        .write_str("default_country = \"KE\"\nlog_level = \"error\"\n")
        .expect("config");
    let out = temp.child("loan.json");

    formflow(&temp)
        .args(["run", "loan", "--answers"])
        .arg(fixture("loan.answers.json"))
        .arg("--out")
        .arg(out.path())
        .assert()
        .success();

    let written: Value =
        serde_json::from_str(&std::fs::read_to_string(out.path()).expect("read")).expect("json");
    assert_eq!(written["record"]["phone"], "+254772123456");
    assert_eq!(written["record"]["yearsExperience"], 7);
    assert_eq!(written["record"]["otherPurpose"], "Solar panels");
    assert_eq!(
        written["record"]["bankReferences"].as_array().map(Vec::len),
        Some(2)
    );
}

#[test]
fn mask_replays_keystrokes() {
    let temp = assert_fs::TempDir::new().expect("tempdir");
    formflow(&temp)
        .args(["mask", "expiry", "123"])
        .assert()
        .success()
        .stdout(predicate::str::diff("1 -> 1\n2 -> 12\n3 -> 12 / 3\n"));

    formflow(&temp)
        .args(["mask", "card-number", "12341234123412345"])
        .assert()
        .success()
        .stdout(predicate::str::ends_with("5 -> 1234 1234 1234 1234\n"));
}

#[test]
fn unknown_country_is_rejected() {
    let temp = assert_fs::TempDir::new().expect("tempdir");
    formflow(&temp)
        .args(["mask", "phone", "0772", "--country", "ZZ"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("cannot use country 'ZZ'"));
}
