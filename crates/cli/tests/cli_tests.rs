use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn regdesk(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("regdesk").unwrap();
    cmd.arg("--data-dir")
        .arg(dir.path())
        .env_remove("REGDESK_GEO_API_URL")
        .env("REGDESK_DRAFT_DEBOUNCE_MS", "50")
        .env("RUST_LOG", "warn");
    cmd
}

fn register_ana(dir: &TempDir) -> assert_cmd::assert::Assert {
    regdesk(dir)
        .args(["register", "--set", "name=ana maria", "--set", "email=ana@example.com"])
        .args(["--set", "phone=+40712345678", "--set", "age=30"])
        .args(["--set", "country=Romania", "--set", "countryCode=RO"])
        .assert()
}

#[test]
fn test_cli_help() {
    let mut cmd = Command::cargo_bin("regdesk").unwrap();
    cmd.arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("registration desk"));
}

#[test]
fn test_cli_register_help() {
    let mut cmd = Command::cargo_bin("regdesk").unwrap();
    cmd.arg("register").arg("--help").assert().success().stdout(predicate::str::contains("FIELD=VALUE"));
}

#[test]
fn test_register_then_list_and_stats() {
    let dir = TempDir::new().unwrap();
    register_ana(&dir).success().stdout(predicate::str::contains("\"created\": true"));

    regdesk(&dir)
        .args(["list", "--search", "ANA"])
        .assert()
        .success()
        .stdout(predicate::str::contains("ana@example.com"));

    regdesk(&dir)
        .arg("stats")
        .assert()
        .success()
        .stdout(predicate::str::contains("\"registrations\": 1"))
        .stdout(predicate::str::contains("\"26-35\": 1"));
}

#[test]
fn test_second_register_edits_active_session() {
    let dir = TempDir::new().unwrap();
    register_ana(&dir).success();

    regdesk(&dir)
        .args(["register", "--set", "age=31"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"created\": false"))
        .stdout(predicate::str::contains("\"age\": 31"));

    regdesk(&dir).arg("session").assert().success().stdout(predicate::str::contains("expiresAt"));
}

#[test]
fn test_new_registration_drops_session() {
    let dir = TempDir::new().unwrap();
    register_ana(&dir).success();

    regdesk(&dir).arg("new").assert().success();
    regdesk(&dir)
        .arg("session")
        .assert()
        .success()
        .stdout(predicate::str::contains("No active edit session"));
}

#[test]
fn test_invalid_phone_is_rejected_and_draft_kept() {
    let dir = TempDir::new().unwrap();
    regdesk(&dir)
        .args(["register", "--set", "name=ion", "--set", "phone=0712345678"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("PHONE is not in valid E.164 format"));

    regdesk(&dir)
        .arg("draft")
        .assert()
        .success()
        .stdout(predicate::str::contains("\"name\": \"ion\""));
}

#[test]
fn test_draft_autosave_survives_restart() {
    let dir = TempDir::new().unwrap();
    regdesk(&dir).args(["draft", "--set", "name=half typed"]).assert().success();

    regdesk(&dir)
        .arg("draft")
        .assert()
        .success()
        .stdout(predicate::str::contains("half typed"));
}

#[test]
fn test_remove_unknown_candidate_fails() {
    let dir = TempDir::new().unwrap();
    regdesk(&dir)
        .args(["remove", "nope"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Candidate not found"));
}

#[test]
fn test_map_requires_geo_url() {
    let dir = TempDir::new().unwrap();
    regdesk(&dir).arg("map").assert().failure().stderr(predicate::str::contains("REGDESK_GEO_API_URL"));
}
