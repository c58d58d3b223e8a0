mod common;

use common::TestFixture;
use predicates::str::contains;

#[test]
fn init_creates_config_file() {
    let fixture = TestFixture::new();

    fixture
        .cmd()
        .arg("init")
        .assert()
        .success()
        .stdout(contains("Initialized workspace"));

    assert!(fixture.workspace().join("plexus.toml").exists());
}

#[test]
fn init_refuses_to_overwrite_without_force() {
    let fixture = TestFixture::new();

    fixture.cmd().arg("init").assert().success();
    fixture
        .cmd()
        .arg("init")
        .assert()
        .failure()
        .stderr(contains("--force"));
}

#[test]
fn init_force_overwrites_existing_config() {
    let fixture = TestFixture::new();

    fixture.cmd().arg("init").assert().success();
    fixture
        .cmd()
        .args(["init", "--force"])
        .assert()
        .success();
}

#[test]
fn init_json_output_reports_paths() {
    let fixture = TestFixture::new();

    let output = fixture
        .cmd()
        .args(["--format", "json", "init"])
        .output()
        .expect("failed to run plexus init");
    assert!(output.status.success());

    let json: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("init --format json should emit valid JSON");
    assert_eq!(
        json["workspace_root"],
        serde_json::json!(fixture.workspace())
    );
}
