mod common;

use common::TestFixture;
use predicates::str::contains;

#[test]
fn run_executes_a_single_agent_query_end_to_end() {
    let fixture = TestFixture::new();

    fixture
        .cmd()
        .args(["run", "what was the closing price of CLZ5 yesterday"])
        .assert()
        .success()
        .stdout(contains("answer"))
        .stdout(contains("total="));
}

#[test]
fn run_json_output_contains_metadata_and_answer() {
    let fixture = TestFixture::new();

    let output = fixture
        .cmd()
        .args([
            "--format",
            "json",
            "run",
            "what was the closing price of CLZ5 yesterday",
        ])
        .output()
        .expect("failed to run plexus run");
    assert!(output.status.success());

    let json: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("run --format json should emit valid JSON");
    assert!(json["answer_text"].is_string());
    assert_eq!(json["metadata"]["failed_tasks"], serde_json::json!(0));
    assert!(json["metadata"]["total_tasks"].as_u64().unwrap() >= 1);
}

#[test]
fn run_skip_validation_omits_validation_block() {
    let fixture = TestFixture::new();

    let output = fixture
        .cmd()
        .args([
            "--format",
            "json",
            "run",
            "what was the closing price of CLZ5 yesterday",
            "--skip-validation",
        ])
        .output()
        .expect("failed to run plexus run");
    assert!(output.status.success());

    let json: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("run --format json should emit valid JSON");
    assert!(json["validation"].is_null());
}
