mod common;

use common::TestFixture;
use predicates::str::contains;

#[test]
fn plan_decomposes_a_single_agent_query() {
    let fixture = TestFixture::new();

    fixture
        .cmd()
        .args(["plan", "what was the closing price of CLZ5 yesterday"])
        .assert()
        .success()
        .stdout(contains("market_data_sql"))
        .stdout(contains("parallel groups"))
        .stdout(contains("dependency paths"));
}

#[test]
fn plan_json_output_contains_subtasks_and_paths() {
    let fixture = TestFixture::new();

    let output = fixture
        .cmd()
        .args([
            "--format",
            "json",
            "plan",
            "what was the closing price of CLZ5 yesterday",
        ])
        .output()
        .expect("failed to run plexus plan");
    assert!(output.status.success());

    let json: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("plan --format json should emit valid JSON");
    assert!(json["subtasks"].as_array().is_some_and(|s| !s.is_empty()));
    assert!(json["parallel_groups"].as_array().is_some());
    assert!(json["dependency_paths"].as_array().is_some());
    assert!(json["path_plans"].as_array().is_some());
}

#[test]
fn plan_rejects_when_depth_budget_is_zero() {
    let fixture = TestFixture::new();

    fixture
        .cmd()
        .args([
            "plan",
            "what was the closing price of CLZ5 yesterday",
            "--max-subtasks",
            "0",
        ])
        .assert()
        .failure();
}
