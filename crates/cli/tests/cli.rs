use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::{json, Value};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::{tempdir, TempDir};

#[allow(deprecated)]
fn futuretree() -> Command {
    let mut cmd = Command::cargo_bin("futuretree").expect("binary");
    cmd.arg("--quiet");
    cmd
}

fn write(dir: &Path, name: &str, value: &Value) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, serde_json::to_string_pretty(value).unwrap()).unwrap();
    path
}

fn stdout_json(output: &std::process::Output) -> Value {
    serde_json::from_slice(&output.stdout).expect("valid json on stdout")
}

fn case_studies(dir: &TempDir) -> PathBuf {
    write(
        dir.path(),
        "cases.json",
        &json!([
            {
                "id": "c-arch",
                "company_name": "Studio North",
                "industry": "architecture",
                "location": "Portland, OR",
                "starting_state": { "revenue": "1m-5m", "team_size": "6-15" },
                "strategy_type": "niche-specialization",
                "timeline_months": 9,
                "outcomes": { "revenue_multiplier": 2.1 },
                "tags": ["healthcare design"],
                "summary": "Focused on clinic design"
            },
            {
                "id": "c-retail",
                "company_name": "Corner Goods",
                "industry": "retail",
                "location": "Austin, TX",
                "starting_state": { "revenue": "under-500k", "team_size": "solo" },
                "strategy_type": "franchise-licensing"
            }
        ]),
    )
}

fn strategic_paths(dir: &TempDir) -> PathBuf {
    write(
        dir.path(),
        "paths.json",
        &json!([
            {
                "id": "p-niche",
                "slug": "niche-specialization",
                "name": "Niche specialization",
                "success_rate": 78.0,
                "case_count": 25,
                "timeline_p25": 3.0,
                "timeline_p75": 9.0,
                "capital_p25": 5000.0,
                "capital_p75": 25000.0,
                "risk_score": 0.2,
                "model_version": 2
            },
            {
                "id": "p-franchise",
                "slug": "franchise-licensing",
                "name": "Franchise licensing",
                "success_rate": 55.0,
                "case_count": 12,
                "capital_p25": 50000.0,
                "capital_p75": 150000.0,
                "risk_score": 0.6,
                "model_version": 1
            }
        ]),
    )
}

#[test]
fn match_ranks_same_industry_first() {
    let dir = tempdir().unwrap();
    let cases = case_studies(&dir);
    let profile = write(
        dir.path(),
        "profile.json",
        &json!({
            "industry": "Architecture",
            "revenue": "1m-5m",
            "team_size": "6-15",
            "location": "Seattle, WA"
        }),
    );

    let output = futuretree()
        .args(["match", "--profile"])
        .arg(&profile)
        .arg("--cases")
        .arg(&cases)
        .args(["--threshold", "0"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let body = stdout_json(&output);
    assert_eq!(body["candidates_considered"], 2);
    assert_eq!(body["matches"][0]["case_study_id"], "c-arch");
    assert_eq!(body["matches"][0]["rank"], 1);
    assert_eq!(body["matches"][0]["score"]["industry"], 100.0);
}

#[test]
fn search_rejects_blank_query() {
    let dir = tempdir().unwrap();
    let cases = case_studies(&dir);
    futuretree()
        .arg("search")
        .arg("--cases")
        .arg(&cases)
        .arg("   ")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error"));
}

#[test]
fn rank_orders_paths_for_context() {
    let dir = tempdir().unwrap();
    let paths = strategic_paths(&dir);
    let context = write(
        dir.path(),
        "context.json",
        &json!({
            "industry": "architecture",
            "stage": "growth",
            "available_capital": 20000.0,
            "budget_flexibility": "flexible",
            "timeline_preference": "moderate",
            "risk_tolerance": "moderate"
        }),
    );

    let output = futuretree()
        .arg("rank")
        .arg("--context")
        .arg(&context)
        .arg("--paths")
        .arg(&paths)
        .output()
        .unwrap();
    assert!(output.status.success());

    let body = stdout_json(&output);
    let ranked = body.as_array().unwrap();
    assert_eq!(ranked.len(), 2);
    assert_eq!(ranked[0]["slug"], "niche-specialization");
    assert_eq!(ranked[0]["rank"], 1);
    assert_eq!(ranked[1]["rank"], 2);
}

#[test]
fn rank_rejects_inverted_capital_range() {
    let dir = tempdir().unwrap();
    let paths = write(
        dir.path(),
        "paths.json",
        &json!([{
            "id": "p-broken",
            "slug": "niche-specialization",
            "name": "Broken",
            "success_rate": 60.0,
            "capital_p25": 90000.0,
            "capital_p75": 10000.0
        }]),
    );
    let context = write(
        dir.path(),
        "context.json",
        &json!({ "industry": "architecture", "stage": "growth" }),
    );

    futuretree()
        .arg("rank")
        .arg("--context")
        .arg(&context)
        .arg("--paths")
        .arg(&paths)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid strategic path 'p-broken'"))
        .stderr(predicate::str::contains("capital_p25"));
}

#[test]
fn emv_reports_value_and_breakeven() {
    let output = futuretree()
        .args([
            "emv",
            "--probability",
            "0.6",
            "--revenue",
            "100000",
            "--cost",
            "20000",
        ])
        .output()
        .unwrap();
    assert!(output.status.success());

    let body = stdout_json(&output);
    assert_eq!(body["result"]["emv"], 52000.0);
    assert_eq!(body["result"]["risk_reward_ratio"], 5.0);
    assert_eq!(body["sensitivity_per_point"], 1200.0);
}

#[test]
fn emv_requires_inputs() {
    futuretree()
        .args(["emv", "--probability", "0.5"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--revenue is required"));
}

#[test]
fn what_if_applies_adjustments() {
    let output = futuretree()
        .args([
            "what-if",
            "--probability",
            "0.5",
            "--revenue",
            "100000",
            "--cost",
            "20000",
            "--cost-delta-pct=-50",
        ])
        .output()
        .unwrap();
    assert!(output.status.success());

    let body = stdout_json(&output);
    assert_eq!(body["original"]["emv"], 40000.0);
    assert_eq!(body["adjusted"]["emv"], 45000.0);
    assert_eq!(body["emv_change_pct"], 12.5);
}

#[test]
fn what_if_seeds_from_path() {
    let dir = tempdir().unwrap();
    let paths = strategic_paths(&dir);
    let output = futuretree()
        .arg("what-if")
        .arg("--paths")
        .arg(&paths)
        .args(["--path-id", "p-niche"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let body = stdout_json(&output);
    assert_eq!(body["emv_change"], 0.0);
    assert_eq!(body["adjusted_input"]["cost"], 15000.0);
}

#[test]
fn recalc_writes_updated_paths() {
    let dir = tempdir().unwrap();
    let paths = strategic_paths(&dir);
    let outcomes = write(
        dir.path(),
        "outcomes.json",
        &json!([
            {
                "id": "o1",
                "path_id": "p-niche",
                "actual_timeline_months": 6.0,
                "actual_cost": 12000.0,
                "result": "success",
                "reported_at": "2026-01-05T10:00:00Z"
            },
            {
                "id": "o2",
                "path_id": "p-niche",
                "actual_timeline_months": 10.0,
                "actual_cost": 30000.0,
                "result": "abandoned",
                "reported_at": "2026-02-05T10:00:00Z"
            }
        ]),
    );
    let out = dir.path().join("updated/paths.json");

    let output = futuretree()
        .arg("recalc")
        .arg("--paths")
        .arg(&paths)
        .arg("--outcomes")
        .arg(&outcomes)
        .args(["--path", "p-niche", "--force", "--out"])
        .arg(&out)
        .output()
        .unwrap();
    assert!(output.status.success());

    let body = stdout_json(&output);
    assert_eq!(body["outcomes_considered"], 2);
    assert_eq!(body["updated"]["success_rate"], 50.0);
    assert_eq!(body["model_version"], 3);

    let written: Value = serde_json::from_str(&fs::read_to_string(&out).unwrap()).unwrap();
    assert_eq!(written[0]["model_version"], 3);
    assert_eq!(written[0]["case_count"], 2);
    assert_eq!(written[1]["model_version"], 1);
}

#[test]
fn recalc_batch_skips_paths_under_threshold() {
    let dir = tempdir().unwrap();
    let paths = strategic_paths(&dir);
    let outcomes = write(dir.path(), "outcomes.json", &json!([]));

    let output = futuretree()
        .arg("recalc")
        .arg("--paths")
        .arg(&paths)
        .arg("--outcomes")
        .arg(&outcomes)
        .output()
        .unwrap();
    assert!(output.status.success());

    let body = stdout_json(&output);
    assert_eq!(body["recalculated"], 0);
    assert_eq!(body["skipped"], 2);
}

#[test]
fn recalc_unknown_path_fails() {
    let dir = tempdir().unwrap();
    let paths = strategic_paths(&dir);
    let outcomes = write(dir.path(), "outcomes.json", &json!([]));

    futuretree()
        .arg("recalc")
        .arg("--paths")
        .arg(&paths)
        .arg("--outcomes")
        .arg(&outcomes)
        .args(["--path", "ghost", "--force"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Strategic path not found: ghost"));
}

#[test]
fn config_file_sets_match_threshold() {
    let dir = tempdir().unwrap();
    let cases = case_studies(&dir);
    let profile = write(dir.path(), "profile.json", &json!({ "industry": "consulting" }));
    let config = dir.path().join("futuretree.toml");
    fs::write(&config, "[matching]\nthreshold = 99.0\n").unwrap();

    let output = futuretree()
        .arg("--config")
        .arg(&config)
        .arg("match")
        .arg("--profile")
        .arg(&profile)
        .arg("--cases")
        .arg(&cases)
        .output()
        .unwrap();
    assert!(output.status.success());

    let body = stdout_json(&output);
    assert_eq!(body["matches"].as_array().unwrap().len(), 0);
    assert_eq!(body["candidates_considered"], 2);
}

#[test]
fn schema_describes_records() {
    let output = futuretree()
        .args(["schema", "strategic-path"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let body = stdout_json(&output);
    assert!(body["properties"]["success_rate"].is_object());

    futuretree()
        .args(["schema", "invoice"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown record kind"));
}
