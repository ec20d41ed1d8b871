use ad_preflight::engine::{run, RunOptions};
use ad_preflight::error::Error;
use ad_preflight::scoring::Status;
use serde_json::json;
use std::path::Path;
use tempfile::TempDir;

fn write_request(dir: &Path, name: &str, value: serde_json::Value) {
    let path = dir.join(name);
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(path, serde_json::to_string_pretty(&value).unwrap()).unwrap();
}

fn clean() -> serde_json::Value {
    json!({ "copy": "Hydrating day cream.", "platform": "google", "productCategory": "cosmetics" })
}

fn warning_only() -> serde_json::Value {
    json!({
        "copy": "Feel great in days.",
        "platform": "snapchat",
        "productCategory": "widgets",
        "textViolations": [{ "severity": "warning", "category": "Claims", "confidence": 1.0 }]
    })
}

#[test]
fn test_engine_on_directory() {
    let dir = TempDir::new().unwrap();
    write_request(dir.path(), "a_clean.json", clean());
    write_request(dir.path(), "nested/b_warning.json", warning_only());

    let result = run(dir.path(), &RunOptions::default()).unwrap();
    assert_eq!(result.outcomes.len(), 2);
    assert_eq!(result.outcomes[0].source, "a_clean.json");
    assert_eq!(result.outcomes[0].report.compliance_score, 100);
    assert_eq!(result.outcomes[1].source, "nested/b_warning.json");
    assert_eq!(result.outcomes[1].report.compliance_score, 80);
    assert_eq!(result.outcomes[1].report.status, Status::Pass);
    assert!(result.passed());
}

#[test]
fn test_engine_single_file() {
    let dir = TempDir::new().unwrap();
    write_request(dir.path(), "only.json", clean());
    let result = run(&dir.path().join("only.json"), &RunOptions::default()).unwrap();
    assert_eq!(result.outcomes.len(), 1);
    assert_eq!(result.outcomes[0].source, "only.json");
}

#[test]
fn test_platform_override_changes_verdict() {
    let dir = TempDir::new().unwrap();
    write_request(dir.path(), "warning.json", warning_only());
    let options = RunOptions {
        platform: Some("meta".to_string()),
        category: Some("weight loss".to_string()),
        ..RunOptions::default()
    };
    let result = run(dir.path(), &options).unwrap();
    let report = &result.outcomes[0].report;
    // 20 * 1.3 * 1.5 * 1.5 = 58.5
    assert_eq!(report.compliance_score, 42);
    assert_eq!(report.status, Status::Fail);
    assert_eq!(report.meta.platform, "meta");
    assert!(!result.passed());
}

#[test]
fn test_config_fail_below_gates_result() {
    let dir = TempDir::new().unwrap();
    write_request(dir.path(), "warning.json", warning_only());
    std::fs::write(dir.path().join("ad-preflight.toml"), "[ci]\nfail_below = 90\n").unwrap();

    let result = run(dir.path(), &RunOptions::default()).unwrap();
    assert_eq!(result.fail_below, 90);
    assert!(result.outcomes[0].report.passed());
    assert!(!result.passed());
}

#[test]
fn test_config_platform_tables_are_used() {
    let dir = TempDir::new().unwrap();
    write_request(dir.path(), "warning.json", warning_only());
    std::fs::write(
        dir.path().join("ad-preflight.toml"),
        "[platforms.snapchat]\ndisplay_name = \"Snapchat\"\nstrictness = 2.0\n",
    )
    .unwrap();

    let result = run(dir.path(), &RunOptions::default()).unwrap();
    let scoring = &result.outcomes[0].report.meta.scoring;
    assert_eq!(scoring.platform, "Snapchat");
    assert_eq!(scoring.pass_threshold, 70);
    assert_eq!(result.outcomes[0].report.compliance_score, 60);
    assert_eq!(result.outcomes[0].report.status, Status::Fail);
}

#[test]
fn test_ignored_and_invalid_requests_are_skipped() {
    let dir = TempDir::new().unwrap();
    write_request(dir.path(), "good.json", clean());
    write_request(dir.path(), "drafts/wip.json", warning_only());
    std::fs::write(dir.path().join("broken.json"), "{ nope").unwrap();
    std::fs::write(dir.path().join("notes.txt"), "not a request").unwrap();
    std::fs::write(
        dir.path().join("ad-preflight.toml"),
        "[ignore]\nfiles = [\"drafts/**\"]\n",
    )
    .unwrap();

    let result = run(dir.path(), &RunOptions::default()).unwrap();
    let sources: Vec<_> = result.outcomes.iter().map(|o| o.source.as_str()).collect();
    assert_eq!(sources, vec!["good.json"]);
    assert_eq!(result.skipped.len(), 1);
    assert_eq!(result.skipped[0].source, "broken.json");
    assert!(!result.skipped[0].reason.is_empty());
    assert!(result.outcomes[0].report.passed());
    assert!(!result.passed());
}

#[test]
fn test_only_unreadable_requests_still_fail() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("truncated.json"), "{ \"copy\": \"Lose 10").unwrap();

    let result = run(dir.path(), &RunOptions::default()).unwrap();
    assert!(result.outcomes.is_empty());
    assert_eq!(result.skipped.len(), 1);
    assert!(!result.passed());
}

#[test]
fn test_critical_request_with_numeric_region_is_checked() {
    let dir = TempDir::new().unwrap();
    write_request(dir.path(), "a_clean.json", clean());
    write_request(
        dir.path(),
        "b_nudity.json",
        json!({
            "copy": "Summer body collection.",
            "platform": null,
            "productCategory": "cosmetics",
            "image": {
                "violations": [{
                    "id": 7,
                    "severity": "critical",
                    "category": "Nudity",
                    "offendingImageRegion": { "x": 10, "y": 20, "width": 30, "height": 40 },
                    "confidence": 0.9
                }]
            }
        }),
    );

    let result = run(dir.path(), &RunOptions::default()).unwrap();
    assert_eq!(result.outcomes.len(), 2);
    assert!(result.skipped.is_empty());
    let report = &result.outcomes[1].report;
    assert_eq!(report.status, Status::Fail);
    assert_eq!(report.violations[0].id, "7");
    assert_eq!(report.violations[0].offending_image_region.as_ref().unwrap().x, "10");
    assert!(!result.passed());
}

#[test]
fn test_policy_db_inside_directory_is_not_a_request() {
    let dir = TempDir::new().unwrap();
    write_request(dir.path(), "request.json", clean());
    std::fs::copy("tests/fixtures/policies.json", dir.path().join("policies.json")).unwrap();

    let options = RunOptions {
        policy_db: Some(dir.path().join("policies.json")),
        ..RunOptions::default()
    };
    let result = run(dir.path(), &options).unwrap();
    assert_eq!(result.outcomes.len(), 1);
    assert!(result.outcomes[0].report.meta.policy.is_some());
}

#[test]
fn test_engine_missing_path() {
    let dir = TempDir::new().unwrap();
    let result = run(&dir.path().join("absent"), &RunOptions::default());
    assert!(matches!(result, Err(Error::MissingPath(_))));
}

#[test]
fn test_engine_empty_directory() {
    let dir = TempDir::new().unwrap();
    let result = run(dir.path(), &RunOptions::default());
    assert!(matches!(result, Err(Error::NoRequests(_))));
}
