// SPDX-License-Identifier: PMPL-1.0-or-later

//! Tests for SARIF 2.1.0 export

use ai_medic::report::sarif;
use ai_medic::scanner;
use ai_medic::types::*;
use std::fs;
use tempfile::TempDir;

fn finding(
    file: &str,
    line: usize,
    category: Category,
    severity: Severity,
    issue: &str,
    message: &str,
) -> Finding {
    Finding {
        file: file.to_string(),
        line,
        category,
        severity,
        issue: issue.to_string(),
        message: message.to_string(),
        recommendation: format!("remedy for {issue}"),
        code_snippet: String::new(),
    }
}

fn sample_report() -> ScanReport {
    let findings = vec![
        finding(
            "src/api.py",
            10,
            Category::Retries,
            Severity::Error,
            "too-many-retry-attempts",
            "Retry loop with 15 attempts",
        ),
        finding(
            "src/api.py",
            42,
            Category::Cost,
            Severity::Warning,
            "missing-max-tokens",
            "Completion call without max_tokens",
        ),
        finding(
            "src/track.py",
            7,
            Category::Traceability,
            Severity::Info,
            "no-request-id-tracking",
            "API requests without correlation IDs",
        ),
    ];

    ScanReport {
        created_at: "2024-01-01T00:00:00Z".to_string(),
        root: "src".into(),
        summary: ScanSummary {
            total_files: 2,
            python_files: 2,
            javascript_files: 0,
            unreadable_files: 0,
            findings_count: findings.len(),
        },
        status: CheckStatus::from_findings(&findings),
        findings,
    }
}

fn as_json(report: &ScanReport) -> serde_json::Value {
    let raw = sarif::to_sarif_json(report).expect("SARIF conversion should succeed");
    serde_json::from_str(&raw).expect("SARIF output should be valid JSON")
}

#[test]
fn test_sarif_envelope() {
    let parsed = as_json(&sample_report());

    assert!(parsed.is_object());
    assert_eq!(parsed["version"], "2.1.0");
    let schema = parsed["$schema"].as_str().unwrap();
    assert!(schema.contains("sarif-schema-2.1.0"));
    assert_eq!(
        parsed["runs"].as_array().map(Vec::len),
        Some(1),
        "one scan, one run"
    );
}

#[test]
fn test_sarif_driver_metadata() {
    let parsed = as_json(&sample_report());

    let driver = &parsed["runs"][0]["tool"]["driver"];
    assert_eq!(driver["name"], "ai-medic");
    assert!(driver["version"].as_str().is_some());
    assert!(driver["informationUri"].as_str().is_some());
}

#[test]
fn test_sarif_results_mirror_findings() {
    let report = sample_report();
    let parsed = as_json(&report);

    let results = parsed["runs"][0]["results"].as_array().unwrap();
    assert_eq!(results.len(), report.findings.len());

    let retry = &results[0];
    assert_eq!(retry["ruleId"], "AIM004");
    assert_eq!(retry["message"]["text"], "Retry loop with 15 attempts");
    let location = &retry["locations"][0]["physicalLocation"];
    assert_eq!(location["artifactLocation"]["uri"], "src/api.py");
    assert_eq!(location["region"]["startLine"], 10);
}

#[test]
fn test_sarif_severity_to_level_mapping() {
    let parsed = as_json(&sample_report());

    let results = parsed["runs"][0]["results"].as_array().unwrap();
    let levels: Vec<&str> = results
        .iter()
        .map(|r| r["level"].as_str().unwrap())
        .collect();
    // error and warning map directly; info has no SARIF counterpart and
    // downgrades to note.
    assert_eq!(levels, vec!["error", "warning", "note"]);
}

#[test]
fn test_sarif_rules_deduplicated() {
    let mut report = sample_report();
    let mut repeat = report.findings[1].clone();
    repeat.line = 99;
    report.findings.push(repeat);

    let log = sarif::to_sarif(&report).expect("SARIF conversion should succeed");
    let rules = &log.runs[0].tool.driver.rules;
    assert_eq!(rules.len(), 3, "four results, three distinct issues");
    assert_eq!(log.runs[0].results.len(), 4);

    let ids: Vec<&str> = rules.iter().map(|r| r.id.as_str()).collect();
    assert_eq!(ids, vec!["AIM004", "AIM001", "AIM009"]);
    assert_eq!(rules[0].name, "too-many-retry-attempts");
}

#[test]
fn test_sarif_empty_report_has_no_results() {
    let report = ScanReport {
        created_at: "2024-01-01T00:00:00Z".to_string(),
        root: ".".into(),
        summary: ScanSummary::default(),
        status: CheckStatus::Pass,
        findings: vec![],
    };

    let log = sarif::to_sarif(&report).expect("SARIF conversion should succeed");
    assert_eq!(log.runs.len(), 1);
    assert!(log.runs[0].results.is_empty());
    assert!(log.runs[0].tool.driver.rules.is_empty());
}

#[test]
fn test_sarif_from_real_scan() {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join("app.py"),
        "resp = client.chat.completions.create(model=\"gpt-4o\", messages=msgs)\n",
    )
    .unwrap();

    let report = scanner::scan(dir.path()).expect("scan should succeed");
    assert!(!report.findings.is_empty());

    let parsed = as_json(&report);
    let results = parsed["runs"][0]["results"].as_array().unwrap();
    assert_eq!(results.len(), report.findings.len());
    for result in results {
        assert!(result["ruleId"].as_str().is_some());
        assert!(result["level"].as_str().is_some());
        assert!(result["message"]["text"].as_str().is_some());
        assert!(!result["locations"].as_array().unwrap().is_empty());
    }
}
