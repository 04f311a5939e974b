// SPDX-License-Identifier: PMPL-1.0-or-later

//! Tests for scan orchestration: structural + text analysis, aggregation,
//! encoding fallback, and status rollup

use ai_medic::scanner;
use ai_medic::types::*;
use std::fs;
use tempfile::TempDir;

fn create_test_file(dir: &TempDir, name: &str, content: &str) -> std::path::PathBuf {
    let path = dir.path().join(name);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(&path, content).unwrap();
    path
}

fn issues_of(report: &ScanReport) -> Vec<&str> {
    report.findings.iter().map(|f| f.issue.as_str()).collect()
}

const BARE_CALL: &str = r#"import openai

client = openai.OpenAI()

def ask(prompt):
    return client.chat.completions.create(
        model="gpt-4o-mini",
        messages=[{"role": "user", "content": prompt}],
    )
"#;

const GUARDED_CALL: &str = r#"import openai

client = openai.OpenAI()

def ask(messages, key):
    return client.chat.completions.create(
        model="gpt-4o-mini",
        messages=messages,
        max_tokens=512,
        timeout=30,
        idempotency_key=key,
    )
"#;

#[test]
fn test_scan_flags_bare_python_call() {
    let dir = TempDir::new().unwrap();
    create_test_file(&dir, "app.py", BARE_CALL);

    let report = scanner::scan(dir.path()).expect("scan should succeed");
    let issues = issues_of(&report);

    assert!(issues.contains(&"missing-max-tokens"));
    assert!(issues.contains(&"missing-timeout"));
    assert!(issues.contains(&"missing-idempotency-key"));
    assert_eq!(report.status, CheckStatus::Warn, "warnings only: {issues:?}");
    assert_eq!(report.summary.total_files, 1);
    assert_eq!(report.summary.python_files, 1);
    assert_eq!(report.summary.findings_count, report.findings.len());

    // Structural findings land on the line the call expression starts.
    for finding in report
        .findings
        .iter()
        .filter(|f| f.issue == "missing-max-tokens")
    {
        assert_eq!(finding.file, "app.py");
        assert_eq!(finding.line, 6);
        assert!(finding.code_snippet.contains("completions.create"));
    }
}

#[test]
fn test_scan_clean_file_passes() {
    let dir = TempDir::new().unwrap();
    create_test_file(&dir, "app.py", GUARDED_CALL);

    let report = scanner::scan(dir.path()).expect("scan should succeed");
    assert!(
        report.findings.is_empty(),
        "guarded call should produce nothing: {:?}",
        report.findings
    );
    assert_eq!(report.status, CheckStatus::Pass);
}

#[test]
fn test_scan_stream_true_is_additive() {
    let dir = TempDir::new().unwrap();
    // Token cap and timeout are supplied; only the streaming rule fires.
    create_test_file(
        &dir,
        "stream.py",
        r#"chunks = client.chat.completions.create(
    model="gpt-4o-mini",
    messages=msgs,
    max_tokens=256,
    timeout=60,
    stream=True,
    idempotency_key=key,
)
"#,
    );

    let report = scanner::scan(dir.path()).expect("scan should succeed");
    let issues = issues_of(&report);
    assert!(issues.contains(&"streaming-without-timeout"));
    assert!(!issues.contains(&"missing-timeout"));
    assert!(!issues.contains(&"missing-max-tokens"));
}

#[test]
fn test_scan_latin1_file_is_decoded_not_skipped() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("legacy.py");
    // 0xE9 is not valid UTF-8 but decodes as Latin-1.
    fs::write(
        &path,
        b"# caf\xe9 legacy retry helper\nfor attempt in range(20):\n    poll()\n",
    )
    .unwrap();

    let report = scanner::scan(dir.path()).expect("scan should succeed");
    assert_eq!(report.summary.python_files, 1);
    assert_eq!(report.summary.unreadable_files, 0);
    assert!(issues_of(&report).contains(&"too-many-retry-attempts"));
    assert_eq!(report.status, CheckStatus::Fail);
}

#[test]
fn test_scan_single_file_target() {
    let dir = TempDir::new().unwrap();
    let path = create_test_file(&dir, "app.py", BARE_CALL);

    let report = scanner::scan(&path).expect("scan should succeed");
    assert_eq!(report.summary.total_files, 1);
    assert!(!report.findings.is_empty());
    // Paths are reported relative to the parent of a file target.
    assert!(report.findings.iter().all(|f| f.file == "app.py"));
}

#[test]
fn test_scan_empty_directory_passes() {
    let dir = TempDir::new().unwrap();

    let report = scanner::scan(dir.path()).expect("empty directory is not an error");
    assert_eq!(report.summary.total_files, 0);
    assert!(report.findings.is_empty());
    assert_eq!(report.status, CheckStatus::Pass);
}

#[test]
fn test_scan_missing_target_is_an_error() {
    let dir = TempDir::new().unwrap();
    assert!(scanner::scan(dir.path().join("missing")).is_err());
}

#[test]
fn test_scan_counts_file_classes() {
    let dir = TempDir::new().unwrap();
    create_test_file(&dir, "app.py", GUARDED_CALL);
    create_test_file(&dir, "client.js", "export const x = 1;\n");
    create_test_file(&dir, "node_modules/dep.js", "module.exports = 1;\n");

    let report = scanner::scan(dir.path()).expect("scan should succeed");
    assert_eq!(report.summary.total_files, 2);
    assert_eq!(report.summary.python_files, 1);
    assert_eq!(report.summary.javascript_files, 1);
}

#[test]
fn test_scan_is_deterministic() {
    let dir = TempDir::new().unwrap();
    create_test_file(&dir, "app.py", BARE_CALL);
    create_test_file(&dir, "other.py", BARE_CALL);
    create_test_file(
        &dir,
        "retry.js",
        "// retry wrapper\nfor (let i = 0; i < 12; i++) {\n  attempt();\n}\n",
    );

    let first = scanner::scan(dir.path()).expect("scan should succeed");
    let second = scanner::scan(dir.path()).expect("scan should succeed");

    assert_eq!(first.findings, second.findings);
    assert_eq!(first.summary, second.summary);
    assert_eq!(first.status, second.status);
}

#[test]
fn test_unparseable_python_still_gets_text_analysis() {
    let dir = TempDir::new().unwrap();
    // Bad indentation everywhere; the retry pattern is still visible as text.
    create_test_file(
        &dir,
        "broken.py",
        "def f(:\n  # retry until it works\nfor attempt in range(30):\n",
    );

    let report = scanner::scan(dir.path()).expect("scan should succeed");
    assert!(issues_of(&report).contains(&"too-many-retry-attempts"));
}
