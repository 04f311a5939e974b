// SPDX-License-Identifier: PMPL-1.0-or-later

//! Core type definitions for ai-medic
//!
//! Shared by the scanner (read path) and the fixer (write path): findings,
//! fix proposals, apply-pass partitions, and the scan report consumed by
//! every report renderer.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Recognized source-file classes, detected by extension
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileClass {
    Python,
    JavaScript,
}

impl FileClass {
    pub fn detect(path: &Path) -> Option<Self> {
        let ext = path.extension().and_then(|s| s.to_str()).unwrap_or("");

        match ext {
            "py" | "pyw" => Some(FileClass::Python),
            "js" | "mjs" | "cjs" => Some(FileClass::JavaScript),
            "ts" | "tsx" | "jsx" => Some(FileClass::JavaScript),
            _ => None,
        }
    }

    /// Line-comment leader used when annotating applied fixes.
    pub fn comment_leader(&self) -> &'static str {
        match self {
            FileClass::Python => "#",
            FileClass::JavaScript => "//",
        }
    }
}

/// Risk dimension a rule addresses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Cost,
    Streaming,
    Retries,
    Traceability,
}

impl Category {
    pub fn all() -> Vec<Self> {
        vec![
            Category::Cost,
            Category::Streaming,
            Category::Retries,
            Category::Traceability,
        ]
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Category::Cost => write!(f, "cost"),
            Category::Streaming => write!(f, "streaming"),
            Category::Retries => write!(f, "retries"),
            Category::Traceability => write!(f, "traceability"),
        }
    }
}

/// Finding severity, declared worst-first so the derived ordering ranks
/// `Error < Warning < Info` and an ascending sort displays errors on top
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
    Info,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Error => write!(f, "ERROR"),
            Severity::Warning => write!(f, "WARNING"),
            Severity::Info => write!(f, "INFO"),
        }
    }
}

/// Overall status for a scan or check surface
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckStatus {
    Pass,
    Warn,
    Fail,
}

impl CheckStatus {
    /// Worst-severity-wins rollup: `Fail` if any error-severity finding,
    /// else `Warn` if any warning, else `Pass`. Every surface that reports
    /// a status goes through this one function.
    pub fn from_findings(findings: &[Finding]) -> Self {
        if findings.iter().any(|f| f.severity == Severity::Error) {
            CheckStatus::Fail
        } else if findings.iter().any(|f| f.severity == Severity::Warning) {
            CheckStatus::Warn
        } else {
            CheckStatus::Pass
        }
    }
}

impl std::fmt::Display for CheckStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CheckStatus::Pass => write!(f, "pass"),
            CheckStatus::Warn => write!(f, "warn"),
            CheckStatus::Fail => write!(f, "fail"),
        }
    }
}

/// One detected risk instance at a specific file/line.
///
/// Immutable once produced. Multiple rules may fire on the same line;
/// each addresses an independent risk dimension, so there is no
/// cross-rule de-duplication.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Finding {
    /// Path relative to the scan root
    pub file: String,
    /// 1-based line number at scan time; not stable after edits
    pub line: usize,
    pub category: Category,
    pub severity: Severity,
    /// Short stable rule code, e.g. "missing-max-tokens"
    pub issue: String,
    pub message: String,
    pub recommendation: String,
    /// Trimmed source line at the trigger point, captured verbatim
    pub code_snippet: String,
}

/// Edit flavor of a proposed fix
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FixKind {
    Add,
    Modify,
    Remove,
}

/// One proposed mechanical edit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fix {
    pub file: PathBuf,
    /// 1-based line the fix targets
    pub line: usize,
    #[serde(rename = "type")]
    pub kind: FixKind,
    pub issue: String,
    pub suggestion: String,
    /// Literal insertion/replacement text; absent for advisory proposals
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

/// A fix that could not be applied, with the originating cause
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FixError {
    pub fix: Fix,
    pub cause: String,
}

/// Outcome of an apply pass.
///
/// The three partitions are disjoint and every input fix lands in exactly
/// one: `skipped` in dry-run mode, `applied` or `errors` in apply mode.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FixResult {
    pub applied: Vec<Fix>,
    pub skipped: Vec<Fix>,
    pub errors: Vec<FixError>,
}

impl FixResult {
    pub fn total(&self) -> usize {
        self.applied.len() + self.skipped.len() + self.errors.len()
    }
}

/// Aggregate counts for one scan invocation
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanSummary {
    pub total_files: usize,
    pub python_files: usize,
    pub javascript_files: usize,
    /// Files skipped because they could not be read or decoded. Surfaced
    /// here so coverage gaps are visible instead of silent.
    pub unreadable_files: usize,
    pub findings_count: usize,
}

/// Scan artifact consumed by every report renderer.
///
/// Constructed fresh per invocation and never read back as input to a
/// later scan; on-disk copies are serialization snapshots only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanReport {
    pub created_at: String,
    pub root: PathBuf,
    pub summary: ScanSummary,
    pub status: CheckStatus,
    pub findings: Vec<Finding>,
}

impl ScanReport {
    pub fn count_by_severity(&self, severity: Severity) -> usize {
        self.findings.iter().filter(|f| f.severity == severity).count()
    }

    pub fn count_by_category(&self, category: Category) -> usize {
        self.findings.iter().filter(|f| f.category == category).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn finding(severity: Severity) -> Finding {
        Finding {
            file: "app.py".to_string(),
            line: 1,
            category: Category::Cost,
            severity,
            issue: "missing-max-tokens".to_string(),
            message: String::new(),
            recommendation: String::new(),
            code_snippet: String::new(),
        }
    }

    #[test]
    fn test_status_rollup_worst_severity_wins() {
        assert_eq!(CheckStatus::from_findings(&[]), CheckStatus::Pass);
        assert_eq!(
            CheckStatus::from_findings(&[finding(Severity::Info)]),
            CheckStatus::Pass
        );
        assert_eq!(
            CheckStatus::from_findings(&[finding(Severity::Info), finding(Severity::Warning)]),
            CheckStatus::Warn
        );
        assert_eq!(
            CheckStatus::from_findings(&[
                finding(Severity::Warning),
                finding(Severity::Error),
                finding(Severity::Info)
            ]),
            CheckStatus::Fail
        );
    }

    #[test]
    fn test_severity_display_rank() {
        let mut severities = vec![Severity::Info, Severity::Error, Severity::Warning];
        severities.sort();
        assert_eq!(
            severities,
            vec![Severity::Error, Severity::Warning, Severity::Info]
        );
    }

    #[test]
    fn test_file_class_detection() {
        assert_eq!(
            FileClass::detect(Path::new("src/app.py")),
            Some(FileClass::Python)
        );
        assert_eq!(
            FileClass::detect(Path::new("web/index.tsx")),
            Some(FileClass::JavaScript)
        );
        assert_eq!(FileClass::detect(Path::new("README.md")), None);
        assert_eq!(FileClass::detect(Path::new("Makefile")), None);
    }
}
