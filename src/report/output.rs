// SPDX-License-Identifier: PMPL-1.0-or-later

//! Serialization helpers for printed/exported reports

use crate::types::{Category, ScanReport};
use anyhow::Result;
use clap::ValueEnum;
use serde_json;
use serde_yaml;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ReportFormat {
    Json,
    Yaml,
    Markdown,
}

impl ReportFormat {
    pub fn parse(value: &str) -> Option<Self> {
        match value.to_ascii_lowercase().as_str() {
            "json" => Some(ReportFormat::Json),
            "yaml" | "yml" => Some(ReportFormat::Yaml),
            "markdown" | "md" => Some(ReportFormat::Markdown),
            _ => None,
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            ReportFormat::Json => "json",
            ReportFormat::Yaml => "yaml",
            ReportFormat::Markdown => "md",
        }
    }

    pub fn serialize(&self, report: &ScanReport) -> Result<String> {
        match self {
            ReportFormat::Json => Ok(serde_json::to_string_pretty(report)?),
            ReportFormat::Yaml => Ok(serde_yaml::to_string(report)?),
            // Markdown is the shareable human-facing projection.
            ReportFormat::Markdown => Ok(format_report_as_markdown(report)),
        }
    }
}

fn format_report_as_markdown(report: &ScanReport) -> String {
    let mut lines = Vec::new();
    lines.push("# ai-medic scan report".to_string());
    lines.push(String::new());
    lines.push(format!("- Generated: {}", report.created_at));
    lines.push(format!("- Root: `{}`", report.root.display()));
    lines.push(format!("- Status: **{}**", report.status));
    lines.push(String::new());

    lines.push("## Summary".to_string());
    lines.push(String::new());
    lines.push("| Metric | Count |".to_string());
    lines.push("| --- | --- |".to_string());
    lines.push(format!("| Files scanned | {} |", report.summary.total_files));
    lines.push(format!("| Python files | {} |", report.summary.python_files));
    lines.push(format!(
        "| JavaScript files | {} |",
        report.summary.javascript_files
    ));
    lines.push(format!(
        "| Unreadable files | {} |",
        report.summary.unreadable_files
    ));
    lines.push(format!("| Findings | {} |", report.summary.findings_count));
    lines.push(String::new());

    if report.findings.is_empty() {
        lines.push("No risk patterns detected.".to_string());
        lines.push(String::new());
        return lines.join("\n");
    }

    lines.push("## Findings by category".to_string());
    lines.push(String::new());
    for category in Category::all() {
        let in_category: Vec<_> = report
            .findings
            .iter()
            .filter(|f| f.category == category)
            .collect();
        if in_category.is_empty() {
            continue;
        }

        lines.push(format!("### {} ({})", category, in_category.len()));
        lines.push(String::new());
        for finding in in_category {
            lines.push(format!(
                "- **{}** `{}:{}` {} _({})_",
                finding.severity, finding.file, finding.line, finding.message, finding.issue
            ));
            lines.push(format!("  - Fix: {}", finding.recommendation));
            let snippet = finding.code_snippet.trim();
            if !snippet.is_empty() {
                lines.push(format!("  - `{}`", snippet.replace('`', "'")));
            }
        }
        lines.push(String::new());
    }

    lines.join("\n")
}
