// SPDX-License-Identifier: PMPL-1.0-or-later

//! Report formatting and output

use crate::types::*;
use colored::*;

pub struct ReportFormatter;

impl ReportFormatter {
    pub fn new() -> Self {
        Self
    }

    pub fn print(&self, report: &ScanReport) {
        println!("\n{}", "=== AI-MEDIC SCAN REPORT ===".bold().cyan());
        println!();

        self.print_summary(report);
        println!();

        self.print_findings(report);
        println!();

        self.print_status(report);
        println!();
    }

    /// Summary and status only, for `--quiet` runs.
    pub fn print_brief(&self, report: &ScanReport) {
        println!("\n{}", "=== AI-MEDIC SCAN REPORT ===".bold().cyan());
        println!();

        self.print_summary(report);
        println!();

        self.print_status(report);
        println!();
    }

    fn print_summary(&self, report: &ScanReport) {
        println!("{}", "SCAN SUMMARY".bold().yellow());
        println!("  Root: {}", report.root.display());
        println!();

        println!("  Files scanned: {}", report.summary.total_files);
        println!("    Python: {}", report.summary.python_files);
        println!("    JavaScript: {}", report.summary.javascript_files);
        if report.summary.unreadable_files > 0 {
            println!(
                "    Skipped (unreadable): {}",
                report.summary.unreadable_files.to_string().yellow()
            );
        }
        println!();

        println!("  Findings: {}", report.summary.findings_count);
        if report.summary.findings_count > 0 {
            println!(
                "    Errors: {}",
                report.count_by_severity(Severity::Error).to_string().red()
            );
            println!(
                "    Warnings: {}",
                report
                    .count_by_severity(Severity::Warning)
                    .to_string()
                    .yellow()
            );
            println!(
                "    Info: {}",
                report.count_by_severity(Severity::Info).to_string().blue()
            );
            println!();

            println!("  By category:");
            for category in Category::all() {
                let count = report.count_by_category(category);
                if count > 0 {
                    println!("    {}: {}", category, count);
                }
            }
        }
    }

    fn print_findings(&self, report: &ScanReport) {
        if report.findings.is_empty() {
            println!("{}", "No risk patterns detected".green());
            return;
        }

        println!("{}", "FINDINGS".bold().yellow());

        // Worst first; the stable sort keeps file/line order within a rank.
        let mut ranked: Vec<&Finding> = report.findings.iter().collect();
        ranked.sort_by_key(|f| f.severity);

        for (i, finding) in ranked.iter().enumerate() {
            let severity_color = match finding.severity {
                Severity::Error => "red",
                Severity::Warning => "yellow",
                Severity::Info => "blue",
            };
            println!(
                "  {}. [{}] {} {}:{}",
                i + 1,
                finding.severity.to_string().color(severity_color),
                finding.category.to_string().bold(),
                finding.file,
                finding.line
            );
            println!("     {}", finding.message);
            println!("     Fix: {}", finding.recommendation.dimmed());
            if !finding.code_snippet.is_empty() {
                println!("     > {}", finding.code_snippet.trim_end().dimmed());
            }
        }
    }

    fn print_status(&self, report: &ScanReport) {
        let status_color = match report.status {
            CheckStatus::Pass => "green",
            CheckStatus::Warn => "yellow",
            CheckStatus::Fail => "red",
        };
        println!(
            "{} {}",
            "STATUS:".bold(),
            report
                .status
                .to_string()
                .to_uppercase()
                .color(status_color)
                .bold()
        );
    }

    pub fn print_fixes(&self, fixes: &[Fix]) {
        println!("\n{}", "=== AI-MEDIC FIX PROPOSALS ===".bold().cyan());
        println!();

        if fixes.is_empty() {
            println!("{}", "No fixable patterns found".green());
            return;
        }

        for (i, fix) in fixes.iter().enumerate() {
            let kind_color = match fix.kind {
                FixKind::Add => "green",
                FixKind::Modify => "yellow",
                FixKind::Remove => "red",
            };
            println!(
                "  {}. {}:{} [{}]",
                i + 1,
                fix.file.display(),
                fix.line,
                format!("{:?}", fix.kind).to_lowercase().color(kind_color)
            );
            println!("     {}", fix.suggestion);
            if let Some(code) = &fix.code {
                println!("     + {}", code.green());
            }
        }
        println!();
        println!("  Total: {}", fixes.len());
    }

    pub fn print_fix_result(&self, result: &FixResult) {
        println!("\n{}", "FIX RESULTS".bold().yellow());
        println!("  Applied: {}", result.applied.len().to_string().green());
        println!("  Skipped: {}", result.skipped.len());

        if result.errors.is_empty() {
            println!("  Errors: 0");
        } else {
            println!("  Errors: {}", result.errors.len().to_string().red().bold());
            for err in &result.errors {
                println!(
                    "    - {}:{} {}",
                    err.fix.file.display(),
                    err.fix.line,
                    err.cause.red()
                );
            }
        }
    }
}

impl Default for ReportFormatter {
    fn default() -> Self {
        Self::new()
    }
}
