// SPDX-License-Identifier: PMPL-1.0-or-later

//! Report rendering module

pub mod formatter;
pub mod output;
pub mod sarif;

use crate::types::*;
use anyhow::Result;
use std::fs;
use std::path::Path;

pub use formatter::ReportFormatter;
pub use output::ReportFormat;

/// Print a full report to the console
pub fn print_report(report: &ScanReport) {
    let formatter = ReportFormatter::new();
    formatter.print(report);
}

/// Print summary and status only
pub fn print_report_brief(report: &ScanReport) {
    let formatter = ReportFormatter::new();
    formatter.print_brief(report);
}

/// Serialize a report in the requested format and write it to a file
pub fn save_report<P: AsRef<Path>>(
    report: &ScanReport,
    path: P,
    format: ReportFormat,
) -> Result<()> {
    let content = format.serialize(report)?;
    fs::write(path.as_ref(), content)?;
    println!("Report saved to: {}", path.as_ref().display());
    Ok(())
}

/// Write a report as SARIF 2.1.0 JSON
pub fn save_sarif<P: AsRef<Path>>(report: &ScanReport, path: P) -> Result<()> {
    let json = sarif::to_sarif_json(report)?;
    fs::write(path.as_ref(), json)?;
    println!("SARIF report saved to: {}", path.as_ref().display());
    Ok(())
}
