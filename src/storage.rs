// SPDX-License-Identifier: PMPL-1.0-or-later

//! Persistent storage for timestamped scan reports

use crate::report::ReportFormat;
use crate::types::ScanReport;
use anyhow::{anyhow, Context, Result};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_REPORT_DIR: &str = ".ai-medic/reports";

/// Pointer to the most recently persisted report, kept at the storage root.
#[derive(Debug, Serialize, Deserialize)]
struct LatestPointer {
    path: PathBuf,
    created_at: String,
}

/// Write `<dir>/<YYYYMMDDHHMMSS>/report.json` plus a Markdown rendering,
/// then refresh the `latest.json` pointer. Returns the stored paths.
pub fn persist_report(report: &ScanReport, directory: Option<&Path>) -> Result<Vec<PathBuf>> {
    let base_dir = directory
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_REPORT_DIR));
    let timestamp = Utc::now().format("%Y%m%d%H%M%S").to_string();
    let report_dir = base_dir.join(&timestamp);
    fs::create_dir_all(&report_dir)?;

    let mut stored = Vec::new();

    let json_path = report_dir.join("report.json");
    fs::write(&json_path, ReportFormat::Json.serialize(report)?)?;
    stored.push(json_path.clone());

    let md_path = report_dir.join("report.md");
    fs::write(&md_path, ReportFormat::Markdown.serialize(report)?)?;
    stored.push(md_path);

    let pointer = LatestPointer {
        path: json_path,
        created_at: report.created_at.clone(),
    };
    let pointer_path = base_dir.join("latest.json");
    fs::write(&pointer_path, serde_json::to_string_pretty(&pointer)?)?;
    stored.push(pointer_path);

    Ok(stored)
}

/// Load the most recent persisted report. The `latest.json` pointer is
/// authoritative; if it is missing or stale, fall back to the lexically
/// newest timestamped directory (compact timestamps sort as strings).
pub fn latest_report(directory: Option<&Path>) -> Result<ScanReport> {
    let base_dir = directory
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_REPORT_DIR));
    if !base_dir.exists() {
        return Err(anyhow!(
            "report directory not found: {}",
            base_dir.display()
        ));
    }

    if let Some(report) = read_pointer(&base_dir) {
        return Ok(report);
    }

    let mut dirs: Vec<PathBuf> = fs::read_dir(&base_dir)?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.is_dir())
        .collect();
    dirs.sort_by(|a, b| a.file_name().cmp(&b.file_name()));

    let newest = dirs
        .iter()
        .rev()
        .map(|dir| dir.join("report.json"))
        .find(|path| path.is_file())
        .ok_or_else(|| anyhow!("no stored reports in {}", base_dir.display()))?;
    load_report(&newest)
}

fn read_pointer(base_dir: &Path) -> Option<ScanReport> {
    let raw = fs::read_to_string(base_dir.join("latest.json")).ok()?;
    let pointer: LatestPointer = serde_json::from_str(&raw).ok()?;
    load_report(&pointer.path).ok()
}

fn load_report(path: &Path) -> Result<ScanReport> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read report: {}", path.display()))?;
    let report = serde_json::from_str(&raw)
        .with_context(|| format!("failed to parse report: {}", path.display()))?;
    Ok(report)
}
