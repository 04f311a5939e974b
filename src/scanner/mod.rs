// SPDX-License-Identifier: PMPL-1.0-or-later

//! Scan orchestration
//!
//! Walks the target, reads each file once, dispatches to the structural
//! and text analyzers, and aggregates everything into a `ScanReport`.

pub mod patterns;
pub mod structural;

use crate::types::{CheckStatus, FileClass, Finding, ScanReport, ScanSummary};
use crate::walker::{self, SourceFile};
use anyhow::Result;
use chrono::Utc;
use rayon::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};

pub struct Scanner {
    target: PathBuf,
    verbose: bool,
}

enum FileOutcome {
    Analyzed(Vec<Finding>),
    Unreadable,
}

impl Scanner {
    pub fn new(target: &Path) -> Result<Self> {
        Self::build(target, false)
    }

    pub fn new_verbose(target: &Path) -> Result<Self> {
        Self::build(target, true)
    }

    fn build(target: &Path, verbose: bool) -> Result<Self> {
        if !target.exists() {
            anyhow::bail!("Target does not exist: {}", target.display());
        }

        Ok(Self {
            target: target.to_path_buf(),
            verbose,
        })
    }

    pub fn scan(&self) -> Result<ScanReport> {
        let files = walker::collect(&self.target);

        let base = if self.target.is_dir() {
            self.target.clone()
        } else {
            self.target.parent().unwrap_or(Path::new(".")).to_path_buf()
        };

        // Per-file analysis shares no state; the order-preserving collect
        // keeps the findings list deterministic under parallelism.
        let outcomes: Vec<FileOutcome> = files
            .par_iter()
            .map(|file| self.scan_file(file, &base))
            .collect();

        let mut summary = ScanSummary {
            total_files: files.len(),
            ..ScanSummary::default()
        };
        let mut findings = Vec::new();

        for (file, outcome) in files.iter().zip(outcomes) {
            match file.class {
                FileClass::Python => summary.python_files += 1,
                FileClass::JavaScript => summary.javascript_files += 1,
            }
            match outcome {
                FileOutcome::Analyzed(file_findings) => findings.extend(file_findings),
                FileOutcome::Unreadable => summary.unreadable_files += 1,
            }
        }
        summary.findings_count = findings.len();

        let status = CheckStatus::from_findings(&findings);
        Ok(ScanReport {
            created_at: Utc::now().to_rfc3339(),
            root: self.target.clone(),
            summary,
            status,
            findings,
        })
    }

    fn scan_file(&self, file: &SourceFile, base: &Path) -> FileOutcome {
        let Some(content) = self.read_source(&file.path) else {
            return FileOutcome::Unreadable;
        };

        let rel_path = file
            .path
            .strip_prefix(base)
            .unwrap_or(&file.path)
            .to_string_lossy()
            .to_string();

        let mut findings = Vec::new();
        if file.class == FileClass::Python {
            findings.extend(structural::analyze(&content, &rel_path));
        }
        findings.extend(patterns::analyze(&content, file.class, &rel_path));

        FileOutcome::Analyzed(findings)
    }

    fn read_source(&self, path: &Path) -> Option<String> {
        let raw_bytes = match fs::read(path) {
            Ok(b) => b,
            Err(e) => {
                if self.verbose {
                    eprintln!("Skipping unreadable file: {} ({})", path.display(), e);
                }
                return None;
            }
        };

        // Try UTF-8 first, then Latin-1 fallback
        match String::from_utf8(raw_bytes) {
            Ok(s) => Some(s),
            Err(e) => {
                let (cow, _, had_errors) = encoding_rs::WINDOWS_1252.decode(e.as_bytes());
                if had_errors {
                    if self.verbose {
                        eprintln!(
                            "Skipping non-text file: {} (neither UTF-8 nor Latin-1)",
                            path.display()
                        );
                    }
                    return None;
                }
                Some(cow.into_owned())
            }
        }
    }
}

/// Scan a target with default options
pub fn scan<P: AsRef<Path>>(target: P) -> Result<ScanReport> {
    Scanner::new(target.as_ref())?.scan()
}

/// Scan a target, printing skip diagnostics to stderr
pub fn scan_verbose<P: AsRef<Path>>(target: P) -> Result<ScanReport> {
    Scanner::new_verbose(target.as_ref())?.scan()
}
