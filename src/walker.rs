// SPDX-License-Identifier: PMPL-1.0-or-later

//! Source walker
//!
//! Enumerates candidate source files under a root directory, pruning
//! hidden and dependency-vendor directories, classified by extension.

use crate::types::FileClass;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Directory names never descended into. Path components starting with
/// "." are pruned as well, which covers ".git", ".venv" and friends.
pub const VENDOR_DIRS: &[&str] = &[
    "node_modules",
    "target",
    "build",
    "dist",
    "vendor",
    "venv",
    "__pycache__",
];

/// A source file selected for scanning, with its detected class
#[derive(Debug, Clone)]
pub struct SourceFile {
    pub path: PathBuf,
    pub class: FileClass,
}

fn excluded(name: &str) -> bool {
    name.starts_with('.') || VENDOR_DIRS.contains(&name)
}

/// Collect the scannable files under `root`, sorted by path so every
/// downstream consumer sees a deterministic order.
///
/// An empty, missing, or unreadable root yields an empty list rather
/// than an error; the caller reports zero findings, not a scan failure.
/// Symlinks are not followed, so link cycles cannot trap the walk.
pub fn collect(root: &Path) -> Vec<SourceFile> {
    let mut files: Vec<SourceFile> = WalkDir::new(root)
        .follow_links(false)
        .into_iter()
        .filter_entry(|entry| {
            // The root entry is exempt so a scan pointed directly at a
            // dot-directory still descends into it.
            if entry.depth() == 0 {
                return true;
            }
            entry
                .file_name()
                .to_str()
                .map(|name| !excluded(name))
                .unwrap_or(false)
        })
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file())
        .filter_map(|entry| {
            FileClass::detect(entry.path()).map(|class| SourceFile {
                path: entry.path().to_path_buf(),
                class,
            })
        })
        .collect();

    files.sort_by(|a, b| a.path.cmp(&b.path));
    files
}
