// SPDX-License-Identifier: PMPL-1.0-or-later

//! Patch application
//!
//! Partitions every input fix into applied/skipped/errors. Fixes for one
//! file are sorted by line descending once, staged in memory, and written
//! back in a single pass, so earlier lines keep their numbers while later
//! insertions land.

use crate::types::{FileClass, Fix, FixError, FixKind, FixResult};
use std::fs;
use std::path::{Path, PathBuf};

/// Apply (or, in dry-run mode, merely account for) a batch of fixes.
///
/// Never aborts the batch: per-file and per-fix failures are captured in
/// the `errors` partition with their cause.
pub fn apply_fixes(fixes: Vec<Fix>, dry_run: bool) -> FixResult {
    let mut result = FixResult::default();

    if dry_run {
        result.skipped = fixes;
        return result;
    }

    // Group per file, keeping first-seen file order.
    let mut by_file: Vec<(PathBuf, Vec<Fix>)> = Vec::new();
    for fix in fixes {
        match by_file.iter_mut().find(|(path, _)| *path == fix.file) {
            Some((_, list)) => list.push(fix),
            None => by_file.push((fix.file.clone(), vec![fix])),
        }
    }

    for (path, mut file_fixes) in by_file {
        // Sorted once, descending, before any mutation. Same-line ties run
        // modifies before adds: the replacement targets the line as
        // proposed, and an insert applied first would shift it. Adds then
        // stack in place above the rewritten line.
        file_fixes.sort_by(|a, b| {
            b.line
                .cmp(&a.line)
                .then_with(|| tie_rank(a.kind).cmp(&tie_rank(b.kind)))
        });
        apply_file(&path, file_fixes, &mut result);
    }

    result
}

fn tie_rank(kind: FixKind) -> u8 {
    match kind {
        FixKind::Modify | FixKind::Remove => 0,
        FixKind::Add => 1,
    }
}

fn apply_file(path: &Path, fixes: Vec<Fix>, result: &mut FixResult) {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) => {
            let cause = format!("read failed: {e}");
            result.errors.extend(fixes.into_iter().map(|fix| FixError {
                fix,
                cause: cause.clone(),
            }));
            return;
        }
    };

    let leader = FileClass::detect(path)
        .unwrap_or(FileClass::Python)
        .comment_leader();
    let had_trailing_newline = content.ends_with('\n');
    let mut lines: Vec<String> = content.lines().map(|l| l.to_string()).collect();

    let mut staged = Vec::new();
    for fix in fixes {
        match apply_one(&mut lines, &fix, leader) {
            Ok(()) => staged.push(fix),
            Err(cause) => result.errors.push(FixError { fix, cause }),
        }
    }

    if staged.is_empty() {
        return;
    }

    let mut output = lines.join("\n");
    if had_trailing_newline {
        output.push('\n');
    }

    match fs::write(path, output) {
        Ok(()) => result.applied.append(&mut staged),
        Err(e) => {
            // Nothing landed on disk, so the staged fixes were not applied.
            let cause = format!("write failed: {e}");
            result.errors.extend(staged.into_iter().map(|fix| FixError {
                fix,
                cause: cause.clone(),
            }));
        }
    }
}

fn apply_one(lines: &mut Vec<String>, fix: &Fix, leader: &str) -> Result<(), String> {
    let Some(code) = fix.code.as_deref() else {
        return Err("fix carries no replacement text".to_string());
    };
    if fix.line == 0 || fix.line > lines.len() {
        return Err(format!(
            "line {} out of range (file has {} lines)",
            fix.line,
            lines.len()
        ));
    }

    let idx = fix.line - 1;
    let indent: String = lines[idx]
        .chars()
        .take_while(|c| c.is_whitespace())
        .collect();
    // The annotation marks machine edits so a re-scan can tell them from
    // hand-written code.
    let annotated = format!("{indent}{code}  {leader} ai-medic fix: {}", fix.issue);

    match fix.kind {
        FixKind::Add => lines.insert(idx, annotated),
        FixKind::Modify => lines[idx] = annotated,
        FixKind::Remove => return Err("remove fixes are not supported".to_string()),
    }

    Ok(())
}
