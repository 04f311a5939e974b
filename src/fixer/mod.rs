// SPDX-License-Identifier: PMPL-1.0-or-later

//! Fix proposal
//!
//! A line-oriented rule set that inspects a forward window of lines from
//! each trigger line and proposes literal insertions or replacements.
//! Deliberately independent of the diagnosis rules: these favor safety of
//! the mechanical edit over recall, and the two sets must not be unified.

pub mod apply;

pub use apply::apply_fixes;

use crate::types::{Fix, FixKind};
use crate::walker;
use anyhow::Result;
use std::fs;
use std::path::{Path, PathBuf};

/// Forward lines searched for a satisfying token on completion-call rules
pub const FIX_FORWARD_WINDOW: usize = 15;

/// Forward lines searched for a buffering header after a streaming flag
pub const STREAM_FIX_WINDOW: usize = 10;

/// Lines of context either side of a constant sleep checked for retry
/// vocabulary
pub const SLEEP_CONTEXT_LINES: usize = 5;

/// How the satisfier list decides whether a triggered rule emits
#[derive(Debug, Clone, Copy)]
enum FixGate {
    /// Emit when no satisfier appears in the window (the fix is missing)
    TokenAbsent,
    /// Emit when a satisfier appears in the window (context confirms)
    TokenPresent,
}

/// One line-oriented remediation rule
struct LineFixRule {
    issue: &'static str,
    kind: FixKind,
    /// Every group must have at least one member present in the raw line
    trigger_all: &'static [&'static [&'static str]],
    /// Window bounds in lines; the trigger line itself is included
    window_before: usize,
    window_after: usize,
    /// Checked case-insensitively against the window per `gate`
    satisfiers: &'static [&'static str],
    gate: FixGate,
    suggestion: &'static str,
    code: &'static str,
}

const FIX_RULES: &[LineFixRule] = &[
    LineFixRule {
        issue: "streaming-buffering",
        kind: FixKind::Add,
        trigger_all: &[&["stream=True", "stream: true"]],
        window_before: 0,
        window_after: STREAM_FIX_WINDOW,
        satisfiers: &["x-accel-buffering"],
        gate: FixGate::TokenAbsent,
        suggestion: "Add X-Accel-Buffering header for proper streaming",
        code: "headers={\"X-Accel-Buffering\": \"no\"}",
    },
    LineFixRule {
        issue: "linear-backoff",
        kind: FixKind::Modify,
        trigger_all: &[&["sleep(1)"]],
        window_before: SLEEP_CONTEXT_LINES,
        window_after: SLEEP_CONTEXT_LINES,
        satisfiers: &["429", "retry"],
        gate: FixGate::TokenPresent,
        suggestion: "Use exponential backoff instead of a constant delay",
        code: "wait = min(1 * (2 ** attempt), 32)",
    },
    LineFixRule {
        issue: "missing-timeout",
        kind: FixKind::Add,
        trigger_all: &[
            &["client.chat", "openai.", "anthropic."],
            &[".create", "completions"],
        ],
        window_before: 0,
        window_after: FIX_FORWARD_WINDOW,
        satisfiers: &["timeout", "max_retries"],
        gate: FixGate::TokenAbsent,
        suggestion: "Add a timeout to prevent indefinite hangs",
        code: "timeout=60.0  # 60 seconds",
    },
    LineFixRule {
        issue: "missing-max-tokens",
        kind: FixKind::Add,
        trigger_all: &[&[".create", "completions"], &["messages", "prompt"]],
        window_before: 0,
        window_after: FIX_FORWARD_WINDOW,
        satisfiers: &["max_tokens"],
        gate: FixGate::TokenAbsent,
        suggestion: "Add max_tokens to control costs",
        code: "max_tokens=1000",
    },
    LineFixRule {
        issue: "missing-request-id",
        kind: FixKind::Add,
        trigger_all: &[&[".create", "completions"]],
        window_before: 0,
        window_after: FIX_FORWARD_WINDOW,
        satisfiers: &["x-request-id", "idempotency"],
        gate: FixGate::TokenAbsent,
        suggestion: "Add a request ID for tracing",
        code: "headers={\"x-request-id\": str(uuid.uuid4())}",
    },
];

pub struct Proposer {
    target: PathBuf,
}

impl Proposer {
    pub fn new(target: &Path) -> Result<Self> {
        if !target.exists() {
            anyhow::bail!("Target does not exist: {}", target.display());
        }

        Ok(Self {
            target: target.to_path_buf(),
        })
    }

    /// Walk the target and propose fixes for every trigger whose forward
    /// window lacks (or confirms) the satisfying token.
    pub fn propose(&self) -> Result<Vec<Fix>> {
        let mut fixes = Vec::new();

        for file in walker::collect(&self.target) {
            // The applier rewrites files as UTF-8, so only valid UTF-8
            // input is eligible for mechanical edits.
            let Ok(content) = fs::read_to_string(&file.path) else {
                continue;
            };
            propose_for_content(&content, &file.path, &mut fixes);
        }

        Ok(fixes)
    }
}

fn propose_for_content(content: &str, path: &Path, fixes: &mut Vec<Fix>) {
    let lines: Vec<&str> = content.lines().collect();

    for rule in FIX_RULES {
        for (i, line) in lines.iter().enumerate() {
            let triggered = rule
                .trigger_all
                .iter()
                .all(|group| group.iter().any(|t| line.contains(t)));
            if !triggered {
                continue;
            }

            let lo = i.saturating_sub(rule.window_before);
            let hi = (i + rule.window_after).min(lines.len());
            let window = lines[lo..hi].join("\n").to_lowercase();
            let satisfied = rule.satisfiers.iter().any(|t| window.contains(t));
            let emit = match rule.gate {
                FixGate::TokenAbsent => !satisfied,
                FixGate::TokenPresent => satisfied,
            };
            if emit {
                fixes.push(Fix {
                    file: path.to_path_buf(),
                    line: i + 1,
                    kind: rule.kind,
                    issue: rule.issue.to_string(),
                    suggestion: rule.suggestion.to_string(),
                    code: Some(rule.code.to_string()),
                });
            }
        }
    }
}

/// Propose fixes for a target with default options
pub fn propose<P: AsRef<Path>>(target: P) -> Result<Vec<Fix>> {
    Proposer::new(target.as_ref())?.propose()
}
