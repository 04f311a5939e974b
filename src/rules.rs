// SPDX-License-Identifier: PMPL-1.0-or-later

//! Detector rule tables shared by the structural and text analyzers
//!
//! Every radius, threshold, keyword list, and message template lives here
//! as a named parameter so boundary behavior can be pinned precisely in
//! tests. The analyzers evaluate these tables; they add no thresholds of
//! their own.

use crate::types::{Category, FileClass, Severity};
use once_cell::sync::Lazy;
use regex::Regex;

/// Retry loops at or below this bound are accepted; only excess is flagged
pub const MAX_RETRY_BOUND: u64 = 10;

/// String-repetition multipliers above this implicate prompt size
pub const MAX_PROMPT_MULTIPLIER: u64 = 100;

/// Character radius around a retry-loop match searched for retry vocabulary
pub const RETRY_WINDOW_RADIUS: usize = 200;

/// Window behind/ahead of a constant-sleep match; retry context usually
/// precedes the sleep, so the lookbehind is the larger span
pub const BACKOFF_WINDOW_BEFORE: usize = 300;
pub const BACKOFF_WINDOW_AFTER: usize = 100;

/// Forward span from a trigger searched for completion-call context
pub const FORWARD_WINDOW: usize = 500;

/// Keyword-argument names accepted as a token cap on a completion call
pub const TOKEN_CAP_KWARGS: &[&str] =
    &["max_tokens", "max_completion_tokens", "max_output_tokens"];

/// Keyword-argument names accepted as a request timeout
pub const TIMEOUT_KWARGS: &[&str] = &["timeout", "request_timeout"];

/// A resolved call name containing one of these is in scope for the
/// structural cost/streaming rules (case-insensitive)
pub const CALL_SCOPE_MARKERS: &[&str] = &["create", "chat"];

/// Model names expensive enough to warrant a cost guard
pub const EXPENSIVE_MODELS: &[&str] = &["gpt-4", "claude-opus", "claude-3-opus"];

/// Any of these anywhere in a file counts as cost awareness and
/// suppresses the expensive-model rule
pub const COST_GUARD_MARKERS: &[&str] = &["cost", "price"];

const PY_RETRY_KEYWORDS: &[&str] = &["retry", "attempt", "error", "except"];
const JS_RETRY_KEYWORDS: &[&str] = &["retry", "attempt", "error", "catch"];
const PY_BACKOFF_KEYWORDS: &[&str] = &["retry", "attempt", "ratelimiterror"];
const JS_BACKOFF_KEYWORDS: &[&str] = &["retry", "attempt", "ratelimit"];
const PROMPT_CONTEXT_KEYWORDS: &[&str] = &["create(", "messages"];

/// Gate evaluated against a call's supplied keyword arguments
#[derive(Debug, Clone, Copy)]
pub enum CallGate {
    /// Fires when none of these keyword arguments is supplied
    MissingKwarg(&'static [&'static str]),
    /// Fires when this keyword argument is supplied with a literal `True`
    KwargLiteralTrue(&'static str),
}

/// Structural rule applied to every in-scope call expression
#[derive(Debug, Clone, Copy)]
pub struct CallRule {
    pub issue: &'static str,
    pub category: Category,
    pub severity: Severity,
    pub gate: CallGate,
    pub message: &'static str,
    pub recommendation: &'static str,
}

/// How the keyword list corroborates a window-rule trigger match
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeywordGate {
    /// Emit only when at least one keyword appears in the window
    AnyPresent,
    /// Emit only when no keyword appears in the window
    AllAbsent,
}

/// Text rule: a trigger regex plus a bounded character window inspected
/// for corroborating (or disqualifying) keywords
pub struct WindowRule {
    pub issue: &'static str,
    pub category: Category,
    pub severity: Severity,
    pub trigger: Regex,
    pub window_before: usize,
    pub window_after: usize,
    /// Checked against the lowercased window per `gate`
    pub keywords: &'static [&'static str],
    pub gate: KeywordGate,
    /// Capture group 1 must be an integer strictly above this; a capture
    /// too wide for u64 counts as above
    pub min_capture: Option<u64>,
    /// `{n}` is replaced with capture group 1 when present
    pub message: &'static str,
    pub recommendation: &'static str,
}

/// File-scoped text rule: presence/absence predicates over the whole
/// file, attributed to the first line containing every anchor substring
pub struct FileRule {
    pub issue: &'static str,
    pub category: Category,
    pub severity: Severity,
    /// At least one must appear in the lowercased content (empty: no gate)
    pub requires_any: &'static [&'static str],
    /// All must appear in the lowercased content
    pub requires_all: &'static [&'static str],
    /// None may appear in the lowercased content
    pub forbids: &'static [&'static str],
    /// The finding lands on the first line containing all of these
    pub anchor: &'static [&'static str],
    pub message: &'static str,
    pub recommendation: &'static str,
}

/// Expensive-model rule: a quoted model name with no cost guard in sight
pub struct ModelRule {
    pub issue: &'static str,
    pub category: Category,
    pub severity: Severity,
    pub models: &'static [&'static str],
    pub guards: &'static [&'static str],
    /// `{model}` is replaced with the matched model name
    pub message: &'static str,
    pub recommendation: &'static str,
}

/// The complete rule table, grouped by analyzer and file class
pub struct RuleSet {
    call_rules: Vec<CallRule>,
    python_window: Vec<WindowRule>,
    javascript_window: Vec<WindowRule>,
    python_file: Vec<FileRule>,
    javascript_file: Vec<FileRule>,
    model_rule: ModelRule,
}

impl RuleSet {
    pub fn new() -> Self {
        Self {
            call_rules: Self::build_call_rules(),
            python_window: Self::build_python_window_rules(),
            javascript_window: Self::build_javascript_window_rules(),
            python_file: Self::build_python_file_rules(),
            javascript_file: Self::build_javascript_file_rules(),
            model_rule: Self::build_model_rule(),
        }
    }

    fn build_call_rules() -> Vec<CallRule> {
        vec![
            CallRule {
                issue: "missing-max-tokens",
                category: Category::Cost,
                severity: Severity::Warning,
                gate: CallGate::MissingKwarg(TOKEN_CAP_KWARGS),
                message: "API call without max_tokens can generate unbounded output",
                recommendation: "Set max_tokens to limit response length and cost",
            },
            CallRule {
                issue: "missing-timeout",
                category: Category::Streaming,
                severity: Severity::Warning,
                gate: CallGate::MissingKwarg(TIMEOUT_KWARGS),
                message: "API call without timeout can hang indefinitely",
                recommendation: "Add a timeout parameter (e.g. timeout=30)",
            },
            CallRule {
                issue: "streaming-without-timeout",
                category: Category::Streaming,
                severity: Severity::Warning,
                gate: CallGate::KwargLiteralTrue("stream"),
                message: "Streaming response without timeout can stall mid-stream",
                recommendation: "Set a timeout even for streaming calls",
            },
        ]
    }

    fn build_python_window_rules() -> Vec<WindowRule> {
        vec![
            WindowRule {
                issue: "too-many-retry-attempts",
                category: Category::Retries,
                severity: Severity::Error,
                trigger: regex(r"for\s+\w+\s+in\s+range\s*\(\s*(\d+)\s*\)"),
                window_before: RETRY_WINDOW_RADIUS,
                window_after: RETRY_WINDOW_RADIUS,
                keywords: PY_RETRY_KEYWORDS,
                gate: KeywordGate::AnyPresent,
                min_capture: Some(MAX_RETRY_BOUND),
                message: "Retry loop with {n} attempts can amplify an outage into a retry storm",
                recommendation: "Limit retries to 3-5 attempts with exponential backoff",
            },
            WindowRule {
                issue: "linear-backoff",
                category: Category::Retries,
                severity: Severity::Warning,
                trigger: regex(r"time\.sleep\s*\(\s*(\d+)\s*\)"),
                window_before: BACKOFF_WINDOW_BEFORE,
                window_after: BACKOFF_WINDOW_AFTER,
                keywords: PY_BACKOFF_KEYWORDS,
                gate: KeywordGate::AnyPresent,
                min_capture: None,
                message: "Constant sleep in a retry loop keeps hammering a rate-limited API",
                recommendation: "Use exponential backoff: sleep(min(2 ** attempt, 60))",
            },
            WindowRule {
                issue: "large-prompt-generation",
                category: Category::Cost,
                severity: Severity::Warning,
                trigger: regex(r#"["'].*?["'].*?\*\s*(\d+)"#),
                window_before: 0,
                window_after: FORWARD_WINDOW,
                keywords: PROMPT_CONTEXT_KEYWORDS,
                gate: KeywordGate::AnyPresent,
                min_capture: Some(MAX_PROMPT_MULTIPLIER),
                message: "String multiplication by {n} near an API call can produce a huge prompt",
                recommendation: "Validate prompt size before sending; truncate oversized input",
            },
        ]
    }

    fn build_javascript_window_rules() -> Vec<WindowRule> {
        vec![
            WindowRule {
                issue: "missing-max-tokens",
                category: Category::Cost,
                severity: Severity::Warning,
                trigger: regex(r"\.chat\.completions\.create\s*\("),
                window_before: 0,
                window_after: FORWARD_WINDOW,
                keywords: &["max_tokens", "maxtokens"],
                gate: KeywordGate::AllAbsent,
                min_capture: None,
                message: "API call without max_tokens can generate unbounded output",
                recommendation: "Set max_tokens to limit response length and cost",
            },
            WindowRule {
                issue: "missing-timeout",
                category: Category::Streaming,
                severity: Severity::Warning,
                trigger: regex(r"\.chat\.completions\.create\s*\("),
                window_before: 0,
                window_after: FORWARD_WINDOW,
                keywords: &["timeout"],
                gate: KeywordGate::AllAbsent,
                min_capture: None,
                message: "API call without timeout can hang indefinitely",
                recommendation: "Pass a timeout in the client or request options",
            },
            WindowRule {
                issue: "too-many-retry-attempts",
                category: Category::Retries,
                severity: Severity::Error,
                trigger: regex(r"for\s*\(\s*let\s+\w+\s*=\s*0\s*;\s*\w+\s*<\s*(\d+)"),
                window_before: RETRY_WINDOW_RADIUS,
                window_after: RETRY_WINDOW_RADIUS,
                keywords: JS_RETRY_KEYWORDS,
                gate: KeywordGate::AnyPresent,
                min_capture: Some(MAX_RETRY_BOUND),
                message: "Retry loop with {n} attempts can amplify an outage into a retry storm",
                recommendation: "Limit retries to 3-5 attempts with exponential backoff",
            },
            WindowRule {
                issue: "linear-backoff",
                category: Category::Retries,
                severity: Severity::Warning,
                trigger: regex(r"setTimeout\s*\([^,]+,\s*(\d+)\s*\)"),
                window_before: BACKOFF_WINDOW_BEFORE,
                window_after: BACKOFF_WINDOW_AFTER,
                keywords: JS_BACKOFF_KEYWORDS,
                gate: KeywordGate::AnyPresent,
                min_capture: None,
                message: "Constant setTimeout delay in a retry loop keeps hammering the API",
                recommendation: "Use exponential backoff: Math.min(2 ** attempt * 1000, 32000)",
            },
        ]
    }

    fn build_python_file_rules() -> Vec<FileRule> {
        vec![
            FileRule {
                issue: "missing-idempotency-key",
                category: Category::Traceability,
                severity: Severity::Warning,
                requires_any: &["chat.completions.create", "completions.create"],
                requires_all: &[],
                forbids: &["idempotency"],
                anchor: &["create("],
                message: "API calls without idempotency keys can duplicate requests on retry",
                recommendation: "Add an idempotency_key to prevent duplicate charges",
            },
            FileRule {
                issue: "no-request-id-tracking",
                category: Category::Traceability,
                severity: Severity::Info,
                requires_any: &[],
                requires_all: &["request", "create("],
                forbids: &["request-id", "request_id"],
                anchor: &["create("],
                message: "No request ID tracking found around API calls",
                recommendation: "Log response request IDs for debugging and support tickets",
            },
        ]
    }

    fn build_javascript_file_rules() -> Vec<FileRule> {
        vec![
            FileRule {
                issue: "missing-idempotency-key",
                category: Category::Traceability,
                severity: Severity::Warning,
                requires_any: &["completions.create"],
                requires_all: &[],
                forbids: &["idempotency"],
                anchor: &[".create("],
                message: "API calls without idempotency keys can duplicate requests on retry",
                recommendation: "Add an idempotency key header to prevent duplicate charges",
            },
            FileRule {
                issue: "streaming-without-error-handling",
                category: Category::Streaming,
                severity: Severity::Warning,
                requires_any: &["stream: true", "stream:true"],
                requires_all: &[],
                forbids: &["catch", "error"],
                anchor: &["stream", "true"],
                message: "Streaming response consumed without any error handling",
                recommendation: "Wrap stream processing in try/catch and handle partial output",
            },
        ]
    }

    fn build_model_rule() -> ModelRule {
        ModelRule {
            issue: "expensive-model-without-cost-estimation",
            category: Category::Cost,
            severity: Severity::Warning,
            models: EXPENSIVE_MODELS,
            guards: COST_GUARD_MARKERS,
            message: "Using expensive model {model} without any cost tracking",
            recommendation: "Estimate cost per request, or use a cheaper model in development",
        }
    }

    pub fn call_rules(&self) -> &[CallRule] {
        &self.call_rules
    }

    pub fn window_rules(&self, class: FileClass) -> &[WindowRule] {
        match class {
            FileClass::Python => &self.python_window,
            FileClass::JavaScript => &self.javascript_window,
        }
    }

    pub fn file_rules(&self, class: FileClass) -> &[FileRule] {
        match class {
            FileClass::Python => &self.python_file,
            FileClass::JavaScript => &self.javascript_file,
        }
    }

    pub fn model_rule(&self) -> &ModelRule {
        &self.model_rule
    }
}

impl Default for RuleSet {
    fn default() -> Self {
        Self::new()
    }
}

static RULES: Lazy<RuleSet> = Lazy::new(RuleSet::new);

/// Shared rule table, compiled once per process
pub fn rules() -> &'static RuleSet {
    &RULES
}

fn regex(pattern: &str) -> Regex {
    // Patterns are literals; a failure here is a programming error.
    Regex::new(pattern).unwrap()
}
