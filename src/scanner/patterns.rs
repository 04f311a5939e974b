// SPDX-License-Identifier: PMPL-1.0-or-later

//! Text pattern analysis
//!
//! Evaluates the windowed and file-scoped rule tables against raw file
//! content. Runs for every file class, including files the structural
//! parser rejected.

use crate::rules::{self, FileRule, KeywordGate, ModelRule, WindowRule};
use crate::types::{FileClass, Finding};

/// Run every text rule for `class` over `content`, attributing findings
/// to `rel_path`.
pub fn analyze(content: &str, class: FileClass, rel_path: &str) -> Vec<Finding> {
    let mut findings = Vec::new();
    let rules = rules::rules();
    let lines: Vec<&str> = content.lines().collect();
    let content_lower = content.to_lowercase();

    for rule in rules.window_rules(class) {
        apply_window_rule(rule, content, &lines, rel_path, &mut findings);
    }
    for rule in rules.file_rules(class) {
        apply_file_rule(rule, &content_lower, &lines, rel_path, &mut findings);
    }
    apply_model_rule(
        rules.model_rule(),
        content,
        &content_lower,
        &lines,
        rel_path,
        &mut findings,
    );

    findings
}

fn apply_window_rule(
    rule: &WindowRule,
    content: &str,
    lines: &[&str],
    rel_path: &str,
    findings: &mut Vec<Finding>,
) {
    for caps in rule.trigger.captures_iter(content) {
        let Some(m) = caps.get(0) else { continue };
        let digits = caps.get(1).map(|g| g.as_str());

        if let Some(threshold) = rule.min_capture {
            // The capture is all digits, so a failed parse can only be
            // overflow, and a bound that wide exceeds any threshold.
            let above = match digits.map(|d| d.parse::<u64>()) {
                Some(Ok(n)) => n > threshold,
                Some(Err(_)) => true,
                None => false,
            };
            if !above {
                continue;
            }
        }

        let window = window_around(
            content,
            m.start(),
            m.end(),
            rule.window_before,
            rule.window_after,
        )
        .to_lowercase();
        let gate_open = match rule.gate {
            KeywordGate::AnyPresent => rule.keywords.iter().any(|k| window.contains(k)),
            KeywordGate::AllAbsent => !rule.keywords.iter().any(|k| window.contains(k)),
        };
        if !gate_open {
            continue;
        }

        let line = line_of_offset(content, m.start());
        let message = match digits {
            Some(d) => rule.message.replace("{n}", d),
            None => rule.message.to_string(),
        };
        findings.push(Finding {
            file: rel_path.to_string(),
            line,
            category: rule.category,
            severity: rule.severity,
            issue: rule.issue.to_string(),
            message,
            recommendation: rule.recommendation.to_string(),
            code_snippet: snippet(lines, line),
        });
    }
}

fn apply_file_rule(
    rule: &FileRule,
    content_lower: &str,
    lines: &[&str],
    rel_path: &str,
    findings: &mut Vec<Finding>,
) {
    if !rule.requires_any.is_empty()
        && !rule.requires_any.iter().any(|k| content_lower.contains(k))
    {
        return;
    }
    if !rule.requires_all.iter().all(|k| content_lower.contains(k)) {
        return;
    }
    if rule.forbids.iter().any(|k| content_lower.contains(k)) {
        return;
    }

    // The condition holds for the whole file; one finding at the first
    // anchored line keeps the report free of duplicates.
    let Some((idx, line)) = lines
        .iter()
        .enumerate()
        .find(|(_, l)| rule.anchor.iter().all(|a| l.contains(a)))
    else {
        return;
    };

    findings.push(Finding {
        file: rel_path.to_string(),
        line: idx + 1,
        category: rule.category,
        severity: rule.severity,
        issue: rule.issue.to_string(),
        message: rule.message.to_string(),
        recommendation: rule.recommendation.to_string(),
        code_snippet: line.trim().to_string(),
    });
}

fn apply_model_rule(
    rule: &ModelRule,
    content: &str,
    content_lower: &str,
    lines: &[&str],
    rel_path: &str,
    findings: &mut Vec<Finding>,
) {
    if rule.guards.iter().any(|g| content_lower.contains(g)) {
        return;
    }

    for model in rule.models {
        let single = format!("'{model}'");
        let double = format!("\"{model}\"");
        if !content.contains(&single) && !content.contains(&double) {
            continue;
        }

        let Some((idx, line)) = lines
            .iter()
            .enumerate()
            .find(|(_, l)| l.contains(&single) || l.contains(&double))
        else {
            continue;
        };

        findings.push(Finding {
            file: rel_path.to_string(),
            line: idx + 1,
            category: rule.category,
            severity: rule.severity,
            issue: rule.issue.to_string(),
            message: rule.message.replace("{model}", model),
            recommendation: rule.recommendation.to_string(),
            code_snippet: line.trim().to_string(),
        });
    }
}

/// Slice `[start - before, end + after]` clamped to the content bounds
/// and to UTF-8 character boundaries
fn window_around(content: &str, start: usize, end: usize, before: usize, after: usize) -> &str {
    let mut lo = start.saturating_sub(before);
    while lo > 0 && !content.is_char_boundary(lo) {
        lo -= 1;
    }
    let mut hi = end.saturating_add(after).min(content.len());
    while hi < content.len() && !content.is_char_boundary(hi) {
        hi += 1;
    }
    &content[lo..hi]
}

fn line_of_offset(content: &str, offset: usize) -> usize {
    content.as_bytes()[..offset]
        .iter()
        .filter(|&&b| b == b'\n')
        .count()
        + 1
}

fn snippet(lines: &[&str], line: usize) -> String {
    lines
        .get(line.saturating_sub(1))
        .map(|l| l.trim().to_string())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_window_clamps_to_char_boundaries() {
        // Multibyte content right at the window edges must not panic.
        let content = "émoji 🦀 retry for attempt in range(20) 🦀 après";
        let m = content.find("range").expect("fixture contains range");
        let w = window_around(content, m, m + 5, 15, 15);
        assert!(w.contains("range"));
    }

    #[test]
    fn test_line_of_offset() {
        let content = "a\nb\nc\n";
        assert_eq!(line_of_offset(content, 0), 1);
        assert_eq!(line_of_offset(content, 2), 2);
        assert_eq!(line_of_offset(content, 4), 3);
    }

    #[test]
    fn test_retry_loop_needs_vocabulary() {
        // A plain numeric loop with no retry context stays quiet.
        let quiet = "for i in range(100):\n    total += i\n";
        assert!(analyze(quiet, FileClass::Python, "calc.py").is_empty());

        let noisy = "# retry on failure\nfor attempt in range(100):\n    call()\n";
        let findings = analyze(noisy, FileClass::Python, "retry.py");
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].issue, "too-many-retry-attempts");
        assert_eq!(findings[0].line, 2);
        assert!(findings[0].message.contains("100"));
    }

    #[test]
    fn test_retry_bound_wider_than_u64_still_flags() {
        // 20 digits does not fit in u64; the bound exceeds the limit
        // all the same.
        let content =
            "# retry on failure\nfor attempt in range(99999999999999999999):\n    call()\n";
        let findings = analyze(content, FileClass::Python, "retry.py");
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].issue, "too-many-retry-attempts");
        assert_eq!(findings[0].line, 2);
        assert!(findings[0].message.contains("99999999999999999999"));
    }
}
