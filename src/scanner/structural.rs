// SPDX-License-Identifier: PMPL-1.0-or-later

//! Structural analysis for the Python file class
//!
//! Parses with tree-sitter and walks every call expression, resolving the
//! callee's dotted name and the supplied keyword arguments. Files the
//! parser cannot handle fall through to text-pattern analysis only.

use crate::rules::{self, CallGate, CALL_SCOPE_MARKERS};
use crate::types::Finding;
use tree_sitter::{Node, Parser, Tree};

/// Callee expression shape, reduced to what dotted-name resolution needs
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallExpr {
    /// A bare name: `openai`
    Identifier(String),
    /// Attribute access: `<object>.name`
    Attribute { object: Box<CallExpr>, name: String },
    /// A call inside the chain: `factory().create` resolves through the
    /// inner callee
    Call(Box<CallExpr>),
}

/// Resolve a callee expression to its dotted name, segments joined
/// root-to-leaf: `client.chat.completions.create`.
pub fn dotted_name(expr: &CallExpr) -> String {
    match expr {
        CallExpr::Identifier(name) => name.clone(),
        CallExpr::Attribute { object, name } => {
            format!("{}.{}", dotted_name(object), name)
        }
        CallExpr::Call(inner) => dotted_name(inner),
    }
}

/// Whether a resolved call name is in scope for the cost/streaming rules.
/// Deliberately a substring heuristic, not call-target resolution.
pub fn in_scope(call_name: &str) -> bool {
    let lowered = call_name.to_lowercase();
    CALL_SCOPE_MARKERS.iter().any(|marker| lowered.contains(marker))
}

/// Run the structural rules over `source`, attributing findings to
/// `rel_path`. Returns no findings when the parser yields no tree.
pub fn analyze(source: &str, rel_path: &str) -> Vec<Finding> {
    let mut findings = Vec::new();
    let Some(tree) = parse(source) else {
        return findings;
    };

    let bytes = source.as_bytes();
    let lines: Vec<&str> = source.lines().collect();

    // Iterative pre-order walk; call expressions can nest arbitrarily.
    let mut cursor = tree.root_node().walk();
    let mut done = false;
    while !done {
        let node = cursor.node();
        if node.kind() == "call" {
            inspect_call(node, bytes, &lines, rel_path, &mut findings);
        }

        if cursor.goto_first_child() {
            continue;
        }
        loop {
            if cursor.goto_next_sibling() {
                break;
            }
            if !cursor.goto_parent() {
                done = true;
                break;
            }
        }
    }

    findings
}

fn parse(source: &str) -> Option<Tree> {
    let mut parser = Parser::new();
    parser
        .set_language(&tree_sitter_python::LANGUAGE.into())
        .ok()?;
    parser.parse(source, None)
}

fn inspect_call(
    node: Node,
    bytes: &[u8],
    lines: &[&str],
    rel_path: &str,
    findings: &mut Vec<Finding>,
) {
    let Some(callee) = node.child_by_field_name("function") else {
        return;
    };
    let Some(expr) = callee_expr(callee, bytes) else {
        return;
    };

    let call_name = dotted_name(&expr);
    if !in_scope(&call_name) {
        return;
    }

    let (kwargs, true_literals) = keyword_arguments(node, bytes);
    let line = node.start_position().row + 1;
    let snippet = lines
        .get(line - 1)
        .map(|l| l.trim().to_string())
        .unwrap_or_default();

    for rule in rules::rules().call_rules() {
        let fires = match rule.gate {
            CallGate::MissingKwarg(expects) => {
                !expects.iter().any(|name| kwargs.iter().any(|k| k == name))
            }
            CallGate::KwargLiteralTrue(name) => {
                true_literals.iter().any(|k| k == name)
            }
        };
        if fires {
            findings.push(Finding {
                file: rel_path.to_string(),
                line,
                category: rule.category,
                severity: rule.severity,
                issue: rule.issue.to_string(),
                message: rule.message.to_string(),
                recommendation: rule.recommendation.to_string(),
                code_snippet: snippet.clone(),
            });
        }
    }
}

fn callee_expr(node: Node, bytes: &[u8]) -> Option<CallExpr> {
    match node.kind() {
        "identifier" => Some(CallExpr::Identifier(node_text(node, bytes))),
        "attribute" => {
            let object = node.child_by_field_name("object")?;
            let name = node.child_by_field_name("attribute")?;
            Some(CallExpr::Attribute {
                object: Box::new(callee_expr(object, bytes)?),
                name: node_text(name, bytes),
            })
        }
        "call" => {
            let inner = node.child_by_field_name("function")?;
            Some(CallExpr::Call(Box::new(callee_expr(inner, bytes)?)))
        }
        // Subscripts, lambdas, and parenthesized callees carry no dotted
        // name worth resolving.
        _ => None,
    }
}

/// Names of all supplied keyword arguments, plus the subset whose value
/// is the literal `True`
fn keyword_arguments(call: Node, bytes: &[u8]) -> (Vec<String>, Vec<String>) {
    let mut names = Vec::new();
    let mut true_literals = Vec::new();

    let Some(args) = call.child_by_field_name("arguments") else {
        return (names, true_literals);
    };

    let mut cursor = args.walk();
    for child in args.children(&mut cursor) {
        if child.kind() != "keyword_argument" {
            continue;
        }
        let Some(name_node) = child.child_by_field_name("name") else {
            continue;
        };
        let name = node_text(name_node, bytes);
        if let Some(value) = child.child_by_field_name("value") {
            if value.kind() == "true" {
                true_literals.push(name.clone());
            }
        }
        names.push(name);
    }

    (names, true_literals)
}

fn node_text(node: Node, bytes: &[u8]) -> String {
    node.utf8_text(bytes).unwrap_or("").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ident(name: &str) -> CallExpr {
        CallExpr::Identifier(name.to_string())
    }

    fn attr(object: CallExpr, name: &str) -> CallExpr {
        CallExpr::Attribute {
            object: Box::new(object),
            name: name.to_string(),
        }
    }

    #[test]
    fn test_dotted_name_identifier() {
        assert_eq!(dotted_name(&ident("print")), "print");
    }

    #[test]
    fn test_dotted_name_attribute_chain() {
        let expr = attr(attr(attr(ident("client"), "chat"), "completions"), "create");
        assert_eq!(dotted_name(&expr), "client.chat.completions.create");
    }

    #[test]
    fn test_dotted_name_resolves_through_call() {
        let expr = attr(CallExpr::Call(Box::new(ident("factory"))), "create");
        assert_eq!(dotted_name(&expr), "factory.create");
    }

    #[test]
    fn test_in_scope_is_case_insensitive() {
        assert!(in_scope("client.Chat.completions.Create"));
        assert!(in_scope("openai.ChatCompletion"));
        assert!(!in_scope("math.sqrt"));
        assert!(!in_scope("os.path.join"));
    }

    #[test]
    fn test_analyze_flags_bare_call() {
        let findings = analyze("client.chat.completions.create(model=\"gpt-4o\")\n", "app.py");
        let issues: Vec<&str> = findings.iter().map(|f| f.issue.as_str()).collect();
        assert!(issues.contains(&"missing-max-tokens"));
        assert!(issues.contains(&"missing-timeout"));
        assert!(!issues.contains(&"streaming-without-timeout"));
    }

    #[test]
    fn test_analyze_accepts_guarded_call() {
        let findings = analyze(
            "client.chat.completions.create(model=\"gpt-4o\", max_tokens=500, timeout=30)\n",
            "app.py",
        );
        assert!(findings.is_empty(), "guarded call should produce nothing: {findings:?}");
    }

    #[test]
    fn test_analyze_out_of_scope_call_ignored() {
        let findings = analyze("math.sqrt(x)\nresults.append(x)\n", "app.py");
        assert!(findings.is_empty());
    }

    #[test]
    fn test_stream_true_adds_streaming_finding() {
        let findings = analyze(
            "client.chat.completions.create(model=\"gpt-4o\", stream=True)\n",
            "app.py",
        );
        let issues: Vec<&str> = findings.iter().map(|f| f.issue.as_str()).collect();
        assert!(issues.contains(&"streaming-without-timeout"));
        assert!(issues.contains(&"missing-timeout"));
    }

    #[test]
    fn test_stream_false_is_quiet() {
        let findings = analyze(
            "client.chat.completions.create(model=\"gpt-4o\", stream=False, max_tokens=10, timeout=5)\n",
            "app.py",
        );
        assert!(findings.is_empty());
    }
}
