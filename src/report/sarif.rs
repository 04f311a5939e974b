// SPDX-License-Identifier: PMPL-1.0-or-later

//! SARIF 2.1.0 export
//!
//! Projects a `ScanReport` into the OASIS static-analysis interchange
//! format so findings land in code-review and security dashboards. Type
//! names follow the SARIF object vocabulary (reportingDescriptor,
//! physicalLocation); serialized key names are fixed by the standard.

use crate::types::{Finding, ScanReport, Severity};
use anyhow::Result;
use serde::Serialize;
use std::collections::HashSet;

const SARIF_SCHEMA: &str = "https://raw.githubusercontent.com/oasis-tcs/sarif-spec/main/sarif-2.1/schema/sarif-schema-2.1.0.json";
const SARIF_VERSION: &str = "2.1.0";

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SarifLog {
    #[serde(rename = "$schema")]
    pub schema: &'static str,
    pub version: &'static str,
    pub runs: Vec<Run>,
}

/// One tool invocation with its rule metadata and results
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Run {
    pub tool: Tool,
    pub results: Vec<SarifResult>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Tool {
    pub driver: Driver,
}

/// The scanner's identity plus one reusable descriptor per rule
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Driver {
    pub name: &'static str,
    pub version: &'static str,
    pub information_uri: &'static str,
    pub rules: Vec<ReportingDescriptor>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportingDescriptor {
    pub id: String,
    pub name: String,
    pub short_description: Text,
    pub default_configuration: ReportingConfiguration,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportingConfiguration {
    pub level: &'static str,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SarifResult {
    pub rule_id: String,
    pub level: &'static str,
    pub message: Text,
    pub locations: Vec<Location>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Text {
    pub text: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Location {
    pub physical_location: PhysicalLocation,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PhysicalLocation {
    pub artifact_location: ArtifactLocation,
    pub region: Region,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ArtifactLocation {
    pub uri: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Region {
    pub start_line: u32,
}

/// Stable per-issue rule identifiers. Consumers key suppressions and
/// dashboards on these, so they never change meaning once assigned.
fn rule_id(issue: &str) -> &'static str {
    match issue {
        "missing-max-tokens" => "AIM001",
        "missing-timeout" => "AIM002",
        "streaming-without-timeout" => "AIM003",
        "too-many-retry-attempts" => "AIM004",
        "linear-backoff" => "AIM005",
        "large-prompt-generation" => "AIM006",
        "expensive-model-without-cost-estimation" => "AIM007",
        "missing-idempotency-key" => "AIM008",
        "no-request-id-tracking" => "AIM009",
        "streaming-without-error-handling" => "AIM010",
        _ => "AIM000",
    }
}

fn sarif_level(severity: Severity) -> &'static str {
    match severity {
        Severity::Error => "error",
        Severity::Warning => "warning",
        // SARIF has no informational "result" level below note.
        Severity::Info => "note",
    }
}

fn descriptor(finding: &Finding) -> ReportingDescriptor {
    ReportingDescriptor {
        id: rule_id(&finding.issue).to_string(),
        name: finding.issue.clone(),
        short_description: Text {
            text: finding.recommendation.clone(),
        },
        default_configuration: ReportingConfiguration {
            level: sarif_level(finding.severity),
        },
    }
}

fn result_for(finding: &Finding) -> SarifResult {
    SarifResult {
        rule_id: rule_id(&finding.issue).to_string(),
        level: sarif_level(finding.severity),
        message: Text {
            text: finding.message.clone(),
        },
        locations: vec![Location {
            physical_location: PhysicalLocation {
                artifact_location: ArtifactLocation {
                    // SARIF URIs are forward-slashed regardless of host OS.
                    uri: finding.file.replace('\\', "/"),
                },
                region: Region {
                    start_line: finding.line as u32,
                },
            },
        }],
    }
}

/// Convert a scan report into a single-run SARIF log. Rule descriptors
/// are deduplicated by issue code, first occurrence wins.
pub fn to_sarif(report: &ScanReport) -> Result<SarifLog> {
    let mut seen = HashSet::new();
    let rules = report
        .findings
        .iter()
        .filter(|f| seen.insert(f.issue.clone()))
        .map(descriptor)
        .collect();
    let results = report.findings.iter().map(result_for).collect();

    Ok(SarifLog {
        schema: SARIF_SCHEMA,
        version: SARIF_VERSION,
        runs: vec![Run {
            tool: Tool {
                driver: Driver {
                    name: "ai-medic",
                    version: env!("CARGO_PKG_VERSION"),
                    information_uri: "https://github.com/hyperpolymath/ai-medic",
                    rules,
                },
            },
            results,
        }],
    })
}

/// Serialize a report as pretty-printed SARIF JSON
pub fn to_sarif_json(report: &ScanReport) -> Result<String> {
    Ok(serde_json::to_string_pretty(&to_sarif(report)?)?)
}
