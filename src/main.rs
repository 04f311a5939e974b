// SPDX-License-Identifier: PMPL-1.0-or-later

//! ai-medic: static risk triage and mechanical patching for AI API call sites
//!
//! A tool that scans Python and JavaScript sources for AI API usage that gets
//! expensive or undebuggable in production (unbounded generation, missing
//! timeouts, naive retries, untraceable requests) and proposes textual fixes.

use ai_medic::fixer;
use ai_medic::report::{self, ReportFormat, ReportFormatter};
use ai_medic::scanner;
use ai_medic::storage;
use ai_medic::types::CheckStatus;
use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "ai-medic")]
#[command(version = "1.1.0")]
#[command(about = "Static risk triage and mechanical patching for AI API call sites")]
#[command(long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Scan a source tree for risky AI API usage
    Scan {
        /// Target file or directory to scan
        #[arg(value_name = "TARGET")]
        target: PathBuf,

        /// Write the report to a file
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Serialization format for --output
        #[arg(short, long, value_enum, default_value = "json")]
        format: ReportFormat,

        /// Write a SARIF 2.1.0 report to a file
        #[arg(long)]
        sarif: Option<PathBuf>,

        /// Persist a timestamped report under the report directory
        #[arg(short, long)]
        save: bool,

        /// Report directory for --save (default: .ai-medic/reports)
        #[arg(long, value_name = "DIR")]
        report_dir: Option<PathBuf>,

        /// Verbose output (skipped files, parse diagnostics)
        #[arg(short, long)]
        verbose: bool,

        /// Suppress the findings list
        #[arg(short, long)]
        quiet: bool,
    },

    /// Propose mechanical fixes for scan findings
    Fix {
        /// Target file or directory to patch
        #[arg(value_name = "TARGET")]
        target: PathBuf,

        /// Write the proposed fixes into the files
        #[arg(short, long)]
        apply: bool,

        /// Write the fix results as JSON
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Re-render the most recently saved report
    Report {
        /// Report directory (default: .ai-medic/reports)
        #[arg(long, value_name = "DIR")]
        report_dir: Option<PathBuf>,

        /// Serialization format (default: terminal summary)
        #[arg(short, long, value_enum)]
        format: Option<ReportFormat>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Scan {
            target,
            output,
            format,
            sarif,
            save,
            report_dir,
            verbose,
            quiet,
        } => {
            println!("Scanning: {}", target.display());

            let scan_report = if verbose {
                scanner::scan_verbose(&target)?
            } else {
                scanner::scan(&target)?
            };

            if quiet {
                report::print_report_brief(&scan_report);
            } else {
                report::print_report(&scan_report);
            }

            if let Some(output_path) = output {
                report::save_report(&scan_report, &output_path, format)?;
            }

            if let Some(sarif_path) = sarif {
                report::save_sarif(&scan_report, &sarif_path)?;
            }

            if save {
                let stored = storage::persist_report(&scan_report, report_dir.as_deref())?;
                for path in &stored {
                    println!("Stored: {}", path.display());
                }
            }

            if scan_report.status == CheckStatus::Fail {
                std::process::exit(1);
            }
        }

        Commands::Fix {
            target,
            apply,
            output,
        } => {
            println!("Diagnosing fixable patterns in: {}", target.display());

            let fixes = fixer::propose(&target)?;
            let formatter = ReportFormatter::new();
            formatter.print_fixes(&fixes);

            let result = fixer::apply_fixes(fixes, !apply);
            if apply {
                formatter.print_fix_result(&result);
            } else if result.total() > 0 {
                println!(
                    "\nDry run: {} fixes would be applied. Re-run with --apply to write them.",
                    result.skipped.len()
                );
            }

            if let Some(output_path) = output {
                let json = serde_json::to_string_pretty(&result)?;
                std::fs::write(&output_path, json)?;
                println!("Fix results saved to: {}", output_path.display());
            }

            if !result.errors.is_empty() {
                std::process::exit(1);
            }
        }

        Commands::Report { report_dir, format } => {
            let stored = storage::latest_report(report_dir.as_deref())?;

            match format {
                Some(fmt) => println!("{}", fmt.serialize(&stored)?),
                None => report::print_report(&stored),
            }
        }
    }

    Ok(())
}
