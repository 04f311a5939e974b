// SPDX-License-Identifier: PMPL-1.0-or-later

//! ai-medic: static risk triage for AI API call sites.
//!
//! This crate scans Python and JavaScript sources for call patterns that
//! get expensive or undebuggable in production: unbounded token
//! generation, missing request timeouts, naive retry loops, and requests
//! that cannot be correlated across services.
//!
//! ENGINE PILLARS:
//! 1. **Scanner**: a syntax-tree walk over Python call sites plus a
//!    windowed text-pattern pass over every source file.
//! 2. **Rules**: one table of named thresholds, window radii and keyword
//!    lists shared by both analyzers.
//! 3. **Fixer**: a line-oriented fix proposer and a patch applier that
//!    edits files bottom-up so line numbers stay honest.

pub mod fixer;
pub mod report;
pub mod rules;
pub mod scanner;
pub mod storage;
pub mod types;
pub mod walker;
