// src/analyzer/mod.rs
// =============================================================================
// This module contains the page-analysis engine.
//
// Submodules:
// - document: parses HTML and extracts title, doctype, headings, hrefs
// - classify: internal vs external links (pure URL parsing)
// - probe: HEAD-request reachability check for external links
// - links: runs one probe task per external link and aggregates counts
//
// This file (mod.rs) is the module root - it ties everything together and
// defines the result record handed back to callers.
// =============================================================================

mod classify;
mod document;
mod links;
mod probe;

pub use document::{outline, Outline};
pub use links::{Completion, LinkAnalyzer, LinkCounts};
pub use probe::{HttpProbe, LinkProbe};

#[cfg(test)]
pub use document::FALLBACK_MARKUP_VERSION;
#[cfg(test)]
pub use probe::Reachability;

use serde::Serialize;
use std::collections::BTreeMap;

/// The outcome of analysing one page.
///
/// When `error` is set, every other field except `source_url` is left at
/// its zero value and must not be read as a finished analysis.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AnalysisResult {
    pub source_url: String,
    pub markup_version: String,
    pub title: String,
    pub heading_counts: BTreeMap<u8, usize>,
    pub internal_link_count: usize,
    pub external_link_count: usize,
    pub unreachable_link_count: usize,
    pub has_login_form: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl AnalysisResult {
    /// Builds a result from a finished outline and link tally.
    pub fn completed(source_url: impl Into<String>, outline: Outline, counts: LinkCounts) -> Self {
        Self {
            source_url: source_url.into(),
            markup_version: outline.metadata.markup_version,
            title: outline.metadata.title,
            heading_counts: outline.metadata.heading_counts,
            internal_link_count: counts.internal,
            external_link_count: counts.external,
            unreachable_link_count: counts.unreachable,
            has_login_form: outline.has_login_form,
            error: None,
        }
    }

    /// Builds an error result carrying only the URL and the message.
    pub fn failed(source_url: impl Into<String>, error: impl ToString) -> Self {
        Self {
            source_url: source_url.into(),
            error: Some(error.to_string()),
            ..Self::default()
        }
    }

    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }
}
