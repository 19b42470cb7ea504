// src/inspect.rs
// =============================================================================
// The request-level analysis pipeline.
//
// What happens here:
// 1. Validate the target URL and fetch the page
// 2. Parse it and pull out metadata, hrefs and login-form presence
// 3. Classify every link and probe the external ones under one deadline
// 4. Assemble the AnalysisResult
//
// Every failure becomes an AnalysisResult with only `source_url` and
// `error` set. Observers always see "Starting analysis..." first and
// "Analysis completed." last, whatever happens in between.
// =============================================================================

use anyhow::Result;
use reqwest::Client;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::analyzer::{self, AnalysisResult, Completion, HttpProbe, LinkAnalyzer, LinkProbe};
use crate::config::Settings;
use crate::error::{AnalysisError, AnalysisOutcome};
use crate::fetch::{fetch_page, page_client, validate_target};
use crate::progress::Reporter;

pub struct Inspector {
    client: Client,
    links: LinkAnalyzer,
    page_budget: Duration,
}

impl Inspector {
    /// Builds an inspector that probes links over HTTP.
    pub fn new(settings: &Settings) -> Result<Self> {
        let probe = HttpProbe::new(settings.probe_timeout)?;
        Ok(Self::with_probe(
            page_client(settings.fetch_timeout)?,
            Arc::new(probe),
            settings.page_budget,
        ))
    }

    pub fn with_probe(client: Client, probe: Arc<dyn LinkProbe>, page_budget: Duration) -> Self {
        Self {
            client,
            links: LinkAnalyzer::new(probe),
            page_budget,
        }
    }

    /// Runs one full analysis of `raw_url`. Never fails: errors are
    /// reported through the result's `error` field.
    pub async fn inspect(
        &self,
        raw_url: &str,
        reporter: &Reporter,
        cancel: &CancellationToken,
    ) -> AnalysisResult {
        let started = Instant::now();
        reporter.emit("Starting analysis...");

        let result = match self.run(raw_url, started, reporter, cancel).await {
            Ok(result) => {
                info!(
                    url = %raw_url,
                    internal = result.internal_link_count,
                    external = result.external_link_count,
                    unreachable = result.unreachable_link_count,
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "analysis finished"
                );
                result
            }
            Err(e) => {
                warn!(url = %raw_url, error = %e, "analysis failed");
                reporter.emit(format!("Error: {e}"));
                AnalysisResult::failed(raw_url, e)
            }
        };

        reporter.emit("Analysis completed.");
        result
    }

    async fn run(
        &self,
        raw_url: &str,
        started: Instant,
        reporter: &Reporter,
        cancel: &CancellationToken,
    ) -> AnalysisOutcome<AnalysisResult> {
        let deadline = started + self.page_budget;
        let timed_out = || AnalysisError::AnalysisTimeout {
            elapsed_ms: started.elapsed().as_millis(),
        };

        let url = validate_target(raw_url)?;

        let body = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(timed_out()),
            body = fetch_page(&self.client, &url, deadline) => body?,
        };

        let mut outline = analyzer::outline(&body, reporter)?;
        drop(body);

        let links = std::mem::take(&mut outline.links);
        let tally = self.links.analyze(links, deadline, cancel, reporter).await;

        if tally.completion != Completion::Finished {
            let counts = tally.counts;
            reporter.emit(format!(
                "Analysis stopped early ({} internal, {} external, {} unreachable so far)",
                counts.internal, counts.external, counts.unreachable
            ));
            warn!(url = %raw_url, completion = ?tally.completion, ?counts, "link analysis incomplete");
            return Err(timed_out());
        }

        reporter.emit(format!("Contains login form: {}", outline.has_login_form));
        reporter.emit("Document analysis completed.");

        Ok(AnalysisResult::completed(raw_url, outline, tally.counts))
    }
}
