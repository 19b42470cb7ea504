// src/analyzer/links.rs
// =============================================================================
// Classifies every link on a page and probes the external ones concurrently.
//
// How it works:
// 1. Walk the hrefs in document order, classify each one
// 2. Internal links are just counted
// 3. External links are counted and get one spawned probe task each
// 4. Wait for every task, or stop early when the deadline fires or the
//    cancellation token is triggered
//
// The three counters are the only state shared between tasks. They are
// atomics, so a concurrent increment can never be lost. Tasks still in
// flight when the run stops are aborted and their results are not counted.
// A probe that only answers because the deadline cut it off is abandoned
// the same way, and the run is reported as timed out.
// =============================================================================

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::task::JoinSet;
use tokio::time::{sleep_until, Instant};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use super::classify::{classify, LinkKind};
use super::probe::{LinkProbe, Reachability};
use crate::progress::Reporter;

/// Final (or partial) link counts of one page.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LinkCounts {
    pub internal: usize,
    pub external: usize,
    pub unreachable: usize,
}

/// How a link analysis run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    /// Every probe finished; counts are exact.
    Finished,
    /// The deadline fired first; counts are best-effort.
    TimedOut,
    /// The cancellation token fired first; counts are best-effort.
    Cancelled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LinkTally {
    pub counts: LinkCounts,
    pub completion: Completion,
}

/// Verdict of one probe that answered before the deadline.
#[derive(Debug, Clone)]
pub struct LinkRecord {
    pub href: String,
    pub reachability: Reachability,
}

impl LinkRecord {
    fn is_unreachable(&self) -> bool {
        self.reachability == Reachability::Unreachable
    }
}

#[derive(Default)]
struct Counters {
    internal: AtomicUsize,
    external: AtomicUsize,
    unreachable: AtomicUsize,
    // probes that returned at or after the deadline; never part of the counts
    abandoned: AtomicUsize,
}

impl Counters {
    fn snapshot(&self) -> LinkCounts {
        LinkCounts {
            internal: self.internal.load(Ordering::Acquire),
            external: self.external.load(Ordering::Acquire),
            unreachable: self.unreachable.load(Ordering::Acquire),
        }
    }
}

pub struct LinkAnalyzer {
    probe: Arc<dyn LinkProbe>,
}

impl LinkAnalyzer {
    pub fn new(probe: Arc<dyn LinkProbe>) -> Self {
        Self { probe }
    }

    pub async fn analyze(
        &self,
        links: Vec<String>,
        deadline: Instant,
        cancel: &CancellationToken,
        reporter: &Reporter,
    ) -> LinkTally {
        let counters = Arc::new(Counters::default());
        let mut tasks = JoinSet::new();

        for href in links {
            reporter.emit(format!("Found link: {href}"));

            match classify(&href) {
                LinkKind::Internal => {
                    counters.internal.fetch_add(1, Ordering::AcqRel);
                    reporter.emit(format!("Internal link: {href}"));
                }
                LinkKind::External => {
                    counters.external.fetch_add(1, Ordering::AcqRel);
                    reporter.emit(format!("External link: {href}"));

                    let probe = Arc::clone(&self.probe);
                    let counters = Arc::clone(&counters);
                    let reporter = reporter.clone();
                    tasks.spawn(async move {
                        let reachability = probe.probe(&href, deadline).await;
                        if Instant::now() >= deadline {
                            counters.abandoned.fetch_add(1, Ordering::AcqRel);
                            debug!(%href, "probe outlived the deadline, not counted");
                            return;
                        }
                        let record = LinkRecord { href, reachability };
                        if record.is_unreachable() {
                            counters.unreachable.fetch_add(1, Ordering::AcqRel);
                            reporter.emit(format!("Inaccessible link: {}", record.href));
                        }
                        debug!(?record, "probe finished");
                    });
                }
            }
        }

        let completion = tokio::select! {
            biased;
            _ = drain(&mut tasks) => Completion::Finished,
            _ = cancel.cancelled() => Completion::Cancelled,
            _ = sleep_until(deadline) => Completion::TimedOut,
        };

        // The probes and the sleep above share one deadline, so drain can win
        // the tick in which every remaining probe was cut off.
        let completion = match completion {
            Completion::Finished if counters.abandoned.load(Ordering::Acquire) > 0 => {
                Completion::TimedOut
            }
            other => other,
        };

        if completion != Completion::Finished {
            // Abort the stragglers and wait for them to stop, so nothing
            // increments a counter after the snapshot below.
            tasks.shutdown().await;
        }

        LinkTally {
            counts: counters.snapshot(),
            completion,
        }
    }
}

async fn drain(tasks: &mut JoinSet<()>) {
    while let Some(joined) = tasks.join_next().await {
        if let Err(e) = joined {
            if e.is_panic() {
                warn!(error = %e, "probe task panicked");
            }
        }
    }
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. What is a JoinSet?
//    - A collection of spawned tasks that you can await as they finish
//    - join_next() returns the next finished task (in completion order)
//    - Dropping the set, or calling shutdown(), aborts the tasks still running
//
// 2. Why AtomicUsize instead of a plain usize?
//    - Probe tasks run on several threads at once
//    - fetch_add is a single indivisible read-modify-write, so two tasks
//      incrementing at the same moment both get counted
//    - Arc lets every task share the same counters
//
// 3. What does tokio::select! do?
//    - Waits on several futures and runs the branch of the first one to finish
//    - The other futures are dropped
//    - `biased;` checks the branches top to bottom instead of randomly
// -----------------------------------------------------------------------------
