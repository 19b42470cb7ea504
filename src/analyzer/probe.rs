// src/analyzer/probe.rs
// =============================================================================
// This module checks if an external URL is alive.
//
// Key functionality:
// - Makes an HTTP HEAD request (headers only, no body download)
// - Reachable means the final status is exactly 200 OK
// - Anything else (404, 500, 201, DNS failure, TLS error, timeout) is
//   Unreachable. We deliberately don't tell these apart.
// - Never outlives the deadline it is given
//
// The probe sits behind a trait so the analyzer can be tested with stubs
// instead of the network.
// =============================================================================

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use std::time::Duration;
use tokio::time::{timeout_at, Instant};
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reachability {
    Reachable,
    Unreachable,
}

#[async_trait]
pub trait LinkProbe: Send + Sync {
    /// Checks `url`, giving up at `deadline`.
    async fn probe(&self, url: &str, deadline: Instant) -> Reachability;
}

/// HEAD-request probe backed by a shared reqwest client.
#[derive(Clone)]
pub struct HttpProbe {
    client: Client,
}

impl HttpProbe {
    /// `timeout` applies to each request on top of the caller's deadline.
    pub fn new(timeout: Duration) -> reqwest::Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .redirect(reqwest::redirect::Policy::limited(10))
            .build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl LinkProbe for HttpProbe {
    async fn probe(&self, url: &str, deadline: Instant) -> Reachability {
        match timeout_at(deadline, self.client.head(url).send()).await {
            Ok(Ok(response)) if response.status() == StatusCode::OK => Reachability::Reachable,
            Ok(Ok(response)) => {
                debug!(%url, status = response.status().as_u16(), "probe got non-200");
                Reachability::Unreachable
            }
            Ok(Err(e)) => {
                debug!(%url, error = %e, "probe failed");
                Reachability::Unreachable
            }
            Err(_) => {
                debug!(%url, "probe hit the deadline");
                Reachability::Unreachable
            }
        }
    }
}
