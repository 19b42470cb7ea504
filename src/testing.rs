// src/testing.rs
// Shared helpers for unit tests: local HTTP fixtures and probe stubs.

use async_trait::async_trait;
use axum::Router;
use std::collections::HashSet;
use std::net::SocketAddr;
use tokio::time::Instant;

use crate::analyzer::{LinkProbe, Reachability};

/// Serves `app` on an ephemeral local port and returns its address.
pub async fn serve(app: Router) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

/// Unreachable for every URL in the set, reachable otherwise.
pub struct DownList(pub HashSet<String>);

impl DownList {
    pub fn new<const N: usize>(urls: [&str; N]) -> Self {
        Self(urls.iter().map(|u| u.to_string()).collect())
    }
}

#[async_trait]
impl LinkProbe for DownList {
    async fn probe(&self, url: &str, _deadline: Instant) -> Reachability {
        tokio::task::yield_now().await;
        if self.0.contains(url) {
            Reachability::Unreachable
        } else {
            Reachability::Reachable
        }
    }
}

/// A probe that never answers.
pub struct NeverResponds;

#[async_trait]
impl LinkProbe for NeverResponds {
    async fn probe(&self, _url: &str, _deadline: Instant) -> Reachability {
        std::future::pending::<Reachability>().await
    }
}
