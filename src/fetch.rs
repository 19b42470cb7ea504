// src/fetch.rs
// =============================================================================
// Validates the target URL and downloads the page to analyze.
//
// Only absolute http/https URLs with a host are accepted. The fetch must
// return 200 OK; any other status becomes a FetchFailure carrying the
// status reason ("Not Found", "Internal Server Error", ...).
// =============================================================================

use reqwest::{Client, StatusCode};
use std::time::Duration;
use tokio::time::{timeout_at, Instant};
use url::Url;

use crate::error::{AnalysisError, AnalysisOutcome};

/// Builds the client used for page fetches.
pub fn page_client(timeout: Duration) -> reqwest::Result<Client> {
    Client::builder().timeout(timeout).build()
}

/// Parses and checks the target URL.
pub fn validate_target(raw: &str) -> AnalysisOutcome<Url> {
    let invalid = || AnalysisError::InvalidUrl {
        url: raw.to_string(),
    };

    let url = Url::parse(raw.trim()).map_err(|_| invalid())?;
    if !matches!(url.scheme(), "http" | "https") || !url.has_host() {
        return Err(invalid());
    }
    Ok(url)
}

/// Fetches a web page and returns its HTML content.
pub async fn fetch_page(client: &Client, url: &Url, deadline: Instant) -> AnalysisOutcome<String> {
    let response = timeout_at(deadline, client.get(url.as_str()).send())
        .await
        .map_err(|_| AnalysisError::FetchFailure("Request timed out".to_string()))??;

    let status = response.status();
    if status != StatusCode::OK {
        let reason = status
            .canonical_reason()
            .map(str::to_string)
            .unwrap_or_else(|| format!("HTTP {}", status.as_u16()));
        return Err(AnalysisError::FetchFailure(reason));
    }

    timeout_at(deadline, response.text())
        .await
        .map_err(|_| AnalysisError::FetchFailure("Request timed out".to_string()))?
        .map_err(|_| AnalysisError::FetchFailure("Failed to read response body".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::serve;
    use axum::{http::StatusCode as AxumStatus, response::Html, routing::get, Router};

    #[test]
    fn test_validate_accepts_http_and_https() {
        assert!(validate_target("http://example.com").is_ok());
        assert!(validate_target("https://example.com/path?q=1").is_ok());
    }

    #[test]
    fn test_validate_rejects_everything_else() {
        for raw in ["", "example.com", "/relative", "ftp://example.com", "mailto:a@b.c", "http://"] {
            assert!(
                matches!(validate_target(raw), Err(AnalysisError::InvalidUrl { .. })),
                "{raw}"
            );
        }
    }

    async fn fixture() -> String {
        let app = Router::new()
            .route("/page", get(|| async { Html("<title>ok</title>") }))
            .route("/gone", get(|| async { AxumStatus::NOT_FOUND }));
        format!("http://{}", serve(app).await)
    }

    fn soon() -> Instant {
        Instant::now() + Duration::from_secs(5)
    }

    #[tokio::test]
    async fn test_fetch_returns_body() {
        let base = fixture().await;
        let client = page_client(Duration::from_secs(5)).unwrap();
        let url = validate_target(&format!("{base}/page")).unwrap();

        let body = fetch_page(&client, &url, soon()).await.unwrap();
        assert_eq!(body, "<title>ok</title>");
    }

    #[tokio::test]
    async fn test_fetch_non_200_is_failure_with_reason() {
        let base = fixture().await;
        let client = page_client(Duration::from_secs(5)).unwrap();
        let url = validate_target(&format!("{base}/gone")).unwrap();

        match fetch_page(&client, &url, soon()).await {
            Err(AnalysisError::FetchFailure(reason)) => assert_eq!(reason, "Not Found"),
            other => panic!("unexpected: {other:?}"),
        }
    }
}
