// src/server/routes.rs
// =============================================================================
// HTTP handlers for the web front end.
//
// - GET  /         the form page
// - POST /analyze  runs one analysis, answers with the result as JSON
// - GET  /sse      live progress stream (server-sent events)
// =============================================================================

use axum::{
    extract::{Form, State},
    response::{
        sse::{Event, KeepAlive, Sse},
        Html,
    },
    Json,
};
use futures::stream::{Stream, StreamExt};
use serde::Deserialize;
use std::convert::Infallible;
use std::sync::Arc;
use tracing::debug;

use super::AppState;
use crate::analyzer::AnalysisResult;

const INDEX_PAGE: &str = include_str!("index.html");

pub async fn index() -> Html<&'static str> {
    Html(INDEX_PAGE)
}

#[derive(Debug, Deserialize)]
pub struct AnalyzeForm {
    // a missing field is treated like an empty URL, which fails validation
    #[serde(default)]
    url: String,
}

pub async fn analyze(
    State(state): State<Arc<AppState>>,
    Form(form): Form<AnalyzeForm>,
) -> Json<AnalysisResult> {
    // If the client goes away, axum drops this future and the probe tasks
    // are aborted with it. The child token covers server shutdown.
    let cancel = state.shutdown.child_token();
    let result = state
        .inspector
        .inspect(&form.url, &state.reporter, &cancel)
        .await;
    Json(result)
}

pub async fn progress_stream(
    State(state): State<Arc<AppState>>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let subscription = state.bus.subscribe();
    debug!(
        subscriber = ?subscription.id(),
        subscribers = state.bus.subscriber_count(),
        "progress stream opened"
    );

    let events = subscription
        .into_stream()
        .map(|event| Ok(Event::default().data(single_line(&event.message))));

    Sse::new(events).keep_alive(KeepAlive::default())
}

// Each SSE message is exactly one line
fn single_line(message: &str) -> String {
    message.replace(['\r', '\n'], " ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_line() {
        assert_eq!(single_line("Title: a\r\nb"), "Title: a  b");
        assert_eq!(single_line("plain"), "plain");
    }
}
