//! Read-only HTTP interface over the meal store.
//!
//! # Endpoints
//!
//! - `GET /`: the store as a JSON object, date → `[breakfast, lunch, dinner]`.
//!   With `?since=YYYY-MM-DD` (or `?since=today`) only that day and later.
//! - `GET /beautify`: the same selection as an HTML text listing.
//! - `GET /health`: health check.
//!
//! A `since` value that is not a date selects everything; bad query strings
//! never produce an error status.

use axum::{
    extract::{rejection::QueryRejection, Query, State},
    response::Html,
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::clock::Clock;
use crate::models::DateKey;
use crate::store::{MealSnapshot, SharedStore};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub store: SharedStore,
    /// Resolves `since=today`.
    pub clock: Arc<dyn Clock>,
}

/// Query parameters accepted by the listing endpoints.
#[derive(Debug, Default, Deserialize)]
pub struct SinceQuery {
    since: Option<String>,
}

/// Builds the router with request tracing.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(meals))
        .route("/beautify", get(beautify))
        .route("/health", get(health))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

/// Health check response
#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

async fn meals(
    State(state): State<AppState>,
    query: Result<Query<SinceQuery>, QueryRejection>,
) -> Json<MealSnapshot> {
    Json(select(&state, query).await)
}

async fn beautify(
    State(state): State<AppState>,
    query: Result<Query<SinceQuery>, QueryRejection>,
) -> Html<String> {
    Html(to_html_text(&select(&state, query).await.to_string()))
}

async fn select(state: &AppState, query: Result<Query<SinceQuery>, QueryRejection>) -> MealSnapshot {
    let since = match query {
        Ok(Query(q)) => q.since,
        Err(e) => {
            tracing::debug!("Ignoring malformed query string: {}", e);
            None
        }
    };

    let store = state.store.read().await;
    match since {
        None => store.snapshot(),
        Some(since) => store.range_from(resolve_since(&since, state.clock.as_ref())),
    }
}

/// `today` is the clock's date; anything else is parsed, with unparsable
/// input meaning epoch.
pub fn resolve_since(since: &str, clock: &dyn Clock) -> DateKey {
    if since == "today" {
        return DateKey::new(clock.today());
    }
    let parsed = DateKey::parse(since);
    if let Some(reason) = parsed.reason() {
        tracing::debug!("since falls back to epoch: {}", reason);
    }
    parsed.into_inner()
}

/// Escapes text for an HTML body, keeping spaces and line breaks visible.
pub fn to_html_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len() * 2);
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            ' ' => out.push_str("&nbsp;"),
            '\n' => out.push_str("<br>"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use crate::models::{MealBatch, MealRecord};
    use crate::store::MealStore;
    use axum::body::{to_bytes, Body};
    use axum::http::{header, Request, StatusCode};
    use tempfile::TempDir;
    use tokio::sync::RwLock;
    use tower::ServiceExt;

    fn key(s: &str) -> DateKey {
        DateKey::parse(s).into_inner()
    }

    async fn setup() -> (Router, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let clock: Arc<dyn Clock> = Arc::new(FixedClock(key("2024-01-09").date()));
        let mut store = MealStore::open(temp_dir.path().join("meals.json"), 30, Arc::clone(&clock))
            .unwrap()
            .into_inner();

        let batch: MealBatch = [
            ("2024-01-08", "toast"),
            ("2024-01-09", "rice & beans"),
            ("2024-01-10", "<b>soup</b>"),
        ]
        .iter()
        .map(|(k, dish)| (key(k), MealRecord::new(vec![dish.to_string()], vec![], vec![])))
        .collect();
        store.merge(batch).unwrap();

        let state = AppState {
            store: Arc::new(RwLock::new(store)),
            clock,
        };
        (router(state), temp_dir)
    }

    async fn get(app: Router, uri: &str) -> (StatusCode, String, Option<String>) {
        let response = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .map(|v| v.to_str().unwrap().to_string());
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, String::from_utf8(body.to_vec()).unwrap(), content_type)
    }

    #[tokio::test]
    async fn test_get_all() {
        let (app, _temp) = setup().await;
        let (status, body, _) = get(app, "/").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body,
            r#"{"2024-01-08":[["toast"],[],[]],"2024-01-09":[["rice & beans"],[],[]],"2024-01-10":[["<b>soup</b>"],[],[]]}"#
        );
    }

    #[tokio::test]
    async fn test_get_since_date() {
        let (app, _temp) = setup().await;
        let (_, body, _) = get(app, "/?since=2024-01-10").await;
        assert_eq!(body, r#"{"2024-01-10":[["<b>soup</b>"],[],[]]}"#);
    }

    #[tokio::test]
    async fn test_get_since_today() {
        let (app, _temp) = setup().await;
        let (_, body, _) = get(app, "/?since=today").await;
        let parsed: serde_json::Value = serde_json::from_str(&body).unwrap();
        let keys: Vec<&String> = parsed.as_object().unwrap().keys().collect();
        assert_eq!(keys, vec!["2024-01-09", "2024-01-10"]);
    }

    #[tokio::test]
    async fn test_get_since_garbage_returns_everything() {
        let (app, _temp) = setup().await;
        let (status, body, _) = get(app, "/?since=not-a-date").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("2024-01-08"));
        assert!(body.contains("2024-01-10"));
    }

    #[tokio::test]
    async fn test_get_since_with_padding_returns_everything() {
        let (app, _temp) = setup().await;
        let (status, body, _) = get(app, "/?since=%202024-01-10").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("2024-01-08"));
    }

    #[tokio::test]
    async fn test_duplicate_since_is_not_an_error() {
        let (app, _temp) = setup().await;
        let (status, _, _) = get(app, "/?since=2024-01-10&since=2024-01-08").await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_beautify_escapes() {
        let (app, _temp) = setup().await;
        let (status, body, content_type) = get(app, "/beautify?since=2024-01-09").await;

        assert_eq!(status, StatusCode::OK);
        assert!(content_type.unwrap().starts_with("text/html"));
        assert!(body.starts_with("2024-01-09:<br>"));
        assert!(body.contains("-&nbsp;rice&nbsp;&amp;&nbsp;beans<br>"));
        assert!(body.contains("&lt;b&gt;soup&lt;/b&gt;"));
        assert!(!body.contains("2024-01-08"));
    }

    #[tokio::test]
    async fn test_health() {
        let (app, _temp) = setup().await;
        let (status, body, _) = get(app, "/health").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains(r#""status":"ok""#));
    }

    #[test]
    fn test_to_html_text() {
        assert_eq!(to_html_text("a b\n<c>&"), "a&nbsp;b<br>&lt;c&gt;&amp;");
    }

    #[test]
    fn test_resolve_since() {
        let clock = FixedClock(key("2024-01-09").date());
        assert_eq!(resolve_since("today", &clock), key("2024-01-09"));
        assert_eq!(resolve_since("2024-01-01", &clock), key("2024-01-01"));
        assert_eq!(resolve_since("nope", &clock), DateKey::EPOCH);
        // Padded values are not dates, so they select everything.
        assert_eq!(resolve_since(" 2024-01-01", &clock), DateKey::EPOCH);
        assert_eq!(resolve_since("today ", &clock), DateKey::EPOCH);
    }
}
