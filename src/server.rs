//! HTTP service.
//!
//! Routes:
//! - `GET /health`
//! - `GET /search?author=&title=&start=&end=&page=` - one display page as JSON
//! - `GET /export?author=&title=&start=&end=` - CSV attachment
//! - `POST /save` - JSON array of records into the library

use crate::config::HarvestOptions;
use crate::error::HarvestError;
use crate::export;
use crate::filter::{paginate, DateRange, ResultPage, DEFAULT_PER_PAGE};
use crate::harvest::Harvester;
use crate::provider::SearchProvider;
use crate::record::ResearchRecord;
use crate::service::{collect_export, collect_listing, export_term, has_term};
use crate::store::RecordStore;
use axum::{
    extract::{Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::NaiveDate;
use serde::{de, Deserialize, Deserializer, Serialize};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{error, info};

/// Shared server state
pub struct AppState<P> {
    pub harvester: Harvester<P>,
    pub options: HarvestOptions,
    pub store: Arc<RecordStore>,
}

impl<P: SearchProvider> AppState<P> {
    pub fn new(harvester: Harvester<P>, options: HarvestOptions, store: RecordStore) -> Self {
        Self {
            harvester,
            options,
            store: Arc::new(store),
        }
    }
}

/// Build the application router
pub fn router<P: SearchProvider + 'static>(state: Arc<AppState<P>>) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/search", get(search_handler::<P>))
        .route("/export", get(export_handler::<P>))
        .route("/save", post(save_handler::<P>))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Health check endpoint
async fn health_handler() -> &'static str {
    "OK"
}

/// Query parameters shared by /search and /export
#[derive(Debug, Deserialize)]
struct QueryParams {
    author: Option<String>,
    title: Option<String>,
    #[serde(default, deserialize_with = "empty_as_none")]
    start: Option<NaiveDate>,
    #[serde(default, deserialize_with = "empty_as_none")]
    end: Option<NaiveDate>,
    #[serde(default = "default_page")]
    page: usize,
}

fn default_page() -> usize {
    1
}

/// Form-style `?start=` carries an empty value; treat it as unset.
fn empty_as_none<'de, D>(deserializer: D) -> std::result::Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => value.parse().map(Some).map_err(de::Error::custom),
    }
}

impl QueryParams {
    fn has_term(&self) -> bool {
        has_term(self.author.as_deref(), self.title.as_deref())
    }

    fn range(&self) -> DateRange {
        DateRange::new(self.start, self.end)
    }
}

/// Search response
#[derive(Serialize)]
struct SearchResponse<'a> {
    status: String,
    #[serde(flatten)]
    page: ResultPage<'a>,
}

/// Search endpoint handler
async fn search_handler<P: SearchProvider>(
    State(state): State<Arc<AppState<P>>>,
    Query(params): Query<QueryParams>,
) -> Response {
    info!(author = ?params.author, title = ?params.title, page = params.page, "Search request");

    if !params.has_term() {
        return Json(SearchResponse {
            status: "success".to_string(),
            page: paginate(&[], 1, DEFAULT_PER_PAGE),
        })
        .into_response();
    }

    let outcome = collect_listing(
        &state.harvester,
        params.author.as_deref(),
        params.title.as_deref(),
        &params.range(),
        &state.options,
    )
    .await;

    match outcome {
        Ok(records) => Json(SearchResponse {
            status: "success".to_string(),
            page: paginate(&records, params.page, DEFAULT_PER_PAGE),
        })
        .into_response(),
        Err(e) => {
            error!(error = %e, "Search failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(SearchResponse {
                    status: format!("error: {}", e),
                    page: paginate(&[], 1, DEFAULT_PER_PAGE),
                }),
            )
                .into_response()
        }
    }
}

/// CSV export endpoint handler
async fn export_handler<P: SearchProvider>(
    State(state): State<Arc<AppState<P>>>,
    Query(params): Query<QueryParams>,
) -> Response {
    if !params.has_term() {
        return (
            StatusCode::BAD_REQUEST,
            "Please provide either author name or title to export CSV.",
        )
            .into_response();
    }

    info!(author = ?params.author, title = ?params.title, "Export request");

    let csv = match collect_export(
        &state.harvester,
        params.author.as_deref(),
        params.title.as_deref(),
        &params.range(),
        &state.options,
    )
    .await
    .and_then(|records| export::to_csv_string(&records))
    {
        Ok(csv) => csv,
        Err(e) => {
            error!(error = %e, "Export failed");
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                "An error occurred while exporting CSV.",
            )
                .into_response();
        }
    };

    let term = export_term(params.author.as_deref(), params.title.as_deref());
    let disposition = format!(
        "attachment; filename*=UTF-8''{}",
        urlencoding::encode(&export::export_file_name(term))
    );

    (
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        csv,
    )
        .into_response()
}

/// Save endpoint handler
async fn save_handler<P: SearchProvider>(
    State(state): State<Arc<AppState<P>>>,
    Json(records): Json<Vec<ResearchRecord>>,
) -> Response {
    let store = Arc::clone(&state.store);
    let outcome = tokio::task::spawn_blocking(move || store.save(&records)).await;

    match outcome {
        Ok(Ok(summary)) => Json(summary).into_response(),
        Ok(Err(HarvestError::Validation(msg))) => (StatusCode::BAD_REQUEST, msg).into_response(),
        Ok(Err(e)) => {
            error!(error = %e, "Save failed");
            save_failed()
        }
        Err(e) => {
            error!(error = %e, "Save task failed");
            save_failed()
        }
    }
}

fn save_failed() -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        "An error occurred while saving data.",
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::scripted::{provider_failure, results, ScriptedProvider};
    use axum::body::{to_bytes, Body};
    use axum::http::{HeaderMap, Request};
    use serde_json::{json, Value};
    use tempfile::TempDir;
    use tower::ServiceExt;

    struct TestServer {
        state: Arc<AppState<ScriptedProvider>>,
        _dir: TempDir,
    }

    impl TestServer {
        fn new(pages: Vec<crate::Result<Value>>) -> Self {
            let dir = tempfile::tempdir().expect("temp dir");
            let store = RecordStore::with_path(dir.path().join("library.json"));
            let state = AppState::new(
                Harvester::new(ScriptedProvider::new(pages)),
                HarvestOptions { max_pages: 2, page_size: 10 },
                store,
            );
            Self {
                state: Arc::new(state),
                _dir: dir,
            }
        }

        async fn send(&self, request: Request<Body>) -> (StatusCode, HeaderMap, String) {
            let response = router(Arc::clone(&self.state))
                .oneshot(request)
                .await
                .expect("router is infallible");
            let status = response.status();
            let headers = response.headers().clone();
            let body = to_bytes(response.into_body(), usize::MAX)
                .await
                .expect("body");
            (status, headers, String::from_utf8_lossy(&body).into_owned())
        }

        async fn get(&self, uri: &str) -> (StatusCode, HeaderMap, String) {
            let request = Request::builder().uri(uri).body(Body::empty()).expect("request");
            self.send(request).await
        }

        async fn post_json(&self, uri: &str, body: Value) -> (StatusCode, HeaderMap, String) {
            let request = Request::builder()
                .method("POST")
                .uri(uri)
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .expect("request");
            self.send(request).await
        }

        fn queries(&self) -> Vec<String> {
            self.state.harvester.provider().queries()
        }
    }

    fn record_json(title: &str) -> Value {
        json!({
            "title": title,
            "author_names": "Y",
            "abstract_text": "B",
            "publication_date": "2020-01-01",
            "source_url": "Z"
        })
    }

    #[tokio::test]
    async fn test_health() {
        let server = TestServer::new(vec![]);
        let (status, _, body) = server.get("/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "OK");
    }

    #[tokio::test]
    async fn test_search_without_terms_is_empty_first_page() -> serde_json::Result<()> {
        let server = TestServer::new(vec![results(&["never"])]);

        let (status, _, body) = server.get("/search?page=4").await;

        assert_eq!(status, StatusCode::OK);
        let json: Value = serde_json::from_str(&body)?;
        assert_eq!(json["status"], "success");
        assert_eq!(json["current_page"], 1);
        assert_eq!(json["total_pages"], 1);
        assert_eq!(json["total_items"], 0);
        assert_eq!(json["results"], json!([]));
        assert!(server.queries().is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_search_with_empty_form_dates() -> serde_json::Result<()> {
        let server = TestServer::new(vec![results(&["Deep Learning", "Graph theory"])]);

        let (status, _, body) = server.get("/search?author=Y&title=deep&start=&end=").await;

        assert_eq!(status, StatusCode::OK);
        let json: Value = serde_json::from_str(&body)?;
        assert_eq!(json["total_items"], 1);
        assert_eq!(json["results"][0]["title"], "Deep Learning");
        assert_eq!(server.queries(), vec!["Y", "Y"]);
        Ok(())
    }

    #[tokio::test]
    async fn test_search_applies_start_date() -> serde_json::Result<()> {
        let server = TestServer::new(vec![Ok(json!({
            "organic_results": [
                {"title": "old", "publication_info": {"summary": "A - 2001"}},
                {"title": "new", "publication_info": {"summary": "A - 2021"}}
            ]
        }))]);

        let (status, _, body) = server.get("/search?title=q&start=2010-01-01&end=").await;

        assert_eq!(status, StatusCode::OK);
        let json: Value = serde_json::from_str(&body)?;
        assert_eq!(json["total_items"], 1);
        assert_eq!(json["results"][0]["title"], "new");
        Ok(())
    }

    #[tokio::test]
    async fn test_search_rejects_malformed_date() {
        let server = TestServer::new(vec![]);
        let (status, _, _) = server.get("/search?title=q&start=soon").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(server.queries().is_empty());
    }

    #[tokio::test]
    async fn test_search_provider_failure_is_500() -> serde_json::Result<()> {
        let server = TestServer::new(vec![provider_failure()]);

        let (status, _, body) = server.get("/search?title=q").await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        let json: Value = serde_json::from_str(&body)?;
        assert!(json["status"].as_str().is_some_and(|s| s.starts_with("error: ")));
        assert_eq!(json["total_items"], 0);
        Ok(())
    }

    #[tokio::test]
    async fn test_export_without_terms_is_400() {
        let server = TestServer::new(vec![results(&["never"])]);
        let (status, _, _) = server.get("/export?author=&title=%20").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(server.queries().is_empty());
    }

    #[tokio::test]
    async fn test_export_names_file_after_title() {
        let server = TestServer::new(vec![results(&["T"])]);

        let (status, headers, body) = server.get("/export?author=Hinton&title=Deep%20Learning").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            headers.get(header::CONTENT_TYPE).and_then(|v| v.to_str().ok()),
            Some("text/csv; charset=utf-8")
        );
        assert_eq!(
            headers.get(header::CONTENT_DISPOSITION).and_then(|v| v.to_str().ok()),
            Some("attachment; filename*=UTF-8''Deep_Learning_ResearchWorks.csv")
        );
        assert!(body.starts_with(export::CSV_HEADER));
        assert!(body.contains(r#""T","Unknown","No abstract available","","https://example.com/T""#));
        assert_eq!(server.queries(), vec!["Deep Learning", "Deep Learning", "Hinton"]);
    }

    #[tokio::test]
    async fn test_export_provider_failure_is_500() {
        let server = TestServer::new(vec![provider_failure()]);
        let (status, _, _) = server.get("/export?author=Hinton").await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn test_save_and_skip_duplicates() -> serde_json::Result<()> {
        let server = TestServer::new(vec![]);

        let (status, _, body) = server
            .post_json("/save", json!([record_json("A"), record_json("B")]))
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(serde_json::from_str::<Value>(&body)?, json!({"saved": 2, "skipped": 0}));

        let (_, _, body) = server.post_json("/save", json!([record_json("A")])).await;
        assert_eq!(serde_json::from_str::<Value>(&body)?, json!({"saved": 0, "skipped": 1}));
        assert_eq!(server.state.store.load().len(), 2);
        Ok(())
    }

    #[tokio::test]
    async fn test_save_empty_is_400() {
        let server = TestServer::new(vec![]);
        let (status, _, body) = server.post_json("/save", json!([])).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, "No research works provided to save");
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_save_requests_keep_every_record() {
        let server = Arc::new(TestServer::new(vec![]));

        let tasks: Vec<_> = (0..8)
            .map(|i| {
                let server = Arc::clone(&server);
                tokio::spawn(async move {
                    server
                        .post_json("/save", json!([record_json(&format!("T{}", i))]))
                        .await
                        .0
                })
            })
            .collect();

        for task in tasks {
            assert_eq!(task.await.expect("save task"), StatusCode::OK);
        }
        assert_eq!(server.state.store.load().len(), 8);
    }

    #[test]
    fn test_query_params_empty_dates_are_unset() -> serde_json::Result<()> {
        let params: QueryParams = serde_json::from_value(json!({"title": "q", "start": "", "end": " "}))?;
        assert_eq!(params.range(), DateRange::default());

        let params: QueryParams = serde_json::from_value(json!({"start": "2020-01-01"}))?;
        assert_eq!(params.start, NaiveDate::from_ymd_opt(2020, 1, 1));
        assert_eq!(params.end, None);
        assert_eq!(params.page, 1);

        assert!(serde_json::from_value::<QueryParams>(json!({"start": "2020-13-45"})).is_err());
        Ok(())
    }
}
