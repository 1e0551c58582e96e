use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use nd_core::{Article, Sentiment};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{error, info};

use crate::AppState;

const DEFAULT_NEWS_LIMIT: usize = 20;

/// Store failures become a 500; inference failures never reach this type,
/// the annotator degrades them to fallback values instead.
pub struct ApiError(nd_core::Error);

impl From<nd_core::Error> for ApiError {
    fn from(e: nd_core::Error) -> Self {
        Self(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        error!("request failed: {}", self.0);
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": self.0.to_string() })),
        )
            .into_response()
    }
}

#[derive(Deserialize)]
pub struct NewsQuery {
    pub limit: Option<usize>,
}

#[derive(Deserialize)]
pub struct TextRequest {
    pub text: String,
}

#[derive(Serialize)]
pub struct SummaryResponse {
    pub summary: String,
}

#[derive(Serialize)]
pub struct CategoryResponse {
    pub category: String,
}

pub async fn root() -> impl IntoResponse {
    Json(json!({ "message": "Welcome to the newsdesk API!" }))
}

/// Latest enriched articles, newest first.
pub async fn list_news(
    State(state): State<Arc<AppState>>,
    Query(query): Query<NewsQuery>,
) -> Result<Json<Vec<Article>>, ApiError> {
    let limit = query.limit.unwrap_or(DEFAULT_NEWS_LIMIT);
    let articles = state.store.latest_enriched(limit).await?;
    Ok(Json(articles))
}

pub async fn summarize(
    State(state): State<Arc<AppState>>,
    Json(request): Json<TextRequest>,
) -> Json<SummaryResponse> {
    let summary = state.annotator.summarize(&request.text).await;
    Json(SummaryResponse { summary })
}

pub async fn categorize(
    State(state): State<Arc<AppState>>,
    Json(request): Json<TextRequest>,
) -> Json<CategoryResponse> {
    let category = state.annotator.categorize(&request.text).await;
    Json(CategoryResponse { category })
}

pub async fn sentiment(
    State(state): State<Arc<AppState>>,
    Json(request): Json<TextRequest>,
) -> Json<Sentiment> {
    Json(state.annotator.sentiment(&request.text).await)
}

/// Kick off a cycle without blocking the caller.
pub async fn refresh(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let pipeline = state.pipeline.clone();
    tokio::spawn(async move {
        match pipeline.run_cycle().await {
            Ok(report) => info!(
                "manual cycle done: {} ingested, {} enriched",
                report.ingested, report.enriched
            ),
            Err(e) => error!("manual cycle failed: {}", e),
        }
    });

    (
        StatusCode::ACCEPTED,
        Json(json!({ "message": "news refresh triggered" })),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::create_app;
    use axum::body::Body;
    use axum::http::{header, Request};
    use chrono::Utc;
    use http_body_util::BodyExt;
    use nd_core::ArticleStore;
    use nd_inference::models::HeuristicModel;
    use nd_inference::{Annotator, LazyModel};
    use nd_ingest::Pipeline;
    use nd_storage::MemoryStorage;
    use tower::ServiceExt;

    fn test_state() -> (Arc<dyn ArticleStore>, AppState) {
        let store: Arc<dyn ArticleStore> = Arc::new(MemoryStorage::new());
        let annotator =
            Annotator::new(Arc::new(LazyModel::from_model(Arc::new(HeuristicModel::new()))));
        let pipeline = Arc::new(Pipeline::new(store.clone(), annotator, vec![]));
        (store, AppState::new(pipeline))
    }

    fn json_post(uri: &str, body: serde_json::Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn body_json(response: axum::response::Response) -> serde_json::Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn root_greets() {
        let (_, state) = test_state();
        let response = create_app(state)
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert!(json["message"].as_str().unwrap().contains("newsdesk"));
    }

    #[tokio::test]
    async fn news_lists_only_enriched_articles() {
        let (store, state) = test_state();
        let mut article = Article::new("http://a", "T", "B", "s", Utc::now());
        store.insert_if_absent(&article).await.unwrap();
        article.url = "http://b".to_string();
        store.insert_if_absent(&article).await.unwrap();
        store
            .apply_enrichment("http://a", "summary", "World", &Sentiment::unknown())
            .await
            .unwrap();

        let response = create_app(state)
            .oneshot(Request::builder().uri("/news").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        let list = json.as_array().unwrap();
        assert_eq!(list.len(), 1);
        assert_eq!(list[0]["url"], "http://a");
    }

    #[tokio::test]
    async fn summarize_short_text_is_identity() {
        let (_, state) = test_state();
        let response = create_app(state)
            .oneshot(json_post("/summarize", json!({ "text": "A short note." })))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["summary"], "A short note.");
    }

    #[tokio::test]
    async fn sentiment_always_answers_with_label_and_score() {
        let (_, state) = test_state();
        let response = create_app(state)
            .oneshot(json_post("/sentiment", json!({ "text": "A great win." })))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert!(json["label"].is_string());
        assert!(json["score"].is_number());
    }

    #[tokio::test]
    async fn refresh_acks_without_waiting() {
        let (_, state) = test_state();
        let response = create_app(state)
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/refresh")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::ACCEPTED);
    }
}
