use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::cors::CorsLayer;

pub mod handlers;
pub mod state;

pub use state::AppState;

pub fn create_app(state: AppState) -> Router {
    let cors = CorsLayer::permissive();

    Router::new()
        .route("/", get(handlers::root))
        .route("/news", get(handlers::list_news))
        .route("/summarize", post(handlers::summarize))
        .route("/categorize", post(handlers::categorize))
        .route("/sentiment", post(handlers::sentiment))
        .route("/refresh", post(handlers::refresh))
        .layer(cors)
        .with_state(Arc::new(state))
}

pub mod prelude {
    pub use crate::{create_app, AppState};
    pub use nd_core::{Article, Error, Result};
}
