// HTTP routes: public service description + API-key protected screenshot endpoints

pub mod auth;
mod data;
mod http;
mod image;
mod stats;
mod upload;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, post},
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::config::AppConfig;
use crate::screenshot_repo::ScreenshotRepo;

pub use data::{DataResponse, Pagination};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) repo: Arc<ScreenshotRepo>,
    pub(crate) config: Arc<AppConfig>,
}

pub fn app(repo: Arc<ScreenshotRepo>, config: AppConfig) -> Router {
    let body_limit = config.upload.max_body_bytes;
    let state = AppState {
        repo,
        config: Arc::new(config),
    };

    let protected = Router::new()
        .route(
            "/upload",
            post(upload::upload_handler).layer(DefaultBodyLimit::max(body_limit)),
        ) // POST /upload
        .route("/data", get(data::data_handler)) // GET /data
        .route("/image/{id}", get(image::image_handler)) // GET /image/{id}
        .route("/stats", get(stats::stats_handler)) // GET /stats
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth::require_api_key,
        ));

    Router::new()
        .route("/", get(http::index_handler)) // GET /
        .merge(protected)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::new().allow_origin(Any))
        .with_state(state)
}
