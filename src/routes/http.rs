// GET / — public service description

use axum::response::IntoResponse;

use crate::routes::auth::API_KEY_HEADER;

const NAME: &str = env!("CARGO_PKG_NAME");
const VERSION: &str = env!("CARGO_PKG_VERSION");

/// GET / — service name, version and endpoint overview. No authentication.
pub(super) async fn index_handler() -> impl IntoResponse {
    axum::Json(serde_json::json!({
        "message": "Welcome to the Screenshot API",
        "name": NAME,
        "version": VERSION,
        "endpoints": {
            "/upload": "POST - Upload a screenshot (multipart form)",
            "/data": "GET - Retrieve screenshot data with optional filters",
            "/image/{id}": "GET - Retrieve the raw image of one screenshot",
            "/stats": "GET - Retrieve statistics about screenshots",
        },
        "authentication": format!("Requires {} header with a valid API key", API_KEY_HEADER),
    }))
}
