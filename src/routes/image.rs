// GET /image/{id} — raw image bytes of one screenshot

use axum::{
    extract::{Path, State},
    http::{HeaderValue, header},
    response::IntoResponse,
};
use bytes::Bytes;

use super::AppState;
use crate::error::ApiError;
use crate::models::image_content_type;

const NOT_FOUND: &str = "Screenshot not found";

/// Returns the stored bytes with their recorded content type, sent with `nosniff`.
/// Non-numeric ids, unknown ids and records stored without an image all answer 404.
pub(super) async fn image_handler(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let id: i64 = raw_id.parse().map_err(|_| ApiError::NotFound(NOT_FOUND))?;
    let image = state
        .repo
        .select_image_by_id(id)
        .await?
        .ok_or(ApiError::NotFound(NOT_FOUND))?;

    let content_type = image
        .content_type
        .as_deref()
        .and_then(image_content_type)
        .and_then(|ct| HeaderValue::from_str(&ct).ok())
        .or_else(|| HeaderValue::from_str(&state.config.upload.default_content_type).ok())
        .unwrap_or_else(|| HeaderValue::from_static("application/octet-stream"));

    Ok((
        [
            (header::CONTENT_TYPE, content_type),
            (
                header::X_CONTENT_TYPE_OPTIONS,
                HeaderValue::from_static("nosniff"),
            ),
        ],
        Bytes::from(image.bytes),
    ))
}
