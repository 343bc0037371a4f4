// GET /stats — totals, per-location / per-computer counts, latest entries

use axum::{Json, extract::State};

use super::AppState;
use crate::error::ApiError;
use crate::models::Stats;

/// Number of entries reported in `latest_entries`.
const LATEST_ENTRIES: u32 = 5;

pub(super) async fn stats_handler(State(state): State<AppState>) -> Result<Json<Stats>, ApiError> {
    Ok(Json(state.repo.stats(LATEST_ENTRIES).await?))
}
