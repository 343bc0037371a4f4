// GET /data — filtered, paginated screenshot listing

use axum::{
    Json,
    extract::{Query, State},
};
use serde::Serialize;

use super::AppState;
use crate::config::QueryConfig;
use crate::error::ApiError;
use crate::models::Screenshot;
use crate::screenshot_repo::query::{
    DateBound, Filter, QueryError, ScreenshotQuery, Selection, SelectorParams, normalize_date,
};

#[derive(Debug, Serialize)]
pub struct DataResponse {
    pub data: Vec<Screenshot>,
    pub pagination: Pagination,
}

/// Shape depends on the selection mode that served the request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Pagination {
    Ids {
        ids: Vec<i64>,
    },
    LastN {
        last_n: u32,
    },
    IdRange {
        start_id: i64,
        end_id: i64,
        total: i64,
    },
    Pages {
        total: i64,
        page: u32,
        per_page: u32,
        pages: i64,
    },
}

impl Pagination {
    /// `total` is ignored by the id-list and last-n shapes, which do not report one.
    pub fn new(selection: &Selection, total: Option<i64>) -> Self {
        let total = total.unwrap_or_default();
        match selection {
            Selection::Ids(ids) => Pagination::Ids { ids: ids.clone() },
            Selection::LastN(n) => Pagination::LastN { last_n: *n },
            Selection::IdRange { start, end } => Pagination::IdRange {
                start_id: *start,
                end_id: *end,
                total,
            },
            Selection::Page { page, per_page } => {
                let per_page_i = *per_page as i64;
                Pagination::Pages {
                    total,
                    page: *page,
                    per_page: *per_page,
                    pages: (total + per_page_i - 1) / per_page_i,
                }
            }
        }
    }
}

/// Query string of `/data`, typed but not yet resolved into a selection mode.
#[derive(Debug, Default, PartialEq, Eq)]
struct DataParams {
    selectors: SelectorParams,
    filter: Filter,
    include_images: bool,
}

impl DataParams {
    /// Blank values count as absent; unknown keys are ignored.
    fn from_pairs(pairs: &[(String, String)]) -> Result<Self, QueryError> {
        let mut p = DataParams::default();
        for (key, value) in pairs {
            let value = value.trim();
            if value.is_empty() {
                continue;
            }
            match key.as_str() {
                "id" => p.selectors.ids.push(parse_int("id", value)?),
                "last_n" => p.selectors.last_n = Some(parse_int("last_n", value)?),
                "start_id" => p.selectors.start_id = Some(parse_int("start_id", value)?),
                "end_id" => p.selectors.end_id = Some(parse_int("end_id", value)?),
                "page" => p.selectors.page = Some(parse_int("page", value)?),
                "per_page" => p.selectors.per_page = Some(parse_int("per_page", value)?),
                "start_date" => {
                    p.filter.start_date = Some(normalize_date(value, DateBound::Start)?)
                }
                "end_date" => p.filter.end_date = Some(normalize_date(value, DateBound::End)?),
                "computer_name" => p.filter.computer_name = Some(value.to_string()),
                "location" => p.filter.location = Some(value.to_string()),
                "include_images" => {
                    p.include_images = matches!(
                        value.to_ascii_lowercase().as_str(),
                        "true" | "1" | "yes"
                    )
                }
                _ => {}
            }
        }
        Ok(p)
    }

    fn into_query(self, limits: &QueryConfig) -> Result<ScreenshotQuery, QueryError> {
        Ok(ScreenshotQuery {
            selection: Selection::resolve(&self.selectors, limits)?,
            filter: self.filter,
            include_images: self.include_images,
        })
    }
}

fn parse_int(name: &'static str, value: &str) -> Result<i64, QueryError> {
    value.parse().map_err(|_| QueryError::InvalidParam {
        name,
        expected: "an integer",
        value: value.to_string(),
    })
}

pub(super) async fn data_handler(
    State(state): State<AppState>,
    Query(pairs): Query<Vec<(String, String)>>,
) -> Result<Json<DataResponse>, ApiError> {
    let query = DataParams::from_pairs(&pairs)?.into_query(&state.config.query)?;
    let page = state.repo.query_page(&query).await?;
    tracing::debug!(
        rows = page.rows.len(),
        total = ?page.total,
        include_images = query.include_images,
        "data query served"
    );
    Ok(Json(DataResponse {
        pagination: Pagination::new(&query.selection, page.total),
        data: page.rows,
    }))
}
