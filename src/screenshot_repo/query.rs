// SELECT / COUNT construction over `screenshots`.
// Only placeholders go into the SQL text; every client value travels as a SqlParam.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Timelike, Utc};

use crate::config::QueryConfig;

const BASE_COLUMNS: &str =
    "id, computer_name, system, processor, public_ip, location, content_type, timestamp";

/// Storage format of the `timestamp` column (matches SQLite `strftime('%Y-%m-%d %H:%M:%f')`).
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.3f";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SqlParam {
    Int(i64),
    Text(String),
}

/// SQL text plus its bind parameters, in placeholder order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuiltQuery {
    pub sql: String,
    pub params: Vec<SqlParam>,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum QueryError {
    #[error("{name} must be {expected}, got '{value}'")]
    InvalidParam {
        name: &'static str,
        expected: &'static str,
        value: String,
    },
    #[error("too many ids: {count} (max {max})")]
    TooManyIds { count: usize, max: usize },
    #[error("start_id and end_id must be given together")]
    IncompleteIdRange,
    #[error("start_id ({start}) must not exceed end_id ({end})")]
    InvertedIdRange { start: i64, end: i64 },
    #[error("at least one of id, last_n, start_id/end_id, page or per_page is required")]
    MissingSelector,
}

/// Which rows of the filtered set are returned. Exactly one mode applies per request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    Ids(Vec<i64>),
    LastN(u32),
    IdRange { start: i64, end: i64 },
    Page { page: u32, per_page: u32 },
}

/// Raw selector values from the request, before precedence and limits are applied.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectorParams {
    pub ids: Vec<i64>,
    pub last_n: Option<i64>,
    pub start_id: Option<i64>,
    pub end_id: Option<i64>,
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

impl SelectorParams {
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
            && self.last_n.is_none()
            && self.start_id.is_none()
            && self.end_id.is_none()
            && self.page.is_none()
            && self.per_page.is_none()
    }
}

impl Selection {
    /// Precedence: id list, then last_n, then id range, then page/per_page.
    pub fn resolve(params: &SelectorParams, limits: &QueryConfig) -> Result<Self, QueryError> {
        if limits.require_selector && params.is_empty() {
            return Err(QueryError::MissingSelector);
        }

        if !params.ids.is_empty() {
            let mut ids = Vec::with_capacity(params.ids.len());
            for id in &params.ids {
                if !ids.contains(id) {
                    ids.push(*id);
                }
            }
            if ids.len() > limits.max_ids {
                return Err(QueryError::TooManyIds {
                    count: ids.len(),
                    max: limits.max_ids,
                });
            }
            return Ok(Selection::Ids(ids));
        }

        if let Some(n) = params.last_n {
            if n < 0 {
                return Err(QueryError::InvalidParam {
                    name: "last_n",
                    expected: "a non-negative integer",
                    value: n.to_string(),
                });
            }
            let n = n.min(limits.max_per_page as i64) as u32;
            return Ok(Selection::LastN(n));
        }

        match (params.start_id, params.end_id) {
            (Some(start), Some(end)) => {
                if start > end {
                    return Err(QueryError::InvertedIdRange { start, end });
                }
                return Ok(Selection::IdRange { start, end });
            }
            (Some(_), None) | (None, Some(_)) => return Err(QueryError::IncompleteIdRange),
            (None, None) => {}
        }

        let page = params.page.unwrap_or(1);
        if page < 1 || page > u32::MAX as i64 {
            return Err(QueryError::InvalidParam {
                name: "page",
                expected: "a positive integer",
                value: page.to_string(),
            });
        }
        let per_page = params.per_page.unwrap_or(limits.default_per_page as i64);
        if per_page < 1 {
            return Err(QueryError::InvalidParam {
                name: "per_page",
                expected: "a positive integer",
                value: per_page.to_string(),
            });
        }
        let per_page = per_page.min(limits.max_per_page as i64) as u32;
        Ok(Selection::Page {
            page: page as u32,
            per_page,
        })
    }

    /// Whether responses in this mode report the filter's total row count.
    pub fn reports_total(&self) -> bool {
        matches!(self, Selection::IdRange { .. } | Selection::Page { .. })
    }

    fn limit_offset(&self) -> Option<(i64, Option<i64>)> {
        match self {
            Selection::LastN(n) => Some((*n as i64, None)),
            Selection::Page { page, per_page } => {
                let offset = (*page as i64 - 1) * (*per_page as i64);
                Some((*per_page as i64, Some(offset)))
            }
            Selection::Ids(_) | Selection::IdRange { .. } => None,
        }
    }
}

/// Row predicates that apply in every selection mode.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Filter {
    /// Normalized lower bound, see [`normalize_date`].
    pub start_date: Option<String>,
    /// Normalized upper bound, see [`normalize_date`].
    pub end_date: Option<String>,
    /// Substring of `computer_name`.
    pub computer_name: Option<String>,
    /// Substring of `location`.
    pub location: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScreenshotQuery {
    pub selection: Selection,
    pub filter: Filter,
    pub include_images: bool,
}

impl ScreenshotQuery {
    pub fn new(selection: Selection) -> Self {
        Self {
            selection,
            filter: Filter::default(),
            include_images: false,
        }
    }

    /// Row query: projection, predicate, newest first, then LIMIT/OFFSET for the paged modes.
    pub fn select_sql(&self) -> BuiltQuery {
        let (predicate, mut params) = self.predicate();
        let mut sql = format!("SELECT {}", BASE_COLUMNS);
        if self.include_images {
            sql.push_str(", image_file");
        }
        sql.push_str(" FROM screenshots");
        sql.push_str(&predicate);
        sql.push_str(" ORDER BY timestamp DESC, id DESC");
        match self.selection.limit_offset() {
            Some((limit, Some(offset))) => {
                sql.push_str(" LIMIT ? OFFSET ?");
                params.push(SqlParam::Int(limit));
                params.push(SqlParam::Int(offset));
            }
            Some((limit, None)) => {
                sql.push_str(" LIMIT ?");
                params.push(SqlParam::Int(limit));
            }
            None => {}
        }
        BuiltQuery { sql, params }
    }

    /// Same predicate and parameters as [`Self::select_sql`], no ordering or limits.
    pub fn count_sql(&self) -> BuiltQuery {
        let (predicate, params) = self.predicate();
        BuiltQuery {
            sql: format!("SELECT COUNT(*) FROM screenshots{}", predicate),
            params,
        }
    }

    /// " WHERE a AND b ..." (or empty) plus the matching parameters.
    fn predicate(&self) -> (String, Vec<SqlParam>) {
        let mut conditions: Vec<String> = Vec::new();
        let mut params = Vec::new();

        match &self.selection {
            Selection::Ids(ids) if ids.is_empty() => conditions.push("0".into()),
            Selection::Ids(ids) => {
                let placeholders = vec!["?"; ids.len()].join(", ");
                conditions.push(format!("id IN ({})", placeholders));
                params.extend(ids.iter().map(|id| SqlParam::Int(*id)));
            }
            Selection::IdRange { start, end } => {
                conditions.push("id BETWEEN ? AND ?".into());
                params.push(SqlParam::Int(*start));
                params.push(SqlParam::Int(*end));
            }
            Selection::LastN(_) | Selection::Page { .. } => {}
        }

        if let Some(start) = &self.filter.start_date {
            conditions.push("timestamp >= ?".into());
            params.push(SqlParam::Text(start.clone()));
        }
        if let Some(end) = &self.filter.end_date {
            conditions.push("timestamp <= ?".into());
            params.push(SqlParam::Text(end.clone()));
        }
        if let Some(name) = &self.filter.computer_name {
            conditions.push("computer_name LIKE ? ESCAPE '\\'".into());
            params.push(SqlParam::Text(contains_pattern(name)));
        }
        if let Some(location) = &self.filter.location {
            conditions.push("location LIKE ? ESCAPE '\\'".into());
            params.push(SqlParam::Text(contains_pattern(location)));
        }

        if conditions.is_empty() {
            (String::new(), params)
        } else {
            (format!(" WHERE {}", conditions.join(" AND ")), params)
        }
    }
}

/// `%needle%` with LIKE metacharacters escaped so they match literally.
fn contains_pattern(needle: &str) -> String {
    let mut out = String::with_capacity(needle.len() + 2);
    out.push('%');
    for c in needle.chars() {
        if matches!(c, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out.push('%');
    out
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateBound {
    Start,
    End,
}

/// Parse a client date/time into the stored timestamp format (UTC).
/// A bare date covers the whole day: 00:00:00.000 as a start bound, 23:59:59.999 as an end bound.
/// Likewise an end bound given to the second covers that whole second.
pub fn normalize_date(raw: &str, bound: DateBound) -> Result<String, QueryError> {
    let raw = raw.trim();
    let whole_second_end = bound == DateBound::End && !raw.contains('.');
    let parsed = DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc).naive_utc())
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f"))
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f"))
        .ok()
        .map(|dt| {
            if whole_second_end {
                dt.with_nanosecond(999_000_000).unwrap_or(dt)
            } else {
                dt
            }
        })
        .or_else(|| {
            let date = NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok()?;
            match bound {
                DateBound::Start => date.and_hms_milli_opt(0, 0, 0, 0),
                DateBound::End => date.and_hms_milli_opt(23, 59, 59, 999),
            }
        });

    match parsed {
        Some(dt) => Ok(dt.format(TIMESTAMP_FORMAT).to_string()),
        None => Err(QueryError::InvalidParam {
            name: match bound {
                DateBound::Start => "start_date",
                DateBound::End => "end_date",
            },
            expected: "a date (YYYY-MM-DD) or date-time (RFC 3339)",
            value: raw.to_string(),
        }),
    }
}
