// SQLite screenshot store. One append-only table; image bytes live in a BLOB column.

pub mod query;

use crate::models::{
    ComputerCount, GroupCount, LatestEntry, LocationCount, NewScreenshot, Screenshot, Stats,
    StoredImage,
};
use self::query::{BuiltQuery, ScreenshotQuery, Selection, SqlParam};
use sqlx::Row;
use sqlx::sqlite::{
    SqliteArguments, SqliteConnectOptions, SqliteConnection, SqlitePool, SqlitePoolOptions,
    SqliteRow,
};
use sqlx::{Sqlite, query::Query};
use std::path::Path;
use std::str::FromStr;
use tracing::instrument;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("database path: {0}")]
    Io(#[from] std::io::Error),
}

/// Columns `group_count` may aggregate on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupColumn {
    Location,
    ComputerName,
}

impl GroupColumn {
    fn as_sql(self) -> &'static str {
        match self {
            GroupColumn::Location => "location",
            GroupColumn::ComputerName => "computer_name",
        }
    }
}

/// Rows of one page plus the filter's total (independent of LIMIT/OFFSET).
/// `total` is only counted for selections that report it.
#[derive(Debug, Clone)]
pub struct QueryPage {
    pub rows: Vec<Screenshot>,
    pub total: Option<i64>,
}

pub struct ScreenshotRepo {
    pool: SqlitePool,
}

impl ScreenshotRepo {
    /// Connect to SQLite at `path`, create parent dir and DB if missing, enable WAL + pragmas.
    pub async fn connect(path: &str, max_pool_size: u32) -> Result<Self, StoreError> {
        if let Some(parent) = Path::new(path).parent() {
            std::fs::create_dir_all(parent)?;
        }
        let opts = SqliteConnectOptions::from_str(&format!("sqlite:{}", path))?
            .create_if_missing(true)
            .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal)
            .busy_timeout(std::time::Duration::from_secs(5))
            .synchronous(sqlx::sqlite::SqliteSynchronous::Normal);
        let pool = SqlitePoolOptions::new()
            .max_connections(max_pool_size)
            .connect_with(opts)
            .await?;
        Ok(Self { pool })
    }

    pub async fn init(&self) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS screenshots (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                computer_name TEXT NOT NULL,
                system TEXT NOT NULL,
                processor TEXT NOT NULL,
                public_ip TEXT NOT NULL,
                location TEXT NOT NULL,
                image_file BLOB,
                content_type TEXT,
                timestamp TEXT NOT NULL DEFAULT (strftime('%Y-%m-%d %H:%M:%f', 'now'))
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        for ddl in [
            "CREATE INDEX IF NOT EXISTS idx_screenshots_timestamp ON screenshots(timestamp)",
            "CREATE INDEX IF NOT EXISTS idx_screenshots_computer ON screenshots(computer_name)",
            "CREATE INDEX IF NOT EXISTS idx_screenshots_location ON screenshots(location)",
        ] {
            sqlx::query(ddl).execute(&self.pool).await?;
        }

        Ok(())
    }

    #[instrument(
        skip(self, new),
        fields(
            repo = "screenshots",
            operation = "insert",
            computer_name = %new.computer_name,
            image_bytes = new.image.as_ref().map_or(0, |i| i.bytes.len())
        )
    )]
    pub async fn insert(&self, new: &NewScreenshot) -> Result<i64, StoreError> {
        let (image, content_type) = match &new.image {
            Some(img) => (Some(img.bytes.as_slice()), Some(img.content_type.as_str())),
            None => (None, None),
        };
        let r = sqlx::query(
            "INSERT INTO screenshots (computer_name, system, processor, public_ip, location, image_file, content_type)
             VALUES ($1, $2, $3, $4, $5, $6, $7)",
        )
        .bind(&new.computer_name)
        .bind(&new.system)
        .bind(&new.processor)
        .bind(&new.public_ip)
        .bind(&new.location)
        .bind(image)
        .bind(content_type)
        .execute(&self.pool)
        .await?;
        Ok(r.last_insert_rowid())
    }

    #[instrument(skip(self, q), fields(repo = "screenshots", operation = "select_many"))]
    pub async fn select_many(&self, q: &ScreenshotQuery) -> Result<Vec<Screenshot>, StoreError> {
        let mut conn = self.pool.acquire().await?;
        fetch_rows(&mut conn, &q.select_sql(), q.include_images).await
    }

    #[instrument(skip(self, q), fields(repo = "screenshots", operation = "count"))]
    pub async fn count(&self, q: &ScreenshotQuery) -> Result<i64, StoreError> {
        let mut conn = self.pool.acquire().await?;
        fetch_count(&mut conn, &q.count_sql()).await
    }

    /// Page and total read in one transaction so both see the same rows.
    #[instrument(skip(self, q), fields(repo = "screenshots", operation = "query_page"))]
    pub async fn query_page(&self, q: &ScreenshotQuery) -> Result<QueryPage, StoreError> {
        let mut tx = self.pool.begin().await?;
        let rows = fetch_rows(&mut tx, &q.select_sql(), q.include_images).await?;
        let total = if q.selection.reports_total() {
            Some(fetch_count(&mut tx, &q.count_sql()).await?)
        } else {
            None
        };
        tx.commit().await?;
        Ok(QueryPage { rows, total })
    }

    /// Image bytes for `id`. `None` when the id is unknown or the record was stored without an image.
    #[instrument(skip(self), fields(repo = "screenshots", operation = "select_image_by_id"))]
    pub async fn select_image_by_id(&self, id: i64) -> Result<Option<StoredImage>, StoreError> {
        let row = sqlx::query("SELECT image_file, content_type FROM screenshots WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        let Some(row) = row else {
            return Ok(None);
        };
        let bytes: Option<Vec<u8>> = row.try_get("image_file")?;
        let content_type: Option<String> = row.try_get("content_type")?;
        Ok(bytes.map(|bytes| StoredImage {
            bytes,
            content_type,
        }))
    }

    #[instrument(skip(self), fields(repo = "screenshots", operation = "group_count"))]
    pub async fn group_count(&self, column: GroupColumn) -> Result<Vec<GroupCount>, StoreError> {
        let mut conn = self.pool.acquire().await?;
        fetch_group_count(&mut conn, column).await
    }

    #[instrument(skip(self), fields(repo = "screenshots", operation = "latest_n"))]
    pub async fn latest_n(&self, n: u32) -> Result<Vec<Screenshot>, StoreError> {
        let mut conn = self.pool.acquire().await?;
        let q = ScreenshotQuery::new(Selection::LastN(n));
        fetch_rows(&mut conn, &q.select_sql(), false).await
    }

    /// Totals, groupings and the `latest` most recent entries from one snapshot.
    #[instrument(skip(self), fields(repo = "screenshots", operation = "stats"))]
    pub async fn stats(&self, latest: u32) -> Result<Stats, StoreError> {
        let mut tx = self.pool.begin().await?;
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM screenshots")
            .fetch_one(&mut *tx)
            .await?;
        let by_location = fetch_group_count(&mut tx, GroupColumn::Location).await?;
        let by_computer = fetch_group_count(&mut tx, GroupColumn::ComputerName).await?;
        let latest_rows = fetch_rows(
            &mut tx,
            &ScreenshotQuery::new(Selection::LastN(latest)).select_sql(),
            false,
        )
        .await?;
        tx.commit().await?;

        Ok(Stats {
            total_screenshots: total,
            by_location: by_location.into_iter().map(LocationCount::from).collect(),
            by_computer: by_computer.into_iter().map(ComputerCount::from).collect(),
            latest_entries: latest_rows
                .into_iter()
                .map(|s| LatestEntry {
                    id: s.id,
                    computer_name: s.computer_name,
                    location: s.location,
                    timestamp: s.timestamp,
                })
                .collect(),
        })
    }
}

fn bind_params<'q>(
    mut q: Query<'q, Sqlite, SqliteArguments<'q>>,
    params: &'q [SqlParam],
) -> Query<'q, Sqlite, SqliteArguments<'q>> {
    for p in params {
        q = match p {
            SqlParam::Int(i) => q.bind(*i),
            SqlParam::Text(s) => q.bind(s.as_str()),
        };
    }
    q
}

async fn fetch_rows(
    conn: &mut SqliteConnection,
    built: &BuiltQuery,
    with_image: bool,
) -> Result<Vec<Screenshot>, StoreError> {
    let rows = bind_params(sqlx::query(&built.sql), &built.params)
        .fetch_all(&mut *conn)
        .await?;
    let mut out = Vec::with_capacity(rows.len());
    for row in rows {
        out.push(parse_screenshot_row(&row, with_image)?);
    }
    Ok(out)
}

async fn fetch_count(conn: &mut SqliteConnection, built: &BuiltQuery) -> Result<i64, StoreError> {
    let row = bind_params(sqlx::query(&built.sql), &built.params)
        .fetch_one(&mut *conn)
        .await?;
    Ok(row.try_get(0usize)?)
}

async fn fetch_group_count(
    conn: &mut SqliteConnection,
    column: GroupColumn,
) -> Result<Vec<GroupCount>, StoreError> {
    let col = column.as_sql();
    let sql = format!(
        "SELECT {col} AS value, COUNT(*) AS count FROM screenshots GROUP BY {col} ORDER BY count DESC, value ASC"
    );
    let rows = sqlx::query(&sql).fetch_all(&mut *conn).await?;
    let mut out = Vec::with_capacity(rows.len());
    for row in rows {
        out.push(GroupCount {
            value: row.try_get("value")?,
            count: row.try_get("count")?,
        });
    }
    Ok(out)
}

fn parse_screenshot_row(row: &SqliteRow, with_image: bool) -> Result<Screenshot, StoreError> {
    let image_file = if with_image {
        row.try_get("image_file")?
    } else {
        None
    };
    Ok(Screenshot {
        id: row.try_get("id")?,
        computer_name: row.try_get("computer_name")?,
        system: row.try_get("system")?,
        processor: row.try_get("processor")?,
        public_ip: row.try_get("public_ip")?,
        location: row.try_get("location")?,
        content_type: row.try_get("content_type")?,
        timestamp: row.try_get("timestamp")?,
        image_file,
    })
}
