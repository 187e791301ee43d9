pub mod author;
pub mod book;
pub mod error;
pub mod filter;

pub use error::Error;

use sqlx::sqlite::SqlitePoolOptions;
use sqlx::Row as _;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::error::Result;

pub type ChosenDB = sqlx::Sqlite;
pub type ChosenRow = sqlx::sqlite::SqliteRow;
pub type Pool = sqlx::Pool<ChosenDB>;

/// Hard cap on rows returned by any unpaginated listing.
pub const MAX_LIMIT: usize = 10_000;

pub async fn new_pool(database_url: &str) -> Result<Pool, Error> {
    let pool = SqlitePoolOptions::new()
        .max_connections(50)
        .connect(database_url)
        .await?;
    Ok(pool)
}

#[derive(Debug, Clone)]
pub struct ListingParams {
    pub offset: i64,
    pub limit: i64,
}

impl Default for ListingParams {
    fn default() -> Self {
        Self {
            offset: 0,
            limit: MAX_LIMIT as i64,
        }
    }
}

impl ListingParams {
    pub fn new(offset: i64, limit: i64) -> Self {
        Self { offset, limit }
    }
}

/// One page of rows plus the total count of matching records.
#[derive(Debug, Clone)]
pub struct Batch<T> {
    pub offset: i64,
    pub total: u64,
    pub rows: Vec<T>,
}

/// Identifiers are stored as canonical 36-char hyphenated TEXT.
pub(crate) fn uuid_column(row: &ChosenRow, column: &str) -> Result<Uuid, sqlx::Error> {
    let raw: String = row.try_get(column)?;
    raw.parse().map_err(|e: uuid::Error| sqlx::Error::ColumnDecode {
        index: column.to_string(),
        source: Box::new(e),
    })
}

/// Timestamps are stored as unix seconds so range predicates stay numeric.
pub(crate) fn timestamp_column(row: &ChosenRow, column: &str) -> Result<OffsetDateTime, sqlx::Error> {
    let seconds: i64 = row.try_get(column)?;
    OffsetDateTime::from_unix_timestamp(seconds).map_err(|e| sqlx::Error::ColumnDecode {
        index: column.to_string(),
        source: Box::new(e),
    })
}
