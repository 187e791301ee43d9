use garde::Validate;
use serde::{Deserialize, Serialize};
use sqlx::{QueryBuilder, Row as _};
use time::OffsetDateTime;
use tracing::debug;
use uuid::Uuid;

use crate::{
    author::AuthorShort, error::Result, filter::BookFilter, timestamp_column, uuid_column, Batch,
    ChosenRow, Error, ListingParams, Pool, MAX_LIMIT,
};

const LIST_SQL: &str = "SELECT b.id, b.title, b.isbn, b.publish_date, \
    b.author_id, a.first_name AS author_first_name, a.last_name AS author_last_name \
    FROM book b JOIN author a ON b.author_id = a.id";

#[derive(Debug, Serialize, Deserialize, Clone, Validate)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct CreateBook {
    #[garde(pattern(r"^[0-9a-fA-F-]{36}$"))]
    pub author_id: String,
    #[garde(length(min = 1, max = 255))]
    pub title: String,
    #[garde(pattern(r"^([0-9]{10}|[0-9]{13})$"))]
    pub isbn: String,
    /// Only bulk import supplies an explicit value; user saves get "now".
    #[serde(skip)]
    #[garde(skip)]
    pub publish_date: Option<OffsetDateTime>,
}

/// Partial update; title and ISBN only, absent or blank fields keep the
/// stored value.
#[derive(Debug, Serialize, Deserialize, Clone, Default, Validate)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct UpdateBook {
    #[garde(length(min = 1, max = 255))]
    pub title: Option<String>,
    #[garde(pattern(r"^([0-9]{10}|[0-9]{13})$"))]
    pub isbn: Option<String>,
}

#[derive(Debug, Serialize, Clone)]
pub struct Book {
    pub id: Uuid,
    pub title: String,
    pub isbn: String,
    pub publish_date: OffsetDateTime,
    pub author: AuthorShort,
}

impl sqlx::FromRow<'_, ChosenRow> for Book {
    fn from_row(row: &ChosenRow) -> Result<Self, sqlx::Error> {
        Ok(Book {
            id: uuid_column(row, "id")?,
            title: row.try_get("title")?,
            isbn: row.try_get("isbn")?,
            publish_date: timestamp_column(row, "publish_date")?,
            author: AuthorShort::from_row_prefixed(row)?,
        })
    }
}

pub struct BookRepository {
    pool: Pool,
}

impl BookRepository {
    pub fn new(pool: Pool) -> Self {
        Self { pool }
    }

    pub async fn get(&self, id: Uuid) -> Result<Book> {
        let mut query = QueryBuilder::new(LIST_SQL);
        query.push(" WHERE b.id = ").push_bind(id.to_string());
        let record = query
            .build_query_as::<Book>()
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| Error::RecordNotFound(format!("Book {id}")))?;
        Ok(record)
    }

    /// Resolves the author reference, then persists. The publish timestamp
    /// defaults to the current time unless the payload carries one.
    pub async fn create(&self, payload: CreateBook) -> Result<Book> {
        let author_id: Uuid = payload
            .author_id
            .parse()
            .map_err(|_| Error::InvalidId(format!("Author id {:?}", payload.author_id)))?;

        let author: Option<String> = sqlx::query_scalar("SELECT id FROM author WHERE id = ?")
            .bind(author_id.to_string())
            .fetch_optional(&self.pool)
            .await?;
        if author.is_none() {
            return Err(Error::RecordNotFound(format!("Author {author_id}")));
        }

        let id = Uuid::new_v4();
        let publish_date = payload.publish_date.unwrap_or_else(OffsetDateTime::now_utc);
        sqlx::query(
            "INSERT INTO book (id, author_id, title, isbn, publish_date) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(id.to_string())
        .bind(author_id.to_string())
        .bind(&payload.title)
        .bind(&payload.isbn)
        .bind(publish_date.unix_timestamp())
        .execute(&self.pool)
        .await
        .map_err(into_conflict)?;

        debug!("Created book {} ({})", id, payload.title);
        self.get(id).await
    }

    pub async fn update(&self, id: Uuid, payload: UpdateBook) -> Result<Book> {
        let record = self.get(id).await?;
        let title = payload
            .title
            .filter(|t| !t.trim().is_empty())
            .unwrap_or(record.title);
        let isbn = payload
            .isbn
            .filter(|i| !i.trim().is_empty())
            .unwrap_or(record.isbn);

        sqlx::query("UPDATE book SET title = ?, isbn = ? WHERE id = ?")
            .bind(&title)
            .bind(&isbn)
            .bind(id.to_string())
            .execute(&self.pool)
            .await
            .map_err(into_conflict)?;

        self.get(id).await
    }

    pub async fn delete(&self, id: Uuid) -> Result<()> {
        let res = sqlx::query("DELETE FROM book WHERE id = ?")
            .bind(id.to_string())
            .execute(&self.pool)
            .await?;

        if res.rows_affected() == 0 {
            Err(Error::RecordNotFound(format!("Book {id}")))
        } else {
            Ok(())
        }
    }

    /// Filtered page plus the total count of matching rows.
    pub async fn list(&self, filter: &BookFilter, params: ListingParams) -> Result<Batch<Book>> {
        let mut count_query = QueryBuilder::new("SELECT count(*) FROM book b");
        filter.apply(&mut count_query);
        let total = count_query
            .build_query_scalar::<i64>()
            .fetch_one(&self.pool)
            .await? as u64;

        let mut query = QueryBuilder::new(LIST_SQL);
        filter.apply(&mut query);
        query
            .push(" ORDER BY b.id LIMIT ")
            .push_bind(params.limit)
            .push(" OFFSET ")
            .push_bind(params.offset);
        let rows = query.build_query_as::<Book>().fetch_all(&self.pool).await?;

        Ok(Batch {
            offset: params.offset,
            total,
            rows,
        })
    }

    /// Full matching set, capped at [`MAX_LIMIT`] rows.
    pub async fn list_all(&self, filter: &BookFilter) -> Result<Vec<Book>> {
        let mut query = QueryBuilder::new(LIST_SQL);
        filter.apply(&mut query);
        query
            .push(" ORDER BY b.id LIMIT ")
            .push_bind(MAX_LIMIT as i64);
        let rows = query.build_query_as::<Book>().fetch_all(&self.pool).await?;
        Ok(rows)
    }
}

fn into_conflict(err: sqlx::Error) -> Error {
    match &err {
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            Error::Conflict(format!("Duplicate value violates unique constraint: {}", db.message()))
        }
        _ => err.into(),
    }
}
