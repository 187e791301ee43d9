use futures::{StreamExt as _, TryStreamExt as _};
use garde::Validate;
use serde::{Deserialize, Serialize};
use sqlx::Row as _;
use tracing::debug;
use uuid::Uuid;

use crate::{error::Result, uuid_column, ChosenRow, Error, Pool, MAX_LIMIT};

#[derive(Debug, Serialize, Deserialize, Clone, Validate)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct CreateAuthor {
    #[garde(length(min = 2, max = 255))]
    pub first_name: String,
    #[garde(length(min = 2, max = 255))]
    pub last_name: String,
    #[garde(length(min = 1, max = 600))]
    pub contact_info: String,
}

/// Partial update; only fields present in the request are overwritten.
#[derive(Debug, Serialize, Deserialize, Clone, Default, Validate)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct UpdateAuthor {
    #[garde(length(min = 2, max = 255))]
    pub first_name: Option<String>,
    #[garde(length(min = 2, max = 255))]
    pub last_name: Option<String>,
    #[garde(length(min = 1, max = 600))]
    pub contact_info: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Author {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub contact_info: String,
}

impl sqlx::FromRow<'_, ChosenRow> for Author {
    fn from_row(row: &ChosenRow) -> Result<Self, sqlx::Error> {
        Ok(Author {
            id: uuid_column(row, "id")?,
            first_name: row.try_get("first_name")?,
            last_name: row.try_get("last_name")?,
            contact_info: row.try_get("contact_info")?,
        })
    }
}

/// Author embedded in a joined book row.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct AuthorShort {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
}

impl AuthorShort {
    /// Reads `author_*` prefixed columns of a joined row.
    pub(crate) fn from_row_prefixed(row: &ChosenRow) -> Result<Self, sqlx::Error> {
        Ok(AuthorShort {
            id: uuid_column(row, "author_id")?,
            first_name: row.try_get("author_first_name")?,
            last_name: row.try_get("author_last_name")?,
        })
    }
}

pub struct AuthorRepository {
    pool: Pool,
}

impl AuthorRepository {
    pub fn new(pool: Pool) -> Self {
        Self { pool }
    }

    pub async fn get(&self, id: Uuid) -> Result<Author> {
        let record = sqlx::query_as::<_, Author>(
            "SELECT id, first_name, last_name, contact_info FROM author WHERE id = ?",
        )
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| Error::RecordNotFound(format!("Author {id}")))?;
        Ok(record)
    }

    pub async fn create(&self, payload: CreateAuthor) -> Result<Author> {
        let id = Uuid::new_v4();
        sqlx::query(
            "INSERT INTO author (id, first_name, last_name, contact_info) VALUES (?, ?, ?, ?)",
        )
        .bind(id.to_string())
        .bind(&payload.first_name)
        .bind(&payload.last_name)
        .bind(&payload.contact_info)
        .execute(&self.pool)
        .await?;

        self.get(id).await
    }

    pub async fn update(&self, id: Uuid, payload: UpdateAuthor) -> Result<Author> {
        let mut record = self.get(id).await?;
        if let Some(first_name) = payload.first_name {
            record.first_name = first_name;
        }
        if let Some(last_name) = payload.last_name {
            record.last_name = last_name;
        }
        if let Some(contact_info) = payload.contact_info {
            record.contact_info = contact_info;
        }

        sqlx::query("UPDATE author SET first_name = ?, last_name = ?, contact_info = ? WHERE id = ?")
            .bind(&record.first_name)
            .bind(&record.last_name)
            .bind(&record.contact_info)
            .bind(id.to_string())
            .execute(&self.pool)
            .await?;

        self.get(id).await
    }

    /// Deletes the author and every book referencing it, in one transaction.
    pub async fn delete(&self, id: Uuid) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        let books = sqlx::query("DELETE FROM book WHERE author_id = ?")
            .bind(id.to_string())
            .execute(&mut *tx)
            .await?;

        let res = sqlx::query("DELETE FROM author WHERE id = ?")
            .bind(id.to_string())
            .execute(&mut *tx)
            .await?;

        if res.rows_affected() == 0 {
            return Err(Error::RecordNotFound(format!("Author {id}")));
        }
        tx.commit().await?;

        debug!(
            "Deleted author {} with {} dependent books",
            id,
            books.rows_affected()
        );
        Ok(())
    }

    pub async fn list_all(&self) -> Result<Vec<Author>> {
        let records = sqlx::query_as::<_, Author>(
            "SELECT id, first_name, last_name, contact_info FROM author ORDER BY id",
        )
        .fetch(&self.pool)
        .take(MAX_LIMIT)
        .try_collect::<Vec<_>>()
        .await?;
        Ok(records)
    }
}
