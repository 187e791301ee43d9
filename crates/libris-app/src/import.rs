//! Bulk import of books from an uploaded JSON document.
//!
//! Units are processed strictly in document order and committed one by one;
//! a failing unit is recorded and never aborts the rest of the batch. Only a
//! document that does not parse at all rejects the upload as a whole.

use garde::Validate as _;
use libris_dal::author::AuthorRepository;
use libris_dal::book::{BookRepository, CreateBook};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use tracing::{info, warn};
use uuid::Uuid;

/// One record of a bulk-upload document.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportBook {
    pub title: String,
    pub isbn: String,
    /// Absent means "stamp with the import time".
    pub publish_date: Option<OffsetDateTime>,
    pub author_id: String,
}

#[derive(Debug, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct ImportReport {
    pub imported: u32,
    pub failed: u32,
    pub errors: Vec<String>,
}

pub async fn import_books(
    authors: &AuthorRepository,
    books: &BookRepository,
    data: &[u8],
) -> ImportReport {
    let units: Vec<ImportBook> = match serde_json::from_slice(data) {
        Ok(units) => units,
        Err(e) => {
            warn!("Invalid bulk import document: {e}");
            return ImportReport {
                imported: 0,
                failed: 0,
                errors: vec![format!("Invalid JSON file: {e}")],
            };
        }
    };

    let mut imported = 0;
    let mut errors = Vec::new();
    for unit in units {
        match import_one(authors, books, &unit).await {
            Ok(()) => imported += 1,
            Err(cause) => {
                warn!("Failed to import book '{}': {cause}", unit.title);
                errors.push(format!("Failed to import book '{}': {cause}", unit.title));
            }
        }
    }

    info!("Imported {imported} books, {} failed", errors.len());
    ImportReport {
        imported,
        failed: errors.len() as u32,
        errors,
    }
}

async fn import_one(
    authors: &AuthorRepository,
    books: &BookRepository,
    unit: &ImportBook,
) -> Result<(), String> {
    let payload = CreateBook {
        author_id: unit.author_id.clone(),
        title: unit.title.clone(),
        isbn: unit.isbn.clone(),
        publish_date: unit.publish_date,
    };
    payload.validate().map_err(|report| {
        report
            .iter()
            .map(|(path, error)| format!("{path}: {error}"))
            .collect::<Vec<_>>()
            .join("; ")
    })?;

    let author_id: Uuid = unit
        .author_id
        .parse()
        .map_err(|_| format!("Invalid author id {:?}", unit.author_id))?;
    authors.get(author_id).await.map_err(|e| e.to_string())?;

    books.create(payload).await.map_err(|e| e.to_string())?;
    Ok(())
}
