//! Wire DTOs and the entity to DTO conversions, one named function per
//! source/target pair.

use libris_dal::author::{Author, AuthorShort};
use libris_dal::book::Book;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Debug, Serialize, Deserialize, Clone)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct AuthorDto {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub contact_info: String,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct AuthorRefDto {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct BookDto {
    pub id: Uuid,
    pub title: String,
    pub isbn: String,
    pub publish_date: OffsetDateTime,
    pub author: AuthorRefDto,
}

#[derive(Debug, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct FilteredBooksResponse {
    pub books: Vec<BookDto>,
    pub total_pages: u32,
}

pub fn author_to_dto(author: Author) -> AuthorDto {
    AuthorDto {
        id: author.id,
        first_name: author.first_name,
        last_name: author.last_name,
        contact_info: author.contact_info,
    }
}

pub fn author_short_to_ref(author: AuthorShort) -> AuthorRefDto {
    AuthorRefDto {
        id: author.id,
        first_name: author.first_name,
        last_name: author.last_name,
    }
}

pub fn book_to_dto(book: Book) -> BookDto {
    BookDto {
        id: book.id,
        title: book.title,
        isbn: book.isbn,
        publish_date: book.publish_date,
        author: author_short_to_ref(book.author),
    }
}
