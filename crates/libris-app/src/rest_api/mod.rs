pub mod author;
pub mod book;
pub mod conversion;

use libris_dal::author::AuthorRepository;
use libris_dal::book::BookRepository;

crate::repository_from_request!(AuthorRepository);
crate::repository_from_request!(BookRepository);

/// Treats absent and whitespace-only strings the same.
pub(crate) fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}
