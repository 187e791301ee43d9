use sqlx::QueryBuilder;
use time::{Duration, OffsetDateTime, Time, UtcOffset};
use tracing::debug;
use uuid::Uuid;

use crate::ChosenDB;

/// AND-composition of optional conditions over book rows.
///
/// Clauses are rendered against the `book b` alias with every value bound,
/// never interpolated. An empty filter matches all books.
#[derive(Debug, Clone, Default)]
pub struct BookFilter {
    clauses: Vec<BookClause>,
}

#[derive(Debug, Clone)]
enum BookClause {
    TitleContains(String),
    IsbnEquals(String),
    AuthorIs(Uuid),
    PublishedOn {
        start: OffsetDateTime,
        end: OffsetDateTime,
    },
    PublishedAfter(OffsetDateTime),
    PublishedBefore(OffsetDateTime),
    PublishedBetween {
        from: OffsetDateTime,
        to: OffsetDateTime,
    },
}

impl BookFilter {
    /// Case-insensitive substring match on the title.
    pub fn title_contains(&mut self, title: impl Into<String>) -> &mut Self {
        self.clauses.push(BookClause::TitleContains(title.into()));
        self
    }

    pub fn isbn_equals(&mut self, isbn: impl Into<String>) -> &mut Self {
        self.clauses.push(BookClause::IsbnEquals(isbn.into()));
        self
    }

    /// Exact match on the author id. A string that is not a valid UUID drops
    /// the clause instead of failing the whole query.
    pub fn author_id(&mut self, author_id: &str) -> &mut Self {
        match author_id.parse::<Uuid>() {
            Ok(id) => {
                self.clauses.push(BookClause::AuthorIs(id));
            }
            Err(_) => debug!("Ignoring author filter with invalid id {author_id:?}"),
        }
        self
    }

    /// Day window `[midnight, midnight + 24h)` around `date`, truncated in UTC.
    pub fn published_on(&mut self, date: OffsetDateTime) -> &mut Self {
        let start = date.to_offset(UtcOffset::UTC).replace_time(Time::MIDNIGHT);
        self.clauses.push(BookClause::PublishedOn {
            start,
            end: start + Duration::days(1),
        });
        self
    }

    /// Strictly after `date`.
    pub fn published_after(&mut self, date: OffsetDateTime) -> &mut Self {
        self.clauses.push(BookClause::PublishedAfter(date));
        self
    }

    /// Strictly before `date`.
    pub fn published_before(&mut self, date: OffsetDateTime) -> &mut Self {
        self.clauses.push(BookClause::PublishedBefore(date));
        self
    }

    /// Inclusive `[from, to]` range. Callers that supply both bounds keep
    /// their open-ended after/before clauses as well; under AND the overlap
    /// only narrows by the two inclusive endpoints.
    pub fn published_between(&mut self, from: OffsetDateTime, to: OffsetDateTime) -> &mut Self {
        self.clauses.push(BookClause::PublishedBetween { from, to });
        self
    }

    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }

    /// Number of clauses the filter will AND together.
    pub fn len(&self) -> usize {
        self.clauses.len()
    }

    pub(crate) fn apply(&self, builder: &mut QueryBuilder<'_, ChosenDB>) {
        if self.clauses.is_empty() {
            return;
        }
        builder.push(" WHERE ");
        for (i, clause) in self.clauses.iter().enumerate() {
            if i > 0 {
                builder.push(" AND ");
            }
            clause.push_sql(builder);
        }
    }
}

impl BookClause {
    fn push_sql(&self, builder: &mut QueryBuilder<'_, ChosenDB>) {
        match self {
            BookClause::TitleContains(title) => {
                builder
                    .push("lower(b.title) LIKE ")
                    .push_bind(format!("%{}%", title.to_lowercase()));
            }
            BookClause::IsbnEquals(isbn) => {
                builder.push("b.isbn = ").push_bind(isbn.clone());
            }
            BookClause::AuthorIs(id) => {
                builder.push("b.author_id = ").push_bind(id.to_string());
            }
            BookClause::PublishedOn { start, end } => {
                builder
                    .push("b.publish_date >= ")
                    .push_bind(start.unix_timestamp())
                    .push(" AND b.publish_date < ")
                    .push_bind(end.unix_timestamp());
            }
            BookClause::PublishedAfter(date) => {
                builder
                    .push("b.publish_date > ")
                    .push_bind(date.unix_timestamp());
            }
            BookClause::PublishedBefore(date) => {
                builder
                    .push("b.publish_date < ")
                    .push_bind(date.unix_timestamp());
            }
            BookClause::PublishedBetween { from, to } => {
                builder
                    .push("b.publish_date >= ")
                    .push_bind(from.unix_timestamp())
                    .push(" AND b.publish_date <= ")
                    .push_bind(to.unix_timestamp());
            }
        }
    }
}
