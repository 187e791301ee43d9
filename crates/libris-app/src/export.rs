use libris_dal::book::Book;
use time::format_description::well_known::Rfc3339;

pub const CSV_HEADER: &str = "title,isbn,publish_date,author_first_name,author_last_name";

/// Renders books as comma-delimited UTF-8 text, one row per book.
///
/// Values are emitted verbatim. A value containing a comma makes the row
/// ambiguous; catalog titles and names are not expected to contain them.
pub fn books_csv(books: &[Book]) -> Vec<u8> {
    let mut out = String::with_capacity(64 * (books.len() + 1));
    out.push_str(CSV_HEADER);
    out.push('\n');
    for book in books {
        let publish_date = book
            .publish_date
            .format(&Rfc3339)
            .unwrap_or_else(|_| book.publish_date.unix_timestamp().to_string());
        out.push_str(&book.title);
        out.push(',');
        out.push_str(&book.isbn);
        out.push(',');
        out.push_str(&publish_date);
        out.push(',');
        out.push_str(&book.author.first_name);
        out.push(',');
        out.push_str(&book.author.last_name);
        out.push('\n');
    }
    out.into_bytes()
}

#[cfg(test)]
mod tests {
    use super::*;
    use libris_dal::author::AuthorShort;
    use time::macros::datetime;
    use uuid::Uuid;

    fn book(title: &str, isbn: &str) -> Book {
        Book {
            id: Uuid::new_v4(),
            title: title.to_string(),
            isbn: isbn.to_string(),
            publish_date: datetime!(2023-05-01 10:00 UTC),
            author: AuthorShort {
                id: Uuid::new_v4(),
                first_name: "Frank".to_string(),
                last_name: "Herbert".to_string(),
            },
        }
    }

    #[test]
    fn empty_set_renders_header_only() {
        let csv = String::from_utf8(books_csv(&[])).unwrap();
        assert_eq!(csv, format!("{CSV_HEADER}\n"));
    }

    #[test]
    fn one_row_per_book_in_field_order() {
        let books = [book("Dune Messiah", "9780441013593"), book("Dune", "0441172717")];
        let csv = String::from_utf8(books_csv(&books)).unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], CSV_HEADER);
        assert_eq!(
            lines[1],
            "Dune Messiah,9780441013593,2023-05-01T10:00:00Z,Frank,Herbert"
        );
        assert_eq!(lines[2], "Dune,0441172717,2023-05-01T10:00:00Z,Frank,Herbert");
    }

    #[test]
    fn embedded_commas_are_not_escaped() {
        let csv = String::from_utf8(books_csv(&[book("Dune, Revised", "0441172717")])).unwrap();
        assert!(csv.contains("Dune, Revised,0441172717"));
    }
}
