use futures::TryStreamExt as _;
use libris_dal::author::{AuthorRepository, CreateAuthor, UpdateAuthor};
use libris_dal::book::BookRepository;
use libris_dal::Error;
use sqlx::Executor;

const AUTHOR_HERBERT: &str = "11111111-1111-1111-1111-111111111111";
const AUTHOR_BESTER: &str = "22222222-2222-2222-2222-222222222222";

const TEST_DATA: &str = r#"
INSERT INTO author (id, first_name, last_name, contact_info)
VALUES ('11111111-1111-1111-1111-111111111111','Frank','Herbert','frank@dune.example');
INSERT INTO author (id, first_name, last_name, contact_info)
VALUES ('22222222-2222-2222-2222-222222222222','Alfred','Bester','alfred@tiger.example');

INSERT INTO book (id, author_id, title, isbn, publish_date)
VALUES ('aaaaaaaa-aaaa-aaaa-aaaa-aaaaaaaaaaa1','11111111-1111-1111-1111-111111111111','Dune Messiah','9780441013593',1682935200);
INSERT INTO book (id, author_id, title, isbn, publish_date)
VALUES ('aaaaaaaa-aaaa-aaaa-aaaa-aaaaaaaaaaa2','11111111-1111-1111-1111-111111111111','Children of Dune','9780441104024',1682899200);
INSERT INTO book (id, author_id, title, isbn, publish_date)
VALUES ('aaaaaaaa-aaaa-aaaa-aaaa-aaaaaaaaaaa3','22222222-2222-2222-2222-222222222222','The Stars My Destination','0679767800',1579046400);
"#;

async fn init_db() -> sqlx::Pool<sqlx::Sqlite> {
    const DB_URL: &str = "sqlite::memory:";
    let conn = sqlx::sqlite::SqlitePoolOptions::new()
        .max_connections(1)
        .min_connections(1)
        .connect(DB_URL)
        .await
        .unwrap();
    conn.execute("PRAGMA foreign_keys = ON").await.unwrap();
    sqlx::migrate!("../../migrations").run(&conn).await.unwrap();

    conn.execute_many(TEST_DATA)
        .try_collect::<Vec<_>>()
        .await
        .unwrap();

    conn
}

#[tokio::test]
async fn test_author_crud() {
    let conn = init_db().await;
    let repo = AuthorRepository::new(conn);

    let created = repo
        .create(CreateAuthor {
            first_name: "Ursula".to_string(),
            last_name: "Le Guin".to_string(),
            contact_info: "ursula@earthsea.example".to_string(),
        })
        .await
        .unwrap();
    assert_eq!(created.first_name, "Ursula");

    let fetched = repo.get(created.id).await.unwrap();
    assert_eq!(fetched.last_name, "Le Guin");

    let all = repo.list_all().await.unwrap();
    assert_eq!(all.len(), 3);

    let updated = repo
        .update(
            created.id,
            UpdateAuthor {
                contact_info: Some("ursula@hainish.example".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.contact_info, "ursula@hainish.example");
    assert_eq!(updated.first_name, "Ursula");
    assert_eq!(updated.last_name, "Le Guin");
}

#[tokio::test]
async fn test_update_overwrites_only_present_fields() {
    let conn = init_db().await;
    let repo = AuthorRepository::new(conn);
    let id = AUTHOR_HERBERT.parse().unwrap();

    let updated = repo
        .update(
            id,
            UpdateAuthor {
                first_name: Some("Franklin".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.first_name, "Franklin");
    assert_eq!(updated.last_name, "Herbert");
    assert_eq!(updated.contact_info, "frank@dune.example");
}

#[tokio::test]
async fn test_delete_cascades_to_books() {
    let conn = init_db().await;
    let authors = AuthorRepository::new(conn.clone());
    let books = BookRepository::new(conn);
    let herbert = AUTHOR_HERBERT.parse().unwrap();

    authors.delete(herbert).await.unwrap();

    assert!(matches!(
        authors.get(herbert).await,
        Err(Error::RecordNotFound(_))
    ));
    for book_id in [
        "aaaaaaaa-aaaa-aaaa-aaaa-aaaaaaaaaaa1",
        "aaaaaaaa-aaaa-aaaa-aaaa-aaaaaaaaaaa2",
    ] {
        let res = books.get(book_id.parse().unwrap()).await;
        assert!(matches!(res, Err(Error::RecordNotFound(_))));
    }

    // Bester and his book are untouched.
    let bester = AUTHOR_BESTER.parse().unwrap();
    assert!(authors.get(bester).await.is_ok());
    assert!(books
        .get("aaaaaaaa-aaaa-aaaa-aaaa-aaaaaaaaaaa3".parse().unwrap())
        .await
        .is_ok());
}

#[tokio::test]
async fn test_delete_missing_author() {
    let conn = init_db().await;
    let repo = AuthorRepository::new(conn);

    let res = repo
        .delete("99999999-9999-9999-9999-999999999999".parse().unwrap())
        .await;
    assert!(matches!(res, Err(Error::RecordNotFound(_))));
}
