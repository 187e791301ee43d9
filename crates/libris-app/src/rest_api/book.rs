use axum::extract::{DefaultBodyLimit, Multipart, Path, State};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::Json;
use axum_valid::Garde;
use garde::Validate;
use http::{header, StatusCode};
use libris_dal::author::AuthorRepository;
use libris_dal::book::{BookRepository, CreateBook, UpdateBook};
use libris_dal::filter::BookFilter;
use libris_dal::ListingParams;
use serde::Deserialize;
use time::OffsetDateTime;
use tracing::debug;
use uuid::Uuid;

use crate::error::{ApiError, ApiResult};
use crate::rest_api::conversion::{book_to_dto, FilteredBooksResponse};
use crate::rest_api::non_blank;
use crate::state::AppState;
use crate::{export, import};

#[derive(Debug, Clone, Deserialize, Validate)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[garde(allow_unvalidated)]
pub struct ListBookRequest {
    title: Option<String>,
    isbn: Option<String>,
    author_id: Option<String>,
    published_date: Option<PublishedDateFilter>,
    page: Option<u32>,
    #[garde(range(min = 1, max = 1000))]
    size: Option<u32>,
}

#[derive(Debug, Clone, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct PublishedDateFilter {
    publish_date: Option<OffsetDateTime>,
    published_after: Option<OffsetDateTime>,
    published_before: Option<OffsetDateTime>,
}

impl ListBookRequest {
    /// AND of every clause present; an empty request matches everything.
    fn to_filter(&self) -> BookFilter {
        let mut filter = BookFilter::default();
        if let Some(title) = non_blank(&self.title) {
            filter.title_contains(title);
        }
        if let Some(isbn) = non_blank(&self.isbn) {
            filter.isbn_equals(isbn);
        }
        if let Some(author_id) = non_blank(&self.author_id) {
            filter.author_id(author_id);
        }
        if let Some(window) = &self.published_date {
            if let Some(day) = window.publish_date {
                filter.published_on(day);
            }
            if let Some(after) = window.published_after {
                filter.published_after(after);
            }
            if let Some(before) = window.published_before {
                filter.published_before(before);
            }
            // With both bounds present the inclusive range is added on top of
            // the two open-ended clauses.
            if let (Some(after), Some(before)) = (window.published_after, window.published_before)
            {
                filter.published_between(after, before);
            }
        }
        filter
    }

    fn listing_params(&self, default_page_size: u32) -> (ListingParams, u32) {
        let page = self.page.unwrap_or(0);
        let size = self.size.unwrap_or(default_page_size);
        let params = ListingParams::new(page as i64 * size as i64, size as i64);
        (params, size)
    }
}

fn total_pages(total: u64, page_size: u32) -> u32 {
    ((total + page_size as u64 - 1) / page_size as u64) as u32
}

#[cfg_attr(feature = "openapi",  utoipa::path(post, path = "", tag = "Book", operation_id = "createBook",
    responses((status = StatusCode::CREATED, description = "Created Book", body = crate::rest_api::conversion::BookDto))))]
pub async fn create(
    repository: BookRepository,
    Garde(Json(payload)): Garde<Json<CreateBook>>,
) -> ApiResult<impl IntoResponse> {
    debug!("Saving new book: {}", payload.title);
    let record = repository.create(payload).await?;
    Ok((StatusCode::CREATED, Json(book_to_dto(record))))
}

#[cfg_attr(feature = "openapi",  utoipa::path(get, path = "/{id}", tag = "Book", operation_id = "getBook",
    responses((status = StatusCode::OK, description = "One Book", body = crate::rest_api::conversion::BookDto))))]
pub async fn find_by_id(
    Path(id): Path<Uuid>,
    repository: BookRepository,
) -> ApiResult<impl IntoResponse> {
    let record = repository.get(id).await?;
    Ok((StatusCode::OK, Json(book_to_dto(record))))
}

#[cfg_attr(feature = "openapi",  utoipa::path(put, path = "/{id}", tag = "Book", operation_id = "updateBook",
    responses((status = StatusCode::OK, description = "Updated Book", body = crate::rest_api::conversion::BookDto))))]
pub async fn update(
    Path(id): Path<Uuid>,
    repository: BookRepository,
    Garde(Json(payload)): Garde<Json<UpdateBook>>,
) -> ApiResult<impl IntoResponse> {
    let record = repository.update(id, payload).await?;
    Ok((StatusCode::OK, Json(book_to_dto(record))))
}

#[cfg_attr(
    feature = "openapi",
    utoipa::path(delete, path = "/{id}", tag = "Book", operation_id = "deleteBook")
)]
pub async fn delete_book(
    Path(id): Path<Uuid>,
    repository: BookRepository,
) -> ApiResult<impl IntoResponse> {
    repository.delete(id).await?;
    Ok((StatusCode::NO_CONTENT, ()))
}

#[cfg_attr(feature = "openapi",  utoipa::path(post, path = "/_list", tag = "Book", operation_id = "listBooks",
    request_body = ListBookRequest,
    responses((status = StatusCode::OK, description = "Filtered books, paginated", body = FilteredBooksResponse))))]
pub async fn list(
    repository: BookRepository,
    State(state): State<AppState>,
    Garde(Json(request)): Garde<Json<ListBookRequest>>,
) -> ApiResult<impl IntoResponse> {
    let (params, page_size) = request.listing_params(state.config().default_page_size);
    let filter = request.to_filter();
    let batch = repository.list(&filter, params).await?;
    debug!("Fetched {} books (total {})", batch.rows.len(), batch.total);

    let response = FilteredBooksResponse {
        total_pages: total_pages(batch.total, page_size),
        books: batch.rows.into_iter().map(book_to_dto).collect(),
    };
    Ok((StatusCode::OK, Json(response)))
}

#[cfg_attr(feature = "openapi",  utoipa::path(post, path = "/_export", tag = "Book", operation_id = "exportBooks",
    request_body = ListBookRequest,
    responses((status = StatusCode::OK, description = "Filtered books as CSV", content_type = "text/csv"))))]
pub async fn export_books(
    repository: BookRepository,
    Garde(Json(request)): Garde<Json<ListBookRequest>>,
) -> ApiResult<impl IntoResponse> {
    let filter = request.to_filter();
    let records = repository.list_all(&filter).await?;
    debug!("Exporting {} books", records.len());

    let body = export::books_csv(&records);
    let epoch_millis = OffsetDateTime::now_utc().unix_timestamp_nanos() / 1_000_000;
    let disposition = format!("attachment; filename=\"books_{epoch_millis}.csv\"");
    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        body,
    ))
}

#[cfg(feature = "openapi")]
#[derive(serde::Deserialize, utoipa::ToSchema)]
#[allow(unused)]
struct UploadForm {
    #[schema(value_type = String, format = Binary, content_media_type = "application/json")]
    file: String,
}

#[cfg_attr(feature = "openapi",  utoipa::path(post, path = "/upload", tag = "Book", operation_id = "uploadBooks",
    request_body(content = UploadForm, content_type = "multipart/form-data"),
    responses((status = StatusCode::OK, description = "Import report", body = import::ImportReport))))]
pub async fn upload(
    author_repository: AuthorRepository,
    book_repository: BookRepository,
    mut multipart: Multipart,
) -> ApiResult<impl IntoResponse> {
    let field = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::InvalidRequest(format!("Error reading multipart field: {e}")))?
        .ok_or_else(|| ApiError::InvalidRequest("Missing file field".into()))?;
    let data = field
        .bytes()
        .await
        .map_err(|e| ApiError::InvalidRequest(format!("Error reading uploaded file: {e}")))?;

    let report = import::import_books(&author_repository, &book_repository, &data).await;
    Ok((StatusCode::OK, Json(report)))
}

pub fn router(upload_limit_mb: usize) -> axum::Router<AppState> {
    axum::Router::new()
        .route("/", post(create))
        .route("/{id}", get(find_by_id).put(update).delete(delete_book))
        .route("/_list", post(list))
        .route("/_export", post(export_books))
        .route("/upload", post(upload))
        .layer(DefaultBodyLimit::max(1024 * 1024 * upload_limit_mb))
}

#[cfg(feature = "openapi")]
pub fn api_docs() -> utoipa::openapi::OpenApi {
    use utoipa::OpenApi as _;
    #[derive(utoipa::OpenApi)]
    #[openapi(paths(
        create,
        find_by_id,
        update,
        delete_book,
        list,
        export_books,
        upload
    ))]
    struct ApiDocs;
    ApiDocs::openapi()
}
