use axum::extract::Path;
use axum::response::IntoResponse;
use axum::routing::{get, put};
use axum::Json;
use axum_valid::Garde;
use http::StatusCode;
use libris_dal::author::{AuthorRepository, CreateAuthor, UpdateAuthor};
use tracing::debug;
use uuid::Uuid;

use crate::error::ApiResult;
use crate::rest_api::conversion::{author_to_dto, AuthorDto};
use crate::state::AppState;

#[cfg_attr(feature = "openapi",  utoipa::path(get, path = "", tag = "Author", operation_id = "listAuthors",
    responses((status = StatusCode::OK, description = "All authors", body = Vec<AuthorDto>))))]
pub async fn list(repository: AuthorRepository) -> ApiResult<impl IntoResponse> {
    let authors = repository.list_all().await?;
    debug!("Found {} authors", authors.len());
    let dtos: Vec<AuthorDto> = authors.into_iter().map(author_to_dto).collect();
    Ok((StatusCode::OK, Json(dtos)))
}

#[cfg_attr(feature = "openapi",  utoipa::path(post, path = "", tag = "Author", operation_id = "createAuthor",
    responses((status = StatusCode::CREATED, description = "Created Author", body = AuthorDto))))]
pub async fn create(
    repository: AuthorRepository,
    Garde(Json(payload)): Garde<Json<CreateAuthor>>,
) -> ApiResult<impl IntoResponse> {
    debug!("Saving new author: {} {}", payload.first_name, payload.last_name);
    let record = repository.create(payload).await?;
    Ok((StatusCode::CREATED, Json(author_to_dto(record))))
}

#[cfg_attr(feature = "openapi",  utoipa::path(put, path = "/{id}", tag = "Author", operation_id = "updateAuthor",
    responses((status = StatusCode::OK, description = "Updated Author", body = AuthorDto))))]
pub async fn update(
    Path(id): Path<Uuid>,
    repository: AuthorRepository,
    Garde(Json(payload)): Garde<Json<UpdateAuthor>>,
) -> ApiResult<impl IntoResponse> {
    let record = repository.update(id, payload).await?;
    Ok((StatusCode::OK, Json(author_to_dto(record))))
}

#[cfg_attr(
    feature = "openapi",
    utoipa::path(delete, path = "/{id}", tag = "Author", operation_id = "deleteAuthor")
)]
pub async fn delete_author(
    Path(id): Path<Uuid>,
    repository: AuthorRepository,
) -> ApiResult<impl IntoResponse> {
    repository.delete(id).await?;
    Ok((StatusCode::NO_CONTENT, ()))
}

pub fn router() -> axum::Router<AppState> {
    axum::Router::new()
        .route("/", get(list).post(create))
        .route("/{id}", put(update).delete(delete_author))
}

#[cfg(feature = "openapi")]
pub fn api_docs() -> utoipa::openapi::OpenApi {
    use utoipa::OpenApi as _;
    #[derive(utoipa::OpenApi)]
    #[openapi(paths(list, create, update, delete_author))]
    struct ApiDocs;
    ApiDocs::openapi()
}
