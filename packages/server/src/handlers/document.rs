use axum::extract::{Path, Query, State};
use axum::response::Response;
use axum::Json;
use tracing::instrument;

use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::lifecycle::Lifecycle;
use crate::models::document::{DocumentListQuery, DocumentListResponse, DocumentResponse};
use crate::query::{self, DocumentFilter};
use crate::state::AppState;

use super::streaming::{self, Disposition};

#[utoipa::path(
    get,
    path = "/",
    tag = "Documents",
    operation_id = "listDocuments",
    summary = "Browse the document catalog",
    description = "Returns document metadata, newest first, without binary content. \
        `member_name` scopes the list to one member plus the shared household categories \
        (`All Documents` or omission disables the member filter); `category` filters \
        exactly; `search` is a whitespace-separated token match over title, category \
        and member name.",
    params(DocumentListQuery),
    responses(
        (status = 200, description = "Filtered document list", body = DocumentListResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, query), fields(user_id = auth_user.user_id))]
pub async fn list_documents(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Query(query): Query<DocumentListQuery>,
) -> Result<Json<DocumentListResponse>, AppError> {
    let filter = DocumentFilter::from_params(query.member_name, query.category, query.search);
    let rows = query::list_documents(&state.db, &filter).await?;

    let total = rows.len() as u64;
    let documents = rows.into_iter().map(DocumentResponse::from).collect();

    Ok(Json(DocumentListResponse { documents, total }))
}

#[utoipa::path(
    get,
    path = "/{id}/view",
    tag = "Documents",
    operation_id = "viewDocument",
    summary = "View a document in the browser",
    description = "Streams the stored file with an `inline` Content-Disposition so the \
        browser renders it when it can.",
    params(("id" = i32, Path, description = "Document ID")),
    responses(
        (status = 200, description = "Document content"),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Document or stored file not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(document_id, user_id = auth_user.user_id))]
pub async fn view_document(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(document_id): Path<i32>,
) -> Result<Response, AppError> {
    let lifecycle = Lifecycle::new(&state.db, state.objects.as_ref());
    let (doc, size, reader) = lifecycle.open_document(document_id).await?;

    streaming::stream_response(&doc.file_name, size, reader, Disposition::Inline)
}

#[utoipa::path(
    get,
    path = "/{id}/download",
    tag = "Documents",
    operation_id = "downloadDocument",
    summary = "Download a document",
    description = "Streams the stored file with an `attachment` Content-Disposition \
        carrying the original filename.",
    params(("id" = i32, Path, description = "Document ID")),
    responses(
        (status = 200, description = "Document content"),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Document or stored file not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(document_id, user_id = auth_user.user_id))]
pub async fn download_document(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(document_id): Path<i32>,
) -> Result<Response, AppError> {
    let lifecycle = Lifecycle::new(&state.db, state.objects.as_ref());
    let (doc, size, reader) = lifecycle.open_document(document_id).await?;

    streaming::stream_response(&doc.file_name, size, reader, Disposition::Attachment)
}
