use axum::extract::{DefaultBodyLimit, Multipart, Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use common::{Bucket, StoredObject};
use tracing::instrument;

use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::extractors::json::AppJson;
use crate::lifecycle::{Lifecycle, NewDocument, NewMemberImage};
use crate::models::document::{DocumentListResponse, DocumentResponse, UpdateDocumentRequest};
use crate::models::member_image::MemberImageResponse;
use crate::query::{self, DocumentFilter};
use crate::state::AppState;
use crate::utils::filename::validate_upload_filename;

use super::streaming;

/// Body limit for multipart upload routes: the configured object cap plus
/// headroom for the non-file fields and multipart framing.
pub fn upload_body_limit(max_object_size: u64) -> DefaultBodyLimit {
    DefaultBodyLimit::max((max_object_size as usize).saturating_add(64 * 1024))
}

#[utoipa::path(
    post,
    path = "/documents",
    tag = "Admin",
    operation_id = "uploadDocument",
    summary = "Upload a new document",
    description = "Creates a catalog entry from multipart fields `title`, `member_name`, \
        `category` and `file`. The payload is streamed to the object store before the \
        catalog record is written; a rejected request discards the stored bytes again.",
    request_body(content_type = "multipart/form-data", description = "Document metadata plus file"),
    responses(
        (status = 201, description = "Document created", body = DocumentResponse),
        (status = 400, description = "Validation error (VALIDATION)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, multipart), fields(user_id = auth_user.user_id))]
pub async fn upload_document(
    auth_user: AuthUser,
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, AppError> {
    auth_user.require_admin()?;

    let mut title: Option<String> = None;
    let mut member_name: Option<String> = None;
    let mut category: Option<String> = None;
    let mut file: Option<(String, StoredObject)> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Multipart error: {e}")))?
    {
        match field.name() {
            Some("title") => title = Some(read_text_field(field, "title").await?),
            Some("member_name") => {
                member_name = Some(read_text_field(field, "member_name").await?)
            }
            Some("category") => category = Some(read_text_field(field, "category").await?),
            Some("file") => {
                if let Some((_, prev)) = file.take() {
                    // Repeated file field; drop the earlier object.
                    let _ = state.objects.delete(Bucket::Documents, &prev.id).await;
                }

                let raw_name = field
                    .file_name()
                    .ok_or_else(|| AppError::Validation("File field must have a filename".into()))?;
                let file_name = validate_upload_filename(raw_name)
                    .map_err(|e| AppError::Validation(e.message().into()))?
                    .to_string();

                let stored = streaming::stream_field_to_store(
                    field,
                    state.objects.as_ref(),
                    Bucket::Documents,
                    state.config.storage.max_object_size,
                )
                .await?;

                file = Some((file_name, stored));
            }
            _ => {} // Ignore unknown fields.
        }
    }

    let (file_name, stored) =
        file.ok_or_else(|| AppError::Validation("Missing 'file' field".into()))?;

    let lifecycle = Lifecycle::new(&state.db, state.objects.as_ref());
    let doc = lifecycle
        .create_document(
            NewDocument {
                title: title.unwrap_or_default(),
                member_name: member_name.unwrap_or_default(),
                category: category.unwrap_or_default(),
                file_name,
                uploaded_by: auth_user.username.clone(),
            },
            stored,
        )
        .await?;

    Ok((StatusCode::CREATED, Json(DocumentResponse::from(doc))))
}

#[utoipa::path(
    get,
    path = "/documents",
    tag = "Admin",
    operation_id = "listAllDocuments",
    summary = "List every document in the catalog",
    description = "Returns the full unfiltered catalog, newest first, for the admin panel.",
    responses(
        (status = 200, description = "Full document list", body = DocumentListResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(user_id = auth_user.user_id))]
pub async fn list_all_documents(
    auth_user: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<DocumentListResponse>, AppError> {
    auth_user.require_admin()?;

    let rows = query::list_documents(&state.db, &DocumentFilter::default()).await?;

    let total = rows.len() as u64;
    let documents = rows.into_iter().map(DocumentResponse::from).collect();

    Ok(Json(DocumentListResponse { documents, total }))
}

#[utoipa::path(
    put,
    path = "/documents/{id}",
    tag = "Admin",
    operation_id = "updateDocument",
    summary = "Update a document's descriptive fields",
    description = "Replaces title, member_name and category. The stored file and its \
        fileName/fileSize are immutable; replacing the file means deleting the document \
        and uploading a new one.",
    params(("id" = i32, Path, description = "Document ID")),
    request_body = UpdateDocumentRequest,
    responses(
        (status = 200, description = "Document updated", body = DocumentResponse),
        (status = 400, description = "Validation error (VALIDATION)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Document not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(document_id))]
pub async fn update_document(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(document_id): Path<i32>,
    AppJson(payload): AppJson<UpdateDocumentRequest>,
) -> Result<Json<DocumentResponse>, AppError> {
    auth_user.require_admin()?;

    let lifecycle = Lifecycle::new(&state.db, state.objects.as_ref());
    let doc = lifecycle.update_document(document_id, &payload).await?;

    Ok(Json(DocumentResponse::from(doc)))
}

#[utoipa::path(
    delete,
    path = "/documents/{id}",
    tag = "Admin",
    operation_id = "deleteDocument",
    summary = "Delete a document",
    description = "Removes the stored file and then the catalog record. A file that is \
        already missing from the store does not block removing its listing.",
    params(("id" = i32, Path, description = "Document ID")),
    responses(
        (status = 204, description = "Document deleted"),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Document not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(document_id))]
pub async fn delete_document(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(document_id): Path<i32>,
) -> Result<impl IntoResponse, AppError> {
    auth_user.require_admin()?;

    let lifecycle = Lifecycle::new(&state.db, state.objects.as_ref());
    lifecycle.delete_document(document_id).await?;

    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    post,
    path = "/member-images",
    tag = "Admin",
    operation_id = "uploadMemberImage",
    summary = "Upload or replace a member's avatar image",
    description = "Creates the avatar for a member from multipart fields `member_name` \
        and `file`, replacing any previous image for that member. The new image is \
        stored before the old one is retired.",
    request_body(content_type = "multipart/form-data", description = "Member name plus image file"),
    responses(
        (status = 201, description = "Image stored", body = MemberImageResponse),
        (status = 400, description = "Validation error (VALIDATION)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, multipart), fields(user_id = auth_user.user_id))]
pub async fn upload_member_image(
    auth_user: AuthUser,
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, AppError> {
    auth_user.require_admin()?;

    let mut member_name: Option<String> = None;
    let mut file: Option<(String, StoredObject)> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Multipart error: {e}")))?
    {
        match field.name() {
            Some("member_name") => {
                member_name = Some(read_text_field(field, "member_name").await?)
            }
            Some("file") => {
                if let Some((_, prev)) = file.take() {
                    let _ = state.objects.delete(Bucket::MemberImages, &prev.id).await;
                }

                let raw_name = field
                    .file_name()
                    .ok_or_else(|| AppError::Validation("File field must have a filename".into()))?;
                let file_name = validate_upload_filename(raw_name)
                    .map_err(|e| AppError::Validation(e.message().into()))?
                    .to_string();

                let stored = streaming::stream_field_to_store(
                    field,
                    state.objects.as_ref(),
                    Bucket::MemberImages,
                    state.config.storage.max_object_size,
                )
                .await?;

                file = Some((file_name, stored));
            }
            _ => {} // Ignore unknown fields.
        }
    }

    let (file_name, stored) =
        file.ok_or_else(|| AppError::Validation("Missing 'file' field".into()))?;

    let lifecycle = Lifecycle::new(&state.db, state.objects.as_ref());
    let image = lifecycle
        .upsert_member_image(
            NewMemberImage {
                member_name: member_name.unwrap_or_default(),
                file_name,
                uploaded_by: auth_user.username.clone(),
            },
            stored,
        )
        .await?;

    Ok((StatusCode::CREATED, Json(MemberImageResponse::from(image))))
}

async fn read_text_field(
    field: axum::extract::multipart::Field<'_>,
    name: &str,
) -> Result<String, AppError> {
    field
        .text()
        .await
        .map_err(|e| AppError::Validation(format!("Failed to read {name}: {e}")))
}
