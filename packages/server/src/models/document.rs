use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::entity::document;
use crate::error::AppError;
use crate::models::shared::{Category, parse_category, validate_member_name, validate_title};

/// Response DTO for a single catalog entry.
#[derive(Serialize, utoipa::ToSchema)]
pub struct DocumentResponse {
    /// Catalog entry ID.
    #[schema(example = 1)]
    pub id: i32,
    /// Document title.
    #[schema(example = "Passport")]
    pub title: String,
    /// Family member the document is filed under.
    #[schema(example = "Meera")]
    pub member_name: String,
    /// Category the document is filed under.
    #[schema(example = "Personal Documents")]
    pub category: String,
    /// Object store reference (UUIDv7).
    #[schema(example = "01936f0e-1234-7abc-8000-000000000001")]
    pub file_reference: String,
    /// Original upload filename.
    #[schema(example = "passport-scan.pdf")]
    pub file_name: String,
    /// Human-readable file size.
    #[schema(example = "1.17 KB")]
    pub file_size: String,
    /// Username of the admin who uploaded the file.
    #[schema(example = "admin")]
    pub uploaded_by: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<document::Model> for DocumentResponse {
    fn from(model: document::Model) -> Self {
        Self {
            id: model.id,
            title: model.title,
            member_name: model.member_name,
            category: model.category,
            file_reference: model.file_reference.to_string(),
            file_name: model.file_name,
            file_size: model.file_size,
            uploaded_by: model.uploaded_by,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

/// Response DTO for listing documents.
#[derive(Serialize, utoipa::ToSchema)]
pub struct DocumentListResponse {
    pub documents: Vec<DocumentResponse>,
    pub total: u64,
}

/// Query parameters for document listing.
#[derive(Deserialize, utoipa::IntoParams)]
pub struct DocumentListQuery {
    /// Restrict to documents filed under this member (shared categories are
    /// always included). Omit or pass `All Documents` for no member filter.
    #[param(example = "Meera")]
    pub member_name: Option<String>,
    /// Restrict to a single category.
    #[param(example = "Family Records")]
    pub category: Option<String>,
    /// Free-text search over title, category and member name.
    #[param(example = "passport 2024")]
    pub search: Option<String>,
}

/// Request body for updating a catalog entry's descriptive fields.
///
/// The stored file itself is immutable; replacing it means deleting the
/// document and uploading a new one.
#[derive(Deserialize, utoipa::ToSchema)]
pub struct UpdateDocumentRequest {
    /// New document title.
    #[schema(example = "Passport (renewed)")]
    pub title: String,
    /// Member to file the document under.
    #[schema(example = "Meera")]
    pub member_name: String,
    /// Category to file the document under.
    #[schema(example = "Personal Documents")]
    pub category: String,
}

/// Validate the descriptive fields shared by upload and update requests.
///
/// Returns the parsed category so callers can persist its canonical form.
pub fn validate_document_fields(
    title: &str,
    member_name: &str,
    category: &str,
) -> Result<Category, AppError> {
    validate_title(title)?;
    validate_member_name(member_name)?;
    parse_category(category)
}
