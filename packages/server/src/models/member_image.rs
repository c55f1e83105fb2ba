use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::entity::member_image;

/// Response DTO for a member's avatar image record.
#[derive(Serialize, utoipa::ToSchema)]
pub struct MemberImageResponse {
    /// Image record ID.
    #[schema(example = 1)]
    pub id: i32,
    /// Family member the image belongs to.
    #[schema(example = "Meera")]
    pub member_name: String,
    /// Object store reference (UUIDv7).
    #[schema(example = "01936f0e-1234-7abc-8000-000000000001")]
    pub image_id: String,
    /// Original upload filename.
    #[schema(example = "meera.jpg")]
    pub file_name: String,
    /// Username of the admin who uploaded the image.
    #[schema(example = "admin")]
    pub uploaded_by: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<member_image::Model> for MemberImageResponse {
    fn from(model: member_image::Model) -> Self {
        Self {
            id: model.id,
            member_name: model.member_name,
            image_id: model.image_id.to_string(),
            file_name: model.file_name,
            uploaded_by: model.uploaded_by,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}
