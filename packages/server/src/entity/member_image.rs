use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "member_image")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    /// At most one image per member at any time.
    #[sea_orm(unique)]
    pub member_name: String,

    /// Object store id of the image payload (member-images bucket).
    pub image_id: Uuid,
    pub file_name: String,
    pub uploaded_by: String,

    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
