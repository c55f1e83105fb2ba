use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "document")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub title: String,
    /// Family member the document belongs to. Free text at this layer;
    /// the client constrains it to the known member list.
    pub member_name: String,
    /// One of:
    /// Personal Documents, Academic Certificates, Family Records, Bills and Other
    pub category: String,

    /// Object store id of the binary payload. Set once at upload; replacing
    /// a file means delete + re-create.
    pub file_reference: Uuid,
    /// Original upload filename. Descriptive, not authoritative.
    pub file_name: String,
    /// Human-readable size rendered at upload time (e.g. "1.17 KB").
    pub file_size: String,

    /// Username of the admin who uploaded the document.
    pub uploaded_by: String,

    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
