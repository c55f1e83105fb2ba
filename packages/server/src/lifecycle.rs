use chrono::Utc;
use common::{BoxReader, Bucket, ObjectId, ObjectStore, StoredObject};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set,
};
use tracing::warn;

use crate::entity::{document, member_image};
use crate::error::AppError;
use crate::models::document::{UpdateDocumentRequest, validate_document_fields};
use crate::models::shared::validate_member_name;
use crate::utils::filesize::format_file_size;

/// Metadata accompanying a document upload.
pub struct NewDocument {
    pub title: String,
    pub member_name: String,
    pub category: String,
    pub file_name: String,
    pub uploaded_by: String,
}

/// Metadata accompanying a member image upload.
pub struct NewMemberImage {
    pub member_name: String,
    pub file_name: String,
    pub uploaded_by: String,
}

/// Coordinates paired writes across the catalog database and the object
/// store.
///
/// The two stores share no transaction, so ordering carries the consistency
/// guarantees: objects are written before the catalog rows that reference
/// them, and deleted before those rows are removed. A crash between the two
/// steps leaves either an orphaned object (logged, harmless) or a dangling
/// catalog record (fails safe with `NOT_FOUND` on read).
pub struct Lifecycle<'a> {
    db: &'a DatabaseConnection,
    objects: &'a dyn ObjectStore,
}

impl<'a> Lifecycle<'a> {
    pub fn new(db: &'a DatabaseConnection, objects: &'a dyn ObjectStore) -> Self {
        Self { db, objects }
    }

    /// Persist a catalog record for a payload already written to the store.
    ///
    /// Metadata validation happens here, after the object write, because
    /// multipart fields arrive in client-chosen order and the payload must be
    /// streamed when encountered. A rejected upload discards the object again.
    pub async fn create_document(
        &self,
        meta: NewDocument,
        stored: StoredObject,
    ) -> Result<document::Model, AppError> {
        let category =
            match validate_document_fields(&meta.title, &meta.member_name, &meta.category) {
                Ok(category) => category,
                Err(e) => {
                    self.discard_object(Bucket::Documents, &stored.id).await;
                    return Err(e);
                }
            };

        if stored.size == 0 {
            self.discard_object(Bucket::Documents, &stored.id).await;
            return Err(AppError::Validation("Uploaded file must not be empty".into()));
        }

        let now = Utc::now();
        let model = document::ActiveModel {
            title: Set(meta.title.trim().to_string()),
            member_name: Set(meta.member_name.trim().to_string()),
            category: Set(category.as_str().to_string()),
            file_reference: Set(stored.id.as_uuid()),
            file_name: Set(meta.file_name),
            file_size: Set(format_file_size(stored.size)),
            uploaded_by: Set(meta.uploaded_by),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };

        match model.insert(self.db).await {
            Ok(doc) => Ok(doc),
            Err(e) => {
                warn!(
                    object_id = %stored.id,
                    "Catalog insert failed, stored object is orphaned: {e}"
                );
                Err(e.into())
            }
        }
    }

    /// Update a document's descriptive fields. The stored file is immutable.
    pub async fn update_document(
        &self,
        id: i32,
        req: &UpdateDocumentRequest,
    ) -> Result<document::Model, AppError> {
        let category = validate_document_fields(&req.title, &req.member_name, &req.category)?;

        let existing = document::Entity::find_by_id(id)
            .one(self.db)
            .await?
            .ok_or_else(|| AppError::NotFound("Document not found".into()))?;

        let mut active: document::ActiveModel = existing.into();
        active.title = Set(req.title.trim().to_string());
        active.member_name = Set(req.member_name.trim().to_string());
        active.category = Set(category.as_str().to_string());
        active.updated_at = Set(Utc::now());

        Ok(active.update(self.db).await?)
    }

    /// Delete a document's stored object and its catalog record.
    ///
    /// A missing or undeletable object is tolerated: the listing must go away
    /// even when the payload is already gone.
    pub async fn delete_document(&self, id: i32) -> Result<document::Model, AppError> {
        let existing = document::Entity::find_by_id(id)
            .one(self.db)
            .await?
            .ok_or_else(|| AppError::NotFound("Document not found".into()))?;

        let object_id = ObjectId::from_uuid(existing.file_reference);
        self.retire_object(Bucket::Documents, &object_id).await;

        document::Entity::delete_by_id(id).exec(self.db).await?;
        Ok(existing)
    }

    /// Open a document's payload for streaming.
    ///
    /// Returns the catalog record, the object size (for Content-Length), and
    /// a reader over the stored bytes. A dangling fileReference surfaces as
    /// `NOT_FOUND`.
    pub async fn open_document(
        &self,
        id: i32,
    ) -> Result<(document::Model, u64, BoxReader), AppError> {
        let doc = document::Entity::find_by_id(id)
            .one(self.db)
            .await?
            .ok_or_else(|| AppError::NotFound("Document not found".into()))?;

        let object_id = ObjectId::from_uuid(doc.file_reference);
        let size = self.objects.size(Bucket::Documents, &object_id).await?;
        let reader = self.objects.get_stream(Bucket::Documents, &object_id).await?;

        Ok((doc, size, reader))
    }

    /// Replace (or create) a member's avatar image record.
    ///
    /// The new payload is already in the store when this runs, so the member
    /// always has a valid image reference: the old record is retired only
    /// after the new object exists.
    pub async fn upsert_member_image(
        &self,
        meta: NewMemberImage,
        stored: StoredObject,
    ) -> Result<member_image::Model, AppError> {
        if let Err(e) = validate_member_name(&meta.member_name) {
            self.discard_object(Bucket::MemberImages, &stored.id).await;
            return Err(e);
        }

        if stored.size == 0 {
            self.discard_object(Bucket::MemberImages, &stored.id).await;
            return Err(AppError::Validation("Uploaded image must not be empty".into()));
        }

        let member_name = meta.member_name.trim().to_string();

        let existing = member_image::Entity::find()
            .filter(member_image::Column::MemberName.eq(&member_name))
            .one(self.db)
            .await?;

        if let Some(old) = existing {
            let old_object = ObjectId::from_uuid(old.image_id);
            self.retire_object(Bucket::MemberImages, &old_object).await;
            member_image::Entity::delete_by_id(old.id)
                .exec(self.db)
                .await?;
        }

        let now = Utc::now();
        let model = member_image::ActiveModel {
            member_name: Set(member_name),
            image_id: Set(stored.id.as_uuid()),
            file_name: Set(meta.file_name),
            uploaded_by: Set(meta.uploaded_by),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };

        match model.insert(self.db).await {
            Ok(image) => Ok(image),
            Err(e) => {
                warn!(
                    object_id = %stored.id,
                    "Image record insert failed, stored object is orphaned: {e}"
                );
                Err(e.into())
            }
        }
    }

    /// Open a member's avatar image for streaming.
    pub async fn open_member_image(
        &self,
        member_name: &str,
    ) -> Result<(member_image::Model, u64, BoxReader), AppError> {
        let image = member_image::Entity::find()
            .filter(member_image::Column::MemberName.eq(member_name))
            .one(self.db)
            .await?
            .ok_or_else(|| AppError::NotFound("Member image not found".into()))?;

        let object_id = ObjectId::from_uuid(image.image_id);
        let size = self.objects.size(Bucket::MemberImages, &object_id).await?;
        let reader = self
            .objects
            .get_stream(Bucket::MemberImages, &object_id)
            .await?;

        Ok((image, size, reader))
    }

    /// Remove an object that was written for a request that later failed
    /// validation. Failure to remove it only costs disk space.
    async fn discard_object(&self, bucket: Bucket, id: &ObjectId) {
        if let Err(e) = self.objects.delete(bucket, id).await {
            warn!(object_id = %id, "Failed to discard rejected upload: {e}");
        }
    }

    /// Delete an object ahead of removing the record that references it,
    /// tolerating absence and store failures.
    async fn retire_object(&self, bucket: Bucket, id: &ObjectId) {
        match self.objects.delete(bucket, id).await {
            Ok(true) => {}
            Ok(false) => {
                warn!(object_id = %id, "Stored object already absent during delete");
            }
            Err(e) => {
                warn!(object_id = %id, "Failed to delete stored object, proceeding: {e}");
            }
        }
    }
}
