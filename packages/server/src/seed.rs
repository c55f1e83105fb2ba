use sea_orm::*;
use sea_query::{Index, PostgresQueryBuilder};
use tracing::info;

use crate::entity::document;

/// Ensure required database indexes exist.
///
/// SeaORM's schema-sync doesn't support composite non-unique indexes,
/// so we create them manually on startup. The quoted-identifier SQL this
/// produces is valid on both Postgres and SQLite.
pub async fn ensure_indexes(db: &DatabaseConnection) -> Result<(), DbErr> {
    // Composite index for member-scoped browsing:
    // SELECT ... WHERE member_name = ? OR category IN (...) ORDER BY created_at DESC
    let stmt = Index::create()
        .if_not_exists()
        .name("idx_document_member_created")
        .table(document::Entity)
        .col(document::Column::MemberName)
        .col(document::Column::CreatedAt)
        .to_string(PostgresQueryBuilder);

    let result = db.execute_unprepared(&stmt).await;

    match result {
        Ok(_) => {
            info!("Ensured index idx_document_member_created exists");
        }
        Err(e) => {
            tracing::warn!("Failed to create index idx_document_member_created: {}", e);
        }
    }

    // Plain index for the newest-first full listing.
    let stmt = Index::create()
        .if_not_exists()
        .name("idx_document_created")
        .table(document::Entity)
        .col(document::Column::CreatedAt)
        .to_string(PostgresQueryBuilder);

    let result = db.execute_unprepared(&stmt).await;
    match result {
        Ok(_) => {
            info!("Ensured index idx_document_created exists");
        }
        Err(e) => {
            tracing::warn!("Failed to create index idx_document_created: {}", e);
        }
    }

    Ok(())
}
