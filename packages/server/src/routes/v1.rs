use utoipa_axum::{router::OpenApiRouter, routes};

use crate::config::AppConfig;
use crate::handlers;
use crate::state::AppState;

pub fn routes(config: &AppConfig) -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .nest("/auth", auth_routes())
        .nest("/documents", document_routes())
        .nest("/admin", admin_routes(config))
        .nest("/members", member_routes())
}

fn auth_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new().routes(routes!(handlers::auth::login))
}

fn document_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(handlers::document::list_documents))
        .routes(routes!(handlers::document::view_document))
        .routes(routes!(handlers::document::download_document))
}

fn admin_routes(config: &AppConfig) -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(
            handlers::admin::upload_document,
            handlers::admin::list_all_documents
        ))
        .routes(routes!(
            handlers::admin::update_document,
            handlers::admin::delete_document
        ))
        .routes(routes!(handlers::admin::upload_member_image))
        .layer(handlers::admin::upload_body_limit(
            config.storage.max_object_size,
        ))
}

fn member_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new().routes(routes!(handlers::member_image::get_member_image))
}
