use axum::extract::{Path, State};
use axum::response::Response;
use tracing::instrument;

use crate::error::{AppError, ErrorBody};
use crate::lifecycle::Lifecycle;
use crate::state::AppState;

use super::streaming::{self, Disposition};

#[utoipa::path(
    get,
    path = "/{member_name}/image",
    tag = "Member Images",
    operation_id = "getMemberImage",
    summary = "Fetch a member's avatar image",
    description = "Streams the avatar stored for the member, inline. Public: avatars \
        decorate the login and dashboard screens before authentication.",
    params(("member_name" = String, Path, description = "Family member name")),
    responses(
        (status = 200, description = "Avatar image content"),
        (status = 404, description = "No image for this member (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state), fields(member_name))]
pub async fn get_member_image(
    State(state): State<AppState>,
    Path(member_name): Path<String>,
) -> Result<Response, AppError> {
    let lifecycle = Lifecycle::new(&state.db, state.objects.as_ref());
    let (image, size, reader) = lifecycle.open_member_image(member_name.trim()).await?;

    streaming::stream_response(&image.file_name, size, reader, Disposition::Inline)
}
