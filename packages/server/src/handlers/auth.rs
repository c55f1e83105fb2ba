use axum::{Json, extract::State};
use sea_orm::*;
use tracing::instrument;

use crate::entity::user;
use crate::error::{AppError, ErrorBody};
use crate::extractors::json::AppJson;
use crate::models::auth::{LoginRequest, LoginResponse, validate_login_request};
use crate::state::AppState;
use crate::utils::{hash, jwt};

#[utoipa::path(
    post,
    path = "/login",
    tag = "Auth",
    operation_id = "login",
    summary = "Log in with a configured family account",
    description = "Exchanges a {username, password} pair for a bearer token. Accounts are \
        provisioned in server configuration; the password is checked against the stored \
        Argon2 hash. The returned JWT carries the durable user id, username, and role.",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = LoginResponse),
        (status = 400, description = "Validation error (VALIDATION)", body = ErrorBody),
        (status = 401, description = "Unknown account or wrong password (INVALID_CREDENTIALS)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, payload), fields(username = %payload.username))]
pub async fn login(
    State(state): State<AppState>,
    AppJson(payload): AppJson<LoginRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    validate_login_request(&payload)?;

    let username = payload.username.trim();

    let account = state
        .config
        .find_account(username)
        .ok_or(AppError::InvalidCredentials)?;

    let is_valid = hash::verify_password(&payload.password, &account.password_hash)
        .map_err(|e| AppError::Internal(format!("Password verify error: {}", e)))?;

    if !is_valid {
        return Err(AppError::InvalidCredentials);
    }

    let user = find_or_create_user(&state.db, username, &account.role).await?;

    let token = jwt::sign(
        user.id,
        &user.username,
        &account.role,
        &state.config.auth.jwt_secret,
        state.config.auth.token_ttl_hours,
    )
    .map_err(|e| AppError::Internal(format!("JWT sign error: {}", e)))?;

    Ok(Json(LoginResponse {
        token,
        user_id: user.id,
        username: user.username,
        role: account.role.clone(),
    }))
}

/// Resolve the durable user row for a configured account, creating it on
/// first login. The row records identity and upload attribution; credentials
/// stay in configuration.
async fn find_or_create_user(
    db: &DatabaseConnection,
    username: &str,
    role: &str,
) -> Result<user::Model, AppError> {
    if let Some(existing) = user::Entity::find()
        .filter(user::Column::Username.eq(username))
        .one(db)
        .await?
    {
        if existing.role != role {
            // Role changed in configuration; keep the catalog row in step.
            let mut active: user::ActiveModel = existing.into();
            active.role = Set(role.to_string());
            return Ok(active.update(db).await?);
        }
        return Ok(existing);
    }

    let new_user = user::ActiveModel {
        username: Set(username.to_string()),
        role: Set(role.to_string()),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    };

    match new_user.insert(db).await {
        Ok(user) => Ok(user),
        Err(e) => match e.sql_err() {
            // Two first logins raced; the other one won the insert.
            Some(SqlErr::UniqueConstraintViolation(_)) => user::Entity::find()
                .filter(user::Column::Username.eq(username))
                .one(db)
                .await?
                .ok_or_else(|| AppError::Internal("User row missing after insert race".into())),
            _ => Err(AppError::from(e)),
        },
    }
}
