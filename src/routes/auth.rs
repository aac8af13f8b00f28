use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
    Extension,
};
use validator::Validate;

use crate::{
    config::get_config,
    dto::auth_dto::{LoginRequest, RegisterRequest, TokenResponse, UserResponse},
    error::{Error, Result},
    utils::{
        extract::ApiJson,
        token::{issue_token, Claims},
    },
    AppState,
};

pub async fn register(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<RegisterRequest>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let user = state
        .user_service
        .register(&payload.email, &payload.password)
        .await?;
    Ok((StatusCode::CREATED, Json(UserResponse::from(user))))
}

pub async fn login(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<LoginRequest>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let user = state
        .user_service
        .authenticate(&payload.email, &payload.password)
        .await?;
    let token = issue_token(
        user.id,
        user.role(),
        &get_config().jwt_secret,
        state.jwt_ttl_minutes,
    )?;
    Ok(Json(TokenResponse::bearer(token)))
}

pub async fn me(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse> {
    let user = state
        .user_service
        .get(claims.user_id()?)
        .await?
        .filter(|u| u.is_active)
        .ok_or_else(|| Error::Unauthorized("Account not found or disabled".into()))?;
    Ok(Json(UserResponse::from(user)))
}
