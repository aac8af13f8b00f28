use axum::{
    extract::Request,
    http::{HeaderMap, StatusCode},
    middleware::Next,
    response::{IntoResponse, Json, Response},
};
use serde_json::json;

use crate::models::user::UserRole;
use crate::utils::token::{decode_token, Claims};

fn reject(status: StatusCode, code: &str) -> Response {
    (status, Json(json!({ "error": code }))).into_response()
}

fn claims_from_headers(headers: &HeaderMap) -> Result<Claims, Response> {
    let Some(auth_header) = headers.get(axum::http::header::AUTHORIZATION) else {
        return Err(reject(StatusCode::UNAUTHORIZED, "missing_authorization"));
    };
    let Ok(auth_str) = auth_header.to_str() else {
        return Err(reject(StatusCode::UNAUTHORIZED, "bad_authorization"));
    };
    let Some(token) = auth_str.strip_prefix("Bearer ") else {
        return Err(reject(StatusCode::UNAUTHORIZED, "unsupported_scheme"));
    };

    let config = crate::config::get_config();
    let claims = decode_token(token.trim(), &config.jwt_secret)
        .map_err(|_| reject(StatusCode::UNAUTHORIZED, "invalid_token"))?;
    if claims.user_id().is_err() {
        return Err(reject(StatusCode::UNAUTHORIZED, "invalid_token"));
    }
    Ok(claims)
}

/// Claims for an optional bearer token. Absent or invalid tokens yield `None`.
pub fn optional_claims(headers: &HeaderMap) -> Option<Claims> {
    claims_from_headers(headers).ok()
}

pub async fn require_bearer_auth(mut req: Request, next: Next) -> Response {
    match claims_from_headers(req.headers()) {
        Ok(claims) => {
            req.extensions_mut().insert(claims);
            next.run(req).await
        }
        Err(resp) => resp,
    }
}

pub async fn require_admin(mut req: Request, next: Next) -> Response {
    match claims_from_headers(req.headers()) {
        Ok(claims) => {
            if claims.role() != UserRole::Admin {
                return reject(StatusCode::FORBIDDEN, "forbidden");
            }
            req.extensions_mut().insert(claims);
            next.run(req).await
        }
        Err(resp) => resp,
    }
}
