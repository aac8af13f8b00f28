use axum::{
    extract::{Path, State},
    http::HeaderMap,
    response::{IntoResponse, Json},
    Extension,
};
use bytes::Bytes;

use crate::{
    dto::billing_dto::{CheckoutResponse, WebhookResponse},
    error::{Error, Result},
    utils::token::Claims,
    AppState,
};

pub async fn create_checkout(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse> {
    let user_id = claims.user_id()?;
    let quote = state
        .quote_service
        .get(id)
        .await?
        .ok_or_else(|| Error::NotFound("Quote not found".into()))?;

    if quote.user_id != Some(user_id) {
        return Err(Error::Forbidden("Not authorized to purchase this quote".into()));
    }
    if quote.purchased {
        return Err(Error::BadRequest("This quote has already been purchased".into()));
    }

    let user = state
        .user_service
        .get(user_id)
        .await?
        .ok_or_else(|| Error::Unauthorized("Account not found".into()))?;

    let checkout_url = state
        .billing_service
        .create_checkout_session(&quote, user_id, &user.email)
        .await?;
    Ok(Json(CheckoutResponse { checkout_url }))
}

#[utoipa::path(
    post,
    path = "/api/payments/webhook",
    responses(
        (status = 200, description = "Event accepted (matched or not)", body = WebhookResponse),
        (status = 400, description = "Missing or invalid Stripe-Signature, or unreadable payload")
    )
)]
pub async fn stripe_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<impl IntoResponse> {
    let signature = headers
        .get("stripe-signature")
        .and_then(|v| v.to_str().ok());
    let event = state.billing_service.verify_event(&body, signature)?;
    let outcome = state.billing_service.apply_event(&event).await?;
    tracing::debug!(event_type = %event.event_type, ?outcome, "webhook processed");
    Ok(Json(WebhookResponse::success()))
}
