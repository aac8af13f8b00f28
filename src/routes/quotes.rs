use axum::{
    extract::{Path, State},
    http::HeaderMap,
    response::{IntoResponse, Json},
    Extension,
};
use validator::Validate;

use crate::{
    dto::quote_dto::{QuoteRequest, QuoteResponse, ScheduleServiceRequest, ScheduleServiceResponse},
    error::{Error, Result},
    middleware::auth::optional_claims,
    utils::{
        extract::ApiJson,
        time::{business_today, earliest_service_start},
        token::Claims,
    },
    AppState,
};

#[utoipa::path(
    post,
    path = "/api/quotes/estimate",
    request_body = QuoteRequest,
    responses(
        (status = 200, description = "Quote computed and stored", body = QuoteResponse),
        (status = 400, description = "A field failed validation")
    )
)]
#[axum::debug_handler]
pub async fn create_estimate(
    State(state): State<AppState>,
    headers: HeaderMap,
    ApiJson(payload): ApiJson<QuoteRequest>,
) -> Result<impl IntoResponse> {
    let request = payload.normalized();
    request.validate()?;

    let user_id = optional_claims(&headers).and_then(|claims| claims.user_id().ok());
    let quote = state.quote_service.create_estimate(user_id, &request).await?;
    Ok(Json(QuoteResponse::from(&quote)))
}

#[utoipa::path(
    post,
    path = "/api/quotes/{id}/schedule",
    params(
        ("id" = i64, Path, description = "Quote ID")
    ),
    request_body = ScheduleServiceRequest,
    responses(
        (status = 200, description = "Service scheduled", body = ScheduleServiceResponse),
        (status = 400, description = "Quote unpaid or start date too soon"),
        (status = 403, description = "Quote belongs to someone else"),
        (status = 404, description = "Quote not found")
    )
)]
#[axum::debug_handler]
pub async fn schedule_service(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<i64>,
    ApiJson(payload): ApiJson<ScheduleServiceRequest>,
) -> Result<impl IntoResponse> {
    let quote = state
        .quote_service
        .get(id)
        .await?
        .ok_or_else(|| Error::NotFound("Quote not found".into()))?;

    let user_id = claims.user_id()?;
    if quote.user_id != Some(user_id) && !claims.is_admin() {
        return Err(Error::Forbidden("Not authorized to schedule this service".into()));
    }
    if !quote.purchased {
        return Err(Error::BadRequest(
            "Quote must be purchased before scheduling service".into(),
        ));
    }

    let earliest = earliest_service_start(business_today(), state.service_lead_days);
    if payload.service_start_date < earliest {
        return Err(Error::BadRequest(format!(
            "Service start date must be at least {} days from today",
            state.service_lead_days
        )));
    }

    let quote = state
        .quote_service
        .schedule_service(id, payload.service_start_date, payload.service_frequency)
        .await?;
    tracing::info!(
        quote_id = id,
        start = %payload.service_start_date,
        frequency = payload.service_frequency.as_str(),
        "service scheduled"
    );

    Ok(Json(ScheduleServiceResponse {
        customer_id: quote.id,
        service_start_date: payload.service_start_date,
        service_frequency: payload.service_frequency.as_str().to_string(),
        service_status: quote.service_status,
    }))
}
