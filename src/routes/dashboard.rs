use axum::{
    extract::{Path, Query, State},
    response::{IntoResponse, Json},
    Extension,
};

use crate::{
    dto::{
        calendar_dto::{CalendarQuery, CalendarResponse},
        quote_dto::QuoteSummary,
    },
    error::{Error, Result},
    services::calendar::customer_calendar,
    utils::{
        time::{business_today, MonthWindow},
        token::Claims,
    },
    AppState,
};

#[utoipa::path(
    get,
    path = "/api/dashboard/my-quotes",
    responses(
        (status = 200, description = "Caller's quotes, newest first", body = [QuoteSummary]),
        (status = 401, description = "Missing or invalid token")
    )
)]
pub async fn my_quotes(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse> {
    let user_id = claims.user_id()?;
    let quotes = state.quote_service.list_for_user(user_id).await?;
    tracing::info!(user_id, count = quotes.len(), "listed own quotes");
    Ok(Json(
        quotes.into_iter().map(QuoteSummary::from).collect::<Vec<_>>(),
    ))
}

#[utoipa::path(
    get,
    path = "/api/dashboard/my-quotes/{id}",
    params(
        ("id" = i64, Path, description = "Quote ID")
    ),
    responses(
        (status = 200, description = "Quote", body = QuoteSummary),
        (status = 404, description = "Not found or not owned by caller")
    )
)]
pub async fn my_quote(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse> {
    let quote = state
        .quote_service
        .get_owned(id, claims.user_id()?)
        .await?
        .ok_or_else(|| Error::NotFound("Quote not found".into()))?;
    Ok(Json(QuoteSummary::from(quote)))
}

#[utoipa::path(
    get,
    path = "/api/dashboard/my-calendar",
    params(CalendarQuery),
    responses(
        (status = 200, description = "Caller's service visits in the month", body = CalendarResponse),
        (status = 400, description = "Invalid year or month")
    )
)]
pub async fn my_calendar(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Query(query): Query<CalendarQuery>,
) -> Result<impl IntoResponse> {
    let window = MonthWindow::resolve(query.year, query.month, business_today())?;
    let services = state
        .quote_service
        .list_scheduled(Some(claims.user_id()?), window.last)
        .await?;
    Ok(Json(customer_calendar(&window, &services)))
}
