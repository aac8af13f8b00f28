use axum::{
    extract::{Path, Query, State},
    response::{IntoResponse, Json},
    Extension,
};
use validator::Validate;

use crate::{
    dto::{
        auth_dto::{UpdateUserRequest, UserDetailResponse, UserListQuery, UserResponse},
        calendar_dto::{CalendarQuery, CalendarResponse},
        quote_dto::{DashboardStats, MessageResponse, QuoteListQuery, QuoteSummary, UpdateQuoteRequest},
    },
    error::{Error, Result},
    services::{
        calendar::admin_calendar,
        quote_service::{conversion_rate, QuoteRemoval},
    },
    utils::{extract::ApiJson, time::{business_today, MonthWindow}, token::Claims},
    AppState,
};

#[utoipa::path(
    get,
    path = "/api/admin/quotes",
    params(QuoteListQuery),
    responses(
        (status = 200, description = "All quotes, newest first", body = [QuoteSummary]),
        (status = 401, description = "Missing or invalid token"),
        (status = 403, description = "Caller is not an admin")
    )
)]
pub async fn list_quotes(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Query(query): Query<QuoteListQuery>,
) -> Result<impl IntoResponse> {
    let (skip, limit) = query.offset_limit();
    let quotes = state
        .quote_service
        .list_all(skip, limit, query.purchased, query.service_status)
        .await?;
    tracing::info!(admin = %claims.sub, count = quotes.len(), "admin listed quotes");
    Ok(Json(
        quotes.into_iter().map(QuoteSummary::from).collect::<Vec<_>>(),
    ))
}

#[utoipa::path(
    get,
    path = "/api/admin/quotes/{id}",
    params(
        ("id" = i64, Path, description = "Quote ID")
    ),
    responses(
        (status = 200, description = "Quote", body = QuoteSummary),
        (status = 404, description = "Quote not found")
    )
)]
pub async fn get_quote(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse> {
    let quote = state
        .quote_service
        .get(id)
        .await?
        .ok_or_else(|| Error::NotFound("Quote not found".into()))?;
    Ok(Json(QuoteSummary::from(quote)))
}

#[utoipa::path(
    patch,
    path = "/api/admin/quotes/{id}",
    params(
        ("id" = i64, Path, description = "Quote ID")
    ),
    request_body = UpdateQuoteRequest,
    responses(
        (status = 200, description = "Corrected quote", body = QuoteSummary),
        (status = 400, description = "Invalid field or empty update"),
        (status = 404, description = "Quote not found")
    )
)]
pub async fn update_quote(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<i64>,
    ApiJson(payload): ApiJson<UpdateQuoteRequest>,
) -> Result<impl IntoResponse> {
    if payload.is_empty() {
        return Err(Error::BadRequest("Nothing to update".into()));
    }
    payload.validate()?;
    let quote = state.quote_service.update_by_admin(id, &payload).await?;
    tracing::info!(admin = %claims.sub, quote_id = id, "admin corrected quote");
    Ok(Json(QuoteSummary::from(quote)))
}

pub async fn remove_quote(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse> {
    let message = match state.quote_service.remove(id).await? {
        QuoteRemoval::Cancelled => "Service cancelled",
        QuoteRemoval::Deleted => "Quote deleted",
    };
    Ok(Json(MessageResponse {
        message: message.to_string(),
    }))
}

#[utoipa::path(
    get,
    path = "/api/admin/stats",
    responses(
        (status = 200, description = "Business totals", body = DashboardStats)
    )
)]
pub async fn stats(State(state): State<AppState>) -> Result<impl IntoResponse> {
    let totals = state.quote_service.totals().await?;
    let total_users = state.user_service.count().await?;
    Ok(Json(DashboardStats {
        total_quotes: totals.total_quotes,
        purchased_quotes: totals.purchased_quotes,
        conversion_rate: conversion_rate(totals.total_quotes, totals.purchased_quotes),
        total_revenue: totals.total_revenue,
        average_quote: totals.average_quote,
        total_users,
    }))
}

#[utoipa::path(
    get,
    path = "/api/admin/calendar",
    params(CalendarQuery),
    responses(
        (status = 200, description = "All visits in the month with daily capacity", body = CalendarResponse),
        (status = 400, description = "Invalid year or month")
    )
)]
pub async fn calendar(
    State(state): State<AppState>,
    Query(query): Query<CalendarQuery>,
) -> Result<impl IntoResponse> {
    let window = MonthWindow::resolve(query.year, query.month, business_today())?;
    let services = state.quote_service.list_scheduled(None, window.last).await?;
    Ok(Json(admin_calendar(&window, &services)))
}

pub async fn list_users(
    State(state): State<AppState>,
    Query(query): Query<UserListQuery>,
) -> Result<impl IntoResponse> {
    let users = state.user_service.list(&query).await?;
    Ok(Json(
        users.into_iter().map(UserResponse::from).collect::<Vec<_>>(),
    ))
}

pub async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse> {
    let user = state
        .user_service
        .get(id)
        .await?
        .ok_or_else(|| Error::NotFound("User not found".into()))?;
    let quotes_count = state.quote_service.count_for_user(id).await?;
    Ok(Json(UserDetailResponse {
        user: UserResponse::from(user),
        quotes_count,
    }))
}

pub async fn update_user(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<i64>,
    ApiJson(payload): ApiJson<UpdateUserRequest>,
) -> Result<impl IntoResponse> {
    if payload.role.is_none() && payload.is_active.is_none() {
        return Err(Error::BadRequest("Nothing to update".into()));
    }
    if claims.user_id()? == id && (payload.is_active == Some(false) || payload.role.is_some()) {
        return Err(Error::BadRequest(
            "Admins cannot change their own role or deactivate themselves".into(),
        ));
    }
    let user = state
        .user_service
        .update_access(id, payload.role, payload.is_active)
        .await?;
    Ok(Json(UserResponse::from(user)))
}

/// Soft delete: the account is deactivated, its quotes kept.
pub async fn deactivate_user(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse> {
    if claims.user_id()? == id {
        return Err(Error::BadRequest("Cannot deactivate your own account".into()));
    }
    let user = state.user_service.update_access(id, None, Some(false)).await?;
    Ok(Json(MessageResponse {
        message: format!("User {} has been deactivated", user.email),
    }))
}
