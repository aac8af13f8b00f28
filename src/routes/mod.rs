pub mod admin;
pub mod auth;
pub mod dashboard;
pub mod health;
pub mod payments;
pub mod quotes;

use axum::{
    middleware::from_fn,
    routing::{get, post},
    Json, Router,
};
use utoipa::OpenApi;

use crate::{
    dto::{
        billing_dto::WebhookResponse,
        calendar_dto::{CalendarEvent, CalendarResponse, DayAvailability},
        quote_dto::{
            DashboardStats, QuoteRequest, QuoteResponse, QuoteSummary, ScheduleServiceRequest,
            ScheduleServiceResponse, UpdateQuoteRequest,
        },
    },
    middleware::auth::{require_admin, require_bearer_auth},
    models::customer_quote::{ServiceFrequency, ServiceStatus},
    AppState,
};

#[derive(OpenApi)]
#[openapi(
    paths(
        quotes::create_estimate,
        quotes::schedule_service,
        dashboard::my_quotes,
        dashboard::my_quote,
        dashboard::my_calendar,
        admin::list_quotes,
        admin::get_quote,
        admin::update_quote,
        admin::stats,
        admin::calendar,
        payments::stripe_webhook,
    ),
    components(schemas(
        QuoteRequest,
        QuoteResponse,
        QuoteSummary,
        ScheduleServiceRequest,
        ScheduleServiceResponse,
        ServiceFrequency,
        ServiceStatus,
        UpdateQuoteRequest,
        CalendarEvent,
        CalendarResponse,
        DayAvailability,
        DashboardStats,
        WebhookResponse,
    )),
    tags((name = "lawn-quote", description = "Lawn-care quote API"))
)]
pub struct ApiDoc;

async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

/// Full route table. Callers add CORS, tracing and body limits.
pub fn router(state: AppState) -> Router {
    let public_api = Router::new()
        .route("/health", get(health::health))
        .route("/api-docs/openapi.json", get(openapi_json))
        .route("/api/auth/register", post(auth::register))
        .route("/api/auth/login", post(auth::login))
        .route("/api/quotes/estimate", post(quotes::create_estimate))
        .route("/api/payments/webhook", post(payments::stripe_webhook));

    let customer_api = Router::new()
        .route("/api/auth/me", get(auth::me))
        .route("/api/quotes/:id/schedule", post(quotes::schedule_service))
        .route("/api/dashboard/my-quotes", get(dashboard::my_quotes))
        .route("/api/dashboard/my-quotes/:id", get(dashboard::my_quote))
        .route("/api/dashboard/my-calendar", get(dashboard::my_calendar))
        .route("/api/payments/checkout/:id", post(payments::create_checkout))
        .route_layer(from_fn(require_bearer_auth));

    let admin_api = Router::new()
        .route("/api/admin/quotes", get(admin::list_quotes))
        .route(
            "/api/admin/quotes/:id",
            get(admin::get_quote)
                .patch(admin::update_quote)
                .delete(admin::remove_quote),
        )
        .route("/api/admin/stats", get(admin::stats))
        .route("/api/admin/calendar", get(admin::calendar))
        .route("/api/admin/users", get(admin::list_users))
        .route(
            "/api/admin/users/:id",
            get(admin::get_user)
                .patch(admin::update_user)
                .delete(admin::deactivate_user),
        )
        .route_layer(from_fn(require_admin));

    public_api
        .merge(customer_api)
        .merge(admin_api)
        .with_state(state)
}
