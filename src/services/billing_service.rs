use chrono::{NaiveDate, Utc};
use reqwest::Client;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use url::Url;
use uuid::Uuid;

use crate::dto::billing_dto::{CheckoutSession, StripeEvent, CHECKOUT_COMPLETED, SUBSCRIPTION_DELETED};
use crate::error::{Error, Result};
use crate::models::customer_quote::CustomerQuote;
use crate::services::quote_service::QuoteService;
use crate::utils::signature::{verify_stripe_signature, DEFAULT_TOLERANCE_SECS};
use crate::utils::time::{business_today, earliest_service_start};

const PAYMENT_SERVICE_ERROR: &str = "Payment service error. Please try again later.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WebhookOutcome {
    Purchased(i64),
    Cancelled(i64),
    NoMatch,
    Ignored,
}

#[derive(Clone)]
pub struct BillingService {
    client: Client,
    api_base: String,
    secret_key: String,
    webhook_secret: String,
    public_base_url: Url,
    service_lead_days: i64,
    quote_service: QuoteService,
}

impl BillingService {
    pub fn new(
        client: Client,
        api_base: String,
        secret_key: String,
        webhook_secret: String,
        public_base_url: Url,
        service_lead_days: i64,
        quote_service: QuoteService,
    ) -> Self {
        Self {
            client,
            api_base: api_base.trim_end_matches('/').to_string(),
            secret_key,
            webhook_secret,
            public_base_url,
            service_lead_days,
            quote_service,
        }
    }

    fn redirect_url(&self, path_and_query: &str) -> String {
        format!(
            "{}{}",
            self.public_base_url.as_str().trim_end_matches('/'),
            path_and_query
        )
    }

    /// Opens a monthly subscription checkout for a quote and returns the
    /// hosted checkout URL. Ownership and purchase state are the caller's
    /// concern.
    pub async fn create_checkout_session(
        &self,
        quote: &CustomerQuote,
        user_id: i64,
        customer_email: &str,
    ) -> Result<String> {
        let unit_amount = to_cents(quote.monthly_quote)
            .filter(|cents| *cents > 0)
            .ok_or_else(|| Error::BadRequest("Invalid quote amount".into()))?;

        let form: Vec<(&str, String)> = vec![
            ("mode", "subscription".to_string()),
            ("payment_method_types[0]", "card".to_string()),
            ("line_items[0][quantity]", "1".to_string()),
            ("line_items[0][price_data][currency]", "usd".to_string()),
            ("line_items[0][price_data][unit_amount]", unit_amount.to_string()),
            ("line_items[0][price_data][recurring][interval]", "month".to_string()),
            (
                "line_items[0][price_data][product_data][name]",
                format!("Monthly Lawn Care - {:.2} acres", quote.actual_size),
            ),
            (
                "line_items[0][price_data][product_data][description]",
                format!("Weekly mowing service for {}", quote.address),
            ),
            (
                "success_url",
                self.redirect_url("/payment/success?session_id={CHECKOUT_SESSION_ID}"),
            ),
            ("cancel_url", self.redirect_url("/payment/cancel")),
            ("customer_email", customer_email.to_string()),
            ("metadata[customer_id]", quote.id.to_string()),
            ("metadata[user_id]", user_id.to_string()),
            ("metadata[quote_amount]", quote.monthly_quote.to_string()),
            ("subscription_data[metadata][customer_id]", quote.id.to_string()),
            ("subscription_data[metadata][user_id]", user_id.to_string()),
        ];

        let response = self
            .client
            .post(format!("{}/v1/checkout/sessions", self.api_base))
            .bearer_auth(&self.secret_key)
            .header("Idempotency-Key", Uuid::new_v4().to_string())
            .form(&form)
            .send()
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "stripe request failed");
                Error::Upstream(PAYMENT_SERVICE_ERROR.into())
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            tracing::error!(%status, body = %body, "stripe rejected checkout session");
            return Err(Error::Upstream(PAYMENT_SERVICE_ERROR.into()));
        }

        let session = response.json::<CheckoutSession>().await.map_err(|e| {
            tracing::error!(error = %e, "unreadable stripe checkout response");
            Error::Upstream(PAYMENT_SERVICE_ERROR.into())
        })?;
        let url = session.url.ok_or_else(|| {
            tracing::error!(session_id = %session.id, "stripe checkout session without url");
            Error::Upstream(PAYMENT_SERVICE_ERROR.into())
        })?;

        tracing::info!(
            session_id = %session.id,
            quote_id = quote.id,
            user_id,
            "checkout session created"
        );
        Ok(url)
    }

    /// Authenticates a webhook delivery and parses the event.
    pub fn verify_event(&self, payload: &[u8], signature: Option<&str>) -> Result<StripeEvent> {
        let signature = signature
            .ok_or_else(|| Error::InvalidSignature("Missing stripe-signature header".into()))?;
        if self.webhook_secret.is_empty() {
            tracing::error!("stripe webhook received but STRIPE_WEBHOOK_SECRET is not set");
            return Err(Error::InvalidSignature("Invalid signature".into()));
        }
        verify_stripe_signature(
            payload,
            signature,
            &self.webhook_secret,
            Utc::now().timestamp(),
            DEFAULT_TOLERANCE_SECS,
        )
        .map_err(|e| {
            tracing::warn!("rejected webhook: {}", e);
            Error::InvalidSignature("Invalid signature".into())
        })?;

        serde_json::from_slice::<StripeEvent>(payload).map_err(|e| {
            tracing::warn!(error = %e, "invalid webhook payload");
            Error::BadRequest("Invalid payload".into())
        })
    }

    pub async fn apply_event(&self, event: &StripeEvent) -> Result<WebhookOutcome> {
        let today = business_today();
        match event.event_type.as_str() {
            CHECKOUT_COMPLETED => self.on_checkout_completed(event, today).await,
            SUBSCRIPTION_DELETED => self.on_subscription_deleted(event).await,
            other => {
                tracing::info!(event_id = ?event.id, "unhandled webhook event type: {}", other);
                Ok(WebhookOutcome::Ignored)
            }
        }
    }

    async fn on_checkout_completed(
        &self,
        event: &StripeEvent,
        today: NaiveDate,
    ) -> Result<WebhookOutcome> {
        let session = &event.data.object;
        let Some(customer_id) = session
            .metadata
            .get("customer_id")
            .and_then(|raw| raw.parse::<i64>().ok())
        else {
            tracing::error!(session_id = %session.id, "checkout completed without customer_id");
            return Ok(WebhookOutcome::NoMatch);
        };

        let default_start = earliest_service_start(today, self.service_lead_days);
        match self
            .quote_service
            .mark_purchased(customer_id, &session.id, default_start)
            .await?
        {
            Some(quote) => {
                tracing::info!(
                    quote_id = quote.id,
                    session_id = %session.id,
                    "payment completed, ${}/month",
                    quote.monthly_quote
                );
                Ok(WebhookOutcome::Purchased(quote.id))
            }
            None => {
                tracing::error!(customer_id, "quote not found for checkout");
                Ok(WebhookOutcome::NoMatch)
            }
        }
    }

    /// Matches the cancelled subscription by the checkout session recorded at
    /// purchase, else by the quote id copied onto the subscription at checkout.
    async fn on_subscription_deleted(&self, event: &StripeEvent) -> Result<WebhookOutcome> {
        let subscription = &event.data.object;

        let cancelled = if let Some(session_id) = subscription.metadata.get("checkout_session_id") {
            self.quote_service.cancel_by_payment_id(session_id).await?
        } else if let Some(customer_id) = subscription
            .metadata
            .get("customer_id")
            .and_then(|raw| raw.parse::<i64>().ok())
        {
            self.quote_service.cancel_subscription(customer_id).await?
        } else {
            tracing::info!(subscription = %subscription.id, "cancelled subscription without quote metadata");
            return Ok(WebhookOutcome::NoMatch);
        };

        match cancelled {
            Some(quote) => {
                tracing::info!(quote_id = quote.id, subscription = %subscription.id, "subscription cancelled");
                Ok(WebhookOutcome::Cancelled(quote.id))
            }
            None => Ok(WebhookOutcome::NoMatch),
        }
    }
}

/// Whole cents, rounding half away from zero.
pub fn to_cents(amount: Decimal) -> Option<i64> {
    (amount * Decimal::from(100))
        .round_dp_with_strategy(0, rust_decimal::RoundingStrategy::MidpointAwayFromZero)
        .to_i64()
}
