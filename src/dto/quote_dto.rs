use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::models::customer_quote::{CustomerQuote, ServiceFrequency, ServiceStatus};
use crate::utils::validation::{validate_person_name, validate_phone, validate_zipcode};

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct QuoteRequest {
    #[validate(length(min = 2, max = 100), custom(function = "validate_person_name"))]
    pub name: String,
    #[validate(email)]
    pub email: Option<String>,
    #[validate(length(min = 5, max = 200))]
    pub street_address: String,
    #[validate(length(min = 2, max = 100))]
    pub city: String,
    #[validate(custom(function = "validate_zipcode"))]
    pub zipcode: String,
    #[validate(length(min = 10, max = 20), custom(function = "validate_phone"))]
    pub phone: String,
    /// Self-reported lawn size in acres.
    #[validate(range(exclusive_min = 0.0, max = 100.0))]
    pub claimed_size: f64,
}

impl QuoteRequest {
    pub fn normalized(self) -> Self {
        Self {
            name: self.name.trim().to_string(),
            email: self
                .email
                .map(|e| e.trim().to_string())
                .filter(|e| !e.is_empty()),
            street_address: self.street_address.trim().to_string(),
            city: self.city.trim().to_string(),
            zipcode: self.zipcode.trim().to_string(),
            phone: self.phone.trim().to_string(),
            claimed_size: self.claimed_size,
        }
    }

    pub fn full_address(&self) -> String {
        format!("{}, {}, MD {}", self.street_address, self.city, self.zipcode)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct QuoteResponse {
    pub customer_id: i64,
    pub claimed_size: f64,
    pub actual_size: f64,
    #[serde(with = "rust_decimal::serde::float")]
    #[schema(value_type = f64)]
    pub monthly_quote: Decimal,
    /// True when `actual_size` came from the parcel record.
    pub size_verified: bool,
}

impl From<&CustomerQuote> for QuoteResponse {
    fn from(q: &CustomerQuote) -> Self {
        Self {
            customer_id: q.id,
            claimed_size: q.claimed_size,
            actual_size: q.actual_size,
            monthly_quote: q.monthly_quote,
            size_verified: q.size_verified,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct QuoteSummary {
    pub id: i64,
    pub name: String,
    pub email: Option<String>,
    pub address: String,
    pub phone: String,
    pub claimed_size: f64,
    pub actual_size: f64,
    pub size_verified: bool,
    #[serde(with = "rust_decimal::serde::float")]
    #[schema(value_type = f64)]
    pub monthly_quote: Decimal,
    pub purchased: bool,
    pub service_start_date: Option<NaiveDate>,
    pub service_frequency: Option<String>,
    pub service_status: String,
    pub created_at: DateTime<Utc>,
}

impl From<CustomerQuote> for QuoteSummary {
    fn from(q: CustomerQuote) -> Self {
        Self {
            id: q.id,
            name: q.name,
            email: q.email,
            address: q.address,
            phone: q.phone,
            claimed_size: q.claimed_size,
            actual_size: q.actual_size,
            size_verified: q.size_verified,
            monthly_quote: q.monthly_quote,
            purchased: q.purchased,
            service_start_date: q.service_start_date,
            service_frequency: q.service_frequency,
            service_status: q.service_status,
            created_at: q.created_at,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
pub struct QuoteListQuery {
    pub skip: Option<i64>,
    pub limit: Option<i64>,
    pub purchased: Option<bool>,
    pub service_status: Option<ServiceStatus>,
}

impl QuoteListQuery {
    pub const MAX_LIMIT: i64 = 500;

    pub fn offset_limit(&self) -> (i64, i64) {
        let skip = self.skip.unwrap_or(0).max(0);
        let limit = self.limit.unwrap_or(100).clamp(1, Self::MAX_LIMIT);
        (skip, limit)
    }
}

/// Admin correction of a stored quote. A new `actual_size` re-prices the
/// quote unless `monthly_quote` is given too.
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateQuoteRequest {
    #[validate(length(min = 2, max = 100), custom(function = "validate_person_name"))]
    pub name: Option<String>,
    #[validate(length(min = 10, max = 20), custom(function = "validate_phone"))]
    pub phone: Option<String>,
    #[validate(length(min = 5, max = 500))]
    pub address: Option<String>,
    #[validate(range(exclusive_min = 0.0, max = 10000.0))]
    pub actual_size: Option<f64>,
    #[serde(default, with = "rust_decimal::serde::float_option")]
    #[schema(value_type = Option<f64>)]
    pub monthly_quote: Option<Decimal>,
    pub service_status: Option<ServiceStatus>,
    pub service_frequency: Option<ServiceFrequency>,
}

impl UpdateQuoteRequest {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.phone.is_none()
            && self.address.is_none()
            && self.actual_size.is_none()
            && self.monthly_quote.is_none()
            && self.service_status.is_none()
            && self.service_frequency.is_none()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ScheduleServiceRequest {
    pub service_start_date: NaiveDate,
    #[serde(default)]
    pub service_frequency: ServiceFrequency,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ScheduleServiceResponse {
    pub customer_id: i64,
    pub service_start_date: NaiveDate,
    pub service_frequency: String,
    pub service_status: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DashboardStats {
    pub total_quotes: i64,
    pub purchased_quotes: i64,
    pub conversion_rate: f64,
    #[serde(with = "rust_decimal::serde::float")]
    #[schema(value_type = f64)]
    pub total_revenue: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    #[schema(value_type = f64)]
    pub average_quote: Decimal,
    pub total_users: i64,
}
