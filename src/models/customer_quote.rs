use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A persisted quote. `actual_size` holds the parcel record's acreage when
/// `size_verified` is set, otherwise the customer's claimed size.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct CustomerQuote {
    pub id: i64,
    pub user_id: Option<i64>,
    pub name: String,
    pub email: Option<String>,
    pub address: String,
    pub phone: String,
    pub claimed_size: f64,
    pub actual_size: f64,
    pub size_verified: bool,
    #[serde(with = "rust_decimal::serde::float")]
    pub monthly_quote: Decimal,
    pub parcel_id: Option<String>,
    pub purchased: bool,
    pub stripe_payment_id: Option<String>,
    pub service_start_date: Option<NaiveDate>,
    pub service_frequency: Option<String>,
    pub service_status: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewCustomerQuote {
    pub user_id: Option<i64>,
    pub name: String,
    pub email: Option<String>,
    pub address: String,
    pub phone: String,
    pub claimed_size: f64,
    pub actual_size: f64,
    pub size_verified: bool,
    pub monthly_quote: Decimal,
    pub parcel_id: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ServiceFrequency {
    Weekly,
    Biweekly,
    Monthly,
}

impl ServiceFrequency {
    pub fn as_str(&self) -> &'static str {
        match self {
            ServiceFrequency::Weekly => "weekly",
            ServiceFrequency::Biweekly => "biweekly",
            ServiceFrequency::Monthly => "monthly",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "weekly" => Some(ServiceFrequency::Weekly),
            "biweekly" => Some(ServiceFrequency::Biweekly),
            "monthly" => Some(ServiceFrequency::Monthly),
            _ => None,
        }
    }

    /// Days between visits. A month is counted as 30 days.
    pub fn interval_days(&self) -> i64 {
        match self {
            ServiceFrequency::Weekly => 7,
            ServiceFrequency::Biweekly => 14,
            ServiceFrequency::Monthly => 30,
        }
    }
}

impl Default for ServiceFrequency {
    fn default() -> Self {
        ServiceFrequency::Weekly
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ServiceStatus {
    Pending,
    Active,
    Paused,
    Cancelled,
}

impl ServiceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ServiceStatus::Pending => "pending",
            ServiceStatus::Active => "active",
            ServiceStatus::Paused => "paused",
            ServiceStatus::Cancelled => "cancelled",
        }
    }
}

impl CustomerQuote {
    /// Stored frequency, weekly when unset or unrecognised.
    pub fn frequency(&self) -> ServiceFrequency {
        self.service_frequency
            .as_deref()
            .and_then(ServiceFrequency::parse)
            .unwrap_or_default()
    }
}
