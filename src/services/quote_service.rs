use chrono::NaiveDate;
use rust_decimal::Decimal;
use sqlx::{FromRow, PgPool};

use crate::dto::quote_dto::{QuoteRequest, UpdateQuoteRequest};
use crate::error::{Error, Result};
use crate::models::customer_quote::{CustomerQuote, NewCustomerQuote, ServiceFrequency, ServiceStatus};
use crate::services::parcel_service::ParcelService;
use crate::services::pricing;

#[derive(Debug, Clone, FromRow)]
pub struct QuoteTotals {
    pub total_quotes: i64,
    pub purchased_quotes: i64,
    pub total_revenue: Decimal,
    pub average_quote: Decimal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuoteRemoval {
    Cancelled,
    Deleted,
}

#[derive(Clone)]
pub struct QuoteService {
    pool: PgPool,
    parcel_service: ParcelService,
    rate_per_acre: Decimal,
}

impl QuoteService {
    pub fn new(pool: PgPool, parcel_service: ParcelService, rate_per_acre: Decimal) -> Self {
        Self {
            pool,
            parcel_service,
            rate_per_acre,
        }
    }

    pub fn rate_per_acre(&self) -> Decimal {
        self.rate_per_acre
    }

    /// Prices a validated request against the parcel record (or the claimed
    /// size when the record is unavailable) and stores the quote.
    pub async fn create_estimate(
        &self,
        user_id: Option<i64>,
        request: &QuoteRequest,
    ) -> Result<CustomerQuote> {
        let verified = self
            .parcel_service
            .fetch_actual_size(&request.street_address, &request.city, &request.zipcode)
            .await;

        let (actual_size, parcel_id, size_verified) = match verified {
            Some(v) => (v.acres, v.parcel_id, true),
            None => {
                tracing::info!(
                    "using claimed size for {}: {} acres",
                    request.street_address,
                    request.claimed_size
                );
                (request.claimed_size, None, false)
            }
        };

        let monthly_quote = pricing::monthly_quote(self.rate_per_acre, actual_size)?;

        let quote = self
            .insert(NewCustomerQuote {
                user_id,
                name: request.name.clone(),
                email: request.email.clone(),
                address: request.full_address(),
                phone: request.phone.clone(),
                claimed_size: request.claimed_size,
                actual_size,
                size_verified,
                monthly_quote,
                parcel_id,
            })
            .await?;

        tracing::info!(
            quote_id = quote.id,
            user_id = ?user_id,
            size_verified,
            "quote created: {} - ${}/month ({} acres)",
            quote.address,
            quote.monthly_quote,
            quote.actual_size
        );
        Ok(quote)
    }

    pub async fn insert(&self, new: NewCustomerQuote) -> Result<CustomerQuote> {
        let quote = sqlx::query_as::<_, CustomerQuote>(
            r#"
            INSERT INTO customer_quotes
                (user_id, name, email, address, phone, claimed_size, actual_size, size_verified, monthly_quote, parcel_id)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING *
            "#,
        )
        .bind(new.user_id)
        .bind(&new.name)
        .bind(&new.email)
        .bind(&new.address)
        .bind(&new.phone)
        .bind(new.claimed_size)
        .bind(new.actual_size)
        .bind(new.size_verified)
        .bind(new.monthly_quote)
        .bind(&new.parcel_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(quote)
    }

    pub async fn get(&self, id: i64) -> Result<Option<CustomerQuote>> {
        let quote = sqlx::query_as::<_, CustomerQuote>("SELECT * FROM customer_quotes WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(quote)
    }

    pub async fn get_owned(&self, id: i64, user_id: i64) -> Result<Option<CustomerQuote>> {
        let quote = sqlx::query_as::<_, CustomerQuote>(
            "SELECT * FROM customer_quotes WHERE id = $1 AND user_id = $2",
        )
        .bind(id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(quote)
    }

    pub async fn list_for_user(&self, user_id: i64) -> Result<Vec<CustomerQuote>> {
        let quotes = sqlx::query_as::<_, CustomerQuote>(
            r#"
            SELECT * FROM customer_quotes
            WHERE user_id = $1
            ORDER BY created_at DESC, id DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(quotes)
    }

    pub async fn list_all(
        &self,
        skip: i64,
        limit: i64,
        purchased: Option<bool>,
        status: Option<ServiceStatus>,
    ) -> Result<Vec<CustomerQuote>> {
        let quotes = sqlx::query_as::<_, CustomerQuote>(
            r#"
            SELECT * FROM customer_quotes
            WHERE ($3::BOOLEAN IS NULL OR purchased = $3)
              AND ($4::TEXT IS NULL OR service_status = $4)
            ORDER BY created_at DESC, id DESC
            OFFSET $1 LIMIT $2
            "#,
        )
        .bind(skip)
        .bind(limit)
        .bind(purchased)
        .bind(status.map(|s| s.as_str()))
        .fetch_all(&self.pool)
        .await?;
        Ok(quotes)
    }

    pub async fn count_for_user(&self, user_id: i64) -> Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM customer_quotes WHERE user_id = $1")
            .bind(user_id)
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    /// Paid services that are pending or active and have a start date on or
    /// before `until`. `user_id` narrows to one customer.
    pub async fn list_scheduled(
        &self,
        user_id: Option<i64>,
        until: NaiveDate,
    ) -> Result<Vec<CustomerQuote>> {
        let quotes = sqlx::query_as::<_, CustomerQuote>(
            r#"
            SELECT * FROM customer_quotes
            WHERE purchased
              AND service_start_date IS NOT NULL
              AND service_start_date <= $2
              AND service_status IN ($3, $4)
              AND ($1::BIGINT IS NULL OR user_id = $1)
            ORDER BY id
            "#,
        )
        .bind(user_id)
        .bind(until)
        .bind(ServiceStatus::Pending.as_str())
        .bind(ServiceStatus::Active.as_str())
        .fetch_all(&self.pool)
        .await?;
        Ok(quotes)
    }

    /// Applies an admin correction. A corrected size is re-priced at the
    /// configured rate unless an explicit amount is supplied.
    pub async fn update_by_admin(&self, id: i64, update: &UpdateQuoteRequest) -> Result<CustomerQuote> {
        let monthly_quote = match (update.monthly_quote, update.actual_size) {
            (Some(amount), _) if amount.is_sign_negative() => {
                return Err(Error::BadRequest("monthly_quote cannot be negative".into()));
            }
            (Some(amount), _) => Some(amount.round_dp_with_strategy(
                2,
                rust_decimal::RoundingStrategy::MidpointAwayFromZero,
            )),
            (None, Some(acres)) => Some(pricing::monthly_quote(self.rate_per_acre, acres)?),
            (None, None) => None,
        };

        let quote = sqlx::query_as::<_, CustomerQuote>(
            r#"
            UPDATE customer_quotes
            SET name = COALESCE($2, name),
                phone = COALESCE($3, phone),
                address = COALESCE($4, address),
                actual_size = COALESCE($5, actual_size),
                monthly_quote = COALESCE($6, monthly_quote),
                service_status = COALESCE($7, service_status),
                service_frequency = COALESCE($8, service_frequency)
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(update.name.as_deref().map(str::trim))
        .bind(update.phone.as_deref().map(str::trim))
        .bind(update.address.as_deref().map(str::trim))
        .bind(update.actual_size)
        .bind(monthly_quote)
        .bind(update.service_status.map(|s| s.as_str()))
        .bind(update.service_frequency.map(|f| f.as_str()))
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| Error::NotFound("Quote not found".into()))?;

        tracing::info!(
            quote_id = id,
            monthly_quote = %quote.monthly_quote,
            status = %quote.service_status,
            "quote updated by admin"
        );
        Ok(quote)
    }

    /// Paid quotes are cancelled, unpaid ones deleted.
    pub async fn remove(&self, id: i64) -> Result<QuoteRemoval> {
        let quote = self
            .get(id)
            .await?
            .ok_or_else(|| Error::NotFound("Quote not found".into()))?;

        if quote.purchased {
            sqlx::query("UPDATE customer_quotes SET service_status = $2 WHERE id = $1")
                .bind(id)
                .bind(ServiceStatus::Cancelled.as_str())
                .execute(&self.pool)
                .await?;
            tracing::info!(quote_id = id, "service cancelled by admin");
            Ok(QuoteRemoval::Cancelled)
        } else {
            sqlx::query("DELETE FROM customer_quotes WHERE id = $1")
                .bind(id)
                .execute(&self.pool)
                .await?;
            tracing::info!(quote_id = id, "quote deleted by admin");
            Ok(QuoteRemoval::Deleted)
        }
    }

    /// Marks a quote paid. Re-applying the same session id leaves the row
    /// unchanged, and an existing service start date is kept.
    pub async fn mark_purchased(
        &self,
        id: i64,
        payment_id: &str,
        default_start: NaiveDate,
    ) -> Result<Option<CustomerQuote>> {
        let quote = sqlx::query_as::<_, CustomerQuote>(
            r#"
            UPDATE customer_quotes
            SET purchased = TRUE,
                stripe_payment_id = $2,
                service_start_date = COALESCE(service_start_date, $3),
                service_frequency = COALESCE(service_frequency, $4)
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(payment_id)
        .bind(default_start)
        .bind(ServiceFrequency::default().as_str())
        .fetch_optional(&self.pool)
        .await?;
        Ok(quote)
    }

    pub async fn cancel_by_payment_id(&self, payment_id: &str) -> Result<Option<CustomerQuote>> {
        let quote = sqlx::query_as::<_, CustomerQuote>(
            r#"
            UPDATE customer_quotes
            SET purchased = FALSE, service_status = $2
            WHERE stripe_payment_id = $1
            RETURNING *
            "#,
        )
        .bind(payment_id)
        .bind(ServiceStatus::Cancelled.as_str())
        .fetch_optional(&self.pool)
        .await?;
        Ok(quote)
    }

    /// Ends the subscription on a paid quote. Unpaid quotes are left alone.
    pub async fn cancel_subscription(&self, id: i64) -> Result<Option<CustomerQuote>> {
        let quote = sqlx::query_as::<_, CustomerQuote>(
            r#"
            UPDATE customer_quotes
            SET purchased = FALSE, service_status = $2
            WHERE id = $1 AND stripe_payment_id IS NOT NULL
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(ServiceStatus::Cancelled.as_str())
        .fetch_optional(&self.pool)
        .await?;
        Ok(quote)
    }

    pub async fn schedule_service(
        &self,
        id: i64,
        start_date: NaiveDate,
        frequency: ServiceFrequency,
    ) -> Result<CustomerQuote> {
        let quote = sqlx::query_as::<_, CustomerQuote>(
            r#"
            UPDATE customer_quotes
            SET service_start_date = $2, service_frequency = $3, service_status = $4
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(start_date)
        .bind(frequency.as_str())
        .bind(ServiceStatus::Active.as_str())
        .fetch_one(&self.pool)
        .await?;
        Ok(quote)
    }

    pub async fn totals(&self) -> Result<QuoteTotals> {
        let totals = sqlx::query_as::<_, QuoteTotals>(
            r#"
            SELECT
                COUNT(*) AS total_quotes,
                COUNT(*) FILTER (WHERE purchased) AS purchased_quotes,
                COALESCE(SUM(monthly_quote) FILTER (WHERE purchased), 0)::NUMERIC(14, 2) AS total_revenue,
                COALESCE(ROUND(AVG(monthly_quote), 2), 0)::NUMERIC(14, 2) AS average_quote
            FROM customer_quotes
            "#,
        )
        .fetch_one(&self.pool)
        .await?;
        Ok(totals)
    }
}

/// Percentage of quotes purchased, one decimal place.
pub fn conversion_rate(total: i64, purchased: i64) -> f64 {
    if total <= 0 {
        return 0.0;
    }
    let pct = purchased as f64 / total as f64 * 100.0;
    (pct * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::conversion_rate;

    #[test]
    fn conversion_rate_handles_empty_table() {
        assert_eq!(conversion_rate(0, 0), 0.0);
        assert_eq!(conversion_rate(3, 1), 33.3);
        assert_eq!(conversion_rate(8, 8), 100.0);
    }
}
