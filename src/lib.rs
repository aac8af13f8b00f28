pub mod config;
pub mod database;
pub mod dto;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod utils;

use crate::config::Config;
use crate::error::Result;
use crate::services::{
    billing_service::BillingService, parcel_service::ParcelService, quote_service::QuoteService,
    user_service::UserService,
};
use reqwest::Client;
use sqlx::PgPool;

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub quote_service: QuoteService,
    pub user_service: UserService,
    pub billing_service: BillingService,
    pub jwt_ttl_minutes: i64,
    pub service_lead_days: i64,
}

impl AppState {
    pub fn new(pool: PgPool) -> Result<Self> {
        Self::from_config(pool, crate::config::get_config())
    }

    pub fn from_config(pool: PgPool, config: &Config) -> Result<Self> {
        let http_client = Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()?;

        let parcel_service = ParcelService::new(
            http_client.clone(),
            config.parcel_api_url.clone(),
            config.parcel_jurisdiction.clone(),
        );
        let quote_service =
            QuoteService::new(pool.clone(), parcel_service, config.price_per_acre);
        let user_service = UserService::new(pool.clone());
        let billing_service = BillingService::new(
            http_client,
            config.stripe_api_base.clone(),
            config.stripe_secret_key.clone(),
            config.stripe_webhook_secret.clone(),
            config.public_base_url.clone(),
            config.service_lead_days,
            quote_service.clone(),
        );

        Ok(Self {
            pool,
            quote_service,
            user_service,
            billing_service,
            jwt_ttl_minutes: config.jwt_ttl_minutes,
            service_lead_days: config.service_lead_days,
        })
    }
}
