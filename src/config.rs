use crate::error::{Error, Result};
use dotenvy::dotenv;
use rust_decimal::Decimal;
use std::env;
use std::sync::OnceLock;
use url::Url;

pub const DEFAULT_PARCEL_API_URL: &str =
    "https://geodata.md.gov/imap/rest/services/PlanningCadastre/MD_PropertyData/MapServer/0/query";

#[derive(Debug, Clone)]
pub struct Config {
    pub server_address: String,
    pub database_url: String,
    pub jwt_secret: String,
    pub jwt_ttl_minutes: i64,
    pub stripe_secret_key: String,
    pub stripe_webhook_secret: String,
    pub stripe_api_base: String,
    pub public_base_url: Url,
    pub parcel_api_url: String,
    pub parcel_jurisdiction: String,
    pub price_per_acre: Decimal,
    pub service_lead_days: i64,
    pub bootstrap_admin_email: Option<String>,
}

pub static CONFIG: OnceLock<Config> = OnceLock::new();

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenv().ok();

        let public_base_url = get_env_or("PUBLIC_BASE_URL", "http://localhost:8000");
        let public_base_url = Url::parse(&public_base_url)
            .map_err(|e| Error::Config(format!("Invalid value for PUBLIC_BASE_URL: {}", e)))?;

        Ok(Self {
            server_address: get_env("SERVER_ADDRESS")?,
            database_url: get_env("DATABASE_URL")?,
            jwt_secret: get_env("JWT_SECRET")?,
            jwt_ttl_minutes: get_env_parse_or("JWT_TTL_MINUTES", 120)?,
            stripe_secret_key: get_env_or("STRIPE_SECRET_KEY", ""),
            stripe_webhook_secret: get_env_or("STRIPE_WEBHOOK_SECRET", ""),
            stripe_api_base: get_env_or("STRIPE_API_BASE", "https://api.stripe.com"),
            public_base_url,
            parcel_api_url: get_env_or("PARCEL_API_URL", DEFAULT_PARCEL_API_URL),
            parcel_jurisdiction: get_env_or("PARCEL_JURISDICTION", "HARF"),
            price_per_acre: get_env_parse_or("PRICE_PER_ACRE", Decimal::from(430))?,
            service_lead_days: get_env_parse_or("SERVICE_LEAD_DAYS", 3)?,
            bootstrap_admin_email: env::var("BOOTSTRAP_ADMIN_EMAIL")
                .ok()
                .filter(|v| !v.trim().is_empty()),
        })
    }
}

fn get_env(name: &str) -> Result<String> {
    env::var(name).map_err(|_| Error::Config(format!("Missing environment variable: {}", name)))
}

fn get_env_or(name: &str, default: &str) -> String {
    env::var(name).unwrap_or_else(|_| default.to_string())
}

fn get_env_parse_or<T>(name: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(name) {
        Ok(raw) => raw
            .parse()
            .map_err(|e| Error::Config(format!("Invalid value for {}: {}", name, e))),
        Err(_) => Ok(default),
    }
}

pub fn init_config() -> Result<()> {
    let config = Config::from_env()?;
    CONFIG
        .set(config)
        .map_err(|_| Error::Config("Configuration has already been initialized".to_string()))?;
    Ok(())
}

pub fn get_config() -> &'static Config {
    CONFIG
        .get()
        .expect("Configuration has not been initialized")
}
