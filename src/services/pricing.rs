use rust_decimal::prelude::FromPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};

use crate::error::{Error, Result};

/// Flat per-acre monthly price, rounded half away from zero to cents.
pub fn monthly_quote(rate_per_acre: Decimal, acres: f64) -> Result<Decimal> {
    let acres = Decimal::from_f64(acres)
        .ok_or_else(|| Error::BadRequest(format!("unrepresentable lot size: {}", acres)))?;
    let price = rate_per_acre
        .checked_mul(acres)
        .ok_or_else(|| Error::Internal("quote overflow".into()))?;
    let mut price = price.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    price.rescale(2);
    Ok(price)
}
