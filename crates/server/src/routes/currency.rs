//! Currency converter utility.
//!
//! One of the self-contained travel widgets: converts between the
//! currencies travellers to India most commonly hold, over a static
//! reference rate table quoted against the rupee. Rates are indicative,
//! not a market feed.

use axum::{Json, extract::Query};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

/// Reference rate: how many rupees one unit of the currency buys.
fn rate_to_inr(code: &str) -> Option<Decimal> {
    let rate = match code {
        "INR" => Decimal::ONE,
        "USD" => Decimal::new(8340, 2),  // 83.40
        "EUR" => Decimal::new(9010, 2),  // 90.10
        "GBP" => Decimal::new(10560, 2), // 105.60
        "JPY" => Decimal::new(56, 2),    // 0.56
        "AUD" => Decimal::new(5480, 2),  // 54.80
        "SGD" => Decimal::new(6190, 2),  // 61.90
        "AED" => Decimal::new(2271, 2),  // 22.71
        _ => return None,
    };
    Some(rate)
}

/// Query parameters for a conversion.
#[derive(Debug, Deserialize)]
pub struct ConvertQuery {
    /// ISO 4217 code of the currency held.
    pub from: String,
    /// ISO 4217 code of the currency wanted.
    pub to: String,
    /// Amount in the `from` currency.
    pub amount: Decimal,
}

/// A completed conversion.
#[derive(Debug, Serialize)]
pub struct ConvertResponse {
    pub from: String,
    pub to: String,
    pub amount: Decimal,
    /// Converted amount, rounded to 2 decimal places.
    pub converted: Decimal,
    /// Effective rate used (units of `to` per unit of `from`).
    pub rate: Decimal,
}

/// `GET /api/currency/convert?from=USD&to=INR&amount=100`
///
/// # Errors
///
/// Returns `AppError::BadRequest` for unsupported currencies or a
/// negative amount.
pub async fn convert(Query(query): Query<ConvertQuery>) -> Result<Json<ConvertResponse>> {
    let from = query.from.to_ascii_uppercase();
    let to = query.to.to_ascii_uppercase();

    if query.amount.is_sign_negative() {
        return Err(AppError::BadRequest("amount must not be negative".to_owned()));
    }

    let from_rate = rate_to_inr(&from)
        .ok_or_else(|| AppError::BadRequest(format!("unsupported currency: {from}")))?;
    let to_rate = rate_to_inr(&to)
        .ok_or_else(|| AppError::BadRequest(format!("unsupported currency: {to}")))?;

    let rate = from_rate / to_rate;
    let converted = (query.amount * rate).round_dp(2);

    Ok(Json(ConvertResponse {
        from,
        to,
        amount: query.amount,
        converted,
        rate: rate.round_dp(6),
    }))
}
