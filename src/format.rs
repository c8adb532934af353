//! Price formatting for spreadsheet cells
//!
//! The sheet shows prices as human-readable strings ("12,34€"). The engine
//! writes them through [`format_price`] and reads the persisted total back
//! through [`parse_price`], the inverse transform.

use crate::error::{Result, SyncError};

/// ISO 4217 codes the price provider supports, with their display signs.
const CURRENCY_SIGNS: &[(&str, &str)] = &[
    ("USD", "$"),
    ("GBP", "£"),
    ("EUR", "€"),
    ("CHF", "CHF"),
    ("RUB", "₽"),
    ("PLN", "zł"),
    ("BRL", "R$"),
    ("JPY", "¥"),
    ("NOK", "kr"),
    ("KRW", "₩"),
    ("TRY", "₺"),
    ("UAH", "₴"),
    ("MXN", "$"),
    ("CAD", "CA$"),
    ("AUD", "A$"),
    ("NZD", "NZ$"),
    ("CNY", "¥"),
    ("INR", "₹"),
    ("ZAR", "R"),
    ("HKD", "HK$"),
    ("TWD", "NT$"),
    ("ILS", "₪"),
    ("SGD", "S$"),
    ("THB", "฿"),
    ("VND", "₫"),
    ("IDR", "Rp"),
    ("MYR", "RM"),
    ("PHP", "₱"),
];

/// Look up the display sign for a supported ISO 4217 currency code
pub fn currency_sign(iso_code: &str) -> Result<&'static str> {
    CURRENCY_SIGNS
        .iter()
        .find(|(code, _)| *code == iso_code)
        .map(|(_, sign)| *sign)
        .ok_or_else(|| SyncError::Configuration(format!("currency {} not supported", iso_code)))
}

/// Format a price for display on the sheet: two decimals, the configured
/// decimal separator, trailing currency sign.
pub fn format_price(price: f64, separator: &str, sign: &str) -> String {
    let fixed = format!("{:.2}", price);
    format!("{}{}", fixed.replace('.', separator), sign)
}

/// Parse a price string previously written by [`format_price`] back into a
/// number. Thousands dots are stripped first, then the configured separator
/// becomes the decimal point and the currency sign is removed.
pub fn parse_price(price: &str, separator: &str, sign: &str) -> Result<f64> {
    let stripped = price.replace('.', "");
    let decimal = stripped.replace(separator, ".");
    let bare = decimal.replace(sign, "");
    bare.trim()
        .parse::<f64>()
        .map_err(|_| SyncError::PriceParse(price.to_string()))
}

#[cfg(test)]
#[path = "format_tests.rs"]
mod tests;
