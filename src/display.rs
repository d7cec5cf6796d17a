//! Display
//!
//! Plain-string formatting for amounts, goods names, and delivery-fee
//! text, in the shapes the storefront front end expects.

use rust_decimal::Decimal;
use rusty_money::{Money, iso::Currency};

/// Delivery text shown when the delivery fee is zero.
pub const FREE_DELIVERY_TEXT: &str = "配送：免运费";

/// Character cap for goods names in order-line contexts.
pub const SHORT_NAME_LIMIT: usize = 12;

/// Character cap for goods names in listing contexts.
pub const LISTING_NAME_LIMIT: usize = 30;

/// Formats an amount as a bare decimal string.
///
/// No symbol and no separators, always the currency's full minor-unit
/// precision: ¥25.50 becomes `"25.50"` and a zero amount `"0.00"`.
#[must_use]
pub fn money_string(amount: Money<'_, Currency>) -> String {
    Decimal::new(amount.to_minor_units(), amount.currency().exponent).to_string()
}

/// Returns the capped name when `name` runs past `limit` characters.
///
/// The cap keeps the first `limit` characters and appends `"..."`. Names
/// within the limit yield `None` so callers can keep the original intact.
#[must_use]
pub fn truncated_name(name: &str, limit: usize) -> Option<String> {
    if name.chars().count() <= limit {
        return None;
    }

    let mut capped: String = name.chars().take(limit).collect();

    capped.push_str("...");

    Some(capped)
}

/// Goods name capped for listing display.
#[must_use]
pub fn listing_name(name: &str) -> String {
    truncated_name(name, LISTING_NAME_LIMIT).unwrap_or_else(|| name.to_string())
}

/// Delivery-fee text for a goods listing.
///
/// Zero fees read as free delivery; anything else names the same-city
/// rate and offers self-pickup.
#[must_use]
pub fn post_fee_text(fee: Money<'_, Currency>) -> String {
    if fee.to_minor_units() == 0 {
        return FREE_DELIVERY_TEXT.to_string();
    }

    format!("同城配送：￥{} (支持自提)", money_string(fee))
}
