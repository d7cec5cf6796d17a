//! Cart
//!
//! A currency-validated container of shopping-cart lines, the input to
//! trade aggregation.

use rusty_money::{Money, iso::Currency};
use thiserror::Error;

use crate::{discounts::AppliedDiscount, goods::CategoryId};

/// Errors related to cart construction or totals.
#[derive(Debug, Error)]
pub enum CartError {
    /// A line's currency differs from the cart currency (index, line currency, cart currency).
    #[error("cart line {0} has currency {1}, but the cart has currency {2}")]
    CurrencyMismatch(usize, &'static str, &'static str),

    /// A line carries a zero quantity (index).
    #[error("cart line {0} has a zero quantity")]
    ZeroQuantity(usize),

    /// A line total or the cart subtotal overflowed minor units.
    #[error("cart total cannot be represented in minor units")]
    AmountOverflow,
}

/// One line of a shopping cart.
#[derive(Debug, Clone, PartialEq)]
pub struct CartLine<'a> {
    /// Identifier of the goods being bought.
    pub goods_id: String,

    /// Display name at the time the line was added.
    pub name: String,

    /// Image shown for the line.
    pub image_url: String,

    /// Unit price, already discounted where a discount applied.
    pub unit_price: Money<'a, Currency>,

    /// Number of units, at least one.
    pub quantity: u32,

    /// Category of the goods.
    pub category: CategoryId,

    /// Human-readable variant description.
    pub variant_text: String,

    /// Variant key for the chosen configuration.
    pub variant_key: String,

    /// Pre-discount reference price, when one was recorded.
    pub reference_price: Option<Money<'a, Currency>>,

    /// Discount metadata carried over from the listing.
    pub discount: Option<AppliedDiscount>,
}

impl<'a> CartLine<'a> {
    /// Create a plain cart line with no variant or discount metadata.
    #[must_use]
    pub fn new(
        goods_id: impl Into<String>,
        name: impl Into<String>,
        unit_price: Money<'a, Currency>,
        quantity: u32,
        category: CategoryId,
    ) -> Self {
        CartLine {
            goods_id: goods_id.into(),
            name: name.into(),
            image_url: String::new(),
            unit_price,
            quantity,
            category,
            variant_text: String::new(),
            variant_key: String::new(),
            reference_price: None,
            discount: None,
        }
    }

    /// Total for this line: unit price times quantity.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::AmountOverflow`] if the total cannot be
    /// represented in minor units.
    pub fn line_total(&self) -> Result<Money<'a, Currency>, CartError> {
        let minor = self
            .unit_price
            .to_minor_units()
            .checked_mul(i64::from(self.quantity))
            .ok_or(CartError::AmountOverflow)?;

        Ok(Money::from_minor(minor, self.unit_price.currency()))
    }
}

/// Cart
#[derive(Debug)]
pub struct Cart<'a> {
    lines: Vec<CartLine<'a>>,
    currency: &'static Currency,
}

impl<'a> Cart<'a> {
    /// Create an empty cart in the given currency.
    #[must_use]
    pub fn new(currency: &'static Currency) -> Self {
        Cart {
            lines: Vec::new(),
            currency,
        }
    }

    /// Create a cart from the given lines.
    ///
    /// # Errors
    ///
    /// Returns a [`CartError`] if a line's currency differs from the cart
    /// currency or a line carries a zero quantity.
    pub fn with_lines(
        lines: impl Into<Vec<CartLine<'a>>>,
        currency: &'static Currency,
    ) -> Result<Self, CartError> {
        let lines = lines.into();

        lines.iter().enumerate().try_for_each(|(i, line)| {
            let line_currency = line.unit_price.currency();

            if line_currency != currency {
                return Err(CartError::CurrencyMismatch(
                    i,
                    line_currency.iso_alpha_code,
                    currency.iso_alpha_code,
                ));
            }

            if line.quantity == 0 {
                return Err(CartError::ZeroQuantity(i));
            }

            Ok(())
        })?;

        Ok(Cart { lines, currency })
    }

    /// Sum of all line totals.
    ///
    /// An empty cart totals zero in the cart currency.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::AmountOverflow`] if the sum cannot be
    /// represented in minor units.
    pub fn subtotal(&self) -> Result<Money<'a, Currency>, CartError> {
        let mut total_minor = 0i64;

        for line in &self.lines {
            let line_minor = line.line_total()?.to_minor_units();

            total_minor = total_minor
                .checked_add(line_minor)
                .ok_or(CartError::AmountOverflow)?;
        }

        Ok(Money::from_minor(total_minor, self.currency))
    }

    /// Iterate over the cart lines in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &CartLine<'a>> {
        self.lines.iter()
    }

    /// The cart lines in insertion order.
    #[must_use]
    pub fn lines(&self) -> &[CartLine<'a>] {
        &self.lines
    }

    /// Number of lines in the cart.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Whether the cart has no lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// The cart currency.
    #[must_use]
    pub fn currency(&self) -> &'static Currency {
        self.currency
    }
}
