//! Trade
//!
//! Aggregates a cart into the checkout-ready order document: one order
//! line per cart line, a deal price, the reduction, and the clamped final
//! price, plus a console rendering of the order summary.

use std::io;

use rusty_money::{Money, MoneyError, iso::Currency};
use tabled::{
    builder::Builder,
    grid::config::HorizontalLine,
    settings::{
        Alignment, Color, Style, Theme,
        object::{Columns, Rows},
    },
};
use thiserror::Error;

use crate::{
    cart::{Cart, CartError, CartLine},
    discounts::AppliedDiscount,
    goods::CategoryId,
};

/// Order-type code for the immediate dine-in flow.
pub const DINE_IN_ORDER_TYPE: &str = "30";

/// Arrival text attached to dine-in orders.
pub const IMMEDIATE_SERVICE_TEXT: &str = "立即出餐";

const ONLINE_PAYMENT_CODE: &str = "1";
const ONLINE_PAYMENT_TEXT: &str = "在线支付";

/// Errors that can occur while aggregating or rendering a trade.
#[derive(Debug, Error)]
pub enum TradeError {
    /// An order amount overflowed minor units.
    #[error("order amount cannot be represented in minor units")]
    AmountOverflow,

    /// Wrapped cart validation or totalling error.
    #[error(transparent)]
    Cart(#[from] CartError),

    /// Wrapped money arithmetic or currency mismatch error.
    #[error(transparent)]
    Money(#[from] MoneyError),

    /// IO error while rendering the order summary.
    #[error("IO error")]
    Io,
}

/// Order-type code attached by the storefront flow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderType(String);

impl OrderType {
    /// Wrap an order-type code.
    pub fn new(code: impl Into<String>) -> Self {
        OrderType(code.into())
    }

    /// The raw code.
    #[must_use]
    pub fn code(&self) -> &str {
        &self.0
    }

    /// Whether this order is the immediate dine-in flow.
    #[must_use]
    pub fn is_dine_in(&self) -> bool {
        self.0 == DINE_IN_ORDER_TYPE
    }
}

/// A flat promotional reduction against the deal price.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Reduction<'a> {
    /// Amount deducted before the final price is computed.
    pub fee: Money<'a, Currency>,
}

/// Caller-supplied parameters for trade aggregation.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderParams<'a> {
    /// Order-type code for this checkout.
    pub order_type: OrderType,

    /// Reduction to subtract, when one is active.
    pub reduce: Option<Reduction<'a>>,
}

impl OrderParams<'_> {
    /// Parameters with no active reduction.
    pub fn new(order_type: OrderType) -> Self {
        OrderParams {
            order_type,
            reduce: None,
        }
    }
}

/// Payment method for a trade.
///
/// The storefront flow issues online payment only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaymentMethod {
    code: &'static str,
    text: &'static str,
}

impl PaymentMethod {
    /// Online payment.
    #[must_use]
    pub fn online() -> Self {
        PaymentMethod {
            code: ONLINE_PAYMENT_CODE,
            text: ONLINE_PAYMENT_TEXT,
        }
    }

    /// The wire code for this method.
    #[must_use]
    pub fn code(&self) -> &'static str {
        self.code
    }

    /// The display text for this method.
    #[must_use]
    pub fn text(&self) -> &'static str {
        self.text
    }
}

impl Default for PaymentMethod {
    fn default() -> Self {
        Self::online()
    }
}

/// One normalized line of an order document.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderLine<'a> {
    /// Identifier of the goods bought.
    pub goods_id: String,

    /// Display name.
    pub name: String,

    /// Image shown for the line.
    pub image_url: String,

    /// Unit price, already discounted where a discount applied.
    pub unit_price: Money<'a, Currency>,

    /// Number of units.
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

impl<'a> OrderLine<'a> {
    /// Total for this line: unit price times quantity.
    ///
    /// # Errors
    ///
    /// Returns [`TradeError::AmountOverflow`] if the total cannot be
    /// represented in minor units.
    pub fn line_total(&self) -> Result<Money<'a, Currency>, TradeError> {
        let minor = self
            .unit_price
            .to_minor_units()
            .checked_mul(i64::from(self.quantity))
            .ok_or(TradeError::AmountOverflow)?;

        Ok(Money::from_minor(minor, self.unit_price.currency()))
    }
}

impl<'a> From<&CartLine<'a>> for OrderLine<'a> {
    fn from(line: &CartLine<'a>) -> Self {
        OrderLine {
            goods_id: line.goods_id.clone(),
            name: line.name.clone(),
            image_url: line.image_url.clone(),
            unit_price: line.unit_price,
            quantity: line.quantity,
            category: line.category,
            variant_text: line.variant_text.clone(),
            variant_key: line.variant_key.clone(),
            reference_price: line.reference_price,
            discount: line.discount.clone(),
        }
    }
}

/// The checkout-ready order document aggregated from a cart.
#[derive(Debug, Clone)]
pub struct Trade<'a> {
    order_type: OrderType,
    deal_price: Money<'a, Currency>,
    reduce_fee: Money<'a, Currency>,
    final_price: Money<'a, Currency>,
    post_fee: Money<'a, Currency>,
    payment: PaymentMethod,
    lines: Vec<OrderLine<'a>>,
    shop_name: String,
    arrive_time: Option<&'static str>,
}

impl<'a> Trade<'a> {
    /// Aggregate a cart into a trade.
    ///
    /// The deal price is the cart subtotal; the final price subtracts the
    /// reduction and never goes below zero. Postage is fixed at zero in
    /// this flow, and dine-in orders carry the immediate-service arrival
    /// text.
    ///
    /// # Errors
    ///
    /// - [`TradeError::Cart`]: the cart subtotal could not be computed.
    /// - [`TradeError::Money`]: the reduction currency differs from the
    ///   cart currency.
    pub fn from_cart(
        cart: &Cart<'a>,
        params: &OrderParams<'a>,
        shop_name: impl Into<String>,
    ) -> Result<Self, TradeError> {
        let currency = cart.currency();
        let deal_price = cart.subtotal()?;

        let reduce_fee = params
            .reduce
            .as_ref()
            .map_or_else(|| Money::from_minor(0, currency), |reduction| reduction.fee);

        let remaining = deal_price.sub(reduce_fee)?;
        let final_price = Money::from_minor(remaining.to_minor_units().max(0), currency);

        let lines = cart.iter().map(OrderLine::from).collect();

        Ok(Trade {
            order_type: params.order_type.clone(),
            deal_price,
            reduce_fee,
            final_price,
            post_fee: Money::from_minor(0, currency),
            payment: PaymentMethod::online(),
            lines,
            shop_name: shop_name.into(),
            arrive_time: params
                .order_type
                .is_dine_in()
                .then_some(IMMEDIATE_SERVICE_TEXT),
        })
    }

    /// The order-type code this trade was aggregated for.
    #[must_use]
    pub fn order_type(&self) -> &OrderType {
        &self.order_type
    }

    /// Sum of all line totals before the reduction.
    #[must_use]
    pub fn deal_price(&self) -> Money<'a, Currency> {
        self.deal_price
    }

    /// The reduction subtracted from the deal price.
    #[must_use]
    pub fn reduce_fee(&self) -> Money<'a, Currency> {
        self.reduce_fee
    }

    /// The amount to pay, clamped at zero.
    #[must_use]
    pub fn final_price(&self) -> Money<'a, Currency> {
        self.final_price
    }

    /// Postage, fixed at zero in the cart flow.
    #[must_use]
    pub fn post_fee(&self) -> Money<'a, Currency> {
        self.post_fee
    }

    /// The payment method for this trade.
    #[must_use]
    pub fn payment(&self) -> PaymentMethod {
        self.payment
    }

    /// The normalized order lines, in cart order.
    #[must_use]
    pub fn lines(&self) -> &[OrderLine<'a>] {
        &self.lines
    }

    /// The shop this order is placed with.
    #[must_use]
    pub fn shop_name(&self) -> &str {
        &self.shop_name
    }

    /// Arrival text, present only for dine-in orders.
    #[must_use]
    pub fn arrive_time(&self) -> Option<&'static str> {
        self.arrive_time
    }

    /// Render a human-readable order summary.
    ///
    /// # Errors
    ///
    /// Returns a [`TradeError`] if a line total overflows or writing fails.
    pub fn write_to(&self, mut out: impl io::Write) -> Result<(), TradeError> {
        let mut builder = Builder::default();

        builder.push_record(["", "Item", "Variant", "Unit Price", "Qty", "Line Total", "Discount"]);

        for (idx, line) in self.lines.iter().enumerate() {
            let total = line.line_total()?;

            let discount_cell = line
                .discount
                .as_ref()
                .map(|stamp| format!("{} {}", stamp.text(), stamp.label()))
                .unwrap_or_default();

            builder.push_record([
                format!("#{:<3}", idx + 1),
                line.name.clone(),
                line.variant_text.clone(),
                format!("{}", line.unit_price),
                line.quantity.to_string(),
                format!("{total}"),
                discount_cell,
            ]);
        }

        write_trade_table(&mut out, builder)?;
        write_trade_summary(&mut out, self)?;

        Ok(())
    }
}

fn write_trade_table(out: &mut impl io::Write, builder: Builder) -> Result<(), TradeError> {
    let mut table = builder.build();
    let mut theme = Theme::from(Style::modern_rounded());
    let separator = HorizontalLine::new(Some('─'), Some('┼'), Some('├'), Some('┤'));

    theme.remove_horizontal_lines();
    theme.insert_horizontal_line(1, separator);

    table.with(theme);
    table.modify(Rows::first(), Color::BOLD);
    table.modify(Columns::new(3..6), Alignment::right());

    writeln!(out, "\n{table}").map_err(|_err| TradeError::Io)
}

fn write_trade_summary(out: &mut impl io::Write, trade: &Trade<'_>) -> Result<(), TradeError> {
    let subtotal_label = " Subtotal:";
    let reduction_label = " Reduction:";
    let postage_label = " Postage:";
    let total_label = " \x1b[1mTotal:\x1b[0m";

    let subtotal_val = format!("{}  ", trade.deal_price());
    let reduction_val = format!("-{}  ", trade.reduce_fee());
    let postage_val = format!("{}  ", trade.post_fee());
    let total_val = format!("{}  ", trade.final_price());

    let label_width = visible_width(subtotal_label)
        .max(visible_width(reduction_label))
        .max(visible_width(postage_label))
        .max(visible_width(total_label));

    let value_width = subtotal_val
        .len()
        .max(reduction_val.len())
        .max(postage_val.len())
        .max(total_val.len());

    write_summary_line(out, subtotal_label, &subtotal_val, label_width, value_width)?;

    if trade.reduce_fee().to_minor_units() != 0 {
        write_summary_line(out, reduction_label, &reduction_val, label_width, value_width)?;
    }

    write_summary_line(out, postage_label, &postage_val, label_width, value_width)?;

    write_summary_line(
        out,
        total_label,
        &format!("\x1b[1m{total_val}\x1b[0m"),
        label_width,
        value_width,
    )?;

    writeln!(out, "\n {} · {}", trade.payment().text(), trade.shop_name())
        .map_err(|_err| TradeError::Io)?;

    if let Some(arrive) = trade.arrive_time() {
        writeln!(out, " {arrive}").map_err(|_err| TradeError::Io)?;
    }

    writeln!(out).map_err(|_err| TradeError::Io)
}

/// Returns the width of `s` with ANSI SGR sequences excluded.
fn visible_width(s: &str) -> usize {
    let mut width = 0usize;
    let mut in_sgr = false;

    for ch in s.chars() {
        match (in_sgr, ch) {
            (true, 'm') => in_sgr = false,
            (true, _) => {}
            (false, '\x1b') => in_sgr = true,
            (false, _) => width += 1,
        }
    }

    width
}

/// Writes one label/value row of the totals block, both columns padded to width.
fn write_summary_line(
    out: &mut impl io::Write,
    label: &str,
    value: &str,
    label_col_width: usize,
    value_col_width: usize,
) -> Result<(), TradeError> {
    let label_pad = " ".repeat(label_col_width.saturating_sub(visible_width(label)));
    let value_pad = " ".repeat(value_col_width.saturating_sub(visible_width(value)));

    writeln!(out, "{label_pad}{label}  {value_pad}{value}").map_err(|_err| TradeError::Io)
}
