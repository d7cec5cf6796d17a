//! Payload
//!
//! Wire-facing records: deserialization of the raw goods, discount, and
//! cart JSON the backend and stored UI state produce, and serialization
//! of the enriched listing view and the trade document the order
//! endpoint accepts.

use rust_decimal::{Decimal, prelude::ToPrimitive};
use rusty_money::{Money, iso::Currency};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use thiserror::Error;

use crate::{
    cart::CartLine,
    discounts::{AppliedDiscount, DiscountError, DiscountRate, MemberDiscount},
    display::{self, money_string},
    goods::{CategoryId, Goods, VariantDetail, VariantInfo, VariantOption},
    pricing::{PricedGoods, prepare_goods},
    trade::{OrderLine, Trade},
};

/// Errors that can occur while converting wire records into domain values.
#[derive(Debug, Error)]
pub enum PayloadError {
    /// A cart line arrived without a unit price.
    #[error("cart line {0} has no unit price")]
    MissingPrice(usize),

    /// A cart line arrived without a quantity.
    #[error("cart line {0} has no quantity")]
    MissingQuantity(usize),

    /// A monetary field is negative or does not fit the currency's minor unit.
    #[error("amount {0} is not representable in minor units")]
    InvalidPrice(Decimal),

    /// A cart line's quantity is not a positive whole count.
    #[error("cart line {0} has invalid quantity {1}")]
    InvalidQuantity(usize, Decimal),

    /// Wrapped discount evaluation error.
    #[error(transparent)]
    Discount(#[from] DiscountError),
}

/// Converts a wire decimal amount into money in `currency`.
///
/// # Errors
///
/// Returns [`PayloadError::InvalidPrice`] if the amount is negative or
/// carries more precision than the currency's minor unit.
pub fn money_from_decimal<'a>(
    amount: Decimal,
    currency: &'a Currency,
) -> Result<Money<'a, Currency>, PayloadError> {
    if amount.is_sign_negative() {
        return Err(PayloadError::InvalidPrice(amount));
    }

    let scaled = amount
        .checked_mul(Decimal::new(10_i64.pow(currency.exponent), 0))
        .ok_or(PayloadError::InvalidPrice(amount))?;

    if !scaled.fract().is_zero() {
        return Err(PayloadError::InvalidPrice(amount));
    }

    let minor = scaled.to_i64().ok_or(PayloadError::InvalidPrice(amount))?;

    Ok(Money::from_minor(minor, currency))
}

/// Raw goods record from the goods-listing or goods-detail endpoint.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GoodsPayload {
    /// Backend identifier.
    pub goods_id: String,

    /// Display name.
    pub name: String,

    /// Current unit price.
    pub sell_price: Decimal,

    /// Pre-discount reference price, when the backend recorded one.
    #[serde(default)]
    pub original_price: Option<Decimal>,

    /// Backend category identifier.
    pub inner_cid: u64,

    /// Delivery fee, absent in listing contexts.
    #[serde(default)]
    pub post_fee: Option<Decimal>,

    /// Variant block, present on multi-variant goods.
    #[serde(default)]
    pub goods_sku_info: Option<VariantInfoPayload>,
}

impl GoodsPayload {
    /// Converts the raw record into a goods record priced in `currency`.
    ///
    /// A missing or zero reference price means "no reference price", and
    /// the variant block's comma-separated option axes are split into
    /// individual values.
    ///
    /// # Errors
    ///
    /// Returns [`PayloadError::InvalidPrice`] if any price is negative or
    /// does not fit the currency's minor unit.
    pub fn into_goods<'a>(self, currency: &'a Currency) -> Result<Goods<'a>, PayloadError> {
        let sell_price = money_from_decimal(self.sell_price, currency)?;

        let original_price = self
            .original_price
            .filter(|amount| !amount.is_zero())
            .map(|amount| money_from_decimal(amount, currency))
            .transpose()?;

        let variants = self
            .goods_sku_info
            .map(|info| variant_info(&info, currency))
            .transpose()?;

        let post_fee = self
            .post_fee
            .map(|amount| money_from_decimal(amount, currency))
            .transpose()?;

        Ok(Goods {
            id: self.goods_id,
            name: self.name,
            sell_price,
            original_price,
            category: CategoryId::new(self.inner_cid),
            variants,
            post_fee,
            discount: None,
        })
    }
}

/// Raw variant block of a goods record.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VariantInfoPayload {
    /// Purchasable configurations.
    #[serde(default)]
    pub goods_sku_details: Vec<VariantDetailPayload>,

    /// First option axis name.
    #[serde(default)]
    pub prop1: Option<String>,

    /// First option axis values, comma separated.
    #[serde(default)]
    pub value1: Option<String>,

    /// Second option axis name.
    #[serde(default)]
    pub prop2: Option<String>,

    /// Second option axis values, comma separated.
    #[serde(default)]
    pub value2: Option<String>,

    /// Third option axis name.
    #[serde(default)]
    pub prop3: Option<String>,

    /// Third option axis values, comma separated.
    #[serde(default)]
    pub value3: Option<String>,
}

/// One purchasable configuration inside the variant block.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VariantDetailPayload {
    /// Price fields of the configuration.
    pub goods_sku_detail_base: VariantDetailBasePayload,
}

/// Price fields of one purchasable configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VariantDetailBasePayload {
    /// Variant key.
    #[serde(default)]
    pub sku: String,

    /// Current price.
    pub price: Decimal,

    /// Pre-discount reference price, when recorded.
    #[serde(default)]
    pub original_price: Option<Decimal>,
}

fn variant_info<'a>(
    info: &VariantInfoPayload,
    currency: &'a Currency,
) -> Result<VariantInfo<'a>, PayloadError> {
    let mut details = SmallVec::new();

    for detail in &info.goods_sku_details {
        let base = &detail.goods_sku_detail_base;

        details.push(VariantDetail {
            sku: base.sku.clone(),
            price: money_from_decimal(base.price, currency)?,
            original_price: base
                .original_price
                .filter(|amount| !amount.is_zero())
                .map(|amount| money_from_decimal(amount, currency))
                .transpose()?,
        });
    }

    Ok(VariantInfo {
        details,
        options: option_axes(info),
    })
}

/// Splits the numbered prop/value columns into option axes.
///
/// Axes are read in order and collection stops at the first axis with a
/// missing or empty name or value string.
fn option_axes(info: &VariantInfoPayload) -> SmallVec<[VariantOption; 3]> {
    let columns = [
        (&info.prop1, &info.value1),
        (&info.prop2, &info.value2),
        (&info.prop3, &info.value3),
    ];

    let mut options = SmallVec::new();

    for (prop, value) in columns {
        let (Some(name), Some(values)) = (prop, value) else {
            break;
        };

        if name.is_empty() || values.is_empty() {
            break;
        }

        options.push(VariantOption {
            name: name.clone(),
            values: values.split(',').map(str::to_string).collect(),
        });
    }

    options
}

/// Raw member-discount record.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiscountPayload {
    /// Category identifiers the discount covers.
    pub categories: Vec<u64>,

    /// Percentage of the price members pay.
    pub rate: u8,
}

impl DiscountPayload {
    /// Converts the raw record into a member discount.
    ///
    /// # Errors
    ///
    /// Returns [`PayloadError::Discount`] if the rate is outside 1–100.
    pub fn into_discount(self) -> Result<MemberDiscount, PayloadError> {
        Ok(MemberDiscount::new(
            self.categories.into_iter().map(CategoryId::new),
            DiscountRate::new(self.rate)?,
        ))
    }
}

/// Raw cart line from stored UI state.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLinePayload {
    /// Identifier of the goods in the line.
    pub goods_id: String,

    /// Display name.
    pub goods_name: String,

    /// Image shown for the line.
    #[serde(default)]
    pub goods_image: String,

    /// Unit price; validated as present on conversion.
    #[serde(default)]
    pub goods_price: Option<Decimal>,

    /// Unit count; validated as a positive whole number on conversion.
    #[serde(default)]
    pub goods_num: Option<Decimal>,

    /// Backend category identifier.
    pub inner_cid: u64,

    /// Human-readable variant description.
    #[serde(default)]
    pub sku_text: String,

    /// Variant key for the chosen configuration.
    #[serde(default)]
    pub goods_sku: String,

    /// Pre-discount reference price.
    #[serde(default)]
    pub original_price: Option<Decimal>,

    /// Whether a member discount was applied when the line was stored.
    #[serde(default)]
    pub discount: bool,

    /// Rate of the applied discount.
    #[serde(default)]
    pub discount_rate: Option<u8>,

    /// Display text of the applied discount, carried through to the order.
    #[serde(default)]
    pub discount_text: Option<String>,
}

impl CartLinePayload {
    /// Converts the stored line into a validated cart line priced in
    /// `currency`. `index` is the line's position in the cart, reported
    /// in errors.
    ///
    /// The discount stamp is rebuilt only when the stored line carries
    /// both the flag and a rate; stored display text is carried through
    /// as-is.
    ///
    /// # Errors
    ///
    /// - [`PayloadError::MissingPrice`]: the stored line has no unit price.
    /// - [`PayloadError::MissingQuantity`]: the stored line has no count.
    /// - [`PayloadError::InvalidQuantity`]: the count is zero, negative,
    ///   fractional, or too large.
    /// - [`PayloadError::InvalidPrice`]: a price field is negative or
    ///   does not fit the currency's minor unit.
    /// - [`PayloadError::Discount`]: the stored rate is outside 1–100.
    pub fn into_line<'a>(
        self,
        index: usize,
        currency: &'a Currency,
    ) -> Result<CartLine<'a>, PayloadError> {
        let price = self.goods_price.ok_or(PayloadError::MissingPrice(index))?;
        let count = self.goods_num.ok_or(PayloadError::MissingQuantity(index))?;

        if !count.fract().is_zero() {
            return Err(PayloadError::InvalidQuantity(index, count));
        }

        let quantity = count
            .to_u32()
            .filter(|quantity| *quantity > 0)
            .ok_or(PayloadError::InvalidQuantity(index, count))?;

        let discount = match (self.discount, self.discount_rate) {
            (true, Some(rate)) => {
                let rate = DiscountRate::new(rate)?;

                Some(match self.discount_text {
                    Some(text) => AppliedDiscount::with_text(rate, text),
                    None => AppliedDiscount::new(rate),
                })
            }
            _ => None,
        };

        Ok(CartLine {
            goods_id: self.goods_id,
            name: self.goods_name,
            image_url: self.goods_image,
            unit_price: money_from_decimal(price, currency)?,
            quantity,
            category: CategoryId::new(self.inner_cid),
            variant_text: self.sku_text,
            variant_key: self.goods_sku,
            reference_price: self
                .original_price
                .filter(|amount| !amount.is_zero())
                .map(|amount| money_from_decimal(amount, currency))
                .transpose()?,
            discount,
        })
    }
}

/// Display-ready goods view returned to the rendering layer.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GoodsViewPayload {
    /// Backend identifier.
    pub goods_id: String,

    /// Listing name, capped at thirty characters.
    pub name: String,

    /// Order-line name, present only when the full name runs long.
    #[serde(rename = "simple_name", skip_serializing_if = "Option::is_none")]
    pub simple_name: Option<String>,

    /// Current unit price.
    pub sell_price: String,

    /// Pre-discount reference price, falling back to the sell price.
    pub original_price: String,

    /// Backend category identifier.
    pub inner_cid: u64,

    /// Cheapest variant price, absent without a range.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_price: Option<String>,

    /// Dearest variant price, absent without a range.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_price: Option<String>,

    /// The single price the listing shows.
    pub price_label: String,

    /// Variant option axes for the SKU picker.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub labels: Vec<OptionAxisPayload>,

    /// Variant block with display prices, absent on single-variant goods.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub variant_info: Option<VariantViewPayload>,

    /// Delivery-fee text, absent in listing contexts.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fee_text: Option<String>,

    /// Discount flag, present once a discount applied.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub discount: Option<bool>,

    /// Discount-rate label.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub discount_rate: Option<String>,

    /// Discount display text.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub discount_text: Option<String>,
}

/// One option axis of the SKU picker.
#[derive(Debug, Clone, Serialize)]
pub struct OptionAxisPayload {
    /// Axis name.
    pub key: String,

    /// Axis values.
    pub value: Vec<String>,
}

/// Variant block of the display view.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VariantViewPayload {
    /// Purchasable configurations with display prices.
    pub details: Vec<VariantDetailViewPayload>,
}

/// One purchasable configuration of the display view.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VariantDetailViewPayload {
    /// Variant key.
    pub sku: String,

    /// Price actually charged.
    pub price: String,

    /// Pre-discount reference price.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub original_price: Option<String>,
}

impl GoodsViewPayload {
    /// Builds the display view of a priced goods record.
    #[must_use]
    pub fn from_priced(priced: &PricedGoods<'_>) -> Self {
        let goods = priced.goods().goods();
        let discount = goods.discount.as_ref();

        let labels = goods
            .variants
            .as_ref()
            .map(|variants| {
                variants
                    .options
                    .iter()
                    .map(|option| OptionAxisPayload {
                        key: option.name.clone(),
                        value: option.values.clone(),
                    })
                    .collect()
            })
            .unwrap_or_default();

        let variant_info = goods.variants.as_ref().map(|variants| VariantViewPayload {
            details: variants
                .details
                .iter()
                .map(|detail| VariantDetailViewPayload {
                    sku: detail.sku.clone(),
                    price: money_string(detail.price),
                    original_price: detail.original_price.map(money_string),
                })
                .collect(),
        });

        GoodsViewPayload {
            goods_id: goods.id.clone(),
            name: display::listing_name(&goods.name),
            simple_name: display::truncated_name(&goods.name, display::SHORT_NAME_LIMIT),
            sell_price: money_string(goods.sell_price),
            original_price: money_string(goods.original_price.unwrap_or(goods.sell_price)),
            inner_cid: goods.category.get(),
            min_price: priced.range().map(|range| money_string(range.min())),
            max_price: priced.range().map(|range| money_string(range.max())),
            price_label: money_string(priced.label()),
            labels,
            variant_info,
            fee_text: goods.post_fee.map(display::post_fee_text),
            discount: discount.map(|_| true),
            discount_rate: discount.map(|stamp| stamp.label().to_string()),
            discount_text: discount.map(|stamp| stamp.text().to_string()),
        }
    }
}

/// Runs the raw record through the full pricing pipeline and builds its
/// display view.
///
/// # Errors
///
/// Returns a [`PayloadError`] if a price does not convert or the
/// discount evaluation fails.
pub fn goods_view(
    payload: GoodsPayload,
    discount: Option<&MemberDiscount>,
    currency: &Currency,
) -> Result<GoodsViewPayload, PayloadError> {
    let goods = payload.into_goods(currency)?;
    let priced = prepare_goods(&goods, discount)?;

    Ok(GoodsViewPayload::from_priced(&priced))
}

/// The order document submitted to the order-creation endpoint.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TradePayload {
    /// Order-type code.
    pub order_type: String,

    /// Pre-reduction total.
    pub deal_price: String,

    /// Reduction subtracted from the deal price.
    pub reduce_fee: String,

    /// Amount to pay.
    pub final_price: String,

    /// Postage, fixed at zero in the cart flow.
    pub post_fee: String,

    /// Payment method code.
    pub payment_type: String,

    /// Payment method display text.
    pub payment_text: String,

    /// One record per cart line, in cart order.
    pub order_goods_infos: Vec<OrderLinePayload>,

    /// The shop the order is placed with.
    pub shop_name: String,

    /// Arrival text, present on dine-in orders only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub arrive_time: Option<String>,
}

/// One goods line of the order document.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderLinePayload {
    /// Identifier of the goods bought.
    pub goods_id: String,

    /// Display name.
    pub goods_name: String,

    /// Image shown for the line.
    pub image_url: String,

    /// Unit price actually charged.
    pub goods_price: String,

    /// Number of units.
    pub count: u32,

    /// Backend category identifier.
    pub inner_cid: u64,

    /// Human-readable variant description.
    pub sku_text: String,

    /// Variant key for the chosen configuration.
    pub goods_sku: String,

    /// Pre-discount unit price, carried for display.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub goods_sell_price: Option<String>,

    /// Discount flag, present when the line was discounted.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub discount: Option<bool>,

    /// Discount-rate label.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub discount_rate: Option<String>,

    /// Discount display text.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub discount_text: Option<String>,
}

impl From<&Trade<'_>> for TradePayload {
    fn from(trade: &Trade<'_>) -> Self {
        TradePayload {
            order_type: trade.order_type().code().to_string(),
            deal_price: money_string(trade.deal_price()),
            reduce_fee: money_string(trade.reduce_fee()),
            final_price: money_string(trade.final_price()),
            post_fee: money_string(trade.post_fee()),
            payment_type: trade.payment().code().to_string(),
            payment_text: trade.payment().text().to_string(),
            order_goods_infos: trade.lines().iter().map(OrderLinePayload::from).collect(),
            shop_name: trade.shop_name().to_string(),
            arrive_time: trade.arrive_time().map(str::to_string),
        }
    }
}

impl From<&OrderLine<'_>> for OrderLinePayload {
    fn from(line: &OrderLine<'_>) -> Self {
        let discount = line.discount.as_ref();

        OrderLinePayload {
            goods_id: line.goods_id.clone(),
            goods_name: line.name.clone(),
            image_url: line.image_url.clone(),
            goods_price: money_string(line.unit_price),
            count: line.quantity,
            inner_cid: line.category.get(),
            sku_text: line.variant_text.clone(),
            goods_sku: line.variant_key.clone(),
            goods_sell_price: line.reference_price.map(money_string),
            discount: discount.map(|_| true),
            discount_rate: discount.map(|stamp| stamp.label().to_string()),
            discount_text: discount.map(|stamp| stamp.text().to_string()),
        }
    }
}
