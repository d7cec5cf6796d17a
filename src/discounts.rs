//! Member discounts
//!
//! Evaluates member-discount eligibility against a goods record and
//! rewrites its prices. Evaluation never mutates its input; it returns a
//! fresh [`DiscountedGoods`] record, which later pipeline stages take as
//! proof that evaluation has run.

use decimal_percentage::Percentage;
use rust_decimal::{
    Decimal, RoundingStrategy,
    prelude::{FromPrimitive, ToPrimitive},
};
use rustc_hash::FxHashSet;
use rusty_money::{Money, MoneyError, iso::Currency};
use thiserror::Error;

use crate::goods::{CategoryId, Goods};

/// Fixed display text for an applied member discount.
pub const MEMBER_DISCOUNT_TEXT: &str = "会员折扣";

/// Errors specific to discount evaluation.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DiscountError {
    /// Discount rate outside the valid percentage range.
    #[error("discount rate {0} is outside the valid range 1..=100")]
    RateOutOfRange(u8),

    /// The goods record already carries a member-discount stamp.
    #[error("goods {0} already carries a member discount")]
    AlreadyApplied(String),

    /// A discounted price could not be represented in minor units.
    #[error("discounted price cannot be represented in minor units")]
    PriceOverflow,
}

/// A validated discount rate: the percentage of the full price the member
/// pays, in the range `1..=100`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DiscountRate(u8);

impl DiscountRate {
    /// Create a rate, rejecting values outside `1..=100`.
    ///
    /// # Errors
    ///
    /// Returns [`DiscountError::RateOutOfRange`] for `0` or anything above `100`.
    pub fn new(rate: u8) -> Result<Self, DiscountError> {
        if (1..=100).contains(&rate) {
            Ok(DiscountRate(rate))
        } else {
            Err(DiscountError::RateOutOfRange(rate))
        }
    }

    /// The raw percentage value.
    #[must_use]
    pub fn get(self) -> u8 {
        self.0
    }

    /// The pay-this-fraction factor, e.g. rate 85 gives `0.85`.
    #[must_use]
    pub fn factor(self) -> Percentage {
        Percentage::from(Decimal::new(i64::from(self.0), 2))
    }

    /// The tenths label shown to buyers: rate 80 gives `8折`, 85 gives `8.5折`.
    #[must_use]
    pub fn label(self) -> String {
        let tenths = Decimal::new(i64::from(self.0), 1).normalize();

        format!("{tenths}折")
    }
}

/// A member discount: the categories it applies to and the rate to pay.
#[derive(Debug, Clone)]
pub struct MemberDiscount {
    categories: FxHashSet<CategoryId>,
    rate: DiscountRate,
}

impl MemberDiscount {
    /// Create a member discount over the given eligibility categories.
    pub fn new(categories: impl IntoIterator<Item = CategoryId>, rate: DiscountRate) -> Self {
        MemberDiscount {
            categories: categories.into_iter().collect(),
            rate,
        }
    }

    /// Whether goods in the given category are eligible.
    #[must_use]
    pub fn applies_to(&self, category: CategoryId) -> bool {
        self.categories.contains(&category)
    }

    /// The discount rate.
    #[must_use]
    pub fn rate(&self) -> DiscountRate {
        self.rate
    }
}

/// Display metadata stamped on a goods record once a discount has applied.
///
/// Presence of this stamp is the discount flag; it also guards against a
/// second application.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppliedDiscount {
    rate: DiscountRate,
    label: String,
    text: String,
}

impl AppliedDiscount {
    /// Create the stamp for a rate, deriving its display label and using
    /// the fixed member-discount text.
    #[must_use]
    pub fn new(rate: DiscountRate) -> Self {
        Self::with_text(rate, MEMBER_DISCOUNT_TEXT)
    }

    /// Create the stamp carrying its own display text, as stored cart
    /// lines may.
    #[must_use]
    pub fn with_text(rate: DiscountRate, text: impl Into<String>) -> Self {
        AppliedDiscount {
            rate,
            label: rate.label(),
            text: text.into(),
        }
    }

    /// The rate that was applied.
    #[must_use]
    pub fn rate(&self) -> DiscountRate {
        self.rate
    }

    /// The tenths label, e.g. `8.5折`.
    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }

    /// The display text, [`MEMBER_DISCOUNT_TEXT`] unless the stamp was
    /// built with its own.
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }
}

/// A goods record that has been through discount evaluation.
///
/// Later pipeline stages take this wrapper instead of a bare [`Goods`], so
/// price ranges and labels can only be computed after evaluation.
#[derive(Debug, Clone, PartialEq)]
pub struct DiscountedGoods<'a>(Goods<'a>);

impl<'a> DiscountedGoods<'a> {
    /// The evaluated goods record.
    #[must_use]
    pub fn goods(&self) -> &Goods<'a> {
        &self.0
    }

    /// Unwrap into the evaluated goods record.
    #[must_use]
    pub fn into_inner(self) -> Goods<'a> {
        self.0
    }

    /// Whether a discount actually applied.
    #[must_use]
    pub fn is_discounted(&self) -> bool {
        self.0.is_discounted()
    }

    /// The discount stamp, when one applied.
    #[must_use]
    pub fn stamp(&self) -> Option<&AppliedDiscount> {
        self.0.discount.as_ref()
    }

    /// Amount saved against the top-level reference price.
    ///
    /// Zero when the record carries no top-level reference price, as for
    /// undiscounted and multi-variant goods.
    ///
    /// # Errors
    ///
    /// Returns a [`MoneyError`] if the subtraction fails.
    pub fn savings(&self) -> Result<Money<'a, Currency>, MoneyError> {
        match self.0.original_price {
            Some(original) => original.sub(self.0.sell_price),
            None => Ok(Money::from_minor(0, self.0.sell_price.currency())),
        }
    }
}

/// Evaluate a member discount against a goods record.
///
/// Ineligible or absent discounts return the record unchanged. An eligible
/// discount records each full price as the reference price and rewrites the
/// current price to `full × rate / 100`, rounded half away from zero in
/// minor units. Multi-variant goods have each variant detail rewritten and
/// their top-level prices left alone; single-variant goods have the
/// top-level sell price rewritten. Both shapes receive the stamp.
///
/// # Errors
///
/// - [`DiscountError::AlreadyApplied`]: the record already carries a stamp.
/// - [`DiscountError::PriceOverflow`]: a rewritten price cannot be
///   represented in minor units.
pub fn apply_member_discount<'a>(
    goods: &Goods<'a>,
    discount: Option<&MemberDiscount>,
) -> Result<DiscountedGoods<'a>, DiscountError> {
    if goods.discount.is_some() {
        return Err(DiscountError::AlreadyApplied(goods.id.clone()));
    }

    let Some(discount) = discount else {
        return Ok(DiscountedGoods(goods.clone()));
    };

    if !discount.applies_to(goods.category) {
        return Ok(DiscountedGoods(goods.clone()));
    }

    let factor = discount.rate().factor();
    let mut discounted = goods.clone();

    if let Some(variants) = discounted.variants.as_mut() {
        for detail in &mut variants.details {
            let full_price = detail.price;

            detail.price = discounted_price(full_price, factor)?;
            detail.original_price = Some(full_price);
        }
    } else {
        let full_price = discounted.sell_price;

        discounted.sell_price = discounted_price(full_price, factor)?;
        discounted.original_price = Some(full_price);
    }

    discounted.discount = Some(AppliedDiscount::new(discount.rate()));

    Ok(DiscountedGoods(discounted))
}

/// Apply the rate factor to a price in minor units, rounding half away from zero.
fn discounted_price<'a>(
    price: Money<'a, Currency>,
    factor: Percentage,
) -> Result<Money<'a, Currency>, DiscountError> {
    let minor = price.to_minor_units();

    let Some(minor_dec) = Decimal::from_i64(minor) else {
        unreachable!("every i64 is representable as a Decimal")
    };

    let applied = factor * minor_dec;
    let rounded = applied.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero);
    let discounted_minor = rounded.to_i64().ok_or(DiscountError::PriceOverflow)?;

    debug_assert!(
        minor < 0 || discounted_minor <= minor,
        "a discounted price must not exceed the full price"
    );

    Ok(Money::from_minor(discounted_minor, price.currency()))
}

#[cfg(test)]
mod tests {
    use rusty_money::iso::CNY;
    use smallvec::smallvec;
    use testresult::TestResult;

    use crate::goods::{VariantDetail, VariantInfo};

    use super::*;

    fn test_goods<'a>() -> Goods<'a> {
        Goods::new(
            "g-1001",
            "拿铁咖啡",
            Money::from_minor(1500, CNY),
            CategoryId::new(7),
        )
    }

    fn test_discount(rate: u8) -> Result<MemberDiscount, DiscountError> {
        Ok(MemberDiscount::new(
            [CategoryId::new(7)],
            DiscountRate::new(rate)?,
        ))
    }

    #[test]
    fn applies_rate_to_single_variant_goods() -> TestResult {
        let goods = test_goods();
        let discount = test_discount(80)?;

        let result = apply_member_discount(&goods, Some(&discount))?;

        assert_eq!(result.goods().sell_price, Money::from_minor(1200, CNY));
        assert_eq!(
            result.goods().original_price,
            Some(Money::from_minor(1500, CNY))
        );

        let stamp = result.stamp().expect("expected discount stamp");

        assert_eq!(stamp.label(), "8折");
        assert_eq!(stamp.text(), MEMBER_DISCOUNT_TEXT);

        Ok(())
    }

    #[test]
    fn rewrites_each_variant_detail() -> TestResult {
        let mut goods = test_goods();

        goods.variants = Some(VariantInfo {
            details: smallvec![
                VariantDetail {
                    sku: "中杯".to_string(),
                    price: Money::from_minor(1000, CNY),
                    original_price: None,
                },
                VariantDetail {
                    sku: "大杯".to_string(),
                    price: Money::from_minor(1800, CNY),
                    original_price: None,
                },
            ],
            options: smallvec![],
        });

        let discount = test_discount(85)?;
        let result = apply_member_discount(&goods, Some(&discount))?;

        let variants = result
            .goods()
            .variants
            .as_ref()
            .expect("expected variants");

        let first = variants.details.first().expect("expected first detail");
        let last = variants.details.last().expect("expected last detail");

        assert_eq!(first.price, Money::from_minor(850, CNY));
        assert_eq!(first.original_price, Some(Money::from_minor(1000, CNY)));
        assert_eq!(last.price, Money::from_minor(1530, CNY));
        assert_eq!(last.original_price, Some(Money::from_minor(1800, CNY)));

        // The top-level prices belong to the single-variant path.
        assert_eq!(result.goods().sell_price, Money::from_minor(1500, CNY));
        assert_eq!(result.goods().original_price, None);
        assert!(result.is_discounted());
        assert_eq!(result.savings()?, Money::from_minor(0, CNY));

        Ok(())
    }

    #[test]
    fn ineligible_category_returns_input_unchanged() -> TestResult {
        let goods = test_goods();

        let discount = MemberDiscount::new([CategoryId::new(99)], DiscountRate::new(80)?);

        let result = apply_member_discount(&goods, Some(&discount))?;

        assert_eq!(result.goods(), &goods);
        assert!(!result.is_discounted());

        Ok(())
    }

    #[test]
    fn absent_discount_returns_input_unchanged() -> TestResult {
        let goods = test_goods();

        let result = apply_member_discount(&goods, None)?;

        assert_eq!(result.goods(), &goods);
        assert!(result.stamp().is_none());

        Ok(())
    }

    #[test]
    fn second_application_is_rejected() -> TestResult {
        let goods = test_goods();
        let discount = test_discount(80)?;

        let once = apply_member_discount(&goods, Some(&discount))?.into_inner();
        let twice = apply_member_discount(&once, Some(&discount));

        assert!(matches!(
            twice,
            Err(DiscountError::AlreadyApplied(id)) if id == "g-1001"
        ));

        Ok(())
    }

    #[test]
    fn rate_must_be_between_one_and_one_hundred() -> TestResult {
        assert!(matches!(
            DiscountRate::new(0),
            Err(DiscountError::RateOutOfRange(0))
        ));
        assert!(matches!(
            DiscountRate::new(101),
            Err(DiscountError::RateOutOfRange(101))
        ));

        assert_eq!(DiscountRate::new(1)?.get(), 1);
        assert_eq!(DiscountRate::new(100)?.get(), 100);

        Ok(())
    }

    #[test]
    fn full_rate_stamps_without_changing_price() -> TestResult {
        let goods = test_goods();
        let discount = test_discount(100)?;

        let result = apply_member_discount(&goods, Some(&discount))?;

        assert_eq!(result.goods().sell_price, Money::from_minor(1500, CNY));
        assert_eq!(
            result.goods().original_price,
            Some(Money::from_minor(1500, CNY))
        );
        assert!(result.is_discounted());

        let stamp = result.stamp().expect("expected discount stamp");

        assert_eq!(stamp.label(), "10折");

        Ok(())
    }

    #[test]
    fn midpoint_rounds_away_from_zero() -> TestResult {
        // 12.50 × 0.85 = 10.625, so the half-cent rounds up to 10.63.
        let mut goods = test_goods();

        goods.sell_price = Money::from_minor(1250, CNY);

        let discount = test_discount(85)?;
        let result = apply_member_discount(&goods, Some(&discount))?;

        assert_eq!(result.goods().sell_price, Money::from_minor(1063, CNY));

        Ok(())
    }

    #[test]
    fn label_drops_trailing_zero_tenths() -> TestResult {
        assert_eq!(DiscountRate::new(80)?.label(), "8折");
        assert_eq!(DiscountRate::new(85)?.label(), "8.5折");
        assert_eq!(DiscountRate::new(5)?.label(), "0.5折");

        Ok(())
    }

    #[test]
    fn stamp_text_defaults_and_can_be_supplied() -> TestResult {
        let rate = DiscountRate::new(80)?;

        assert_eq!(AppliedDiscount::new(rate).text(), MEMBER_DISCOUNT_TEXT);
        assert_eq!(
            AppliedDiscount::with_text(rate, "限时特惠").text(),
            "限时特惠"
        );

        Ok(())
    }

    #[test]
    fn savings_reflect_the_price_cut() -> TestResult {
        let goods = test_goods();
        let discount = test_discount(80)?;

        let discounted = apply_member_discount(&goods, Some(&discount))?;
        let untouched = apply_member_discount(&test_goods(), None)?;

        assert_eq!(discounted.savings()?, Money::from_minor(300, CNY));
        assert_eq!(untouched.savings()?, Money::from_minor(0, CNY));

        Ok(())
    }

    #[test]
    fn applies_to_checks_the_eligibility_set() -> TestResult {
        let discount = MemberDiscount::new(
            [CategoryId::new(7), CategoryId::new(9)],
            DiscountRate::new(80)?,
        );

        assert!(discount.applies_to(CategoryId::new(7)));
        assert!(discount.applies_to(CategoryId::new(9)));
        assert!(!discount.applies_to(CategoryId::new(8)));

        Ok(())
    }
}
