//! Pricing
//!
//! Variant price ranges and listing labels, derived once a goods record
//! has been through discount evaluation. [`prepare_goods`] chains the
//! stages in their required order.

use rusty_money::{Money, iso::Currency};

use crate::{
    discounts::{DiscountError, DiscountedGoods, MemberDiscount, apply_member_discount},
    goods::Goods,
};

/// The span of variant prices on a multi-variant goods record.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PriceRange<'a> {
    min: Money<'a, Currency>,
    max: Money<'a, Currency>,
}

impl<'a> PriceRange<'a> {
    /// The cheapest variant price.
    #[must_use]
    pub fn min(&self) -> Money<'a, Currency> {
        self.min
    }

    /// The dearest variant price.
    #[must_use]
    pub fn max(&self) -> Money<'a, Currency> {
        self.max
    }
}

/// Min/max over the variant prices of an evaluated goods record.
///
/// Returns `None` when the record carries no variants, so single-variant
/// goods never pick up a sentinel range.
#[must_use]
pub fn variant_price_range<'a>(goods: &DiscountedGoods<'a>) -> Option<PriceRange<'a>> {
    let variants = goods.goods().variants.as_ref()?;
    let first = variants.details.first()?;

    let mut min = first.price;
    let mut max = first.price;

    for detail in &variants.details {
        if detail.price.to_minor_units() < min.to_minor_units() {
            min = detail.price;
        }

        if detail.price.to_minor_units() > max.to_minor_units() {
            max = detail.price;
        }
    }

    debug_assert!(
        min.to_minor_units() <= max.to_minor_units(),
        "range bounds must be ordered"
    );

    Some(PriceRange { min, max })
}

/// The price shown on listings: the range minimum when a range exists,
/// otherwise the sell price.
#[must_use]
pub fn price_label<'a>(
    goods: &DiscountedGoods<'a>,
    range: Option<&PriceRange<'a>>,
) -> Money<'a, Currency> {
    match range {
        Some(range) => range.min(),
        None => goods.goods().sell_price,
    }
}

/// A display-ready goods record: evaluated, ranged and labelled.
#[derive(Debug, Clone)]
pub struct PricedGoods<'a> {
    goods: DiscountedGoods<'a>,
    range: Option<PriceRange<'a>>,
    label: Money<'a, Currency>,
}

impl<'a> PricedGoods<'a> {
    /// The evaluated goods record.
    #[must_use]
    pub fn goods(&self) -> &DiscountedGoods<'a> {
        &self.goods
    }

    /// The variant price range, when the record has variants.
    #[must_use]
    pub fn range(&self) -> Option<&PriceRange<'a>> {
        self.range.as_ref()
    }

    /// The listing price label.
    #[must_use]
    pub fn label(&self) -> Money<'a, Currency> {
        self.label
    }
}

/// Run the listing pipeline: discount evaluation, then the variant price
/// range, then the display label.
///
/// # Errors
///
/// Returns a [`DiscountError`] if discount evaluation rejects the record.
pub fn prepare_goods<'a>(
    goods: &Goods<'a>,
    discount: Option<&MemberDiscount>,
) -> Result<PricedGoods<'a>, DiscountError> {
    let goods = apply_member_discount(goods, discount)?;
    let range = variant_price_range(&goods);
    let label = price_label(&goods, range.as_ref());

    Ok(PricedGoods {
        goods,
        range,
        label,
    })
}

#[cfg(test)]
mod tests {
    use rusty_money::iso::CNY;
    use smallvec::smallvec;
    use testresult::TestResult;

    use crate::{
        discounts::DiscountRate,
        goods::{CategoryId, VariantDetail, VariantInfo},
    };

    use super::*;

    fn detail<'a>(sku: &str, minor: i64) -> VariantDetail<'a> {
        VariantDetail {
            sku: sku.to_string(),
            price: Money::from_minor(minor, CNY),
            original_price: None,
        }
    }

    fn variant_goods<'a>(prices: &[i64]) -> Goods<'a> {
        let mut goods = Goods::new(
            "g-2001",
            "杨枝甘露",
            Money::from_minor(1500, CNY),
            CategoryId::new(7),
        );

        goods.variants = Some(VariantInfo {
            details: prices
                .iter()
                .enumerate()
                .map(|(i, minor)| detail(&format!("sku-{i}"), *minor))
                .collect(),
            options: smallvec![],
        });

        goods
    }

    #[test]
    fn range_spans_cheapest_to_dearest_variant() -> TestResult {
        let goods = variant_goods(&[1200, 800, 2000]);
        let evaluated = apply_member_discount(&goods, None)?;

        let range = variant_price_range(&evaluated).expect("expected a range");

        assert_eq!(range.min(), Money::from_minor(800, CNY));
        assert_eq!(range.max(), Money::from_minor(2000, CNY));

        Ok(())
    }

    #[test]
    fn no_variants_means_no_range() -> TestResult {
        let goods = variant_goods(&[]);
        let evaluated = apply_member_discount(&goods, None)?;

        assert!(variant_price_range(&evaluated).is_none());

        let plain = Goods::new(
            "g-2002",
            "冰美式",
            Money::from_minor(900, CNY),
            CategoryId::new(7),
        );

        let evaluated = apply_member_discount(&plain, None)?;

        assert!(variant_price_range(&evaluated).is_none());

        Ok(())
    }

    #[test]
    fn single_variant_collapses_the_range() -> TestResult {
        let goods = variant_goods(&[1200]);
        let evaluated = apply_member_discount(&goods, None)?;

        let range = variant_price_range(&evaluated).expect("expected a range");

        assert_eq!(range.min(), range.max());
        assert_eq!(range.min(), Money::from_minor(1200, CNY));

        Ok(())
    }

    #[test]
    fn label_uses_the_range_minimum() -> TestResult {
        let goods = variant_goods(&[800, 2000]);
        let evaluated = apply_member_discount(&goods, None)?;
        let range = variant_price_range(&evaluated);

        let label = price_label(&evaluated, range.as_ref());

        assert_eq!(label, Money::from_minor(800, CNY));

        Ok(())
    }

    #[test]
    fn label_falls_back_to_the_sell_price() -> TestResult {
        let plain = Goods::new(
            "g-2003",
            "冰美式",
            Money::from_minor(1500, CNY),
            CategoryId::new(7),
        );

        let evaluated = apply_member_discount(&plain, None)?;

        let label = price_label(&evaluated, None);

        assert_eq!(label, Money::from_minor(1500, CNY));

        Ok(())
    }

    #[test]
    fn prepare_goods_ranges_the_discounted_prices() -> TestResult {
        let goods = variant_goods(&[1000, 2000]);

        let discount = MemberDiscount::new([CategoryId::new(7)], DiscountRate::new(80)?);

        let priced = prepare_goods(&goods, Some(&discount))?;

        // Variants rewrote to 8.00 and 16.00 before the range was taken.
        let range = priced.range().expect("expected a range");

        assert_eq!(range.min(), Money::from_minor(800, CNY));
        assert_eq!(range.max(), Money::from_minor(1600, CNY));
        assert_eq!(priced.label(), Money::from_minor(800, CNY));
        assert!(priced.goods().is_discounted());

        Ok(())
    }

    #[test]
    fn empty_variant_details_keep_the_full_sell_price_as_label() -> TestResult {
        let goods = variant_goods(&[]);

        let discount = MemberDiscount::new([CategoryId::new(7)], DiscountRate::new(80)?);

        let priced = prepare_goods(&goods, Some(&discount))?;

        // No details to rewrite, so the fallback label is the full price.
        assert!(priced.range().is_none());
        assert!(priced.goods().is_discounted());
        assert_eq!(priced.label(), Money::from_minor(1500, CNY));

        Ok(())
    }

    #[test]
    fn prepare_goods_labels_plain_records_with_the_sell_price() -> TestResult {
        let plain = Goods::new(
            "g-2004",
            "冰美式",
            Money::from_minor(900, CNY),
            CategoryId::new(7),
        );

        let priced = prepare_goods(&plain, None)?;

        assert!(priced.range().is_none());
        assert_eq!(priced.label(), Money::from_minor(900, CNY));

        Ok(())
    }
}
