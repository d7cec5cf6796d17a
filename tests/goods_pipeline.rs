//! Integration tests for the goods pricing pipeline

use rusty_money::{Money, iso::CNY};
use testresult::TestResult;

use till::{
    discounts::{DiscountError, apply_member_discount},
    display::money_string,
    fixtures::StoreFixture,
    payload::GoodsViewPayload,
    pricing::prepare_goods,
};

#[test]
fn member_discount_flows_into_the_listing_view() -> TestResult {
    let fixture = StoreFixture::from_set("standard")?;
    let goods = fixture.goods_by_id("g-1001")?;
    let priced = prepare_goods(goods, fixture.discount())?;

    assert_eq!(priced.label(), Money::from_minor(800, CNY));

    let value = serde_json::to_value(GoodsViewPayload::from_priced(&priced))?;

    assert_eq!(value["sellPrice"], "8.00");
    assert_eq!(value["originalPrice"], "10.00");
    assert_eq!(value["priceLabel"], "8.00");
    assert_eq!(value["discount"], true);
    assert_eq!(value["discountRate"], "8折");
    assert_eq!(value["discountText"], "会员折扣");
    assert_eq!(value["feeText"], "配送：免运费");

    Ok(())
}

#[test]
fn variant_goods_range_over_discounted_prices() -> TestResult {
    let fixture = StoreFixture::from_set("standard")?;
    let goods = fixture.goods_by_id("g-2001")?;
    let priced = prepare_goods(goods, fixture.discount())?;

    let range = priced.range().expect("expected a price range");

    // 8.00 and 20.00 at rate 80.
    assert_eq!(range.min(), Money::from_minor(640, CNY));
    assert_eq!(range.max(), Money::from_minor(1600, CNY));

    let value = serde_json::to_value(GoodsViewPayload::from_priced(&priced))?;

    // Only the variant details are rewritten; the top-level prices pass
    // through, with the reference price falling back to the sell price.
    assert_eq!(value["sellPrice"], "15.00");
    assert_eq!(value["originalPrice"], "15.00");
    assert_eq!(value["minPrice"], "6.40");
    assert_eq!(value["maxPrice"], "16.00");
    assert_eq!(value["priceLabel"], "6.40");
    assert_eq!(value["labels"][0]["key"], "规格");
    assert_eq!(value["labels"][0]["value"][0], "小串");
    assert_eq!(value["labels"][0]["value"][1], "大串");
    assert_eq!(value["variantInfo"]["details"][0]["price"], "6.40");
    assert_eq!(value["variantInfo"]["details"][0]["originalPrice"], "8.00");
    assert_eq!(value["simple_name"], "冰糖葫芦什锦水果串套餐大...");

    Ok(())
}

#[test]
fn ineligible_goods_pass_through_unchanged() -> TestResult {
    let fixture = StoreFixture::from_set("standard")?;
    let goods = fixture.goods_by_id("g-1002")?;
    let priced = prepare_goods(goods, fixture.discount())?;

    assert!(!priced.goods().is_discounted());

    let value = serde_json::to_value(GoodsViewPayload::from_priced(&priced))?;

    assert_eq!(value["sellPrice"], "5.50");
    assert_eq!(value["originalPrice"], "5.50");
    assert_eq!(value["priceLabel"], "5.50");
    assert!(value.get("discount").is_none());
    assert!(value.get("feeText").is_none());

    Ok(())
}

#[test]
fn the_price_label_is_formatted_exactly_once() -> TestResult {
    let fixture = StoreFixture::from_set("standard")?;
    let goods = fixture.goods_by_id("g-2001")?;
    let priced = prepare_goods(goods, fixture.discount())?;
    let view = GoodsViewPayload::from_priced(&priced);

    // A formatted label is the plain decimal, not a repeated formatting of it.
    assert_eq!(view.price_label, money_string(priced.label()));
    assert_eq!(view.price_label, "6.40");

    Ok(())
}

#[test]
fn reapplying_the_discount_is_rejected() -> TestResult {
    let fixture = StoreFixture::from_set("standard")?;
    let goods = fixture.goods_by_id("g-1001")?;
    let stamped = apply_member_discount(goods, fixture.discount())?.into_inner();

    let result = apply_member_discount(&stamped, fixture.discount());

    assert!(matches!(result, Err(DiscountError::AlreadyApplied(_))));

    Ok(())
}
