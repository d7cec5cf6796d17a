//! Till prelude.
//!
//! Convenience exports for common library consumers.

pub use crate::{
    cart::{Cart, CartError, CartLine},
    discounts::{
        AppliedDiscount, DiscountError, DiscountRate, DiscountedGoods, MEMBER_DISCOUNT_TEXT,
        MemberDiscount, apply_member_discount,
    },
    display::{listing_name, money_string, post_fee_text, truncated_name},
    fixtures::{FixtureError, StoreFixture},
    goods::{CategoryId, Goods, VariantDetail, VariantInfo, VariantOption},
    payload::{
        CartLinePayload, DiscountPayload, GoodsPayload, GoodsViewPayload, PayloadError,
        TradePayload, goods_view, money_from_decimal,
    },
    pricing::{PriceRange, PricedGoods, prepare_goods, price_label, variant_price_range},
    trade::{
        DINE_IN_ORDER_TYPE, IMMEDIATE_SERVICE_TEXT, OrderLine, OrderParams, OrderType,
        PaymentMethod, Reduction, Trade, TradeError,
    },
};
