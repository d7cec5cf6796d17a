//! Goods
//!
//! Catalogue records as the storefront presents them: a sell price, an
//! optional pre-discount reference price, and optional variant data for
//! goods sold in more than one configuration.

use rusty_money::{Money, iso::Currency};
use smallvec::SmallVec;

use crate::discounts::AppliedDiscount;

/// Storefront category identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CategoryId(u64);

impl CategoryId {
    /// Create a category id from its wire integer.
    #[must_use]
    pub fn new(id: u64) -> Self {
        CategoryId(id)
    }

    /// The wire integer for this category.
    #[must_use]
    pub fn get(self) -> u64 {
        self.0
    }
}

/// A purchasable variant of a goods record.
#[derive(Debug, Clone, PartialEq)]
pub struct VariantDetail<'a> {
    /// Variant key identifying this configuration.
    pub sku: String,

    /// Current price for this variant.
    pub price: Money<'a, Currency>,

    /// Pre-discount reference price, if one has been recorded.
    pub original_price: Option<Money<'a, Currency>>,
}

/// One selectable option axis (size, sweetness, ...) and its values.
#[derive(Debug, Clone, PartialEq)]
pub struct VariantOption {
    /// Axis name shown to the buyer.
    pub name: String,

    /// Selectable values along this axis.
    pub values: Vec<String>,
}

/// Variant data for a goods record sold in multiple configurations.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct VariantInfo<'a> {
    /// Purchasable variants in display order.
    pub details: SmallVec<[VariantDetail<'a>; 4]>,

    /// Selectable option axes, at most three.
    pub options: SmallVec<[VariantOption; 3]>,
}

impl VariantInfo<'_> {
    /// Whether this record carries any purchasable variants.
    #[must_use]
    pub fn has_details(&self) -> bool {
        !self.details.is_empty()
    }
}

/// A goods record as served by the catalogue.
///
/// Fresh server records carry no `discount` stamp; the stamp is written by
/// discount evaluation and doubles as the applied-at-most-once guard.
#[derive(Debug, Clone, PartialEq)]
pub struct Goods<'a> {
    /// Goods identifier.
    pub id: String,

    /// Display name.
    pub name: String,

    /// Current sell price.
    pub sell_price: Money<'a, Currency>,

    /// Pre-discount reference price, if one has been recorded.
    pub original_price: Option<Money<'a, Currency>>,

    /// Category this goods record belongs to.
    pub category: CategoryId,

    /// Variant data, when the goods is sold in multiple configurations.
    pub variants: Option<VariantInfo<'a>>,

    /// Externally computed delivery fee, carried for display only.
    pub post_fee: Option<Money<'a, Currency>>,

    /// Discount metadata stamped by evaluation; `None` until then.
    pub discount: Option<AppliedDiscount>,
}

impl<'a> Goods<'a> {
    /// Create an undiscounted goods record with no variants.
    #[must_use]
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        sell_price: Money<'a, Currency>,
        category: CategoryId,
    ) -> Self {
        Goods {
            id: id.into(),
            name: name.into(),
            sell_price,
            original_price: None,
            category,
            variants: None,
            post_fee: None,
            discount: None,
        }
    }

    /// Whether a discount has been stamped on this record.
    #[must_use]
    pub fn is_discounted(&self) -> bool {
        self.discount.is_some()
    }

    /// The currency all prices on this record are denominated in.
    #[must_use]
    pub fn currency(&self) -> &'a Currency {
        self.sell_price.currency()
    }
}
