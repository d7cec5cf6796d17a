//! Fixtures
//!
//! YAML-backed store data for demos and tests: goods records, the member
//! discount, and cart lines with order parameters, loaded by set name.

use std::{fs, path::PathBuf};

use rust_decimal::Decimal;
use rusty_money::iso::{self, Currency};
use serde::Deserialize;
use thiserror::Error;

use crate::{
    cart::{Cart, CartError, CartLine},
    discounts::MemberDiscount,
    goods::Goods,
    payload::{CartLinePayload, DiscountPayload, GoodsPayload, PayloadError, money_from_decimal},
    trade::{OrderParams, OrderType, Reduction},
};

/// Fixture Parsing Errors
#[derive(Debug, Error)]
pub enum FixtureError {
    /// IO error reading fixture files
    #[error("Failed to read fixture file: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parsing error
    #[error("Failed to parse YAML: {0}")]
    Yaml(#[from] serde_norway::Error),

    /// Unknown currency code
    #[error("Unknown currency code: {0}")]
    UnknownCurrency(String),

    /// Currency mismatch between fixture files
    #[error("Currency mismatch: expected {0}, found {1}")]
    CurrencyMismatch(String, String),

    /// Goods not found
    #[error("Goods not found: {0}")]
    GoodsNotFound(String),

    /// No goods or cart loaded yet
    #[error("No fixture with a currency loaded yet; currency unknown")]
    NoCurrency,

    /// No cart lines loaded
    #[error("No cart lines loaded; cannot create a cart")]
    NoLines,

    /// No cart fixture loaded
    #[error("No cart loaded; order parameters unknown")]
    NoOrderParams,

    /// Not enough cart lines in fixture
    #[error("Not enough cart lines in fixture, available: {available}, requested: {requested}")]
    NotEnoughLines {
        /// Number of lines defined in the fixture
        available: usize,
        /// Number of lines requested
        requested: usize,
    },

    /// Wire record conversion error
    #[error(transparent)]
    Payload(#[from] PayloadError),

    /// Cart creation error
    #[error("Failed to create cart: {0}")]
    Cart(#[from] CartError),
}

#[derive(Debug, Deserialize)]
struct GoodsFixture {
    currency: String,

    #[serde(default)]
    goods: Vec<GoodsPayload>,
}

#[derive(Debug, Deserialize)]
struct DiscountsFixture {
    #[serde(default)]
    discount: Option<DiscountPayload>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CartFixture {
    currency: String,

    #[serde(default)]
    shop: Option<String>,

    order_type: String,

    #[serde(default)]
    reduce_fee: Option<Decimal>,

    #[serde(default)]
    lines: Vec<CartLinePayload>,
}

/// Store fixture
#[derive(Debug)]
pub struct StoreFixture {
    /// Base path for fixture files
    base_path: PathBuf,

    /// Currency shared by every loaded file
    currency: Option<&'static Currency>,

    /// Converted goods records, in file order
    goods: Vec<Goods<'static>>,

    /// The member discount, when the set defines one
    discount: Option<MemberDiscount>,

    /// Converted cart lines, in file order
    cart_lines: Vec<CartLine<'static>>,

    /// Shop the cart fixture orders from
    shop_name: String,

    /// Order parameters from the cart fixture
    order_params: Option<OrderParams<'static>>,
}

impl StoreFixture {
    /// Create a new empty fixture with default base path
    pub fn new() -> Self {
        Self::with_base_path("./fixtures")
    }

    /// Create a new empty fixture with custom base path
    pub fn with_base_path(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
            currency: None,
            goods: Vec::new(),
            discount: None,
            cart_lines: Vec::new(),
            shop_name: String::new(),
            order_params: None,
        }
    }

    /// Load goods records from a YAML fixture file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, a price does
    /// not convert, or the file's currency differs from an earlier file.
    pub fn load_goods(&mut self, name: &str) -> Result<&mut Self, FixtureError> {
        let file_path = self.base_path.join("goods").join(format!("{name}.yml"));
        let contents = fs::read_to_string(&file_path)?;
        let fixture: GoodsFixture = serde_norway::from_str(&contents)?;

        let currency = self.resolve_currency(&fixture.currency)?;

        for payload in fixture.goods {
            self.goods.push(payload.into_goods(currency)?);
        }

        Ok(self)
    }

    /// Load the member discount from a YAML fixture file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, or the rate
    /// is out of range.
    pub fn load_discounts(&mut self, name: &str) -> Result<&mut Self, FixtureError> {
        let file_path = self
            .base_path
            .join("discounts")
            .join(format!("{name}.yml"));

        let contents = fs::read_to_string(&file_path)?;
        let fixture: DiscountsFixture = serde_norway::from_str(&contents)?;

        if let Some(payload) = fixture.discount {
            self.discount = Some(payload.into_discount()?);
        }

        Ok(self)
    }

    /// Load cart lines and order parameters from a YAML fixture file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, a line fails
    /// validation, or the file's currency differs from an earlier file.
    pub fn load_cart(&mut self, name: &str) -> Result<&mut Self, FixtureError> {
        let file_path = self.base_path.join("carts").join(format!("{name}.yml"));
        let contents = fs::read_to_string(&file_path)?;
        let fixture: CartFixture = serde_norway::from_str(&contents)?;

        let currency = self.resolve_currency(&fixture.currency)?;

        if let Some(shop) = fixture.shop {
            self.shop_name = shop;
        }

        let reduce = fixture
            .reduce_fee
            .map(|fee| money_from_decimal(fee, currency).map(|fee| Reduction { fee }))
            .transpose()?;

        self.order_params = Some(OrderParams {
            order_type: OrderType::new(fixture.order_type),
            reduce,
        });

        for (index, line) in fixture.lines.into_iter().enumerate() {
            self.cart_lines.push(line.into_line(index, currency)?);
        }

        Ok(self)
    }

    /// Load a complete fixture set (goods, discounts, and cart with the same name)
    ///
    /// # Errors
    ///
    /// Returns an error if any of the fixture files cannot be loaded.
    pub fn from_set(name: &str) -> Result<Self, FixtureError> {
        let mut fixture = Self::new();

        fixture
            .load_goods(name)?
            .load_discounts(name)?
            .load_cart(name)?;

        Ok(fixture)
    }

    fn resolve_currency(&mut self, code: &str) -> Result<&'static Currency, FixtureError> {
        let currency =
            iso::find(code).ok_or_else(|| FixtureError::UnknownCurrency(code.to_string()))?;

        match self.currency {
            Some(existing) if existing != currency => Err(FixtureError::CurrencyMismatch(
                existing.iso_alpha_code.to_string(),
                currency.iso_alpha_code.to_string(),
            )),
            _ => {
                self.currency = Some(currency);

                Ok(currency)
            }
        }
    }

    /// Get all loaded goods records
    pub fn goods(&self) -> &[Goods<'static>] {
        &self.goods
    }

    /// Get a goods record by its identifier
    ///
    /// # Errors
    ///
    /// Returns an error if no loaded record carries the identifier.
    pub fn goods_by_id(&self, id: &str) -> Result<&Goods<'static>, FixtureError> {
        self.goods
            .iter()
            .find(|goods| goods.id == id)
            .ok_or_else(|| FixtureError::GoodsNotFound(id.to_string()))
    }

    /// Get the member discount, when the set defines one
    pub fn discount(&self) -> Option<&MemberDiscount> {
        self.discount.as_ref()
    }

    /// Get the shop name from the cart fixture
    pub fn shop_name(&self) -> &str {
        &self.shop_name
    }

    /// Get the order parameters from the cart fixture
    ///
    /// # Errors
    ///
    /// Returns an error if no cart fixture has been loaded.
    pub fn order_params(&self) -> Result<&OrderParams<'static>, FixtureError> {
        self.order_params.as_ref().ok_or(FixtureError::NoOrderParams)
    }

    /// Create a cart from the loaded lines
    ///
    /// # Errors
    ///
    /// Returns an error if no lines are loaded, more lines are requested
    /// than the fixture defines, or cart creation fails.
    pub fn cart(&self, n: Option<usize>) -> Result<Cart<'static>, FixtureError> {
        let currency = self.currency.ok_or(FixtureError::NoCurrency)?;

        if self.cart_lines.is_empty() {
            return Err(FixtureError::NoLines);
        }

        if let Some(n) = n
            && n > self.cart_lines.len()
        {
            return Err(FixtureError::NotEnoughLines {
                requested: n,
                available: self.cart_lines.len(),
            });
        }

        let lines: Vec<CartLine<'_>> = self
            .cart_lines
            .iter()
            .take(n.unwrap_or(self.cart_lines.len()))
            .cloned()
            .collect();

        Ok(Cart::with_lines(lines, currency)?)
    }

    /// Get the currency
    ///
    /// # Errors
    ///
    /// Returns an error if no fixture carrying a currency has been loaded yet.
    pub fn currency(&self) -> Result<&'static Currency, FixtureError> {
        self.currency.ok_or(FixtureError::NoCurrency)
    }
}

impl Default for StoreFixture {
    fn default() -> Self {
        Self::new()
    }
}
