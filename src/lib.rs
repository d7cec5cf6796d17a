//! Till
//!
//! Till is a storefront pricing and order-aggregation engine written in Rust.

pub mod cart;
pub mod discounts;
pub mod display;
pub mod fixtures;
pub mod goods;
pub mod payload;
pub mod prelude;
pub mod pricing;
pub mod trade;
pub mod utils;
