//! Checkout Example
//!
//! Aggregates a fixture cart into a trade, prints the order summary, and
//! dumps the document the order endpoint would receive.
//!
//! Use `-f` to load a fixture set by name
//! Use `-n` to specify the number of cart lines to order

use std::io;

use anyhow::Result;
use clap::Parser;
use till::{fixtures::StoreFixture, payload::TradePayload, trade::Trade, utils::StorefrontArgs};

/// Checkout Example
#[expect(clippy::print_stdout, reason = "Example code")]
pub fn main() -> Result<()> {
    let args = StorefrontArgs::parse();

    let fixture = StoreFixture::from_set(&args.fixture)?;

    let cart = fixture.cart(args.n)?;
    let params = fixture.order_params()?;

    let trade = Trade::from_cart(&cart, params, fixture.shop_name())?;

    let stdout = io::stdout();
    let mut handle = stdout.lock();

    trade.write_to(&mut handle)?;

    println!(
        "{}",
        serde_json::to_string_pretty(&TradePayload::from(&trade))?
    );

    Ok(())
}
