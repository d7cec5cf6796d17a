//! Goods Listing Example
//!
//! Runs every goods record in a fixture set through the member-discount
//! and pricing pipeline and prints the display-ready views.
//!
//! Use `-f` to load a fixture set by name
//! Use `-n` to limit the number of goods listed

use anyhow::Result;
use clap::Parser;
use till::{
    fixtures::StoreFixture, payload::GoodsViewPayload, pricing::prepare_goods,
    utils::StorefrontArgs,
};

/// Goods Listing Example
#[expect(clippy::print_stdout, reason = "Example code")]
pub fn main() -> Result<()> {
    let args = StorefrontArgs::parse();

    let fixture = StoreFixture::from_set(&args.fixture)?;
    let n = args.n.unwrap_or(fixture.goods().len());

    for goods in fixture.goods().iter().take(n) {
        let priced = prepare_goods(goods, fixture.discount())?;
        let view = GoodsViewPayload::from_priced(&priced);

        println!("{}", serde_json::to_string_pretty(&view)?);
    }

    Ok(())
}
