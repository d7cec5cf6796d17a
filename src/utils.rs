//! Utils

use clap::Parser;

/// Arguments for the storefront examples
#[derive(Debug, Parser)]
pub struct StorefrontArgs {
    /// Number of cart lines to order
    #[clap(short, long)]
    pub n: Option<usize>,

    /// Fixture set to use for the goods, discount & cart
    #[clap(short, long, default_value = "standard")]
    pub fixture: String,
}
