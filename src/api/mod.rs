pub mod jupiter;
pub mod static_feed;

pub use jupiter::{JupiterClient, TokenInfo};
pub use static_feed::StaticPriceFeed;

use async_trait::async_trait;

use crate::errors::FeedError;
use crate::models::Quote;

/// Default slippage tolerance for quotes, in basis points (50 = 0.5%)
pub const DEFAULT_SLIPPAGE_BPS: u16 = 50;

/// Source of prices and swap quotes
///
/// Consumed as a black box: every call may fail, and the engine never assumes
/// anything about how the numbers are produced.
#[async_trait]
pub trait PriceFeed: Send + Sync {
    /// Current price of `base` expressed in `quote`
    async fn price_for_pair(&self, base: &str, quote: &str) -> Result<f64, FeedError>;

    /// Quote for swapping `amount` (UI units) of `input` into `output`
    async fn quote(
        &self,
        input: &str,
        output: &str,
        amount: f64,
        slippage_bps: u16,
    ) -> Result<Quote, FeedError>;

    /// Symbols this feed can price
    async fn token_list(&self) -> Result<Vec<String>, FeedError>;
}
