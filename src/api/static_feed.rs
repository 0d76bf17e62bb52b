use std::collections::HashMap;

use async_trait::async_trait;

use super::PriceFeed;
use crate::errors::FeedError;
use crate::models::{Pair, Quote};

const FALLBACK_PRICE: f64 = 150.0;
const PRICE_IMPACT_PCT: f64 = 0.1;

/// Fixed-price feed for demo mode
///
/// Never fails. Unknown pairs fall back to 150.0; quotes use the pair price in
/// the requested direction (or its inverse) with a constant 0.1% price impact.
#[derive(Debug, Clone)]
pub struct StaticPriceFeed {
    prices: HashMap<String, f64>,
    tokens: Vec<String>,
}

impl StaticPriceFeed {
    pub fn new() -> Self {
        let prices = [("SOL/USDC", 153.42), ("SOL/USDT", 153.38), ("SOL/BTC", 0.00245)]
            .into_iter()
            .map(|(pair, price)| (pair.to_string(), price))
            .collect();

        let tokens = ["SOL", "USDC", "USDT", "BTC", "ETH", "BONK"]
            .into_iter()
            .map(String::from)
            .collect();

        Self { prices, tokens }
    }

    pub fn with_price(mut self, pair: &Pair, price: f64) -> Self {
        self.prices.insert(pair.to_string(), price);
        for token in [&pair.base, &pair.quote] {
            if !self.tokens.contains(token) {
                self.tokens.push(token.clone());
            }
        }
        self
    }

    fn price(&self, base: &str, quote: &str) -> f64 {
        self.prices
            .get(&format!("{}/{}", base, quote))
            .copied()
            .unwrap_or(FALLBACK_PRICE)
    }

    /// Output per unit of input
    fn conversion_rate(&self, input: &str, output: &str) -> f64 {
        if let Some(price) = self.prices.get(&format!("{}/{}", input, output)) {
            return *price;
        }
        match self.prices.get(&format!("{}/{}", output, input)) {
            Some(price) if *price > 0.0 => 1.0 / price,
            _ => FALLBACK_PRICE,
        }
    }
}

impl Default for StaticPriceFeed {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PriceFeed for StaticPriceFeed {
    async fn price_for_pair(&self, base: &str, quote: &str) -> Result<f64, FeedError> {
        Ok(self.price(base, quote))
    }

    async fn quote(
        &self,
        input: &str,
        output: &str,
        amount: f64,
        slippage_bps: u16,
    ) -> Result<Quote, FeedError> {
        let price = self.conversion_rate(input, output);
        Ok(Quote {
            input_token: input.to_string(),
            output_token: output.to_string(),
            in_amount: (amount * 1e9) as u64,
            out_amount: (amount * price * 1e6) as u64,
            price,
            price_impact_pct: PRICE_IMPACT_PCT,
            slippage_bps,
        })
    }

    async fn token_list(&self) -> Result<Vec<String>, FeedError> {
        Ok(self.tokens.clone())
    }
}
