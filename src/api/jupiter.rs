use std::collections::HashMap;
use std::num::NonZeroU32;
use std::sync::Arc;

use async_trait::async_trait;
use governor::{Quota, RateLimiter};
use reqwest::Client;
use serde::Deserialize;

use super::PriceFeed;
use crate::errors::FeedError;
use crate::models::Quote;

// Jupiter Swap API v1
// Docs: https://dev.jup.ag/docs/swap-api/get-quote
const JUPITER_QUOTE_API: &str = "https://lite-api.jup.ag/swap/v1";
const RATE_LIMIT_RPM: u32 = 60;

type JupiterRateLimiter = RateLimiter<
    governor::state::direct::NotKeyed,
    governor::state::InMemoryState,
    governor::clock::DefaultClock,
>;

/// Mint address and decimals for a tradable symbol
#[derive(Debug, Clone, PartialEq)]
pub struct TokenInfo {
    pub mint: String,
    pub decimals: u8,
}

impl TokenInfo {
    fn new(mint: &str, decimals: u8) -> Self {
        Self {
            mint: mint.to_string(),
            decimals,
        }
    }

    fn to_raw(&self, amount: f64) -> u64 {
        (amount * 10f64.powi(self.decimals as i32)).round() as u64
    }

    fn to_ui(&self, raw: u64) -> f64 {
        raw as f64 / 10f64.powi(self.decimals as i32)
    }
}

fn default_tokens() -> HashMap<String, TokenInfo> {
    [
        ("SOL", TokenInfo::new("So11111111111111111111111111111111111111112", 9)),
        ("USDC", TokenInfo::new("EPjFWdd5AufqSSqeM2qN1xzybapC8G4wEGGkZwyTDt1v", 6)),
        ("USDT", TokenInfo::new("Es9vMFrzaCERmJfrF4H2FYD4KCoNkY11McCe8BenwNYB", 6)),
        ("JUP", TokenInfo::new("JUPyiwrYJFskUPiHa7hkeR8VUtAeFoSYbKedZNsDvCN", 6)),
        ("BONK", TokenInfo::new("DezXAZ8z7PnrnRJjz3wXBoRgixCa6xjnB7YaB1pPB263", 5)),
        ("ETH", TokenInfo::new("7vfCXTUXx5WJV5JADk17DUJ4ksgau7utNKj4b963voxs", 8)),
        ("BTC", TokenInfo::new("3NZ9JMVBmGAqocybic2c7LQCJScmgsAZ6vQqTDzcqmJh", 8)),
    ]
    .into_iter()
    .map(|(symbol, info)| (symbol.to_string(), info))
    .collect()
}

/// Client for Jupiter aggregator API
///
/// Prices are derived from a one-unit quote, so a single endpoint backs both
/// `price_for_pair` and `quote`.
#[derive(Clone)]
pub struct JupiterClient {
    client: Client,
    base_url: String,
    tokens: HashMap<String, TokenInfo>,
    rate_limiter: Arc<JupiterRateLimiter>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct QuoteResponse {
    in_amount: String,
    out_amount: String,
    price_impact_pct: String,
    #[serde(default)]
    slippage_bps: Option<u16>,
}

impl JupiterClient {
    pub fn new() -> Self {
        Self::with_base_url(JUPITER_QUOTE_API)
    }

    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        let quota = Quota::per_minute(NonZeroU32::new(RATE_LIMIT_RPM).unwrap_or(NonZeroU32::MIN));
        Self {
            client: Client::new(),
            base_url: base_url.into(),
            tokens: default_tokens(),
            rate_limiter: Arc::new(RateLimiter::direct(quota)),
        }
    }

    /// Register (or replace) a token symbol
    pub fn with_token(mut self, symbol: &str, mint: &str, decimals: u8) -> Self {
        self.tokens
            .insert(symbol.to_uppercase(), TokenInfo::new(mint, decimals));
        self
    }

    pub fn token(&self, symbol: &str) -> Result<&TokenInfo, FeedError> {
        self.tokens
            .get(&symbol.to_uppercase())
            .ok_or_else(|| FeedError::UnknownToken(symbol.to_string()))
    }

    async fn fetch_quote(
        &self,
        input: &TokenInfo,
        output: &TokenInfo,
        raw_amount: u64,
        slippage_bps: u16,
    ) -> Result<QuoteResponse, FeedError> {
        self.rate_limiter.until_ready().await;

        let url = format!(
            "{}/quote?inputMint={}&outputMint={}&amount={}&slippageBps={}",
            self.base_url, input.mint, output.mint, raw_amount, slippage_bps
        );
        tracing::debug!(url = %url, "Requesting Jupiter quote");

        let response = self.client.get(&url).send().await?;
        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(FeedError::Unavailable(format!(
                "Jupiter API error ({}): {}",
                status, error_text
            )));
        }

        response
            .json::<QuoteResponse>()
            .await
            .map_err(|e| FeedError::InvalidResponse(e.to_string()))
    }
}

impl Default for JupiterClient {
    fn default() -> Self {
        Self::new()
    }
}

fn parse_amount(field: &str, value: &str) -> Result<u64, FeedError> {
    value
        .parse()
        .map_err(|_| FeedError::InvalidResponse(format!("{} is not an integer: {}", field, value)))
}

#[async_trait]
impl PriceFeed for JupiterClient {
    async fn price_for_pair(&self, base: &str, quote: &str) -> Result<f64, FeedError> {
        let quote = self.quote(base, quote, 1.0, super::DEFAULT_SLIPPAGE_BPS).await?;
        Ok(quote.price)
    }

    async fn quote(
        &self,
        input: &str,
        output: &str,
        amount: f64,
        slippage_bps: u16,
    ) -> Result<Quote, FeedError> {
        let input_info = self.token(input)?;
        let output_info = self.token(output)?;

        let raw_amount = input_info.to_raw(amount);
        if raw_amount == 0 {
            return Err(FeedError::InvalidResponse(format!(
                "amount {} of {} rounds to zero",
                amount, input
            )));
        }

        let response = self
            .fetch_quote(input_info, output_info, raw_amount, slippage_bps)
            .await?;

        let in_amount = parse_amount("inAmount", &response.in_amount)?;
        let out_amount = parse_amount("outAmount", &response.out_amount)?;
        if in_amount == 0 {
            return Err(FeedError::InvalidResponse("inAmount is zero".into()));
        }
        let price_impact_pct: f64 = response.price_impact_pct.parse().unwrap_or(0.0);

        // Both amounts are raw units, so convert with each token's decimals
        // (SOL has 9, USDC has 6) before taking the ratio.
        let price = output_info.to_ui(out_amount) / input_info.to_ui(in_amount);

        tracing::debug!(
            input,
            output,
            in_amount,
            out_amount,
            price,
            "Jupiter quote received"
        );

        Ok(Quote {
            input_token: input.to_uppercase(),
            output_token: output.to_uppercase(),
            in_amount,
            out_amount,
            price,
            price_impact_pct,
            slippage_bps: response.slippage_bps.unwrap_or(slippage_bps),
        })
    }

    async fn token_list(&self) -> Result<Vec<String>, FeedError> {
        let mut symbols: Vec<String> = self.tokens.keys().cloned().collect();
        symbols.sort();
        Ok(symbols)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;

    const SOL_MINT: &str = "So11111111111111111111111111111111111111112";
    const USDC_MINT: &str = "EPjFWdd5AufqSSqeM2qN1xzybapC8G4wEGGkZwyTDt1v";

    fn quote_body(in_amount: &str, out_amount: &str) -> String {
        format!(
            r#"{{
                "inputMint": "{SOL_MINT}",
                "inAmount": "{in_amount}",
                "outputMint": "{USDC_MINT}",
                "outAmount": "{out_amount}",
                "otherAmountThreshold": "0",
                "swapMode": "ExactIn",
                "slippageBps": 50,
                "priceImpactPct": "0.1",
                "routePlan": [],
                "contextSlot": 12345678
            }}"#
        )
    }

    #[tokio::test]
    async fn test_quote_converts_decimals() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/quote")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("inputMint".into(), SOL_MINT.into()),
                Matcher::UrlEncoded("outputMint".into(), USDC_MINT.into()),
                Matcher::UrlEncoded("amount".into(), "2000000000".into()),
                Matcher::UrlEncoded("slippageBps".into(), "50".into()),
            ]))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(quote_body("2000000000", "306840000"))
            .create_async()
            .await;

        let client = JupiterClient::with_base_url(server.url());
        let quote = client.quote("SOL", "USDC", 2.0, 50).await.unwrap();

        mock.assert_async().await;
        assert_eq!(quote.in_amount, 2_000_000_000);
        assert_eq!(quote.out_amount, 306_840_000);
        assert!((quote.price - 153.42).abs() < 1e-9);
        assert!((quote.price_impact_pct - 0.1).abs() < 1e-12);
        assert_eq!(quote.input_token, "SOL");
    }

    #[tokio::test]
    async fn test_price_for_pair_uses_one_unit_quote() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/quote")
            .match_query(Matcher::UrlEncoded("amount".into(), "1000000000".into()))
            .with_status(200)
            .with_body(quote_body("1000000000", "150000000"))
            .create_async()
            .await;

        let client = JupiterClient::with_base_url(server.url());
        let price = client.price_for_pair("SOL", "USDC").await.unwrap();
        assert!((price - 150.0).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_server_error_is_unavailable() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/quote")
            .match_query(Matcher::Any)
            .with_status(503)
            .with_body("maintenance")
            .create_async()
            .await;

        let client = JupiterClient::with_base_url(server.url());
        let result = client.price_for_pair("SOL", "USDC").await;
        assert!(matches!(result, Err(FeedError::Unavailable(msg)) if msg.contains("503")));
    }

    #[tokio::test]
    async fn test_malformed_amount_is_invalid_response() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/quote")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(quote_body("1000000000", "lots"))
            .create_async()
            .await;

        let client = JupiterClient::with_base_url(server.url());
        let result = client.quote("SOL", "USDC", 1.0, 50).await;
        assert!(matches!(result, Err(FeedError::InvalidResponse(_))));
    }

    #[tokio::test]
    async fn test_unknown_token_fails_without_request() {
        let client = JupiterClient::with_base_url("http://127.0.0.1:9");
        let result = client.price_for_pair("DOGE", "USDC").await;
        assert!(matches!(result, Err(FeedError::UnknownToken(t)) if t == "DOGE"));
    }

    #[tokio::test]
    async fn test_token_list_includes_registered_tokens() {
        let client = JupiterClient::new().with_token("wif", "EKpQGSJtjMFqKZ9KQanSqYXRcF8fBopzLHYxdM65zcjm", 6);
        let tokens = client.token_list().await.unwrap();
        assert!(tokens.contains(&"SOL".to_string()));
        assert!(tokens.contains(&"USDC".to_string()));
        assert!(tokens.contains(&"WIF".to_string()));
    }
}
