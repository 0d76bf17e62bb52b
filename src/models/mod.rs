use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::time::Instant;
use uuid::Uuid;

use crate::errors::SafetyError;

/// A base/quote token combination such as `SOL/USDC`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Pair {
    pub base: String,
    pub quote: String,
}

impl Pair {
    pub fn new(base: impl Into<String>, quote: impl Into<String>) -> Self {
        Self {
            base: base.into(),
            quote: quote.into(),
        }
    }
}

impl FromStr for Pair {
    type Err = SafetyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.split('/');
        match (parts.next(), parts.next(), parts.next()) {
            (Some(base), Some(quote), None) if !base.trim().is_empty() && !quote.trim().is_empty() => {
                Ok(Pair::new(base.trim(), quote.trim()))
            }
            _ => Err(SafetyError::InvalidPair(s.to_string())),
        }
    }
}

impl TryFrom<String> for Pair {
    type Error = SafetyError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Pair> for String {
    fn from(pair: Pair) -> Self {
        pair.to_string()
    }
}

impl fmt::Display for Pair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.base, self.quote)
    }
}

/// Simple price snapshot - just price and monotonic timestamp
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PriceSample {
    pub price: f64,
    pub timestamp: Instant,
}

impl PriceSample {
    pub fn new(price: f64, timestamp: Instant) -> Self {
        Self { price, timestamp }
    }
}

/// Market condition for a monitored pair
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MarketCondition {
    #[default]
    Normal,
    Volatile,
    Extreme,
    Halted,
}

impl fmt::Display for MarketCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            MarketCondition::Normal => "normal",
            MarketCondition::Volatile => "volatile",
            MarketCondition::Extreme => "extreme",
            MarketCondition::Halted => "halted",
        };
        f.write_str(name)
    }
}

/// Entry in the session's safety log
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SafetyWarning {
    pub message: String,
    pub timestamp: DateTime<Utc>,
}

impl SafetyWarning {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            timestamp: Utc::now(),
        }
    }
}

/// Trading signal action
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SignalAction {
    Buy,
    Sell,
    Hold,
}

impl fmt::Display for SignalAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SignalAction::Buy => "buy",
            SignalAction::Sell => "sell",
            SignalAction::Hold => "hold",
        };
        f.write_str(name)
    }
}

/// Trading signal with a 0-100 confidence score and a rationale
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Signal {
    pub action: SignalAction,
    pub confidence: u8,
    pub reason: String,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TradeSide {
    Buy,
    Sell,
}

impl From<TradeSide> for SignalAction {
    fn from(side: TradeSide) -> Self {
        match side {
            TradeSide::Buy => SignalAction::Buy,
            TradeSide::Sell => SignalAction::Sell,
        }
    }
}

impl TryFrom<SignalAction> for TradeSide {
    type Error = SignalAction;

    fn try_from(action: SignalAction) -> Result<Self, Self::Error> {
        match action {
            SignalAction::Buy => Ok(TradeSide::Buy),
            SignalAction::Sell => Ok(TradeSide::Sell),
            SignalAction::Hold => Err(action),
        }
    }
}

impl fmt::Display for TradeSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        SignalAction::from(*self).fmt(f)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TradeStatus {
    Completed,
    Failed,
}

/// Simulated trade execution result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trade {
    pub id: Uuid,
    pub pair: Pair,
    pub side: TradeSide,
    pub amount: f64,
    pub price: Option<f64>, // Last sampled price, None before the first sample
    pub timestamp: DateTime<Utc>,
    pub status: TradeStatus,
    pub pnl: f64,
}

/// Strategy families supported by the signal generator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StrategyKind {
    #[serde(rename = "Mean Reversion")]
    MeanReversion,
    #[serde(rename = "Breakout Momentum")]
    BreakoutMomentum,
    #[serde(rename = "Range Scalping")]
    RangeScalping,
    #[serde(rename = "Multi-indicator")]
    MultiIndicator,
}

impl StrategyKind {
    pub const ALL: [StrategyKind; 4] = [
        StrategyKind::MeanReversion,
        StrategyKind::BreakoutMomentum,
        StrategyKind::RangeScalping,
        StrategyKind::MultiIndicator,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            StrategyKind::MeanReversion => "Mean Reversion",
            StrategyKind::BreakoutMomentum => "Breakout Momentum",
            StrategyKind::RangeScalping => "Range Scalping",
            StrategyKind::MultiIndicator => "Multi-indicator",
        }
    }
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IndicatorKind {
    #[serde(rename = "SMA")]
    Sma,
    #[serde(rename = "EMA")]
    Ema,
    #[serde(rename = "RSI")]
    Rsi,
    #[serde(rename = "MACD")]
    Macd,
    #[serde(rename = "Bollinger Bands")]
    BollingerBands,
}

impl fmt::Display for IndicatorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            IndicatorKind::Sma => "SMA",
            IndicatorKind::Ema => "EMA",
            IndicatorKind::Rsi => "RSI",
            IndicatorKind::Macd => "MACD",
            IndicatorKind::BollingerBands => "Bollinger Bands",
        };
        f.write_str(name)
    }
}

/// One indicator of a strategy with its numeric parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndicatorConfig {
    #[serde(rename = "type")]
    pub kind: IndicatorKind,
    #[serde(default)]
    pub parameters: HashMap<String, f64>,
}

impl IndicatorConfig {
    pub fn new(kind: IndicatorKind) -> Self {
        Self {
            kind,
            parameters: HashMap::new(),
        }
    }

    pub fn with_param(mut self, name: &str, value: f64) -> Self {
        self.parameters.insert(name.to_string(), value);
        self
    }

    /// Parameter value, or `default` when the strategy doesn't set it
    pub fn param(&self, name: &str, default: f64) -> f64 {
        self.parameters.get(name).copied().unwrap_or(default)
    }
}

/// Strategy supplied by the caller; read-only to the engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrategyConfig {
    #[serde(rename = "type")]
    pub kind: StrategyKind,
    #[serde(default)]
    pub indicators: Vec<IndicatorConfig>,
    pub amount: f64,
    pub pair: Pair,
    pub action: TradeSide,
}

impl StrategyConfig {
    pub fn new(kind: StrategyKind, pair: Pair, amount: f64) -> Self {
        Self {
            kind,
            indicators: Vec::new(),
            amount,
            pair,
            action: TradeSide::Buy,
        }
    }

    pub fn with_indicator(mut self, indicator: IndicatorConfig) -> Self {
        self.indicators.push(indicator);
        self
    }
}

/// Swap quote returned by a price feed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quote {
    pub input_token: String,
    pub output_token: String,
    pub in_amount: u64,
    pub out_amount: u64,
    pub price: f64, // Output per unit of input, decimal-adjusted
    pub price_impact_pct: f64,
    pub slippage_bps: u16,
}
