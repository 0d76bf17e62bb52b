use std::collections::VecDeque;

use tokio::time::Instant;

use crate::config::SafetyThresholds;
use crate::errors::FeedError;
use crate::models::{MarketCondition, Pair, PriceSample};
use crate::risk::{CircuitBreaker, SafetyLog, TripOutcome};

pub const EXTREME_VOLATILITY_REASON: &str = "Extreme price volatility detected";
pub const FEED_FAILURE_REASON: &str = "Unable to fetch market data";
pub const VOLATILITY_WARNING: &str = "Market volatility detected, proceeding with caution";

/// Classify a price change percentage against the thresholds
///
/// - above 2x `max_price_change_percent`: Extreme
/// - above `max_price_change_percent`: Volatile
/// - otherwise: Normal
pub fn classify_change(change_pct: f64, thresholds: &SafetyThresholds) -> MarketCondition {
    let limit = thresholds.max_price_change_percent;
    if change_pct > limit * 2.0 {
        MarketCondition::Extreme
    } else if change_pct > limit {
        MarketCondition::Volatile
    } else {
        MarketCondition::Normal
    }
}

/// What one condition evaluation did
#[derive(Debug, Clone, PartialEq)]
pub struct ConditionUpdate {
    pub previous: MarketCondition,
    pub condition: MarketCondition,
    /// None on the first sample and on feed failures
    pub change_pct: Option<f64>,
    /// Set when the evaluation tried to trip the breaker
    pub trip: Option<TripOutcome>,
}

impl ConditionUpdate {
    pub fn changed(&self) -> bool {
        self.previous != self.condition
    }
}

/// Tracks consecutive price samples for one pair and classifies the market
pub struct MarketConditionMonitor {
    pair: Pair,
    thresholds: SafetyThresholds,
    condition: MarketCondition,
    previous: Option<PriceSample>,
    price_change_percent: f64,
    history: VecDeque<f64>,
    history_len: usize,
}

impl MarketConditionMonitor {
    pub fn new(pair: Pair, thresholds: SafetyThresholds, history_len: usize) -> Self {
        Self {
            pair,
            thresholds,
            condition: MarketCondition::Normal,
            previous: None,
            price_change_percent: 0.0,
            history: VecDeque::with_capacity(history_len),
            history_len,
        }
    }

    /// Apply one condition-evaluation tick
    ///
    /// On a feed failure the condition goes to Halted and the breaker trips; the
    /// previous sample is kept so the next successful tick compares against it.
    pub fn evaluate(
        &mut self,
        fetched: Result<f64, FeedError>,
        now: Instant,
        breaker: &mut CircuitBreaker,
        log: &mut SafetyLog,
    ) -> ConditionUpdate {
        let previous_condition = self.condition;

        let price = match fetched.and_then(validate_price) {
            Ok(price) => price,
            Err(e) => {
                tracing::error!(pair = %self.pair, error = %e, "Error checking market conditions");
                self.condition = MarketCondition::Halted;
                let trip = breaker.trip(FEED_FAILURE_REASON, now, log);
                return ConditionUpdate {
                    previous: previous_condition,
                    condition: self.condition,
                    change_pct: None,
                    trip: Some(trip),
                };
            }
        };

        let mut change_pct = None;
        let mut trip = None;

        if let Some(previous) = self.previous {
            let change = ((price - previous.price) / previous.price * 100.0).abs();
            self.price_change_percent = change;
            change_pct = Some(change);

            self.condition = classify_change(change, &self.thresholds);
            match self.condition {
                MarketCondition::Extreme => {
                    trip = Some(breaker.trip(EXTREME_VOLATILITY_REASON, now, log));
                }
                MarketCondition::Volatile => {
                    log.push(VOLATILITY_WARNING);
                    tracing::warn!(
                        pair = %self.pair,
                        change_pct = change,
                        "⚠️  Market volatility detected"
                    );
                }
                _ => {}
            }

            tracing::debug!(
                pair = %self.pair,
                price,
                change_pct = change,
                condition = %self.condition,
                "Market condition evaluated"
            );
        } else {
            tracing::debug!(pair = %self.pair, price, "First market sample recorded");
        }

        self.previous = Some(PriceSample::new(price, now));
        self.history.push_back(price);
        while self.history.len() > self.history_len {
            self.history.pop_front();
        }

        ConditionUpdate {
            previous: previous_condition,
            condition: self.condition,
            change_pct,
            trip,
        }
    }

    pub fn condition(&self) -> MarketCondition {
        self.condition
    }

    /// Last computed change between consecutive samples, 0 before the second sample
    pub fn price_change_percent(&self) -> f64 {
        self.price_change_percent
    }

    pub fn last_sample(&self) -> Option<PriceSample> {
        self.previous
    }

    /// Recent evaluated prices, oldest first
    pub fn price_history(&self) -> Vec<f64> {
        self.history.iter().copied().collect()
    }
}

fn validate_price(price: f64) -> Result<f64, FeedError> {
    if price.is_finite() && price > 0.0 {
        Ok(price)
    } else {
        Err(FeedError::InvalidResponse(format!(
            "price must be positive, got {}",
            price
        )))
    }
}
