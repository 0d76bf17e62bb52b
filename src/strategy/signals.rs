use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::IndicatorEvaluator;
use crate::models::{Signal, SignalAction, StrategyConfig, StrategyKind};

/// Buy probability and confidence range for one strategy kind
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SignalPolicy {
    pub buy_probability: f64,
    pub confidence_min: u8,
    pub confidence_width: u8,
    pub reason: &'static str,
}

impl SignalPolicy {
    pub fn for_kind(kind: StrategyKind) -> Self {
        match kind {
            StrategyKind::MeanReversion => Self {
                buy_probability: 0.5,
                confidence_min: 60,
                confidence_width: 30, // 60-89
                reason: "Price deviation from moving average",
            },
            StrategyKind::BreakoutMomentum => Self {
                buy_probability: 0.3,
                confidence_min: 70,
                confidence_width: 20, // 70-89
                reason: "Price breakout detected with volume confirmation",
            },
            StrategyKind::RangeScalping => Self {
                buy_probability: 0.6,
                confidence_min: 65,
                confidence_width: 25, // 65-89
                reason: "Price at support/resistance level",
            },
            StrategyKind::MultiIndicator => Self {
                buy_probability: 0.4,
                confidence_min: 75,
                confidence_width: 15, // 75-89
                reason: "Multiple indicators confirm trend direction",
            },
        }
    }

    pub fn confidence_max(&self) -> u8 {
        self.confidence_min + self.confidence_width - 1
    }
}

/// Generates exploratory trading signals for a strategy
///
/// The action and confidence come from the strategy kind's `SignalPolicy` and an
/// injected RNG; seed it for reproducible sequences. Indicator parameters are only
/// consulted by `generate_informed`, and only when an evaluator is installed.
pub struct SignalGenerator {
    rng: StdRng,
    evaluator: Option<Box<dyn IndicatorEvaluator>>,
}

impl SignalGenerator {
    pub fn new(rng: StdRng) -> Self {
        Self {
            rng,
            evaluator: None,
        }
    }

    pub fn seeded(seed: u64) -> Self {
        Self::new(StdRng::seed_from_u64(seed))
    }

    pub fn from_entropy() -> Self {
        Self::new(StdRng::from_entropy())
    }

    pub fn with_evaluator(mut self, evaluator: impl IndicatorEvaluator + 'static) -> Self {
        self.evaluator = Some(Box::new(evaluator));
        self
    }

    /// Generate a signal from the strategy kind's policy alone
    pub fn generate(&mut self, strategy: &StrategyConfig) -> Signal {
        let policy = SignalPolicy::for_kind(strategy.kind);

        let action = if self.rng.gen::<f64>() > 1.0 - policy.buy_probability {
            SignalAction::Buy
        } else {
            SignalAction::Sell
        };
        let spread = (self.rng.gen::<f64>() * policy.confidence_width as f64).floor() as u8;

        Signal {
            action,
            confidence: policy.confidence_min + spread,
            reason: policy.reason.to_string(),
        }
    }

    /// Generate a signal from the strategy's indicators over `prices`
    ///
    /// Every indicator with an opinion votes; the majority of buy vs sell wins and a
    /// tie holds. Confidence scales the share of agreeing votes into the kind's
    /// range. Falls back to `generate` without an evaluator or without votes.
    pub fn generate_informed(&mut self, strategy: &StrategyConfig, prices: &[f64]) -> Signal {
        let Some(evaluator) = self.evaluator.as_ref() else {
            return self.generate(strategy);
        };

        let votes: Vec<_> = strategy
            .indicators
            .iter()
            .filter_map(|indicator| {
                evaluator
                    .evaluate(indicator, prices)
                    .map(|vote| (indicator.kind, vote))
            })
            .collect();

        if votes.is_empty() {
            tracing::debug!(
                strategy = %strategy.kind,
                samples = prices.len(),
                "No indicator votes, falling back to policy signal"
            );
            return self.generate(strategy);
        }

        let count = |action| votes.iter().filter(|(_, v)| *v == action).count();
        let (buys, sells) = (count(SignalAction::Buy), count(SignalAction::Sell));

        let (action, agreeing) = if buys > sells {
            (SignalAction::Buy, buys)
        } else if sells > buys {
            (SignalAction::Sell, sells)
        } else {
            (SignalAction::Hold, 0)
        };

        let policy = SignalPolicy::for_kind(strategy.kind);
        let share = agreeing as f64 / votes.len() as f64;
        let confidence =
            policy.confidence_min + (share * (policy.confidence_width - 1) as f64).round() as u8;

        let voters: Vec<String> = votes
            .iter()
            .filter(|(_, vote)| *vote == action)
            .map(|(kind, _)| kind.to_string())
            .collect();
        let reason = if action == SignalAction::Hold {
            format!("Indicators disagree ({} buy, {} sell)", buys, sells)
        } else {
            format!(
                "{} ({}/{} indicators: {})",
                policy.reason,
                agreeing,
                votes.len(),
                voters.join(", ")
            )
        };

        Signal {
            action,
            confidence,
            reason,
        }
    }
}

impl Default for SignalGenerator {
    fn default() -> Self {
        Self::from_entropy()
    }
}
