use crate::indicators::{
    calculate_bollinger_bands, calculate_ema, calculate_macd, calculate_rsi, calculate_sma,
};
use crate::models::{IndicatorConfig, IndicatorKind, SignalAction};

/// Turns one configured indicator plus recent prices into a vote
///
/// Returning `None` means "no opinion" (usually not enough data); `Hold` is a
/// neutral vote that still counts towards the total.
pub trait IndicatorEvaluator: Send + Sync {
    fn evaluate(&self, indicator: &IndicatorConfig, prices: &[f64]) -> Option<SignalAction>;
}

/// Bundled evaluator for SMA, EMA, RSI, MACD and Bollinger Bands
///
/// Parameters (with defaults):
/// - SMA / EMA: `period` (20). Price above the average votes buy, below votes sell.
/// - RSI: `period` (14), `oversold` (30), `overbought` (70).
/// - MACD: `fast` (12), `slow` (26). Sign of EMA(fast) - EMA(slow).
/// - Bollinger Bands: `period` (20), `std_dev` (2). Below lower band buys, above upper sells.
#[derive(Debug, Clone, Copy, Default)]
pub struct TechnicalEvaluator;

impl IndicatorEvaluator for TechnicalEvaluator {
    fn evaluate(&self, indicator: &IndicatorConfig, prices: &[f64]) -> Option<SignalAction> {
        let price = *prices.last()?;

        let vote = match indicator.kind {
            IndicatorKind::Sma => {
                let average = calculate_sma(prices, period(indicator, "period", 20.0, prices)?)?;
                compare(price, average)
            }
            IndicatorKind::Ema => {
                let average = calculate_ema(prices, period(indicator, "period", 20.0, prices)?)?;
                compare(price, average)
            }
            IndicatorKind::Rsi => {
                let rsi = calculate_rsi(prices, period(indicator, "period", 14.0, prices)?)?;
                if rsi < indicator.param("oversold", 30.0) {
                    SignalAction::Buy
                } else if rsi > indicator.param("overbought", 70.0) {
                    SignalAction::Sell
                } else {
                    SignalAction::Hold
                }
            }
            IndicatorKind::Macd => {
                let macd = calculate_macd(
                    prices,
                    period(indicator, "fast", 12.0, prices)?,
                    period(indicator, "slow", 26.0, prices)?,
                )?;
                compare(macd, 0.0)
            }
            IndicatorKind::BollingerBands => {
                let bands = calculate_bollinger_bands(
                    prices,
                    period(indicator, "period", 20.0, prices)?,
                    indicator.param("std_dev", 2.0),
                )?;
                if price < bands.lower {
                    SignalAction::Buy
                } else if price > bands.upper {
                    SignalAction::Sell
                } else {
                    SignalAction::Hold
                }
            }
        };

        Some(vote)
    }
}

/// Window length from a parameter; None if it can't fit in `prices`
fn period(indicator: &IndicatorConfig, name: &str, default: f64, prices: &[f64]) -> Option<usize> {
    let value = indicator.param(name, default);
    if !value.is_finite() || value > prices.len() as f64 {
        return None;
    }
    Some(value.max(1.0) as usize)
}

fn compare(value: f64, reference: f64) -> SignalAction {
    if value > reference {
        SignalAction::Buy
    } else if value < reference {
        SignalAction::Sell
    } else {
        SignalAction::Hold
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rising(n: usize) -> Vec<f64> {
        (0..n).map(|i| 100.0 + i as f64).collect()
    }

    fn falling(n: usize) -> Vec<f64> {
        (0..n).map(|i| 200.0 - i as f64).collect()
    }

    #[test]
    fn test_moving_averages_follow_trend() {
        let evaluator = TechnicalEvaluator;
        let sma = IndicatorConfig::new(IndicatorKind::Sma).with_param("period", 5.0);
        let ema = IndicatorConfig::new(IndicatorKind::Ema).with_param("period", 5.0);

        assert_eq!(evaluator.evaluate(&sma, &rising(10)), Some(SignalAction::Buy));
        assert_eq!(evaluator.evaluate(&ema, &falling(10)), Some(SignalAction::Sell));
    }

    #[test]
    fn test_rsi_thresholds() {
        let evaluator = TechnicalEvaluator;
        let rsi = IndicatorConfig::new(IndicatorKind::Rsi).with_param("period", 5.0);

        // All losses -> RSI 0 -> oversold
        assert_eq!(evaluator.evaluate(&rsi, &falling(6)), Some(SignalAction::Buy));
        // All gains -> RSI 100 -> overbought
        assert_eq!(evaluator.evaluate(&rsi, &rising(6)), Some(SignalAction::Sell));
    }

    #[test]
    fn test_bollinger_breakouts() {
        let evaluator = TechnicalEvaluator;
        let bands = IndicatorConfig::new(IndicatorKind::BollingerBands)
            .with_param("period", 5.0)
            .with_param("std_dev", 1.0);

        let mut prices = vec![100.0, 101.0, 100.0, 101.0, 100.0];
        assert_eq!(evaluator.evaluate(&bands, &prices), Some(SignalAction::Hold));

        prices.push(90.0);
        assert_eq!(evaluator.evaluate(&bands, &prices), Some(SignalAction::Buy));
    }

    #[test]
    fn test_macd_defaults() {
        let evaluator = TechnicalEvaluator;
        let macd = IndicatorConfig::new(IndicatorKind::Macd);

        assert_eq!(evaluator.evaluate(&macd, &rising(40)), Some(SignalAction::Buy));
        assert_eq!(evaluator.evaluate(&macd, &rising(10)), None);
    }

    #[test]
    fn test_out_of_range_period_has_no_opinion() {
        let prices = [1.0, 2.0, 3.0];
        for value in [1e30, f64::INFINITY, f64::NAN] {
            for kind in [IndicatorKind::Sma, IndicatorKind::Rsi, IndicatorKind::BollingerBands] {
                let indicator = IndicatorConfig::new(kind).with_param("period", value);
                assert_eq!(TechnicalEvaluator.evaluate(&indicator, &prices), None);
            }
        }
        let macd = IndicatorConfig::new(IndicatorKind::Macd).with_param("slow", 1e30);
        assert_eq!(TechnicalEvaluator.evaluate(&macd, &prices), None);
    }

    #[test]
    fn test_no_prices_no_vote() {
        let sma = IndicatorConfig::new(IndicatorKind::Sma);
        assert_eq!(TechnicalEvaluator.evaluate(&sma, &[]), None);
    }
}
