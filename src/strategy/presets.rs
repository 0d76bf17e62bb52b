use crate::models::{IndicatorConfig, IndicatorKind, Pair, StrategyConfig, StrategyKind};

/// Default indicator set for a strategy kind
pub fn default_indicators(kind: StrategyKind) -> Vec<IndicatorConfig> {
    let sma = IndicatorConfig::new(IndicatorKind::Sma).with_param("period", 20.0);
    let ema = IndicatorConfig::new(IndicatorKind::Ema).with_param("period", 12.0);
    let rsi = IndicatorConfig::new(IndicatorKind::Rsi)
        .with_param("period", 14.0)
        .with_param("oversold", 30.0)
        .with_param("overbought", 70.0);
    let macd = IndicatorConfig::new(IndicatorKind::Macd)
        .with_param("fast", 12.0)
        .with_param("slow", 26.0);
    let bands = IndicatorConfig::new(IndicatorKind::BollingerBands)
        .with_param("period", 20.0)
        .with_param("std_dev", 2.0);

    match kind {
        StrategyKind::MeanReversion => vec![sma, bands, rsi],
        StrategyKind::BreakoutMomentum => vec![ema, macd],
        StrategyKind::RangeScalping => vec![rsi, bands],
        StrategyKind::MultiIndicator => vec![sma, ema, rsi, macd],
    }
}

/// Strategy of `kind` on `pair` with its default indicators
pub fn preset(kind: StrategyKind, pair: Pair, amount: f64) -> StrategyConfig {
    default_indicators(kind)
        .into_iter()
        .fold(StrategyConfig::new(kind, pair, amount), |strategy, indicator| {
            strategy.with_indicator(indicator)
        })
}
