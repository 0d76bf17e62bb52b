use super::{calculate_ema, calculate_sma, calculate_std_dev};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BollingerBands {
    pub lower: f64,
    pub middle: f64,
    pub upper: f64,
}

/// Bollinger Bands: SMA(period) +/- `std_devs` standard deviations
pub fn calculate_bollinger_bands(
    prices: &[f64],
    period: usize,
    std_devs: f64,
) -> Option<BollingerBands> {
    let middle = calculate_sma(prices, period)?;
    let spread = calculate_std_dev(prices, period)? * std_devs;

    Some(BollingerBands {
        lower: middle - spread,
        middle,
        upper: middle + spread,
    })
}

/// MACD line: EMA(fast) - EMA(slow)
pub fn calculate_macd(prices: &[f64], fast: usize, slow: usize) -> Option<f64> {
    if fast >= slow {
        return None;
    }
    Some(calculate_ema(prices, fast)? - calculate_ema(prices, slow)?)
}
