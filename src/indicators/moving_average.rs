/// Simple Moving Average over the last `period` prices
pub fn calculate_sma(prices: &[f64], period: usize) -> Option<f64> {
    if period == 0 || prices.len() < period {
        return None;
    }

    let window = &prices[prices.len() - period..];
    Some(window.iter().sum::<f64>() / period as f64)
}

/// Exponential Moving Average, seeded with the SMA of the first `period` prices
pub fn calculate_ema(prices: &[f64], period: usize) -> Option<f64> {
    let seed = calculate_sma(prices.get(..period)?, period)?;
    let multiplier = 2.0 / (period as f64 + 1.0);

    Some(
        prices[period..]
            .iter()
            .fold(seed, |ema, price| (price - ema) * multiplier + ema),
    )
}

/// Population standard deviation of the last `period` prices
pub fn calculate_std_dev(prices: &[f64], period: usize) -> Option<f64> {
    let mean = calculate_sma(prices, period)?;
    let window = &prices[prices.len() - period..];
    let variance = window.iter().map(|p| (p - mean).powi(2)).sum::<f64>() / period as f64;
    Some(variance.sqrt())
}
