/// Relative Strength Index over the last `period` price changes
///
/// Values above 70 are conventionally overbought, below 30 oversold. A window
/// with no losses returns 100.
pub fn calculate_rsi(prices: &[f64], period: usize) -> Option<f64> {
    let window = period.checked_add(1)?;
    if period == 0 || prices.len() < window {
        return None;
    }

    let recent = &prices[prices.len() - window..];
    let (gains, losses) = recent
        .windows(2)
        .map(|w| w[1] - w[0])
        .fold((0.0, 0.0), |(gains, losses), change| {
            if change > 0.0 {
                (gains + change, losses)
            } else {
                (gains, losses - change)
            }
        });

    let avg_gain = gains / period as f64;
    let avg_loss = losses / period as f64;

    if avg_loss == 0.0 {
        return Some(100.0);
    }

    let rs = avg_gain / avg_loss;
    Some(100.0 - (100.0 / (1.0 + rs)))
}
