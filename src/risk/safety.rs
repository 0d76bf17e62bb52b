use crate::config::SafetyThresholds;

/// Check if trade size is within safe limits
///
/// Advisory: callers check this before `execute_trade` unless the session runs
/// with `ExecutionGate::Enforced`.
pub fn is_trade_size_safe(amount: f64, thresholds: &SafetyThresholds) -> bool {
    amount <= thresholds.max_trade_size_sol
}

/// Slippage between expected and realized price, in percent
pub fn slippage_percent(expected_price: f64, execution_price: f64) -> f64 {
    ((execution_price - expected_price) / expected_price * 100.0).abs()
}

/// Check if slippage is within safe limits
///
/// A non-positive expected price can't be compared against and is never safe.
pub fn is_slippage_safe(
    expected_price: f64,
    execution_price: f64,
    thresholds: &SafetyThresholds,
) -> bool {
    if expected_price <= 0.0 {
        return false;
    }
    slippage_percent(expected_price, execution_price) <= thresholds.max_slippage_percent
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trade_size_boundary() {
        let thresholds = SafetyThresholds::default();
        assert!(is_trade_size_safe(9.99, &thresholds));
        assert!(is_trade_size_safe(10.0, &thresholds));
        assert!(!is_trade_size_safe(10.01, &thresholds));
    }

    #[test]
    fn test_slippage_within_limit() {
        let thresholds = SafetyThresholds::default();
        // 1% either way
        assert!(is_slippage_safe(100.0, 101.0, &thresholds));
        assert!(is_slippage_safe(100.0, 99.0, &thresholds));
        assert!(is_slippage_safe(200.0, 202.8, &thresholds));
    }

    #[test]
    fn test_slippage_beyond_limit() {
        let thresholds = SafetyThresholds::default();
        assert!(!is_slippage_safe(100.0, 102.0, &thresholds));
        assert!(!is_slippage_safe(100.0, 97.0, &thresholds));
    }

    #[test]
    fn test_slippage_with_zero_expected_price() {
        let thresholds = SafetyThresholds::default();
        assert!(!is_slippage_safe(0.0, 1.0, &thresholds));
    }

    #[test]
    fn test_custom_thresholds() {
        let thresholds = SafetyThresholds {
            max_trade_size_sol: 2.0,
            max_slippage_percent: 0.5,
            ..Default::default()
        };
        assert!(!is_trade_size_safe(2.5, &thresholds));
        assert!(!is_slippage_safe(100.0, 101.0, &thresholds));
    }
}
