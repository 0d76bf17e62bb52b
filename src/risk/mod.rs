// Risk management module
pub mod circuit_breaker;
pub mod safety;
pub mod safety_log;

pub use circuit_breaker::{CircuitBreaker, CircuitBreakerState, TripOutcome};
pub use safety::{is_slippage_safe, is_trade_size_safe, slippage_percent};
pub use safety_log::SafetyLog;
