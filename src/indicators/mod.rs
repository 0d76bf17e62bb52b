// Technical indicators used by indicator-driven signal evaluation

pub mod bands;
pub mod moving_average;
pub mod rsi;

pub use bands::{calculate_bollinger_bands, calculate_macd, BollingerBands};
pub use moving_average::{calculate_ema, calculate_sma, calculate_std_dev};
pub use rsi::calculate_rsi;
