// Signal generation module
pub mod evaluator;
pub mod presets;
pub mod signals;

pub use evaluator::{IndicatorEvaluator, TechnicalEvaluator};
pub use presets::{default_indicators, preset};
pub use signals::{SignalGenerator, SignalPolicy};
