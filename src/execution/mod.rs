// Simulated trade execution and P&L tracking
pub mod executor;
pub mod pnl_tracker;

pub use executor::{ExecutionReport, TradeExecutor, EXECUTION_SIGNAL_CONFIDENCE};
pub use pnl_tracker::PnLTracker;
