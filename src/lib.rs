// Core modules
pub mod api;
pub mod config;
pub mod errors;
pub mod execution;
pub mod indicators;
pub mod models;
pub mod monitor;
pub mod risk;
pub mod session;
pub mod strategy;

// Re-export commonly used types
pub use api::{JupiterClient, PriceFeed, StaticPriceFeed};
pub use config::{ExecutionGate, SafetyThresholds, SessionConfig};
pub use errors::{FeedError, SafetyError};
pub use models::*;
pub use session::{Session, SessionEvent};
pub use strategy::SignalGenerator;

// Error handling
pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;
