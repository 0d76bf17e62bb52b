use thiserror::Error;

/// Failures reported by a price feed.
///
/// The monitor swallows these (they only surface as a `Halted` condition and a
/// safety warning); the executor turns them into a failed execution.
#[derive(Error, Debug)]
pub enum FeedError {
    #[error("market data unavailable: {0}")]
    Unavailable(String),

    #[error("unknown token: {0}")]
    UnknownToken(String),

    #[error("invalid feed response: {0}")]
    InvalidResponse(String),

    #[error(transparent)]
    Http(#[from] reqwest::Error),
}

/// Fatal construction and lifecycle errors for a trading session.
#[derive(Error, Debug)]
pub enum SafetyError {
    #[error("invalid pair format '{0}', expected BASE/QUOTE")]
    InvalidPair(String),

    #[error("token {token} is not supported by the price feed")]
    UnsupportedToken { token: String },

    #[error("configuration error: {0}")]
    Config(String),

    #[error("session for {pair} is already running")]
    AlreadyRunning { pair: String },
}
