use thiserror::Error;

/// Errors produced by the scheduler, the store and configuration loading.
#[derive(Debug, Error)]
pub enum Error {
    #[error("Invalid rating '{0}'. Use: again, hard, good, easy (or 0-3)")]
    InvalidRating(String),

    #[error("Review record violates its invariants: {0}")]
    InvariantViolation(#[from] Violation),

    #[error("Invalid scheduler configuration: {0}")]
    InvalidConfig(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("{0} not found")]
    NotFound(String),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Config parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// The specific invariant a review record broke.
///
/// These indicate corrupt upstream data. They are never produced by the
/// scheduler's own clamping.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Violation {
    #[error("ease factor {ease} is below the minimum {minimum}")]
    EaseBelowMinimum { ease: f64, minimum: f64 },

    #[error("interval {interval} is outside 0..={maximum} minutes")]
    IntervalOutOfRange { interval: i64, maximum: u32 },

    #[error("{field} is negative ({value})")]
    NegativeCounter { field: &'static str, value: i64 },

    #[error("unknown status '{0}'")]
    UnknownStatus(String),

    #[error("unparseable timestamp '{0}'")]
    BadTimestamp(String),
}

pub type Result<T> = std::result::Result<T, Error>;
