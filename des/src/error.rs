use thiserror::Error;

/// Fatal error taxonomy for the scheduler core (spec §7).
///
/// `ResourceUnavailable` and `DutyUnfilled` are deliberately absent: they are
/// local, non-fatal outcomes of a single demand and never escape as errors —
/// they are folded into `Results` counters and timeline entries instead.
#[derive(Debug, Error)]
pub enum SimError {
    #[error("state snapshot is missing or contains zero units")]
    InvalidSnapshot,

    #[error("invalid scenario: {0}")]
    InvalidScenario(String),

    #[error("random source exhausted: {0}")]
    RandomnessExhausted(String),
}

pub type SimResult<T> = Result<T, SimError>;
