// Domain errors - Error types for the domain layer

use std::fmt;

/// Domain-specific error types
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Input shape or value the accumulator cannot work with
    InvalidInput(String),
    /// A per-verse translation duration lookup failed or timed out
    LookupFailure(String),
    /// Translation durations are still being fetched
    DurationsLoading,
    /// Verse source could not be read
    SourceUnavailable(String),
    /// Configuration value out of range
    ConfigInvalid(String),
}

impl fmt::Display for DomainError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DomainError::InvalidInput(msg) => write!(f, "Invalid input: {}", msg),
            DomainError::LookupFailure(msg) => write!(f, "Duration lookup failed: {}", msg),
            DomainError::DurationsLoading => {
                write!(f, "Translation durations are still loading")
            }
            DomainError::SourceUnavailable(msg) => write!(f, "Verse source unavailable: {}", msg),
            DomainError::ConfigInvalid(msg) => write!(f, "Invalid configuration: {}", msg),
        }
    }
}

impl std::error::Error for DomainError {}
