//! Unified error type definition

use serde::Serialize;
use thiserror::Error;

// Re-export library error type
pub use dns_topology_provider::ProviderError;

/// Core layer error type
#[derive(Error, Debug, Clone, Serialize)]
#[serde(tag = "code", content = "details")]
pub enum CoreError {
    /// No hosted zone serves the record's parent domain
    #[error("Hosted zone not found: {0}")]
    ZoneNotFound(String),

    /// Record name has no parent domain to derive a zone from
    #[error("Invalid record name: {0}")]
    InvalidRecordName(String),

    /// Reading zones or the current record value failed
    #[error("Lookup failed for {record_name}: {source}")]
    Lookup {
        record_name: String,
        source: ProviderError,
    },

    /// The change batch was rejected
    #[error("Failed to submit change for {record_name}: {source}")]
    Submission {
        record_name: String,
        source: ProviderError,
    },

    /// Fetching the change status failed with a non-retryable error
    #[error("Failed to poll change {change_id}: {source}")]
    Polling {
        change_id: String,
        source: ProviderError,
    },

    /// The change did not reach INSYNC within the configured bounds
    #[error("Change {change_id} still pending after {polls} polls")]
    PollTimeout { change_id: String, polls: u32 },

    /// The caller cancelled the reconciliation
    #[error("Reconciliation cancelled")]
    Cancelled { change_id: Option<String> },

    /// The record was written but does not read back as requested
    #[error(
        "Verification failed: expected {expected:?}, found {}",
        .actual.as_deref().map_or_else(|| "no record".to_string(), |v| format!("{v:?}"))
    )]
    VerificationMismatch {
        expected: String,
        actual: Option<String>,
    },

    /// Provider error (converting from library)
    #[error("{0}")]
    Provider(#[from] ProviderError),
}

impl CoreError {
    /// Whether it is expected behavior (bad input, missing zone, ...), used for log classification.
    ///
    /// Level `warn` should be used when returning `true` and level `error` when returning `false`.
    /// **Update this method when adding variants.**
    #[must_use]
    pub fn is_expected(&self) -> bool {
        match self {
            Self::ZoneNotFound(_)
            | Self::InvalidRecordName(_)
            | Self::Cancelled { .. }
            | Self::VerificationMismatch { .. } => true,
            Self::Lookup { source, .. }
            | Self::Submission { source, .. }
            | Self::Polling { source, .. } => source.is_expected(),
            Self::Provider(e) => e.is_expected(),
            Self::PollTimeout { .. } => false,
        }
    }

    /// The change id, when the failure happened after the record was submitted.
    pub fn change_id(&self) -> Option<&str> {
        match self {
            Self::Polling { change_id, .. } | Self::PollTimeout { change_id, .. } => {
                Some(change_id)
            }
            Self::Cancelled { change_id } => change_id.as_deref(),
            _ => None,
        }
    }
}

/// Core layer Result type alias
pub type CoreResult<T> = std::result::Result<T, CoreError>;
