//! Reconciliation state machine and outcome

use std::fmt;

use serde::Serialize;

use dns_topology_provider::ChangeAction;

use crate::error::CoreError;

/// Stage of a single record reconciliation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ReconcileState {
    /// Locating the zone and the current value
    Deciding,
    /// Sending the change batch
    Submitting,
    /// Waiting for the change to propagate
    Polling,
    /// Reading the record back
    Verifying,
    Done,
    Failed,
}

impl ReconcileState {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Done | Self::Failed)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Deciding => "deciding",
            Self::Submitting => "submitting",
            Self::Polling => "polling",
            Self::Verifying => "verifying",
            Self::Done => "done",
            Self::Failed => "failed",
        }
    }
}

impl fmt::Display for ReconcileState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of reconciling one TXT record.
///
/// `change_id` is set whenever a change was accepted, even if polling or
/// verification failed afterwards, because the record was mutated.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Outcome {
    pub record_name: String,
    /// `None` when the run failed before deciding
    pub action: Option<ChangeAction>,
    pub change_id: Option<String>,
    /// The change is INSYNC and reads back as requested
    pub applied: bool,
    /// Unquoted value read back during verification
    pub final_value: Option<String>,
    /// Status polls performed
    pub polls: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<CoreError>,
}

impl Outcome {
    pub(crate) fn new(record_name: &str) -> Self {
        Self {
            record_name: record_name.to_string(),
            action: None,
            change_id: None,
            applied: false,
            final_value: None,
            polls: 0,
            error: None,
        }
    }

    #[must_use]
    pub fn is_success(&self) -> bool {
        self.applied && self.error.is_none()
    }

    /// Final state implied by the outcome.
    pub fn state(&self) -> ReconcileState {
        if self.is_success() {
            ReconcileState::Done
        } else {
            ReconcileState::Failed
        }
    }
}
