//! Fiscalization status and its transition table.
//!
//! ```text
//! Pending ──▶ Sent ──▶ Fiscalized ──▶ Cancelled
//!    │          │          │
//!    │          ▼          │
//!    ├──────▶ Failed ◀─┐   │
//!    │          │      │   │
//!    │          └──────┘   │   (configuration still missing)
//!    ▼                     │
//! Exempted                 │
//!
//! Sent / Fiscalized / Failed ──▶ Pending   (revert to draft, retry)
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;

/// Fiscalization progress of a document.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FiscalStatus {
    /// Not yet submitted.
    #[default]
    Pending,
    /// Submitted, awaiting interpretation of the response.
    Sent,
    /// Accepted by the authority; carries a fiscal number.
    Fiscalized,
    /// Last attempt failed; eligible for retry.
    Failed,
    /// Fiscalized document cancelled by the host.
    Cancelled,
    /// Not subject to fiscalization.
    Exempted,
}

impl FiscalStatus {
    /// Whether `self → next` is a legal transition.
    pub fn can_transition_to(&self, next: FiscalStatus) -> bool {
        use FiscalStatus::*;
        matches!(
            (self, next),
            (Pending, Sent)
                | (Pending, Exempted)
                | (Pending, Failed)
                | (Sent, Fiscalized)
                | (Sent, Failed)
                | (Sent, Pending)
                | (Fiscalized, Cancelled)
                | (Fiscalized, Pending)
                | (Failed, Pending)
                | (Failed, Failed)
        )
    }

    /// Statuses with no outgoing transition.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Cancelled | Self::Exempted)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Sent => "sent",
            Self::Fiscalized => "fiscalized",
            Self::Failed => "failed",
            Self::Cancelled => "cancelled",
            Self::Exempted => "exempted",
        }
    }
}

impl fmt::Display for FiscalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Rejected status change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("illegal fiscal status transition {from} -> {to}")]
pub struct TransitionError {
    pub from: FiscalStatus,
    pub to: FiscalStatus,
}
