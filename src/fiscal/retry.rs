//! Periodic sweep over failed documents.

use tracing::{info, warn};

use super::audit::{AttachmentStore, AuditLog, ConfigStore};
use super::service::{FiscalizationService, SubmitOutcome};
use crate::core::{Document, FiscalStatus};
use crate::transport::Transport;

/// Attempts after which a failed document is left to an operator.
pub const MAX_AUTO_RETRIES: u32 = 3;

/// Whether the sweep picks up `document`.
pub fn is_retry_candidate(document: &Document) -> bool {
    document.fiscal.status() == FiscalStatus::Failed
        && document.fiscal.retry_count() < MAX_AUTO_RETRIES
}

/// Counts from one sweep.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RetrySummary {
    pub selected: usize,
    pub fiscalized: usize,
    pub failed: usize,
}

impl<C, A, S, T> FiscalizationService<C, A, S, T>
where
    C: ConfigStore,
    A: AuditLog,
    S: AttachmentStore,
    T: Transport,
{
    /// Resubmit every failed document below [`MAX_AUTO_RETRIES`]. Failures
    /// are logged and left on the documents.
    pub fn retry_failed(&self, documents: &mut [Document]) -> RetrySummary {
        let mut summary = RetrySummary::default();

        for document in documents.iter_mut().filter(|d| is_retry_candidate(d)) {
            summary.selected += 1;
            match self.submit(document) {
                SubmitOutcome::Fiscalized { .. } => summary.fiscalized += 1,
                SubmitOutcome::Failed(err) => {
                    summary.failed += 1;
                    warn!(
                        document = %document.name,
                        attempt = document.fiscal.retry_count(),
                        error = %err,
                        "Automatic retry failed"
                    );
                }
                SubmitOutcome::Exempted | SubmitOutcome::Skipped { .. } => {}
            }
        }

        info!(
            selected = summary.selected,
            fiscalized = summary.fiscalized,
            failed = summary.failed,
            "Retry sweep finished"
        );
        summary
    }
}
