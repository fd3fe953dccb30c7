//! Reactions to document lifecycle events raised by the host.

use tracing::{info, warn};

use super::audit::{AttachmentStore, AuditLog, ConfigStore};
use super::service::{FiscalizationService, SubmitOutcome, should_fiscalize};
use crate::config::FiscalConfig;
use crate::core::{Document, FiscalStatus, PaymentState};
use crate::transport::Transport;

impl<C, A, S, T> FiscalizationService<C, A, S, T>
where
    C: ConfigStore,
    A: AuditLog,
    S: AttachmentStore,
    T: Transport,
{
    /// Document created. Assigns the initial status; submits at once when
    /// it was created posted and the profile has `auto_fiscalize`.
    pub fn on_created(&self, document: &mut Document) -> Option<SubmitOutcome> {
        document
            .fiscal
            .initialize(document.is_customer_document());
        if document.is_posted() && self.flag(document, |c| c.auto_fiscalize) {
            return self.auto_submit(document);
        }
        None
    }

    /// Document posted. Submits when `auto_fiscalize_invoices` is set.
    pub fn on_posted(&self, document: &mut Document) -> Option<SubmitOutcome> {
        if self.flag(document, |c| c.auto_fiscalize_invoices) {
            return self.auto_submit(document);
        }
        None
    }

    /// Payment state changed. Submits a newly paid document when
    /// `auto_fiscalize_on_payment` is set.
    pub fn on_payment_state_changed(&self, document: &mut Document) -> Option<SubmitOutcome> {
        if document.payment_state == PaymentState::Paid
            && self.flag(document, |c| c.auto_fiscalize_on_payment)
        {
            return self.auto_submit(document);
        }
        None
    }

    /// Document cancelled in the host. A fiscalized document becomes
    /// `Cancelled`; returns whether it changed.
    pub fn on_cancelled(&self, document: &mut Document) -> bool {
        if document.fiscal.status() != FiscalStatus::Fiscalized {
            return false;
        }
        match document.fiscal.mark_cancelled() {
            Ok(number) => {
                info!(
                    document = %document.name,
                    fiscal_number = number.as_deref().unwrap_or_default(),
                    "Fiscalized document cancelled"
                );
                true
            }
            Err(e) => {
                warn!(document = %document.name, error = %e, "Cannot cancel fiscal record");
                false
            }
        }
    }

    /// Document reset to draft. Drops every fiscal artifact of a fiscalized,
    /// sent or failed document and returns it to `Pending`.
    pub fn on_draft_reverted(&self, document: &mut Document) -> bool {
        if !matches!(
            document.fiscal.status(),
            FiscalStatus::Fiscalized | FiscalStatus::Sent | FiscalStatus::Failed
        ) {
            return false;
        }
        if let Some(attachment) = document.fiscal.pdf_attachment() {
            if let Err(e) = self.attachments().remove(attachment) {
                warn!(document = %document.name, attachment = %attachment, error = %e, "Failed to remove fiscal PDF");
            }
        }
        match document.fiscal.reset_to_draft() {
            Ok(()) => {
                info!(document = %document.name, "Fiscal data cleared on reset to draft");
                true
            }
            Err(e) => {
                warn!(document = %document.name, error = %e, "Cannot reset fiscal record");
                false
            }
        }
    }

    fn flag(&self, document: &Document, pick: impl Fn(&FiscalConfig) -> bool) -> bool {
        self.configs()
            .active_config(document.company_id)
            .is_some_and(|c| pick(&c))
    }

    fn auto_submit(&self, document: &mut Document) -> Option<SubmitOutcome> {
        if !should_fiscalize(document) || document.fiscal.status() != FiscalStatus::Pending {
            return None;
        }
        Some(self.submit(document))
    }
}
