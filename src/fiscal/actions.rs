//! Operator actions and the notifications they produce.

use serde::Serialize;

use super::audit::{AttachmentStore, AuditLog, ConfigStore};
use super::service::{FiscalizationService, SubmitOutcome};
use crate::core::{Document, FiscalStatus};
use crate::transport::Transport;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationLevel {
    Success,
    Info,
    Warning,
    Danger,
}

/// Message for the operator who triggered an action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    pub title: String,
    pub message: String,
    pub level: NotificationLevel,
}

impl Notification {
    fn new(level: NotificationLevel, title: &str, message: impl Into<String>) -> Self {
        Self {
            title: title.to_string(),
            message: message.into(),
            level,
        }
    }

    pub fn success(title: &str, message: impl Into<String>) -> Self {
        Self::new(NotificationLevel::Success, title, message)
    }

    pub fn info(title: &str, message: impl Into<String>) -> Self {
        Self::new(NotificationLevel::Info, title, message)
    }

    pub fn warning(title: &str, message: impl Into<String>) -> Self {
        Self::new(NotificationLevel::Warning, title, message)
    }

    pub fn danger(title: &str, message: impl Into<String>) -> Self {
        Self::new(NotificationLevel::Danger, title, message)
    }
}

impl<C, A, S, T> FiscalizationService<C, A, S, T>
where
    C: ConfigStore,
    A: AuditLog,
    S: AttachmentStore,
    T: Transport,
{
    /// Manual "Fiscalize" button.
    pub fn action_fiscalize(&self, document: &mut Document) -> Notification {
        if !document.is_customer_document() {
            return Notification::warning(
                "Invalid Document",
                "Only customer invoices and credit notes can be fiscalized",
            );
        }
        if matches!(
            document.fiscal.status(),
            FiscalStatus::Fiscalized | FiscalStatus::Sent
        ) {
            return Notification::warning(
                "Already Fiscalized",
                format!("{} has already been sent to ZIMRA", document.name),
            );
        }
        let outcome = self.submit(document);
        self.notify(document, outcome)
    }

    /// Manual "Retry" button on a failed document.
    pub fn action_retry(&self, document: &mut Document) -> Notification {
        if document.fiscal.status() != FiscalStatus::Failed {
            return Notification::warning(
                "Nothing To Retry",
                format!("{} is not in a failed state", document.name),
            );
        }
        let outcome = self.submit(document);
        self.notify(document, outcome)
    }

    /// Manual fiscal cancellation.
    pub fn action_cancel(&self, document: &mut Document) -> Notification {
        let number = document.fiscal.fiscal_number().map(str::to_string);
        if self.on_cancelled(document) {
            Notification::success(
                "Fiscal Record Cancelled",
                format!(
                    "Fiscal number {} of {} is cancelled",
                    number.unwrap_or_default(),
                    document.name
                ),
            )
        } else {
            Notification::warning(
                "Cannot Cancel",
                format!("{} is not fiscalized", document.name),
            )
        }
    }

    /// Manual retrieval of the fiscal PDF.
    pub fn action_fetch_pdf(&self, document: &mut Document) -> Notification {
        match self.fetch_pdf(document) {
            Ok(_) => Notification::success(
                "PDF Retrieved",
                format!("Fiscal PDF attached to {}", document.name),
            ),
            Err(err) => Notification::danger(
                "PDF Retrieval Failed",
                format!("Could not retrieve the fiscal PDF of {}: {err}", document.name),
            ),
        }
    }

    fn notify(&self, document: &Document, outcome: SubmitOutcome) -> Notification {
        match outcome {
            SubmitOutcome::Fiscalized { fiscal_number } => Notification::success(
                "Fiscalization Successful",
                format!(
                    "Invoice {} has been successfully fiscalized ({fiscal_number})",
                    document.name
                ),
            ),
            SubmitOutcome::Exempted => Notification::info(
                "Not Fiscalized",
                format!("{} is exempted from fiscalization", document.name),
            ),
            SubmitOutcome::Skipped { status } => Notification::warning(
                "Not Submitted",
                format!("{} cannot be submitted while {status}", document.name),
            ),
            SubmitOutcome::Failed(err) => Notification::danger(
                "Fiscalization Failed",
                format!("Failed to fiscalize invoice {}: {err}", document.name),
            ),
        }
    }
}
