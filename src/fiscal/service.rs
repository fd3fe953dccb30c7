//! Submission of a document to the fiscal authority.

use chrono::Utc;
use tracing::{debug, error, info, warn};

use super::audit::{AttachmentStore, AuditId, AuditLog, AuditUpdate, ConfigStore, NewAuditEntry};
use super::pdf::{decode_pdf, pdf_filename};
use crate::config::{FiscalConfig, SchemaVersion};
use crate::core::{Document, FiscalError, FiscalReceipt, FiscalStatus};
use crate::payload::{self, Payload};
use crate::transport::{
    Acceptance, Endpoint, Transport, parse_legacy_response, parse_v2_response,
};

/// Whether `document` is due for fiscalization: a posted customer invoice
/// or credit note that is neither fiscalized nor exempted yet.
pub fn should_fiscalize(document: &Document) -> bool {
    document.is_customer_document()
        && document.is_posted()
        && !matches!(
            document.fiscal.status(),
            FiscalStatus::Fiscalized | FiscalStatus::Exempted
        )
}

/// [`should_fiscalize`] narrowed to what the profile's wire generation can
/// carry: legacy profiles exempt credit notes.
pub fn should_fiscalize_with(document: &Document, config: &FiscalConfig) -> bool {
    should_fiscalize(document)
        && (!document.is_credit_note() || config.schema.supports_credit_notes())
}

/// Result of [`FiscalizationService::submit`].
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    Fiscalized { fiscal_number: String },
    /// Not eligible; the document is now exempted.
    Exempted,
    /// Left untouched because its status does not allow a submission.
    Skipped { status: FiscalStatus },
    Failed(FiscalError),
}

impl SubmitOutcome {
    /// Fiscalized or exempted.
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Fiscalized { .. } | Self::Exempted)
    }

    pub fn error(&self) -> Option<&FiscalError> {
        match self {
            Self::Failed(err) => Some(err),
            _ => None,
        }
    }
}

/// Fiscalization engine over host-provided collaborators.
///
/// ```
/// use zimra_fiscal::fiscal::*;
/// use zimra_fiscal::transport::{Transport, TransportError, TransportResponse};
/// use zimra_fiscal::config::{FiscalConfig, FiscalConfigBuilder};
/// use zimra_fiscal::core::*;
/// use rust_decimal_macros::dec;
///
/// struct Accepting;
/// impl Transport for Accepting {
///     fn post(&self, _: &FiscalConfig, _: &str, _: &str) -> Result<TransportResponse, TransportError> {
///         Ok(TransportResponse::new(200, r#"[{"FiscalDay":"3","InvoiceNumber":"INV-9","Error":""}]"#))
///     }
/// }
///
/// let configs = MemoryConfigStore::new()
///     .with(FiscalConfigBuilder::new(1, "https://fdms.example.co.zw/api", "key").build().unwrap());
/// let service = FiscalizationService::new(configs, MemoryAuditLog::new(), MemoryAttachments::new(), Accepting);
///
/// let mut invoice = DocumentBuilder::new(9, "INV/9", DocumentKind::CustomerInvoice)
///     .posted()
///     .add_line(LineItemBuilder::new("Support", dec!(1), dec!(50)).build())
///     .build()
///     .unwrap();
///
/// let outcome = service.submit(&mut invoice);
/// assert_eq!(outcome, SubmitOutcome::Fiscalized { fiscal_number: "INV-9/3".into() });
/// assert_eq!(service.audit().len(), 1);
/// ```
#[derive(Debug)]
pub struct FiscalizationService<C, A, S, T> {
    configs: C,
    audit: A,
    attachments: S,
    transport: T,
}

impl<C, A, S, T> FiscalizationService<C, A, S, T>
where
    C: ConfigStore,
    A: AuditLog,
    S: AttachmentStore,
    T: Transport,
{
    pub fn new(configs: C, audit: A, attachments: S, transport: T) -> Self {
        Self {
            configs,
            audit,
            attachments,
            transport,
        }
    }

    pub fn configs(&self) -> &C {
        &self.configs
    }

    pub fn audit(&self) -> &A {
        &self.audit
    }

    pub fn attachments(&self) -> &S {
        &self.attachments
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub(crate) fn config_for(&self, document: &Document) -> Result<FiscalConfig, FiscalError> {
        self.configs
            .active_config(document.company_id)
            .ok_or(FiscalError::ConfigurationMissing {
                company_id: document.company_id,
            })
    }

    /// Submit `document` and record the outcome on it and in the audit log.
    ///
    /// Never returns an error: failures end up in [`SubmitOutcome::Failed`],
    /// on `document.fiscal` and, once a request was built, in the audit row
    /// of this attempt.
    pub fn submit(&self, document: &mut Document) -> SubmitOutcome {
        let config = match self.config_for(document) {
            Ok(config) => config,
            Err(err) => {
                error!(document = %document.name, company_id = document.company_id, "No active fiscal configuration");
                fail_document(document, &err);
                return SubmitOutcome::Failed(err);
            }
        };

        let status = document.fiscal.status();
        if !should_fiscalize_with(document, &config) {
            return self.exempt(document, status);
        }
        match status {
            FiscalStatus::Pending => {}
            FiscalStatus::Failed => {
                if let Err(e) = document.fiscal.reset_for_retry() {
                    warn!(document = %document.name, error = %e, "Cannot reset failed document");
                    return SubmitOutcome::Skipped { status };
                }
            }
            other => {
                debug!(document = %document.name, status = %other, "Submission skipped");
                return SubmitOutcome::Skipped { status: other };
            }
        }

        let payload = match payload::build(document, &config) {
            Ok(payload) => payload,
            Err(e) => return self.fail_unsent(document, e.into()),
        };
        let request = match payload.to_pretty_json() {
            Ok(request) => request,
            Err(e) => return self.fail_unsent(document, e.into()),
        };
        let audit_id = self.open_audit(document, request);

        match self.send(document, &config, &payload, audit_id) {
            Ok(acceptance) => self.accept(document, audit_id, acceptance),
            Err(err) => self.fail(document, audit_id, err),
        }
    }

    fn exempt(&self, document: &mut Document, status: FiscalStatus) -> SubmitOutcome {
        let result = match status {
            FiscalStatus::Exempted => return SubmitOutcome::Exempted,
            FiscalStatus::Pending => document.fiscal.mark_exempted(),
            FiscalStatus::Failed => document
                .fiscal
                .reset_for_retry()
                .and_then(|()| document.fiscal.mark_exempted()),
            other => {
                debug!(document = %document.name, status = %other, "Submission skipped");
                return SubmitOutcome::Skipped { status: other };
            }
        };
        match result {
            Ok(()) => {
                info!(document = %document.name, "Document exempted from fiscalization");
                SubmitOutcome::Exempted
            }
            Err(e) => {
                warn!(document = %document.name, error = %e, "Cannot exempt document");
                SubmitOutcome::Skipped { status }
            }
        }
    }

    fn open_audit(&self, document: &Document, request: String) -> Option<AuditId> {
        match self
            .audit
            .create(NewAuditEntry::for_document(document, request))
        {
            Ok(id) => Some(id),
            Err(e) => {
                warn!(document = %document.name, error = %e, "Failed to create audit entry");
                None
            }
        }
    }

    fn update_audit(&self, document: &Document, audit_id: Option<AuditId>, update: AuditUpdate) {
        let Some(id) = audit_id else { return };
        if let Err(e) = self.audit.update(id, update) {
            warn!(document = %document.name, audit_id = id.0, error = %e, "Failed to update audit entry");
        }
    }

    fn send(
        &self,
        document: &mut Document,
        config: &FiscalConfig,
        payload: &Payload,
        audit_id: Option<AuditId>,
    ) -> Result<Acceptance, FiscalError> {
        let sent_at = Utc::now();
        document
            .fiscal
            .mark_sent(sent_at)
            .map_err(|e| FiscalError::Unexpected(e.to_string()))?;
        self.update_audit(document, audit_id, AuditUpdate::sent(sent_at));

        let endpoint = Endpoint::for_submission(payload, &document.name, config);
        let body = payload.to_compact_json()?;
        info!(
            document = %document.name,
            endpoint = endpoint.path(),
            schema = config.schema.as_str(),
            attempt = document.fiscal.retry_count(),
            "Sending document to fiscal API"
        );

        let response = self.transport.post(config, endpoint.path(), &body)?;
        debug!(document = %document.name, status = response.status, "Fiscal API responded");

        document.fiscal.record_response(response.body.clone());
        self.update_audit(document, audit_id, AuditUpdate::response(response.body.clone()));

        match config.schema {
            SchemaVersion::V2 => parse_v2_response(&response),
            SchemaVersion::Legacy => parse_legacy_response(&response),
        }
    }

    fn accept(
        &self,
        document: &mut Document,
        audit_id: Option<AuditId>,
        acceptance: Acceptance,
    ) -> SubmitOutcome {
        let mut receipt = FiscalReceipt {
            fiscal_number: acceptance.fiscal_number,
            qr_code: acceptance.qr_code,
            verification_url: acceptance.verification_url,
            pdf_reference: None,
            pdf_attachment: None,
        };

        if let Some(pdf) = acceptance.pdf {
            match decode_pdf(&pdf) {
                Some(bytes) => {
                    match self
                        .attachments
                        .store_pdf(document, &pdf_filename(document), &bytes)
                    {
                        Ok(id) => receipt.pdf_attachment = Some(id),
                        Err(e) => {
                            warn!(document = %document.name, error = %e, "Failed to store fiscal PDF");
                        }
                    }
                }
                None => receipt.pdf_reference = Some(pdf),
            }
        }

        let fiscal_number = receipt.fiscal_number.clone();
        let at = Utc::now();
        if let Err(e) = document.fiscal.mark_fiscalized(receipt, at) {
            return self.fail(document, audit_id, FiscalError::Unexpected(e.to_string()));
        }
        self.update_audit(
            document,
            audit_id,
            AuditUpdate::fiscalized(fiscal_number.clone(), at),
        );
        info!(document = %document.name, fiscal_number = %fiscal_number, "Document fiscalized");
        SubmitOutcome::Fiscalized { fiscal_number }
    }

    fn fail_unsent(&self, document: &mut Document, err: FiscalError) -> SubmitOutcome {
        let audit_id = self.open_audit(document, String::new());
        if let Err(e) = document.fiscal.mark_failed_unsent(err.to_string()) {
            warn!(document = %document.name, error = %e, "Cannot count unsent attempt");
        }
        self.fail(document, audit_id, err)
    }

    fn fail(
        &self,
        document: &mut Document,
        audit_id: Option<AuditId>,
        err: FiscalError,
    ) -> SubmitOutcome {
        fail_document(document, &err);
        self.update_audit(
            document,
            audit_id,
            AuditUpdate::failed(err.to_string(), err.request_id().map(str::to_string)),
        );
        if matches!(err, FiscalError::AuthorityRejected { .. }) {
            warn!(
                document = %document.name,
                attempt = document.fiscal.retry_count(),
                request_id = err.request_id().unwrap_or_default(),
                error = %err,
                "Fiscal authority rejected document"
            );
        } else {
            error!(
                document = %document.name,
                attempt = document.fiscal.retry_count(),
                error = %err,
                "Fiscalization failed"
            );
        }
        SubmitOutcome::Failed(err)
    }
}

/// Move to `Failed` where the state machine allows it; otherwise only
/// record the error so a fiscalized document keeps its number.
fn fail_document(document: &mut Document, err: &FiscalError) {
    let message = err.to_string();
    if document.fiscal.mark_failed(message.clone()).is_err() {
        document.fiscal.record_error(message);
    }
}
