use std::collections::VecDeque;
use std::sync::Mutex;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use chrono::NaiveDate;
use rust_decimal_macros::dec;
use zimra_fiscal::config::*;
use zimra_fiscal::core::*;
use zimra_fiscal::fiscal::*;
use zimra_fiscal::transport::{Transport, TransportError, TransportResponse};

// --- Test doubles ---

#[derive(Debug, Clone, PartialEq)]
struct Call {
    endpoint: String,
    body: String,
}

/// Replays queued answers and records every request.
#[derive(Default)]
struct Scripted {
    answers: Mutex<VecDeque<Result<TransportResponse, TransportError>>>,
    calls: Mutex<Vec<Call>>,
}

impl Scripted {
    fn new() -> Self {
        Self::default()
    }

    fn respond(self, status: u16, body: &str) -> Self {
        self.answers
            .lock()
            .unwrap()
            .push_back(Ok(TransportResponse::new(status, body)));
        self
    }

    fn fail(self, err: TransportError) -> Self {
        self.answers.lock().unwrap().push_back(Err(err));
        self
    }

    fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }
}

impl Transport for Scripted {
    fn post(
        &self,
        _config: &FiscalConfig,
        endpoint: &str,
        body: &str,
    ) -> Result<TransportResponse, TransportError> {
        self.calls.lock().unwrap().push(Call {
            endpoint: endpoint.to_string(),
            body: body.to_string(),
        });
        self.answers
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(TransportError::Network("no scripted answer".into())))
    }
}

type Service = FiscalizationService<MemoryConfigStore, MemoryAuditLog, MemoryAttachments, Scripted>;

const ACCEPTED: &str = r#"[{"FiscalDay":"12","InvoiceNumber":"INV-001","Error":"","QrData":"https://qr.zimra.co.zw/INV-001","VerificationUrl":"https://verify.zimra.co.zw/INV-001","RequestId":"req-1"}]"#;
const REJECTED: &str = r#"[{"Error":"Invalid TIN","RequestId":"req-2"}]"#;

// --- Helpers ---

fn config_builder() -> FiscalConfigBuilder {
    FiscalConfigBuilder::new(1, "https://fdms.test/api", "key")
        .add_tax_mapping(TaxMapping::from_preset(1, TaxType::StandardRated))
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn service_with(config: FiscalConfig, transport: Scripted) -> Service {
    init_tracing();
    FiscalizationService::new(
        MemoryConfigStore::new().with(config),
        MemoryAuditLog::new(),
        MemoryAttachments::new(),
        transport,
    )
}

fn service(transport: Scripted) -> Service {
    service_with(config_builder().build().unwrap(), transport)
}

fn invoice(id: u64) -> Document {
    DocumentBuilder::new(id, format!("INV/2024/{id:04}"), DocumentKind::CustomerInvoice)
        .posted()
        .date(NaiveDate::from_ymd_opt(2024, 6, 15).unwrap())
        .partner(PartnerBuilder::new("Acme (Pvt) Ltd").vat("2000123456").build())
        .add_line(
            LineItemBuilder::new("Consulting", dec!(1), dec!(100))
                .tax(1, dec!(15))
                .build(),
        )
        .build()
        .unwrap()
}

fn failed_invoice(id: u64, attempts: u32) -> Document {
    let mut doc = invoice(id);
    doc.fiscal = FiscalRecord::restore(FiscalSnapshot {
        status: FiscalStatus::Failed,
        retry_count: attempts,
        last_error: Some("Timeout after 30 seconds".into()),
        ..FiscalSnapshot::default()
    })
    .unwrap();
    doc
}

fn fiscalized(service: &Service, id: u64) -> Document {
    let mut doc = invoice(id);
    let outcome = service.submit(&mut doc);
    assert!(matches!(outcome, SubmitOutcome::Fiscalized { .. }));
    doc
}

// --- Submission ---

#[test]
fn accepted_invoice_is_fiscalized() {
    let service = service(Scripted::new().respond(200, ACCEPTED));
    let mut doc = invoice(1);

    let outcome = service.submit(&mut doc);

    assert_eq!(
        outcome,
        SubmitOutcome::Fiscalized {
            fiscal_number: "INV-001/12".into()
        }
    );
    assert_eq!(doc.fiscal.status(), FiscalStatus::Fiscalized);
    assert_eq!(doc.fiscal.fiscal_number(), Some("INV-001/12"));
    assert_eq!(doc.fiscal.qr_code(), Some("https://qr.zimra.co.zw/INV-001"));
    assert_eq!(
        doc.fiscal.verification_url(),
        Some("https://verify.zimra.co.zw/INV-001")
    );
    assert_eq!(doc.fiscal.retry_count(), 1);
    assert!(doc.fiscal.sent_date().is_some());
    assert!(doc.fiscal.fiscalized_date().is_some());
    assert_eq!(doc.fiscal.last_response(), Some(ACCEPTED));
    assert!(doc.fiscal.last_error().is_none());

    let entries = service.audit().entries();
    assert_eq!(entries.len(), 1);
    let entry = &entries[0];
    assert_eq!(entry.status, AuditStatus::Fiscalized);
    assert_eq!(entry.fiscal_number.as_deref(), Some("INV-001/12"));
    assert_eq!(entry.response_data.as_deref(), Some(ACCEPTED));
    assert!(entry.sent_date.is_some());
    assert!(entry.request_data.contains('\n'));

    let calls = service.transport().calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].endpoint, "invoice");
    assert!(!calls[0].body.contains('\n'));
    assert!(calls[0].body.contains(r#""InvoiceId":"INV/2024/0001""#));
}

#[test]
fn acceptance_without_receipt_fields_is_fiscalized() {
    let service = service(Scripted::new().respond(200, r#"[{"Error":""}]"#));
    let mut doc = invoice(1);

    let outcome = service.submit(&mut doc);

    assert!(outcome.is_success());
    assert_eq!(doc.fiscal.status(), FiscalStatus::Fiscalized);
    assert!(doc.fiscal.last_error().is_none());
    assert_eq!(service.audit().entries()[0].status, AuditStatus::Fiscalized);
}

#[test]
fn rejection_is_recorded_as_failure() {
    let service = service(Scripted::new().respond(200, REJECTED));
    let mut doc = invoice(1);

    let outcome = service.submit(&mut doc);

    assert_eq!(
        outcome,
        SubmitOutcome::Failed(FiscalError::AuthorityRejected {
            message: "Invalid TIN".into(),
            request_id: Some("req-2".into()),
        })
    );
    assert_eq!(doc.fiscal.status(), FiscalStatus::Failed);
    assert_eq!(doc.fiscal.retry_count(), 1);
    assert_eq!(doc.fiscal.last_error(), Some("Invalid TIN"));
    assert!(doc.fiscal.fiscal_number().is_none());

    let entries = service.audit().entries();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].status, AuditStatus::Failed);
    assert_eq!(entries[0].error_message.as_deref(), Some("Invalid TIN"));
    assert_eq!(entries[0].request_id.as_deref(), Some("req-2"));
}

#[test]
fn missing_configuration_fails_without_audit_row() {
    let service = FiscalizationService::new(
        MemoryConfigStore::new(),
        MemoryAuditLog::new(),
        MemoryAttachments::new(),
        Scripted::new(),
    );
    let mut doc = invoice(1);

    let outcome = service.submit(&mut doc);

    assert_eq!(
        outcome,
        SubmitOutcome::Failed(FiscalError::ConfigurationMissing { company_id: 1 })
    );
    assert_eq!(doc.fiscal.status(), FiscalStatus::Failed);
    assert_eq!(
        doc.fiscal.last_error(),
        Some("No active ZIMRA configuration found for company 1")
    );
    assert!(service.audit().is_empty());
    assert!(service.transport().calls().is_empty());
}

#[test]
fn inactive_configuration_counts_as_missing() {
    let service = service_with(config_builder().active(false).build().unwrap(), Scripted::new());
    let mut doc = invoice(1);
    assert!(matches!(
        service.submit(&mut doc),
        SubmitOutcome::Failed(FiscalError::ConfigurationMissing { .. })
    ));
}

#[test]
fn draft_document_is_exempted() {
    let service = service(Scripted::new());
    let mut doc = DocumentBuilder::new(5, "INV/5", DocumentKind::CustomerInvoice)
        .build()
        .unwrap();

    assert_eq!(service.submit(&mut doc), SubmitOutcome::Exempted);
    assert_eq!(doc.fiscal.status(), FiscalStatus::Exempted);
    assert!(service.transport().calls().is_empty());
    assert!(service.audit().is_empty());
}

#[test]
fn vendor_bill_is_exempted() {
    let service = service(Scripted::new());
    let mut doc = DocumentBuilder::new(5, "BILL/5", DocumentKind::VendorBill)
        .posted()
        .build()
        .unwrap();
    assert_eq!(service.submit(&mut doc), SubmitOutcome::Exempted);
}

#[test]
fn fiscalized_document_is_not_resubmitted() {
    let service = service(Scripted::new().respond(200, ACCEPTED));
    let mut doc = fiscalized(&service, 1);

    assert_eq!(
        service.submit(&mut doc),
        SubmitOutcome::Skipped {
            status: FiscalStatus::Fiscalized
        }
    );
    assert_eq!(doc.fiscal.fiscal_number(), Some("INV-001/12"));
    assert_eq!(service.transport().calls().len(), 1);
}

#[test]
fn timeout_fails_with_timeout_message() {
    let service = service(Scripted::new().fail(TransportError::Timeout { seconds: 30 }));
    let mut doc = invoice(1);

    let outcome = service.submit(&mut doc);

    assert_eq!(
        outcome,
        SubmitOutcome::Failed(FiscalError::TransportTimeout { seconds: 30 })
    );
    assert_eq!(doc.fiscal.last_error(), Some("Timeout after 30 seconds"));
    assert_eq!(service.audit().entries()[0].status, AuditStatus::Failed);
    assert!(service.audit().entries()[0].response_data.is_none());
}

#[test]
fn http_error_is_a_failure() {
    let service = service(Scripted::new().respond(500, "Internal Server Error"));
    let mut doc = invoice(1);

    service.submit(&mut doc);

    assert_eq!(doc.fiscal.status(), FiscalStatus::Failed);
    assert_eq!(
        doc.fiscal.last_error(),
        Some("HTTP 500: Internal Server Error")
    );
}

#[test]
fn legacy_schema_posts_to_invoices() {
    let config = config_builder().schema(SchemaVersion::Legacy).build().unwrap();
    let service = service_with(
        config,
        Scripted::new().respond(200, r#"{"fiscal_number":"FN-77","qr_code":"qr"}"#),
    );
    let mut doc = invoice(1);

    assert_eq!(
        service.submit(&mut doc),
        SubmitOutcome::Fiscalized {
            fiscal_number: "FN-77".into()
        }
    );
    assert_eq!(service.transport().calls()[0].endpoint, "invoices");
}

#[test]
fn legacy_credit_note_is_exempted() {
    let config = config_builder().schema(SchemaVersion::Legacy).build().unwrap();
    let service = service_with(config, Scripted::new());
    let mut doc = DocumentBuilder::new(7, "RINV/7", DocumentKind::CustomerCreditNote)
        .posted()
        .build()
        .unwrap();

    let outcome = service.submit(&mut doc);

    assert_eq!(outcome, SubmitOutcome::Exempted);
    assert_eq!(doc.fiscal.status(), FiscalStatus::Exempted);
    assert!(service.transport().calls().is_empty());
    assert!(service.audit().is_empty());
}

#[test]
fn failed_legacy_credit_note_leaves_the_sweep() {
    let config = config_builder().schema(SchemaVersion::Legacy).build().unwrap();
    let service = service_with(config, Scripted::new());
    let mut note = DocumentBuilder::new(7, "RINV/7", DocumentKind::CustomerCreditNote)
        .posted()
        .build()
        .unwrap();
    note.fiscal = FiscalRecord::restore(FiscalSnapshot {
        status: FiscalStatus::Failed,
        last_error: Some("credit note unsupported".into()),
        ..FiscalSnapshot::default()
    })
    .unwrap();
    let mut docs = vec![note];

    let first = service.retry_failed(&mut docs);
    assert_eq!(first.selected, 1);
    assert_eq!(docs[0].fiscal.status(), FiscalStatus::Exempted);

    for _ in 0..5 {
        assert_eq!(service.retry_failed(&mut docs), RetrySummary::default());
    }
    assert!(!is_retry_candidate(&docs[0]));
    assert!(service.audit().is_empty());
    assert!(service.transport().calls().is_empty());
}

#[test]
fn oversized_figures_fail_without_panicking() {
    let service = service(Scripted::new());
    let mut doc = DocumentBuilder::new(8, "INV/8", DocumentKind::CustomerInvoice)
        .posted()
        .add_line(
            LineItemBuilder::new("Huge", dec!(1000000000000000), dec!(1000000000000000))
                .tax_id(1)
                .build(),
        )
        .build()
        .unwrap();

    let outcome = service.submit(&mut doc);

    assert!(matches!(
        outcome,
        SubmitOutcome::Failed(FiscalError::Payload(PayloadError::Overflow { .. }))
    ));
    assert_eq!(doc.fiscal.status(), FiscalStatus::Failed);
    assert_eq!(doc.fiscal.retry_count(), 1);
    assert!(service.transport().calls().is_empty());
    assert_eq!(service.audit().entries()[0].status, AuditStatus::Failed);
}

#[test]
fn unsent_failures_count_toward_the_retry_limit() {
    let service = service(Scripted::new());
    let mut docs = vec![
        DocumentBuilder::new(8, "INV/8", DocumentKind::CustomerInvoice)
            .posted()
            .add_line(
                LineItemBuilder::new("Huge", dec!(1000000000000000), dec!(1000000000000000))
                    .build(),
            )
            .build()
            .unwrap(),
    ];
    service.submit(&mut docs[0]);

    for _ in 0..10 {
        service.retry_failed(&mut docs);
    }

    assert_eq!(docs[0].fiscal.status(), FiscalStatus::Failed);
    assert_eq!(docs[0].fiscal.retry_count(), MAX_AUTO_RETRIES);
    assert!(!is_retry_candidate(&docs[0]));
    assert_eq!(service.audit().len(), MAX_AUTO_RETRIES as usize);
}

#[test]
fn credit_note_posts_to_creditnote() {
    let service = service(Scripted::new().respond(200, ACCEPTED));
    let mut doc = DocumentBuilder::new(7, "RINV/2024/0007", DocumentKind::CustomerCreditNote)
        .posted()
        .origin_invoice("INV/2024/0001")
        .add_line(LineItemBuilder::new("Refund", dec!(-1), dec!(100)).build())
        .build()
        .unwrap();

    service.submit(&mut doc);

    let calls = service.transport().calls();
    assert_eq!(calls[0].endpoint, "creditnote");
    assert!(calls[0].body.contains(r#""OriginalInvoiceId":"INV/2024/0001""#));
    assert!(calls[0].body.contains(r#""Total":"100.00""#));
}

// --- PDF handling ---

#[test]
fn inline_pdf_is_attached() {
    let pdf = STANDARD.encode(b"%PDF-1.7\n...");
    let body = format!(r#"[{{"FiscalDay":"1","InvoiceNumber":"9","FiscalInvoicePdf":"{pdf}"}}]"#);
    let service = service(Scripted::new().respond(200, &body));
    let mut doc = invoice(1);

    service.submit(&mut doc);

    let attachment = doc.fiscal.pdf_attachment().expect("attachment id");
    let file = service.attachments().get(attachment).unwrap();
    assert_eq!(file.filename, "INV_2024_0001_fiscal.pdf");
    assert!(file.bytes.starts_with(b"%PDF"));
    assert!(doc.fiscal.pdf_reference().is_none());
}

#[test]
fn pdf_token_is_kept_as_reference() {
    let service = service(Scripted::new().respond(
        200,
        r#"[{"FiscalDay":"1","InvoiceNumber":"9","FiscalInvoicePdf":"tok-5521"}]"#,
    ));
    let mut doc = invoice(1);

    service.submit(&mut doc);

    assert_eq!(doc.fiscal.pdf_reference(), Some("tok-5521"));
    assert!(doc.fiscal.pdf_attachment().is_none());
    assert!(service.attachments().is_empty());
}

#[test]
fn fetch_pdf_attaches_document() {
    let token_response = r#"[{"FiscalDay":"1","InvoiceNumber":"9","FiscalInvoicePdf":"tok-5521"}]"#;
    let pdf = format!("\"{}\"", STANDARD.encode(b"%PDF-1.4 fiscal"));
    let service = service(
        Scripted::new()
            .respond(200, token_response)
            .respond(200, &pdf),
    );
    let mut doc = invoice(1);
    service.submit(&mut doc);

    let id = service.fetch_pdf(&mut doc).unwrap();

    assert_eq!(doc.fiscal.pdf_attachment(), Some(id.as_str()));
    let calls = service.transport().calls();
    assert_eq!(calls[1].endpoint, "pdf");
    assert_eq!(calls[1].body, r#"{"Reference":"tok-5521"}"#);
}

#[test]
fn refetching_pdf_replaces_the_attachment() {
    let token_response = r#"[{"FiscalDay":"1","InvoiceNumber":"9","FiscalInvoicePdf":"tok-5521"}]"#;
    let pdf = format!("\"{}\"", STANDARD.encode(b"%PDF-1.4 fiscal"));
    let service = service(
        Scripted::new()
            .respond(200, token_response)
            .respond(200, &pdf)
            .respond(200, &pdf)
            .respond(200, &pdf),
    );
    let mut doc = invoice(1);
    service.submit(&mut doc);

    let first = service.fetch_pdf(&mut doc).unwrap();
    service.fetch_pdf(&mut doc).unwrap();
    let last = service.fetch_pdf(&mut doc).unwrap();

    assert_ne!(first, last);
    assert_eq!(doc.fiscal.pdf_attachment(), Some(last.as_str()));
    assert_eq!(service.attachments().len(), 1);
    assert!(service.attachments().get(&first).is_none());
}

#[test]
fn fetch_pdf_status_code_is_reported() {
    let token_response = r#"[{"FiscalDay":"1","InvoiceNumber":"9","FiscalInvoicePdf":"tok-5521"}]"#;
    let service = service(
        Scripted::new()
            .respond(200, token_response)
            .respond(200, "404"),
    );
    let mut doc = invoice(1);
    service.submit(&mut doc);

    let err = service.fetch_pdf(&mut doc).unwrap_err();

    assert_eq!(err, FiscalError::PdfUnavailable(404));
    assert_eq!(doc.fiscal.status(), FiscalStatus::Fiscalized);
    assert_eq!(doc.fiscal.last_error(), Some("fiscal PDF not available (status 404)"));
}

// --- Retry sweep ---

#[test]
fn retry_sweep_selects_failed_below_limit() {
    let service = service(Scripted::new().respond(200, ACCEPTED));
    let mut docs = vec![
        failed_invoice(1, 1),
        failed_invoice(2, MAX_AUTO_RETRIES),
        invoice(3),
    ];

    let summary = service.retry_failed(&mut docs);

    assert_eq!(
        summary,
        RetrySummary {
            selected: 1,
            fiscalized: 1,
            failed: 0
        }
    );
    assert_eq!(docs[0].fiscal.status(), FiscalStatus::Fiscalized);
    assert_eq!(docs[0].fiscal.retry_count(), 2);
    assert_eq!(docs[1].fiscal.status(), FiscalStatus::Failed);
    assert_eq!(docs[2].fiscal.status(), FiscalStatus::Pending);
    assert!(service.transport().calls()[0].body.contains(r#""IsRetry":true"#));
}

#[test]
fn retry_sweep_counts_failures() {
    let service = service(Scripted::new().respond(200, REJECTED));
    let mut docs = vec![failed_invoice(1, 2)];

    let summary = service.retry_failed(&mut docs);

    assert_eq!(summary.selected, 1);
    assert_eq!(summary.failed, 1);
    assert_eq!(docs[0].fiscal.retry_count(), 3);
    assert!(!is_retry_candidate(&docs[0]));
}

#[test]
fn retry_sweep_leaves_other_statuses_alone() {
    let service = service(Scripted::new());
    let mut docs: Vec<Document> = [
        FiscalStatus::Pending,
        FiscalStatus::Sent,
        FiscalStatus::Cancelled,
        FiscalStatus::Exempted,
    ]
    .into_iter()
    .enumerate()
    .map(|(i, status)| {
        let mut doc = invoice(i as u64 + 1);
        doc.fiscal = FiscalRecord::restore(FiscalSnapshot {
            status,
            ..FiscalSnapshot::default()
        })
        .unwrap();
        doc
    })
    .collect();
    let before: Vec<FiscalRecord> = docs.iter().map(|d| d.fiscal.clone()).collect();

    let summary = service.retry_failed(&mut docs);

    assert_eq!(summary, RetrySummary::default());
    assert!(service.transport().calls().is_empty());
    assert!(service.audit().is_empty());
    let after: Vec<FiscalRecord> = docs.iter().map(|d| d.fiscal.clone()).collect();
    assert_eq!(before, after);
}

#[test]
fn loading_a_tampered_document_is_rejected() {
    let service = service(Scripted::new().respond(200, ACCEPTED));
    let doc = fiscalized(&service, 1);

    let mut value = serde_json::to_value(&doc).unwrap();
    let reloaded: Document = serde_json::from_value(value.clone()).unwrap();
    assert_eq!(reloaded.fiscal.fiscal_number(), Some("INV-001/12"));

    value["fiscal"]["status"] = serde_json::json!("failed");
    value["fiscal"]["fiscal_number"] = serde_json::json!("X/1");
    assert!(serde_json::from_value::<Document>(value).is_err());
}

// --- Hooks ---

#[test]
fn on_created_assigns_initial_status() {
    let service = service(Scripted::new());
    let mut bill = DocumentBuilder::new(1, "BILL/1", DocumentKind::VendorBill)
        .build()
        .unwrap();
    let mut inv = DocumentBuilder::new(2, "INV/2", DocumentKind::CustomerInvoice)
        .build()
        .unwrap();

    assert!(service.on_created(&mut bill).is_none());
    assert!(service.on_created(&mut inv).is_none());
    assert_eq!(bill.fiscal.status(), FiscalStatus::Exempted);
    assert_eq!(inv.fiscal.status(), FiscalStatus::Pending);
}

#[test]
fn on_created_posted_with_auto_fiscalize() {
    let config = config_builder().auto_fiscalize(true).build().unwrap();
    let service = service_with(config, Scripted::new().respond(200, ACCEPTED));
    let mut doc = invoice(1);

    let outcome = service.on_created(&mut doc);

    assert!(matches!(outcome, Some(SubmitOutcome::Fiscalized { .. })));
}

#[test]
fn on_posted_respects_flag() {
    let off = service(Scripted::new());
    let mut doc = invoice(1);
    assert!(off.on_posted(&mut doc).is_none());
    assert!(off.transport().calls().is_empty());

    let config = config_builder().auto_fiscalize_invoices(true).build().unwrap();
    let on = service_with(config, Scripted::new().respond(200, ACCEPTED));
    assert!(matches!(
        on.on_posted(&mut doc),
        Some(SubmitOutcome::Fiscalized { .. })
    ));
}

#[test]
fn posting_with_auto_fiscalize_fiscalizes_immediately() {
    let config = config_builder().auto_fiscalize_invoices(true).build().unwrap();
    let service = service_with(config, Scripted::new().respond(200, ACCEPTED));
    let mut doc = DocumentBuilder::new(1, "INV/2024/0001", DocumentKind::CustomerInvoice)
        .posted()
        .add_line(LineItemBuilder::new("Consulting", dec!(1), dec!(85)).build())
        .totals(dec!(85), dec!(15), dec!(100))
        .build()
        .unwrap();

    let outcome = service.on_posted(&mut doc);

    assert_eq!(
        outcome,
        Some(SubmitOutcome::Fiscalized {
            fiscal_number: "INV-001/12".into()
        })
    );
    assert_eq!(doc.fiscal.status(), FiscalStatus::Fiscalized);
    assert_eq!(doc.fiscal.qr_code(), Some("https://qr.zimra.co.zw/INV-001"));
    let entries = service.audit().entries();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].status, AuditStatus::Fiscalized);
    assert_eq!(
        service.audit().get(entries[0].id).unwrap().map(|e| e.fiscal_number),
        Some(Some("INV-001/12".to_string()))
    );
    assert!(service.transport().calls()[0].body.contains(r#""Total":"100.00""#));
}

#[test]
fn on_posted_ignores_failed_documents() {
    let config = config_builder().auto_fiscalize_invoices(true).build().unwrap();
    let service = service_with(config, Scripted::new());
    let mut doc = failed_invoice(1, 1);
    assert!(service.on_posted(&mut doc).is_none());
}

#[test]
fn on_payment_only_when_paid() {
    let config = config_builder().auto_fiscalize_on_payment(true).build().unwrap();
    let service = service_with(config, Scripted::new().respond(200, ACCEPTED));
    let mut doc = invoice(1);

    doc.payment_state = PaymentState::Partial;
    assert!(service.on_payment_state_changed(&mut doc).is_none());

    doc.payment_state = PaymentState::Paid;
    assert!(matches!(
        service.on_payment_state_changed(&mut doc),
        Some(SubmitOutcome::Fiscalized { .. })
    ));
}

#[test]
fn cancelling_clears_fiscal_number() {
    let service = service(Scripted::new().respond(200, ACCEPTED));
    let mut doc = fiscalized(&service, 1);

    assert!(service.on_cancelled(&mut doc));
    assert_eq!(doc.fiscal.status(), FiscalStatus::Cancelled);
    assert!(doc.fiscal.fiscal_number().is_none());
    assert_eq!(
        service.audit().entries()[0].fiscal_number.as_deref(),
        Some("INV-001/12")
    );
    assert!(!service.on_cancelled(&mut doc));
}

#[test]
fn draft_revert_clears_artifacts() {
    let pdf = STANDARD.encode(b"%PDF-1.7");
    let body = format!(
        r#"[{{"FiscalDay":"12","InvoiceNumber":"INV-001","QrData":"qr","FiscalInvoicePdf":"{pdf}"}}]"#
    );
    let service = service(Scripted::new().respond(200, &body));
    let mut doc = fiscalized(&service, 1);
    assert_eq!(service.attachments().len(), 1);

    assert!(service.on_draft_reverted(&mut doc));

    assert_eq!(doc.fiscal.status(), FiscalStatus::Pending);
    assert!(!doc.fiscal.has_artifacts());
    assert!(doc.fiscal.last_response().is_none());
    assert!(doc.fiscal.sent_date().is_none());
    assert!(doc.fiscal.fiscalized_date().is_none());
    assert_eq!(doc.fiscal.retry_count(), 1);
    assert!(service.attachments().is_empty());
}

#[test]
fn draft_revert_leaves_pending_alone() {
    let service = service(Scripted::new());
    let mut doc = invoice(1);
    assert!(!service.on_draft_reverted(&mut doc));
}

// --- Actions ---

#[test]
fn action_fiscalize_notifications() {
    let service = service(Scripted::new().respond(200, ACCEPTED).respond(200, REJECTED));

    let mut ok = invoice(1);
    let n = service.action_fiscalize(&mut ok);
    assert_eq!(n.level, NotificationLevel::Success);
    assert_eq!(n.title, "Fiscalization Successful");

    let again = service.action_fiscalize(&mut ok);
    assert_eq!(again.level, NotificationLevel::Warning);

    let mut bad = invoice(2);
    let n = service.action_fiscalize(&mut bad);
    assert_eq!(n.level, NotificationLevel::Danger);
    assert!(n.message.ends_with("Invalid TIN"));

    let mut bill = DocumentBuilder::new(3, "BILL/3", DocumentKind::VendorBill)
        .posted()
        .build()
        .unwrap();
    assert_eq!(service.action_fiscalize(&mut bill).title, "Invalid Document");
}

#[test]
fn action_retry_only_for_failed() {
    let service = service(Scripted::new().respond(200, ACCEPTED));
    let mut pending = invoice(1);
    assert_eq!(
        service.action_retry(&mut pending).level,
        NotificationLevel::Warning
    );

    let mut failed = failed_invoice(2, 5);
    let n = service.action_retry(&mut failed);
    assert_eq!(n.level, NotificationLevel::Success);
    assert_eq!(failed.fiscal.retry_count(), 6);
}

#[test]
fn action_cancel() {
    let service = service(Scripted::new().respond(200, ACCEPTED));
    let mut doc = fiscalized(&service, 1);
    let n = service.action_cancel(&mut doc);
    assert_eq!(n.level, NotificationLevel::Success);
    assert!(n.message.contains("INV-001/12"));
    assert_eq!(service.action_cancel(&mut doc).level, NotificationLevel::Warning);
}
