use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::status::{FiscalStatus, TransitionError};

/// An accounting document (invoice, credit note, bill…) as seen by the
/// fiscal connector. The host maps its own record into this shape.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    /// Host record identifier.
    pub id: u64,
    /// Document number, e.g. "INV/2024/00042" or "RINV/2024/00003".
    pub name: String,
    /// Invoice / credit note / vendor document / plain entry.
    pub kind: DocumentKind,
    /// Owning company; selects the fiscal configuration.
    pub company_id: u64,
    /// Posting state of the document.
    pub state: PostingState,
    /// Payment state of the document.
    pub payment_state: PaymentState,
    /// Invoice date. `None` means "not yet dated"; the current time is used.
    pub date: Option<NaiveDate>,
    /// Customer reference / free text reference.
    pub reference: Option<String>,
    /// For credit notes: number of the invoice being reversed.
    pub origin_invoice: Option<String>,
    /// Host currency code (ISO 4217), mapped through the currency table.
    pub currency: String,
    /// Total without tax.
    pub amount_untaxed: Decimal,
    /// Total tax.
    pub amount_tax: Decimal,
    /// Total with tax.
    pub amount_total: Decimal,
    /// Counterparty. `None` for walk-in sales.
    pub partner: Option<Partner>,
    /// Document lines, including section and note lines.
    pub lines: Vec<LineItem>,
    /// Fiscalization state owned by this crate.
    pub fiscal: FiscalRecord,
}

impl Document {
    /// Customer invoices and customer credit notes are the only documents
    /// the authority accepts.
    pub fn is_customer_document(&self) -> bool {
        self.kind.is_customer_document()
    }

    pub fn is_credit_note(&self) -> bool {
        self.kind == DocumentKind::CustomerCreditNote
    }

    pub fn is_posted(&self) -> bool {
        self.state == PostingState::Posted
    }

    /// True if any product line carries a discount.
    pub fn has_discount(&self) -> bool {
        self.product_lines().any(|line| line.discount > Decimal::ZERO)
    }

    /// Lines that describe goods or services (sections and notes skipped).
    pub fn product_lines(&self) -> impl Iterator<Item = &LineItem> {
        self.lines.iter().filter(|line| line.is_product())
    }
}

/// Kind of accounting document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DocumentKind {
    /// Outgoing customer invoice.
    CustomerInvoice,
    /// Outgoing customer credit note (refund).
    CustomerCreditNote,
    /// Incoming vendor bill.
    VendorBill,
    /// Incoming vendor refund.
    VendorRefund,
    /// Miscellaneous journal entry.
    JournalEntry,
}

impl DocumentKind {
    pub fn is_customer_document(&self) -> bool {
        matches!(self, Self::CustomerInvoice | Self::CustomerCreditNote)
    }
}

/// Posting state of the host document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PostingState {
    Draft,
    Posted,
    Cancelled,
}

/// Payment state of the host document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaymentState {
    NotPaid,
    InPayment,
    Partial,
    Paid,
    Reversed,
}

/// Counterparty of a document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Partner {
    /// Display name.
    pub name: String,
    /// Combined free-form tax identifier, e.g. "TIN:2000123456 VAT:220012345".
    pub vat: Option<String>,
    /// Structured taxpayer identification number.
    pub tin: Option<String>,
    /// Structured VAT registration number.
    pub vat_number: Option<String>,
    pub street: Option<String>,
    pub street2: Option<String>,
    pub city: Option<String>,
    pub zip: Option<String>,
    /// Province / state name.
    pub province: Option<String>,
    /// Country name.
    pub country: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
}

/// How a document line is displayed by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DisplayType {
    /// Goods or services line.
    Product,
    /// Section heading; never fiscalized.
    Section,
    /// Free-text note; never fiscalized.
    Note,
}

/// A single document line.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LineItem {
    pub display_type: DisplayType,
    /// Host product identifier.
    pub product_id: Option<u64>,
    /// Internal product reference (SKU).
    pub product_code: Option<String>,
    pub product_name: Option<String>,
    /// Line label as printed on the document.
    pub description: Option<String>,
    pub quantity: Decimal,
    pub unit_price: Decimal,
    /// Discount in percent (0–100).
    pub discount: Decimal,
    /// Line total without tax, after discount.
    pub subtotal: Decimal,
    /// Host tax identifiers applied to this line.
    pub tax_ids: Vec<u64>,
    /// Tax computed by the host tax engine, if it ran.
    pub tax_amount: Option<Decimal>,
}

impl LineItem {
    pub fn is_product(&self) -> bool {
        self.display_type == DisplayType::Product
    }
}

/// Fiscalization state of a document.
///
/// Fields are only mutated through the transition methods below, which keep
/// the fiscal number tied to the `Fiscalized` status.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "FiscalSnapshot")]
pub struct FiscalRecord {
    status: FiscalStatus,
    fiscal_number: Option<String>,
    qr_code: Option<String>,
    verification_url: Option<String>,
    pdf_reference: Option<String>,
    pdf_attachment: Option<String>,
    retry_count: u32,
    last_error: Option<String>,
    last_response: Option<String>,
    sent_date: Option<DateTime<Utc>>,
    fiscalized_date: Option<DateTime<Utc>>,
}

/// Data extracted from a successful authority response.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FiscalReceipt {
    pub fiscal_number: String,
    pub qr_code: Option<String>,
    pub verification_url: Option<String>,
    pub pdf_reference: Option<String>,
    pub pdf_attachment: Option<String>,
}

impl FiscalRecord {
    pub fn status(&self) -> FiscalStatus {
        self.status
    }

    pub fn fiscal_number(&self) -> Option<&str> {
        self.fiscal_number.as_deref()
    }

    pub fn qr_code(&self) -> Option<&str> {
        self.qr_code.as_deref()
    }

    pub fn verification_url(&self) -> Option<&str> {
        self.verification_url.as_deref()
    }

    pub fn pdf_reference(&self) -> Option<&str> {
        self.pdf_reference.as_deref()
    }

    pub fn pdf_attachment(&self) -> Option<&str> {
        self.pdf_attachment.as_deref()
    }

    pub fn retry_count(&self) -> u32 {
        self.retry_count
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn last_response(&self) -> Option<&str> {
        self.last_response.as_deref()
    }

    pub fn sent_date(&self) -> Option<DateTime<Utc>> {
        self.sent_date
    }

    pub fn fiscalized_date(&self) -> Option<DateTime<Utc>> {
        self.fiscalized_date
    }

    /// Whether any fiscalization artifact is still attached.
    pub fn has_artifacts(&self) -> bool {
        self.fiscal_number.is_some()
            || self.qr_code.is_some()
            || self.verification_url.is_some()
            || self.pdf_reference.is_some()
            || self.pdf_attachment.is_some()
    }

    fn transition(&mut self, next: FiscalStatus) -> Result<(), TransitionError> {
        if !self.status.can_transition_to(next) {
            return Err(TransitionError {
                from: self.status,
                to: next,
            });
        }
        self.status = next;
        Ok(())
    }

    /// Initial status assigned when the host creates the document.
    pub fn initialize(&mut self, qualifying: bool) {
        self.status = if qualifying {
            FiscalStatus::Pending
        } else {
            FiscalStatus::Exempted
        };
    }

    /// Pending → Exempted.
    pub fn mark_exempted(&mut self) -> Result<(), TransitionError> {
        self.transition(FiscalStatus::Exempted)
    }

    /// Pending → Sent. Counts the attempt and stamps the send time.
    pub fn mark_sent(&mut self, at: DateTime<Utc>) -> Result<(), TransitionError> {
        self.transition(FiscalStatus::Sent)?;
        self.retry_count += 1;
        self.sent_date = Some(at);
        Ok(())
    }

    /// Sent → Fiscalized with the receipt data from the authority.
    pub fn mark_fiscalized(
        &mut self,
        receipt: FiscalReceipt,
        at: DateTime<Utc>,
    ) -> Result<(), TransitionError> {
        self.transition(FiscalStatus::Fiscalized)?;
        self.fiscal_number = Some(receipt.fiscal_number);
        self.qr_code = receipt.qr_code;
        self.verification_url = receipt.verification_url;
        self.pdf_reference = receipt.pdf_reference;
        self.pdf_attachment = receipt.pdf_attachment;
        self.fiscalized_date = Some(at);
        self.last_error = None;
        Ok(())
    }

    /// {Pending, Sent, Failed} → Failed with the error message.
    pub fn mark_failed(&mut self, error: impl Into<String>) -> Result<(), TransitionError> {
        self.transition(FiscalStatus::Failed)?;
        self.last_error = Some(error.into());
        Ok(())
    }

    /// Pending → Failed for an attempt that broke down before the request
    /// went out. Counts the attempt so the retry limit still applies.
    pub fn mark_failed_unsent(&mut self, error: impl Into<String>) -> Result<(), TransitionError> {
        if self.status != FiscalStatus::Pending {
            return Err(TransitionError {
                from: self.status,
                to: FiscalStatus::Failed,
            });
        }
        self.transition(FiscalStatus::Failed)?;
        self.retry_count += 1;
        self.last_error = Some(error.into());
        Ok(())
    }

    /// Fiscalized → Cancelled. The fiscal number leaves the document; the
    /// audit log keeps it.
    pub fn mark_cancelled(&mut self) -> Result<Option<String>, TransitionError> {
        self.transition(FiscalStatus::Cancelled)?;
        Ok(self.fiscal_number.take())
    }

    /// Failed → Pending ahead of a new attempt. Keeps the retry counter.
    pub fn reset_for_retry(&mut self) -> Result<(), TransitionError> {
        if self.status != FiscalStatus::Failed {
            return Err(TransitionError {
                from: self.status,
                to: FiscalStatus::Pending,
            });
        }
        self.transition(FiscalStatus::Pending)
    }

    /// {Fiscalized, Sent, Failed} → Pending, dropping every artifact.
    pub fn reset_to_draft(&mut self) -> Result<(), TransitionError> {
        self.transition(FiscalStatus::Pending)?;
        self.fiscal_number = None;
        self.qr_code = None;
        self.verification_url = None;
        self.pdf_reference = None;
        self.pdf_attachment = None;
        self.last_error = None;
        self.last_response = None;
        self.sent_date = None;
        self.fiscalized_date = None;
        Ok(())
    }

    /// Record the raw authority response of the current attempt.
    pub fn record_response(&mut self, body: impl Into<String>) {
        self.last_response = Some(body.into());
    }

    /// Record an error without a status change (e.g. a failed PDF fetch).
    pub fn record_error(&mut self, error: impl Into<String>) {
        self.last_error = Some(error.into());
    }

    /// Attach a retrieved PDF to an already fiscalized document.
    pub fn attach_pdf(&mut self, attachment_id: impl Into<String>) {
        self.pdf_attachment = Some(attachment_id.into());
    }

    /// Restore a persisted record, e.g. when the host loads a document
    /// fiscalized in a previous run. Enforces the fiscal number invariant.
    pub fn restore(snapshot: FiscalSnapshot) -> Result<Self, TransitionError> {
        if snapshot.fiscal_number.is_some() && snapshot.status != FiscalStatus::Fiscalized {
            return Err(TransitionError {
                from: snapshot.status,
                to: FiscalStatus::Fiscalized,
            });
        }
        Ok(Self {
            status: snapshot.status,
            fiscal_number: snapshot.fiscal_number,
            qr_code: snapshot.qr_code,
            verification_url: snapshot.verification_url,
            pdf_reference: snapshot.pdf_reference,
            pdf_attachment: snapshot.pdf_attachment,
            retry_count: snapshot.retry_count,
            last_error: snapshot.last_error,
            last_response: snapshot.last_response,
            sent_date: snapshot.sent_date,
            fiscalized_date: snapshot.fiscalized_date,
        })
    }
}

impl TryFrom<FiscalSnapshot> for FiscalRecord {
    type Error = TransitionError;

    fn try_from(snapshot: FiscalSnapshot) -> Result<Self, Self::Error> {
        Self::restore(snapshot)
    }
}

/// Plain persisted form of a [`FiscalRecord`], as stored by the host.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FiscalSnapshot {
    pub status: FiscalStatus,
    pub fiscal_number: Option<String>,
    pub qr_code: Option<String>,
    pub verification_url: Option<String>,
    pub pdf_reference: Option<String>,
    pub pdf_attachment: Option<String>,
    pub retry_count: u32,
    pub last_error: Option<String>,
    pub last_response: Option<String>,
    pub sent_date: Option<DateTime<Utc>>,
    pub fiscalized_date: Option<DateTime<Utc>>,
}
