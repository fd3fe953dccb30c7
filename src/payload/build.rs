use chrono::{Local, NaiveDateTime, NaiveTime};
use rust_decimal::Decimal;

use super::format::{float, float2, iso_timestamp, legacy_timestamp, money, quantity};
use super::schema::*;
use super::tin::partner_identifiers;
use crate::config::{FiscalConfig, SchemaVersion};
use crate::core::{Document, LineItem as DocumentLine, Partner, PayloadError};

/// Placeholder buyer name for documents without a counterparty.
pub const WALK_IN_CUSTOMER: &str = "Walk-in Customer";

/// Build the request body for `document` against `config`.
///
/// Pure apart from reading the clock when the document has no date.
pub fn build(document: &Document, config: &FiscalConfig) -> Result<Payload, PayloadError> {
    build_at(document, config, Local::now().naive_local())
}

/// Like [`build`], with `now` standing in for the current time.
pub fn build_at(
    document: &Document,
    config: &FiscalConfig,
    now: NaiveDateTime,
) -> Result<Payload, PayloadError> {
    let issued_at = document
        .date
        .map(|d| d.and_time(NaiveTime::MIN))
        .unwrap_or(now);

    match config.schema {
        SchemaVersion::Legacy => {
            if document.is_credit_note() {
                return Err(PayloadError::UnsupportedDocument {
                    schema: config.schema.as_str().into(),
                    kind: "credit note".into(),
                });
            }
            Ok(Payload::Legacy(build_legacy(document, config, issued_at)?))
        }
        SchemaVersion::V2 => build_v2(document, config, issued_at),
    }
}

/// Per-line figures shared by both schemas.
#[derive(Debug, Clone, PartialEq)]
struct LineFigures {
    item_code: String,
    description: String,
    quantity: Decimal,
    unit_price: Decimal,
    discount: Decimal,
    subtotal: Decimal,
    tax_code: String,
    tax_rate: Decimal,
    tax_amount: Decimal,
    total: Decimal,
    unit_amount: Decimal,
}

impl LineFigures {
    fn compute(
        line: &DocumentLine,
        config: &FiscalConfig,
        absolute: bool,
    ) -> Result<Self, PayloadError> {
        let overflow = |field: &str| PayloadError::Overflow {
            line: item_code(line),
            field: field.to_string(),
        };

        let mut tax_code = String::new();
        let mut tax_rate = Decimal::ZERO;
        let mut approximated = Decimal::ZERO;
        for tax_id in &line.tax_ids {
            if let Some(mapping) = config.tax_mapping(*tax_id) {
                approximated = line
                    .subtotal
                    .checked_mul(mapping.rate)
                    .map(|v| v / Decimal::ONE_HUNDRED)
                    .and_then(|v| approximated.checked_add(v))
                    .ok_or_else(|| overflow("tax amount"))?;
                tax_code = mapping.code.clone();
                tax_rate = mapping.rate;
            }
        }
        let tax_amount = line.tax_amount.unwrap_or(approximated);
        let discount = line
            .unit_price
            .checked_mul(line.quantity)
            .and_then(|v| v.checked_mul(line.discount))
            .map(|v| v / Decimal::ONE_HUNDRED)
            .ok_or_else(|| overflow("discount"))?;

        let abs = |v: Decimal| if absolute { v.abs() } else { v };
        let quantity = abs(line.quantity);
        let subtotal = abs(line.subtotal);
        let tax_amount = abs(tax_amount);
        let total = subtotal
            .checked_add(tax_amount)
            .ok_or_else(|| overflow("total"))?;
        let unit_amount = if quantity.is_zero() {
            Decimal::ZERO
        } else {
            total
                .checked_div(quantity)
                .ok_or_else(|| overflow("unit amount"))?
        };

        Ok(Self {
            item_code: item_code(line),
            description: line
                .description
                .clone()
                .filter(|d| !d.is_empty())
                .or_else(|| line.product_name.clone())
                .unwrap_or_else(|| "Service".to_string()),
            quantity,
            unit_price: abs(line.unit_price),
            discount: abs(discount),
            subtotal,
            tax_code,
            tax_rate,
            tax_amount,
            total,
            unit_amount,
        })
    }
}

fn item_code(line: &DocumentLine) -> String {
    match (&line.product_code, line.product_id) {
        (Some(code), _) if !code.is_empty() => code.clone(),
        (_, Some(id)) => id.to_string(),
        _ => "SERVICE".to_string(),
    }
}

fn lines(
    document: &Document,
    config: &FiscalConfig,
    absolute: bool,
) -> Result<Vec<LineFigures>, PayloadError> {
    document
        .product_lines()
        .map(|line| LineFigures::compute(line, config, absolute))
        .collect()
}

fn build_v2(
    document: &Document,
    config: &FiscalConfig,
    issued_at: NaiveDateTime,
) -> Result<Payload, PayloadError> {
    let credit = document.is_credit_note();
    let abs = |v: Decimal| if credit { v.abs() } else { v };

    let line_items = lines(document, config, credit)?
        .into_iter()
        .map(|f| LineItem {
            item_code: f.item_code,
            description: f.description,
            quantity: quantity(f.quantity),
            unit_amount: quantity(f.unit_amount),
            discount: money(f.discount),
            tax_code: f.tax_code,
            tax_percent: money(f.tax_rate),
            tax_amount: money(f.tax_amount),
            line_amount: money(f.total),
        })
        .collect();

    let buyer_contact = document
        .partner
        .as_ref()
        .map(v2_contact)
        .unwrap_or_default();
    let reference = document.reference.clone().unwrap_or_default();
    let date = iso_timestamp(issued_at);
    let sub_total = money(abs(document.amount_untaxed));
    let total_tax = money(abs(document.amount_tax));
    let total = money(abs(document.amount_total));
    let currency_code = config.currency_code(&document.currency).to_string();
    let is_discounted = document.has_discount();
    let is_retry = document.fiscal.retry_count() > 0;

    Ok(if credit {
        Payload::CreditNote(CreditNote {
            credit_note_id: document.name.clone(),
            credit_note_number: document.name.clone(),
            original_invoice_id: document.origin_invoice.clone().unwrap_or_default(),
            reference,
            is_discounted,
            is_tax_inclusive: true,
            buyer_contact,
            date,
            line_items,
            sub_total,
            total_tax,
            total,
            currency_code,
            is_retry,
        })
    } else {
        Payload::Invoice(Invoice {
            invoice_id: document.name.clone(),
            invoice_number: document.name.clone(),
            reference,
            is_discounted,
            is_tax_inclusive: true,
            buyer_contact,
            date,
            line_items,
            sub_total,
            total_tax,
            total,
            currency_code,
            is_retry,
        })
    })
}

fn v2_contact(partner: &Partner) -> BuyerContact {
    let ids = partner_identifiers(partner);
    BuyerContact {
        name: partner.name.clone(),
        tin: ids.tin,
        vat_number: ids.vat,
        address: BuyerAddress {
            province: partner.province.clone().unwrap_or_default(),
            street: partner.street.clone().unwrap_or_default(),
            house_no: partner.street2.clone().unwrap_or_default(),
            city: partner.city.clone().unwrap_or_default(),
        },
        phone: partner.phone.clone().unwrap_or_default(),
        email: partner.email.clone().unwrap_or_default(),
    }
}

fn build_legacy(
    document: &Document,
    config: &FiscalConfig,
    issued_at: NaiveDateTime,
) -> Result<LegacyInvoice, PayloadError> {
    let line_items = lines(document, config, false)?
        .into_iter()
        .map(|f| LegacyLineItem {
            item_code: f.item_code,
            description: f.description,
            quantity: float(f.quantity),
            unit_price: float2(f.unit_price),
            discount: float2(f.discount),
            sub_total: float2(f.subtotal),
            tax_code: f.tax_code,
            tax_rate: float(f.tax_rate),
            tax_amount: float2(f.tax_amount),
            total: float2(f.total),
        })
        .collect();

    let buyer_contact = match &document.partner {
        Some(partner) => LegacyBuyerContact {
            name: partner.name.clone(),
            tin: partner
                .tin
                .clone()
                .or_else(|| partner.vat.clone())
                .unwrap_or_default(),
            address: flat_address(partner),
            phone: partner.phone.clone().unwrap_or_default(),
            email: partner.email.clone().unwrap_or_default(),
        },
        None => LegacyBuyerContact {
            name: WALK_IN_CUSTOMER.to_string(),
            tin: String::new(),
            address: String::new(),
            phone: String::new(),
            email: String::new(),
        },
    };

    Ok(LegacyInvoice {
        invoice_id: document.name.clone(),
        invoice_number: document.name.clone(),
        reference: document.reference.clone().unwrap_or_default(),
        is_discounted: document.has_discount(),
        is_tax_inclusive: true,
        buyer_contact,
        date: legacy_timestamp(issued_at),
        line_items,
        sub_total: float2(document.amount_untaxed),
        total_tax: float2(document.amount_tax),
        total: float2(document.amount_total),
        currency_code: config.currency_code(&document.currency).to_string(),
        is_retry: document.fiscal.retry_count() > 0,
    })
}

/// `street, street2, city, zip, province, country`, empty parts skipped.
pub fn flat_address(partner: &Partner) -> String {
    [
        &partner.street,
        &partner.street2,
        &partner.city,
        &partner.zip,
        &partner.province,
        &partner.country,
    ]
    .into_iter()
    .filter_map(|part| part.as_deref())
    .filter(|part| !part.is_empty())
    .collect::<Vec<_>>()
    .join(", ")
}
