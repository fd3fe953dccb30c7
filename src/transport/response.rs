//! Interpretation of fiscal API responses.

use serde::{Deserialize, Deserializer};

use super::TransportResponse;
use crate::core::FiscalError;

/// Data extracted from an accepted submission.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Acceptance {
    /// `"{InvoiceNumber}/{FiscalDay}"` (v2) or the receipt number (legacy).
    pub fiscal_number: String,
    pub qr_code: Option<String>,
    pub verification_url: Option<String>,
    /// Base64 PDF bytes or a reference token for later retrieval.
    pub pdf: Option<String>,
}

/// One element of the v2 response array.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct V2Item {
    #[serde(default, deserialize_with = "string_or_number")]
    fiscal_day: Option<String>,
    #[serde(default, deserialize_with = "string_or_number")]
    invoice_number: Option<String>,
    #[serde(default)]
    qr_data: Option<String>,
    #[serde(default)]
    verification_url: Option<String>,
    #[serde(default)]
    fiscal_invoice_pdf: Option<String>,
    #[serde(default)]
    error: Option<String>,
    #[serde(default, deserialize_with = "string_or_number")]
    request_id: Option<String>,
}

/// Legacy single-object response.
#[derive(Debug, Deserialize)]
struct LegacyBody {
    #[serde(default, deserialize_with = "string_or_number")]
    fiscal_number: Option<String>,
    #[serde(default, rename = "receiptNumber", deserialize_with = "string_or_number")]
    receipt_number: Option<String>,
    #[serde(default)]
    qr_code: Option<String>,
    #[serde(default)]
    verification_url: Option<String>,
}

/// Interpret a v2 response.
///
/// Success iff the body is a non-empty JSON array whose first element has
/// an empty or absent `Error`.
pub fn parse_v2_response(response: &TransportResponse) -> Result<Acceptance, FiscalError> {
    if !response.is_success() {
        return Err(FiscalError::Transport(format!(
            "HTTP {}: {}",
            response.status, response.body
        )));
    }

    let items: Vec<V2Item> = serde_json::from_str(&response.body)
        .map_err(|e| FiscalError::Transport(format!("malformed response: {e}")))?;
    let first = items
        .into_iter()
        .next()
        .ok_or_else(|| FiscalError::Transport("empty response from fiscal API".into()))?;

    if let Some(message) = first.error.filter(|e| !e.trim().is_empty()) {
        return Err(FiscalError::AuthorityRejected {
            message,
            request_id: first.request_id.filter(|r| !r.is_empty()),
        });
    }

    // Acceptance does not depend on the receipt fields; absent parts are
    // left out of the number.
    let fiscal_number = [first.invoice_number, first.fiscal_day]
        .into_iter()
        .flatten()
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("/");

    Ok(Acceptance {
        fiscal_number,
        qr_code: first.qr_data.filter(|q| !q.is_empty()),
        verification_url: first.verification_url.filter(|u| !u.is_empty()),
        pdf: first.fiscal_invoice_pdf.filter(|p| !p.is_empty()),
    })
}

/// Interpret a legacy response: HTTP 200 with a JSON object carrying
/// `fiscal_number` (or `receiptNumber`), `qr_code`, `verification_url`.
pub fn parse_legacy_response(response: &TransportResponse) -> Result<Acceptance, FiscalError> {
    if response.status != 200 {
        return Err(FiscalError::Transport(format!(
            "HTTP {}: {}",
            response.status, response.body
        )));
    }

    let body: LegacyBody = serde_json::from_str(&response.body)
        .map_err(|e| FiscalError::Transport(format!("malformed response: {e}")))?;
    let fiscal_number = body
        .fiscal_number
        .or(body.receipt_number)
        .filter(|n| !n.is_empty())
        .ok_or_else(|| FiscalError::Transport("response is missing fiscal_number".into()))?;

    Ok(Acceptance {
        fiscal_number,
        qr_code: body.qr_code,
        verification_url: body.verification_url,
        pdf: None,
    })
}

/// Interpret a PDF retrieval response: a JSON string is base64 PDF data,
/// a JSON number is a failure status code.
pub fn parse_pdf_response(response: &TransportResponse) -> Result<String, FiscalError> {
    if !response.is_success() {
        return Err(FiscalError::Transport(format!(
            "HTTP {}: {}",
            response.status, response.body
        )));
    }
    match serde_json::from_str::<serde_json::Value>(&response.body) {
        Ok(serde_json::Value::String(data)) => Ok(data),
        Ok(serde_json::Value::Number(code)) => Err(FiscalError::PdfUnavailable(
            code.as_i64().unwrap_or_default(),
        )),
        Ok(other) => Err(FiscalError::Transport(format!(
            "unexpected PDF response: {other}"
        ))),
        Err(e) => Err(FiscalError::Transport(format!("malformed response: {e}"))),
    }
}

fn string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::String(s)) => Some(s),
        Some(serde_json::Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}
