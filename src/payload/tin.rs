//! Taxpayer identifier parsing.
//!
//! Partners often carry a single free-form identifier such as
//! `"TIN:2000123456 VAT:220012345"`. The fiscal API wants the TIN and the
//! VAT registration number as separate fields.

use std::sync::OnceLock;

use regex::Regex;

use crate::core::Partner;

/// Length of a ZIMRA taxpayer identification number.
pub const TIN_LENGTH: usize = 10;
/// Length of a ZIMRA VAT registration number.
pub const VAT_LENGTH: usize = 9;

static LABELLED: OnceLock<Regex> = OnceLock::new();

fn labelled() -> &'static Regex {
    LABELLED.get_or_init(|| {
        Regex::new(r"(?i)\b(TIN|VAT)(?:\s*(?:NO|NUMBER|#)\.?)?\s*[:=#-]?\s*([0-9][A-Za-z0-9]*)")
            .expect("static regex")
    })
}

/// TIN and VAT number split out of a partner record.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaxIdentifiers {
    pub tin: String,
    pub vat: String,
}

/// Split a combined identifier string.
///
/// Labelled tokens (`TIN`, `VAT`, optionally followed by `No`/`Number` and
/// a `:`/`=`/`#`/`-` separator) win. An unlabelled value is classified by
/// length: 10 digits is a TIN, 9 digits a VAT number; anything else is
/// passed through as the TIN.
pub fn parse_tax_identifiers(raw: &str) -> TaxIdentifiers {
    let raw = raw.trim();
    let mut ids = TaxIdentifiers::default();
    let mut found_label = false;

    for caps in labelled().captures_iter(raw) {
        found_label = true;
        let value = caps[2].to_string();
        if caps[1].eq_ignore_ascii_case("TIN") {
            if ids.tin.is_empty() {
                ids.tin = value;
            }
        } else if ids.vat.is_empty() {
            ids.vat = value;
        }
    }

    if found_label || raw.is_empty() {
        return ids;
    }

    let all_digits = raw.chars().all(|c| c.is_ascii_digit());
    if all_digits && raw.len() == VAT_LENGTH {
        ids.vat = raw.to_string();
    } else {
        ids.tin = raw.to_string();
    }
    ids
}

/// Identifiers for a partner: structured fields first, then whatever the
/// combined `vat` string yields for the missing ones.
pub fn partner_identifiers(partner: &Partner) -> TaxIdentifiers {
    let parsed = partner
        .vat
        .as_deref()
        .map(parse_tax_identifiers)
        .unwrap_or_default();
    TaxIdentifiers {
        tin: non_empty(partner.tin.as_deref()).unwrap_or(parsed.tin),
        vat: non_empty(partner.vat_number.as_deref()).unwrap_or(parsed.vat),
    }
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}
