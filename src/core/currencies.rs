//! Currency codes accepted by the fiscal device API.
//!
//! The authority accepts the local currencies plus the foreign currencies
//! that are legal tender in multi-currency trading.

/// Currency reported when a document's currency has no mapping.
pub const DEFAULT_CURRENCY: &str = "USD";

/// Check whether `code` is a currency code the authority accepts.
pub fn is_fiscal_currency_code(code: &str) -> bool {
    FISCAL_CURRENCY_CODES.binary_search(&code).is_ok()
}

/// Sorted for binary search.
static FISCAL_CURRENCY_CODES: &[&str] = &[
    "AUD", // Australian Dollar
    "BWP", // Botswana Pula
    "CNY", // Chinese Yuan
    "EUR", // Euro
    "GBP", // Pound Sterling
    "INR", // Indian Rupee
    "JPY", // Japanese Yen
    "USD", // US Dollar
    "ZAR", // South African Rand
    "ZWG", // Zimbabwe Gold
    "ZWL", // Zimbabwe Dollar (legacy)
];
