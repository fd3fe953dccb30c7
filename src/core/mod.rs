//! Core document types, fiscal status, and errors.
//!
//! The host accounting system maps its invoices and credit notes into
//! [`Document`]; the connector only ever touches the [`FiscalRecord`]
//! attached to it.

mod builder;
pub mod currencies;
mod error;
mod status;
mod types;

pub use builder::*;
pub use currencies::{DEFAULT_CURRENCY, is_fiscal_currency_code};
pub use error::*;
pub use status::*;
pub use types::*;
