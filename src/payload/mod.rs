//! Document → fiscal API request body.
//!
//! # Example
//!
//! ```
//! use chrono::NaiveDate;
//! use rust_decimal_macros::dec;
//! use zimra_fiscal::config::*;
//! use zimra_fiscal::core::*;
//! use zimra_fiscal::payload::{Payload, build};
//!
//! let config = FiscalConfigBuilder::new(1, "https://fdms.example.co.zw/api", "key")
//!     .add_tax_mapping(TaxMapping::from_preset(1, TaxType::StandardRated))
//!     .build()
//!     .unwrap();
//! let invoice = DocumentBuilder::new(7, "INV/2024/0007", DocumentKind::CustomerInvoice)
//!     .date(NaiveDate::from_ymd_opt(2024, 6, 15).unwrap())
//!     .add_line(LineItemBuilder::new("Consulting", dec!(1), dec!(100)).tax(1, dec!(15)).build())
//!     .build()
//!     .unwrap();
//!
//! let Payload::Invoice(body) = build(&invoice, &config).unwrap() else { unreachable!() };
//! assert_eq!(body.total, "115.00");
//! assert_eq!(body.line_items[0].quantity, "1.000");
//! ```

mod build;
pub mod format;
mod schema;
mod tin;

pub use build::{WALK_IN_CUSTOMER, build, build_at, flat_address};
pub use schema::*;
pub use tin::{TIN_LENGTH, TaxIdentifiers, VAT_LENGTH, parse_tax_identifiers, partner_identifiers};
