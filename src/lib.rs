//! # zimra-fiscal
//!
//! Fiscalization connector for the Zimbabwe Revenue Authority (ZIMRA)
//! fiscal device gateway: turns posted customer invoices and credit notes
//! into fiscal API requests, submits them, and records the fiscal number,
//! QR data and fiscal PDF returned by the authority.
//!
//! All monetary values use [`rust_decimal::Decimal`] until they are
//! rendered into a request body.
//!
//! ## Quick Start
//!
//! ```rust
//! use chrono::NaiveDate;
//! use rust_decimal_macros::dec;
//! use zimra_fiscal::config::*;
//! use zimra_fiscal::core::*;
//! use zimra_fiscal::payload::{Payload, build};
//!
//! let config = FiscalConfigBuilder::new(1, "https://fdms.example.co.zw/api", "secret")
//!     .add_tax_mapping(TaxMapping::from_preset(1, TaxType::StandardRated))
//!     .build()
//!     .unwrap();
//!
//! let invoice = DocumentBuilder::new(1, "INV/2024/0001", DocumentKind::CustomerInvoice)
//!     .posted()
//!     .date(NaiveDate::from_ymd_opt(2024, 6, 15).unwrap())
//!     .partner(PartnerBuilder::new("Acme (Pvt) Ltd").vat("TIN: 2000123456").build())
//!     .add_line(LineItemBuilder::new("Consulting", dec!(2), dec!(50)).tax(1, dec!(15)).build())
//!     .build()
//!     .unwrap();
//!
//! assert!(zimra_fiscal::fiscal::should_fiscalize(&invoice));
//! let Payload::Invoice(body) = build(&invoice, &config).unwrap() else { unreachable!() };
//! assert_eq!(body.total, "115.00");
//! assert_eq!(body.buyer_contact.tin, "2000123456");
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Description |
//! |---------|-------------|
//! | `http` (default) | Blocking `reqwest` transport ([`transport::HttpTransport`]) |

pub mod config;
pub mod core;
pub mod fiscal;
pub mod payload;
pub mod transport;

// Re-export core types at crate root for convenience
pub use crate::core::*;
