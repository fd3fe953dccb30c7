//! Fiscal integration profile: connection settings, mapping tables and
//! automation flags, one profile per company.

mod profile;
mod tax;
mod validate;

pub use profile::{ConfigError, FiscalConfig, FiscalConfigBuilder, SchemaVersion};
pub use tax::{CurrencyMapping, TaxMapping, TaxPreset, TaxType};
pub use validate::validate_config;
