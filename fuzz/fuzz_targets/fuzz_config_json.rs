#![no_main]

use libfuzzer_sys::fuzz_target;
use zimra_fiscal::config::FiscalConfig;

fuzz_target!(|data: &[u8]| {
    if let Ok(s) = std::str::from_utf8(data) {
        if let Ok(config) = FiscalConfig::from_json(s) {
            let _ = config.endpoint_url("invoice");
        }
    }
});
