#![no_main]

use libfuzzer_sys::fuzz_target;
use zimra_fiscal::transport::{TransportResponse, parse_legacy_response};

fuzz_target!(|data: &[u8]| {
    if let Ok(s) = std::str::from_utf8(data) {
        let _ = parse_legacy_response(&TransportResponse::new(200, s));
    }
});
