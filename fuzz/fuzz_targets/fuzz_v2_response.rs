#![no_main]

use libfuzzer_sys::fuzz_target;
use zimra_fiscal::transport::{TransportResponse, parse_v2_response};

fuzz_target!(|data: &[u8]| {
    if let Ok(s) = std::str::from_utf8(data) {
        // Must not panic: errors are fine, panics are bugs.
        let _ = parse_v2_response(&TransportResponse::new(200, s));
    }
});
