#![no_main]

use libfuzzer_sys::fuzz_target;
use zimra_fiscal::fiscal::decode_pdf;
use zimra_fiscal::transport::{TransportResponse, parse_pdf_response};

fuzz_target!(|data: &[u8]| {
    if let Ok(s) = std::str::from_utf8(data) {
        if let Ok(encoded) = parse_pdf_response(&TransportResponse::new(200, s)) {
            let _ = decode_pdf(&encoded);
        }
        let _ = decode_pdf(s);
    }
});
