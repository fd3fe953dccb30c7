#![no_main]

use libfuzzer_sys::fuzz_target;
use zimra_fiscal::payload::parse_tax_identifiers;

fuzz_target!(|data: &[u8]| {
    if let Ok(s) = std::str::from_utf8(data) {
        let ids = parse_tax_identifiers(s);
        // Extracted values always come from the input.
        assert!(ids.tin.is_empty() || s.contains(ids.tin.as_str()));
        assert!(ids.vat.is_empty() || s.contains(ids.vat.as_str()));
    }
});
