//! Fuzz target for the XML parser.
//!
//! Any document that parses must print to text that parses again.

#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let text = String::from_utf8_lossy(data);
    if let Ok(doc) = farm_xml::Document::parse(&text) {
        let printed = doc.to_string();
        assert!(farm_xml::Document::parse(&printed).is_ok());
    }
});
