//! Fuzz target for XPath compilation and evaluation.
//!
//! Arbitrary queries must be rejected or evaluated without panicking.

#![no_main]

use farm_xml::Document;
use libfuzzer_sys::fuzz_target;

const PEOPLE: &str = r#"<people>
  <person id="yegor256"><reputation>512</reputation><links><link rel="github" href="yegor256"/></links></person>
  <person id="jeff"><mentor>yegor256</mentor><reputation>7</reputation><skills><skill>rust</skill></skills></person>
</people>"#;

fuzz_target!(|data: &[u8]| {
    let Ok(query) = std::str::from_utf8(data) else {
        return;
    };
    if farm_xml::XPath::compile(query).is_err() {
        return;
    }
    let Ok(doc) = Document::parse(PEOPLE) else {
        return;
    };
    let _ = doc.xpath(query);
});
