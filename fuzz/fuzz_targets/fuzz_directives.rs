//! Fuzz target for edit directives.
//!
//! A random program either fails or leaves a document that survives a
//! print and reparse.

#![no_main]

use arbitrary::Arbitrary;
use farm_xml::{Directives, Document};
use libfuzzer_sys::fuzz_target;

#[derive(Debug, Arbitrary)]
enum Step {
    XPath(u8),
    Add(u8),
    AddIf(u8),
    Set(String),
    Attr(u8, String),
    Up,
    Remove,
    Strict(u8),
    Push,
    Pop,
}

const NAMES: [&str; 4] = ["person", "skills", "skill", "link"];
const QUERIES: [&str; 5] = ["/people", "/people/person", "person", "..", "skills/skill"];

fuzz_target!(|steps: Vec<Step>| {
    let mut dirs = Directives::new();
    for step in steps {
        dirs = match step {
            Step::XPath(i) => dirs.xpath(QUERIES[usize::from(i) % QUERIES.len()]),
            Step::Add(i) => dirs.add(NAMES[usize::from(i) % NAMES.len()]),
            Step::AddIf(i) => dirs.add_if(NAMES[usize::from(i) % NAMES.len()]),
            Step::Set(text) => dirs.set(text),
            Step::Attr(i, value) => dirs.attr(NAMES[usize::from(i) % NAMES.len()], value),
            Step::Up => dirs.up(),
            Step::Remove => dirs.remove(),
            Step::Strict(n) => dirs.strict(usize::from(n % 4)),
            Step::Push => dirs.push(),
            Step::Pop => dirs.pop(),
        };
    }
    let mut doc = Document::with_root("people");
    if doc.apply(&dirs).is_ok() {
        let printed = doc.to_string();
        if doc.root_element().is_some() {
            assert!(Document::parse(&printed).is_ok());
        }
    }
});
