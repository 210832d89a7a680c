//! Fuzz target for cash amounts.
//!
//! Any amount that parses must print to text that parses back to itself.

#![no_main]

use farm_pmo::Cash;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };
    if let Ok(cash) = text.parse::<Cash>() {
        let back: Cash = cash.to_string().parse().expect("printed cash parses");
        assert_eq!(back, cash);
    }
});
