#![no_main]

use libfuzzer_sys::fuzz_target;
use tomlet::{parse, parse_slice};

fuzz_target!(|input: &[u8]| {
    let _ = parse_slice(input);
    if let Ok(text) = std::str::from_utf8(input) {
        let _ = parse(text);
    }
});
