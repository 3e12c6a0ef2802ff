//! Fuzz target for the `.properties` parser.
//!
//! Goal: parsing arbitrary text with any delimiter should **never panic**.
//!
//! Run with:
//! ```bash
//! cargo +nightly fuzz run fuzz_properties
//! ```

#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use muleguard_domain::properties::Properties;

#[derive(Arbitrary, Debug)]
struct PropertiesInput {
    text: String,
    delimiter: String,
    lookup: String,
}

fuzz_target!(|input: PropertiesInput| {
    if input.text.len() > 64 * 1024 || input.delimiter.len() > 8 {
        return;
    }

    let parsed = Properties::parse(&input.text);
    let _ = parsed.get(&input.lookup);
    let _ = parsed.get_ignore_case(&input.lookup);

    if !input.delimiter.is_empty() {
        let custom = Properties::parse_with_delimiter(&input.text, &input.delimiter);
        let _ = custom.iter().count();
    }
});
