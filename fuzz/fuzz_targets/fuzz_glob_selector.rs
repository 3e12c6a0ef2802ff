//! Fuzz target for glob-based file selection.
//!
//! Goal: building a selector and matching paths should **never panic**.
//! Invalid patterns may be rejected with an error.
//!
//! Run with:
//! ```bash
//! cargo +nightly fuzz run fuzz_glob_selector
//! ```

#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use muleguard_domain::select::PathSelector;

#[derive(Arbitrary, Debug)]
struct GlobInput {
    /// Include patterns (e.g., "src/main/mule/**/*.xml")
    include: Vec<String>,
    /// Exclude patterns
    exclude: Vec<String>,
    /// Project-relative candidate paths
    candidates: Vec<String>,
}

fuzz_target!(|input: GlobInput| {
    if input.include.len() > 20 || input.exclude.len() > 20 || input.candidates.len() > 100 {
        return;
    }
    let include: Vec<String> = input.include.into_iter().filter(|p| p.len() <= 256).collect();
    let exclude: Vec<String> = input.exclude.into_iter().filter(|p| p.len() <= 256).collect();

    let Ok(selector) = PathSelector::new(&include, &exclude) else {
        return;
    };
    for candidate in input.candidates.iter().filter(|c| c.len() <= 512) {
        let _ = selector.is_match(candidate);
    }
    let _ = selector.describe();
});
