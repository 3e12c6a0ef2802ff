//! Dotted version comparison.
//!
//! Each `.`-separated segment contributes its leading ASCII digits as a number (0 when there are
//! none); missing segments count as 0. `1.10 > 1.9`, `2 == 2.0.0`, `4.1.0-SNAPSHOT == 4.1.0`.

use std::cmp::Ordering;

pub fn compare(a: &str, b: &str) -> Ordering {
    let left: Vec<u64> = segments(a);
    let right: Vec<u64> = segments(b);
    let len = left.len().max(right.len());
    for i in 0..len {
        let l = left.get(i).copied().unwrap_or(0);
        let r = right.get(i).copied().unwrap_or(0);
        match l.cmp(&r) {
            Ordering::Equal => continue,
            other => return other,
        }
    }
    Ordering::Equal
}

pub fn is_at_least(actual: &str, minimum: &str) -> bool {
    compare(actual, minimum) != Ordering::Less
}

fn segments(v: &str) -> Vec<u64> {
    v.trim().split('.').map(leading_number).collect()
}

fn leading_number(segment: &str) -> u64 {
    segment
        .bytes()
        .take_while(u8::is_ascii_digit)
        .fold(0u64, |acc, d| acc.saturating_mul(10).saturating_add(u64::from(d - b'0')))
}
