//! Check evaluation engine (no network, read-only over the project tree).
//!
//! Input: an ordered rule list and a project root.
//! Output: a [`muleguard_types::ValidationReport`] with one verdict per rule.
//!
//! Layers, leaves first: file selection, token matching, property resolution and version
//! comparison; the five matcher families in [`checks`]; the [`dispatch`] registry; the
//! engine that ties them together ([`Plan`], [`evaluate`]).

#![forbid(unsafe_code)]

pub mod checks;
pub mod context;
pub mod dispatch;
pub mod pom;
pub mod properties;
pub mod resolve;
pub mod select;
pub mod token;
pub mod version;
pub mod xml;

mod engine;

#[cfg(test)]
mod proptest;
#[cfg(test)]
mod test_support;

pub use dispatch::{DispatchError, Matcher, dispatch};
pub use engine::{EngineOptions, Plan, evaluate};
