//! Property-based tests for the domain crate.
//!
//! These tests use proptest to verify invariants around:
//! - Version comparison ordering laws
//! - Glob selection of nested paths
//! - Placeholder resolution
//! - Token matching and forbidden/required semantics
//! - Parsers that must never panic on arbitrary input

use crate::properties::Properties;
use crate::resolve::{PropertyResolver, Resolution};
use crate::select::PathSelector;
use crate::test_support::{TempProject, run_check};
use crate::token::{MatchMode, TokenMatcher};
use crate::version::{compare, is_at_least};
use crate::xml::XPath;
use proptest::prelude::*;
use serde_json::json;
use std::cmp::Ordering;

// ============================================================================
// Strategies
// ============================================================================

/// Dotted versions, optionally with a qualifier on the last segment.
fn arb_version() -> impl Strategy<Value = String> {
    (
        prop::collection::vec(0u32..200, 1..5),
        prop_oneof![Just(""), Just("-SNAPSHOT"), Just("-rc1")],
    )
        .prop_map(|(parts, suffix)| {
            let dotted: Vec<String> = parts.iter().map(u32::to_string).collect();
            format!("{}{suffix}", dotted.join("."))
        })
}

fn arb_segment() -> impl Strategy<Value = String> {
    prop::string::string_regex("[a-z][a-z0-9_-]{0,11}").unwrap()
}

fn arb_dir_path() -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec(arb_segment(), 0..4)
}

fn arb_key() -> impl Strategy<Value = String> {
    prop::string::string_regex("[a-z][a-z0-9]{0,8}(\\.[a-z][a-z0-9]{0,8}){0,2}").unwrap()
}

/// Property values that are not themselves placeholders.
fn arb_plain_value() -> impl Strategy<Value = String> {
    prop::string::string_regex("[A-Za-z0-9_./:-]{0,20}").unwrap()
}

fn arb_token() -> impl Strategy<Value = String> {
    prop::string::string_regex("[A-Za-z][A-Za-z0-9]{0,7}").unwrap()
}

fn arb_lower_token() -> impl Strategy<Value = String> {
    prop::string::string_regex("[a-z]{1,8}").unwrap()
}

// ============================================================================
// Version comparison
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn version_compare_is_reflexive(v in arb_version()) {
        prop_assert_eq!(compare(&v, &v), Ordering::Equal);
        prop_assert!(is_at_least(&v, &v));
    }

    #[test]
    fn version_compare_is_antisymmetric(a in arb_version(), b in arb_version()) {
        prop_assert_eq!(compare(&a, &b), compare(&b, &a).reverse());
    }

    #[test]
    fn version_compare_is_transitive(a in arb_version(), b in arb_version(), c in arb_version()) {
        let mut sorted = [a, b, c];
        sorted.sort_by(|x, y| compare(x, y));
        prop_assert_ne!(compare(&sorted[0], &sorted[1]), Ordering::Greater);
        prop_assert_ne!(compare(&sorted[1], &sorted[2]), Ordering::Greater);
        prop_assert_ne!(compare(&sorted[0], &sorted[2]), Ordering::Greater);
    }

    #[test]
    fn trailing_zero_segments_do_not_change_order(parts in prop::collection::vec(0u32..200, 1..4)) {
        let dotted: Vec<String> = parts.iter().map(u32::to_string).collect();
        let bare = dotted.join(".");
        let padded = format!("{bare}.0.0");
        prop_assert_eq!(compare(&bare, &padded), Ordering::Equal);
    }
}

// ============================================================================
// Glob selection
// ============================================================================

proptest! {
    #[test]
    fn double_star_matches_any_depth(dirs in arb_dir_path(), name in arb_segment()) {
        let selector = PathSelector::new(&["**/*.xml".to_string()], &[]).unwrap();
        let mut parts = dirs.clone();
        parts.push(format!("{name}.xml"));
        prop_assert!(selector.is_match(&parts.join("/")));

        let mut other = dirs;
        other.push(format!("{name}.txt"));
        prop_assert!(!selector.is_match(&other.join("/")));
    }

    #[test]
    fn single_star_stays_within_one_segment(dir in arb_segment(), name in arb_segment()) {
        let selector = PathSelector::new(&["src/*.xml".to_string()], &[]).unwrap();
        let direct = format!("src/{name}.xml");
        let nested = format!("src/{dir}/{name}.xml");
        prop_assert!(selector.is_match(&direct));
        prop_assert!(!selector.is_match(&nested));
    }

    #[test]
    fn exclusions_always_win(dirs in arb_dir_path(), name in arb_segment()) {
        let selector =
            PathSelector::new(&["**/*.xml".to_string()], &["**/*.xml".to_string()]).unwrap();
        let mut parts = dirs;
        parts.push(format!("{name}.xml"));
        prop_assert!(!selector.is_match(&parts.join("/")));
    }
}

// ============================================================================
// Placeholder resolution
// ============================================================================

proptest! {
    #[test]
    fn resolving_a_resolved_value_is_a_no_op(key in arb_key(), value in arb_plain_value()) {
        let resolver = PropertyResolver::from_pairs([(key.clone(), value.clone())]);

        for raw in [format!("${{{key}}}"), format!("#[p('{key}')]"), format!("#[p(\"{key}\")]")] {
            let first = resolver.resolve(&raw);
            prop_assert_eq!(first.value(), Some(value.as_str()));
            let second = resolver.resolve(&value);
            prop_assert_eq!(second, Resolution::Literal(value.clone()));
        }
    }

    #[test]
    fn missing_keys_are_reported_unresolved(key in arb_key()) {
        let resolver = PropertyResolver::default();
        let resolved = resolver.resolve(&format!("${{{key}}}"));
        prop_assert_eq!(resolved, Resolution::Unresolved { key });
    }
}

// ============================================================================
// Token matching
// ============================================================================

proptest! {
    #[test]
    fn substring_match_agrees_with_contains(token in arb_token(), content in "[ -~]{0,60}") {
        let sensitive = TokenMatcher::new(&token, MatchMode::Substring, true, None);
        prop_assert_eq!(sensitive.is_match(&content), content.contains(&token));

        let insensitive = TokenMatcher::new(&token, MatchMode::Substring, false, None);
        prop_assert_eq!(
            insensitive.is_match(&content),
            content.to_lowercase().contains(&token.to_lowercase())
        );
    }

    #[test]
    fn forbidden_and_required_modes_are_complementary_for_one_token(
        token in arb_lower_token(),
        body in "[a-z ]{0,40}",
        present in any::<bool>(),
    ) {
        let project = TempProject::new();
        let content = if present { format!("{body}{token}") } else { body };
        project.write("src/main/mule/flow.xml", &content);

        let params = json!({ "filePatterns": ["src/main/mule/*.xml"], "tokens": [token] });
        let forbidden = run_check(&project, "GENERIC_TOKEN_SEARCH_FORBIDDEN", params.clone());
        let required = run_check(&project, "GENERIC_TOKEN_SEARCH_REQUIRED", params);

        let found = content.contains(&token);
        prop_assert_eq!(forbidden.passed, !found);
        prop_assert_eq!(required.passed, found);
    }
}

// ============================================================================
// Parsers never panic
// ============================================================================

proptest! {
    #[test]
    fn properties_parser_never_panics(text in "\\PC{0,200}") {
        let parsed = Properties::parse(&text);
        prop_assert!(parsed.len() <= text.lines().count() + 1);
    }

    #[test]
    fn xpath_parser_never_panics(expr in "[a-z/@*\\[\\]()='\" :|.0-9-]{0,40}") {
        let _ = XPath::parse(&expr);
    }
}
