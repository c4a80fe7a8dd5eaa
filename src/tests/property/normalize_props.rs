//! Property-based tests for query normalization
//!
//! Tests invariants:
//! - normalize(normalize(x)) == normalize(x)
//! - Output is lowercase, accent-free, trimmed, single-spaced
//! - Accent/case-insensitive matchers accept the text they were built from

use proptest::prelude::*;

use crate::core::directory::normalize::{exact_regex, like_regex, normalize};

// ============================================================================
// Strategies for generating test inputs
// ============================================================================

/// Spanish-ish text with accents, ñ, digits and irregular whitespace
fn arb_query() -> impl Strategy<Value = String> {
    "[a-zA-ZáéíóúÁÉÍÓÚñÑüÜ0-9 \t]{0,40}"
}

/// A single word without whitespace
fn arb_word() -> impl Strategy<Value = String> {
    "[a-zA-ZáéíóúÁÉÍÓÚñÑüÜ0-9]{1,20}"
}

// ============================================================================
// Properties
// ============================================================================

proptest! {
    #[test]
    fn normalize_is_idempotent(text in arb_query()) {
        let once = normalize(&text);
        prop_assert_eq!(normalize(&once), once);
    }

    #[test]
    fn normalize_output_is_folded(text in arb_query()) {
        let folded = normalize(&text);

        prop_assert!(!folded.starts_with(' '));
        prop_assert!(!folded.ends_with(' '));
        prop_assert!(!folded.contains("  "));
        prop_assert!(!folded.contains('\t'));
        prop_assert!(folded.chars().all(|c| !c.is_uppercase()));
        prop_assert!(folded.chars().all(|c| c.is_ascii()));
    }

    #[test]
    fn normalize_ignores_case_and_accents(word in arb_word()) {
        prop_assert_eq!(normalize(&word.to_uppercase()), normalize(&word));
    }

    #[test]
    fn like_regex_matches_literal_and_folded(word in arb_word()) {
        let re = like_regex(&word).unwrap();
        prop_assert!(re.is_match(&word));
        prop_assert!(re.is_match(&normalize(&word)));
        let shouted = format!("Edificio {} anexo", word.to_uppercase());
        prop_assert!(re.is_match(&shouted));
    }

    #[test]
    fn exact_regex_tolerates_spacing(a in arb_word(), b in arb_word()) {
        let re = exact_regex(&format!("{a} {b}")).unwrap();
        let spaced = format!("  {a} \t {b} ");
        prop_assert!(re.is_match(&spaced));
        let folded = normalize(&format!("{a} {b}"));
        prop_assert!(re.is_match(&folded));
        let padded = format!("{a} {b} extra");
        prop_assert!(!re.is_match(&padded));
    }
}
