//! Text normalization and accent-insensitive matchers
//!
//! Every comparison in the directory goes through these helpers:
//! - `normalize` folds user text into a canonical key (no accents, lowercase,
//!   single spaces)
//! - `like_regex` builds a substring matcher for stored fields
//! - `exact_regex` builds an anchored matcher for canonical-name equality
//!
//! The regex builders work on the raw literal so that stored values keep
//! their accents and casing; the accent tolerance lives in the pattern.

use regex::Regex;
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Fold text for matching: lowercase, strip diacritics, collapse whitespace.
///
/// ```
/// use campus_directory::core::directory::normalize::normalize;
///
/// assert_eq!(normalize("  Sala de  CÓMPUTO 5 "), "sala de computo 5");
/// assert_eq!(normalize("Telemática"), "telematica");
/// assert_eq!(normalize(""), "");
/// ```
pub fn normalize(text: &str) -> String {
    let folded: String = text
        .to_lowercase()
        .nfd()
        .filter(|c| !is_combining_mark(*c))
        .collect();

    folded.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Base letter of a single character, lowercased and without diacritics.
fn base_char(c: char) -> char {
    c.to_lowercase()
        .flat_map(|l| l.to_string().nfd().collect::<Vec<_>>())
        .find(|d| !is_combining_mark(*d))
        .unwrap_or(c)
}

/// Regex fragment matching `c` and all of its accented variants.
fn char_class(c: char) -> String {
    match base_char(c) {
        'a' => "[aáàäâãå]".to_string(),
        'e' => "[eéèëê]".to_string(),
        'i' => "[iíìïî]".to_string(),
        'o' => "[oóòöôõ]".to_string(),
        'u' => "[uúùüû]".to_string(),
        'n' => "[nñ]".to_string(),
        'c' => "[cç]".to_string(),
        _ => regex::escape(&c.to_string()),
    }
}

/// Substring matcher that ignores case and accents.
///
/// Returns `None` for empty input; callers treat that as "no constraint".
pub fn like_regex(literal: &str) -> Option<Regex> {
    if literal.trim().is_empty() {
        return None;
    }

    let body: String = literal.chars().map(char_class).collect();
    Regex::new(&format!("(?i){}", body)).ok()
}

/// Like [`like_regex`], but anchored to the start of the field.
pub fn prefix_regex(literal: &str) -> Option<Regex> {
    let trimmed = literal.trim();
    if trimmed.is_empty() {
        return None;
    }

    let body: String = trimmed.chars().map(char_class).collect();
    Regex::new(&format!(r"(?i)^\s*{}", body)).ok()
}

/// Whole-string matcher that ignores case, accents and whitespace width.
///
/// Any whitespace in the literal matches one or more whitespace characters,
/// and leading/trailing whitespace in the target is tolerated.
pub fn exact_regex(literal: &str) -> Option<Regex> {
    let words: Vec<String> = literal
        .split_whitespace()
        .map(|w| w.chars().map(char_class).collect())
        .collect();

    if words.is_empty() {
        return None;
    }

    Regex::new(&format!(r"(?i)^\s*{}\s*$", words.join(r"\s+"))).ok()
}

/// Whole-word matcher for a literal (word-bounded on both ends).
pub fn word_regex(literal: &str) -> Option<Regex> {
    let trimmed = literal.trim();
    if trimmed.is_empty() {
        return None;
    }

    let body: String = trimmed.chars().map(char_class).collect();
    Regex::new(&format!(r"(?i)\b{}\b", body)).ok()
}
