//! Structured room code extraction
//!
//! Classroom codes look like `L320`, `l-320` or `L 320`: a letter L, an
//! optional separator, and exactly three digits. Stored records are named
//! inconsistently ("Aula L320", "Salón L320", plain "L320"), so a code is
//! expanded into every name it may be stored under.

use once_cell::sync::Lazy;
use regex::Regex;

/// Prefixes a stored room name may carry in front of its code.
pub const CODE_PREFIXES: &[&str] = &["Aula", "Salón", "Salon", "Sala"];

/// Pattern for room codes: "L320", "l-320", "L 320"
static CODE_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\bL[\s-]?(?P<digits>\d{3})\b").expect("Failed to compile room code regex")
});

/// Pattern for a bare room number of 2 to 4 digits: "126", "3104"
static BARE_NUMBER_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b(?P<number>\d{2,4})\b").expect("Failed to compile bare number regex")
});

/// Extract a room code from free text, returned as `"L" + digits`.
///
/// ```
/// use campus_directory::core::directory::code::extract_code;
///
/// assert_eq!(extract_code("aula l-320").as_deref(), Some("L320"));
/// assert_eq!(extract_code("Aula L320").as_deref(), Some("L320"));
/// assert_eq!(extract_code("aula 126"), None);
/// ```
pub fn extract_code(text: &str) -> Option<String> {
    CODE_PATTERN
        .captures(text)
        .and_then(|caps| caps.name("digits"))
        .map(|digits| format!("L{}", digits.as_str()))
}

/// Every name a record for `code` might be stored under.
pub fn expand_variants(code: &str) -> Vec<String> {
    let code = code.trim();
    if code.is_empty() {
        return Vec::new();
    }

    CODE_PREFIXES
        .iter()
        .map(|prefix| format!("{} {}", prefix, code))
        .chain(std::iter::once(code.to_string()))
        .collect()
}

/// Loose matcher for a code inside a longer field ("Antiguo salón l-320").
pub fn loose_code_regex(code: &str) -> Option<Regex> {
    let digits = code.trim().trim_start_matches(['L', 'l']);
    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }

    Regex::new(&format!(r"(?i)\bL[\s-]?{}\b", digits)).ok()
}

/// First standalone 2-4 digit number in the text.
pub fn extract_number(text: &str) -> Option<String> {
    BARE_NUMBER_PATTERN
        .captures(text)
        .and_then(|caps| caps.name("number"))
        .map(|m| m.as_str().to_string())
}
