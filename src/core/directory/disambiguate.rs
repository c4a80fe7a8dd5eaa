//! Disambiguation of overloaded short tokens
//!
//! Some abbreviations are ambiguous in a way a flat synonym table cannot
//! express: "sd" means Sistemas Digitales I unless a trailing "2"/"II" says
//! otherwise, and "tt" only names a lab when paired with a domain word.
//! These rules run before the synonym scan so shorter generic keys never
//! shadow them.
//!
//! All resolvers take text that already went through `normalize`.

use regex::Regex;
use serde::{Deserialize, Serialize};

use super::error::{DirectoryError, DirectoryResult};

/// Build a word-bounded alternation from plain (normalized) terms.
///
/// Longer terms come first so "telematica" is preferred over "tele"; inner
/// whitespace matches any run of whitespace.
fn alternation(terms: &[String]) -> String {
    let mut sorted: Vec<&String> = terms.iter().filter(|t| !t.trim().is_empty()).collect();
    sorted.sort_by_key(|t| std::cmp::Reverse(t.chars().count()));

    let parts: Vec<String> = sorted
        .iter()
        .map(|t| {
            t.split_whitespace()
                .map(regex::escape)
                .collect::<Vec<_>>()
                .join(r"\s+")
        })
        .collect();

    format!("(?:{})", parts.join("|"))
}

fn compile(pattern: &str) -> DirectoryResult<Regex> {
    Regex::new(pattern)
        .map_err(|e| DirectoryError::config(format!("invalid pattern {pattern}: {e}")))
}

/// Source definition of a numbered family.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FamilySource {
    /// Base tokens, e.g. `["sd", "sistemas digitales"]`
    pub tokens: Vec<String>,
    /// Canonical for the bare token and for "I"/"1"
    pub first: String,
    /// Canonical for "II"/"2"
    pub second: String,
}

/// Source definition of a compound (marker AND domain) rule.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CompoundSource {
    pub canonical: String,
    pub markers: Vec<String>,
    pub domains: Vec<String>,
}

/// Resolver for a token family with a roman/arabic numeral suffix.
#[derive(Clone, Debug)]
pub struct NumberedFamily {
    second_pattern: Regex,
    first_pattern: Regex,
    bare_pattern: Regex,
    first: String,
    second: String,
}

impl NumberedFamily {
    pub fn new(tokens: &[String], first: &str, second: &str) -> DirectoryResult<Self> {
        if tokens.iter().all(|t| t.trim().is_empty()) {
            return Err(DirectoryError::config(format!(
                "numbered family for '{first}' has no tokens"
            )));
        }

        let base = alternation(tokens);
        Ok(Self {
            second_pattern: compile(&format!(r"\b{base}\s*(?:ii|2)\b"))?,
            first_pattern: compile(&format!(r"\b{base}\s*(?:i|1)\b"))?,
            bare_pattern: compile(&format!(r"\b{base}\b"))?,
            first: first.to_string(),
            second: second.to_string(),
        })
    }

    pub fn from_source(source: &FamilySource) -> DirectoryResult<Self> {
        Self::new(&source.tokens, &source.first, &source.second)
    }

    /// "token II/2" first, then "token I/1", then the bare token.
    pub fn resolve(&self, normalized: &str) -> Option<&str> {
        if self.second_pattern.is_match(normalized) {
            Some(self.second.as_str())
        } else if self.first_pattern.is_match(normalized)
            || self.bare_pattern.is_match(normalized)
        {
            Some(self.first.as_str())
        } else {
            None
        }
    }
}

/// Two-clause rule: both a marker and a domain term must appear.
#[derive(Clone, Debug)]
pub struct CompoundRule {
    marker: Regex,
    domain: Regex,
    canonical: String,
}

impl CompoundRule {
    pub fn new(markers: &[String], domains: &[String], canonical: &str) -> DirectoryResult<Self> {
        if markers.is_empty() || domains.is_empty() {
            return Err(DirectoryError::config(format!(
                "compound rule for '{canonical}' needs markers and domains"
            )));
        }

        Ok(Self {
            marker: compile(&format!(r"\b{}\b", alternation(markers)))?,
            domain: compile(&format!(r"\b{}\b", alternation(domains)))?,
            canonical: canonical.to_string(),
        })
    }

    pub fn from_source(source: &CompoundSource) -> DirectoryResult<Self> {
        Self::new(&source.markers, &source.domains, &source.canonical)
    }

    pub fn resolve(&self, normalized: &str) -> Option<&str> {
        (self.marker.is_match(normalized) && self.domain.is_match(normalized))
            .then_some(self.canonical.as_str())
    }
}

/// Ordered set of special-case resolvers for one record kind.
#[derive(Clone, Debug, Default)]
pub struct Disambiguator {
    compounds: Vec<CompoundRule>,
    families: Vec<NumberedFamily>,
}

impl Disambiguator {
    pub fn new(compounds: Vec<CompoundRule>, families: Vec<NumberedFamily>) -> Self {
        Self {
            compounds,
            families,
        }
    }

    pub fn from_sources(
        compounds: &[CompoundSource],
        families: &[FamilySource],
    ) -> DirectoryResult<Self> {
        Ok(Self {
            compounds: compounds
                .iter()
                .map(CompoundRule::from_source)
                .collect::<DirectoryResult<_>>()?,
            families: families
                .iter()
                .map(NumberedFamily::from_source)
                .collect::<DirectoryResult<_>>()?,
        })
    }

    /// Compound rules are the most specific and are tried first.
    pub fn resolve(&self, normalized: &str) -> Option<&str> {
        self.compounds
            .iter()
            .find_map(|rule| rule.resolve(normalized))
            .or_else(|| self.families.iter().find_map(|family| family.resolve(normalized)))
    }

    pub fn is_empty(&self) -> bool {
        self.compounds.is_empty() && self.families.is_empty()
    }
}
