//! Synonym Index for Canonical Name Detection
//!
//! Maps informal spellings ("sc5", "biblio", "lab de redes") onto the one
//! canonical name a record is stored under. Keys are folded through
//! [`normalize`] so lookups ignore case, accents and whitespace width.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::normalize::normalize;

/// One canonical name and the informal strings that should resolve to it.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SynonymGroup {
    pub canonical: String,
    #[serde(default)]
    pub synonyms: Vec<String>,
}

impl SynonymGroup {
    pub fn new(canonical: &str, synonyms: &[&str]) -> Self {
        Self {
            canonical: canonical.to_string(),
            synonyms: synonyms.iter().map(|s| s.to_string()).collect(),
        }
    }
}

/// Declarative family of numbered synonyms.
///
/// `template` and every entry of `variants` use `{n}` as the number
/// placeholder:
///
/// ```toml
/// template = "Sala de Cómputo {n}"
/// start = 1
/// end = 20
/// variants = ["sc{n}", "sc {n}", "sala {n}"]
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NumberedSynonyms {
    pub template: String,
    pub start: u32,
    pub end: u32,
    #[serde(default)]
    pub variants: Vec<String>,
}

impl NumberedSynonyms {
    pub fn new(template: &str, start: u32, end: u32, variants: &[&str]) -> Self {
        Self {
            template: template.to_string(),
            start,
            end,
            variants: variants.iter().map(|v| v.to_string()).collect(),
        }
    }

    /// Emit one synonym group per number in `start..=end`.
    pub fn expand(&self) -> Vec<SynonymGroup> {
        (self.start..=self.end)
            .map(|n| {
                let number = n.to_string();
                SynonymGroup {
                    canonical: self.template.replace("{n}", &number),
                    synonyms: self
                        .variants
                        .iter()
                        .map(|v| v.replace("{n}", &number))
                        .collect(),
                }
            })
            .collect()
    }
}

/// Normalized-key → canonical-name index.
///
/// Built once at startup and read-only afterwards. Insertion order is kept
/// (ties during detection resolve to the earlier entry), and a precomputed
/// scan order tries longer keys first so that "sc10" is never shadowed by
/// "sc1".
#[derive(Clone, Debug, Default)]
pub struct SynonymIndex {
    entries: IndexMap<String, String>,
    scan_order: Vec<usize>,
}

impl SynonymIndex {
    /// Build the index from synonym groups.
    ///
    /// Both the canonical name and every synonym are inserted. When two
    /// different canonical names claim the same key the later group wins and
    /// a data-quality warning is logged.
    pub fn build(groups: &[SynonymGroup]) -> Self {
        let mut entries: IndexMap<String, String> = IndexMap::new();

        for group in groups {
            let keys = std::iter::once(&group.canonical).chain(group.synonyms.iter());
            for raw in keys {
                let key = normalize(raw);
                if key.is_empty() {
                    continue;
                }

                if let Some(previous) = entries.insert(key.clone(), group.canonical.clone()) {
                    if previous != group.canonical {
                        tracing::warn!(
                            key = %key,
                            previous = %previous,
                            replacement = %group.canonical,
                            "Synonym key maps to two canonical names; keeping the later one"
                        );
                    }
                }
            }
        }

        let mut scan_order: Vec<usize> = (0..entries.len()).collect();
        // Stable sort: equal lengths keep insertion order
        scan_order.sort_by_key(|&i| {
            std::cmp::Reverse(entries.get_index(i).map_or(0, |(k, _)| k.chars().count()))
        });

        Self {
            entries,
            scan_order,
        }
    }

    /// Exact lookup of an already-normalized key.
    pub fn lookup(&self, normalized_key: &str) -> Option<&str> {
        self.entries.get(normalized_key).map(String::as_str)
    }

    /// Detect the canonical name mentioned anywhere in `text`.
    ///
    /// Returns the canonical name of the longest key contained in the
    /// normalized text, or `None` when nothing matches.
    pub fn detect(&self, text: &str) -> Option<&str> {
        self.detect_normalized(&normalize(text))
    }

    /// Same as [`detect`](Self::detect) for text that is already normalized.
    pub fn detect_normalized(&self, normalized: &str) -> Option<&str> {
        if normalized.is_empty() {
            return None;
        }

        self.scan_order.iter().find_map(|&i| {
            let (key, canonical) = self.entries.get_index(i)?;
            normalized.contains(key.as_str()).then_some(canonical.as_str())
        })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate `(normalized key, canonical name)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}
