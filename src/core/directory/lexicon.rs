//! Per-kind lexicons: synonyms, disambiguators and word substitutions
//!
//! A [`DirectoryLexicon`] is built once at startup from a [`LexiconSource`]
//! (the built-in campus tables, optionally merged with a TOML file) and is
//! shared read-only by every request.

use std::path::Path;

use indexmap::IndexMap;
use regex::Regex;
use serde::{Deserialize, Serialize};

use super::config::ResolverConfig;
use super::disambiguate::{CompoundSource, Disambiguator, FamilySource};
use super::error::{DirectoryError, DirectoryResult};
use super::normalize::normalize;
use super::store::RecordKind;
use super::synonyms::{NumberedSynonyms, SynonymGroup, SynonymIndex};

/// Source tables for one record kind.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct KindSource {
    #[serde(default)]
    pub groups: Vec<SynonymGroup>,
    #[serde(default)]
    pub numbered: Vec<NumberedSynonyms>,
    #[serde(default)]
    pub families: Vec<FamilySource>,
    #[serde(default)]
    pub compounds: Vec<CompoundSource>,
    /// Informal word → formal word, applied on whole words in order
    #[serde(default)]
    pub substitutions: IndexMap<String, String>,
}

impl KindSource {
    /// Layer another source over this one; its entries take precedence.
    ///
    /// Synonym groups are appended (later keys replace earlier ones in the
    /// index). Families and compounds resolve first-match, so the merged ones
    /// are placed ahead of ours.
    pub fn merge(&mut self, other: &KindSource) {
        self.groups.extend(other.groups.iter().cloned());
        self.numbered.extend(other.numbered.iter().cloned());
        let families = std::mem::take(&mut self.families);
        self.families = other.families.iter().cloned().chain(families).collect();
        let compounds = std::mem::take(&mut self.compounds);
        self.compounds = other.compounds.iter().cloned().chain(compounds).collect();
        for (from, to) in &other.substitutions {
            self.substitutions.insert(from.clone(), to.clone());
        }
    }

    /// Flat synonym groups, including the expanded numbered families.
    pub fn all_groups(&self) -> Vec<SynonymGroup> {
        let mut groups = self.groups.clone();
        for numbered in &self.numbered {
            groups.extend(numbered.expand());
        }
        groups
    }
}

/// Synonym source for the whole directory.
///
/// ```toml
/// [[labs.groups]]
/// canonical = "Laboratorio de Redes"
/// synonyms = ["redes", "cisco"]
///
/// [[labs.numbered]]
/// template = "Sala de Cómputo {n}"
/// start = 1
/// end = 20
/// variants = ["sc{n}"]
///
/// [labs.substitutions]
/// lab = "laboratorio"
/// ```
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct LexiconSource {
    #[serde(default)]
    pub rooms: KindSource,
    #[serde(default)]
    pub labs: KindSource,
}

impl LexiconSource {
    pub fn from_toml_file(path: &Path) -> DirectoryResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> DirectoryResult<Self> {
        toml::from_str(content).map_err(|e| DirectoryError::SynonymParse(e.to_string()))
    }

    pub fn merge(&mut self, other: &LexiconSource) {
        self.rooms.merge(&other.rooms);
        self.labs.merge(&other.labs);
    }

    pub fn for_kind(&self, kind: RecordKind) -> &KindSource {
        match kind {
            RecordKind::Room => &self.rooms,
            RecordKind::Laboratory => &self.labs,
        }
    }
}

/// Whole-word replacement used by the laboratory substitution pass.
#[derive(Clone, Debug)]
struct Substitution {
    pattern: Regex,
    replacement: String,
}

/// Compiled lexicon for one record kind.
#[derive(Clone, Debug, Default)]
pub struct KindLexicon {
    synonyms: SynonymIndex,
    disambiguator: Disambiguator,
    substitutions: Vec<Substitution>,
}

impl KindLexicon {
    pub fn build(source: &KindSource) -> DirectoryResult<Self> {
        let substitutions = source
            .substitutions
            .iter()
            .filter(|(from, _)| !normalize(from).is_empty())
            .map(|(from, to)| {
                let pattern = format!(r"\b{}\b", regex::escape(&normalize(from)));
                Regex::new(&pattern)
                    .map(|pattern| Substitution {
                        pattern,
                        replacement: normalize(to),
                    })
                    .map_err(|e| {
                        DirectoryError::config(format!("invalid substitution '{from}': {e}"))
                    })
            })
            .collect::<DirectoryResult<Vec<_>>>()?;

        Ok(Self {
            synonyms: SynonymIndex::build(&source.all_groups()),
            disambiguator: Disambiguator::from_sources(&source.compounds, &source.families)?,
            substitutions,
        })
    }

    /// Canonical name mentioned in `text`: disambiguators first, then the
    /// synonym scan.
    pub fn detect(&self, text: &str) -> Option<&str> {
        let normalized = normalize(text);
        if normalized.is_empty() {
            return None;
        }

        self.disambiguator
            .resolve(&normalized)
            .or_else(|| self.synonyms.detect_normalized(&normalized))
    }

    /// Rewrite informal words into their formal spelling.
    ///
    /// Returns `None` when no substitution applies.
    pub fn substitute(&self, text: &str) -> Option<String> {
        let normalized = normalize(text);
        if normalized.is_empty() {
            return None;
        }

        let substituted = self.substitutions.iter().fold(normalized.clone(), |acc, sub| {
            sub.pattern.replace_all(&acc, sub.replacement.as_str()).into_owned()
        });

        (substituted != normalized).then_some(substituted)
    }

    pub fn synonyms(&self) -> &SynonymIndex {
        &self.synonyms
    }
}

/// Lexicons for both record kinds.
#[derive(Clone, Debug, Default)]
pub struct DirectoryLexicon {
    rooms: KindLexicon,
    labs: KindLexicon,
}

impl DirectoryLexicon {
    pub fn build(source: &LexiconSource) -> DirectoryResult<Self> {
        Ok(Self {
            rooms: KindLexicon::build(&source.rooms)?,
            labs: KindLexicon::build(&source.labs)?,
        })
    }

    /// Lexicon built from the built-in campus tables only.
    pub fn campus_default() -> DirectoryResult<Self> {
        Self::build(&campus_source())
    }

    /// Lexicon as configured: built-in tables (unless disabled) plus the
    /// optional synonym file.
    pub fn from_config(config: &ResolverConfig) -> DirectoryResult<Self> {
        let mut source = if config.use_default_synonyms {
            campus_source()
        } else {
            LexiconSource::default()
        };

        if let Some(ref path) = config.synonyms_path {
            if path.exists() {
                source.merge(&LexiconSource::from_toml_file(path)?);
                tracing::info!(path = %path.display(), "Loaded synonym source");
            } else {
                tracing::warn!(
                    path = %path.display(),
                    "Synonym source not found; using built-in tables"
                );
            }
        }

        let lexicon = Self::build(&source)?;
        tracing::debug!(
            room_keys = lexicon.rooms.synonyms.len(),
            lab_keys = lexicon.labs.synonyms.len(),
            "Directory lexicon ready"
        );
        Ok(lexicon)
    }

    pub fn for_kind(&self, kind: RecordKind) -> &KindLexicon {
        match kind {
            RecordKind::Room => &self.rooms,
            RecordKind::Laboratory => &self.labs,
        }
    }
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

/// Built-in campus synonym tables.
pub fn campus_source() -> LexiconSource {
    let rooms = KindSource {
        groups: vec![
            SynonymGroup::new("Auditorio Principal", &["auditorio", "audi"]),
            SynonymGroup::new("Biblioteca", &["biblio"]),
            SynonymGroup::new("Cafetería", &["cafe", "comedor"]),
            SynonymGroup::new("Dirección", &["direccion general", "director"]),
            SynonymGroup::new(
                "Subdirección Académica",
                &["subdireccion", "subdireccion academica"],
            ),
            SynonymGroup::new(
                "Gestión Escolar",
                &["gestion", "control escolar", "servicios escolares"],
            ),
            SynonymGroup::new("Servicio Médico", &["enfermeria", "medico", "consultorio"]),
            SynonymGroup::new(
                "Sala de Profesores",
                &["sala de maestros", "sala de profes", "profes"],
            ),
            SynonymGroup::new("Sala de Usos Múltiples", &["usos multiples", "sum"]),
        ],
        ..Default::default()
    };

    let mut lab_substitutions = IndexMap::new();
    for (from, to) in [
        ("lab", "laboratorio"),
        ("labo", "laboratorio"),
        ("compu", "computo"),
        ("electro", "electronica"),
        ("digi", "digitales"),
    ] {
        lab_substitutions.insert(from.to_string(), to.to_string());
    }

    let labs = KindSource {
        groups: vec![
            SynonymGroup::new("Laboratorio de Electrónica", &["electronica", "lab de electronica"]),
            SynonymGroup::new("Laboratorio de Bioelectrónica", &["bioelectronica", "lab de bio"]),
            SynonymGroup::new("Laboratorio de Química", &["quimica", "lab de quimica"]),
            SynonymGroup::new("Laboratorio de Física", &["fisica", "lab de fisica"]),
            SynonymGroup::new("Laboratorio de Redes", &["redes", "lab de redes", "cisco"]),
            SynonymGroup::new(
                "Laboratorio de Sistemas Digitales I",
                &["sd", "sd 1", "sd i", "sd1", "sistemas digitales"],
            ),
            SynonymGroup::new(
                "Laboratorio de Sistemas Digitales II",
                &["sd 2", "sd ii", "sd2", "sistemas digitales 2", "sistemas digitales ii"],
            ),
            SynonymGroup::new(
                "Laboratorio de Telemática I",
                &["tele", "tele 1", "telematica i", "lab tele 1"],
            ),
            SynonymGroup::new(
                "Laboratorio de Telemática II",
                &["tele 2", "tele ii", "telematica 2"],
            ),
            SynonymGroup::new(
                "Laboratorio de Trabajos Terminales de Telemática",
                &["tt telematica", "trabajo terminal telematica", "tt tele"],
            ),
            SynonymGroup::new(
                "Laboratorio de Trabajos Terminales de Mecatrónica",
                &["tt mecatronica", "trabajo terminal meca", "tt meca"],
            ),
        ],
        numbered: vec![NumberedSynonyms::new(
            "Sala de Cómputo {n}",
            1,
            20,
            &[
                "sc{n}",
                "sc {n}",
                "sala {n}",
                "sala de computo {n}",
                "sala de compu {n}",
                "lab de computo {n}",
            ],
        )],
        families: vec![
            FamilySource {
                tokens: strings(&["sd", "sistemas digitales"]),
                first: "Laboratorio de Sistemas Digitales I".to_string(),
                second: "Laboratorio de Sistemas Digitales II".to_string(),
            },
            FamilySource {
                tokens: strings(&["tele", "telematica"]),
                first: "Laboratorio de Telemática I".to_string(),
                second: "Laboratorio de Telemática II".to_string(),
            },
        ],
        compounds: vec![
            CompoundSource {
                canonical: "Laboratorio de Trabajos Terminales de Telemática".to_string(),
                markers: strings(&["tt", "trabajo terminal", "trabajos terminales"]),
                domains: strings(&["tele", "telematica"]),
            },
            CompoundSource {
                canonical: "Laboratorio de Trabajos Terminales de Mecatrónica".to_string(),
                markers: strings(&["tt", "trabajo terminal", "trabajos terminales"]),
                domains: strings(&["meca", "mecatronica"]),
            },
        ],
        substitutions: lab_substitutions,
    };

    LexiconSource { rooms, labs }
}
