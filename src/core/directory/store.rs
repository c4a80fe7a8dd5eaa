//! Record model and the store interface the cascade queries
//!
//! The cascade never talks to a concrete database. It asks a [`RoomStore`]
//! for exact (collation-aware) or pattern matches and folds the answers into
//! its accumulator. [`MemoryStore`] is the in-process implementation; the
//! SQLite implementation lives in `crate::database`.

use async_trait::async_trait;
use regex::Regex;
use serde::{Deserialize, Serialize};

use super::error::DirectoryResult;
use super::normalize::normalize;

/// The two record collections of the directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordKind {
    /// General rooms (classrooms, offices, services), keyed by `numero`
    Room,
    /// Laboratories, keyed by `codigo`
    Laboratory,
}

impl RecordKind {
    pub const ALL: [RecordKind; 2] = [RecordKind::Room, RecordKind::Laboratory];

    /// Name of the kind-specific primary code column.
    pub fn code_column(&self) -> &'static str {
        match self {
            RecordKind::Room => "numero",
            RecordKind::Laboratory => "codigo",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RecordKind::Room => "room",
            RecordKind::Laboratory => "laboratory",
        }
    }
}

impl std::fmt::Display for RecordKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Searchable record fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    /// `numero` for rooms, `codigo` for laboratories
    Code,
    Name,
    Building,
    Floor,
    Location,
}

/// A room or laboratory as stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoomRecord {
    pub id: i64,
    pub kind: RecordKind,
    pub code: Option<String>,
    pub nombre: Option<String>,
    pub edificio: Option<String>,
    pub piso: Option<String>,
    pub ubicacion: Option<String>,
    pub mapa_url: Option<String>,
}

impl RoomRecord {
    pub fn field(&self, field: Field) -> Option<&str> {
        match field {
            Field::Code => self.code.as_deref(),
            Field::Name => self.nombre.as_deref(),
            Field::Building => self.edificio.as_deref(),
            Field::Floor => self.piso.as_deref(),
            Field::Location => self.ubicacion.as_deref(),
        }
    }
}

/// A record about to be inserted (no identifier yet).
///
/// Deserializes from seed files where the code may be spelled `numero` or
/// `codigo`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RoomDraft {
    #[serde(default, alias = "numero", alias = "codigo")]
    pub code: Option<String>,
    #[serde(default)]
    pub nombre: Option<String>,
    #[serde(default)]
    pub edificio: Option<String>,
    #[serde(default)]
    pub piso: Option<String>,
    #[serde(default)]
    pub ubicacion: Option<String>,
    #[serde(default)]
    pub mapa_url: Option<String>,
}

impl RoomDraft {
    pub fn new(code: Option<&str>, nombre: Option<&str>) -> Self {
        Self {
            code: code.map(str::to_string),
            nombre: nombre.map(str::to_string),
            ..Default::default()
        }
    }

    pub fn building(mut self, edificio: &str) -> Self {
        self.edificio = Some(edificio.to_string());
        self
    }

    pub fn floor(mut self, piso: &str) -> Self {
        self.piso = Some(piso.to_string());
        self
    }

    pub fn location(mut self, ubicacion: &str) -> Self {
        self.ubicacion = Some(ubicacion.to_string());
        self
    }

    pub fn map_url(mut self, mapa_url: &str) -> Self {
        self.mapa_url = Some(mapa_url.to_string());
        self
    }

    pub fn into_record(self, id: i64, kind: RecordKind) -> RoomRecord {
        RoomRecord {
            id,
            kind,
            code: self.code,
            nombre: self.nombre,
            edificio: self.edificio,
            piso: self.piso,
            ubicacion: self.ubicacion,
            mapa_url: self.mapa_url,
        }
    }
}

/// Field patterns combined with OR semantics.
///
/// Absent patterns (`None` from the regex builders) are dropped on insert,
/// so an empty set means "nothing to ask".
#[derive(Debug, Clone, Default)]
pub struct FieldPatterns {
    patterns: Vec<(Field, Regex)>,
}

impl FieldPatterns {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, field: Field, pattern: Option<Regex>) -> Self {
        if let Some(pattern) = pattern {
            self.patterns.push((field, pattern));
        }
        self
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Field, &Regex)> {
        self.patterns.iter().map(|(field, re)| (*field, re))
    }

    /// True when any pattern matches its field on the record.
    pub fn matches(&self, record: &RoomRecord) -> bool {
        self.iter()
            .any(|(field, re)| re.is_match(record.field(field).unwrap_or("")))
    }
}

/// Remaining slots for a store query plus identifiers already accumulated.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryWindow {
    pub limit: usize,
    pub exclude: Vec<i64>,
}

/// Read-only record lookups consumed by the resolution cascade.
///
/// Results are ordered by the kind's default sort: code then name for
/// rooms, name for laboratories.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RoomStore: Send + Sync {
    /// Records whose `fields` equal any candidate, ignoring case and accents.
    async fn find_by_exact(
        &self,
        kind: RecordKind,
        fields: &[Field],
        candidates: &[String],
        window: &QueryWindow,
    ) -> DirectoryResult<Vec<RoomRecord>>;

    /// Records matching any of the field patterns.
    async fn find_by_pattern(
        &self,
        kind: RecordKind,
        patterns: &FieldPatterns,
        window: &QueryWindow,
    ) -> DirectoryResult<Vec<RoomRecord>>;
}

/// In-memory [`RoomStore`].
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    records: Vec<RoomRecord>,
    next_id: i64,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a record and return its assigned identifier.
    pub fn insert(&mut self, kind: RecordKind, draft: RoomDraft) -> i64 {
        self.next_id += 1;
        let id = self.next_id;
        self.records.push(draft.into_record(id, kind));
        id
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    fn select<F>(&self, kind: RecordKind, window: &QueryWindow, predicate: F) -> Vec<RoomRecord>
    where
        F: Fn(&RoomRecord) -> bool,
    {
        let mut found: Vec<&RoomRecord> = self
            .records
            .iter()
            .filter(|r| r.kind == kind && !window.exclude.contains(&r.id))
            .filter(|r| predicate(r))
            .collect();

        match kind {
            RecordKind::Room => {
                found.sort_by(|a, b| (&a.code, &a.nombre).cmp(&(&b.code, &b.nombre)))
            }
            RecordKind::Laboratory => found.sort_by(|a, b| a.nombre.cmp(&b.nombre)),
        }

        found.into_iter().take(window.limit).cloned().collect()
    }
}

#[async_trait]
impl RoomStore for MemoryStore {
    async fn find_by_exact(
        &self,
        kind: RecordKind,
        fields: &[Field],
        candidates: &[String],
        window: &QueryWindow,
    ) -> DirectoryResult<Vec<RoomRecord>> {
        let wanted: Vec<String> = candidates.iter().map(|c| normalize(c)).collect();

        Ok(self.select(kind, window, |record| {
            fields.iter().any(|&field| {
                record
                    .field(field)
                    .map(|value| wanted.contains(&normalize(value)))
                    .unwrap_or(false)
            })
        }))
    }

    async fn find_by_pattern(
        &self,
        kind: RecordKind,
        patterns: &FieldPatterns,
        window: &QueryWindow,
    ) -> DirectoryResult<Vec<RoomRecord>> {
        Ok(self.select(kind, window, |record| patterns.matches(record)))
    }
}
