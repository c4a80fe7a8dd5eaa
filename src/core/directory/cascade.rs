//! Resolution Cascade
//!
//! Runs the ordered matching strategies for one record kind against a
//! [`RoomStore`], folding every answer into a [`MatchAccumulator`] until the
//! budget is filled.
//!
//! General rooms:
//! 1. canonical detection → exact name
//! 2. room code (`L320`) → exact name variants, else loose code regex
//! 3. bare 2-4 digit number → exact code, then code containment or
//!    whole-word name
//! 4. generic containment over code/name/building/floor
//!
//! Laboratories:
//! 1. canonical detection → exact name or code (else word substitution)
//! 2. room code → loose code regex on code or name
//! 3. generic containment over name/code/building/floor
//!
//! Strategies run strictly in order: each one asks only for the slots the
//! previous ones left. The first store error aborts the whole call.

use std::sync::Arc;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::code::{expand_variants, extract_code, extract_number, loose_code_regex};
use super::error::DirectoryResult;
use super::lexicon::DirectoryLexicon;
use super::normalize::{like_regex, normalize, prefix_regex, word_regex};
use super::store::{Field, FieldPatterns, QueryWindow, RecordKind, RoomRecord, RoomStore};

/// "aula" as a whole word, for the "aula" → "Salón" name variant
static AULA_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\baula\b").expect("Failed to compile aula regex"));

/// Per-call accumulator: de-duplicated records in first-seen order.
#[derive(Debug, Clone)]
pub struct MatchAccumulator {
    ids: Vec<i64>,
    records: Vec<RoomRecord>,
    limit: usize,
}

impl MatchAccumulator {
    pub fn new(limit: usize) -> Self {
        Self {
            ids: Vec::with_capacity(limit),
            records: Vec::with_capacity(limit),
            limit,
        }
    }

    pub fn is_full(&self) -> bool {
        self.records.len() >= self.limit
    }

    pub fn remaining(&self) -> usize {
        self.limit.saturating_sub(self.records.len())
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Window for the next store query: remaining slots, known ids excluded.
    pub fn window(&self) -> QueryWindow {
        QueryWindow {
            limit: self.remaining(),
            exclude: self.ids.clone(),
        }
    }

    /// Add unseen records until the budget is full; returns how many were added.
    pub fn absorb(&mut self, found: Vec<RoomRecord>) -> usize {
        let mut added = 0;
        for record in found {
            if self.is_full() {
                break;
            }
            if self.ids.contains(&record.id) {
                continue;
            }
            self.ids.push(record.id);
            self.records.push(record);
            added += 1;
        }
        added
    }

    /// True when a record already taken equals one of `candidates` on `field`.
    pub fn holds_exact(&self, field: Field, candidates: &[String]) -> bool {
        let wanted: Vec<String> = candidates.iter().map(|c| normalize(c)).collect();
        self.records.iter().any(|record| {
            record
                .field(field)
                .is_some_and(|value| wanted.contains(&normalize(value)))
        })
    }

    pub fn into_records(self) -> Vec<RoomRecord> {
        self.records
    }
}

/// Results of one query across both record kinds.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DirectoryMatches {
    pub rooms: Vec<RoomRecord>,
    pub labs: Vec<RoomRecord>,
}

impl DirectoryMatches {
    pub fn is_empty(&self) -> bool {
        self.rooms.is_empty() && self.labs.is_empty()
    }

    pub fn total(&self) -> usize {
        self.rooms.len() + self.labs.len()
    }

    /// Rooms first, then laboratories.
    pub fn iter(&self) -> impl Iterator<Item = &RoomRecord> {
        self.rooms.iter().chain(self.labs.iter())
    }
}

/// Canonical name resolution engine over a record store.
pub struct Resolver<S> {
    store: S,
    lexicon: Arc<DirectoryLexicon>,
}

impl<S: RoomStore> Resolver<S> {
    pub fn new(store: S, lexicon: Arc<DirectoryLexicon>) -> Self {
        Self { store, lexicon }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn lexicon(&self) -> &DirectoryLexicon {
        &self.lexicon
    }

    /// Canonical name the text refers to for `kind`, if any.
    pub fn detect_canonical(&self, kind: RecordKind, text: &str) -> Option<&str> {
        self.lexicon.for_kind(kind).detect(text)
    }

    /// Resolve `text` to at most `budget` records of `kind`.
    ///
    /// Empty or whitespace-only text yields an empty result.
    pub async fn resolve(
        &self,
        kind: RecordKind,
        text: &str,
        budget: usize,
    ) -> DirectoryResult<Vec<RoomRecord>> {
        let mut acc = MatchAccumulator::new(budget);
        if normalize(text).is_empty() || acc.is_full() {
            return Ok(acc.into_records());
        }

        match kind {
            RecordKind::Room => self.resolve_rooms(text, &mut acc).await?,
            RecordKind::Laboratory => self.resolve_labs(text, &mut acc).await?,
        }

        debug!(%kind, query = text, found = acc.len(), "Cascade finished");
        Ok(acc.into_records())
    }

    /// Resolve both kinds concurrently, each with its own budget.
    pub async fn resolve_all(
        &self,
        text: &str,
        budget: usize,
    ) -> DirectoryResult<DirectoryMatches> {
        let (rooms, labs) = tokio::try_join!(
            self.resolve(RecordKind::Room, text, budget),
            self.resolve(RecordKind::Laboratory, text, budget),
        )?;

        Ok(DirectoryMatches { rooms, labs })
    }

    async fn resolve_rooms(&self, text: &str, acc: &mut MatchAccumulator) -> DirectoryResult<()> {
        let kind = RecordKind::Room;

        if let Some(canonical) = self.detect_canonical(kind, text) {
            let candidates = vec![canonical.to_string()];
            self.exact(kind, "canonical", &[Field::Name], &candidates, acc).await?;
        }

        if let Some(code) = extract_code(text) {
            let variants = expand_variants(&code);
            // Loose fallback only when no record carries an exact variant,
            // including records an earlier strategy already took
            let matched = self
                .exact(kind, "code_variants", &[Field::Name], &variants, acc)
                .await?;
            if matched == 0 && !acc.holds_exact(Field::Name, &variants) {
                let loose = loose_code_regex(&code);
                let patterns = FieldPatterns::new()
                    .with(Field::Name, loose.clone())
                    .with(Field::Code, loose);
                self.pattern(kind, "code_loose", &patterns, acc).await?;
            }
        }

        if let Some(number) = extract_number(text) {
            let candidates = vec![number.clone()];
            self.exact(kind, "number_code", &[Field::Code], &candidates, acc).await?;
            let patterns = FieldPatterns::new()
                .with(Field::Code, like_regex(&number))
                .with(Field::Name, word_regex(&number));
            self.pattern(kind, "bare_number", &patterns, acc).await?;
        }

        let query = text.trim();
        let mut patterns = FieldPatterns::new()
            .with(Field::Code, like_regex(query))
            .with(Field::Name, like_regex(query))
            .with(Field::Building, like_regex(query))
            .with(Field::Floor, like_regex(query));
        if AULA_PATTERN.is_match(query) {
            let variant = AULA_PATTERN.replace_all(query, "Salón");
            patterns = patterns.with(Field::Name, like_regex(&variant));
        }
        patterns = patterns.with(Field::Name, prefix_regex(query));
        self.pattern(kind, "fuzzy", &patterns, acc).await?;

        Ok(())
    }

    async fn resolve_labs(&self, text: &str, acc: &mut MatchAccumulator) -> DirectoryResult<()> {
        let kind = RecordKind::Laboratory;
        let lexicon = self.lexicon.for_kind(kind);

        if let Some(canonical) = lexicon.detect(text) {
            let candidates = vec![canonical.to_string()];
            self.exact(kind, "canonical", &[Field::Name, Field::Code], &candidates, acc)
                .await?;
        } else if let Some(substituted) = lexicon.substitute(text) {
            let patterns = FieldPatterns::new()
                .with(Field::Name, like_regex(&substituted))
                .with(Field::Code, like_regex(&substituted));
            self.pattern(kind, "substitution", &patterns, acc).await?;
        }

        if let Some(code) = extract_code(text) {
            let loose = loose_code_regex(&code);
            let patterns = FieldPatterns::new()
                .with(Field::Code, loose.clone())
                .with(Field::Name, loose);
            self.pattern(kind, "code_loose", &patterns, acc).await?;
        }

        let query = text.trim();
        let patterns = FieldPatterns::new()
            .with(Field::Name, like_regex(query))
            .with(Field::Code, like_regex(query))
            .with(Field::Building, like_regex(query))
            .with(Field::Floor, like_regex(query));
        self.pattern(kind, "fuzzy", &patterns, acc).await?;

        Ok(())
    }

    /// Both helpers return how many records the store matched, which can
    /// exceed what the accumulator kept.
    async fn exact(
        &self,
        kind: RecordKind,
        strategy: &'static str,
        fields: &[Field],
        candidates: &[String],
        acc: &mut MatchAccumulator,
    ) -> DirectoryResult<usize> {
        if acc.is_full() || candidates.is_empty() {
            return Ok(0);
        }

        let found = self
            .store
            .find_by_exact(kind, fields, candidates, &acc.window())
            .await?;
        let matched = found.len();
        let added = acc.absorb(found);
        debug!(
            %kind,
            strategy,
            matched,
            added,
            remaining = acc.remaining(),
            "Cascade strategy"
        );
        Ok(matched)
    }

    async fn pattern(
        &self,
        kind: RecordKind,
        strategy: &'static str,
        patterns: &FieldPatterns,
        acc: &mut MatchAccumulator,
    ) -> DirectoryResult<usize> {
        if acc.is_full() || patterns.is_empty() {
            return Ok(0);
        }

        let found = self
            .store
            .find_by_pattern(kind, patterns, &acc.window())
            .await?;
        let matched = found.len();
        let added = acc.absorb(found);
        debug!(
            %kind,
            strategy,
            matched,
            added,
            remaining = acc.remaining(),
            "Cascade strategy"
        );
        Ok(matched)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::directory::lexicon::{KindSource, LexiconSource};
    use crate::core::directory::store::{MemoryStore, RoomDraft};
    use crate::core::directory::synonyms::SynonymGroup;

    fn record(id: i64) -> RoomRecord {
        RoomDraft::new(Some(&id.to_string()), None).into_record(id, RecordKind::Room)
    }

    #[test]
    fn test_accumulator_dedup_keeps_first_position() {
        let mut acc = MatchAccumulator::new(5);
        assert_eq!(acc.absorb(vec![record(3), record(1)]), 2);
        assert_eq!(acc.absorb(vec![record(1), record(7), record(3)]), 1);

        let ids: Vec<i64> = acc.into_records().iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![3, 1, 7]);
    }

    #[test]
    fn test_accumulator_budget() {
        let mut acc = MatchAccumulator::new(2);
        assert_eq!(acc.absorb((1..=4).map(record).collect()), 2);
        assert!(acc.is_full());
        assert_eq!(acc.remaining(), 0);
        assert_eq!(acc.absorb(vec![record(9)]), 0);
        assert_eq!(acc.window(), QueryWindow { limit: 0, exclude: vec![1, 2] });
    }

    fn campus(store: MemoryStore) -> Resolver<MemoryStore> {
        Resolver::new(store, Arc::new(DirectoryLexicon::campus_default().unwrap()))
    }

    fn rooms(rows: &[(Option<&str>, &str)]) -> MemoryStore {
        let mut store = MemoryStore::new();
        for (code, name) in rows {
            store.insert(RecordKind::Room, RoomDraft::new(*code, Some(*name)));
        }
        store
    }

    fn resolver() -> Resolver<MemoryStore> {
        let mut store = MemoryStore::new();
        store.insert(RecordKind::Room, RoomDraft::new(Some("1260"), Some("Salón 1260")));
        store.insert(
            RecordKind::Room,
            RoomDraft::new(Some("126"), Some("Salón 126")).building("Edificio 1"),
        );
        store.insert(
            RecordKind::Room,
            RoomDraft::new(None, Some("Biblioteca")).building("Edificio Central"),
        );
        store.insert(RecordKind::Room, RoomDraft::new(Some("L320"), Some("Aula L320")));
        store.insert(
            RecordKind::Laboratory,
            RoomDraft::new(Some("LT2"), Some("Laboratorio de Telemática II")),
        );
        store.insert(
            RecordKind::Laboratory,
            RoomDraft::new(Some("LT1"), Some("Laboratorio de Telemática I")),
        );
        store.insert(
            RecordKind::Laboratory,
            RoomDraft::new(Some("SC5"), Some("Sala de Cómputo 5")),
        );

        campus(store)
    }

    #[tokio::test]
    async fn test_empty_query_is_empty_result() {
        let resolver = resolver();
        assert!(resolver.resolve(RecordKind::Room, "", 5).await.unwrap().is_empty());
        assert!(resolver.resolve(RecordKind::Laboratory, "   ", 5).await.unwrap().is_empty());
        assert!(resolver.resolve(RecordKind::Room, "biblio", 0).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_canonical_detection_first() {
        let resolver = resolver();
        let found = resolver.resolve(RecordKind::Room, "biblio", 5).await.unwrap();
        assert_eq!(found[0].nombre.as_deref(), Some("Biblioteca"));
    }

    #[tokio::test]
    async fn test_code_variants_match_stored_name() {
        let resolver = resolver();
        let found = resolver.resolve(RecordKind::Room, "salón l-320", 5).await.unwrap();
        assert_eq!(found[0].nombre.as_deref(), Some("Aula L320"));
    }

    #[tokio::test]
    async fn test_bare_number_prefers_code_order() {
        let resolver = resolver();
        let found = resolver.resolve(RecordKind::Room, "126", 5).await.unwrap();
        assert_eq!(found[0].code.as_deref(), Some("126"));
        assert_eq!(found.len(), 2);
    }

    #[tokio::test]
    async fn test_bare_number_exact_code_beats_store_order() {
        // Codeless rows and "1126" sort ahead of "126"
        let resolver = campus(rooms(&[
            (Some("126"), "Salón 126"),
            (Some("1126"), "Salón 1126"),
            (None, "Sala 126 anexo"),
        ]));

        let found = resolver.resolve(RecordKind::Room, "126", 5).await.unwrap();
        let codes: Vec<_> = found.iter().map(|r| r.code.as_deref()).collect();
        assert_eq!(codes, vec![Some("126"), None, Some("1126")]);

        let capped = resolver.resolve(RecordKind::Room, "aula 126", 1).await.unwrap();
        assert_eq!(capped[0].code.as_deref(), Some("126"));
    }

    #[tokio::test]
    async fn test_aula_query_matches_salon_name() {
        let resolver = campus(rooms(&[(None, "Salón Magna"), (None, "Aula Norte")]));

        let found = resolver.resolve(RecordKind::Room, "aula magna", 5).await.unwrap();
        let names: Vec<_> = found.iter().filter_map(|r| r.nombre.as_deref()).collect();
        assert_eq!(names, vec!["Salón Magna"]);

        // Only the whole word is swapped
        let none = resolver.resolve(RecordKind::Room, "aulamagna", 5).await.unwrap();
        assert!(none.is_empty());
    }

    #[tokio::test]
    async fn test_room_code_falls_back_to_loose_match() {
        // No exact variant, and "L320" hides the bare number from word matching
        let resolver = campus(rooms(&[(None, "Antiguo salón L320"), (Some("320"), "Bodega")]));

        let found = resolver.resolve(RecordKind::Room, "salon l-320", 5).await.unwrap();
        assert_eq!(found[0].nombre.as_deref(), Some("Antiguo salón L320"));
        assert_eq!(found.len(), 2);
    }

    #[tokio::test]
    async fn test_taken_exact_variant_suppresses_loose_match() {
        let source = LexiconSource {
            rooms: KindSource {
                groups: vec![SynonymGroup::new("Aula L320", &["sala de tesis"])],
                ..Default::default()
            },
            ..Default::default()
        };
        let lexicon = DirectoryLexicon::build(&source).unwrap();
        let store = rooms(&[(Some("L320"), "Aula L320"), (None, "Antiguo salón L320")]);
        let resolver = Resolver::new(store, Arc::new(lexicon));

        let found = resolver.resolve(RecordKind::Room, "sala de tesis l320", 5).await.unwrap();
        let names: Vec<_> = found.iter().filter_map(|r| r.nombre.as_deref()).collect();
        assert_eq!(names, vec!["Aula L320"]);
    }

    #[tokio::test]
    async fn test_lab_code_loose_match_on_codigo() {
        let mut store = MemoryStore::new();
        store.insert(
            RecordKind::Laboratory,
            RoomDraft::new(Some("L104"), Some("Laboratorio de Física")),
        );
        store.insert(
            RecordKind::Laboratory,
            RoomDraft::new(Some("L105"), Some("Laboratorio de Química")),
        );
        let resolver = campus(store);

        let found = resolver.resolve(RecordKind::Laboratory, "L 104", 5).await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].code.as_deref(), Some("L104"));
    }

    #[test]
    fn test_accumulator_holds_exact_ignores_accents() {
        let mut acc = MatchAccumulator::new(3);
        let taken = RoomDraft::new(None, Some("Salón L320")).into_record(4, RecordKind::Room);
        acc.absorb(vec![taken]);

        assert!(acc.holds_exact(Field::Name, &expand_variants("L320")));
        assert!(!acc.holds_exact(Field::Name, &expand_variants("L321")));
        assert!(!acc.holds_exact(Field::Code, &expand_variants("L320")));
    }

    #[tokio::test]
    async fn test_lab_numbered_family() {
        let resolver = resolver();
        let found = resolver.resolve(RecordKind::Laboratory, "tele 2", 5).await.unwrap();
        assert_eq!(found[0].nombre.as_deref(), Some("Laboratorio de Telemática II"));
        assert!(found.iter().all(|r| r.kind == RecordKind::Laboratory));
    }

    #[tokio::test]
    async fn test_resolve_all_splits_kinds() {
        let resolver = resolver();
        let matches = resolver.resolve_all("sc5", 5).await.unwrap();
        assert!(matches.rooms.is_empty());
        assert_eq!(matches.labs.len(), 1);
        assert_eq!(matches.labs[0].code.as_deref(), Some("SC5"));
        assert_eq!(matches.total(), 1);
    }
}
