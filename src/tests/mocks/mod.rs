//! Mock store tests
//!
//! Drives the resolution cascade against a mockall-generated [`RoomStore`]
//! to pin down how it talks to the store: the order of calls, the shrinking
//! query window, and fail-fast error propagation.

use std::sync::Arc;

use crate::core::directory::error::DirectoryError;
use crate::core::directory::lexicon::DirectoryLexicon;
use crate::core::directory::store::{
    Field, FieldPatterns, MockRoomStore, RecordKind, RoomDraft, RoomRecord,
};
use crate::core::directory::Resolver;

// ============================================================================
// Helpers
// ============================================================================

fn room(id: i64, name: &str) -> RoomRecord {
    RoomDraft::new(None, Some(name)).into_record(id, RecordKind::Room)
}

/// Name patterns of a request, as regex source.
fn name_patterns(patterns: &FieldPatterns) -> Vec<String> {
    patterns
        .iter()
        .filter(|(field, _)| *field == Field::Name)
        .map(|(_, re)| re.as_str().to_string())
        .collect()
}

fn resolver(store: MockRoomStore) -> Resolver<MockRoomStore> {
    let lexicon = DirectoryLexicon::campus_default().expect("default lexicon builds");
    Resolver::new(store, Arc::new(lexicon))
}

// ============================================================================
// Tests
// ============================================================================

#[tokio::test]
async fn test_store_failure_aborts_cascade() {
    let mut store = MockRoomStore::new();
    store
        .expect_find_by_exact()
        .times(1)
        .returning(|_, _, _, _| Err(DirectoryError::store("connection reset")));
    store.expect_find_by_pattern().times(0);

    let err = resolver(store)
        .resolve(RecordKind::Room, "biblioteca", 5)
        .await
        .unwrap_err();
    assert!(matches!(err, DirectoryError::Store(_)));
}

#[tokio::test]
async fn test_canonical_name_sent_as_exact_candidate() {
    let mut store = MockRoomStore::new();
    store
        .expect_find_by_exact()
        .withf(|kind, _fields, candidates, window| {
            *kind == RecordKind::Room
                && candidates.len() == 1
                && candidates[0] == "Biblioteca"
                && window.limit == 5
                && window.exclude.is_empty()
        })
        .times(1)
        .returning(|_, _, _, _| Ok(vec![room(1, "Biblioteca")]));
    store
        .expect_find_by_pattern()
        .times(1)
        .returning(|_, _, _| Ok(Vec::new()));

    let found = resolver(store)
        .resolve(RecordKind::Room, "la biblio", 5)
        .await
        .unwrap();
    assert_eq!(found.len(), 1);
}

#[tokio::test]
async fn test_later_strategies_get_shrunken_window() {
    let mut store = MockRoomStore::new();
    store
        .expect_find_by_exact()
        .times(1)
        .returning(|_, _, _, _| Ok(vec![room(1, "Biblioteca")]));
    store
        .expect_find_by_pattern()
        .withf(|_, _, window| window.limit == 4 && window.exclude == vec![1])
        .times(1)
        .returning(|_, _, _| Ok(vec![room(1, "Biblioteca"), room(2, "Biblioteca Anexa")]));

    let found = resolver(store)
        .resolve(RecordKind::Room, "biblioteca", 5)
        .await
        .unwrap();
    let ids: Vec<i64> = found.iter().map(|r| r.id).collect();
    assert_eq!(ids, vec![1, 2]);
}

#[tokio::test]
async fn test_full_budget_skips_remaining_strategies() {
    let mut store = MockRoomStore::new();
    store
        .expect_find_by_exact()
        .times(1)
        .returning(|_, _, _, _| Ok((1..=3).map(|id| room(id, "Biblioteca")).collect()));
    store.expect_find_by_pattern().times(0);

    let found = resolver(store)
        .resolve(RecordKind::Room, "biblioteca", 3)
        .await
        .unwrap();
    assert_eq!(found.len(), 3);
}

#[tokio::test]
async fn test_empty_query_never_reaches_store() {
    let mut store = MockRoomStore::new();
    store.expect_find_by_exact().times(0);
    store.expect_find_by_pattern().times(0);

    let matches = resolver(store).resolve_all(" \t ", 5).await.unwrap();
    assert!(matches.is_empty());
}

#[tokio::test]
async fn test_resolve_all_fails_when_either_kind_fails() {
    let mut store = MockRoomStore::new();
    store
        .expect_find_by_exact()
        .returning(|_, _, _, _| Ok(Vec::new()));
    store
        .expect_find_by_pattern()
        .returning(|kind, _, _| match kind {
            RecordKind::Laboratory => Err(DirectoryError::store("timeout")),
            RecordKind::Room => Ok(Vec::new()),
        });

    let result = resolver(store).resolve_all("gimnasio", 5).await;
    assert!(matches!(result, Err(DirectoryError::Store(_))));
}

#[tokio::test]
async fn test_fuzzy_step_anchors_trimmed_query_on_name() {
    let mut store = MockRoomStore::new();
    store.expect_find_by_exact().times(0);
    // Answers only anchored name lookups, so the hit can only come from there
    store
        .expect_find_by_pattern()
        .times(1)
        .returning(|_, patterns, _| {
            let anchored = name_patterns(patterns)
                .iter()
                .any(|p| p.starts_with(r"(?i)^\s*[aáàäâãå][nñ]t"));
            Ok(if anchored { vec![room(9, "Antiguo Auditorio")] } else { Vec::new() })
        });

    let found = resolver(store)
        .resolve(RecordKind::Room, "  Antiguo  ", 5)
        .await
        .unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].id, 9);
}

#[tokio::test]
async fn test_aula_query_also_asks_for_salon_name() {
    let mut store = MockRoomStore::new();
    store
        .expect_find_by_pattern()
        .withf(|kind, patterns, _| {
            let names = name_patterns(patterns);
            *kind == RecordKind::Room
                && names.len() == 3
                && names.iter().any(|p| p.starts_with("(?i)S[aáàäâãå]l[oóòöôõ][nñ] "))
        })
        .times(1)
        .returning(|_, _, _| Ok(vec![room(4, "Salón Magna")]));

    let found = resolver(store)
        .resolve(RecordKind::Room, "aula magna", 5)
        .await
        .unwrap();
    assert_eq!(found[0].nombre.as_deref(), Some("Salón Magna"));
}
