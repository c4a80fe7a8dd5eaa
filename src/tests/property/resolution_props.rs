//! Property-based tests for the resolution cascade
//!
//! Tests invariants:
//! - |result| <= budget
//! - Result identifiers are unique
//! - Results only contain the requested record kind
//! - Every listed synonym detects its canonical name regardless of casing
//!   and surrounding whitespace

use std::sync::Arc;

use proptest::prelude::*;

use crate::core::directory::lexicon::{campus_source, DirectoryLexicon};
use crate::core::directory::store::{MemoryStore, RecordKind, RoomDraft};
use crate::core::directory::Resolver;

// ============================================================================
// Strategies for generating test inputs
// ============================================================================

fn arb_kind() -> impl Strategy<Value = RecordKind> {
    prop_oneof![Just(RecordKind::Room), Just(RecordKind::Laboratory)]
}

fn arb_draft() -> impl Strategy<Value = RoomDraft> {
    (
        proptest::option::of("[L]?[0-9]{2,4}"),
        proptest::option::of("(Aula|Salón|Laboratorio de|Sala de Cómputo) [A-Za-zé0-9 ]{1,12}"),
        proptest::option::of("Edificio [1-4]"),
    )
        .prop_map(|(code, name, building)| {
            let mut draft = RoomDraft::new(code.as_deref(), name.as_deref());
            if let Some(building) = building {
                draft = draft.building(&building);
            }
            draft
        })
}

fn arb_store() -> impl Strategy<Value = MemoryStore> {
    proptest::collection::vec((arb_kind(), arb_draft()), 0..30).prop_map(|drafts| {
        let mut store = MemoryStore::new();
        for (kind, draft) in drafts {
            store.insert(kind, draft);
        }
        store
    })
}

fn arb_text() -> impl Strategy<Value = String> {
    prop_oneof![
        "[0-9]{1,4}",
        "(aula|salon|sala|lab|tele|sd|sc) ?[0-9]{0,3}",
        "[a-zA-Zé ]{0,15}",
    ]
}

/// (synonym or canonical, canonical) pairs of the built-in tables
fn listed_pairs(kind: RecordKind) -> Vec<(String, String)> {
    campus_source()
        .for_kind(kind)
        .all_groups()
        .into_iter()
        .flat_map(|group| {
            let canonical = group.canonical.clone();
            std::iter::once(group.canonical.clone())
                .chain(group.synonyms.clone())
                .map(move |term| (term, canonical.clone()))
        })
        .collect()
}

fn run<F: std::future::Future>(future: F) -> F::Output {
    tokio::runtime::Builder::new_current_thread()
        .build()
        .expect("current-thread runtime")
        .block_on(future)
}

// ============================================================================
// Properties
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn results_respect_budget_kind_and_uniqueness(
        store in arb_store(),
        kind in arb_kind(),
        text in arb_text(),
        budget in 0usize..8,
    ) {
        let lexicon = Arc::new(DirectoryLexicon::campus_default().unwrap());
        let resolver = Resolver::new(store, lexicon);

        let found = run(resolver.resolve(kind, &text, budget)).unwrap();

        prop_assert!(found.len() <= budget);
        prop_assert!(found.iter().all(|r| r.kind == kind));

        let mut ids: Vec<i64> = found.iter().map(|r| r.id).collect();
        ids.sort_unstable();
        ids.dedup();
        prop_assert_eq!(ids.len(), found.len());
    }

    #[test]
    fn listed_synonyms_detect_in_any_casing(
        kind in arb_kind(),
        index in any::<prop::sample::Index>(),
        upper in any::<bool>(),
        pad in "[ \t]{0,3}",
    ) {
        let pairs = listed_pairs(kind);
        let (term, canonical) = index.get(&pairs);
        let cased = if upper { term.to_uppercase() } else { term.clone() };
        let text = format!("{pad}{cased}{pad}");

        let lexicon = DirectoryLexicon::campus_default().unwrap();
        prop_assert_eq!(lexicon.for_kind(kind).detect(&text), Some(canonical.as_str()));
    }
}
