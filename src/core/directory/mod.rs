//! Campus Directory Resolution
//!
//! Resolves free-text queries ("tele 2", "sd1", "aula 126") to stored room
//! and laboratory records, and renders them as chat cards.
//!
//! ## Architecture
//!
//! ```text
//! User Query: "Lab de Telemática 2"
//!        │
//!        ▼
//! ┌──────────────────────────────┐
//! │  1. Normalize                │  → "lab de telematica 2"
//! │     (accents, case, spaces)  │
//! └──────────────┬───────────────┘
//!                ▼
//! ┌──────────────────────────────┐
//! │  2. Canonical Detection      │  compound rules → numbered families
//! │     (per record kind)        │  → longest synonym key
//! │                              │  → "Laboratorio de Telemática II"
//! └──────────────┬───────────────┘
//!                ▼
//! ┌──────────────────────────────┐
//! │  3. Resolution Cascade       │  exact name → room code → number
//! │     (budget, de-dup)         │  → fuzzy containment
//! └──────────────┬───────────────┘
//!                ▼
//! ┌──────────────────────────────┐
//! │  4. Card Rendering           │  image block + info block
//! └──────────────────────────────┘
//! ```

pub mod cascade;
pub mod code;
pub mod config;
pub mod disambiguate;
pub mod error;
pub mod fallback;
pub mod lexicon;
pub mod normalize;
pub mod render;
pub mod store;
pub mod synonyms;

// Re-export primary types
pub use cascade::{DirectoryMatches, MatchAccumulator, Resolver};
pub use code::{expand_variants, extract_code};
pub use config::{AssetsConfig, ResolverConfig};
pub use disambiguate::{CompoundRule, Disambiguator, NumberedFamily};
pub use error::{DirectoryError, DirectoryResult};
pub use fallback::{AlternateResolver, ResolverChain};
pub use lexicon::{campus_source, DirectoryLexicon, KindLexicon, LexiconSource};
pub use normalize::{exact_regex, like_regex, normalize};
pub use render::{CardRenderer, ChatReply, DisplayBlock, ReplyCard};
pub use store::{
    Field, FieldPatterns, MemoryStore, QueryWindow, RecordKind, RoomDraft, RoomRecord, RoomStore,
};
pub use synonyms::{NumberedSynonyms, SynonymGroup, SynonymIndex};
