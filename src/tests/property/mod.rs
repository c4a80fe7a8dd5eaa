//! Property-based tests for the campus directory
//!
//! Property tests verify invariants that should hold for all inputs, rather
//! than testing specific cases.
//!
//! ## Test Modules
//!
//! - `normalize_props`: text folding and accent-insensitive matchers
//!   - Normalization is idempotent
//!   - Output has no uppercase, no diacritics, single spaces
//!   - `like_regex` matches both the literal and its folded form
//!
//! - `resolution_props`: cascade behaviour over random stores
//!   - Never more results than the budget
//!   - No duplicate identifiers
//!   - Only records of the requested kind
//!   - Listed synonyms detect their canonical name in any casing
//!
//! ## Configuration
//!
//! By default, proptest runs 256 cases per property. This can be configured
//! via the `PROPTEST_CASES` environment variable:
//!
//! ```sh
//! PROPTEST_CASES=1000 cargo test property --release
//! ```

mod normalize_props;
mod resolution_props;
