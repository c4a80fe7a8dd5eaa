//! Crate-level tests: store mocks and property tests.

mod mocks;
mod property;
