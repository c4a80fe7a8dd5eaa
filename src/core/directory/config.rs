//! Directory Configuration
//!
//! Resolver budgets, synonym source location and image asset settings.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Resolution cascade configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ResolverConfig {
    /// Result budget for interactive chat queries
    #[serde(default = "default_chat_budget")]
    pub chat_budget: usize,

    /// Result budget for listing queries
    #[serde(default = "default_listing_budget")]
    pub listing_budget: usize,

    /// Optional TOML synonym source merged over the built-in tables
    #[serde(default)]
    pub synonyms_path: Option<PathBuf>,

    /// Whether to start from the built-in campus tables
    #[serde(default = "default_true")]
    pub use_default_synonyms: bool,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            chat_budget: 5,
            listing_budget: 50,
            synonyms_path: None,
            use_default_synonyms: true,
        }
    }
}

/// Image asset configuration for rendered cards
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AssetsConfig {
    /// Local directory holding building images (`<building>.<ext>`)
    #[serde(default)]
    pub dir: Option<PathBuf>,

    /// Public URL prefix under which `dir` is served
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Text shown for missing building/floor/location values
    #[serde(default = "default_placeholder")]
    pub placeholder: String,
}

impl Default for AssetsConfig {
    fn default() -> Self {
        Self {
            dir: None,
            base_url: default_base_url(),
            placeholder: default_placeholder(),
        }
    }
}

// Default value helpers for serde
fn default_true() -> bool { true }
fn default_chat_budget() -> usize { 5 }
fn default_listing_budget() -> usize { 50 }
fn default_base_url() -> String { "/img".to_string() }
fn default_placeholder() -> String { "No especificado".to_string() }
