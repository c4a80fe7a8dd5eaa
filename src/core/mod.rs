pub mod logging;

// Query resolution: normalization, synonyms, cascade, rendering
pub mod directory;
