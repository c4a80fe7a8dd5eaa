//! Directory Records
//!
//! Row types for the `rooms` and `labs` tables and the JSON seed format.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::core::directory::store::{RecordKind, RoomDraft, RoomRecord};

// ============================================================================
// Room / Laboratory Row
// ============================================================================

/// Row shape shared by both tables; the kind-specific code column is
/// selected as `code`.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct RoomRow {
    pub id: i64,
    pub code: Option<String>,
    pub nombre: Option<String>,
    pub edificio: Option<String>,
    pub piso: Option<String>,
    pub ubicacion: Option<String>,
    pub mapa_url: Option<String>,
}

impl RoomRow {
    pub fn into_record(self, kind: RecordKind) -> RoomRecord {
        RoomRecord {
            id: self.id,
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

// ============================================================================
// Seed File
// ============================================================================

/// Bulk import payload: `{ "rooms": [...], "labs": [...] }`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SeedFile {
    #[serde(default)]
    pub rooms: Vec<RoomDraft>,
    #[serde(default)]
    pub labs: Vec<RoomDraft>,
}

/// Counts of records written by an import.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportSummary {
    pub rooms: usize,
    pub labs: usize,
}
