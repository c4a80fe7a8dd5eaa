//! SQLite Database Module
//!
//! Persistent storage for the campus directory: the `rooms` and `labs`
//! tables, seed imports, and the [`RoomStore`] implementation the resolver
//! queries.
//!
//! Exact lookups compare through the `FOLDED` collation (case and accent
//! insensitive, same folding as query normalization). Pattern lookups use
//! `REGEXP`, backed by the `regex` crate.

mod migrations;
mod models;

pub use migrations::run_migrations;
pub use models::*;

use std::cmp::Ordering;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use async_trait::async_trait;
use sqlx::sqlite::{Sqlite, SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use sqlx::{QueryBuilder, Row};
use thiserror::Error;
use tracing::info;

use crate::core::directory::error::{DirectoryError, DirectoryResult};
use crate::core::directory::normalize::normalize;
use crate::core::directory::store::{
    Field, FieldPatterns, QueryWindow, RecordKind, RoomDraft, RoomRecord, RoomStore,
};

/// Name of the accent/case folding collation registered on every connection.
pub const FOLDED_COLLATION: &str = "FOLDED";

/// Errors raised by the SQLite store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Seed file error: {0}")]
    Seed(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<StoreError> for DirectoryError {
    fn from(err: StoreError) -> Self {
        DirectoryError::Store(err.to_string())
    }
}

fn fold_collation(a: &str, b: &str) -> Ordering {
    normalize(a).cmp(&normalize(b))
}

fn table(kind: RecordKind) -> &'static str {
    match kind {
        RecordKind::Room => "rooms",
        RecordKind::Laboratory => "labs",
    }
}

fn column(kind: RecordKind, field: Field) -> &'static str {
    match field {
        Field::Code => kind.code_column(),
        Field::Name => "nombre",
        Field::Building => "edificio",
        Field::Floor => "piso",
        Field::Location => "ubicacion",
    }
}

fn insert_sql(kind: RecordKind) -> String {
    format!(
        "INSERT INTO {} ({}, nombre, edificio, piso, ubicacion, mapa_url) \
         VALUES (?, ?, ?, ?, ?, ?)",
        table(kind),
        kind.code_column()
    )
}

fn order_by(kind: RecordKind) -> &'static str {
    match kind {
        RecordKind::Room => " ORDER BY numero, nombre",
        RecordKind::Laboratory => " ORDER BY nombre",
    }
}

fn select_prefix(kind: RecordKind) -> String {
    format!(
        "SELECT id, {} AS code, nombre, edificio, piso, ubicacion, mapa_url FROM {} WHERE (",
        kind.code_column(),
        table(kind)
    )
}

/// Database connection pool
#[derive(Clone)]
pub struct Database {
    pool: SqlitePool,
    path: PathBuf,
}

impl Database {
    /// Open (or create) the database file under `data_dir`.
    pub async fn new(data_dir: &Path, file_name: &str) -> Result<Self, StoreError> {
        let db_path = data_dir.join(file_name);

        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let url = format!("sqlite:{}?mode=rwc", db_path.display());
        let options = SqliteConnectOptions::from_str(&url)?
            .create_if_missing(true)
            .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal)
            .synchronous(sqlx::sqlite::SqliteSynchronous::Normal)
            .busy_timeout(std::time::Duration::from_secs(30));

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .min_connections(1)
            .connect_with(Self::with_functions(options))
            .await?;

        let db = Self { pool, path: db_path };
        migrations::run_migrations(&db.pool).await?;

        info!(path = %db.path.display(), "Directory database ready");
        Ok(db)
    }

    /// Private in-memory database. A single connection that never expires
    /// keeps the data alive for the lifetime of the pool.
    pub async fn in_memory() -> Result<Self, StoreError> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")?;

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(Self::with_functions(options))
            .await?;

        let db = Self {
            pool,
            path: PathBuf::from(":memory:"),
        };
        migrations::run_migrations(&db.pool).await?;
        Ok(db)
    }

    fn with_functions(options: SqliteConnectOptions) -> SqliteConnectOptions {
        options
            .with_regexp()
            .collation(FOLDED_COLLATION, fold_collation)
    }

    /// Get the underlying pool for direct queries
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Get database file path
    pub fn path(&self) -> &PathBuf {
        &self.path
    }

    // =========================================================================
    // Write Operations
    // =========================================================================

    pub async fn insert_record(
        &self,
        kind: RecordKind,
        draft: &RoomDraft,
    ) -> Result<i64, StoreError> {
        let sql = insert_sql(kind);
        let result = sqlx::query(&sql)
            .bind(&draft.code)
            .bind(&draft.nombre)
            .bind(&draft.edificio)
            .bind(&draft.piso)
            .bind(&draft.ubicacion)
            .bind(&draft.mapa_url)
            .execute(&self.pool)
            .await?;

        Ok(result.last_insert_rowid())
    }

    /// Load a `{ "rooms": [...], "labs": [...] }` seed file in one transaction.
    pub async fn import_json(&self, path: &Path) -> Result<ImportSummary, StoreError> {
        let contents = std::fs::read_to_string(path)?;
        let seed: SeedFile = serde_json::from_str(&contents)?;
        self.import_seed(&seed).await
    }

    pub async fn import_seed(&self, seed: &SeedFile) -> Result<ImportSummary, StoreError> {
        let mut tx = self.pool.begin().await?;

        let batches = [
            (RecordKind::Room, &seed.rooms),
            (RecordKind::Laboratory, &seed.labs),
        ];
        for (kind, drafts) in batches {
            let sql = insert_sql(kind);
            for draft in drafts {
                sqlx::query(&sql)
                    .bind(&draft.code)
                    .bind(&draft.nombre)
                    .bind(&draft.edificio)
                    .bind(&draft.piso)
                    .bind(&draft.ubicacion)
                    .bind(&draft.mapa_url)
                    .execute(&mut *tx)
                    .await?;
            }
        }

        tx.commit().await?;

        let summary = ImportSummary {
            rooms: seed.rooms.len(),
            labs: seed.labs.len(),
        };
        info!(rooms = summary.rooms, labs = summary.labs, "Imported directory seed");
        Ok(summary)
    }

    // =========================================================================
    // Read Operations
    // =========================================================================

    pub async fn count(&self, kind: RecordKind) -> Result<i64, StoreError> {
        let row = sqlx::query(&format!("SELECT COUNT(*) as count FROM {}", table(kind)))
            .fetch_one(&self.pool)
            .await?;
        Ok(row.try_get::<i64, _>("count")?)
    }

    async fn fetch(
        &self,
        kind: RecordKind,
        mut builder: QueryBuilder<'_, Sqlite>,
        window: &QueryWindow,
    ) -> Result<Vec<RoomRecord>, StoreError> {
        builder.push(")");

        if !window.exclude.is_empty() {
            builder.push(" AND id NOT IN (");
            let mut ids = builder.separated(", ");
            for id in &window.exclude {
                ids.push_bind(*id);
            }
            ids.push_unseparated(")");
        }

        builder.push(order_by(kind));
        builder.push(" LIMIT ");
        builder.push_bind(window.limit as i64);

        let rows = builder
            .build_query_as::<RoomRow>()
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.into_iter().map(|row| row.into_record(kind)).collect())
    }
}

#[async_trait]
impl RoomStore for Database {
    async fn find_by_exact(
        &self,
        kind: RecordKind,
        fields: &[Field],
        candidates: &[String],
        window: &QueryWindow,
    ) -> DirectoryResult<Vec<RoomRecord>> {
        if fields.is_empty() || candidates.is_empty() || window.limit == 0 {
            return Ok(Vec::new());
        }

        let mut builder = QueryBuilder::new(select_prefix(kind));
        let mut first = true;
        for &field in fields {
            for candidate in candidates {
                if !first {
                    builder.push(" OR ");
                }
                first = false;
                builder.push(column(kind, field));
                builder.push(" = ");
                builder.push_bind(candidate.clone());
                builder.push(" COLLATE ");
                builder.push(FOLDED_COLLATION);
            }
        }

        Ok(self.fetch(kind, builder, window).await?)
    }

    async fn find_by_pattern(
        &self,
        kind: RecordKind,
        patterns: &FieldPatterns,
        window: &QueryWindow,
    ) -> DirectoryResult<Vec<RoomRecord>> {
        if patterns.is_empty() || window.limit == 0 {
            return Ok(Vec::new());
        }

        let mut builder = QueryBuilder::new(select_prefix(kind));
        let mut first = true;
        for (field, pattern) in patterns.iter() {
            if !first {
                builder.push(" OR ");
            }
            first = false;
            builder.push(format!("COALESCE({}, '') REGEXP ", column(kind, field)));
            builder.push_bind(pattern.as_str().to_string());
        }

        Ok(self.fetch(kind, builder, window).await?)
    }
}
