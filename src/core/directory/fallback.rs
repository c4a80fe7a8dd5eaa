//! Alternate resolution behind the same resolve-shaped interface
//!
//! An external NLU service can be plugged in as an [`AlternateResolver`].
//! It is consulted only when the cascade finds nothing, and it never sees
//! or touches the cascade's accumulator.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, warn};

use super::cascade::{DirectoryMatches, Resolver};
use super::error::DirectoryResult;
use super::store::{RecordKind, RoomRecord, RoomStore};

/// A stateless resolver with its own external contract.
#[async_trait]
pub trait AlternateResolver: Send + Sync {
    /// Short identifier used in logs.
    fn name(&self) -> &str;

    async fn resolve(
        &self,
        kind: RecordKind,
        text: &str,
        budget: usize,
    ) -> DirectoryResult<Vec<RoomRecord>>;
}

/// Cascade first, alternate resolver when the cascade comes back empty.
pub struct ResolverChain<S> {
    primary: Resolver<S>,
    alternate: Option<Arc<dyn AlternateResolver>>,
}

impl<S: RoomStore> ResolverChain<S> {
    pub fn new(primary: Resolver<S>) -> Self {
        Self {
            primary,
            alternate: None,
        }
    }

    pub fn with_alternate(mut self, alternate: Arc<dyn AlternateResolver>) -> Self {
        self.alternate = Some(alternate);
        self
    }

    pub fn primary(&self) -> &Resolver<S> {
        &self.primary
    }

    /// Store failures from the cascade propagate; alternate failures are
    /// logged and read as "no match".
    pub async fn resolve(
        &self,
        kind: RecordKind,
        text: &str,
        budget: usize,
    ) -> DirectoryResult<Vec<RoomRecord>> {
        let found = self.primary.resolve(kind, text, budget).await?;
        if !found.is_empty() || text.trim().is_empty() {
            return Ok(found);
        }

        Ok(self.consult_alternate(kind, text, budget).await)
    }

    pub async fn resolve_all(
        &self,
        text: &str,
        budget: usize,
    ) -> DirectoryResult<DirectoryMatches> {
        let matches = self.primary.resolve_all(text, budget).await?;
        if !matches.is_empty() || text.trim().is_empty() || self.alternate.is_none() {
            return Ok(matches);
        }

        let (rooms, labs) = tokio::join!(
            self.consult_alternate(RecordKind::Room, text, budget),
            self.consult_alternate(RecordKind::Laboratory, text, budget),
        );
        Ok(DirectoryMatches { rooms, labs })
    }

    async fn consult_alternate(
        &self,
        kind: RecordKind,
        text: &str,
        budget: usize,
    ) -> Vec<RoomRecord> {
        let Some(alternate) = self.alternate.as_ref() else {
            return Vec::new();
        };

        match alternate.resolve(kind, text, budget).await {
            Ok(mut records) => {
                records.truncate(budget);
                debug!(
                    alternate = alternate.name(),
                    %kind,
                    found = records.len(),
                    "Alternate resolver answered"
                );
                records
            }
            Err(e) => {
                warn!(alternate = alternate.name(), %kind, error = %e, "Alternate resolver failed");
                Vec::new()
            }
        }
    }
}
