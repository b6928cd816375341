use std::collections::HashMap;

use crate::domain::{record::ArtworkRef, resource::ResourceKey};

/// Run-scoped memo of artwork lookups, keyed by track.
///
/// A key is resolved at most once: later requests reuse the stored outcome,
/// including "the catalog has no artwork for this track". Entries are never
/// evicted.
#[derive(Debug, Default)]
pub struct ArtworkCache {
    entries: HashMap<ResourceKey, Option<ArtworkRef>>,
}

impl ArtworkCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the cached artwork for `key`, calling `fetch` only on a miss.
    ///
    /// A failed fetch stores nothing.
    pub fn get_or_fetch<E>(
        &mut self,
        key: &ResourceKey,
        fetch: impl FnOnce(&ResourceKey) -> Result<Option<ArtworkRef>, E>,
    ) -> Result<Option<ArtworkRef>, E> {
        if let Some(cached) = self.entries.get(key) {
            return Ok(cached.clone());
        }

        let artwork = fetch(key)?;
        self.entries.insert(key.clone(), artwork.clone());
        Ok(artwork)
    }

    #[cfg(test)]
    pub fn get(&self, key: &ResourceKey) -> Option<&Option<ArtworkRef>> {
        self.entries.get(key)
    }

    /// Number of distinct keys looked up so far.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of keys that resolved to actual artwork.
    pub fn resolved(&self) -> usize {
        self.entries.values().filter(|a| a.is_some()).count()
    }
}
