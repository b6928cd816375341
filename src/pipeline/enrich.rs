use indicatif::ProgressBar;
use log::{debug, warn};

use crate::{
    catalog::{TrackCatalog, error::CatalogError},
    domain::{record::PlaybackRecord, resource::extract_track_key},
    pipeline::cache::ArtworkCache,
};

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct EnrichReport {
    /// records processed
    pub records: usize,
    /// records that received artwork
    pub enriched: usize,
    /// records whose identifier could not be looked up
    pub skipped: usize,
    /// distinct tracks looked up remotely
    pub fetched: usize,
}

/// Attaches artwork to records, one catalog lookup per distinct track.
///
/// Owns the cache for the duration of a run; `into_cache` hands it back.
pub struct Enricher<C> {
    catalog: C,
    cache: ArtworkCache,
    namespace: String,
}

impl<C: TrackCatalog> Enricher<C> {
    pub fn new(catalog: C, namespace: impl Into<String>) -> Self {
        Self {
            catalog,
            cache: ArtworkCache::new(),
            namespace: namespace.into(),
        }
    }

    /// Processes the records in order. The progress bar advances once per
    /// record, skipped ones included.
    ///
    /// The first failed lookup aborts; records already touched keep their
    /// artwork but the caller is expected to discard the whole collection.
    pub fn enrich(
        &mut self,
        records: &mut [PlaybackRecord],
        progress: &ProgressBar,
    ) -> Result<EnrichReport, CatalogError> {
        let mut report = EnrichReport::default();
        let fetched_before = self.cache.len();

        for record in records.iter_mut() {
            report.records += 1;

            let key = match extract_track_key(record.resource_uri(), &self.namespace) {
                Ok(key) => key,
                Err(reason) => {
                    progress.suspend(|| {
                        warn!(
                            "skipping {:?} ({reason}) | ts = {} | {}",
                            record.resource_uri(),
                            record.ts.to_rfc3339(),
                            record.describe()
                        )
                    });
                    report.skipped += 1;
                    progress.inc(1);
                    continue;
                }
            };

            let catalog = &mut self.catalog;
            let artwork = self.cache.get_or_fetch(&key, |key| {
                let track = catalog.fetch_track(&key.id)?;
                let artwork = track.primary_artwork();
                if artwork.is_none() {
                    progress.suspend(|| warn!("catalog has no artwork for {key}"));
                }
                Ok::<_, CatalogError>(artwork)
            })?;

            if artwork.is_some() {
                report.enriched += 1;
            } else {
                debug!("no artwork for {key}");
            }
            record.artwork_url = artwork;
            progress.inc(1);
        }

        report.fetched = self.cache.len() - fetched_before;
        Ok(report)
    }

    pub fn into_cache(self) -> ArtworkCache {
        self.cache
    }
}
