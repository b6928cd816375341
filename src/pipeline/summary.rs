use std::collections::HashSet;

use chrono::{DateTime, Utc};

use crate::domain::{
    record::PlaybackRecord,
    resource::{ResourceKey, ResourceKind},
};

/// What a history contains, computed without touching the network.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct HistorySummary {
    pub records: usize,
    pub first: Option<DateTime<Utc>>,
    pub last: Option<DateTime<Utc>>,
    pub tracks: usize,
    pub episodes: usize,
    pub unidentified: usize,
    /// lookups an enrichment run would issue
    pub distinct_tracks: usize,
}

/// Summarizes records already in chronological order.
pub fn summarize(records: &[PlaybackRecord], namespace: &str) -> HistorySummary {
    let mut summary = HistorySummary {
        records: records.len(),
        first: records.first().map(|r| r.ts),
        last: records.last().map(|r| r.ts),
        ..Default::default()
    };

    let mut distinct = HashSet::new();
    for record in records {
        let episode = record.spotify_episode_uri.is_some();
        match ResourceKey::parse(record.resource_uri(), namespace) {
            Ok(key) if key.kind == ResourceKind::Track => {
                summary.tracks += 1;
                distinct.insert(key);
            }
            Ok(key) if key.kind == ResourceKind::Episode => summary.episodes += 1,
            _ if episode => summary.episodes += 1,
            _ => summary.unidentified += 1,
        }
    }
    summary.distinct_tracks = distinct.len();

    summary
}
