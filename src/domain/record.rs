use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One playback event from an exported streaming history.
///
/// Descriptive fields are carried through untouched. Every optional field is
/// serialized as an explicit `null` when absent, so a consumer can tell
/// "not applicable" apart from a field that was never written.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaybackRecord {
    pub ts: DateTime<Utc>,
    pub username: Option<String>,
    pub platform: Option<String>,
    pub ms_played: Option<i64>,
    pub conn_country: Option<String>,
    pub ip_addr_decrypted: Option<String>,
    pub user_agent_decrypted: Option<String>,
    pub master_metadata_track_name: Option<String>,
    pub master_metadata_album_artist_name: Option<String>,
    pub master_metadata_album_album_name: Option<String>,
    pub spotify_track_uri: Option<String>,
    pub episode_name: Option<String>,
    pub episode_show_name: Option<String>,
    pub spotify_episode_uri: Option<String>,
    pub reason_start: Option<String>,
    pub reason_end: Option<String>,
    pub shuffle: Option<bool>,
    pub skipped: Option<bool>,
    pub offline: Option<bool>,
    pub offline_timestamp: Option<i64>,
    pub incognito_mode: Option<bool>,

    /// Set once by the enrichment stage, never partially.
    pub artwork_url: Option<ArtworkRef>,

    /// Fields newer exports carry that we don't know about.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl PlaybackRecord {
    /// A record with only a timestamp and a resource identifier.
    #[cfg(test)]
    pub fn new(ts: DateTime<Utc>, track_uri: Option<&str>) -> Self {
        Self {
            ts,
            username: None,
            platform: None,
            ms_played: None,
            conn_country: None,
            ip_addr_decrypted: None,
            user_agent_decrypted: None,
            master_metadata_track_name: None,
            master_metadata_album_artist_name: None,
            master_metadata_album_album_name: None,
            spotify_track_uri: track_uri.map(str::to_string),
            episode_name: None,
            episode_show_name: None,
            spotify_episode_uri: None,
            reason_start: None,
            reason_end: None,
            shuffle: None,
            skipped: None,
            offline: None,
            offline_timestamp: None,
            incognito_mode: None,
            artwork_url: None,
            extra: Map::new(),
        }
    }

    /// The embedded catalog identifier, empty when the record has none.
    pub fn resource_uri(&self) -> &str {
        self.spotify_track_uri.as_deref().unwrap_or_default()
    }

    /// Short human description used in diagnostics.
    pub fn describe(&self) -> String {
        format!(
            "{:?} by {:?}",
            self.master_metadata_track_name.as_deref().unwrap_or_default(),
            self.master_metadata_album_artist_name
                .as_deref()
                .unwrap_or_default()
        )
    }
}

/// Opaque reference to a piece of artwork, usually an image URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ArtworkRef(pub String);
