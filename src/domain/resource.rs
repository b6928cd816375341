use std::fmt::Display;

use thiserror::Error;

/// Separator between the segments of a catalog identifier (`spotify:track:<id>`).
pub const URI_DELIMITER: char = ':';

/// Kind segment of identifiers that can be enriched.
pub const TRACK_KIND: &str = "track";

const EPISODE_KIND: &str = "episode";

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    Track,
    Episode,
    Other(String),
}

impl ResourceKind {
    fn from_segment(segment: &str) -> Self {
        match segment {
            TRACK_KIND => Self::Track,
            EPISODE_KIND => Self::Episode,
            other => Self::Other(other.to_string()),
        }
    }
}

impl Display for ResourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ResourceKind::Track => write!(f, "{TRACK_KIND}"),
            ResourceKind::Episode => write!(f, "{EPISODE_KIND}"),
            ResourceKind::Other(kind) => write!(f, "{kind}"),
        }
    }
}

/// Canonical `(kind, id)` pair derived from a record's embedded identifier.
///
/// Equal identifiers always produce equal keys, which is what lets the
/// enrichment cache share one lookup between many records.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResourceKey {
    pub kind: ResourceKind,
    pub id: String,
}

impl ResourceKey {
    pub fn track(id: impl Into<String>) -> Self {
        Self {
            kind: ResourceKind::Track,
            id: id.into(),
        }
    }

    /// Splits `<namespace>:<kind>:<id>` into a key of any kind.
    ///
    /// Segments past the third are ignored.
    pub fn parse(uri: &str, namespace: &str) -> Result<Self, NotEnrichable> {
        if uri.is_empty() {
            return Err(NotEnrichable::Empty);
        }

        let segments: Vec<&str> = uri.split(URI_DELIMITER).collect();
        if segments.len() < 3 {
            return Err(NotEnrichable::TooFewSegments(segments.len()));
        }

        if segments[0] != namespace {
            return Err(NotEnrichable::ForeignNamespace {
                found: segments[0].to_string(),
                expected: namespace.to_string(),
            });
        }

        if segments[2].is_empty() {
            return Err(NotEnrichable::EmptyId);
        }

        Ok(Self {
            kind: ResourceKind::from_segment(segments[1]),
            id: segments[2].to_string(),
        })
    }

    pub fn is_track(&self) -> bool {
        self.kind == ResourceKind::Track
    }
}

impl Display for ResourceKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{URI_DELIMITER}{}", self.kind, self.id)
    }
}

/// Why a record's identifier cannot be used for an artwork lookup.
///
/// This is not an error of the run: the record is left without artwork.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NotEnrichable {
    #[error("identifier is empty")]
    Empty,

    #[error("identifier has {0} segment(s), expected 3")]
    TooFewSegments(usize),

    #[error("namespace '{found}' is not '{expected}'")]
    ForeignNamespace { found: String, expected: String },

    #[error("resource kind '{0}' is not a track")]
    NotATrack(ResourceKind),

    #[error("identifier has an empty id")]
    EmptyId,
}

/// Extracts the lookup key of an audio track, or classifies the identifier
/// as not enrichable.
pub fn extract_track_key(uri: &str, namespace: &str) -> Result<ResourceKey, NotEnrichable> {
    let key = ResourceKey::parse(uri, namespace)?;
    if !key.is_track() {
        return Err(NotEnrichable::NotATrack(key.kind));
    }
    Ok(key)
}
