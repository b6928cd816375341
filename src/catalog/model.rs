use serde::Deserialize;

use crate::domain::record::ArtworkRef;

/// Subset of the catalog's track object that enrichment reads.
#[derive(Debug, Clone, Deserialize)]
pub struct Track {
    #[serde(default)]
    pub name: Option<String>,
    pub album: Album,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Album {
    /// ordered by size, widest first
    #[serde(default)]
    pub images: Vec<Image>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Image {
    pub url: String,
}

impl Track {
    /// The first (largest) album image, if the catalog has any.
    pub fn primary_artwork(&self) -> Option<ArtworkRef> {
        self.album
            .images
            .first()
            .map(|image| ArtworkRef(image.url.clone()))
    }

    #[cfg(test)]
    pub fn with_artwork(name: &str, urls: &[&str]) -> Self {
        Self {
            name: Some(name.to_string()),
            album: Album {
                images: urls
                    .iter()
                    .map(|url| Image {
                        url: url.to_string(),
                    })
                    .collect(),
            },
        }
    }
}
