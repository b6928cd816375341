//! Remote catalog the artwork is looked up in.

pub mod auth;
pub mod error;
pub mod model;
pub mod retry;
pub mod spotify;

use crate::catalog::{error::CatalogError, model::Track};

/// The one catalog operation the enrichment stage needs.
pub trait TrackCatalog {
    /// Fetches track metadata by catalog id.
    fn fetch_track(&mut self, id: &str) -> Result<Track, CatalogError>;
}

impl<T: TrackCatalog + ?Sized> TrackCatalog for &mut T {
    fn fetch_track(&mut self, id: &str) -> Result<Track, CatalogError> {
        (**self).fetch_track(id)
    }
}
