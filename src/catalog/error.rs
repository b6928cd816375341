use thiserror::Error;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("credential {0} is not set")]
    MissingCredential(String),

    #[error("couldn't get token: {0}")]
    TokenRequest(#[source] reqwest::Error),

    #[error("couldn't get token: token endpoint returned {status}: {body}")]
    TokenRejected { status: u16, body: String },

    #[error("failed to build http client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("request for track {id} failed: {source}")]
    Transport { id: String, source: reqwest::Error },

    #[error("catalog returned {status} for track {id}: {body}")]
    Rejected { id: String, status: u16, body: String },

    #[error("unreadable response for track {id}: {source}")]
    Decode { id: String, source: reqwest::Error },
}

impl CatalogError {
    /// True for failures that happen before any lookup could be issued.
    pub fn is_auth(&self) -> bool {
        matches!(
            self,
            CatalogError::MissingCredential(_)
                | CatalogError::TokenRequest(_)
                | CatalogError::TokenRejected { .. }
                | CatalogError::Client(_)
        )
    }
}
