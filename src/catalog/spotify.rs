use std::thread;

use log::{debug, warn};
use reqwest::{StatusCode, blocking::Client};

use crate::{
    catalog::{
        TrackCatalog,
        auth::{AccessToken, Credentials, request_token},
        error::CatalogError,
        model::Track,
        retry::{RetryPolicy, is_retryable},
    },
    config::CatalogConfig,
};

/// Authenticated client for the Spotify Web API.
///
/// Transport retries live here; callers only see the final outcome of a
/// lookup.
pub struct SpotifyClient {
    http: Client,
    api_base: String,
    token_url: String,
    credentials: Credentials,
    token: AccessToken,
    retry: RetryPolicy,
}

impl SpotifyClient {
    /// Builds the http client and exchanges the credentials for a token.
    pub fn connect(config: &CatalogConfig, credentials: Credentials) -> Result<Self, CatalogError> {
        let http = Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(CatalogError::Client)?;

        let token = request_token(&http, &config.token_url, &credentials)?;

        Ok(Self {
            http,
            api_base: config.api_base.trim_end_matches('/').to_string(),
            token_url: config.token_url.clone(),
            credentials,
            token,
            retry: RetryPolicy::from_config(config),
        })
    }

    fn refresh_token(&mut self) -> Result<(), CatalogError> {
        debug!("refreshing access token");
        self.token = request_token(&self.http, &self.token_url, &self.credentials)?;
        Ok(())
    }

    fn bearer(&mut self) -> Result<String, CatalogError> {
        if self.token.is_expired() {
            self.refresh_token()?;
        }
        Ok(self.token.value().to_string())
    }

    fn track_url(&self, id: &str) -> String {
        format!("{}/tracks/{}", self.api_base, id)
    }
}

impl TrackCatalog for SpotifyClient {
    fn fetch_track(&mut self, id: &str) -> Result<Track, CatalogError> {
        let url = self.track_url(id);
        let mut attempt = 0;
        let mut reauthenticated = false;

        loop {
            let bearer = self.bearer()?;
            debug!("GET {url} (attempt {})", attempt + 1);

            let response = match self.http.get(&url).bearer_auth(bearer).send() {
                Ok(response) => response,
                Err(err) if (err.is_timeout() || err.is_connect()) && self.retry.allows(attempt) => {
                    let wait = self.retry.backoff(attempt);
                    warn!("request for track {id} failed ({err}), retrying in {wait:?}");
                    thread::sleep(wait);
                    attempt += 1;
                    continue;
                }
                Err(source) => {
                    return Err(CatalogError::Transport {
                        id: id.to_string(),
                        source,
                    });
                }
            };

            let status = response.status();
            if status.is_success() {
                let track: Track = response.json().map_err(|source| CatalogError::Decode {
                    id: id.to_string(),
                    source,
                })?;
                debug!(
                    "fetched track {id} ({})",
                    track.name.as_deref().unwrap_or("untitled")
                );
                return Ok(track);
            }

            if status == StatusCode::UNAUTHORIZED && !reauthenticated {
                self.refresh_token()?;
                reauthenticated = true;
                continue;
            }

            if is_retryable(status) && self.retry.allows(attempt) {
                let wait = self.retry.delay(attempt, response.headers());
                warn!("catalog returned {status} for track {id}, retrying in {wait:?}");
                thread::sleep(wait);
                attempt += 1;
                continue;
            }

            let body = response.text().unwrap_or_default();
            return Err(CatalogError::Rejected {
                id: id.to_string(),
                status: status.as_u16(),
                body,
            });
        }
    }
}
