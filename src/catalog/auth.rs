use std::{
    fmt::Debug,
    time::{Duration, Instant},
};

use log::debug;
use reqwest::blocking::Client;
use serde::Deserialize;

use crate::{catalog::error::CatalogError, config::CatalogConfig};

/// Tokens this close to expiry are refreshed before use.
const EXPIRY_MARGIN: Duration = Duration::from_secs(60);

pub struct Credentials {
    pub client_id: String,
    pub client_secret: String,
}

impl Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .finish()
    }
}

impl Credentials {
    /// Reads both secrets from the environment, after loading `.env` if present.
    pub fn from_env(config: &CatalogConfig) -> Result<Self, CatalogError> {
        if let Err(e) = dotenvy::dotenv() {
            debug!("no .env file loaded: {e}");
        }
        Self::from_lookup(config, |name| std::env::var(name).ok())
    }

    pub fn from_lookup(
        config: &CatalogConfig,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, CatalogError> {
        let read = |name: &str| {
            lookup(name)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
                .ok_or_else(|| CatalogError::MissingCredential(name.to_string()))
        };

        Ok(Self {
            client_id: read(config.client_id_var.as_str())?,
            client_secret: read(config.client_secret_var.as_str())?,
        })
    }
}

#[derive(Debug, Clone)]
pub struct AccessToken {
    value: String,
    expires_at: Instant,
}

impl AccessToken {
    pub fn new(value: String, lifetime: Duration) -> Self {
        Self {
            value,
            expires_at: Instant::now() + lifetime,
        }
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn is_expired(&self) -> bool {
        Instant::now() + EXPIRY_MARGIN >= self.expires_at
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default = "default_expires_in")]
    expires_in: u64,
}

fn default_expires_in() -> u64 {
    3600
}

/// Client-credentials exchange against the catalog's token endpoint.
pub fn request_token(
    http: &Client,
    token_url: &str,
    credentials: &Credentials,
) -> Result<AccessToken, CatalogError> {
    let response = http
        .post(token_url)
        .basic_auth(&credentials.client_id, Some(&credentials.client_secret))
        .form(&[("grant_type", "client_credentials")])
        .send()
        .map_err(CatalogError::TokenRequest)?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().unwrap_or_default();
        return Err(CatalogError::TokenRejected {
            status: status.as_u16(),
            body,
        });
    }

    let token: TokenResponse = response.json().map_err(CatalogError::TokenRequest)?;
    debug!("obtained access token valid for {}s", token.expires_in);

    Ok(AccessToken::new(
        token.access_token,
        Duration::from_secs(token.expires_in),
    ))
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn env(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn reads_configured_variables() {
        let vars = env(&[("SPOTIFY_ID", "id"), ("SPOTIFY_SECRET", " secret\n")]);

        let creds =
            Credentials::from_lookup(&CatalogConfig::default(), |k| vars.get(k).cloned()).unwrap();

        assert_eq!(creds.client_id, "id");
        assert_eq!(creds.client_secret, "secret");
        assert!(!format!("{creds:?}").contains("secret\""));
    }

    #[test]
    fn missing_secret_is_credential_error() {
        let vars = env(&[("SPOTIFY_ID", "id")]);

        let err = Credentials::from_lookup(&CatalogConfig::default(), |k| vars.get(k).cloned())
            .unwrap_err();

        assert!(matches!(err, CatalogError::MissingCredential(ref name) if name == "SPOTIFY_SECRET"));
        assert!(err.is_auth());
    }

    #[test]
    fn blank_value_counts_as_missing() {
        let vars = env(&[("SPOTIFY_ID", "  "), ("SPOTIFY_SECRET", "s")]);

        let err = Credentials::from_lookup(&CatalogConfig::default(), |k| vars.get(k).cloned())
            .unwrap_err();

        assert!(matches!(err, CatalogError::MissingCredential(ref name) if name == "SPOTIFY_ID"));
    }

    #[test]
    fn token_expiry_honours_margin() {
        assert!(!AccessToken::new("t".into(), Duration::from_secs(3600)).is_expired());
        assert!(AccessToken::new("t".into(), Duration::from_secs(30)).is_expired());
    }

    #[test]
    fn token_response_defaults_lifetime() -> anyhow::Result<()> {
        let token: TokenResponse =
            serde_json::from_str(r#"{"access_token": "abc", "token_type": "Bearer"}"#)?;
        assert_eq!(token.access_token, "abc");
        assert_eq!(token.expires_in, 3600);
        Ok(())
    }
}
