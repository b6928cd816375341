use anyhow::Context;
use clap::ValueEnum;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub input: InputConfig,
    pub output: OutputConfig,
    pub catalog: CatalogConfig,
}

impl Config {
    pub fn load(path: &Path) -> anyhow::Result<Config> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        toml::from_str(&contents).with_context(|| "Failed to parse config TOML")
    }

    /// Loads the file when one is given, otherwise falls back to defaults.
    pub fn load_or_default(path: Option<&Path>) -> anyhow::Result<Config> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Config::default()),
        }
    }
}

/// How batch files are found inside the input directory.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum Discovery {
    /// `<prefix>0.json`, `<prefix>1.json`, ... until the first gap
    #[default]
    Sequence,
    /// every `<prefix>*.json` file in the directory
    Prefix,
}

impl Discovery {
    pub fn default_prefix(&self) -> &'static str {
        match self {
            Discovery::Sequence => "endsong_",
            Discovery::Prefix => "Streaming_History_Audio_",
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct InputConfig {
    pub dir: PathBuf,
    pub discovery: Discovery,
    pub prefix: Option<String>,
}

impl InputConfig {
    pub fn prefix(&self) -> &str {
        self.prefix
            .as_deref()
            .unwrap_or_else(|| self.discovery.default_prefix())
    }
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("."),
            discovery: Discovery::default(),
            prefix: None,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct OutputConfig {
    pub path: PathBuf,
    /// spaces per indentation level
    pub indent: usize,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("sorted_streams.json"),
            indent: 4,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct CatalogConfig {
    /// first segment every enrichable identifier must carry
    pub namespace: String,
    pub token_url: String,
    pub api_base: String,
    /// environment variable holding the client id
    pub client_id_var: String,
    /// environment variable holding the client secret
    pub client_secret_var: String,
    pub timeout_secs: u64,
    pub max_retries: u32,
    pub retry_base_ms: u64,
    pub retry_max_ms: u64,
}

impl CatalogConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            namespace: "spotify".to_string(),
            token_url: "https://accounts.spotify.com/api/token".to_string(),
            api_base: "https://api.spotify.com/v1".to_string(),
            client_id_var: "SPOTIFY_ID".to_string(),
            client_secret_var: "SPOTIFY_SECRET".to_string(),
            timeout_secs: 30,
            max_retries: 5,
            retry_base_ms: 500,
            retry_max_ms: 30_000,
        }
    }
}
