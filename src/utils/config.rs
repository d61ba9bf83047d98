//! Application configuration
//!
//! Settings are layered: built-in defaults, then an optional JSON file, then
//! `TUBEFETCH_*` environment variables (a `.env` file is honored). Command
//! line flags are applied last by the binary.

use anyhow::{Context, Result};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

const ENV_PREFIX: &str = "TUBEFETCH_";

/// Which flavour of the service this process runs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum Variant {
    /// yt-dlp retrieval with an OAuth2 bearer token, JSON response
    Library,
    /// YouTube Data API metadata with OAuth2; byte download is unavailable
    DataApi,
    /// yt-dlp retrieval without auth, file served in the response
    Direct,
}

impl Variant {
    /// Whether this variant mounts `/auth` and `/oauth2callback`
    pub fn uses_oauth(&self) -> bool {
        matches!(self, Variant::Library | Variant::DataApi)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Variant::Library => "library",
            Variant::DataApi => "data-api",
            Variant::Direct => "direct",
        }
    }
}

/// OAuth2 client registration and provider endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OAuthSettings {
    pub client_id: String,
    pub client_secret: String,
    pub redirect_url: String,
    pub auth_url: String,
    pub token_url: String,
    pub scopes: Vec<String>,
}

impl Default for OAuthSettings {
    fn default() -> Self {
        Self {
            client_id: String::new(),
            client_secret: String::new(),
            redirect_url: "http://localhost:8000/oauth2callback".to_string(),
            auth_url: "https://accounts.google.com/o/oauth2/auth".to_string(),
            token_url: "https://oauth2.googleapis.com/token".to_string(),
            scopes: vec!["https://www.googleapis.com/auth/youtube.readonly".to_string()],
        }
    }
}

impl OAuthSettings {
    pub fn has_credentials(&self) -> bool {
        !self.client_id.trim().is_empty() && !self.client_secret.trim().is_empty()
    }
}

/// Application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppSettings {
    /// Service flavour
    pub variant: Variant,

    /// Listen address
    pub bind_addr: String,

    /// Where downloaded videos are written
    pub downloads_dir: PathBuf,

    /// Where the OAuth2 token is persisted
    pub token_file: PathBuf,

    /// Explicit yt-dlp binary, skips discovery when set
    pub ytdlp_path: Option<PathBuf>,

    /// Base URL of the YouTube Data API
    pub data_api_url: String,

    pub oauth: OAuthSettings,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            variant: Variant::Library,
            bind_addr: "0.0.0.0:8000".to_string(),
            downloads_dir: PathBuf::from("downloads"),
            token_file: PathBuf::from("token.json"),
            ytdlp_path: None,
            data_api_url: "https://www.googleapis.com/youtube/v3".to_string(),
            oauth: OAuthSettings::default(),
        }
    }
}

impl AppSettings {
    /// Load settings from an optional JSON file and the environment
    pub fn load(config_file: Option<&Path>) -> Result<Self> {
        if let Err(e) = dotenv::dotenv() {
            debug!("No .env file loaded: {}", e);
        }

        let mut settings = match config_file {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        settings.apply_env(|key| std::env::var(format!("{ENV_PREFIX}{key}")).ok());
        Ok(settings)
    }

    /// Read a JSON settings file; missing keys keep their defaults
    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("reading config file {}", path.display()))?;
        let settings = serde_json::from_str(&raw)
            .with_context(|| format!("parsing config file {}", path.display()))?;
        Ok(settings)
    }

    /// Override fields from `lookup`, which maps an unprefixed key such as
    /// `CLIENT_ID` to its value. Blank values are ignored.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        if let Some(v) = get("VARIANT") {
            match Variant::from_str(&v, true) {
                Ok(variant) => self.variant = variant,
                Err(_) => warn!("Ignoring unknown {}VARIANT value: {}", ENV_PREFIX, v),
            }
        }
        if let Some(v) = get("BIND_ADDR") {
            self.bind_addr = v;
        }
        if let Some(v) = get("DOWNLOADS_DIR") {
            self.downloads_dir = PathBuf::from(v);
        }
        if let Some(v) = get("TOKEN_FILE") {
            self.token_file = PathBuf::from(v);
        }
        if let Some(v) = get("YTDLP_PATH") {
            self.ytdlp_path = Some(PathBuf::from(v));
        }
        if let Some(v) = get("DATA_API_URL") {
            self.data_api_url = v;
        }
        if let Some(v) = get("CLIENT_ID") {
            self.oauth.client_id = v;
        }
        if let Some(v) = get("CLIENT_SECRET") {
            self.oauth.client_secret = v;
        }
        if let Some(v) = get("REDIRECT_URL") {
            self.oauth.redirect_url = v;
        }
        if let Some(v) = get("SCOPES") {
            self.oauth.scopes = v
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(ToString::to_string)
                .collect();
        }
    }

    /// Log anything that will make requests fail later
    pub fn warn_on_gaps(&self) {
        if self.variant.uses_oauth() && !self.oauth.has_credentials() {
            warn!(
                "OAuth client credentials are not configured; set {p}CLIENT_ID and {p}CLIENT_SECRET",
                p = ENV_PREFIX
            );
        }
    }
}
