//! Error handling for tubefetch

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for tubefetch
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("yt-dlp not found. Please install yt-dlp")]
    YtDlpNotFound,

    #[error("Failed to extract video info: {0}")]
    ExtractionError(String),

    #[error("Download failed: {0}")]
    DownloadError(String),

    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("token file not found: {}", .0.display())]
    TokenNotFound(PathBuf),

    #[error("OAuth error: {0}")]
    OAuthError(String),

    #[error("No suitable formats with audio found")]
    NoAudioFormats,

    #[error("{0} is not implemented")]
    NotImplemented(&'static str),
}
