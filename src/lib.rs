//! tubefetch library

pub mod auth;
pub mod downloader;
pub mod extractor;
pub mod server;
pub mod utils;

// Re-export main types for easier use
pub use auth::{PersistedToken, TokenStore};
pub use downloader::DownloadEngine;
pub use extractor::{Extractor, Format, VideoInfo, YtDlpExtractor};
pub use server::{build_router, ApiError};
pub use utils::{AppSettings, FetchError, Variant};
