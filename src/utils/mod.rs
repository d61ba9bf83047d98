//! Utility modules for error handling, configuration and filenames

pub mod config;
pub mod error;
pub mod filename;
pub mod http;

// Re-export for convenience
pub use config::{AppSettings, OAuthSettings, Variant};
pub use error::FetchError;
pub use filename::{download_file_name, sanitize_title};
pub use http::build_http_client;
