//! Saving retrieved media to disk

pub mod engine;
pub mod storage;

// Re-export for convenience
pub use engine::DownloadEngine;
pub use storage::ensure_downloads_dir;
