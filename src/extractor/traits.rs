use crate::extractor::models::{Format, VideoInfo};
use anyhow::Result;
use async_trait::async_trait;
use bytes::Bytes;
use futures::stream::BoxStream;

/// Media bytes as they arrive from the retrieval backend
pub type ByteStream = BoxStream<'static, std::io::Result<Bytes>>;

/// Core trait for video retrieval backends
///
/// Handlers only talk to this trait, so the yt-dlp backend can be swapped for
/// a canned one in tests.
#[async_trait]
pub trait Extractor: Send + Sync {
    /// Returns a unique identifier for this extractor (e.g. "ytdlp")
    fn id(&self) -> &'static str;

    /// Extracts video information, optionally authenticated with an OAuth2
    /// bearer token
    async fn extract_info(&self, url: &str, bearer: Option<&str>) -> Result<VideoInfo>;

    /// Opens the media stream for one of the formats returned by `extract_info`
    async fn open_stream(&self, format: &Format, bearer: Option<&str>) -> Result<ByteStream>;
}
