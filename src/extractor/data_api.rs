//! YouTube Data API v3 metadata client
//!
//! Used by the `data-api` variant. The API only exposes metadata; it has no
//! endpoint for media bytes, so [`DataApiClient::download`] always fails.

use crate::extractor::models::VideoInfo;
use crate::utils::error::FetchError;
use anyhow::Result;
use reqwest::Client;
use serde::Deserialize;
use std::path::Path;
use tracing::{debug, warn};
use url::Url;

/// Extract the video id from a YouTube URL.
///
/// `youtu.be/<id>` yields the first path segment and `youtube.com/watch?v=<id>`
/// yields the `v` parameter. Any other shape yields an empty string.
pub fn extract_video_id(raw: &str) -> String {
    let Ok(url) = Url::parse(raw.trim()) else {
        return String::new();
    };

    match url.host_str() {
        Some("youtu.be") => url
            .path_segments()
            .and_then(|mut segments| segments.next())
            .unwrap_or_default()
            .to_string(),
        Some("youtube.com") | Some("www.youtube.com") => url
            .query_pairs()
            .find(|(key, _)| key == "v")
            .map(|(_, value)| value.into_owned())
            .unwrap_or_default(),
        _ => String::new(),
    }
}

#[derive(Debug, Deserialize)]
struct VideoListResponse {
    #[serde(default)]
    items: Vec<VideoResource>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VideoResource {
    id: String,
    snippet: Option<Snippet>,
    content_details: Option<ContentDetails>,
    statistics: Option<Statistics>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Snippet {
    title: String,
    description: Option<String>,
    channel_title: Option<String>,
    published_at: Option<String>,
    thumbnails: Option<Thumbnails>,
}

#[derive(Debug, Deserialize)]
struct Thumbnails {
    high: Option<Thumbnail>,
    default: Option<Thumbnail>,
}

#[derive(Debug, Deserialize)]
struct Thumbnail {
    url: String,
}

#[derive(Debug, Deserialize)]
struct ContentDetails {
    duration: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Statistics {
    view_count: Option<String>,
    like_count: Option<String>,
}

impl VideoResource {
    fn into_video_info(self) -> VideoInfo {
        let snippet = self.snippet;
        let thumbnail = snippet
            .as_ref()
            .and_then(|s| s.thumbnails.as_ref())
            .and_then(|t| t.high.as_ref().or(t.default.as_ref()))
            .map(|t| t.url.clone());

        VideoInfo {
            url: format!("https://www.youtube.com/watch?v={}", self.id),
            duration: self
                .content_details
                .and_then(|d| d.duration)
                .and_then(|d| parse_iso8601_duration(&d)),
            view_count: self
                .statistics
                .as_ref()
                .and_then(|s| s.view_count.as_deref())
                .and_then(|v| v.parse().ok()),
            like_count: self
                .statistics
                .as_ref()
                .and_then(|s| s.like_count.as_deref())
                .and_then(|v| v.parse().ok()),
            title: snippet.as_ref().map(|s| s.title.clone()).unwrap_or_default(),
            description: snippet.as_ref().and_then(|s| s.description.clone()),
            uploader: snippet.as_ref().and_then(|s| s.channel_title.clone()),
            upload_date: snippet.and_then(|s| s.published_at),
            thumbnail,
            extractor: Some("youtube-data-api".to_string()),
            id: self.id,
            formats: Vec::new(),
        }
    }
}

/// Parse durations like `PT1H2M3S` into seconds
fn parse_iso8601_duration(raw: &str) -> Option<u64> {
    let rest = raw.strip_prefix("PT")?;
    let mut total = 0u64;
    let mut number = String::new();
    for c in rest.chars() {
        if c.is_ascii_digit() {
            number.push(c);
            continue;
        }
        let value: u64 = number.parse().ok()?;
        number.clear();
        let seconds = match c {
            'H' => value.checked_mul(3600)?,
            'M' => value.checked_mul(60)?,
            'S' => value,
            _ => return None,
        };
        total = total.checked_add(seconds)?;
    }
    number.is_empty().then_some(total)
}

/// Authenticated client for the `videos` resource
pub struct DataApiClient {
    client: Client,
    base_url: String,
}

impl DataApiClient {
    pub fn new(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Fetch metadata for one video; `Ok(None)` when the API knows no such id
    pub async fn fetch_video(&self, video_id: &str, bearer: &str) -> Result<Option<VideoInfo>> {
        debug!("Fetching Data API metadata for {}", video_id);

        let response = self
            .client
            .get(format!("{}/videos", self.base_url))
            .query(&[("part", "snippet,contentDetails,statistics"), ("id", video_id)])
            .bearer_auth(bearer)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            warn!("Data API request failed: {} - {}", status, body);
            return Err(FetchError::ExtractionError(format!("Data API returned {}", status)).into());
        }

        let list: VideoListResponse = response.json().await?;
        Ok(list
            .items
            .into_iter()
            .next()
            .map(VideoResource::into_video_info))
    }

    /// Download the media bytes for `video` to `output_path`.
    ///
    /// The Data API has no media endpoint, so this always fails.
    pub async fn download(&self, video: &VideoInfo, output_path: &Path) -> Result<()> {
        warn!(
            "Refusing to download {} to {}: no media endpoint in the Data API",
            video.id,
            output_path.display()
        );
        Err(FetchError::NotImplemented("downloading through the YouTube Data API").into())
    }
}
