//! Data structures for video information

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Video information structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VideoInfo {
    pub id: String,
    pub title: String,
    /// Page URL; yt-dlp's top-level `url` is a media URL and is ignored
    #[serde(rename = "webpage_url", default)]
    pub url: String,
    #[serde(default)]
    pub duration: Option<u64>,
    pub thumbnail: Option<String>,
    pub uploader: Option<String>,
    pub upload_date: Option<String>,
    #[serde(default)]
    pub formats: Vec<Format>,
    pub description: Option<String>,
    pub view_count: Option<u64>,
    pub like_count: Option<u64>,
    pub extractor: Option<String>,
}

/// Video format information
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Format {
    pub format_id: String,
    #[serde(default)]
    pub ext: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub filesize: Option<u64>,
    pub resolution: Option<String>,
    pub fps: Option<f32>,
    pub vcodec: Option<String>,
    pub acodec: Option<String>,
    pub format_note: Option<String>,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub tbr: Option<f32>, // Total bitrate
    pub abr: Option<f32>, // Audio bitrate
    /// Delivery protocol, e.g. `https` or `m3u8_native`
    #[serde(default)]
    pub protocol: Option<String>,
    /// Headers the CDN expects on the media request
    #[serde(default)]
    pub http_headers: HashMap<String, String>,
}

impl Format {
    /// yt-dlp reports `"none"` for a missing audio track
    pub fn has_audio(&self) -> bool {
        matches!(self.acodec.as_deref(), Some(codec) if !codec.is_empty() && codec != "none")
    }

    /// Whether `url` points at the media bytes rather than a manifest.
    /// A format without a reported protocol is taken to be a plain URL.
    pub fn is_progressive(&self) -> bool {
        matches!(self.protocol.as_deref(), None | Some("http") | Some("https"))
    }

    pub fn height_or_zero(&self) -> u32 {
        self.height.unwrap_or(0)
    }
}
