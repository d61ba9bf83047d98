//! yt-dlp backed retrieval
//!
//! Metadata comes from `yt-dlp --dump-json`; the media itself is fetched
//! directly from the format URL yt-dlp resolved, using the headers it reports.

use crate::extractor::models::{Format, VideoInfo};
use crate::extractor::traits::{ByteStream, Extractor};
use crate::utils::error::FetchError;
use crate::utils::http::build_http_client;
use anyhow::Result;
use async_trait::async_trait;
use futures::{StreamExt, TryStreamExt};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::Client;
use std::path::{Path, PathBuf};
use tokio::process::Command as AsyncCommand;
use tracing::{debug, error, info, warn};
use url::Url;

/// Video extractor driving the yt-dlp binary
pub struct YtDlpExtractor {
    ytdlp_path: Option<PathBuf>,
    client: Client,
}

impl YtDlpExtractor {
    /// Initialize extractor and locate yt-dlp
    ///
    /// An explicit path wins; otherwise yt-dlp is searched next to the
    /// executable, on `PATH`, then in common installation paths. A missing
    /// binary is not fatal: the service starts and each extraction fails.
    pub fn new(explicit: Option<&Path>) -> Result<Self> {
        let ytdlp_path = match explicit {
            Some(path) if path.is_file() => Some(path.to_path_buf()),
            Some(path) => {
                warn!("Configured yt-dlp does not exist: {}", path.display());
                None
            }
            None => find_ytdlp(),
        };
        match &ytdlp_path {
            Some(path) => info!("Using yt-dlp at: {}", path.display()),
            None => warn!("yt-dlp not found; video extraction will fail until it is installed"),
        }

        Ok(Self {
            ytdlp_path,
            client: build_http_client()?,
        })
    }

    /// Get the path to yt-dlp being used
    pub fn ytdlp_path(&self) -> Option<&Path> {
        self.ytdlp_path.as_deref()
    }
}

/// Hosts that may receive the user's Google access token
const TOKEN_HOSTS: [&str; 3] = ["youtube.com", "youtu.be", "googlevideo.com"];

/// Whether `raw` is on a YouTube or googlevideo host (or a subdomain of one)
fn accepts_bearer(raw: &str) -> bool {
    let Ok(url) = Url::parse(raw) else {
        return false;
    };
    if !matches!(url.scheme(), "http" | "https") {
        return false;
    }
    let Some(host) = url.host_str() else {
        return false;
    };
    let host = host.trim_end_matches('.').to_ascii_lowercase();
    TOKEN_HOSTS.iter().any(|allowed| {
        host == *allowed
            || host
                .strip_suffix(allowed)
                .is_some_and(|prefix| prefix.ends_with('.'))
    })
}

/// Arguments for a metadata-only yt-dlp run
///
/// The bearer header is only passed for YouTube pages.
fn info_args(url: &str, bearer: Option<&str>) -> Vec<String> {
    let bearer = bearer.filter(|_| accepts_bearer(url));
    let mut args = vec![
        "--dump-json".to_string(),
        "--no-download".to_string(),
        "--no-warnings".to_string(),
        "--no-playlist".to_string(),
    ];
    if let Some(token) = bearer {
        args.push("--add-header".to_string());
        args.push(format!("Authorization:Bearer {}", token));
    }
    args.push("--".to_string());
    args.push(url.to_string());
    args
}

/// Converts the header map yt-dlp reports for a format; invalid entries are skipped
fn format_headers(format: &Format) -> HeaderMap {
    let mut headers = HeaderMap::new();
    for (name, value) in &format.http_headers {
        match (
            HeaderName::from_bytes(name.as_bytes()),
            HeaderValue::from_str(value),
        ) {
            (Ok(name), Ok(value)) => {
                headers.insert(name, value);
            }
            _ => debug!("Skipping unusable header {:?} for format {}", name, format.format_id),
        }
    }
    headers
}

#[async_trait]
impl Extractor for YtDlpExtractor {
    fn id(&self) -> &'static str {
        "ytdlp"
    }

    async fn extract_info(&self, url: &str, bearer: Option<&str>) -> Result<VideoInfo> {
        debug!("Extracting video info for URL: {}", url);
        let ytdlp_path = self.ytdlp_path.as_ref().ok_or(FetchError::YtDlpNotFound)?;

        let output = AsyncCommand::new(ytdlp_path)
            .args(info_args(url, bearer))
            .output()
            .await?;

        if !output.status.success() {
            let error_msg = String::from_utf8_lossy(&output.stderr);
            error!("yt-dlp extraction failed: {}", error_msg.trim());
            return Err(FetchError::ExtractionError(error_msg.trim().to_string()).into());
        }

        let video_info: VideoInfo = serde_json::from_slice(&output.stdout)?;
        debug!(
            "yt-dlp reported {} formats for {}",
            video_info.formats.len(),
            video_info.id
        );
        Ok(video_info)
    }

    async fn open_stream(&self, format: &Format, bearer: Option<&str>) -> Result<ByteStream> {
        if format.url.is_empty() {
            return Err(FetchError::DownloadError(format!(
                "format {} has no media URL",
                format.format_id
            ))
            .into());
        }

        let mut request = self.client.get(&format.url).headers(format_headers(format));
        match bearer {
            Some(token) if accepts_bearer(&format.url) => request = request.bearer_auth(token),
            Some(_) => debug!("Not sending token to foreign host for format {}", format.format_id),
            None => {}
        }

        let response = request.send().await?;
        if !response.status().is_success() {
            return Err(FetchError::DownloadError(format!("HTTP error: {}", response.status())).into());
        }
        debug!(
            "Opened stream for format {} ({:?} bytes)",
            format.format_id,
            response.content_length()
        );

        Ok(response
            .bytes_stream()
            .map_err(std::io::Error::other)
            .boxed())
    }
}

// ============================================================
// yt-dlp Detection Functions
// ============================================================

/// Find yt-dlp binary with priority:
/// 1. Next to the running executable
/// 2. System PATH
/// 3. Common installation paths
pub fn find_ytdlp() -> Option<PathBuf> {
    find_beside_executable()
        .or_else(find_in_path)
        .or_else(find_in_common_paths)
}

fn find_beside_executable() -> Option<PathBuf> {
    let exe_path = std::env::current_exe().ok()?;
    let candidate = exe_path.parent()?.join("yt-dlp");
    is_executable(&candidate).then_some(candidate)
}

fn find_in_path() -> Option<PathBuf> {
    which::which("yt-dlp").ok().filter(|path| path.exists())
}

fn find_in_common_paths() -> Option<PathBuf> {
    let mut candidates = vec![
        PathBuf::from("/usr/local/bin/yt-dlp"),
        PathBuf::from("/usr/bin/yt-dlp"),
        PathBuf::from("/opt/homebrew/bin/yt-dlp"),
    ];
    if let Some(home) = dirs::home_dir() {
        candidates.push(home.join(".local").join("bin").join("yt-dlp"));
    }

    candidates.into_iter().find(|path| is_executable(path))
}

/// Check if a file is executable
fn is_executable(path: &Path) -> bool {
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;

        std::fs::metadata(path)
            .map(|metadata| metadata.is_file() && metadata.permissions().mode() & 0o111 != 0)
            .unwrap_or(false)
    }

    #[cfg(not(unix))]
    {
        path.is_file()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::routing::get;
    use axum::Router;
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};

    #[test]
    fn test_info_args_without_auth() {
        let args = info_args("https://youtu.be/abc123", None);
        assert_eq!(args.first().map(String::as_str), Some("--dump-json"));
        assert_eq!(args.last().map(String::as_str), Some("https://youtu.be/abc123"));
        assert!(!args.iter().any(|a| a == "--add-header"));
    }

    #[test]
    fn test_info_args_with_bearer() {
        let args = info_args("https://youtu.be/abc123", Some("tok"));
        let pos = args.iter().position(|a| a == "--add-header").unwrap();
        assert_eq!(args[pos + 1], "Authorization:Bearer tok");
        // the URL is always after the option terminator
        let dashdash = args.iter().position(|a| a == "--").unwrap();
        assert_eq!(dashdash, args.len() - 2);
    }

    #[test]
    fn test_info_args_drop_bearer_for_foreign_pages() {
        let args = info_args("https://attacker.example/video", Some("tok"));
        assert!(!args.iter().any(|a| a == "--add-header"));
        assert!(!args.iter().any(|a| a.contains("tok")));
    }

    #[test]
    fn test_accepts_bearer() {
        for url in [
            "https://www.youtube.com/watch?v=abc123",
            "https://youtube.com/watch?v=abc123",
            "https://m.youtube.com/watch?v=abc123",
            "https://youtu.be/abc123",
            "https://rr3---sn-4g5e6nzl.googlevideo.com/videoplayback?itag=18",
            "https://WWW.YOUTUBE.COM/watch?v=abc123",
        ] {
            assert!(accepts_bearer(url), "{}", url);
        }
        for url in [
            "https://notyoutube.com/watch?v=abc123",
            "https://youtube.com.attacker.example/",
            "https://evilgooglevideo.com/videoplayback",
            "http://127.0.0.1:8080/media",
            "file:///etc/passwd",
            "not a url",
        ] {
            assert!(!accepts_bearer(url), "{}", url);
        }
    }

    /// Local server recording the Authorization header of each request
    async fn recording_server() -> (String, Arc<Mutex<Vec<Option<String>>>>) {
        let seen: Arc<Mutex<Vec<Option<String>>>> = Arc::default();
        let recorder = seen.clone();
        let app = Router::new().route(
            "/media",
            get(move |headers: axum::http::HeaderMap| {
                let recorder = recorder.clone();
                async move {
                    let auth = headers
                        .get("authorization")
                        .and_then(|v| v.to_str().ok())
                        .map(ToString::to_string);
                    recorder.lock().unwrap().push(auth);
                    "media bytes"
                }
            }),
        );
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        (format!("http://{}/media", addr), seen)
    }

    #[tokio::test]
    async fn test_foreign_media_host_gets_no_token() {
        let (url, seen) = recording_server().await;
        let extractor = YtDlpExtractor {
            ytdlp_path: None,
            client: Client::builder().no_proxy().build().unwrap(),
        };
        let format = Format {
            format_id: "18".to_string(),
            url,
            ..Default::default()
        };

        let stream = extractor
            .open_stream(&format, Some("ya29.secret"))
            .await
            .unwrap();
        let body: Vec<u8> = stream
            .try_fold(Vec::new(), |mut acc, chunk| async move {
                acc.extend_from_slice(&chunk);
                Ok(acc)
            })
            .await
            .unwrap();

        assert_eq!(body, b"media bytes");
        assert_eq!(*seen.lock().unwrap(), vec![None]);
    }

    #[test]
    fn test_format_headers_skips_invalid() {
        let format = Format {
            format_id: "18".to_string(),
            http_headers: HashMap::from([
                ("User-Agent".to_string(), "yt".to_string()),
                ("bad header".to_string(), "x".to_string()),
            ]),
            ..Default::default()
        };
        let headers = format_headers(&format);
        assert_eq!(headers.len(), 1);
        assert_eq!(headers.get("user-agent").unwrap(), "yt");
    }

    #[tokio::test]
    async fn test_missing_explicit_path() {
        let extractor = YtDlpExtractor::new(Some(Path::new("/definitely/not/yt-dlp"))).unwrap();
        assert!(extractor.ytdlp_path().is_none());

        let err = extractor
            .extract_info("https://youtu.be/abc123", None)
            .await
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<FetchError>(),
            Some(FetchError::YtDlpNotFound)
        ));
    }

    #[test]
    fn test_find_ytdlp() {
        let result = find_ytdlp();
        println!("yt-dlp found at: {:?}", result);
        // Don't assert - yt-dlp might not be installed in CI
    }

    #[test]
    fn test_is_executable() {
        let path = PathBuf::from("/bin/sh");
        if path.exists() {
            assert!(is_executable(&path));
        }
        assert!(!is_executable(Path::new("/definitely/not/here")));
    }
}
