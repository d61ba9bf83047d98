//! Request handlers
//!
//! Every download handler runs the same straight line: decode the body,
//! authenticate, fetch metadata, pick a format, copy the stream to disk,
//! respond. Any failure ends the request with a single error response.

use crate::auth::load_usable_token;
use crate::downloader::DownloadEngine;
use crate::extractor::{extract_video_id, select_best_audio_format, Extractor};
use crate::server::error::ApiError;
use crate::server::{DataApiState, DirectState, LibraryState, OAuthState};
use crate::utils::filename::download_file_name;
use axum::{
    body::{Body, Bytes},
    extract::{Query, State},
    http::{
        header::{CONTENT_DISPOSITION, CONTENT_LENGTH, CONTENT_TYPE, LOCATION},
        HeaderMap, HeaderValue, StatusCode,
    },
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::fs::File;
use tokio_util::io::ReaderStream;
use tracing::{debug, info};

/// Body of `POST /download`
#[derive(Debug, Deserialize)]
pub struct RequestBody {
    #[serde(default)]
    pub url: String,
}

/// Success body of the library variant
#[derive(Debug, Serialize, Deserialize)]
pub struct DownloadResponse {
    pub message: String,
    pub url: String,
}

#[derive(Debug, Deserialize)]
pub struct CallbackParams {
    code: Option<String>,
    state: Option<String>,
    error: Option<String>,
}

struct SavedVideo {
    file_name: String,
    path: PathBuf,
}

/// `302 Found` pointing at `location`
fn found(location: String) -> Response {
    (StatusCode::FOUND, [(LOCATION, location)]).into_response()
}

fn parse_request(body: &[u8]) -> Result<String, ApiError> {
    let request: RequestBody =
        serde_json::from_slice(body).map_err(|_| ApiError::bad_request("Invalid JSON body"))?;

    let url = request.url.trim();
    if url.is_empty() {
        return Err(ApiError::bad_request("Please provide a video URL"));
    }
    Ok(url.to_string())
}

/// Relative link under which the library variant serves a saved file
fn download_link(file_name: &str) -> String {
    let encoded: String = url::form_urlencoded::byte_serialize(file_name.as_bytes()).collect();
    format!("/downloads/{}", encoded)
}

fn content_disposition(file_name: &str) -> String {
    let ascii: String = file_name
        .chars()
        .map(|c| {
            if c.is_ascii_graphic() && c != '"' && c != '\\' {
                c
            } else {
                '_'
            }
        })
        .collect();
    let encoded: String = url::form_urlencoded::byte_serialize(file_name.as_bytes()).collect();
    format!("attachment; filename=\"{}\"; filename*=UTF-8''{}", ascii, encoded)
}

pub async fn method_not_allowed() -> ApiError {
    ApiError::method_not_allowed()
}

/// `GET /auth`: send the user to the provider's consent page
pub async fn auth_redirect(State(oauth): State<Arc<OAuthState>>) -> Result<Response, ApiError> {
    let state = oauth.states.issue().await;
    let url = oauth
        .client
        .authorize_url(&state)
        .map_err(|e| ApiError::internal(format!("Error building authorization URL: {}", e)))?;
    debug!("Redirecting to consent page");
    Ok(found(url))
}

/// `GET /oauth2callback`: trade the code for a token and persist it
pub async fn oauth_callback(
    State(oauth): State<Arc<OAuthState>>,
    Query(params): Query<CallbackParams>,
) -> Result<Response, ApiError> {
    if let Some(error) = params.error {
        return Err(ApiError::bad_request(format!(
            "Authorization was not granted: {}",
            error
        )));
    }
    let code = params
        .code
        .filter(|code| !code.is_empty())
        .ok_or_else(|| ApiError::bad_request("Missing authorization code"))?;
    let state = params.state.unwrap_or_default();
    if !oauth.states.consume(&state).await {
        return Err(ApiError::bad_request("Invalid or expired OAuth state"));
    }

    let token = oauth
        .client
        .exchange_code(&code)
        .await
        .map_err(|e| ApiError::internal(format!("Error exchanging code for token: {}", e)))?;
    oauth
        .tokens
        .save(&token)
        .await
        .map_err(|e| ApiError::internal(format!("Error saving token: {}", e)))?;

    info!("Stored OAuth token in {}", oauth.tokens.path().display());
    Ok(found("/download".to_string()))
}

async fn fetch_to_disk(
    extractor: &dyn Extractor,
    engine: &DownloadEngine,
    downloads_dir: &Path,
    url: &str,
    bearer: Option<&str>,
) -> Result<SavedVideo, ApiError> {
    let video = extractor
        .extract_info(url, bearer)
        .await
        .map_err(|e| ApiError::internal(format!("Error getting video info: {}", e)))?;

    let format = select_best_audio_format(&video.formats)
        .map_err(|e| ApiError::internal(e.to_string()))?;
    info!(
        "Selected format {} ({}p) for \"{}\" via {}",
        format.format_id,
        format.height_or_zero(),
        video.title,
        extractor.id()
    );

    let file_name = download_file_name(&video.title);
    let path = downloads_dir.join(&file_name);

    let stream = extractor
        .open_stream(format, bearer)
        .await
        .map_err(|e| ApiError::internal(format!("Error downloading video: {}", e)))?;
    engine
        .save_stream(stream, &path)
        .await
        .map_err(|e| ApiError::internal(format!("Error saving video: {}", e)))?;

    Ok(SavedVideo { file_name, path })
}

/// `POST /download` for the library variant
pub async fn download_library(
    State(state): State<LibraryState>,
    body: Bytes,
) -> Result<Json<DownloadResponse>, ApiError> {
    let url = parse_request(&body)?;

    let token = load_usable_token(&state.oauth.tokens, &state.oauth.client)
        .await
        .map_err(|e| ApiError::internal(format!("Error getting OAuth2 client: {}", e)))?;

    let saved = fetch_to_disk(
        state.extractor.as_ref(),
        &state.engine,
        &state.downloads_dir,
        &url,
        Some(&token.access_token),
    )
    .await?;

    Ok(Json(DownloadResponse {
        message: "Video downloaded successfully".to_string(),
        url: download_link(&saved.file_name),
    }))
}

/// `POST /download` for the data-api variant
pub async fn download_data_api(
    State(state): State<DataApiState>,
    body: Bytes,
) -> Result<Json<DownloadResponse>, ApiError> {
    let url = parse_request(&body)?;

    let video_id = extract_video_id(&url);
    if video_id.is_empty() {
        return Err(ApiError::bad_request("Invalid YouTube URL"));
    }

    let token = load_usable_token(&state.oauth.tokens, &state.oauth.client)
        .await
        .map_err(|e| ApiError::internal(format!("Error getting OAuth2 client: {}", e)))?;

    let video = state
        .data_api
        .fetch_video(&video_id, &token.access_token)
        .await
        .map_err(|e| ApiError::internal(format!("Error getting video info: {}", e)))?
        .ok_or_else(|| ApiError::not_found("Video not found"))?;

    let file_name = download_file_name(&video.title);
    let path = state.downloads_dir.join(&file_name);
    state
        .data_api
        .download(&video, &path)
        .await
        .map_err(|e| ApiError::internal(format!("Error downloading video: {}", e)))?;

    Ok(Json(DownloadResponse {
        message: "Video downloaded successfully".to_string(),
        url: download_link(&file_name),
    }))
}

/// `POST /download` for the direct variant: the saved file is the response
pub async fn download_direct(
    State(state): State<DirectState>,
    body: Bytes,
) -> Result<Response, ApiError> {
    let url = parse_request(&body)?;

    let saved = fetch_to_disk(
        state.extractor.as_ref(),
        &state.engine,
        &state.downloads_dir,
        &url,
        None,
    )
    .await?;

    let file = File::open(&saved.path)
        .await
        .map_err(|e| ApiError::internal(format!("Error opening saved video: {}", e)))?;
    let length = file
        .metadata()
        .await
        .map_err(|e| ApiError::internal(format!("Error opening saved video: {}", e)))?
        .len();

    let mut headers = HeaderMap::new();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("video/mp4"));
    headers.insert(CONTENT_LENGTH, HeaderValue::from(length));
    headers.insert(
        CONTENT_DISPOSITION,
        HeaderValue::from_str(&content_disposition(&saved.file_name))
            .map_err(|_| ApiError::internal("Error building download headers"))?,
    );

    Ok((headers, Body::from_stream(ReaderStream::new(file))).into_response())
}
