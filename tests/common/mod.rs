//! Shared fixtures for the router tests: a canned retrieval backend and
//! throwaway provider endpoints on localhost.
#![allow(dead_code)]

use anyhow::Result;
use async_trait::async_trait;
use axum::body::{Body, Bytes};
use axum::http::{HeaderMap, Request, StatusCode};
use axum::routing::post;
use axum::{Form, Json, Router};
use chrono::{Duration, Utc};
use futures::{stream, StreamExt};
use http_body_util::BodyExt;
use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::net::TcpListener;
use tower::ServiceExt;
use tubefetch::auth::{OAuthClient, PersistedToken, TokenStore};
use tubefetch::extractor::{ByteStream, Extractor, Format, VideoInfo};
use tubefetch::server::OAuthState;
use tubefetch::utils::OAuthSettings;

/// Retrieval backend returning a fixed video and payload
pub struct MockExtractor {
    pub video: VideoInfo,
    pub payload: Vec<u8>,
    pub info_calls: AtomicUsize,
    pub stream_calls: AtomicUsize,
    pub bearers: Mutex<Vec<Option<String>>>,
    pub streamed_formats: Mutex<Vec<String>>,
}

impl MockExtractor {
    pub fn new(video: VideoInfo, payload: &[u8]) -> Arc<Self> {
        Arc::new(Self {
            video,
            payload: payload.to_vec(),
            info_calls: AtomicUsize::new(0),
            stream_calls: AtomicUsize::new(0),
            bearers: Mutex::new(Vec::new()),
            streamed_formats: Mutex::new(Vec::new()),
        })
    }

    pub fn info_calls(&self) -> usize {
        self.info_calls.load(Ordering::SeqCst)
    }

    pub fn stream_calls(&self) -> usize {
        self.stream_calls.load(Ordering::SeqCst)
    }

    pub fn streamed_formats(&self) -> Vec<String> {
        self.streamed_formats.lock().unwrap().clone()
    }

    pub fn last_bearer(&self) -> Option<String> {
        self.bearers.lock().unwrap().last().cloned().flatten()
    }
}

#[async_trait]
impl Extractor for MockExtractor {
    fn id(&self) -> &'static str {
        "mock"
    }

    async fn extract_info(&self, _url: &str, bearer: Option<&str>) -> Result<VideoInfo> {
        self.info_calls.fetch_add(1, Ordering::SeqCst);
        self.bearers
            .lock()
            .unwrap()
            .push(bearer.map(ToString::to_string));
        Ok(self.video.clone())
    }

    async fn open_stream(&self, format: &Format, _bearer: Option<&str>) -> Result<ByteStream> {
        self.stream_calls.fetch_add(1, Ordering::SeqCst);
        self.streamed_formats
            .lock()
            .unwrap()
            .push(format.format_id.clone());
        let mid = self.payload.len() / 2;
        let chunks = vec![
            Ok(Bytes::copy_from_slice(&self.payload[..mid])),
            Ok(Bytes::copy_from_slice(&self.payload[mid..])),
        ];
        Ok(stream::iter(chunks).boxed())
    }
}

pub fn sample_format(id: &str, height: u32, audio: bool) -> Format {
    Format {
        format_id: id.to_string(),
        ext: "mp4".to_string(),
        url: format!("https://cdn.example.com/{}", id),
        height: Some(height),
        acodec: Some(if audio { "mp4a.40.2" } else { "none" }.to_string()),
        vcodec: Some("avc1".to_string()),
        ..Default::default()
    }
}

pub fn sample_video(title: &str, formats: Vec<Format>) -> VideoInfo {
    VideoInfo {
        id: "abc123".to_string(),
        title: title.to_string(),
        url: "https://www.youtube.com/watch?v=abc123".to_string(),
        formats,
        ..Default::default()
    }
}

pub fn valid_token(access: &str) -> PersistedToken {
    PersistedToken {
        access_token: access.to_string(),
        token_type: "Bearer".to_string(),
        refresh_token: Some("1//refresh".to_string()),
        expiry: Some(Utc::now() + Duration::hours(1)),
    }
}

/// Client that never goes through an environment proxy
pub fn test_http_client() -> reqwest::Client {
    reqwest::Client::builder().no_proxy().build().unwrap()
}

pub fn oauth_state(token_file: &Path, token_url: &str) -> Arc<OAuthState> {
    let settings = OAuthSettings {
        client_id: "client-1".to_string(),
        client_secret: "secret-1".to_string(),
        token_url: token_url.to_string(),
        ..Default::default()
    };
    Arc::new(OAuthState::new(
        OAuthClient::new(settings, test_http_client()),
        TokenStore::new(token_file),
    ))
}

pub fn post_json(uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub fn request(method: &str, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

pub async fn send(app: &Router, req: Request<Body>) -> (StatusCode, HeaderMap, Bytes) {
    let response = app.clone().oneshot(req).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let body = response.into_body().collect().await.unwrap().to_bytes();
    (status, headers, body)
}

pub fn error_message(body: &[u8]) -> String {
    let value: serde_json::Value = serde_json::from_slice(body).unwrap();
    value["error"].as_str().unwrap_or_default().to_string()
}

pub fn dir_is_empty(path: &Path) -> bool {
    std::fs::read_dir(path).unwrap().next().is_none()
}

/// Serve `router` on an ephemeral localhost port, returning its base URL
pub async fn spawn_server(router: Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{}", addr)
}

/// Token endpoint that answers per grant type; returns its URL
pub async fn fake_token_endpoint() -> String {
    let router = Router::new().route(
        "/token",
        post(|Form(params): Form<HashMap<String, String>>| async move {
            match params.get("grant_type").map(String::as_str) {
                Some("authorization_code") if params.get("code").map(String::as_str) == Some("good-code") => (
                    StatusCode::OK,
                    Json(serde_json::json!({
                        "access_token": "ya29.from-code",
                        "refresh_token": "1//from-code",
                        "token_type": "Bearer",
                        "expires_in": 3599
                    })),
                ),
                Some("refresh_token") => (
                    StatusCode::OK,
                    Json(serde_json::json!({
                        "access_token": "ya29.refreshed",
                        "token_type": "Bearer",
                        "expires_in": 3599
                    })),
                ),
                _ => (
                    StatusCode::BAD_REQUEST,
                    Json(serde_json::json!({"error": "invalid_grant"})),
                ),
            }
        }),
    );
    format!("{}/token", spawn_server(router).await)
}
