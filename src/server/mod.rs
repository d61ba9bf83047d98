//! HTTP surface: one router per service variant
//!
//! Every variant exposes `POST /download`. The OAuth variants add `/auth` and
//! `/oauth2callback`, and the library variant also serves saved files under
//! `/downloads/`.

pub mod error;
pub mod handlers;

pub use error::ApiError;

use crate::auth::{OAuthClient, StateStore, TokenStore};
use crate::downloader::DownloadEngine;
use crate::extractor::{DataApiClient, Extractor, YtDlpExtractor};
use crate::utils::config::{AppSettings, Variant};
use crate::utils::http::build_http_client;
use anyhow::Result;
use axum::{
    extract::FromRef,
    routing::{get, post},
    Router,
};
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

/// Everything the authorization endpoints need
pub struct OAuthState {
    pub client: OAuthClient,
    pub tokens: TokenStore,
    pub states: StateStore,
}

impl OAuthState {
    pub fn new(client: OAuthClient, tokens: TokenStore) -> Self {
        Self {
            client,
            tokens,
            states: StateStore::default(),
        }
    }
}

/// yt-dlp retrieval with the persisted OAuth2 token
#[derive(Clone)]
pub struct LibraryState {
    pub oauth: Arc<OAuthState>,
    pub extractor: Arc<dyn Extractor>,
    pub engine: DownloadEngine,
    pub downloads_dir: PathBuf,
}

/// Data API metadata with the persisted OAuth2 token
#[derive(Clone)]
pub struct DataApiState {
    pub oauth: Arc<OAuthState>,
    pub data_api: Arc<DataApiClient>,
    pub downloads_dir: PathBuf,
}

/// Unauthenticated yt-dlp retrieval
#[derive(Clone)]
pub struct DirectState {
    pub extractor: Arc<dyn Extractor>,
    pub engine: DownloadEngine,
    pub downloads_dir: PathBuf,
}

impl FromRef<LibraryState> for Arc<OAuthState> {
    fn from_ref(state: &LibraryState) -> Self {
        Arc::clone(&state.oauth)
    }
}

impl FromRef<DataApiState> for Arc<OAuthState> {
    fn from_ref(state: &DataApiState) -> Self {
        Arc::clone(&state.oauth)
    }
}

fn oauth_routes<S>() -> Router<S>
where
    Arc<OAuthState>: FromRef<S>,
    S: Clone + Send + Sync + 'static,
{
    Router::new()
        .route("/auth", get(handlers::auth_redirect))
        .route("/oauth2callback", get(handlers::oauth_callback))
}

pub fn library_router(state: LibraryState) -> Router {
    let downloads = ServeDir::new(&state.downloads_dir);
    oauth_routes()
        .route(
            "/download",
            post(handlers::download_library).fallback(handlers::method_not_allowed),
        )
        .nest_service("/downloads", downloads)
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

pub fn data_api_router(state: DataApiState) -> Router {
    oauth_routes()
        .route(
            "/download",
            post(handlers::download_data_api).fallback(handlers::method_not_allowed),
        )
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

pub fn direct_router(state: DirectState) -> Router {
    Router::new()
        .route(
            "/download",
            post(handlers::download_direct).fallback(handlers::method_not_allowed),
        )
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

/// Wire up the real backends for the configured variant
pub fn build_router(settings: &AppSettings) -> Result<Router> {
    let http = build_http_client()?;
    let oauth = || {
        Arc::new(OAuthState::new(
            OAuthClient::new(settings.oauth.clone(), http.clone()),
            TokenStore::new(&settings.token_file),
        ))
    };

    let router = match settings.variant {
        Variant::Library => library_router(LibraryState {
            oauth: oauth(),
            extractor: Arc::new(YtDlpExtractor::new(settings.ytdlp_path.as_deref())?),
            engine: DownloadEngine::new(),
            downloads_dir: settings.downloads_dir.clone(),
        }),
        Variant::DataApi => data_api_router(DataApiState {
            oauth: oauth(),
            data_api: Arc::new(DataApiClient::new(http.clone(), &settings.data_api_url)),
            downloads_dir: settings.downloads_dir.clone(),
        }),
        Variant::Direct => direct_router(DirectState {
            extractor: Arc::new(YtDlpExtractor::new(settings.ytdlp_path.as_deref())?),
            engine: DownloadEngine::new(),
            downloads_dir: settings.downloads_dir.clone(),
        }),
    };
    Ok(router)
}
