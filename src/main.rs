//! tubefetch - fetch a video by URL over HTTP and keep it on disk
//!
//! One process serves one variant: `library` (yt-dlp + OAuth2), `data-api`
//! (YouTube Data API + OAuth2) or `direct` (yt-dlp, file in the response).

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;
use tubefetch::downloader::ensure_downloads_dir;
use tubefetch::utils::{AppSettings, Variant};

#[derive(Parser)]
#[command(version, about)]
struct Args {
    /// Service variant to run
    #[arg(long, value_enum)]
    variant: Option<Variant>,

    /// JSON settings file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Listen address, e.g. 0.0.0.0:8000
    #[arg(long)]
    bind: Option<String>,

    /// Directory for downloaded videos
    #[arg(long)]
    downloads_dir: Option<PathBuf>,

    /// File holding the OAuth2 token
    #[arg(long)]
    token_file: Option<PathBuf>,
}

impl Args {
    fn apply(self, settings: &mut AppSettings) {
        if let Some(variant) = self.variant {
            settings.variant = variant;
        }
        if let Some(bind) = self.bind {
            settings.bind_addr = bind;
        }
        if let Some(dir) = self.downloads_dir {
            settings.downloads_dir = dir;
        }
        if let Some(file) = self.token_file {
            settings.token_file = file;
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("tubefetch=info,tower_http=info")),
        )
        .init();

    let mut settings = AppSettings::load(args.config.as_deref())?;
    args.apply(&mut settings);
    settings.warn_on_gaps();

    ensure_downloads_dir(&settings.downloads_dir).with_context(|| {
        format!(
            "Error creating downloads directory {}",
            settings.downloads_dir.display()
        )
    })?;

    let app = tubefetch::build_router(&settings)?;

    let listener = TcpListener::bind(&settings.bind_addr)
        .await
        .with_context(|| format!("Error binding {}", settings.bind_addr))?;
    info!(
        "Server ({}) is running on http://{}",
        settings.variant.as_str(),
        listener.local_addr()?
    );

    axum::serve(listener, app).await?;
    Ok(())
}
