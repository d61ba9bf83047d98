//! Stream-to-file copy

use crate::extractor::ByteStream;
use anyhow::Result;
use futures::StreamExt;
use std::path::Path;
use std::time::Instant;
use tokio::fs::File;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info};

/// Copies retrieval streams to disk
#[derive(Debug, Clone, Default)]
pub struct DownloadEngine;

impl DownloadEngine {
    pub fn new() -> Self {
        Self
    }

    /// Write every chunk of `stream` to `output_path`, returning the byte count.
    ///
    /// The file is created (or truncated) up front and written in place. On
    /// error whatever was already written stays on disk.
    pub async fn save_stream(&self, mut stream: ByteStream, output_path: &Path) -> Result<u64> {
        debug!("Saving stream to {}", output_path.display());

        let mut file = File::create(output_path).await?;
        let start_time = Instant::now();

        let copied = copy_chunks(&mut stream, &mut file).await;
        // Flush even on failure so the partial file is complete on disk
        file.flush().await?;
        let downloaded = copied?;

        let elapsed = start_time.elapsed().as_secs_f64();
        let speed = if elapsed > 0.0 {
            downloaded as f64 / elapsed
        } else {
            0.0
        };
        info!(
            "Saved {} bytes to {} ({:.2} MB/s)",
            downloaded,
            output_path.display(),
            speed / 1024.0 / 1024.0
        );

        Ok(downloaded)
    }
}

async fn copy_chunks(stream: &mut ByteStream, file: &mut File) -> Result<u64> {
    let mut downloaded = 0u64;
    while let Some(chunk_result) = stream.next().await {
        let chunk = chunk_result?;
        file.write_all(&chunk).await?;
        downloaded += chunk.len() as u64;
    }
    Ok(downloaded)
}
