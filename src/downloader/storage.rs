//! Downloads directory setup

use std::io;
use std::path::Path;
use tracing::info;

/// Create the downloads directory if it is missing.
///
/// On Unix the directory gets mode `0o755`. An existing directory is left
/// untouched.
pub fn ensure_downloads_dir(path: &Path) -> io::Result<()> {
    if path.is_dir() {
        return Ok(());
    }

    let mut builder = std::fs::DirBuilder::new();
    builder.recursive(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::DirBuilderExt;
        builder.mode(0o755);
    }
    builder.create(path)?;

    info!("Created downloads directory {}", path.display());
    Ok(())
}
