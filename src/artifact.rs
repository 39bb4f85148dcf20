//! Output artifacts
//!
//! Writing capture bytes to disk and checking that what landed there is a
//! plausible render rather than a blank or truncated file.

use crate::error::{CaptureError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Kind of file a capture produces
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArtifactKind {
    /// Full-page screenshot
    Png,
    /// Printed document
    Pdf,
}

impl ArtifactKind {
    /// File extension
    pub fn extension(self) -> &'static str {
        match self {
            ArtifactKind::Png => "png",
            ArtifactKind::Pdf => "pdf",
        }
    }
}

impl fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArtifactKind::Png => f.write_str("PNG"),
            ArtifactKind::Pdf => f.write_str("PDF"),
        }
    }
}

/// How an artifact was produced
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactOrigin {
    /// Exported directly by the browser
    Browser,
    /// PDF converted from the PNG screenshot
    PngFallback,
}

/// A verified file on disk
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Artifact {
    /// PNG or PDF
    pub kind: ArtifactKind,
    /// Where it was written
    pub path: PathBuf,
    /// Size on disk in bytes
    pub size: u64,
    /// Browser export or fallback conversion
    pub origin: ArtifactOrigin,
}

/// Write `data` to `path`, replacing any previous file
pub async fn write_artifact(path: &Path, data: &[u8]) -> Result<()> {
    tokio::fs::write(path, data).await?;
    debug!("Wrote {} bytes to {}", data.len(), path.display());
    Ok(())
}

/// Check that `path` exists and holds at least `min_bytes`
pub async fn verify_artifact(
    kind: ArtifactKind,
    path: &Path,
    min_bytes: u64,
    origin: ArtifactOrigin,
) -> Result<Artifact> {
    let size = match tokio::fs::metadata(path).await {
        Ok(meta) if meta.is_file() => meta.len(),
        Ok(_) => {
            return Err(CaptureError::Missing {
                kind,
                path: path.to_path_buf(),
            }
            .into())
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(CaptureError::Missing {
                kind,
                path: path.to_path_buf(),
            }
            .into())
        }
        Err(e) => return Err(e.into()),
    };

    if size < min_bytes {
        return Err(CaptureError::Undersized {
            kind,
            path: path.to_path_buf(),
            size,
            min: min_bytes,
        }
        .into());
    }

    info!("{} verified: {} ({} KB)", kind, path.display(), size / 1024);
    Ok(Artifact {
        kind,
        path: path.to_path_buf(),
        size,
        origin,
    })
}

/// Write then verify in one step.
///
/// Data below `min_bytes` is rejected before anything touches the disk, and
/// a file that fails verification is removed.
pub async fn store_artifact(
    kind: ArtifactKind,
    path: &Path,
    data: &[u8],
    min_bytes: u64,
    origin: ArtifactOrigin,
) -> Result<Artifact> {
    let size = data.len() as u64;
    if size < min_bytes {
        return Err(CaptureError::Undersized {
            kind,
            path: path.to_path_buf(),
            size,
            min: min_bytes,
        }
        .into());
    }

    write_artifact(path, data).await?;
    match verify_artifact(kind, path, min_bytes, origin).await {
        Ok(artifact) => Ok(artifact),
        Err(e) => {
            discard(path).await;
            Err(e)
        }
    }
}

/// Remove a rejected artifact, ignoring files that were never written
pub async fn discard(path: &Path) {
    if let Err(e) = tokio::fs::remove_file(path).await {
        if e.kind() != std::io::ErrorKind::NotFound {
            warn!("Failed to remove {}: {}", path.display(), e);
        }
    }
}
