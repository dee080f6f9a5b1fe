use std::io;
use std::path::PathBuf;

use thiserror::Error;
use warden_core::{ConfigError, RemoteError};

/// Failures while assembling or sealing a bundle archive.
#[derive(Debug, Error)]
pub enum ArchiveError {
    #[error("bundle io error: {0}")]
    Io(#[from] io::Error),

    #[error("bundle write error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("bundle source root does not exist: {}", .0.display())]
    MissingRoot(PathBuf),
}

/// Top-level reconciliation failure. Partial application is surfaced, not
/// rolled back; re-running reconciliation is the recovery mechanism.
#[derive(Debug, Error)]
pub enum DeployError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Archive(#[from] ArchiveError),

    #[error(transparent)]
    Remote(#[from] RemoteError),

    #[error("invalid upload target: {0}")]
    InvalidUploadTarget(String),
}
