use std::io;
use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("missing bundle file {}: {source}", .path.display())]
    MissingBundleFile { path: PathBuf, source: io::Error },

    #[error("malformed bundle file {}: {source}", .path.display())]
    MalformedBundleFile {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("unknown dispatch symbol: {0}")]
    UnknownDispatchSymbol(String),

    #[error("policy engine failed to load policies: {0}")]
    Engine(String),

    #[error("policy {name} failed: {message}")]
    Policy { name: String, message: String },
}
