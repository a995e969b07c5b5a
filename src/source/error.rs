use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum PayloadError {
    #[error("failed to read graph payload from {}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("graph payload is not valid JSON")]
    Json(#[from] serde_json::Error),
    #[error("node {id:?} has unknown type {kind:?}")]
    UnknownNodeType { id: String, kind: String },
    #[error("link {id:?} has unknown type {kind:?}")]
    UnknownLinkType { id: String, kind: String },
}
