use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to rename {path}: {source}")]
    Rename {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to create directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to decode PEM block from {path}")]
    PemDecode { path: PathBuf },

    #[error("failed to parse counter value {value:?} in {path}")]
    CounterParse { path: PathBuf, value: String },

    #[error("failed to parse index {path}: {source}")]
    IndexParse {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("failed to encode index: {0}")]
    IndexEncode(serde_json::Error),

    #[error("invalid revoked_at timestamp {value:?} for serial {serial}: expected RFC 3339 UTC with a Z suffix")]
    RevokedAtFormat { serial: String, value: String },
}
