//! Data directory layout and the initialization marker.

use std::path::{Path, PathBuf};

use crate::StoreError;

const KEY_FILENAME: &str = "ca.key";
const CERT_FILENAME: &str = "ca.crt";
const SERIAL_FILENAME: &str = "serial";
const CRLNUMBER_FILENAME: &str = "crlnumber";
const INDEX_FILENAME: &str = "index.json";
const CRL_FILENAME: &str = "ca.crl";
const CERTS_DIRNAME: &str = "certs";

/// A CA data directory. Pure path construction plus the marker check;
/// no operation here mutates CA state.
#[derive(Debug, Clone)]
pub struct DataDir {
    root: PathBuf,
}

impl DataDir {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn key_path(&self) -> PathBuf {
        self.root.join(KEY_FILENAME)
    }

    pub fn cert_path(&self) -> PathBuf {
        self.root.join(CERT_FILENAME)
    }

    pub fn serial_path(&self) -> PathBuf {
        self.root.join(SERIAL_FILENAME)
    }

    pub fn crlnumber_path(&self) -> PathBuf {
        self.root.join(CRLNUMBER_FILENAME)
    }

    pub fn index_path(&self) -> PathBuf {
        self.root.join(INDEX_FILENAME)
    }

    pub fn crl_path(&self) -> PathBuf {
        self.root.join(CRL_FILENAME)
    }

    pub fn certs_dir(&self) -> PathBuf {
        self.root.join(CERTS_DIRNAME)
    }

    /// Path of the issued-certificate file for a formatted serial.
    pub fn issued_cert_path(&self, serial: &str) -> PathBuf {
        self.certs_dir().join(format!("{serial}.pem"))
    }

    /// The CA is initialized iff both `ca.key` and `ca.crt` exist.
    pub fn is_initialized(&self) -> bool {
        self.key_path().exists() && self.cert_path().exists()
    }

    /// Create the data directory and its `certs/` subdirectory.
    ///
    /// Idempotent. Returns whether `certs/` was newly created, so a
    /// failed initialization can limit its cleanup to what it made.
    pub fn ensure_layout(&self) -> Result<bool, StoreError> {
        let certs = self.certs_dir();
        let existed = certs.is_dir();
        std::fs::create_dir_all(&certs).map_err(|source| StoreError::CreateDir {
            path: certs.clone(),
            source,
        })?;
        Ok(!existed)
    }
}
