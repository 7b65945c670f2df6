//! The JSON certificate index.
//!
//! `index.json` is an array of one record per issued end-entity
//! certificate. The root certificate never appears here.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::{write_atomic, StoreError, MODE_PUBLIC};

/// Lifecycle state of an issued certificate. The transition is one-way:
/// once revoked, an entry never becomes active again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CertStatus {
    Active,
    Revoked,
}

/// One issued certificate, as stored in `index.json`.
///
/// `revoked_at` and `revocation_reason` are empty strings while the
/// entry is active; on revocation they carry the RFC 3339 UTC instant
/// and the reason name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexEntry {
    pub serial: String,
    pub subject: String,
    pub not_before: String,
    pub not_after: String,
    pub status: CertStatus,
    pub revoked_at: String,
    pub revocation_reason: String,
}

/// Serialize entries as the on-disk form: 2-space-indented JSON array
/// with a trailing newline.
pub fn encode_index(entries: &[IndexEntry]) -> Result<Vec<u8>, StoreError> {
    let mut data = serde_json::to_vec_pretty(&entries).map_err(StoreError::IndexEncode)?;
    data.push(b'\n');
    Ok(data)
}

/// Load and validate the index.
///
/// A revoked entry whose `revoked_at` does not end in `Z` is rejected;
/// timestamps in this store are always UTC and a hand-edited offset
/// would silently shift CRL revocation times.
pub fn load_index(path: &Path) -> Result<Vec<IndexEntry>, StoreError> {
    let data = std::fs::read(path).map_err(|source| StoreError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let entries: Vec<IndexEntry> =
        serde_json::from_slice(&data).map_err(|source| StoreError::IndexParse {
            path: path.to_path_buf(),
            source,
        })?;
    for entry in &entries {
        if entry.status == CertStatus::Revoked && !entry.revoked_at.ends_with('Z') {
            return Err(StoreError::RevokedAtFormat {
                serial: entry.serial.clone(),
                value: entry.revoked_at.clone(),
            });
        }
    }
    Ok(entries)
}

/// Write the index through the atomic replace primitive.
pub fn save_index(path: &Path, entries: &[IndexEntry]) -> Result<(), StoreError> {
    let data = encode_index(entries)?;
    write_atomic(path, &data, MODE_PUBLIC)
}
