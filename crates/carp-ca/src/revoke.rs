//! Certificate revocation.

use carp_store::{load_index, save_index, CertStatus, DataDir};
use carp_x509::now_utc;

use crate::{rfc3339, CaError};

/// Mark the certificate with `serial` as revoked.
///
/// The transition is one-way; revoking an unknown or already-revoked
/// serial fails without touching disk. A single file changes, so the
/// stage/commit discipline collapses to one atomic replace.
pub fn revoke_certificate(dir: &DataDir, serial: &str, reason: &str) -> Result<(), CaError> {
    if !dir.is_initialized() {
        return Err(CaError::NotInitialized);
    }

    let serial = serial.to_ascii_lowercase();
    let mut index = load_index(&dir.index_path())?;

    let Some(entry) = index.iter_mut().find(|entry| entry.serial == serial) else {
        return Err(CaError::SerialNotFound(serial));
    };
    if entry.status == CertStatus::Revoked {
        return Err(CaError::AlreadyRevoked(serial));
    }

    entry.status = CertStatus::Revoked;
    entry.revoked_at = rfc3339(now_utc());
    entry.revocation_reason = reason.to_string();

    save_index(&dir.index_path(), &index)?;

    tracing::info!(serial = %serial, reason = %reason, "certificate revoked");
    Ok(())
}
