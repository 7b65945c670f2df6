//! CRL generation.

use std::path::PathBuf;

use carp_store::{
    counter_bytes, load_index, read_counter, CertStatus, DataDir, Stage, MODE_PUBLIC,
};
use carp_x509::{build_crl, now_utc, CrlEntry};
use chrono::{DateTime, Duration, Utc};

use crate::{load_signer, CaError};

#[derive(Debug)]
pub struct CrlOutcome {
    pub this_update: DateTime<Utc>,
    pub next_update: DateTime<Utc>,
    pub crl_number: u64,
    pub revoked_count: usize,
    pub crl_path: PathBuf,
}

/// Generate and publish a CRL covering the currently revoked set.
///
/// Commit order: `ca.crl` first, then the counter. A crash between the
/// two leaves an up-to-date CRL whose embedded number will be reused by
/// the next generation. That is strictly better than publishing a stale CRL
/// under a fresh number. The condition is detectable: the published
/// CRL's number equals the `crlnumber` file instead of trailing it by
/// one.
pub fn generate_crl(dir: &DataDir, next_update_hours: u32) -> Result<CrlOutcome, CaError> {
    if !dir.is_initialized() {
        return Err(CaError::NotInitialized);
    }

    let ca = load_signer(dir)?;
    let index = load_index(&dir.index_path())?;
    let crl_number = read_counter(&dir.crlnumber_path())?;

    let mut entries = Vec::new();
    for record in index.iter().filter(|e| e.status == CertStatus::Revoked) {
        let serial = u64::from_str_radix(&record.serial, 16)
            .map_err(|_| CaError::IndexSerial(record.serial.clone()))?;
        let revoked_at = DateTime::parse_from_rfc3339(&record.revoked_at)
            .map_err(|_| CaError::IndexRevokedAt(record.serial.clone()))?
            .with_timezone(&Utc);
        entries.push(CrlEntry {
            serial,
            revoked_at,
            reason: record.revocation_reason.clone(),
        });
    }

    let now = now_utc();
    let next_update = now + Duration::hours(i64::from(next_update_hours));
    let crl_pem = build_crl(&ca, crl_number, now, next_update, &entries)?;

    let mut stage = Stage::new();
    // Commit order contract: ca.crl, then crlnumber.
    stage.write(&dir.crl_path(), crl_pem.as_bytes(), MODE_PUBLIC)?;
    stage.write(
        &dir.crlnumber_path(),
        &counter_bytes(crl_number + 1),
        MODE_PUBLIC,
    )?;
    stage.commit()?;

    tracing::info!(
        number = crl_number,
        revoked = entries.len(),
        "CRL generated"
    );

    Ok(CrlOutcome {
        this_update: now,
        next_update,
        crl_number,
        revoked_count: entries.len(),
        crl_path: dir.crl_path(),
    })
}
