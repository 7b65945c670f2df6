//! CA initialization.

use std::path::PathBuf;

use carp_store::{
    counter_bytes, encode_index, format_serial, DataDir, Stage, MODE_PUBLIC, MODE_SECRET,
};
use carp_x509::{
    build_root_certificate, now_utc, DistinguishedName, KeyAlgorithm, KeyPair, ROOT_SERIAL,
};
use chrono::{DateTime, Duration, Utc};

use crate::CaError;

#[derive(Debug)]
pub struct InitOutcome {
    pub subject: String,
    pub algorithm: &'static str,
    pub serial: String,
    pub not_after: DateTime<Utc>,
    pub cert_path: PathBuf,
    pub key_path: PathBuf,
}

/// Initialize the root CA in `dir`.
///
/// Fails without touching disk when the initialization marker (both
/// `ca.key` and `ca.crt`) is already present. Otherwise stages all five
/// state files and commits them counters-first, marker-last: a crash
/// anywhere before the final renames leaves a directory the marker
/// still reports as uninitialized, so a retry simply restages.
pub fn init_ca(
    dir: &DataDir,
    subject: &DistinguishedName,
    algorithm: KeyAlgorithm,
    validity_days: u32,
) -> Result<InitOutcome, CaError> {
    if dir.is_initialized() {
        return Err(CaError::AlreadyInitialized(
            dir.root().display().to_string(),
        ));
    }

    let key = algorithm.generate()?;
    let now = now_utc();
    let not_after = now + Duration::days(i64::from(validity_days));
    let cert_pem = build_root_certificate(subject, &key, now, not_after)?;

    let created_certs_dir = dir.ensure_layout()?;

    if let Err(err) = stage_and_commit(dir, &key, &cert_pem) {
        // Leave the data directory itself alone (it may pre-exist and
        // hold unrelated files) but take back the certs/ subdirectory
        // if this attempt created it.
        if created_certs_dir {
            let _ = std::fs::remove_dir(dir.certs_dir());
        }
        return Err(err);
    }

    tracing::info!(dir = %dir.root().display(), "CA initialized");

    Ok(InitOutcome {
        subject: subject.format(),
        algorithm: algorithm.display_name(),
        serial: format_serial(ROOT_SERIAL),
        not_after,
        cert_path: dir.cert_path(),
        key_path: dir.key_path(),
    })
}

fn stage_and_commit(dir: &DataDir, key: &KeyPair, cert_pem: &str) -> Result<(), CaError> {
    let mut stage = Stage::new();
    // Commit order contract: serial, crlnumber, index.json, ca.key, ca.crt.
    stage.write(&dir.serial_path(), &counter_bytes(2), MODE_PUBLIC)?;
    stage.write(&dir.crlnumber_path(), &counter_bytes(1), MODE_PUBLIC)?;
    stage.write(&dir.index_path(), &encode_index(&[])?, MODE_PUBLIC)?;
    stage.write(&dir.key_path(), key.serialize_pem().as_bytes(), MODE_SECRET)?;
    stage.write(&dir.cert_path(), cert_pem.as_bytes(), MODE_PUBLIC)?;
    stage.commit()?;
    Ok(())
}
