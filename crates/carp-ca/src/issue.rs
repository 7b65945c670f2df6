//! CSR signing and certificate issuance.

use std::path::{Path, PathBuf};

use carp_store::{
    counter_bytes, encode_index, format_serial, load_index, read_counter, read_pem_block,
    CertStatus, DataDir, IndexEntry, Stage, MODE_PUBLIC,
};
use carp_x509::{inspect_csr, issue_certificate, now_utc, CsrError};
use chrono::{DateTime, Duration, Utc};

use crate::{load_signer, rfc3339, CaError};

#[derive(Debug)]
pub struct IssueOutcome {
    pub serial: String,
    pub subject: String,
    pub not_after: DateTime<Utc>,
    pub cert_path: PathBuf,
}

/// Validate a CSR and issue a signed end-entity certificate.
///
/// The validate phase (marker check, PEM decode, PKCS#10 parse, CSR
/// self-signature, key-algorithm gate) runs before any file is written.
/// The commit order is serial first: the counter advances before the
/// certificate exists, so a crash can skip a serial but never reuse
/// one. Then come the certificate file, then the index, which makes the
/// entry visible only once both of its referents are in place.
pub fn sign_csr(
    dir: &DataDir,
    csr_pem: &[u8],
    csr_path: &Path,
    validity_days: u32,
) -> Result<IssueOutcome, CaError> {
    if !dir.is_initialized() {
        return Err(CaError::NotInitialized);
    }

    let display_path = csr_path.display().to_string();
    let block = read_pem_block(csr_path, csr_pem)
        .map_err(|_| CaError::CsrParse(display_path.clone()))?;
    let csr = inspect_csr(block.contents()).map_err(|err| match err {
        CsrError::Parse => CaError::CsrParse(display_path),
        CsrError::Signature => CaError::CsrSignature,
        CsrError::UnsupportedKey => CaError::UnsupportedCsrKey,
    })?;

    let ca = load_signer(dir)?;
    let serial_value = read_counter(&dir.serial_path())?;
    let serial_hex = format_serial(serial_value);

    let now = now_utc();
    let not_after = now + Duration::days(i64::from(validity_days));
    let subject = csr.subject.format();

    let cert_pem = issue_certificate(
        &ca,
        &pem::encode(&block),
        &csr,
        serial_value,
        now,
        not_after,
    )?;

    let cert_file = dir.issued_cert_path(&serial_hex);
    let mut index = load_index(&dir.index_path())?;
    index.push(IndexEntry {
        serial: serial_hex.clone(),
        subject: subject.clone(),
        not_before: rfc3339(now),
        not_after: rfc3339(not_after),
        status: CertStatus::Active,
        revoked_at: String::new(),
        revocation_reason: String::new(),
    });
    let index_bytes = encode_index(&index)?;

    let mut stage = Stage::new();
    // Commit order contract: serial, certs/<serial>.pem, index.json.
    stage.write(
        &dir.serial_path(),
        &counter_bytes(serial_value + 1),
        MODE_PUBLIC,
    )?;
    stage.write(&cert_file, cert_pem.as_bytes(), MODE_PUBLIC)?;
    stage.write(&dir.index_path(), &index_bytes, MODE_PUBLIC)?;
    stage.commit()?;

    tracing::info!(serial = %serial_hex, subject = %subject, "certificate issued");

    Ok(IssueOutcome {
        serial: serial_hex,
        subject,
        not_after,
        cert_path: cert_file,
    })
}
