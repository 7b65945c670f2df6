//! Certificate verification against the CA, the clock, and the CRL.

use std::path::Path;

use carp_store::{format_serial_bytes, load_pem, read_pem_block, DataDir};
use carp_x509::{now_utc, reason_name, DistinguishedName, X509Error};
use chrono::{DateTime, Utc};
use x509_parser::prelude::{CertificateRevocationList, FromDer, X509Certificate};

use crate::CaError;

/// Outcome of the revocation check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RevocationStatus {
    /// No CRL has been generated yet; not a failure.
    NotChecked,
    /// A CRL exists and does not list this serial.
    Clear,
    /// The current CRL lists this serial.
    Revoked { reason: String, date: DateTime<Utc> },
}

impl std::fmt::Display for RevocationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RevocationStatus::NotChecked => f.write_str("NOT CHECKED (no CRL available)"),
            RevocationStatus::Clear => f.write_str("OK (not revoked)"),
            RevocationStatus::Revoked { reason, date } => write!(
                f,
                "REVOKED (reason: {reason}, date: {})",
                date.to_rfc3339_opts(chrono::SecondsFormat::Secs, true)
            ),
        }
    }
}

#[derive(Debug)]
pub struct VerifyReport {
    pub valid: bool,
    pub subject: String,
    pub serial: String,
    pub issuer: String,
    pub not_before: DateTime<Utc>,
    pub not_after: DateTime<Utc>,
    pub sig_ok: bool,
    pub expiry_ok: bool,
    pub revocation: RevocationStatus,
}

fn to_utc(seconds: i64) -> DateTime<Utc> {
    DateTime::from_timestamp(seconds, 0).unwrap_or(DateTime::<Utc>::MIN_UTC)
}

/// Verify a PEM certificate blob against this CA.
///
/// Checks run in order: signature (a failure stops the report there),
/// validity window (inclusive), revocation against `ca.crl` when one
/// exists. A missing CRL is reported but does not invalidate.
/// Read-only: nothing in the data directory is modified.
pub fn verify_certificate(
    dir: &DataDir,
    cert_pem: &[u8],
    cert_path: &Path,
) -> Result<VerifyReport, CaError> {
    if !dir.is_initialized() {
        return Err(CaError::NotInitialized);
    }

    let block = read_pem_block(cert_path, cert_pem)?;
    let (_, cert) = X509Certificate::from_der(block.contents())
        .map_err(|e| X509Error::CertParse(e.to_string()))?;

    let ca_der = load_pem(&dir.cert_path())?;
    let (_, ca_cert) =
        X509Certificate::from_der(&ca_der).map_err(|e| X509Error::CertParse(e.to_string()))?;

    let mut report = VerifyReport {
        valid: false,
        subject: DistinguishedName::from_x509_name(cert.subject()).format(),
        serial: format_serial_bytes(cert.raw_serial()),
        issuer: DistinguishedName::from_x509_name(cert.issuer()).format(),
        not_before: to_utc(cert.validity().not_before.timestamp()),
        not_after: to_utc(cert.validity().not_after.timestamp()),
        sig_ok: false,
        expiry_ok: false,
        revocation: RevocationStatus::NotChecked,
    };

    // Check 1: signature. On failure the later checks are not reported.
    if cert
        .verify_signature(Some(ca_cert.public_key()))
        .is_err()
    {
        return Ok(report);
    }
    report.sig_ok = true;

    // Check 2: validity window, inclusive at both ends.
    let now = now_utc();
    report.expiry_ok = now >= report.not_before && now <= report.not_after;

    // Check 3: revocation, only when a CRL has been published.
    let mut revoked = false;
    let crl_path = dir.crl_path();
    if crl_path.exists() {
        let crl_der = load_pem(&crl_path)?;
        let (_, crl) = CertificateRevocationList::from_der(&crl_der)
            .map_err(|e| X509Error::CrlParse(e.to_string()))?;

        for entry in crl.iter_revoked_certificates() {
            if entry.user_certificate == cert.tbs_certificate.serial {
                revoked = true;
                let reason = entry
                    .reason_code()
                    .and_then(|(_, code)| reason_name(code.0))
                    .unwrap_or("unspecified")
                    .to_string();
                report.revocation = RevocationStatus::Revoked {
                    reason,
                    date: to_utc(entry.revocation_date.timestamp()),
                };
                break;
            }
        }
        if !revoked {
            report.revocation = RevocationStatus::Clear;
        }
    }

    report.valid = report.sig_ok && report.expiry_ok && !revoked;
    Ok(report)
}
