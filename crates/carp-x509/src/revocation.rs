//! Revocation reasons and CRL construction.

use chrono::{DateTime, Utc};
use rcgen::{
    CertificateRevocationListParams, KeyIdMethod, RevocationReason, RevokedCertParams,
    SerialNumber,
};

use crate::{to_asn1_time, CaSigner, X509Error};

/// The accepted reason names, in display order.
pub const VALID_REASONS: [&str; 5] = [
    "unspecified",
    "keyCompromise",
    "affiliationChanged",
    "superseded",
    "cessationOfOperation",
];

/// Map a reason name to its RFC 5280 §5.3.1 code.
pub fn reason_code(name: &str) -> Option<u8> {
    match name {
        "unspecified" => Some(0),
        "keyCompromise" => Some(1),
        "affiliationChanged" => Some(3),
        "superseded" => Some(4),
        "cessationOfOperation" => Some(5),
        _ => None,
    }
}

/// Map an RFC 5280 reason code back to its name.
pub fn reason_name(code: u8) -> Option<&'static str> {
    match code {
        0 => Some("unspecified"),
        1 => Some("keyCompromise"),
        3 => Some("affiliationChanged"),
        4 => Some("superseded"),
        5 => Some("cessationOfOperation"),
        _ => None,
    }
}

fn rcgen_reason(code: u8) -> RevocationReason {
    match code {
        1 => RevocationReason::KeyCompromise,
        3 => RevocationReason::AffiliationChanged,
        4 => RevocationReason::Superseded,
        5 => RevocationReason::CessationOfOperation,
        _ => RevocationReason::Unspecified,
    }
}

/// One revoked certificate, as fed into CRL construction.
#[derive(Debug, Clone)]
pub struct CrlEntry {
    pub serial: u64,
    pub revoked_at: DateTime<Utc>,
    /// Reason name; unknown names fall back to `unspecified`.
    pub reason: String,
}

/// Build a signed X.509 v2 CRL.
///
/// `crl_number` is caller-supplied (the engine owns monotonicity). The
/// AuthorityKeyIdentifier extension carries the CA's SKI.
pub fn build_crl(
    ca: &CaSigner,
    crl_number: u64,
    this_update: DateTime<Utc>,
    next_update: DateTime<Utc>,
    entries: &[CrlEntry],
) -> Result<String, X509Error> {
    let revoked_certs = entries
        .iter()
        .map(|entry| RevokedCertParams {
            serial_number: SerialNumber::from(entry.serial),
            revocation_time: to_asn1_time(entry.revoked_at),
            reason_code: Some(rcgen_reason(reason_code(&entry.reason).unwrap_or(0))),
            invalidity_date: None,
        })
        .collect();

    let params = CertificateRevocationListParams {
        this_update: to_asn1_time(this_update),
        next_update: to_asn1_time(next_update),
        crl_number: SerialNumber::from(crl_number),
        issuing_distribution_point: None,
        revoked_certs,
        key_identifier_method: KeyIdMethod::PreSpecified(ca.subject_key_id().to_vec()),
    };

    let crl = params.signed_by(ca.cert(), ca.key())?;
    Ok(crl.pem()?)
}
