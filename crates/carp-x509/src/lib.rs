//! X.509 artifact construction and validation.
//!
//! Certificates, CSRs, and CRLs are built and signed with `rcgen`;
//! incoming artifacts are parsed and their signatures checked with
//! `x509-parser`. All functions here are purely constructive: no file
//! I/O, no CA state. Time enters as `chrono::DateTime<Utc>` and is
//! converted to `time::OffsetDateTime` only at the rcgen boundary.

mod ca;
mod csr;
mod dn;
mod error;
mod keys;
mod revocation;
mod san;

pub use ca::{build_root_certificate, issue_certificate, CaSigner, ROOT_SERIAL};
pub use csr::{build_csr, inspect_csr, CsrError, CsrInfo};
pub use dn::{DistinguishedName, DnError};
pub use error::X509Error;
pub use keys::{subject_key_identifier, KeyAlgorithm};
pub use revocation::{build_crl, reason_code, reason_name, CrlEntry, VALID_REASONS};
pub use san::{parse_san_list, SanEntry, SanError};

// The signing key type crosses this crate's boundary (the engine holds
// generated keys between building artifacts and persisting them).
pub use rcgen::KeyPair;

use chrono::{DateTime, Utc};

/// Truncate to whole seconds; X.509 validity times carry no sub-second
/// precision, and the index stores the same instant as RFC 3339.
pub fn now_utc() -> DateTime<Utc> {
    let now = Utc::now();
    DateTime::from_timestamp(now.timestamp(), 0).unwrap_or(now)
}

/// Convert a domain timestamp to the rcgen boundary type.
pub(crate) fn to_asn1_time(value: DateTime<Utc>) -> time::OffsetDateTime {
    time::OffsetDateTime::from_unix_timestamp(value.timestamp())
        .unwrap_or_else(|_| time::OffsetDateTime::now_utc())
}
