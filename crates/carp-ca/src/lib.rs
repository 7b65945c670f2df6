//! The CA state engine.
//!
//! Every operation here follows two disciplines. **Validate before
//! mutate**: all precondition checks run before any file is touched, so
//! a failing call leaves the data directory byte-identical. **Stage
//! then commit**: multi-file mutations write `.tmp` siblings first and
//! rename into place in an operation-specific order chosen so that a
//! crash between renames leaves a benign gap, never a silent invariant
//! violation.
//!
//! The engine keeps no state across calls; each operation rereads what
//! it needs through `carp-store`.

mod check;
mod crl;
mod error;
mod init;
mod issue;
mod list;
mod request;
mod revoke;
mod verify;

pub use check::{check_consistency, CheckReport};
pub use crl::{generate_crl, CrlOutcome};
pub use error::CaError;
pub use init::{init_ca, InitOutcome};
pub use issue::{sign_csr, IssueOutcome};
pub use list::{list_certificates, CertRow, DisplayStatus};
pub use request::{generate_request, RequestOutcome};
pub use revoke::revoke_certificate;
pub use verify::{verify_certificate, RevocationStatus, VerifyReport};

use std::path::Path;

use carp_store::{DataDir, StoreError};
use carp_x509::CaSigner;
use chrono::{DateTime, SecondsFormat, Utc};

/// RFC 3339 with seconds precision and a `Z` suffix, the only
/// timestamp form this store writes.
pub(crate) fn rfc3339(value: DateTime<Utc>) -> String {
    value.to_rfc3339_opts(SecondsFormat::Secs, true)
}

pub(crate) fn read_text(path: &Path) -> Result<String, CaError> {
    std::fs::read_to_string(path).map_err(|source| {
        StoreError::Read {
            path: path.to_path_buf(),
            source,
        }
        .into()
    })
}

/// Load the CA signing identity from `ca.key` and `ca.crt`.
pub(crate) fn load_signer(dir: &DataDir) -> Result<CaSigner, CaError> {
    let key_pem = read_text(&dir.key_path())?;
    let cert_pem = read_text(&dir.cert_path())?;
    Ok(CaSigner::from_pem(&cert_pem, &key_pem)?)
}
