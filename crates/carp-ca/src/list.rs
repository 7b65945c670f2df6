//! Certificate listing.

use carp_store::{load_index, CertStatus, DataDir};
use carp_x509::now_utc;
use chrono::{DateTime, Utc};

use crate::CaError;

/// Display status, computed at listing time: stored revocation wins,
/// then expiry against the clock, else active.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayStatus {
    Active,
    Revoked,
    Expired,
}

impl std::fmt::Display for DisplayStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            DisplayStatus::Active => "active",
            DisplayStatus::Revoked => "revoked",
            DisplayStatus::Expired => "expired",
        })
    }
}

#[derive(Debug)]
pub struct CertRow {
    pub serial: String,
    pub subject: String,
    pub not_after: DateTime<Utc>,
    pub status: DisplayStatus,
}

/// List issued certificates in stored order. Read-only.
pub fn list_certificates(dir: &DataDir) -> Result<Vec<CertRow>, CaError> {
    if !dir.is_initialized() {
        return Err(CaError::NotInitialized);
    }

    let index = load_index(&dir.index_path())?;
    let now = now_utc();

    let rows = index
        .into_iter()
        .map(|entry| {
            let not_after = DateTime::parse_from_rfc3339(&entry.not_after)
                .map(|t| t.with_timezone(&Utc))
                .unwrap_or(DateTime::<Utc>::MIN_UTC);
            let status = if entry.status == CertStatus::Revoked {
                DisplayStatus::Revoked
            } else if now > not_after {
                DisplayStatus::Expired
            } else {
                DisplayStatus::Active
            };
            CertRow {
                serial: entry.serial,
                subject: entry.subject,
                not_after,
                status,
            }
        })
        .collect();

    Ok(rows)
}
