//! Data-directory consistency check.
//!
//! Read-only audit of the invariants the engine maintains, plus the
//! benign gaps a commit-phase crash can leave behind (skipped serials,
//! orphan certificate files, a CRL number the counter has not caught up
//! with). Nothing here repairs anything; it reports.

use std::collections::HashSet;

use carp_store::{format_serial, load_index, load_pem, read_counter, CertStatus, DataDir};
use carp_x509::X509Error;
use x509_parser::extensions::ParsedExtension;
use x509_parser::prelude::{CertificateRevocationList, FromDer};

use crate::CaError;

#[derive(Debug)]
pub struct CheckReport {
    /// Number of index entries examined.
    pub entries: usize,
    /// Human-readable findings; empty when the directory is consistent.
    pub issues: Vec<String>,
}

impl CheckReport {
    pub fn is_clean(&self) -> bool {
        self.issues.is_empty()
    }
}

pub fn check_consistency(dir: &DataDir) -> Result<CheckReport, CaError> {
    if !dir.is_initialized() {
        return Err(CaError::NotInitialized);
    }

    let index = load_index(&dir.index_path())?;
    let serial_counter = read_counter(&dir.serial_path())?;
    let crl_counter = read_counter(&dir.crlnumber_path())?;
    let mut issues = Vec::new();

    // Serial counter: exactly 2 + N after clean operation; greater
    // means a crash consumed serials, smaller risks reuse.
    let expected = 2 + index.len() as u64;
    if serial_counter < expected {
        issues.push(format!(
            "serial counter {} is behind the index ({} entries); future issuance may reuse a serial",
            format_serial(serial_counter),
            index.len()
        ));
    } else if serial_counter > expected {
        issues.push(format!(
            "serial gap: counter {} but index has {} entries (an interrupted issuance skipped serials)",
            format_serial(serial_counter),
            index.len()
        ));
    }

    // Per-entry checks.
    let mut seen = HashSet::new();
    for entry in &index {
        if !seen.insert(entry.serial.clone()) {
            issues.push(format!("duplicate serial {} in index", entry.serial));
        }
        if entry.serial == "01" {
            issues.push("root serial 01 present in index".to_string());
        }
        if !dir.issued_cert_path(&entry.serial).exists() {
            issues.push(format!(
                "index entry {} has no certificate file",
                entry.serial
            ));
        }
        if entry.status == CertStatus::Revoked && entry.revocation_reason.is_empty() {
            issues.push(format!(
                "revoked entry {} has no revocation reason",
                entry.serial
            ));
        }
    }

    // Orphan certificate files and leftover staging files.
    for dirent in list_dir(dir, &dir.certs_dir())? {
        if let Some(serial) = dirent.strip_suffix(".pem") {
            if !seen.contains(serial) {
                issues.push(format!(
                    "orphan certificate file certs/{dirent} (no index entry)"
                ));
            }
        }
        if dirent.ends_with(".tmp") {
            issues.push(format!("leftover staging file certs/{dirent}"));
        }
    }
    for dirent in list_dir(dir, dir.root())? {
        if dirent.ends_with(".tmp") {
            issues.push(format!("leftover staging file {dirent}"));
        }
    }

    // CRL number: a published CRL normally trails the counter by one.
    let crl_path = dir.crl_path();
    if crl_path.exists() {
        let crl_der = load_pem(&crl_path)?;
        let (_, crl) = CertificateRevocationList::from_der(&crl_der)
            .map_err(|e| X509Error::CrlParse(e.to_string()))?;
        let embedded = crl
            .extensions()
            .iter()
            .find_map(|ext| match ext.parsed_extension() {
                ParsedExtension::CRLNumber(number) => Some(format!("{number:x}")),
                _ => None,
            });
        if let Some(embedded) = embedded {
            let counter_hex = format!("{crl_counter:x}");
            if embedded == counter_hex {
                issues.push(format!(
                    "ca.crl carries number {embedded} equal to the crlnumber counter; \
                     a CRL generation was likely interrupted and the number will be reused"
                ));
            }
        }
    }

    Ok(CheckReport {
        entries: index.len(),
        issues,
    })
}

fn list_dir(dir: &DataDir, path: &std::path::Path) -> Result<Vec<String>, CaError> {
    let entries = std::fs::read_dir(path).map_err(|source| carp_store::StoreError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let mut names = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|source| carp_store::StoreError::Read {
            path: dir.root().to_path_buf(),
            source,
        })?;
        names.push(entry.file_name().to_string_lossy().into_owned());
    }
    names.sort();
    Ok(names)
}
