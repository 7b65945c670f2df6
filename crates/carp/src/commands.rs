//! Command handlers: translate parsed flags into engine calls and
//! engine outcomes into exit codes.

use std::path::{Path, PathBuf};

use carp_ca::{
    check_consistency, generate_crl, generate_request, init_ca, list_certificates,
    revoke_certificate, sign_csr, verify_certificate, CaError,
};
use carp_store::DataDir;
use carp_x509::{parse_san_list, DistinguishedName};

use crate::cli::{KeyAlgorithmArg, ReasonArg};
use crate::format;

/// A failed command, split by band: usage errors exit 2, everything
/// else (engine preconditions, I/O) exits 1.
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error("{0}")]
    Usage(String),

    #[error(transparent)]
    Ca(#[from] CaError),

    #[error("failed to read {what} file {path}: {source}")]
    ReadInput {
        what: &'static str,
        path: PathBuf,
        source: std::io::Error,
    },
}

impl CliError {
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Usage(_) => 2,
            _ => 1,
        }
    }
}

fn parse_subject(input: &str) -> Result<DistinguishedName, CliError> {
    DistinguishedName::parse(input).map_err(|e| CliError::Usage(format!("invalid subject: {e}")))
}

pub fn init(
    subject: &str,
    key_algorithm: KeyAlgorithmArg,
    validity: u32,
    data_dir: &Path,
) -> Result<i32, CliError> {
    let subject = parse_subject(subject)?;
    let outcome = init_ca(
        &DataDir::new(data_dir),
        &subject,
        key_algorithm.into(),
        validity,
    )?;
    format::init_summary(&outcome);
    Ok(0)
}

pub fn sign(csr_path: &Path, validity: u32, data_dir: &Path) -> Result<i32, CliError> {
    let bytes = std::fs::read(csr_path).map_err(|source| CliError::ReadInput {
        what: "CSR",
        path: csr_path.to_path_buf(),
        source,
    })?;
    let outcome = sign_csr(&DataDir::new(data_dir), &bytes, csr_path, validity)?;
    format::sign_summary(&outcome);
    Ok(0)
}

pub fn revoke(serial: &str, reason: ReasonArg, data_dir: &Path) -> Result<i32, CliError> {
    let serial = serial.to_ascii_lowercase();
    revoke_certificate(&DataDir::new(data_dir), &serial, reason.name())?;
    format::revoke_summary(&serial, reason.name());
    Ok(0)
}

pub fn crl(next_update: u32, data_dir: &Path) -> Result<i32, CliError> {
    let outcome = generate_crl(&DataDir::new(data_dir), next_update)?;
    format::crl_summary(&outcome);
    Ok(0)
}

pub fn list(data_dir: &Path) -> Result<i32, CliError> {
    let rows = list_certificates(&DataDir::new(data_dir))?;
    format::cert_table(&rows);
    Ok(0)
}

pub fn verify(cert_path: &Path, data_dir: &Path) -> Result<i32, CliError> {
    let bytes = std::fs::read(cert_path).map_err(|source| CliError::ReadInput {
        what: "certificate",
        path: cert_path.to_path_buf(),
        source,
    })?;
    let report = verify_certificate(&DataDir::new(data_dir), &bytes, cert_path)?;
    Ok(format::verify_report(&report))
}

pub fn request(
    subject: &str,
    san: &str,
    key_algorithm: KeyAlgorithmArg,
    out_key: &Path,
    out_csr: &Path,
) -> Result<i32, CliError> {
    let subject = parse_subject(subject)?;
    let (dns_names, ips) =
        parse_san_list(san).map_err(|e| CliError::Usage(format!("invalid SAN: {e}")))?;
    let outcome = generate_request(
        &subject,
        &dns_names,
        &ips,
        key_algorithm.into(),
        out_key,
        out_csr,
    )?;
    format::request_summary(&outcome);
    Ok(0)
}

pub fn check(data_dir: &Path) -> Result<i32, CliError> {
    let report = check_consistency(&DataDir::new(data_dir))?;
    Ok(format::check_report(&report))
}
