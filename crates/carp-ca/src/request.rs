//! Key + CSR generation, the `request` utility.
//!
//! Does not require an initialized CA; it exists so an operator can
//! produce a conforming CSR without reaching for openssl.

use std::net::IpAddr;
use std::path::{Path, PathBuf};

use carp_store::{write_atomic, MODE_PUBLIC, MODE_SECRET};
use carp_x509::{build_csr, DistinguishedName, KeyAlgorithm};

use crate::CaError;

#[derive(Debug)]
pub struct RequestOutcome {
    pub subject: String,
    pub algorithm: &'static str,
    pub key_path: PathBuf,
    pub csr_path: PathBuf,
}

/// Generate a key pair and a matching PKCS#10 CSR, writing both out.
/// The private key file is written with mode 0600.
pub fn generate_request(
    subject: &DistinguishedName,
    dns_names: &[String],
    ips: &[IpAddr],
    algorithm: KeyAlgorithm,
    out_key: &Path,
    out_csr: &Path,
) -> Result<RequestOutcome, CaError> {
    let key = algorithm.generate()?;
    let csr_pem = build_csr(subject, dns_names, ips, &key)?;

    write_atomic(out_key, key.serialize_pem().as_bytes(), MODE_SECRET)?;
    write_atomic(out_csr, csr_pem.as_bytes(), MODE_PUBLIC)?;

    tracing::info!(csr = %out_csr.display(), "CSR generated");

    Ok(RequestOutcome {
        subject: subject.format(),
        algorithm: algorithm.display_name(),
        key_path: out_key.to_path_buf(),
        csr_path: out_csr.to_path_buf(),
    })
}
