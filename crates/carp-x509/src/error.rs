#[derive(Debug, thiserror::Error)]
pub enum X509Error {
    #[error("certificate generation failed: {0}")]
    Rcgen(#[from] rcgen::Error),

    #[error("key generation failed: {0}")]
    KeyGeneration(String),

    #[error("failed to parse certificate: {0}")]
    CertParse(String),

    #[error("failed to parse CRL: {0}")]
    CrlParse(String),

    #[error("invalid SAN entry: {0}")]
    InvalidSan(String),
}
