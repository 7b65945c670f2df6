//! Engine error kinds.
//!
//! The `Display` text of the precondition variants is part of the CLI
//! contract; callers print it verbatim.

#[derive(Debug, thiserror::Error)]
pub enum CaError {
    #[error("CA already initialized at {0}")]
    AlreadyInitialized(String),

    #[error("CA not initialized")]
    NotInitialized,

    #[error("failed to parse CSR from {0}")]
    CsrParse(String),

    #[error("CSR signature verification failed")]
    CsrSignature,

    #[error("unsupported key algorithm in CSR. Supported: ECDSA P-256, RSA 2048")]
    UnsupportedCsrKey,

    #[error("certificate with serial {0} not found")]
    SerialNotFound(String),

    #[error("certificate with serial {0} is already revoked")]
    AlreadyRevoked(String),

    #[error("failed to parse serial {0} in index")]
    IndexSerial(String),

    #[error("failed to parse revocation time for serial {0}")]
    IndexRevokedAt(String),

    #[error(transparent)]
    Store(#[from] carp_store::StoreError),

    #[error(transparent)]
    Artifact(#[from] carp_x509::X509Error),
}
