//! Key pair generation and the Subject Key Identifier.

use rand::rngs::OsRng;
use rcgen::KeyPair;
use rsa::pkcs8::{EncodePrivateKey, LineEnding};
use rsa::RsaPrivateKey;
use sha1::{Digest, Sha1};

use crate::X509Error;

/// The two key algorithms this CA issues and accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum KeyAlgorithm {
    #[default]
    EcdsaP256,
    Rsa2048,
}

impl KeyAlgorithm {
    /// The CLI flag spelling.
    pub fn flag_name(self) -> &'static str {
        match self {
            KeyAlgorithm::EcdsaP256 => "ecdsa-p256",
            KeyAlgorithm::Rsa2048 => "rsa-2048",
        }
    }

    /// The human-readable display name.
    pub fn display_name(self) -> &'static str {
        match self {
            KeyAlgorithm::EcdsaP256 => "ECDSA P-256",
            KeyAlgorithm::Rsa2048 => "RSA 2048",
        }
    }

    /// Generate a fresh key pair from the OS CSPRNG.
    ///
    /// RSA keys come from the `rsa` crate and are handed to rcgen as
    /// PKCS#8 with an explicit PKCS#1-v1.5/SHA-256 signing algorithm;
    /// ECDSA keys are generated by rcgen directly.
    pub fn generate(self) -> Result<KeyPair, X509Error> {
        match self {
            KeyAlgorithm::EcdsaP256 => {
                KeyPair::generate_for(&rcgen::PKCS_ECDSA_P256_SHA256).map_err(X509Error::from)
            }
            KeyAlgorithm::Rsa2048 => {
                let private_key = RsaPrivateKey::new(&mut OsRng, 2048)
                    .map_err(|e| X509Error::KeyGeneration(e.to_string()))?;
                let pkcs8 = private_key
                    .to_pkcs8_pem(LineEnding::LF)
                    .map_err(|e| X509Error::KeyGeneration(e.to_string()))?;
                KeyPair::from_pkcs8_pem_and_sign_algo(&pkcs8, &rcgen::PKCS_RSA_SHA256)
                    .map_err(X509Error::from)
            }
        }
    }
}

impl std::fmt::Display for KeyAlgorithm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.display_name())
    }
}

/// Subject Key Identifier: SHA-1 over the DER-encoded
/// SubjectPublicKeyInfo (RFC 5280 §4.2.1.2 method 1).
pub fn subject_key_identifier(spki_der: &[u8]) -> Vec<u8> {
    Sha1::digest(spki_der).to_vec()
}
