//! PKCS#10 request handling: inspection of incoming CSRs and
//! construction of outgoing ones.

use std::net::IpAddr;

use rcgen::{CertificateParams, KeyPair, SanType};
use rsa::pkcs1::DecodeRsaPublicKey;
use rsa::traits::PublicKeyParts;
use rsa::RsaPublicKey;
use x509_parser::certification_request::X509CertificationRequest;
use x509_parser::extensions::{GeneralName, ParsedExtension};
use x509_parser::oid_registry::{OID_KEY_TYPE_EC_PUBLIC_KEY, OID_PKCS1_RSAENCRYPTION};
use x509_parser::prelude::FromDer;

use crate::{DistinguishedName, SanEntry, X509Error};

/// prime256v1 / secp256r1.
const P256_CURVE_OID: &str = "1.2.840.10045.3.1.7";

/// Why a CSR was not accepted. The engine maps these onto its
/// contractual error messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CsrError {
    /// Not a parseable PKCS#10 structure.
    Parse,
    /// The self-signature does not verify against the embedded key.
    Signature,
    /// The public key is neither P-256 ECDSA nor RSA-2048.
    UnsupportedKey,
}

/// What the CA needs to know about an accepted CSR.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsrInfo {
    pub subject: DistinguishedName,
    pub subject_alt_names: Vec<SanEntry>,
    /// DER-encoded SubjectPublicKeyInfo, for SKI computation.
    pub spki_der: Vec<u8>,
    /// Drives the keyEncipherment key-usage bit on the issued cert.
    pub key_is_rsa: bool,
}

/// Parse and vet a DER-encoded CSR.
///
/// Checks, in order: PKCS#10 structure, self-signature, key algorithm
/// (P-256 by curve OID, RSA by modulus bit length exactly 2048).
/// Nothing else is checked; subject identity is the operator's problem.
pub fn inspect_csr(der: &[u8]) -> Result<CsrInfo, CsrError> {
    let (_, csr) = X509CertificationRequest::from_der(der).map_err(|_| CsrError::Parse)?;

    csr.verify_signature().map_err(|_| CsrError::Signature)?;

    let info = &csr.certification_request_info;
    let spki = &info.subject_pki;
    let alg = &spki.algorithm;

    let key_is_rsa = if alg.algorithm == OID_KEY_TYPE_EC_PUBLIC_KEY {
        let curve = alg
            .parameters
            .as_ref()
            .and_then(|params| params.as_oid().ok());
        match curve {
            Some(oid) if oid.to_id_string() == P256_CURVE_OID => false,
            _ => return Err(CsrError::UnsupportedKey),
        }
    } else if alg.algorithm == OID_PKCS1_RSAENCRYPTION {
        let modulus_bits = RsaPublicKey::from_pkcs1_der(spki.subject_public_key.data.as_ref())
            .map(|key| key.n().bits())
            .map_err(|_| CsrError::UnsupportedKey)?;
        if modulus_bits != 2048 {
            return Err(CsrError::UnsupportedKey);
        }
        true
    } else {
        return Err(CsrError::UnsupportedKey);
    };

    let mut subject_alt_names = Vec::new();
    if let Some(extensions) = csr.requested_extensions() {
        for ext in extensions {
            if let ParsedExtension::SubjectAlternativeName(san) = ext {
                for general_name in &san.general_names {
                    match general_name {
                        GeneralName::DNSName(name) => {
                            subject_alt_names.push(SanEntry::Dns((*name).to_string()));
                        }
                        GeneralName::RFC822Name(addr) => {
                            subject_alt_names.push(SanEntry::Email((*addr).to_string()));
                        }
                        GeneralName::IPAddress(bytes) => {
                            if let Some(addr) = ip_from_bytes(bytes) {
                                subject_alt_names.push(SanEntry::Ip(addr));
                            }
                        }
                        _ => {}
                    }
                }
            }
        }
    }

    Ok(CsrInfo {
        subject: DistinguishedName::from_x509_name(&info.subject),
        subject_alt_names,
        spki_der: spki.raw.to_vec(),
        key_is_rsa,
    })
}

fn ip_from_bytes(bytes: &[u8]) -> Option<IpAddr> {
    match bytes.len() {
        4 => <[u8; 4]>::try_from(bytes).ok().map(IpAddr::from),
        16 => <[u8; 16]>::try_from(bytes).ok().map(IpAddr::from),
        _ => None,
    }
}

/// Build a PEM-encoded CSR for `subject` with the given SANs, signed by
/// `key`.
pub fn build_csr(
    subject: &DistinguishedName,
    dns_names: &[String],
    ips: &[IpAddr],
    key: &KeyPair,
) -> Result<String, X509Error> {
    let mut params = CertificateParams::default();
    params.distinguished_name = subject.to_rcgen();
    for name in dns_names {
        params
            .subject_alt_names
            .push(SanEntry::Dns(name.clone()).to_san_type()?);
    }
    for ip in ips {
        params.subject_alt_names.push(SanType::IpAddress(*ip));
    }

    let csr = params.serialize_request(key)?;
    Ok(csr.pem()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::KeyAlgorithm;

    fn inspect_pem(pem_text: &str) -> Result<CsrInfo, CsrError> {
        let block = pem::parse(pem_text).expect("pem");
        inspect_csr(block.contents())
    }

    #[test]
    fn build_then_inspect_round_trip() {
        let key = KeyAlgorithm::EcdsaP256.generate().unwrap();
        let subject = DistinguishedName::parse("CN=leaf.example.com,O=Acme").unwrap();
        let pem_text = build_csr(
            &subject,
            &["leaf.example.com".to_string()],
            &["10.0.0.1".parse().unwrap()],
            &key,
        )
        .unwrap();
        assert!(pem_text.contains("BEGIN CERTIFICATE REQUEST"));

        let info = inspect_pem(&pem_text).unwrap();
        assert_eq!(info.subject.format(), "CN=leaf.example.com,O=Acme");
        assert!(!info.key_is_rsa);
        assert!(info
            .subject_alt_names
            .contains(&SanEntry::Dns("leaf.example.com".to_string())));
        assert!(info
            .subject_alt_names
            .contains(&SanEntry::Ip("10.0.0.1".parse().unwrap())));
    }

    #[test]
    fn rsa_csr_is_accepted_and_flagged() {
        let key = KeyAlgorithm::Rsa2048.generate().unwrap();
        let subject = DistinguishedName::parse("CN=rsa.example.com").unwrap();
        let pem_text = build_csr(&subject, &[], &[], &key).unwrap();

        let info = inspect_pem(&pem_text).unwrap();
        assert!(info.key_is_rsa);
    }

    #[test]
    fn tampered_signature_is_rejected() {
        let key = KeyAlgorithm::EcdsaP256.generate().unwrap();
        let subject = DistinguishedName::parse("CN=tamper.example.com").unwrap();
        let pem_text = build_csr(&subject, &[], &[], &key).unwrap();

        let mut der = pem::parse(&pem_text).unwrap().into_contents();
        let last = der.len() - 1;
        der[last] ^= 0x01;

        assert_eq!(inspect_csr(&der), Err(CsrError::Signature));
    }

    #[test]
    fn foreign_key_algorithm_is_rejected() {
        let key = KeyPair::generate_for(&rcgen::PKCS_ED25519).unwrap();
        let subject = DistinguishedName::parse("CN=ed.example.com").unwrap();
        let pem_text = build_csr(&subject, &[], &[], &key).unwrap();

        assert_eq!(inspect_pem(&pem_text), Err(CsrError::UnsupportedKey));
    }

    #[test]
    fn garbage_is_a_parse_error() {
        assert_eq!(inspect_csr(b"not a csr"), Err(CsrError::Parse));
    }
}
