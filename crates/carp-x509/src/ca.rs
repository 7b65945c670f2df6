//! Root certificate construction and the loaded CA signing identity.

use chrono::{DateTime, Utc};
use rcgen::{
    BasicConstraints, Certificate, CertificateParams, CertificateSigningRequestParams, IsCa,
    KeyIdMethod, KeyPair, KeyUsagePurpose, SerialNumber,
};
use x509_parser::extensions::ParsedExtension;
use x509_parser::prelude::{FromDer, X509Certificate};

use crate::keys::subject_key_identifier;
use crate::{to_asn1_time, CsrInfo, DistinguishedName, X509Error};

/// The root certificate always carries serial 1; issued certificates
/// start at 2.
pub const ROOT_SERIAL: u64 = 1;

/// Build the self-signed X.509v3 root certificate.
///
/// Extensions: BasicConstraints (critical, cA=TRUE), KeyUsage (critical,
/// keyCertSign | cRLSign), SubjectKeyIdentifier = SHA-1 of the key's
/// SubjectPublicKeyInfo. Signed SHA-256 per the key type.
pub fn build_root_certificate(
    subject: &DistinguishedName,
    key: &KeyPair,
    not_before: DateTime<Utc>,
    not_after: DateTime<Utc>,
) -> Result<String, X509Error> {
    let mut params = CertificateParams::default();
    params.distinguished_name = subject.to_rcgen();
    params.is_ca = IsCa::Ca(BasicConstraints::Unconstrained);
    params.key_usages = vec![KeyUsagePurpose::KeyCertSign, KeyUsagePurpose::CrlSign];
    params.serial_number = Some(SerialNumber::from(ROOT_SERIAL));
    params.not_before = to_asn1_time(not_before);
    params.not_after = to_asn1_time(not_after);
    params.key_identifier_method =
        KeyIdMethod::PreSpecified(subject_key_identifier(&key.public_key_der()));

    let cert = params.self_signed(key)?;
    Ok(cert.pem())
}

/// The CA identity reloaded from `ca.crt` + `ca.key`, ready to sign.
///
/// rcgen needs an issuer `Certificate` object, so the parameters are
/// rebuilt from the stored certificate and re-signed in memory; the
/// on-disk SubjectKeyIdentifier is pinned so issued AKIs keep matching.
pub struct CaSigner {
    cert: Certificate,
    key: KeyPair,
    subject: DistinguishedName,
    subject_key_id: Vec<u8>,
}

impl CaSigner {
    pub fn from_pem(cert_pem: &str, key_pem: &str) -> Result<Self, X509Error> {
        let key = KeyPair::from_pem(key_pem)?;

        let block = pem::parse(cert_pem).map_err(|e| X509Error::CertParse(e.to_string()))?;
        let (_, parsed) = X509Certificate::from_der(block.contents())
            .map_err(|e| X509Error::CertParse(e.to_string()))?;

        let subject = DistinguishedName::from_x509_name(parsed.subject());
        let subject_key_id = parsed
            .extensions()
            .iter()
            .find_map(|ext| match ext.parsed_extension() {
                ParsedExtension::SubjectKeyIdentifier(ki) => Some(ki.0.to_vec()),
                _ => None,
            })
            .unwrap_or_else(|| subject_key_identifier(parsed.public_key().raw));

        let mut params = CertificateParams::from_ca_cert_pem(cert_pem)?;
        params.key_identifier_method = KeyIdMethod::PreSpecified(subject_key_id.clone());
        let cert = params.self_signed(&key)?;

        Ok(Self {
            cert,
            key,
            subject,
            subject_key_id,
        })
    }

    pub fn cert(&self) -> &Certificate {
        &self.cert
    }

    pub fn key(&self) -> &KeyPair {
        &self.key
    }

    pub fn subject(&self) -> &DistinguishedName {
        &self.subject
    }

    pub fn subject_key_id(&self) -> &[u8] {
        &self.subject_key_id
    }
}

/// Issue an end-entity certificate for a vetted CSR.
///
/// Extensions: BasicConstraints (critical, cA=FALSE), KeyUsage
/// (critical, digitalSignature, plus keyEncipherment for RSA subject
/// keys), SubjectKeyIdentifier of the CSR key, AuthorityKeyIdentifier =
/// the CA's SKI, and the CSR's SANs copied verbatim (omitted when the
/// CSR carried none).
pub fn issue_certificate(
    ca: &CaSigner,
    csr_pem: &str,
    csr: &CsrInfo,
    serial: u64,
    not_before: DateTime<Utc>,
    not_after: DateTime<Utc>,
) -> Result<String, X509Error> {
    let mut request = CertificateSigningRequestParams::from_pem(csr_pem)?;
    let params = &mut request.params;

    params.serial_number = Some(SerialNumber::from(serial));
    params.not_before = to_asn1_time(not_before);
    params.not_after = to_asn1_time(not_after);
    params.is_ca = IsCa::ExplicitNoCa;
    params.key_usages = vec![KeyUsagePurpose::DigitalSignature];
    if csr.key_is_rsa {
        params.key_usages.push(KeyUsagePurpose::KeyEncipherment);
    }
    params.extended_key_usages.clear();
    params.custom_extensions.clear();
    params.use_authority_key_identifier_extension = true;
    params.key_identifier_method =
        KeyIdMethod::PreSpecified(subject_key_identifier(&csr.spki_der));
    params.subject_alt_names = csr
        .subject_alt_names
        .iter()
        .map(|san| san.to_san_type())
        .collect::<Result<Vec<_>, _>>()?;

    let cert = request.signed_by(ca.cert(), ca.key())?;
    Ok(cert.pem())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{build_csr, inspect_csr, now_utc, KeyAlgorithm};
    use chrono::Duration;
    use x509_parser::extensions::GeneralName;

    fn parse(pem_text: &str) -> Vec<u8> {
        pem::parse(pem_text).expect("pem").into_contents()
    }

    fn test_root() -> (String, KeyPair, DistinguishedName) {
        let subject = DistinguishedName::parse("CN=Test Root CA,O=Test Org,C=US").unwrap();
        let key = KeyAlgorithm::EcdsaP256.generate().unwrap();
        let now = now_utc();
        let cert_pem =
            build_root_certificate(&subject, &key, now, now + Duration::days(3650)).unwrap();
        (cert_pem, key, subject)
    }

    #[test]
    fn root_is_self_signed_ca_with_serial_one() {
        let (cert_pem, _, _) = test_root();
        let der = parse(&cert_pem);
        let (_, cert) = X509Certificate::from_der(&der).unwrap();

        assert_eq!(cert.subject(), cert.issuer());
        assert_eq!(cert.raw_serial(), &[0x01]);
        cert.verify_signature(None).expect("self-signature");

        let bc = cert
            .extensions()
            .iter()
            .find_map(|ext| match ext.parsed_extension() {
                ParsedExtension::BasicConstraints(bc) => Some((ext.critical, bc.ca)),
                _ => None,
            })
            .expect("basic constraints");
        assert_eq!(bc, (true, true));

        let ku = cert
            .extensions()
            .iter()
            .find_map(|ext| match ext.parsed_extension() {
                ParsedExtension::KeyUsage(ku) => Some((ext.critical, ku.key_cert_sign(), ku.crl_sign())),
                _ => None,
            })
            .expect("key usage");
        assert_eq!(ku, (true, true, true));
    }

    #[test]
    fn signer_reload_preserves_subject_and_ski() {
        let (cert_pem, key, subject) = test_root();
        let signer = CaSigner::from_pem(&cert_pem, &key.serialize_pem()).unwrap();

        assert_eq!(signer.subject(), &subject);

        let der = parse(&cert_pem);
        let (_, cert) = X509Certificate::from_der(&der).unwrap();
        let ski = cert
            .extensions()
            .iter()
            .find_map(|ext| match ext.parsed_extension() {
                ParsedExtension::SubjectKeyIdentifier(ki) => Some(ki.0.to_vec()),
                _ => None,
            })
            .expect("ski");
        assert_eq!(signer.subject_key_id(), ski.as_slice());
    }

    #[test]
    fn issued_certificate_chains_to_ca() {
        let (cert_pem, key, _) = test_root();
        let signer = CaSigner::from_pem(&cert_pem, &key.serialize_pem()).unwrap();

        let leaf_key = KeyAlgorithm::EcdsaP256.generate().unwrap();
        let leaf_subject = DistinguishedName::parse("CN=leaf.example.com").unwrap();
        let csr_pem = build_csr(
            &leaf_subject,
            &["leaf.example.com".to_string()],
            &[],
            &leaf_key,
        )
        .unwrap();
        let info = inspect_csr(&parse(&csr_pem)).unwrap();

        let now = now_utc();
        let issued =
            issue_certificate(&signer, &csr_pem, &info, 2, now, now + Duration::days(365))
                .unwrap();

        let ca_der = parse(&cert_pem);
        let (_, ca_cert) = X509Certificate::from_der(&ca_der).unwrap();
        let leaf_der = parse(&issued);
        let (_, leaf) = X509Certificate::from_der(&leaf_der).unwrap();

        assert_eq!(leaf.issuer(), ca_cert.subject());
        assert_eq!(leaf.raw_serial(), &[0x02]);
        leaf.verify_signature(Some(ca_cert.public_key()))
            .expect("chain signature");

        // cA=FALSE, critical
        let bc = leaf
            .extensions()
            .iter()
            .find_map(|ext| match ext.parsed_extension() {
                ParsedExtension::BasicConstraints(bc) => Some((ext.critical, bc.ca)),
                _ => None,
            })
            .expect("basic constraints");
        assert_eq!(bc, (true, false));

        // AKI matches the CA's SKI.
        let aki = leaf
            .extensions()
            .iter()
            .find_map(|ext| match ext.parsed_extension() {
                ParsedExtension::AuthorityKeyIdentifier(aki) => {
                    aki.key_identifier.as_ref().map(|ki| ki.0.to_vec())
                }
                _ => None,
            })
            .expect("aki");
        assert_eq!(aki.as_slice(), signer.subject_key_id());

        // SANs copied from the CSR.
        let san_names: Vec<String> = leaf
            .extensions()
            .iter()
            .find_map(|ext| match ext.parsed_extension() {
                ParsedExtension::SubjectAlternativeName(san) => Some(
                    san.general_names
                        .iter()
                        .filter_map(|gn| match gn {
                            GeneralName::DNSName(name) => Some((*name).to_string()),
                            _ => None,
                        })
                        .collect(),
                ),
                _ => None,
            })
            .expect("san");
        assert_eq!(san_names, vec!["leaf.example.com".to_string()]);
    }

    #[test]
    fn san_free_csr_yields_san_free_certificate() {
        let (cert_pem, key, _) = test_root();
        let signer = CaSigner::from_pem(&cert_pem, &key.serialize_pem()).unwrap();

        let leaf_key = KeyAlgorithm::EcdsaP256.generate().unwrap();
        let leaf_subject = DistinguishedName::parse("CN=plain.example.com").unwrap();
        let csr_pem = build_csr(&leaf_subject, &[], &[], &leaf_key).unwrap();
        let info = inspect_csr(&parse(&csr_pem)).unwrap();

        let now = now_utc();
        let issued =
            issue_certificate(&signer, &csr_pem, &info, 3, now, now + Duration::days(30))
                .unwrap();
        let der = parse(&issued);
        let (_, leaf) = X509Certificate::from_der(&der).unwrap();

        let has_san = leaf.extensions().iter().any(|ext| {
            matches!(
                ext.parsed_extension(),
                ParsedExtension::SubjectAlternativeName(_)
            )
        });
        assert!(!has_san);
    }
}
