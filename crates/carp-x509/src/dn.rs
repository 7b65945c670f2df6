//! Distinguished Name parsing and formatting.
//!
//! The CLI surface uses a narrow subset of RFC 4514: comma-separated
//! `TYPE=VALUE` components with the six common attribute types. No
//! escaping, no multi-valued RDNs, no hex encoding.

use rcgen::DnType;
use x509_parser::x509::X509Name;

/// The attribute types recognized on input and emitted on output.
const KNOWN_TYPES: &str = "CN, O, OU, L, ST, C";

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum DnError {
    #[error("distinguished name cannot be empty")]
    Empty,

    #[error("invalid component {0:?} (missing '=')")]
    MissingEquals(String),

    #[error("empty value for attribute {0:?}")]
    EmptyValue(String),

    #[error("unknown attribute type {0:?} (recognized: {KNOWN_TYPES})")]
    UnknownType(String),
}

/// A structured subject or issuer name.
///
/// Formatting order is fixed: CN, then each O, OU, L, ST, C.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DistinguishedName {
    pub common_name: Option<String>,
    pub organization: Vec<String>,
    pub organizational_unit: Vec<String>,
    pub locality: Vec<String>,
    pub state_or_province: Vec<String>,
    pub country: Vec<String>,
}

impl DistinguishedName {
    /// Parse a DN string such as `CN=My Root CA,O=My Org,C=US`.
    ///
    /// Attribute types are case-insensitive; whitespace around each
    /// component and around type/value is trimmed; empty components
    /// between commas are skipped.
    pub fn parse(input: &str) -> Result<Self, DnError> {
        if input.trim().is_empty() {
            return Err(DnError::Empty);
        }

        let mut name = Self::default();
        for part in input.split(',') {
            let part = part.trim();
            if part.is_empty() {
                continue;
            }
            let Some((attr_type, attr_value)) = part.split_once('=') else {
                return Err(DnError::MissingEquals(part.to_string()));
            };
            let attr_type = attr_type.trim();
            let attr_value = attr_value.trim();
            if attr_value.is_empty() {
                return Err(DnError::EmptyValue(attr_type.to_string()));
            }

            match attr_type.to_ascii_uppercase().as_str() {
                "CN" => name.common_name = Some(attr_value.to_string()),
                "O" => name.organization.push(attr_value.to_string()),
                "OU" => name.organizational_unit.push(attr_value.to_string()),
                "L" => name.locality.push(attr_value.to_string()),
                "ST" => name.state_or_province.push(attr_value.to_string()),
                "C" => name.country.push(attr_value.to_string()),
                _ => return Err(DnError::UnknownType(attr_type.to_string())),
            }
        }

        Ok(name)
    }

    /// Format in the fixed order, skipping empty fields, components
    /// joined by `,` with no spaces.
    pub fn format(&self) -> String {
        let mut parts = Vec::new();
        if let Some(cn) = &self.common_name {
            parts.push(format!("CN={cn}"));
        }
        for o in &self.organization {
            parts.push(format!("O={o}"));
        }
        for ou in &self.organizational_unit {
            parts.push(format!("OU={ou}"));
        }
        for l in &self.locality {
            parts.push(format!("L={l}"));
        }
        for st in &self.state_or_province {
            parts.push(format!("ST={st}"));
        }
        for c in &self.country {
            parts.push(format!("C={c}"));
        }
        parts.join(",")
    }

    /// Build the rcgen form, pushing attributes in formatting order.
    pub fn to_rcgen(&self) -> rcgen::DistinguishedName {
        let mut dn = rcgen::DistinguishedName::new();
        if let Some(cn) = &self.common_name {
            dn.push(DnType::CommonName, cn.as_str());
        }
        for o in &self.organization {
            dn.push(DnType::OrganizationName, o.as_str());
        }
        for ou in &self.organizational_unit {
            dn.push(DnType::OrganizationalUnitName, ou.as_str());
        }
        for l in &self.locality {
            dn.push(DnType::LocalityName, l.as_str());
        }
        for st in &self.state_or_province {
            dn.push(DnType::StateOrProvinceName, st.as_str());
        }
        for c in &self.country {
            dn.push(DnType::CountryName, c.as_str());
        }
        dn
    }

    /// Extract the recognized attributes from a parsed X.509 name.
    pub fn from_x509_name(name: &X509Name<'_>) -> Self {
        Self {
            common_name: name
                .iter_common_name()
                .next()
                .and_then(|attr| attr.as_str().ok())
                .map(str::to_string),
            organization: name
                .iter_organization()
                .filter_map(|attr| attr.as_str().ok().map(str::to_string))
                .collect(),
            organizational_unit: name
                .iter_organizational_unit()
                .filter_map(|attr| attr.as_str().ok().map(str::to_string))
                .collect(),
            locality: name
                .iter_locality()
                .filter_map(|attr| attr.as_str().ok().map(str::to_string))
                .collect(),
            state_or_province: name
                .iter_state_or_province()
                .filter_map(|attr| attr.as_str().ok().map(str::to_string))
                .collect(),
            country: name
                .iter_country()
                .filter_map(|attr| attr.as_str().ok().map(str::to_string))
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_full_dn() {
        let dn = DistinguishedName::parse("CN=Test Root CA,O=Test Org,C=US").unwrap();
        assert_eq!(dn.common_name.as_deref(), Some("Test Root CA"));
        assert_eq!(dn.organization, vec!["Test Org"]);
        assert_eq!(dn.country, vec!["US"]);
    }

    #[test]
    fn parse_trims_whitespace_and_lowercase_types() {
        let dn = DistinguishedName::parse(" cn = leaf.example.com , o = Acme ").unwrap();
        assert_eq!(dn.common_name.as_deref(), Some("leaf.example.com"));
        assert_eq!(dn.organization, vec!["Acme"]);
    }

    #[test]
    fn parse_rejects_empty_input() {
        assert_eq!(DistinguishedName::parse("  "), Err(DnError::Empty));
    }

    #[test]
    fn parse_rejects_missing_equals() {
        assert_eq!(
            DistinguishedName::parse("CN"),
            Err(DnError::MissingEquals("CN".to_string()))
        );
    }

    #[test]
    fn parse_rejects_empty_value() {
        assert_eq!(
            DistinguishedName::parse("CN="),
            Err(DnError::EmptyValue("CN".to_string()))
        );
    }

    #[test]
    fn parse_rejects_unknown_type() {
        assert_eq!(
            DistinguishedName::parse("CN=x,DC=example"),
            Err(DnError::UnknownType("DC".to_string()))
        );
    }

    #[test]
    fn format_orders_attributes_and_skips_empty() {
        let dn = DistinguishedName::parse("C=US,CN=x,OU=Eng,O=Acme").unwrap();
        assert_eq!(dn.format(), "CN=x,O=Acme,OU=Eng,C=US");
    }

    #[test]
    fn format_then_parse_is_identity() {
        let dn =
            DistinguishedName::parse("CN=Test Root CA,O=Test Org,OU=PKI,L=Reno,ST=NV,C=US")
                .unwrap();
        let reparsed = DistinguishedName::parse(&dn.format()).unwrap();
        assert_eq!(reparsed, dn);
    }

    #[test]
    fn repeated_attributes_accumulate() {
        let dn = DistinguishedName::parse("CN=x,OU=a,OU=b").unwrap();
        assert_eq!(dn.organizational_unit, vec!["a", "b"]);
        assert_eq!(dn.format(), "CN=x,OU=a,OU=b");
    }
}
