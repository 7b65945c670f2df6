//! Subject Alternative Name list parsing.

use std::net::IpAddr;

use rcgen::SanType;

use crate::X509Error;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum SanError {
    #[error("empty DNS name in SAN entry {0:?}")]
    EmptyDnsName(String),

    #[error("invalid IP address in SAN entry {0:?}")]
    InvalidIp(String),

    #[error("invalid SAN entry {0:?} (must be DNS:<name> or IP:<address>)")]
    UnknownPrefix(String),
}

/// One subject-alternative-name value.
///
/// `Email` never comes from the CLI surface; it exists so SANs carried
/// by a CSR are copied into the issued certificate verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SanEntry {
    Dns(String),
    Ip(IpAddr),
    Email(String),
}

impl SanEntry {
    pub fn to_san_type(&self) -> Result<SanType, X509Error> {
        match self {
            SanEntry::Dns(name) => Ok(SanType::DnsName(
                name.clone()
                    .try_into()
                    .map_err(|_| X509Error::InvalidSan(name.clone()))?,
            )),
            SanEntry::Ip(addr) => Ok(SanType::IpAddress(*addr)),
            SanEntry::Email(addr) => Ok(SanType::Rfc822Name(
                addr.clone()
                    .try_into()
                    .map_err(|_| X509Error::InvalidSan(addr.clone()))?,
            )),
        }
    }
}

/// Parse a comma-separated SAN list such as
/// `DNS:example.com,DNS:www.example.com,IP:10.0.0.1`.
///
/// The empty string yields empty lists. Entries must carry a `DNS:` or
/// `IP:` prefix; IP values must parse as IPv4 or IPv6 literals.
pub fn parse_san_list(input: &str) -> Result<(Vec<String>, Vec<IpAddr>), SanError> {
    let mut dns_names = Vec::new();
    let mut ips = Vec::new();

    if input.trim().is_empty() {
        return Ok((dns_names, ips));
    }

    for part in input.split(',') {
        let part = part.trim();
        if part.is_empty() {
            continue;
        }
        if let Some(name) = part.strip_prefix("DNS:") {
            if name.is_empty() {
                return Err(SanError::EmptyDnsName(part.to_string()));
            }
            dns_names.push(name.to_string());
        } else if let Some(literal) = part.strip_prefix("IP:") {
            let addr: IpAddr = literal
                .parse()
                .map_err(|_| SanError::InvalidIp(literal.to_string()))?;
            ips.push(addr);
        } else {
            return Err(SanError::UnknownPrefix(part.to_string()));
        }
    }

    Ok((dns_names, ips))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::{Ipv4Addr, Ipv6Addr};

    #[test]
    fn empty_string_yields_empty_lists() {
        let (dns, ips) = parse_san_list("").unwrap();
        assert!(dns.is_empty());
        assert!(ips.is_empty());
    }

    #[test]
    fn parses_mixed_entries() {
        let (dns, ips) =
            parse_san_list("DNS:example.com, DNS:www.example.com ,IP:10.0.0.1,IP:::1").unwrap();
        assert_eq!(dns, vec!["example.com", "www.example.com"]);
        assert_eq!(
            ips,
            vec![
                IpAddr::V4(Ipv4Addr::new(10, 0, 0, 1)),
                IpAddr::V6(Ipv6Addr::LOCALHOST),
            ]
        );
    }

    #[test]
    fn rejects_empty_dns_name() {
        assert_eq!(
            parse_san_list("DNS:"),
            Err(SanError::EmptyDnsName("DNS:".to_string()))
        );
    }

    #[test]
    fn rejects_bad_ip() {
        assert_eq!(
            parse_san_list("IP:999.1.1.1"),
            Err(SanError::InvalidIp("999.1.1.1".to_string()))
        );
    }

    #[test]
    fn rejects_unknown_prefix() {
        assert_eq!(
            parse_san_list("URI:https://example.com"),
            Err(SanError::UnknownPrefix("URI:https://example.com".to_string()))
        );
    }
}
