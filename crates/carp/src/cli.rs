//! Command-line surface.
//!
//! Usage-level validation lives here: required flags, value sets, and
//! positive-integer ranges are enforced by clap so the engine only ever
//! sees well-formed arguments. Unknown subcommands are captured via the
//! external-subcommand escape hatch and reported with exit code 2.

use std::ffi::OsString;
use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};

use carp_x509::KeyAlgorithm;

#[derive(Parser, Debug)]
#[command(name = "carp", version, about = "Single-operator certificate authority")]
pub struct Cli {
    /// Increase verbosity (-v = debug, -vv = trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, env = "CARP_LOG", default_value = "warn", global = true)]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Command,
}

/// `--data-dir` flag with its environment fallback; the flag wins over
/// `CA_DATA_DIR`, which wins over `./ca-data`.
#[derive(Args, Debug)]
pub struct DataDirArg {
    /// CA data directory
    #[arg(
        long = "data-dir",
        env = "CA_DATA_DIR",
        default_value = "./ca-data",
        value_name = "PATH"
    )]
    pub data_dir: PathBuf,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Initialize the root Certificate Authority
    Init {
        /// Distinguished Name for the root CA, e.g. "CN=My Root CA,O=My Org,C=US"
        #[arg(long)]
        subject: String,

        /// Key algorithm
        #[arg(long, value_enum, default_value_t = KeyAlgorithmArg::EcdsaP256)]
        key_algorithm: KeyAlgorithmArg,

        /// Validity period in days
        #[arg(long, default_value_t = 3650, value_parser = clap::value_parser!(u32).range(1..))]
        validity: u32,

        #[command(flatten)]
        data_dir: DataDirArg,
    },

    /// Sign a CSR and issue a certificate
    Sign {
        /// Path to the PEM-encoded CSR
        #[arg(value_name = "CSR_PATH")]
        csr_path: PathBuf,

        /// Validity period in days
        #[arg(long, default_value_t = 365, value_parser = clap::value_parser!(u32).range(1..))]
        validity: u32,

        #[command(flatten)]
        data_dir: DataDirArg,
    },

    /// Revoke a certificate by serial number
    Revoke {
        /// Serial number (lowercase hex)
        #[arg(value_name = "SERIAL")]
        serial: String,

        /// Revocation reason
        #[arg(long, value_enum, default_value_t = ReasonArg::Unspecified)]
        reason: ReasonArg,

        #[command(flatten)]
        data_dir: DataDirArg,
    },

    /// Generate a Certificate Revocation List
    Crl {
        /// Hours until the CRL's next update
        #[arg(long = "next-update", default_value_t = 24, value_parser = clap::value_parser!(u32).range(1..))]
        next_update: u32,

        #[command(flatten)]
        data_dir: DataDirArg,
    },

    /// List all issued certificates
    List {
        #[command(flatten)]
        data_dir: DataDirArg,
    },

    /// Verify a certificate against this CA
    Verify {
        /// Path to the PEM-encoded certificate
        #[arg(value_name = "CERT_PATH")]
        cert_path: PathBuf,

        #[command(flatten)]
        data_dir: DataDirArg,
    },

    /// Generate a key pair and CSR (does not require a CA)
    Request {
        /// Distinguished Name for the CSR
        #[arg(long)]
        subject: String,

        /// Comma-separated SANs: DNS:name,IP:addr
        #[arg(long, default_value = "")]
        san: String,

        /// Key algorithm
        #[arg(long, value_enum, default_value_t = KeyAlgorithmArg::EcdsaP256)]
        key_algorithm: KeyAlgorithmArg,

        /// Output path for the generated private key
        #[arg(long = "out-key", value_name = "PATH")]
        out_key: PathBuf,

        /// Output path for the generated CSR
        #[arg(long = "out-csr", value_name = "PATH")]
        out_csr: PathBuf,
    },

    /// Check the data directory for consistency issues
    Check {
        #[command(flatten)]
        data_dir: DataDirArg,
    },

    #[command(external_subcommand)]
    External(Vec<OsString>),
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum KeyAlgorithmArg {
    #[value(name = "ecdsa-p256")]
    EcdsaP256,
    #[value(name = "rsa-2048")]
    Rsa2048,
}

impl From<KeyAlgorithmArg> for KeyAlgorithm {
    fn from(value: KeyAlgorithmArg) -> Self {
        match value {
            KeyAlgorithmArg::EcdsaP256 => KeyAlgorithm::EcdsaP256,
            KeyAlgorithmArg::Rsa2048 => KeyAlgorithm::Rsa2048,
        }
    }
}

impl std::fmt::Display for KeyAlgorithmArg {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            KeyAlgorithmArg::EcdsaP256 => "ecdsa-p256",
            KeyAlgorithmArg::Rsa2048 => "rsa-2048",
        })
    }
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReasonArg {
    #[value(name = "unspecified")]
    Unspecified,
    #[value(name = "keyCompromise")]
    KeyCompromise,
    #[value(name = "affiliationChanged")]
    AffiliationChanged,
    #[value(name = "superseded")]
    Superseded,
    #[value(name = "cessationOfOperation")]
    CessationOfOperation,
}

impl std::fmt::Display for ReasonArg {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl ReasonArg {
    pub fn name(self) -> &'static str {
        match self {
            ReasonArg::Unspecified => "unspecified",
            ReasonArg::KeyCompromise => "keyCompromise",
            ReasonArg::AffiliationChanged => "affiliationChanged",
            ReasonArg::Superseded => "superseded",
            ReasonArg::CessationOfOperation => "cessationOfOperation",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init_requires_subject() {
        let result = Cli::try_parse_from(["carp", "init"]);
        assert!(result.is_err());
    }

    #[test]
    fn init_defaults() {
        let cli = Cli::try_parse_from(["carp", "init", "--subject", "CN=x"]).unwrap();
        match cli.command {
            Command::Init {
                key_algorithm,
                validity,
                data_dir,
                ..
            } => {
                assert_eq!(key_algorithm, KeyAlgorithmArg::EcdsaP256);
                assert_eq!(validity, 3650);
                assert_eq!(data_dir.data_dir, PathBuf::from("./ca-data"));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn sign_default_validity_is_one_year() {
        let cli = Cli::try_parse_from(["carp", "sign", "leaf.csr"]).unwrap();
        match cli.command {
            Command::Sign { validity, .. } => assert_eq!(validity, 365),
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn zero_validity_is_a_usage_error() {
        assert!(Cli::try_parse_from(["carp", "init", "--subject", "CN=x", "--validity", "0"])
            .is_err());
        assert!(Cli::try_parse_from(["carp", "crl", "--next-update", "0"]).is_err());
    }

    #[test]
    fn reason_names_use_rfc_spelling() {
        let cli = Cli::try_parse_from([
            "carp",
            "revoke",
            "02",
            "--reason",
            "keyCompromise",
        ])
        .unwrap();
        match cli.command {
            Command::Revoke { reason, serial, .. } => {
                assert_eq!(reason, ReasonArg::KeyCompromise);
                assert_eq!(serial, "02");
            }
            other => panic!("unexpected command: {other:?}"),
        }

        assert!(Cli::try_parse_from(["carp", "revoke", "02", "--reason", "certificateHold"])
            .is_err());
    }

    #[test]
    fn unknown_command_is_captured_as_external() {
        let cli = Cli::try_parse_from(["carp", "renew"]).unwrap();
        match cli.command {
            Command::External(args) => {
                assert_eq!(args[0], OsString::from("renew"));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn algorithm_flag_spellings() {
        let cli = Cli::try_parse_from([
            "carp",
            "request",
            "--subject",
            "CN=x",
            "--key-algorithm",
            "rsa-2048",
            "--out-key",
            "k.pem",
            "--out-csr",
            "r.csr",
        ])
        .unwrap();
        match cli.command {
            Command::Request { key_algorithm, .. } => {
                assert_eq!(key_algorithm, KeyAlgorithmArg::Rsa2048);
            }
            other => panic!("unexpected command: {other:?}"),
        }

        assert!(Cli::try_parse_from([
            "carp", "init", "--subject", "CN=x", "--key-algorithm", "dsa"
        ])
        .is_err());
    }
}
