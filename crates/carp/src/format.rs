//! Human-readable CLI output.
//!
//! The single presentation layer: stdout carries summaries and reports
//! in a stable key order; errors and logs go to stderr. Paths may be
//! printed, key material never is.

use carp_ca::{
    CertRow, CheckReport, CrlOutcome, InitOutcome, IssueOutcome, RequestOutcome, VerifyReport,
};
use chrono::{DateTime, SecondsFormat, Utc};

fn rfc3339(value: DateTime<Utc>) -> String {
    value.to_rfc3339_opts(SecondsFormat::Secs, true)
}

pub fn init_summary(outcome: &InitOutcome) {
    println!("CA initialized successfully.");
    println!("  Subject:     {}", outcome.subject);
    println!("  Algorithm:   {}", outcome.algorithm);
    println!("  Serial:      {}", outcome.serial);
    println!("  Not After:   {}", rfc3339(outcome.not_after));
    println!("  Certificate: {}", outcome.cert_path.display());
    println!("  Key:         {}", outcome.key_path.display());
    println!(
        "Warning: CA private key is stored unencrypted at {}. Protect this file.",
        outcome.key_path.display()
    );
}

pub fn sign_summary(outcome: &IssueOutcome) {
    println!("Certificate issued successfully.");
    println!("  Serial:      {}", outcome.serial);
    println!("  Subject:     {}", outcome.subject);
    println!("  Not After:   {}", rfc3339(outcome.not_after));
    println!("  Certificate: {}", outcome.cert_path.display());
}

pub fn revoke_summary(serial: &str, reason: &str) {
    println!("Certificate revoked successfully.");
    println!("  Serial: {serial}");
    println!("  Reason: {reason}");
}

pub fn crl_summary(outcome: &CrlOutcome) {
    println!("CRL generated successfully.");
    println!("  This Update:          {}", rfc3339(outcome.this_update));
    println!("  Next Update:          {}", rfc3339(outcome.next_update));
    println!("  CRL Number:           {}", outcome.crl_number);
    println!("  Revoked certificates: {}", outcome.revoked_count);
    println!("  CRL: {}", outcome.crl_path.display());
}

pub fn cert_table(rows: &[CertRow]) {
    if rows.is_empty() {
        println!("No certificates issued.");
        return;
    }
    println!("{:<8}{:<9}{:<22}{}", "SERIAL", "STATUS", "NOT AFTER", "SUBJECT");
    for row in rows {
        println!(
            "{:<8}{:<9}{:<22}{}",
            row.serial,
            row.status.to_string(),
            rfc3339(row.not_after),
            row.subject
        );
    }
}

/// Print the verification report and return the exit code: 0 only when
/// the certificate is valid. After a failed signature check the expiry
/// and revocation lines are omitted; they were never evaluated.
pub fn verify_report(report: &VerifyReport) -> i32 {
    if report.valid {
        println!("Certificate verification: VALID");
    } else {
        println!("Certificate verification: INVALID");
    }

    println!("  Subject:    {}", report.subject);
    println!("  Serial:     {}", report.serial);
    println!("  Issuer:     {}", report.issuer);
    println!("  Not Before: {}", rfc3339(report.not_before));
    println!("  Not After:  {}", rfc3339(report.not_after));

    if report.sig_ok {
        println!("  Signature:  OK");
    } else {
        println!("  Signature:  FAILED");
        return i32::from(!report.valid);
    }

    if report.expiry_ok {
        println!("  Expiry:     OK");
    } else {
        println!("  Expiry:     EXPIRED");
    }

    println!("  Revocation: {}", report.revocation);

    i32::from(!report.valid)
}

pub fn request_summary(outcome: &RequestOutcome) {
    println!("CSR generated successfully.");
    println!("  Subject:   {}", outcome.subject);
    println!("  Algorithm: {}", outcome.algorithm);
    println!("  Key:       {}", outcome.key_path.display());
    println!("  CSR:       {}", outcome.csr_path.display());
}

/// Print the consistency report and return the exit code: 0 when clean.
pub fn check_report(report: &CheckReport) -> i32 {
    if report.is_clean() {
        println!("Data directory is consistent ({} entries).", report.entries);
        return 0;
    }
    println!(
        "Found {} issue(s) across {} entries:",
        report.issues.len(),
        report.entries
    );
    for issue in &report.issues {
        println!("  - {issue}");
    }
    1
}
