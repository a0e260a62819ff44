//! Candidate record validation
//!
//! Runs over the complete output of an expander before anything is sent to
//! a provider. Backends also run [`check_record`] over what they fetch.

use std::net::{Ipv4Addr, Ipv6Addr};

use tracing::debug;

use crate::error::{Error, Result};
use crate::record::{APEX, DnsRecord, RecordType};

/// Normalise and check a candidate set
///
/// CNAME targets are dot-terminated, exact duplicates are collapsed keeping
/// the first, and the result must hold at most one CNAME per (name, line)
/// with every record individually well formed.
pub fn validate(records: Vec<DnsRecord>) -> Result<Vec<DnsRecord>> {
    let mut out: Vec<DnsRecord> = Vec::with_capacity(records.len());

    for mut record in records {
        if record.record_type == RecordType::Cname && !record.content.ends_with('.') {
            record.content.push('.');
        }
        if out.iter().any(|kept| kept.is_equivalent(&record)) {
            debug!("Dropping duplicate record {}", record.summary());
            continue;
        }
        out.push(record);
    }

    assert_cname_unique(&out)?;
    for record in &out {
        check_record(record)?;
    }
    Ok(out)
}

/// Fail when a CNAME shares its (name, line) with any other record
pub fn assert_cname_unique(records: &[DnsRecord]) -> Result<()> {
    for (i, cname) in records.iter().enumerate() {
        if cname.record_type != RecordType::Cname {
            continue;
        }
        for (j, other) in records.iter().enumerate() {
            if i == j || other.name != cname.name || other.line != cname.line {
                continue;
            }
            if !cname.is_equivalent(other) {
                return Err(Error::validation(format!(
                    "Duplicate CNAME record {} {}",
                    cname.summary(),
                    other.summary()
                )));
            }
        }
    }
    Ok(())
}

/// Check a single record's structural invariants
pub fn check_record(record: &DnsRecord) -> Result<()> {
    check_name(record)?;

    if record.ttl == 0 {
        return Err(Error::validation(format!(
            "TTL must be positive: {}",
            record.summary()
        )));
    }

    match record.record_type {
        RecordType::A => {
            record.content.parse::<Ipv4Addr>().map_err(|_| {
                Error::validation(format!("Invalid IPv4 address: {}", record.summary()))
            })?;
        }
        RecordType::Aaaa => {
            let addr = record.content.parse::<Ipv6Addr>().map_err(|_| {
                Error::validation(format!("Invalid IPv6 address: {}", record.summary()))
            })?;
            if addr.to_string() != record.content {
                return Err(Error::validation(format!(
                    "IPv6 address is not in canonical form ({}): {}",
                    addr,
                    record.summary()
                )));
            }
        }
        RecordType::Cname => {
            if record.name == APEX {
                return Err(Error::validation(format!(
                    "CNAME is not allowed at the zone apex: {}",
                    record.summary()
                )));
            }
            if !record.content.ends_with('.') || record.content.len() < 2 {
                return Err(Error::validation(format!(
                    "CNAME target must be a dot-terminated name: {}",
                    record.summary()
                )));
            }
        }
    }

    Ok(())
}

fn check_name(record: &DnsRecord) -> Result<()> {
    let name = &record.name;
    if name.is_empty() {
        return Err(Error::validation(format!(
            "Record name cannot be empty: {}",
            record.summary()
        )));
    }
    if name == APEX {
        return Ok(());
    }
    if name.ends_with('.') || name.starts_with('.') {
        return Err(Error::validation(format!(
            "Record name must be relative without surrounding dots: {}",
            record.summary()
        )));
    }
    if name.split('.').any(str::is_empty) || name.chars().any(char::is_whitespace) {
        return Err(Error::validation(format!(
            "Malformed record name: {}",
            record.summary()
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn a(name: &str, content: &str) -> DnsRecord {
        DnsRecord::new(name, RecordType::A, content, 600, "")
    }

    fn cname(name: &str, content: &str) -> DnsRecord {
        DnsRecord::new(name, RecordType::Cname, content, 600, "")
    }

    #[test]
    fn test_cname_target_is_dot_terminated() {
        let out = validate(vec![cname("www", "example.com")]).unwrap();
        assert_eq!(out[0].content, "example.com.");
    }

    #[test]
    fn test_exact_duplicates_collapse() {
        let out = validate(vec![
            cname("svc", "web.0.example.com."),
            a("web.0", "10.0.0.1"),
            cname("svc", "web.0.example.com"),
        ])
        .unwrap();
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].name, "svc");
    }

    #[test]
    fn test_conflicting_cnames_name_both() {
        let err = validate(vec![
            cname("foo", "a.example.com."),
            cname("foo", "b.example.com."),
        ])
        .unwrap_err();

        let message = err.to_string();
        assert!(matches!(err, Error::Validation(_)));
        assert!(message.contains("foo in CNAME a.example.com."));
        assert!(message.contains("foo in CNAME b.example.com."));
    }

    #[test]
    fn test_cname_beside_address_record_fails() {
        assert!(validate(vec![a("foo", "10.0.0.1"), cname("foo", "a.example.com.")]).is_err());
    }

    #[test]
    fn test_cnames_on_different_lines_coexist() {
        let out = validate(vec![
            cname("foo", "a.example.com."),
            cname("foo", "b.example.com.").with_line(Some("telecom".to_string())),
        ])
        .unwrap();
        assert_eq!(out.len(), 2);
    }

    #[test]
    fn test_invalid_ipv4_fails() {
        let err = validate(vec![a("web", "999.1.1.1")]).unwrap_err();
        assert!(err.to_string().contains("Invalid IPv4"));
    }

    #[test]
    fn test_ipv4_in_aaaa_fails() {
        let record = DnsRecord::new("web", RecordType::Aaaa, "10.0.0.1", 600, "");
        assert!(check_record(&record).is_err());
    }

    #[test]
    fn test_non_canonical_aaaa_fails() {
        let mut record = DnsRecord::new("web", RecordType::Aaaa, "2001:db8::1", 600, "");
        record.content = "2001:DB8:0::1".to_string();
        assert!(check_record(&record).is_err());
    }

    #[test]
    fn test_apex_cname_fails() {
        assert!(validate(vec![cname("@", "web.example.com.")]).is_err());
    }

    #[test]
    fn test_malformed_names_fail() {
        for name in ["", "www.", ".www", "a..b", "a b"] {
            assert!(check_record(&a(name, "10.0.0.1")).is_err(), "{name:?} accepted");
        }
        assert!(check_record(&a("@", "10.0.0.1")).is_ok());
        assert!(check_record(&a("web.0", "10.0.0.1")).is_ok());
    }

    #[test]
    fn test_zero_ttl_fails() {
        let record = DnsRecord::new("web", RecordType::A, "10.0.0.1", 0, "");
        assert!(check_record(&record).is_err());
    }
}
