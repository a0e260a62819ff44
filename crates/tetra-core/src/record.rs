//! DNS record model
//!
//! [`DnsRecord`] is the unit every other module works on: expanders emit them,
//! backends fetch and apply them, and the reconciler diffs two lists of them.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::{IpAddr, Ipv6Addr};
use std::str::FromStr;

use crate::error::Error;

/// Name of the zone apex
pub const APEX: &str = "@";

/// DNS record type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RecordType {
    /// IPv4 address record
    A,
    /// IPv6 address record
    #[serde(rename = "AAAA")]
    Aaaa,
    /// Canonical name record
    #[serde(rename = "CNAME")]
    Cname,
}

impl RecordType {
    /// Upper-case mnemonic as used by provider APIs
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordType::A => "A",
            RecordType::Aaaa => "AAAA",
            RecordType::Cname => "CNAME",
        }
    }

    /// Address record type matching an IP literal
    pub fn for_ip(ip: &IpAddr) -> Self {
        match ip {
            IpAddr::V4(_) => RecordType::A,
            IpAddr::V6(_) => RecordType::Aaaa,
        }
    }
}

impl fmt::Display for RecordType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // pad() so width specifiers in the preview line apply
        f.pad(self.as_str())
    }
}

impl FromStr for RecordType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "A" => Ok(RecordType::A),
            "AAAA" => Ok(RecordType::Aaaa),
            "CNAME" => Ok(RecordType::Cname),
            other => Err(Error::validation(format!(
                "Unsupported record type: {}",
                other
            ))),
        }
    }
}

/// A single DNS record, either derived from configuration or fetched live
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DnsRecord {
    /// Relative name without trailing dot, `@` for the apex
    pub name: String,

    /// Record type
    #[serde(rename = "type")]
    pub record_type: RecordType,

    /// Canonical address text, or a dot-terminated FQDN for CNAME
    pub content: String,

    /// TTL in seconds, `1` meaning "provider default"
    pub ttl: u32,

    /// Routing line; `None` is the provider's default line
    pub line: Option<String>,

    /// Ownership tag plus generation time
    pub comment: String,

    /// Provider-assigned identifier
    pub id: Option<String>,
}

impl DnsRecord {
    /// Create a record with no line and no provider id
    ///
    /// AAAA content is stored in canonical compressed form when it parses.
    pub fn new(
        name: impl Into<String>,
        record_type: RecordType,
        content: impl Into<String>,
        ttl: u32,
        comment: impl Into<String>,
    ) -> Self {
        let mut content = content.into();
        if record_type == RecordType::Aaaa
            && let Ok(addr) = content.parse::<Ipv6Addr>()
        {
            content = addr.to_string();
        }

        Self {
            name: name.into(),
            record_type,
            content,
            ttl,
            line: None,
            comment: comment.into(),
            id: None,
        }
    }

    /// Set the routing line
    pub fn with_line(mut self, line: Option<String>) -> Self {
        self.line = line;
        self
    }

    /// Set the provider id
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Equal in every field that reaches the provider: name, type, content,
    /// ttl and line. Comment and id are ignored.
    pub fn is_equivalent(&self, other: &DnsRecord) -> bool {
        self.name == other.name
            && self.record_type == other.record_type
            && self.content == other.content
            && self.ttl == other.ttl
            && self.line == other.line
    }

    /// Same name and type, so `self` may replace `other` through an update
    pub fn is_similar(&self, other: &DnsRecord) -> bool {
        self.name == other.name && self.record_type == other.record_type
    }

    /// Short form used in error messages
    pub fn summary(&self) -> String {
        let mut out = format!("{} in {} {}", self.name, self.record_type, self.content);
        if let Some(line) = &self.line {
            out.push_str(&format!(" [{}]", line));
        }
        out
    }
}

/// Fixed-width preview line as printed before confirmation
impl fmt::Display for DnsRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:<23} {:>5}  IN  {:<5} {:<39}",
            self.name, self.ttl, self.record_type, self.content
        )?;
        if let Some(line) = &self.line {
            write!(f, " [{}]", line)?;
        }
        if !self.comment.is_empty() {
            write!(f, " ; {}", self.comment)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_aaaa_content_is_canonicalized() {
        let record = DnsRecord::new("web.0", RecordType::Aaaa, "2001:0db8:0000::0001", 1, "");
        assert_eq!(record.content, "2001:db8::1");
    }

    #[test]
    fn test_unparseable_aaaa_is_kept_verbatim() {
        let record = DnsRecord::new("web.0", RecordType::Aaaa, "not-an-ip", 1, "");
        assert_eq!(record.content, "not-an-ip");
    }

    #[test]
    fn test_equivalence_ignores_comment_and_id() {
        let a = DnsRecord::new("web", RecordType::A, "10.0.0.1", 600, "TETRAB 2024-01-01 00:00:00");
        let b = DnsRecord::new("web", RecordType::A, "10.0.0.1", 600, "TETRAB 2025-01-01 00:00:00")
            .with_id("abc");
        assert!(a.is_equivalent(&b));

        let c = b.clone().with_line(Some("telecom".to_string()));
        assert!(!a.is_equivalent(&c));
        assert!(a.is_similar(&c));
    }

    #[test]
    fn test_similarity_requires_same_type() {
        let a = DnsRecord::new("web", RecordType::A, "10.0.0.1", 600, "");
        let b = DnsRecord::new("web", RecordType::Aaaa, "::1", 600, "");
        assert!(!a.is_similar(&b));
    }

    #[test]
    fn test_preview_line_format() {
        let record = DnsRecord::new("svc", RecordType::Cname, "svc-v1.example.com.", 1, "TETRAB x")
            .with_line(Some("default".to_string()));
        let line = record.to_string();
        assert!(line.starts_with("svc                         1  IN  CNAME svc-v1.example.com."));
        assert!(line.ends_with(" [default] ; TETRAB x"));
    }

    #[test]
    fn test_summary() {
        let record = DnsRecord::new("foo", RecordType::Cname, "bar.example.com.", 1, "");
        assert_eq!(record.summary(), "foo in CNAME bar.example.com.");
    }

    #[test]
    fn test_record_type_round_trip() {
        for t in [RecordType::A, RecordType::Aaaa, RecordType::Cname] {
            assert_eq!(t.as_str().parse::<RecordType>().unwrap(), t);
        }
        assert!("MX".parse::<RecordType>().is_err());
    }
}
