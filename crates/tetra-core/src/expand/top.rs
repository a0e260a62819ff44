//! Top-layer expander: public alias groups
//!
//! Every name of a group receives every target of the group. Targets that
//! are IP literals become A/AAAA records, everything else a CNAME. Relative
//! CNAME targets are completed with the configured bottom domain.

use std::net::IpAddr;

use tracing::{debug, warn};

use crate::config::{AliasGroup, DomainSpec, Layer, TTL_TOP};
use crate::context::RunContext;
use crate::error::{Error, Result};
use crate::record::{APEX, DnsRecord, RecordType};
use crate::traits::NameResolver;

/// Expand every alias group of a top-layer domain, then flatten apex CNAMEs
pub async fn expand_top(
    spec: &DomainSpec,
    ctx: &RunContext,
    resolver: &dyn NameResolver,
) -> Result<Vec<DnsRecord>> {
    let comment = ctx.comment(Layer::Top);
    let records = expand_alias_groups(&spec.alias_groups, &spec.domain, &spec.bottom, &comment);
    debug!(
        "Expanded {} alias group(s) into {} records",
        spec.alias_groups.len(),
        records.len()
    );
    flatten_apex(records, resolver).await
}

/// Expand alias groups into A/AAAA/CNAME records
pub fn expand_alias_groups(
    groups: &[AliasGroup],
    domain: &str,
    bottom: &str,
    comment: &str,
) -> Vec<DnsRecord> {
    let mut out = Vec::new();

    for group in groups {
        for target in &group.records {
            let (record_type, content) = match target.value.parse::<IpAddr>() {
                Ok(ip) => {
                    warn!(
                        "{} points straight at address {}, bypassing the bottom layer",
                        group.names.join(", "),
                        ip
                    );
                    (RecordType::for_ip(&ip), ip.to_string())
                }
                Err(_) => (RecordType::Cname, complete_target(&target.value, bottom)),
            };

            for name in &group.names {
                out.push(
                    DnsRecord::new(name.clone(), record_type, content.clone(), TTL_TOP, comment)
                        .with_line(target.line.clone()),
                );
            }
        }

        let Some(primary) = group.names.first() else {
            continue;
        };
        let primary_fqdn = if primary == APEX {
            format!("{}.", domain)
        } else {
            format!("{}.{}.", primary, domain)
        };
        for alias in &group.cnames {
            out.push(DnsRecord::new(
                alias.clone(),
                RecordType::Cname,
                primary_fqdn.clone(),
                TTL_TOP,
                comment,
            ));
        }
    }

    out
}

/// Append `.<bottom>` to a relative CNAME target
///
/// Targets that are dot-terminated, equal to `bottom`, or already end in
/// `.<bottom>` are left alone, as is everything when `bottom` is empty.
fn complete_target(value: &str, bottom: &str) -> String {
    let bottom = bottom.trim_end_matches('.');
    if bottom.is_empty()
        || value.ends_with('.')
        || value == bottom
        || value.ends_with(&format!(".{}", bottom))
    {
        return value.to_string();
    }
    format!("{}.{}", value, bottom)
}

/// Replace every CNAME at the apex by the addresses of its target
///
/// A records come first, then AAAA, in resolver order. TTL, line and
/// comment are carried over from the CNAME.
pub async fn flatten_apex(
    records: Vec<DnsRecord>,
    resolver: &dyn NameResolver,
) -> Result<Vec<DnsRecord>> {
    let mut out = Vec::with_capacity(records.len());

    for record in records {
        if record.name != APEX || record.record_type != RecordType::Cname {
            out.push(record);
            continue;
        }

        let mut addresses = resolver.resolve(&record.content).await?;
        if addresses.is_empty() {
            return Err(Error::resolve(format!(
                "Apex target {} has no A or AAAA records",
                record.content
            )));
        }
        addresses.sort_by_key(|ip| ip.is_ipv6());

        debug!(
            "Flattening apex CNAME {} into {} address record(s)",
            record.content,
            addresses.len()
        );
        for ip in addresses {
            out.push(
                DnsRecord::new(
                    APEX,
                    RecordType::for_ip(&ip),
                    ip.to_string(),
                    record.ttl,
                    record.comment.clone(),
                )
                .with_line(record.line.clone()),
            );
        }
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AliasTarget;
    use async_trait::async_trait;
    use std::collections::HashMap;

    const COMMENT: &str = "TETRAT test";

    struct FixedResolver(HashMap<String, Vec<IpAddr>>);

    #[async_trait]
    impl NameResolver for FixedResolver {
        async fn resolve(&self, name: &str) -> Result<Vec<IpAddr>> {
            Ok(self.0.get(name).cloned().unwrap_or_default())
        }
    }

    fn group(names: &[&str], records: &[&str], cnames: &[&str]) -> AliasGroup {
        AliasGroup {
            names: names.iter().map(|s| s.to_string()).collect(),
            records: records.iter().map(|s| AliasTarget::new(*s)).collect(),
            cnames: cnames.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[test]
    fn test_relative_target_gets_bottom_suffix() {
        let records = expand_alias_groups(
            &[group(&["www"], &["web"], &[])],
            "example.net",
            "example.com",
            COMMENT,
        );
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].record_type, RecordType::Cname);
        assert_eq!(records[0].content, "web.example.com");
        assert_eq!(records[0].ttl, TTL_TOP);
    }

    #[test]
    fn test_target_suffixing_is_label_aware() {
        assert_eq!(complete_target("web.example.com", "example.com"), "web.example.com");
        assert_eq!(complete_target("example.com", "example.com"), "example.com");
        assert_eq!(complete_target("myexample.com", "example.com"), "myexample.com.example.com");
        assert_eq!(complete_target("cdn.other.org.", "example.com"), "cdn.other.org.");
        assert_eq!(complete_target("web", ""), "web");
        assert_eq!(complete_target("web", "example.com."), "web.example.com");
    }

    #[test]
    fn test_ip_literal_target_yields_address_records() {
        let records = expand_alias_groups(
            &[group(&["www", "api"], &["192.0.2.7", "2001:db8::7"], &[])],
            "example.net",
            "example.com",
            COMMENT,
        );
        let summary: Vec<_> = records
            .iter()
            .map(|r| (r.name.as_str(), r.record_type, r.content.as_str()))
            .collect();
        assert_eq!(
            summary,
            vec![
                ("www", RecordType::A, "192.0.2.7"),
                ("api", RecordType::A, "192.0.2.7"),
                ("www", RecordType::Aaaa, "2001:db8::7"),
                ("api", RecordType::Aaaa, "2001:db8::7"),
            ]
        );
    }

    #[test]
    fn test_lines_and_extra_cnames() {
        let mut g = group(&["www"], &["web"], &["blog", "news"]);
        g.records.push(AliasTarget {
            value: "web-ext".to_string(),
            line: Some("telecom".to_string()),
        });

        let records = expand_alias_groups(&[g], "example.net", "example.com", COMMENT);
        assert_eq!(records.len(), 4);
        assert_eq!(records[1].line.as_deref(), Some("telecom"));
        assert_eq!(records[1].content, "web-ext.example.com");

        let blog = records.iter().find(|r| r.name == "blog").unwrap();
        assert_eq!(blog.content, "www.example.net.");
        assert_eq!(blog.line, None);
    }

    #[test]
    fn test_cname_to_apex_primary() {
        let records = expand_alias_groups(
            &[group(&["@"], &["web"], &["www"])],
            "example.net",
            "example.com",
            COMMENT,
        );
        let www = records.iter().find(|r| r.name == "www").unwrap();
        assert_eq!(www.content, "example.net.");
    }

    #[tokio::test]
    async fn test_apex_cname_is_flattened() {
        let resolver = FixedResolver(HashMap::from([(
            "web.example.com".to_string(),
            vec![
                "2001:db8::1".parse().unwrap(),
                "10.0.0.1".parse().unwrap(),
            ],
        )]));
        let records = vec![
            DnsRecord::new("@", RecordType::Cname, "web.example.com", TTL_TOP, COMMENT),
            DnsRecord::new("www", RecordType::Cname, "web.example.com", TTL_TOP, COMMENT),
        ];

        let flat = flatten_apex(records, &resolver).await.unwrap();
        let summary: Vec<_> = flat
            .iter()
            .map(|r| (r.name.as_str(), r.record_type, r.content.as_str()))
            .collect();
        assert_eq!(
            summary,
            vec![
                ("@", RecordType::A, "10.0.0.1"),
                ("@", RecordType::Aaaa, "2001:db8::1"),
                ("www", RecordType::Cname, "web.example.com"),
            ]
        );
        assert!(flat.iter().all(|r| r.ttl == TTL_TOP && r.comment == COMMENT));
    }

    #[tokio::test]
    async fn test_apex_target_without_addresses_fails() {
        let resolver = FixedResolver(HashMap::new());
        let records = vec![DnsRecord::new("@", RecordType::Cname, "nx.example.com", TTL_TOP, COMMENT)];

        let err = flatten_apex(records, &resolver).await.unwrap_err();
        assert!(matches!(err, Error::Resolve(_)));
    }
}
