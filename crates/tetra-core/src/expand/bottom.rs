//! Bottom-layer expander: hosts and mid-names
//!
//! ## Zone replication
//!
//! | declared in | IPv4 lands in | IPv6 lands in |
//! |-------------|---------------|---------------|
//! | 0           | 0, 1, 4       | 0, 1, 6       |
//! | 1           | 1, 4          | 1, 6          |
//! | ≥ 10        | itself        | itself        |
//!
//! The TTL of every copy follows the zone the address was declared in.

use std::collections::BTreeMap;
use std::net::IpAddr;

use tracing::{debug, warn};

use crate::config::{
    DomainSpec, Host, Layer, TTL_EXT, TTL_HOST, TTL_NET, TTL_PERMA, Zone, ZoneSuffixTable,
};
use crate::context::RunContext;
use crate::error::{Error, Result};
use crate::record::{DnsRecord, RecordType};

/// Expand every host of a bottom-layer domain
pub fn expand_bottom(spec: &DomainSpec, ctx: &RunContext) -> Result<Vec<DnsRecord>> {
    let comment = ctx.comment(Layer::Bottom);
    let mut records = Vec::new();
    for host in &spec.hosts {
        records.extend(expand_host(host, &spec.domain, &spec.zone_suffix, &comment)?);
    }
    debug!("Expanded {} host(s) into {} records", spec.hosts.len(), records.len());
    Ok(records)
}

/// Host records per zone after replication, before zone-1 suppression
///
/// A zone declared with an empty address list is dropped entirely, including
/// the copies replicated into it from zone 0. An address reaching a zone more
/// than once keeps a single record, taken from the nearest declaring zone.
pub fn zone_records(host: &Host, comment: &str) -> BTreeMap<Zone, Vec<DnsRecord>> {
    let mut zones: BTreeMap<Zone, Vec<DnsRecord>> = BTreeMap::new();

    for (&declared, addresses) in &host.addresses {
        let ttl = if declared == Zone::PHYSICAL { TTL_HOST } else { TTL_EXT };
        for address in addresses {
            for zone in replication_targets(declared, address) {
                let record = DnsRecord::new(
                    format!("{}.{}", host.name, zone),
                    RecordType::for_ip(address),
                    address.to_string(),
                    ttl,
                    comment,
                );
                let records = zones.entry(zone).or_default();
                // declarations are visited in ascending zone order, so the
                // latest copy comes from the nearest declaring zone
                match records
                    .iter_mut()
                    .find(|r| r.record_type == record.record_type && r.content == record.content)
                {
                    Some(existing) => *existing = record,
                    None => records.push(record),
                }
            }
        }
    }

    for (zone, addresses) in &host.addresses {
        if addresses.is_empty() {
            zones.remove(zone);
        }
    }

    zones
}

fn replication_targets(declared: Zone, address: &IpAddr) -> Vec<Zone> {
    let preferred = match address {
        IpAddr::V4(_) => Zone::PREFER_V4,
        IpAddr::V6(_) => Zone::PREFER_V6,
    };
    match declared {
        Zone::PHYSICAL => vec![Zone::PHYSICAL, Zone::EXTERNAL, preferred],
        Zone::EXTERNAL => vec![Zone::EXTERNAL, preferred],
        custom => vec![custom],
    }
}

/// Drop zone 1 when it carries exactly the zone-0 addresses
fn suppress_duplicate_external(zones: &mut BTreeMap<Zone, Vec<DnsRecord>>) {
    let key = |records: &[DnsRecord]| {
        let mut key: Vec<(RecordType, String)> = records
            .iter()
            .map(|r| (r.record_type, r.content.clone()))
            .collect();
        key.sort_by(|a, b| (a.0.as_str(), &a.1).cmp(&(b.0.as_str(), &b.1)));
        key
    };

    let duplicate = match (zones.get(&Zone::PHYSICAL), zones.get(&Zone::EXTERNAL)) {
        (Some(physical), Some(external)) => {
            !physical.is_empty() && key(physical) == key(external)
        }
        _ => false,
    };
    if duplicate {
        zones.remove(&Zone::EXTERNAL);
    }
}

/// Expand one host: its per-zone records followed by its mid-name aliases
pub fn expand_host(
    host: &Host,
    domain: &str,
    suffixes: &ZoneSuffixTable,
    comment: &str,
) -> Result<Vec<DnsRecord>> {
    let mut zones = zone_records(host, comment);
    suppress_duplicate_external(&mut zones);

    let populated: Vec<Zone> = zones.keys().copied().collect();
    let mut out: Vec<DnsRecord> = zones.into_values().flatten().collect();

    let host_target = |zone: Zone| format!("{}.{}.{}.", host.name, zone, domain);
    let cname = |name: String, content: String, ttl: u32| {
        DnsRecord::new(name, RecordType::Cname, content, ttl, comment)
    };

    for mid in &host.mid_names {
        let lowest = populated.first().copied().ok_or_else(|| {
            Error::config(format!(
                "Host {} has no addresses but declares mid-name {}",
                host.name, mid.name
            ))
        })?;
        let current_zone = mid.current_zone.unwrap_or(lowest);
        if !populated.contains(&current_zone) {
            return Err(Error::config(format!(
                "Mid-name {} points at zone {} which host {} does not populate",
                mid.name, current_zone, host.name
            )));
        }

        out.push(cname(mid.name.clone(), host_target(current_zone), TTL_NET));

        let alias_ttl = if mid.is_versioned() { TTL_PERMA } else { TTL_NET };
        for &zone in &populated {
            let suffix = suffixes.suffix(zone)?;
            out.push(cname(
                format!("{}{}", mid.name, suffix),
                host_target(zone),
                alias_ttl,
            ));
        }

        if !mid.current {
            continue;
        }
        if !mid.is_versioned() {
            warn!(
                "Mid-name {} is marked current but carries no version marker, ignoring",
                mid.name
            );
            continue;
        }

        let network = mid.network_name();
        debug!("Pointing {} at current version {}", network, mid.name);
        out.push(cname(
            network.to_string(),
            format!("{}.{}.", mid.name, domain),
            TTL_NET,
        ));
        for &zone in &populated {
            let suffix = suffixes.suffix(zone)?;
            out.push(cname(
                format!("{}{}", network, suffix),
                format!("{}{}.{}.", mid.name, suffix, domain),
                TTL_NET,
            ));
        }
    }

    Ok(out)
}
