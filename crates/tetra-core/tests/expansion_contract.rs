//! Contract Test: Expansion & Ownership
//!
//! This test verifies what reaches the zone for each layer.
//!
//! Constraints verified:
//! - The bottom layer emits per-zone host records and mid-name aliases
//! - The top layer completes relative targets and flattens the apex
//! - Records without the layer's ownership prefix are never touched
//!
//! If this test fails, the generated zone no longer matches the description.

mod common;

use common::*;
use std::sync::Arc;
use tetra_core::{DnsRecord, RecordType, SyncOutcome, TetraConfig, run_domains};

fn find<'a>(records: &'a [DnsRecord], name: &str, record_type: RecordType) -> Vec<&'a DnsRecord> {
    records
        .iter()
        .filter(|r| r.name == name && r.record_type == record_type)
        .collect()
}

#[tokio::test]
async fn bottom_layer_zone_contents() {
    let config = TetraConfig::from_yaml_str(BOTTOM_CONFIG).unwrap();
    let backend = InMemoryBackend::new("TETRAB");

    run_domains(
        &config,
        &[],
        &registry_for(&backend),
        Arc::new(StaticResolver::empty()),
        ScriptedConfirmation::accept(),
        &context_at(1, false, false),
    )
    .await
    .unwrap();

    let records = backend.all_records();

    // zone 1 of web duplicates zone 0 and is suppressed
    assert_eq!(find(&records, "web.0", RecordType::A).len(), 1);
    assert_eq!(find(&records, "web.4", RecordType::A).len(), 1);
    assert!(find(&records, "web.1", RecordType::A).is_empty());

    // edge keeps a distinct external zone
    assert_eq!(find(&records, "edge.1", RecordType::A).len(), 2);
    assert_eq!(find(&records, "edge.1", RecordType::Aaaa).len(), 1);
    assert_eq!(find(&records, "edge.6", RecordType::Aaaa)[0].content, "2001:db8::2");

    // blue/green indirection
    let svc = find(&records, "svc", RecordType::Cname);
    assert_eq!(svc[0].content, "svc-v1.example.com.");
    assert_eq!(find(&records, "svc-v1-phy", RecordType::Cname)[0].ttl, 86400);
    assert_eq!(
        find(&records, "svc-ip4", RecordType::Cname)[0].content,
        "svc-v1-ip4.example.com."
    );

    // direct alias points at the lowest populated zone
    assert_eq!(find(&records, "gw", RecordType::Cname)[0].content, "edge.0.example.com.");
    assert_eq!(find(&records, "gw-ip6", RecordType::Cname)[0].content, "edge.6.example.com.");

    assert!(records.iter().all(|r| r.comment == "TETRAB 2024-06-01 12:00:00"));
}

#[tokio::test]
async fn top_layer_flattens_apex() {
    let config = TetraConfig::from_yaml_str(TOP_CONFIG).unwrap();
    let backend = InMemoryBackend::new("TETRAT");
    let resolver = StaticResolver::empty().with("svc.example.com", &["10.0.0.1", "2001:db8::1"]);

    let outcomes = run_domains(
        &config,
        &[],
        &registry_for(&backend),
        Arc::new(resolver),
        ScriptedConfirmation::accept(),
        &context_at(1, false, false),
    )
    .await
    .unwrap();
    assert!(outcomes[0].1.is_applied());

    let records = backend.all_records();
    assert_eq!(records.len(), 6);

    let apex_a = find(&records, "@", RecordType::A);
    let apex_aaaa = find(&records, "@", RecordType::Aaaa);
    assert_eq!(apex_a.len(), 1);
    assert_eq!(apex_aaaa.len(), 1);
    assert_eq!(apex_a[0].content, "10.0.0.1");
    assert_eq!(apex_aaaa[0].ttl, 600);
    assert!(find(&records, "@", RecordType::Cname).is_empty());

    assert_eq!(find(&records, "www", RecordType::Cname)[0].content, "svc.example.com.");
    assert_eq!(find(&records, "blog", RecordType::Cname)[0].content, "example.net.");

    let api = find(&records, "api", RecordType::Cname);
    assert_eq!(api.len(), 2);
    assert!(
        api.iter()
            .any(|r| r.line.as_deref() == Some("telecom") && r.content == "gw-ext.example.com.")
    );
}

#[tokio::test]
async fn unresolvable_apex_target_fails() {
    let config = TetraConfig::from_yaml_str(TOP_CONFIG).unwrap();
    let backend = InMemoryBackend::new("TETRAT");

    let err = run_domains(
        &config,
        &[],
        &registry_for(&backend),
        Arc::new(StaticResolver::empty()),
        ScriptedConfirmation::accept(),
        &context_at(1, false, false),
    )
    .await
    .unwrap_err();

    assert!(matches!(err, tetra_core::Error::Resolve(_)));
    assert!(backend.all_records().is_empty());
}

#[tokio::test]
async fn foreign_records_are_left_alone() {
    let config = TetraConfig::from_yaml_str(BOTTOM_CONFIG).unwrap();
    let backend = InMemoryBackend::new("TETRAB");
    backend.seed(DnsRecord::new("mail", RecordType::A, "10.1.1.1", 300, "hand made"));
    backend.seed(DnsRecord::new("www", RecordType::Cname, "web.example.com.", 300, "TETRAT 2023-01-01 00:00:00"));
    let stale = backend.seed(DnsRecord::new("old.0", RecordType::A, "10.2.2.2", 43200, "TETRAB 2023-01-01 00:00:00"));

    let outcomes = run_domains(
        &config,
        &[],
        &registry_for(&backend),
        Arc::new(StaticResolver::empty()),
        ScriptedConfirmation::accept(),
        &context_at(1, false, false),
    )
    .await
    .unwrap();

    match &outcomes[0].1 {
        SyncOutcome::Applied(changes) => {
            assert_eq!(changes.deleting.len(), 1);
            assert_eq!(changes.deleting[0].id.as_deref(), Some(stale.as_str()));
        }
        other => panic!("expected Applied, got {:?}", other),
    }

    let records = backend.all_records();
    assert_eq!(find(&records, "mail", RecordType::A).len(), 1);
    assert_eq!(find(&records, "www", RecordType::Cname).len(), 1);
    assert!(find(&records, "old.0", RecordType::A).is_empty());

    let calls = backend.calls();
    assert!(calls[0].starts_with("delete "));
    assert!(calls[1..].iter().all(|c| c.starts_with("create ")));
}
