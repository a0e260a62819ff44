//! Test doubles and common utilities for contract tests
//!
//! This module provides in-memory stand-ins for the backend, the resolver
//! and the operator prompt, so the sync flow can run without any network.

#![allow(dead_code)]

use chrono::{Local, TimeZone};
use std::collections::HashMap;
use std::net::IpAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tetra_core::config::BackendConfig;
use tetra_core::error::{Error, Result};
use tetra_core::reconcile::ChangeSet;
use tetra_core::record::DnsRecord;
use tetra_core::traits::{Confirmation, DnsBackend, DnsBackendFactory, NameResolver};
use tetra_core::{BackendRegistry, RunContext};

/// Zone contents shared between every backend handle of a test
#[derive(Default)]
struct Zone {
    records: Vec<DnsRecord>,
    next_id: usize,
    calls: Vec<String>,
    fetches: usize,
}

/// A DnsBackend keeping one zone in memory
///
/// Clones share the same zone, so a test can keep a handle for inspection
/// after handing one to the engine.
#[derive(Clone)]
pub struct InMemoryBackend {
    zone: Arc<Mutex<Zone>>,
    prefix: String,
}

impl InMemoryBackend {
    pub fn new(prefix: &str) -> Self {
        Self {
            zone: Arc::new(Mutex::new(Zone::default())),
            prefix: prefix.to_string(),
        }
    }

    /// Another handle on the same zone, filtering by a different prefix
    pub fn with_prefix(&self, prefix: &str) -> Self {
        Self {
            zone: Arc::clone(&self.zone),
            prefix: prefix.to_string(),
        }
    }

    /// Put a record into the zone as if it had been created out of band
    pub fn seed(&self, record: DnsRecord) -> String {
        let mut zone = self.zone.lock().unwrap();
        zone.next_id += 1;
        let id = format!("rec-{}", zone.next_id);
        zone.records.push(record.with_id(id.clone()));
        id
    }

    /// Every record in the zone, owned or not
    pub fn all_records(&self) -> Vec<DnsRecord> {
        self.zone.lock().unwrap().records.clone()
    }

    /// Mutating calls in the order they were made
    pub fn calls(&self) -> Vec<String> {
        self.zone.lock().unwrap().calls.clone()
    }

    /// Number of get_records() calls
    pub fn fetch_count(&self) -> usize {
        self.zone.lock().unwrap().fetches
    }
}

#[async_trait::async_trait]
impl DnsBackend for InMemoryBackend {
    async fn get_records(&self) -> Result<Vec<DnsRecord>> {
        let mut zone = self.zone.lock().unwrap();
        zone.fetches += 1;
        Ok(zone
            .records
            .iter()
            .filter(|r| r.comment.contains(&self.prefix))
            .cloned()
            .collect())
    }

    async fn update_records(&self, changes: &ChangeSet) -> Result<()> {
        let mut zone = self.zone.lock().unwrap();

        for record in &changes.updating {
            zone.calls.push(format!("update {}", record.summary()));
            let slot = zone
                .records
                .iter_mut()
                .find(|r| r.id == record.id)
                .ok_or_else(|| Error::not_found(format!("no record with id {:?}", record.id)))?;
            *slot = record.clone();
        }

        for record in &changes.deleting {
            zone.calls.push(format!("delete {}", record.summary()));
            zone.records.retain(|r| r.id != record.id);
        }

        for record in &changes.adding {
            zone.calls.push(format!("create {}", record.summary()));
            zone.next_id += 1;
            let id = format!("rec-{}", zone.next_id);
            zone.records.push(record.clone().with_id(id));
        }

        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}

/// Factory handing out handles on one shared in-memory zone
pub struct InMemoryFactory {
    pub backend: InMemoryBackend,
}

impl DnsBackendFactory for InMemoryFactory {
    fn create(
        &self,
        _domain: &str,
        ownership_prefix: &str,
        _config: &BackendConfig,
    ) -> Result<Box<dyn DnsBackend>> {
        Ok(Box::new(self.backend.with_prefix(ownership_prefix)))
    }
}

/// A registry whose `cloudflare` and `dnspod` entries both resolve to
/// `backend`
pub fn registry_for(backend: &InMemoryBackend) -> BackendRegistry {
    let registry = BackendRegistry::new();
    for name in ["cloudflare", "dnspod"] {
        registry.register_backend(
            name,
            Box::new(InMemoryFactory {
                backend: backend.clone(),
            }),
        );
    }
    registry
}

/// A NameResolver answering from a fixed table
pub struct StaticResolver {
    answers: HashMap<String, Vec<IpAddr>>,
}

impl StaticResolver {
    pub fn empty() -> Self {
        Self {
            answers: HashMap::new(),
        }
    }

    pub fn with(mut self, name: &str, addresses: &[&str]) -> Self {
        self.answers.insert(
            name.trim_end_matches('.').to_string(),
            addresses.iter().map(|a| a.parse().unwrap()).collect(),
        );
        self
    }
}

#[async_trait::async_trait]
impl NameResolver for StaticResolver {
    async fn resolve(&self, name: &str) -> Result<Vec<IpAddr>> {
        Ok(self
            .answers
            .get(name.trim_end_matches('.'))
            .cloned()
            .unwrap_or_default())
    }
}

/// A Confirmation giving a fixed answer and counting prompts
pub struct ScriptedConfirmation {
    answer: bool,
    asked: AtomicUsize,
}

impl ScriptedConfirmation {
    pub fn accept() -> Arc<Self> {
        Arc::new(Self {
            answer: true,
            asked: AtomicUsize::new(0),
        })
    }

    pub fn decline() -> Arc<Self> {
        Arc::new(Self {
            answer: false,
            asked: AtomicUsize::new(0),
        })
    }

    pub fn times_asked(&self) -> usize {
        self.asked.load(Ordering::SeqCst)
    }
}

impl Confirmation for ScriptedConfirmation {
    fn confirm(&self, _prompt: &str) -> Result<bool> {
        self.asked.fetch_add(1, Ordering::SeqCst);
        Ok(self.answer)
    }
}

/// A run context at a fixed point in time
pub fn context_at(day: u32, dry_run: bool, force: bool) -> RunContext {
    let at = Local.with_ymd_and_hms(2024, 6, day, 12, 0, 0).unwrap();
    RunContext::at(dry_run, force, at)
}

/// Bottom-layer config with one dual-zone host and a blue/green mid-name
pub const BOTTOM_CONFIG: &str = r#"
example.com:
  layer: bottom
  backend: cloudflare
  auth:
    token: test-token
  hosts:
    - name: web
      addresses: 10.0.0.1
      mid_names:
        - name: svc-v1
          current: true
          current_zone: 0
    - name: edge
      addresses:
        0: 10.0.0.2
        1: [203.0.113.2, "2001:db8::2"]
      mid_names: gw
"#;

/// Top-layer config with a flattened apex and a routed alias
pub const TOP_CONFIG: &str = r#"
example.net:
  layer: top
  backend: dnspod
  auth:
    secret_id: id
    secret_key: key
  bottom: example.com
  domains:
    - names: ["@", www]
      records: svc
      cnames: blog
    - names: api
      records:
        - gw
        - { value: gw-ext, line: telecom }
"#;
