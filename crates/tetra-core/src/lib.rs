// # tetra-core
//
// Core library for declarative DNS record reconciliation.
//
// ## Architecture Overview
//
// This library turns a short per-domain description into concrete DNS
// records and keeps a provider in sync with them:
// - **expand**: bottom layer (hosts, zones, mid-names) and top layer
//   (public aliases, apex flattening)
// - **validate**: structural checks over every candidate set
// - **reconcile**: diff desired against live records into a ChangeSet
// - **DnsBackend**: Trait for fetching and applying records via provider APIs
// - **SyncEngine**: Orchestrates expand → reconcile → confirm → apply per domain
// - **BackendRegistry**: Plugin-based registry for DNS backends
//
// ## Design Principles
//
// 1. **Ownership**: Only records carrying the layer's comment prefix are
//    ever read or written
// 2. **Idempotency**: An unchanged description produces an empty changeset
// 3. **Plugin-Based**: Backends are registered dynamically, no hard-coded if-else
// 4. **Library-First**: All core functionality can be used as a library

pub mod config;
pub mod context;
pub mod engine;
pub mod error;
pub mod expand;
pub mod reconcile;
pub mod record;
pub mod registry;
pub mod traits;
pub mod validate;

// Re-export core types for convenience
pub use config::{BackendConfig, DomainConfig, DomainSpec, Layer, TetraConfig, Zone};
pub use context::RunContext;
pub use engine::{SyncEngine, SyncOutcome, run_domains};
pub use error::{Error, Result};
pub use reconcile::{ChangeSet, reconcile};
pub use record::{DnsRecord, RecordType};
pub use registry::BackendRegistry;
pub use traits::{Confirmation, DnsBackend, DnsBackendFactory, NameResolver};
pub use validate::{check_record, validate};
