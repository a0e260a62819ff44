//! Per-domain sync engine
//!
//! The SyncEngine is responsible for:
//! - Expanding and validating the desired records of a domain
//! - Diffing them against the backend's live records
//! - Previewing the changeset and asking for confirmation
//! - Applying the changeset through the backend
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐      ┌──────────────┐      ┌─────────────┐
//! │ DomainSpec  │─────►│   expand +   │      │ DnsBackend  │
//! └─────────────┘      │   validate   │      │ (fetch)     │
//!                      └──────────────┘      └─────────────┘
//!                              │ pending            │ live
//!                              ▼                    ▼
//!                            ┌────────────────────────┐
//!                            │       reconcile        │
//!                            └────────────────────────┘
//!                                        │ ChangeSet
//!                                        ▼
//!              preview ─► dry run? ─► Confirmation ─► DnsBackend (apply)
//! ```
//!
//! ## Flow
//!
//! 1. Expand the domain with the expander of its layer
//! 2. Validate the whole candidate set
//! 3. Fetch owned live records and reconcile
//! 4. Stop on an empty changeset or a dry run
//! 5. Apply only after the operator confirmed

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::config::{DomainSpec, TetraConfig};
use crate::context::RunContext;
use crate::error::Result;
use crate::expand::expand;
use crate::reconcile::{ChangeSet, reconcile};
use crate::record::DnsRecord;
use crate::registry::BackendRegistry;
use crate::traits::{Confirmation, DnsBackend, NameResolver};

/// Prompt shown before a changeset is applied
pub const CONFIRM_PROMPT: &str = "Do you want to continue? [y/N]";

/// How a domain sync ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncOutcome {
    /// Live records already match
    NoChanges,
    /// Changeset computed and printed, nothing applied
    DryRun(ChangeSet),
    /// The operator declined the changeset
    Declined(ChangeSet),
    /// Changeset applied
    Applied(ChangeSet),
}

impl SyncOutcome {
    /// Whether the changeset reached the backend
    pub fn is_applied(&self) -> bool {
        matches!(self, SyncOutcome::Applied(_))
    }
}

/// Sync engine for one domain
///
/// ## Lifecycle
///
/// 1. Create with [`SyncEngine::new()`] around the domain's backend
/// 2. Call [`SyncEngine::run()`] once
/// 3. Drop
///
/// ## Threading
///
/// Every provider call is awaited before the next one is issued. The engine
/// never spawns.
pub struct SyncEngine {
    /// Backend bound to the domain and its ownership prefix
    backend: Box<dyn DnsBackend>,

    /// Resolver for apex flattening
    resolver: Arc<dyn NameResolver>,

    /// Operator approval
    confirmation: Arc<dyn Confirmation>,
}

impl SyncEngine {
    /// Create a new sync engine
    pub fn new(
        backend: Box<dyn DnsBackend>,
        resolver: Arc<dyn NameResolver>,
        confirmation: Arc<dyn Confirmation>,
    ) -> Self {
        Self {
            backend,
            resolver,
            confirmation,
        }
    }

    /// Expand and validate the desired records of a domain
    pub async fn expand(&self, spec: &DomainSpec, ctx: &RunContext) -> Result<Vec<DnsRecord>> {
        expand(spec, ctx, self.resolver.as_ref()).await
    }

    /// Compute the changeset without applying it
    pub async fn plan(&self, spec: &DomainSpec, ctx: &RunContext) -> Result<ChangeSet> {
        let pending = self.expand(spec, ctx).await?;
        debug!("{} desired record(s) for {}", pending.len(), spec.domain);

        let live = self.backend.get_records().await?;
        debug!(
            "{} owned record(s) live at {} ({})",
            live.len(),
            spec.domain,
            self.backend.backend_name()
        );

        Ok(reconcile(live, pending, ctx.force))
    }

    /// Run one full sync of a domain
    ///
    /// # Returns
    ///
    /// - `Ok(SyncOutcome)`: how the sync ended; a declined prompt is not an error
    /// - `Err(Error)`: expansion, validation or provider failure
    pub async fn run(&self, spec: &DomainSpec, ctx: &RunContext) -> Result<SyncOutcome> {
        let changes = self.plan(spec, ctx).await?;

        print_section("add", &changes.adding);
        print_section("update", &changes.updating);
        print_section("delete", &changes.deleting);

        if changes.is_empty() {
            warn!("No changes to be made");
            return Ok(SyncOutcome::NoChanges);
        }

        if ctx.dry_run {
            warn!("Dry run, no changes made");
            return Ok(SyncOutcome::DryRun(changes));
        }

        if !self.confirmation.confirm(CONFIRM_PROMPT)? {
            info!("Aborted, no changes made to {}", spec.domain);
            return Ok(SyncOutcome::Declined(changes));
        }

        self.backend.update_records(&changes).await?;
        info!(
            "Applied {} change(s) to {} via {}",
            changes.len(),
            spec.domain,
            self.backend.backend_name()
        );
        Ok(SyncOutcome::Applied(changes))
    }
}

fn print_section(action: &str, records: &[DnsRecord]) {
    if records.is_empty() {
        info!("Records to {}: none", action);
        return;
    }
    info!("Records to {}: {}", action, records.len());
    for record in records {
        println!("{}", record);
    }
}

/// Sync the requested domains (all when empty) in configuration order
///
/// Stops at the first failing domain.
pub async fn run_domains(
    config: &TetraConfig,
    requested: &[String],
    registry: &BackendRegistry,
    resolver: Arc<dyn NameResolver>,
    confirmation: Arc<dyn Confirmation>,
    ctx: &RunContext,
) -> Result<Vec<(String, SyncOutcome)>> {
    let selected = config.select(requested)?;
    let mut outcomes = Vec::with_capacity(selected.len());

    for (domain, domain_config) in selected {
        info!("Processing {} ({} layer)", domain, domain_config.layer);

        let spec = domain_config.resolve(domain).await?;
        let backend =
            registry.create_backend(domain, spec.layer.ownership_prefix(), &spec.backend)?;
        let engine = SyncEngine::new(backend, resolver.clone(), confirmation.clone());

        let outcome = engine.run(&spec, ctx).await?;
        outcomes.push((domain.to_string(), outcome));
    }

    Ok(outcomes)
}
