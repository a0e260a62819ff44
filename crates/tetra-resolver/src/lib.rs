// # System Name Resolver
//
// Resolves the target of a flattened apex CNAME to the addresses that replace
// it, using the host's DNS configuration through hickory.
//
// ## Behaviour
//
// - A lookups first, then AAAA
// - A name without records of one family simply contributes no addresses
// - Any other lookup failure aborts the expansion with a resolve error

use async_trait::async_trait;
use hickory_resolver::config::{ResolverConfig, ResolverOpts};
use hickory_resolver::name_server::TokioConnectionProvider;
use hickory_resolver::{ResolveError, TokioResolver};
use std::net::IpAddr;
use tetra_core::traits::NameResolver;
use tetra_core::{Error, Result};

/// Name resolver backed by the system DNS configuration
pub struct SystemResolver {
    resolver: TokioResolver,
}

impl std::fmt::Debug for SystemResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SystemResolver").finish_non_exhaustive()
    }
}

impl SystemResolver {
    /// Build a resolver from `/etc/resolv.conf` (or the platform equivalent),
    /// falling back to hickory's default upstreams when it cannot be read
    pub fn new() -> Self {
        let resolver = match TokioResolver::builder_tokio() {
            Ok(builder) => builder.build(),
            Err(e) => {
                tracing::warn!(
                    "Failed to load system DNS configuration, falling back to defaults: {}",
                    e
                );
                TokioResolver::builder_with_config(
                    ResolverConfig::default(),
                    TokioConnectionProvider::default(),
                )
                .with_options(ResolverOpts::default())
                .build()
            }
        };
        Self { resolver }
    }
}

impl Default for SystemResolver {
    fn default() -> Self {
        Self::new()
    }
}

/// Treat "no records" answers as an empty address list
fn empty_on_no_records<T>(
    name: &str,
    result: std::result::Result<Vec<T>, ResolveError>,
) -> Result<Vec<T>> {
    match result {
        Ok(addrs) => Ok(addrs),
        Err(e) if e.is_no_records_found() || e.is_nx_domain() => Ok(Vec::new()),
        Err(e) => Err(Error::resolve(format!("Failed to resolve {}: {}", name, e))),
    }
}

#[async_trait]
impl NameResolver for SystemResolver {
    async fn resolve(&self, name: &str) -> Result<Vec<IpAddr>> {
        let v4 = self
            .resolver
            .ipv4_lookup(name)
            .await
            .map(|lookup| lookup.iter().map(|a| IpAddr::V4(a.0)).collect::<Vec<_>>());
        let v6 = self
            .resolver
            .ipv6_lookup(name)
            .await
            .map(|lookup| lookup.iter().map(|a| IpAddr::V6(a.0)).collect::<Vec<_>>());

        let mut addrs = empty_on_no_records(name, v4)?;
        addrs.extend(empty_on_no_records(name, v6)?);

        tracing::debug!("Resolved {} to {} address(es)", name, addrs.len());
        Ok(addrs)
    }
}
