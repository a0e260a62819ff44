// # Name Resolver Trait
//
// Resolves a host name to its current addresses. Used by the top-layer
// expander to flatten CNAMEs at the zone apex, which the protocol forbids.
//
// ## Implementations
//
// - System resolver: `tetra-resolver` crate

use async_trait::async_trait;
use std::net::IpAddr;

/// Trait for name resolver implementations
#[async_trait]
pub trait NameResolver: Send + Sync {
    /// Resolve `name` to its A and AAAA addresses
    ///
    /// IPv4 addresses come first, then IPv6, each in answer order. A name
    /// with no address records yields an empty list rather than an error.
    async fn resolve(&self, name: &str) -> Result<Vec<IpAddr>, crate::Error>;
}
