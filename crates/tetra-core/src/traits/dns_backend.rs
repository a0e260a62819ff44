// # DNS Backend Trait
//
// Defines the interface between the reconciler and a DNS provider API.
//
// ## Implementations
//
// - Cloudflare: `tetra-backend-cloudflare` crate
// - DNSPod: `tetra-backend-dnspod` crate
//
// ## Usage
//
// ```rust,ignore
// use tetra_core::{DnsBackend, reconcile};
//
// #[tokio::main]
// async fn main() -> anyhow::Result<()> {
//     let backend = /* DnsBackend implementation */;
//
//     let live = backend.get_records().await?;
//     let changes = reconcile(live, pending, false);
//     backend.update_records(&changes).await?;
//
//     Ok(())
// }
// ```

use async_trait::async_trait;

use crate::config::BackendConfig;
use crate::reconcile::ChangeSet;
use crate::record::DnsRecord;

/// Trait for DNS backend implementations
///
/// A backend is bound to one domain and one ownership prefix when it is
/// created. It never sees records it does not own.
///
/// # Trust Level: Untrusted
///
/// Backends are external integrations with strict limitations:
///
/// ## Allowed Capabilities
/// - ✅ Perform HTTP/HTTPS API calls to their endpoints only
/// - ✅ Parse provider-specific responses and normalise them into [`DnsRecord`]
/// - ✅ Return success or failure
///
/// ## Forbidden Capabilities
/// - ❌ Spawn tasks or issue concurrent requests (the printed preview must
///   match what is applied, one call at a time)
/// - ❌ Implement retry logic or backoff (a failure aborts the run)
/// - ❌ Decide what to change (owned by the reconciler)
/// - ❌ Touch records whose comment lacks the ownership prefix
#[async_trait]
pub trait DnsBackend: Send + Sync {
    /// Fetch every owned record of the domain
    ///
    /// Records are normalised before they are returned:
    /// - CNAME content carries a trailing dot
    /// - names are relative to the domain, the apex is `@`
    /// - the provider's default line is `None`
    ///
    /// Order is the provider's listing order; the reconciler relies on it
    /// to break ties.
    async fn get_records(&self) -> Result<Vec<DnsRecord>, crate::Error>;

    /// Apply a changeset: updates, then deletes, then creates
    ///
    /// The first failing API call aborts the whole operation. Calls that
    /// already succeeded are not rolled back.
    async fn update_records(&self, changes: &ChangeSet) -> Result<(), crate::Error>;

    /// Get the backend name (for logging/debugging)
    fn backend_name(&self) -> &'static str;
}

/// Helper trait for constructing DNS backends from configuration
pub trait DnsBackendFactory: Send + Sync {
    /// Create a DnsBackend instance for one domain
    ///
    /// # Parameters
    ///
    /// - `domain`: The zone the backend manages (e.g., "example.com")
    /// - `ownership_prefix`: Comment prefix of the records it may see
    /// - `config`: Backend configuration and credentials
    fn create(
        &self,
        domain: &str,
        ownership_prefix: &str,
        config: &BackendConfig,
    ) -> Result<Box<dyn DnsBackend>, crate::Error>;
}
