//! Plugin-based backend registry
//!
//! Backends are registered by name at startup, so the binary picks the
//! implementation from the configured `backend` key without an if-else chain.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use tetra_core::registry::BackendRegistry;
//!
//! let registry = BackendRegistry::new();
//! tetra_backend_cloudflare::register(&registry);
//!
//! let backend = registry.create_backend("example.com", "TETRAB", &config)?;
//! ```
//!
//! ## Registration
//!
//! Implementations register themselves during initialization:
//!
//! ```rust,ignore
//! // In tetra-backend-cloudflare crate
//! pub fn register(registry: &BackendRegistry) {
//!     registry.register_backend("cloudflare", Box::new(CloudflareFactory));
//! }
//! ```

use crate::config::BackendConfig;
use crate::error::{Error, Result};
use crate::traits::{DnsBackend, DnsBackendFactory};
use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

/// Registry of backend factories keyed by backend type name
///
/// ## Thread Safety
///
/// The registry uses interior mutability with RwLock, allowing concurrent
/// reads and exclusive writes.
#[derive(Default)]
pub struct BackendRegistry {
    backends: RwLock<HashMap<String, Box<dyn DnsBackendFactory>>>,
}

impl BackendRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a backend factory
    ///
    /// # Parameters
    ///
    /// - `name`: Backend type name as written in the config file
    /// - `factory`: Factory object for creating backend instances
    pub fn register_backend(&self, name: impl Into<String>, factory: Box<dyn DnsBackendFactory>) {
        let mut backends = self.backends.write().unwrap_or_else(PoisonError::into_inner);
        backends.insert(name.into(), factory);
    }

    /// Create the backend for one domain
    ///
    /// # Returns
    ///
    /// - `Ok(Box<dyn DnsBackend>)`: Created backend instance
    /// - `Err(Error)`: If the backend type is not registered or creation fails
    pub fn create_backend(
        &self,
        domain: &str,
        ownership_prefix: &str,
        config: &BackendConfig,
    ) -> Result<Box<dyn DnsBackend>> {
        let backend_type = config.type_name();
        let backends = self.backends.read().unwrap_or_else(PoisonError::into_inner);

        let factory = backends.get(backend_type).ok_or_else(|| {
            Error::config(format!(
                "Backend '{}' is not available in this build",
                backend_type
            ))
        })?;

        factory.create(domain, ownership_prefix, config)
    }

    /// List all registered backend types
    pub fn list_backends(&self) -> Vec<String> {
        let backends = self.backends.read().unwrap_or_else(PoisonError::into_inner);
        let mut names: Vec<String> = backends.keys().cloned().collect();
        names.sort();
        names
    }

    /// Check if a backend type is registered
    pub fn has_backend(&self, name: &str) -> bool {
        let backends = self.backends.read().unwrap_or_else(PoisonError::into_inner);
        backends.contains_key(name)
    }
}
