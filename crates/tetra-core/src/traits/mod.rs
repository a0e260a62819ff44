//! Core traits for the Tetra system
//!
//! This module defines the abstract interfaces that all implementations must follow.
//!
//! - [`DnsBackend`]: Fetch and apply records via provider APIs
//! - [`NameResolver`]: Resolve names when flattening apex CNAMEs
//! - [`Confirmation`]: Operator approval before changes are applied

pub mod confirmation;
pub mod dns_backend;
pub mod name_resolver;

pub use confirmation::Confirmation;
pub use dns_backend::{DnsBackend, DnsBackendFactory};
pub use name_resolver::NameResolver;
