//! Template expansion
//!
//! Turns the abbreviated per-domain description into concrete records.
//!
//! ## Layers
//!
//! ```text
//!   top layer (public names)        www ──CNAME──► svc.example.com.
//!                                                     │
//!   bottom layer (mid-names)        svc ──CNAME──► svc-v1 ──CNAME──► web.0
//!                                                                     │
//!   bottom layer (hosts)                                   web.0 ──A──► 10.0.0.1
//! ```
//!
//! Each pass ends with [`crate::validate::validate`] over the full candidate
//! set, so a broken template never reaches a provider.

pub mod bottom;
pub mod top;

pub use bottom::{expand_bottom, expand_host, zone_records};
pub use top::{expand_alias_groups, expand_top, flatten_apex};

use crate::config::{DomainSpec, Layer};
use crate::context::RunContext;
use crate::error::Result;
use crate::record::DnsRecord;
use crate::traits::NameResolver;
use crate::validate::validate;

/// Expand a domain with the expander of its layer, then validate the result
pub async fn expand(
    spec: &DomainSpec,
    ctx: &RunContext,
    resolver: &dyn NameResolver,
) -> Result<Vec<DnsRecord>> {
    let candidates = match spec.layer {
        Layer::Bottom => expand_bottom(spec, ctx)?,
        Layer::Top => expand_top(spec, ctx, resolver).await?,
    };
    validate(candidates)
}
