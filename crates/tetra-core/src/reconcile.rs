//! Three-way reconciliation of desired against live records
//!
//! ## Algorithm
//!
//! ```text
//! pending ──► exact pass ──► similarity pass ──► partition
//!                │                  │                │
//!        equivalent live     same (name, type)   no id  → adding
//!        record consumed     live record gives   id     → updating
//!        (kept if forced)    its id               pool   → deleting
//! ```
//!
//! Both passes are greedy and walk the live pool in fetch order, so the
//! first matching live record always wins.

use serde::Serialize;
use tracing::{debug, info};

use crate::record::DnsRecord;

/// Operations turning the live record set into the desired one
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ChangeSet {
    /// Records to create (no id)
    pub adding: Vec<DnsRecord>,
    /// Records to rewrite in place (id of the live record they replace)
    pub updating: Vec<DnsRecord>,
    /// Live records to remove
    pub deleting: Vec<DnsRecord>,
}

impl ChangeSet {
    /// Whether nothing needs to be done
    pub fn is_empty(&self) -> bool {
        self.adding.is_empty() && self.updating.is_empty() && self.deleting.is_empty()
    }

    /// Total number of operations
    pub fn len(&self) -> usize {
        self.adding.len() + self.updating.len() + self.deleting.len()
    }
}

/// Running count of applied operations, logged as `n/total`
#[derive(Debug)]
pub struct Progress {
    done: usize,
    total: usize,
}

impl Progress {
    /// Start counting the operations of a changeset
    pub fn new(changes: &ChangeSet) -> Self {
        Self {
            done: 0,
            total: changes.len(),
        }
    }

    /// Record `count` finished operations
    pub fn advance(&mut self, count: usize) {
        self.done = (self.done + count).min(self.total);
        info!("{}/{}", self.done, self.total);
    }

    /// Operations finished so far
    pub fn done(&self) -> usize {
        self.done
    }
}

/// Diff `pending` against `live`
///
/// With `force`, pending records that already exist live are kept as
/// updates so their ownership comment is rewritten.
pub fn reconcile(live: Vec<DnsRecord>, pending: Vec<DnsRecord>, force: bool) -> ChangeSet {
    let mut pool = live;

    let mut remaining = Vec::with_capacity(pending.len());
    for mut record in pending {
        record.id = None;
        match pool.iter().position(|existing| existing.is_equivalent(&record)) {
            Some(index) => {
                let existing = pool.remove(index);
                if force {
                    debug!("Refreshing {}", record.summary());
                    record.id = existing.id;
                    remaining.push(record);
                } else {
                    debug!("Unchanged {}", record.summary());
                }
            }
            None => remaining.push(record),
        }
    }

    for record in remaining.iter_mut().filter(|r| r.id.is_none()) {
        if let Some(index) = pool.iter().position(|existing| record.is_similar(existing)) {
            let existing = pool.remove(index);
            debug!("Replacing {} with {}", existing.summary(), record.summary());
            record.id = existing.id;
        }
    }

    let (updating, adding): (Vec<_>, Vec<_>) =
        remaining.into_iter().partition(|record| record.id.is_some());

    ChangeSet {
        adding,
        updating,
        deleting: pool,
    }
}
