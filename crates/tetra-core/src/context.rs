//! Run-wide settings shared by every domain processed in one invocation

use chrono::{DateTime, Local};

use crate::config::Layer;

/// Format of the generation timestamp in ownership comments
const COMMENT_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Immutable settings for one run
///
/// Passed explicitly to the expanders, the reconciler and the engine instead
/// of being kept in globals.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunContext {
    /// Stop after printing the changeset
    pub dry_run: bool,

    /// Rewrite unchanged records to refresh their ownership timestamp
    pub force: bool,

    /// Generation time stamped into every written comment
    pub generated_at: DateTime<Local>,
}

impl RunContext {
    /// Context stamped with the current local time
    pub fn new(dry_run: bool, force: bool) -> Self {
        Self::at(dry_run, force, Local::now())
    }

    /// Context with a fixed generation time
    pub fn at(dry_run: bool, force: bool, generated_at: DateTime<Local>) -> Self {
        Self {
            dry_run,
            force,
            generated_at,
        }
    }

    /// Ownership comment for records written by `layer`
    pub fn comment(&self, layer: Layer) -> String {
        format!(
            "{} {}",
            layer.ownership_prefix(),
            self.generated_at.format(COMMENT_TIME_FORMAT)
        )
    }
}

impl Default for RunContext {
    fn default() -> Self {
        Self::new(false, false)
    }
}
