//! Interactive confirmation gate

/// Asks the operator whether a previewed changeset should be applied
///
/// Blocking is expected: nothing else runs while the prompt is open.
pub trait Confirmation: Send + Sync {
    /// Show `prompt` and return whether the operator accepted
    fn confirm(&self, prompt: &str) -> Result<bool, crate::Error>;
}
