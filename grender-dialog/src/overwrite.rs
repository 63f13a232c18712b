use std::path::Path;

use crate::fs::FileSystem;

/// Decision returned by [`OverwriteGuard::check`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OverwriteDecision {
    /// The target does not exist; saving may proceed.
    Clear,
    /// The target exists; the user must confirm before the save completes.
    NeedsConfirmation,
}

/// Gates save completion behind confirmation when the target already exists.
///
/// The existence check asks the filesystem at the moment of confirmation and
/// never trusts the cached listing. The guard only decides; it does not touch
/// the file.
#[derive(Clone, Copy, Debug, Default)]
pub struct OverwriteGuard;

impl OverwriteGuard {
    /// Check whether saving to `target` requires confirmation.
    pub fn check(&self, fs: &dyn FileSystem, target: &Path) -> OverwriteDecision {
        if fs.exists(target) {
            OverwriteDecision::NeedsConfirmation
        } else {
            OverwriteDecision::Clear
        }
    }
}
