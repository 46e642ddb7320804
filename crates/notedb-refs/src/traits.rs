//! The [`RefStore`] trait defining the reference storage interface.

use notedb_types::ObjectId;

use crate::error::Result;
use crate::types::RefUpdate;

/// Storage backend for named references.
///
/// Implementations must be thread-safe (`Send + Sync`). Reads never block
/// writers for longer than a single call; there is no way to hold a ref
/// locked across calls.
pub trait RefStore: Send + Sync {
    /// Read the commit a ref points to.
    ///
    /// Returns `Ok(None)` if the ref does not exist.
    fn read_ref(&self, name: &str) -> Result<Option<ObjectId>>;

    /// List all refs whose name starts with `prefix`, sorted by name.
    fn list_refs(&self, prefix: &str) -> Result<Vec<(String, ObjectId)>>;

    /// Apply `commands` atomically.
    ///
    /// Every command's `old_target` must equal the ref's current value;
    /// otherwise nothing is applied and [`crate::RefError::LockFailure`] is
    /// returned for the first mismatching ref.
    fn apply_batch(&self, commands: &[RefUpdate]) -> Result<()>;

    /// Single-ref compare-and-swap.
    fn compare_and_swap(
        &self,
        name: &str,
        expected: Option<ObjectId>,
        new_target: Option<ObjectId>,
    ) -> Result<()> {
        self.apply_batch(&[RefUpdate::new(name, expected, new_target)])
    }
}
