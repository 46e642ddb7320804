//! Ref names used by checker storage.

use crate::uuid::CheckerUuid;

/// Prefix of all checker refs.
pub const REFS_CHECKERS: &str = "refs/checkers/";

/// Notes ref mapping repositories to the checkers that apply to them.
pub const REFS_META_CHECKERS: &str = "refs/meta/checkers";

/// File holding a checker's properties in its ref's tree.
pub const CHECKER_CONFIG_FILE: &str = "checker.config";

/// `refs/checkers/<first two chars>/<uuid>`.
pub fn checker_ref(uuid: &CheckerUuid) -> String {
    format!("{REFS_CHECKERS}{}/{}", uuid.shard(), uuid)
}
