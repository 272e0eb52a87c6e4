//! Repository write-access check.
//!
//! GitLab reports permissions from two sources: direct project-level
//! access and inherited group-level access. The higher of the two
//! governs. Absence of a permission source means "no access", never an
//! error; only network and auth failures propagate.

use crate::api::Permissions;

/// The minimum access level that allows pushing commits
/// (GitLab "Developer").
pub const WRITE_ACCESS: u32 = 30;

/// Returns true when either permission source meets the write threshold.
pub fn has_write_access(permissions: &Permissions) -> bool {
    let project = permissions
        .project_access
        .map(|access| access.access_level)
        .unwrap_or(0);
    let group = permissions
        .group_access
        .map(|access| access.access_level)
        .unwrap_or(0);

    project.max(group) >= WRITE_ACCESS
}
