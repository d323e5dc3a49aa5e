//! Roles attached to a signed-in user for permission checks.
//!
//! Roles are never stored by Marginalia itself; the storage backend resolves
//! them on demand.

use serde::{Deserialize, Serialize};

use crate::types::AuthInfo;

/// Permissions granted to a user beyond editing their own comments.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Role {
    /// May delete comments written by anyone.
    pub can_delete: bool,
}

impl Role {
    /// The moderator role: may delete any comment.
    pub const fn admin() -> Self {
        Self { can_delete: true }
    }
}

/// Auth session plus its resolved role, as returned by the `/auth` endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthInfoWithRole {
    #[serde(flatten)]
    pub auth: AuthInfo,
    #[serde(default)]
    pub role: Option<Role>,
}

/// Whether `user` may delete a comment written by `author_id`.
pub fn can_delete_comment(user: &AuthInfo, role: Option<Role>, author_id: &str) -> bool {
    user.id == author_id || role.is_some_and(|r| r.can_delete)
}

/// Whether `user` may edit a comment written by `author_id`.
///
/// Only the author may edit; moderators can delete but not rewrite.
pub fn can_edit_comment(user: &AuthInfo, author_id: &str) -> bool {
    user.id == author_id
}
