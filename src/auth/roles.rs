//! Role authorization engine.
//!
//! One pure function decides every account-management action; it never does
//! I/O and never raises. Handlers load the target account, work out whether
//! the request actually changes a role, and ask here before touching the
//! store.

use crate::db::Role;

/// Account-management actions subject to role checks
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdminAction {
    /// Create an account holding the given role
    Create { assigned_role: Role },
    /// Update account details. `new_role` is set only when the request
    /// would actually change the target's role.
    Update { new_role: Option<Role> },
    /// Change the target account's password
    ResetPassword,
}

/// Decide whether `requester` may perform `action` against a target whose
/// current role is `target`. `is_self` marks the requester acting on their
/// own account.
///
/// Own-role changes are refused at any rank, super admins included. The
/// current-password proof for self-service password changes is enforced by
/// the credential layer, not here.
pub fn can_perform(
    requester: Role,
    action: AdminAction,
    target: Option<Role>,
    is_self: bool,
) -> bool {
    // Nobody edits their own role
    if is_self {
        if let AdminAction::Update { new_role: Some(_) } = action {
            return false;
        }
    }

    if requester == Role::SuperAdmin {
        return true;
    }

    match action {
        AdminAction::Create { assigned_role } => {
            requester == Role::Admin && assigned_role == Role::Moderator
        }
        AdminAction::Update { new_role } => match requester {
            Role::Admin => {
                target == Some(Role::Moderator)
                    && new_role.map_or(true, |role| role.level() < Role::Admin.level())
            }
            // Moderators may touch details but never role fields
            Role::Moderator => new_role.is_none(),
            Role::SuperAdmin => true,
        },
        AdminAction::ResetPassword => match requester {
            Role::Admin => is_self || target == Some(Role::Moderator),
            Role::Moderator => is_self,
            Role::SuperAdmin => true,
        },
    }
}
