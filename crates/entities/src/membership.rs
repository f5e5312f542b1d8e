//! Project membership and authorization rules.
//!
//! A requester's role is always derived from the project's member list at
//! the time of the check, never cached on the caller's side. Capability
//! queries answer read-path gating with a plain `bool`; the member list
//! mutations return a [`MembershipError`] and leave the list untouched when
//! they fail.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::{MemberRole, Project, ProjectMember, Task, User};

/// Authorization level of a user against one project.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EffectiveRole {
    Owner,
    Member,
    Viewer,
    /// Not on the project at all.
    None,
}

impl From<MemberRole> for EffectiveRole {
    fn from(role: MemberRole) -> Self {
        match role {
            MemberRole::Owner => Self::Owner,
            MemberRole::Member => Self::Member,
            MemberRole::Viewer => Self::Viewer,
        }
    }
}

/// Member list change that was refused because of the last-owner rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OwnerChange {
    Removal,
    Demotion,
}

impl std::fmt::Display for OwnerChange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Removal => write!(f, "Cannot remove the last owner from the project"),
            Self::Demotion => write!(f, "Cannot change role of the last owner"),
        }
    }
}

/// Errors raised by member list mutations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MembershipError {
    /// The user is already on the project.
    #[error("User is already a member of this project")]
    AlreadyMember { user_id: Uuid },

    /// No user is registered under the email.
    #[error("User not found: {email}")]
    UserNotFound { email: String },

    /// The user is not on the project.
    #[error("User is not a member of this project")]
    NotAMember { user_id: Uuid },

    /// The change would leave the project without an owner.
    #[error("{change}")]
    LastOwnerViolation { user_id: Uuid, change: OwnerChange },
}

/// Result type for membership mutations.
pub type MembershipResult<T> = Result<T, MembershipError>;

impl Project {
    /// Computes the requester's role on this project.
    pub fn effective_role(&self, requester_id: Uuid) -> EffectiveRole {
        self.member(requester_id)
            .map(|m| EffectiveRole::from(m.role))
            .unwrap_or(EffectiveRole::None)
    }

    /// Any member may read the project and its tasks.
    pub fn can_read(&self, requester_id: Uuid) -> bool {
        self.effective_role(requester_id) != EffectiveRole::None
    }

    pub fn can_edit_project(&self, requester_id: Uuid) -> bool {
        self.effective_role(requester_id) == EffectiveRole::Owner
    }

    pub fn can_delete_project(&self, requester_id: Uuid) -> bool {
        self.effective_role(requester_id) == EffectiveRole::Owner
    }

    pub fn can_manage_members(&self, requester_id: Uuid) -> bool {
        self.effective_role(requester_id) == EffectiveRole::Owner
    }

    /// Owners and members may create or edit tasks; viewers are read-only.
    pub fn can_create_or_edit_task(&self, requester_id: Uuid) -> bool {
        matches!(
            self.effective_role(requester_id),
            EffectiveRole::Owner | EffectiveRole::Member
        )
    }

    /// Owners may delete any task; anyone may delete a task they created.
    pub fn can_delete_task(&self, requester_id: Uuid, task: &Task) -> bool {
        self.effective_role(requester_id) == EffectiveRole::Owner || task.created_by == requester_id
    }

    /// Appends `user` to the member list with `role`.
    pub fn add_member(&mut self, user: &User, role: MemberRole) -> MembershipResult<&ProjectMember> {
        if self.is_member(user.id) {
            return Err(MembershipError::AlreadyMember { user_id: user.id });
        }
        self.members.push(ProjectMember::new(user.id, role));
        self.touch();
        Ok(&self.members[self.members.len() - 1])
    }

    /// Removes a user from the member list.
    pub fn remove_member(&mut self, user_id: Uuid) -> MembershipResult<ProjectMember> {
        let index = self
            .members
            .iter()
            .position(|m| m.user_id == user_id)
            .ok_or(MembershipError::NotAMember { user_id })?;

        if self.members[index].role == MemberRole::Owner && self.owner_count() == 1 {
            return Err(MembershipError::LastOwnerViolation {
                user_id,
                change: OwnerChange::Removal,
            });
        }

        let removed = self.members.remove(index);
        self.touch();
        Ok(removed)
    }

    /// Overwrites a member's role in place; `joined_at` is kept.
    pub fn change_role(
        &mut self,
        user_id: Uuid,
        new_role: MemberRole,
    ) -> MembershipResult<&ProjectMember> {
        let index = self
            .members
            .iter()
            .position(|m| m.user_id == user_id)
            .ok_or(MembershipError::NotAMember { user_id })?;

        if self.members[index].role == MemberRole::Owner
            && self.owner_count() == 1
            && new_role != MemberRole::Owner
        {
            return Err(MembershipError::LastOwnerViolation {
                user_id,
                change: OwnerChange::Demotion,
            });
        }

        self.members[index].role = new_role;
        self.touch();
        Ok(&self.members[index])
    }
}
