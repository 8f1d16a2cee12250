//! Access control policy: a pure decision over (role, actor id, action, load).
//!
//! | Action                      | admin | supervisor | allocator | employee          |
//! |-----------------------------|-------|------------|-----------|-------------------|
//! | view all loads              | yes   | yes        | yes       | only assigned     |
//! | create / delete / edit load | yes   | yes        | yes       | no                |
//! | update own load's status    | yes   | yes        | yes       | if assignee       |
//! | list users                  | yes   | yes        | yes       | no                |
//! | manage users                | yes   | yes        | no        | no                |
//! | export loads                | yes   | yes        | no        | no                |
//!
//! Callers check that the target exists before asking the policy, so a
//! missing load is always reported as not found, never as forbidden.

use std::fmt;

use super::{Load, LoadPatch, Role, UserId};

/// Authenticated principal acting on the system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Actor {
    pub id: UserId,
    pub role: Role,
}

impl Actor {
    /// Pair an identity with its role.
    #[must_use]
    pub const fn new(id: UserId, role: Role) -> Self {
        Self { id, role }
    }

    /// True for roles restricted to their own assignments.
    #[must_use]
    pub const fn is_employee(&self) -> bool {
        matches!(self.role, Role::Employee)
    }

    /// Whether `load` belongs to this actor's visible set.
    #[must_use]
    pub fn can_view(&self, load: &Load) -> bool {
        !self.is_employee() || load.is_assigned_to(&self.id)
    }
}

/// Operations subject to authorization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    ViewAllLoads,
    ViewLoad,
    CreateLoad,
    DeleteLoad,
    UpdateLoad,
    UpdateOwnStatus,
    ListUsers,
    ManageUsers,
    ExportLoads,
    ViewAllocationReport,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::ViewAllLoads => "view all loads",
            Self::ViewLoad => "view this load",
            Self::CreateLoad => "create loads",
            Self::DeleteLoad => "delete loads",
            Self::UpdateLoad => "edit load fields",
            Self::UpdateOwnStatus => "change this load's status",
            Self::ListUsers => "list users",
            Self::ManageUsers => "manage users",
            Self::ExportLoads => "export loads",
            Self::ViewAllocationReport => "view the allocation report",
        };
        f.write_str(text)
    }
}

/// A denied decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("{role} may not {action}")]
pub struct AccessDenied {
    pub role: Role,
    pub action: Action,
}

/// Decide whether `actor` may perform `action` on `target`.
///
/// Load-scoped actions (`ViewLoad`, `UpdateOwnStatus`) consult `target`;
/// without one they are denied to employees.
///
/// # Examples
/// ```
/// use loadboard::domain::{authorize, Action, Actor, Role, UserId};
///
/// let allocator = Actor::new(UserId::random(), Role::Allocator);
/// assert!(authorize(&allocator, Action::CreateLoad, None).is_ok());
/// assert!(authorize(&allocator, Action::ExportLoads, None).is_err());
/// ```
pub fn authorize(actor: &Actor, action: Action, target: Option<&Load>) -> Result<(), AccessDenied> {
    let role = actor.role;
    let allowed = match action {
        Action::ViewAllLoads
        | Action::CreateLoad
        | Action::DeleteLoad
        | Action::UpdateLoad
        | Action::ListUsers
        | Action::ViewAllocationReport => role.is_privileged(),
        Action::ViewLoad | Action::UpdateOwnStatus => {
            role.is_privileged() || target.is_some_and(|load| load.is_assigned_to(&actor.id))
        }
        Action::ManageUsers | Action::ExportLoads => matches!(role, Role::Admin | Role::Supervisor),
    };
    if allowed {
        Ok(())
    } else {
        Err(AccessDenied { role, action })
    }
}

/// Decide whether `actor` may apply `patch` to `load`.
///
/// Status-only patches need [`Action::UpdateOwnStatus`]; anything touching
/// other fields needs [`Action::UpdateLoad`].
pub fn authorize_update(actor: &Actor, load: &Load, patch: &LoadPatch) -> Result<(), AccessDenied> {
    let action = if patch.is_status_only() {
        Action::UpdateOwnStatus
    } else {
        Action::UpdateLoad
    };
    authorize(actor, action, Some(load))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ClientName, ClientNumber, LoadDraft, LoadId, LoadStatus};
    use chrono::Utc;
    use rstest::{fixture, rstest};

    struct Cast {
        employee: Actor,
        other_employee: Actor,
        load: Load,
    }

    #[fixture]
    fn cast() -> Cast {
        let employee = Actor::new(UserId::random(), Role::Employee);
        let other_employee = Actor::new(UserId::random(), Role::Employee);
        let mut draft = LoadDraft::new(
            ClientName::new("Acme").expect("name"),
            ClientNumber::new("123").expect("number"),
        );
        draft.assigned_to = Some(employee.id);
        let load = Load::create(LoadId::random(), draft, UserId::random(), Utc::now());
        Cast {
            employee,
            other_employee,
            load,
        }
    }

    fn actor(role: Role) -> Actor {
        Actor::new(UserId::random(), role)
    }

    #[rstest]
    #[case(Action::ViewAllLoads, [true, true, true, false])]
    #[case(Action::CreateLoad, [true, true, true, false])]
    #[case(Action::DeleteLoad, [true, true, true, false])]
    #[case(Action::UpdateLoad, [true, true, true, false])]
    #[case(Action::ListUsers, [true, true, true, false])]
    #[case(Action::ManageUsers, [true, true, false, false])]
    #[case(Action::ExportLoads, [true, true, false, false])]
    #[case(Action::ViewAllocationReport, [true, true, true, false])]
    fn role_table(#[case] action: Action, #[case] expected: [bool; 4]) {
        for (role, allowed) in Role::ALL.into_iter().zip(expected) {
            assert_eq!(
                authorize(&actor(role), action, None).is_ok(),
                allowed,
                "{role} / {action}"
            );
        }
    }

    #[rstest]
    fn employee_may_change_status_of_own_load(cast: Cast) {
        let patch = LoadPatch::status(LoadStatus::InProgress);
        assert!(authorize_update(&cast.employee, &cast.load, &patch).is_ok());
        assert!(cast.employee.can_view(&cast.load));
    }

    #[rstest]
    fn employee_may_not_touch_someone_elses_load(cast: Cast) {
        let patch = LoadPatch::status(LoadStatus::InProgress);
        let denied = authorize_update(&cast.other_employee, &cast.load, &patch)
            .expect_err("not the assignee");
        assert_eq!(denied.action, Action::UpdateOwnStatus);
        assert!(!cast.other_employee.can_view(&cast.load));
    }

    #[rstest]
    fn employee_may_not_edit_fields_even_when_assigned(cast: Cast) {
        let patch = LoadPatch {
            employee_count: Some(crate::domain::EmployeeCount::ONE),
            ..LoadPatch::status(LoadStatus::InProgress)
        };
        let denied = authorize_update(&cast.employee, &cast.load, &patch).expect_err("fields");
        assert_eq!(denied.action, Action::UpdateLoad);
    }

    #[rstest]
    fn privileged_roles_see_every_load(cast: Cast) {
        for role in [Role::Admin, Role::Supervisor, Role::Allocator] {
            assert!(actor(role).can_view(&cast.load));
            assert!(authorize(&actor(role), Action::ViewLoad, Some(&cast.load)).is_ok());
        }
    }

    #[rstest]
    fn denial_message_names_role_and_action() {
        let denied = authorize(&actor(Role::Allocator), Action::ExportLoads, None)
            .expect_err("allocators cannot export");
        assert_eq!(denied.to_string(), "allocator may not export loads");
    }
}
