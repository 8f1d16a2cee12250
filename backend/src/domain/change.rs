//! Load change notifications published after every successful mutation.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::{Actor, Load, UserId};

/// Kind of change applied to a load.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ChangeKind {
    Insert,
    Update,
    Delete,
}

/// A committed change to one load.
///
/// `record` is the row after the change (the removed row for deletes).
/// `previous_assignee` lets the push adapter route an update to the
/// employee a load was reassigned away from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadChange {
    pub kind: ChangeKind,
    pub record: Load,
    pub previous_assignee: Option<UserId>,
}

impl LoadChange {
    /// Change for a newly created load.
    #[must_use]
    pub fn inserted(record: Load) -> Self {
        Self {
            kind: ChangeKind::Insert,
            record,
            previous_assignee: None,
        }
    }

    /// Change for an updated load, remembering the prior assignee.
    #[must_use]
    pub fn updated(record: Load, before: &Load) -> Self {
        Self {
            kind: ChangeKind::Update,
            record,
            previous_assignee: before.assigned_to,
        }
    }

    /// Change for a deleted load.
    #[must_use]
    pub fn deleted(record: Load) -> Self {
        let previous_assignee = record.assigned_to;
        Self {
            kind: ChangeKind::Delete,
            record,
            previous_assignee,
        }
    }

    /// Whether `actor` should be told about this change.
    ///
    /// Privileged actors hear everything; employees hear changes to loads
    /// that are, or just stopped being, theirs.
    #[must_use]
    pub fn concerns(&self, actor: &Actor) -> bool {
        !actor.is_employee()
            || self.record.is_assigned_to(&actor.id)
            || self.previous_assignee.as_ref() == Some(&actor.id)
    }
}
