//! Load entity and its status state machine.
//!
//! A load moves `pending → in_progress → {paused, completed, transferred}`,
//! with `paused → in_progress` to resume. `completed` and `transferred` are
//! terminal. [`TransitionPolicy::Permissive`] accepts any of the five tokens
//! for deployments that rely on the unconstrained behaviour.
//!
//! There is no dedicated transition timestamp: "paused since" and
//! "transferred on" are read from `updated_at`, so re-entering `paused`
//! forgets the first pause time.

use std::fmt;
use std::num::NonZeroU32;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::{LoadId, UserId};

/// Maximum characters accepted for a client name.
pub const CLIENT_NAME_MAX: usize = 200;
/// Maximum characters accepted for a client number.
pub const CLIENT_NUMBER_MAX: usize = 64;

/// Validation failures for load fields and status changes.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LoadValidationError {
    #[error("client_name must not be empty")]
    EmptyClientName,
    #[error("client_name must be at most {max} characters")]
    ClientNameTooLong { max: usize },
    #[error("client_number must not be empty")]
    EmptyClientNumber,
    #[error("client_number must be at most {max} characters")]
    ClientNumberTooLong { max: usize },
    #[error("employee_count must be a positive integer, got {0}")]
    InvalidEmployeeCount(i64),
    #[error(
        "status must be one of pending, in_progress, paused, completed, transferred; got '{0}'"
    )]
    InvalidStatus(String),
    #[error("cannot move a load from {from} to {to}")]
    IllegalTransition { from: LoadStatus, to: LoadStatus },
}

impl LoadValidationError {
    /// Field the error refers to, for inline form reporting.
    pub fn field(&self) -> &'static str {
        match self {
            Self::EmptyClientName | Self::ClientNameTooLong { .. } => "client_name",
            Self::EmptyClientNumber | Self::ClientNumberTooLong { .. } => "client_number",
            Self::InvalidEmployeeCount(_) => "employee_count",
            Self::InvalidStatus(_) | Self::IllegalTransition { .. } => "status",
        }
    }

    /// Stable machine-readable reason.
    pub fn reason(&self) -> &'static str {
        match self {
            Self::EmptyClientName | Self::EmptyClientNumber => "empty",
            Self::ClientNameTooLong { .. } | Self::ClientNumberTooLong { .. } => "too_long",
            Self::InvalidEmployeeCount(_) => "not_positive",
            Self::InvalidStatus(_) => "unknown_status",
            Self::IllegalTransition { .. } => "illegal_transition",
        }
    }
}

/// Lifecycle status of a load.
///
/// The wire form is exactly one of the five lowercase tokens.
///
/// # Examples
/// ```
/// use loadboard::domain::LoadStatus;
///
/// let status: LoadStatus = "in_progress".parse().expect("known token");
/// assert!(status.allowed_next().contains(&LoadStatus::Paused));
/// assert!("done".parse::<LoadStatus>().is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum LoadStatus {
    Pending,
    InProgress,
    Paused,
    Completed,
    Transferred,
}

impl LoadStatus {
    /// Every status in board column order.
    pub const ALL: [Self; 5] = [
        Self::Pending,
        Self::InProgress,
        Self::Paused,
        Self::Completed,
        Self::Transferred,
    ];

    /// Wire token.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::InProgress => "in_progress",
            Self::Paused => "paused",
            Self::Completed => "completed",
            Self::Transferred => "transferred",
        }
    }

    /// Human-readable label used by reports and exports.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::InProgress => "In Progress",
            Self::Paused => "Paused",
            Self::Completed => "Completed",
            Self::Transferred => "Transferred",
        }
    }

    /// Statuses reachable in one step under the strict graph.
    #[must_use]
    pub const fn allowed_next(self) -> &'static [Self] {
        match self {
            Self::Pending => &[Self::InProgress],
            Self::InProgress => &[Self::Paused, Self::Completed, Self::Transferred],
            Self::Paused => &[Self::InProgress],
            Self::Completed | Self::Transferred => &[],
        }
    }

    /// True when no further transition is available.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        self.allowed_next().is_empty()
    }
}

impl fmt::Display for LoadStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LoadStatus {
    type Err = LoadValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| LoadValidationError::InvalidStatus(s.to_owned()))
    }
}

/// How strictly status writes are checked against the transition graph.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransitionPolicy {
    /// Only edges of [`LoadStatus::allowed_next`] (plus same-status writes).
    #[default]
    Strict,
    /// Any of the five statuses may be written at any time.
    Permissive,
}

impl TransitionPolicy {
    /// Check a status write from `from` to `to`.
    pub fn check(self, from: LoadStatus, to: LoadStatus) -> Result<(), LoadValidationError> {
        let allowed = match self {
            Self::Permissive => true,
            Self::Strict => from == to || from.allowed_next().contains(&to),
        };
        if allowed {
            Ok(())
        } else {
            Err(LoadValidationError::IllegalTransition { from, to })
        }
    }
}

impl FromStr for TransitionPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "strict" => Ok(Self::Strict),
            "permissive" => Ok(Self::Permissive),
            other => Err(format!("expected strict or permissive, got '{other}'")),
        }
    }
}

macro_rules! bounded_text {
    ($(#[$meta:meta])* $name:ident, $max:expr, $empty:ident, $too_long:ident, $example:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
        #[serde(try_from = "String", into = "String")]
        #[schema(value_type = String, example = $example)]
        pub struct $name(String);

        impl $name {
            /// Trim and validate the value.
            pub fn new(value: impl AsRef<str>) -> Result<Self, LoadValidationError> {
                let trimmed = value.as_ref().trim();
                if trimmed.is_empty() {
                    return Err(LoadValidationError::$empty);
                }
                if trimmed.chars().count() > $max {
                    return Err(LoadValidationError::$too_long { max: $max });
                }
                Ok(Self(trimmed.to_owned()))
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                self.0.as_str()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl TryFrom<String> for $name {
            type Error = LoadValidationError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }

        impl From<$name> for String {
            fn from(value: $name) -> Self {
                value.0
            }
        }
    };
}

bounded_text!(
    /// Client the load is performed for.
    ClientName,
    CLIENT_NAME_MAX,
    EmptyClientName,
    ClientNameTooLong,
    "Acme"
);
bounded_text!(
    /// Client reference number; free text, not necessarily numeric.
    ClientNumber,
    CLIENT_NUMBER_MAX,
    EmptyClientNumber,
    ClientNumberTooLong,
    "123"
);

/// Number of employees working a load; always at least one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, ToSchema)]
#[serde(try_from = "i64", into = "u32")]
#[schema(value_type = u32, example = 1)]
pub struct EmployeeCount(NonZeroU32);

impl EmployeeCount {
    /// The default single-employee count.
    pub const ONE: Self = Self(NonZeroU32::MIN);

    /// Validate a raw count.
    pub fn new(value: i64) -> Result<Self, LoadValidationError> {
        u32::try_from(value)
            .ok()
            .and_then(NonZeroU32::new)
            .map(Self)
            .ok_or(LoadValidationError::InvalidEmployeeCount(value))
    }

    /// The count as a plain integer.
    #[must_use]
    pub const fn get(self) -> u32 {
        self.0.get()
    }
}

impl Default for EmployeeCount {
    fn default() -> Self {
        Self::ONE
    }
}

impl TryFrom<i64> for EmployeeCount {
    type Error = LoadValidationError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<EmployeeCount> for u32 {
    fn from(value: EmployeeCount) -> Self {
        value.get()
    }
}

/// A unit of client work tracked through the status lifecycle.
///
/// ## Invariants
/// - `updated_at >= created_at` and never decreases across mutations.
/// - `status` is always one of the five [`LoadStatus`] values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Load {
    pub id: LoadId,
    pub client_name: ClientName,
    pub client_number: ClientNumber,
    pub status: LoadStatus,
    pub employee_count: EmployeeCount,
    pub assigned_to: Option<UserId>,
    pub created_by: UserId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Load {
    /// Materialise a new load from a validated draft.
    #[must_use]
    pub fn create(id: LoadId, draft: LoadDraft, created_by: UserId, now: DateTime<Utc>) -> Self {
        let LoadDraft {
            client_name,
            client_number,
            employee_count,
            assigned_to,
            status,
        } = draft;
        Self {
            id,
            client_name,
            client_number,
            status,
            employee_count,
            assigned_to,
            created_by,
            created_at: now,
            updated_at: now,
        }
    }

    /// Return a copy with `patch` applied and `updated_at` bumped.
    ///
    /// Transition rules are not checked here; callers consult a
    /// [`TransitionPolicy`] first.
    #[must_use]
    pub fn with_patch(&self, patch: &LoadPatch, now: DateTime<Utc>) -> Self {
        let mut next = self.clone();
        if let Some(name) = &patch.client_name {
            next.client_name = name.clone();
        }
        if let Some(number) = &patch.client_number {
            next.client_number = number.clone();
        }
        if let Some(status) = patch.status {
            next.status = status;
        }
        if let Some(count) = patch.employee_count {
            next.employee_count = count;
        }
        if let Some(assignee) = patch.assigned_to {
            next.assigned_to = assignee;
        }
        next.updated_at = next.updated_at.max(now);
        next
    }

    /// True when `user` is the current assignee.
    #[must_use]
    pub fn is_assigned_to(&self, user: &UserId) -> bool {
        self.assigned_to.as_ref() == Some(user)
    }
}

/// Validated input for creating a load.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadDraft {
    pub client_name: ClientName,
    pub client_number: ClientNumber,
    pub employee_count: EmployeeCount,
    pub assigned_to: Option<UserId>,
    pub status: LoadStatus,
}

impl LoadDraft {
    /// Draft with the default employee count, no assignee and `pending` status.
    #[must_use]
    pub fn new(client_name: ClientName, client_number: ClientNumber) -> Self {
        Self {
            client_name,
            client_number,
            employee_count: EmployeeCount::ONE,
            assigned_to: None,
            status: LoadStatus::Pending,
        }
    }
}

/// Partial update; `None` leaves a field untouched.
///
/// `assigned_to: Some(None)` clears the assignee.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadPatch {
    pub client_name: Option<ClientName>,
    pub client_number: Option<ClientNumber>,
    pub status: Option<LoadStatus>,
    pub employee_count: Option<EmployeeCount>,
    pub assigned_to: Option<Option<UserId>>,
}

impl LoadPatch {
    /// A patch that only changes the status.
    #[must_use]
    pub fn status(status: LoadStatus) -> Self {
        Self {
            status: Some(status),
            ..Self::default()
        }
    }

    /// A patch that only changes the assignee.
    #[must_use]
    pub fn assign(assignee: Option<UserId>) -> Self {
        Self {
            assigned_to: Some(assignee),
            ..Self::default()
        }
    }

    /// True when nothing would change.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.client_name.is_none()
            && self.client_number.is_none()
            && self.status.is_none()
            && self.employee_count.is_none()
            && self.assigned_to.is_none()
    }

    /// True when the patch touches the status and nothing else.
    #[must_use]
    pub const fn is_status_only(&self) -> bool {
        self.status.is_some()
            && self.client_name.is_none()
            && self.client_number.is_none()
            && self.employee_count.is_none()
            && self.assigned_to.is_none()
    }
}

#[cfg(test)]
mod tests;
