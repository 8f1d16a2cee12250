//! Read-only views derived from a set of loads.
//!
//! Every function here is pure: the caller passes the current load set (and
//! the clock reading where time matters) and gets a fresh view back.

use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};
use serde::Serialize;
use utoipa::ToSchema;

use super::{Actor, Load, LoadStatus, Role, User, UserId, UserName};

/// How long a completed load stays on the board, measured from `updated_at`.
#[must_use]
pub fn completed_window() -> Duration {
    Duration::hours(48)
}

/// Total and per-status counts over a load set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, ToSchema)]
pub struct StatusCounts {
    pub total: usize,
    pub pending: usize,
    pub in_progress: usize,
    pub paused: usize,
    pub completed: usize,
    pub transferred: usize,
}

impl StatusCounts {
    /// Count loads in a single pass.
    pub fn tally<'a>(loads: impl IntoIterator<Item = &'a Load>) -> Self {
        loads.into_iter().fold(Self::default(), |mut counts, load| {
            counts.total += 1;
            *counts.slot(load.status) += 1;
            counts
        })
    }

    /// Count for one status.
    #[must_use]
    pub const fn get(&self, status: LoadStatus) -> usize {
        match status {
            LoadStatus::Pending => self.pending,
            LoadStatus::InProgress => self.in_progress,
            LoadStatus::Paused => self.paused,
            LoadStatus::Completed => self.completed,
            LoadStatus::Transferred => self.transferred,
        }
    }

    fn slot(&mut self, status: LoadStatus) -> &mut usize {
        match status {
            LoadStatus::Pending => &mut self.pending,
            LoadStatus::InProgress => &mut self.in_progress,
            LoadStatus::Paused => &mut self.paused,
            LoadStatus::Completed => &mut self.completed,
            LoadStatus::Transferred => &mut self.transferred,
        }
    }
}

/// Loads assigned to `user`, in input order.
pub fn my_loads<'a>(loads: &'a [Load], user: &UserId) -> Vec<&'a Load> {
    loads.iter().filter(|load| load.is_assigned_to(user)).collect()
}

/// Whether a completed load is still inside the board window.
///
/// The boundary is inclusive: a load updated exactly 48 hours ago stays.
#[must_use]
pub fn within_completed_window(load: &Load, now: DateTime<Utc>) -> bool {
    now.signed_duration_since(load.updated_at) <= completed_window()
}

/// Second-level board filter offered to privileged roles.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum BoardScope {
    #[default]
    All,
    Mine,
}

/// One kanban column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KanbanColumn<'a> {
    pub status: LoadStatus,
    pub loads: Vec<&'a Load>,
}

/// Group the actor's visible loads into one column per status.
///
/// Completed loads older than [`completed_window`] are left off. The scope
/// toggle only narrows privileged views; employees already see their own.
pub fn kanban<'a>(
    loads: &'a [Load],
    actor: &Actor,
    scope: BoardScope,
    now: DateTime<Utc>,
) -> Vec<KanbanColumn<'a>> {
    let visible: Vec<&Load> = loads
        .iter()
        .filter(|load| actor.can_view(load))
        .filter(|load| scope == BoardScope::All || load.is_assigned_to(&actor.id))
        .collect();

    LoadStatus::ALL
        .into_iter()
        .map(|status| KanbanColumn {
            status,
            loads: visible
                .iter()
                .copied()
                .filter(|load| load.status == status)
                .filter(|load| status != LoadStatus::Completed || within_completed_window(load, now))
                .collect(),
        })
        .collect()
}

/// Loads in `status`, most recently updated first.
///
/// Used for the paused ("paused since") and transferred ("transferred on")
/// lists, which read their timestamp from `updated_at`.
pub fn by_recency(loads: &[Load], status: LoadStatus) -> Vec<&Load> {
    let mut selected: Vec<&Load> = loads.iter().filter(|load| load.status == status).collect();
    selected.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
    selected
}

fn local_date<Tz: TimeZone>(at: DateTime<Utc>, zone: &Tz) -> NaiveDate {
    at.with_timezone(zone).date_naive()
}

fn employees_of<'a>(loads: impl IntoIterator<Item = &'a Load>) -> u64 {
    loads
        .into_iter()
        .map(|load| u64::from(load.employee_count.get()))
        .sum()
}

/// Per-user line of the daily allocation summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct AllocationRow {
    pub user_id: UserId,
    pub name: UserName,
    pub role: Role,
    pub assigned: usize,
    pub completed: usize,
    pub employees: u64,
}

/// Today's allocation per employee/allocator plus grand totals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct DailyAllocationSummary {
    #[schema(value_type = String, format = Date)]
    pub date: NaiveDate,
    pub rows: Vec<AllocationRow>,
    pub total_loads: usize,
    pub total_completed: usize,
    pub total_employees: u64,
}

/// Summarise loads created on `now`'s local calendar day.
///
/// Membership is by calendar date in `now`'s time zone, not a rolling 24
/// hours: at 23:59 a load from 00:01 counts and one from 23:59 yesterday
/// does not. Rows cover employees and allocators sorted by name; totals
/// cover every load created today, assigned or not.
pub fn daily_allocation<Tz: TimeZone>(
    loads: &[Load],
    users: &[User],
    now: &DateTime<Tz>,
) -> DailyAllocationSummary {
    let zone = now.timezone();
    let today = now.date_naive();
    let todays: Vec<&Load> = loads
        .iter()
        .filter(|load| local_date(load.created_at, &zone) == today)
        .collect();

    let mut members: Vec<&User> = users
        .iter()
        .filter(|user| matches!(user.role, Role::Employee | Role::Allocator))
        .collect();
    members.sort_by(|a, b| a.name.as_ref().to_lowercase().cmp(&b.name.as_ref().to_lowercase()));

    let rows = members
        .into_iter()
        .map(|user| {
            let theirs: Vec<&Load> = todays
                .iter()
                .copied()
                .filter(|load| load.is_assigned_to(&user.id))
                .collect();
            AllocationRow {
                user_id: user.id,
                name: user.name.clone(),
                role: user.role,
                assigned: theirs.len(),
                completed: theirs
                    .iter()
                    .filter(|load| load.status == LoadStatus::Completed)
                    .count(),
                employees: employees_of(theirs.iter().copied()),
            }
        })
        .collect();

    DailyAllocationSummary {
        date: today,
        rows,
        total_loads: todays.len(),
        total_completed: todays
            .iter()
            .filter(|load| load.status == LoadStatus::Completed)
            .count(),
        total_employees: employees_of(todays.iter().copied()),
    }
}

/// Today's figures on the personal dashboard.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, ToSchema)]
pub struct TodayStats {
    pub assigned: usize,
    pub completed: usize,
    pub pending: usize,
    pub in_progress: usize,
    pub paused: usize,
    pub employees: u64,
    /// Rounded percentage of today's loads that are completed.
    pub completion_rate: u32,
}

/// All-time figures on the personal dashboard.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, ToSchema)]
pub struct AllTimeStats {
    pub assigned: usize,
    pub completed: usize,
    pub employees: u64,
}

/// Personal dashboard for one user.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, ToSchema)]
pub struct PersonalDashboard {
    pub today: TodayStats,
    pub all_time: AllTimeStats,
}

fn rounded_percentage(part: usize, whole: usize) -> u32 {
    if whole == 0 {
        return 0;
    }
    // Round half up: (200p + w) / 2w.
    let numerator = part.saturating_mul(200).saturating_add(whole);
    let denominator = whole.saturating_mul(2);
    u32::try_from(numerator.checked_div(denominator).unwrap_or(0)).unwrap_or(100)
}

/// Build the personal dashboard for `user` as of `now`.
pub fn personal_dashboard<Tz: TimeZone>(
    loads: &[Load],
    user: &UserId,
    now: &DateTime<Tz>,
) -> PersonalDashboard {
    let zone = now.timezone();
    let today = now.date_naive();
    let mine = my_loads(loads, user);
    let todays: Vec<&Load> = mine
        .iter()
        .copied()
        .filter(|load| local_date(load.created_at, &zone) == today)
        .collect();
    let counts = StatusCounts::tally(todays.iter().copied());

    PersonalDashboard {
        today: TodayStats {
            assigned: counts.total,
            completed: counts.completed,
            pending: counts.pending,
            in_progress: counts.in_progress,
            paused: counts.paused,
            employees: employees_of(todays.iter().copied()),
            completion_rate: rounded_percentage(counts.completed, counts.total),
        },
        all_time: AllTimeStats {
            assigned: mine.len(),
            completed: mine
                .iter()
                .filter(|load| load.status == LoadStatus::Completed)
                .count(),
            employees: employees_of(mine.iter().copied()),
        },
    }
}
