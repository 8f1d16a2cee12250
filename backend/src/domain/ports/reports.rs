//! Driving port for dashboards, reports and exports.

use async_trait::async_trait;
use chrono::FixedOffset;
use serde::Serialize;
use utoipa::ToSchema;

use crate::domain::{
    Actor, DailyAllocationSummary, Error, ExportFilter, ExportReport, PersonalDashboard,
    StatusCounts,
};

/// Dashboard figures for the signed-in actor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
pub struct Dashboard {
    /// Counts over the actor's visible set.
    pub counts: StatusCounts,
    /// Counts over loads assigned to the actor.
    pub mine: StatusCounts,
    pub personal: PersonalDashboard,
}

/// Report use-cases. `zone` is the caller's local UTC offset; calendar-day
/// rules are evaluated in it.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Reports: Send + Sync {
    /// Dashboard for `actor`.
    async fn dashboard(&self, actor: &Actor, zone: FixedOffset) -> Result<Dashboard, Error>;

    /// Today's allocation summary (privileged roles).
    async fn daily_allocation(
        &self,
        actor: &Actor,
        zone: FixedOffset,
    ) -> Result<DailyAllocationSummary, Error>;

    /// Export rows (admin and supervisor).
    async fn export(
        &self,
        actor: &Actor,
        filter: ExportFilter,
        zone: FixedOffset,
    ) -> Result<ExportReport, Error>;
}
