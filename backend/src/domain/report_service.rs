//! Dashboards, the daily allocation summary and export selection.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, FixedOffset};
use mockable::Clock;
use tracing::debug;

use crate::domain::ports::{Dashboard, LoadRepository, Reports, UserRepository};
use crate::domain::service_support::{
    map_access_denied, map_load_repository_error, map_user_repository_error,
};
use crate::domain::{
    Action, Actor, DailyAllocationSummary, Error, ExportFilter, ExportReport, Load, StatusCounts,
    authorize, build_report, daily_allocation, my_loads, personal_dashboard,
};

/// Service implementing [`Reports`].
#[derive(Clone)]
pub struct ReportService<L, U> {
    loads: Arc<L>,
    users: Arc<U>,
    clock: Arc<dyn Clock>,
}

impl<L, U> ReportService<L, U> {
    pub fn new(loads: Arc<L>, users: Arc<U>, clock: Arc<dyn Clock>) -> Self {
        Self {
            loads,
            users,
            clock,
        }
    }

    fn now_in(&self, zone: FixedOffset) -> DateTime<FixedOffset> {
        self.clock.utc().with_timezone(&zone)
    }
}

impl<L, U> ReportService<L, U>
where
    L: LoadRepository,
    U: UserRepository,
{
    async fn visible(&self, actor: &Actor) -> Result<Vec<Load>, Error> {
        let loads = if actor.is_employee() {
            self.loads.list_assigned_to(&actor.id).await
        } else {
            self.loads.list_all().await
        };
        loads.map_err(map_load_repository_error)
    }
}

#[async_trait]
impl<L, U> Reports for ReportService<L, U>
where
    L: LoadRepository,
    U: UserRepository,
{
    async fn dashboard(&self, actor: &Actor, zone: FixedOffset) -> Result<Dashboard, Error> {
        let loads = self.visible(actor).await?;
        let now = self.now_in(zone);
        Ok(Dashboard {
            counts: StatusCounts::tally(&loads),
            mine: StatusCounts::tally(my_loads(&loads, &actor.id)),
            personal: personal_dashboard(&loads, &actor.id, &now),
        })
    }

    async fn daily_allocation(
        &self,
        actor: &Actor,
        zone: FixedOffset,
    ) -> Result<DailyAllocationSummary, Error> {
        authorize(actor, Action::ViewAllocationReport, None).map_err(map_access_denied)?;
        let loads = self.visible(actor).await?;
        let users = self.users.list().await.map_err(map_user_repository_error)?;
        let summary = daily_allocation(&loads, &users, &self.now_in(zone));
        debug!(date = %summary.date, total = summary.total_loads, "daily allocation computed");
        Ok(summary)
    }

    async fn export(
        &self,
        actor: &Actor,
        filter: ExportFilter,
        zone: FixedOffset,
    ) -> Result<ExportReport, Error> {
        authorize(actor, Action::ExportLoads, None).map_err(map_access_denied)?;
        let loads = self.visible(actor).await?;
        let users = self.users.list().await.map_err(map_user_repository_error)?;
        let report = build_report(&loads, &users, &filter, &self.now_in(zone));
        debug!(rows = report.rows.len(), filename = %report.filename, "export prepared");
        Ok(report)
    }
}
