//! Selection and row shaping for load exports.
//!
//! Spreadsheet rendering happens elsewhere; this module decides which loads
//! go into a report and what each row says.

use std::collections::HashMap;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, NaiveTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::{Load, LoadStatus, User, UserId};

/// Shown in the "Assigned To" column for unassigned loads.
pub const UNASSIGNED: &str = "Unassigned";

/// Which loads a report includes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ExportKind {
    #[default]
    All,
    Paused,
    Allocated,
}

impl FromStr for ExportKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "all" => Ok(Self::All),
            "paused" => Ok(Self::Paused),
            "allocated" => Ok(Self::Allocated),
            other => Err(format!("export type must be all, paused or allocated; got '{other}'")),
        }
    }
}

/// Report filter: kind plus an optional inclusive date range on `created_at`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExportFilter {
    pub kind: ExportKind,
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
}

/// One report row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct ExportRow {
    #[serde(rename = "Client Name")]
    pub client_name: String,
    #[serde(rename = "Client Number")]
    pub client_number: String,
    #[serde(rename = "Status")]
    pub status: String,
    #[serde(rename = "Assigned To")]
    pub assigned_to: String,
    #[serde(rename = "Created Date")]
    pub created_date: String,
}

/// Rows plus the file name a renderer should use.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct ExportReport {
    pub filename: String,
    pub rows: Vec<ExportRow>,
}

impl ExportFilter {
    fn keeps<Tz: TimeZone>(&self, load: &Load, zone: &Tz) -> bool {
        let kind_ok = match self.kind {
            ExportKind::All => true,
            ExportKind::Paused => load.status == LoadStatus::Paused,
            ExportKind::Allocated => load.assigned_to.is_some(),
        };
        kind_ok && self.in_range(load.created_at, zone)
    }

    fn in_range<Tz: TimeZone>(&self, created_at: DateTime<Utc>, zone: &Tz) -> bool {
        let local = created_at.with_timezone(zone).naive_local();
        let after_start = self
            .date_from
            .is_none_or(|from| local >= from.and_time(NaiveTime::MIN));
        let before_end = self.date_to.is_none_or(|to| {
            to.and_hms_milli_opt(23, 59, 59, 999)
                .is_some_and(|end| local <= end)
        });
        after_start && before_end
    }
}

/// Build the report for `loads` as seen at `now`.
///
/// Date bounds are interpreted in `now`'s time zone: `date_from` from the
/// start of that day, `date_to` through its last millisecond.
pub fn build_report<Tz: TimeZone>(
    loads: &[Load],
    users: &[User],
    filter: &ExportFilter,
    now: &DateTime<Tz>,
) -> ExportReport {
    let zone = now.timezone();
    let names: HashMap<UserId, &str> = users
        .iter()
        .map(|user| (user.id, user.name.as_ref()))
        .collect();

    let rows = loads
        .iter()
        .filter(|load| filter.keeps(load, &zone))
        .map(|load| ExportRow {
            client_name: load.client_name.to_string(),
            client_number: load.client_number.to_string(),
            status: load.status.label().to_owned(),
            assigned_to: load
                .assigned_to
                .and_then(|id| names.get(&id).copied())
                .unwrap_or(UNASSIGNED)
                .to_owned(),
            created_date: load
                .created_at
                .with_timezone(&zone)
                .date_naive()
                .format("%Y-%m-%d")
                .to_string(),
        })
        .collect();

    let stem = match filter.kind {
        ExportKind::Paused => "paused_loads",
        ExportKind::All | ExportKind::Allocated => "loads_report",
    };
    ExportReport {
        filename: format!("{stem}_{}.xlsx", now.date_naive().format("%Y-%m-%d")),
        rows,
    }
}
