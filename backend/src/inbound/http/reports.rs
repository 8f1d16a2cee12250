//! Dashboard, allocation report and export handlers.
//!
//! ```text
//! GET /api/v1/dashboard?tz_offset_minutes=60
//! GET /api/v1/reports/daily-allocation
//! GET /api/v1/loads/export?type=paused&date_from=2026-05-01&date_to=2026-05-31
//! ```
//!
//! "Today" is the caller's calendar day. Browsers report their offset in
//! minutes east of UTC as `tz_offset_minutes`; UTC is assumed when absent.

use actix_web::{get, web};
use chrono::{FixedOffset, NaiveDate};
use serde::Deserialize;
use serde_json::json;
use utoipa::IntoParams;

use crate::domain::ports::Dashboard;
use crate::domain::{DailyAllocationSummary, Error, ExportFilter, ExportKind, ExportReport};
use crate::inbound::http::ApiResult;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;

/// Caller's UTC offset.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ZoneQuery {
    /// Minutes east of UTC, e.g. `60` for UTC+1.
    pub tz_offset_minutes: Option<i32>,
}

impl ZoneQuery {
    fn zone(&self) -> Result<FixedOffset, Error> {
        parse_zone(self.tz_offset_minutes)
    }
}

fn parse_zone(minutes: Option<i32>) -> Result<FixedOffset, Error> {
    let minutes = minutes.unwrap_or(0);
    minutes
        .checked_mul(60)
        .and_then(FixedOffset::east_opt)
        .ok_or_else(|| {
            Error::invalid_request(format!("tz_offset_minutes out of range: {minutes}"))
                .with_details(json!({ "field": "tz_offset_minutes", "code": "out_of_range" }))
        })
}

/// Export filter as sent by the reports page.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ExportQuery {
    /// `all` (default), `paused` or `allocated`.
    #[serde(rename = "type")]
    #[param(rename = "type")]
    pub kind: Option<String>,
    /// First creation date included (caller's calendar).
    pub date_from: Option<NaiveDate>,
    /// Last creation date included (caller's calendar).
    pub date_to: Option<NaiveDate>,
    pub tz_offset_minutes: Option<i32>,
}

impl ExportQuery {
    fn filter(&self) -> Result<ExportFilter, Error> {
        let kind = match self.kind.as_deref() {
            None | Some("") => ExportKind::default(),
            Some(raw) => raw.parse::<ExportKind>().map_err(|message| {
                Error::invalid_request(message)
                    .with_details(json!({ "field": "type", "code": "unknown_type" }))
            })?,
        };
        Ok(ExportFilter {
            kind,
            date_from: self.date_from,
            date_to: self.date_to,
        })
    }
}

/// Status counts and the caller's personal figures.
#[utoipa::path(
    get,
    path = "/api/v1/dashboard",
    params(ZoneQuery),
    responses(
        (status = 200, description = "Dashboard", body = Dashboard),
        (status = 400, description = "Invalid offset", body = Error),
        (status = 401, description = "Unauthorised", body = Error)
    ),
    tags = ["reports"],
    operation_id = "dashboard"
)]
#[get("/dashboard")]
pub async fn dashboard(
    state: web::Data<HttpState>,
    session: SessionContext,
    query: web::Query<ZoneQuery>,
) -> ApiResult<web::Json<Dashboard>> {
    let actor = session.require_actor(state.users.as_ref()).await?;
    let zone = query.zone()?;
    Ok(web::Json(state.reports.dashboard(&actor, zone).await?))
}

/// Today's allocation per employee and allocator.
#[utoipa::path(
    get,
    path = "/api/v1/reports/daily-allocation",
    params(ZoneQuery),
    responses(
        (status = 200, description = "Daily allocation", body = DailyAllocationSummary),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Forbidden", body = Error)
    ),
    tags = ["reports"],
    operation_id = "dailyAllocation"
)]
#[get("/reports/daily-allocation")]
pub async fn daily_allocation(
    state: web::Data<HttpState>,
    session: SessionContext,
    query: web::Query<ZoneQuery>,
) -> ApiResult<web::Json<DailyAllocationSummary>> {
    let actor = session.require_actor(state.users.as_ref()).await?;
    let zone = query.zone()?;
    Ok(web::Json(
        state.reports.daily_allocation(&actor, zone).await?,
    ))
}

/// Rows for a spreadsheet export plus the suggested file name.
#[utoipa::path(
    get,
    path = "/api/v1/loads/export",
    params(ExportQuery),
    responses(
        (status = 200, description = "Export rows", body = ExportReport),
        (status = 400, description = "Invalid filter", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Forbidden", body = Error)
    ),
    tags = ["reports"],
    operation_id = "exportLoads"
)]
#[get("/loads/export")]
pub async fn export_loads(
    state: web::Data<HttpState>,
    session: SessionContext,
    query: web::Query<ExportQuery>,
) -> ApiResult<web::Json<ExportReport>> {
    let actor = session.require_actor(state.users.as_ref()).await?;
    let filter = query.filter()?;
    let zone = parse_zone(query.tz_offset_minutes)?;
    Ok(web::Json(
        state.reports.export(&actor, filter, zone).await?,
    ))
}
