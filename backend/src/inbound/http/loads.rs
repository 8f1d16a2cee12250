//! Load handlers.
//!
//! ```text
//! GET    /api/v1/loads
//! GET    /api/v1/loads/page?assigned_to=unassigned&page=2
//! GET    /api/v1/loads/status/{status}
//! GET    /api/v1/loads/{id}
//! POST   /api/v1/loads {"client_name":"Acme","client_number":"42"}
//! PUT    /api/v1/loads/{id} {"status":"in_progress"}
//! DELETE /api/v1/loads/{id}
//! ```
//!
//! Payload strings are parsed into domain types here, so the services only
//! ever see validated drafts and patches.

use actix_web::{HttpResponse, delete, get, post, put, web};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::json;
use utoipa::{IntoParams, ToSchema};

use crate::domain::ports::{AssigneeFilter, LoadPage};
use crate::domain::service_support::map_load_validation;
use crate::domain::{
    ClientName, ClientNumber, EmployeeCount, Error, Load, LoadDraft, LoadId, LoadPatch,
    LoadStatus, UserId,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;

/// Body for `POST /loads`.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct CreateLoadRequest {
    /// Older clients send this as `title`.
    #[serde(alias = "title")]
    #[schema(example = "Acme Logistics")]
    pub client_name: String,
    #[schema(example = "AC-1042")]
    pub client_number: String,
    /// Defaults to 1.
    #[serde(default)]
    pub employee_count: Option<i64>,
    #[serde(default)]
    pub assigned_to: Option<UserId>,
    /// Defaults to `pending`.
    #[serde(default)]
    #[schema(example = "pending")]
    pub status: Option<String>,
}

impl TryFrom<CreateLoadRequest> for LoadDraft {
    type Error = Error;

    fn try_from(value: CreateLoadRequest) -> Result<Self, Self::Error> {
        let client_name = ClientName::new(value.client_name).map_err(map_load_validation)?;
        let client_number = ClientNumber::new(value.client_number).map_err(map_load_validation)?;
        let mut draft = Self::new(client_name, client_number);
        if let Some(count) = value.employee_count {
            draft.employee_count = EmployeeCount::new(count).map_err(map_load_validation)?;
        }
        if let Some(status) = value.status {
            draft.status = parse_status(&status)?;
        }
        draft.assigned_to = value.assigned_to;
        Ok(draft)
    }
}

/// Body for `PUT /loads/{id}`.
///
/// Absent fields stay untouched; `"assigned_to": null` clears the assignee.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct UpdateLoadRequest {
    #[serde(default, alias = "title")]
    pub client_name: Option<String>,
    #[serde(default)]
    pub client_number: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub employee_count: Option<i64>,
    #[serde(default, deserialize_with = "present_or_null")]
    #[schema(value_type = Option<String>, format = Uuid)]
    pub assigned_to: Option<Option<UserId>>,
}

/// Distinguish an explicit `null` from an absent field.
fn present_or_null<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

impl TryFrom<UpdateLoadRequest> for LoadPatch {
    type Error = Error;

    fn try_from(value: UpdateLoadRequest) -> Result<Self, Self::Error> {
        Ok(Self {
            client_name: value
                .client_name
                .map(ClientName::new)
                .transpose()
                .map_err(map_load_validation)?,
            client_number: value
                .client_number
                .map(ClientNumber::new)
                .transpose()
                .map_err(map_load_validation)?,
            status: value.status.as_deref().map(parse_status).transpose()?,
            employee_count: value
                .employee_count
                .map(EmployeeCount::new)
                .transpose()
                .map_err(map_load_validation)?,
            assigned_to: value.assigned_to,
        })
    }
}

fn parse_status(raw: &str) -> Result<LoadStatus, Error> {
    raw.parse::<LoadStatus>().map_err(map_load_validation)
}

/// Query for the paginated list.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PageQuery {
    /// `unassigned`, a user id, or absent for everyone.
    pub assigned_to: Option<String>,
    /// One-based page number; defaults to 1.
    pub page: Option<usize>,
}

fn assignee_filter(raw: Option<&str>) -> Result<AssigneeFilter, Error> {
    match raw.map(str::trim) {
        None | Some("" | "all") => Ok(AssigneeFilter::Any),
        Some("unassigned") => Ok(AssigneeFilter::Unassigned),
        Some(other) => UserId::new(other).map(AssigneeFilter::User).map_err(|err| {
            Error::invalid_request(err.to_string())
                .with_details(json!({ "field": "assigned_to", "code": "invalid_id" }))
        }),
    }
}

/// Loads visible to the caller, newest first.
#[utoipa::path(
    get,
    path = "/api/v1/loads",
    responses(
        (status = 200, description = "Visible loads", body = [Load]),
        (status = 401, description = "Unauthorised", body = Error)
    ),
    tags = ["loads"],
    operation_id = "listLoads"
)]
#[get("/loads")]
pub async fn list_loads(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<Vec<Load>>> {
    let actor = session.require_actor(state.users.as_ref()).await?;
    Ok(web::Json(state.loads_query.list(&actor).await?))
}

/// One page of the management list.
#[utoipa::path(
    get,
    path = "/api/v1/loads/page",
    params(PageQuery),
    responses(
        (status = 200, description = "Page of loads", body = LoadPage),
        (status = 400, description = "Invalid filter", body = Error),
        (status = 401, description = "Unauthorised", body = Error)
    ),
    tags = ["loads"],
    operation_id = "pageLoads"
)]
#[get("/loads/page")]
pub async fn page_loads(
    state: web::Data<HttpState>,
    session: SessionContext,
    query: web::Query<PageQuery>,
) -> ApiResult<web::Json<LoadPage>> {
    let actor = session.require_actor(state.users.as_ref()).await?;
    let filter = assignee_filter(query.assigned_to.as_deref())?;
    let page = state
        .loads_query
        .page(&actor, filter, query.page.unwrap_or(1))
        .await?;
    Ok(web::Json(page))
}

/// Visible loads in one status.
#[utoipa::path(
    get,
    path = "/api/v1/loads/status/{status}",
    params(("status" = String, Path, description = "Status token")),
    responses(
        (status = 200, description = "Loads in the status", body = [Load]),
        (status = 400, description = "Unknown status", body = Error),
        (status = 401, description = "Unauthorised", body = Error)
    ),
    tags = ["loads"],
    operation_id = "listLoadsByStatus"
)]
#[get("/loads/status/{status}")]
pub async fn list_loads_by_status(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<web::Json<Vec<Load>>> {
    let actor = session.require_actor(state.users.as_ref()).await?;
    let status = parse_status(&path.into_inner())?;
    Ok(web::Json(
        state.loads_query.list_by_status(&actor, status).await?,
    ))
}

/// One load.
#[utoipa::path(
    get,
    path = "/api/v1/loads/{id}",
    params(("id" = String, Path, format = Uuid)),
    responses(
        (status = 200, description = "Load", body = Load),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Forbidden", body = Error),
        (status = 404, description = "Not found", body = Error)
    ),
    tags = ["loads"],
    operation_id = "getLoad"
)]
#[get("/loads/{id}")]
pub async fn get_load(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<LoadId>,
) -> ApiResult<web::Json<Load>> {
    let actor = session.require_actor(state.users.as_ref()).await?;
    Ok(web::Json(
        state.loads_query.get(&actor, &path.into_inner()).await?,
    ))
}

/// Create a load.
#[utoipa::path(
    post,
    path = "/api/v1/loads",
    request_body = CreateLoadRequest,
    responses(
        (status = 201, description = "Created", body = Load),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Forbidden", body = Error)
    ),
    tags = ["loads"],
    operation_id = "createLoad"
)]
#[post("/loads")]
pub async fn create_load(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<CreateLoadRequest>,
) -> ApiResult<HttpResponse> {
    let actor = session.require_actor(state.users.as_ref()).await?;
    let draft = LoadDraft::try_from(payload.into_inner())?;
    let load = state.loads.create(&actor, draft).await?;
    Ok(HttpResponse::Created().json(load))
}

/// Apply a partial update.
#[utoipa::path(
    put,
    path = "/api/v1/loads/{id}",
    params(("id" = String, Path, format = Uuid)),
    request_body = UpdateLoadRequest,
    responses(
        (status = 200, description = "Stored load", body = Load),
        (status = 400, description = "Invalid request or transition", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Forbidden", body = Error),
        (status = 404, description = "Not found", body = Error)
    ),
    tags = ["loads"],
    operation_id = "updateLoad"
)]
#[put("/loads/{id}")]
pub async fn update_load(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<LoadId>,
    payload: web::Json<UpdateLoadRequest>,
) -> ApiResult<web::Json<Load>> {
    let actor = session.require_actor(state.users.as_ref()).await?;
    let patch = LoadPatch::try_from(payload.into_inner())?;
    let load = state
        .loads
        .update(&actor, &path.into_inner(), patch)
        .await?;
    Ok(web::Json(load))
}

/// Hard-delete a load.
#[utoipa::path(
    delete,
    path = "/api/v1/loads/{id}",
    params(("id" = String, Path, format = Uuid)),
    responses(
        (status = 204, description = "Deleted"),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Forbidden", body = Error),
        (status = 404, description = "Not found", body = Error)
    ),
    tags = ["loads"],
    operation_id = "deleteLoad"
)]
#[delete("/loads/{id}")]
pub async fn delete_load(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<LoadId>,
) -> ApiResult<HttpResponse> {
    let actor = session.require_actor(state.users.as_ref()).await?;
    state.loads.delete(&actor, &path.into_inner()).await?;
    Ok(HttpResponse::NoContent().finish())
}

#[cfg(test)]
#[path = "loads_tests.rs"]
mod tests;
