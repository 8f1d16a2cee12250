//! Driving ports for load use-cases.
//!
//! Inbound adapters call these with the authenticated [`Actor`]; the
//! implementation checks existence, then the access policy, then validation.

use async_trait::async_trait;
use serde::Serialize;
use utoipa::ToSchema;

use crate::domain::{Actor, Error, Load, LoadDraft, LoadId, LoadPatch, LoadStatus, UserId};

/// Loads shown per page in the management list.
pub const PAGE_SIZE: usize = 10;

/// Assignee filter for the paginated list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AssigneeFilter {
    #[default]
    Any,
    Unassigned,
    User(UserId),
}

impl AssigneeFilter {
    /// Whether `load` passes the filter.
    #[must_use]
    pub fn matches(&self, load: &Load) -> bool {
        match self {
            Self::Any => true,
            Self::Unassigned => load.assigned_to.is_none(),
            Self::User(id) => load.is_assigned_to(id),
        }
    }
}

/// One page of the management list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct LoadPage {
    pub loads: Vec<Load>,
    /// One-based page number actually returned.
    pub page: usize,
    pub page_count: usize,
    pub total: usize,
}

impl LoadPage {
    /// Slice `loads` into page `page` (one-based, clamped to the last page).
    #[must_use]
    pub fn paginate(loads: Vec<Load>, page: usize) -> Self {
        let total = loads.len();
        let page_count = total.div_ceil(PAGE_SIZE).max(1);
        let page = page.clamp(1, page_count);
        let skip = (page - 1) * PAGE_SIZE;
        Self {
            loads: loads.into_iter().skip(skip).take(PAGE_SIZE).collect(),
            page,
            page_count,
            total,
        }
    }
}

/// Mutating load use-cases.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LoadCommand: Send + Sync {
    /// Create a load; status defaults to pending.
    async fn create(&self, actor: &Actor, draft: LoadDraft) -> Result<Load, Error>;

    /// Apply a patch and return the stored result.
    async fn update(&self, actor: &Actor, id: &LoadId, patch: LoadPatch) -> Result<Load, Error>;

    /// Hard-delete a load.
    async fn delete(&self, actor: &Actor, id: &LoadId) -> Result<(), Error>;
}

/// Read-only load use-cases.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LoadQuery: Send + Sync {
    /// Loads visible to `actor`, newest first.
    async fn list(&self, actor: &Actor) -> Result<Vec<Load>, Error>;

    /// Visible loads in one status.
    async fn list_by_status(&self, actor: &Actor, status: LoadStatus) -> Result<Vec<Load>, Error>;

    /// One load, if it exists and is visible.
    async fn get(&self, actor: &Actor, id: &LoadId) -> Result<Load, Error>;

    /// Filtered page of visible loads.
    async fn page(
        &self,
        actor: &Actor,
        filter: AssigneeFilter,
        page: usize,
    ) -> Result<LoadPage, Error>;
}
