//! Load use-cases: role-filtered reads and validated, event-publishing writes.
//!
//! Id-addressed operations check existence first, then the access policy,
//! then field and transition rules, so callers can rely on a missing load
//! always surfacing as not found.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use serde_json::json;
use tracing::info;

use crate::domain::ports::{
    AssigneeFilter, LoadCommand, LoadEventPublisher, LoadPage, LoadQuery, LoadRepository,
    UserRepository,
};
use crate::domain::service_support::{
    map_access_denied, map_load_repository_error, map_load_validation, map_user_repository_error,
};
use crate::domain::{
    Action, Actor, Error, Load, LoadChange, LoadDraft, LoadId, LoadPatch, LoadStatus,
    TransitionPolicy, UserId, authorize, authorize_update,
};

/// Load service implementing [`LoadCommand`] and [`LoadQuery`].
#[derive(Clone)]
pub struct LoadService<L, U> {
    loads: Arc<L>,
    users: Arc<U>,
    events: Arc<dyn LoadEventPublisher>,
    clock: Arc<dyn Clock>,
    policy: TransitionPolicy,
}

impl<L, U> LoadService<L, U> {
    /// Create a service with the strict transition policy.
    pub fn new(
        loads: Arc<L>,
        users: Arc<U>,
        events: Arc<dyn LoadEventPublisher>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            loads,
            users,
            events,
            clock,
            policy: TransitionPolicy::default(),
        }
    }

    /// Replace the transition policy.
    #[must_use]
    pub fn with_policy(mut self, policy: TransitionPolicy) -> Self {
        self.policy = policy;
        self
    }
}

impl<L, U> LoadService<L, U>
where
    L: LoadRepository,
    U: UserRepository,
{
    async fn existing(&self, id: &LoadId) -> Result<Load, Error> {
        self.loads
            .find(id)
            .await
            .map_err(map_load_repository_error)?
            .ok_or_else(|| Error::not_found(format!("load {id} not found")))
    }

    async fn ensure_assignee_exists(&self, assignee: Option<&UserId>) -> Result<(), Error> {
        let Some(user_id) = assignee else {
            return Ok(());
        };
        let found = self
            .users
            .find_by_id(user_id)
            .await
            .map_err(map_user_repository_error)?;
        if found.is_some() {
            return Ok(());
        }
        Err(
            Error::invalid_request(format!("assignee {user_id} does not exist")).with_details(
                json!({
                    "field": "assigned_to",
                    "code": "unknown_user",
                }),
            ),
        )
    }

    async fn visible(&self, actor: &Actor) -> Result<Vec<Load>, Error> {
        let loads = if actor.is_employee() {
            self.loads.list_assigned_to(&actor.id).await
        } else {
            self.loads.list_all().await
        };
        let mut loads = loads.map_err(map_load_repository_error)?;
        loads.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(loads)
    }
}

#[async_trait]
impl<L, U> LoadCommand for LoadService<L, U>
where
    L: LoadRepository,
    U: UserRepository,
{
    async fn create(&self, actor: &Actor, draft: LoadDraft) -> Result<Load, Error> {
        authorize(actor, Action::CreateLoad, None).map_err(map_access_denied)?;
        // New loads enter the graph at `pending`.
        self.policy
            .check(LoadStatus::Pending, draft.status)
            .map_err(map_load_validation)?;
        self.ensure_assignee_exists(draft.assigned_to.as_ref())
            .await?;

        let load = Load::create(LoadId::random(), draft, actor.id, self.clock.utc());
        self.loads
            .insert(&load)
            .await
            .map_err(map_load_repository_error)?;
        info!(load_id = %load.id, created_by = %actor.id, "load created");
        self.events.publish(LoadChange::inserted(load.clone()));
        Ok(load)
    }

    async fn update(&self, actor: &Actor, id: &LoadId, patch: LoadPatch) -> Result<Load, Error> {
        let current = self.existing(id).await?;
        authorize_update(actor, &current, &patch).map_err(map_access_denied)?;
        if patch.is_empty() {
            return Ok(current);
        }
        if let Some(next) = patch.status {
            self.policy
                .check(current.status, next)
                .map_err(map_load_validation)?;
        }
        if let Some(assignee) = &patch.assigned_to {
            self.ensure_assignee_exists(assignee.as_ref()).await?;
        }

        let updated = current.with_patch(&patch, self.clock.utc());
        self.loads
            .update(&updated)
            .await
            .map_err(map_load_repository_error)?;
        info!(
            load_id = %updated.id,
            actor = %actor.id,
            status = %updated.status,
            "load updated"
        );
        self.events.publish(LoadChange::updated(updated.clone(), &current));
        Ok(updated)
    }

    async fn delete(&self, actor: &Actor, id: &LoadId) -> Result<(), Error> {
        let current = self.existing(id).await?;
        authorize(actor, Action::DeleteLoad, Some(&current)).map_err(map_access_denied)?;
        let removed = self
            .loads
            .delete(id)
            .await
            .map_err(map_load_repository_error)?;
        if !removed {
            return Err(Error::not_found(format!("load {id} not found")));
        }
        info!(load_id = %id, actor = %actor.id, "load deleted");
        self.events.publish(LoadChange::deleted(current));
        Ok(())
    }
}

#[async_trait]
impl<L, U> LoadQuery for LoadService<L, U>
where
    L: LoadRepository,
    U: UserRepository,
{
    async fn list(&self, actor: &Actor) -> Result<Vec<Load>, Error> {
        self.visible(actor).await
    }

    async fn list_by_status(&self, actor: &Actor, status: LoadStatus) -> Result<Vec<Load>, Error> {
        let mut loads = self.visible(actor).await?;
        loads.retain(|load| load.status == status);
        Ok(loads)
    }

    async fn get(&self, actor: &Actor, id: &LoadId) -> Result<Load, Error> {
        let load = self.existing(id).await?;
        authorize(actor, Action::ViewLoad, Some(&load)).map_err(map_access_denied)?;
        Ok(load)
    }

    async fn page(
        &self,
        actor: &Actor,
        filter: AssigneeFilter,
        page: usize,
    ) -> Result<LoadPage, Error> {
        let mut loads = self.visible(actor).await?;
        loads.retain(|load| filter.matches(load));
        Ok(LoadPage::paginate(loads, page))
    }
}

#[cfg(test)]
#[path = "load_service_tests.rs"]
mod tests;
