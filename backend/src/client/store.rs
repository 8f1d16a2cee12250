//! Local cache of the loads visible to one actor.
//!
//! Writes go through a two-phase protocol: [`LoadStore::apply_optimistic`]
//! changes the cached row immediately and hands back a [`RollbackToken`];
//! the caller later settles it with [`LoadStore::confirm`] or
//! [`LoadStore::rollback`]. While a row has unsettled writes, the last
//! authoritative version seen for it is kept aside as its baseline, so push
//! events never clobber an optimistic value and a rollback can return to
//! the freshest server state.

use std::collections::HashMap;

use chrono::{DateTime, Utc};

use crate::domain::{Actor, Load, LoadId, LoadPatch};

/// Handle for one optimistic write.
///
/// Tokens are ordered by issue: a later token for the same load was applied
/// on top of an earlier one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RollbackToken {
    seq: u64,
    id: LoadId,
}

impl RollbackToken {
    /// Load the write applies to.
    #[must_use]
    pub const fn load_id(&self) -> LoadId {
        self.id
    }
}

/// Failures of store operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    #[error("load {0} is not in the store")]
    UnknownLoad(LoadId),
    #[error("write for load {} was already settled", .0.id)]
    UnknownToken(RollbackToken),
}

#[derive(Debug, Clone)]
struct PendingWrite {
    token: RollbackToken,
    before: Load,
}

/// Ordered collection of loads, newest insert first.
#[derive(Debug, Clone)]
pub struct LoadStore {
    actor: Actor,
    loads: Vec<Load>,
    pending: Vec<PendingWrite>,
    baselines: HashMap<LoadId, Load>,
    next_seq: u64,
}

impl LoadStore {
    /// Empty store scoped to `actor`.
    #[must_use]
    pub fn new(actor: Actor) -> Self {
        Self {
            actor,
            loads: Vec::new(),
            pending: Vec::new(),
            baselines: HashMap::new(),
            next_seq: 0,
        }
    }

    /// Actor whose view this store holds.
    #[must_use]
    pub const fn actor(&self) -> &Actor {
        &self.actor
    }

    /// Current rows in display order.
    #[must_use]
    pub fn loads(&self) -> &[Load] {
        &self.loads
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.loads.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.loads.is_empty()
    }

    /// Current row for `id`.
    #[must_use]
    pub fn get(&self, id: &LoadId) -> Option<&Load> {
        self.loads.iter().find(|load| load.id == *id)
    }

    /// True while `id` has unsettled optimistic writes.
    #[must_use]
    pub fn has_pending(&self, id: &LoadId) -> bool {
        self.pending.iter().any(|write| write.token.id == *id)
    }

    fn position(&self, id: &LoadId) -> Option<usize> {
        self.loads.iter().position(|load| load.id == *id)
    }

    fn replace(&mut self, load: Load) {
        if let Some(slot) = self.loads.iter_mut().find(|slot| slot.id == load.id) {
            *slot = load;
        }
    }

    /// Replace the whole set with an authoritative fetch.
    ///
    /// Employees keep only their own assignments. Rows with unsettled
    /// writes keep their optimistic value and take the fetched row as their
    /// new baseline; unsettled writes for rows the fetch no longer contains
    /// are dropped.
    pub fn load(&mut self, fetched: Vec<Load>) {
        let actor = self.actor;
        let mut next: Vec<Load> = fetched
            .into_iter()
            .filter(|load| actor.can_view(load))
            .collect();

        for load in &mut next {
            let Some(baseline) = self.baselines.get_mut(&load.id) else {
                continue;
            };
            let optimistic = self.loads.iter().find(|current| current.id == load.id);
            *baseline = match optimistic {
                Some(optimistic) => std::mem::replace(load, optimistic.clone()),
                None => load.clone(),
            };
        }

        let kept: Vec<LoadId> = next.iter().map(|load| load.id).collect();
        self.pending.retain(|write| kept.contains(&write.token.id));
        self.baselines.retain(|id, _| kept.contains(id));
        self.loads = next;
    }

    /// Insert a row at the front, or merge it when already present.
    pub fn prepend(&mut self, load: Load) -> bool {
        if self.position(&load.id).is_some() {
            return self.upsert(load);
        }
        self.loads.insert(0, load);
        true
    }

    /// Merge an authoritative row.
    ///
    /// Without unsettled writes the newer `updated_at` wins and older rows
    /// are ignored. With unsettled writes only the baseline moves. Unknown
    /// rows are prepended. Returns whether anything changed.
    pub fn upsert(&mut self, load: Load) -> bool {
        if let Some(baseline) = self.baselines.get_mut(&load.id) {
            if load.updated_at > baseline.updated_at {
                *baseline = load;
                return true;
            }
            return false;
        }
        let newer = self
            .get(&load.id)
            .map(|current| load.updated_at >= current.updated_at && *current != load);
        match newer {
            None => {
                self.loads.insert(0, load);
                true
            }
            Some(true) => {
                self.replace(load);
                true
            }
            Some(false) => false,
        }
    }

    /// Remove a row; removing an absent row is a no-op returning `false`.
    pub fn remove(&mut self, id: &LoadId) -> bool {
        let Some(index) = self.position(id) else {
            return false;
        };
        self.loads.remove(index);
        self.pending.retain(|write| write.token.id != *id);
        self.baselines.remove(id);
        true
    }

    /// Apply `patch` locally and return the token settling it.
    pub fn apply_optimistic(
        &mut self,
        id: &LoadId,
        patch: &LoadPatch,
        now: DateTime<Utc>,
    ) -> Result<RollbackToken, StoreError> {
        let before = self
            .get(id)
            .cloned()
            .ok_or(StoreError::UnknownLoad(*id))?;
        self.baselines
            .entry(*id)
            .or_insert_with(|| before.clone());

        let token = RollbackToken {
            seq: self.next_seq,
            id: *id,
        };
        self.next_seq += 1;
        self.replace(before.with_patch(patch, now));
        self.pending.push(PendingWrite { token, before });
        Ok(token)
    }

    fn take_pending(&mut self, token: RollbackToken) -> Result<PendingWrite, StoreError> {
        let index = self
            .pending
            .iter()
            .position(|write| write.token == token)
            .ok_or(StoreError::UnknownToken(token))?;
        Ok(self.pending.remove(index))
    }

    /// Settle a write the server accepted, adopting its echo.
    ///
    /// The echo becomes the baseline unless a newer authoritative row has
    /// already arrived. Once no writes remain for the row, the baseline is
    /// shown.
    pub fn confirm(&mut self, token: RollbackToken, echo: Load) -> Result<(), StoreError> {
        self.take_pending(token)?;
        let id = token.id;
        if let Some(baseline) = self.baselines.get_mut(&id) {
            if echo.updated_at >= baseline.updated_at {
                *baseline = echo;
            }
        }
        if self.has_pending(&id) {
            return Ok(());
        }
        if let Some(settled) = self.baselines.remove(&id) {
            self.replace(settled);
        }
        Ok(())
    }

    /// Undo a write the server refused.
    ///
    /// Later writes to the same row were built on this one and are dropped
    /// with it. Rolling back the earliest write restores the baseline, which
    /// is the pre-write row unless a newer server version arrived meanwhile.
    pub fn rollback(&mut self, token: RollbackToken) -> Result<(), StoreError> {
        let undone = self.take_pending(token)?;
        let id = token.id;
        self.pending
            .retain(|write| write.token.id != id || write.token.seq < token.seq);

        if self.has_pending(&id) {
            self.replace(undone.before);
        } else if let Some(baseline) = self.baselines.remove(&id) {
            self.replace(baseline);
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "store_tests.rs"]
mod tests;
