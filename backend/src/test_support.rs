//! Test utilities for the backend crate.
//!
//! Shared by unit tests (in `src/`) and integration tests (in `tests/`).
//! Compiled for tests and behind the `test-support` feature.

use std::sync::{Arc, Mutex};

use argon2::Params;
use chrono::{DateTime, Local, TimeDelta, TimeZone, Utc};
use mockable::Clock;

use crate::domain::ports::{LoadRepository, PasswordHasher, UserRepository};
use crate::domain::{
    CommentService, Load, LoadService, Password, ReportService, User, UserService,
};
use crate::inbound::http::state::HttpStatePorts;
use crate::outbound::events::BroadcastLoadEvents;
use crate::outbound::memory::{
    InMemoryCommentRepository, InMemoryLoadRepository, InMemoryUserRepository,
};
use crate::outbound::password::Argon2PasswordHasher;

/// Clock whose reading only moves when a test moves it.
pub struct MutableClock(Mutex<DateTime<Utc>>);

impl MutableClock {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self(Mutex::new(now))
    }

    pub fn advance_seconds(&self, seconds: i64) {
        *self.lock_clock() += TimeDelta::seconds(seconds);
    }

    pub fn set(&self, now: DateTime<Utc>) {
        *self.lock_clock() = now;
    }

    fn lock_clock(&self) -> std::sync::MutexGuard<'_, DateTime<Utc>> {
        match self.0.lock() {
            Ok(guard) => guard,
            Err(_) => panic!("clock mutex"),
        }
    }
}

impl Clock for MutableClock {
    fn local(&self) -> DateTime<Local> {
        self.utc().with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        *self.lock_clock()
    }
}

/// Fixed instant used across fixtures: 2026-05-20 12:00:00 UTC.
pub fn fixture_instant() -> DateTime<Utc> {
    match Utc.with_ymd_and_hms(2026, 5, 20, 12, 0, 0).single() {
        Some(instant) => instant,
        None => panic!("fixture timestamp"),
    }
}

/// Fully wired in-memory backend: the HTTP ports plus handles on the
/// repositories and event hub behind them.
pub struct InMemoryBoard {
    pub ports: HttpStatePorts,
    pub loads: Arc<InMemoryLoadRepository>,
    pub users: Arc<InMemoryUserRepository>,
    pub events: Arc<BroadcastLoadEvents>,
    pub clock: Arc<MutableClock>,
    pub hasher: Arc<Argon2PasswordHasher>,
}

impl InMemoryBoard {
    /// Store `user` with `password`, bypassing the access policy.
    pub async fn seed_user(&self, user: &User, password: &str) {
        let password = match Password::new(password) {
            Ok(password) => password,
            Err(err) => panic!("seed password: {err}"),
        };
        let hash = match self.hasher.hash(&password) {
            Ok(hash) => hash,
            Err(err) => panic!("seed hash: {err}"),
        };
        if let Err(err) = self.users.insert(user, &hash).await {
            panic!("seed user: {err}");
        }
    }

    /// Store `load`, bypassing the access policy.
    pub async fn seed_load(&self, load: &Load) {
        if let Err(err) = self.loads.insert(load).await {
            panic!("seed load: {err}");
        }
    }
}

/// Argon2 with minimal cost so tests stay fast.
pub fn cheap_hasher() -> Argon2PasswordHasher {
    match Params::new(Params::MIN_M_COST, Params::MIN_T_COST, Params::MIN_P_COST, None) {
        Ok(params) => Argon2PasswordHasher::with_params(params),
        Err(err) => panic!("argon2 params: {err}"),
    }
}

/// Wire every service over in-memory adapters with a clock fixed at
/// [`fixture_instant`].
pub fn in_memory_ports() -> InMemoryBoard {
    let loads = Arc::new(InMemoryLoadRepository::new());
    let users = Arc::new(InMemoryUserRepository::new());
    let comments = Arc::new(InMemoryCommentRepository::new());
    let events = Arc::new(BroadcastLoadEvents::default());
    let clock = Arc::new(MutableClock::new(fixture_instant()));
    let hasher = Arc::new(cheap_hasher());

    let load_service = Arc::new(LoadService::new(
        Arc::clone(&loads),
        Arc::clone(&users),
        events.clone(),
        clock.clone(),
    ));
    let user_service = Arc::new(UserService::new(
        Arc::clone(&users),
        Arc::clone(&loads),
        hasher.clone(),
        events.clone(),
        clock.clone(),
    ));
    let ports = HttpStatePorts {
        login: user_service.clone(),
        users: user_service,
        loads: load_service.clone(),
        loads_query: load_service,
        comments: Arc::new(CommentService::new(
            comments,
            Arc::clone(&loads),
            clock.clone(),
        )),
        reports: Arc::new(ReportService::new(
            Arc::clone(&loads),
            Arc::clone(&users),
            clock.clone(),
        )),
    };

    InMemoryBoard {
        ports,
        loads,
        users,
        events,
        clock,
        hasher,
    }
}
