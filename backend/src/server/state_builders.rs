//! Builders wiring repositories, services and the event hub into the
//! adapter state.

use std::sync::Arc;

use mockable::{Clock, DefaultClock};

use loadboard::domain::ports::{
    CommentRepository, LoadEventPublisher, LoadRepository, PasswordHasher, UserRepository,
};
use loadboard::domain::{
    CommentService, LoadService, ReportService, TransitionPolicy, UserService,
};
use loadboard::inbound::http::state::HttpStatePorts;
use loadboard::outbound::events::BroadcastLoadEvents;
use loadboard::outbound::memory::{
    InMemoryCommentRepository, InMemoryLoadRepository, InMemoryUserRepository,
};
use loadboard::outbound::password::Argon2PasswordHasher;
use loadboard::outbound::persistence::{
    DieselCommentRepository, DieselLoadRepository, DieselUserRepository,
};

use super::ServerConfig;

/// Everything the server and start-up seeding need from the wiring.
#[derive(Clone)]
pub(crate) struct BackendPorts {
    pub(crate) http: HttpStatePorts,
    pub(crate) events: Arc<BroadcastLoadEvents>,
    pub(crate) users: Arc<dyn UserRepository>,
    pub(crate) hasher: Arc<dyn PasswordHasher>,
    pub(crate) clock: Arc<dyn Clock>,
}

struct Shared {
    events: Arc<BroadcastLoadEvents>,
    hasher: Arc<dyn PasswordHasher>,
    clock: Arc<dyn Clock>,
    transitions: TransitionPolicy,
}

/// Wire the services over Diesel when a pool is configured, otherwise over
/// the in-memory stores.
pub(crate) fn build_ports(config: &ServerConfig) -> BackendPorts {
    let shared = Shared {
        events: Arc::new(BroadcastLoadEvents::default()),
        hasher: Arc::new(Argon2PasswordHasher::new()),
        clock: Arc::new(DefaultClock),
        transitions: config.transitions,
    };
    match &config.db_pool {
        Some(pool) => wire(
            Arc::new(DieselLoadRepository::new(pool.clone())),
            Arc::new(DieselUserRepository::new(pool.clone())),
            Arc::new(DieselCommentRepository::new(pool.clone())),
            shared,
        ),
        None => wire(
            Arc::new(InMemoryLoadRepository::new()),
            Arc::new(InMemoryUserRepository::new()),
            Arc::new(InMemoryCommentRepository::new()),
            shared,
        ),
    }
}

fn wire<L, U, C>(loads: Arc<L>, users: Arc<U>, comments: Arc<C>, shared: Shared) -> BackendPorts
where
    L: LoadRepository + 'static,
    U: UserRepository + 'static,
    C: CommentRepository + 'static,
{
    let Shared {
        events,
        hasher,
        clock,
        transitions,
    } = shared;
    let publisher: Arc<dyn LoadEventPublisher> = events.clone();

    let load_service = Arc::new(
        LoadService::new(
            Arc::clone(&loads),
            Arc::clone(&users),
            Arc::clone(&publisher),
            Arc::clone(&clock),
        )
        .with_policy(transitions),
    );
    let user_service = Arc::new(UserService::new(
        Arc::clone(&users),
        Arc::clone(&loads),
        Arc::clone(&hasher),
        publisher,
        Arc::clone(&clock),
    ));
    let http = HttpStatePorts {
        login: user_service.clone(),
        users: user_service,
        loads: load_service.clone(),
        loads_query: load_service,
        comments: Arc::new(CommentService::new(
            comments,
            Arc::clone(&loads),
            Arc::clone(&clock),
        )),
        reports: Arc::new(ReportService::new(loads, Arc::clone(&users), Arc::clone(&clock))),
    };

    BackendPorts {
        http,
        events,
        users,
        hasher,
        clock,
    }
}
