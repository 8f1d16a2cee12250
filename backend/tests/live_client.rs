//! The client session against a live server: HTTP backend plus WebSocket
//! feed, reconciled into the board store.

#[allow(dead_code, reason = "each suite uses a different slice of the harness")]
mod support;

use std::sync::Arc;
use std::time::Duration;

use mockable::{Clock, DefaultClock};
use rstest::rstest;

use loadboard::client::{
    AwcLoadFeed, BoardSession, ClientError, LoadBackend, Reconciled, ReqwestLoadBackend,
};
use loadboard::domain::{
    Actor, ClientName, ClientNumber, LoadDraft, LoadId, LoadPatch, LoadStatus, User,
};

use support::{LiveBoard, PASSWORD, spawn_live_board};

const SIGNAL_TIMEOUT: Duration = Duration::from_secs(5);

async fn backend_for(live: &LiveBoard, user: &User) -> ReqwestLoadBackend {
    let backend = ReqwestLoadBackend::new(live.api_base()).expect("client backend");
    let signed_in = backend
        .sign_in(user.email.as_ref(), PASSWORD)
        .await
        .expect("sign in");
    assert_eq!(signed_in.id, user.id);
    backend
}

async fn live_session(
    live: &LiveBoard,
    user: &User,
) -> (BoardSession<ReqwestLoadBackend>, Arc<ReqwestLoadBackend>) {
    let backend = Arc::new(backend_for(live, user).await);
    let cookie = backend.session_cookie().expect("session cookie in jar");
    let feed = AwcLoadFeed::new(live.ws_url()).with_cookie(cookie);
    let clock: Arc<dyn Clock> = Arc::new(DefaultClock);
    let mut session = BoardSession::new(Actor::new(user.id, user.role), backend.clone(), clock);
    session.start(&feed).await.expect("session start");
    (session, backend)
}

fn draft_for(client: &str, assignee: Option<&User>) -> LoadDraft {
    let mut draft = LoadDraft::new(
        ClientName::new(client).expect("client name"),
        ClientNumber::new("C-7").expect("client number"),
    );
    draft.assigned_to = assignee.map(|user| user.id);
    draft
}

/// Drain feed signals until `done` holds for the session.
async fn settle_until(
    session: &mut BoardSession<ReqwestLoadBackend>,
    done: impl Fn(&BoardSession<ReqwestLoadBackend>) -> bool,
) {
    tokio::time::timeout(SIGNAL_TIMEOUT, async {
        while !done(session) {
            match session.next_signal().await {
                Some(outcome) => {
                    outcome.expect("signal handled");
                }
                None => panic!("feed ended before the board settled"),
            }
        }
    })
    .await
    .expect("board settled in time");
}

#[rstest]
#[actix_rt::test]
async fn employee_board_follows_allocator_changes() {
    let live = spawn_live_board().await.expect("server");
    let (mut employee, _) = live_session(&live, &live.roster.employee).await;
    assert!(employee.store().is_empty());
    assert!(employee.is_live());

    let allocator = backend_for(&live, &live.roster.allocator).await;
    let created = allocator
        .insert(&draft_for("Acme", Some(&live.roster.employee)))
        .await
        .expect("insert");
    allocator
        .insert(&draft_for("Globex", Some(&live.roster.other_employee)))
        .await
        .expect("insert for someone else");

    settle_until(&mut employee, |s| s.store().get(&created.id).is_some()).await;
    assert_eq!(employee.store().len(), 1);

    allocator
        .update(&created.id, &LoadPatch::assign(Some(live.roster.other_employee.id)))
        .await
        .expect("reassign");
    settle_until(&mut employee, |s| s.store().is_empty()).await;

    employee.shutdown();
    live.server.stop(true).await;
}

#[rstest]
#[actix_rt::test]
async fn optimistic_move_is_confirmed_by_the_server() {
    let live = spawn_live_board().await.expect("server");
    let (mut employee, _) = live_session(&live, &live.roster.employee).await;
    let allocator = backend_for(&live, &live.roster.allocator).await;
    let created = allocator
        .insert(&draft_for("Acme", Some(&live.roster.employee)))
        .await
        .expect("insert");
    settle_until(&mut employee, |s| s.store().get(&created.id).is_some()).await;

    let stored = employee
        .move_load(&created.id, LoadStatus::InProgress)
        .await
        .expect("move");
    assert_eq!(stored.status, LoadStatus::InProgress);
    assert!(!employee.store().has_pending(&created.id));
    assert_eq!(
        employee.store().get(&created.id).map(|load| load.status),
        Some(LoadStatus::InProgress)
    );

    employee.shutdown();
    live.server.stop(true).await;
}

#[rstest]
#[actix_rt::test]
async fn refused_move_rolls_the_board_back() {
    let live = spawn_live_board().await.expect("server");
    let (mut employee, _) = live_session(&live, &live.roster.employee).await;
    let allocator = backend_for(&live, &live.roster.allocator).await;
    let created = allocator
        .insert(&draft_for("Acme", Some(&live.roster.employee)))
        .await
        .expect("insert");
    settle_until(&mut employee, |s| s.store().get(&created.id).is_some()).await;

    let err = employee
        .move_load(&created.id, LoadStatus::Completed)
        .await
        .expect_err("pending cannot jump to completed");
    assert!(matches!(err, ClientError::Validation { .. }), "{err:?}");
    assert_eq!(
        employee.store().get(&created.id).map(|load| load.status),
        Some(LoadStatus::Pending)
    );

    employee.shutdown();
    live.server.stop(true).await;
}

#[rstest]
#[actix_rt::test]
async fn employees_are_refused_deletes_and_unknown_loads() {
    let live = spawn_live_board().await.expect("server");
    let allocator = backend_for(&live, &live.roster.allocator).await;
    let created = allocator
        .insert(&draft_for("Acme", Some(&live.roster.employee)))
        .await
        .expect("insert");
    let employee = backend_for(&live, &live.roster.employee).await;

    let err = employee
        .delete(&created.id)
        .await
        .expect_err("employees cannot delete");
    assert!(matches!(err, ClientError::Authorization { .. }), "{err:?}");
    assert!(!err.requires_login());

    let err = employee
        .update(&LoadId::random(), &LoadPatch::status(LoadStatus::InProgress))
        .await
        .expect_err("unknown load");
    assert!(matches!(err, ClientError::NotFound { .. }), "{err:?}");

    live.server.stop(true).await;
}

#[rstest]
#[actix_rt::test]
async fn signing_out_ends_the_session() {
    let live = spawn_live_board().await.expect("server");
    let admin = backend_for(&live, &live.roster.admin).await;
    assert!(admin.fetch_all().await.expect("fetch").is_empty());

    admin.sign_out().await.expect("sign out");
    let err = admin.fetch_all().await.expect_err("session gone");
    assert!(err.requires_login(), "{err:?}");

    live.server.stop(true).await;
}

#[rstest]
#[actix_rt::test]
async fn first_connection_needs_no_refetch() {
    let live = spawn_live_board().await.expect("server");
    let backend = Arc::new(backend_for(&live, &live.roster.admin).await);
    let cookie = backend.session_cookie().expect("session cookie in jar");
    let feed = AwcLoadFeed::new(live.ws_url())
        .with_cookie(cookie)
        .with_retry_delay(Duration::from_millis(50));
    let clock: Arc<dyn Clock> = Arc::new(DefaultClock);
    let admin = &live.roster.admin;
    let mut session = BoardSession::new(Actor::new(admin.id, admin.role), backend, clock);
    session.start(&feed).await.expect("session start");

    let first = tokio::time::timeout(SIGNAL_TIMEOUT, session.next_signal())
        .await
        .expect("connected signal")
        .expect("feed open")
        .expect("handled");
    assert_eq!(first, Reconciled::Unchanged);

    session.shutdown();
    assert!(!session.is_live());
    live.server.stop(true).await;
}
