//! Tests for the load service.

use std::sync::{Arc, Mutex};

use rstest::{fixture, rstest};

use super::*;
use crate::domain::ports::{
    LoadPersistenceError, MockLoadEventPublisher, MockLoadRepository, MockUserRepository,
};
use crate::domain::{
    ChangeKind, ClientName, ClientNumber, Email, EmployeeCount, ErrorCode, Role, User, UserName,
};
use crate::test_support::{MutableClock, fixture_instant};

type Service = LoadService<MockLoadRepository, MockUserRepository>;

struct Published(Arc<Mutex<Vec<LoadChange>>>);

impl Published {
    fn kinds(&self) -> Vec<ChangeKind> {
        self.0
            .lock()
            .expect("published lock")
            .iter()
            .map(|change| change.kind)
            .collect()
    }
}

fn recording_publisher() -> (MockLoadEventPublisher, Published) {
    let sink = Arc::new(Mutex::new(Vec::new()));
    let mut publisher = MockLoadEventPublisher::new();
    let writer = Arc::clone(&sink);
    publisher.expect_publish().returning(move |change| {
        writer.lock().expect("published lock").push(change);
    });
    (publisher, Published(sink))
}

fn service(loads: MockLoadRepository, users: MockUserRepository) -> (Service, Published) {
    let (publisher, published) = recording_publisher();
    let service = LoadService::new(
        Arc::new(loads),
        Arc::new(users),
        Arc::new(publisher),
        Arc::new(MutableClock::new(fixture_instant())),
    );
    (service, published)
}

fn user(role: Role) -> User {
    User {
        id: UserId::random(),
        email: Email::new(format!("{}@example.com", role.as_str())).expect("email"),
        name: UserName::new(role.as_str()).expect("name"),
        role,
        created_at: fixture_instant(),
    }
}

fn stored_load(status: LoadStatus, assignee: Option<UserId>) -> Load {
    let mut draft = LoadDraft::new(
        ClientName::new("Globex").expect("name"),
        ClientNumber::new("77").expect("number"),
    );
    draft.status = status;
    draft.assigned_to = assignee;
    Load::create(
        LoadId::random(),
        draft,
        UserId::random(),
        fixture_instant() - chrono::Duration::hours(2),
    )
}

fn repo_with(load: &Load) -> MockLoadRepository {
    let mut loads = MockLoadRepository::new();
    let found = load.clone();
    loads
        .expect_find()
        .returning(move |_| Ok(Some(found.clone())));
    loads
}

#[fixture]
fn allocator() -> Actor {
    Actor::new(UserId::random(), Role::Allocator)
}

#[fixture]
fn employee() -> Actor {
    Actor::new(UserId::random(), Role::Employee)
}

#[rstest]
#[tokio::test]
async fn allocator_creates_acme_as_pending_and_unassigned(allocator: Actor) {
    let mut loads = MockLoadRepository::new();
    loads.expect_insert().times(1).returning(|_| Ok(()));
    let (service, published) = service(loads, MockUserRepository::new());

    let mut draft = LoadDraft::new(
        ClientName::new("Acme").expect("name"),
        ClientNumber::new("123").expect("number"),
    );
    draft.employee_count = EmployeeCount::new(2).expect("count");

    let load = service.create(&allocator, draft).await.expect("create");

    assert_eq!(load.status, LoadStatus::Pending);
    assert_eq!(load.assigned_to, None);
    assert_eq!(load.employee_count.get(), 2);
    assert_eq!(load.created_by, allocator.id);
    assert_eq!(load.created_at, fixture_instant());
    assert_eq!(published.kinds(), [ChangeKind::Insert]);
}

#[rstest]
#[tokio::test]
async fn employees_cannot_create_loads(employee: Actor) {
    let (service, published) = service(MockLoadRepository::new(), MockUserRepository::new());
    let draft = LoadDraft::new(
        ClientName::new("Acme").expect("name"),
        ClientNumber::new("123").expect("number"),
    );

    let err = service.create(&employee, draft).await.expect_err("forbidden");

    assert_eq!(err.code(), ErrorCode::Forbidden);
    assert!(published.kinds().is_empty());
}

#[rstest]
#[tokio::test]
async fn unknown_assignee_is_a_validation_error(allocator: Actor) {
    let mut users = MockUserRepository::new();
    users.expect_find_by_id().returning(|_| Ok(None));
    let (service, _) = service(MockLoadRepository::new(), users);
    let mut draft = LoadDraft::new(
        ClientName::new("Acme").expect("name"),
        ClientNumber::new("123").expect("number"),
    );
    draft.assigned_to = Some(UserId::random());

    let err = service.create(&allocator, draft).await.expect_err("invalid");

    assert_eq!(err.code(), ErrorCode::InvalidRequest);
    assert_eq!(err.details().expect("details")["field"], "assigned_to");
}

#[rstest]
#[tokio::test]
async fn missing_load_is_not_found_even_for_employees(employee: Actor) {
    let mut loads = MockLoadRepository::new();
    loads.expect_find().returning(|_| Ok(None));
    let (service, _) = service(loads, MockUserRepository::new());

    let err = service
        .update(&employee, &LoadId::random(), LoadPatch::status(LoadStatus::InProgress))
        .await
        .expect_err("missing");

    assert_eq!(err.code(), ErrorCode::NotFound);
}

#[rstest]
#[tokio::test]
async fn employee_moves_their_own_load(employee: Actor) {
    let load = stored_load(LoadStatus::Pending, Some(employee.id));
    let mut loads = repo_with(&load);
    loads.expect_update().times(1).returning(|_| Ok(()));
    let (service, published) = service(loads, MockUserRepository::new());

    let updated = service
        .update(&employee, &load.id, LoadPatch::status(LoadStatus::InProgress))
        .await
        .expect("update");

    assert_eq!(updated.status, LoadStatus::InProgress);
    assert_eq!(updated.updated_at, fixture_instant());
    assert_eq!(published.kinds(), [ChangeKind::Update]);
}

#[rstest]
#[tokio::test]
async fn employee_cannot_touch_someone_elses_load(employee: Actor) {
    let load = stored_load(LoadStatus::Pending, Some(UserId::random()));
    let (service, _) = service(repo_with(&load), MockUserRepository::new());

    let err = service
        .update(&employee, &load.id, LoadPatch::status(LoadStatus::InProgress))
        .await
        .expect_err("forbidden");

    assert_eq!(err.code(), ErrorCode::Forbidden);
}

#[rstest]
#[tokio::test]
async fn employee_cannot_reassign_even_their_own_load(employee: Actor) {
    let load = stored_load(LoadStatus::Pending, Some(employee.id));
    let (service, _) = service(repo_with(&load), MockUserRepository::new());

    let err = service
        .update(&employee, &load.id, LoadPatch::assign(None))
        .await
        .expect_err("forbidden");

    assert_eq!(err.code(), ErrorCode::Forbidden);
}

#[rstest]
#[case(LoadStatus::InProgress)]
#[case(LoadStatus::Completed)]
#[tokio::test]
async fn strict_policy_creates_loads_only_as_pending(allocator: Actor, #[case] status: LoadStatus) {
    let (service, published) = service(MockLoadRepository::new(), MockUserRepository::new());
    let mut draft = LoadDraft::new(
        ClientName::new("Acme").expect("name"),
        ClientNumber::new("123").expect("number"),
    );
    draft.status = status;

    let err = service.create(&allocator, draft).await.expect_err("illegal");

    assert_eq!(err.code(), ErrorCode::InvalidRequest);
    assert!(published.kinds().is_empty());
}

#[rstest]
#[tokio::test]
async fn permissive_policy_creates_loads_in_any_status(allocator: Actor) {
    let mut loads = MockLoadRepository::new();
    loads.expect_insert().times(1).returning(|_| Ok(()));
    let (service, _) = service(loads, MockUserRepository::new());
    let service = service.with_policy(TransitionPolicy::Permissive);
    let mut draft = LoadDraft::new(
        ClientName::new("Acme").expect("name"),
        ClientNumber::new("123").expect("number"),
    );
    draft.status = LoadStatus::Completed;

    let load = service.create(&allocator, draft).await.expect("create");

    assert_eq!(load.status, LoadStatus::Completed);
}

#[rstest]
#[case(LoadStatus::Completed, LoadStatus::Pending)]
#[case(LoadStatus::Pending, LoadStatus::Completed)]
#[case(LoadStatus::Transferred, LoadStatus::InProgress)]
#[tokio::test]
async fn strict_policy_rejects_illegal_transitions(
    allocator: Actor,
    #[case] from: LoadStatus,
    #[case] to: LoadStatus,
) {
    let load = stored_load(from, None);
    let (service, published) = service(repo_with(&load), MockUserRepository::new());

    let err = service
        .update(&allocator, &load.id, LoadPatch::status(to))
        .await
        .expect_err("illegal");

    assert_eq!(err.code(), ErrorCode::InvalidRequest);
    assert!(published.kinds().is_empty());
}

#[rstest]
#[tokio::test]
async fn permissive_policy_accepts_any_status(allocator: Actor) {
    let load = stored_load(LoadStatus::Completed, None);
    let mut loads = repo_with(&load);
    loads.expect_update().returning(|_| Ok(()));
    let (service, _) = service(loads, MockUserRepository::new());
    let service = service.with_policy(TransitionPolicy::Permissive);

    let updated = service
        .update(&allocator, &load.id, LoadPatch::status(LoadStatus::Pending))
        .await
        .expect("update");

    assert_eq!(updated.status, LoadStatus::Pending);
}

#[rstest]
#[tokio::test]
async fn empty_patch_returns_the_load_untouched(allocator: Actor) {
    let load = stored_load(LoadStatus::Paused, None);
    let (service, published) = service(repo_with(&load), MockUserRepository::new());

    let same = service
        .update(&allocator, &load.id, LoadPatch::default())
        .await
        .expect("noop");

    assert_eq!(same, load);
    assert!(published.kinds().is_empty());
}

#[rstest]
#[tokio::test]
async fn delete_publishes_the_removed_record(allocator: Actor) {
    let load = stored_load(LoadStatus::Pending, Some(UserId::random()));
    let mut loads = repo_with(&load);
    loads.expect_delete().times(1).returning(|_| Ok(true));
    let (service, published) = service(loads, MockUserRepository::new());

    service.delete(&allocator, &load.id).await.expect("delete");

    assert_eq!(published.kinds(), [ChangeKind::Delete]);
}

#[rstest]
#[tokio::test]
async fn employees_only_list_their_assignments(employee: Actor) {
    let mine = stored_load(LoadStatus::Pending, Some(employee.id));
    let mut loads = MockLoadRepository::new();
    let returned = vec![mine.clone()];
    loads
        .expect_list_assigned_to()
        .times(1)
        .returning(move |_| Ok(returned.clone()));
    loads.expect_list_all().never();
    let (service, _) = service(loads, MockUserRepository::new());

    let listed = service.list(&employee).await.expect("list");

    assert_eq!(listed, [mine]);
}

#[rstest]
#[tokio::test]
async fn page_filters_unassigned_loads(allocator: Actor) {
    let assigned = stored_load(LoadStatus::Pending, Some(UserId::random()));
    let loose: Vec<Load> = (0..12).map(|_| stored_load(LoadStatus::Pending, None)).collect();
    let mut all = loose.clone();
    all.push(assigned);
    let mut loads = MockLoadRepository::new();
    loads.expect_list_all().returning(move || Ok(all.clone()));
    let (service, _) = service(loads, MockUserRepository::new());

    let page = service
        .page(&allocator, AssigneeFilter::Unassigned, 2)
        .await
        .expect("page");

    assert_eq!(page.total, 12);
    assert_eq!(page.page_count, 2);
    assert_eq!(page.page, 2);
    assert_eq!(page.loads.len(), 2);
}

#[rstest]
#[tokio::test]
async fn repository_outage_is_service_unavailable(allocator: Actor) {
    let mut loads = MockLoadRepository::new();
    loads
        .expect_list_all()
        .returning(|| Err(LoadPersistenceError::connection("refused")));
    let (service, _) = service(loads, MockUserRepository::new());

    let err = service.list(&allocator).await.expect_err("outage");

    assert_eq!(err.code(), ErrorCode::ServiceUnavailable);
}

#[rstest]
#[tokio::test]
async fn reassignment_to_existing_user_is_recorded(allocator: Actor) {
    let target = user(Role::Employee);
    let load = stored_load(LoadStatus::InProgress, Some(UserId::random()));
    let mut loads = repo_with(&load);
    loads.expect_update().returning(|_| Ok(()));
    let mut users = MockUserRepository::new();
    let found = target.clone();
    users
        .expect_find_by_id()
        .returning(move |_| Ok(Some(found.clone())));
    let (service, published) = service(loads, users);

    let updated = service
        .update(&allocator, &load.id, LoadPatch::assign(Some(target.id)))
        .await
        .expect("reassign");

    assert_eq!(updated.assigned_to, Some(target.id));
    let changes = published.0.lock().expect("lock");
    let change = changes.first().expect("change");
    assert_eq!(change.previous_assignee, load.assigned_to);
}
