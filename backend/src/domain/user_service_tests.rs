//! Tests for user administration and login.

use std::sync::{Arc, Mutex};

use rstest::{fixture, rstest};

use super::*;
use crate::domain::ports::{
    MockLoadEventPublisher, MockLoadRepository, MockPasswordHasher, MockUserRepository,
    UserPersistenceError,
};
use crate::domain::{
    ClientName, ClientNumber, Email, ErrorCode, Load, LoadDraft, LoadId, Password, PasswordHash,
    Role, UserName,
};
use crate::test_support::{MutableClock, fixture_instant};

type Service = UserService<MockUserRepository, MockLoadRepository>;

struct Harness {
    users: MockUserRepository,
    loads: MockLoadRepository,
    hasher: MockPasswordHasher,
    published: Arc<Mutex<Vec<LoadChange>>>,
}

impl Harness {
    fn build(self) -> Service {
        let mut events = MockLoadEventPublisher::new();
        let sink = Arc::clone(&self.published);
        events
            .expect_publish()
            .returning(move |change| sink.lock().expect("lock").push(change));
        UserService::new(
            Arc::new(self.users),
            Arc::new(self.loads),
            Arc::new(self.hasher),
            Arc::new(events),
            Arc::new(MutableClock::new(fixture_instant())),
        )
    }
}

#[fixture]
fn harness() -> Harness {
    Harness {
        users: MockUserRepository::new(),
        loads: MockLoadRepository::new(),
        hasher: MockPasswordHasher::new(),
        published: Arc::new(Mutex::new(Vec::new())),
    }
}

fn person(name: &str, role: Role) -> User {
    User {
        id: UserId::random(),
        email: Email::new(format!("{}@example.com", name.to_lowercase())).expect("email"),
        name: UserName::new(name).expect("name"),
        role,
        created_at: fixture_instant(),
    }
}

fn draft(email: &str, role: Role) -> UserDraft {
    UserDraft {
        email: Email::new(email).expect("email"),
        name: UserName::new("New Hire").expect("name"),
        role,
        password: Password::new("s3cret").expect("password"),
    }
}

fn admin() -> Actor {
    Actor::new(UserId::random(), Role::Admin)
}

// Step functions for the login scenarios.

fn given_registered_user(harness: &mut Harness, user: &User, hash: &str) {
    let stored = (user.clone(), PasswordHash::from_phc(hash.to_owned()));
    harness
        .users
        .expect_find_credentials()
        .returning(move |_| Ok(Some(stored.clone())));
}

fn given_password_check(harness: &mut Harness, outcome: bool) {
    harness
        .hasher
        .expect_verify()
        .returning(move |_, _| Ok(outcome));
}

async fn when_signing_in(service: &Service, email: &str, password: &str) -> Result<User, Error> {
    let credentials = LoginCredentials::try_from_parts(email, password).expect("credentials");
    service.authenticate(&credentials).await
}

fn then_sign_in_is_refused(result: Result<User, Error>) {
    let err = result.expect_err("refused");
    assert_eq!(err.code(), ErrorCode::Unauthorized);
    assert_eq!(err.message(), INVALID_CREDENTIALS);
}

#[rstest]
#[tokio::test]
async fn correct_password_signs_in(mut harness: Harness) {
    let ada = person("Ada", Role::Supervisor);
    given_registered_user(&mut harness, &ada, "$argon2id$fixture");
    given_password_check(&mut harness, true);
    let service = harness.build();

    let user = when_signing_in(&service, "ada@example.com", "pw").await.expect("login");

    assert_eq!(user, ada);
}

#[rstest]
#[tokio::test]
async fn wrong_password_and_unknown_email_fail_alike(mut harness: Harness) {
    let ada = person("Ada", Role::Supervisor);
    given_registered_user(&mut harness, &ada, "$argon2id$fixture");
    given_password_check(&mut harness, false);
    let service = harness.build();
    then_sign_in_is_refused(when_signing_in(&service, "ada@example.com", "nope").await);

    let mut unknown = self::harness();
    unknown
        .users
        .expect_find_credentials()
        .returning(|_| Ok(None));
    let service = unknown.build();
    then_sign_in_is_refused(when_signing_in(&service, "ghost@example.com", "pw").await);
}

#[rstest]
#[tokio::test]
async fn admin_creates_a_user_with_a_hashed_password(mut harness: Harness) {
    harness
        .hasher
        .expect_hash()
        .times(1)
        .returning(|_| Ok(PasswordHash::from_phc("$argon2id$hashed".to_owned())));
    harness
        .users
        .expect_insert()
        .withf(|_, hash| hash.as_str() == "$argon2id$hashed")
        .times(1)
        .returning(|_, _| Ok(()));
    let service = harness.build();

    let user = service
        .create(&admin(), draft("hire@example.com", Role::Employee))
        .await
        .expect("create");

    assert_eq!(user.role, Role::Employee);
    assert_eq!(user.created_at, fixture_instant());
}

#[rstest]
#[tokio::test]
async fn duplicate_email_is_a_conflict(mut harness: Harness) {
    harness
        .hasher
        .expect_hash()
        .returning(|_| Ok(PasswordHash::from_phc("$argon2id$hashed".to_owned())));
    harness
        .users
        .expect_insert()
        .returning(|user, _| Err(UserPersistenceError::duplicate_email(user.email.to_string())));
    let service = harness.build();

    let err = service
        .create(&admin(), draft("taken@example.com", Role::Allocator))
        .await
        .expect_err("duplicate");

    assert_eq!(err.code(), ErrorCode::Conflict);
}

#[rstest]
#[case(Role::Allocator)]
#[case(Role::Employee)]
#[tokio::test]
async fn only_admins_and_supervisors_manage_users(harness: Harness, #[case] role: Role) {
    let service = harness.build();
    let actor = Actor::new(UserId::random(), role);

    let err = service
        .create(&actor, draft("hire@example.com", Role::Employee))
        .await
        .expect_err("forbidden");

    assert_eq!(err.code(), ErrorCode::Forbidden);
}

#[rstest]
#[tokio::test]
async fn allocators_can_list_users_to_assign_loads(mut harness: Harness) {
    let team = vec![person("Ann", Role::Employee), person("Bo", Role::Allocator)];
    let listed = team.clone();
    harness
        .users
        .expect_list()
        .returning(move || Ok(listed.clone()));
    let service = harness.build();
    let allocator = Actor::new(UserId::random(), Role::Allocator);

    assert_eq!(service.list(&allocator).await.expect("list"), team);
}

#[rstest]
#[tokio::test]
async fn deleting_a_load_creator_is_blocked(mut harness: Harness) {
    let creator = person("Cat", Role::Allocator);
    let found = creator.clone();
    harness
        .users
        .expect_find_by_id()
        .returning(move |_| Ok(Some(found.clone())));
    harness.loads.expect_count_created_by().returning(|_| Ok(3));
    harness.users.expect_delete().never();
    let service = harness.build();

    let err = service
        .delete(&admin(), &creator.id)
        .await
        .expect_err("blocked");

    assert_eq!(err.code(), ErrorCode::Conflict);
}

#[rstest]
#[tokio::test]
async fn deleting_an_assignee_unassigns_their_loads(mut harness: Harness) {
    let worker = person("Dan", Role::Employee);
    let found = worker.clone();
    let mut draft = LoadDraft::new(
        ClientName::new("Acme").expect("name"),
        ClientNumber::new("9").expect("number"),
    );
    draft.assigned_to = Some(worker.id);
    let load = Load::create(
        LoadId::random(),
        draft,
        UserId::random(),
        fixture_instant() - chrono::Duration::days(1),
    );
    let assigned = vec![load.clone()];

    harness
        .users
        .expect_find_by_id()
        .returning(move |_| Ok(Some(found.clone())));
    harness.loads.expect_count_created_by().returning(|_| Ok(0));
    harness
        .loads
        .expect_list_assigned_to()
        .returning(move |_| Ok(assigned.clone()));
    harness
        .loads
        .expect_update()
        .withf(|load| load.assigned_to.is_none())
        .times(1)
        .returning(|_| Ok(()));
    harness.users.expect_delete().times(1).returning(|_| Ok(true));
    let published = Arc::clone(&harness.published);
    let service = harness.build();

    service.delete(&admin(), &worker.id).await.expect("delete");

    let changes = published.lock().expect("lock");
    let change = changes.first().expect("unassign event");
    assert_eq!(change.record.assigned_to, None);
    assert_eq!(change.previous_assignee, Some(worker.id));
    assert_eq!(change.record.updated_at, fixture_instant());
}

#[rstest]
#[tokio::test]
async fn session_for_a_removed_user_is_unauthorized(mut harness: Harness) {
    harness.users.expect_find_by_id().returning(|_| Ok(None));
    let service = harness.build();

    let err = service.me(&UserId::random()).await.expect_err("gone");

    assert_eq!(err.code(), ErrorCode::Unauthorized);
}
