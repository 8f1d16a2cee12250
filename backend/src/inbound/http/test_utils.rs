//! Test helpers for inbound HTTP components.

use actix_http::Request;
use actix_session::{SessionMiddleware, storage::CookieSessionStore};
use actix_web::cookie::{Cookie, Key};
use actix_web::dev::{Service, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, test, web};
use serde_json::json;

use crate::domain::{Email, Role, User, UserId, UserName};
use crate::inbound::http::configure_api;
use crate::inbound::http::state::HttpState;
use crate::test_support::{InMemoryBoard, fixture_instant, in_memory_ports};

pub const SESSION_COOKIE: &str = "session";
pub const PASSWORD: &str = "correct-horse";

/// Session middleware with a fresh key and a non-secure cookie for plain
/// HTTP test requests.
pub fn test_session_middleware() -> SessionMiddleware<CookieSessionStore> {
    SessionMiddleware::builder(CookieSessionStore::default(), Key::generate())
        .cookie_name(SESSION_COOKIE.to_owned())
        .cookie_secure(false)
        .build()
}

/// Session cookie set by `response`, detached for reuse in a new request.
pub fn session_cookie<B>(response: &ServiceResponse<B>) -> Cookie<'static> {
    response
        .response()
        .cookies()
        .find(|cookie| cookie.name() == SESSION_COOKIE)
        .map(Cookie::into_owned)
        .expect("session cookie set")
}

/// One user per role, plus a second employee.
pub struct Roster {
    pub admin: User,
    pub supervisor: User,
    pub allocator: User,
    pub employee: User,
    pub other_employee: User,
}

fn user(name: &str, role: Role) -> User {
    User {
        id: UserId::random(),
        email: Email::new(format!("{}@example.com", name.to_lowercase())).expect("email"),
        name: UserName::new(name).expect("name"),
        role,
        created_at: fixture_instant(),
    }
}

/// In-memory board seeded with a [`Roster`], all sharing [`PASSWORD`].
pub async fn seeded_board() -> (InMemoryBoard, Roster) {
    let board = in_memory_ports();
    let roster = Roster {
        admin: user("Ada", Role::Admin),
        supervisor: user("Sam", Role::Supervisor),
        allocator: user("Alex", Role::Allocator),
        employee: user("Eve", Role::Employee),
        other_employee: user("Oscar", Role::Employee),
    };
    for member in [
        &roster.admin,
        &roster.supervisor,
        &roster.allocator,
        &roster.employee,
        &roster.other_employee,
    ] {
        board.seed_user(member, PASSWORD).await;
    }
    (board, roster)
}

/// The full `/api/v1` surface over `board`'s ports.
pub fn api_app(
    board: &InMemoryBoard,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    > + use<>,
> {
    App::new()
        .app_data(web::Data::new(HttpState::new(board.ports.clone())))
        .service(
            web::scope("/api/v1")
                .wrap(test_session_middleware())
                .configure(configure_api),
        )
}

/// Sign `user` in and return the session cookie.
pub async fn sign_in<S, B>(app: &S, user: &User) -> Cookie<'static>
where
    S: Service<Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
{
    let res = test::call_service(
        app,
        test::TestRequest::post()
            .uri("/api/v1/auth/login")
            .set_json(json!({ "email": user.email, "password": PASSWORD }))
            .to_request(),
    )
    .await;
    assert!(res.status().is_success(), "login failed: {}", res.status());
    session_cookie(&res)
}
