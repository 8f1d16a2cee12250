//! Tests for the authentication handlers.

use actix_web::http::StatusCode;
use actix_web::{App, test as actix_test};
use rstest::{fixture, rstest};
use rstest_bdd_macros::{given, then, when};
use serde_json::Value;

use super::*;
use crate::domain::{Email, Role, UserId, UserName};
use crate::inbound::http::test_utils::{session_cookie, test_session_middleware};
use crate::test_support::{InMemoryBoard, fixture_instant, in_memory_ports};

const PASSWORD: &str = "s3cret-pass";

fn ann() -> User {
    User {
        id: UserId::random(),
        email: Email::new("ann@example.com").expect("email"),
        name: UserName::new("Ann").expect("name"),
        role: Role::Allocator,
        created_at: fixture_instant(),
    }
}

#[fixture]
async fn board() -> (InMemoryBoard, User) {
    let board = in_memory_ports();
    let user = ann();
    board.seed_user(&user, PASSWORD).await;
    (board, user)
}

fn test_app(
    board: &InMemoryBoard,
) -> App<
    impl actix_web::dev::ServiceFactory<
        actix_web::dev::ServiceRequest,
        Config = (),
        Response = actix_web::dev::ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    > + use<>,
> {
    App::new()
        .app_data(web::Data::new(HttpState::new(board.ports.clone())))
        .wrap(test_session_middleware())
        .service(
            web::scope("/api/v1")
                .service(login)
                .service(logout)
                .service(session_user),
        )
}

#[given("a login payload with a malformed email")]
fn a_login_payload_with_a_malformed_email() -> LoginRequest {
    LoginRequest {
        email: "not-an-email".to_owned(),
        password: PASSWORD.to_owned(),
    }
}

#[given("a login payload with an empty password")]
fn a_login_payload_with_an_empty_password() -> LoginRequest {
    LoginRequest {
        email: "ann@example.com".to_owned(),
        password: String::new(),
    }
}

#[when("the login payload is validated")]
fn the_login_payload_is_validated(request: LoginRequest) -> Value {
    let err = LoginCredentials::try_from(request)
        .map_err(map_login_validation_error)
        .expect_err("payload should be rejected");
    serde_json::to_value(&err).expect("serialise error")
}

#[then("the error names the email field")]
fn the_error_names_the_email_field(body: Value) {
    assert_eq!(body["code"], "invalid_request");
    assert_eq!(body["details"]["field"], "email");
    assert_eq!(body["details"]["code"], "invalid_email");
}

#[then("the error names the password field")]
fn the_error_names_the_password_field(body: Value) {
    assert_eq!(body["details"]["field"], "password");
    assert_eq!(body["details"]["code"], "empty_password");
}

#[rstest]
fn malformed_email_is_reported_on_the_email_field() {
    let request = a_login_payload_with_a_malformed_email();
    let body = the_login_payload_is_validated(request);
    the_error_names_the_email_field(body);
}

#[rstest]
fn empty_password_is_reported_on_the_password_field() {
    let request = a_login_payload_with_an_empty_password();
    let body = the_login_payload_is_validated(request);
    the_error_names_the_password_field(body);
}

#[rstest]
#[actix_web::test]
async fn login_returns_the_user_and_starts_a_session(
    #[future] board: (InMemoryBoard, User),
) {
    let (board, user) = board.await;
    let app = actix_test::init_service(test_app(&board)).await;

    let res = actix_test::call_service(
        &app,
        actix_test::TestRequest::post()
            .uri("/api/v1/auth/login")
            .set_json(&LoginRequest {
                email: "  ANN@example.com ".to_owned(),
                password: PASSWORD.to_owned(),
            })
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::OK);
    let cookie = session_cookie(&res);
    let body: User = actix_test::read_body_json(res).await;
    assert_eq!(body, user);

    let me = actix_test::call_service(
        &app,
        actix_test::TestRequest::get()
            .uri("/api/v1/auth/me")
            .cookie(cookie)
            .to_request(),
    )
    .await;
    assert_eq!(me.status(), StatusCode::OK);
    let me: User = actix_test::read_body_json(me).await;
    assert_eq!(me.id, user.id);
}

#[rstest]
#[case("ann@example.com", "wrong-password")]
#[case("nobody@example.com", PASSWORD)]
#[actix_web::test]
async fn bad_credentials_are_indistinguishable(
    #[future] board: (InMemoryBoard, User),
    #[case] email: &str,
    #[case] password: &str,
) {
    let (board, _) = board.await;
    let app = actix_test::init_service(test_app(&board)).await;

    let res = actix_test::call_service(
        &app,
        actix_test::TestRequest::post()
            .uri("/api/v1/auth/login")
            .set_json(&LoginRequest {
                email: email.to_owned(),
                password: password.to_owned(),
            })
            .to_request(),
    )
    .await;

    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    let body: Value = actix_test::read_body_json(res).await;
    assert_eq!(body["message"], "invalid email or password");
}

#[rstest]
#[actix_web::test]
async fn logout_ends_the_session(#[future] board: (InMemoryBoard, User)) {
    let (board, _) = board.await;
    let app = actix_test::init_service(test_app(&board)).await;
    let signed_in = actix_test::call_service(
        &app,
        actix_test::TestRequest::post()
            .uri("/api/v1/auth/login")
            .set_json(&LoginRequest {
                email: "ann@example.com".to_owned(),
                password: PASSWORD.to_owned(),
            })
            .to_request(),
    )
    .await;
    let cookie = session_cookie(&signed_in);

    let out = actix_test::call_service(
        &app,
        actix_test::TestRequest::post()
            .uri("/api/v1/auth/logout")
            .cookie(cookie)
            .to_request(),
    )
    .await;
    assert_eq!(out.status(), StatusCode::NO_CONTENT);
    let cleared = session_cookie(&out);

    let me = actix_test::call_service(
        &app,
        actix_test::TestRequest::get()
            .uri("/api/v1/auth/me")
            .cookie(cleared)
            .to_request(),
    )
    .await;
    assert_eq!(me.status(), StatusCode::UNAUTHORIZED);
}
