//! Live server harness shared by the integration suites.
//!
//! Servers bind `127.0.0.1:0` with one worker and no signal handlers. Each
//! board is wired over the in-memory adapters and seeded with one user per
//! role, all sharing [`PASSWORD`].

use std::net::TcpListener;

use actix_web::cookie::{Key, SameSite};
use actix_web::dev::ServerHandle;
use actix_web::{App, HttpServer, web};

use loadboard::Trace;
use loadboard::domain::{Email, Role, User, UserId, UserName};
use loadboard::inbound::http::configure_api;
use loadboard::inbound::http::session_config::SessionSettings;
use loadboard::inbound::http::state::HttpState;
use loadboard::inbound::ws;
use loadboard::inbound::ws::state::{OriginPolicy, WsState};
use loadboard::test_support::{InMemoryBoard, fixture_instant, in_memory_ports};

pub const PASSWORD: &str = "correct-horse";

/// One user per role, plus a second employee.
pub struct Roster {
    pub admin: User,
    pub supervisor: User,
    pub allocator: User,
    pub employee: User,
    pub other_employee: User,
}

impl Roster {
    fn new() -> Self {
        Self {
            admin: member("Ada", Role::Admin),
            supervisor: member("Sam", Role::Supervisor),
            allocator: member("Alex", Role::Allocator),
            employee: member("Eve", Role::Employee),
            other_employee: member("Oscar", Role::Employee),
        }
    }

    fn all(&self) -> [&User; 5] {
        [
            &self.admin,
            &self.supervisor,
            &self.allocator,
            &self.employee,
            &self.other_employee,
        ]
    }
}

fn member(name: &str, role: Role) -> User {
    User {
        id: UserId::random(),
        email: Email::new(format!("{}@example.com", name.to_lowercase())).expect("fixture email"),
        name: UserName::new(name).expect("fixture name"),
        role,
        created_at: fixture_instant(),
    }
}

/// A running server over a seeded in-memory board.
pub struct LiveBoard {
    pub base_url: String,
    pub roster: Roster,
    pub board: InMemoryBoard,
    pub server: ServerHandle,
}

impl LiveBoard {
    /// `ws://` URL of the change feed.
    pub fn ws_url(&self) -> String {
        format!("{}/ws", self.base_url.replacen("http://", "ws://", 1))
    }

    /// Base URL the client backend joins its relative paths onto.
    pub fn api_base(&self) -> url::Url {
        url::Url::parse(&format!("{}/api/v1/", self.base_url)).expect("api base url")
    }
}

/// Start a server; must run inside an Actix system or a `LocalSet`.
pub async fn spawn_live_board() -> Result<LiveBoard, String> {
    let board = in_memory_ports();
    let roster = Roster::new();
    for user in roster.all() {
        board.seed_user(user, PASSWORD).await;
    }

    let session = SessionSettings {
        key: Key::generate(),
        cookie_secure: false,
        same_site: SameSite::Lax,
    };
    let http_data = web::Data::new(HttpState::new(board.ports.clone()));
    let ws_data = web::Data::new(WsState::new(
        board.ports.users.clone(),
        board.events.clone(),
        OriginPolicy::default(),
    ));

    let listener = TcpListener::bind("127.0.0.1:0").map_err(|err| err.to_string())?;
    let addr = listener.local_addr().map_err(|err| err.to_string())?;
    let server = HttpServer::new(move || {
        App::new()
            .app_data(http_data.clone())
            .app_data(ws_data.clone())
            .wrap(session.middleware())
            .wrap(Trace)
            .service(web::scope("/api/v1").configure(configure_api))
            .service(ws::ws_entry)
    })
    .disable_signals()
    .workers(1)
    .listen(listener)
    .map_err(|err| err.to_string())?
    .run();

    let handle = server.handle();
    actix_web::rt::spawn(server);

    Ok(LiveBoard {
        base_url: format!("http://{addr}"),
        roster,
        board,
        server: handle,
    })
}
