//! WebSocket inbound adapter pushing load changes to signed-in clients.
//!
//! Responsibilities:
//! - validate upgrade requests (origin allow-list, session cookie)
//! - start the per-connection session loop over a fresh event subscription
//! - keep WebSocket-specific concerns at the edge of the system

use actix_web::web::{self, Payload};
use actix_web::{
    HttpRequest, HttpResponse, get,
    http::header::{HeaderValue, ORIGIN},
};
use tracing::{error, info, warn};
use url::Url;

use crate::inbound::http::session::SessionContext;

mod session;

pub mod messages;
pub mod state;

/// Handle WebSocket upgrade for the `/ws` endpoint.
///
/// Browsers always send `Origin`; it is checked against the allow-list.
/// Native clients omit it and are admitted on their session cookie alone.
#[get("/ws")]
pub async fn ws_entry(
    state: web::Data<state::WsState>,
    session: SessionContext,
    req: HttpRequest,
    stream: Payload,
) -> actix_web::Result<HttpResponse> {
    let mut origin_iter = req.headers().get_all(ORIGIN);
    if let Some(origin_header) = origin_iter.next() {
        if origin_iter.next().is_some() {
            error!("Multiple Origin headers on WebSocket upgrade");
            return Err(actix_web::error::ErrorBadRequest("Invalid Origin header"));
        }
        validate_origin(&state.origins, origin_header)?;
    }

    let actor = session.require_actor(state.users.as_ref()).await?;
    let subscription = state.events.subscribe();
    let (response, ws_session, messages) = actix_ws::handle(&req, stream).map_err(|error| {
        error!(error = %error, "WebSocket upgrade failed");
        actix_web::error::ErrorBadRequest("WebSocket upgrade failed")
    })?;

    info!(user_id = %actor.id, role = %actor.role, "change feed opened");
    actix_web::rt::spawn(session::handle_ws_session(
        actor,
        subscription,
        ws_session,
        messages,
    ));
    Ok(response)
}

fn validate_origin(policy: &state::OriginPolicy, origin_header: &HeaderValue) -> actix_web::Result<()> {
    let origin_value = match origin_header.to_str() {
        Ok(value) => value,
        Err(error) => {
            error!(error = %error, "Failed to parse Origin header as string");
            return Err(actix_web::error::ErrorBadRequest("Invalid Origin header"));
        }
    };

    let origin = Url::parse(origin_value).map_err(|error| {
        error!(error = %error, "Failed to parse Origin header as URL");
        actix_web::error::ErrorBadRequest("Invalid Origin header")
    })?;

    if policy.allows(&origin) {
        Ok(())
    } else {
        warn!(
            origin = origin_value,
            "Rejected WS upgrade due to disallowed Origin"
        );
        Err(actix_web::error::ErrorForbidden("Origin not allowed"))
    }
}

#[cfg(test)]
mod tests {
    use actix_web::http::StatusCode;
    use rstest::rstest;

    use super::state::OriginPolicy;
    use super::*;

    fn header(value: &str) -> HeaderValue {
        HeaderValue::from_str(value).expect("valid header value")
    }

    fn policy() -> OriginPolicy {
        OriginPolicy::new(vec![
            Url::parse("https://board.workflow.example").expect("url"),
        ])
    }

    #[rstest]
    #[case("http://localhost:3000")]
    #[case("https://board.workflow.example")]
    #[case("https://board.workflow.example:443")]
    fn accepts_configured_origins(#[case] origin: &str) {
        assert!(validate_origin(&policy(), &header(origin)).is_ok());
    }

    #[rstest]
    #[case("http://localhost")]
    #[case("https://example.com")]
    #[case("http://board.workflow.example")]
    #[case("https://board.workflow.example.evil.com")]
    fn rejects_disallowed_origins(#[case] origin: &str) {
        let error = validate_origin(&policy(), &header(origin)).expect_err("origin should be rejected");
        assert_eq!(
            error.as_response_error().status_code(),
            StatusCode::FORBIDDEN
        );
    }

    #[rstest]
    fn rejects_non_utf8_origin_header() {
        let header = HeaderValue::from_bytes(&[0x80]).expect("opaque header value");
        let error = validate_origin(&policy(), &header).expect_err("origin should be rejected");
        assert_eq!(
            error.as_response_error().status_code(),
            StatusCode::BAD_REQUEST
        );
    }

    #[rstest]
    fn rejects_unparsable_origin_header() {
        let header = HeaderValue::from_static("not a url");
        let error = validate_origin(&policy(), &header).expect_err("origin should be rejected");
        assert_eq!(
            error.as_response_error().status_code(),
            StatusCode::BAD_REQUEST
        );
    }
}
