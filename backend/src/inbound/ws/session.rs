//! Per-connection WebSocket handler.
//!
//! Forwards each committed change the actor is concerned with as one text
//! frame. The public WebSocket contract pings every 5s and considers a
//! connection idle after 10s without client traffic. Tests shorten these
//! intervals to speed up feedback; adjust the constants below if SLAs change
//! so clients and intermediaries stay aligned.

use std::time::{Duration, Instant};

use actix_ws::{CloseCode, CloseReason, Closed, Message, MessageStream, ProtocolError, Session};
use futures_util::StreamExt;
use tokio::time;
use tracing::{debug, warn};

use crate::domain::ports::{LoadFeedItem, LoadSubscription};
use crate::domain::{Actor, LoadChange};
use crate::inbound::ws::messages::ChangeMessage;

/// Time between heartbeats to the client (5s in production, shorter in tests).
#[cfg(not(test))]
const HEARTBEAT_INTERVAL: Duration = Duration::from_secs(5);
#[cfg(test)]
const HEARTBEAT_INTERVAL: Duration = Duration::from_millis(50);

/// Max idle time before disconnecting the client (10s in production, shorter in tests).
#[cfg(not(test))]
const CLIENT_TIMEOUT: Duration = Duration::from_secs(10);
#[cfg(test)]
const CLIENT_TIMEOUT: Duration = Duration::from_millis(100);

pub(super) async fn handle_ws_session(
    actor: Actor,
    subscription: LoadSubscription,
    session: Session,
    stream: MessageStream,
) {
    WsSession::new(actor).run(subscription, session, stream).await;
}

enum SessionError {
    ClientClosed(Option<CloseReason>),
    StreamClosed,
    HeartbeatTimeout,
    Protocol(ProtocolError),
    Network(Closed),
    /// The subscriber fell behind; changes were dropped.
    Lagged(u64),
    /// The event hub shut down.
    FeedEnded,
}

enum CloseAction {
    None,
    Close(Option<CloseReason>),
}

struct WsSession {
    actor: Actor,
}

impl WsSession {
    fn new(actor: Actor) -> Self {
        Self { actor }
    }

    async fn run(
        &self,
        mut subscription: LoadSubscription,
        mut session: Session,
        mut stream: MessageStream,
    ) {
        let mut last_heartbeat = Instant::now();
        let mut heartbeat = time::interval(HEARTBEAT_INTERVAL);

        loop {
            let result = tokio::select! {
                _ = heartbeat.tick() => {
                    self.handle_heartbeat_tick(&mut session, &last_heartbeat).await
                }
                message = stream.recv() => {
                    self.handle_stream_message(&mut session, &mut last_heartbeat, message)
                        .await
                }
                item = subscription.next() => {
                    self.handle_feed_item(&mut session, item).await
                }
            };

            if let Err(error) = result {
                self.log_shutdown_reason(&error);
                let close_action = self.close_action_for(&error);
                self.close_session_if_needed(session, close_action).await;
                return;
            }
        }
    }

    async fn handle_heartbeat_tick(
        &self,
        session: &mut Session,
        last_heartbeat: &Instant,
    ) -> Result<(), SessionError> {
        if Instant::now().duration_since(*last_heartbeat) > CLIENT_TIMEOUT {
            return Err(SessionError::HeartbeatTimeout);
        }

        session.ping(b"").await.map_err(SessionError::Network)
    }

    async fn handle_stream_message(
        &self,
        session: &mut Session,
        last_heartbeat: &mut Instant,
        message: Option<Result<Message, ProtocolError>>,
    ) -> Result<(), SessionError> {
        let Some(message) = message else {
            return Err(SessionError::StreamClosed);
        };

        match message {
            Ok(message) => self.handle_message(session, last_heartbeat, message).await,
            Err(error) => Err(SessionError::Protocol(error)),
        }
    }

    async fn handle_message(
        &self,
        session: &mut Session,
        last_heartbeat: &mut Instant,
        message: Message,
    ) -> Result<(), SessionError> {
        match message {
            Message::Ping(payload) => {
                *last_heartbeat = Instant::now();
                session
                    .pong(&payload)
                    .await
                    .map_err(SessionError::Network)?;
                Ok(())
            }
            // The feed is push-only; client frames only prove liveness.
            Message::Text(_)
            | Message::Pong(_)
            | Message::Binary(_)
            | Message::Continuation(_)
            | Message::Nop => {
                *last_heartbeat = Instant::now();
                Ok(())
            }
            Message::Close(reason) => Err(SessionError::ClientClosed(reason)),
        }
    }

    async fn handle_feed_item(
        &self,
        session: &mut Session,
        item: Option<LoadFeedItem>,
    ) -> Result<(), SessionError> {
        match item {
            Some(LoadFeedItem::Change(change)) => self
                .forward_change(session, change)
                .await
                .map_err(SessionError::Network),
            Some(LoadFeedItem::Lagged(missed)) => Err(SessionError::Lagged(missed)),
            None => Err(SessionError::FeedEnded),
        }
    }

    async fn forward_change(&self, session: &mut Session, change: LoadChange) -> Result<(), Closed> {
        if !change.concerns(&self.actor) {
            return Ok(());
        }
        debug!(
            user_id = %self.actor.id,
            load_id = %change.record.id,
            kind = ?change.kind,
            "pushing load change"
        );
        self.send_json(session, &ChangeMessage::from(change)).await
    }

    async fn send_json<T: serde::Serialize>(
        &self,
        session: &mut Session,
        payload: &T,
    ) -> Result<(), Closed> {
        match serde_json::to_string(payload) {
            Ok(body) => session.text(body).await,
            Err(error) => {
                // In debug builds fail fast so schema drift is fixed; in release we log and keep the connection alive.
                if cfg!(debug_assertions) {
                    panic!("load changes must serialize: {error}");
                } else {
                    warn!(error = %error, "Failed to serialize WebSocket payload");
                }
                Ok(())
            }
        }
    }

    fn log_shutdown_reason(&self, error: &SessionError) {
        match error {
            SessionError::HeartbeatTimeout => {
                warn!("WebSocket heartbeat timeout; closing connection");
            }
            SessionError::Protocol(error) => {
                warn!(error = %error, "WebSocket protocol error");
            }
            SessionError::Network(error) => {
                warn!(error = %error, "WebSocket send failed; closing connection");
            }
            SessionError::Lagged(missed) => {
                warn!(user_id = %self.actor.id, missed, "change feed lagged; closing so the client refetches");
            }
            SessionError::FeedEnded => {
                warn!("change feed ended; closing connection");
            }
            SessionError::ClientClosed(_) | SessionError::StreamClosed => {}
        }
    }

    fn close_action_for(&self, error: &SessionError) -> CloseAction {
        match error {
            SessionError::HeartbeatTimeout => CloseAction::Close(Some(CloseReason {
                code: CloseCode::Normal,
                description: Some("heartbeat timeout".to_owned()),
            })),
            SessionError::Protocol(_) => CloseAction::Close(Some(CloseReason {
                code: CloseCode::Protocol,
                description: Some("protocol error".to_owned()),
            })),
            SessionError::Lagged(_) => CloseAction::Close(Some(CloseReason {
                code: CloseCode::Again,
                description: Some("missed changes; reconnect and refetch".to_owned()),
            })),
            SessionError::FeedEnded => CloseAction::Close(Some(CloseReason {
                code: CloseCode::Away,
                description: Some("server shutting down".to_owned()),
            })),
            SessionError::ClientClosed(reason) => CloseAction::Close(reason.clone()),
            SessionError::StreamClosed | SessionError::Network(_) => CloseAction::None,
        }
    }

    async fn close_session_if_needed(&self, session: Session, close_action: CloseAction) {
        if let CloseAction::Close(reason) = close_action {
            if let Err(error) = session.close(reason).await {
                warn!(error = %error, "Failed to close WebSocket session");
            }
        }
    }
}

#[cfg(test)]
#[path = "session_tests.rs"]
mod tests;
