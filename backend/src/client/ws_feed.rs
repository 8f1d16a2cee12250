//! [`LoadFeed`] over the server's WebSocket endpoint.
//!
//! The first connection must succeed for `subscribe` to return. After that
//! a background task reconnects with a fixed delay, bracketing each outage
//! with `Disconnected`/`Connected` so the reconciler knows to refetch.

use std::fmt::Display;
use std::time::Duration;

use actix_web::http::header;
use actix_web::rt;
use async_trait::async_trait;
use awc::ws::{Frame, Message};
use futures_util::{Sink, SinkExt, Stream, StreamExt, stream};
use tokio::sync::mpsc;
use tracing::{info, warn};

use super::{ChangeEvent, ClientError, FeedSignal, LoadFeed, Subscription};

const DEFAULT_RETRY_DELAY: Duration = Duration::from_secs(2);

/// WebSocket feed client built on `awc`.
#[derive(Debug, Clone)]
pub struct AwcLoadFeed {
    url: String,
    cookie: Option<String>,
    retry_delay: Duration,
}

impl AwcLoadFeed {
    /// Feed for `url`, e.g. `ws://host:8080/ws`.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            cookie: None,
            retry_delay: DEFAULT_RETRY_DELAY,
        }
    }

    /// Send the session cookie with every handshake.
    #[must_use]
    pub fn with_cookie(mut self, cookie: impl Into<String>) -> Self {
        self.cookie = Some(cookie.into());
        self
    }

    #[must_use]
    pub const fn with_retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = delay;
        self
    }
}

/// Open one socket. Takes owned parts so the socket borrows nothing and can
/// move into the pump task.
async fn connect(
    url: String,
    cookie: Option<String>,
) -> Result<
    impl Stream<Item = Result<Frame, awc::error::WsProtocolError>>
    + Sink<Message, Error = awc::error::WsProtocolError>
    + Unpin,
    ClientError,
> {
    let mut request = awc::Client::default().ws(url);
    if let Some(cookie) = cookie {
        request = request.set_header(header::COOKIE, cookie);
    }
    let (_response, socket) = request
        .connect()
        .await
        .map_err(|err| ClientError::transport(err.to_string()))?;
    Ok(socket)
}

/// Forward frames until the socket closes or the subscriber goes away.
///
/// Returns `false` once nobody is listening.
async fn forward<S, E>(socket: &mut S, signals: &mpsc::UnboundedSender<FeedSignal>) -> bool
where
    S: Stream<Item = Result<Frame, E>> + Sink<Message> + Unpin,
    E: Display,
{
    while let Some(frame) = socket.next().await {
        match frame {
            Ok(Frame::Text(bytes)) => {
                let parsed = std::str::from_utf8(&bytes)
                    .map_err(|err| ClientError::decode(err.to_string()))
                    .and_then(ChangeEvent::parse);
                match parsed {
                    Ok(event) => {
                        if signals.send(FeedSignal::Change(event)).is_err() {
                            return false;
                        }
                    }
                    Err(err) => warn!(%err, "dropping malformed change message"),
                }
            }
            Ok(Frame::Ping(payload)) => {
                if socket.send(Message::Pong(payload)).await.is_err() {
                    break;
                }
            }
            Ok(Frame::Close(reason)) => {
                info!(?reason, "event feed closed by server");
                break;
            }
            Ok(_) => {}
            Err(err) => {
                warn!(%err, "event feed protocol error");
                break;
            }
        }
    }
    !signals.is_closed()
}

#[async_trait(?Send)]
impl LoadFeed for AwcLoadFeed {
    async fn subscribe(&self) -> Result<Subscription, ClientError> {
        let first = connect(self.url.clone(), self.cookie.clone()).await?;
        let (tx, rx) = mpsc::unbounded_channel();
        let feed = self.clone();

        let pump = rt::spawn(async move {
            let mut socket = Some(first);
            loop {
                if let Some(mut live) = socket.take() {
                    if tx.send(FeedSignal::Connected).is_err() || !forward(&mut live, &tx).await {
                        return;
                    }
                    if tx.send(FeedSignal::Disconnected).is_err() {
                        return;
                    }
                }
                rt::time::sleep(feed.retry_delay).await;
                if tx.is_closed() {
                    return;
                }
                match connect(feed.url.clone(), feed.cookie.clone()).await {
                    Ok(live) => socket = Some(live),
                    Err(err) => warn!(%err, "event feed reconnect failed"),
                }
            }
        });

        let signals = stream::unfold(rx, |mut rx| async move {
            rx.recv().await.map(|signal| (signal, rx))
        })
        .boxed_local();
        Ok(Subscription::with_pump(signals, pump))
    }
}
