//! Session helpers keeping handlers free of cookie plumbing.
//!
//! The cookie stores only the user id. Every request re-reads the user so a
//! role change or deletion takes effect immediately.

use actix_session::Session;
use actix_web::{FromRequest, HttpRequest, dev::Payload};
use futures_util::future::LocalBoxFuture;
use tracing::warn;

use crate::domain::ports::UserAdmin;
use crate::domain::{Actor, Error, ErrorCode, User, UserId};

pub(crate) const USER_ID_KEY: &str = "user_id";

/// Newtype over the Actix session.
#[derive(Clone)]
pub struct SessionContext(Session);

impl SessionContext {
    pub fn new(session: Session) -> Self {
        Self(session)
    }

    /// Store the signed-in user, rotating the session id.
    pub fn persist_user(&self, user_id: &UserId) -> Result<(), Error> {
        self.0.renew();
        self.0
            .insert(USER_ID_KEY, user_id.to_string())
            .map_err(|error| Error::internal(format!("failed to persist session: {error}")))
    }

    /// Forget the signed-in user.
    pub fn clear(&self) {
        self.0.purge();
    }

    pub fn user_id(&self) -> Result<Option<UserId>, Error> {
        let raw = self
            .0
            .get::<String>(USER_ID_KEY)
            .map_err(|error| Error::internal(format!("failed to read session: {error}")))?;
        Ok(raw.and_then(|raw| match UserId::new(&raw) {
            Ok(id) => Some(id),
            Err(error) => {
                warn!(%error, "invalid user id in session cookie");
                None
            }
        }))
    }

    /// Signed-in user id, or `401`.
    pub fn require_user_id(&self) -> Result<UserId, Error> {
        self.user_id()?
            .ok_or_else(|| Error::unauthorized("login required"))
    }

    /// Signed-in user, re-read from storage.
    ///
    /// A session pointing at a deleted user is cleared before the `401` is
    /// returned.
    pub async fn require_user(&self, users: &dyn UserAdmin) -> Result<User, Error> {
        let id = self.require_user_id()?;
        match users.me(&id).await {
            Ok(user) => Ok(user),
            Err(error) => {
                if error.code() == ErrorCode::Unauthorized {
                    self.clear();
                }
                Err(error)
            }
        }
    }

    /// Convenience for handlers that only need the actor.
    pub async fn require_actor(&self, users: &dyn UserAdmin) -> Result<Actor, Error> {
        self.require_user(users).await.map(|user| user.actor())
    }
}

impl FromRequest for SessionContext {
    type Error = actix_web::Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, payload: &mut Payload) -> Self::Future {
        let fut = Session::from_request(req, payload);
        Box::pin(async move { fut.await.map(SessionContext::new) })
    }
}
