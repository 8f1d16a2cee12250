//! Persistence side of the client: the load backend and its HTTP adapter.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::cookie::{CookieStore, Jar};
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::Serialize;
use serde_json::Value;
use tracing::debug;
use url::Url;

use super::ClientError;
use super::wire::{NewLoadBody, PatchBody, decode_load};
use crate::domain::{Error, Load, LoadDraft, LoadId, LoadPatch, User};

/// Backend operations the board needs.
///
/// Each call may fail with an authorization error distinct from not found.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LoadBackend: Send + Sync {
    /// Every load visible to the signed-in actor.
    async fn fetch_all(&self) -> Result<Vec<Load>, ClientError>;

    /// Create a load and return the stored row.
    async fn insert(&self, draft: &LoadDraft) -> Result<Load, ClientError>;

    /// Apply a patch and return the stored row.
    async fn update(&self, id: &LoadId, patch: &LoadPatch) -> Result<Load, ClientError>;

    /// Hard-delete a load.
    async fn delete(&self, id: &LoadId) -> Result<(), ClientError>;
}

#[derive(Serialize)]
struct LoginBody<'a> {
    email: &'a str,
    password: &'a str,
}

/// [`LoadBackend`] over the HTTP API, holding the session cookie.
#[derive(Clone)]
pub struct ReqwestLoadBackend {
    client: Client,
    cookies: Arc<Jar>,
    base: Url,
}

impl ReqwestLoadBackend {
    /// Build a backend rooted at `base` (for example `http://host/api/v1/`).
    pub fn new(base: Url) -> Result<Self, ClientError> {
        let cookies = Arc::new(Jar::default());
        let client = Client::builder()
            .cookie_provider(Arc::clone(&cookies))
            .build()
            .map_err(|err| ClientError::transport(err.to_string()))?;
        Ok(Self {
            client,
            cookies,
            base,
        })
    }

    fn url(&self, path: &str) -> Result<Url, ClientError> {
        self.base
            .join(path)
            .map_err(|err| ClientError::transport(format!("invalid endpoint {path}: {err}")))
    }

    fn request(&self, method: Method, path: &str) -> Result<RequestBuilder, ClientError> {
        Ok(self.client.request(method, self.url(path)?))
    }

    /// `Cookie` header value for the current session, for the event feed.
    #[must_use]
    pub fn session_cookie(&self) -> Option<String> {
        self.cookies
            .cookies(&self.base)
            .and_then(|value| value.to_str().ok().map(str::to_owned))
    }

    /// Sign in; later requests carry the session cookie.
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<User, ClientError> {
        let response = send(
            self.request(Method::POST, "auth/login")?
                .json(&LoginBody { email, password }),
        )
        .await?;
        response
            .json::<User>()
            .await
            .map_err(|err| ClientError::decode(err.to_string()))
    }

    /// End the session.
    pub async fn sign_out(&self) -> Result<(), ClientError> {
        send(self.request(Method::POST, "auth/logout")?).await?;
        Ok(())
    }
}

async fn send(request: RequestBuilder) -> Result<Response, ClientError> {
    let response = request
        .send()
        .await
        .map_err(|err| ClientError::transport(err.to_string()))?;
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    debug!(%status, "backend rejected request");
    let body = response.text().await.unwrap_or_default();
    Err(error_from_response(status, &body))
}

fn error_from_response(status: StatusCode, body: &str) -> ClientError {
    if let Ok(error) = serde_json::from_str::<Error>(body) {
        return ClientError::from(error);
    }
    let message = format!("unexpected status {status}");
    match status {
        StatusCode::BAD_REQUEST => ClientError::Validation {
            message,
            field: None,
        },
        StatusCode::UNAUTHORIZED => ClientError::Authentication { message },
        StatusCode::FORBIDDEN => ClientError::Authorization { message },
        StatusCode::NOT_FOUND => ClientError::NotFound { message },
        StatusCode::CONFLICT => ClientError::Conflict { message },
        _ => ClientError::transport(message),
    }
}

async fn read_load(response: Response) -> Result<Load, ClientError> {
    let value = response
        .json::<Value>()
        .await
        .map_err(|err| ClientError::decode(err.to_string()))?;
    decode_load(value)
}

#[async_trait]
impl LoadBackend for ReqwestLoadBackend {
    async fn fetch_all(&self) -> Result<Vec<Load>, ClientError> {
        let response = send(self.request(Method::GET, "loads")?).await?;
        let rows = response
            .json::<Vec<Value>>()
            .await
            .map_err(|err| ClientError::decode(err.to_string()))?;
        rows.into_iter().map(decode_load).collect()
    }

    async fn insert(&self, draft: &LoadDraft) -> Result<Load, ClientError> {
        let request = self
            .request(Method::POST, "loads")?
            .json(&NewLoadBody::from(draft));
        read_load(send(request).await?).await
    }

    async fn update(&self, id: &LoadId, patch: &LoadPatch) -> Result<Load, ClientError> {
        let request = self
            .request(Method::PUT, &format!("loads/{id}"))?
            .json(&PatchBody::from(patch));
        read_load(send(request).await?).await
    }

    async fn delete(&self, id: &LoadId) -> Result<(), ClientError> {
        send(self.request(Method::DELETE, &format!("loads/{id}"))?).await?;
        Ok(())
    }
}
