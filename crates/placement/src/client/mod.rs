//! Typed access to the placement REST backend.
//!
//! `PlacementClient` is the unauthenticated transport (login and identity lookup).
//! `SessionClient` pairs it with a `Session` and attaches the bearer token to every call.

mod error;
mod resources;

pub use error::{describe_failure, ApiError, TRANSPORT_MESSAGE};
pub use resources::SessionClient;

use reqwest::{Method, RequestBuilder, Response, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::ApiConfig;
use crate::workflows::directory::CurrentUser;

#[derive(Debug, Clone)]
pub struct PlacementClient {
    http: reqwest::Client,
    base_url: Url,
}

#[derive(Serialize)]
struct Credentials<'a> {
    username: &'a str,
    password: &'a str,
}

#[derive(Deserialize)]
struct TokenResponse {
    token: String,
}

impl PlacementClient {
    pub fn new(config: &ApiConfig) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .danger_accept_invalid_certs(config.accept_invalid_certs)
            .user_agent(concat!("placement/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(ApiError::Transport)?;

        let mut base_url = config.base_url.clone();
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        Ok(Self { http, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Exchange credentials for a bearer token.
    pub async fn authenticate(&self, username: &str, password: &str) -> Result<String, ApiError> {
        let request = self
            .request(Method::POST, "api/auth/login")?
            .json(&Credentials { username, password });
        let response: TokenResponse = self.send_json(request).await?;
        Ok(response.token)
    }

    /// Resolve the identity behind a token.
    pub async fn current_user(&self, token: &str) -> Result<CurrentUser, ApiError> {
        let request = self
            .request(Method::GET, "api/auth/me")?
            .bearer_auth(token);
        self.send_json(request).await
    }

    pub(crate) fn request(&self, method: Method, path: &str) -> Result<RequestBuilder, ApiError> {
        let url = self
            .base_url
            .join(path)
            .map_err(|_| ApiError::InvalidPath {
                path: path.to_string(),
            })?;
        debug!(%method, %url, "placement request");
        Ok(self.http.request(method, url))
    }

    pub(crate) async fn send_json<T>(&self, request: RequestBuilder) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
    {
        let response = self.send(request).await?;
        response.json::<T>().await.map_err(ApiError::Decode)
    }

    pub(crate) async fn send_empty(&self, request: RequestBuilder) -> Result<(), ApiError> {
        self.send(request).await.map(|_| ())
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response, ApiError> {
        let response = request.send().await.map_err(|err| {
            warn!(error = %err, "placement backend unreachable");
            ApiError::Transport(err)
        })?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        if status == StatusCode::UNAUTHORIZED {
            warn!(url = %response.url(), "placement backend refused the credentials");
            return Err(ApiError::Unauthorized);
        }

        let url = response.url().clone();
        let body = response.text().await.unwrap_or_default();
        let message = describe_failure(status.as_u16(), &body);
        warn!(%url, status = status.as_u16(), %message, "placement request rejected");
        Err(ApiError::Rejected {
            status: status.as_u16(),
            message,
        })
    }
}
