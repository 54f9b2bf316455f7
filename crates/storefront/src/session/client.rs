//! Authenticated access to the marketplace REST API.

use std::sync::Arc;

use reqwest::{Response, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use tracing::{debug, instrument, warn};
use url::Url;

use super::credentials::{CredentialPair, CredentialStore};
use super::profile::{RegisteredUser, Registration, UserProfile};
use crate::config::StorefrontConfig;
use crate::error::{ApiError, Result};
use crate::http::{ApiRequest, auth_failure_message};

const LOGIN_PATH: &str = "/api/auth/login/";
const REGISTER_PATH: &str = "/api/auth/register/";
const REFRESH_PATH: &str = "/api/auth/refresh/";
const PROFILE_PATH: &str = "/api/auth/me/";

/// Whether a credential pair is currently stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Anonymous,
    Authenticated,
}

/// Token pair as returned by the login and refresh endpoints.
///
/// Refresh responses omit `refresh` unless the server rotates tokens.
#[derive(Deserialize)]
struct TokenResponse {
    access: String,
    #[serde(default)]
    refresh: Option<String>,
}

/// Client for the auth endpoints and for authenticated requests.
///
/// Cheap to clone; clones share the HTTP connection pool and the
/// credential store. Build one per process and pass it to whatever needs
/// authenticated access.
#[derive(Clone)]
pub struct SessionClient {
    inner: Arc<SessionClientInner>,
}

struct SessionClientInner {
    http: reqwest::Client,
    api_base: Url,
    store: Arc<dyn CredentialStore>,
}

impl SessionClient {
    /// Create a client for the configured API, persisting into `store`.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Http` if the HTTP client cannot be built.
    pub fn new(config: &StorefrontConfig, store: Arc<dyn CredentialStore>) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.http_timeout)
            .build()?;
        Ok(Self::with_http_client(http, config.api_base.clone(), store))
    }

    /// Create a client around an existing `reqwest::Client`.
    #[must_use]
    pub fn with_http_client(
        http: reqwest::Client,
        api_base: Url,
        store: Arc<dyn CredentialStore>,
    ) -> Self {
        Self {
            inner: Arc::new(SessionClientInner {
                http,
                api_base,
                store,
            }),
        }
    }

    /// Base URL every endpoint path is joined onto.
    #[must_use]
    pub fn api_base(&self) -> &Url {
        &self.inner.api_base
    }

    // =========================================================================
    // Credential storage
    // =========================================================================

    /// Persist both tokens together.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Storage` if the store cannot be written.
    pub fn store_credentials(&self, pair: &CredentialPair) -> Result<()> {
        pair.save(self.inner.store.as_ref())?;
        Ok(())
    }

    /// Load the stored pair; a partially stored pair counts as absent.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Storage` if the store cannot be read.
    pub fn load_credentials(&self) -> Result<Option<CredentialPair>> {
        Ok(CredentialPair::load(self.inner.store.as_ref())?)
    }

    /// Remove both tokens.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Storage` if the store cannot be written.
    pub fn clear_credentials(&self) -> Result<()> {
        CredentialPair::erase(self.inner.store.as_ref())?;
        Ok(())
    }

    /// Current position in the session lifecycle.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Storage` if the store cannot be read.
    pub fn state(&self) -> Result<SessionState> {
        Ok(if self.load_credentials()?.is_some() {
            SessionState::Authenticated
        } else {
            SessionState::Anonymous
        })
    }

    /// Drop credentials after a failed refresh. A storage failure here is
    /// logged rather than returned so the caller still sees the auth outcome.
    fn discard_credentials(&self) {
        if let Err(e) = self.clear_credentials() {
            warn!(error = %e, "Failed to clear credentials after failed refresh");
        }
    }

    // =========================================================================
    // Auth endpoints
    // =========================================================================

    /// Exchange a username (or email) and password for a credential pair.
    ///
    /// Does not store the pair; see [`sign_in`](Self::sign_in).
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Auth` with the server's detail text if the
    /// credentials are rejected.
    #[instrument(skip(self, password), fields(identifier = %identifier))]
    pub async fn login(&self, identifier: &str, password: &SecretString) -> Result<CredentialPair> {
        let body = serde_json::json!({
            "username": identifier,
            "password": password.expose_secret(),
        });
        let tokens: TokenResponse = self.post_auth(LOGIN_PATH, &body).await?;
        let refresh = tokens
            .refresh
            .ok_or_else(|| ApiError::Auth("Login response is missing a refresh token".into()))?;
        Ok(CredentialPair::new(tokens.access, refresh))
    }

    /// Create an account.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Auth` with the server's detail text if the
    /// registration is refused (duplicate username, weak password, ...).
    #[instrument(skip(self, registration), fields(username = %registration.username, role = %registration.role))]
    pub async fn register(&self, registration: &Registration) -> Result<RegisteredUser> {
        let body = serde_json::json!({
            "username": registration.username,
            "email": registration.email,
            "password": registration.password.expose_secret(),
            "role": registration.role,
        });
        let response = self
            .send(&ApiRequest::post(REGISTER_PATH).json(&body)?, None)
            .await?;
        let text = auth_response_text(response).await?;
        if text.trim().is_empty() {
            return Ok(RegisteredUser::default());
        }
        Ok(serde_json::from_str(&text)?)
    }

    /// Exchange a refresh token for a new credential pair.
    ///
    /// When the server does not rotate refresh tokens the one passed in is
    /// kept, so the returned pair is always complete.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Auth` if the refresh token is invalid or expired.
    #[instrument(skip(self, refresh_token))]
    pub async fn refresh(&self, refresh_token: &SecretString) -> Result<CredentialPair> {
        let body = serde_json::json!({ "refresh": refresh_token.expose_secret() });
        let tokens: TokenResponse = self.post_auth(REFRESH_PATH, &body).await?;
        let refresh = tokens
            .refresh
            .unwrap_or_else(|| refresh_token.expose_secret().to_string());
        Ok(CredentialPair::new(tokens.access, refresh))
    }

    /// Fetch the profile belonging to `access_token`.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Auth` if the token is rejected (401/403) and
    /// `ApiError::RequestFailed` for any other non-success status.
    #[instrument(skip(self, access_token))]
    pub async fn fetch_profile(&self, access_token: &SecretString) -> Result<UserProfile> {
        let response = self
            .send(&ApiRequest::get(PROFILE_PATH), Some(access_token))
            .await?;
        let status = response.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(ApiError::Auth("Failed to load profile".into()));
        }
        crate::http::read_json(response, "Failed to load profile").await
    }

    /// Profile of the stored session, refreshing the access token once if
    /// the profile fetch fails for any reason.
    ///
    /// If the refresh fails the credentials are cleared and the original
    /// profile error is returned.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::NotAuthenticated` when no pair is stored, or the
    /// error of the failing profile fetch.
    #[instrument(skip(self))]
    pub async fn ensure_profile(&self) -> Result<UserProfile> {
        let pair = self.load_credentials()?.ok_or(ApiError::NotAuthenticated)?;

        let original = match self.fetch_profile(pair.access()).await {
            Ok(profile) => return Ok(profile),
            Err(e) => e,
        };

        debug!(error = %original, "Profile fetch failed, refreshing once");
        let refreshed = match self.refresh(pair.refresh()).await {
            Ok(refreshed) => refreshed,
            Err(refresh_error) => {
                warn!(error = %refresh_error, "Token refresh failed");
                self.discard_credentials();
                return Err(original);
            }
        };

        self.store_credentials(&refreshed)?;
        self.fetch_profile(refreshed.access()).await
    }

    // =========================================================================
    // Requests
    // =========================================================================

    /// Send `request` with the stored access token attached.
    ///
    /// A 401 answer triggers exactly one refresh; on success the new pair is
    /// stored and the request is replayed once with it. If the refresh
    /// fails for any reason the credentials are cleared and the original
    /// 401 response is returned, so callers can tell "still unauthenticated" apart from a
    /// transport failure. Without stored credentials the request goes out
    /// anonymously.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Http` on transport failure and `ApiError::Storage`
    /// if the refreshed pair cannot be persisted.
    #[instrument(skip(self, request), fields(method = %request.method(), path = %request.path()))]
    pub async fn authorized_request(&self, request: &ApiRequest) -> Result<Response> {
        let pair = self.load_credentials()?;
        let response = self
            .send(request, pair.as_ref().map(CredentialPair::access))
            .await?;

        if response.status() != StatusCode::UNAUTHORIZED {
            return Ok(response);
        }
        let Some(pair) = pair else {
            return Ok(response);
        };

        debug!("Request unauthorized, refreshing once");
        match self.refresh(pair.refresh()).await {
            Ok(refreshed) => {
                self.store_credentials(&refreshed)?;
                self.send(request, Some(refreshed.access())).await
            }
            Err(e) => {
                warn!(error = %e, "Token refresh failed, returning original response");
                self.discard_credentials();
                Ok(response)
            }
        }
    }

    /// Send `request` without credentials.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Http` on transport failure.
    #[instrument(skip(self, request), fields(method = %request.method(), path = %request.path()))]
    pub async fn public_request(&self, request: &ApiRequest) -> Result<Response> {
        self.send(request, None).await
    }

    // =========================================================================
    // Session lifecycle
    // =========================================================================

    /// Log in and store the resulting pair.
    ///
    /// # Errors
    ///
    /// See [`login`](Self::login) and [`store_credentials`](Self::store_credentials).
    pub async fn sign_in(&self, identifier: &str, password: &SecretString) -> Result<()> {
        let pair = self.login(identifier, password).await?;
        self.store_credentials(&pair)?;
        tracing::info!(identifier, "Signed in");
        Ok(())
    }

    /// Register, then sign in with the new account.
    ///
    /// # Errors
    ///
    /// See [`register`](Self::register) and [`sign_in`](Self::sign_in).
    pub async fn sign_up(&self, registration: &Registration) -> Result<RegisteredUser> {
        let user = self.register(registration).await?;
        self.sign_in(&registration.username, &registration.password)
            .await?;
        Ok(user)
    }

    /// End the session.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Storage` if the store cannot be written.
    pub fn logout(&self) -> Result<()> {
        self.clear_credentials()?;
        tracing::info!("Signed out");
        Ok(())
    }

    // =========================================================================
    // Internals
    // =========================================================================

    async fn send(&self, request: &ApiRequest, bearer: Option<&SecretString>) -> Result<Response> {
        let builder = request.build(&self.inner.http, &self.inner.api_base, bearer)?;
        Ok(builder.send().await?)
    }

    /// POST a JSON body to an auth endpoint and decode the token response.
    async fn post_auth(&self, path: &str, body: &serde_json::Value) -> Result<TokenResponse> {
        let response = self.send(&ApiRequest::post(path).json(body)?, None).await?;
        let text = auth_response_text(response).await?;
        Ok(serde_json::from_str(&text)?)
    }
}

/// Body of a successful auth response; failures become `ApiError::Auth`.
async fn auth_response_text(response: Response) -> Result<String> {
    let status = response.status();
    let text = response.text().await?;
    if status.is_success() {
        Ok(text)
    } else {
        Err(ApiError::Auth(auth_failure_message(&text)))
    }
}
