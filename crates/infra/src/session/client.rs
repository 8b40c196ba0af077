//! Session-owning API client
//!
//! Single source of truth for bearer credentials and the only place that
//! performs authenticated network calls, so the one-shot refresh-and-retry
//! protocol has exactly one owner:
//!
//! - every credential mutation is mirrored to the secure store
//! - a 2xx envelope carrying `error.code == "TOKEN_EXPIRED"` triggers exactly
//!   one refresh and one retry of the original request
//! - concurrent expiries share a single in-flight refresh

use std::sync::Arc;

use civiclink_domain::{ApiError, LoginRequest, Result, User};
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info, warn};

use super::store::{SecureStore, ACCESS_TOKEN_KEY, REFRESH_TOKEN_KEY, USER_PROFILE_KEY};
use super::types::{ApiEnvelope, Credentials, LoginData, RefreshData};
use crate::config::ApiConfig;
use crate::http::HttpClient;
use crate::telemetry::mask_token;

/// Body for an authorized request.
///
/// Multipart fields are buffered owned data so the request can be rebuilt
/// for the single post-refresh retry (a streaming body could not be
/// re-issued).
#[derive(Debug, Clone)]
pub enum RequestBody {
    Empty,
    Json(Value),
    Multipart(Vec<MultipartField>),
}

/// One buffered multipart field.
#[derive(Debug, Clone)]
pub struct MultipartField {
    pub name: String,
    pub data: MultipartData,
}

#[derive(Debug, Clone)]
pub enum MultipartData {
    Text(String),
    Bytes { content: Vec<u8>, file_name: String, mime: String },
}

/// Authenticated API client owning the session credentials.
pub struct SessionClient {
    http: HttpClient,
    store: Arc<dyn SecureStore>,
    config: ApiConfig,
    credentials: RwLock<Option<Credentials>>,
    user: RwLock<Option<User>>,
    /// Serializes refresh attempts; see [`Self::refresh_after_expiry`].
    refresh_gate: Mutex<()>,
}

impl SessionClient {
    /// Create a client with no active session.
    ///
    /// # Errors
    /// Returns `ApiError::Network` if the HTTP client cannot be built.
    pub fn new(config: ApiConfig, store: Arc<dyn SecureStore>) -> Result<Self> {
        let http = HttpClient::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent.clone())
            .build()?;

        Ok(Self {
            http,
            store,
            config,
            credentials: RwLock::new(None),
            user: RwLock::new(None),
            refresh_gate: Mutex::new(()),
        })
    }

    /// Hydrate the session from the secure store. Call once at process
    /// start; returns whether a stored session was found.
    ///
    /// # Errors
    /// Never fails today; store read errors are logged and treated as an
    /// absent session.
    pub async fn initialize(&self) -> Result<bool> {
        let access = self.read_store(ACCESS_TOKEN_KEY).await;
        let refresh = self.read_store(REFRESH_TOKEN_KEY).await;

        let (Some(access_token), Some(refresh_token)) = (access, refresh) else {
            debug!("no stored session found");
            return Ok(false);
        };

        if let Some(raw) = self.read_store(USER_PROFILE_KEY).await {
            match serde_json::from_str::<User>(&raw) {
                Ok(user) => *self.user.write().await = Some(user),
                Err(err) => warn!(error = %err, "stored user profile failed to parse"),
            }
        }

        debug!(token = %mask_token(&access_token), "session restored from secure store");
        *self.credentials.write().await =
            Some(Credentials::new(access_token, refresh_token, None));
        Ok(true)
    }

    /// Whether a session is currently held in memory.
    pub async fn is_authenticated(&self) -> bool {
        self.credentials.read().await.is_some()
    }

    /// Profile captured at login (or restored by [`Self::initialize`]).
    pub async fn current_user(&self) -> Option<User> {
        self.user.read().await.clone()
    }

    /// Authenticate with username/password.
    ///
    /// On success the credential pair and user profile are installed in
    /// memory and mirrored to the secure store. On failure any prior session
    /// is left untouched.
    ///
    /// # Errors
    /// `InvalidCredentials` when the backend rejects the login, `Network` on
    /// transport failure, `Server` on a malformed response.
    pub async fn login(&self, request: &LoginRequest) -> Result<Credentials> {
        let url = self.endpoint("/auth/login");
        let body = serde_json::to_value(request)
            .map_err(|err| ApiError::Validation(format!("unserializable login request: {err}")))?;

        let response = self.http.send(self.http.request(Method::POST, &url).json(&body)).await?;
        let envelope: ApiEnvelope<LoginData> = Self::parse_envelope(response).await?;

        if !envelope.success {
            return Err(ApiError::InvalidCredentials(envelope.failure_message()));
        }
        let data = envelope
            .data
            .ok_or_else(|| ApiError::Server("login response missing data".to_string()))?;

        let credentials = Credentials::new(data.token, data.refresh_token, data.expires_in);
        self.persist_session(&credentials, Some(&data.user)).await;
        *self.credentials.write().await = Some(credentials.clone());
        *self.user.write().await = Some(data.user);

        info!(username = %request.username, "login successful");
        Ok(credentials)
    }

    /// Exchange the refresh token for a new access token.
    ///
    /// On success the new credentials are installed and persisted. On
    /// failure the session is cleared from memory and store: the refresh
    /// token is spent and the caller must re-authenticate.
    ///
    /// # Errors
    /// `SessionExpired` when there is no session or the backend rejects the
    /// refresh; `Network`/`Server` for transport and payload failures (the
    /// session is cleared in those cases too).
    pub async fn refresh(&self) -> Result<Credentials> {
        let _gate = self.refresh_gate.lock().await;
        self.refresh_locked().await
    }

    /// Drop the session locally: memory and secure store. Idempotent and
    /// purely local; never touches the network.
    pub async fn logout(&self) {
        let had_session = self.credentials.read().await.is_some();
        self.clear_session().await;
        if had_session {
            info!("logged out");
        } else {
            debug!("logout with no active session");
        }
    }

    /// Execute an authenticated call against the API.
    ///
    /// Attaches `Authorization: Bearer <token>` when a session exists. A 2xx
    /// envelope with `error.code == "TOKEN_EXPIRED"` triggers exactly one
    /// refresh and one retry of the original request; if the retried call
    /// reports expiry again, `SessionExpired` is surfaced without a second
    /// refresh.
    ///
    /// # Errors
    /// `Network` on transport failure, `Server` for non-2xx or application
    /// failures, `SessionExpired` when the one-shot retry still hits expiry.
    pub async fn authorized_request(
        &self,
        method: Method,
        path: &str,
        body: RequestBody,
    ) -> Result<Value> {
        let seen_token = self.current_access_token().await;
        let envelope = self.execute(method.clone(), path, &body).await?;

        if envelope.success {
            return Ok(envelope.data.unwrap_or(Value::Null));
        }
        if !envelope.is_token_expired() {
            return Err(ApiError::Server(envelope.failure_message()));
        }

        // Expiry signal: one refresh, then one retry.
        let expiry_error = match envelope.error_message() {
            Some(message) => ApiError::SessionExpired(message),
            None => ApiError::session_expired(),
        };
        debug!(path, "access token expired; refreshing");

        if let Err(refresh_err) = self.refresh_after_expiry(seen_token.as_deref()).await {
            // The caller sees the original expiry error; the refresh failure
            // is only logged.
            warn!(path, error = %refresh_err, "refresh after expiry failed");
            return Err(expiry_error);
        }

        let retried = self.execute(method, path, &body).await?;
        if retried.success {
            return Ok(retried.data.unwrap_or(Value::Null));
        }
        if retried.is_token_expired() {
            // One refresh per request. A backend that keeps claiming expiry
            // does not get another.
            warn!(path, "retried request still reports token expiry");
            return Err(ApiError::session_expired());
        }
        Err(ApiError::Server(retried.failure_message()))
    }

    /// GET returning the envelope's `data` deserialized into `T`.
    ///
    /// # Errors
    /// Propagates [`Self::authorized_request`] errors; a `data` payload that
    /// does not match `T` is a `Server` error.
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let value = self.authorized_request(Method::GET, path, RequestBody::Empty).await?;
        Self::from_data(value)
    }

    /// POST with a JSON body, returning the envelope's `data` as `T`.
    ///
    /// # Errors
    /// Propagates [`Self::authorized_request`] errors; serialization
    /// failures are `Validation` errors.
    pub async fn post<B: Serialize, T: DeserializeOwned>(&self, path: &str, body: &B) -> Result<T> {
        let body = serde_json::to_value(body)
            .map_err(|err| ApiError::Validation(format!("unserializable request body: {err}")))?;
        let value = self.authorized_request(Method::POST, path, RequestBody::Json(body)).await?;
        Self::from_data(value)
    }

    async fn refresh_locked(&self) -> Result<Credentials> {
        let Some(current) = self.credentials.read().await.clone() else {
            return Err(ApiError::SessionExpired("no active session".to_string()));
        };

        match self.request_refresh(&current.refresh_token).await {
            Ok(credentials) => {
                self.persist_session(&credentials, None).await;
                *self.credentials.write().await = Some(credentials.clone());
                info!(token = %mask_token(&credentials.access_token), "access token refreshed");
                Ok(credentials)
            }
            Err(err) => {
                warn!(error = %err, "token refresh failed; clearing session");
                self.clear_session().await;
                Err(err)
            }
        }
    }

    /// Single-flight refresh: concurrent expired requests queue on the gate,
    /// and a waiter whose token was already replaced skips the duplicate
    /// refresh and retries with the fresh token.
    async fn refresh_after_expiry(&self, seen_token: Option<&str>) -> Result<Credentials> {
        let _gate = self.refresh_gate.lock().await;
        let current = self.credentials.read().await.clone();
        match current {
            Some(credentials) if Some(credentials.access_token.as_str()) != seen_token => {
                debug!("token already refreshed by a concurrent request");
                Ok(credentials)
            }
            _ => self.refresh_locked().await,
        }
    }

    async fn request_refresh(&self, refresh_token: &str) -> Result<Credentials> {
        let url = self.endpoint("/auth/refresh");
        let body = serde_json::json!({ "refreshToken": refresh_token });

        let response = self.http.send(self.http.request(Method::POST, &url).json(&body)).await?;
        let envelope: ApiEnvelope<RefreshData> = Self::parse_envelope(response).await?;

        if !envelope.success {
            return Err(ApiError::SessionExpired(envelope.failure_message()));
        }
        let data = envelope
            .data
            .ok_or_else(|| ApiError::Server("refresh response missing data".to_string()))?;

        // The refresh token rotates only when the backend sends a new one.
        let refresh_token =
            data.refresh_token.unwrap_or_else(|| refresh_token.to_string());
        Ok(Credentials::new(data.token, refresh_token, data.expires_in))
    }

    async fn execute(
        &self,
        method: Method,
        path: &str,
        body: &RequestBody,
    ) -> Result<ApiEnvelope<Value>> {
        let url = self.endpoint(path);
        let mut builder = self.http.request(method, &url);

        if let Some(token) = self.current_access_token().await {
            builder = builder.bearer_auth(token);
        }

        builder = match body {
            RequestBody::Empty => builder,
            RequestBody::Json(value) => builder.json(value),
            // Content type (with boundary) is left to the multipart encoder.
            RequestBody::Multipart(fields) => builder.multipart(Self::multipart_form(fields)?),
        };

        let response = self.http.send(builder).await?;
        Self::parse_envelope(response).await
    }

    async fn parse_envelope<T: DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<ApiEnvelope<T>> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = if body.is_empty() {
                format!("HTTP {status}")
            } else {
                format!("HTTP {status}: {body}")
            };
            return Err(ApiError::Server(message));
        }

        response
            .json()
            .await
            .map_err(|err| ApiError::Server(format!("malformed response payload: {err}")))
    }

    fn from_data<T: DeserializeOwned>(value: Value) -> Result<T> {
        serde_json::from_value(value)
            .map_err(|err| ApiError::Server(format!("unexpected response shape: {err}")))
    }

    fn multipart_form(fields: &[MultipartField]) -> Result<reqwest::multipart::Form> {
        let mut form = reqwest::multipart::Form::new();
        for field in fields {
            form = match &field.data {
                MultipartData::Text(text) => form.text(field.name.clone(), text.clone()),
                MultipartData::Bytes { content, file_name, mime } => {
                    let part = reqwest::multipart::Part::bytes(content.clone())
                        .file_name(file_name.clone())
                        .mime_str(mime)
                        .map_err(|err| {
                            ApiError::Validation(format!("invalid mime type {mime}: {err}"))
                        })?;
                    form.part(field.name.clone(), part)
                }
            };
        }
        Ok(form)
    }

    async fn current_access_token(&self) -> Option<String> {
        self.credentials.read().await.as_ref().map(|c| c.access_token.clone())
    }

    async fn clear_session(&self) {
        *self.credentials.write().await = None;
        *self.user.write().await = None;
        for key in [ACCESS_TOKEN_KEY, REFRESH_TOKEN_KEY, USER_PROFILE_KEY] {
            if let Err(err) = self.store.delete(key).await {
                warn!(key, error = %err, "secure store delete failed");
            }
        }
    }

    /// Durable mirror of a credential mutation. A store failure must never
    /// crash the caller: log and continue with in-memory state.
    async fn persist_session(&self, credentials: &Credentials, user: Option<&User>) {
        self.write_store(ACCESS_TOKEN_KEY, &credentials.access_token).await;
        self.write_store(REFRESH_TOKEN_KEY, &credentials.refresh_token).await;
        if let Some(user) = user {
            match serde_json::to_string(user) {
                Ok(raw) => self.write_store(USER_PROFILE_KEY, &raw).await,
                Err(err) => warn!(error = %err, "failed to serialize user profile"),
            }
        }
    }

    async fn write_store(&self, key: &str, value: &str) {
        if let Err(err) = self.store.set(key, value).await {
            warn!(key, error = %err, "secure store write failed; keeping in-memory session");
        }
    }

    /// Read a value from the secure store, treating a backend failure as an
    /// absent key: the error is logged and `None` is returned.
    async fn read_store(&self, key: &str) -> Option<String> {
        match self.store.get(key).await {
            Ok(value) => value,
            Err(err) => {
                warn!(key, error = %err, "secure store read failed; treating as absent");
                None
            }
        }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.config.base_url.trim_end_matches('/'), path)
    }
}
