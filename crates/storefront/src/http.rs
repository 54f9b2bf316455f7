//! Request description and response decoding shared by every endpoint.
//!
//! An [`ApiRequest`] is a plain value rather than a `reqwest::RequestBuilder`
//! so it can be turned into a fresh HTTP request more than once. The
//! session client relies on that to replay a request after refreshing the
//! access token, multipart uploads included.

use reqwest::multipart::{Form, Part};
use reqwest::{Method, RequestBuilder, Response};
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use url::Url;

use crate::error::{ApiError, Result};

/// Fallback message when an auth endpoint's error body is not JSON.
const AUTH_FALLBACK: &str = "Request failed";

/// Longest slice of a response body copied into logs.
const LOG_BODY_LIMIT: usize = 500;

/// A request against the REST API, relative to the configured base URL.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    method: Method,
    path: String,
    query: Vec<(String, String)>,
    body: RequestBody,
}

/// Request payload.
#[derive(Debug, Clone, Default)]
pub enum RequestBody {
    #[default]
    Empty,
    Json(Value),
    Multipart(Vec<FormField>),
}

/// One field of a multipart form.
#[derive(Debug, Clone)]
pub enum FormField {
    Text {
        name: String,
        value: String,
    },
    File {
        name: String,
        file_name: String,
        content_type: Option<String>,
        bytes: Vec<u8>,
    },
}

impl FormField {
    /// Plain text field.
    #[must_use]
    pub fn text(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self::Text {
            name: name.into(),
            value: value.into(),
        }
    }

    /// Name of the form field.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Text { name, .. } | Self::File { name, .. } => name,
        }
    }
}

impl ApiRequest {
    /// Request with no body.
    #[must_use]
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            body: RequestBody::Empty,
        }
    }

    #[must_use]
    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    #[must_use]
    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    #[must_use]
    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::PUT, path)
    }

    #[must_use]
    pub fn patch(path: impl Into<String>) -> Self {
        Self::new(Method::PATCH, path)
    }

    #[must_use]
    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    /// Append a query-string parameter.
    #[must_use]
    pub fn query(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.query.push((key.into(), value.to_string()));
        self
    }

    /// Attach a JSON body.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Parse` if `body` cannot be serialized.
    pub fn json<T: Serialize + ?Sized>(mut self, body: &T) -> Result<Self> {
        self.body = RequestBody::Json(serde_json::to_value(body)?);
        Ok(self)
    }

    /// Attach a multipart form body.
    #[must_use]
    pub fn multipart(mut self, fields: Vec<FormField>) -> Self {
        self.body = RequestBody::Multipart(fields);
        self
    }

    #[must_use]
    pub const fn method(&self) -> &Method {
        &self.method
    }

    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    #[must_use]
    pub const fn body(&self) -> &RequestBody {
        &self.body
    }

    /// Resolve the request URL against `base`, query string included.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::InvalidUrl` if the path cannot be joined.
    pub fn url(&self, base: &Url) -> Result<Url> {
        let mut url = base.join(&self.path)?;
        if !self.query.is_empty() {
            url.query_pairs_mut().extend_pairs(&self.query);
        }
        Ok(url)
    }

    /// Build a fresh `reqwest` request, optionally carrying a bearer token.
    pub(crate) fn build(
        &self,
        http: &reqwest::Client,
        base: &Url,
        bearer: Option<&SecretString>,
    ) -> Result<RequestBuilder> {
        let mut builder = http.request(self.method.clone(), self.url(base)?);
        if let Some(token) = bearer {
            builder = builder.bearer_auth(token.expose_secret());
        }
        Ok(match &self.body {
            RequestBody::Empty => builder,
            RequestBody::Json(value) => builder.json(value),
            RequestBody::Multipart(fields) => builder.multipart(build_form(fields)?),
        })
    }
}

fn build_form(fields: &[FormField]) -> Result<Form> {
    let mut form = Form::new();
    for field in fields {
        form = match field {
            FormField::Text { name, value } => form.text(name.clone(), value.clone()),
            FormField::File {
                name,
                file_name,
                content_type,
                bytes,
            } => {
                let mut part = Part::bytes(bytes.clone()).file_name(file_name.clone());
                if let Some(mime) = content_type {
                    part = part.mime_str(mime)?;
                }
                form.part(name.clone(), part)
            }
        };
    }
    Ok(form)
}

// =============================================================================
// Response decoding
// =============================================================================

/// Pass a 2xx response through; turn anything else into `RequestFailed`.
pub(crate) async fn ensure_success(response: Response, fallback: &str) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    tracing::debug!(
        status = %status,
        body = %truncate(&body),
        "API returned non-success status"
    );
    Err(ApiError::RequestFailed {
        status,
        message: failure_message(&body, fallback),
    })
}

/// Decode a successful JSON response.
pub(crate) async fn read_json<T: DeserializeOwned>(response: Response, fallback: &str) -> Result<T> {
    let response = ensure_success(response, fallback).await?;
    let text = response.text().await?;
    Ok(serde_json::from_str(&text)?)
}

/// Decode a successful list response, refusing anything but a JSON array.
pub(crate) async fn read_list<T: DeserializeOwned>(
    response: Response,
    endpoint: &str,
    fallback: &str,
) -> Result<Vec<T>> {
    let response = ensure_success(response, fallback).await?;
    let text = response.text().await?;
    let value: Value = serde_json::from_str(&text)?;
    if !value.is_array() {
        tracing::error!(
            endpoint,
            payload = %truncate(&text),
            "Expected array from list endpoint"
        );
        return Err(ApiError::UnexpectedPayload(endpoint.to_string()));
    }
    Ok(serde_json::from_value(value)?)
}

/// Message for a failed API call: the JSON `detail`, `error` or `message`
/// field, else the raw body, else `fallback`.
pub(crate) fn failure_message(body: &str, fallback: &str) -> String {
    if let Ok(Value::Object(map)) = serde_json::from_str::<Value>(body) {
        for key in ["detail", "error", "message"] {
            if let Some(Value::String(text)) = map.get(key)
                && !text.is_empty()
            {
                return text.clone();
            }
        }
    }
    let trimmed = body.trim();
    if trimmed.is_empty() {
        fallback.to_string()
    } else {
        trimmed.to_string()
    }
}

/// Message for a failed auth call: the JSON `detail` field, else the whole
/// JSON body, else a generic fallback.
pub(crate) fn auth_failure_message(body: &str) -> String {
    match serde_json::from_str::<Value>(body) {
        Ok(Value::Object(map)) => {
            if let Some(Value::String(detail)) = map.get("detail")
                && !detail.is_empty()
            {
                return detail.clone();
            }
            Value::Object(map).to_string()
        }
        Ok(other) => other.to_string(),
        Err(_) => AUTH_FALLBACK.to_string(),
    }
}

fn truncate(body: &str) -> String {
    body.chars().take(LOG_BODY_LIMIT).collect()
}
