//! Thin async HTTP wrapper around the academia REST backend.
//!
//! Every request carries the bearer token once one is set. Non-2xx answers
//! become an [`ApiError`] chosen by status code, with the server's `message`
//! kept verbatim so the UI can show it. Responses are unwrapped from the
//! backend's `{ "data": ... }` envelope.

use std::sync::RwLock;
use std::time::Duration;

use log::{debug, warn};
use reqwest::{multipart::Form, Client, Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use shared::{ApiErrorBody, ListPage, PaginationInfo};
use thiserror::Error;

use crate::config::ApiConfig;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    #[error("network error: {0}")]
    Network(String),
    #[error("unauthorized: {0}")]
    Unauthorized(String),
    #[error("forbidden: {0}")]
    Forbidden(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("conflict: {0}")]
    Conflict(String),
    #[error("rejected: {0}")]
    UnprocessableEntity(String),
    #[error("server error {status}: {message}")]
    Server { status: u16, message: String },
    #[error("invalid response: {0}")]
    Decode(String),
}

impl ApiError {
    pub fn from_status(status: u16, message: String) -> Self {
        match status {
            401 => ApiError::Unauthorized(message),
            403 => ApiError::Forbidden(message),
            404 => ApiError::NotFound(message),
            409 => ApiError::Conflict(message),
            400 | 422 => ApiError::UnprocessableEntity(message),
            _ => ApiError::Server { status, message },
        }
    }
}

/// The message to surface for an error response body
pub fn error_message(status: u16, body: &str) -> String {
    serde_json::from_str::<ApiErrorBody>(body)
        .ok()
        .and_then(|parsed| parsed.display_message())
        .or_else(|| {
            let trimmed = body.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        })
        .unwrap_or_else(|| format!("request failed with status {}", status))
}

/// Strip the `{ "data": ... }` envelope if present
pub fn unwrap_data(value: Value) -> Value {
    match value {
        Value::Object(mut map) if map.contains_key("data") => map.remove("data").unwrap_or(Value::Null),
        other => other,
    }
}

/// Decode a list response. Accepts `{ data: { <key>: [...], pagination } }`
/// as well as a bare array, with or without the `data` envelope.
pub fn decode_list<T: DeserializeOwned>(value: Value, collection_key: &str) -> Result<ListPage<T>, ApiError> {
    let (items, pagination) = match unwrap_data(value) {
        Value::Array(items) => (Value::Array(items), None),
        Value::Object(mut map) => {
            let items = map
                .remove(collection_key)
                .ok_or_else(|| ApiError::Decode(format!("missing `{}` in list response", collection_key)))?;
            let pagination = match map.remove("pagination") {
                Some(Value::Null) | None => None,
                Some(raw) => Some(
                    serde_json::from_value::<PaginationInfo>(raw)
                        .map_err(|e| ApiError::Decode(format!("invalid pagination: {}", e)))?,
                ),
            };
            (items, pagination)
        }
        other => {
            return Err(ApiError::Decode(format!("expected a list, got {}", other)));
        }
    };

    let items: Vec<T> =
        serde_json::from_value(items).map_err(|e| ApiError::Decode(format!("invalid {}: {}", collection_key, e)))?;
    Ok(ListPage { items, pagination })
}

fn decode<T: DeserializeOwned>(value: Value) -> Result<T, ApiError> {
    serde_json::from_value(unwrap_data(value)).map_err(|e| ApiError::Decode(e.to_string()))
}

pub struct ApiClient {
    base_url: String,
    http: Client,
    token: RwLock<Option<String>>,
}

impl ApiClient {
    pub fn new(config: &ApiConfig) -> Result<Self, ApiError> {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| ApiError::Network(format!("failed to build HTTP client: {}", e)))?;
        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            http,
            token: RwLock::new(None),
        })
    }

    /// Client for another base URL with the default timeout
    pub fn with_base_url(base_url: impl Into<String>) -> Result<Self, ApiError> {
        Self::new(&ApiConfig {
            base_url: base_url.into(),
            ..ApiConfig::default()
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    pub fn set_token(&self, token: String) {
        if let Ok(mut guard) = self.token.write() {
            *guard = Some(token);
        }
    }

    pub fn clear_token(&self) {
        if let Ok(mut guard) = self.token.write() {
            *guard = None;
        }
    }

    pub fn has_token(&self) -> bool {
        self.token.read().map(|t| t.is_some()).unwrap_or(false)
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        debug!("➡️ {} {}", method, path);
        let builder = self.http.request(method, self.url(path));
        match self.token.read().ok().and_then(|t| t.clone()) {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    async fn send(&self, builder: RequestBuilder) -> Result<Response, ApiError> {
        let response = builder.send().await.map_err(|e| ApiError::Network(e.to_string()))?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let message = error_message(status.as_u16(), &body);
        warn!("Request failed with {}: {}", status, message);
        Err(ApiError::from_status(status.as_u16(), message))
    }

    async fn read_json(response: Response) -> Result<Value, ApiError> {
        let text = response.text().await.map_err(|e| ApiError::Network(e.to_string()))?;
        if text.trim().is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_str(&text).map_err(|e| ApiError::Decode(e.to_string()))
    }

    pub async fn get_json<T: DeserializeOwned>(&self, path: &str, query: &[(&str, String)]) -> Result<T, ApiError> {
        let response = self.send(self.request(Method::GET, path).query(query)).await?;
        decode(Self::read_json(response).await?)
    }

    pub async fn get_list<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
        collection_key: &str,
    ) -> Result<ListPage<T>, ApiError> {
        let response = self.send(self.request(Method::GET, path).query(query)).await?;
        decode_list(Self::read_json(response).await?, collection_key)
    }

    async fn with_body<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let response = self.send(self.request(method, path).json(body)).await?;
        decode(Self::read_json(response).await?)
    }

    pub async fn post_json<B: Serialize + ?Sized, T: DeserializeOwned>(&self, path: &str, body: &B) -> Result<T, ApiError> {
        self.with_body(Method::POST, path, body).await
    }

    pub async fn put_json<B: Serialize + ?Sized, T: DeserializeOwned>(&self, path: &str, body: &B) -> Result<T, ApiError> {
        self.with_body(Method::PUT, path, body).await
    }

    pub async fn patch_json<B: Serialize + ?Sized, T: DeserializeOwned>(&self, path: &str, body: &B) -> Result<T, ApiError> {
        self.with_body(Method::PATCH, path, body).await
    }

    pub async fn delete(&self, path: &str) -> Result<(), ApiError> {
        self.send(self.request(Method::DELETE, path)).await?;
        Ok(())
    }

    pub async fn post_multipart<T: DeserializeOwned>(&self, path: &str, form: Form) -> Result<T, ApiError> {
        let response = self.send(self.request(Method::POST, path).multipart(form)).await?;
        decode(Self::read_json(response).await?)
    }
}
