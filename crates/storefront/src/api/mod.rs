//! REST clients for the BuildHive backend API.
//!
//! # Architecture
//!
//! - The backend wraps responses in an envelope:
//!   `{"success": bool, "data": ..., "message": ..., "error": ..., "errors": ...}`.
//!   [`ApiClient`] unwraps the envelope so resource clients work with the
//!   payload directly.
//! - Every resource client is a thin `Clone` handle over a shared
//!   [`ApiClient`]; the bearer token lives in the client so all of them see
//!   a sign-in or sign-out at once.
//! - A 401 from any endpoint invokes the registered unauthorized hook
//!   (installed by the session manager) before surfacing
//!   [`ApiError::Unauthorized`].

pub mod addresses;
pub mod auth;
pub mod cart;
pub mod categories;
pub mod orders;
pub mod payments;
pub mod products;

pub use addresses::AddressApi;
pub use auth::{AuthApi, AuthPayload};
pub use cart::CartApi;
pub use categories::CategoryApi;
pub use orders::{OrderApi, OrderListQuery};
pub use payments::PaymentApi;
pub use products::{ProductApi, ProductQuery};

use std::sync::{Arc, RwLock};
use std::time::Duration;

use reqwest::StatusCode;
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, error};
use url::Url;

/// Errors that can occur when calling the backend API.
#[derive(Debug, Error)]
pub enum ApiError {
    /// HTTP request failed (connection, timeout, etc).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The backend rejected the request with an error envelope.
    #[error("API error ({status}): {}", message.as_deref().unwrap_or("(no message)"))]
    Api {
        status: u16,
        message: Option<String>,
        field_errors: Vec<FieldError>,
    },

    /// Authentication is missing or expired.
    #[error("Unauthorized")]
    Unauthorized,

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// The response body did not have the expected shape.
    #[error("Malformed response: {0}")]
    Malformed(String),
}

impl ApiError {
    /// The most useful human-readable message for this error.
    ///
    /// Prefers joined per-field validation messages, then the server's
    /// top-level message, then the caller's fallback.
    #[must_use]
    pub fn most_specific_message(&self, fallback: &str) -> String {
        if let Self::Api {
            message,
            field_errors,
            ..
        } = self
        {
            let joined = field_errors
                .iter()
                .filter_map(FieldError::display_message)
                .collect::<Vec<_>>()
                .join(", ");
            if !joined.is_empty() {
                return joined;
            }
            if let Some(msg) = message
                && !msg.is_empty()
            {
                return msg.clone();
            }
        }
        fallback.to_string()
    }
}

/// One entry of the backend's `errors` array.
///
/// Validation middleware spells the field key as `field`, `param`, or
/// `path` depending on the endpoint, and sometimes sends bare strings.
#[derive(Debug, Clone, serde::Deserialize)]
pub struct FieldError {
    #[serde(default, alias = "param", alias = "path")]
    pub field: Option<String>,
    #[serde(default, alias = "msg")]
    pub message: Option<String>,
}

impl FieldError {
    fn display_message(&self) -> Option<String> {
        self.message.as_ref().map(|msg| {
            self.field
                .as_ref()
                .map_or_else(|| msg.clone(), |f| format!("{f}: {msg}"))
        })
    }
}

// =============================================================================
// ApiClient
// =============================================================================

/// Shared HTTP client for the backend REST API.
///
/// Cheap to clone; all clones share the bearer token and unauthorized hook.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ApiClientInner>,
}

type UnauthorizedHook = Box<dyn Fn() + Send + Sync>;

struct ApiClientInner {
    client: reqwest::Client,
    base_url: Url,
    token: RwLock<Option<SecretString>>,
    unauthorized_hook: RwLock<Option<UnauthorizedHook>>,
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.inner.base_url.as_str())
            .field("token", &"[REDACTED]")
            .finish_non_exhaustive()
    }
}

impl ApiClient {
    /// Create a new client for the given base URL.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client cannot be built.
    pub fn new(mut base_url: Url, timeout: Duration) -> Result<Self, ApiError> {
        // Url::join treats "/api" and "/api/" differently; normalize so
        // endpoint paths always append.
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            inner: Arc::new(ApiClientInner {
                client,
                base_url,
                token: RwLock::new(None),
                unauthorized_hook: RwLock::new(None),
            }),
        })
    }

    /// Install the bearer token used for subsequent requests.
    pub fn set_token(&self, token: SecretString) {
        if let Ok(mut guard) = self.inner.token.write() {
            *guard = Some(token);
        }
    }

    /// Drop the bearer token.
    pub fn clear_token(&self) {
        if let Ok(mut guard) = self.inner.token.write() {
            *guard = None;
        }
    }

    /// Whether a bearer token is currently installed.
    #[must_use]
    pub fn has_token(&self) -> bool {
        self.inner
            .token
            .read()
            .map(|guard| guard.is_some())
            .unwrap_or(false)
    }

    /// Register the callback invoked when any request comes back 401.
    pub fn set_unauthorized_hook(&self, hook: impl Fn() + Send + Sync + 'static) {
        if let Ok(mut guard) = self.inner.unauthorized_hook.write() {
            *guard = Some(Box::new(hook));
        }
    }

    fn endpoint(&self, path: &str) -> Result<Url, ApiError> {
        self.inner
            .base_url
            .join(path.trim_start_matches('/'))
            .map_err(|e| ApiError::Malformed(format!("invalid endpoint path {path}: {e}")))
    }

    fn apply_auth(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        let token = self
            .inner
            .token
            .read()
            .ok()
            .and_then(|guard| guard.as_ref().map(|t| t.expose_secret().to_string()));
        match token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    /// GET a path and deserialize the unwrapped payload.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails, the backend returns an error
    /// envelope, or the payload does not deserialize.
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let value = self.get_value(path).await?;
        Ok(serde_json::from_value(value)?)
    }

    /// GET a path with query parameters.
    ///
    /// # Errors
    ///
    /// Same failure modes as [`Self::get`].
    pub async fn get_with_query<T: DeserializeOwned, Q: Serialize + ?Sized>(
        &self,
        path: &str,
        query: &Q,
    ) -> Result<T, ApiError> {
        let url = self.endpoint(path)?;
        let request = self.apply_auth(self.inner.client.get(url).query(query));
        let value = self.execute(request).await?;
        Ok(serde_json::from_value(value)?)
    }

    /// GET a path and return the unwrapped payload as raw JSON.
    ///
    /// For endpoints whose shape varies; callers normalize themselves.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the backend returns an
    /// error envelope.
    pub async fn get_value(&self, path: &str) -> Result<Value, ApiError> {
        let url = self.endpoint(path)?;
        let request = self.apply_auth(self.inner.client.get(url));
        self.execute(request).await
    }

    /// POST a JSON body and deserialize the unwrapped payload.
    ///
    /// # Errors
    ///
    /// Same failure modes as [`Self::get`].
    pub async fn post<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let value = self.post_value(path, body).await?;
        Ok(serde_json::from_value(value)?)
    }

    /// POST a JSON body and return the unwrapped payload as raw JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the backend returns an
    /// error envelope.
    pub async fn post_value<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<Value, ApiError> {
        let url = self.endpoint(path)?;
        let request = self.apply_auth(self.inner.client.post(url).json(body));
        self.execute(request).await
    }

    /// PUT a JSON body and deserialize the unwrapped payload.
    ///
    /// # Errors
    ///
    /// Same failure modes as [`Self::get`].
    pub async fn put<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let url = self.endpoint(path)?;
        let request = self.apply_auth(self.inner.client.put(url).json(body));
        let value = self.execute(request).await?;
        Ok(serde_json::from_value(value)?)
    }

    /// PUT a JSON body and return the unwrapped payload as raw JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the backend returns an
    /// error envelope.
    pub async fn put_value<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<Value, ApiError> {
        let url = self.endpoint(path)?;
        let request = self.apply_auth(self.inner.client.put(url).json(body));
        self.execute(request).await
    }

    /// DELETE a path, discarding any payload.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the backend returns an
    /// error envelope.
    pub async fn delete(&self, path: &str) -> Result<(), ApiError> {
        let url = self.endpoint(path)?;
        let request = self.apply_auth(self.inner.client.delete(url));
        self.execute(request).await?;
        Ok(())
    }

    /// Send a request, unwrap the envelope, and map error responses.
    async fn execute(&self, request: reqwest::RequestBuilder) -> Result<Value, ApiError> {
        let response = request.send().await?;
        let status = response.status();

        if status == StatusCode::UNAUTHORIZED {
            debug!("request returned 401, invoking unauthorized hook");
            if let Ok(guard) = self.inner.unauthorized_hook.read()
                && let Some(hook) = guard.as_ref()
            {
                hook();
            }
            return Err(ApiError::Unauthorized);
        }

        let body = response.text().await?;

        if !status.is_success() {
            return Err(parse_error_body(status.as_u16(), &body));
        }

        if body.trim().is_empty() {
            return Ok(Value::Null);
        }

        let value: Value = match serde_json::from_str(&body) {
            Ok(v) => v,
            Err(e) => {
                error!(
                    error = %e,
                    body = %body.chars().take(500).collect::<String>(),
                    "failed to parse API response body"
                );
                return Err(ApiError::Parse(e));
            }
        };

        Ok(unwrap_envelope(value))
    }
}

/// Pull `data` out of the success envelope; pass other shapes through.
fn unwrap_envelope(value: Value) -> Value {
    match value {
        Value::Object(mut map) if map.contains_key("data") => {
            map.remove("data").unwrap_or(Value::Null)
        }
        other => other,
    }
}

/// Build an [`ApiError::Api`] from an error response body.
///
/// Tolerates the backend's three error spellings: a `message` or `error`
/// string, an `errors` array of objects, and an `errors` array of bare
/// strings.
fn parse_error_body(status: u16, body: &str) -> ApiError {
    let Ok(value) = serde_json::from_str::<Value>(body) else {
        return ApiError::Api {
            status,
            message: (!body.trim().is_empty()).then(|| body.chars().take(200).collect()),
            field_errors: Vec::new(),
        };
    };

    let message = value
        .get("message")
        .or_else(|| value.get("error"))
        .and_then(Value::as_str)
        .map(str::to_string);

    let field_errors = match value.get("errors") {
        Some(Value::Array(entries)) => entries
            .iter()
            .filter_map(|entry| match entry {
                Value::String(s) => Some(FieldError {
                    field: None,
                    message: Some(s.clone()),
                }),
                Value::Object(_) => serde_json::from_value(entry.clone()).ok(),
                _ => None,
            })
            .collect(),
        Some(Value::String(s)) => vec![FieldError {
            field: None,
            message: Some(s.clone()),
        }],
        _ => Vec::new(),
    };

    ApiError::Api {
        status,
        message,
        field_errors,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_unwrap_envelope_extracts_data() {
        let value = json!({"success": true, "data": {"id": "p-1"}, "message": "ok"});
        assert_eq!(unwrap_envelope(value), json!({"id": "p-1"}));
    }

    #[test]
    fn test_unwrap_envelope_passes_bare_payload_through() {
        let value = json!([{"id": "p-1"}]);
        assert_eq!(unwrap_envelope(value.clone()), value);
    }

    #[test]
    fn test_parse_error_body_field_errors() {
        let body = r#"{"success": false, "errors": [
            {"param": "email", "msg": "must be a valid email"},
            {"field": "password", "message": "too short"}
        ]}"#;
        let err = parse_error_body(400, body);
        assert_eq!(
            err.most_specific_message("fallback"),
            "email: must be a valid email, password: too short"
        );
    }

    #[test]
    fn test_parse_error_body_bare_string_errors() {
        let body = r#"{"errors": ["quantity exceeds stock"]}"#;
        let err = parse_error_body(400, body);
        assert_eq!(
            err.most_specific_message("fallback"),
            "quantity exceeds stock"
        );
    }

    #[test]
    fn test_most_specific_message_falls_through_to_server_message() {
        let err = parse_error_body(409, r#"{"message": "Product out of stock"}"#);
        assert_eq!(
            err.most_specific_message("fallback"),
            "Product out of stock"
        );
    }

    #[test]
    fn test_most_specific_message_fallback_for_non_api_errors() {
        let err = ApiError::Unauthorized;
        assert_eq!(err.most_specific_message("Please sign in"), "Please sign in");
    }

    #[test]
    fn test_parse_error_body_non_json() {
        let err = parse_error_body(502, "<html>Bad Gateway</html>");
        match err {
            ApiError::Api { status, message, .. } => {
                assert_eq!(status, 502);
                assert_eq!(message.as_deref(), Some("<html>Bad Gateway</html>"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
