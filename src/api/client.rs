//! Gateway shim: the single function every outbound call goes through.
//!
//! Resolves paths against the configured base URL, attaches the JSON content
//! type and an optional bearer token, parses the body according to its
//! declared content type, and classifies failures into [`ApiError`] variants.

use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Method, StatusCode, Url};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, error};

use crate::config::ClientConfig;
use crate::error::{ApiError, ConfigError};

/// A successfully received response body.
#[derive(Debug, Clone, PartialEq)]
pub enum ResponseBody {
    Json(Value),
    Text(String),
}

impl ResponseBody {
    /// Decode the body into `T`.
    ///
    /// A text body carries no fields, so it decodes as an empty JSON object:
    /// envelope types whose fields are all optional accept it, anything else
    /// is a decode failure.
    pub fn decode<T: DeserializeOwned>(self, path: &str) -> Result<T, ApiError> {
        let value = match self {
            Self::Json(value) => value,
            Self::Text(_) => Value::Object(serde_json::Map::new()),
        };
        serde_json::from_value(value).map_err(|e| ApiError::Decode {
            path: path.to_string(),
            reason: e.to_string(),
        })
    }
}

/// HTTP client bound to one API host.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: Option<Url>,
}

impl ApiClient {
    /// Build a client from configuration. A missing base URL is allowed here;
    /// it surfaces as [`ApiError::NotConfigured`] on the first call.
    pub fn new(config: &ClientConfig) -> Result<Self, ConfigError> {
        let http = reqwest::Client::builder()
            .timeout(config.http_timeout)
            .user_agent(concat!("ezzifly/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ConfigError::InvalidValue {
                key: "http_client".to_string(),
                message: e.to_string(),
            })?;
        Ok(Self::with_http(http, config.api_base_url.clone()))
    }

    /// Wrap an existing `reqwest` client.
    pub fn with_http(http: reqwest::Client, base_url: Option<Url>) -> Self {
        Self { http, base_url }
    }

    pub fn base_url(&self) -> Option<&Url> {
        self.base_url.as_ref()
    }

    /// Resolve `path` against the base URL by plain concatenation, so a base
    /// with a path prefix (`https://host/v1`) keeps it.
    pub fn url_for(&self, path: &str) -> Result<String, ApiError> {
        let base = self.base_url.as_ref().ok_or(ApiError::NotConfigured)?;
        Ok(format!("{}{}", base.as_str().trim_end_matches('/'), path))
    }

    /// Send a request and return the parsed body of a 2xx response.
    pub async fn request<B: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
        token: Option<&str>,
    ) -> Result<ResponseBody, ApiError> {
        let url = self.url_for(path)?;
        debug!(%method, %url, "API call");

        let mut builder = self
            .http
            .request(method.clone(), &url)
            .header(CONTENT_TYPE, "application/json");
        if let Some(token) = token {
            builder = builder.header(AUTHORIZATION, format!("Bearer {token}"));
        }
        if let Some(body) = body {
            builder = builder.json(body);
        }

        let response = builder.send().await.map_err(|e| {
            error!(%method, %url, error = %e, "API request failed");
            ApiError::Connectivity {
                reason: e.to_string(),
            }
        })?;

        let status = response.status();
        let is_json = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|ct| ct.contains("application/json"));

        let text = response.text().await.map_err(|e| {
            error!(%method, %url, error = %e, "Failed to read response body");
            ApiError::Connectivity {
                reason: e.to_string(),
            }
        })?;

        let body = if is_json {
            let value = serde_json::from_str(&text).map_err(|e| ApiError::Decode {
                path: path.to_string(),
                reason: e.to_string(),
            })?;
            ResponseBody::Json(value)
        } else {
            ResponseBody::Text(text)
        };

        if !status.is_success() {
            let message = error_message(&body, status);
            error!(%method, %url, status = status.as_u16(), %message, "API returned an error");
            return Err(ApiError::Application { status, message });
        }

        debug!(%method, %url, status = status.as_u16(), "API call succeeded");
        Ok(body)
    }

    /// `GET` and decode.
    pub async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        token: Option<&str>,
    ) -> Result<T, ApiError> {
        self.request::<()>(Method::GET, path, None, token)
            .await?
            .decode(path)
    }

    /// `POST` a JSON body and decode.
    pub async fn post_json<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
        token: Option<&str>,
    ) -> Result<T, ApiError> {
        self.request(Method::POST, path, Some(body), token)
            .await?
            .decode(path)
    }

    /// `PUT` a JSON body and decode.
    pub async fn put_json<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
        token: Option<&str>,
    ) -> Result<T, ApiError> {
        self.request(Method::PUT, path, Some(body), token)
            .await?
            .decode(path)
    }
}

/// Pick the server-supplied message out of an error body, falling back to a
/// generic status line.
fn error_message(body: &ResponseBody, status: StatusCode) -> String {
    if let ResponseBody::Json(value) = body {
        for field in ["message", "error"] {
            if let Some(msg) = value.get(field).and_then(Value::as_str) {
                if !msg.is_empty() {
                    return msg.to_string();
                }
            }
        }
    }
    format!(
        "API error: {} {}",
        status.as_u16(),
        status.canonical_reason().unwrap_or("")
    )
    .trim_end()
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(base: Option<&str>) -> ApiClient {
        ApiClient::with_http(
            reqwest::Client::new(),
            base.map(|b| Url::parse(b).unwrap()),
        )
    }

    #[test]
    fn url_for_concatenates_onto_base() {
        assert_eq!(
            client(Some("https://api.test/v1")).url_for("/auth/login").unwrap(),
            "https://api.test/v1/auth/login"
        );
        assert_eq!(
            client(Some("http://127.0.0.1:8080")).url_for("/flights/search").unwrap(),
            "http://127.0.0.1:8080/flights/search"
        );
    }

    #[tokio::test]
    async fn missing_base_url_fails_before_io() {
        let err = client(None)
            .get_json::<Value>("/bookings/user", None)
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::NotConfigured));
    }

    #[test]
    fn error_message_prefers_message_then_error() {
        let status = StatusCode::UNAUTHORIZED;
        let body = ResponseBody::Json(serde_json::json!({"message": "Bad password", "error": "x"}));
        assert_eq!(error_message(&body, status), "Bad password");

        let body = ResponseBody::Json(serde_json::json!({"error": "Locked"}));
        assert_eq!(error_message(&body, status), "Locked");

        let body = ResponseBody::Text("nope".into());
        assert_eq!(error_message(&body, status), "API error: 401 Unauthorized");
    }

    #[test]
    fn text_body_decodes_as_empty_object() {
        #[derive(serde::Deserialize)]
        struct Envelope {
            #[serde(default)]
            message: Option<String>,
        }
        let env: Envelope = ResponseBody::Text("OK".into()).decode("/x").unwrap();
        assert!(env.message.is_none());

        let err = ResponseBody::Text("OK".into())
            .decode::<Vec<u8>>("/x")
            .unwrap_err();
        assert!(matches!(err, ApiError::Decode { .. }));
    }
}
