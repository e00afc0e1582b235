//! Single-request dispatcher over reqwest
//!
//! Every REST resource call resolves to exactly one [`RestRequest`] issued by
//! [`RequestDispatcher::dispatch`]. The outcome is normalized to
//! `Ok(RestResponse)` for 2xx, `DispatchError::Status` for any other status,
//! and `DispatchError::Transport` when no response arrived at all.

use crate::error::{DispatchError, Result};
use are_rest_core::config::{validate_base_uri, HttpConfig};
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::Method;
use std::time::Duration;

/// Content type sent when a request does not set one
pub const DEFAULT_CONTENT_TYPE: &str = "text/plain";

pub const MIME_TEXT: &str = "text/plain";
pub const MIME_XML: &str = "text/xml";
pub const MIME_JSON: &str = "application/json";

/// HTTP method for resources the server accepts as either PUT or POST
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum WriteMethod {
    #[default]
    Put,
    Post,
}

impl From<WriteMethod> for Method {
    fn from(method: WriteMethod) -> Self {
        match method {
            WriteMethod::Put => Method::PUT,
            WriteMethod::Post => Method::POST,
        }
    }
}

/// One request relative to the dispatcher's base URI
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RestRequest {
    pub method: Method,
    pub path: String,
    pub body: Option<String>,
    pub content_type: Option<&'static str>,
    pub accept: Option<&'static str>,
}

impl RestRequest {
    pub fn new(method: impl Into<Method>, path: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            path: path.into(),
            body: None,
            content_type: None,
            accept: None,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    /// Attach a body sent with the given content type
    pub fn body(mut self, body: impl Into<String>, content_type: &'static str) -> Self {
        self.body = Some(body.into());
        self.content_type = Some(content_type);
        self
    }

    pub fn accept(mut self, mime: &'static str) -> Self {
        self.accept = Some(mime);
        self
    }
}

/// A 2xx response
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RestResponse {
    /// Response body, verbatim
    pub body: String,
    pub status: u16,
    /// Canonical reason phrase of `status`
    pub status_text: String,
}

/// Issues REST requests against one ARE server
#[derive(Debug, Clone)]
pub struct RequestDispatcher {
    base_uri: String,
    client: reqwest::Client,
}

impl RequestDispatcher {
    /// Create a dispatcher for `base_uri` with a whole-request timeout
    ///
    /// # Errors
    ///
    /// * `Error::Core(Config)` - base URI is empty or not http(s)
    /// * `Error::Client` - the HTTP client could not be built
    pub fn new(base_uri: impl Into<String>, timeout: Duration) -> Result<Self> {
        let base_uri = base_uri.into();
        validate_base_uri(&base_uri)?;

        let client = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self { base_uri, client })
    }

    pub fn from_config(base_uri: impl Into<String>, config: &HttpConfig) -> Result<Self> {
        Self::new(base_uri, config.timeout())
    }

    pub fn base_uri(&self) -> &str {
        &self.base_uri
    }

    /// Absolute URL of `path`
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_uri, path)
    }

    /// Issue `request` and normalize its outcome
    pub async fn dispatch(
        &self,
        request: RestRequest,
    ) -> std::result::Result<RestResponse, DispatchError> {
        let url = self.url(&request.path);
        tracing::debug!(method = %request.method, url = %url, "Dispatching request");

        let mut builder = self.client.request(request.method.clone(), &url).header(
            CONTENT_TYPE,
            request.content_type.unwrap_or(DEFAULT_CONTENT_TYPE),
        );
        if let Some(accept) = request.accept {
            builder = builder.header(ACCEPT, accept);
        }
        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        let response = builder.send().await.map_err(|e| {
            tracing::warn!(method = %request.method, url = %url, error = %e, "Request failed without a response");
            DispatchError::Transport {
                message: e.to_string(),
            }
        })?;

        let status = response.status();
        let status_text = status.canonical_reason().unwrap_or_default().to_string();
        if status.is_success() {
            let body = response
                .text()
                .await
                .map_err(|e| DispatchError::Transport {
                    message: e.to_string(),
                })?;
            tracing::debug!(url = %url, status = status.as_u16(), "Request succeeded");
            Ok(RestResponse {
                body,
                status: status.as_u16(),
                status_text,
            })
        } else {
            // The status is the error; a body that fails to arrive stays empty
            let body = response.text().await.unwrap_or_else(|e| {
                tracing::debug!(url = %url, error = %e, "Error response body unreadable");
                String::new()
            });
            tracing::warn!(url = %url, status = status.as_u16(), status_text = %status_text, "Request rejected");
            Err(DispatchError::Status {
                status: status.as_u16(),
                status_text,
                body,
            })
        }
    }
}
