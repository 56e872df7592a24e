use async_trait::async_trait;
use serde_json::Value;
use std::fmt;
use vista_shared::ApiReply;

use crate::CoreResult;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Delete => "DELETE",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One part of a `multipart/form-data` body.
#[derive(Debug, Clone, PartialEq)]
pub enum FormPart {
    Text { name: String, value: String },
    File { name: String, file_name: String, bytes: Vec<u8> },
}

#[derive(Debug, Clone, PartialEq)]
pub enum Body {
    Json(Value),
    Multipart(Vec<FormPart>),
}

/// A request against the storefront REST surface.
///
/// `path` is either relative to the transport's base URL (`/api/venues`) or
/// an absolute URL, which the vendor module uses for its own backend.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub method: Method,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub body: Option<Body>,
}

impl ApiRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            body: None,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::Get, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::Delete, path)
    }

    pub fn with_query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    pub fn with_body(mut self, body: Body) -> Self {
        self.body = Some(body);
        self
    }

    pub fn with_json(self, body: Value) -> Self {
        self.with_body(Body::Json(body))
    }

    /// Path plus encoded query string, as it appears in logs.
    pub fn target(&self) -> String {
        if self.query.is_empty() {
            return self.path.clone();
        }
        // Same encoding reqwest applies to `RequestBuilder::query`.
        let query = serde_urlencoded::to_string(&self.query).unwrap_or_default();
        format!("{}?{}", self.path, query)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    pub status: u16,
    pub body: Value,
}

impl ApiResponse {
    pub fn new(status: u16, body: Value) -> Self {
        Self { status, body }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn reply(&self) -> ApiReply {
        ApiReply::from_value(&self.body)
    }
}

/// Port to the remote backend. The remote collection is the only source of truth.
///
/// Implementations return non-2xx responses as `Ok`; only failures to obtain a
/// response at all are errors.
#[async_trait]
pub trait RestTransport: Send + Sync {
    async fn execute(&self, request: ApiRequest) -> CoreResult<ApiResponse>;
}
