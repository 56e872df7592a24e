//! reqwest-backed transport for the storefront REST surface.

use async_trait::async_trait;
use reqwest::multipart;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, error};

use vista_core::{
    ApiRequest, ApiResponse, Body, CoreError, CoreResult, FormPart, Method, RestTransport,
};

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("HTTP client error: {0}")]
    Client(#[from] reqwest::Error),

    #[error("Invalid file part {name}: {source}")]
    FilePart {
        name: String,
        #[source]
        source: reqwest::Error,
    },
}

impl From<StoreError> for CoreError {
    fn from(err: StoreError) -> Self {
        CoreError::Transport(err.to_string())
    }
}

#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    base_url: String,
}

impl HttpTransport {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, StoreError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Relative paths hang off the base URL; absolute URLs pass through.
    fn url(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            path.to_string()
        } else {
            format!("{}/{}", self.base_url, path.trim_start_matches('/'))
        }
    }

    fn multipart(parts: Vec<FormPart>) -> Result<multipart::Form, StoreError> {
        let mut form = multipart::Form::new();
        for part in parts {
            form = match part {
                FormPart::Text { name, value } => form.text(name, value),
                FormPart::File { name, file_name, bytes } => {
                    let file = multipart::Part::bytes(bytes)
                        .file_name(file_name)
                        .mime_str("application/octet-stream")
                        .map_err(|source| StoreError::FilePart {
                            name: name.clone(),
                            source,
                        })?;
                    form.part(name, file)
                }
            };
        }
        Ok(form)
    }

    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, StoreError> {
        let url = self.url(&request.path);
        debug!("{} {}", request.method, request.target());

        let mut builder = match request.method {
            Method::Get => self.client.get(&url),
            Method::Post => self.client.post(&url),
            Method::Put => self.client.put(&url),
            Method::Delete => self.client.delete(&url),
        };
        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        builder = match request.body {
            Some(Body::Json(json)) => builder.json(&json),
            Some(Body::Multipart(parts)) => builder.multipart(Self::multipart(parts)?),
            None => builder,
        };

        let response = builder.send().await?;
        let status = response.status().as_u16();
        let text = response.text().await?;
        debug!("API response ({}): {}", status, text);

        // Error pages from proxies are HTML; keep the status and drop the body.
        let body = serde_json::from_str::<Value>(&text).unwrap_or(Value::Null);
        Ok(ApiResponse::new(status, body))
    }
}

#[async_trait]
impl RestTransport for HttpTransport {
    async fn execute(&self, request: ApiRequest) -> CoreResult<ApiResponse> {
        let target = format!("{} {}", request.method, request.target());
        self.send(request).await.map_err(|err| {
            error!("{} failed: {}", target, err);
            CoreError::from(err)
        })
    }
}
