use http::{header, Method, StatusCode};
use isahc::{
    config::{Configurable as _, RedirectPolicy},
    AsyncReadResponseExt as _, HttpClient, Request,
};
use storyadmin_common::utils::USER_AGENT;

use crate::{error::TransportError, media::Multipart};

#[derive(Clone, Debug, PartialEq)]
pub enum Body {
    Empty,
    Json(serde_json::Value),
    Multipart(Multipart),
}

impl Body {
    /// Content type and raw bytes as they go on the wire.
    pub fn encode(&self) -> Result<(Option<String>, Vec<u8>), TransportError> {
        match self {
            Body::Empty => Ok((None, Vec::new())),
            Body::Json(value) => {
                let bytes = serde_json::to_vec(value)
                    .map_err(|err| TransportError::new(err.to_string()))?;

                Ok((Some("application/json".into()), bytes))
            }
            Body::Multipart(form) => Ok((Some(form.content_type()), form.to_bytes())),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct ApiRequest {
    pub method: Method,
    /// Path and query below the backend base url, always starting with `/`
    pub path: String,
    /// Absolute url, filled in by the pipeline
    pub url: String,
    pub bearer: Option<String>,
    pub body: Body,
}

impl ApiRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            url: String::new(),
            bearer: None,
            body: Body::Empty,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::PUT, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    pub fn json(mut self, value: serde_json::Value) -> Self {
        self.body = Body::Json(value);
        self
    }

    pub fn multipart(mut self, form: Multipart) -> Self {
        self.body = Body::Multipart(form);
        self
    }

    /// The path without its query string.
    pub fn route(&self) -> &str {
        self.path.split('?').next().unwrap_or(&self.path)
    }

    pub fn query(&self) -> Option<&str> {
        self.path.split_once('?').map(|(_, query)| query)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct ApiResponse {
    pub status: StatusCode,
    pub body: String,
}

/// Moves one request to the backend and brings back whatever it answered.
///
/// Implementations must not interpret the status code, that is the job of the
/// pipeline.
#[async_trait::async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, TransportError>;
}

pub struct IsahcTransport {
    client: HttpClient,
}

impl IsahcTransport {
    pub fn new() -> Result<Self, TransportError> {
        let client = HttpClient::builder()
            .default_header("User-Agent", USER_AGENT)
            .redirect_policy(RedirectPolicy::Follow)
            .build()?;

        Ok(Self { client })
    }
}

#[async_trait::async_trait]
impl Transport for IsahcTransport {
    #[tracing::instrument(skip(self, request), fields(method = %request.method, url = %request.url), err)]
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, TransportError> {
        tracing::debug!("sending");

        let (content_type, bytes) = request.body.encode()?;

        let mut builder = Request::builder()
            .method(request.method.clone())
            .uri(request.url.as_str());

        if let Some(token) = &request.bearer {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }

        if let Some(content_type) = content_type {
            builder = builder.header(header::CONTENT_TYPE, content_type);
        }

        let req = builder.body(bytes)?;

        let mut res = self.client.send_async(req).await?;

        let status = res.status();
        let body = res.text().await?;

        tracing::debug!(status = %status, "received");

        Ok(ApiResponse { status, body })
    }
}
