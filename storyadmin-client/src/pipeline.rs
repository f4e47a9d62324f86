use std::sync::Arc;

use http::StatusCode;
use serde::de::DeserializeOwned;
use storyadmin_common::Uri;

use crate::{
    error::ApiError,
    session::Session,
    transport::{ApiRequest, ApiResponse, Transport},
};

/// `{data: ...}`, the wrapper every backend answer comes in
#[derive(Debug, serde::Deserialize)]
pub struct Envelope<T> {
    pub data: T,
}

/// Shared request path of every client: resolves the url, attaches the bearer
/// credential and turns statuses into errors.
#[derive(Clone)]
pub struct Pipeline {
    base_url: Arc<str>,
    transport: Arc<dyn Transport>,
    session: Session,
}

impl Pipeline {
    pub fn new(
        base_url: &str,
        transport: Arc<dyn Transport>,
        session: Session,
    ) -> Result<Self, ApiError> {
        let base_url = base_url.trim().trim_end_matches('/');

        let uri = Uri::try_from(base_url)
            .map_err(|err| ApiError::Validation(format!("base url `{}`: {}", base_url, err)))?;
        if uri.scheme().is_none() || uri.host().is_none() {
            return Err(ApiError::Validation(format!(
                "base url `{}` needs a scheme and a host",
                base_url
            )));
        }

        Ok(Self {
            base_url: base_url.into(),
            transport,
            session,
        })
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    #[tracing::instrument(skip(self, request), fields(method = %request.method, path = %request.path), err)]
    pub async fn send(&self, mut request: ApiRequest) -> Result<ApiResponse, ApiError> {
        request.url = format!("{}{}", self.base_url, request.path);
        request.bearer = self.session.token();

        let response = self.transport.send(request).await.map_err(|err| {
            tracing::error!(err = %err, "request did not complete");

            ApiError::Transport(err)
        })?;

        if response.status == StatusCode::UNAUTHORIZED {
            self.session.on_unauthorized();

            return Err(ApiError::Unauthorized);
        }

        if !response.status.is_success() {
            tracing::error!(status = %response.status, body = %response.body, "backend refused request");

            return Err(ApiError::Server {
                status: response.status,
                body: response.body,
            });
        }

        Ok(response)
    }

    /// Sends and decodes the whole body.
    pub async fn json<T>(&self, request: ApiRequest) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
    {
        let response = self.send(request).await?;

        serde_json::from_str(&response.body).map_err(|err| {
            tracing::error!(err = %err, "unable to decode response");

            ApiError::decode(err)
        })
    }

    /// Sends and decodes the `data` member of the envelope.
    pub async fn data<T>(&self, request: ApiRequest) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
    {
        let envelope: Envelope<T> = self.json(request).await?;

        Ok(envelope.data)
    }
}

impl std::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field("base_url", &self.base_url)
            .field("session", &self.session)
            .finish()
    }
}
