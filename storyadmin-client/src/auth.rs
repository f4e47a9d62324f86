use serde_json::json;

use crate::{error::ApiError, pipeline::Pipeline, transport::ApiRequest};

#[derive(serde::Deserialize)]
struct LoginReply {
    error: bool,
    #[serde(default)]
    token: Option<String>,
}

#[derive(Clone, Debug)]
pub struct AuthClient {
    pipeline: Pipeline,
}

impl AuthClient {
    pub fn new(pipeline: Pipeline) -> Self {
        Self { pipeline }
    }

    /// Exchanges credentials for a token and starts the session with it.
    #[tracing::instrument(skip(self, password), err)]
    pub async fn login(&self, username: &str, password: &str) -> Result<(), ApiError> {
        if username.trim().is_empty() || password.is_empty() {
            return Err(ApiError::Validation("username and password are required".into()));
        }

        let request = ApiRequest::post("/beapi/admin_auth/login")
            .json(json!({ "username": username, "password": password }));

        let reply: LoginReply = self.pipeline.json(request).await?;

        match reply {
            LoginReply {
                error: false,
                token: Some(token),
            } if !token.is_empty() => self.pipeline.session().login(token),
            _ => {
                tracing::warn!("backend refused the credentials");

                Err(ApiError::LoginRejected)
            }
        }
    }

    pub fn logout(&self) -> Result<(), ApiError> {
        self.pipeline.session().logout()
    }
}
