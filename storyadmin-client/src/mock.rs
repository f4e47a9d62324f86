//! In-memory stand-in for the backend, used by tests across the workspace.

use std::{
    collections::VecDeque,
    sync::{Arc, Mutex},
    time::Duration,
};

use http::{Method, StatusCode};

use crate::{
    error::TransportError,
    transport::{ApiRequest, ApiResponse, Transport},
};

#[derive(Clone, Debug)]
pub enum Reply {
    Answer(StatusCode, serde_json::Value),
    Fail(String),
    Delayed(Duration, Box<Reply>),
}

impl Reply {
    pub fn json(value: serde_json::Value) -> Self {
        Reply::Answer(StatusCode::OK, value)
    }

    pub fn status(code: u16, value: serde_json::Value) -> Self {
        Reply::Answer(
            StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
            value,
        )
    }

    pub fn fail(message: &str) -> Self {
        Reply::Fail(message.to_string())
    }

    pub fn after(self, millis: u64) -> Self {
        Reply::Delayed(Duration::from_millis(millis), Box::new(self))
    }
}

#[derive(Default)]
struct State {
    routes: VecDeque<(Method, String, Reply)>,
    requests: Vec<ApiRequest>,
}

/// Answers each request with the first queued reply registered for its
/// method and route, every reply is used once.
#[derive(Clone, Default)]
pub struct MockTransport {
    state: Arc<Mutex<State>>,
}

impl MockTransport {
    pub fn on(&self, method: Method, route: &str, reply: Reply) -> &Self {
        self.lock().routes.push_back((method, route.to_string(), reply));
        self
    }

    /// Every request seen so far, in arrival order.
    pub fn requests(&self) -> Vec<ApiRequest> {
        self.lock().requests.clone()
    }

    pub fn pending(&self) -> usize {
        self.lock().routes.len()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, State> {
        match self.state.lock() {
            Ok(state) => state,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

#[async_trait::async_trait]
impl Transport for MockTransport {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, TransportError> {
        let reply = {
            let mut state = self.lock();
            state.requests.push(request.clone());

            let position = state
                .routes
                .iter()
                .position(|(method, route, _)| *method == request.method && route == request.route());

            position
                .and_then(|index| state.routes.remove(index))
                .map(|(_, _, reply)| reply)
        };

        let mut reply = reply.ok_or_else(|| {
            TransportError::new(format!("no reply for {} {}", request.method, request.path))
        })?;

        loop {
            match reply {
                Reply::Answer(status, value) => {
                    return Ok(ApiResponse {
                        status,
                        body: value.to_string(),
                    })
                }
                Reply::Fail(message) => return Err(TransportError::new(message)),
                Reply::Delayed(delay, inner) => {
                    tokio::time::sleep(delay).await;
                    reply = *inner;
                }
            }
        }
    }
}
