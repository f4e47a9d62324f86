use http::StatusCode;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct TransportError {
    message: String,
}

impl TransportError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl From<isahc::Error> for TransportError {
    fn from(err: isahc::Error) -> Self {
        Self::new(err.to_string())
    }
}

impl From<http::Error> for TransportError {
    fn from(err: http::Error) -> Self {
        Self::new(err.to_string())
    }
}

impl From<std::io::Error> for TransportError {
    fn from(err: std::io::Error) -> Self {
        Self::new(err.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ApiError {
    /// The request never got an answer
    #[error("transport failure: {0}")]
    Transport(#[from] TransportError),

    /// The backend answered with a non-2xx status, body kept verbatim
    #[error("server answered {status}")]
    Server { status: StatusCode, body: String },

    /// The backend answered 401, the stored credential has been dropped
    #[error("session expired or missing")]
    Unauthorized,

    /// Caught before anything went on the wire
    #[error("validation failed: {0}")]
    Validation(String),

    /// A 2xx answer whose body does not fit the expected envelope
    #[error("unexpected response body: {0}")]
    Decode(String),

    #[error("login rejected")]
    LoginRejected,

    #[error("session storage: {0}")]
    Session(String),
}

impl ApiError {
    /// Message suitable for the operator, details stay in the logs.
    pub fn operator_message(&self) -> &'static str {
        match self {
            ApiError::Transport(_) => "Could not reach the server, please try again.",
            ApiError::Server { .. } | ApiError::Decode(_) => {
                "The server could not complete the request."
            }
            ApiError::Unauthorized => "Your session has expired, please sign in again.",
            ApiError::Validation(_) => "Some fields are missing or invalid.",
            ApiError::LoginRejected => "Sign in failed, please check your credentials.",
            ApiError::Session(_) => "The session could not be saved.",
        }
    }

    pub(crate) fn decode(err: serde_json::Error) -> Self {
        ApiError::Decode(err.to_string())
    }
}
