use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use service::ServiceError;
use thiserror::Error;
use tracing::{error, warn};

pub const BAD_JSON_MESSAGE: &str = "The given object could not be interpreted by the server.";
pub const BAD_AMOUNT_MESSAGE: &str = "The given amount could not be interpreted by the server.";
pub const BAD_SCORE_MESSAGE: &str = "The given score could not be interpreted by the server.";

/// Request-level failure. Rendered as a plain-text body carrying the message.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Service(#[from] ServiceError),
    #[error("{}", BAD_JSON_MESSAGE)]
    MalformedRequestBody,
    #[error("{0}")]
    InvalidNumericParameter(String),
}

impl ApiError {
    pub fn bad_amount() -> Self {
        Self::InvalidNumericParameter(BAD_AMOUNT_MESSAGE.into())
    }

    pub fn bad_score() -> Self {
        Self::InvalidNumericParameter(BAD_SCORE_MESSAGE.into())
    }

    pub fn bad_path_param(name: &str, raw: &str) -> Self {
        Self::InvalidNumericParameter(format!("The given {name} {raw:?} could not be interpreted by the server."))
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Service(ServiceError::NotFound) => StatusCode::NOT_FOUND,
            ApiError::Service(ServiceError::DuplicateName)
            | ApiError::Service(ServiceError::EmptyName)
            | ApiError::MalformedRequestBody => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let msg = self.to_string();
        if status.is_server_error() {
            error!(status = status.as_u16(), error = %msg, "request failed");
        } else {
            warn!(status = status.as_u16(), error = %msg, "request rejected");
        }
        (status, msg).into_response()
    }
}

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("cannot open participant storage: {0}")]
    Storage(#[from] ServiceError),
    #[error("cannot bind {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },
    #[error(transparent)]
    Any(#[from] anyhow::Error),
}
