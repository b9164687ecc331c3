use axum::http::StatusCode;

/// Failure of a call to the remote diary API. Cloneable so a failed fetch
/// can sit in the cache next to its key.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ApiError {
    #[error("diary not found")]
    NotFound,
    #[error("diary api returned {status}: {message}")]
    Status { status: u16, message: String },
    #[error("diary api rejected the request: {0}")]
    Rejected(String),
    #[error("diary api unreachable: {0}")]
    Transport(String),
    #[error("unexpected diary api response: {0}")]
    Decode(String),
}

impl ApiError {
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::NotFound => Some(404),
            ApiError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ApiError::Decode(err.to_string())
        } else {
            ApiError::Transport(err.to_string())
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ControllerError {
    #[error("cannot write a diary for a future date")]
    FutureDate,
    #[error("invalid date: {0}")]
    InvalidDate(String),
    #[error("no diary exists for this date")]
    NoRecord,
    #[error("cancelled")]
    Cancelled,
    #[error(transparent)]
    Api(#[from] ApiError),
}

#[derive(Debug)]
pub struct AppError {
    pub status: StatusCode,
    pub message: String,
}

impl AppError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }

    pub fn bad_gateway(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_GATEWAY,
            message: message.into(),
        }
    }
}

impl From<ControllerError> for AppError {
    fn from(err: ControllerError) -> Self {
        match err {
            ControllerError::Api(api) => Self::bad_gateway(api.to_string()),
            other => Self::bad_request(other.to_string()),
        }
    }
}

impl axum::response::IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        (self.status, self.message).into_response()
    }
}
