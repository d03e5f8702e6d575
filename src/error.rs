use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Something's reeeeealy wrong, send hlp pls")]
    Unknown,

    // Request shape errors
    #[error("Invalid input: {0}")]
    InvalidInput(#[from] ValidationError),
    #[error("Malformed request body: {0}")]
    MalformedBody(String),

    // Identity errors
    #[error("Authentication required")]
    AuthenticationRequired,
    #[error("Authentication failed: {0}")]
    Jwt(#[from] JwtError),

    // Store errors
    #[error("Database error: {0}")]
    Store(#[from] StoreError),

    // Poll errors
    #[error("Poll error: {0}")]
    Poll(#[from] PollsError),
}

#[derive(Error, Debug)]
pub enum PollsError {
    #[error("Poll not found")]
    PollNotFound,

    #[error("Poll not found or unauthorized")]
    PollNotFoundOrUnauthorized,

    #[error("Poll has already ended")]
    PollEnded,

    #[error("Invalid poll option: {0}")]
    InvalidPollOption(String),

    #[error("Unauthorized to manage this poll")]
    UnauthorizedAccess,

    #[error("Poll update failed: {0}")]
    UpdateFailed(String),
}

/// Rejections produced while turning a raw request body into a poll command.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ValidationError {
    #[error("pollID is required")]
    MissingPollId,
    #[error("adminID is required")]
    MissingAdminToken,
    #[error("optionID is required")]
    MissingOptionId,
    #[error("description is required")]
    MissingDescription,
    #[error("options must be a non-empty list")]
    MissingOptions,
    #[error("option {0} has no text")]
    BlankOption(usize),
    #[error("duration must be a positive number of milliseconds")]
    InvalidDuration,
    #[error("nothing to edit, supply a description or options")]
    NothingToEdit,
    #[error("user id not found")]
    MissingUserId,
}

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("poll id {0} is already taken")]
    DuplicateId(String),
    #[error("mongodb: {0}")]
    Mongo(#[from] mongodb::error::Error),
    #[error("bson serialization: {0}")]
    Serialization(#[from] mongodb::bson::ser::Error),
    #[cfg(test)]
    #[error("store unavailable during {0}")]
    Unavailable(&'static str),
}

#[derive(Error, Debug)]
pub enum JwtError {
    #[error("Token expired")]
    TokenExpired,
    #[error("Invalid token signature")]
    InvalidSignature,
    #[error("Invalid token format")]
    InvalidTokenFormat,
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("{0} not found in environment variables")]
    Missing(&'static str),
    #[error("unknown STORE_BACKEND {0:?}, expected \"mongo\" or \"memory\"")]
    UnknownBackend(String),
    #[error("CORS_ORIGIN {0:?} is not a valid header value")]
    InvalidCorsOrigin(String),
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::MalformedBody(rejection.body_text())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let error_string = self.to_string();
        let (status, error_message) = match &self {
            AppError::Unknown => (StatusCode::INTERNAL_SERVER_ERROR, "Unknown Error"),

            AppError::InvalidInput(_) => (StatusCode::BAD_REQUEST, "Invalid Input"),
            AppError::MalformedBody(_) => (StatusCode::BAD_REQUEST, "Malformed Request Body"),

            AppError::AuthenticationRequired => {
                (StatusCode::UNAUTHORIZED, "Authentication Required")
            }
            AppError::Jwt(_) => (StatusCode::UNAUTHORIZED, "Authentication Failed"),

            AppError::Store(_) => (StatusCode::INTERNAL_SERVER_ERROR, "Database Error"),

            AppError::Poll(poll_err) => match poll_err {
                PollsError::PollNotFound => (StatusCode::NOT_FOUND, "Poll Not Found"),
                PollsError::PollNotFoundOrUnauthorized => {
                    (StatusCode::NOT_FOUND, "Poll Not Found Or Unauthorized")
                }
                PollsError::PollEnded => (StatusCode::FORBIDDEN, "Poll Has Already Ended"),
                PollsError::InvalidPollOption(_) => {
                    (StatusCode::BAD_REQUEST, "Invalid Poll Option")
                }
                PollsError::UnauthorizedAccess => {
                    (StatusCode::UNAUTHORIZED, "Unauthorized To Manage Poll")
                }
                PollsError::UpdateFailed(_) => {
                    (StatusCode::INTERNAL_SERVER_ERROR, "Failed To Update Poll")
                }
            },
        };

        let body = Json(json!({
            "status": status.as_u16(),
            "message": error_message,
            "error": error_string,
            "timestamp": chrono::Utc::now()
        }));

        (status, body).into_response()
    }
}
