use crate::db::StoreError;
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;
use tracing::error;

pub const ALREADY_VOTED_MESSAGE: &str = "You have already voted in this poll.";

#[derive(Error, Debug)]
pub enum PollError {
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
    #[error("Poll not found")]
    PollNotFound,
    #[error("Poll option not found")]
    OptionNotFound,
    #[error("You have already voted in this poll.")]
    AlreadyVoted,
    #[error("Voter identity unavailable")]
    UnknownVoter,
    #[error("Database error: {0}")]
    DatabaseError(String),
}

impl IntoResponse for PollError {
    fn into_response(self) -> Response {
        let (status, error_message) = match &self {
            PollError::InvalidRequest(_) => (StatusCode::BAD_REQUEST, "Invalid request"),
            PollError::PollNotFound => (StatusCode::NOT_FOUND, "Poll not found"),
            PollError::OptionNotFound => (StatusCode::NOT_FOUND, "Poll option not found"),
            PollError::AlreadyVoted => {
                return (StatusCode::BAD_REQUEST, ALREADY_VOTED_MESSAGE).into_response();
            }
            PollError::UnknownVoter => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Voter identity unavailable",
            ),
            PollError::DatabaseError(_) => (StatusCode::INTERNAL_SERVER_ERROR, "Database error"),
        };

        let body = Json(json!({
            "error": error_message,
            "details": self.to_string()
        }));

        (status, body).into_response()
    }
}

impl From<StoreError> for PollError {
    fn from(e: StoreError) -> Self {
        error!("store failure: {}", e);
        PollError::DatabaseError(e.to_string())
    }
}
