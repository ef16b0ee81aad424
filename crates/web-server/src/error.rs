// In crates/web-server/src/error.rs

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Result data not found")]
    ResultNotFound,

    #[error("Unable to list results")]
    ListFailed,

    #[error("No backtest summaries found")]
    NoSummaries,

    #[error("Failed to write to ping log file")]
    PingWriteFailed,

    #[error("Failed to read ping log file")]
    PingReadFailed,

    #[error("Failed to bind the server address")]
    ServerBindError(#[source] std::io::Error),

    #[error("Web server stopped unexpectedly")]
    ServerError(#[source] std::io::Error),
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let message = self.to_string();
        let (status, body) = match self {
            Error::ResultNotFound | Error::NoSummaries => {
                (StatusCode::NOT_FOUND, json!({ "message": message }))
            }
            // The ping log endpoints report under `error`, matching the dashboard's log page.
            Error::PingReadFailed => {
                (StatusCode::INTERNAL_SERVER_ERROR, json!({ "error": message }))
            }
            Error::ListFailed
            | Error::PingWriteFailed
            | Error::ServerBindError(_)
            | Error::ServerError(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, json!({ "message": message }))
            }
        };
        (status, Json(body)).into_response()
    }
}

pub type Result<T> = std::result::Result<T, Error>;
