use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::spotify::auth::TokenError;

/// Outcome of a failed call to Spotify.
#[derive(Debug, Error)]
pub enum SpotifyError {
    /// Connection, TLS or timeout failure before a response was read.
    #[error("spotify request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// Spotify answered with a status the caller does not accept.
    #[error("spotify returned {status}: {body}")]
    Upstream { status: StatusCode, body: String },

    #[error("could not decode spotify response: {0}")]
    Decode(#[from] serde_json::Error),

    /// The accounts service refused a code or refresh token.
    #[error("spotify rejected the authorization: {}", .0.error)]
    Rejected(TokenError),
}

/// Application error type.
#[derive(Debug)]
pub enum AppError {
    Spotify(SpotifyError),
    BadRequest(String),
    Unauthorized(String),
    Internal(String),
}

impl From<SpotifyError> for AppError {
    fn from(err: SpotifyError) -> Self {
        AppError::Spotify(err)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::Spotify(SpotifyError::Rejected(body)) => {
                return (StatusCode::BAD_REQUEST, Json(body)).into_response();
            }
            AppError::Spotify(err) => {
                // Expired or revoked bearer token.
                let status = match &err {
                    SpotifyError::Upstream { status, .. } if *status == StatusCode::UNAUTHORIZED => {
                        StatusCode::UNAUTHORIZED
                    }
                    _ => StatusCode::BAD_GATEWAY,
                };
                (status, err.to_string())
            }
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg),
            AppError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };
        (
            status,
            Json(json!({ "error": message })),
        )
            .into_response()
    }
}
