use axum::http::StatusCode;
use thiserror::Error;

use crate::{
    error::{ErrorMessage, HttpError},
    service::{column_filter::ColumnFilterError, date_range::DateRangeError},
    utils::area::AreaError,
};

#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("Request to property service failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Property service responded with {status}: {message}")]
    UpstreamStatus { status: StatusCode, message: String },

    #[error("Unexpected response from property service: {0}")]
    Decode(String),

    #[error("{0}")]
    DateRange(#[from] DateRangeError),

    #[error("{0}")]
    ColumnFilter(#[from] ColumnFilterError),

    #[error("{0}")]
    Area(#[from] AreaError),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Other error: {0}")]
    Other(String),
}

impl From<ServiceError> for HttpError {
    fn from(error: ServiceError) -> Self {
        match error {
            ServiceError::DateRange(_)
            | ServiceError::ColumnFilter(_)
            | ServiceError::Area(_)
            | ServiceError::Validation(_) => HttpError::bad_request(error.to_string()),

            ServiceError::UpstreamStatus { status, .. } if status == StatusCode::UNAUTHORIZED => {
                HttpError::unauthorized(ErrorMessage::InvalidToken.to_string())
            }

            ServiceError::Transport(_)
            | ServiceError::UpstreamStatus { .. }
            | ServiceError::Decode(_) => {
                HttpError::bad_gateway(ErrorMessage::UpstreamUnavailable.to_string())
            }

            ServiceError::Other(detail) => {
                tracing::error!("internal error: {}", detail);
                HttpError::server_error(ErrorMessage::ServerError.to_string())
            }
        }
    }
}

impl ServiceError {
    /// Short text shown in place of data when a fetch degrades.
    pub fn display_message(&self) -> String {
        match self {
            ServiceError::UpstreamStatus { status, .. } if *status == StatusCode::UNAUTHORIZED => {
                "Session expired, please log in again".to_string()
            }
            ServiceError::Transport(_)
            | ServiceError::UpstreamStatus { .. }
            | ServiceError::Decode(_) => "Failed to load data".to_string(),
            other => other.to_string(),
        }
    }
}
