use axum::http::header::InvalidHeaderValue;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("invalid url, must start with http:// or https://")]
    InvalidUrl,
    #[error("short code not found")]
    NotFound,
    #[error("no unique short code after {attempts} attempts")]
    CodeSpaceExhausted { attempts: usize },
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("environment variable {name} is not valid unicode")]
    NotUnicode { name: &'static str },
    #[error("invalid port {value:?}")]
    InvalidPort { value: String },
    #[error("invalid base url {value:?}: {reason}")]
    InvalidBaseUrl { value: String, reason: String },
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("URL is required")]
    MissingUrl,
    #[error(transparent)]
    Registry(#[from] RegistryError),
    #[error("target url is not a valid location header: {0}")]
    InvalidLocation(#[from] InvalidHeaderValue),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AppError::MissingUrl => (StatusCode::BAD_REQUEST, "URL is required"),
            AppError::Registry(RegistryError::InvalidUrl) => (
                StatusCode::BAD_REQUEST,
                "Invalid URL. Must start with http:// or https://",
            ),
            AppError::Registry(RegistryError::NotFound) => (StatusCode::NOT_FOUND, "URL not found"),
            AppError::Registry(err @ RegistryError::CodeSpaceExhausted { .. }) => {
                tracing::error!("{}", err);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
            }
            AppError::InvalidLocation(_) => {
                tracing::error!("{}", self);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
            }
        };
        (status, Json(json!({ "error": message }))).into_response()
    }
}
