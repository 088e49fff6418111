use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use crate::models::UnknownTab;
use crate::services::ControllerError;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error(transparent)]
    UnknownTab(#[from] UnknownTab),
    #[error(transparent)]
    Controller(#[from] ControllerError),
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    code: u16,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::UnknownTab(_) => StatusCode::NOT_FOUND,
            ApiError::Controller(ControllerError::InvalidPage)
            | ApiError::Controller(ControllerError::PageOutOfRange { .. }) => StatusCode::BAD_REQUEST,
            ApiError::Controller(ControllerError::NotPaginated(_))
            | ApiError::Controller(ControllerError::UniverseNotReady) => StatusCode::CONFLICT,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = Json(ErrorResponse {
            error: self.to_string(),
            code: status.as_u16(),
        });

        (status, body).into_response()
    }
}
