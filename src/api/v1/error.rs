use crate::api::v1::handler::ApiResponse;
use crate::application_port::*;
use crate::logger::*;
use serde::Serialize;
use std::convert::Infallible;
use thiserror::Error;
use warp::http::StatusCode;
use warp::{Rejection, reject};

pub async fn recover_error(err: Rejection) -> Result<impl warp::Reply, Infallible> {
    let code = if let Some(code) = err.find::<ApiErrorCode>() {
        code.clone()
    } else if err.is_not_found() {
        ApiErrorCode::NotFound
    } else if let Some(e) = err.find::<warp::filters::body::BodyDeserializeError>() {
        debug!("rejected body: {}", e);
        ApiErrorCode::MalformedBody
    } else if err.find::<warp::reject::PayloadTooLarge>().is_some()
        || err.find::<warp::reject::UnsupportedMediaType>().is_some()
        || err.find::<warp::reject::LengthRequired>().is_some()
    {
        ApiErrorCode::MalformedBody
    } else if err.find::<warp::reject::MethodNotAllowed>().is_some() {
        ApiErrorCode::MethodNotAllowed
    } else {
        warn!("unhandled rejection: {:?}", err);
        ApiErrorCode::InternalError
    };

    let json = warp::reply::json(&ApiResponse::<()>::err(code.clone(), code.to_string()));
    Ok(warp::reply::with_status(json, code.status()))
}

#[derive(Debug, Serialize)]
pub struct ApiError {
    pub code: ApiErrorCode,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error, Serialize)]
pub enum ApiErrorCode {
    #[error("Request body is malformed")]
    MalformedBody,
    #[error("Id is not valid")]
    InvalidId,
    #[error("Validation failed")]
    ValidationFailed,
    #[error("Invalid username or password")]
    InvalidCredentials,
    #[error("Missing or invalid Authorization header")]
    MissingToken,
    #[error("Token is not valid")]
    InvalidToken,
    #[error("Refresh token does not belong to the caller")]
    TokenMismatch,
    #[error("Resource not found")]
    NotFound,
    #[error("Method not allowed")]
    MethodNotAllowed,
    #[error("Resource conflict")]
    Conflict,
    #[error("Service temporarily unavailable")]
    Unavailable,
    #[error("Internal error")]
    InternalError,
}

impl ApiErrorCode {
    pub fn internal<E: std::fmt::Display>(error: E) -> ApiErrorCode {
        warn!("Internal error: {}", error);
        ApiErrorCode::InternalError
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiErrorCode::MalformedBody
            | ApiErrorCode::InvalidId
            | ApiErrorCode::ValidationFailed => StatusCode::BAD_REQUEST,
            ApiErrorCode::InvalidCredentials
            | ApiErrorCode::MissingToken
            | ApiErrorCode::InvalidToken
            | ApiErrorCode::TokenMismatch => StatusCode::UNAUTHORIZED,
            ApiErrorCode::NotFound => StatusCode::NOT_FOUND,
            ApiErrorCode::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            ApiErrorCode::Conflict => StatusCode::CONFLICT,
            ApiErrorCode::Unavailable => StatusCode::SERVICE_UNAVAILABLE,
            ApiErrorCode::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl reject::Reject for ApiErrorCode {}

impl From<AuthError> for ApiErrorCode {
    fn from(error: AuthError) -> Self {
        match error {
            AuthError::InvalidCredentials => ApiErrorCode::InvalidCredentials,
            AuthError::Unauthenticated => ApiErrorCode::MissingToken,
            // verify sub-kinds are collapsed here
            AuthError::InvalidToken(_) | AuthError::TokenNotRecognized => {
                ApiErrorCode::InvalidToken
            }
            AuthError::Forbidden => ApiErrorCode::TokenMismatch,
            AuthError::RotationFailed(e) => {
                error!("rotation failed, client must log in again: {}", e);
                ApiErrorCode::InvalidToken
            }
            AuthError::StoreUnavailable(e) => {
                error!("store unavailable: {}", e);
                ApiErrorCode::Unavailable
            }
            AuthError::TokenCreationFailed(e) | AuthError::InternalError(e) => {
                ApiErrorCode::internal(e)
            }
        }
    }
}

impl From<CatalogError> for ApiErrorCode {
    fn from(error: CatalogError) -> Self {
        match error {
            CatalogError::NotFound => ApiErrorCode::NotFound,
            CatalogError::InvalidInput(e) => {
                debug!("validation failed: {}", e);
                ApiErrorCode::ValidationFailed
            }
            CatalogError::Conflict(e) => {
                debug!("conflict: {}", e);
                ApiErrorCode::Conflict
            }
            CatalogError::Store(e) => ApiErrorCode::internal(e),
        }
    }
}
