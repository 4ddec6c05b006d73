use axum::{
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use tracing::warn;

use crate::models::{ErrorBody, ErrorMeta};
use crate::repo::StoreError;

const STORE_FAILURE_MESSAGE: &str = "Something went wrong";

/// Every way a request to the books endpoint can fail.
#[derive(thiserror::Error, Debug)]
pub enum ApiError {
    #[error("an id is required to delete a book")]
    MissingId,

    #[error("method not allowed")]
    MethodNotAllowed,

    /// Any failure at or below the store boundary, including unreadable
    /// request bodies and missing records on update/delete.
    #[error("store operation failed: {0:?}")]
    Store(ErrorMeta),
}

impl ApiError {
    pub fn store<E: StoreError>(err: E) -> Self {
        warn!("Store operation failed: {}", err);
        ApiError::Store(err.meta())
    }

    pub fn not_found(cause: &str) -> Self {
        warn!("{}", cause);
        ApiError::Store(ErrorMeta::cause(cause))
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        warn!("Rejected request body: {}", rejection.body_text());
        ApiError::Store(ErrorMeta::cause(rejection.body_text()))
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        warn!("Rejected query string: {}", rejection.body_text());
        ApiError::Store(ErrorMeta::cause(rejection.body_text()))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            ApiError::MissingId => (
                StatusCode::BAD_REQUEST,
                ErrorBody {
                    message: "You should have an id!".to_string(),
                    meta: ErrorMeta::default(),
                },
            ),
            ApiError::MethodNotAllowed => (
                StatusCode::METHOD_NOT_ALLOWED,
                ErrorBody {
                    message: "Method not allowed!".to_string(),
                    meta: ErrorMeta::default(),
                },
            ),
            ApiError::Store(meta) => (
                StatusCode::BAD_REQUEST,
                ErrorBody {
                    message: STORE_FAILURE_MESSAGE.to_string(),
                    meta,
                },
            ),
        };

        (status, Json(body)).into_response()
    }
}
