//! HTTP error mapping.
//!
//! Every failure leaves the API as `{ "code": "...", "message": "..." }`.
//!
//! | CheckoutError       | status | code                 |
//! |---------------------|--------|----------------------|
//! | `Validation`        | 400    | `VALIDATION_ERROR`   |
//! | `NotFound`          | 404    | `NOT_FOUND`          |
//! | `InsufficientStock` | 409    | `INSUFFICIENT_STOCK` |
//! | `Overpayment`       | 400    | `OVERPAYMENT`        |
//! | `CouponRejected`    | 400    | `COUPON_REJECTED`    |
//! | `Conflict`          | 409    | `CONFLICT`           |
//! | `Persistence`       | 500    | `INTERNAL_ERROR`     |

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use bazaar_checkout::CheckoutError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    ValidationError,
    NotFound,
    InsufficientStock,
    Overpayment,
    CouponRejected,
    Conflict,
    Unauthorized,
    InternalError,
}

#[derive(Debug, thiserror::Error)]
#[error("{message}")]
pub struct ApiError {
    status: StatusCode,
    code: ErrorCode,
    message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, code: ErrorCode, message: impl Into<String>) -> Self {
        ApiError {
            status,
            code,
            message: message.into(),
        }
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, ErrorCode::Unauthorized, message)
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn code(&self) -> ErrorCode {
        self.code
    }
}

impl From<CheckoutError> for ApiError {
    fn from(err: CheckoutError) -> Self {
        let (status, code) = match &err {
            CheckoutError::Validation(_) => (StatusCode::BAD_REQUEST, ErrorCode::ValidationError),
            CheckoutError::NotFound { .. } => (StatusCode::NOT_FOUND, ErrorCode::NotFound),
            CheckoutError::InsufficientStock { .. } => (StatusCode::CONFLICT, ErrorCode::InsufficientStock),
            CheckoutError::Overpayment { .. } => (StatusCode::BAD_REQUEST, ErrorCode::Overpayment),
            CheckoutError::CouponRejected(_) => (StatusCode::BAD_REQUEST, ErrorCode::CouponRejected),
            CheckoutError::Conflict(_) => (StatusCode::CONFLICT, ErrorCode::Conflict),
            CheckoutError::Persistence(e) => {
                tracing::error!(error = %e, retryable = err.is_retryable(), "Persistence failure");
                return Self::new(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorCode::InternalError,
                    "Internal server error",
                );
            }
        };

        Self::new(status, code, err.to_string())
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    code: ErrorCode,
    message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            code: self.code,
            message: self.message,
        };
        (self.status, Json(body)).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
