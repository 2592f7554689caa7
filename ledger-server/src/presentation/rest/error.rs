use crate::application::LedgerError;
use crate::domain::ValidationError;
use crate::presentation::rest::dto::ErrorResponse;
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use tracing::error;

/// API error type
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        ApiError {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        ApiError {
            status: StatusCode::NOT_FOUND,
            message: message.into(),
        }
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        ApiError {
            status: StatusCode::CONFLICT,
            message: message.into(),
        }
    }

    pub fn internal() -> Self {
        ApiError {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: "internal server error".to_string(),
        }
    }

    pub fn invalid_body() -> Self {
        Self::bad_request("invalid request body")
    }

    pub fn invalid_parameter(param: &str, reason: impl std::fmt::Display) -> Self {
        Self::bad_request(format!("invalid {}: {}", param, reason))
    }
}

impl From<LedgerError> for ApiError {
    fn from(err: LedgerError) -> Self {
        if err.is_not_found() {
            return Self::not_found(err.to_string());
        }

        match &err {
            LedgerError::Store(store) if store.is_retryable() => Self::conflict(err.to_string()),
            LedgerError::Store(store) => {
                // Backend details stay in the log
                error!(error = %store, "request failed in the store");
                Self::internal()
            }
            // Precondition failures
            _ => Self::bad_request(err.to_string()),
        }
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        Self::bad_request(err.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(ErrorResponse::new(self.message));
        (self.status, body).into_response()
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "API Error {}: {}", self.status.as_u16(), self.message)
    }
}

impl std::error::Error for ApiError {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::StoreError;
    use crate::domain::OrderStatus;
    use rust_decimal_macros::dec;

    #[test]
    fn test_ledger_error_status_mapping() {
        let cases = [
            (LedgerError::AccountNotFound(1), StatusCode::NOT_FOUND),
            (LedgerError::OrderNotFound(1), StatusCode::NOT_FOUND),
            (
                LedgerError::InsufficientFunds {
                    required: dec!(10),
                    available: dec!(1),
                },
                StatusCode::BAD_REQUEST,
            ),
            (
                LedgerError::OrderNotCancelable {
                    order_id: 1,
                    status: OrderStatus::Canceled,
                },
                StatusCode::BAD_REQUEST,
            ),
            (
                LedgerError::Store(StoreError::Conflict),
                StatusCode::CONFLICT,
            ),
            (
                LedgerError::Store(StoreError::Unavailable("pool timed out".into())),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
            (
                LedgerError::Store(StoreError::Constraint("balance".into())),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (err, status) in cases {
            assert_eq!(ApiError::from(err).status, status);
        }
    }

    #[test]
    fn test_internal_error_hides_details() {
        let err = ApiError::from(LedgerError::Store(StoreError::Backend(
            "password authentication failed".into(),
        )));
        assert_eq!(err.message, "internal server error");
    }
}
