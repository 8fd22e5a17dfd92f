use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use tracing::warn;

use crate::db::StoreError;
use crate::domain::Language;
use crate::engine::{EconomyError, ProjectionError};
use crate::i18n::Message;
use crate::orchestration::{OrderError, ServiceError};

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Internal server error: {0}")]
    Internal(String),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Bad request: {0}")]
    BadRequest(String),
    #[error("Forbidden")]
    Forbidden(Language),
    /// A rule rejected the command; nothing was changed.
    #[error("Rejected: {0}")]
    Rejected(EconomyError, Language),
    #[error("Unprocessable: {code}: {message}")]
    Unprocessable { code: &'static str, message: String },
    /// The outcome of the mutation is unknown.
    #[error("Store unavailable: {0}")]
    StoreUnavailable(String, Language),
}

impl AppError {
    /// Convert a service failure, localizing the message for `lang`.
    pub fn from_service(err: ServiceError, lang: Language) -> Self {
        match err {
            ServiceError::Rejected(e) => AppError::Rejected(e, lang),
            ServiceError::Store(e) => AppError::from_store(e, lang),
        }
    }

    pub fn from_store(err: StoreError, lang: Language) -> Self {
        match err {
            StoreError::Unavailable(msg) => AppError::StoreUnavailable(msg, lang),
            other => AppError::Internal(other.to_string()),
        }
    }
}

impl From<ServiceError> for AppError {
    fn from(err: ServiceError) -> Self {
        AppError::from_service(err, Language::default())
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        AppError::from_store(err, Language::default())
    }
}

impl From<ProjectionError> for AppError {
    fn from(err: ProjectionError) -> Self {
        AppError::BadRequest(err.to_string())
    }
}

impl From<OrderError> for AppError {
    fn from(err: OrderError) -> Self {
        match err {
            OrderError::InvalidQuantity(_) => AppError::BadRequest(err.to_string()),
            OrderError::UnknownWebUser(_) => AppError::NotFound(err.to_string()),
            OrderError::InsufficientWebBalance { .. } => AppError::Unprocessable {
                code: "insufficient_web_balance",
                message: err.to_string(),
            },
            OrderError::Store(e) => AppError::from(e),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, kind, message) = match self {
            AppError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, "internal", msg),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", msg),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "bad_request", msg),
            AppError::Forbidden(lang) => (
                StatusCode::FORBIDDEN,
                "forbidden",
                Message::NotOwner.render(lang),
            ),
            AppError::Rejected(err, lang) => {
                let status = match err {
                    EconomyError::AlreadyClaimed => StatusCode::CONFLICT,
                    _ => StatusCode::UNPROCESSABLE_ENTITY,
                };
                let code = err.code();
                (status, code, Message::Rejected(err).render(lang))
            }
            AppError::Unprocessable { code, message } => {
                (StatusCode::UNPROCESSABLE_ENTITY, code, message)
            }
            AppError::StoreUnavailable(detail, lang) => {
                warn!(error = %detail, "Ledger store unavailable");
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    "store_unavailable",
                    Message::StoreUnavailable.render(lang),
                )
            }
        };

        let body = Json(json!({
            "error": kind,
            "message": message,
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::CurrencyKind;

    fn status_of(err: AppError) -> StatusCode {
        err.into_response().status()
    }

    #[test]
    fn test_rejections_map_to_status() {
        assert_eq!(
            status_of(AppError::Rejected(EconomyError::AlreadyClaimed, Language::En)),
            StatusCode::CONFLICT
        );
        assert_eq!(
            status_of(AppError::Rejected(
                EconomyError::EmptyBalance(CurrencyKind::Coupon),
                Language::En
            )),
            StatusCode::UNPROCESSABLE_ENTITY
        );
    }

    #[test]
    fn test_store_errors_map_to_service_unavailable() {
        let err = AppError::from(ServiceError::Store(StoreError::Unavailable("down".into())));
        assert_eq!(status_of(err), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[test]
    fn test_order_errors_map_to_status() {
        assert_eq!(
            status_of(OrderError::InvalidQuantity(0).into()),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_of(OrderError::UnknownWebUser("x".into()).into()),
            StatusCode::NOT_FOUND
        );
    }
}
