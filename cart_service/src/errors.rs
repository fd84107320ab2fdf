// cart_service/src/errors.rs

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use cartflow::FlowError;
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
  /// Cart routes take no query string at all.
  #[error("page not found")]
  PageNotFound,

  #[error("{0}")]
  Validation(String),

  #[error("{0}")]
  NotFound(String),

  #[error("{0}")]
  Forbidden(String),

  /// The user already owns a cart and tried to create another one.
  #[error("{0}")]
  Conflict(String),

  #[error("Configuration Error: {0}")]
  Config(String),

  #[error("{0}")]
  Sqlx(#[from] sqlx::Error),

  #[error("{source}")]
  Workflow {
    #[from]
    source: FlowError,
  },

  #[error("{0}")]
  Internal(String),
}

impl AppError {
  pub fn validation(msg: impl Into<String>) -> Self {
    AppError::Validation(msg.into())
  }

  pub fn not_found(msg: impl Into<String>) -> Self {
    AppError::NotFound(msg.into())
  }

  pub fn forbidden(msg: impl Into<String>) -> Self {
    AppError::Forbidden(msg.into())
  }
}

impl ResponseError for AppError {
  fn status_code(&self) -> StatusCode {
    match self {
      AppError::PageNotFound | AppError::NotFound(_) => StatusCode::NOT_FOUND,
      AppError::Validation(_) | AppError::Conflict(_) => StatusCode::BAD_REQUEST,
      AppError::Forbidden(_) => StatusCode::FORBIDDEN,
      AppError::Config(_)
      | AppError::Sqlx(_)
      | AppError::Workflow { .. }
      | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
  }

  fn error_response(&self) -> HttpResponse {
    let status = self.status_code();
    if status.is_server_error() {
      tracing::error!(application_error = %self, "Responding with internal error");
      // Storage and workflow failures surface their raw message.
      return HttpResponse::build(status).json(json!({
        "status": false,
        "message": "Internal server error",
        "error": self.to_string(),
      }));
    }

    tracing::warn!(status = status.as_u16(), application_error = %self, "Request rejected");
    HttpResponse::build(status).json(json!({
      "status": false,
      "message": self.to_string(),
    }))
  }
}

pub type Result<T, E = AppError> = std::result::Result<T, E>;
