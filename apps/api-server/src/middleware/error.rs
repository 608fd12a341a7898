//! HTTP error mapping - every failure leaves as `{ error, errors?, requestId? }`.

use actix_web::error::{JsonPayloadError, QueryPayloadError};
use actix_web::{HttpMessage, HttpRequest, HttpResponse, ResponseError, http::StatusCode};
use validator::ValidationErrors;

use hub_core::ports::AuthError;
use hub_core::{DomainError, RepoError};
use hub_shared::validation::field_errors;
use hub_shared::{ErrorResponse, FieldError};

use crate::observability::RequestId;

/// Application-level error type, converted into the JSON error envelope.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("{0}")]
    NotFound(String),

    /// Malformed input, failed business rule or uniqueness conflict.
    #[error("{0}")]
    BadRequest(String),

    /// No credentials were supplied.
    #[error("{0}")]
    Unauthorized(String),

    /// Credentials were rejected, or the caller may not touch the resource.
    #[error("{0}")]
    Forbidden(String),

    #[error("Validation failed")]
    Validation(Vec<FieldError>),

    #[error("Too many requests")]
    TooManyRequests { retry_after_secs: u64 },

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn invalid_token() -> Self {
        AppError::Forbidden("Invalid or expired token".to_string())
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::BadRequest(_) | AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::TooManyRequests { .. } => StatusCode::TOO_MANY_REQUESTS,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let body = match self {
            AppError::Validation(errors) => ErrorResponse::validation(errors.clone()),
            AppError::Internal(detail) => {
                tracing::error!("Internal error: {}", detail);
                ErrorResponse::new("Server error")
            }
            AppError::TooManyRequests { retry_after_secs } => {
                return HttpResponse::TooManyRequests()
                    .insert_header(("Retry-After", retry_after_secs.to_string()))
                    .json(ErrorResponse::new(
                        "Too many requests, please try again later",
                    ));
            }
            other => ErrorResponse::new(other.to_string()),
        };

        HttpResponse::build(self.status_code()).json(body)
    }
}

impl From<ValidationErrors> for AppError {
    fn from(errors: ValidationErrors) -> Self {
        AppError::Validation(field_errors(&errors))
    }
}

impl From<DomainError> for AppError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::NotFound { .. } => AppError::NotFound(err.to_string()),
            DomainError::InvalidValue { .. } => AppError::BadRequest(err.to_string()),
            DomainError::Validation(msg) | DomainError::Duplicate(msg) => AppError::BadRequest(msg),
            DomainError::Forbidden(_) => AppError::Forbidden(err.to_string()),
        }
    }
}

impl From<RepoError> for AppError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::NotFound => AppError::NotFound("Resource not found".to_string()),
            RepoError::Constraint(detail) => AppError::BadRequest(conflict_message(&detail)),
            RepoError::Connection(msg) => {
                tracing::error!("Database connection error: {}", msg);
                AppError::Internal("Database error".to_string())
            }
            RepoError::Query(msg) | RepoError::Corrupt(msg) => {
                tracing::error!("Database query error: {}", msg);
                AppError::Internal("Database error".to_string())
            }
        }
    }
}

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::InvalidCredentials => AppError::BadRequest(err.to_string()),
            AuthError::MissingAuth => AppError::Unauthorized(err.to_string()),
            AuthError::TokenExpired | AuthError::InvalidToken(_) | AuthError::UnknownSubject => {
                AppError::invalid_token()
            }
            AuthError::HashingError(msg) | AuthError::Backend(msg) => AppError::Internal(msg),
        }
    }
}

/// Unique-constraint violations surface as a user-facing conflict message.
fn conflict_message(detail: &str) -> String {
    if detail.contains("username") {
        "Username already taken".to_string()
    } else if detail.contains("email") {
        "Email already registered".to_string()
    } else if detail.contains("slug") {
        "A post with this title already exists".to_string()
    } else {
        "Duplicate entry".to_string()
    }
}

/// Result type alias for handlers.
pub type AppResult<T> = Result<T, AppError>;

/// Body for extractor failures, tagged with the request ID when one was assigned.
fn rejection(req: &HttpRequest, message: String) -> actix_web::Error {
    let mut body = ErrorResponse::new(message);
    if let Some(id) = req.extensions().get::<RequestId>() {
        body = body.with_request_id(id.as_str());
    }
    actix_web::error::InternalError::from_response(
        "invalid request",
        HttpResponse::BadRequest().json(body),
    )
    .into()
}

/// Handler for malformed JSON bodies.
pub fn json_error_handler(err: JsonPayloadError, req: &HttpRequest) -> actix_web::Error {
    tracing::debug!(error = %err, "Rejected JSON body");
    let message = match &err {
        JsonPayloadError::ContentType => "Content type must be application/json".to_string(),
        JsonPayloadError::Deserialize(e) => format!("Invalid request body: {e}"),
        _ => "Invalid request body".to_string(),
    };
    rejection(req, message)
}

/// Handler for malformed query strings.
pub fn query_error_handler(err: QueryPayloadError, req: &HttpRequest) -> actix_web::Error {
    tracing::debug!(error = %err, "Rejected query string");
    rejection(req, format!("Invalid query parameters: {err}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::body::to_bytes;

    async fn body_of(err: AppError) -> serde_json::Value {
        let bytes = to_bytes(err.error_response().into_body()).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[actix_web::test]
    async fn test_internal_detail_is_hidden() {
        let err = AppError::from(RepoError::Query("relation does not exist".to_string()));

        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body_of(err).await, serde_json::json!({"error": "Server error"}));
    }

    #[actix_web::test]
    async fn test_slug_conflict_is_bad_request() {
        let err = AppError::from(RepoError::Constraint(
            "duplicate key value violates unique constraint \"posts_slug_key\"".to_string(),
        ));

        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(
            body_of(err).await["error"],
            "A post with this title already exists"
        );
    }

    #[test]
    fn test_auth_error_statuses() {
        assert_eq!(
            AppError::from(AuthError::MissingAuth).status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            AppError::from(AuthError::TokenExpired).status_code(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            AppError::from(AuthError::InvalidCredentials).status_code(),
            StatusCode::BAD_REQUEST
        );
    }

    #[actix_web::test]
    async fn test_not_found_message() {
        let err = AppError::from(DomainError::post_not_found("abc"));

        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(body_of(err).await["error"], "Post not found");
    }

    #[test]
    fn test_forbidden_message() {
        let err = AppError::from(DomainError::Forbidden("delete this post"));
        assert_eq!(err.to_string(), "Not authorized to delete this post");
    }
}
