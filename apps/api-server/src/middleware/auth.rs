//! Authentication extractors.

use actix_web::{FromRequest, HttpRequest, dev::Payload, http::header, web};
use futures::future::LocalBoxFuture;
use uuid::Uuid;

use hub_core::domain::User;
use hub_core::ports::AuthError;

use crate::middleware::error::AppError;
use crate::state::AppState;

/// Authenticated caller, resolved from the bearer token to a stored user.
///
/// ```ignore
/// async fn protected_route(AuthUser(user): AuthUser) -> impl Responder {
///     format!("Hello, {}!", user.username)
/// }
/// ```
#[derive(Debug, Clone)]
pub struct AuthUser(pub User);

impl AuthUser {
    pub fn id(&self) -> Uuid {
        self.0.id
    }
}

/// Caller identity when a valid token is present; never rejects the request.
#[derive(Debug, Clone)]
pub struct OptionalAuthUser(pub Option<User>);

impl OptionalAuthUser {
    pub fn id(&self) -> Option<Uuid> {
        self.0.as_ref().map(|user| user.id)
    }
}

/// Token part of `Authorization: <scheme> <token>`.
fn bearer_token(req: &HttpRequest) -> Option<String> {
    req.headers()
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .split_whitespace()
        .nth(1)
        .map(String::from)
}

async fn resolve(state: &AppState, token: Option<String>) -> Result<User, AuthError> {
    let token = token.ok_or(AuthError::MissingAuth)?;
    let claims = state.tokens.validate_token(&token)?;

    state
        .users
        .find_by_id(claims.user_id)
        .await
        .map_err(|e| AuthError::Backend(e.to_string()))?
        .ok_or(AuthError::UnknownSubject)
}

impl FromRequest for AuthUser {
    type Error = AppError;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let state = req.app_data::<web::Data<AppState>>().cloned();
        let token = bearer_token(req);

        Box::pin(async move {
            let Some(state) = state else {
                return Err(AppError::Internal("AppState not found in app data".to_string()));
            };

            resolve(&state, token).await.map(AuthUser).map_err(|e| {
                tracing::debug!(error = %e, "Rejected request credentials");
                AppError::from(e)
            })
        })
    }
}

impl FromRequest for OptionalAuthUser {
    type Error = AppError;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let state = req.app_data::<web::Data<AppState>>().cloned();
        let token = bearer_token(req);

        Box::pin(async move {
            let (Some(state), Some(token)) = (state, token) else {
                return Ok(OptionalAuthUser(None));
            };

            match resolve(&state, Some(token)).await {
                Ok(user) => Ok(OptionalAuthUser(Some(user))),
                Err(e) => {
                    tracing::debug!(error = %e, "Ignoring invalid optional credentials");
                    Ok(OptionalAuthUser(None))
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::test::TestRequest;

    #[test]
    fn test_bearer_token_takes_second_word() {
        let req = TestRequest::default()
            .insert_header((header::AUTHORIZATION, "Bearer abc.def"))
            .to_http_request();
        assert_eq!(bearer_token(&req).as_deref(), Some("abc.def"));

        let req = TestRequest::default()
            .insert_header((header::AUTHORIZATION, "Bearer"))
            .to_http_request();
        assert!(bearer_token(&req).is_none());

        assert!(bearer_token(&TestRequest::default().to_http_request()).is_none());
    }
}
