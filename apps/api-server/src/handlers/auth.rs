//! Authentication handlers.

use actix_web::{HttpResponse, web};
use validator::Validate;

use hub_core::DomainError;
use hub_core::domain::{User, normalize_email};
use hub_core::ports::AuthError;
use hub_shared::ApiResponse;
use hub_shared::dto::{
    AuthPayload, ChangePasswordRequest, LoginRequest, RegisterRequest, UserPayload, UserResponse,
};

use crate::middleware::auth::AuthUser;
use crate::middleware::error::AppResult;
use crate::state::AppState;

fn issue_token(state: &AppState, user: &User) -> AppResult<String> {
    Ok(state
        .tokens
        .generate_token(user.id, &user.email, vec!["user".to_string()])?)
}

/// POST /api/auth/register
pub async fn register(
    state: web::Data<AppState>,
    body: web::Json<RegisterRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();
    req.validate()?;

    let email = normalize_email(&req.email);
    if state.users.find_by_email(&email).await?.is_some() {
        return Err(DomainError::Duplicate("Email already registered".to_string()).into());
    }
    if state.users.find_by_username(req.username.trim()).await?.is_some() {
        return Err(DomainError::Duplicate("Username already taken".to_string()).into());
    }

    let password_hash = state.passwords.hash(&req.password)?;
    let user = state
        .users
        .create(User::new(&req.username, &email, password_hash))
        .await?;
    let token = issue_token(&state, &user)?;

    tracing::info!(user_id = %user.id, username = %user.username, "User registered");

    Ok(HttpResponse::Created().json(ApiResponse::ok_with_message(
        AuthPayload {
            token,
            user: UserResponse::from(&user),
        },
        "User registered successfully",
    )))
}

/// POST /api/auth/login
pub async fn login(
    state: web::Data<AppState>,
    body: web::Json<LoginRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();
    req.validate()?;

    let user = state
        .users
        .find_by_email(&normalize_email(&req.email))
        .await?
        .ok_or(AuthError::InvalidCredentials)?;

    if !state.passwords.verify(&req.password, &user.password_hash)? {
        tracing::debug!(user_id = %user.id, "Login rejected: wrong password");
        return Err(AuthError::InvalidCredentials.into());
    }

    let token = issue_token(&state, &user)?;

    Ok(HttpResponse::Ok().json(ApiResponse::ok_with_message(
        AuthPayload {
            token,
            user: UserResponse::from(&user),
        },
        "Login successful",
    )))
}

/// GET /api/auth/me
pub async fn me(AuthUser(user): AuthUser) -> AppResult<HttpResponse> {
    Ok(HttpResponse::Ok().json(ApiResponse::ok(UserPayload {
        user: UserResponse::from(&user),
    })))
}

/// PUT /api/auth/password
pub async fn change_password(
    state: web::Data<AppState>,
    AuthUser(mut user): AuthUser,
    body: web::Json<ChangePasswordRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();
    req.validate()?;

    if !state.passwords.verify(&req.current_password, &user.password_hash)? {
        return Err(DomainError::Validation("Current password is incorrect".to_string()).into());
    }

    user.set_password_hash(state.passwords.hash(&req.new_password)?);
    let user = state.users.update(user).await?;

    tracing::info!(user_id = %user.id, "Password changed");

    Ok(HttpResponse::Ok().json(ApiResponse::message("Password updated successfully")))
}
