//! User profile and bookmark handlers.

use actix_web::{HttpResponse, web};
use uuid::Uuid;
use validator::Validate;

use hub_core::domain::{PageRequest, PostFilter, User, normalize_email};
use hub_core::{DomainError, RepoError};
use hub_shared::ApiResponse;
use hub_shared::dto::{
    PageQuery, Pagination, ProfilePagePayload, PostSummary, PublicUserResponse, SavePayload,
    SavedPostsPayload, UpdateUserRequest, UserPayload, UserResponse,
};

use super::summaries;
use crate::middleware::auth::{AuthUser, OptionalAuthUser};
use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

/// GET /api/users/{id_or_username}
///
/// Lists the user's most recent published posts; `limit` defaults to the
/// listing maximum.
pub async fn get_profile(
    state: web::Data<AppState>,
    viewer: OptionalAuthUser,
    path: web::Path<String>,
    query: web::Query<PageQuery>,
) -> AppResult<HttpResponse> {
    let key = path.into_inner();

    let by_id = match Uuid::parse_str(&key) {
        Ok(id) => state.users.find_by_id(id).await?,
        Err(_) => None,
    };
    let user = match by_id {
        Some(user) => user,
        None => state
            .users
            .find_by_username(&key)
            .await?
            .ok_or_else(|| DomainError::user_not_found(key.as_str()))?,
    };

    let filter = PostFilter {
        published_only: true,
        ..PostFilter::by_author(user.id)
    };
    let page = PageRequest::new(query.page, query.limit.or(Some(PageRequest::MAX_LIMIT)));
    let (posts, total) = state.posts.list(&filter, page).await?;

    let viewer = viewer.id();
    let posts = posts
        .iter()
        .map(|post| PostSummary::new(post, Some(&user), viewer))
        .collect();

    Ok(HttpResponse::Ok().json(ApiResponse::ok(ProfilePagePayload {
        user: PublicUserResponse::from(&user),
        posts,
        total_posts: total,
    })))
}

/// PUT /api/users/{id}
pub async fn update_profile(
    state: web::Data<AppState>,
    AuthUser(user): AuthUser,
    path: web::Path<String>,
    body: web::Bytes,
) -> AppResult<HttpResponse> {
    if Uuid::parse_str(&path).ok() != Some(user.id) {
        tracing::warn!(target_user = %path, user_id = %user.id, "Rejected profile update of another user");
        return Err(DomainError::Forbidden("update this profile").into());
    }

    apply_update(&state, user, &body).await
}

/// PUT /api/users/profile
pub async fn update_own_profile(
    state: web::Data<AppState>,
    AuthUser(user): AuthUser,
    body: web::Bytes,
) -> AppResult<HttpResponse> {
    apply_update(&state, user, &body).await
}

async fn apply_update(state: &AppState, mut user: User, body: &[u8]) -> AppResult<HttpResponse> {
    let req: UpdateUserRequest = serde_json::from_slice(body)
        .map_err(|e| AppError::BadRequest(format!("Invalid request body: {e}")))?;
    req.validate()?;

    if let Some(username) = req.username.as_deref().map(str::trim) {
        if username != user.username && state.users.find_by_username(username).await?.is_some() {
            return Err(DomainError::Duplicate("Username already taken".to_string()).into());
        }
    }
    if let Some(email) = req.email.as_deref().map(normalize_email) {
        if email != user.email && state.users.find_by_email(&email).await?.is_some() {
            return Err(DomainError::Duplicate("Email already registered".to_string()).into());
        }
    }

    user.apply(req.into_patch()?);
    let user = state.users.update(user).await?;

    tracing::info!(user_id = %user.id, "Profile updated");

    Ok(HttpResponse::Ok().json(ApiResponse::ok_with_message(
        UserPayload {
            user: UserResponse::from(&user),
        },
        "Profile updated successfully",
    )))
}

/// POST /api/users/save-post/{post_id}
pub async fn toggle_saved(
    state: web::Data<AppState>,
    user: AuthUser,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    let post_id = Uuid::parse_str(&path).map_err(|_| DomainError::post_not_found(path.as_str()))?;

    if state.posts.find_by_id(post_id).await?.is_none() {
        return Err(DomainError::post_not_found(post_id.to_string()).into());
    }

    let saved = state
        .users
        .toggle_saved_post(user.id(), post_id)
        .await
        .map_err(|e| match e {
            RepoError::NotFound => AppError::from(DomainError::user_not_found(user.id().to_string())),
            other => other.into(),
        })?;

    let message = if saved {
        "Post saved successfully"
    } else {
        "Post removed from saved"
    };

    Ok(HttpResponse::Ok().json(ApiResponse::ok_with_message(SavePayload { saved }, message)))
}

/// GET /api/users/saved/posts
pub async fn saved_posts(
    state: web::Data<AppState>,
    AuthUser(user): AuthUser,
    query: web::Query<PageQuery>,
) -> AppResult<HttpResponse> {
    let page = query.page_request();

    let posts = state
        .posts
        .find_by_ids(page.slice(&user.saved_posts))
        .await?;
    let saved_posts = summaries(&state, &posts, Some(user.id)).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::ok(SavedPostsPayload {
        saved_posts,
        pagination: Pagination::new(page, user.saved_posts.len() as u64),
    })))
}
