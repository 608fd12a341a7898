//! Post handlers: publishing, listing, likes and aggregate stats.

use actix_web::{HttpResponse, web};
use uuid::Uuid;
use validator::Validate;

use hub_core::domain::{PageRequest, PlatformStats, Post, PostFilter, TRENDING_TAG_LIMIT};
use hub_core::{DomainError, RepoError};
use hub_shared::ApiResponse;
use hub_shared::dto::{
    CreatePostRequest, FeaturedPostsPayload, LikePayload, ListPostsQuery, PageQuery, Pagination,
    PlatformStatsPayload, PostListPayload, PostPayload, PostResponse, TagCountResponse,
    TrendingTagsPayload, UpdatePostRequest,
};

use super::summaries;
use crate::middleware::auth::{AuthUser, OptionalAuthUser};
use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

/// Number of posts shown on the featured strip.
const FEATURED_LIMIT: u64 = 6;

/// Post ids in paths that do not parse can never match a post.
fn parse_post_id(raw: &str) -> AppResult<Uuid> {
    Uuid::parse_str(raw).map_err(|_| DomainError::post_not_found(raw).into())
}

fn post_not_found(id: Uuid) -> impl FnOnce(RepoError) -> AppError {
    move |err| match err {
        RepoError::NotFound => DomainError::post_not_found(id.to_string()).into(),
        other => other.into(),
    }
}

/// Resolve `key` as an id first, then as a slug.
async fn find_post(state: &AppState, key: &str) -> AppResult<Post> {
    if let Ok(id) = Uuid::parse_str(key) {
        if let Some(post) = state.posts.find_by_id(id).await? {
            return Ok(post);
        }
    }

    state
        .posts
        .find_by_slug(key)
        .await?
        .ok_or_else(|| DomainError::post_not_found(key).into())
}

/// Load a post the caller owns; anyone else gets 403 for `action`.
async fn owned_post(
    state: &AppState,
    raw_id: &str,
    owner: Uuid,
    action: &'static str,
) -> AppResult<Post> {
    let id = parse_post_id(raw_id)?;
    let post = state
        .posts
        .find_by_id(id)
        .await?
        .ok_or_else(|| DomainError::post_not_found(id.to_string()))?;

    if !post.is_owned_by(owner) {
        tracing::warn!(post_id = %id, user_id = %owner, action, "Rejected non-owner");
        return Err(DomainError::Forbidden(action).into());
    }

    Ok(post)
}

/// GET /api/posts
pub async fn list_posts(
    state: web::Data<AppState>,
    viewer: OptionalAuthUser,
    query: web::Query<ListPostsQuery>,
) -> AppResult<HttpResponse> {
    let filter = PostFilter {
        published_only: true,
        ..query.to_filter()?
    };
    let page = query.page_request();

    let (posts, total) = state.posts.list(&filter, page).await?;
    let posts = summaries(&state, &posts, viewer.id()).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::ok(PostListPayload {
        posts,
        pagination: Pagination::new(page, total),
    })))
}

/// GET /api/posts/featured
pub async fn featured_posts(
    state: web::Data<AppState>,
    viewer: OptionalAuthUser,
) -> AppResult<HttpResponse> {
    let filter = PostFilter {
        featured_only: true,
        ..PostFilter::published()
    };

    let (posts, _) = state
        .posts
        .list(&filter, PageRequest::new(Some(1), Some(FEATURED_LIMIT)))
        .await?;
    let posts = summaries(&state, &posts, viewer.id()).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::ok(FeaturedPostsPayload { posts })))
}

/// GET /api/posts/{id_or_slug}
pub async fn get_post(
    state: web::Data<AppState>,
    viewer: OptionalAuthUser,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    let mut post = find_post(&state, &path).await?;

    state.posts.increment_views(post.id).await?;
    post.views += 1;

    let author = state.users.find_by_id(post.author_id).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::ok(PostPayload {
        post: PostResponse::new(&post, author.as_ref(), viewer.id()),
    })))
}

/// POST /api/posts
pub async fn create_post(
    state: web::Data<AppState>,
    AuthUser(user): AuthUser,
    body: web::Json<CreatePostRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();
    req.validate()?;

    let post = state
        .posts
        .create(Post::new(user.id, req.into_new_post()?))
        .await?;

    tracing::info!(post_id = %post.id, slug = %post.slug, author_id = %user.id, "Post created");

    Ok(HttpResponse::Created().json(ApiResponse::ok_with_message(
        PostPayload {
            post: PostResponse::new(&post, Some(&user), Some(user.id)),
        },
        "Post created successfully",
    )))
}

/// PUT /api/posts/{id}
///
/// The body is parsed only after ownership is established, so a non-owner
/// sees 403 whatever they sent.
pub async fn update_post(
    state: web::Data<AppState>,
    AuthUser(user): AuthUser,
    path: web::Path<String>,
    body: web::Bytes,
) -> AppResult<HttpResponse> {
    let mut post = owned_post(&state, &path, user.id, "update this post").await?;

    let req: UpdatePostRequest = serde_json::from_slice(&body)
        .map_err(|e| AppError::BadRequest(format!("Invalid request body: {e}")))?;
    req.validate()?;

    post.apply(req.into_patch()?);
    let post = state.posts.update(post).await?;

    tracing::info!(post_id = %post.id, "Post updated");

    Ok(HttpResponse::Ok().json(ApiResponse::ok_with_message(
        PostPayload {
            post: PostResponse::new(&post, Some(&user), Some(user.id)),
        },
        "Post updated successfully",
    )))
}

/// GET /api/posts/edit/{id}
pub async fn post_for_edit(
    state: web::Data<AppState>,
    AuthUser(user): AuthUser,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    let post = owned_post(&state, &path, user.id, "edit this post").await?;

    Ok(HttpResponse::Ok().json(ApiResponse::ok(PostPayload {
        post: PostResponse::new(&post, Some(&user), Some(user.id)),
    })))
}

/// DELETE /api/posts/{id}
pub async fn delete_post(
    state: web::Data<AppState>,
    AuthUser(user): AuthUser,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    let post = owned_post(&state, &path, user.id, "delete this post").await?;

    state
        .posts
        .delete(post.id)
        .await
        .map_err(post_not_found(post.id))?;

    tracing::info!(post_id = %post.id, "Post deleted");

    Ok(HttpResponse::Ok().json(ApiResponse::message("Post deleted successfully")))
}

/// POST /api/posts/{id}/like
pub async fn toggle_like(
    state: web::Data<AppState>,
    user: AuthUser,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    let id = parse_post_id(&path)?;

    let toggle = state
        .posts
        .toggle_like(id, user.id())
        .await
        .map_err(post_not_found(id))?;

    let message = if toggle.liked { "Post liked" } else { "Post unliked" };

    Ok(HttpResponse::Ok().json(ApiResponse::ok_with_message(
        LikePayload {
            liked: toggle.liked,
            likes_count: toggle.likes_count,
        },
        message,
    )))
}

/// GET /api/posts/user/my-posts
pub async fn my_posts(
    state: web::Data<AppState>,
    AuthUser(user): AuthUser,
    query: web::Query<PageQuery>,
) -> AppResult<HttpResponse> {
    let page = query.page_request();

    let (posts, total) = state
        .posts
        .list(&PostFilter::by_author(user.id), page)
        .await?;
    let posts = summaries(&state, &posts, Some(user.id)).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::ok(PostListPayload {
        posts,
        pagination: Pagination::new(page, total),
    })))
}

/// GET /api/posts/stats/trending-tags
pub async fn trending_tags(state: web::Data<AppState>) -> AppResult<HttpResponse> {
    let tags = state.posts.trending_tags(TRENDING_TAG_LIMIT).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::ok(TrendingTagsPayload {
        trending_tags: tags.into_iter().map(TagCountResponse::from).collect(),
    })))
}

/// GET /api/posts/stats/platform
pub async fn platform_stats(state: web::Data<AppState>) -> AppResult<HttpResponse> {
    let stats = PlatformStats {
        total_posts: state.posts.count_published().await?,
        total_users: state.users.count().await?,
        categories: state.posts.category_counts().await?,
        difficulties: state.posts.difficulty_counts().await?,
    };

    Ok(HttpResponse::Ok().json(ApiResponse::ok(PlatformStatsPayload::from(stats))))
}
