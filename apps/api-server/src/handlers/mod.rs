//! HTTP handlers and route configuration.

mod auth;
mod health;
mod posts;
mod users;

use std::collections::HashMap;

use actix_web::web;
use uuid::Uuid;

use hub_core::domain::{Post, User};
use hub_shared::dto::PostSummary;

use crate::middleware::error::{AppResult, json_error_handler, query_error_handler};
use crate::middleware::rate_limit::RateLimitMiddleware;
use crate::state::AppState;

/// Register shared state, extractor error handlers and every route.
pub fn configure(cfg: &mut web::ServiceConfig, state: &AppState) {
    cfg.app_data(web::Data::new(state.clone()))
        .app_data(web::JsonConfig::default().error_handler(json_error_handler))
        .app_data(web::QueryConfig::default().error_handler(query_error_handler))
        .configure(|cfg| configure_routes(cfg, state));
}

/// Configure all application routes. Literal segments are registered before
/// the `{id}` catch-alls that would otherwise shadow them.
pub fn configure_routes(cfg: &mut web::ServiceConfig, state: &AppState) {
    cfg.service(
        web::scope("/api")
            .route("/health", web::get().to(health::health_check))
            .service(
                web::scope("/auth")
                    .wrap(RateLimitMiddleware::new(state.rate_limiter.clone()))
                    .route("/register", web::post().to(auth::register))
                    .route("/login", web::post().to(auth::login))
                    .route("/me", web::get().to(auth::me))
                    .route("/password", web::put().to(auth::change_password)),
            )
            .service(
                web::scope("/posts")
                    .route("", web::get().to(posts::list_posts))
                    .route("", web::post().to(posts::create_post))
                    .route("/featured", web::get().to(posts::featured_posts))
                    .route("/stats/trending-tags", web::get().to(posts::trending_tags))
                    .route("/stats/platform", web::get().to(posts::platform_stats))
                    .route("/user/my-posts", web::get().to(posts::my_posts))
                    .route("/edit/{id}", web::get().to(posts::post_for_edit))
                    .route("/{id}/like", web::post().to(posts::toggle_like))
                    .route("/{id_or_slug}", web::get().to(posts::get_post))
                    .route("/{id}", web::put().to(posts::update_post))
                    .route("/{id}", web::delete().to(posts::delete_post)),
            )
            .service(
                web::scope("/users")
                    .route("/profile", web::put().to(users::update_own_profile))
                    .route("/saved/posts", web::get().to(users::saved_posts))
                    .route("/save-post/{post_id}", web::post().to(users::toggle_saved))
                    .route("/{id_or_username}", web::get().to(users::get_profile))
                    .route("/{id}", web::put().to(users::update_profile)),
            ),
    );
}

/// Load the authors of `posts` in one lookup, keyed by id.
async fn authors_of(state: &AppState, posts: &[Post]) -> AppResult<HashMap<Uuid, User>> {
    let mut ids: Vec<Uuid> = posts.iter().map(|post| post.author_id).collect();
    ids.sort_unstable();
    ids.dedup();

    let authors = state.users.find_by_ids(&ids).await?;
    Ok(authors.into_iter().map(|user| (user.id, user)).collect())
}

/// Listing cards for `posts`, each with its author summary.
async fn summaries(
    state: &AppState,
    posts: &[Post],
    viewer: Option<Uuid>,
) -> AppResult<Vec<PostSummary>> {
    let authors = authors_of(state, posts).await?;

    Ok(posts
        .iter()
        .map(|post| PostSummary::new(post, authors.get(&post.author_id), viewer))
        .collect())
}
