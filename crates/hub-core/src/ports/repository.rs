use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{
    Category, Facet, PageRequest, Post, PostFilter, SkillLevel, TagCount, User,
};
use crate::error::RepoError;

/// Generic repository trait defining the shared persistence operations.
#[async_trait]
pub trait BaseRepository<T, ID>: Send + Sync {
    /// Find an entity by its unique ID.
    async fn find_by_id(&self, id: ID) -> Result<Option<T>, RepoError>;

    /// Insert a new entity.
    async fn create(&self, entity: T) -> Result<T, RepoError>;

    /// Overwrite an existing entity.
    async fn update(&self, entity: T) -> Result<T, RepoError>;
}

/// Outcome of a like toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LikeToggle {
    pub liked: bool,
    pub likes_count: u64,
}

/// User repository with domain-specific methods.
#[async_trait]
pub trait UserRepository: BaseRepository<User, Uuid> {
    /// Find a user by their (normalized) email address.
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepoError>;

    /// Find a user by exact username.
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepoError>;

    /// Fetch several users at once; missing ids are skipped.
    async fn find_by_ids(&self, ids: &[Uuid]) -> Result<Vec<User>, RepoError>;

    async fn count(&self) -> Result<u64, RepoError>;

    /// Atomically add `post_id` to the user's saved posts if absent, or remove it if present.
    /// Returns whether the post is saved afterwards.
    async fn toggle_saved_post(&self, user_id: Uuid, post_id: Uuid) -> Result<bool, RepoError>;
}

/// Post repository.
#[async_trait]
pub trait PostRepository: BaseRepository<Post, Uuid> {
    async fn find_by_slug(&self, slug: &str) -> Result<Option<Post>, RepoError>;

    /// Fetch several posts at once, in the order of `ids`; missing ids are skipped.
    async fn find_by_ids(&self, ids: &[Uuid]) -> Result<Vec<Post>, RepoError>;

    /// Matching posts for one page, newest first, plus the total match count.
    async fn list(
        &self,
        filter: &PostFilter,
        page: PageRequest,
    ) -> Result<(Vec<Post>, u64), RepoError>;

    /// Delete a post and pull it out of every user's saved posts.
    async fn delete(&self, id: Uuid) -> Result<(), RepoError>;

    /// Atomically bump the view counter.
    async fn increment_views(&self, id: Uuid) -> Result<(), RepoError>;

    /// Atomically add `user_id` to the post's likes if absent, or remove it if present.
    async fn toggle_like(&self, post_id: Uuid, user_id: Uuid) -> Result<LikeToggle, RepoError>;

    /// Most used tags across published posts.
    async fn trending_tags(&self, limit: u64) -> Result<Vec<TagCount>, RepoError>;

    async fn count_published(&self) -> Result<u64, RepoError>;

    /// Published posts per category, most populated first.
    async fn category_counts(&self) -> Result<Vec<Facet<Category>>, RepoError>;

    /// Published posts per difficulty.
    async fn difficulty_counts(&self) -> Result<Vec<Facet<SkillLevel>>, RepoError>;
}
