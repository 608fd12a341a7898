//! Data Transfer Objects - request/response types for the API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use hub_core::DomainError;
use hub_core::domain::{
    Category, Facet, NewPost, PageRequest, PlatformStats, Post, PostFilter, PostPatch, Profile,
    ProfilePatch, SkillLevel, TagCount, User, UserPatch,
};

use crate::validation;

// ---------------------------------------------------------------------------
// Auth requests
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(
        length(min = 3, max = 30, message = "Username must be between 3 and 30 characters"),
        custom(function = "validation::username_chars")
    )]
    pub username: String,
    #[validate(email(message = "Please provide a valid email"))]
    pub email: String,
    #[validate(length(min = 6, message = "Password must be at least 6 characters long"))]
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(custom(function = "validation::not_blank"))]
    pub email: String,
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    #[validate(length(min = 1, message = "Current password is required"))]
    pub current_password: String,
    #[validate(length(min = 6, message = "Password must be at least 6 characters long"))]
    pub new_password: String,
}

// ---------------------------------------------------------------------------
// Post requests
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreatePostRequest {
    #[validate(
        custom(function = "validation::not_blank"),
        length(max = 200, message = "Title cannot exceed 200 characters")
    )]
    pub title: String,
    #[validate(custom(function = "validation::not_blank"))]
    pub content: String,
    #[validate(length(max = 300, message = "Excerpt cannot exceed 300 characters"))]
    pub excerpt: Option<String>,
    #[validate(custom(function = "validation::github_repo"))]
    pub github_repo: String,
    pub live_demo: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[validate(custom(function = "validation::skill_level"))]
    pub difficulty: String,
    #[validate(custom(function = "validation::category"))]
    pub category: String,
    pub featured_image: Option<String>,
}

impl CreatePostRequest {
    pub fn into_new_post(self) -> Result<NewPost, DomainError> {
        Ok(NewPost {
            difficulty: self.difficulty.parse()?,
            category: self.category.parse()?,
            title: self.title,
            content: self.content,
            excerpt: self.excerpt,
            github_repo: self.github_repo,
            live_demo: self.live_demo,
            tags: self.tags,
            featured_image: self.featured_image,
        })
    }
}

/// Partial post update; absent fields are left untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePostRequest {
    #[validate(
        custom(function = "validation::not_blank"),
        length(max = 200, message = "Title cannot exceed 200 characters")
    )]
    pub title: Option<String>,
    #[validate(custom(function = "validation::not_blank"))]
    pub content: Option<String>,
    #[validate(length(max = 300, message = "Excerpt cannot exceed 300 characters"))]
    pub excerpt: Option<String>,
    #[validate(custom(function = "validation::github_repo"))]
    pub github_repo: Option<String>,
    pub live_demo: Option<String>,
    pub tags: Option<Vec<String>>,
    #[validate(custom(function = "validation::skill_level"))]
    pub difficulty: Option<String>,
    #[validate(custom(function = "validation::category"))]
    pub category: Option<String>,
    pub featured_image: Option<String>,
    pub is_published: Option<bool>,
}

impl UpdatePostRequest {
    pub fn into_patch(self) -> Result<PostPatch, DomainError> {
        Ok(PostPatch {
            difficulty: self.difficulty.as_deref().map(str::parse).transpose()?,
            category: self.category.as_deref().map(str::parse).transpose()?,
            title: self.title,
            content: self.content,
            excerpt: self.excerpt,
            github_repo: self.github_repo,
            live_demo: self.live_demo,
            tags: self.tags,
            featured_image: self.featured_image,
            is_published: self.is_published,
        })
    }
}

// ---------------------------------------------------------------------------
// User requests
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct ProfileRequest {
    #[validate(length(max = 500, message = "Bio cannot exceed 500 characters"))]
    pub bio: Option<String>,
    pub skills: Option<Vec<String>>,
    #[validate(custom(function = "validation::skill_level"))]
    pub experience: Option<String>,
    pub github: Option<String>,
    pub linkedin: Option<String>,
    pub website: Option<String>,
    pub avatar: Option<String>,
}

impl ProfileRequest {
    pub fn into_patch(self) -> Result<ProfilePatch, DomainError> {
        Ok(ProfilePatch {
            experience: self.experience.as_deref().map(str::parse).transpose()?,
            bio: self.bio,
            skills: self.skills,
            github: self.github,
            linkedin: self.linkedin,
            website: self.website,
            avatar: self.avatar,
        })
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct UpdateUserRequest {
    #[validate(
        length(min = 3, max = 30, message = "Username must be between 3 and 30 characters"),
        custom(function = "validation::username_chars")
    )]
    pub username: Option<String>,
    #[validate(email(message = "Please provide a valid email"))]
    pub email: Option<String>,
    #[validate(nested)]
    pub profile: Option<ProfileRequest>,
}

impl UpdateUserRequest {
    pub fn into_patch(self) -> Result<UserPatch, DomainError> {
        Ok(UserPatch {
            username: self.username,
            email: self.email,
            profile: self.profile.map(ProfileRequest::into_patch).transpose()?,
        })
    }
}

// ---------------------------------------------------------------------------
// Query strings
// ---------------------------------------------------------------------------

/// `?page&limit`
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct PageQuery {
    pub page: Option<u64>,
    pub limit: Option<u64>,
}

impl PageQuery {
    pub fn page_request(&self) -> PageRequest {
        PageRequest::new(self.page, self.limit)
    }
}

/// `GET /api/posts` filters. Empty values mean "no filter".
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ListPostsQuery {
    pub page: Option<u64>,
    pub limit: Option<u64>,
    pub category: Option<String>,
    pub difficulty: Option<String>,
    pub search: Option<String>,
    pub tag: Option<String>,
}

impl ListPostsQuery {
    pub fn page_request(&self) -> PageRequest {
        PageRequest::new(self.page, self.limit)
    }

    /// Filter over published posts; an unknown category or difficulty is an error.
    pub fn to_filter(&self) -> Result<PostFilter, DomainError> {
        Ok(PostFilter {
            category: self
                .category
                .as_deref()
                .filter(|c| !c.is_empty())
                .map(str::parse)
                .transpose()?,
            difficulty: self
                .difficulty
                .as_deref()
                .filter(|d| !d.is_empty())
                .map(str::parse)
                .transpose()?,
            search: self.search.clone(),
            tag: self.tag.clone(),
            ..PostFilter::published()
        })
    }
}

// ---------------------------------------------------------------------------
// Responses
// ---------------------------------------------------------------------------

/// The caller's own account, as returned by register/login/me and profile updates.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub profile: Profile,
    pub saved_posts: Vec<Uuid>,
    pub is_verified: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&User> for UserResponse {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
            email: user.email.clone(),
            profile: user.profile.clone(),
            saved_posts: user.saved_posts.clone(),
            is_verified: user.is_verified,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

/// Someone else's account: no email, no bookmarks.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicUserResponse {
    pub id: Uuid,
    pub username: String,
    pub profile: Profile,
    pub is_verified: bool,
    pub created_at: DateTime<Utc>,
}

impl From<&User> for PublicUserResponse {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
            profile: user.profile.clone(),
            is_verified: user.is_verified,
            created_at: user.created_at,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorSummary {
    pub id: Uuid,
    pub username: String,
    pub avatar: String,
}

impl From<&User> for AuthorSummary {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
            avatar: user.profile.avatar.clone(),
        }
    }
}

/// A full post, for the detail page and the editor.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostResponse {
    pub id: Uuid,
    pub title: String,
    pub slug: String,
    pub content: String,
    pub excerpt: String,
    pub github_repo: String,
    pub live_demo: String,
    pub tags: Vec<String>,
    pub difficulty: SkillLevel,
    pub category: Category,
    pub featured_image: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<AuthorSummary>,
    pub likes_count: u64,
    pub is_liked: bool,
    pub views: u64,
    pub read_time: u32,
    pub is_published: bool,
    pub is_featured: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl PostResponse {
    pub fn new(post: &Post, author: Option<&User>, viewer: Option<Uuid>) -> Self {
        Self {
            id: post.id,
            title: post.title.clone(),
            slug: post.slug.clone(),
            content: post.content.clone(),
            excerpt: post.excerpt.clone(),
            github_repo: post.github_repo.clone(),
            live_demo: post.live_demo.clone(),
            tags: post.tags.clone(),
            difficulty: post.difficulty,
            category: post.category,
            featured_image: post.featured_image.clone(),
            author: author.map(AuthorSummary::from),
            likes_count: post.likes_count(),
            is_liked: viewer.is_some_and(|id| post.is_liked_by(id)),
            views: post.views,
            read_time: post.read_time,
            is_published: post.is_published,
            is_featured: post.is_featured,
            created_at: post.created_at,
            updated_at: post.updated_at,
        }
    }
}

/// A post in a listing: everything but the body.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostSummary {
    pub id: Uuid,
    pub title: String,
    pub slug: String,
    pub excerpt: String,
    pub github_repo: String,
    pub tags: Vec<String>,
    pub difficulty: SkillLevel,
    pub category: Category,
    pub featured_image: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<AuthorSummary>,
    pub likes_count: u64,
    pub is_liked: bool,
    pub views: u64,
    pub read_time: u32,
    pub is_published: bool,
    pub is_featured: bool,
    pub created_at: DateTime<Utc>,
}

impl PostSummary {
    pub fn new(post: &Post, author: Option<&User>, viewer: Option<Uuid>) -> Self {
        Self {
            id: post.id,
            title: post.title.clone(),
            slug: post.slug.clone(),
            excerpt: post.excerpt.clone(),
            github_repo: post.github_repo.clone(),
            tags: post.tags.clone(),
            difficulty: post.difficulty,
            category: post.category,
            featured_image: post.featured_image.clone(),
            author: author.map(AuthorSummary::from),
            likes_count: post.likes_count(),
            is_liked: viewer.is_some_and(|id| post.is_liked_by(id)),
            views: post.views,
            read_time: post.read_time,
            is_published: post.is_published,
            is_featured: post.is_featured,
            created_at: post.created_at,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub current_page: u64,
    pub total_pages: u64,
    pub total_posts: u64,
    pub has_next: bool,
    pub has_prev: bool,
}

impl Pagination {
    pub fn new(page: PageRequest, total: u64) -> Self {
        Self {
            current_page: page.page,
            total_pages: total.div_ceil(page.limit),
            total_posts: total,
            has_next: page.page.saturating_mul(page.limit) < total,
            has_prev: page.page > 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagCountResponse {
    pub tag: String,
    pub count: u64,
}

impl From<TagCount> for TagCountResponse {
    fn from(tag: TagCount) -> Self {
        Self {
            tag: tag.tag,
            count: tag.count,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryStat {
    pub category: Category,
    pub count: u64,
}

impl From<Facet<Category>> for CategoryStat {
    fn from(facet: Facet<Category>) -> Self {
        Self {
            category: facet.value,
            count: facet.count,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DifficultyStat {
    pub difficulty: SkillLevel,
    pub count: u64,
}

impl From<Facet<SkillLevel>> for DifficultyStat {
    fn from(facet: Facet<SkillLevel>) -> Self {
        Self {
            difficulty: facet.value,
            count: facet.count,
        }
    }
}

// ---------------------------------------------------------------------------
// Payloads (flattened into `ApiResponse`)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthPayload {
    pub token: String,
    pub user: UserResponse,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserPayload {
    pub user: UserResponse,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostPayload {
    pub post: PostResponse,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostListPayload {
    pub posts: Vec<PostSummary>,
    pub pagination: Pagination,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeaturedPostsPayload {
    pub posts: Vec<PostSummary>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LikePayload {
    pub liked: bool,
    pub likes_count: u64,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SavePayload {
    pub saved: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrendingTagsPayload {
    pub trending_tags: Vec<TagCountResponse>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlatformStatsPayload {
    pub total_posts: u64,
    pub total_users: u64,
    pub category_stats: Vec<CategoryStat>,
    pub difficulty_stats: Vec<DifficultyStat>,
}

impl From<PlatformStats> for PlatformStatsPayload {
    fn from(stats: PlatformStats) -> Self {
        Self {
            total_posts: stats.total_posts,
            total_users: stats.total_users,
            category_stats: stats.categories.into_iter().map(CategoryStat::from).collect(),
            difficulty_stats: stats
                .difficulties
                .into_iter()
                .map(DifficultyStat::from)
                .collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfilePagePayload {
    pub user: PublicUserResponse,
    pub posts: Vec<PostSummary>,
    pub total_posts: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedPostsPayload {
    pub saved_posts: Vec<PostSummary>,
    pub pagination: Pagination,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub timestamp: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::field_errors;

    fn create_request() -> CreatePostRequest {
        CreatePostRequest {
            title: "Hello World".to_string(),
            content: "Some content".to_string(),
            excerpt: None,
            github_repo: "https://github.com/alice/hello".to_string(),
            live_demo: None,
            tags: vec![],
            difficulty: "Beginner".to_string(),
            category: "Web App".to_string(),
            featured_image: None,
        }
    }

    #[test]
    fn test_register_validation_reports_camel_case_fields() {
        let request = RegisterRequest {
            username: "a!".to_string(),
            email: "nope".to_string(),
            password: "123".to_string(),
        };

        let errors = field_errors(&request.validate().unwrap_err());
        let fields: Vec<&str> = errors.iter().map(|e| e.field.as_str()).collect();

        assert!(fields.contains(&"username"));
        assert!(fields.contains(&"email"));
        assert!(fields.contains(&"password"));
    }

    #[test]
    fn test_create_post_rejects_bad_repo_and_enum() {
        let request = CreatePostRequest {
            github_repo: "https://gitlab.com/alice/hello".to_string(),
            category: "Spaceship".to_string(),
            ..create_request()
        };

        let errors = field_errors(&request.validate().unwrap_err());
        let fields: Vec<&str> = errors.iter().map(|e| e.field.as_str()).collect();

        assert_eq!(fields, vec!["category", "githubRepo"]);
    }

    #[test]
    fn test_create_post_into_domain() {
        let request = create_request();
        assert!(request.validate().is_ok());

        let new_post = request.into_new_post().unwrap();
        assert_eq!(new_post.category, Category::WebApp);
        assert_eq!(new_post.difficulty, SkillLevel::Beginner);
    }

    #[test]
    fn test_empty_update_is_valid() {
        let request: UpdatePostRequest = serde_json::from_str("{}").unwrap();

        assert!(request.validate().is_ok());
        let patch = request.into_patch().unwrap();
        assert!(patch.title.is_none() && patch.is_published.is_none());
    }

    #[test]
    fn test_nested_profile_errors_are_prefixed() {
        let request = UpdateUserRequest {
            profile: Some(ProfileRequest {
                bio: Some("x".repeat(501)),
                ..Default::default()
            }),
            ..Default::default()
        };

        let errors = field_errors(&request.validate().unwrap_err());
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "profile.bio");
    }

    #[test]
    fn test_list_query_filters() {
        let query = ListPostsQuery {
            category: Some("API".to_string()),
            difficulty: Some(String::new()),
            tag: Some("Rust".to_string()),
            ..Default::default()
        };

        let filter = query.to_filter().unwrap();
        assert!(filter.published_only);
        assert_eq!(filter.category, Some(Category::Api));
        assert_eq!(filter.difficulty, None);
        assert_eq!(filter.tag_term().as_deref(), Some("rust"));

        let bad = ListPostsQuery {
            category: Some("Spaceship".to_string()),
            ..Default::default()
        };
        assert!(bad.to_filter().is_err());
    }

    #[test]
    fn test_pagination_flags() {
        let page = PageRequest::new(Some(2), Some(10));
        let pagination = Pagination::new(page, 25);

        assert_eq!(pagination.total_pages, 3);
        assert!(pagination.has_next);
        assert!(pagination.has_prev);

        let last = Pagination::new(PageRequest::new(Some(3), Some(10)), 25);
        assert!(!last.has_next);
    }

    #[test]
    fn test_pagination_saturates_on_huge_pages() {
        let page = PageRequest {
            page: u64::MAX,
            limit: PageRequest::MAX_LIMIT,
        };
        let pagination = Pagination::new(page, 3);

        assert!(!pagination.has_next);
        assert!(pagination.has_prev);
    }

    #[test]
    fn test_user_response_never_carries_password() {
        let user = User::new("alice", "alice@example.com", "$argon2id$secret".to_string());
        let json = serde_json::to_string(&UserResponse::from(&user)).unwrap();

        assert!(!json.contains("argon2"));
        assert!(!json.to_lowercase().contains("password"));
        assert!(json.contains("savedPosts"));
    }

    #[test]
    fn test_category_serializes_with_display_name() {
        let stat = CategoryStat {
            category: Category::CliTool,
            count: 2,
        };

        assert_eq!(
            serde_json::to_value(stat).unwrap(),
            serde_json::json!({"category": "CLI Tool", "count": 2})
        );
    }
}
