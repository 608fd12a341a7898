use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::content::{excerpt_from, normalize_tags, read_time_minutes, slugify};
use super::featured_image::pick_featured_image;
use super::level::SkillLevel;
use crate::error::DomainError;

/// Closed set of project categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    #[serde(rename = "Web App")]
    WebApp,
    #[serde(rename = "Mobile App")]
    MobileApp,
    #[serde(rename = "API")]
    Api,
    #[serde(rename = "Desktop App")]
    DesktopApp,
    Game,
    #[serde(rename = "CLI Tool")]
    CliTool,
    Library,
    Other,
}

impl Category {
    pub const ALL: [Category; 8] = [
        Category::WebApp,
        Category::MobileApp,
        Category::Api,
        Category::DesktopApp,
        Category::Game,
        Category::CliTool,
        Category::Library,
        Category::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::WebApp => "Web App",
            Category::MobileApp => "Mobile App",
            Category::Api => "API",
            Category::DesktopApp => "Desktop App",
            Category::Game => "Game",
            Category::CliTool => "CLI Tool",
            Category::Library => "Library",
            Category::Other => "Other",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|category| category.as_str() == s)
            .ok_or_else(|| DomainError::InvalidValue {
                field: "category",
                value: s.to_string(),
            })
    }
}

/// Input for publishing a new post.
#[derive(Debug, Clone)]
pub struct NewPost {
    pub title: String,
    pub content: String,
    pub excerpt: Option<String>,
    pub github_repo: String,
    pub live_demo: Option<String>,
    pub tags: Vec<String>,
    pub difficulty: SkillLevel,
    pub category: Category,
    pub featured_image: Option<String>,
}

/// Partial update of a post. Absent fields are left untouched.
#[derive(Debug, Clone, Default)]
pub struct PostPatch {
    pub title: Option<String>,
    pub content: Option<String>,
    pub excerpt: Option<String>,
    pub github_repo: Option<String>,
    pub live_demo: Option<String>,
    pub tags: Option<Vec<String>>,
    pub difficulty: Option<SkillLevel>,
    pub category: Option<Category>,
    pub featured_image: Option<String>,
    pub is_published: Option<bool>,
}

/// Post entity - a published project write-up.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Post {
    pub id: Uuid,
    pub author_id: Uuid,
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
    pub likes: Vec<Uuid>,
    pub views: u64,
    pub read_time: u32,
    pub is_published: bool,
    pub is_featured: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Slugs that collide with literal routes under `/api/posts`.
const RESERVED_SLUGS: [&str; 1] = ["featured"];

/// Slug for a title. Titles with nothing URL-safe left fall back to an id-based
/// slug; reserved slugs get an id suffix.
fn slug_for(title: &str, id: Uuid) -> String {
    let slug = slugify(title);
    let short_id = &id.simple().to_string()[..8];
    if slug.is_empty() {
        format!("post-{short_id}")
    } else if RESERVED_SLUGS.contains(&slug.as_str()) {
        format!("{slug}-{short_id}")
    } else {
        slug
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

impl Post {
    /// Create a new post owned by `author_id` with all derived fields computed.
    pub fn new(author_id: Uuid, new: NewPost) -> Self {
        let now = Utc::now();
        let id = Uuid::new_v4();
        let title = new.title.trim().to_string();

        Self {
            id,
            author_id,
            slug: slug_for(&title, id),
            title,
            excerpt: non_blank(new.excerpt).unwrap_or_else(|| excerpt_from(&new.content)),
            read_time: read_time_minutes(&new.content),
            content: new.content,
            github_repo: new.github_repo.trim().to_string(),
            live_demo: new.live_demo.unwrap_or_default(),
            tags: normalize_tags(new.tags),
            difficulty: new.difficulty,
            category: new.category,
            featured_image: non_blank(new.featured_image)
                .unwrap_or_else(|| pick_featured_image(Some(new.category))),
            likes: Vec::new(),
            views: 0,
            is_published: true,
            is_featured: false,
            created_at: now,
            updated_at: now,
        }
    }

    /// Apply a partial update, recomputing derived fields whose source changed.
    ///
    /// An excerpt that was derived from the old content follows the new content;
    /// an author-written excerpt is kept unless the patch replaces it.
    pub fn apply(&mut self, patch: PostPatch) {
        let excerpt_was_derived = self.excerpt == excerpt_from(&self.content);

        if let Some(title) = patch.title {
            let title = title.trim().to_string();
            if title != self.title {
                self.slug = slug_for(&title, self.id);
                self.title = title;
            }
        }

        if let Some(content) = patch.content {
            if content != self.content {
                self.read_time = read_time_minutes(&content);
                self.content = content;
                if excerpt_was_derived {
                    self.excerpt = excerpt_from(&self.content);
                }
            }
        }

        if let Some(excerpt) = patch.excerpt {
            self.excerpt = non_blank(Some(excerpt)).unwrap_or_else(|| excerpt_from(&self.content));
        }
        if let Some(github_repo) = patch.github_repo {
            self.github_repo = github_repo.trim().to_string();
        }
        if let Some(live_demo) = patch.live_demo {
            self.live_demo = live_demo;
        }
        if let Some(tags) = patch.tags {
            self.tags = normalize_tags(tags);
        }
        if let Some(difficulty) = patch.difficulty {
            self.difficulty = difficulty;
        }
        if let Some(category) = patch.category {
            self.category = category;
        }
        if let Some(featured_image) = patch.featured_image {
            self.featured_image = featured_image;
        }
        if let Some(is_published) = patch.is_published {
            self.is_published = is_published;
        }

        self.updated_at = Utc::now();
    }

    pub fn is_owned_by(&self, user_id: Uuid) -> bool {
        self.author_id == user_id
    }

    pub fn is_liked_by(&self, user_id: Uuid) -> bool {
        self.likes.contains(&user_id)
    }

    pub fn likes_count(&self) -> u64 {
        self.likes.len() as u64
    }
}
