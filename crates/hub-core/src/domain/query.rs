//! Listing filters and pagination.

use uuid::Uuid;

use super::level::SkillLevel;
use super::post::{Category, Post};

/// Page/limit pagination request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u64,
    pub limit: u64,
}

impl PageRequest {
    pub const DEFAULT_LIMIT: u64 = 10;
    pub const MAX_LIMIT: u64 = 50;
    /// Highest page honoured; keeps offsets within a signed 64-bit SQL OFFSET.
    pub const MAX_PAGE: u64 = i32::MAX as u64;

    /// Build a request from optional query values; page starts at 1 and limit is clamped.
    pub fn new(page: Option<u64>, limit: Option<u64>) -> Self {
        Self {
            page: page.unwrap_or(1).clamp(1, Self::MAX_PAGE),
            limit: limit
                .unwrap_or(Self::DEFAULT_LIMIT)
                .clamp(1, Self::MAX_LIMIT),
        }
    }

    pub fn offset(&self) -> u64 {
        self.page.saturating_sub(1).saturating_mul(self.limit)
    }

    /// Slice an in-memory collection to this page.
    pub fn slice<'a, T>(&self, items: &'a [T]) -> &'a [T] {
        let start = (self.offset() as usize).min(items.len());
        let end = start.saturating_add(self.limit as usize).min(items.len());
        &items[start..end]
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::new(None, None)
    }
}

/// Filter over posts. Every criterion is optional and criteria combine with AND.
#[derive(Debug, Clone, Default)]
pub struct PostFilter {
    pub published_only: bool,
    pub featured_only: bool,
    pub author_id: Option<Uuid>,
    pub category: Option<Category>,
    pub difficulty: Option<SkillLevel>,
    /// Case-insensitive substring matched against title, content and tags.
    pub search: Option<String>,
    /// Exact tag, compared in lowercase.
    pub tag: Option<String>,
}

impl PostFilter {
    pub fn published() -> Self {
        Self {
            published_only: true,
            ..Default::default()
        }
    }

    pub fn by_author(author_id: Uuid) -> Self {
        Self {
            author_id: Some(author_id),
            ..Default::default()
        }
    }

    /// Search term with surrounding whitespace removed, if any is left.
    pub fn search_term(&self) -> Option<&str> {
        self.search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }

    /// Tag in its stored (lowercase) form, if any.
    pub fn tag_term(&self) -> Option<String> {
        self.tag
            .as_deref()
            .map(|t| t.trim().to_lowercase())
            .filter(|t| !t.is_empty())
    }

    /// Evaluate the filter against a post in memory.
    pub fn matches(&self, post: &Post) -> bool {
        if self.published_only && !post.is_published {
            return false;
        }
        if self.featured_only && !post.is_featured {
            return false;
        }
        if self.author_id.is_some_and(|author| author != post.author_id) {
            return false;
        }
        if self.category.is_some_and(|c| c != post.category) {
            return false;
        }
        if self.difficulty.is_some_and(|d| d != post.difficulty) {
            return false;
        }
        if let Some(tag) = self.tag_term() {
            if !post.tags.contains(&tag) {
                return false;
            }
        }
        if let Some(search) = self.search_term() {
            let needle = search.to_lowercase();
            let hit = post.title.to_lowercase().contains(&needle)
                || post.content.to_lowercase().contains(&needle)
                || post.tags.iter().any(|t| t.contains(&needle));
            if !hit {
                return false;
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::NewPost;

    fn post(title: &str, tags: &[&str]) -> Post {
        Post::new(
            Uuid::new_v4(),
            NewPost {
                title: title.to_string(),
                content: "Built with actix and sea-orm".to_string(),
                excerpt: None,
                github_repo: "https://github.com/alice/demo".to_string(),
                live_demo: None,
                tags: tags.iter().map(|t| t.to_string()).collect(),
                difficulty: SkillLevel::Intermediate,
                category: Category::Api,
                featured_image: None,
            },
        )
    }

    #[test]
    fn test_page_request_defaults_and_clamps() {
        assert_eq!(PageRequest::new(None, None), PageRequest { page: 1, limit: 10 });
        assert_eq!(PageRequest::new(Some(0), Some(500)).limit, PageRequest::MAX_LIMIT);
        assert_eq!(PageRequest::new(Some(3), Some(5)).offset(), 10);
    }

    #[test]
    fn test_huge_page_does_not_overflow() {
        let page = PageRequest::new(Some(u64::MAX), Some(50));

        assert_eq!(page.page, PageRequest::MAX_PAGE);
        assert_eq!(page.offset(), (PageRequest::MAX_PAGE - 1) * 50);
        assert!(page.slice(&[1, 2, 3]).is_empty());
    }

    #[test]
    fn test_page_slice_past_end_is_empty() {
        let items = [1, 2, 3];
        assert_eq!(PageRequest::new(Some(2), Some(2)).slice(&items), &[3]);
        assert!(PageRequest::new(Some(5), Some(2)).slice(&items).is_empty());
    }

    #[test]
    fn test_search_is_case_insensitive_across_fields() {
        let p = post("Realtime Chat", &["websocket"]);
        let by = |s: &str| PostFilter {
            search: Some(s.to_string()),
            ..Default::default()
        };

        assert!(by("CHAT").matches(&p));
        assert!(by("SEA-ORM").matches(&p));
        assert!(by("socket").matches(&p));
        assert!(!by("graphql").matches(&p));
    }

    #[test]
    fn test_tag_filter_is_exact() {
        let p = post("Realtime Chat", &["websocket"]);
        let tagged = |t: &str| PostFilter {
            tag: Some(t.to_string()),
            ..Default::default()
        };

        assert!(tagged("WebSocket").matches(&p));
        assert!(!tagged("web").matches(&p));
    }

    #[test]
    fn test_published_only_hides_drafts() {
        let mut p = post("Draft", &[]);
        p.is_published = false;
        assert!(!PostFilter::published().matches(&p));
        assert!(PostFilter::by_author(p.author_id).matches(&p));
    }
}
