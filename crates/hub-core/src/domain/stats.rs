use serde::{Deserialize, Serialize};

use super::level::SkillLevel;
use super::post::Category;

/// Maximum number of tags reported as trending.
pub const TRENDING_TAG_LIMIT: u64 = 20;

/// Number of published posts carrying a tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagCount {
    pub tag: String,
    pub count: u64,
}

/// Count of published posts sharing one value of a field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Facet<T> {
    pub value: T,
    pub count: u64,
}

/// Platform-wide totals.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlatformStats {
    pub total_posts: u64,
    pub total_users: u64,
    pub categories: Vec<Facet<Category>>,
    pub difficulties: Vec<Facet<SkillLevel>>,
}

/// Sort tag counts by frequency (descending, ties alphabetical) and cap them.
pub fn rank_tags(mut counts: Vec<TagCount>, limit: u64) -> Vec<TagCount> {
    counts.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.tag.cmp(&b.tag)));
    counts.truncate(limit as usize);
    counts
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rank_tags_orders_and_caps() {
        let counts = vec![
            TagCount { tag: "go".into(), count: 1 },
            TagCount { tag: "rust".into(), count: 4 },
            TagCount { tag: "axum".into(), count: 1 },
        ];

        let ranked = rank_tags(counts, 2);
        assert_eq!(ranked.len(), 2);
        assert_eq!(ranked[0].tag, "rust");
        assert_eq!(ranked[1].tag, "axum");
    }
}
