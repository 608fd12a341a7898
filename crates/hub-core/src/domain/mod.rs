//! Domain entities - the core business objects.

mod content;
mod featured_image;
mod level;
mod post;
mod query;
mod stats;
mod user;

pub use content::{excerpt_from, normalize_tags, read_time_minutes, slugify, strip_html};
pub use featured_image::{image_pool, pick_featured_image};
pub use level::SkillLevel;
pub use post::{Category, NewPost, Post, PostPatch};
pub use query::{PageRequest, PostFilter};
pub use stats::{Facet, PlatformStats, TRENDING_TAG_LIMIT, TagCount, rank_tags};
pub use user::{Profile, ProfilePatch, User, UserPatch, normalize_email};
