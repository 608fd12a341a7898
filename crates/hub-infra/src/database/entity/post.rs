//! Post entity for SeaORM.

use sea_orm::Set;
use sea_orm::entity::prelude::*;

use hub_core::domain::Post;
use hub_core::error::RepoError;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "posts")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub author_id: Uuid,
    pub title: String,
    #[sea_orm(unique)]
    pub slug: String,
    #[sea_orm(column_type = "Text")]
    pub content: String,
    pub excerpt: String,
    pub github_repo: String,
    pub live_demo: String,
    pub tags: Vec<String>,
    pub difficulty: String,
    pub category: String,
    pub featured_image: String,
    pub likes: Vec<Uuid>,
    pub views: i64,
    pub read_time: i32,
    pub is_published: bool,
    pub is_featured: bool,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::AuthorId",
        to = "super::user::Column::Id",
        on_update = "Cascade",
        on_delete = "Cascade"
    )]
    User,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// Conversion from SeaORM Model to Domain Post.
impl TryFrom<Model> for Post {
    type Error = RepoError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: model.id,
            author_id: model.author_id,
            title: model.title,
            slug: model.slug,
            content: model.content,
            excerpt: model.excerpt,
            github_repo: model.github_repo,
            live_demo: model.live_demo,
            tags: model.tags,
            difficulty: model.difficulty.parse()?,
            category: model.category.parse()?,
            featured_image: model.featured_image,
            likes: model.likes,
            views: model.views.max(0) as u64,
            read_time: model.read_time.max(1) as u32,
            is_published: model.is_published,
            is_featured: model.is_featured,
            created_at: model.created_at.into(),
            updated_at: model.updated_at.into(),
        })
    }
}

/// Conversion from Domain Post to SeaORM ActiveModel.
impl From<Post> for ActiveModel {
    fn from(post: Post) -> Self {
        Self {
            id: Set(post.id),
            author_id: Set(post.author_id),
            title: Set(post.title),
            slug: Set(post.slug),
            content: Set(post.content),
            excerpt: Set(post.excerpt),
            github_repo: Set(post.github_repo),
            live_demo: Set(post.live_demo),
            tags: Set(post.tags),
            difficulty: Set(post.difficulty.as_str().to_string()),
            category: Set(post.category.as_str().to_string()),
            featured_image: Set(post.featured_image),
            likes: Set(post.likes),
            views: Set(post.views as i64),
            read_time: Set(post.read_time as i32),
            is_published: Set(post.is_published),
            is_featured: Set(post.is_featured),
            created_at: Set(post.created_at.into()),
            updated_at: Set(post.updated_at.into()),
        }
    }
}
