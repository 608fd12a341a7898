//! User entity for SeaORM.

use sea_orm::Set;
use sea_orm::entity::prelude::*;

use hub_core::domain::{Profile, User};
use hub_core::error::RepoError;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub username: String,
    #[sea_orm(unique)]
    pub email: String,
    pub password_hash: String,
    #[sea_orm(column_type = "Text")]
    pub bio: String,
    pub skills: Vec<String>,
    pub experience: String,
    pub github: String,
    pub linkedin: String,
    pub website: String,
    pub avatar: String,
    pub saved_posts: Vec<Uuid>,
    pub is_verified: bool,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::post::Entity")]
    Post,
}

impl Related<super::post::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Post.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// Conversion from SeaORM Model to Domain User.
impl TryFrom<Model> for User {
    type Error = RepoError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: model.id,
            username: model.username,
            email: model.email,
            password_hash: model.password_hash,
            profile: Profile {
                bio: model.bio,
                skills: model.skills,
                experience: model.experience.parse()?,
                github: model.github,
                linkedin: model.linkedin,
                website: model.website,
                avatar: model.avatar,
            },
            saved_posts: model.saved_posts,
            is_verified: model.is_verified,
            created_at: model.created_at.into(),
            updated_at: model.updated_at.into(),
        })
    }
}

/// Conversion from Domain User to SeaORM ActiveModel.
impl From<User> for ActiveModel {
    fn from(user: User) -> Self {
        Self {
            id: Set(user.id),
            username: Set(user.username),
            email: Set(user.email),
            password_hash: Set(user.password_hash),
            bio: Set(user.profile.bio),
            skills: Set(user.profile.skills),
            experience: Set(user.profile.experience.as_str().to_string()),
            github: Set(user.profile.github),
            linkedin: Set(user.profile.linkedin),
            website: Set(user.profile.website),
            avatar: Set(user.profile.avatar),
            saved_posts: Set(user.saved_posts),
            is_verified: Set(user.is_verified),
            created_at: Set(user.created_at.into()),
            updated_at: Set(user.updated_at.into()),
        }
    }
}
