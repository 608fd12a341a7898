//! PostgreSQL repository implementations.
//!
//! Likes and bookmarks live in array columns. Toggles and the delete cascade are
//! expressed as single conditional `UPDATE` statements so concurrent requests
//! cannot interleave a read and a write.

use async_trait::async_trait;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ColumnTrait, Condition, ConnectionTrait, DbBackend, EntityTrait, FromQueryResult,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Statement, TransactionTrait,
};
use uuid::Uuid;

use hub_core::domain::{
    Category, Facet, PageRequest, Post, PostFilter, SkillLevel, TagCount, User,
};
use hub_core::error::RepoError;
use hub_core::ports::{LikeToggle, PostRepository, UserRepository};

use super::entity::post::{self, Entity as PostEntity};
use super::entity::user::{self, Entity as UserEntity};
use super::postgres_base::{PostgresBaseRepository, repo_err};

/// PostgreSQL user repository.
pub type PostgresUserRepository = PostgresBaseRepository<UserEntity>;

/// PostgreSQL post repository.
pub type PostgresPostRepository = PostgresBaseRepository<PostEntity>;

const TOGGLE_LIKE_SQL: &str = r#"
UPDATE posts
SET likes = CASE WHEN $1 = ANY(likes) THEN array_remove(likes, $1) ELSE array_append(likes, $1) END
WHERE id = $2
RETURNING ($1 = ANY(likes)) AS liked, cardinality(likes) AS likes_count
"#;

const TOGGLE_SAVED_SQL: &str = r#"
UPDATE users
SET saved_posts = CASE WHEN $1 = ANY(saved_posts) THEN array_remove(saved_posts, $1) ELSE array_append(saved_posts, $1) END,
    updated_at = now()
WHERE id = $2
RETURNING ($1 = ANY(saved_posts)) AS saved
"#;

const PULL_SAVED_SQL: &str =
    "UPDATE users SET saved_posts = array_remove(saved_posts, $1) WHERE $1 = ANY(saved_posts)";

const TRENDING_TAGS_SQL: &str = r#"
SELECT tag, COUNT(*) AS count
FROM posts, unnest(tags) AS tag
WHERE is_published
GROUP BY tag
ORDER BY count DESC, tag ASC
LIMIT $1
"#;

const CATEGORY_COUNTS_SQL: &str = r#"
SELECT category AS value, COUNT(*) AS count
FROM posts
WHERE is_published
GROUP BY category
ORDER BY count DESC, category ASC
"#;

const DIFFICULTY_COUNTS_SQL: &str = r#"
SELECT difficulty AS value, COUNT(*) AS count
FROM posts
WHERE is_published
GROUP BY difficulty
ORDER BY count DESC, difficulty ASC
"#;

#[derive(Debug, FromQueryResult)]
struct LikeRow {
    liked: bool,
    likes_count: i32,
}

#[derive(Debug, FromQueryResult)]
struct SavedRow {
    saved: bool,
}

#[derive(Debug, FromQueryResult)]
struct TagRow {
    tag: String,
    count: i64,
}

#[derive(Debug, FromQueryResult)]
struct FacetRow {
    value: String,
    count: i64,
}

/// Mask email for logging to avoid PII in logs.
fn mask_email(email: &str) -> String {
    match email.split_once('@') {
        Some((local, domain)) => {
            let first: String = local.chars().take(1).collect();
            if local.chars().count() > 1 {
                format!("{first}***@{domain}")
            } else {
                format!("***@{domain}")
            }
        }
        None => "***".to_string(),
    }
}

/// Escape LIKE wildcards so user input is matched literally.
fn like_pattern(term: &str) -> String {
    let escaped = term
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{escaped}%")
}

fn postgres(sql: &str, values: Vec<sea_orm::Value>) -> Statement {
    Statement::from_sql_and_values(DbBackend::Postgres, sql, values)
}

fn to_domain<M, T>(models: Vec<M>) -> Result<Vec<T>, RepoError>
where
    T: TryFrom<M, Error = RepoError>,
{
    models.into_iter().map(T::try_from).collect()
}

fn facets<T>(rows: Vec<FacetRow>) -> Result<Vec<Facet<T>>, RepoError>
where
    T: std::str::FromStr<Err = hub_core::DomainError>,
{
    rows.into_iter()
        .map(|row| -> Result<Facet<T>, RepoError> {
            Ok(Facet {
                value: row.value.parse()?,
                count: row.count.max(0) as u64,
            })
        })
        .collect()
}

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepoError> {
        tracing::debug!(user_email = %mask_email(email), "Finding user by email");

        let result = UserEntity::find()
            .filter(user::Column::Email.eq(email))
            .one(&self.db)
            .await
            .map_err(repo_err)?;

        result.map(User::try_from).transpose()
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepoError> {
        let result = UserEntity::find()
            .filter(user::Column::Username.eq(username))
            .one(&self.db)
            .await
            .map_err(repo_err)?;

        result.map(User::try_from).transpose()
    }

    async fn find_by_ids(&self, ids: &[Uuid]) -> Result<Vec<User>, RepoError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let models = UserEntity::find()
            .filter(user::Column::Id.is_in(ids.iter().copied()))
            .all(&self.db)
            .await
            .map_err(repo_err)?;

        to_domain(models)
    }

    async fn count(&self) -> Result<u64, RepoError> {
        UserEntity::find().count(&self.db).await.map_err(repo_err)
    }

    async fn toggle_saved_post(&self, user_id: Uuid, post_id: Uuid) -> Result<bool, RepoError> {
        let row = SavedRow::find_by_statement(postgres(
            TOGGLE_SAVED_SQL,
            vec![post_id.into(), user_id.into()],
        ))
        .one(&self.db)
        .await
        .map_err(repo_err)?
        .ok_or(RepoError::NotFound)?;

        tracing::debug!(%user_id, %post_id, saved = row.saved, "Toggled saved post");
        Ok(row.saved)
    }
}

#[async_trait]
impl PostRepository for PostgresPostRepository {
    async fn find_by_slug(&self, slug: &str) -> Result<Option<Post>, RepoError> {
        let result = PostEntity::find()
            .filter(post::Column::Slug.eq(slug))
            .one(&self.db)
            .await
            .map_err(repo_err)?;

        result.map(Post::try_from).transpose()
    }

    async fn find_by_ids(&self, ids: &[Uuid]) -> Result<Vec<Post>, RepoError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let models = PostEntity::find()
            .filter(post::Column::Id.is_in(ids.iter().copied()))
            .all(&self.db)
            .await
            .map_err(repo_err)?;

        let mut posts: Vec<Post> = to_domain(models)?;
        posts.sort_by_key(|p| ids.iter().position(|id| *id == p.id));
        Ok(posts)
    }

    async fn list(
        &self,
        filter: &PostFilter,
        page: PageRequest,
    ) -> Result<(Vec<Post>, u64), RepoError> {
        let mut query = PostEntity::find();

        if filter.published_only {
            query = query.filter(post::Column::IsPublished.eq(true));
        }
        if filter.featured_only {
            query = query.filter(post::Column::IsFeatured.eq(true));
        }
        if let Some(author_id) = filter.author_id {
            query = query.filter(post::Column::AuthorId.eq(author_id));
        }
        if let Some(category) = filter.category {
            query = query.filter(post::Column::Category.eq(category.as_str()));
        }
        if let Some(difficulty) = filter.difficulty {
            query = query.filter(post::Column::Difficulty.eq(difficulty.as_str()));
        }
        if let Some(tag) = filter.tag_term() {
            query = query.filter(Expr::cust_with_values("$1 = ANY(tags)", [tag]));
        }
        if let Some(search) = filter.search_term() {
            let pattern = like_pattern(search);
            query = query.filter(
                Condition::any()
                    .add(Expr::cust_with_values("title ILIKE $1", [pattern.clone()]))
                    .add(Expr::cust_with_values("content ILIKE $1", [pattern.clone()]))
                    .add(Expr::cust_with_values(
                        "array_to_string(tags, ' ') ILIKE $1",
                        [pattern],
                    )),
            );
        }

        let total = query.clone().count(&self.db).await.map_err(repo_err)?;

        let models = query
            .order_by_desc(post::Column::CreatedAt)
            .offset(page.offset())
            .limit(page.limit)
            .all(&self.db)
            .await
            .map_err(repo_err)?;

        Ok((to_domain(models)?, total))
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        let txn = self.db.begin().await.map_err(repo_err)?;

        let result = PostEntity::delete_by_id(id)
            .exec(&txn)
            .await
            .map_err(repo_err)?;

        if result.rows_affected == 0 {
            return Err(RepoError::NotFound);
        }

        let pulled = txn
            .execute(postgres(PULL_SAVED_SQL, vec![id.into()]))
            .await
            .map_err(repo_err)?;

        txn.commit().await.map_err(repo_err)?;

        tracing::debug!(post_id = %id, bookmarks_removed = pulled.rows_affected(), "Deleted post");
        Ok(())
    }

    async fn increment_views(&self, id: Uuid) -> Result<(), RepoError> {
        PostEntity::update_many()
            .col_expr(post::Column::Views, Expr::col(post::Column::Views).add(1))
            .filter(post::Column::Id.eq(id))
            .exec(&self.db)
            .await
            .map_err(repo_err)?;

        Ok(())
    }

    async fn toggle_like(&self, post_id: Uuid, user_id: Uuid) -> Result<LikeToggle, RepoError> {
        let row = LikeRow::find_by_statement(postgres(
            TOGGLE_LIKE_SQL,
            vec![user_id.into(), post_id.into()],
        ))
        .one(&self.db)
        .await
        .map_err(repo_err)?
        .ok_or(RepoError::NotFound)?;

        Ok(LikeToggle {
            liked: row.liked,
            likes_count: row.likes_count.max(0) as u64,
        })
    }

    async fn trending_tags(&self, limit: u64) -> Result<Vec<TagCount>, RepoError> {
        let rows = TagRow::find_by_statement(postgres(
            TRENDING_TAGS_SQL,
            vec![(limit as i64).into()],
        ))
        .all(&self.db)
        .await
        .map_err(repo_err)?;

        Ok(rows
            .into_iter()
            .map(|row| TagCount {
                tag: row.tag,
                count: row.count.max(0) as u64,
            })
            .collect())
    }

    async fn count_published(&self) -> Result<u64, RepoError> {
        PostEntity::find()
            .filter(post::Column::IsPublished.eq(true))
            .count(&self.db)
            .await
            .map_err(repo_err)
    }

    async fn category_counts(&self) -> Result<Vec<Facet<Category>>, RepoError> {
        let rows = FacetRow::find_by_statement(postgres(CATEGORY_COUNTS_SQL, vec![]))
            .all(&self.db)
            .await
            .map_err(repo_err)?;

        facets(rows)
    }

    async fn difficulty_counts(&self) -> Result<Vec<Facet<SkillLevel>>, RepoError> {
        let rows = FacetRow::find_by_statement(postgres(DIFFICULTY_COUNTS_SQL, vec![]))
            .all(&self.db)
            .await
            .map_err(repo_err)?;

        facets(rows)
    }
}

#[cfg(test)]
mod unit {
    use super::*;

    #[test]
    fn test_mask_email() {
        assert_eq!(mask_email("alice@example.com"), "a***@example.com");
        assert_eq!(mask_email("a@example.com"), "***@example.com");
        assert_eq!(mask_email("not-an-email"), "***");
    }

    #[test]
    fn test_like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern("100%_done"), "%100\\%\\_done%");
    }
}
