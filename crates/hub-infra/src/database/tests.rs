use std::collections::BTreeMap;

use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult, Value};
use uuid::Uuid;

use hub_core::domain::{Category, Post, SkillLevel, User};
use hub_core::error::RepoError;
use hub_core::ports::{BaseRepository, PostRepository, UserRepository};

use crate::database::connections::DatabasePool;
use crate::database::entity::{post, user};
use crate::database::postgres_repo::{PostgresPostRepository, PostgresUserRepository};

fn post_model(id: Uuid, author_id: Uuid, title: &str) -> post::Model {
    let now = chrono::Utc::now();
    post::Model {
        id,
        author_id,
        title: title.to_owned(),
        slug: hub_core::domain::slugify(title),
        content: "Content".to_owned(),
        excerpt: "Content".to_owned(),
        github_repo: "https://github.com/octo/demo".to_owned(),
        live_demo: String::new(),
        tags: vec!["rust".to_owned()],
        difficulty: "Intermediate".to_owned(),
        category: "Web App".to_owned(),
        featured_image: "https://images.unsplash.com/photo-1".to_owned(),
        likes: vec![],
        views: 3,
        read_time: 1,
        is_published: true,
        is_featured: false,
        created_at: now.into(),
        updated_at: now.into(),
    }
}

fn user_model(id: Uuid, username: &str) -> user::Model {
    let now = chrono::Utc::now();
    user::Model {
        id,
        username: username.to_owned(),
        email: format!("{username}@example.com"),
        password_hash: "hash".to_owned(),
        bio: String::new(),
        skills: vec![],
        experience: "Beginner".to_owned(),
        github: String::new(),
        linkedin: String::new(),
        website: String::new(),
        avatar: String::new(),
        saved_posts: vec![],
        is_verified: false,
        created_at: now.into(),
        updated_at: now.into(),
    }
}

fn row(pairs: &[(&'static str, Value)]) -> BTreeMap<&'static str, Value> {
    pairs.iter().cloned().collect()
}

#[tokio::test]
async fn test_find_post_by_id() {
    let post_id = Uuid::new_v4();
    let author_id = Uuid::new_v4();

    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![post_model(post_id, author_id, "Test Post")]])
        .into_connection();

    let repo = PostgresPostRepository::new(db);

    let result: Option<Post> = repo.find_by_id(post_id).await.unwrap();

    let post = result.unwrap();
    assert_eq!(post.title, "Test Post");
    assert_eq!(post.id, post_id);
    assert_eq!(post.category, Category::WebApp);
    assert_eq!(post.difficulty, SkillLevel::Intermediate);
    assert_eq!(post.views, 3);
}

#[tokio::test]
async fn test_corrupt_category_is_reported() {
    let mut model = post_model(Uuid::new_v4(), Uuid::new_v4(), "Broken");
    model.category = "Spaceship".to_owned();

    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![model]])
        .into_connection();

    let repo = PostgresPostRepository::new(db);
    let result: Result<Option<Post>, RepoError> = repo.find_by_id(Uuid::new_v4()).await;

    assert!(matches!(result, Err(RepoError::Corrupt(_))));
}

#[tokio::test]
async fn test_find_user_by_username() {
    let user_id = Uuid::new_v4();

    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![user_model(user_id, "alice")]])
        .into_connection();

    let repo = PostgresUserRepository::new(db);
    let user: User = repo.find_by_username("alice").await.unwrap().unwrap();

    assert_eq!(user.id, user_id);
    assert_eq!(user.profile.experience, SkillLevel::Beginner);
}

#[tokio::test]
async fn test_post_find_by_ids_preserves_request_order() {
    let author = Uuid::new_v4();
    let first = Uuid::new_v4();
    let second = Uuid::new_v4();

    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![
            post_model(second, author, "Second"),
            post_model(first, author, "First"),
        ]])
        .into_connection();

    let repo = PostgresPostRepository::new(db);
    let posts = PostRepository::find_by_ids(&repo, &[first, second])
        .await
        .unwrap();

    let ids: Vec<Uuid> = posts.iter().map(|p| p.id).collect();
    assert_eq!(ids, vec![first, second]);
}

#[tokio::test]
async fn test_toggle_like_reads_returning_row() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![row(&[
            ("liked", true.into()),
            ("likes_count", 4i32.into()),
        ])]])
        .into_connection();

    let repo = PostgresPostRepository::new(db);
    let toggle = repo
        .toggle_like(Uuid::new_v4(), Uuid::new_v4())
        .await
        .unwrap();

    assert!(toggle.liked);
    assert_eq!(toggle.likes_count, 4);
}

#[tokio::test]
async fn test_toggle_like_on_missing_post() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([Vec::<BTreeMap<&str, Value>>::new()])
        .into_connection();

    let repo = PostgresPostRepository::new(db);
    let result = repo.toggle_like(Uuid::new_v4(), Uuid::new_v4()).await;

    assert!(matches!(result, Err(RepoError::NotFound)));
}

#[tokio::test]
async fn test_toggle_saved_post() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![row(&[("saved", false.into())])]])
        .into_connection();

    let repo = PostgresUserRepository::new(db);
    let saved = repo
        .toggle_saved_post(Uuid::new_v4(), Uuid::new_v4())
        .await
        .unwrap();

    assert!(!saved);
}

#[tokio::test]
async fn test_trending_tags() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![
            row(&[("tag", "rust".into()), ("count", 5i64.into())]),
            row(&[("tag", "web".into()), ("count", 2i64.into())]),
        ]])
        .into_connection();

    let repo = PostgresPostRepository::new(db);
    let tags = repo.trending_tags(20).await.unwrap();

    assert_eq!(tags.len(), 2);
    assert_eq!(tags[0].tag, "rust");
    assert_eq!(tags[0].count, 5);
}

#[tokio::test]
async fn test_category_counts_parse_values() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![
            row(&[("value", "CLI Tool".into()), ("count", 3i64.into())]),
            row(&[("value", "Game".into()), ("count", 1i64.into())]),
        ]])
        .into_connection();

    let repo = PostgresPostRepository::new(db);
    let facets = repo.category_counts().await.unwrap();

    assert_eq!(facets[0].value, Category::CliTool);
    assert_eq!(facets[1].count, 1);
}

#[tokio::test]
async fn test_delete_pulls_bookmarks_in_transaction() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_exec_results([
            MockExecResult {
                last_insert_id: 0,
                rows_affected: 1,
            },
            MockExecResult {
                last_insert_id: 0,
                rows_affected: 2,
            },
        ])
        .into_connection();

    let repo = PostgresPostRepository::new(db);
    repo.delete(Uuid::new_v4()).await.unwrap();
}

#[tokio::test]
async fn test_delete_missing_post() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_exec_results([MockExecResult {
            last_insert_id: 0,
            rows_affected: 0,
        }])
        .into_connection();

    let repo = PostgresPostRepository::new(db);
    let result = repo.delete(Uuid::new_v4()).await;

    assert!(matches!(result, Err(RepoError::NotFound)));
}

#[tokio::test]
async fn test_pool_closes_through_shared_reference() {
    let pool = DatabasePool {
        main: MockDatabase::new(DatabaseBackend::Postgres).into_connection(),
    };

    assert!(pool.close().await.is_ok());
}
