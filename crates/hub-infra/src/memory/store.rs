use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use hub_core::domain::{
    Category, Facet, PageRequest, Post, PostFilter, SkillLevel, TagCount, User, rank_tags,
};
use hub_core::error::RepoError;
use hub_core::ports::{BaseRepository, LikeToggle, PostRepository, UserRepository};

#[derive(Default)]
struct Tables {
    users: Vec<User>,
    /// Insertion order; listings walk it backwards.
    posts: Vec<Post>,
}

impl Tables {
    fn user_conflict(&self, user: &User) -> Option<RepoError> {
        self.users
            .iter()
            .filter(|u| u.id != user.id)
            .find_map(|u| {
                if u.username == user.username {
                    Some(RepoError::Constraint("users_username_key".to_string()))
                } else if u.email == user.email {
                    Some(RepoError::Constraint("users_email_key".to_string()))
                } else {
                    None
                }
            })
    }

    fn slug_taken(&self, post: &Post) -> bool {
        self.posts
            .iter()
            .any(|p| p.id != post.id && p.slug == post.slug)
    }

    /// Posts matching `filter`, newest first.
    fn newest_first<'a>(&'a self, filter: &'a PostFilter) -> Vec<&'a Post> {
        let mut posts: Vec<&Post> = self.posts.iter().rev().filter(|p| filter.matches(p)).collect();
        posts.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        posts
    }

    fn facet_counts<T, F>(&self, key: F) -> Vec<Facet<T>>
    where
        T: Copy + Eq + std::hash::Hash + ToString,
        F: Fn(&Post) -> T,
    {
        let mut counts: HashMap<T, u64> = HashMap::new();
        for post in self.posts.iter().filter(|p| p.is_published) {
            *counts.entry(key(post)).or_default() += 1;
        }

        let mut facets: Vec<Facet<T>> = counts
            .into_iter()
            .map(|(value, count)| Facet { value, count })
            .collect();
        facets.sort_by(|a, b| {
            b.count
                .cmp(&a.count)
                .then_with(|| a.value.to_string().cmp(&b.value.to_string()))
        });
        facets
    }
}

/// Shared in-memory backing store for the user and post repositories.
#[derive(Clone, Default)]
pub struct InMemoryStore {
    tables: Arc<RwLock<Tables>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn users(&self) -> InMemoryUserRepository {
        InMemoryUserRepository {
            tables: Arc::clone(&self.tables),
        }
    }

    pub fn posts(&self) -> InMemoryPostRepository {
        InMemoryPostRepository {
            tables: Arc::clone(&self.tables),
        }
    }
}

/// In-memory user repository.
#[derive(Clone)]
pub struct InMemoryUserRepository {
    tables: Arc<RwLock<Tables>>,
}

/// In-memory post repository.
#[derive(Clone)]
pub struct InMemoryPostRepository {
    tables: Arc<RwLock<Tables>>,
}

#[async_trait]
impl BaseRepository<User, Uuid> for InMemoryUserRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, RepoError> {
        let tables = self.tables.read().await;
        Ok(tables.users.iter().find(|u| u.id == id).cloned())
    }

    async fn create(&self, user: User) -> Result<User, RepoError> {
        let mut tables = self.tables.write().await;
        if tables.users.iter().any(|u| u.id == user.id) {
            return Err(RepoError::Constraint("users_pkey".to_string()));
        }
        if let Some(conflict) = tables.user_conflict(&user) {
            return Err(conflict);
        }
        tables.users.push(user.clone());
        Ok(user)
    }

    async fn update(&self, user: User) -> Result<User, RepoError> {
        let mut tables = self.tables.write().await;
        if let Some(conflict) = tables.user_conflict(&user) {
            return Err(conflict);
        }
        let slot = tables
            .users
            .iter_mut()
            .find(|u| u.id == user.id)
            .ok_or(RepoError::NotFound)?;
        *slot = user.clone();
        Ok(user)
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepoError> {
        let tables = self.tables.read().await;
        Ok(tables.users.iter().find(|u| u.email == email).cloned())
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepoError> {
        let tables = self.tables.read().await;
        Ok(tables.users.iter().find(|u| u.username == username).cloned())
    }

    async fn find_by_ids(&self, ids: &[Uuid]) -> Result<Vec<User>, RepoError> {
        let tables = self.tables.read().await;
        Ok(tables
            .users
            .iter()
            .filter(|u| ids.contains(&u.id))
            .cloned()
            .collect())
    }

    async fn count(&self) -> Result<u64, RepoError> {
        Ok(self.tables.read().await.users.len() as u64)
    }

    async fn toggle_saved_post(&self, user_id: Uuid, post_id: Uuid) -> Result<bool, RepoError> {
        let mut tables = self.tables.write().await;
        let user = tables
            .users
            .iter_mut()
            .find(|u| u.id == user_id)
            .ok_or(RepoError::NotFound)?;

        let saved = if let Some(pos) = user.saved_posts.iter().position(|id| *id == post_id) {
            user.saved_posts.remove(pos);
            false
        } else {
            user.saved_posts.push(post_id);
            true
        };
        user.updated_at = chrono::Utc::now();
        Ok(saved)
    }
}

#[async_trait]
impl BaseRepository<Post, Uuid> for InMemoryPostRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Post>, RepoError> {
        let tables = self.tables.read().await;
        Ok(tables.posts.iter().find(|p| p.id == id).cloned())
    }

    async fn create(&self, post: Post) -> Result<Post, RepoError> {
        let mut tables = self.tables.write().await;
        if tables.posts.iter().any(|p| p.id == post.id) {
            return Err(RepoError::Constraint("posts_pkey".to_string()));
        }
        if tables.slug_taken(&post) {
            return Err(RepoError::Constraint("posts_slug_key".to_string()));
        }
        tables.posts.push(post.clone());
        Ok(post)
    }

    async fn update(&self, post: Post) -> Result<Post, RepoError> {
        let mut tables = self.tables.write().await;
        if tables.slug_taken(&post) {
            return Err(RepoError::Constraint("posts_slug_key".to_string()));
        }
        let slot = tables
            .posts
            .iter_mut()
            .find(|p| p.id == post.id)
            .ok_or(RepoError::NotFound)?;
        *slot = post.clone();
        Ok(post)
    }
}

#[async_trait]
impl PostRepository for InMemoryPostRepository {
    async fn find_by_slug(&self, slug: &str) -> Result<Option<Post>, RepoError> {
        let tables = self.tables.read().await;
        Ok(tables.posts.iter().find(|p| p.slug == slug).cloned())
    }

    async fn find_by_ids(&self, ids: &[Uuid]) -> Result<Vec<Post>, RepoError> {
        let tables = self.tables.read().await;
        Ok(ids
            .iter()
            .filter_map(|id| tables.posts.iter().find(|p| p.id == *id).cloned())
            .collect())
    }

    async fn list(
        &self,
        filter: &PostFilter,
        page: PageRequest,
    ) -> Result<(Vec<Post>, u64), RepoError> {
        let tables = self.tables.read().await;
        let matching = tables.newest_first(filter);
        let total = matching.len() as u64;
        let posts = page.slice(&matching).iter().map(|p| (*p).clone()).collect();
        Ok((posts, total))
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        let mut tables = self.tables.write().await;
        let pos = tables
            .posts
            .iter()
            .position(|p| p.id == id)
            .ok_or(RepoError::NotFound)?;
        tables.posts.remove(pos);

        for user in tables.users.iter_mut() {
            user.saved_posts.retain(|saved| *saved != id);
        }
        Ok(())
    }

    async fn increment_views(&self, id: Uuid) -> Result<(), RepoError> {
        let mut tables = self.tables.write().await;
        if let Some(post) = tables.posts.iter_mut().find(|p| p.id == id) {
            post.views += 1;
        }
        Ok(())
    }

    async fn toggle_like(&self, post_id: Uuid, user_id: Uuid) -> Result<LikeToggle, RepoError> {
        let mut tables = self.tables.write().await;
        let post = tables
            .posts
            .iter_mut()
            .find(|p| p.id == post_id)
            .ok_or(RepoError::NotFound)?;

        let liked = if let Some(pos) = post.likes.iter().position(|id| *id == user_id) {
            post.likes.remove(pos);
            false
        } else {
            post.likes.push(user_id);
            true
        };

        Ok(LikeToggle {
            liked,
            likes_count: post.likes_count(),
        })
    }

    async fn trending_tags(&self, limit: u64) -> Result<Vec<TagCount>, RepoError> {
        let tables = self.tables.read().await;
        let mut counts: HashMap<&str, u64> = HashMap::new();
        for post in tables.posts.iter().filter(|p| p.is_published) {
            for tag in &post.tags {
                *counts.entry(tag.as_str()).or_default() += 1;
            }
        }

        let counts = counts
            .into_iter()
            .map(|(tag, count)| TagCount {
                tag: tag.to_string(),
                count,
            })
            .collect();
        Ok(rank_tags(counts, limit))
    }

    async fn count_published(&self) -> Result<u64, RepoError> {
        let tables = self.tables.read().await;
        Ok(tables.posts.iter().filter(|p| p.is_published).count() as u64)
    }

    async fn category_counts(&self) -> Result<Vec<Facet<Category>>, RepoError> {
        Ok(self.tables.read().await.facet_counts(|p| p.category))
    }

    async fn difficulty_counts(&self) -> Result<Vec<Facet<SkillLevel>>, RepoError> {
        Ok(self.tables.read().await.facet_counts(|p| p.difficulty))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hub_core::domain::NewPost;

    fn new_post(title: &str, tags: &[&str]) -> NewPost {
        NewPost {
            title: title.to_string(),
            content: "Some words about the project".to_string(),
            excerpt: None,
            github_repo: "https://github.com/octo/demo".to_string(),
            live_demo: None,
            tags: tags.iter().map(|t| t.to_string()).collect(),
            difficulty: SkillLevel::Beginner,
            category: Category::WebApp,
            featured_image: None,
        }
    }

    async fn seed_user(store: &InMemoryStore, name: &str) -> User {
        let user = User::new(name, &format!("{name}@example.com"), "hash".to_string());
        store.users().create(user).await.unwrap()
    }

    #[tokio::test]
    async fn test_unique_username_and_email() {
        let store = InMemoryStore::new();
        seed_user(&store, "alice").await;

        let dup_name = User::new("alice", "other@example.com", "h".to_string());
        let dup_email = User::new("bob", "alice@example.com", "h".to_string());

        assert!(matches!(
            store.users().create(dup_name).await,
            Err(RepoError::Constraint(_))
        ));
        assert!(matches!(
            store.users().create(dup_email).await,
            Err(RepoError::Constraint(_))
        ));
    }

    #[tokio::test]
    async fn test_unique_slug() {
        let store = InMemoryStore::new();
        let author = seed_user(&store, "alice").await;
        let posts = store.posts();

        posts
            .create(Post::new(author.id, new_post("Hello World", &[])))
            .await
            .unwrap();
        let result = posts
            .create(Post::new(author.id, new_post("hello world!", &[])))
            .await;

        assert!(matches!(result, Err(RepoError::Constraint(_))));
    }

    #[tokio::test]
    async fn test_list_newest_first_with_total() {
        let store = InMemoryStore::new();
        let author = seed_user(&store, "alice").await;
        let posts = store.posts();

        for title in ["one", "two", "three"] {
            posts
                .create(Post::new(author.id, new_post(title, &[])))
                .await
                .unwrap();
        }

        let (page, total) = posts
            .list(&PostFilter::published(), PageRequest::new(Some(1), Some(2)))
            .await
            .unwrap();

        assert_eq!(total, 3);
        assert_eq!(page.len(), 2);
        assert_eq!(page[0].title, "three");
        assert_eq!(page[1].title, "two");
    }

    #[tokio::test]
    async fn test_toggle_like_twice_restores_state() {
        let store = InMemoryStore::new();
        let author = seed_user(&store, "alice").await;
        let post = store
            .posts()
            .create(Post::new(author.id, new_post("Likeable", &[])))
            .await
            .unwrap();

        let first = store.posts().toggle_like(post.id, author.id).await.unwrap();
        assert_eq!(first, LikeToggle { liked: true, likes_count: 1 });

        let second = store.posts().toggle_like(post.id, author.id).await.unwrap();
        assert_eq!(second, LikeToggle { liked: false, likes_count: 0 });
    }

    #[tokio::test]
    async fn test_concurrent_likes_are_not_lost() {
        let store = InMemoryStore::new();
        let author = seed_user(&store, "alice").await;
        let post = store
            .posts()
            .create(Post::new(author.id, new_post("Popular", &[])))
            .await
            .unwrap();

        let handles: Vec<_> = (0..16)
            .map(|_| {
                let repo = store.posts();
                let post_id = post.id;
                tokio::spawn(async move { repo.toggle_like(post_id, Uuid::new_v4()).await })
            })
            .collect();
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        let post = store.posts().find_by_id(post.id).await.unwrap().unwrap();
        assert_eq!(post.likes_count(), 16);
    }

    #[tokio::test]
    async fn test_delete_cascades_to_saved_posts() {
        let store = InMemoryStore::new();
        let author = seed_user(&store, "alice").await;
        let reader = seed_user(&store, "bob").await;
        let post = store
            .posts()
            .create(Post::new(author.id, new_post("Bookmarked", &[])))
            .await
            .unwrap();

        assert!(store.users().toggle_saved_post(reader.id, post.id).await.unwrap());
        store.posts().delete(post.id).await.unwrap();

        let reader = store.users().find_by_id(reader.id).await.unwrap().unwrap();
        assert!(reader.saved_posts.is_empty());
        assert!(matches!(
            store.posts().delete(post.id).await,
            Err(RepoError::NotFound)
        ));
    }

    #[tokio::test]
    async fn test_trending_tags_ignore_drafts() {
        let store = InMemoryStore::new();
        let author = seed_user(&store, "alice").await;
        let posts = store.posts();

        posts
            .create(Post::new(author.id, new_post("a", &["rust", "web"])))
            .await
            .unwrap();
        posts
            .create(Post::new(author.id, new_post("b", &["rust"])))
            .await
            .unwrap();
        let mut draft = Post::new(author.id, new_post("c", &["web", "draft"]));
        draft.is_published = false;
        posts.create(draft).await.unwrap();

        let tags = posts.trending_tags(20).await.unwrap();
        assert_eq!(tags.len(), 2);
        assert_eq!(tags[0], TagCount { tag: "rust".into(), count: 2 });
        assert_eq!(tags[1], TagCount { tag: "web".into(), count: 1 });
    }

    #[tokio::test]
    async fn test_find_by_ids_keeps_order_and_skips_missing() {
        let store = InMemoryStore::new();
        let author = seed_user(&store, "alice").await;
        let a = store
            .posts()
            .create(Post::new(author.id, new_post("a", &[])))
            .await
            .unwrap();
        let b = store
            .posts()
            .create(Post::new(author.id, new_post("b", &[])))
            .await
            .unwrap();

        let found = PostRepository::find_by_ids(&store.posts(), &[b.id, Uuid::new_v4(), a.id])
            .await
            .unwrap();
        let ids: Vec<Uuid> = found.iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![b.id, a.id]);
    }
}
