//! Typed API client.

use reqwest::{Client, Method, RequestBuilder, StatusCode, Url};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tokio::sync::RwLock;
use uuid::Uuid;

use hub_shared::dto::{
    AuthPayload, ChangePasswordRequest, CreatePostRequest, FeaturedPostsPayload, HealthResponse,
    LikePayload, ListPostsQuery, LoginRequest, PageQuery, PlatformStatsPayload, PostListPayload,
    PostPayload, ProfilePagePayload, RegisterRequest, SavePayload, SavedPostsPayload,
    TrendingTagsPayload, UpdatePostRequest, UpdateUserRequest, UserPayload,
};
use hub_shared::{ApiResponse, Empty, ErrorResponse};

use crate::cache::QueryCache;
use crate::error::ClientError;

const DEFAULT_API_URL: &str = "http://localhost:5000/api";

/// A resolved request target and its cache key.
struct Endpoint {
    url: Url,
    key: String,
}

/// Client for the Project Hub REST API.
pub struct ApiClient {
    http: Client,
    base: Url,
    token: RwLock<Option<String>>,
    cache: QueryCache,
}

impl ApiClient {
    /// `base_url` is the API root, e.g. `http://localhost:5000/api`.
    pub fn new(base_url: &str) -> Result<Self, ClientError> {
        Self::with_cache(base_url, QueryCache::default())
    }

    pub fn with_cache(base_url: &str, cache: QueryCache) -> Result<Self, ClientError> {
        let base = Url::parse(base_url.trim_end_matches('/'))
            .map_err(|e| ClientError::InvalidUrl(format!("{base_url}: {e}")))?;

        if base.cannot_be_a_base() {
            return Err(ClientError::InvalidUrl(base_url.to_string()));
        }

        Ok(Self {
            http: Client::new(),
            base,
            token: RwLock::new(None),
            cache,
        })
    }

    /// Reads `HUB_API_URL`, defaulting to the local development server.
    pub fn from_env() -> Result<Self, ClientError> {
        let url = std::env::var("HUB_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.to_string());
        Self::new(&url)
    }

    pub fn cache(&self) -> &QueryCache {
        &self.cache
    }

    pub async fn token(&self) -> Option<String> {
        self.token.read().await.clone()
    }

    /// Switch identity. Cached responses may be caller-specific, so they are dropped.
    pub async fn set_token(&self, token: impl Into<String>) {
        *self.token.write().await = Some(token.into());
        self.cache.clear().await;
    }

    pub async fn clear_token(&self) {
        *self.token.write().await = None;
        self.cache.clear().await;
    }

    // -- plumbing ----------------------------------------------------------

    fn endpoint(&self, segments: &[&str], params: &[(&str, String)]) -> Result<Endpoint, ClientError> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|_| ClientError::InvalidUrl(self.base.to_string()))?
            .pop_if_empty()
            .extend(segments);

        if !params.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (name, value) in params {
                pairs.append_pair(name, value);
            }
        }

        let mut key = format!("/{}", segments.join("/"));
        if let Some(query) = url.query() {
            key.push('?');
            key.push_str(query);
        }

        Ok(Endpoint { url, key })
    }

    /// Send a request and return the body of a 2xx response.
    async fn execute(&self, request: RequestBuilder) -> Result<String, ClientError> {
        let request = match self.token.read().await.as_deref() {
            Some(token) => request.bearer_auth(token),
            None => request,
        };

        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;

        if status.is_success() {
            return Ok(body);
        }

        if status == StatusCode::UNAUTHORIZED {
            tracing::debug!("Server rejected credentials; dropping token");
            self.clear_token().await;
        }

        let (message, errors) = match serde_json::from_str::<ErrorResponse>(&body) {
            Ok(err) => (err.error, err.errors.unwrap_or_default()),
            Err(_) => (
                status
                    .canonical_reason()
                    .unwrap_or("Request failed")
                    .to_string(),
                Vec::new(),
            ),
        };

        Err(ClientError::Api {
            status: status.as_u16(),
            message,
            errors,
        })
    }

    /// GET through the query cache.
    async fn query<T: DeserializeOwned>(&self, endpoint: Endpoint) -> Result<T, ClientError> {
        if let Some(body) = self.cache.get(&endpoint.key).await {
            tracing::trace!(key = %endpoint.key, "Query cache hit");
            return Ok(serde_json::from_str(&body)?);
        }

        let body = self.execute(self.http.get(endpoint.url)).await?;
        let value = serde_json::from_str(&body)?;
        self.cache.insert(endpoint.key, body).await;
        Ok(value)
    }

    /// Non-GET request followed by invalidation of the affected cache prefixes.
    async fn mutate<B, T>(
        &self,
        method: Method,
        endpoint: Endpoint,
        body: Option<&B>,
        invalidates: &[&str],
    ) -> Result<T, ClientError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let mut request = self.http.request(method, endpoint.url);
        if let Some(body) = body {
            request = request.json(body);
        }

        let body = self.execute(request).await?;

        for prefix in invalidates {
            self.cache.invalidate_prefix(prefix).await;
        }

        Ok(serde_json::from_str(&body)?)
    }

    fn page_params(page: &PageQuery) -> Vec<(&'static str, String)> {
        let mut params = Vec::new();
        if let Some(p) = page.page {
            params.push(("page", p.to_string()));
        }
        if let Some(l) = page.limit {
            params.push(("limit", l.to_string()));
        }
        params
    }

    // -- health ------------------------------------------------------------

    pub async fn health(&self) -> Result<HealthResponse, ClientError> {
        let endpoint = self.endpoint(&["health"], &[])?;
        let body = self.execute(self.http.get(endpoint.url)).await?;
        Ok(serde_json::from_str(&body)?)
    }

    // -- auth --------------------------------------------------------------

    /// Register and keep the returned token.
    pub async fn register(
        &self,
        request: &RegisterRequest,
    ) -> Result<ApiResponse<AuthPayload>, ClientError> {
        let endpoint = self.endpoint(&["auth", "register"], &[])?;
        let response: ApiResponse<AuthPayload> = self
            .mutate(Method::POST, endpoint, Some(request), &[])
            .await?;
        self.set_token(response.data.token.clone()).await;
        Ok(response)
    }

    /// Log in and keep the returned token.
    pub async fn login(
        &self,
        request: &LoginRequest,
    ) -> Result<ApiResponse<AuthPayload>, ClientError> {
        let endpoint = self.endpoint(&["auth", "login"], &[])?;
        let response: ApiResponse<AuthPayload> = self
            .mutate(Method::POST, endpoint, Some(request), &[])
            .await?;
        self.set_token(response.data.token.clone()).await;
        Ok(response)
    }

    pub async fn logout(&self) {
        self.clear_token().await;
    }

    pub async fn me(&self) -> Result<UserPayload, ClientError> {
        let endpoint = self.endpoint(&["auth", "me"], &[])?;
        self.query(endpoint).await
    }

    pub async fn change_password(
        &self,
        request: &ChangePasswordRequest,
    ) -> Result<ApiResponse<Empty>, ClientError> {
        let endpoint = self.endpoint(&["auth", "password"], &[])?;
        self.mutate(Method::PUT, endpoint, Some(request), &[]).await
    }

    // -- posts -------------------------------------------------------------

    pub async fn list_posts(&self, query: &ListPostsQuery) -> Result<PostListPayload, ClientError> {
        let mut params = Self::page_params(&PageQuery {
            page: query.page,
            limit: query.limit,
        });
        let optional = [
            ("category", &query.category),
            ("difficulty", &query.difficulty),
            ("search", &query.search),
            ("tag", &query.tag),
        ];
        for (name, value) in optional {
            if let Some(value) = value.as_deref().filter(|v| !v.is_empty()) {
                params.push((name, value.to_string()));
            }
        }

        let endpoint = self.endpoint(&["posts"], &params)?;
        self.query(endpoint).await
    }

    pub async fn featured_posts(&self) -> Result<FeaturedPostsPayload, ClientError> {
        let endpoint = self.endpoint(&["posts", "featured"], &[])?;
        self.query(endpoint).await
    }

    /// Fetch by id or slug.
    pub async fn get_post(&self, id_or_slug: &str) -> Result<PostPayload, ClientError> {
        let endpoint = self.endpoint(&["posts", id_or_slug], &[])?;
        self.query(endpoint).await
    }

    pub async fn post_for_edit(&self, id: Uuid) -> Result<PostPayload, ClientError> {
        let id = id.to_string();
        let endpoint = self.endpoint(&["posts", "edit", &id], &[])?;
        self.query(endpoint).await
    }

    pub async fn my_posts(&self, page: &PageQuery) -> Result<PostListPayload, ClientError> {
        let endpoint = self.endpoint(&["posts", "user", "my-posts"], &Self::page_params(page))?;
        self.query(endpoint).await
    }

    pub async fn create_post(
        &self,
        request: &CreatePostRequest,
    ) -> Result<ApiResponse<PostPayload>, ClientError> {
        let endpoint = self.endpoint(&["posts"], &[])?;
        self.mutate(Method::POST, endpoint, Some(request), &["/posts", "/users"])
            .await
    }

    pub async fn update_post(
        &self,
        id: Uuid,
        request: &UpdatePostRequest,
    ) -> Result<ApiResponse<PostPayload>, ClientError> {
        let id = id.to_string();
        let endpoint = self.endpoint(&["posts", &id], &[])?;
        self.mutate(Method::PUT, endpoint, Some(request), &["/posts", "/users"])
            .await
    }

    pub async fn delete_post(&self, id: Uuid) -> Result<ApiResponse<Empty>, ClientError> {
        let id = id.to_string();
        let endpoint = self.endpoint(&["posts", &id], &[])?;
        self.mutate::<(), _>(
            Method::DELETE,
            endpoint,
            None,
            &["/posts", "/users", "/auth/me"],
        )
        .await
    }

    pub async fn toggle_like(&self, id: Uuid) -> Result<ApiResponse<LikePayload>, ClientError> {
        let id = id.to_string();
        let endpoint = self.endpoint(&["posts", &id, "like"], &[])?;
        self.mutate::<(), _>(Method::POST, endpoint, None, &["/posts", "/users"])
            .await
    }

    pub async fn trending_tags(&self) -> Result<TrendingTagsPayload, ClientError> {
        let endpoint = self.endpoint(&["posts", "stats", "trending-tags"], &[])?;
        self.query(endpoint).await
    }

    pub async fn platform_stats(&self) -> Result<PlatformStatsPayload, ClientError> {
        let endpoint = self.endpoint(&["posts", "stats", "platform"], &[])?;
        self.query(endpoint).await
    }

    // -- users -------------------------------------------------------------

    /// Public profile by id or username.
    pub async fn user_profile(&self, id_or_username: &str) -> Result<ProfilePagePayload, ClientError> {
        let endpoint = self.endpoint(&["users", id_or_username], &[])?;
        self.query(endpoint).await
    }

    pub async fn update_profile(
        &self,
        request: &UpdateUserRequest,
    ) -> Result<ApiResponse<UserPayload>, ClientError> {
        let endpoint = self.endpoint(&["users", "profile"], &[])?;
        self.mutate(
            Method::PUT,
            endpoint,
            Some(request),
            &["/users", "/auth/me", "/posts"],
        )
        .await
    }

    pub async fn toggle_save(&self, post_id: Uuid) -> Result<ApiResponse<SavePayload>, ClientError> {
        let post_id = post_id.to_string();
        let endpoint = self.endpoint(&["users", "save-post", &post_id], &[])?;
        self.mutate::<(), _>(
            Method::POST,
            endpoint,
            None,
            &["/users/saved", "/auth/me"],
        )
        .await
    }

    pub async fn saved_posts(&self, page: &PageQuery) -> Result<SavedPostsPayload, ClientError> {
        let endpoint = self.endpoint(&["users", "saved", "posts"], &Self::page_params(page))?;
        self.query(endpoint).await
    }
}
