use hub_client::{ApiClient, ClientError};
use hub_shared::dto::{ListPostsQuery, LoginRequest, PageQuery};
use serde_json::{Value, json};
use uuid::Uuid;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn user_json(id: Uuid) -> Value {
    json!({
        "id": id,
        "username": "alice",
        "email": "alice@example.com",
        "profile": {
            "bio": "",
            "skills": [],
            "experience": "Beginner",
            "github": "",
            "linkedin": "",
            "website": "",
            "avatar": ""
        },
        "savedPosts": [],
        "isVerified": false,
        "createdAt": chrono::Utc::now(),
        "updatedAt": chrono::Utc::now()
    })
}

fn empty_listing() -> Value {
    json!({
        "posts": [],
        "pagination": {
            "currentPage": 1,
            "totalPages": 0,
            "totalPosts": 0,
            "hasNext": false,
            "hasPrev": false
        }
    })
}

async fn client_for(server: &MockServer) -> ApiClient {
    ApiClient::new(&format!("{}/api", server.uri())).unwrap()
}

#[tokio::test]
async fn login_stores_token_and_sends_it_afterwards() {
    let server = MockServer::start().await;
    let user_id = Uuid::new_v4();

    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "message": "Login successful",
            "token": "tok-123",
            "user": user_json(user_id)
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/auth/me"))
        .and(header("authorization", "Bearer tok-123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "user": user_json(user_id)
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server).await;
    let login = client
        .login(&LoginRequest {
            email: "alice@example.com".to_string(),
            password: "secret1".to_string(),
        })
        .await
        .unwrap();

    assert_eq!(login.message.as_deref(), Some("Login successful"));
    assert_eq!(client.token().await.as_deref(), Some("tok-123"));

    let me = client.me().await.unwrap();
    assert_eq!(me.user.id, user_id);
}

#[tokio::test]
async fn repeated_queries_hit_the_cache() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/posts"))
        .and(query_param("page", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(empty_listing()))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server).await;
    let query = ListPostsQuery {
        page: Some(1),
        ..Default::default()
    };

    client.list_posts(&query).await.unwrap();
    client.list_posts(&query).await.unwrap();

    assert_eq!(client.cache().len().await, 1);
}

#[tokio::test]
async fn liking_invalidates_post_queries() {
    let server = MockServer::start().await;
    let post_id = Uuid::new_v4();

    Mock::given(method("GET"))
        .and(path("/api/posts/user/my-posts"))
        .respond_with(ResponseTemplate::new(200).set_body_json(empty_listing()))
        .expect(2)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path(format!("/api/posts/{post_id}/like")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "message": "Post liked",
            "liked": true,
            "likesCount": 1
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server).await;
    let page = PageQuery::default();

    client.my_posts(&page).await.unwrap();
    let like = client.toggle_like(post_id).await.unwrap();
    client.my_posts(&page).await.unwrap();

    assert!(like.data.liked);
    assert_eq!(like.data.likes_count, 1);
}

#[tokio::test]
async fn unauthorized_response_clears_token() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/auth/me"))
        .respond_with(
            ResponseTemplate::new(401).set_body_json(json!({"error": "Access token required"})),
        )
        .mount(&server)
        .await;

    let client = client_for(&server).await;
    client.set_token("stale").await;

    let err = client.me().await.unwrap_err();

    assert_eq!(err.status(), Some(401));
    assert!(client.token().await.is_none());
}

#[tokio::test]
async fn error_body_is_surfaced() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/posts/does-not-exist"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({"error": "Post not found"})))
        .mount(&server)
        .await;

    let client = client_for(&server).await;

    match client.get_post("does-not-exist").await {
        Err(ClientError::Api {
            status, message, ..
        }) => {
            assert_eq!(status, 404);
            assert_eq!(message, "Post not found");
        }
        other => panic!("expected API error, got {other:?}"),
    }
}

#[tokio::test]
async fn validation_errors_are_listed() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": "Validation failed",
            "errors": [{"field": "email", "message": "This field is required"}]
        })))
        .mount(&server)
        .await;

    let client = client_for(&server).await;
    let err = client
        .login(&LoginRequest {
            email: String::new(),
            password: "x".to_string(),
        })
        .await
        .unwrap_err();

    match err {
        ClientError::Api { errors, .. } => assert_eq!(errors[0].field, "email"),
        other => panic!("unexpected error {other:?}"),
    }
}
