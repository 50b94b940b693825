#![allow(dead_code)]

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{HeaderMap, Method, Request, StatusCode, header},
};
use newsroom_api::{
    AppState, MockStorageService, RecordingNotifier, TokenCodec, create_router,
    config::AppConfig,
    id::ObjectId,
    models::{Category, NewNews, News, User},
    password::hash_password,
    repository::{InMemoryRepository, Repository},
    token::{SessionClaims, TokenClass},
};
use serde_json::Value;
use std::sync::{Arc, LazyLock};
use tower::ServiceExt;

pub const TEST_PASSWORD: &str = "password123";

// Hashing is slow in debug builds; one hash serves every seeded user.
static TEST_PASSWORD_HASH: LazyLock<String> =
    LazyLock::new(|| hash_password(TEST_PASSWORD).expect("hashing the test password"));

pub const MULTIPART_BOUNDARY: &str = "newsroom-test-boundary";

/// Router plus handles on every collaborator so tests can inspect side effects.
pub struct TestApp {
    pub router: Router,
    pub repo: Arc<InMemoryRepository>,
    pub storage: MockStorageService,
    pub notifier: RecordingNotifier,
    pub tokens: TokenCodec,
}

pub fn test_app() -> TestApp {
    test_app_with_storage(MockStorageService::new())
}

pub fn test_app_with_storage(storage: MockStorageService) -> TestApp {
    let repo = Arc::new(InMemoryRepository::new());
    let notifier = RecordingNotifier::new();
    let state = AppState::new(
        AppConfig::default(),
        repo.clone(),
        Arc::new(storage.clone()),
        Arc::new(notifier.clone()),
    );
    let tokens = state.tokens.clone();

    TestApp {
        router: create_router(state),
        repo,
        storage,
        notifier,
        tokens,
    }
}

impl TestApp {
    pub async fn seed_user(&self, name: &str, email: &str, is_admin: bool) -> User {
        self.repo
            .seed_user(User {
                id: ObjectId::new(),
                name: name.to_string(),
                email: email.to_string(),
                password_hash: TEST_PASSWORD_HASH.clone(),
                is_admin,
                favorite_category_ids: Vec::new(),
                favorite_news_ids: Vec::new(),
            })
            .await
    }

    pub async fn seed_category(&self, name: &str) -> Category {
        self.repo.create_category(name).await.unwrap()
    }

    pub async fn seed_news(&self, title: &str, category: &Category) -> News {
        self.repo
            .create_news(NewNews {
                title: title.to_string(),
                description: format!("About {title}"),
                image: format!("{title}.png"),
                category_id: category.id.clone(),
            })
            .await
            .unwrap()
    }

    pub fn access_token(&self, user: &User) -> String {
        self.tokens
            .issue(
                TokenClass::Access,
                &SessionClaims {
                    sub: user.id.clone(),
                    is_admin: Some(user.is_admin),
                },
            )
            .unwrap()
    }

    /// Sends one request through the full router and decodes the JSON body
    /// (non-JSON bodies come back as a JSON string).
    pub async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let (status, _, body) = self.send_with_headers(request).await;
        (status, body)
    }

    pub async fn send_with_headers(&self, request: Request<Body>) -> (StatusCode, HeaderMap, Value) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = serde_json::from_slice(&bytes)
            .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()));
        (status, headers, body)
    }
}

pub fn json_request(method: Method, uri: &str, token: Option<&str>, body: Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

/// A request with a verbatim body and an optional `Content-Type`.
pub fn raw_request(
    method: Method,
    uri: &str,
    token: Option<&str>,
    content_type: Option<&str>,
    body: &str,
) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(content_type) = content_type {
        builder = builder.header(header::CONTENT_TYPE, content_type);
    }
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

pub fn empty_request(method: Method, uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(Body::empty()).unwrap()
}

/// An image file part: (file name, content type, bytes).
pub type ImagePart<'a> = (&'a str, &'a str, Vec<u8>);

pub fn multipart_request(
    method: Method,
    uri: &str,
    token: Option<&str>,
    fields: &[(&str, &str)],
    image: Option<ImagePart<'_>>,
) -> Request<Body> {
    let mut body: Vec<u8> = Vec::new();

    for (name, value) in fields {
        body.extend_from_slice(
            format!(
                "--{MULTIPART_BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
            )
            .as_bytes(),
        );
    }

    if let Some((file_name, content_type, bytes)) = image {
        body.extend_from_slice(
            format!(
                "--{MULTIPART_BOUNDARY}\r\nContent-Disposition: form-data; name=\"image\"; filename=\"{file_name}\"\r\nContent-Type: {content_type}\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(&bytes);
        body.extend_from_slice(b"\r\n");
    }

    body.extend_from_slice(format!("--{MULTIPART_BOUNDARY}--\r\n").as_bytes());

    let mut builder = Request::builder().method(method).uri(uri).header(
        header::CONTENT_TYPE,
        format!("multipart/form-data; boundary={MULTIPART_BOUNDARY}"),
    );
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(Body::from(body)).unwrap()
}

/// A PNG-typed payload of `size` bytes; content is not inspected, only type and size.
pub fn png(size: usize) -> ImagePart<'static> {
    ("photo.png", "image/png", vec![0x89; size])
}
