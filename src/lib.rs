use axum::{Router, extract::FromRef, http::HeaderName, routing::get};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    normalize_path::NormalizePath,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::{DefaultOnResponse, TraceLayer},
};
use tracing::{Level, Span};

// --- Module Structure ---

pub mod auth;
pub mod config;
pub mod error;
pub mod extract;
pub mod handlers;
pub mod id;
pub mod models;
pub mod notifier;
pub mod password;
pub mod repository;
pub mod routes;
pub mod storage;
pub mod token;
pub mod validation;

use routes::{account::account_routes, categories::category_routes, news::news_routes};

// --- Public Re-exports ---

pub use config::AppConfig;
pub use error::{ApiError, ApiResult};
pub use notifier::{LogNotifier, NotifierState, RecordingNotifier};
pub use repository::{InMemoryRepository, PostgresRepository, RepositoryState};
pub use storage::{LocalStorage, MockStorageService, S3StorageClient, StorageState};
pub use token::TokenCodec;

/// ApiDoc
///
/// The OpenAPI document served at `/api-docs/openapi.json`, assembled from the
/// `#[utoipa::path]` annotations on every handler.
#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::health,
        handlers::account::login, handlers::account::forgot_password_link,
        handlers::account::reset_password, handlers::account::sign_up_link,
        handlers::account::sign_up, handlers::account::change_password,
        handlers::account::change_email_link, handlers::account::change_email,
        handlers::account::edit_account, handlers::account::refresh_token,
        handlers::account::get_account, handlers::account::favorite_news,
        handlers::account::add_favorite_news, handlers::account::remove_favorite_news,
        handlers::account::favorite_categories, handlers::account::set_favorite_categories,
        handlers::categories::list_categories, handlers::categories::create_category,
        handlers::categories::category_news, handlers::categories::update_category,
        handlers::categories::delete_category,
        handlers::news::list_news, handlers::news::search_news, handlers::news::create_news,
        handlers::news::get_news, handlers::news::update_news, handlers::news::delete_news,
        handlers::news::list_comments, handlers::news::add_comment
    ),
    components(
        schemas(
            id::ObjectId, models::UserProfile, models::Category, models::News,
            models::NewsSummary, models::NewsDetail, models::Comment, models::CommentView,
            models::TokenPair, models::AccessTokenResponse, models::LoginRequest,
            models::EmailRequest, models::ResetPasswordRequest, models::SignUpRequest,
            models::ChangePasswordRequest, models::ChangeEmailRequest, models::EditAccountRequest,
            models::FavoriteCategoriesRequest, models::CategoryRequest, models::CommentRequest,
            models::NewsForm,
        )
    ),
    tags(
        (name = "account", description = "Sign-in, sign-up and account management"),
        (name = "categories", description = "News categories"),
        (name = "news", description = "News articles and comments"),
        (name = "health", description = "Liveness check")
    )
)]
pub struct ApiDoc;

/// AppState
///
/// Everything a handler may need, built once at startup. Every field is a cheap
/// clone (`Arc` handles or small config), so the state is cloned per request.
#[derive(Clone)]
pub struct AppState {
    pub repo: RepositoryState,
    pub storage: StorageState,
    pub notifier: NotifierState,
    pub tokens: TokenCodec,
    pub config: AppConfig,
}

impl AppState {
    /// Builds the state, deriving the token codec from the configured secrets.
    pub fn new(
        config: AppConfig,
        repo: RepositoryState,
        storage: StorageState,
        notifier: NotifierState,
    ) -> Self {
        Self {
            tokens: TokenCodec::new(&config.secrets),
            repo,
            storage,
            notifier,
            config,
        }
    }
}

// --- Axum FromRef Implementations ---

impl FromRef<AppState> for RepositoryState {
    fn from_ref(app_state: &AppState) -> RepositoryState {
        app_state.repo.clone()
    }
}

impl FromRef<AppState> for StorageState {
    fn from_ref(app_state: &AppState) -> StorageState {
        app_state.storage.clone()
    }
}

impl FromRef<AppState> for TokenCodec {
    fn from_ref(app_state: &AppState) -> TokenCodec {
        app_state.tokens.clone()
    }
}

impl FromRef<AppState> for AppConfig {
    fn from_ref(app_state: &AppState) -> AppConfig {
        app_state.config.clone()
    }
}

/// create_router
///
/// Mounts the resource routers, the docs and the health check, then wraps everything
/// in request-id, tracing and CORS layers. A trailing slash on an API path is ignored.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_methods(Any)
        .allow_origin(Any)
        .allow_headers(Any);

    let x_request_id = HeaderName::from_static("x-request-id");

    let api_router = Router::new()
        .route("/health", get(handlers::health))
        .nest("/account", account_routes())
        .nest("/categories", category_routes())
        .nest("/news", news_routes())
        .with_state(state);

    // `/account/` and `/account` reach the same handler. The docs UI serves its
    // assets under a trailing slash, so it is routed before normalization.
    let base_router = Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .fallback_service(NormalizePath::trim_trailing_slash(api_router));

    base_router
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::new(x_request_id.clone(), MakeRequestUuid))
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(trace_span_logger)
                        .on_response(
                            DefaultOnResponse::new()
                                .level(Level::INFO)
                                .latency_unit(tower_http::LatencyUnit::Millis),
                        ),
                )
                .layer(PropagateRequestIdLayer::new(x_request_id)),
        )
        .layer(cors)
}

/// trace_span_logger
///
/// Span for one request, carrying method, uri and the `x-request-id` so every log
/// line of a request can be correlated.
fn trace_span_logger(request: &axum::http::Request<axum::body::Body>) -> Span {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|value| value.to_str().ok())
        .unwrap_or("unknown");

    tracing::info_span!(
        "http_request",
        method = ?request.method(),
        uri = ?request.uri(),
        req_id = %request_id,
    )
}
