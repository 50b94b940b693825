use crate::{AppState, handlers::account};
use axum::{
    Router,
    routing::{get, patch, post},
};

/// Account Router
///
/// Mounted at `/account`. The token-carrying routes (`/forgot-password/{token}`,
/// `/sign-up/{token}`) are open; the handler verifies the path token instead of a
/// bearer header. `/refresh-token` reads a refresh token from the bearer header.
pub fn account_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(account::get_account))
        .route("/login", post(account::login))
        .route("/forgot-password-link", post(account::forgot_password_link))
        .route("/forgot-password/{token}", patch(account::reset_password))
        .route("/sign-up-link", post(account::sign_up_link))
        .route("/sign-up/{token}", post(account::sign_up))
        .route("/change-password", patch(account::change_password))
        .route("/change-email-link", patch(account::change_email_link))
        .route("/change-email/{token}", patch(account::change_email))
        .route("/edit-account", patch(account::edit_account))
        .route("/refresh-token", patch(account::refresh_token))
        // GET lists, POST adds, DELETE removes one id.
        .route("/favorite-news", get(account::favorite_news))
        .route(
            "/favorite-news/{news_id}",
            post(account::add_favorite_news).delete(account::remove_favorite_news),
        )
        // POST replaces the whole set.
        .route(
            "/favorite-categories",
            get(account::favorite_categories).post(account::set_favorite_categories),
        )
}
