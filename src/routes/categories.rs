use crate::{AppState, handlers::categories};
use axum::{
    Router,
    routing::{get, patch},
};

/// Category Router
///
/// Mounted at `/categories`. Reads are public; create, rename and delete take an
/// `AdminUser`.
pub fn category_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(categories::list_categories).post(categories::create_category),
        )
        .route("/{id}/news", get(categories::category_news))
        .route(
            "/{id}",
            patch(categories::update_category).delete(categories::delete_category),
        )
}
