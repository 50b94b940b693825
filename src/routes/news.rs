use crate::{AppState, handlers::news};
use axum::{
    Router,
    routing::get,
};

/// News Router
///
/// Mounted at `/news`. Feed, article and comment listings personalise their answer
/// when a valid access token is present; writes on articles are admin-only and
/// posting a comment needs any signed-in user.
pub fn news_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(news::list_news).post(news::create_news))
        .route("/search/{query}", get(news::search_news))
        .route(
            "/{id}",
            get(news::get_news)
                .patch(news::update_news)
                .delete(news::delete_news),
        )
        .route(
            "/{id}/comments",
            get(news::list_comments).post(news::add_comment),
        )
}
