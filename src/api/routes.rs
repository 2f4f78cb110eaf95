use axum::{
    routing::{get, post},
    Router,
};

use super::handlers::{articles, favorites, ratings, recommendations, users};
use super::{handlers, AppState};

/// Creates the API router; this is the only route table of the service
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health_check))
        // Users
        .route("/subject_area", post(users::subject_area))
        .route("/auth/google", post(users::auth_google))
        // Articles
        .route("/search", get(articles::search))
        .route(
            "/articles/rating",
            post(ratings::submit).delete(ratings::remove),
        )
        .route("/articles/rating/:user_id", get(ratings::list))
        .route(
            "/articles/favorite",
            post(favorites::add).delete(favorites::remove),
        )
        .route("/articles/favorite/:user_id", get(favorites::list))
        .route("/articles/:article_id", get(articles::get_article))
        // Recommendations
        .route(
            "/content-model/get-articles",
            post(recommendations::content_based),
        )
        .route(
            "/collaborative-model/get-articles",
            post(recommendations::collaborative),
        )
        .with_state(state)
}
