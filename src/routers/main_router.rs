use std::sync::Arc;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    middleware::from_fn_with_state,
    routing::{get, post},
};
use tower_http::{compression::CompressionLayer, cors::CorsLayer};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::{
    docs::ApiDoc,
    handlers::{
        blog::{
            get_posts::get_posts, get_tags::get_tags, read_post::read_post,
            search_posts::search_posts, share_post::share_post, submit_comment::submit_comment,
        },
        server::{fallback::fallback_handler, healthcheck::healthcheck},
    },
    init::state::ServerState,
};

use super::middleware::logging::log_middleware;

const MAX_REQUEST_SIZE: usize = 1024 * 1024; // 1MB; no uploads on this API

pub fn build_router(state: Arc<ServerState>) -> axum::Router {
    let log_middleware = from_fn_with_state(state.clone(), log_middleware);
    let compression_middleware = CompressionLayer::new().gzip(true);
    let cors_layer = CorsLayer::very_permissive();

    let api_router = Router::new()
        .route("/api/healthcheck/server", get(healthcheck))
        .route("/api/blog/posts", get(get_posts))
        .route(
            "/api/blog/posts/{year}/{month}/{day}/{slug}",
            get(read_post),
        )
        .route("/api/blog/posts/{post_id}/share", post(share_post))
        .route("/api/blog/posts/{post_id}/comments", post(submit_comment))
        .route("/api/blog/search", get(search_posts))
        .route("/api/blog/tags", get(get_tags))
        .layer(compression_middleware)
        .layer(log_middleware)
        .layer(DefaultBodyLimit::max(MAX_REQUEST_SIZE))
        .layer(cors_layer)
        .with_state(state.clone());

    Router::new()
        .merge(api_router)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .fallback(fallback_handler)
}
