use std::sync::Arc;

use axum::{
    extract::{Query, State},
    response::IntoResponse,
};
use serde_derive::Deserialize;
use utoipa::{IntoParams, ToSchema};

use crate::{
    domain::blog::blog::CachedPostInfo,
    dto::responses::response_data::http_resp,
    errors::code_error::{CodeError, CodeErrorResp, HandlerResponse, code_err},
    init::state::ServerState,
    util::time::now::tokio_now,
};

#[derive(Deserialize, IntoParams)]
pub struct SearchPostsRequest {
    /// The search query string
    pub q: String,
    /// Search type: "title" for title search, "tag" for exact tag-slug search
    #[serde(default = "default_search_type")]
    pub search_type: String,
    /// Maximum number of results (default 20, max 100)
    #[serde(default = "default_limit")]
    pub limit: usize,
}

fn default_search_type() -> String {
    "title".to_string()
}

fn default_limit() -> usize {
    20
}

#[derive(serde_derive::Serialize, ToSchema)]
pub struct SearchPostsResponse {
    pub posts: Vec<CachedPostInfo>,
    pub query: String,
    pub search_type: String,
    pub total_matches: usize,
}

/// Full-text search over published post titles and tag slugs.
#[utoipa::path(
    get,
    path = "/api/blog/search",
    tag = "blog",
    params(SearchPostsRequest),
    responses(
        (status = 200, description = "Search results", body = SearchPostsResponse),
        (status = 400, description = "Invalid search parameters", body = CodeErrorResp),
        (status = 500, description = "Internal server error", body = CodeErrorResp)
    )
)]
pub async fn search_posts(
    State(state): State<Arc<ServerState>>,
    Query(request): Query<SearchPostsRequest>,
) -> HandlerResponse<impl IntoResponse> {
    let start = tokio_now();

    let query = request.q.trim();
    if query.is_empty() {
        return Err(code_err(
            CodeError::INVALID_REQUEST,
            "Search query cannot be empty",
        ));
    }

    let limit = request.limit.clamp(1, 100);
    let search_type = request.search_type.to_lowercase();

    let (posts, total_matches): (Vec<CachedPostInfo>, usize) = match search_type.as_str() {
        "title" => state.search_posts_by_title(query, 0, limit).await,
        "tag" => state.search_posts_by_tag(query, 0, limit).await,
        _ => {
            return Err(code_err(
                CodeError::INVALID_REQUEST,
                "Invalid search_type. Use 'title' or 'tag'",
            ));
        }
    };

    Ok(http_resp(
        SearchPostsResponse {
            posts,
            query: query.to_string(),
            search_type,
            total_matches,
        },
        (),
        start,
    ))
}
