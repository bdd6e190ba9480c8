//! OpenAPI documentation registration for Swagger UI.
//!
//! Important: Utoipa only exposes operations you list in `#[openapi(paths(...))]`.
//! Handler functions still need their own `#[utoipa::path(...)]` attributes.

use utoipa::OpenApi;

// ---- handlers (for `paths(...)`) ----
use crate::handlers::{
    blog::{get_posts, get_tags, read_post, search_posts, share_post, submit_comment},
    server::healthcheck,
};

// ---- schemas (for `components(schemas(...))`) ----
use crate::domain::blog::blog::{CachedPostInfo, CachedTag, Comment, Post, Tag};
use crate::dto::{
    requests::blog::{
        share_post_request::SharePostRequest, submit_comment_request::SubmitCommentRequest,
    },
    responses::blog::{
        get_posts_response::GetPostsResponse, read_post_response::ReadPostResponse,
        share_post_response::SharePostResponse,
    },
};
use crate::errors::code_error::CodeErrorResp;
use crate::handlers::blog::search_posts::SearchPostsResponse;
use crate::handlers::blog::get_tags::GetTagsResponse;
use crate::handlers::server::healthcheck::ServerHealthcheckResponse;

/// Central OpenAPI document for Swagger UI.
#[derive(OpenApi)]
#[openapi(
    // All API routes from `main_router.rs`.
    paths(
        // --- server ---
        healthcheck::healthcheck,

        // --- blog ---
        get_posts::get_posts,
        read_post::read_post,
        share_post::share_post,
        submit_comment::submit_comment,
        search_posts::search_posts,
        get_tags::get_tags,
    ),
    components(
        schemas(
            // shared error response
            CodeErrorResp,

            // --- blog DTOs ---
            GetPostsResponse,
            ReadPostResponse,
            SharePostRequest,
            SharePostResponse,
            SubmitCommentRequest,
            SearchPostsResponse,
            GetTagsResponse,

            // --- server DTOs ---
            ServerHealthcheckResponse,

            // --- domain models used in responses ---
            Post,
            CachedPostInfo,
            CachedTag,
            Comment,
            Tag,
        )
    ),
    tags(
        (name = "server", description = "Server status endpoints"),
        (name = "blog", description = "Blog endpoints")
    )
)]
pub struct ApiDoc;
