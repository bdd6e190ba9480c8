use std::sync::Arc;

use axum::{
    extract::{Query, State},
    response::IntoResponse,
};
use diesel::{ExpressionMethods, OptionalExtension, QueryDsl, SelectableHelper};
use diesel_async::RunQueryDsl;

use crate::{
    domain::blog::{blog::Tag, paginate::paginate},
    dto::{
        requests::blog::get_posts_request::GetPostsRequest,
        responses::{blog::get_posts_response::GetPostsResponse, response_data::http_resp},
    },
    errors::code_error::{CodeError, CodeErrorResp, HandlerResponse, code_err},
    init::state::ServerState,
    schema::tags,
    util::time::now::tokio_now,
};

/// Paginated listing of published posts, optionally restricted to a tag.
///
/// An unknown tag slug is the only hard failure; any malformed `page` token
/// is normalized into the valid page range instead of being rejected.
#[utoipa::path(
    get,
    path = "/api/blog/posts",
    tag = "blog",
    params(GetPostsRequest),
    responses(
        (status = 200, description = "One page of published posts", body = GetPostsResponse),
        (status = 404, description = "Tag slug does not exist", body = CodeErrorResp),
        (status = 500, description = "Internal server error", body = CodeErrorResp)
    )
)]
pub async fn get_posts(
    State(state): State<Arc<ServerState>>,
    Query(request): Query<GetPostsRequest>,
) -> HandlerResponse<impl IntoResponse> {
    let start = tokio_now();

    let applied_tag: Option<Tag> = match request.tag.as_deref() {
        Some(tag_slug) => {
            let mut conn = state
                .get_conn()
                .await
                .map_err(|e| code_err(CodeError::POOL_ERROR, e))?;

            let tag: Option<Tag> = tags::table
                .filter(tags::tag_slug.eq(tag_slug.trim().to_lowercase()))
                .select(Tag::as_select())
                .first::<Tag>(&mut conn)
                .await
                .optional()
                .map_err(|e| code_err(CodeError::DB_QUERY_ERROR, e))?;

            drop(conn);

            match tag {
                Some(tag) => Some(tag),
                None => {
                    return Err(code_err(
                        CodeError::TAG_NOT_FOUND,
                        format!("no tag with slug '{tag_slug}'"),
                    ));
                }
            }
        }
        None => None,
    };

    let posts = state
        .published_posts_from_cache(applied_tag.as_ref().map(|tag| tag.tag_slug.as_str()))
        .await;

    let page = paginate(posts, request.page.as_deref(), request.posts_per_page);

    Ok(http_resp(
        GetPostsResponse {
            posts: page.items,
            current_page: page.current_page,
            available_pages: page.total_pages,
            applied_tag,
        },
        (),
        start,
    ))
}
