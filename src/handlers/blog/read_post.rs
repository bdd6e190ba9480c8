use std::sync::Arc;

use axum::{
    extract::{Path, State},
    response::IntoResponse,
};
use chrono::NaiveDate;
use diesel::{ExpressionMethods, OptionalExtension, QueryDsl, SelectableHelper};
use diesel_async::RunQueryDsl;

use crate::{
    domain::blog::blog::{CachedPostInfo, Comment, Post, PostInfo},
    dto::responses::{blog::read_post_response::ReadPostResponse, response_data::http_resp},
    errors::code_error::{CodeError, CodeErrorResp, HandlerResponse, code_err},
    init::state::ServerState,
    schema::{comments, posts},
    util::time::now::tokio_now,
};

/// Post detail addressed by publish date and slug, Django-blog style:
/// /api/blog/posts/{year}/{month}/{day}/{slug}. Published posts only; a slug
/// whose publish date does not match the path is a 404, not a redirect.
#[utoipa::path(
    get,
    path = "/api/blog/posts/{year}/{month}/{day}/{slug}",
    tag = "blog",
    params(
        ("year" = i32, Path, description = "Publish year"),
        ("month" = u32, Path, description = "Publish month"),
        ("day" = u32, Path, description = "Publish day"),
        ("slug" = String, Path, description = "Post slug")
    ),
    responses(
        (status = 200, description = "Full post with active comments", body = ReadPostResponse),
        (status = 404, description = "No published post at that date/slug", body = CodeErrorResp),
        (status = 500, description = "Internal server error", body = CodeErrorResp)
    )
)]
pub async fn read_post(
    State(state): State<Arc<ServerState>>,
    Path((year, month, day, slug)): Path<(i32, u32, u32, String)>,
) -> HandlerResponse<impl IntoResponse> {
    let start = tokio_now();

    let post_id = state
        .get_post_id_by_slug_from_cache(&slug)
        .await
        .ok_or_else(|| code_err(CodeError::POST_NOT_FOUND, format!("unknown slug '{slug}'")))?;

    let mut conn = state
        .get_conn()
        .await
        .map_err(|e| code_err(CodeError::POOL_ERROR, e))?;

    let post: Post = posts::table
        .filter(posts::post_id.eq(post_id))
        .filter(posts::post_is_published.eq(true))
        .select(Post::as_select())
        .first::<Post>(&mut conn)
        .await
        .optional()
        .map_err(|e| code_err(CodeError::DB_QUERY_ERROR, e))?
        .ok_or_else(|| {
            code_err(
                CodeError::POST_NOT_FOUND,
                format!("post '{slug}' is not published"),
            )
        })?;

    let requested_date = NaiveDate::from_ymd_opt(year, month, day);
    let published_date = post.post_published_at.map(|dt| dt.date_naive());
    if requested_date.is_none() || published_date != requested_date {
        return Err(code_err(
            CodeError::POST_NOT_FOUND,
            format!("post '{slug}' was not published on {year}-{month}-{day}"),
        ));
    }

    let post: Post = diesel::update(posts::table)
        .filter(posts::post_id.eq(post.post_id))
        .set(posts::post_view_count.eq(posts::post_view_count + 1))
        .returning(posts::all_columns)
        .get_result(&mut conn)
        .await
        .map_err(|e| code_err(CodeError::DB_QUERY_ERROR, e))?;

    let post_comments: Vec<Comment> = comments::table
        .filter(comments::post_id.eq(post.post_id))
        .filter(comments::comment_is_active.eq(true))
        .order(comments::comment_created_at.asc())
        .select(Comment::as_select())
        .load::<Comment>(&mut conn)
        .await
        .map_err(|e| code_err(CodeError::DB_QUERY_ERROR, e))?;

    drop(conn);

    // Keep the cached listing counters in step with the bump above.
    let post_tags = state
        .get_post_from_cache(&post.post_id)
        .await
        .map(|cached| cached.post_tags)
        .unwrap_or_default();
    state
        .insert_post_to_cache(&CachedPostInfo::from_post_info_with_tags(
            PostInfo::from(post.clone()),
            post_tags.clone(),
        ))
        .await;

    let post_body_html = comrak::markdown_to_html(&post.post_body, &comrak::Options::default());

    Ok(http_resp(
        ReadPostResponse {
            post,
            post_body_html,
            post_tags,
            comments: post_comments,
        },
        (),
        start,
    ))
}
