use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
    response::IntoResponse,
};
use diesel_async::RunQueryDsl;
use email_address::EmailAddress;
use uuid::Uuid;

use crate::{
    domain::blog::blog::{Comment, NewComment},
    dto::{
        requests::blog::submit_comment_request::SubmitCommentRequest,
        responses::response_data::http_resp,
    },
    errors::code_error::{CodeError, CodeErrorResp, HandlerResponse, code_err},
    init::state::ServerState,
    schema::comments,
    util::time::now::tokio_now,
};

/// Anonymous comment submission; readers leave a name and an email, no
/// account involved. Comments land active and are moderated out-of-band.
#[utoipa::path(
    post,
    path = "/api/blog/posts/{post_id}/comments",
    tag = "blog",
    params(("post_id" = Uuid, Path, description = "Post to comment on")),
    request_body = SubmitCommentRequest,
    responses(
        (status = 200, description = "Created comment", body = Comment),
        (status = 400, description = "Invalid comment fields", body = CodeErrorResp),
        (status = 404, description = "No such published post", body = CodeErrorResp),
        (status = 500, description = "Internal server error", body = CodeErrorResp)
    )
)]
pub async fn submit_comment(
    State(state): State<Arc<ServerState>>,
    Path(post_id): Path<Uuid>,
    Json(request): Json<SubmitCommentRequest>,
) -> HandlerResponse<impl IntoResponse> {
    let start = tokio_now();

    let author_name = request.author_name.trim();
    let comment_body = request.comment_body.trim();
    if author_name.is_empty() || comment_body.is_empty() {
        return Err(code_err(
            CodeError::INVALID_REQUEST,
            "author_name and comment_body must not be empty",
        ));
    }

    if !EmailAddress::is_valid(&request.author_email) {
        return Err(code_err(
            CodeError::INVALID_EMAIL_ADDRESS,
            format!("'{}' is not a valid author email", request.author_email),
        ));
    }

    // Comments attach to published posts only.
    if state
        .get_post_from_cache(&post_id)
        .await
        .filter(|post| post.post_is_published)
        .is_none()
    {
        return Err(code_err(
            CodeError::POST_NOT_FOUND,
            format!("no published post {post_id}"),
        ));
    }

    let mut conn = state
        .get_conn()
        .await
        .map_err(|e| code_err(CodeError::POOL_ERROR, e))?;

    let new_comment = NewComment {
        post_id: &post_id,
        comment_author_name: author_name,
        comment_author_email: request.author_email.trim(),
        comment_body,
    };

    let inserted_comment: Comment = diesel::insert_into(comments::table)
        .values(new_comment)
        .returning(comments::all_columns)
        .get_result(&mut conn)
        .await
        .map_err(|e| code_err(CodeError::DB_INSERTION_ERROR, e))?;

    drop(conn);

    Ok(http_resp(inserted_comment, (), start))
}
