use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
    response::IntoResponse,
};
use diesel::ExpressionMethods;
use diesel_async::RunQueryDsl;
use email_address::EmailAddress;
use lettre::AsyncTransport;
use tracing::{info, warn};
use uuid::Uuid;

use crate::{
    domain::blog::blog::{CachedPostInfo, Post, PostInfo},
    dto::{
        requests::blog::share_post_request::SharePostRequest,
        responses::{blog::share_post_response::SharePostResponse, response_data::http_resp},
    },
    errors::code_error::{CodeError, CodeErrorResp, HandlerResponse, code_err},
    init::state::ServerState,
    schema::posts,
    util::{email::emails::PostShareEmail, time::now::tokio_now},
};

/// Share a published post by email: a recommendation message with an
/// absolute link to the post, sent through the configured SMTP relay.
#[utoipa::path(
    post,
    path = "/api/blog/posts/{post_id}/share",
    tag = "blog",
    params(("post_id" = Uuid, Path, description = "Post to share")),
    request_body = SharePostRequest,
    responses(
        (status = 200, description = "Email handed to the SMTP relay", body = SharePostResponse),
        (status = 400, description = "Invalid recipient address", body = CodeErrorResp),
        (status = 404, description = "No such published post", body = CodeErrorResp),
        (status = 500, description = "Internal server error", body = CodeErrorResp)
    )
)]
pub async fn share_post(
    State(state): State<Arc<ServerState>>,
    Path(post_id): Path<Uuid>,
    Json(request): Json<SharePostRequest>,
) -> HandlerResponse<impl IntoResponse> {
    let start = tokio_now();

    if !EmailAddress::is_valid(&request.recipient_email) {
        return Err(code_err(
            CodeError::INVALID_EMAIL_ADDRESS,
            format!("'{}' is not a valid recipient", request.recipient_email),
        ));
    }

    let sender_name = request.sender_name.trim();
    if sender_name.is_empty() {
        return Err(code_err(
            CodeError::INVALID_REQUEST,
            "sender_name must not be empty",
        ));
    }

    let cached_post = state
        .get_post_from_cache(&post_id)
        .await
        .filter(|post| post.post_is_published)
        .ok_or_else(|| {
            code_err(
                CodeError::POST_NOT_FOUND,
                format!("no published post {post_id}"),
            )
        })?;

    let post_link = match cached_post.post_published_at {
        Some(published_at) => {
            use chrono::Datelike;
            let date = published_at.date_naive();
            format!(
                "{}/blog/{}/{}/{}/{}",
                state.get_site_base_url(),
                date.year(),
                date.month(),
                date.day(),
                cached_post.post_slug
            )
        }
        None => {
            return Err(code_err(
                CodeError::POST_NOT_FOUND,
                format!("post {post_id} has no publish timestamp"),
            ));
        }
    };

    let subject = format!(
        "{} recommends you read {}",
        sender_name, cached_post.post_title
    );

    let message = PostShareEmail::new()
        .set_sender_name(sender_name)
        .set_post_title(&cached_post.post_title)
        .set_post_link(&post_link)
        .set_note(request.note.as_deref().unwrap_or_default())
        .to_message(
            state.get_email_from_address(),
            &request.recipient_email,
            &subject,
        )
        .map_err(|e| code_err(CodeError::EMAIL_SEND_ERROR, e))?;

    state
        .get_email_client()
        .send(message)
        .await
        .map_err(|e| code_err(CodeError::EMAIL_SEND_ERROR, e))?;

    // The mail is already out; a failed counter bump is logged, not surfaced.
    match state.get_conn().await {
        Ok(mut conn) => {
            let counter_update: Result<Post, _> = diesel::update(posts::table)
                .filter(posts::post_id.eq(post_id))
                .set(posts::post_share_count.eq(posts::post_share_count + 1))
                .returning(posts::all_columns)
                .get_result(&mut conn)
                .await;
            drop(conn);

            match counter_update {
                Ok(post) => {
                    state
                        .insert_post_to_cache(&CachedPostInfo::from_post_info_with_tags(
                            PostInfo::from(post),
                            cached_post.post_tags,
                        ))
                        .await;
                }
                Err(e) => {
                    warn!(post_id = %post_id, error = %e, "Share counter update failed after send");
                }
            }
        }
        Err(e) => {
            warn!(post_id = %post_id, error = %e, "Could not get conn for share counter update");
        }
    }

    info!(post_id = %post_id, "Post shared by email");

    Ok(http_resp(
        SharePostResponse {
            post_id,
            sent: true,
        },
        (),
        start,
    ))
}
