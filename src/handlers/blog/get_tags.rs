use std::sync::Arc;

use axum::{extract::State, response::IntoResponse};
use diesel::{ExpressionMethods, QueryDsl, SelectableHelper};
use diesel_async::RunQueryDsl;
use serde_derive::Serialize;
use utoipa::ToSchema;

use crate::{
    domain::blog::blog::Tag,
    dto::responses::response_data::http_resp,
    errors::code_error::{CodeError, CodeErrorResp, HandlerResponse, code_err},
    init::state::ServerState,
    schema::tags,
    util::time::now::tokio_now,
};

#[derive(Serialize, ToSchema)]
pub struct GetTagsResponse {
    pub tags: Vec<Tag>,
}

/// Every known tag, for building the listing filter.
#[utoipa::path(
    get,
    path = "/api/blog/tags",
    tag = "blog",
    responses(
        (status = 200, description = "All tags", body = GetTagsResponse),
        (status = 500, description = "Internal server error", body = CodeErrorResp)
    )
)]
pub async fn get_tags(
    State(state): State<Arc<ServerState>>,
) -> HandlerResponse<impl IntoResponse> {
    let start = tokio_now();

    let mut conn = state
        .get_conn()
        .await
        .map_err(|e| code_err(CodeError::POOL_ERROR, e))?;

    let all_tags: Vec<Tag> = tags::table
        .order(tags::tag_name.asc())
        .select(Tag::as_select())
        .load::<Tag>(&mut conn)
        .await
        .map_err(|e| code_err(CodeError::DB_QUERY_ERROR, e))?;

    drop(conn);

    Ok(http_resp(GetTagsResponse { tags: all_tags }, (), start))
}
