use axum::response::IntoResponse;
use serde_derive::Serialize;

use crate::{
    dto::responses::response_data::http_resp, errors::code_error::HandlerResponse,
    util::time::now::tokio_now,
};

#[derive(Serialize)]
pub struct FallbackResponse {
    message: &'static str,
    api_docs: &'static str,
}

/// Catch-all for paths outside the blog API; points the caller at Swagger UI.
pub async fn fallback_handler() -> HandlerResponse<impl IntoResponse> {
    let start = tokio_now();
    Ok(http_resp(
        FallbackResponse {
            message: "No such route on this blog API.",
            api_docs: "/swagger-ui",
        },
        (),
        start,
    ))
}
