use std::sync::Arc;

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use serde_derive::Serialize;
use utoipa::ToSchema;

use crate::{
    build_info::{AXUM_VERSION, BUILD_TIME, RUST_VERSION},
    init::state::ServerState,
};

#[derive(Serialize, ToSchema)]
pub struct ServerHealthcheckResponse {
    pub build_time: &'static str,
    pub axum_version: &'static str,
    pub rust_version: &'static str,
    pub uptime: String,
    pub responses_handled: u64,
}

#[utoipa::path(
    get,
    path = "/api/healthcheck/server",
    tag = "server",
    responses(
        (status = 200, description = "Server is healthy", body = ServerHealthcheckResponse)
    )
)]
pub async fn healthcheck(State(state): State<Arc<ServerState>>) -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(ServerHealthcheckResponse {
            build_time: BUILD_TIME,
            axum_version: AXUM_VERSION,
            rust_version: RUST_VERSION,
            uptime: format!("{:?}", state.get_uptime()),
            responses_handled: state.get_responses_handled(),
        }),
    )
}
