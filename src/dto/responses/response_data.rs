use axum::response::IntoResponse;
use serde_derive::Serialize;

use super::response_meta::ResponseMeta;

/// Envelope every successful endpoint answers with. Errors never pass through
/// here; they go out as `CodeErrorResp` with `success: false`.
#[derive(Serialize)]
pub struct Response<D: serde::Serialize, M: serde::Serialize> {
    success: bool,
    data: D,
    meta: ResponseMeta<M>,
}

impl<D: serde::Serialize, M: serde::Serialize> IntoResponse for Response<D, M> {
    fn into_response(self) -> axum::response::Response {
        axum::response::Json(self).into_response()
    }
}

/// Wrap handler output into the `{ success, data, meta }` envelope, stamping
/// the elapsed time since `start` into `meta`.
pub fn http_resp<D: serde::Serialize, M: serde::Serialize>(
    data: D,
    meta: M,
    start: tokio::time::Instant,
) -> Response<D, M> {
    Response {
        success: true,
        data,
        meta: ResponseMeta::from(start, meta),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Serialize)]
    struct Payload {
        answer: u32,
    }

    #[test]
    fn envelope_carries_success_data_and_meta() {
        let resp = http_resp(Payload { answer: 42 }, (), tokio::time::Instant::now());
        let json = serde_json::to_value(&resp).unwrap();

        assert_eq!(json["success"], true);
        assert_eq!(json["data"]["answer"], 42);
        assert!(json["meta"]["time_taken"].is_string());
        assert!(json["meta"]["timestamp"].is_string());
    }
}
