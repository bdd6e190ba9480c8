use axum::http::{HeaderValue, StatusCode, header::HeaderName};
use axum::response::IntoResponse;
use serde_derive::Serialize;
use std::error::Error;
use std::fmt;
use utoipa::ToSchema;

pub type HandlerResponse<T> = Result<T, CodeErrorResp>;

pub struct CodeError {
    pub success: bool,
    pub error_code: u16,
    pub http_status_code: StatusCode,
    pub message: &'static str,
}

impl CodeError {
    pub const POOL_ERROR: CodeError = CodeError {
        success: false,
        error_code: 0,
        http_status_code: StatusCode::INTERNAL_SERVER_ERROR,
        message: "Could not get conn out of pool!",
    };
    pub const DB_QUERY_ERROR: CodeError = CodeError {
        success: false,
        error_code: 1,
        http_status_code: StatusCode::INTERNAL_SERVER_ERROR,
        message: "Database query failed!",
    };
    pub const DB_INSERTION_ERROR: CodeError = CodeError {
        success: false,
        error_code: 2,
        http_status_code: StatusCode::INTERNAL_SERVER_ERROR,
        message: "Database insert failed!",
    };
    pub const TAG_NOT_FOUND: CodeError = CodeError {
        success: false,
        error_code: 3,
        http_status_code: StatusCode::NOT_FOUND,
        message: "No tag with that slug!",
    };
    pub const POST_NOT_FOUND: CodeError = CodeError {
        success: false,
        error_code: 4,
        http_status_code: StatusCode::NOT_FOUND,
        message: "No such published post!",
    };
    pub const INVALID_EMAIL_ADDRESS: CodeError = CodeError {
        success: false,
        error_code: 5,
        http_status_code: StatusCode::BAD_REQUEST,
        message: "Not a valid email address!",
    };
    pub const EMAIL_SEND_ERROR: CodeError = CodeError {
        success: false,
        error_code: 6,
        http_status_code: StatusCode::INTERNAL_SERVER_ERROR,
        message: "Could not send email!",
    };
    pub const INVALID_REQUEST: CodeError = CodeError {
        success: false,
        error_code: 7,
        http_status_code: StatusCode::BAD_REQUEST,
        message: "Invalid request parameters!",
    };
}

pub fn code_err<E: fmt::Display>(cerr: CodeError, e: E) -> CodeErrorResp {
    CodeErrorResp {
        success: cerr.success,
        error_code: cerr.error_code,
        http_status_code: cerr.http_status_code,
        message: cerr.message.to_string(),
        error_message: e.to_string(),
    }
}

impl From<CodeError> for CodeErrorResp {
    fn from(cerr: CodeError) -> Self {
        CodeErrorResp {
            success: cerr.success,
            error_code: cerr.error_code,
            http_status_code: cerr.http_status_code,
            message: cerr.message.to_string(),
            error_message: String::new(),
        }
    }
}

#[derive(Serialize, Debug, ToSchema)]
pub struct CodeErrorResp {
    pub success: bool,
    pub error_code: u16,
    #[serde(serialize_with = "serialize_status_code")]
    #[schema(value_type = u16)]
    pub http_status_code: StatusCode,
    pub message: String,
    pub error_message: String,
}

fn serialize_status_code<S>(status: &StatusCode, serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    serializer.serialize_u16(status.as_u16())
}

impl fmt::Display for CodeErrorResp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.message, self.error_message)
    }
}

impl Error for CodeErrorResp {}

impl IntoResponse for CodeErrorResp {
    fn into_response(self) -> axum::response::Response {
        let body = serde_json::to_string(&self).unwrap_or_else(|_| "{}".to_string());
        let mut response = (self.http_status_code, body).into_response();

        // The logging middleware reads these, emits the ERSP record and strips
        // them before the response leaves the server.
        let headers = response.headers_mut();
        headers.insert(
            HeaderName::from_static("x-error-log-level"),
            HeaderValue::from_static("ERROR"),
        );
        headers.insert(
            HeaderName::from_static("x-error-status-code"),
            HeaderValue::from_str(self.http_status_code.as_str())
                .unwrap_or_else(|_| HeaderValue::from_static("")),
        );
        headers.insert(
            HeaderName::from_static("x-error-code"),
            HeaderValue::from_str(&self.error_code.to_string())
                .unwrap_or_else(|_| HeaderValue::from_static("")),
        );
        headers.insert(
            HeaderName::from_static("x-error-message"),
            HeaderValue::from_str(&self.message).unwrap_or_else(|_| HeaderValue::from_static("")),
        );
        headers.insert(
            HeaderName::from_static("x-error-detail"),
            HeaderValue::from_str(&self.error_message)
                .unwrap_or_else(|_| HeaderValue::from_static("")),
        );

        response
    }
}
