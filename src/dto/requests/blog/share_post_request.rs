use utoipa::ToSchema;

#[derive(serde_derive::Deserialize, ToSchema)]
pub struct SharePostRequest {
    pub sender_name: String,
    pub recipient_email: String,
    pub note: Option<String>,
}
