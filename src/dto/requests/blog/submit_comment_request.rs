use utoipa::ToSchema;

#[derive(serde_derive::Deserialize, ToSchema)]
pub struct SubmitCommentRequest {
    pub author_name: String,
    pub author_email: String,
    pub comment_body: String,
}
