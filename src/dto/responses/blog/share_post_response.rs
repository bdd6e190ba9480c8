use serde_derive::Serialize;
use utoipa::ToSchema;

#[derive(Serialize, ToSchema)]
pub struct SharePostResponse {
    pub post_id: uuid::Uuid,
    pub sent: bool,
}
