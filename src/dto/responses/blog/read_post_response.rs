use serde_derive::Serialize;
use utoipa::ToSchema;

use crate::domain::blog::blog::{CachedTag, Comment, Post};

#[derive(Serialize, ToSchema)]
pub struct ReadPostResponse {
    pub post: Post,
    /// Post body rendered from markdown
    pub post_body_html: String,
    pub post_tags: Vec<CachedTag>,
    pub comments: Vec<Comment>,
}
