use serde_derive::Serialize;
use utoipa::ToSchema;

use crate::domain::blog::blog::{CachedPostInfo, Tag};

#[derive(Serialize, ToSchema)]
pub struct GetPostsResponse {
    pub posts: Vec<CachedPostInfo>,
    pub current_page: usize,
    pub available_pages: usize,
    pub applied_tag: Option<Tag>,
}
