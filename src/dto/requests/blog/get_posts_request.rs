use utoipa::IntoParams;

use crate::domain::blog::paginate::DEFAULT_POSTS_PER_PAGE;

/// Query parameters of the post listing. `page` stays a raw string on
/// purpose: malformed tokens are normalized, not rejected.
#[derive(serde_derive::Deserialize, IntoParams)]
pub struct GetPostsRequest {
    /// Requested page token; anything non-numeric falls back to page 1
    pub page: Option<String>,
    /// Restrict the listing to posts carrying this tag slug
    pub tag: Option<String>,
    /// Posts per page (default 3)
    #[serde(default = "default_posts_per_page")]
    pub posts_per_page: usize,
}

#[inline(always)]
fn default_posts_per_page() -> usize {
    DEFAULT_POSTS_PER_PAGE
}
