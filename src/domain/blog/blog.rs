use chrono::{DateTime, Utc};
use utoipa::ToSchema;

use diesel::{
    Insertable, Selectable,
    prelude::{Queryable, QueryableByName},
};

use crate::schema::{comments, posts, tags};

#[derive(Clone, serde_derive::Serialize, QueryableByName, Queryable, Selectable, ToSchema)]
#[diesel(table_name = posts)]
pub struct Post {
    pub post_id: uuid::Uuid,
    pub post_title: String,
    pub post_slug: String,
    pub post_body: String,
    pub post_created_at: DateTime<Utc>,
    pub post_updated_at: DateTime<Utc>,
    pub post_published_at: Option<DateTime<Utc>>,
    pub post_is_published: bool,
    pub post_view_count: i64,
    pub post_share_count: i64,
}

/// Listing projection of a post: everything but the body.
#[derive(
    Clone,
    serde_derive::Serialize,
    serde_derive::Deserialize,
    Queryable,
    QueryableByName,
    Selectable,
    ToSchema,
)]
#[diesel(table_name = posts)]
pub struct PostInfo {
    pub post_id: uuid::Uuid,
    pub post_title: String,
    pub post_slug: String,
    pub post_created_at: DateTime<Utc>,
    pub post_updated_at: DateTime<Utc>,
    pub post_published_at: Option<DateTime<Utc>>,
    pub post_is_published: bool,
    pub post_view_count: i64,
    pub post_share_count: i64,
}

impl From<Post> for PostInfo {
    fn from(post: Post) -> Self {
        Self {
            post_id: post.post_id,
            post_title: post.post_title,
            post_slug: post.post_slug,
            post_created_at: post.post_created_at,
            post_updated_at: post.post_updated_at,
            post_published_at: post.post_published_at,
            post_is_published: post.post_is_published,
            post_view_count: post.post_view_count,
            post_share_count: post.post_share_count,
        }
    }
}

#[derive(Clone, serde_derive::Serialize, serde_derive::Deserialize, ToSchema)]
pub struct CachedTag {
    pub tag_name: String,
    pub tag_slug: String,
}

/// Post metadata as held in the in-memory cache, tags denormalized in.
#[derive(Clone, serde_derive::Serialize, ToSchema)]
pub struct CachedPostInfo {
    pub post_id: uuid::Uuid,
    pub post_title: String,
    pub post_slug: String,
    pub post_created_at: DateTime<Utc>,
    pub post_updated_at: DateTime<Utc>,
    pub post_published_at: Option<DateTime<Utc>>,
    pub post_is_published: bool,
    pub post_view_count: i64,
    pub post_share_count: i64,
    pub post_tags: Vec<CachedTag>,
}

impl CachedPostInfo {
    pub fn from_post_info_with_tags(post_info: PostInfo, post_tags: Vec<CachedTag>) -> Self {
        Self {
            post_id: post_info.post_id,
            post_title: post_info.post_title,
            post_slug: post_info.post_slug,
            post_created_at: post_info.post_created_at,
            post_updated_at: post_info.post_updated_at,
            post_published_at: post_info.post_published_at,
            post_is_published: post_info.post_is_published,
            post_view_count: post_info.post_view_count,
            post_share_count: post_info.post_share_count,
            post_tags,
        }
    }

    pub fn has_tag_slug(&self, tag_slug: &str) -> bool {
        self.post_tags.iter().any(|tag| tag.tag_slug == tag_slug)
    }

    pub fn tag_slugs(&self) -> Vec<String> {
        self.post_tags
            .iter()
            .map(|tag| tag.tag_slug.clone())
            .collect()
    }
}

#[derive(Clone, serde_derive::Serialize, QueryableByName, Queryable, Selectable, ToSchema)]
#[diesel(table_name = tags)]
pub struct Tag {
    pub tag_id: uuid::Uuid,
    pub tag_name: String,
    pub tag_slug: String,
}

#[derive(Clone, serde_derive::Serialize, QueryableByName, Queryable, Selectable, ToSchema)]
#[diesel(table_name = comments)]
pub struct Comment {
    pub comment_id: uuid::Uuid,
    pub post_id: uuid::Uuid,
    pub comment_author_name: String,
    pub comment_author_email: String,
    pub comment_body: String,
    pub comment_created_at: DateTime<Utc>,
    pub comment_is_active: bool,
}

#[derive(Insertable)]
#[diesel(table_name = comments)]
pub struct NewComment<'a> {
    pub post_id: &'a uuid::Uuid,
    pub comment_author_name: &'a str,
    pub comment_author_email: &'a str,
    pub comment_body: &'a str,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tagged_post(tag_slugs: &[&str]) -> CachedPostInfo {
        let now = Utc::now();
        CachedPostInfo {
            post_id: uuid::Uuid::new_v4(),
            post_title: "A post".to_string(),
            post_slug: "a-post".to_string(),
            post_created_at: now,
            post_updated_at: now,
            post_published_at: Some(now),
            post_is_published: true,
            post_view_count: 0,
            post_share_count: 0,
            post_tags: tag_slugs
                .iter()
                .map(|slug| CachedTag {
                    tag_name: slug.to_string(),
                    tag_slug: slug.to_string(),
                })
                .collect(),
        }
    }

    #[test]
    fn has_tag_slug_matches_exactly() {
        let post = tagged_post(&["rust", "async"]);
        assert!(post.has_tag_slug("rust"));
        assert!(post.has_tag_slug("async"));
        assert!(!post.has_tag_slug("rus"));
        assert!(!post.has_tag_slug("gardening"));
    }

    #[test]
    fn tag_slugs_lists_every_tag() {
        let post = tagged_post(&["rust", "async"]);
        assert_eq!(post.tag_slugs(), vec!["rust", "async"]);
        assert!(tagged_post(&[]).tag_slugs().is_empty());
    }
}
