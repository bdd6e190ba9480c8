use std::collections::HashMap;

use diesel::{QueryDsl, SelectableHelper};
use diesel_async::RunQueryDsl;
use tracing::error;
use uuid::Uuid;

use crate::{
    domain::blog::blog::{CachedPostInfo, CachedTag, PostInfo},
    init::state::ServerState,
    schema::{post_tags, posts, tags},
};

pub async fn load_post_info(state: &ServerState) -> anyhow::Result<Vec<CachedPostInfo>> {
    let mut conn = match state.get_conn().await {
        Ok(conn) => conn,
        Err(e) => {
            error!(error = %e, "Could not get conn out of pool while synchronizing state.");
            return Err(e);
        }
    };

    // Load all posts
    let post_infos: Vec<PostInfo> = posts::table
        .select(PostInfo::as_select())
        .load::<PostInfo>(&mut conn)
        .await?;

    // Load all post_tags with tag names and slugs in one query
    let tag_data: Vec<(Uuid, String, String)> = post_tags::table
        .inner_join(tags::table)
        .select((post_tags::post_id, tags::tag_name, tags::tag_slug))
        .load::<(Uuid, String, String)>(&mut conn)
        .await?;

    drop(conn);

    // Build a map of post_id -> Vec<CachedTag>
    let mut tags_by_post: HashMap<Uuid, Vec<CachedTag>> = HashMap::new();
    for (post_id, tag_name, tag_slug) in tag_data {
        tags_by_post.entry(post_id).or_default().push(CachedTag {
            tag_name,
            tag_slug: tag_slug.to_lowercase(),
        });
    }

    // Combine posts with their tags
    let cached_posts: Vec<CachedPostInfo> = post_infos
        .into_iter()
        .map(|post| {
            let post_tags = tags_by_post.remove(&post.post_id).unwrap_or_default();
            CachedPostInfo::from_post_info_with_tags(post, post_tags)
        })
        .collect();

    Ok(cached_posts)
}
