use std::sync::atomic::AtomicU64;

use diesel_async::AsyncPgConnection;
use diesel_async::pooled_connection::bb8::{Pool, PooledConnection};
use lettre::{AsyncSmtpTransport, Tokio1Executor};
use tracing::{error, info};
use uuid::Uuid;

use crate::domain::blog::blog::CachedPostInfo;
use crate::init::load_cache::post_info::load_post_info;
use crate::init::search::PostSearchIndex;
use crate::util::time::now::tokio_now;

use super::builder::ServerStateBuilder;

pub struct ServerState {
    pub(crate) app_name_version: String,
    pub(crate) server_start_time: tokio::time::Instant,
    pub(crate) pool: Pool<AsyncPgConnection>,
    pub(crate) responses_handled: AtomicU64,
    pub(crate) email_client: lettre::AsyncSmtpTransport<Tokio1Executor>,
    pub(crate) email_from_address: String,
    pub(crate) site_base_url: String,
    pub(crate) blog_posts_cache: scc::HashMap<uuid::Uuid, CachedPostInfo>, // read/write
    pub(crate) blog_post_slug_cache: scc::HashMap<String, uuid::Uuid>,     // read/write
    pub(crate) search_index: PostSearchIndex, // full-text over titles and tag slugs
}

impl ServerState {
    fn normalize_post_slug(slug: &str) -> Option<String> {
        let normalized = slug.trim().to_lowercase();
        if normalized.is_empty() {
            None
        } else {
            Some(normalized)
        }
    }

    async fn upsert_post_cache_internal(&self, post: &CachedPostInfo) {
        let previous_slug = self
            .blog_posts_cache
            .read_async(&post.post_id, |_, cached| cached.post_slug.clone())
            .await;

        if self
            .blog_posts_cache
            .update_async(&post.post_id, |_, cached| {
                *cached = post.clone();
            })
            .await
            .is_none()
        {
            let _ = self
                .blog_posts_cache
                .insert_async(post.post_id, post.clone())
                .await;
        }

        let new_slug_normalized = Self::normalize_post_slug(&post.post_slug);
        if let Some(old_slug) = previous_slug
            && let Some(old_slug_normalized) = Self::normalize_post_slug(&old_slug)
            && let Some(mapped_post_id) = self
                .blog_post_slug_cache
                .read_async(&old_slug_normalized, |_, post_id| *post_id)
                .await
            && mapped_post_id == post.post_id
            && Some(old_slug_normalized.as_str()) != new_slug_normalized.as_deref()
        {
            let _ = self
                .blog_post_slug_cache
                .remove_async(&old_slug_normalized)
                .await;
        }

        if let Some(new_slug) = new_slug_normalized
            && self
                .blog_post_slug_cache
                .update_async(&new_slug, |_, mapped_post_id| {
                    *mapped_post_id = post.post_id;
                })
                .await
                .is_none()
        {
            let _ = self
                .blog_post_slug_cache
                .insert_async(new_slug, post.post_id)
                .await;
        }
    }

    pub fn builder() -> ServerStateBuilder {
        ServerStateBuilder::default()
    }

    pub fn get_app_name_version(&self) -> String {
        self.app_name_version.clone()
    }

    pub fn get_uptime(&self) -> tokio::time::Duration {
        self.server_start_time.elapsed()
    }

    pub async fn get_conn(&self) -> anyhow::Result<PooledConnection<'_, AsyncPgConnection>> {
        Ok(self.pool.get().await?)
    }

    pub fn get_email_client(&self) -> &AsyncSmtpTransport<Tokio1Executor> {
        &self.email_client
    }

    pub fn get_email_from_address(&self) -> &str {
        &self.email_from_address
    }

    pub fn get_site_base_url(&self) -> &str {
        &self.site_base_url
    }

    pub fn get_responses_handled(&self) -> u64 {
        std::sync::atomic::AtomicU64::load(
            &self.responses_handled,
            std::sync::atomic::Ordering::SeqCst,
        )
    }

    pub fn add_responses_handled(&self) {
        self.responses_handled
            .fetch_add(1, std::sync::atomic::Ordering::SeqCst);
    }

    /// Reload the post-info cache from the database and bring the search
    /// index into coherence with it.
    pub async fn synchronize_post_info_cache(&self) {
        let start = tokio_now();

        let post_info_vec = match load_post_info(self).await {
            Ok(post_info_vec) => post_info_vec,
            Err(e) => {
                error!("Could not synchronize post metadata cache: {:?}", e);
                return;
            }
        };

        self.blog_posts_cache
            .iter_mut_async(|entry| {
                let _ = entry.consume();
                true
            })
            .await;
        self.blog_post_slug_cache
            .iter_mut_async(|entry| {
                let _ = entry.consume();
                true
            })
            .await;

        for post_info in &post_info_vec {
            self.upsert_post_cache_internal(post_info).await;
        }

        // Only published posts are searchable
        let posts_for_index = post_info_vec
            .iter()
            .filter(|p| p.post_is_published)
            .map(|p| (p.post_id, p.post_title.as_str(), p.tag_slugs()));

        match self.search_index.sync_with_posts(posts_for_index) {
            Ok((added, removed)) => {
                if added > 0 || removed > 0 {
                    info!(
                        added = added,
                        removed = removed,
                        total_indexed = self.search_index.num_docs(),
                        "Search index synchronized with cache"
                    );
                } else {
                    info!(
                        total_indexed = self.search_index.num_docs(),
                        "Search index already coherent"
                    );
                }
            }
            Err(e) => {
                error!("Failed to sync search index: {:?}", e);
                let posts_for_rebuild = post_info_vec
                    .iter()
                    .filter(|p| p.post_is_published)
                    .map(|p| (p.post_id, p.post_title.as_str(), p.tag_slugs()));
                if let Err(e) = self.search_index.rebuild_index(posts_for_rebuild) {
                    error!("Failed to rebuild search index: {:?}", e);
                }
            }
        }

        let elapsed = start.elapsed();
        info!(
            rows_synchronized = %self.blog_posts_cache.len(),
            slug_rows_synchronized = %self.blog_post_slug_cache.len(),
            elapsed=%format!("{elapsed:?}"),
            "Post metadata cache synchronized."
        );
    }

    /// All published posts, optionally restricted to a tag slug, newest
    /// publish timestamp first. The listing handler paginates the result.
    pub async fn published_posts_from_cache(&self, tag_slug: Option<&str>) -> Vec<CachedPostInfo> {
        let mut posts: Vec<CachedPostInfo> = Vec::with_capacity(self.blog_posts_cache.len());

        self.blog_posts_cache
            .iter_async(|_, post_info| {
                posts.push(post_info.clone());
                true
            })
            .await;

        filter_and_order_published(posts, tag_slug)
    }

    /// Counter bumps go through here; the search index only cares about
    /// titles and tags so it is left alone.
    pub async fn insert_post_to_cache(&self, post: &CachedPostInfo) {
        self.upsert_post_cache_internal(post).await;
    }

    pub async fn get_post_from_cache(&self, post_id: &Uuid) -> Option<CachedPostInfo> {
        self.blog_posts_cache
            .read_async(post_id, |_, v| v.clone())
            .await
    }

    pub async fn get_post_id_by_slug_from_cache(&self, post_slug: &str) -> Option<Uuid> {
        let normalized_slug = Self::normalize_post_slug(post_slug)?;
        self.blog_post_slug_cache
            .read_async(&normalized_slug, |_, post_id| *post_id)
            .await
    }

    async fn posts_from_ids(&self, post_ids: Vec<Uuid>) -> Vec<CachedPostInfo> {
        let mut results = Vec::with_capacity(post_ids.len());
        for post_id in post_ids {
            if let Some(post) = self.get_post_from_cache(&post_id).await {
                results.push(post);
            }
        }
        results
    }

    /// Title search with pagination. Returns (posts, total_matches).
    pub async fn search_posts_by_title(
        &self,
        query: &str,
        offset: usize,
        limit: usize,
    ) -> (Vec<CachedPostInfo>, usize) {
        let (post_ids, total_matches) = match self
            .search_index
            .search_by_title_paged(query, offset, limit)
        {
            Ok(result) => result,
            Err(e) => {
                error!("Search by title failed: {:?}", e);
                return (vec![], 0);
            }
        };

        (self.posts_from_ids(post_ids).await, total_matches)
    }

    /// Tag-slug search with pagination. Returns (posts, total_matches).
    pub async fn search_posts_by_tag(
        &self,
        tag_slug: &str,
        offset: usize,
        limit: usize,
    ) -> (Vec<CachedPostInfo>, usize) {
        let (post_ids, total_matches) =
            match self.search_index.search_by_tag_paged(tag_slug, offset, limit) {
                Ok(result) => result,
                Err(e) => {
                    error!("Search by tag failed: {:?}", e);
                    return (vec![], 0);
                }
            };

        (self.posts_from_ids(post_ids).await, total_matches)
    }
}

/// Keep only published posts (carrying `tag_slug` when given), newest publish
/// timestamp first, creation time as the tiebreak.
pub(crate) fn filter_and_order_published(
    mut posts: Vec<CachedPostInfo>,
    tag_slug: Option<&str>,
) -> Vec<CachedPostInfo> {
    posts.retain(|post| {
        post.post_is_published && tag_slug.is_none_or(|slug| post.has_tag_slug(slug))
    });

    posts.sort_by(|a, b| {
        b.post_published_at
            .cmp(&a.post_published_at)
            .then_with(|| b.post_created_at.cmp(&a.post_created_at))
    });

    posts
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::*;
    use crate::domain::blog::blog::CachedTag;

    fn cached_post(title: &str, published_day: Option<u32>, tag_slugs: &[&str]) -> CachedPostInfo {
        let created = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        CachedPostInfo {
            post_id: Uuid::new_v4(),
            post_title: title.to_string(),
            post_slug: title.to_lowercase().replace(' ', "-"),
            post_created_at: created,
            post_updated_at: created,
            post_published_at: published_day
                .map(|day| Utc.with_ymd_and_hms(2024, 2, day, 12, 0, 0).unwrap()),
            post_is_published: published_day.is_some(),
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
    fn tag_filter_only_returns_posts_carrying_that_tag() {
        let posts = vec![
            cached_post("Async Rust", Some(3), &["rust", "async"]),
            cached_post("Spring Garden", Some(5), &["gardening"]),
            cached_post("Borrow Checker", Some(1), &["rust"]),
            cached_post("Unpublished Rust Draft", None, &["rust"]),
        ];

        let filtered = filter_and_order_published(posts, Some("rust"));

        assert_eq!(filtered.len(), 2);
        assert!(filtered.iter().all(|post| post.has_tag_slug("rust")));
        assert!(filtered.iter().all(|post| post.post_is_published));
    }

    #[test]
    fn unfiltered_listing_still_excludes_unpublished_posts() {
        let posts = vec![
            cached_post("Async Rust", Some(3), &["rust"]),
            cached_post("Draft", None, &[]),
        ];

        let filtered = filter_and_order_published(posts, None);

        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].post_title, "Async Rust");
    }

    #[test]
    fn listing_is_ordered_newest_publish_first() {
        let posts = vec![
            cached_post("Oldest", Some(1), &[]),
            cached_post("Newest", Some(9), &[]),
            cached_post("Middle", Some(5), &[]),
        ];

        let ordered = filter_and_order_published(posts, None);

        let titles: Vec<&str> = ordered.iter().map(|p| p.post_title.as_str()).collect();
        assert_eq!(titles, vec!["Newest", "Middle", "Oldest"]);
    }

    #[test]
    fn unknown_tag_slug_matches_nothing() {
        let posts = vec![cached_post("Async Rust", Some(3), &["rust"])];
        assert!(filter_and_order_published(posts, Some("cooking")).is_empty());
    }
}
