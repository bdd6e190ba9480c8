use std::sync::atomic::AtomicU64;

use diesel_async::AsyncPgConnection;
use diesel_async::pooled_connection::bb8::Pool;
use lettre::{AsyncSmtpTransport, Tokio1Executor};
use tracing::info;

use crate::init::config::site_base_url;
use crate::init::search::PostSearchIndex;

use super::server_state::ServerState;

#[derive(Default)]
pub struct ServerStateBuilder {
    app_name_version: Option<String>,
    server_start_time: Option<tokio::time::Instant>,
    pool: Option<Pool<AsyncPgConnection>>,
    email_client: Option<AsyncSmtpTransport<Tokio1Executor>>,
    email_from_address: Option<String>,
}

impl ServerStateBuilder {
    pub fn app_name_version(mut self, app_name_version: String) -> Self {
        self.app_name_version = Some(app_name_version);
        self
    }

    pub fn server_start_time(mut self, server_start_time: tokio::time::Instant) -> Self {
        self.server_start_time = Some(server_start_time);
        self
    }

    pub fn pool(mut self, pool: Pool<AsyncPgConnection>) -> Self {
        self.pool = Some(pool);
        self
    }

    pub fn email_client(mut self, email_client: AsyncSmtpTransport<Tokio1Executor>) -> Self {
        self.email_client = Some(email_client);
        self
    }

    pub fn email_from_address(mut self, email_from_address: String) -> Self {
        self.email_from_address = Some(email_from_address);
        self
    }

    pub fn build(self) -> anyhow::Result<ServerState> {
        Ok(ServerState {
            app_name_version: self
                .app_name_version
                .ok_or_else(|| anyhow::anyhow!("app_name_version is required"))?,
            server_start_time: self
                .server_start_time
                .ok_or_else(|| anyhow::anyhow!("server_start_time is required"))?,
            pool: self
                .pool
                .ok_or_else(|| anyhow::anyhow!("pool is required"))?,
            responses_handled: AtomicU64::new(0u64),
            email_client: self
                .email_client
                .ok_or_else(|| anyhow::anyhow!("email_client is required"))?,
            email_from_address: self
                .email_from_address
                .ok_or_else(|| anyhow::anyhow!("email_from_address is required"))?,
            site_base_url: site_base_url(),
            blog_posts_cache: scc::HashMap::new(),
            blog_post_slug_cache: scc::HashMap::new(),
            search_index: {
                // Disk-persisted index, configurable via env var
                let index_path = std::env::var("SEARCH_INDEX_PATH")
                    .unwrap_or_else(|_| "./data/search_index".to_string());
                let index = PostSearchIndex::open_or_create(&index_path)?;
                info!(path = %index_path, "Search index initialized");
                index
            },
        })
    }
}
