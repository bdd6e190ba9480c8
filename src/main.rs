use init::server_init::server_init_proc;
use mimalloc::MiMalloc;
use tracing::info;

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

// modules tree
pub mod build_info;
pub mod docs;
pub mod schema;
pub mod domain {
    pub mod blog;
}
pub mod dto {
    pub mod requests {
        pub mod blog {
            pub mod get_posts_request;
            pub mod share_post_request;
            pub mod submit_comment_request;
        }
    }
    pub mod responses {
        pub mod response_data;
        pub mod response_meta;
        pub mod blog {
            pub mod get_posts_response;
            pub mod read_post_response;
            pub mod share_post_response;
        }
    }
}
pub mod errors {
    pub mod code_error;
}
pub mod handlers {
    pub mod blog {
        pub mod get_posts;
        pub mod get_tags;
        pub mod read_post;
        pub mod search_posts;
        pub mod share_post;
        pub mod submit_comment;
    }
    pub mod server {
        pub mod fallback;
        pub mod healthcheck;
    }
}
pub mod init {
    pub mod config;
    pub mod search;
    pub mod server_init;
    pub mod state;
    pub mod load_cache {
        pub mod post_info;
    }
}
pub mod routers {
    pub mod main_router;
    pub mod middleware {
        pub mod logging;
    }
}
pub mod util {
    pub mod email {
        pub mod emails;
    }
    pub mod time {
        pub mod now;
    }
}

// main function
#[tokio::main(flavor = "multi_thread")]
async fn main() -> anyhow::Result<()> {
    let start = tokio::time::Instant::now();
    tracing_subscriber::fmt().init();

    info!("Initializing server...");
    server_init_proc(start).await?;

    Ok(())
}
