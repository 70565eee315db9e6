mod config;
mod content_loader;
mod error;
mod feed;
mod hot_reload;
mod layout;
mod manifest;
mod markdown;
mod models;
mod og_image;
mod pages;
mod robots;
mod routes;
mod seo;
mod sitemap;
mod state;
mod structured_data;

use std::{net::SocketAddr, path::Path, process::ExitCode, sync::Arc};

use tokio::{net::TcpListener, sync::broadcast};
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::{SiteConfig, CONFIG_FILE};
use crate::error::{Error, Result};
use crate::hot_reload::start_content_watcher;
use crate::state::{AppState, RouterState};

fn init_tracing() {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();
}

async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {},
                    _ = sigterm.recv() => {},
                }
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
                let _ = tokio::signal::ctrl_c().await;
            }
        }
    }
    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
    info!("shutting down");
}

async fn log_content_summary(config: &SiteConfig) {
    let posts = content_loader::static_params(&config.blog_dir()).await;
    let projects = content_loader::static_params(&config.projects_dir()).await;
    match (posts, projects) {
        (Ok(posts), Ok(projects)) => info!(
            posts = posts.len(),
            projects = projects.len(),
            dir = %config.content_dir.display(),
            "content found"
        ),
        (Err(e), _) | (_, Err(e)) => warn!("Failed to scan content: {}", e),
    }
}

async fn run() -> Result<()> {
    let config = SiteConfig::load(Path::new(CONFIG_FILE))?;
    info!("RUST_ENV is set to development: {}", config.is_development);
    log_content_summary(&config).await;

    let layout = layout::load_layout(&config.content_dir).await?;
    let port = config.port;
    let is_development = config.is_development;
    let state = Arc::new(AppState::new(config, layout));

    let (tx, _rx) = broadcast::channel(1);
    if is_development {
        info!("Hot reload enabled. Check logs for file change events.");
        start_content_watcher(tx.clone(), state.clone());
    }

    let app = routes::router(RouterState {
        app_state: state,
        broadcaster: tx,
    });

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = TcpListener::bind(addr).await.map_err(Error::Server)?;
    info!(%addr, "listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(Error::Server)
}

#[tokio::main]
async fn main() -> ExitCode {
    init_tracing();
    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}
