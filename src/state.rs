use std::sync::Arc;
use tokio::sync::{broadcast, RwLock};

use crate::config::SiteConfig;
use crate::layout::{render_with_layout, Page};

pub type RefreshBroadcaster = broadcast::Sender<()>;

/// Shared across requests. Content itself is not held here: every request
/// re-reads the content directory.
pub struct AppState {
    pub config: SiteConfig,
    pub layout_html: RwLock<String>,
}

impl AppState {
    pub fn new(config: SiteConfig, layout_html: String) -> Self {
        Self {
            config,
            layout_html: RwLock::new(layout_html),
        }
    }

    pub async fn render(&self, page: &Page) -> String {
        let layout = self.layout_html.read().await;
        render_with_layout(&layout, &self.config, page, self.config.is_development)
    }
}

#[derive(Clone)]
pub struct RouterState {
    pub app_state: Arc<AppState>,
    pub broadcaster: RefreshBroadcaster,
}

impl axum::extract::FromRef<RouterState> for Arc<AppState> {
    fn from_ref(state: &RouterState) -> Self {
        state.app_state.clone()
    }
}

impl axum::extract::FromRef<RouterState> for RefreshBroadcaster {
    fn from_ref(state: &RouterState) -> Self {
        state.broadcaster.clone()
    }
}
