//! Site configuration.
//!
//! Values come from an optional `site.toml` next to the binary's working
//! directory, then from environment variables, which win.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::info;

use crate::error::{Error, Result};

pub const CONFIG_FILE: &str = "site.toml";

const DEFAULT_SITE_URL: &str = "http://localhost:3000";

#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct SiteConfig {
    pub site_url: String,
    pub port: u16,
    pub content_dir: PathBuf,
    pub is_development: bool,
    pub site_name: String,
    pub author: String,
    pub job_title: String,
    pub description: String,
    pub twitter_handle: Option<String>,
    pub feed_title: String,
    pub feed_description: String,
    pub social_links: Vec<String>,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            site_url: DEFAULT_SITE_URL.to_string(),
            port: 8080,
            content_dir: PathBuf::from("content"),
            is_development: false,
            site_name: "Portfolio".to_string(),
            author: "Site Author".to_string(),
            job_title: "Software Engineer".to_string(),
            description: "Projects, technical writing and notes on software engineering."
                .to_string(),
            twitter_handle: None,
            feed_title: "Blog".to_string(),
            feed_description: "Technical articles and insights.".to_string(),
            social_links: Vec::new(),
        }
    }
}

impl SiteConfig {
    /// Loads `path` when it exists, then applies process environment overrides.
    pub fn load(path: &Path) -> Result<Self> {
        let mut config = if path.exists() {
            let raw = std::fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
            let parsed: SiteConfig = toml::from_str(&raw).map_err(|source| Error::Config {
                path: path.to_path_buf(),
                source,
            })?;
            info!(path = %path.display(), "loaded site config");
            parsed
        } else {
            SiteConfig::default()
        };
        config.apply_overrides(|key| std::env::var(key).ok())?;
        config.site_url = normalize_site_url(&config.site_url);
        Ok(config)
    }

    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<()> {
        if let Some(url) = lookup("SITE_URL") {
            self.site_url = url;
        }
        if let Some(port) = lookup("PORT") {
            self.port = port.parse().map_err(|_| Error::InvalidSetting {
                key: "PORT",
                value: port.clone(),
            })?;
        }
        if let Some(dir) = lookup("CONTENT_DIR") {
            self.content_dir = PathBuf::from(dir);
        }
        if let Some(env) = lookup("RUST_ENV") {
            self.is_development = env == "development";
        }
        self.site_url = normalize_site_url(&self.site_url);
        Ok(())
    }

    pub fn blog_dir(&self) -> PathBuf {
        self.content_dir.join("blog")
    }

    pub fn projects_dir(&self) -> PathBuf {
        self.content_dir.join("projects")
    }

    pub fn static_dir(&self) -> PathBuf {
        self.content_dir.join("static")
    }

    /// Joins a site-relative path onto the site URL. Absolute URLs pass through.
    pub fn absolute_url(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            return path.to_string();
        }
        if path.is_empty() || path == "/" {
            return self.site_url.clone();
        }
        if path.starts_with('/') {
            format!("{}{}", self.site_url, path)
        } else {
            format!("{}/{}", self.site_url, path)
        }
    }
}

fn normalize_site_url(url: &str) -> String {
    let trimmed = url.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        DEFAULT_SITE_URL.to_string()
    } else {
        trimmed.to_string()
    }
}
