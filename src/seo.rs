//! HTML `<head>` metadata for every page: title, description, canonical
//! link, OpenGraph and Twitter cards.

use htmlescape::encode_minimal;

use crate::config::SiteConfig;
use crate::models::{BlogPostMeta, Project};

pub const OG_IMAGE_WIDTH: u32 = 1200;
pub const OG_IMAGE_HEIGHT: u32 = 630;

#[derive(Debug, Clone, PartialEq)]
pub struct OgImage {
    pub url: String,
    pub alt: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PageMeta {
    pub title: String,
    pub description: String,
    pub canonical: String,
    pub keywords: Vec<String>,
    pub og_type: &'static str,
    pub image: OgImage,
    pub published_time: Option<String>,
    pub modified_time: Option<String>,
    pub tags: Vec<String>,
    pub indexable: bool,
}

impl PageMeta {
    fn website(config: &SiteConfig, title: String, description: String, canonical: &str) -> Self {
        let alt = title.clone();
        Self {
            title,
            description,
            canonical: canonical.to_string(),
            keywords: Vec::new(),
            og_type: "website",
            image: OgImage {
                url: config.absolute_url("/opengraph-image"),
                alt,
            },
            published_time: None,
            modified_time: None,
            tags: Vec::new(),
            indexable: true,
        }
    }

    pub fn home(config: &SiteConfig) -> Self {
        Self::website(
            config,
            format!("{} - {} | {}", config.author, config.job_title, config.site_name),
            config.description.clone(),
            "/",
        )
    }

    pub fn about(config: &SiteConfig) -> Self {
        Self::website(
            config,
            titled(config, "About"),
            format!("Learn more about {}, {}.", config.author, config.job_title.to_lowercase()),
            "/about",
        )
    }

    pub fn blog_index(config: &SiteConfig) -> Self {
        Self::website(
            config,
            titled(config, "Blog"),
            format!("Technical articles and insights from {}.", config.author),
            "/blog",
        )
    }

    pub fn projects_index(config: &SiteConfig) -> Self {
        Self::website(
            config,
            titled(config, "Projects"),
            format!("Explore projects by {}.", config.author),
            "/projects",
        )
    }

    pub fn not_found(config: &SiteConfig) -> Self {
        let mut meta = Self::website(
            config,
            titled(config, "Not Found"),
            "The page you are looking for does not exist.".to_string(),
            "/",
        );
        meta.indexable = false;
        meta
    }

    pub fn post(config: &SiteConfig, post: &BlogPostMeta) -> Self {
        let canonical = format!("/blog/{}", post.slug);
        let image_url = match post.cover.as_deref() {
            Some(cover) => config.absolute_url(cover),
            None => config.absolute_url(&format!("{canonical}/opengraph-image")),
        };
        Self {
            title: titled(config, &post.title),
            description: post.summary().to_string(),
            keywords: post.tags.clone(),
            og_type: "article",
            image: OgImage {
                url: image_url,
                alt: post.title.clone(),
            },
            published_time: Some(post.date.clone()),
            modified_time: Some(post.updated_at().unwrap_or(&post.date).to_string()),
            tags: post.tags.clone(),
            canonical,
            indexable: true,
        }
    }

    pub fn project(config: &SiteConfig, project: &Project) -> Self {
        let canonical = format!("/projects/{}", project.slug);
        let image_url = match project.image.as_deref() {
            Some(image) => config.absolute_url(image),
            None => config.absolute_url(&format!("{canonical}/opengraph-image")),
        };
        let mut meta = Self::website(
            config,
            titled(config, &project.title),
            project.description.clone(),
            &canonical,
        );
        meta.keywords = project.tags.clone();
        meta.image = OgImage {
            url: image_url,
            alt: project.title.clone(),
        };
        meta
    }

    /// Renders the `<head>` fragment.
    pub fn render(&self, config: &SiteConfig) -> String {
        let mut head = String::new();
        let canonical = config.absolute_url(&self.canonical);

        push_tag(&mut head, &format!("<title>{}</title>", encode_minimal(&self.title)));
        push_meta(&mut head, "name", "description", &self.description);
        if !self.keywords.is_empty() {
            push_meta(&mut head, "name", "keywords", &self.keywords.join(", "));
        }
        push_meta(&mut head, "name", "author", &config.author);
        push_meta(
            &mut head,
            "name",
            "robots",
            if self.indexable { "index, follow, max-image-preview:large" } else { "noindex, nofollow" },
        );
        push_tag(
            &mut head,
            &format!("<link rel=\"canonical\" href=\"{}\">", encode_minimal(&canonical)),
        );
        push_tag(
            &mut head,
            &format!(
                "<link rel=\"alternate\" type=\"application/rss+xml\" title=\"{}\" href=\"{}\">",
                encode_minimal(&config.feed_title),
                encode_minimal(&config.absolute_url("/feed.xml"))
            ),
        );
        push_tag(&mut head, "<link rel=\"manifest\" href=\"/manifest.json\">");

        push_meta(&mut head, "property", "og:title", &self.title);
        push_meta(&mut head, "property", "og:description", &self.description);
        push_meta(&mut head, "property", "og:url", &canonical);
        push_meta(&mut head, "property", "og:site_name", &config.site_name);
        push_meta(&mut head, "property", "og:type", self.og_type);
        push_meta(&mut head, "property", "og:locale", "en_US");
        push_meta(&mut head, "property", "og:image", &self.image.url);
        push_meta(&mut head, "property", "og:image:width", &OG_IMAGE_WIDTH.to_string());
        push_meta(&mut head, "property", "og:image:height", &OG_IMAGE_HEIGHT.to_string());
        push_meta(&mut head, "property", "og:image:alt", &self.image.alt);
        if let Some(published) = &self.published_time {
            push_meta(&mut head, "property", "article:published_time", published);
        }
        if let Some(modified) = &self.modified_time {
            push_meta(&mut head, "property", "article:modified_time", modified);
        }
        for tag in &self.tags {
            push_meta(&mut head, "property", "article:tag", tag);
        }

        push_meta(&mut head, "name", "twitter:card", "summary_large_image");
        push_meta(&mut head, "name", "twitter:title", &self.title);
        push_meta(&mut head, "name", "twitter:description", &self.description);
        push_meta(&mut head, "name", "twitter:image", &self.image.url);
        if let Some(handle) = &config.twitter_handle {
            push_meta(&mut head, "name", "twitter:creator", handle);
        }
        head
    }
}

fn titled(config: &SiteConfig, page: &str) -> String {
    format!("{page} | {}", config.author)
}

fn push_meta(head: &mut String, attr: &str, key: &str, content: &str) {
    push_tag(
        head,
        &format!("<meta {attr}=\"{key}\" content=\"{}\">", encode_minimal(content)),
    );
}

fn push_tag(head: &mut String, tag: &str) {
    head.push_str(tag);
    head.push('\n');
}
