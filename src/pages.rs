//! Page bodies. Each builder returns a [`Page`] ready for the layout.

use htmlescape::encode_minimal as esc;

use crate::config::SiteConfig;
use crate::layout::Page;
use crate::markdown::{RenderedMarkdown, TocEntry};
use crate::models::{parse_content_date, BlogPost, BlogPostMeta, Project};
use crate::seo::PageMeta;
use crate::structured_data::{self, Crumb};

const LATEST_POSTS_ON_HOME: usize = 3;

pub fn home(config: &SiteConfig, featured: &[Project], posts: &[BlogPostMeta]) -> Page {
    let mut body = format!(
        r#"<section class="hero">
  <h1>Hi, I'm {author}</h1>
  <p class="muted">{job_title}. {description}</p>
  <p><a href="/projects">View projects</a> &middot; <a href="/blog">Read the blog</a></p>
</section>
"#,
        author = esc(&config.author),
        job_title = esc(&config.job_title),
        description = esc(&config.description),
    );

    if !featured.is_empty() {
        body.push_str("<section>\n<h2>Featured Projects</h2>\n");
        body.push_str(&project_cards(featured));
        body.push_str("</section>\n");
    }

    body.push_str("<section>\n<h2>Latest Posts</h2>\n");
    let latest: Vec<BlogPostMeta> = posts.iter().take(LATEST_POSTS_ON_HOME).cloned().collect();
    body.push_str(&post_cards(&latest));
    body.push_str("</section>\n");

    Page {
        meta: PageMeta::home(config),
        structured_data: vec![structured_data::person(config), structured_data::website(config)],
        body,
    }
}

/// `about_html` is the rendered `about.md`, when the site has one.
pub fn about(config: &SiteConfig, about_html: Option<&str>) -> Page {
    let text = match about_html {
        Some(html) => html.to_string(),
        None => format!(
            "<p class=\"muted\">{} is a {} who writes about building software.</p>",
            esc(&config.author),
            esc(&config.job_title.to_lowercase())
        ),
    };
    Page {
        meta: PageMeta::about(config),
        structured_data: vec![structured_data::person(config)],
        body: format!("<section class=\"prose\">\n<h1>About</h1>\n{text}\n</section>\n"),
    }
}

pub fn blog_index(config: &SiteConfig, posts: &[BlogPostMeta]) -> Page {
    Page {
        meta: PageMeta::blog_index(config),
        structured_data: vec![breadcrumbs(config, &[("Home", "/"), ("Blog", "/blog")])],
        body: format!(
            "<section>\n<h1>Blog</h1>\n<p class=\"muted\">Thoughts, stories and ideas about software engineering.</p>\n{}</section>\n",
            post_cards(posts)
        ),
    }
}

pub fn projects_index(config: &SiteConfig, projects: &[Project]) -> Page {
    Page {
        meta: PageMeta::projects_index(config),
        structured_data: vec![breadcrumbs(config, &[("Home", "/"), ("Projects", "/projects")])],
        body: format!(
            "<section>\n<h1>Projects</h1>\n<p class=\"muted\">A collection of work and side projects.</p>\n{}</section>\n",
            project_cards(projects)
        ),
    }
}

pub fn post(
    config: &SiteConfig,
    post: &BlogPost,
    rendered: &RenderedMarkdown,
    older: Option<&BlogPostMeta>,
    newer: Option<&BlogPostMeta>,
) -> Page {
    let meta = &post.meta;
    let path = format!("/blog/{}", meta.slug);
    let mut body = String::from("<div class=\"post-layout\">\n<article>\n");

    if let Some(cover) = &meta.cover {
        body.push_str(&format!(
            "<img class=\"cover\" src=\"{}\" alt=\"{}\">\n",
            esc(cover),
            esc(&meta.title)
        ));
    }

    body.push_str(&format!("<header>\n<h1>{}</h1>\n", esc(&meta.title)));
    if meta.description != crate::models::DEFAULT_DESCRIPTION {
        body.push_str(&format!("<p class=\"muted\">{}</p>\n", esc(&meta.description)));
    }
    body.push_str(&format!(
        "<p class=\"muted\">{} &middot; {} min read &middot; {}</p>\n",
        time_tag(&meta.date),
        rendered.reading_minutes,
        esc(&config.author)
    ));
    body.push_str(&tags(&meta.tags));
    body.push_str(&share_links(&config.absolute_url(&path), &meta.title));
    body.push_str("</header>\n");

    body.push_str(&format!("<div class=\"prose\">\n{}</div>\n", rendered.html));
    body.push_str(&post_navigation(older, newer));
    body.push_str("</article>\n");
    body.push_str(&table_of_contents(&rendered.toc));
    body.push_str("</div>\n");

    Page {
        meta: PageMeta::post(config, meta),
        structured_data: vec![
            structured_data::article(config, meta, rendered),
            breadcrumbs(config, &[("Home", "/"), ("Blog", "/blog"), (meta.title.as_str(), path.as_str())]),
        ],
        body,
    }
}

pub fn project(config: &SiteConfig, project: &Project, rendered: &RenderedMarkdown) -> Page {
    let path = format!("/projects/{}", project.slug);
    let mut body = String::from("<article>\n<p><a href=\"/projects\">&larr; Back to Projects</a></p>\n");

    if project.featured {
        body.push_str("<p><span class=\"badge\">Featured Project</span></p>\n");
    }
    body.push_str(&format!("<h1>{}</h1>\n", esc(&project.title)));
    if !project.description.is_empty() {
        body.push_str(&format!("<p class=\"muted\">{}</p>\n", esc(&project.description)));
    }

    let mut facts = Vec::new();
    if let Some(date) = &project.date {
        facts.push(time_tag(date));
    }
    if let Some(category) = &project.category {
        facts.push(esc(category));
    }
    if !facts.is_empty() {
        body.push_str(&format!("<p class=\"muted\">{}</p>\n", facts.join(" &middot; ")));
    }
    body.push_str(&tags(&project.tags));

    if let Some(image) = &project.image {
        body.push_str(&format!(
            "<img class=\"cover\" src=\"{}\" alt=\"{}\">\n",
            esc(image),
            esc(&project.title)
        ));
    }

    let content = if rendered.html.trim().is_empty() {
        "<p class=\"muted\">No content available</p>\n"
    } else {
        rendered.html.as_str()
    };
    body.push_str(&format!("<div class=\"prose\">\n{content}</div>\n"));

    body.push_str("<p class=\"project-links\">");
    if let Some(url) = project.external_url() {
        body.push_str(&format!(
            "<a href=\"{}\" target=\"_blank\" rel=\"noopener noreferrer\">Visit Live Site</a> ",
            esc(url)
        ));
    }
    if let Some(url) = &project.github_url {
        body.push_str(&format!(
            "<a href=\"{}\" target=\"_blank\" rel=\"noopener noreferrer\">View Code</a>",
            esc(url)
        ));
    }
    body.push_str("</p>\n</article>\n");

    Page {
        meta: PageMeta::project(config, project),
        structured_data: vec![
            structured_data::software_application(config, project),
            breadcrumbs(config, &[("Home", "/"), ("Projects", "/projects"), (project.title.as_str(), path.as_str())]),
        ],
        body,
    }
}

pub fn not_found(config: &SiteConfig, path: &str) -> Page {
    Page {
        meta: PageMeta::not_found(config),
        structured_data: Vec::new(),
        body: format!(
            "<section>\n<h1>404 - Not Found</h1>\n<p class=\"muted\">Nothing lives at <code>{}</code>.</p>\n<p><a href=\"/\">Go home</a></p>\n</section>\n",
            esc(path)
        ),
    }
}

/// `Month D, YYYY` for dates that parse, the raw string otherwise.
pub fn display_date(raw: &str) -> String {
    match parse_content_date(raw) {
        Some(date) => date.format("%B %-d, %Y").to_string(),
        None => raw.to_string(),
    }
}

fn time_tag(raw: &str) -> String {
    match parse_content_date(raw) {
        Some(date) => format!(
            "<time datetime=\"{}\">{}</time>",
            date.to_rfc3339(),
            display_date(raw)
        ),
        None => esc(raw),
    }
}

fn tags(tags: &[String]) -> String {
    if tags.is_empty() {
        return String::new();
    }
    let spans: String = tags
        .iter()
        .map(|t| format!("<span class=\"tag\">{}</span>", esc(t)))
        .collect();
    format!("<p class=\"tags\">{spans}</p>\n")
}

fn post_cards(posts: &[BlogPostMeta]) -> String {
    if posts.is_empty() {
        return "<p class=\"muted\">No posts yet.</p>\n".to_string();
    }
    let mut out = String::from("<ul class=\"cards\">\n");
    for post in posts {
        out.push_str(&format!(
            "<li class=\"card\"><a href=\"/blog/{slug}\"><h3>{title}</h3></a><p class=\"muted\">{date}</p><p>{description}</p>{tags}</li>\n",
            slug = esc(&post.slug),
            title = esc(&post.title),
            date = time_tag(&post.date),
            description = esc(&post.description),
            tags = tags(&post.tags),
        ));
    }
    out.push_str("</ul>\n");
    out
}

fn project_cards(projects: &[Project]) -> String {
    if projects.is_empty() {
        return "<p class=\"muted\">No projects yet.</p>\n".to_string();
    }
    let mut out = String::from("<ul class=\"cards\">\n");
    for project in projects {
        let image = project
            .image
            .as_deref()
            .map(|src| format!("<img src=\"{}\" alt=\"{}\" loading=\"lazy\">", esc(src), esc(&project.title)))
            .unwrap_or_default();
        out.push_str(&format!(
            "<li class=\"card\">{image}<a href=\"/projects/{slug}\"><h3>{title}</h3></a><p>{description}</p>{tags}</li>\n",
            slug = esc(&project.slug),
            title = esc(&project.title),
            description = esc(&project.description),
            tags = tags(&project.tags),
        ));
    }
    out.push_str("</ul>\n");
    out
}

fn post_navigation(older: Option<&BlogPostMeta>, newer: Option<&BlogPostMeta>) -> String {
    if older.is_none() && newer.is_none() {
        return String::new();
    }
    let link = |post: Option<&BlogPostMeta>, rel: &str, label: &str| match post {
        Some(p) => format!(
            "<a rel=\"{rel}\" href=\"/blog/{}\"><small class=\"muted\">{label}</small><br>{}</a>",
            esc(&p.slug),
            esc(&p.title)
        ),
        None => "<span></span>".to_string(),
    };
    format!(
        "<nav class=\"post-nav\">{}{}</nav>\n",
        link(older, "prev", "Previous"),
        link(newer, "next", "Next")
    )
}

fn table_of_contents(toc: &[TocEntry]) -> String {
    if toc.is_empty() {
        return String::new();
    }
    let items: String = toc
        .iter()
        .map(|entry| {
            format!(
                "<li class=\"level-{}\"><a href=\"#{}\">{}</a></li>",
                entry.level,
                esc(&entry.id),
                esc(&entry.text)
            )
        })
        .collect();
    format!("<aside class=\"toc\">\n<h2>Table of Contents</h2>\n<ul>{items}</ul>\n</aside>\n")
}

fn share_links(url: &str, title: &str) -> String {
    let url_q = percent_encode(url);
    let title_q = percent_encode(title);
    format!(
        "<p class=\"share\">Share: \
<a href=\"https://twitter.com/intent/tweet?url={url_q}&amp;text={title_q}\" target=\"_blank\" rel=\"noopener noreferrer\">X</a> \
<a href=\"https://www.linkedin.com/sharing/share-offsite/?url={url_q}\" target=\"_blank\" rel=\"noopener noreferrer\">LinkedIn</a> \
<a href=\"https://www.facebook.com/sharer/sharer.php?u={url_q}\" target=\"_blank\" rel=\"noopener noreferrer\">Facebook</a></p>\n"
    )
}

// RFC 3986 unreserved characters pass through; everything else is %XX per UTF-8 byte.
fn percent_encode(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for byte in input.bytes() {
        if byte.is_ascii_alphanumeric() || matches!(byte, b'-' | b'_' | b'.' | b'~') {
            out.push(char::from(byte));
        } else {
            out.push_str(&format!("%{byte:02X}"));
        }
    }
    out
}

fn breadcrumbs(config: &SiteConfig, items: &[(&str, &str)]) -> serde_json::Value {
    let crumbs: Vec<Crumb<'_>> = items
        .iter()
        .map(|(name, path)| Crumb {
            name: *name,
            path: (*path).to_string(),
        })
        .collect();
    structured_data::breadcrumbs(config, &crumbs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::markdown::render_document;
    use scraper::{Html, Selector};
    use serde_json::{json, Map, Value};

    fn meta(slug: &str, fm: Value) -> BlogPostMeta {
        let Value::Object(map) = fm else { unreachable!() };
        BlogPostMeta::from_front_matter(slug, map, "2024-01-01")
    }

    fn select_count(html: &str, selector: &str) -> usize {
        let doc = Html::parse_fragment(html);
        doc.select(&Selector::parse(selector).unwrap()).count()
    }

    #[test]
    fn display_date_formats_parseable_dates() {
        assert_eq!(display_date("2024-03-05"), "March 5, 2024");
        assert_eq!(display_date("sometime"), "sometime");
    }

    #[test]
    fn post_page_has_toc_navigation_and_schemas() {
        let config = SiteConfig::default();
        let post = BlogPost {
            meta: meta("mid", json!({ "title": "Middle", "tags": ["rust"] })),
            content: "## Setup\n\ntext\n\n### Details\n".to_string(),
        };
        let rendered = render_document(&post.content);
        let older = meta("old", json!({ "title": "Old" }));
        let newer = meta("new", json!({ "title": "New" }));
        let page = super::post(&config, &post, &rendered, Some(&older), Some(&newer));

        assert_eq!(select_count(&page.body, "aside.toc li"), 2);
        assert_eq!(select_count(&page.body, "a[rel=prev][href='/blog/old']"), 1);
        assert_eq!(select_count(&page.body, "a[rel=next][href='/blog/new']"), 1);
        assert_eq!(select_count(&page.body, "span.tag"), 1);
        assert_eq!(page.structured_data.len(), 2);
        assert_eq!(page.structured_data[1]["itemListElement"][2]["name"], "Middle");
    }

    #[test]
    fn project_page_shows_links_and_badge() {
        let mut fm = Map::new();
        fm.insert("title".to_string(), json!("Folio"));
        fm.insert("featured".to_string(), json!(true));
        fm.insert("githubUrl".to_string(), json!("https://github.com/ada/folio"));
        fm.insert("link".to_string(), json!("https://folio.example"));
        let project = Project::from_front_matter("folio", fm, String::new());
        let page = super::project(&SiteConfig::default(), &project, &render_document(""));

        assert!(page.body.contains("Featured Project"));
        assert!(page.body.contains("No content available"));
        assert_eq!(select_count(&page.body, "a[href='https://folio.example']"), 1);
        assert_eq!(select_count(&page.body, "a[href='https://github.com/ada/folio']"), 1);
    }

    #[test]
    fn blog_index_lists_every_post() {
        let posts = vec![meta("a", json!({})), meta("b", json!({}))];
        let page = blog_index(&SiteConfig::default(), &posts);
        assert_eq!(select_count(&page.body, "li.card"), 2);
    }

    #[test]
    fn home_limits_latest_posts() {
        let posts: Vec<_> = (0..5).map(|i| meta(&format!("p{i}"), json!({}))).collect();
        let page = home(&SiteConfig::default(), &[], &posts);
        assert_eq!(select_count(&page.body, "li.card"), LATEST_POSTS_ON_HOME);
        assert!(!page.body.contains("Featured Projects"));
    }

    #[test]
    fn percent_encoding_of_share_urls() {
        assert_eq!(percent_encode("a b&c/é"), "a%20b%26c%2F%C3%A9");
    }

    #[test]
    fn not_found_escapes_path() {
        let page = not_found(&SiteConfig::default(), "/<script>");
        assert!(page.body.contains("&lt;script&gt;"));
        assert!(!page.meta.indexable);
    }
}
