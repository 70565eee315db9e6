use chrono::{DateTime, SecondsFormat, Utc};
use htmlescape::encode_minimal;

use crate::config::SiteConfig;
use crate::models::{BlogPostMeta, Project};

#[derive(Debug, Clone, PartialEq)]
pub struct SitemapEntry {
    pub loc: String,
    pub lastmod: String,
    pub changefreq: &'static str,
    pub priority: f32,
}

const STATIC_ROUTES: &[(&str, &str, f32)] = &[
    ("/", "weekly", 1.0),
    ("/about", "monthly", 0.9),
    ("/projects", "weekly", 0.9),
    ("/blog", "weekly", 0.9),
];

/// Static routes, then one entry per post and per project.
pub fn entries(
    config: &SiteConfig,
    posts: &[BlogPostMeta],
    projects: &[Project],
    now: DateTime<Utc>,
) -> Vec<SitemapEntry> {
    let built = now.to_rfc3339_opts(SecondsFormat::Secs, true);
    let lastmod = |date: Option<DateTime<Utc>>| {
        date.map(|d| d.to_rfc3339_opts(SecondsFormat::Secs, true))
            .unwrap_or_else(|| built.clone())
    };

    let mut urls = Vec::with_capacity(STATIC_ROUTES.len() + posts.len() + projects.len());
    for (path, changefreq, priority) in STATIC_ROUTES {
        urls.push(SitemapEntry {
            loc: config.absolute_url(path),
            lastmod: built.clone(),
            changefreq: *changefreq,
            priority: *priority,
        });
    }
    for post in posts {
        urls.push(SitemapEntry {
            loc: config.absolute_url(&format!("/blog/{}", post.slug)),
            lastmod: lastmod(post.parsed_date()),
            changefreq: "monthly",
            priority: 0.8,
        });
    }
    for project in projects {
        urls.push(SitemapEntry {
            loc: config.absolute_url(&format!("/projects/{}", project.slug)),
            lastmod: lastmod(project.parsed_date()),
            changefreq: "monthly",
            priority: 0.8,
        });
    }
    urls
}

pub fn render_xml(urls: &[SitemapEntry]) -> String {
    let mut body = String::new();
    for entry in urls {
        body.push_str("  <url>\n");
        body.push_str(&format!("    <loc>{}</loc>\n", encode_minimal(&entry.loc)));
        body.push_str(&format!("    <lastmod>{}</lastmod>\n", entry.lastmod));
        body.push_str(&format!("    <changefreq>{}</changefreq>\n", entry.changefreq));
        body.push_str(&format!("    <priority>{:.1}</priority>\n", entry.priority));
        body.push_str("  </url>\n");
    }

    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">
{body}</urlset>
"#
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::{json, Map, Value};

    fn config() -> SiteConfig {
        SiteConfig {
            site_url: "https://ada.dev".to_string(),
            ..SiteConfig::default()
        }
    }

    fn fm(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => Map::new(),
        }
    }

    #[test]
    fn one_entry_per_content_file_plus_static_routes() {
        let now = Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap();
        let posts = vec![
            BlogPostMeta::from_front_matter("a", fm(json!({"date": "2024-01-02"})), "x"),
            BlogPostMeta::from_front_matter("b", fm(json!({"date": "someday"})), "x"),
        ];
        let projects = vec![Project::from_front_matter("p", Map::new(), String::new())];

        let urls = entries(&config(), &posts, &projects, now);
        assert_eq!(urls.len(), 4 + 2 + 1);
        assert_eq!(urls[0].loc, "https://ada.dev");
        assert_eq!(urls[0].priority, 1.0);
        assert_eq!(urls[4].loc, "https://ada.dev/blog/a");
        assert_eq!(urls[4].lastmod, "2024-01-02T00:00:00Z");
        assert_eq!(urls[5].lastmod, "2024-06-01T12:00:00Z");
        assert_eq!(urls[6].loc, "https://ada.dev/projects/p");
    }

    #[test]
    fn xml_escapes_locations() {
        let xml = render_xml(&[SitemapEntry {
            loc: "https://ada.dev/blog/a&b".to_string(),
            lastmod: "2024-01-01T00:00:00Z".to_string(),
            changefreq: "monthly",
            priority: 0.8,
        }]);
        assert!(xml.contains("<loc>https://ada.dev/blog/a&amp;b</loc>"));
        assert!(xml.contains("<priority>0.8</priority>"));
        assert_eq!(xml.matches("<url>").count(), 1);
    }

    #[test]
    fn sitemap_parses_as_xml() {
        let config = SiteConfig {
            site_url: "https://a&b.dev".to_string(),
            ..SiteConfig::default()
        };
        let now = Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap();
        let posts = vec![BlogPostMeta::from_front_matter("x<y", Map::new(), "2024-01-01")];
        let projects = vec![Project::from_front_matter("p", Map::new(), String::new())];
        let xml = render_xml(&entries(&config, &posts, &projects, now));

        let doc = roxmltree::Document::parse(&xml).unwrap();
        let locs: Vec<_> = doc
            .descendants()
            .filter(|n| n.tag_name().name() == "loc")
            .filter_map(|n| n.text())
            .collect();
        assert_eq!(locs.len(), 4 + 1 + 1);
        assert_eq!(locs[0], "https://a&b.dev");
        assert_eq!(locs[4], "https://a&b.dev/blog/x<y");
        assert_eq!(doc.root_element().tag_name().name(), "urlset");
    }
}
