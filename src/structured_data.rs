//! schema.org JSON-LD documents embedded in pages.

use serde_json::{json, Value};

use crate::config::SiteConfig;
use crate::markdown::RenderedMarkdown;
use crate::models::{BlogPostMeta, Project};

const PROGRAMMING_LANGUAGES: &[&str] = &[
    "JavaScript", "TypeScript", "Python", "Java", "Go", "Rust", "C++", "PHP",
];

pub struct Crumb<'a> {
    pub name: &'a str,
    pub path: String,
}

fn person_ref(config: &SiteConfig) -> Value {
    json!({
        "@type": "Person",
        "@id": format!("{}/#person", config.site_url),
        "name": config.author,
        "url": config.site_url,
    })
}

fn image_object(url: String, caption: &str) -> Value {
    json!({
        "@type": "ImageObject",
        "url": url,
        "width": "1200",
        "height": "630",
        "caption": caption,
    })
}

pub fn person(config: &SiteConfig) -> Value {
    json!({
        "@context": "https://schema.org",
        "@type": "Person",
        "@id": format!("{}/#person", config.site_url),
        "name": config.author,
        "description": config.description,
        "url": config.site_url,
        "jobTitle": config.job_title,
        "image": image_object(config.absolute_url("/opengraph-image"), &config.author),
        "sameAs": config.social_links,
    })
}

pub fn website(config: &SiteConfig) -> Value {
    let nav = [("Home", "/"), ("About", "/about"), ("Projects", "/projects"), ("Blog", "/blog")];
    let elements: Vec<Value> = nav
        .iter()
        .enumerate()
        .map(|(i, (name, path))| {
            json!({
                "@type": "SiteNavigationElement",
                "position": i + 1,
                "name": name,
                "url": config.absolute_url(path),
            })
        })
        .collect();

    json!({
        "@context": "https://schema.org",
        "@type": "WebSite",
        "@id": format!("{}/#website", config.site_url),
        "name": config.site_name,
        "description": config.description,
        "url": config.site_url,
        "author": person_ref(config),
        "publisher": person_ref(config),
        "inLanguage": "en-US",
        "potentialAction": {
            "@type": "ReadAction",
            "target": config.absolute_url("/blog"),
        },
        "mainEntity": {
            "@type": "ItemList",
            "itemListElement": elements,
        },
    })
}

pub fn breadcrumbs(config: &SiteConfig, items: &[Crumb<'_>]) -> Value {
    let elements: Vec<Value> = items
        .iter()
        .enumerate()
        .map(|(i, crumb)| {
            json!({
                "@type": "ListItem",
                "position": i + 1,
                "name": crumb.name,
                "item": config.absolute_url(&crumb.path),
            })
        })
        .collect();
    json!({
        "@context": "https://schema.org",
        "@type": "BreadcrumbList",
        "itemListElement": elements,
    })
}

pub fn article(config: &SiteConfig, post: &BlogPostMeta, rendered: &RenderedMarkdown) -> Value {
    let url = config.absolute_url(&format!("/blog/{}", post.slug));
    let image_url = match post.cover.as_deref() {
        Some(cover) => config.absolute_url(cover),
        None => format!("{url}/opengraph-image"),
    };
    let keywords = post.tags.join(", ");

    json!({
        "@context": "https://schema.org",
        "@type": "TechArticle",
        "@id": format!("{url}#article"),
        "headline": post.title,
        "description": post.summary(),
        "author": person_ref(config),
        "publisher": person_ref(config),
        "datePublished": post.date,
        "dateModified": post.updated_at().unwrap_or(&post.date),
        "url": url,
        "image": image_object(image_url.clone(), &post.title),
        "thumbnailUrl": image_url,
        "keywords": keywords,
        "articleSection": "Technology",
        "inLanguage": "en-US",
        "timeRequired": format!("PT{}M", rendered.reading_minutes),
        "mainEntityOfPage": {
            "@type": "WebPage",
            "@id": url,
        },
        "isPartOf": {
            "@type": "Blog",
            "@id": config.absolute_url("/blog#blog"),
            "name": config.feed_title,
            "url": config.absolute_url("/blog"),
        },
    })
}

pub fn software_application(config: &SiteConfig, project: &Project) -> Value {
    let page_url = config.absolute_url(&format!("/projects/{}", project.slug));
    let url = project
        .external_url()
        .map(str::to_string)
        .unwrap_or_else(|| page_url.clone());
    let image_url = match project.image.as_deref() {
        Some(image) => config.absolute_url(image),
        None => format!("{page_url}/opengraph-image"),
    };
    let languages: Vec<&str> = project
        .tags
        .iter()
        .map(String::as_str)
        .filter(|tag| PROGRAMMING_LANGUAGES.contains(tag))
        .collect();

    let mut doc = json!({
        "@context": "https://schema.org",
        "@type": "SoftwareApplication",
        "@id": format!("{page_url}#project"),
        "name": project.title,
        "alternativeName": project.slug,
        "description": project.description,
        "applicationCategory": "WebApplication",
        "operatingSystem": "Any",
        "creator": person_ref(config),
        "url": url,
        "image": image_object(image_url.clone(), &format!("{} - Project Screenshot", project.title)),
        "screenshot": image_url,
        "keywords": project.tags.join(", "),
        "programmingLanguage": languages.join(", "),
        "isAccessibleForFree": true,
        "offers": {
            "@type": "Offer",
            "price": "0",
            "priceCurrency": "USD",
        },
        "mainEntityOfPage": {
            "@type": "WebPage",
            "@id": page_url,
        },
    });
    if let (Some(date), Value::Object(map)) = (project.date.as_ref(), &mut doc) {
        map.insert("dateCreated".to_string(), json!(date));
        map.insert("datePublished".to_string(), json!(date));
    }
    if let (Some(same_as), Value::Object(map)) = (project.external_url(), &mut doc) {
        map.insert("sameAs".to_string(), json!(same_as));
    }
    doc
}

/// Serialises `data` into a script tag. `</` is escaped so content cannot
/// terminate the element early.
pub fn script_tag(data: &Value) -> String {
    let body = data.to_string().replace("</", "<\\/");
    format!("<script type=\"application/ld+json\">{body}</script>")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::markdown::render_document;
    use serde_json::Map;

    fn config() -> SiteConfig {
        SiteConfig {
            site_url: "https://ada.dev".to_string(),
            author: "Ada".to_string(),
            ..SiteConfig::default()
        }
    }

    #[test]
    fn breadcrumb_positions_are_one_based_and_absolute() {
        let doc = breadcrumbs(
            &config(),
            &[
                Crumb { name: "Home", path: "/".to_string() },
                Crumb { name: "Blog", path: "/blog".to_string() },
            ],
        );
        let items = doc["itemListElement"].as_array().unwrap();
        assert_eq!(items[0]["position"], 1);
        assert_eq!(items[0]["item"], "https://ada.dev");
        assert_eq!(items[1]["item"], "https://ada.dev/blog");
    }

    #[test]
    fn article_uses_reading_time_and_fallback_image() {
        let mut fm = Map::new();
        fm.insert("title".to_string(), json!("Hello"));
        fm.insert("tags".to_string(), json!(["rust", "axum"]));
        let post = BlogPostMeta::from_front_matter("hello", fm, "2024-01-01");
        let rendered = render_document("some words here");
        let doc = article(&config(), &post, &rendered);
        assert_eq!(doc["@type"], "TechArticle");
        assert_eq!(doc["timeRequired"], "PT1M");
        assert_eq!(doc["thumbnailUrl"], "https://ada.dev/blog/hello/opengraph-image");
        assert_eq!(doc["keywords"], "rust, axum");
        assert_eq!(doc["dateModified"], "2024-01-01");
    }

    #[test]
    fn software_application_filters_languages() {
        let mut fm = Map::new();
        fm.insert("tags".to_string(), json!(["Rust", "Docker", "TypeScript"]));
        fm.insert("githubUrl".to_string(), json!("https://github.com/ada/x"));
        let project = Project::from_front_matter("x", fm, String::new());
        let doc = software_application(&config(), &project);
        assert_eq!(doc["programmingLanguage"], "Rust, TypeScript");
        assert_eq!(doc["url"], "https://ada.dev/projects/x");
        assert!(doc.get("sameAs").is_none());
        assert!(doc.get("dateCreated").is_none());
    }

    #[test]
    fn script_tag_cannot_be_closed_by_content() {
        let tag = script_tag(&json!({ "headline": "</script><b>" }));
        assert!(tag.starts_with("<script type=\"application/ld+json\">"));
        assert_eq!(tag.matches("</script>").count(), 1);
    }

    #[test]
    fn website_lists_navigation() {
        let doc = website(&config());
        let nav = doc["mainEntity"]["itemListElement"].as_array().unwrap();
        assert_eq!(nav.len(), 4);
        assert_eq!(nav[3]["url"], "https://ada.dev/blog");
    }
}
