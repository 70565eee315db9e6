use std::path::Path;

use chrono::{Datelike, Utc};
use serde_json::Value;
use tokio::fs;
use tracing::{debug, info};

use crate::config::SiteConfig;
use crate::error::{Error, Result};
use crate::seo::PageMeta;
use crate::structured_data;

pub const DEFAULT_LAYOUT: &str = include_str!("../templates/layout.html");

const HOT_RELOAD_SCRIPT: &str = r#"
<script>
    const socket = new WebSocket("ws://" + window.location.host + "/ws");
    socket.onmessage = (event) => {
        if (event.data === "reload") {
            window.location.reload();
        }
    };
</script>
"#;

/// A fully built page before it is poured into the layout.
#[derive(Debug, Clone)]
pub struct Page {
    pub meta: PageMeta,
    pub structured_data: Vec<Value>,
    pub body: String,
}

/// `layout.html` from the content directory, or the built-in layout.
pub async fn load_layout(content_dir: &Path) -> Result<String> {
    let path = content_dir.join("layout.html");
    match fs::read_to_string(&path).await {
        Ok(layout) => {
            info!(path = %path.display(), "using custom layout");
            Ok(layout)
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            debug!("using built-in layout");
            Ok(DEFAULT_LAYOUT.to_string())
        }
        Err(e) => Err(Error::io(&path, e)),
    }
}

pub fn render_with_layout(layout: &str, config: &SiteConfig, page: &Page, is_development: bool) -> String {
    let head = page.meta.render(config);
    let scripts: String = page
        .structured_data
        .iter()
        .map(structured_data::script_tag)
        .collect::<Vec<_>>()
        .join("\n");
    let title = htmlescape::encode_minimal(&page.meta.title);
    let author = htmlescape::encode_minimal(&config.author);
    let year = Utc::now().year().to_string();

    let mut html = fill_template(layout, |name| match name {
        "title" => Some(title.as_str()),
        "head" => Some(head.as_str()),
        "content" => Some(page.body.as_str()),
        "structured_data" => Some(scripts.as_str()),
        "author" => Some(author.as_str()),
        "year" => Some(year.as_str()),
        _ => None,
    });

    if is_development {
        html = html.replace("</body>", &format!("{}</body>", HOT_RELOAD_SCRIPT));
    }
    html
}

// Single pass over `{{ name }}` placeholders so substituted values are never rescanned.
fn fill_template<'a>(template: &str, lookup: impl Fn(&str) -> Option<&'a str>) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(start) = rest.find("{{") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        match after.find("}}") {
            Some(end) => {
                let name = after[..end].trim();
                match lookup(name) {
                    Some(value) => out.push_str(value),
                    None => out.push_str(&rest[start..start + 2 + end + 2]),
                }
                rest = &after[end + 2..];
            }
            None => {
                out.push_str(&rest[start..]);
                rest = "";
            }
        }
    }
    out.push_str(rest);
    out
}
