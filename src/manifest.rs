use serde::Serialize;

use crate::config::SiteConfig;

const ICON_SIZES: &[u32] = &[16, 32, 72, 96, 120, 128, 144, 152, 180, 192, 384, 512];
const MASKABLE_SIZES: &[u32] = &[192, 512];

#[derive(Serialize, Debug)]
pub struct WebManifest {
    name: String,
    short_name: String,
    description: String,
    start_url: &'static str,
    id: &'static str,
    scope: &'static str,
    display: &'static str,
    background_color: &'static str,
    theme_color: &'static str,
    orientation: &'static str,
    lang: &'static str,
    dir: &'static str,
    categories: Vec<&'static str>,
    icons: Vec<Icon>,
    shortcuts: Vec<Shortcut>,
}

#[derive(Serialize, Debug)]
struct Icon {
    src: String,
    sizes: String,
    #[serde(rename = "type")]
    mime: &'static str,
    purpose: &'static str,
}

#[derive(Serialize, Debug)]
struct Shortcut {
    name: &'static str,
    short_name: &'static str,
    description: String,
    url: &'static str,
    icons: Vec<Icon>,
}

impl WebManifest {
    pub fn for_site(config: &SiteConfig) -> Self {
        let mut icons = vec![Icon {
            src: "/favicon.ico".to_string(),
            sizes: "any".to_string(),
            mime: "image/x-icon",
            purpose: "any",
        }];
        icons.extend(ICON_SIZES.iter().map(|size| png_icon(format!("/static/icon-{size}x{size}.png"), *size, "any")));
        icons.extend(
            MASKABLE_SIZES
                .iter()
                .map(|size| png_icon(format!("/static/icon-maskable-{size}x{size}.png"), *size, "maskable")),
        );

        let shortcut = |name: &'static str, url: &'static str, description: String, slug: &str| Shortcut {
            name,
            short_name: name,
            description,
            url,
            icons: vec![png_icon(format!("/static/icon-{slug}-96x96.png"), 96, "any")],
        };

        Self {
            name: format!("{} - {}", config.author, config.job_title),
            short_name: config.author.clone(),
            description: config.description.clone(),
            start_url: "/",
            id: "/",
            scope: "/",
            display: "standalone",
            background_color: "#000000",
            theme_color: "#000000",
            orientation: "portrait-primary",
            lang: "en-US",
            dir: "ltr",
            categories: vec!["technology", "developer", "education"],
            icons,
            shortcuts: vec![
                shortcut("Blog", "/blog", "Read technical blog posts".to_string(), "blog"),
                shortcut("Projects", "/projects", "View portfolio projects".to_string(), "projects"),
                shortcut("About", "/about", format!("Learn about {}", config.author), "about"),
            ],
        }
    }
}

fn png_icon(src: String, size: u32, purpose: &'static str) -> Icon {
    Icon {
        src,
        sizes: format!("{size}x{size}"),
        mime: "image/png",
        purpose,
    }
}
