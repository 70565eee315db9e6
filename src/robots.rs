use crate::config::SiteConfig;

const DISALLOWED: &[&str] = &["/api/", "/admin/"];

pub fn render_robots(config: &SiteConfig) -> String {
    let mut out = String::from("User-agent: *\nAllow: /\n");
    for path in DISALLOWED {
        out.push_str(&format!("Disallow: {path}\n"));
    }
    out.push_str(&format!("\nSitemap: {}\n", config.absolute_url("/sitemap.xml")));
    out
}
