use chrono::{DateTime, Utc};
use htmlescape::encode_minimal;

use crate::config::SiteConfig;
use crate::models::BlogPostMeta;

pub const CONTENT_TYPE: &str = "application/xml";
pub const CACHE_CONTROL: &str = "public, max-age=3600, s-maxage=3600";

/// RSS 2.0 document with one `<item>` per post, in the order given.
pub fn render_rss(config: &SiteConfig, posts: &[BlogPostMeta], now: DateTime<Utc>) -> String {
    let site = &config.site_url;
    let mut items = String::new();
    for post in posts {
        let link = config.absolute_url(&format!("/blog/{}", post.slug));
        let pub_date = post.parsed_date().unwrap_or(now).to_rfc2822();
        items.push_str(&format!(
            r#"
    <item>
      <guid isPermaLink="true">{link}</guid>
      <title>{title}</title>
      <link>{link}</link>
      <description>{description}</description>
      <pubDate>{pub_date}</pubDate>
{categories}      <content:encoded><![CDATA[{encoded}]]></content:encoded>
    </item>"#,
            link = encode_minimal(&link),
            title = encode_minimal(&post.title),
            description = encode_minimal(post.summary()),
            categories = post
                .tags
                .iter()
                .map(|tag| format!("      <category>{}</category>\n", encode_minimal(tag)))
                .collect::<String>(),
            encoded = cdata(post.summary()),
        ));
    }

    format!(
        r#"<?xml version="1.0" encoding="UTF-8" ?>
<rss version="2.0" xmlns:content="http://purl.org/rss/1.0/modules/content/" xmlns:dc="http://purl.org/dc/elements/1.1/" xmlns:atom="http://www.w3.org/2005/Atom">
  <channel>
    <title>{title}</title>
    <link>{site}</link>
    <description>{description}</description>
    <language>en</language>
    <lastBuildDate>{built}</lastBuildDate>
    <atom:link href="{self_link}" rel="self" type="application/rss+xml" />{items}
  </channel>
</rss>
"#,
        title = encode_minimal(&config.feed_title),
        site = encode_minimal(site),
        description = encode_minimal(&config.feed_description),
        built = now.to_rfc2822(),
        self_link = encode_minimal(&config.absolute_url("/feed.xml")),
    )
}

// "]]>" would end the section early; split it across two sections.
fn cdata(text: &str) -> String {
    text.replace("]]>", "]]]]><![CDATA[>")
}
