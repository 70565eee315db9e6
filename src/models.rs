use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde_json::{Map, Value};

pub const DEFAULT_DESCRIPTION: &str = "No description available";

/// Front-matter keys that were not lifted into a typed field.
pub type Extra = BTreeMap<String, Value>;

#[derive(Debug, Clone, PartialEq)]
pub struct BlogPostMeta {
    pub slug: String,
    pub title: String,
    pub description: String,
    pub date: String,
    pub cover: Option<String>,
    pub tags: Vec<String>,
    pub extra: Extra,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BlogPost {
    pub meta: BlogPostMeta,
    pub content: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Project {
    pub slug: String,
    pub title: String,
    pub description: String,
    pub link: Option<String>,
    pub live_url: Option<String>,
    pub github_url: Option<String>,
    pub image: Option<String>,
    pub tags: Vec<String>,
    pub date: Option<String>,
    pub featured: bool,
    pub category: Option<String>,
    pub content: String,
    pub extra: Extra,
}

impl BlogPostMeta {
    /// `now` stands in for a missing `date`.
    pub fn from_front_matter(slug: &str, mut fm: Map<String, Value>, now: &str) -> Self {
        let title = take_string(&mut fm, "title").unwrap_or_else(|| slug.to_string());
        let description =
            take_string(&mut fm, "description").unwrap_or_else(|| DEFAULT_DESCRIPTION.to_string());
        let date = take_string(&mut fm, "date").unwrap_or_else(|| now.to_string());
        let cover = take_string(&mut fm, "cover");
        let tags = take_string_list(&mut fm, "tags");

        Self {
            slug: slug.to_string(),
            title,
            description,
            date,
            cover,
            tags,
            extra: fm.into_iter().collect(),
        }
    }

    /// `summary` when the front matter has one, the description otherwise.
    pub fn summary(&self) -> &str {
        self.extra
            .get("summary")
            .and_then(Value::as_str)
            .filter(|s| !s.trim().is_empty())
            .unwrap_or(&self.description)
    }

    pub fn updated_at(&self) -> Option<&str> {
        self.extra
            .get("updatedAt")
            .or_else(|| self.extra.get("updated_at"))
            .and_then(Value::as_str)
    }

    pub fn parsed_date(&self) -> Option<DateTime<Utc>> {
        parse_content_date(&self.date)
    }
}

impl Project {
    pub fn from_front_matter(slug: &str, mut fm: Map<String, Value>, content: String) -> Self {
        let title = take_string(&mut fm, "title").unwrap_or_else(|| slug.to_string());
        let description = take_string(&mut fm, "description").unwrap_or_default();
        let featured = match fm.remove("featured") {
            Some(Value::Bool(b)) => b,
            Some(Value::String(s)) => s.eq_ignore_ascii_case("true"),
            _ => false,
        };

        Self {
            slug: slug.to_string(),
            title,
            description,
            link: take_string(&mut fm, "link"),
            live_url: take_string(&mut fm, "liveUrl"),
            github_url: take_string(&mut fm, "githubUrl"),
            image: take_string(&mut fm, "image"),
            tags: take_string_list(&mut fm, "tags"),
            date: take_string(&mut fm, "date"),
            featured,
            category: take_string(&mut fm, "category"),
            content,
            extra: fm.into_iter().collect(),
        }
    }

    /// The public URL of the project itself: `liveUrl`, then `link`.
    pub fn external_url(&self) -> Option<&str> {
        self.live_url.as_deref().or(self.link.as_deref())
    }

    pub fn parsed_date(&self) -> Option<DateTime<Utc>> {
        self.date.as_deref().and_then(parse_content_date)
    }
}

/// Accepts RFC 3339, `YYYY-MM-DD HH:MM:SS`, `YYYY-MM-DDTHH:MM:SS` and bare `YYYY-MM-DD`.
pub fn parse_content_date(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

fn take_string(fm: &mut Map<String, Value>, key: &str) -> Option<String> {
    match fm.remove(key)? {
        Value::String(s) if !s.trim().is_empty() => Some(s),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

// YAML authors write tags both as a list and as "a, b, c".
fn take_string_list(fm: &mut Map<String, Value>, key: &str) -> Vec<String> {
    match fm.remove(key) {
        Some(Value::Array(items)) => items
            .into_iter()
            .filter_map(|item| match item {
                Value::String(s) => Some(s),
                Value::Number(n) => Some(n.to_string()),
                _ => None,
            })
            .collect(),
        Some(Value::String(s)) => s
            .split(',')
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_string)
            .collect(),
        _ => Vec::new(),
    }
}
