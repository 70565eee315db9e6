use std::{
    cmp::Ordering,
    io::ErrorKind,
    path::{Path, PathBuf},
};

use chrono::{SecondsFormat, Utc};
use gray_matter::{engine::YAML, Matter};
use serde_json::{Map, Value};
use tokio::fs;
use tracing::{debug, error, warn};

use crate::error::{Error, Result};
use crate::models::{parse_content_date, BlogPost, BlogPostMeta, Project};

const CONTENT_EXTENSION: &str = "mdx";

/// Every accessor below re-scans the directory; nothing is cached between calls.
pub async fn all_posts(dir: &Path) -> Result<Vec<BlogPostMeta>> {
    let now = now_iso();
    let mut posts = Vec::new();
    for (slug, path) in content_files(dir).await? {
        let Some(raw) = read_listed(&path).await? else {
            continue;
        };
        let (front_matter, _) = split_front_matter(&path, &raw);
        posts.push(BlogPostMeta::from_front_matter(&slug, front_matter, &now));
    }
    posts.sort_by(|a, b| newest_first(Some(&a.date), &a.slug, Some(&b.date), &b.slug));
    debug!(count = posts.len(), dir = %dir.display(), "loaded posts");
    Ok(posts)
}

pub async fn find_post(dir: &Path, slug: &str) -> Result<Option<BlogPost>> {
    let Some(raw) = read_by_slug(dir, slug).await? else {
        return Ok(None);
    };
    let path = dir.join(format!("{slug}.{CONTENT_EXTENSION}"));
    let (front_matter, content) = split_front_matter(&path, &raw);
    Ok(Some(BlogPost {
        meta: BlogPostMeta::from_front_matter(slug, front_matter, &now_iso()),
        content,
    }))
}

pub async fn all_projects(dir: &Path) -> Result<Vec<Project>> {
    let mut projects = Vec::new();
    for (slug, path) in content_files(dir).await? {
        let Some(raw) = read_listed(&path).await? else {
            continue;
        };
        let (front_matter, content) = split_front_matter(&path, &raw);
        projects.push(Project::from_front_matter(&slug, front_matter, content));
    }
    projects.sort_by(|a, b| {
        newest_first(a.date.as_deref(), &a.slug, b.date.as_deref(), &b.slug)
    });
    debug!(count = projects.len(), dir = %dir.display(), "loaded projects");
    Ok(projects)
}

pub async fn find_project(dir: &Path, slug: &str) -> Result<Option<Project>> {
    let Some(raw) = read_by_slug(dir, slug).await? else {
        return Ok(None);
    };
    let path = dir.join(format!("{slug}.{CONTENT_EXTENSION}"));
    let (front_matter, content) = split_front_matter(&path, &raw);
    Ok(Some(Project::from_front_matter(slug, front_matter, content)))
}

pub async fn featured_projects(dir: &Path) -> Result<Vec<Project>> {
    let mut projects = all_projects(dir).await?;
    projects.retain(|p| p.featured);
    Ok(projects)
}

/// The slug of every content file in `dir`, in file-name order.
pub async fn static_params(dir: &Path) -> Result<Vec<String>> {
    Ok(content_files(dir)
        .await?
        .into_iter()
        .map(|(slug, _)| slug)
        .collect())
}

/// Older and newer neighbours of `slug` in a newest-first list.
pub fn neighbours<'a>(
    posts: &'a [BlogPostMeta],
    slug: &str,
) -> (Option<&'a BlogPostMeta>, Option<&'a BlogPostMeta>) {
    let Some(index) = posts.iter().position(|p| p.slug == slug) else {
        return (None, None);
    };
    let older = posts.get(index + 1);
    let newer = index.checked_sub(1).and_then(|i| posts.get(i));
    (older, newer)
}

/// Markdown body of a standalone page such as `about.md`, without front matter.
pub async fn find_page(content_dir: &Path, name: &str) -> Result<Option<String>> {
    let path = content_dir.join(format!("{name}.md"));
    match fs::read_to_string(&path).await {
        Ok(raw) => Ok(Some(split_front_matter(&path, &raw).1)),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(e) => Err(Error::io(&path, e)),
    }
}

pub fn is_valid_slug(slug: &str) -> bool {
    !slug.is_empty()
        && !slug.starts_with('.')
        && !slug.contains("..")
        && !slug.contains(['/', '\\', '\0'])
}

async fn content_files(dir: &Path) -> Result<Vec<(String, PathBuf)>> {
    let mut entries = match fs::read_dir(dir).await {
        Ok(entries) => entries,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            warn!(dir = %dir.display(), "content directory does not exist");
            return Ok(Vec::new());
        }
        Err(e) => return Err(Error::io(dir, e)),
    };

    let mut files = Vec::new();
    while let Some(entry) = entries.next_entry().await.map_err(|e| Error::io(dir, e))? {
        let path = entry.path();
        if !path.extension().is_some_and(|ext| ext == CONTENT_EXTENSION) {
            continue;
        }
        let is_file = entry
            .file_type()
            .await
            .map_err(|e| Error::io(&path, e))?
            .is_file();
        if !is_file {
            debug!(path = %path.display(), "skipping non-file content entry");
            continue;
        }
        if let Some(slug) = path.file_stem().and_then(|s| s.to_str()) {
            files.push((slug.to_string(), path.clone()));
        }
    }
    files.sort();
    Ok(files)
}

// A file that is not UTF-8 is logged and left out of listings.
async fn read_listed(path: &Path) -> Result<Option<String>> {
    match fs::read_to_string(path).await {
        Ok(raw) => Ok(Some(raw)),
        Err(e) if e.kind() == ErrorKind::InvalidData => {
            error!(path = %path.display(), "Skipping unreadable content file: {}", e);
            Ok(None)
        }
        Err(e) => Err(Error::io(path, e)),
    }
}

async fn read_by_slug(dir: &Path, slug: &str) -> Result<Option<String>> {
    if !is_valid_slug(slug) {
        debug!(slug, "rejected slug");
        return Ok(None);
    }
    let path = dir.join(format!("{slug}.{CONTENT_EXTENSION}"));
    match fs::metadata(&path).await {
        Ok(meta) if meta.is_file() => {}
        Ok(_) => {
            debug!(path = %path.display(), "content path is not a file");
            return Ok(None);
        }
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(Error::io(&path, e)),
    }
    read_listed(&path).await
}

/// Malformed front matter is logged and treated as empty so defaults apply.
fn split_front_matter(path: &Path, raw: &str) -> (Map<String, Value>, String) {
    let matter = Matter::<YAML>::new();
    match matter.parse::<Value>(raw) {
        Ok(parsed) => {
            let data = match parsed.data {
                Some(Value::Object(map)) => map,
                None | Some(Value::Null) => Map::new(),
                Some(other) => {
                    warn!(path = %path.display(), "front matter is not a mapping: {}", other);
                    Map::new()
                }
            };
            (data, parsed.content)
        }
        Err(e) => {
            error!(path = %path.display(), "Failed to parse front matter: {}", e);
            (Map::new(), raw.to_string())
        }
    }
}

// Parseable dates first (latest first), then raw strings descending, then slug.
fn newest_first(a_date: Option<&str>, a_slug: &str, b_date: Option<&str>, b_slug: &str) -> Ordering {
    let a_parsed = a_date.and_then(parse_content_date);
    let b_parsed = b_date.and_then(parse_content_date);
    b_parsed
        .cmp(&a_parsed)
        .then_with(|| b_date.cmp(&a_date))
        .then_with(|| a_slug.cmp(b_slug))
}

fn now_iso() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::models::DEFAULT_DESCRIPTION;
    use std::fs as stdfs;
    use tempfile::TempDir;

    pub(crate) fn write(dir: &Path, name: &str, body: &str) {
        stdfs::create_dir_all(dir).unwrap();
        stdfs::write(dir.join(name), body).unwrap();
    }

    fn post(title: &str, date: &str) -> String {
        format!("---\ntitle: {title}\ndescription: About {title}\ndate: {date}\n---\n\n# {title}\n")
    }

    #[tokio::test]
    async fn posts_are_sorted_newest_first() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "old.mdx", &post("Old", "2023-01-05"));
        write(dir.path(), "new.mdx", &post("New", "2024-07-01"));
        write(dir.path(), "mid.mdx", &post("Mid", "2023-11-20"));
        write(dir.path(), "notes.txt", "ignored");

        let posts = all_posts(dir.path()).await.unwrap();
        let slugs: Vec<_> = posts.iter().map(|p| p.slug.as_str()).collect();
        assert_eq!(slugs, vec!["new", "mid", "old"]);
    }

    #[tokio::test]
    async fn dates_compare_as_instants_not_strings() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "a.mdx", &post("A", "2024-03-01T23:00:00-05:00"));
        write(dir.path(), "b.mdx", &post("B", "2024-03-02T01:00:00Z"));
        let posts = all_posts(dir.path()).await.unwrap();
        assert_eq!(posts[0].slug, "a");
    }

    #[tokio::test]
    async fn missing_optional_fields_get_defaults() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "bare.mdx", "---\ndate: 2024-01-01\n---\nbody\n");
        write(dir.path(), "nofm.mdx", "just a body\n");

        let posts = all_posts(dir.path()).await.unwrap();
        let bare = posts.iter().find(|p| p.slug == "bare").unwrap();
        assert_eq!(bare.title, "bare");
        assert_eq!(bare.description, DEFAULT_DESCRIPTION);
        assert!(bare.tags.is_empty());

        let nofm = posts.iter().find(|p| p.slug == "nofm").unwrap();
        assert_eq!(nofm.title, "nofm");
        assert!(parse_content_date(&nofm.date).is_some());
    }

    #[tokio::test]
    async fn missing_directory_is_empty() {
        let dir = TempDir::new().unwrap();
        let posts = all_posts(&dir.path().join("nope")).await.unwrap();
        assert!(posts.is_empty());
        let params = static_params(&dir.path().join("nope")).await.unwrap();
        assert!(params.is_empty());
    }

    #[tokio::test]
    async fn find_post_returns_body_and_none_for_unknown() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "hello.mdx", &post("Hello", "2024-01-01"));

        let found = find_post(dir.path(), "hello").await.unwrap().unwrap();
        assert_eq!(found.meta.title, "Hello");
        assert!(found.content.contains("# Hello"));
        assert!(!found.content.contains("title:"));

        assert!(find_post(dir.path(), "missing").await.unwrap().is_none());
        assert!(find_post(dir.path(), "../hello").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn projects_and_featured_filter() {
        let dir = TempDir::new().unwrap();
        write(
            dir.path(),
            "alpha.mdx",
            "---\ntitle: Alpha\ndate: 2024-02-01\nfeatured: true\ntags: [rust]\n---\nAlpha body\n",
        );
        write(dir.path(), "beta.mdx", "---\ntitle: Beta\ndate: 2024-05-01\n---\nBeta body\n");

        let projects = all_projects(dir.path()).await.unwrap();
        assert_eq!(projects[0].slug, "beta");
        assert_eq!(projects[1].tags, vec!["rust"]);
        assert!(projects[1].content.contains("Alpha body"));

        let featured = featured_projects(dir.path()).await.unwrap();
        assert_eq!(featured.len(), 1);
        assert_eq!(featured[0].slug, "alpha");

        assert!(find_project(dir.path(), "gamma").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn static_params_lists_content_slugs() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "one.mdx", "x");
        write(dir.path(), "two.mdx", "y");
        write(dir.path(), "draft.md", "z");
        assert_eq!(static_params(dir.path()).await.unwrap(), vec!["one", "two"]);
    }

    #[test]
    fn neighbours_follow_newest_first_order() {
        let mk = |slug: &str| BlogPostMeta::from_front_matter(slug, Map::new(), "2024-01-01");
        let posts = vec![mk("newest"), mk("middle"), mk("oldest")];

        let (older, newer) = neighbours(&posts, "middle");
        assert_eq!(older.unwrap().slug, "oldest");
        assert_eq!(newer.unwrap().slug, "newest");

        let (older, newer) = neighbours(&posts, "newest");
        assert_eq!(older.unwrap().slug, "middle");
        assert!(newer.is_none());

        assert_eq!(neighbours(&posts, "ghost"), (None, None));
    }

    #[test]
    fn slug_validation() {
        assert!(is_valid_slug("hello-world"));
        assert!(!is_valid_slug(""));
        assert!(!is_valid_slug("../etc/passwd"));
        assert!(!is_valid_slug("a/b"));
        assert!(!is_valid_slug(".hidden"));
    }

    #[tokio::test]
    async fn find_page_strips_front_matter() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "about.md", "---\ntitle: About\n---\nHi there\n");
        let body = find_page(dir.path(), "about").await.unwrap().unwrap();
        assert!(body.contains("Hi there"));
        assert!(!body.contains("title"));
        assert!(find_page(dir.path(), "contact").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn non_utf8_files_are_skipped() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "good.mdx", &post("Good", "2024-01-01"));
        stdfs::write(dir.path().join("bad.mdx"), b"---\ntitle: caf\xe9\n---\n").unwrap();

        let posts = all_posts(dir.path()).await.unwrap();
        let slugs: Vec<_> = posts.iter().map(|p| p.slug.as_str()).collect();
        assert_eq!(slugs, vec!["good"]);
        assert_eq!(all_projects(dir.path()).await.unwrap().len(), 1);
        assert!(find_post(dir.path(), "bad").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn directories_named_like_content_are_ignored() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "good.mdx", &post("Good", "2024-01-01"));
        stdfs::create_dir_all(dir.path().join("drafts.mdx")).unwrap();

        assert_eq!(all_posts(dir.path()).await.unwrap().len(), 1);
        assert_eq!(static_params(dir.path()).await.unwrap(), vec!["good"]);
        assert!(find_post(dir.path(), "drafts").await.unwrap().is_none());
        assert!(find_project(dir.path(), "drafts").await.unwrap().is_none());
    }
}
