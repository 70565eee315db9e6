use pulldown_cmark::{html, CowStr, Event, HeadingLevel, Options, Parser, Tag, TagEnd};

const WORDS_PER_MINUTE: usize = 200;

#[derive(Debug, Clone, PartialEq)]
pub struct TocEntry {
    pub level: u8,
    pub id: String,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RenderedMarkdown {
    pub html: String,
    pub toc: Vec<TocEntry>,
    pub reading_minutes: u32,
}

fn markdown_options() -> Options {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_TASKLISTS);
    options.insert(Options::ENABLE_FOOTNOTES);
    options.insert(Options::ENABLE_MATH);
    options
}

pub fn render_markdown_to_html(markdown: &str) -> String {
    render_document(markdown).html
}

/// Renders an MDX body: ESM lines are dropped, headings get anchors and
/// external links open in a new tab.
pub fn render_document(source: &str) -> RenderedMarkdown {
    let without_esm = strip_mdx_esm(source);
    let normalized_markdown = normalize_latex_delimiters(&without_esm);
    let mut events: Vec<Event> = Parser::new_ext(&normalized_markdown, markdown_options())
        .map(|event| match event {
            Event::InlineMath(math) => Event::Html(CowStr::Boxed(render_math_html(&math, false).into_boxed_str())),
            Event::DisplayMath(math) => Event::Html(CowStr::Boxed(render_math_html(&math, true).into_boxed_str())),
            Event::Start(Tag::Link { dest_url, title, .. }) if is_external(&dest_url) => {
                Event::Html(CowStr::Boxed(external_link_open(&dest_url, &title).into_boxed_str()))
            }
            other => other,
        })
        .collect();

    let toc = anchor_headings(&mut events);

    let mut html_out = String::new();
    html::push_html(&mut html_out, events.into_iter());

    RenderedMarkdown {
        html: html_out,
        toc,
        reading_minutes: reading_minutes(&without_esm),
    }
}

/// Lowercased text with whitespace runs collapsed to `-`.
pub fn heading_id(text: &str) -> String {
    text.to_lowercase().split_whitespace().collect::<Vec<_>>().join("-")
}

pub fn reading_minutes(markdown: &str) -> u32 {
    let words = markdown.split_whitespace().count();
    let minutes = words.div_ceil(WORDS_PER_MINUTE).max(1);
    u32::try_from(minutes).unwrap_or(u32::MAX)
}

// Gives every heading an id and returns the h2-h4 entries.
fn anchor_headings(events: &mut [Event<'_>]) -> Vec<TocEntry> {
    let mut toc = Vec::new();
    for i in 0..events.len() {
        let (level, existing_id) = match &events[i] {
            Event::Start(Tag::Heading { level, id, .. }) => (*level, id.as_ref().map(|s| s.to_string())),
            _ => continue,
        };

        let mut text = String::new();
        for event in &events[i + 1..] {
            match event {
                Event::End(TagEnd::Heading(_)) => break,
                Event::Text(t) | Event::Code(t) => text.push_str(t),
                _ => {}
            }
        }

        let anchor = existing_id.unwrap_or_else(|| heading_id(&text));
        if let Event::Start(Tag::Heading { id, .. }) = &mut events[i] {
            *id = Some(CowStr::from(anchor.clone()));
        }

        if matches!(level, HeadingLevel::H2 | HeadingLevel::H3 | HeadingLevel::H4) && !anchor.is_empty() {
            toc.push(TocEntry {
                level: level as u8,
                id: anchor,
                text: text.trim().to_string(),
            });
        }
    }
    toc
}

fn is_external(url: &str) -> bool {
    url.starts_with("http://") || url.starts_with("https://")
}

fn external_link_open(url: &str, title: &str) -> String {
    let mut tag = format!(
        "<a href=\"{}\" target=\"_blank\" rel=\"noopener noreferrer\"",
        htmlescape::encode_minimal(url)
    );
    if !title.is_empty() {
        tag.push_str(&format!(" title=\"{}\"", htmlescape::encode_minimal(title)));
    }
    tag.push('>');
    tag
}

// MDX `import`/`export` statements have no meaning outside a JS bundler.
// A statement runs on until its brackets balance.
fn strip_mdx_esm(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut fence: Option<&str> = None;
    let mut open_brackets = 0i32;

    for line in input.lines() {
        if open_brackets > 0 {
            open_brackets += bracket_balance(line);
            continue;
        }
        let trimmed = line.trim_start();
        match fence {
            Some(marker) if trimmed.starts_with(marker) => fence = None,
            Some(_) => {}
            None if trimmed.starts_with("```") => fence = Some("```"),
            None if trimmed.starts_with("~~~") => fence = Some("~~~"),
            None if line.starts_with("import ") || line.starts_with("export ") => {
                open_brackets = bracket_balance(line).max(0);
                continue;
            }
            None => {}
        }
        out.push_str(line);
        out.push('\n');
    }
    out
}

fn bracket_balance(line: &str) -> i32 {
    line.chars()
        .map(|c| match c {
            '{' | '(' | '[' => 1,
            '}' | ')' | ']' => -1,
            _ => 0,
        })
        .sum()
}

fn normalize_latex_delimiters(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut i = 0;

    while i < input.len() {
        if let Some((open, close, display_mode)) = delimiter_at(input, i) {
            let content_start = i + open.len();
            if let Some(close_at) = input[content_start..].find(close) {
                let content_end = content_start + close_at;
                let content = &input[content_start..content_end];
                if display_mode || content.contains('\n') {
                    out.push_str("$$");
                    out.push_str(content);
                    out.push_str("$$");
                } else {
                    out.push('$');
                    out.push_str(content);
                    out.push('$');
                }
                i = content_end + close.len();
                continue;
            }
        }

        if let Some(ch) = input[i..].chars().next() {
            out.push(ch);
            i += ch.len_utf8();
        } else {
            break;
        }
    }

    out
}

fn delimiter_at(input: &str, index: usize) -> Option<(&'static str, &'static str, bool)> {
    let tail = &input[index..];
    if tail.starts_with("\\(") {
        Some(("\\(", "\\)", false))
    } else if tail.starts_with("\\[") {
        Some(("\\[", "\\]", true))
    } else {
        None
    }
}

fn render_math_html(source: &str, display_mode: bool) -> String {
    let mut opts = katex::Opts::builder();
    opts.display_mode(display_mode);

    let rendered = match opts.build() {
        Ok(opts) => katex::render_with_opts(source, opts),
        Err(_) => return fallback_math_html(source, display_mode),
    };

    match rendered {
        Ok(html) => html,
        Err(_) => fallback_math_html(source, display_mode),
    }
}

fn fallback_math_html(source: &str, display_mode: bool) -> String {
    let class_name = if display_mode { "math math-display" } else { "math math-inline" };
    format!("<span class=\"{class_name}\">{}</span>", htmlescape::encode_minimal(source))
}

#[cfg(test)]
mod tests {
    use super::*;
    use scraper::{Html, Selector};

    #[test]
    fn renders_math_with_latex_paren_and_bracket_delimiters() {
        let input = "\\(x^2\\) and \\[y^2\\]";
        let output = render_markdown_to_html(input);
        assert!(output.contains("katex"));
    }

    #[test]
    fn renders_multiline_paren_delimited_math() {
        let input = "Start \\( \\frac{2.24T}{2.08T}\n\\approx 1.077 \\) end";
        let output = render_markdown_to_html(input);
        assert!(output.contains("katex"));
    }

    #[test]
    fn headings_get_ids_and_feed_the_toc() {
        let doc = render_document("# Title\n\n## Getting  Started\n\ntext\n\n### The `cargo` Tool\n\n##### Too Deep\n");
        let html = Html::parse_fragment(&doc.html);
        let h2 = Selector::parse("h2#getting-started").unwrap();
        assert_eq!(html.select(&h2).count(), 1);
        let h1 = Selector::parse("h1#title").unwrap();
        assert_eq!(html.select(&h1).count(), 1);

        let ids: Vec<_> = doc.toc.iter().map(|e| (e.level, e.id.as_str())).collect();
        assert_eq!(ids, vec![(2, "getting-started"), (3, "the-cargo-tool")]);
        assert_eq!(doc.toc[1].text, "The cargo Tool");
    }

    #[test]
    fn external_links_open_in_new_tab() {
        let doc = render_document("[site](https://example.com) and [home](/about)");
        let html = Html::parse_fragment(&doc.html);
        let external = Selector::parse("a[target=_blank][rel='noopener noreferrer']").unwrap();
        let links: Vec<_> = html.select(&external).collect();
        assert_eq!(links.len(), 1);
        assert_eq!(links[0].value().attr("href"), Some("https://example.com"));
        assert!(doc.html.contains("<a href=\"/about\">home</a>"));
    }

    #[test]
    fn mdx_imports_are_stripped_outside_code() {
        let source = "import Chart from './chart'\n\nHello\n\n```js\nimport x from 'y'\n```\n";
        let html = render_markdown_to_html(source);
        assert!(!html.contains("Chart from"));
        assert!(html.contains("import x from"));
    }

    #[test]
    fn multi_line_exports_are_stripped_whole() {
        let source = "export const meta = {\n  title: 'Hidden',\n  tags: ['a', 'b'],\n}\n\nimport {\n  Chart,\n} from './chart'\n\nVisible text\n";
        let html = render_markdown_to_html(source);
        assert!(!html.contains("Hidden"));
        assert!(!html.contains("Chart"));
        assert!(!html.contains('}'));
        assert!(html.contains("<p>Visible text</p>"));
    }

    #[test]
    fn gfm_tables_and_tasklists() {
        let html = render_markdown_to_html("| a | b |\n|---|---|\n| 1 | 2 |\n\n- [x] done\n");
        assert!(html.contains("<table>"));
        assert!(html.contains("type=\"checkbox\""));
    }

    #[test]
    fn reading_time_rounds_up_with_floor_of_one() {
        assert_eq!(reading_minutes(""), 1);
        assert_eq!(reading_minutes(&"word ".repeat(200)), 1);
        assert_eq!(reading_minutes(&"word ".repeat(201)), 2);
    }
}
