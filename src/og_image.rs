//! Generated OpenGraph cards.
//!
//! A card is laid out as SVG and rasterised to PNG with the bundled DejaVu
//! fonts, at the 1200x630 size advertised in the page metadata.

use std::sync::{Arc, LazyLock};

use htmlescape::encode_minimal;
use resvg::{usvg, usvg::fontdb};

use crate::error::{Error, Result};
use crate::seo::{OG_IMAGE_HEIGHT, OG_IMAGE_WIDTH};

pub const CONTENT_TYPE: &str = "image/png";

const FONT_REGULAR: &[u8] = include_bytes!("../assets/fonts/DejaVuSans.ttf");
const FONT_BOLD: &[u8] = include_bytes!("../assets/fonts/DejaVuSans-Bold.ttf");

static FONTS: LazyLock<Arc<fontdb::Database>> = LazyLock::new(|| {
    let mut db = fontdb::Database::new();
    db.load_font_data(FONT_REGULAR.to_vec());
    db.load_font_data(FONT_BOLD.to_vec());
    db.set_sans_serif_family("DejaVu Sans");
    Arc::new(db)
});

const MAX_LINE_CHARS: usize = 30;
const MAX_LINES: usize = 3;
const TITLE_FONT_SIZE: u32 = 56;
const LINE_HEIGHT: u32 = 68;

pub fn render_card(title: &str, byline: &str) -> String {
    let lines = wrap_title(title);
    let block_height = LINE_HEIGHT * u32::try_from(lines.len()).unwrap_or(1);
    let first_baseline = (OG_IMAGE_HEIGHT - block_height) / 2 + TITLE_FONT_SIZE - 24;
    let center_x = OG_IMAGE_WIDTH / 2;

    let mut text = String::new();
    for (i, line) in lines.iter().enumerate() {
        let y = first_baseline + LINE_HEIGHT * u32::try_from(i).unwrap_or(0);
        text.push_str(&format!(
            "  <text x=\"{center_x}\" y=\"{y}\" text-anchor=\"middle\" font-size=\"{TITLE_FONT_SIZE}\" font-weight=\"700\" letter-spacing=\"-2\">{}</text>\n",
            encode_minimal(line)
        ));
    }
    let byline_y = first_baseline + block_height + 24;

    format!(
        r##"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}">
  <defs>
    <linearGradient id="bg" x1="0" y1="0" x2="1" y2="1">
      <stop offset="0%" stop-color="#18181b"/>
      <stop offset="100%" stop-color="#2563eb"/>
    </linearGradient>
  </defs>
  <rect width="100%" height="100%" fill="url(#bg)"/>
  <g fill="#ffffff" font-family="Inter, Helvetica, Arial, sans-serif">
{text}  <text x="{center_x}" y="{byline_y}" text-anchor="middle" font-size="28">{byline}</text>
  </g>
</svg>
"##,
        w = OG_IMAGE_WIDTH,
        h = OG_IMAGE_HEIGHT,
        byline = encode_minimal(byline),
    )
}

/// [`render_card`] rasterised to PNG bytes.
pub fn render_png(title: &str, byline: &str) -> Result<Vec<u8>> {
    let svg = render_card(title, byline);
    let options = usvg::Options {
        fontdb: FONTS.clone(),
        ..usvg::Options::default()
    };
    let tree = usvg::Tree::from_str(&svg, &options).map_err(|e| Error::Image(e.to_string()))?;
    let mut pixmap = tiny_skia::Pixmap::new(OG_IMAGE_WIDTH, OG_IMAGE_HEIGHT)
        .ok_or_else(|| Error::Image("zero-sized card".to_string()))?;
    resvg::render(&tree, tiny_skia::Transform::default(), &mut pixmap.as_mut());
    pixmap.encode_png().map_err(|e| Error::Image(e.to_string()))
}

// Greedy word wrap; the last line gets an ellipsis when the title is cut.
fn wrap_title(title: &str) -> Vec<String> {
    let mut lines: Vec<String> = Vec::new();
    let mut current = String::new();
    let mut truncated = false;

    for word in title.split_whitespace() {
        let candidate_len = current.chars().count() + word.chars().count() + usize::from(!current.is_empty());
        if !current.is_empty() && candidate_len > MAX_LINE_CHARS {
            lines.push(std::mem::take(&mut current));
            if lines.len() == MAX_LINES {
                truncated = true;
                break;
            }
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(word);
    }
    if !truncated && !current.is_empty() {
        lines.push(current);
    }
    if truncated {
        if let Some(last) = lines.last_mut() {
            last.push('…');
        }
    }
    if lines.is_empty() {
        lines.push(String::new());
    }
    lines
}
