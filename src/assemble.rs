//! Builds the single HTML document handed to the renderer.

use std::collections::BTreeSet;
use std::fmt::Write as _;
use std::sync::OnceLock;

use regex::{Captures, Regex};
use scraper::{Html, Selector};
use tracing::{debug, warn};

use crate::epub::paths;
use crate::extract::{Book, Chapter, ImageStore};

const BASE_CSS: &str = include_str!("../assets/base.css");

const CHAPTER_BREAK: &str = r#"<div class="chapter-break" style="page-break-after: always;"></div>"#;

const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param", "source",
    "track", "wbr",
];

#[derive(Debug, Clone)]
pub struct AssembledDocument {
    pub html: String,
    pub chapter_count: usize,
    pub image_count: usize,
    /// Image references that matched no image in the book.
    pub unresolved_images: Vec<String>,
}

pub fn assemble(book: &Book) -> AssembledDocument {
    let mut unresolved = BTreeSet::new();
    let mut html = String::new();

    html.push_str("<!DOCTYPE html>\n");
    match &book.language {
        Some(lang) => {
            let _ = writeln!(html, "<html lang=\"{}\">", escape_attr(lang));
        }
        None => html.push_str("<html>\n"),
    }
    html.push_str("<head>\n<meta charset=\"utf-8\">\n");
    let _ = writeln!(html, "<title>{}</title>", escape_text(&book.title));
    html.push_str("<style>\n");
    html.push_str(BASE_CSS);
    for css in &book.stylesheets {
        html.push('\n');
        html.push_str(css);
    }
    html.push_str("\n</style>\n</head>\n<body>\n");

    for (i, chapter) in book.chapters.iter().enumerate() {
        if i > 0 {
            html.push_str(CHAPTER_BREAK);
            html.push('\n');
        }
        let body = chapter_body(chapter, &book.images, &mut unresolved);
        html.push_str(&body);
        html.push('\n');
    }

    html.push_str("</body>\n</html>\n");

    if !unresolved.is_empty() {
        debug!("Unresolved image references: {:?}", unresolved);
    }

    AssembledDocument {
        html,
        chapter_count: book.chapters.len(),
        image_count: book.images.len(),
        unresolved_images: unresolved.into_iter().collect(),
    }
}

/// The chapter's `<body>` children with image references replaced by the
/// embedded data. A fragment with no `<body>` is used verbatim.
fn chapter_body(chapter: &Chapter, images: &ImageStore, unresolved: &mut BTreeSet<String>) -> String {
    let body = if has_body_tag(&chapter.html) {
        let document = Html::parse_document(&expand_self_closing(&chapter.html));
        let selector = Selector::parse("body").expect("static selector");
        let body = document
            .select(&selector)
            .next()
            .map(|b| b.inner_html())
            .unwrap_or_default();
        if body.trim().is_empty() {
            warn!("Chapter {} ({}) has an empty body", chapter.id, chapter.path);
        }
        body
    } else {
        chapter.html.clone()
    };

    embed_images(&body, &chapter.path, images, unresolved)
}

/// Rewrites XHTML `<tag/>` on non-void elements as `<tag></tag>`.
///
/// The HTML parser ignores the self-closing flag on those, so `<title/>` or
/// `<script src="x.js"/>` would swallow the rest of the document as text.
fn expand_self_closing(html: &str) -> String {
    static SELF_CLOSING_RE: OnceLock<Regex> = OnceLock::new();
    let re = SELF_CLOSING_RE.get_or_init(|| {
        Regex::new(r"<([A-Za-z][A-Za-z0-9:._-]*)((?:\s[^<>]*?)?)\s*/>").unwrap()
    });

    re.replace_all(html, |caps: &Captures| {
        let name = &caps[1];
        if VOID_ELEMENTS.contains(&name.to_ascii_lowercase().as_str()) {
            caps[0].to_string()
        } else {
            format!("<{}{}></{}>", name, &caps[2], name)
        }
    })
    .into_owned()
}

/// Replaces `<img src>` and SVG `<image href|xlink:href>` values that point
/// into the book with the embedded `data:` URI. Other attributes and other
/// elements are left alone.
fn embed_images(body: &str, base: &str, images: &ImageStore, unresolved: &mut BTreeSet<String>) -> String {
    static TAG_RE: OnceLock<Regex> = OnceLock::new();
    let tag_re = TAG_RE.get_or_init(|| Regex::new(r"(?i)<(img|image)\b[^>]*>").unwrap());

    tag_re
        .replace_all(body, |caps: &Captures| {
            let is_img = caps[1].eq_ignore_ascii_case("img");
            rewrite_tag(&caps[0], is_img, base, images, unresolved)
        })
        .into_owned()
}

fn rewrite_tag(
    tag: &str,
    is_img: bool,
    base: &str,
    images: &ImageStore,
    unresolved: &mut BTreeSet<String>,
) -> String {
    static ATTR_RE: OnceLock<Regex> = OnceLock::new();
    let attr_re = ATTR_RE.get_or_init(|| {
        Regex::new(r#"(\s)([A-Za-z_:][-A-Za-z0-9_:.]*)(?:\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s"'=<>`]+)))?"#)
            .unwrap()
    });

    attr_re
        .replace_all(tag, |caps: &Captures| {
            let name = &caps[2];
            let lower = name.to_ascii_lowercase();
            let applies = if is_img {
                lower == "src"
            } else {
                lower == "href" || lower == "xlink:href"
            };
            let Some(raw) = caps.get(3).or_else(|| caps.get(4)).or_else(|| caps.get(5)) else {
                return caps[0].to_string();
            };
            if !applies {
                return caps[0].to_string();
            }

            let raw = raw.as_str();
            let href = unescape_attr(raw);
            let href = href.trim();

            if href.is_empty() || paths::is_external(href) {
                return caps[0].to_string();
            }

            let resolved = paths::resolve(base, href);
            match images.lookup(resolved.as_deref(), href) {
                Some(image) => format!("{}{}=\"{}\"", &caps[1], name, image.data_uri),
                None => {
                    unresolved.insert(href.to_string());
                    caps[0].to_string()
                }
            }
        })
        .into_owned()
}

fn has_body_tag(html: &str) -> bool {
    html.to_ascii_lowercase().contains("<body")
}

fn escape_attr(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('\u{a0}', "&nbsp;")
        .replace('"', "&quot;")
}

fn unescape_attr(value: &str) -> String {
    value
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&apos;", "'")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&nbsp;", "\u{a0}")
        .replace("&amp;", "&")
}

fn escape_text(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}
