//! Result rendering: placeholder rewriting, markdown rendering, thumbnails.
//!
//! The server stores extracted images per session and per source file, and
//! references them from the markdown with `![[filename]]` wikilinks. Before
//! the markdown can be shown those links are rewritten to `<img>` tags that
//! point at `/view_image/{session}/{pdf_base}/{filename}`, and then the
//! markdown itself is rendered to HTML.
//!
//! Rendering markdown is a pluggable capability ([`MarkdownRenderer`]). When
//! none is registered the preview falls back to the rewritten text verbatim.

use crate::error::RenderIssue;
use crate::protocol::Preview;
use once_cell::sync::Lazy;
use pulldown_cmark::{html, Options, Parser};
use regex::Regex;

/// Inline style of images embedded in the markdown body.
const EMBED_STYLE: &str =
    "max-width: 90%; height: auto; display: block; margin: 10px 0; border: 1px solid #ccc;";

/// Inline style of standalone thumbnails.
const THUMB_STYLE: &str =
    "max-width: 150px; height: auto; margin: 5px; border: 1px solid #ddd; display: inline-block;";

/// Border applied to a thumbnail that failed to load.
const THUMB_FAILED_BORDER: &str = "1px solid red";

// ── Markdown capability ──────────────────────────────────────────────────────

/// Pure `markdown → HTML` function.
pub trait MarkdownRenderer: Send + Sync {
    fn render(&self, markdown: &str) -> String;
}

/// CommonMark + GFM extensions via pulldown-cmark.
///
/// Raw inline HTML is passed through, which the rewritten `<img>` tags rely on.
#[derive(Debug, Clone, Copy, Default)]
pub struct CommonMarkRenderer;

impl MarkdownRenderer for CommonMarkRenderer {
    fn render(&self, markdown: &str) -> String {
        let mut options = Options::empty();
        options.insert(Options::ENABLE_TABLES);
        options.insert(Options::ENABLE_STRIKETHROUGH);
        options.insert(Options::ENABLE_TASKLISTS);
        options.insert(Options::ENABLE_FOOTNOTES);
        let parser = Parser::new_ext(markdown, options);
        let mut output = String::with_capacity(markdown.len() * 3 / 2);
        html::push_html(&mut output, parser);
        output
    }
}

// ── URLs and escaping ────────────────────────────────────────────────────────

/// URL of an extracted image.
pub fn view_image_url(session_id: &str, pdf_base: &str, filename: &str) -> String {
    format!("/view_image/{session_id}/{pdf_base}/{filename}")
}

/// Escape text for use inside an HTML attribute or element body.
pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

// ── Placeholder rewriting ────────────────────────────────────────────────────

// `![[name]]`, also tolerated without the bang. Lazy `.*?` never crosses a
// newline, so a stray `[[` cannot swallow the rest of the page.
static RE_PLACEHOLDER: Lazy<Regex> = Lazy::new(|| Regex::new(r"!?\[\[(.*?)\]\]").unwrap());

/// Rewrite every image placeholder into an `<img>` tag scoped to
/// `session_id` and `pdf_base`. The file name is trimmed before use.
pub fn rewrite_placeholders(markdown: &str, session_id: &str, pdf_base: &str) -> String {
    RE_PLACEHOLDER
        .replace_all(markdown, |caps: &regex::Captures<'_>| {
            let filename = caps[1].trim();
            let url = view_image_url(session_id, pdf_base, filename);
            format!(
                r#"<img src="{}" alt="{}" style="{EMBED_STYLE}">"#,
                escape_html(&url),
                escape_html(filename),
            )
        })
        .into_owned()
}

/// True if any placeholder token remains in `text`.
pub fn has_placeholders(text: &str) -> bool {
    RE_PLACEHOLDER.is_match(text)
}

// ── Rendered preview ─────────────────────────────────────────────────────────

/// Displayable body of a preview.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PreviewBody {
    /// Markdown rendered to HTML.
    Html(String),
    /// Rewritten markdown shown verbatim (no renderer available).
    Raw(String),
}

impl PreviewBody {
    /// The body as an HTML fragment.
    pub fn to_html(&self) -> String {
        match self {
            PreviewBody::Html(h) => format!(r#"<div class="markdown-preview"><div>{h}</div></div>"#),
            PreviewBody::Raw(t) => format!(
                r#"<div class="markdown-preview"><pre>{}</pre></div>"#,
                escape_html(t)
            ),
        }
    }

    pub fn text(&self) -> &str {
        match self {
            PreviewBody::Html(s) | PreviewBody::Raw(s) => s,
        }
    }
}

/// A standalone image thumbnail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Thumbnail {
    pub filename: String,
    pub url: String,
    pub alt: String,
    pub load_failed: bool,
}

impl Thumbnail {
    fn new(session_id: &str, pdf_base: &str, filename: &str) -> Self {
        Self {
            filename: filename.to_string(),
            url: view_image_url(session_id, pdf_base, filename),
            alt: filename.to_string(),
            load_failed: false,
        }
    }

    /// Flag this thumbnail as broken. Affects only this thumbnail.
    pub fn mark_load_failed(&mut self, reason: impl Into<String>) -> RenderIssue {
        self.load_failed = true;
        self.alt = format!("Could not load: {}", self.filename);
        RenderIssue::ImageLoadFailed {
            filename: self.filename.clone(),
            reason: reason.into(),
        }
    }

    pub fn to_html(&self) -> String {
        let style = if self.load_failed {
            THUMB_STYLE.replace("1px solid #ddd", THUMB_FAILED_BORDER)
        } else {
            THUMB_STYLE.to_string()
        };
        format!(
            r#"<img src="{}" alt="{}" style="{}">"#,
            escape_html(&self.url),
            escape_html(&self.alt),
            style
        )
    }
}

/// One collapsible preview panel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreviewPanel {
    pub zip_filename: String,
    pub body: PreviewBody,
    pub thumbnails: Vec<Thumbnail>,
    pub collapsed: bool,
    pub issues: Vec<RenderIssue>,
}

impl PreviewPanel {
    /// Flip between collapsed and expanded. Nothing is re-fetched.
    pub fn toggle(&mut self) {
        self.collapsed = !self.collapsed;
    }

    pub fn to_html(&self) -> String {
        let class = if self.collapsed {
            "preview-item collapsed"
        } else {
            "preview-item"
        };
        let mut out = format!(
            r#"<div class="{class}"><div class="preview-toggle">{}</div><div class="preview-content-inner">"#,
            escape_html(&self.zip_filename)
        );
        out.push_str(&self.body.to_html());
        if !self.thumbnails.is_empty() {
            out.push_str(r#"<div class="image-preview">"#);
            for t in &self.thumbnails {
                out.push_str(&t.to_html());
            }
            out.push_str("</div>");
        }
        out.push_str("</div></div>");
        out
    }
}

/// Build the preview panel for one result.
///
/// `renderer == None` produces a [`PreviewBody::Raw`] body and records
/// [`RenderIssue::RendererMissing`]; the caller decides how to report it.
pub fn render_preview(
    zip_filename: &str,
    preview: &Preview,
    session_id: &str,
    renderer: Option<&dyn MarkdownRenderer>,
) -> PreviewPanel {
    let rewritten = rewrite_placeholders(&preview.markdown, session_id, &preview.pdf_base);
    let mut issues = Vec::new();
    let body = match renderer {
        Some(r) => PreviewBody::Html(r.render(&rewritten)),
        None => {
            issues.push(RenderIssue::RendererMissing);
            PreviewBody::Raw(rewritten)
        }
    };
    let thumbnails = preview
        .images
        .iter()
        .map(|name| Thumbnail::new(session_id, &preview.pdf_base, name))
        .collect();

    PreviewPanel {
        zip_filename: zip_filename.to_string(),
        body,
        thumbnails,
        collapsed: true,
        issues,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn preview(md: &str, images: &[&str]) -> Preview {
        Preview {
            markdown: md.to_string(),
            pdf_base: "doc".into(),
            images: images.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[test]
    fn rewrites_wikilink_with_trimmed_name() {
        let out = rewrite_placeholders("before ![[  img.png ]] after", "s1", "doc");
        assert!(out.contains(r#"src="/view_image/s1/doc/img.png""#), "got: {out}");
        assert!(out.contains(r#"alt="img.png""#));
        assert!(!has_placeholders(&out));
    }

    #[test]
    fn rewrites_bare_double_brackets() {
        let out = rewrite_placeholders("[[a.jpg]] and ![[b.jpg]]", "s", "p");
        assert!(out.contains("/view_image/s/p/a.jpg"));
        assert!(out.contains("/view_image/s/p/b.jpg"));
        assert!(!has_placeholders(&out));
    }

    #[test]
    fn placeholder_does_not_span_lines() {
        let md = "![[broken\nline]] ok";
        assert_eq!(rewrite_placeholders(md, "s", "p"), md);
    }

    #[test]
    fn alt_text_is_attribute_safe() {
        let out = rewrite_placeholders(r#"![[a"b.png]]"#, "s", "p");
        assert!(out.contains(r#"alt="a&quot;b.png""#), "got: {out}");
    }

    #[test]
    fn text_without_placeholders_is_unchanged() {
        let md = "# Title\n\n![alt](http://x/y.png)\n";
        assert_eq!(rewrite_placeholders(md, "s", "p"), md);
    }

    #[test]
    fn commonmark_passes_inline_img_through() {
        let md = rewrite_placeholders("# T\n\n![[img.png]]\n", "s1", "doc");
        let html = CommonMarkRenderer.render(&md);
        assert!(html.contains("<h1>T</h1>"));
        assert!(html.contains("/view_image/s1/doc/img.png"));
    }

    #[test]
    fn commonmark_renders_tables() {
        let html = CommonMarkRenderer.render("| a | b |\n|---|---|\n| 1 | 2 |\n");
        assert!(html.contains("<table>"));
    }

    #[test]
    fn preview_without_renderer_falls_back_to_raw() {
        let panel = render_preview("a.zip", &preview("![[x.png]]", &[]), "s1", None);
        assert!(matches!(panel.body, PreviewBody::Raw(_)));
        assert_eq!(panel.issues, vec![RenderIssue::RendererMissing]);
        assert!(panel.body.text().contains("/view_image/s1/doc/x.png"));
        assert!(panel.body.to_html().contains("<pre>"));
    }

    #[test]
    fn preview_starts_collapsed_and_double_toggle_is_identity() {
        let mut panel = render_preview(
            "a.zip",
            &preview("text", &[]),
            "s1",
            Some(&CommonMarkRenderer),
        );
        assert!(panel.collapsed);
        let before = panel.clone();
        panel.toggle();
        assert!(!panel.collapsed);
        panel.toggle();
        assert_eq!(panel, before);
    }

    #[test]
    fn thumbnails_use_view_image_scheme() {
        let panel = render_preview(
            "a.zip",
            &preview("", &["p1.png", "p2.png"]),
            "s9",
            Some(&CommonMarkRenderer),
        );
        let urls: Vec<_> = panel.thumbnails.iter().map(|t| t.url.as_str()).collect();
        assert_eq!(urls, ["/view_image/s9/doc/p1.png", "/view_image/s9/doc/p2.png"]);
    }

    #[test]
    fn failed_thumbnail_is_flagged_alone() {
        let mut panel = render_preview(
            "a.zip",
            &preview("", &["p1.png", "p2.png"]),
            "s",
            Some(&CommonMarkRenderer),
        );
        let issue = panel.thumbnails[0].mark_load_failed("HTTP 404");
        assert!(matches!(issue, RenderIssue::ImageLoadFailed { .. }));
        assert_eq!(panel.thumbnails[0].alt, "Could not load: p1.png");
        assert!(panel.thumbnails[0].to_html().contains("1px solid red"));
        assert!(!panel.thumbnails[1].load_failed);
    }

    #[test]
    fn panel_html_carries_collapsed_class() {
        let mut panel = render_preview("a.zip", &preview("x", &[]), "s", Some(&CommonMarkRenderer));
        assert!(panel.to_html().contains(r#"class="preview-item collapsed""#));
        panel.toggle();
        assert!(panel.to_html().contains(r#"class="preview-item""#));
    }
}
