//! Structural injections: scroll fix, preview watermark, metadata comment
//!
//! All three take the timestamp as a parameter so output is reproducible.

use chrono::{DateTime, Local};
use regex::Regex;
use std::sync::LazyLock;

use crate::utils::string_utils::safe_truncate_chars;
use crate::utils::{display_domain, SOURCE_DOMAIN_MAX_LEN};

static HEAD_CLOSE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)</head>").expect("HEAD_CLOSE: hardcoded regex is valid"));

static BODY_OPEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)<body[^>]*>").expect("BODY_OPEN: hardcoded regex is valid"));

static DOCTYPE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)<!DOCTYPE[^>]*>").expect("DOCTYPE: hardcoded regex is valid"));

/// Overrides `overflow: hidden` left behind by modals and consent banners
pub const SCROLL_FIX_STYLE: &str = r#"<style id="standalone-scroll-fix">html, body { overflow: auto !important; overflow-x: hidden !important; height: auto !important; max-height: none !important; position: static !important; }</style>"#;

const WATERMARK_STYLE: &str = r#"
<style>
.preview-watermark {
    position: fixed;
    top: 0;
    left: 0;
    right: 0;
    background: linear-gradient(135deg, #667eea 0%, #764ba2 100%);
    color: white;
    padding: 12px 20px;
    font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif;
    font-size: 14px;
    z-index: 999999;
    display: flex;
    justify-content: space-between;
    align-items: center;
    box-shadow: 0 2px 10px rgba(0,0,0,0.2);
}
.preview-watermark strong { font-size: 16px; }
.preview-watermark .preview-meta { font-size: 12px; opacity: 0.9; }
.preview-watermark-corner {
    position: fixed;
    bottom: 20px;
    right: 20px;
    background: rgba(102, 126, 234, 0.9);
    color: white;
    padding: 8px 16px;
    border-radius: 20px;
    font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif;
    font-size: 12px;
    z-index: 999999;
    box-shadow: 0 2px 10px rgba(0,0,0,0.2);
}
body { padding-top: 50px !important; }
html, body { overflow: auto !important; overflow-x: hidden !important; height: auto !important; max-height: none !important; position: static !important; }
</style>
"#;

/// Inner width of the metadata comment box
const BOX_WIDTH: usize = 75;

fn insert_at(html: &str, at: usize, fragment: &str) -> String {
    let mut out = String::with_capacity(html.len() + fragment.len());
    out.push_str(&html[..at]);
    out.push_str(fragment);
    out.push_str(&html[at..]);
    out
}

/// Insert `fragment` right after the opening `<body>` tag, or prepend it
fn insert_after_body_open(html: &str, fragment: &str) -> String {
    match BODY_OPEN.find(html) {
        Some(body) => insert_at(html, body.end(), fragment),
        None => format!("{fragment}{html}"),
    }
}

/// Add the scroll-fix style before `</head>`, else after `<body>`, else in front
#[must_use]
pub fn inject_scroll_fix(html: &str) -> String {
    match HEAD_CLOSE.find(html) {
        Some(head) => insert_at(html, head.start(), SCROLL_FIX_STYLE),
        None => insert_after_body_open(html, SCROLL_FIX_STYLE),
    }
}

/// Preview banner and corner badge
#[must_use]
pub fn watermark_html(project_name: &str, now: DateTime<Local>) -> String {
    let timestamp = now.format("%d.%m.%Y %H:%M");
    let project_name = html_escape::encode_text(project_name);
    format!(
        "{WATERMARK_STYLE}<div class=\"preview-watermark\">\n    <div><strong>🔍 PREVIEW</strong> - For review only, not final</div>\n    <div class=\"preview-meta\">Created: {timestamp} | {project_name}</div>\n</div>\n<div class=\"preview-watermark-corner\">⚠️ Preview</div>\n"
    )
}

#[must_use]
pub fn inject_watermark(html: &str, project_name: &str, now: DateTime<Local>) -> String {
    insert_after_body_open(html, &watermark_html(project_name, now))
}

/// One boxed row, cut to the box width so the right border stays aligned
fn box_line(text: &str) -> String {
    let width = BOX_WIDTH - 3;
    let text = safe_truncate_chars(text, width);
    format!("║  {text:<width$} ║\n")
}

/// Boxed HTML comment naming the project, the creation time and the source host
#[must_use]
pub fn metadata_comment(project_name: &str, base_url: &str, now: DateTime<Local>) -> String {
    // "--" would end the comment early
    let project_name = project_name.replace("--", "- -");
    let domain = display_domain(base_url, SOURCE_DOMAIN_MAX_LEN).replace("--", "- -");
    let created = now.format("%Y-%m-%d %H:%M:%S").to_string();
    let rule = "═".repeat(BOX_WIDTH);

    let mut comment = String::from("<!--\n");
    comment.push_str(&format!("╔{rule}╗\n"));
    comment.push_str(&box_line("STANDALONE HTML PREVIEW"));
    comment.push_str(&format!("╠{rule}╣\n"));
    comment.push_str(&box_line(&format!("Project:  {project_name}")));
    comment.push_str(&box_line(&format!("Created:  {created}")));
    comment.push_str(&box_line(&format!("Source:   {domain}")));
    comment.push_str(&format!("╠{rule}╣\n"));
    comment.push_str(&box_line("This file works offline and carries its resources with it."));
    comment.push_str(&box_line("It is meant for preview only, not for production."));
    comment.push_str(&format!("╚{rule}╝\n"));
    comment.push_str("-->\n");
    comment
}

/// Add the metadata comment after the doctype, or in front of the document
#[must_use]
pub fn inject_metadata_comment(
    html: &str,
    project_name: &str,
    base_url: &str,
    now: DateTime<Local>,
) -> String {
    let comment = metadata_comment(project_name, base_url, now);
    match DOCTYPE.find(html) {
        Some(doctype) => insert_at(html, doctype.end(), &format!("\n{comment}")),
        None => format!("{comment}{html}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn fixed_time() -> DateTime<Local> {
        Local.with_ymd_and_hms(2025, 3, 4, 5, 6, 7).unwrap()
    }

    #[test]
    fn scroll_fix_goes_before_head_close() {
        let out = inject_scroll_fix("<html><HEAD><title>t</title></HEAD><body></body></html>");
        assert_eq!(
            out,
            format!("<html><HEAD><title>t</title>{SCROLL_FIX_STYLE}</HEAD><body></body></html>")
        );
    }

    #[test]
    fn scroll_fix_falls_back_to_body_then_prepend() {
        assert_eq!(
            inject_scroll_fix(r#"<body class="x"><p>hi</p></body>"#),
            format!(r#"<body class="x">{SCROLL_FIX_STYLE}<p>hi</p></body>"#)
        );
        assert_eq!(inject_scroll_fix("<p>hi</p>"), format!("{SCROLL_FIX_STYLE}<p>hi</p>"));
    }

    #[test]
    fn watermark_after_body_open() {
        let out = inject_watermark("<html><body id=\"b\"><p>x</p></body></html>", "Acme <Launch>", fixed_time());
        let body_end = out.find("<body id=\"b\">").unwrap() + "<body id=\"b\">".len();
        assert!(out[body_end..].starts_with("\n<style>\n.preview-watermark {"));
        assert!(out.contains("Created: 04.03.2025 05:06 | Acme &lt;Launch&gt;"));
        assert!(out.contains("preview-watermark-corner"));
        assert!(out.ends_with("<p>x</p></body></html>"));
    }

    #[test]
    fn watermark_prepended_without_body() {
        let out = inject_watermark("<p>x</p>", "P", fixed_time());
        assert!(out.starts_with("\n<style>"));
        assert!(out.ends_with("<p>x</p>"));
    }

    #[test]
    fn metadata_comment_after_doctype() {
        let html = "<!doctype html><html></html>";
        let out = inject_metadata_comment(html, "Preview", "https://www.example.com/page", fixed_time());
        assert!(out.starts_with("<!doctype html>\n<!--\n╔"));
        assert!(out.contains("Project:  Preview"));
        assert!(out.contains("Created:  2025-03-04 05:06:07"));
        assert!(out.contains("Source:   www.example.com"));
        assert!(out.ends_with("-->\n<html></html>"));
    }

    #[test]
    fn metadata_comment_prepended_and_aligned() {
        let out = inject_metadata_comment("<p></p>", "P", "https://ex.com", fixed_time());
        assert!(out.starts_with("<!--\n"));

        let widths: Vec<usize> = out
            .lines()
            .filter(|line| line.starts_with('║') || line.starts_with('╔'))
            .map(|line| line.chars().count())
            .collect();
        assert!(widths.windows(2).all(|w| w[0] == w[1]), "{widths:?}");
    }

    #[test]
    fn long_domain_is_truncated() {
        let url = format!("https://{}.com/", "a".repeat(80));
        let comment = metadata_comment("P", &url, fixed_time());
        assert!(comment.contains(&format!("Source:   {}", "a".repeat(50))));
        assert!(!comment.contains(&"a".repeat(51)));
    }

    #[test]
    fn long_project_name_keeps_box_aligned() {
        let name = "Quarterly Relaunch ".repeat(6);
        let comment = metadata_comment(&name, "https://ex.com", fixed_time());

        let widths: Vec<usize> = comment
            .lines()
            .filter(|line| line.starts_with('║') || line.starts_with('╔'))
            .map(|line| line.chars().count())
            .collect();
        assert!(widths.windows(2).all(|w| w[0] == w[1]), "{widths:?}");
        assert!(comment.contains("Project:  Quarterly Relaunch"));
    }
}
