//! HTML to readable text
//!
//! A regex reduction, not a parser: drops page chrome and scripts, keeps
//! headings, paragraphs, list items and links in a markdown-ish form.

use regex::Regex;
use std::sync::LazyLock;

static CHROME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<(script|style|nav|footer|header|noscript|svg)\b[^>]*>.*?</(script|style|nav|footer|header|noscript|svg)\s*>")
        .expect("static regex is a compile-time constant")
});
static COMMENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<!--.*?-->").expect("static regex is a compile-time constant"));
static HEADING: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)<h([1-6])\b[^>]*>").expect("static regex is a compile-time constant")
});
static LINK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?is)<a\b[^>]*?href\s*=\s*["']([^"']+)["'][^>]*>(.*?)</a\s*>"#)
        .expect("static regex is a compile-time constant")
});
static IMAGE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)<img\b[^>]*>").expect("static regex is a compile-time constant"));
static LIST_ITEM: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)<li\b[^>]*>").expect("static regex is a compile-time constant"));
static BLOCK_BREAK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)<br\s*/?>|</(p|div|h[1-6]|li|ul|ol|tr|table|section|article|pre|blockquote)\s*>")
        .expect("static regex is a compile-time constant")
});
static TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<[^>]+>").expect("static regex is a compile-time constant"));
static BLANK_RUNS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n{3,}").expect("static regex is a compile-time constant"));

/// Reduce an HTML document to text
#[must_use]
pub fn html_to_text(html: &str) -> String {
    let text = COMMENT.replace_all(html, "");
    let text = CHROME.replace_all(&text, "");
    let text = IMAGE.replace_all(&text, "");
    let text = LINK.replace_all(&text, |caps: &regex::Captures<'_>| {
        let label = TAG.replace_all(&caps[2], "");
        let label = label.trim();
        if label.is_empty() {
            String::new()
        } else {
            format!("[{label}]({})", &caps[1])
        }
    });
    let text = HEADING.replace_all(&text, |caps: &regex::Captures<'_>| {
        let level = caps[1].parse::<usize>().unwrap_or(1);
        format!("\n\n{} ", "#".repeat(level))
    });
    let text = LIST_ITEM.replace_all(&text, "\n- ");
    let text = BLOCK_BREAK.replace_all(&text, "\n");
    let text = TAG.replace_all(&text, "");
    let text = decode_entities(&text);

    let lines: Vec<&str> = text.lines().map(str::trim_end).collect();
    let joined = lines.join("\n");
    BLANK_RUNS.replace_all(joined.trim(), "\n\n").into_owned()
}

fn decode_entities(text: &str) -> String {
    text.replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&apos;", "'")
        .replace("&amp;", "&")
}
