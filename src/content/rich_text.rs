//! Rich-text helpers: plain-text extraction and HTML rendering

use super::post::{RichTextBlock, Span};
use crate::helpers::{anchor_open, html_escape};

/// Concatenate the text of every block, separated by a single space
pub fn as_text(blocks: &[RichTextBlock]) -> String {
    blocks
        .iter()
        .map(|block| block.text.as_str())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Render a body as HTML.
///
/// Each `list-item` becomes its own single-item `<ul>`; adjacent list items
/// are not merged into one list. Everything else becomes a `<p>`.
pub fn render_body(blocks: &[RichTextBlock]) -> String {
    blocks.iter().map(render_block).collect()
}

/// Render a single block
pub fn render_block(block: &RichTextBlock) -> String {
    let inner = apply_spans(&block.text, &block.spans);
    if block.is_list_item() {
        format!("<ul><li>{}</li></ul>", inner)
    } else {
        format!("<p>{}</p>", inner)
    }
}

/// Escape `text` and wrap span ranges in inline markup.
///
/// Spans that overlap an earlier one, point outside the text or have an
/// unknown type are skipped.
pub fn apply_spans(text: &str, spans: &[Span]) -> String {
    let mut ranges: Vec<(usize, usize, String, &'static str)> = spans
        .iter()
        .filter_map(|span| {
            let (open, close) = span_tags(span)?;
            let start = byte_offset(text, span.start)?;
            let end = byte_offset(text, span.end)?;
            (start < end).then_some((start, end, open, close))
        })
        .collect();
    ranges.sort_by_key(|(start, end, _, _)| (*start, *end));

    let mut html = String::with_capacity(text.len());
    let mut cursor = 0;
    for (start, end, open, close) in ranges {
        if start < cursor {
            continue;
        }
        html.push_str(&html_escape(&text[cursor..start]));
        html.push_str(&open);
        html.push_str(&html_escape(&text[start..end]));
        html.push_str(close);
        cursor = end;
    }
    html.push_str(&html_escape(&text[cursor..]));
    html
}

fn span_tags(span: &Span) -> Option<(String, &'static str)> {
    match span.kind.as_str() {
        "strong" => Some(("<strong>".to_string(), "</strong>")),
        "em" => Some(("<em>".to_string(), "</em>")),
        "hyperlink" => {
            let data = span.data.as_ref()?;
            let url = data.url.as_deref()?;
            let new_tab = data.target.as_deref() == Some("_blank");
            Some((anchor_open(url, new_tab), "</a>"))
        }
        _ => None,
    }
}

/// Map a UTF-16 offset to a byte offset on a char boundary
fn byte_offset(text: &str, utf16_offset: usize) -> Option<usize> {
    let mut units = 0;
    for (index, c) in text.char_indices() {
        if units == utf16_offset {
            return Some(index);
        }
        if units > utf16_offset {
            return None;
        }
        units += c.len_utf16();
    }
    (units == utf16_offset).then_some(text.len())
}
