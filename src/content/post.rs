//! Post models decoded from CMS documents

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Deserializer};

/// A post as shown in the listing
#[derive(Debug, Clone, PartialEq)]
pub struct PostSummary {
    /// Unique slug (the CMS `uid`)
    pub slug: String,

    /// First publication date, absent for documents never published
    pub first_publication_date: Option<DateTime<FixedOffset>>,

    pub title: String,
    pub subtitle: String,
    pub author: String,
}

/// A full post with its content
#[derive(Debug, Clone, PartialEq)]
pub struct PostDetail {
    /// Unique slug (the CMS `uid`)
    pub slug: String,

    /// First publication date, absent for documents never published
    pub first_publication_date: Option<DateTime<FixedOffset>>,

    pub title: String,
    pub subtitle: String,
    pub author: String,

    /// Banner image shown above the article
    pub banner: Banner,

    /// Ordered content sections
    pub content: Vec<ContentSection>,
}

impl PostDetail {
    /// The listing representation of this post
    pub fn summary(&self) -> PostSummary {
        PostSummary {
            slug: self.slug.clone(),
            first_publication_date: self.first_publication_date,
            title: self.title.clone(),
            subtitle: self.subtitle.clone(),
            author: self.author.clone(),
        }
    }

    /// Estimated minutes needed to read the post
    pub fn reading_time(&self, words_per_minute: usize) -> usize {
        super::reading_time::estimate_minutes(&self.content, words_per_minute)
    }
}

/// Image field; an empty image in the CMS decodes to all `None`
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Banner {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub alt: Option<String>,
}

/// A heading followed by rich-text body blocks
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ContentSection {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub heading: String,
    #[serde(default)]
    pub body: Vec<RichTextBlock>,
}

/// One rich-text block (paragraph, list item, heading, ...)
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RichTextBlock {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub spans: Vec<Span>,
}

impl RichTextBlock {
    pub fn new(kind: &str, text: &str) -> Self {
        Self {
            kind: kind.to_string(),
            text: text.to_string(),
            spans: Vec::new(),
        }
    }

    pub fn is_list_item(&self) -> bool {
        self.kind == "list-item"
    }
}

/// Inline annotation over `text[start..end]`, offsets in UTF-16 code units
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Span {
    pub start: usize,
    pub end: usize,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub data: Option<SpanData>,
}

/// Extra span payload, only hyperlinks carry one
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct SpanData {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub target: Option<String>,
}

/// Empty text fields come back as `null`
fn null_as_empty<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// One page of listing results
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PostsPage {
    pub results: Vec<PostSummary>,
    /// Continuation URL, `None` on the last page
    pub next_page: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_null_heading() {
        let section: ContentSection =
            serde_json::from_str(r#"{"heading": null, "body": []}"#).unwrap();
        assert_eq!(section.heading, "");
    }

    #[test]
    fn test_block_deserialize() {
        let json = r#"{"type":"paragraph","text":"Hello world","spans":[{"start":0,"end":5,"type":"strong"}]}"#;
        let block: RichTextBlock = serde_json::from_str(json).unwrap();
        assert_eq!(block.kind, "paragraph");
        assert_eq!(block.spans.len(), 1);
        assert_eq!(block.spans[0].kind, "strong");
        assert!(block.spans[0].data.is_none());
    }

    #[test]
    fn test_image_block_without_text() {
        let json = r#"{"type":"image","url":"https://images.prismic.io/x.png"}"#;
        let block: RichTextBlock = serde_json::from_str(json).unwrap();
        assert_eq!(block.text, "");
        assert!(block.spans.is_empty());
    }

    #[test]
    fn test_empty_banner() {
        let banner: Banner = serde_json::from_str("{}").unwrap();
        assert_eq!(banner, Banner::default());
    }

    #[test]
    fn test_summary_keeps_identity() {
        let detail = PostDetail {
            slug: "como-utilizar-hooks".to_string(),
            first_publication_date: None,
            title: "Como utilizar Hooks".to_string(),
            subtitle: "Pensando em sincronização".to_string(),
            author: "Joseph Oliveira".to_string(),
            banner: Banner::default(),
            content: Vec::new(),
        };
        let summary = detail.summary();
        assert_eq!(summary.slug, detail.slug);
        assert_eq!(summary.author, detail.author);
    }
}
