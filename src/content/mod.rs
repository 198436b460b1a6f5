//! Content module - post models, rich text and reading time

mod post;
pub mod reading_time;
pub mod rich_text;

pub use post::{
    Banner, ContentSection, PostDetail, PostSummary, PostsPage, RichTextBlock, Span, SpanData,
};
pub use reading_time::{estimate_minutes, DEFAULT_WORDS_PER_MINUTE};
