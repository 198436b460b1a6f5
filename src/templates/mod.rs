//! Built-in theme using the Tera template engine
//!
//! Templates and static assets are embedded in the binary. Autoescaping is
//! off; templates escape text with the `html_escape` filter and print
//! pre-rendered HTML (rich text, banner, dates) as is.

use anyhow::Result;
use serde::Serialize;
use std::collections::HashMap;
use tera::{Context, Tera};

use crate::config::SiteConfig;
use crate::content::{rich_text, PostDetail, PostSummary};
use crate::helpers::{
    date_xml, encode_url, full_url_for, html_escape, image_tag, page_json_url, post_url,
    time_tag, url_for, DateFormatter,
};
use crate::i18n::I18n;

/// Static files written next to the generated pages
pub const ASSETS: &[(&str, &str)] = &[
    ("spacetraveling.svg", include_str!("theme/spacetraveling.svg")),
    ("css/style.css", include_str!("theme/style.css")),
];

/// Resolution state of a post page
#[derive(Debug, Clone, PartialEq)]
pub enum PostState {
    /// Fallback shell, the post is resolved by a follow-up request
    Loading { slug: String },
    Ready(Box<PostDetail>),
    NotFound { slug: String },
    Error { slug: String, message: String },
}

impl PostState {
    /// Name used by templates and the `data-state` attribute
    pub fn name(&self) -> &'static str {
        match self {
            PostState::Loading { .. } => "loading",
            PostState::Ready(_) => "ready",
            PostState::NotFound { .. } => "not_found",
            PostState::Error { .. } => "error",
        }
    }

    pub fn slug(&self) -> &str {
        match self {
            PostState::Loading { slug }
            | PostState::NotFound { slug }
            | PostState::Error { slug, .. } => slug,
            PostState::Ready(post) => &post.slug,
        }
    }
}

/// Template renderer with the embedded theme
pub struct TemplateRenderer {
    tera: Tera,
    config: SiteConfig,
    dates: DateFormatter,
    strings: HashMap<String, String>,
}

impl TemplateRenderer {
    /// Create a new renderer with all templates loaded
    pub fn new(config: &SiteConfig, i18n: &I18n) -> Result<Self> {
        let mut tera = Tera::default();

        // Escaping is explicit through the html_escape filter
        tera.autoescape_on(vec![]);

        tera.add_raw_templates(vec![
            ("layout.html", include_str!("theme/layout.html")),
            ("index.html", include_str!("theme/index.html")),
            ("post.html", include_str!("theme/post.html")),
            ("error.html", include_str!("theme/error.html")),
            (
                "partials/header.html",
                include_str!("theme/partials/header.html"),
            ),
            (
                "partials/post_content.html",
                include_str!("theme/partials/post_content.html"),
            ),
        ])?;

        tera.register_filter("html_escape", html_escape_filter);

        Ok(Self {
            tera,
            config: config.clone(),
            dates: DateFormatter::from_config(config)?,
            strings: i18n.get_all_translations(),
        })
    }

    /// Render a template with given context
    pub fn render(&self, template_name: &str, context: &Context) -> Result<String> {
        Ok(self.tera.render(template_name, context)?)
    }

    /// Look up a UI string
    pub fn t(&self, key: &str) -> String {
        self.strings
            .get(key)
            .cloned()
            .unwrap_or_else(|| key.to_string())
    }

    /// Render the listing page; the load-more control only appears with a
    /// continuation URL
    pub fn render_listing(&self, posts: &[PostSummary], next_page: Option<&str>) -> Result<String> {
        let views: Vec<PostSummaryView> = posts.iter().map(|p| self.summary_view(p)).collect();

        let mut context = self.base_context();
        context.insert("posts", &views);
        context.insert("next_page", &next_page);
        self.render("index.html", &context)
    }

    /// Render a full post page in any state
    pub fn render_post(&self, state: &PostState) -> Result<String> {
        let context = self.post_context(state);
        self.render("post.html", &context)
    }

    /// Render only the `<main>` content of a post page
    pub fn render_post_content(&self, state: &PostState) -> Result<String> {
        let context = self.post_context(state);
        self.render("partials/post_content.html", &context)
    }

    /// Render a generic error page
    pub fn render_error(&self, message: &str) -> Result<String> {
        let mut context = self.base_context();
        context.insert("message", message);
        self.render("error.html", &context)
    }

    /// Body of a load-more response
    pub fn load_more_response(
        &self,
        posts: &[PostSummary],
        next_page: Option<String>,
    ) -> LoadMoreResponse {
        LoadMoreResponse {
            next_page,
            results: posts.iter().map(|p| self.summary_view(p)).collect(),
        }
    }

    /// Link to the static JSON file of listing page `page`
    pub fn page_json_url(&self, page: usize) -> String {
        page_json_url(&self.config, page)
    }

    pub fn summary_view(&self, post: &PostSummary) -> PostSummaryView {
        PostSummaryView {
            slug: post.slug.clone(),
            href: post_url(&self.config, &post.slug),
            title: post.title.clone(),
            subtitle: post.subtitle.clone(),
            author: post.author.clone(),
            date: self.dates.format_opt(post.first_publication_date.as_ref()),
            datetime: post.first_publication_date.as_ref().map(date_xml),
        }
    }

    pub fn post_view(&self, post: &PostDetail) -> PostView {
        let alt = post.banner.alt.as_deref().unwrap_or(post.title.as_str());
        let banner_html = post
            .banner
            .url
            .as_deref()
            .map(|src| image_tag(src, Some(alt), Some("banner")));

        let date_html = post
            .first_publication_date
            .as_ref()
            .map(|date| time_tag(&date_xml(date), &self.dates.format(date)));

        PostView {
            slug: post.slug.clone(),
            title: post.title.clone(),
            subtitle: post.subtitle.clone(),
            author: post.author.clone(),
            date_html,
            banner_html,
            reading_time: post.reading_time(self.config.reading_rate),
            sections: post
                .content
                .iter()
                .map(|section| SectionView {
                    heading: section.heading.clone(),
                    body_html: rich_text::render_body(&section.body),
                })
                .collect(),
        }
    }

    fn base_context(&self) -> Context {
        let mut context = Context::new();
        context.insert(
            "site",
            &SiteData {
                title: self.config.title.clone(),
                language: self.config.language.clone(),
                root: url_for(&self.config, ""),
                logo: url_for(&self.config, &self.config.logo),
                stylesheet: url_for(&self.config, "css/style.css"),
                version: env!("CARGO_PKG_VERSION").to_string(),
            },
        );
        context.insert("i18n", &self.strings);
        context.insert("canonical", &None::<String>);
        context
    }

    fn post_context(&self, state: &PostState) -> Context {
        let mut context = self.base_context();
        context.insert("state", state.name());
        context.insert("slug", state.slug());

        let post = match state {
            PostState::Ready(post) => Some(self.post_view(post)),
            _ => None,
        };
        context.insert("post", &post);

        if let PostState::Ready(post) = state {
            context.insert(
                "canonical",
                &full_url_for(&self.config, &format!("post/{}", encode_url(&post.slug))),
            );
        }

        let content_url = match state {
            PostState::Loading { slug } => Some(format!("{}/content", post_url(&self.config, slug))),
            _ => None,
        };
        context.insert("content_url", &content_url);
        context
    }
}

/// Tera filter: escape HTML special characters
fn html_escape_filter(
    value: &tera::Value,
    _args: &HashMap<String, tera::Value>,
) -> tera::Result<tera::Value> {
    let s = tera::try_get_value!("html_escape", "value", String, value);
    Ok(tera::Value::String(html_escape(&s)))
}

/// Data structures for template context

#[derive(Debug, Clone, Serialize)]
pub struct SiteData {
    pub title: String,
    pub language: String,
    pub root: String,
    pub logo: String,
    pub stylesheet: String,
    pub version: String,
}

/// A listing entry, also the JSON shape of load-more results
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PostSummaryView {
    pub slug: String,
    pub href: String,
    pub title: String,
    pub subtitle: String,
    pub author: String,
    pub date: Option<String>,
    pub datetime: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PostView {
    pub slug: String,
    pub title: String,
    pub subtitle: String,
    pub author: String,
    pub date_html: Option<String>,
    pub banner_html: Option<String>,
    pub reading_time: usize,
    pub sections: Vec<SectionView>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SectionView {
    pub heading: String,
    pub body_html: String,
}

/// `{ next_page, results }` answered to the load-more control
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LoadMoreResponse {
    pub next_page: Option<String>,
    pub results: Vec<PostSummaryView>,
}
