//! Generator module - renders the whole site into the public directory

use anyhow::Result;
use std::fs;
use std::path::Path;

use crate::helpers::is_valid_slug;
use crate::pagination::PaginationState;
use crate::templates::{PostState, TemplateRenderer, ASSETS};
use crate::Blog;

/// What a generation run produced
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GenerateStats {
    /// Listing pages, the index included
    pub listing_pages: usize,
    /// Posts shown across all listing pages
    pub listed_posts: usize,
    /// Pre-rendered post pages
    pub post_pages: usize,
}

/// Static site generator
pub struct Generator {
    blog: Blog,
    renderer: TemplateRenderer,
}

impl Generator {
    /// Create a new generator
    pub fn new(blog: &Blog) -> Result<Self> {
        Ok(Self {
            blog: blog.clone(),
            renderer: blog.renderer()?,
        })
    }

    /// Generate the entire site
    pub async fn generate(&self) -> Result<GenerateStats> {
        fs::create_dir_all(&self.blog.public_dir)?;

        self.write_assets()?;

        let (listing_pages, listed_posts) = self.generate_listing().await?;
        let post_pages = self.generate_post_pages().await?;

        Ok(GenerateStats {
            listing_pages,
            listed_posts,
            post_pages,
        })
    }

    /// Write the embedded theme assets
    pub fn write_assets(&self) -> Result<()> {
        for (path, content) in ASSETS {
            write_file(&self.blog.public_dir.join(path), content)?;
        }
        Ok(())
    }

    /// Render `index.html` and one JSON file per further listing page.
    ///
    /// The CMS continuation chain is followed with the same load-more
    /// operation the listing uses, and each page's `next_page` is rewritten
    /// to the JSON file of the following page.
    async fn generate_listing(&self) -> Result<(usize, usize)> {
        let first = self
            .blog
            .cms
            .query_posts(self.blog.config.per_page)
            .await?;
        let mut state = PaginationState::new(first);

        let next = state.has_more().then(|| self.renderer.page_json_url(2));
        let html = self.renderer.render_listing(state.posts(), next.as_deref())?;
        write_file(&self.blog.public_dir.join("index.html"), &html)?;
        tracing::debug!("Generated index.html with {} posts", state.posts().len());

        let mut page = 1;
        while state.has_more() {
            let shown = state.posts().len();
            state.load_more(&self.blog.cms).await?;
            page += 1;

            let next = state.has_more().then(|| self.renderer.page_json_url(page + 1));
            let body = self
                .renderer
                .load_more_response(&state.posts()[shown..], next);
            let output_path = self
                .blog
                .public_dir
                .join("page")
                .join(format!("{}.json", page));
            write_file(&output_path, &serde_json::to_string_pretty(&body)?)?;
            tracing::debug!("Generated listing page: {:?}", output_path);
        }

        Ok((page, state.posts().len()))
    }

    /// Pre-render every post known to the CMS
    async fn generate_post_pages(&self) -> Result<usize> {
        let slugs = self.blog.cms.all_slugs().await?;
        let mut generated = 0;

        for slug in &slugs {
            if !is_valid_slug(slug) {
                tracing::warn!("Skipping post with unsafe slug {:?}", slug);
                continue;
            }

            let Some(post) = self.blog.cms.post_by_slug(slug).await? else {
                tracing::warn!("Post {} is listed but could not be resolved", slug);
                continue;
            };

            let html = self.renderer.render_post(&PostState::Ready(Box::new(post)))?;
            let output_path = self.blog.post_output_path(slug);
            write_file(&output_path, &html)?;
            tracing::debug!("Generated post: {:?}", output_path);
            generated += 1;
        }

        Ok(generated)
    }
}

/// Write a file, creating parent directories as needed
pub fn write_file(path: &Path, content: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .map_err(|e| anyhow::anyhow!("Failed to create dir {:?}: {}", parent, e))?;
    }
    fs::write(path, content).map_err(|e| anyhow::anyhow!("Failed to write {:?}: {}", path, e))?;
    Ok(())
}
