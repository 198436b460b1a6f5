//! spacetraveling: a blog front-end for a Prismic repository
//!
//! Posts live in a headless CMS. This crate renders the post listing and
//! the post pages with an embedded Tera theme, either ahead of time into a
//! `public/` directory or on demand from an HTTP server.

pub mod cms;
pub mod commands;
pub mod config;
pub mod content;
pub mod generator;
pub mod helpers;
pub mod i18n;
pub mod pagination;
pub mod server;
pub mod templates;

use anyhow::Result;
use std::path::{Path, PathBuf};

use crate::templates::{PostState, TemplateRenderer};

/// The main application: configuration plus the CMS client built from it
#[derive(Debug, Clone)]
pub struct Blog {
    /// Site configuration
    pub config: config::SiteConfig,
    /// Base directory
    pub base_dir: PathBuf,
    /// Public (output) directory
    pub public_dir: PathBuf,
    /// Content API client
    pub cms: cms::CmsClient,
}

impl Blog {
    /// Create a new instance from a directory holding `_config.yml`
    pub fn new<P: AsRef<Path>>(base_dir: P) -> Result<Self> {
        let config_path = base_dir.as_ref().join("_config.yml");

        let config = if config_path.exists() {
            config::SiteConfig::load(&config_path)?
        } else {
            tracing::debug!("No {:?}, using defaults", config_path);
            config::SiteConfig::default()
        };

        Self::with_config(base_dir, config)
    }

    /// Create a new instance from an already loaded configuration
    pub fn with_config<P: AsRef<Path>>(base_dir: P, config: config::SiteConfig) -> Result<Self> {
        config.validate()?;
        let base_dir = base_dir.as_ref().to_path_buf();
        let public_dir = base_dir.join(&config.public_dir);
        let cms = cms::CmsClient::new(&config.cms)?;

        Ok(Self {
            config,
            base_dir,
            public_dir,
            cms,
        })
    }

    /// UI strings: built-in languages plus the site's `languages/` overrides
    pub fn i18n(&self) -> Result<i18n::I18n> {
        let mut i18n = i18n::I18n::new(&self.config.language);
        i18n.load_languages(self.base_dir.join("languages"))?;
        Ok(i18n)
    }

    /// Template renderer for this site
    pub fn renderer(&self) -> Result<TemplateRenderer> {
        TemplateRenderer::new(&self.config, &self.i18n()?)
    }

    /// Where the pre-rendered page of a post lives
    pub fn post_output_path(&self, slug: &str) -> PathBuf {
        self.public_dir.join("post").join(slug).join("index.html")
    }

    /// Resolve a slug against the CMS into a terminal page state
    pub async fn resolve_post(&self, slug: &str) -> PostState {
        match self.cms.post_by_slug(slug).await {
            Ok(Some(post)) => PostState::Ready(Box::new(post)),
            Ok(None) => PostState::NotFound {
                slug: slug.to_string(),
            },
            Err(e) => {
                tracing::error!("Failed to resolve post {}: {}", slug, e);
                PostState::Error {
                    slug: slug.to_string(),
                    message: e.to_string(),
                }
            }
        }
    }

    /// Generate the static site
    pub async fn generate(&self) -> Result<()> {
        commands::generate::run(self).await
    }

    /// Clean the public directory
    pub fn clean(&self) -> Result<()> {
        commands::clean::run(self)
    }
}
