//! Site configuration (_config.yml)

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Main site configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    // Site
    pub title: String,
    pub language: String,
    pub timezone: String,
    pub date_format: String,

    // URL
    pub url: String,
    pub root: String,
    pub logo: String,

    // Directory
    pub public_dir: String,

    // Listing
    pub per_page: usize,

    // Post pages
    pub revalidate: u64,
    pub fallback: bool,
    pub reading_rate: usize,

    // Content source
    #[serde(default)]
    pub cms: CmsConfig,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            title: "spacetraveling".to_string(),
            language: "pt-BR".to_string(),
            timezone: "UTC".to_string(),
            date_format: "DD MMM YYYY".to_string(),

            url: "http://localhost:3000".to_string(),
            root: "/".to_string(),
            logo: "/spacetraveling.svg".to_string(),

            public_dir: "public".to_string(),

            per_page: 1,

            revalidate: 3600,
            fallback: true,
            reading_rate: 200,

            cms: CmsConfig::default(),
        }
    }
}

impl SiteConfig {
    /// Load configuration from a file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)?;
        let config: SiteConfig =
            serde_yaml::from_str(&content).with_context(|| format!("invalid {:?}", path))?;
        config.validate()?;
        Ok(config)
    }

    /// Check values that serde alone cannot reject
    pub fn validate(&self) -> Result<()> {
        self.tz()?;
        if self.per_page == 0 {
            anyhow::bail!("per_page must be at least 1");
        }
        if self.reading_rate == 0 {
            anyhow::bail!("reading_rate must be at least 1");
        }
        url::Url::parse(&self.cms.endpoint)
            .with_context(|| format!("invalid cms.endpoint: {}", self.cms.endpoint))?;
        Ok(())
    }

    /// Timezone used to display publication dates
    pub fn tz(&self) -> Result<chrono_tz::Tz> {
        if self.timezone.is_empty() {
            return Ok(chrono_tz::UTC);
        }
        self.timezone
            .parse()
            .map_err(|e| anyhow::anyhow!("invalid timezone {:?}: {}", self.timezone, e))
    }
}

/// Prismic repository settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CmsConfig {
    pub endpoint: String,
    pub access_token: Option<String>,
    pub document_type: String,
}

impl Default for CmsConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://spacetraveling.cdn.prismic.io/api/v2".to_string(),
            access_token: None,
            document_type: "prismicdesafio".to_string(),
        }
    }
}
