//! HTTP client for the Prismic REST API v2

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use url::Url;

use super::document::{
    decode_page, ApiInfo, DetailFields, SearchResponse, SummaryFields, DETAIL_FIELDS,
    SUMMARY_FIELDS,
};
use super::CmsError;
use crate::config::CmsConfig;
use crate::content::{PostDetail, PostsPage};
use crate::pagination::PageFetcher;

/// Largest page size the API accepts
const MAX_PAGE_SIZE: usize = 100;

/// Client for one Prismic repository, created once at start-up
#[derive(Debug, Clone)]
pub struct CmsClient {
    http: reqwest::Client,
    endpoint: Url,
    access_token: Option<String>,
    document_type: String,
}

impl CmsClient {
    /// Create a client from the `cms` section of the site configuration
    pub fn new(config: &CmsConfig) -> Result<Self, CmsError> {
        let endpoint = parse_url(&config.endpoint)?;
        let http = reqwest::Client::builder()
            .user_agent(concat!("spacetraveling/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|source| CmsError::Http {
                url: config.endpoint.clone(),
                source,
            })?;

        Ok(Self {
            http,
            endpoint,
            access_token: config.access_token.clone().filter(|t| !t.is_empty()),
            document_type: config.document_type.clone(),
        })
    }

    /// Repository API endpoint
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Whether a continuation URL points at this repository's API
    pub fn owns_url(&self, candidate: &str) -> bool {
        let Ok(url) = Url::parse(candidate) else {
            return false;
        };
        let base = self.endpoint.path().trim_end_matches('/');
        let under_base = match url.path().strip_prefix(base) {
            Some(rest) => rest.is_empty() || rest.starts_with('/'),
            None => false,
        };

        url.scheme() == self.endpoint.scheme()
            && url.host_str() == self.endpoint.host_str()
            && url.port_or_known_default() == self.endpoint.port_or_known_default()
            && under_base
    }

    /// Query the first listing page
    pub async fn query_posts(&self, page_size: usize) -> Result<PostsPage, CmsError> {
        let predicate = format!(r#"[at(document.type,"{}")]"#, self.document_type);
        let response: SearchResponse<SummaryFields> = self
            .search(&predicate, SUMMARY_FIELDS, page_size.clamp(1, MAX_PAGE_SIZE))
            .await?;
        decode_page(response)
    }

    /// Follow a `next_page` continuation URL
    pub async fn fetch_page(&self, next_page: &str) -> Result<PostsPage, CmsError> {
        let url = parse_url(next_page)?;
        let response: SearchResponse<SummaryFields> = self.get_json(self.with_token(url)).await?;
        decode_page(response)
    }

    /// Resolve a slug to its post, `None` when no document has that uid
    pub async fn post_by_slug(&self, slug: &str) -> Result<Option<PostDetail>, CmsError> {
        let predicate = format!(
            r#"[at(my.{}.uid,"{}")]"#,
            self.document_type,
            slug.replace(['"', '\\'], "")
        );
        let response: SearchResponse<DetailFields> =
            self.search(&predicate, DETAIL_FIELDS, 1).await?;

        response
            .results
            .into_iter()
            .next()
            .map(PostDetail::try_from)
            .transpose()
    }

    /// Every post slug, walking all listing pages
    pub async fn all_slugs(&self) -> Result<Vec<String>, CmsError> {
        let mut page = self.query_posts(MAX_PAGE_SIZE).await?;
        let mut slugs = Vec::new();

        loop {
            slugs.extend(page.results.into_iter().map(|post| post.slug));
            match page.next_page {
                Some(next) => page = self.fetch_page(&next).await?,
                None => break,
            }
        }

        tracing::debug!("Found {} slugs", slugs.len());
        Ok(slugs)
    }

    async fn master_ref(&self) -> Result<String, CmsError> {
        let info: ApiInfo = self.get_json(self.with_token(self.endpoint.clone())).await?;
        info.refs
            .into_iter()
            .find(|r| r.is_master_ref)
            .map(|r| r.reference)
            .ok_or_else(|| CmsError::NoMasterRef(self.endpoint.to_string()))
    }

    async fn search<D: DeserializeOwned>(
        &self,
        predicate: &str,
        fields: &[&str],
        page_size: usize,
    ) -> Result<SearchResponse<D>, CmsError> {
        let reference = self.master_ref().await?;
        let fetch = fields
            .iter()
            .map(|field| format!("{}.{}", self.document_type, field))
            .collect::<Vec<_>>()
            .join(",");

        let mut url = parse_url(&format!(
            "{}/documents/search",
            self.endpoint.as_str().trim_end_matches('/')
        ))?;
        url.query_pairs_mut()
            .append_pair("ref", &reference)
            .append_pair("q", &format!("[{}]", predicate))
            .append_pair("fetch", &fetch)
            .append_pair("pageSize", &page_size.to_string());

        self.get_json(self.with_token(url)).await
    }

    fn with_token(&self, mut url: Url) -> Url {
        if let Some(token) = &self.access_token {
            if !url.query_pairs().any(|(key, _)| key == "access_token") {
                url.query_pairs_mut().append_pair("access_token", token);
            }
        }
        url
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T, CmsError> {
        // The query may carry the access token, keep it out of logs and errors
        let shown = format!("{}{}", url.origin().ascii_serialization(), url.path());
        tracing::debug!("GET {}", shown);

        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|source| CmsError::Http {
                url: shown.clone(),
                source: source.without_url(),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(CmsError::Status { url: shown, status });
        }

        let body = response.text().await.map_err(|source| CmsError::Http {
            url: shown.clone(),
            source: source.without_url(),
        })?;
        serde_json::from_str(&body).map_err(|source| CmsError::Decode { url: shown, source })
    }
}

#[async_trait]
impl PageFetcher for CmsClient {
    async fn fetch_page(&self, url: &str) -> Result<PostsPage, CmsError> {
        CmsClient::fetch_page(self, url).await
    }
}

fn parse_url(url: &str) -> Result<Url, CmsError> {
    Url::parse(url).map_err(|source| CmsError::Url {
        url: url.to_string(),
        source,
    })
}
