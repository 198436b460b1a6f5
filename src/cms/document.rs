//! Wire shapes of the content API and their decoding into post models

use serde::Deserialize;

use super::CmsError;
use crate::content::{Banner, ContentSection, PostDetail, PostSummary, PostsPage};
use crate::helpers::parse_timestamp;

/// `GET {endpoint}` response, only the refs matter here
#[derive(Debug, Deserialize)]
pub(crate) struct ApiInfo {
    #[serde(default)]
    pub refs: Vec<ApiRef>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ApiRef {
    #[serde(rename = "ref")]
    pub reference: String,
    #[serde(rename = "isMasterRef", default)]
    pub is_master_ref: bool,
}

/// `GET {endpoint}/documents/search` response
#[derive(Debug, Deserialize)]
pub(crate) struct SearchResponse<D> {
    pub results: Vec<Document<D>>,
    #[serde(default)]
    pub next_page: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Document<D> {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub uid: Option<String>,
    #[serde(default)]
    pub first_publication_date: Option<String>,
    pub data: D,
}

/// Fields fetched for the listing
#[derive(Debug, Deserialize)]
pub(crate) struct SummaryFields {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub subtitle: Option<String>,
    #[serde(default)]
    pub author: Option<String>,
}

/// Fields fetched for a post page
#[derive(Debug, Deserialize)]
pub(crate) struct DetailFields {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub subtitle: Option<String>,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub banner: Option<Banner>,
    #[serde(default)]
    pub content: Option<Vec<ContentSection>>,
}

/// Field names a listing query asks for
pub(crate) const SUMMARY_FIELDS: &[&str] = &["title", "subtitle", "author"];

/// Field names a post query asks for
pub(crate) const DETAIL_FIELDS: &[&str] = &["title", "subtitle", "author", "banner", "content"];

impl<D> Document<D> {
    fn invalid(&self, reason: &str) -> CmsError {
        let document = self
            .uid
            .clone()
            .unwrap_or_else(|| format!("id={}", self.id));
        CmsError::InvalidDocument {
            document,
            reason: reason.to_string(),
        }
    }

    fn slug(&self) -> Result<String, CmsError> {
        match self.uid.as_deref() {
            Some(uid) if !uid.is_empty() => Ok(uid.to_string()),
            _ => Err(self.invalid("missing uid")),
        }
    }

    fn published_at(&self) -> Result<Option<chrono::DateTime<chrono::FixedOffset>>, CmsError> {
        match self.first_publication_date.as_deref() {
            None => Ok(None),
            Some(value) => parse_timestamp(value)
                .map(Some)
                .ok_or_else(|| self.invalid(&format!("bad first_publication_date {:?}", value))),
        }
    }
}

fn required(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

impl TryFrom<Document<SummaryFields>> for PostSummary {
    type Error = CmsError;

    fn try_from(doc: Document<SummaryFields>) -> Result<Self, Self::Error> {
        let slug = doc.slug()?;
        let first_publication_date = doc.published_at()?;
        let title = required(doc.data.title.clone()).ok_or_else(|| doc.invalid("missing title"))?;

        Ok(PostSummary {
            slug,
            first_publication_date,
            title,
            subtitle: doc.data.subtitle.unwrap_or_default(),
            author: doc.data.author.unwrap_or_default(),
        })
    }
}

impl TryFrom<Document<DetailFields>> for PostDetail {
    type Error = CmsError;

    fn try_from(doc: Document<DetailFields>) -> Result<Self, Self::Error> {
        let slug = doc.slug()?;
        let first_publication_date = doc.published_at()?;
        let title = required(doc.data.title.clone()).ok_or_else(|| doc.invalid("missing title"))?;

        Ok(PostDetail {
            slug,
            first_publication_date,
            title,
            subtitle: doc.data.subtitle.unwrap_or_default(),
            author: doc.data.author.unwrap_or_default(),
            banner: doc.data.banner.unwrap_or_default(),
            content: doc.data.content.unwrap_or_default(),
        })
    }
}

/// Decode a search response into a listing page
pub(crate) fn decode_page(response: SearchResponse<SummaryFields>) -> Result<PostsPage, CmsError> {
    let results = response
        .results
        .into_iter()
        .map(PostSummary::try_from)
        .collect::<Result<Vec<_>, _>>()?;

    Ok(PostsPage {
        results,
        next_page: response.next_page.filter(|url| !url.is_empty()),
    })
}
