//! Incremental "load more" pagination of the post listing
//!
//! [`PaginationState`] holds the summaries displayed so far and the opaque
//! continuation URL of the next page. Loading is a begin/complete protocol
//! with an explicit in-flight flag, so a second load cannot start before the
//! first one is applied and pages are always appended in request order.

use async_trait::async_trait;
use thiserror::Error;

use crate::cms::CmsError;
use crate::content::{PostSummary, PostsPage};

/// Anything that can read a continuation URL
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch_page(&self, url: &str) -> Result<PostsPage, CmsError>;
}

#[derive(Debug, Error)]
pub enum PaginationError {
    #[error("no further pages to load")]
    Exhausted,

    #[error("a page load is already in progress")]
    InFlight,

    #[error(transparent)]
    Cms(#[from] CmsError),
}

/// Progress of the load-more control
#[derive(Debug, Clone, Default, PartialEq)]
pub enum LoadStatus {
    #[default]
    Idle,
    Loading,
    Failed(String),
}

/// Displayed summaries plus the continuation URL
#[derive(Debug, Clone, Default)]
pub struct PaginationState {
    posts: Vec<PostSummary>,
    next_page: Option<String>,
    status: LoadStatus,
}

impl PaginationState {
    /// Start from the first listing page
    pub fn new(first: PostsPage) -> Self {
        Self {
            posts: first.results,
            next_page: first.next_page,
            status: LoadStatus::Idle,
        }
    }

    pub fn posts(&self) -> &[PostSummary] {
        &self.posts
    }

    pub fn next_page(&self) -> Option<&str> {
        self.next_page.as_deref()
    }

    pub fn status(&self) -> &LoadStatus {
        &self.status
    }

    /// Whether the load-more control should be shown
    pub fn has_more(&self) -> bool {
        self.next_page.is_some()
    }

    /// Mark a load as started and hand out the URL to read
    pub fn begin_load(&mut self) -> Result<String, PaginationError> {
        if self.status == LoadStatus::Loading {
            return Err(PaginationError::InFlight);
        }
        let url = self.next_page.clone().ok_or(PaginationError::Exhausted)?;
        self.status = LoadStatus::Loading;
        Ok(url)
    }

    /// Append a fetched page and replace the continuation URL.
    ///
    /// Returns how many summaries were appended.
    pub fn complete_load(&mut self, page: PostsPage) -> usize {
        let added = page.results.len();
        self.posts.extend(page.results);
        self.next_page = page.next_page;
        self.status = LoadStatus::Idle;
        added
    }

    /// Record a failed load; posts and continuation URL stay untouched
    pub fn fail_load(&mut self, reason: impl std::fmt::Display) {
        self.status = LoadStatus::Failed(reason.to_string());
    }

    /// Fetch the next page and merge it
    pub async fn load_more<F>(&mut self, fetcher: &F) -> Result<usize, PaginationError>
    where
        F: PageFetcher + ?Sized,
    {
        let url = self.begin_load()?;
        match fetcher.fetch_page(&url).await {
            Ok(page) => {
                let added = self.complete_load(page);
                tracing::debug!("Loaded {} more posts", added);
                Ok(added)
            }
            Err(e) => {
                tracing::warn!("Failed to load more posts: {}", e);
                self.fail_load(&e);
                Err(e.into())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn summary(slug: &str) -> PostSummary {
        PostSummary {
            slug: slug.to_string(),
            first_publication_date: None,
            title: slug.to_uppercase(),
            subtitle: String::new(),
            author: "Danilo Vieira".to_string(),
        }
    }

    fn page(slugs: &[&str], next: Option<&str>) -> PostsPage {
        PostsPage {
            results: slugs.iter().map(|s| summary(s)).collect(),
            next_page: next.map(str::to_string),
        }
    }

    /// Serves canned pages keyed by URL
    struct Pages(HashMap<String, PostsPage>);

    #[async_trait]
    impl PageFetcher for Pages {
        async fn fetch_page(&self, url: &str) -> Result<PostsPage, CmsError> {
            self.0.get(url).cloned().ok_or_else(|| CmsError::Status {
                url: url.to_string(),
                status: reqwest::StatusCode::INTERNAL_SERVER_ERROR,
            })
        }
    }

    #[test]
    fn test_no_next_page_hides_control() {
        let state = PaginationState::new(page(&["a"], None));
        assert!(!state.has_more());
    }

    #[test]
    fn test_begin_without_next_page() {
        let mut state = PaginationState::new(page(&["a"], None));
        assert!(matches!(state.begin_load(), Err(PaginationError::Exhausted)));
        assert_eq!(state.status(), &LoadStatus::Idle);
    }

    #[test]
    fn test_second_load_while_in_flight_is_rejected() {
        let mut state = PaginationState::new(page(&["a"], Some("p2")));
        assert_eq!(state.begin_load().unwrap(), "p2");
        assert!(matches!(state.begin_load(), Err(PaginationError::InFlight)));

        state.complete_load(page(&["b"], None));
        assert_eq!(state.status(), &LoadStatus::Idle);
    }

    #[tokio::test]
    async fn test_load_more_appends_in_order() {
        let fetcher = Pages(HashMap::from([
            ("p2".to_string(), page(&["c", "d"], Some("p3"))),
            ("p3".to_string(), page(&["e"], None)),
        ]));
        let mut state = PaginationState::new(page(&["a", "b"], Some("p2")));

        let before = state.posts().to_vec();
        let added = state.load_more(&fetcher).await.unwrap();
        assert_eq!(added, 2);
        assert_eq!(state.posts().len(), before.len() + added);
        assert_eq!(&state.posts()[..before.len()], &before[..]);
        assert_eq!(state.next_page(), Some("p3"));

        state.load_more(&fetcher).await.unwrap();
        let slugs: Vec<_> = state.posts().iter().map(|p| p.slug.as_str()).collect();
        assert_eq!(slugs, ["a", "b", "c", "d", "e"]);
        assert!(!state.has_more());
    }

    #[tokio::test]
    async fn test_duplicates_are_kept() {
        let fetcher = Pages(HashMap::from([("p2".to_string(), page(&["a"], None))]));
        let mut state = PaginationState::new(page(&["a"], Some("p2")));
        state.load_more(&fetcher).await.unwrap();
        assert_eq!(state.posts().len(), 2);
    }

    #[tokio::test]
    async fn test_failed_load_keeps_state() {
        let fetcher = Pages(HashMap::new());
        let mut state = PaginationState::new(page(&["a"], Some("p2")));

        let err = state.load_more(&fetcher).await.unwrap_err();
        assert!(matches!(err, PaginationError::Cms(_)));
        assert_eq!(state.posts().len(), 1);
        assert_eq!(state.next_page(), Some("p2"));
        assert!(matches!(state.status(), LoadStatus::Failed(_)));

        // The control stays usable after a failure
        assert_eq!(state.begin_load().unwrap(), "p2");
    }
}
