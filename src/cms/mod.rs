//! Prismic content API access
//!
//! The client talks to the REST API v2 of a Prismic repository: it resolves
//! the master ref, runs document searches and follows the opaque
//! `next_page` continuation URLs. Every payload is decoded into the typed
//! post models of [`crate::content`]; missing or mistyped fields fail with
//! [`CmsError::Decode`] or [`CmsError::InvalidDocument`].

mod client;
mod document;

pub use client::CmsClient;

use thiserror::Error;

/// Errors returned by the content API
#[derive(Debug, Error)]
pub enum CmsError {
    #[error("request to {url} failed: {source}")]
    Http {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{url} answered {status}")]
    Status {
        url: String,
        status: reqwest::StatusCode,
    },

    #[error("unexpected response from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid URL {url}: {source}")]
    Url {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("the API at {0} has no master ref")]
    NoMasterRef(String),

    #[error("document {document}: {reason}")]
    InvalidDocument { document: String, reason: String },
}
