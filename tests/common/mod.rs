//! In-process stand-in for a Prismic repository

#![allow(dead_code)]

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::get,
    Router,
};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use spacetraveling::config::{CmsConfig, SiteConfig};
use spacetraveling::Blog;

const MASTER_REF: &str = "YE-master";

struct FakeState {
    base: String,
    posts: Vec<Value>,
    broken: AtomicBool,
    searches: AtomicUsize,
}

/// A running fake content API
pub struct FakeCms {
    state: Arc<FakeState>,
}

impl FakeCms {
    /// Start a fake repository holding `posts` on an ephemeral port
    pub async fn start(posts: Vec<Value>) -> Self {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base = format!("http://{}", listener.local_addr().unwrap());

        let state = Arc::new(FakeState {
            base,
            posts,
            broken: AtomicBool::new(false),
            searches: AtomicUsize::new(0),
        });

        let app = Router::new()
            .route("/api/v2", get(api_info))
            .route("/api/v2/documents/search", get(search))
            .route("/garbled/api/v2", get(|| async { "<html>not json</html>" }))
            .with_state(state.clone());

        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { state }
    }

    /// Start with the default three posts
    pub async fn start_default() -> Self {
        Self::start(default_posts()).await
    }

    pub fn base(&self) -> &str {
        &self.state.base
    }

    pub fn endpoint(&self) -> String {
        format!("{}/api/v2", self.state.base)
    }

    pub fn cms_config(&self) -> CmsConfig {
        CmsConfig {
            endpoint: self.endpoint(),
            access_token: None,
            document_type: "prismicdesafio".to_string(),
        }
    }

    /// Make every search answer 500 from now on
    pub fn break_api(&self) {
        self.state.broken.store(true, Ordering::SeqCst);
    }

    pub fn search_count(&self) -> usize {
        self.state.searches.load(Ordering::SeqCst)
    }

    /// A blog in `dir` reading from this repository
    pub fn blog(&self, dir: &Path, configure: impl FnOnce(&mut SiteConfig)) -> Blog {
        let mut config = SiteConfig {
            cms: self.cms_config(),
            ..SiteConfig::default()
        };
        configure(&mut config);
        Blog::with_config(dir, config).unwrap()
    }
}

async fn api_info() -> Json<Value> {
    Json(json!({
        "refs": [
            { "id": "release", "ref": "YE-release", "label": "Next", "isMasterRef": false },
            { "id": "master", "ref": MASTER_REF, "label": "Master", "isMasterRef": true }
        ],
        "types": { "prismicdesafio": "Post" }
    }))
}

async fn search(
    State(state): State<Arc<FakeState>>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    state.searches.fetch_add(1, Ordering::SeqCst);

    if state.broken.load(Ordering::SeqCst) {
        return (StatusCode::INTERNAL_SERVER_ERROR, "boom").into_response();
    }
    if params.get("ref").map(String::as_str) != Some(MASTER_REF) {
        return (StatusCode::BAD_REQUEST, "missing ref").into_response();
    }

    let q = params.get("q").cloned().unwrap_or_default();
    if let Some(uid) = q
        .split(".uid,\"")
        .nth(1)
        .and_then(|rest| rest.split('"').next())
    {
        let results: Vec<Value> = state
            .posts
            .iter()
            .filter(|post| post["uid"] == uid)
            .cloned()
            .collect();
        return Json(json!({
            "page": 1,
            "results_per_page": 1,
            "total_results_size": results.len(),
            "next_page": null,
            "results": results
        }))
        .into_response();
    }

    let page: usize = params.get("page").and_then(|p| p.parse().ok()).unwrap_or(1);
    let size: usize = params
        .get("pageSize")
        .and_then(|p| p.parse().ok())
        .unwrap_or(20);
    let start = (page - 1) * size;
    let results: Vec<Value> = state.posts.iter().skip(start).take(size).cloned().collect();
    let next_page = (start + size < state.posts.len()).then(|| {
        format!(
            "{}/api/v2/documents/search?ref={}&page={}&pageSize={}",
            state.base,
            MASTER_REF,
            page + 1,
            size
        )
    });

    Json(json!({
        "page": page,
        "results_per_page": size,
        "total_results_size": state.posts.len(),
        "next_page": next_page,
        "results": results
    }))
    .into_response()
}

/// A post document as the search API returns it
pub fn post_document(uid: &str, date: Option<&str>, title: &str, author: &str) -> Value {
    json!({
        "id": format!("id-{}", uid),
        "uid": uid,
        "type": "prismicdesafio",
        "first_publication_date": date,
        "last_publication_date": date,
        "data": {
            "title": title,
            "subtitle": format!("Subtítulo de {}", title),
            "author": author,
            "banner": { "url": format!("https://images.prismic.io/{}.png", uid), "alt": null },
            "content": [{
                "heading": "Proin et varius",
                "body": [
                    { "type": "paragraph", "text": "Lorem ipsum dolor sit amet", "spans": [
                        { "start": 0, "end": 5, "type": "strong" }
                    ] },
                    { "type": "list-item", "text": "Nullam dolor", "spans": [] }
                ]
            }]
        }
    })
}

pub fn default_posts() -> Vec<Value> {
    vec![
        post_document(
            "como-utilizar-hooks",
            Some("2021-03-15T19:25:28+0000"),
            "Como utilizar Hooks",
            "Joseph Oliveira",
        ),
        post_document(
            "criando-um-app-cra-do-zero",
            Some("2021-03-25T19:27:35+0000"),
            "Criando um app CRA do zero",
            "Danilo Vieira",
        ),
        post_document("rascunho", None, "Rascunho", "Anônimo"),
    ]
}
