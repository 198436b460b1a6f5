//! HTTP server rendering pages on demand
//!
//! Post pages pre-rendered by `generate` are served while they are younger
//! than `revalidate` seconds; older ones are regenerated from the CMS and
//! written back. Slugs that were never pre-rendered get the fallback shell
//! when `fallback` is on, or are resolved before answering when it is off.

use anyhow::Result;
use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::{Html, IntoResponse, Json, Response},
    routing::get,
    Router,
};
use serde::Deserialize;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::helpers::{is_valid_slug, load_more_url};
use crate::templates::{PostState, TemplateRenderer};
use crate::Blog;

/// Server state
struct AppState {
    blog: Blog,
    renderer: TemplateRenderer,
}

/// Query of the load-more endpoint
#[derive(Debug, Deserialize)]
struct LoadMoreParams {
    cursor: String,
}

/// Build the application router
pub fn router(blog: &Blog) -> Result<Router> {
    let state = Arc::new(AppState {
        blog: blog.clone(),
        renderer: blog.renderer()?,
    });

    Ok(Router::new()
        .route("/", get(index_handler))
        .route("/api/posts", get(load_more_handler))
        .route("/post/:slug", get(post_handler))
        .route("/post/:slug/content", get(post_content_handler))
        .fallback_service(ServeDir::new(&blog.public_dir))
        .layer(TraceLayer::new_for_http())
        .with_state(state))
}

/// Start the server
pub async fn start(blog: &Blog, ip: &str, port: u16) -> Result<()> {
    let app = router(blog)?;

    // Parse address - handle "localhost" specially
    let bind_ip = if ip == "localhost" { "127.0.0.1" } else { ip };
    let addr: SocketAddr = format!("{}:{}", bind_ip, port).parse()?;

    println!("Server running at http://{}:{}", ip, port);
    println!("Press Ctrl+C to stop.");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for Ctrl+C: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutting down");
}

/// Listing page with the first page of posts
async fn index_handler(State(state): State<Arc<AppState>>) -> Response {
    let config = &state.blog.config;
    match state.blog.cms.query_posts(config.per_page).await {
        Ok(first) => {
            let next = first
                .next_page
                .as_deref()
                .map(|cursor| load_more_url(config, cursor));
            html_response(
                StatusCode::OK,
                state.renderer.render_listing(&first.results, next.as_deref()),
            )
        }
        Err(e) => {
            tracing::error!("Failed to query posts: {}", e);
            html_response(
                StatusCode::BAD_GATEWAY,
                state.renderer.render_error(&state.renderer.t("listing_error")),
            )
        }
    }
}

/// Follow a CMS continuation URL for the load-more control
async fn load_more_handler(
    State(state): State<Arc<AppState>>,
    Query(params): Query<LoadMoreParams>,
) -> Response {
    if !state.blog.cms.owns_url(&params.cursor) {
        tracing::warn!("Rejected foreign cursor {:?}", params.cursor);
        return (
            StatusCode::BAD_REQUEST,
            Json(serde_json::json!({ "error": "cursor does not belong to the content API" })),
        )
            .into_response();
    }

    match state.blog.cms.fetch_page(&params.cursor).await {
        Ok(page) => {
            let next = page
                .next_page
                .as_deref()
                .map(|cursor| load_more_url(&state.blog.config, cursor));
            Json(state.renderer.load_more_response(&page.results, next)).into_response()
        }
        Err(e) => {
            tracing::error!("Failed to load more posts: {}", e);
            (
                StatusCode::BAD_GATEWAY,
                Json(serde_json::json!({ "error": e.to_string() })),
            )
                .into_response()
        }
    }
}

/// Full post page
async fn post_handler(State(state): State<Arc<AppState>>, Path(slug): Path<String>) -> Response {
    if !is_valid_slug(&slug) {
        return not_found_page(&state, &slug);
    }

    let path = state.blog.post_output_path(&slug);
    let revalidate = Duration::from_secs(state.blog.config.revalidate);

    match prerendered_age(&path).await {
        Some(age) if age < revalidate => match tokio::fs::read_to_string(&path).await {
            Ok(html) => cached_html(&state, html),
            Err(e) => {
                tracing::warn!("Failed to read {:?}: {}", path, e);
                respond_resolved(&state, state.blog.resolve_post(&slug).await, true).await
            }
        },
        Some(_) => {
            tracing::debug!("Regenerating stale post {}", slug);
            match state.blog.resolve_post(&slug).await {
                PostState::Error { message, .. } => {
                    tracing::warn!("Serving stale {} after error: {}", slug, message);
                    match tokio::fs::read_to_string(&path).await {
                        Ok(html) => cached_html(&state, html),
                        Err(_) => error_page(&state, &slug, message),
                    }
                }
                PostState::NotFound { .. } => {
                    if let Err(e) = tokio::fs::remove_file(&path).await {
                        tracing::warn!("Failed to remove {:?}: {}", path, e);
                    }
                    not_found_page(&state, &slug)
                }
                outcome => respond_resolved(&state, outcome, true).await,
            }
        }
        None if state.blog.config.fallback => (
            [(header::CACHE_CONTROL, "no-store")],
            html_response(
                StatusCode::OK,
                state.renderer.render_post(&PostState::Loading { slug }),
            ),
        )
            .into_response(),
        None => respond_resolved(&state, state.blog.resolve_post(&slug).await, true).await,
    }
}

/// Post content fragment requested by the fallback shell
async fn post_content_handler(
    State(state): State<Arc<AppState>>,
    Path(slug): Path<String>,
) -> Response {
    if !is_valid_slug(&slug) {
        return html_response(
            StatusCode::NOT_FOUND,
            state
                .renderer
                .render_post_content(&PostState::NotFound { slug }),
        );
    }

    respond_resolved(&state, state.blog.resolve_post(&slug).await, false).await
}

/// Answer with a resolved post; `full` picks the whole page over the fragment.
///
/// A ready post is also written to the public directory so later requests
/// are served pre-rendered.
async fn respond_resolved(state: &AppState, outcome: PostState, full: bool) -> Response {
    let status = match &outcome {
        PostState::Ready(_) | PostState::Loading { .. } => StatusCode::OK,
        PostState::NotFound { .. } => StatusCode::NOT_FOUND,
        PostState::Error { .. } => StatusCode::BAD_GATEWAY,
    };

    if let PostState::Ready(post) = &outcome {
        let page = match state.renderer.render_post(&outcome) {
            Ok(page) => page,
            Err(e) => return render_failed(e),
        };
        store_page(state, &post.slug, &page).await;

        let body = if full {
            page
        } else {
            match state.renderer.render_post_content(&outcome) {
                Ok(fragment) => fragment,
                Err(e) => return render_failed(e),
            }
        };
        return cached_html(state, body);
    }

    let rendered = if full {
        state.renderer.render_post(&outcome)
    } else {
        state.renderer.render_post_content(&outcome)
    };
    html_response(status, rendered)
}

fn not_found_page(state: &AppState, slug: &str) -> Response {
    html_response(
        StatusCode::NOT_FOUND,
        state.renderer.render_post(&PostState::NotFound {
            slug: slug.to_string(),
        }),
    )
}

fn error_page(state: &AppState, slug: &str, message: String) -> Response {
    html_response(
        StatusCode::BAD_GATEWAY,
        state.renderer.render_post(&PostState::Error {
            slug: slug.to_string(),
            message,
        }),
    )
}

/// A page that shared caches may keep for `revalidate` seconds
fn cached_html(state: &AppState, html: String) -> Response {
    let cache_control = format!(
        "public, s-maxage={}, stale-while-revalidate",
        state.blog.config.revalidate
    );
    ([(header::CACHE_CONTROL, cache_control)], Html(html)).into_response()
}

fn html_response(status: StatusCode, rendered: Result<String>) -> Response {
    match rendered {
        Ok(html) => (status, Html(html)).into_response(),
        Err(e) => render_failed(e),
    }
}

fn render_failed(e: anyhow::Error) -> Response {
    tracing::error!("Template rendering failed: {:#}", e);
    (StatusCode::INTERNAL_SERVER_ERROR, "Server error").into_response()
}

/// Age of a pre-rendered page, `None` when there is none
async fn prerendered_age(path: &std::path::Path) -> Option<Duration> {
    let modified = tokio::fs::metadata(path).await.ok()?.modified().ok()?;
    Some(modified.elapsed().unwrap_or_default())
}

async fn store_page(state: &AppState, slug: &str, html: &str) {
    let path = state.blog.post_output_path(slug);
    match write_atomically(&path, html).await {
        Ok(()) => tracing::debug!("Stored post: {:?}", path),
        Err(e) => tracing::warn!("Failed to store {:?}: {}", path, e),
    }
}

static TEMP_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Write through a temporary sibling file renamed into place, so readers
/// only ever see the old page or the complete new one
async fn write_atomically(path: &std::path::Path, content: &str) -> std::io::Result<()> {
    let parent = path.parent().unwrap_or_else(|| std::path::Path::new("."));
    tokio::fs::create_dir_all(parent).await?;

    let file_name = path
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or("page");
    let temp = parent.join(format!(
        ".{}.{}.{}.tmp",
        file_name,
        std::process::id(),
        TEMP_COUNTER.fetch_add(1, Ordering::Relaxed)
    ));

    let result = match tokio::fs::write(&temp, content).await {
        Ok(()) => tokio::fs::rename(&temp, path).await,
        Err(e) => Err(e),
    };
    if result.is_err() {
        let _ = tokio::fs::remove_file(&temp).await;
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_write_atomically_leaves_no_temp_files() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("post/como-utilizar-hooks/index.html");

        write_atomically(&path, "<html>um</html>").await.unwrap();
        write_atomically(&path, "<html>dois</html>").await.unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "<html>dois</html>");
        let entries: Vec<_> = std::fs::read_dir(path.parent().unwrap())
            .unwrap()
            .map(|entry| entry.unwrap().file_name())
            .collect();
        assert_eq!(entries, ["index.html"]);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_readers_never_see_partial_pages() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("index.html");
        let pages: Vec<String> = (0..16)
            .map(|i| format!("<html>{}</html>", i.to_string().repeat(20_000)))
            .collect();
        write_atomically(&path, &pages[0]).await.unwrap();

        let mut tasks = tokio::task::JoinSet::new();
        for page in pages.clone() {
            let path = path.clone();
            tasks.spawn(async move {
                write_atomically(&path, &page).await.unwrap();
                None
            });
        }
        for _ in 0..64 {
            let path = path.clone();
            tasks.spawn(async move { Some(tokio::fs::read_to_string(&path).await.unwrap()) });
        }

        while let Some(result) = tasks.join_next().await {
            if let Some(body) = result.unwrap() {
                assert!(pages.contains(&body), "partial read of {} bytes", body.len());
            }
        }
    }
}
