//! Presentation server
//!
//! Every request loads a fresh snapshot from the content API; nothing is
//! cached between requests.

use anyhow::Result;
use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::{Html, IntoResponse, Response},
    routing::get,
    Router,
};
use serde::Deserialize;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tower_http::trace::TraceLayer;

use crate::api::{ContentClient, FetchError};
use crate::content::Selection;
use crate::generator::Generator;
use crate::templates::SITE_CSS;
use crate::Blog;

/// Server state
pub struct ServerState {
    client: ContentClient,
    generator: Generator,
}

impl ServerState {
    pub fn new(blog: &Blog, shutdown: &CancellationToken) -> Result<Self> {
        Ok(Self {
            client: blog.client.clone().with_cancellation(shutdown.child_token()),
            generator: blog.generator()?,
        })
    }
}

/// Filter selections from the list view query string
#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    category: Option<String>,
    author: Option<String>,
}

/// Build the router, mounted under the configured site root
pub fn router(state: Arc<ServerState>, root: &str) -> Router {
    let routes = Router::new()
        .route("/", get(index_handler))
        .route("/post/:slug", get(post_handler))
        .route("/healthz", get(health_handler))
        .route("/assets/site.css", get(stylesheet_handler))
        .fallback(fallback_handler)
        .with_state(state);

    let root = root.trim_end_matches('/');
    let app = if root.is_empty() {
        routes
    } else {
        Router::new().nest(root, routes)
    };
    app.layer(TraceLayer::new_for_http())
}

/// Start the presentation server, stopping on Ctrl+C
pub async fn start(blog: &Blog, ip: &str, port: u16) -> Result<()> {
    let shutdown = CancellationToken::new();
    let state = Arc::new(ServerState::new(blog, &shutdown)?);
    let app = router(state, &blog.config.root);

    // Parse address - handle "localhost" specially
    let bind_ip = if ip == "localhost" { "127.0.0.1" } else { ip };
    let addr: SocketAddr = format!("{}:{}", bind_ip, port).parse()?;

    println!("Server running at http://{}:{}{}", ip, port, blog.config.root);
    println!("Reading content from {}", blog.client.base_url());
    println!("Press Ctrl+C to stop.");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    let signal = shutdown.clone();
    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!("Failed to listen for shutdown signal: {}", e);
            }
            tracing::info!("Shutting down");
            signal.cancel();
        })
        .await?;

    Ok(())
}

async fn index_handler(State(state): State<Arc<ServerState>>, Query(query): Query<ListQuery>) -> Response {
    let category = Selection::from_param(query.category.as_deref());
    let author = Selection::from_param(query.author.as_deref());

    match state.client.load_snapshot().await {
        Ok(snapshot) => page(
            StatusCode::OK,
            state.generator.index_page(&snapshot, category, author),
        ),
        Err(e) => fetch_failed(&state, e),
    }
}

async fn post_handler(State(state): State<Arc<ServerState>>, Path(slug): Path<String>) -> Response {
    match state.client.post_by_slug(&slug).await {
        Ok(Some(post)) => page(StatusCode::OK, state.generator.post_page(&post)),
        Ok(None) => {
            tracing::debug!("No post with slug {:?}", slug);
            page(StatusCode::NOT_FOUND, state.generator.not_found_page(Some(&slug)))
        }
        Err(e) => fetch_failed(&state, e),
    }
}

async fn health_handler() -> &'static str {
    "ok"
}

async fn stylesheet_handler() -> impl IntoResponse {
    ([(header::CONTENT_TYPE, "text/css; charset=utf-8")], SITE_CSS)
}

async fn fallback_handler(State(state): State<Arc<ServerState>>) -> Response {
    page(StatusCode::NOT_FOUND, state.generator.not_found_page(None))
}

fn fetch_failed(state: &ServerState, error: FetchError) -> Response {
    tracing::error!("{}", error);
    page(
        StatusCode::BAD_GATEWAY,
        state.generator.error_page(StatusCode::BAD_GATEWAY.as_u16(), &error.to_string()),
    )
}

fn page(status: StatusCode, html: Result<String>) -> Response {
    match html {
        Ok(html) => (status, Html(html)).into_response(),
        Err(e) => {
            tracing::error!("Template error: {:#}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Template error").into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SiteConfig;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use httpmock::prelude::*;
    use serde_json::json;
    use tower::ServiceExt;

    fn app(server: &MockServer, root: &str) -> Router {
        let mut config = SiteConfig::default().with_api_url(Some(server.base_url()));
        config.root = root.to_string();
        let blog = Blog::new(config).unwrap();
        let state = Arc::new(ServerState::new(&blog, &CancellationToken::new()).unwrap());
        router(state, root)
    }

    async fn get(app: Router, uri: &str) -> (StatusCode, String) {
        let response = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, String::from_utf8(body.to_vec()).unwrap())
    }

    async fn mock_index(server: &MockServer) {
        server
            .mock_async(|when, then| {
                when.method(GET).path("/api/posts").query_param("populate", "*");
                then.status(200).json_body(json!({
                    "data": [
                        { "id": 1, "title": "Alpha", "slug": "alpha",
                          "content": [{ "type": "paragraph", "children": [{ "type": "text", "text": "First body" }] }],
                          "author": { "id": 5, "name": "Asha" }, "categories": [{ "id": 1, "name": "UAV" }] },
                        { "id": 2, "title": "Beta", "slug": "beta", "content": [],
                          "author": null, "categories": [{ "id": 2, "name": "Flight" }] },
                        { "id": 3, "title": "Gamma", "slug": "gamma", "content": [],
                          "author": { "id": 5, "name": "Asha" }, "categories": [{ "id": 1, "name": "UAV" }, { "id": 2, "name": "Flight" }] }
                    ]
                }));
            })
            .await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/api/categories");
                then.status(200)
                    .json_body(json!({ "data": [{ "id": 1, "name": "UAV" }, { "id": 2, "name": "Flight" }] }));
            })
            .await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/api/authors");
                then.status(200).json_body(json!({ "data": [{ "id": 5, "name": "Asha" }] }));
            })
            .await;
    }

    #[tokio::test]
    async fn test_index_lists_all_posts() {
        let server = MockServer::start_async().await;
        mock_index(&server).await;

        let (status, body) = get(app(&server, "/"), "/").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("Alpha"));
        assert!(body.contains("Beta"));
        assert!(body.contains("Gamma"));
        assert!(body.contains("First body"));
        assert!(body.contains("By Unknown"));
    }

    #[tokio::test]
    async fn test_index_filters() {
        let server = MockServer::start_async().await;
        mock_index(&server).await;

        let (status, body) = get(app(&server, "/"), "/?category=2&author=all").await;
        assert_eq!(status, StatusCode::OK);
        assert!(!body.contains("Alpha"));
        assert!(body.contains("Beta"));
        assert!(body.contains("Gamma"));

        let (_, body) = get(app(&server, "/"), "/?category=2&author=5").await;
        assert!(!body.contains("Beta"));
        assert!(body.contains("Gamma"));

        let (_, body) = get(app(&server, "/"), "/?category=99").await;
        assert!(body.contains("No posts found matching the current filters."));
    }

    #[tokio::test]
    async fn test_post_detail_and_not_found() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/api/posts")
                    .query_param("filters[slug][$eq]", "alpha");
                then.status(200).json_body(json!({ "data": [{
                    "id": 1, "title": "Alpha", "slug": "alpha",
                    "content": [
                        { "type": "heading", "level": 2, "children": [{ "type": "text", "text": "Intro" }] },
                        { "type": "carousel" }
                    ]
                }]}));
            })
            .await;
        server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/api/posts")
                    .query_param("filters[slug][$eq]", "nope");
                then.status(200).json_body(json!({ "data": [] }));
            })
            .await;

        let (status, body) = get(app(&server, "/"), "/post/alpha").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("<h2 class=\"heading-section\">Intro</h2>"));
        assert!(body.contains("[Unsupported block: carousel]"));

        let (status, body) = get(app(&server, "/"), "/post/nope").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(body.contains("404"));
    }

    #[tokio::test]
    async fn test_fetch_failure_is_bad_gateway() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/api/posts");
                then.status(500);
            })
            .await;

        let (status, body) = get(app(&server, "/"), "/").await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert!(body.contains("Content unavailable"));
        assert!(body.contains("Failed to fetch posts?populate=*"));
    }

    #[tokio::test]
    async fn test_static_routes() {
        let server = MockServer::start_async().await;

        let (status, body) = get(app(&server, "/"), "/healthz").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "ok");

        let (status, body) = get(app(&server, "/"), "/assets/site.css").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains(".post-card"));

        let (status, _) = get(app(&server, "/"), "/no/such/page").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_nested_root() {
        let server = MockServer::start_async().await;
        let (status, _) = get(app(&server, "/blog/"), "/blog/healthz").await;
        assert_eq!(status, StatusCode::OK);
    }
}
