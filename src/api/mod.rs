//! Content API client
//!
//! Read-only access to the headless CMS REST API. Every request is a single
//! GET against `{base_url}/api/{endpoint}` returning a `{ "data": [..] }`
//! envelope. Failures of any sort surface as [`FetchError`]; there are no
//! retries.

mod error;

pub use error::{FetchError, FetchErrorKind};

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use reqwest::Client;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use url::Url;

use crate::content::{Author, BlogSnapshot, Category, Collection, Post};

/// Characters left as-is when a slug goes into a query string
const SLUG_SAFE: &AsciiSet = &NON_ALPHANUMERIC.remove(b'-').remove(b'_').remove(b'.').remove(b'~');

/// Default origin of the content API
pub const DEFAULT_API_URL: &str = "http://localhost:1337";

/// HTTP client for the content API
#[derive(Clone, Debug)]
pub struct ContentClient {
    client: Client,
    base_url: Url,
    timeout: Duration,
    cancel: CancellationToken,
}

impl ContentClient {
    /// Create a client for the API at `base_url`
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, FetchError> {
        let base_url = Url::parse(base_url.trim_end_matches('/'))
            .map_err(|e| FetchError::new("", FetchErrorKind::Transport, format!("invalid API URL {:?}: {}", base_url, e)))?;
        let client = Client::builder()
            .user_agent(Self::user_agent())
            .build()
            .map_err(|e| FetchError::from_reqwest("", e))?;
        Ok(Self {
            client,
            base_url,
            timeout,
            cancel: CancellationToken::new(),
        })
    }

    /// Tie every request made through this client to `cancel`
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// User agent sent with every request
    pub fn user_agent() -> &'static str {
        concat!("headless-blog/", env!("CARGO_PKG_VERSION"))
    }

    /// Origin of the content API, used to resolve relative media URLs
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Full request URL for an endpoint path
    pub fn endpoint_url(&self, endpoint: &str) -> String {
        format!(
            "{}/api/{}",
            self.base_url.as_str().trim_end_matches('/'),
            endpoint.trim_start_matches('/')
        )
    }

    /// Fetch a collection endpoint
    pub async fn fetch<T: DeserializeOwned>(&self, endpoint: &str) -> Result<Collection<T>, FetchError> {
        self.fetch_with_cancel(endpoint, &self.cancel).await
    }

    /// Fetch a collection endpoint, giving up early if `cancel` fires
    pub async fn fetch_with_cancel<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        cancel: &CancellationToken,
    ) -> Result<Collection<T>, FetchError> {
        let url = self.endpoint_url(endpoint);
        tracing::debug!("GET {}", url);

        let request = self.get(endpoint, &url);
        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::debug!("Request cancelled: {}", endpoint);
                Err(FetchError::new(endpoint, FetchErrorKind::Cancelled, "request cancelled"))
            }
            result = tokio::time::timeout(self.timeout, request) => match result {
                Ok(result) => result,
                Err(_) => Err(FetchError::new(
                    endpoint,
                    FetchErrorKind::Timeout,
                    format!("no response after {:?}", self.timeout),
                )),
            },
        }
    }

    async fn get<T: DeserializeOwned>(&self, endpoint: &str, url: &str) -> Result<Collection<T>, FetchError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| FetchError::from_reqwest(endpoint, e))?;

        let status = response.status();
        let bytes = response
            .bytes()
            .await
            .map_err(|e| FetchError::from_reqwest(endpoint, e))?;

        if !status.is_success() {
            let reason = status.canonical_reason().unwrap_or("Unknown status");
            tracing::warn!("{} returned {}", url, status);
            return Err(FetchError::new(endpoint, FetchErrorKind::Status, reason).with_status(status.as_u16()));
        }

        serde_json::from_slice(&bytes).map_err(|e| {
            FetchError::new(endpoint, FetchErrorKind::Decode, e.to_string()).with_status(status.as_u16())
        })
    }

    /// All posts with their relations populated
    pub async fn posts(&self) -> Result<Vec<Post>, FetchError> {
        Ok(self.fetch::<Post>("posts?populate=*").await?.into_inner())
    }

    /// The post with the given slug, or `None` when there is no such post
    pub async fn post_by_slug(&self, slug: &str) -> Result<Option<Post>, FetchError> {
        let endpoint = format!(
            "posts?filters[slug][$eq]={}&populate=*",
            utf8_percent_encode(slug, SLUG_SAFE)
        );
        let posts = self.fetch::<Post>(&endpoint).await?.into_inner();
        if posts.len() > 1 {
            tracing::warn!("{} posts share slug {:?}, using the first", posts.len(), slug);
        }
        Ok(posts.into_iter().next())
    }

    /// Every category, in API order
    pub async fn categories(&self) -> Result<Vec<Category>, FetchError> {
        Ok(self.fetch::<Category>("categories").await?.into_inner())
    }

    /// Every author, in API order
    pub async fn authors(&self) -> Result<Vec<Author>, FetchError> {
        Ok(self.fetch::<Author>("authors").await?.into_inner())
    }

    /// Fetch posts, categories and authors concurrently
    ///
    /// Only a posts failure is fatal. A facet endpoint that fails is left as
    /// `None` so the filter options can be derived from the posts instead.
    pub async fn load_snapshot(&self) -> Result<BlogSnapshot, FetchError> {
        let (posts, categories, authors) = tokio::join!(self.posts(), self.categories(), self.authors());

        let posts = posts?;
        let categories = categories
            .map_err(|e| tracing::warn!("Category facets unavailable: {}", e))
            .ok();
        let authors = authors
            .map_err(|e| tracing::warn!("Author facets unavailable: {}", e))
            .ok();

        tracing::debug!("Loaded {} posts", posts.len());
        Ok(BlogSnapshot {
            posts,
            categories,
            authors,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use serde_json::json;

    fn client(server: &MockServer) -> ContentClient {
        ContentClient::new(&server.base_url(), Duration::from_secs(5)).unwrap()
    }

    fn posts_body() -> serde_json::Value {
        json!({
            "data": [
                {
                    "id": 1,
                    "title": "First flight",
                    "slug": "first-flight",
                    "content": [],
                    "author": { "id": 5, "name": "A" },
                    "categories": [{ "id": 10, "name": "UAV" }]
                },
                {
                    "id": 2,
                    "title": "Second",
                    "slug": "second",
                    "content": [],
                    "author": null,
                    "categories": [{ "id": 11, "name": "Flight" }]
                }
            ],
            "meta": { "pagination": { "page": 1, "pageSize": 25, "pageCount": 1, "total": 2 } }
        })
    }

    #[test]
    fn test_endpoint_url() {
        let client = ContentClient::new("http://cms.local:1337/", Duration::from_secs(1)).unwrap();
        assert_eq!(
            client.endpoint_url("posts?populate=*"),
            "http://cms.local:1337/api/posts?populate=*"
        );
    }

    #[test]
    fn test_invalid_base_url() {
        let err = ContentClient::new("not a url", Duration::from_secs(1)).unwrap_err();
        assert_eq!(err.kind, FetchErrorKind::Transport);
    }

    #[tokio::test]
    async fn test_fetch_posts() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(GET).path("/api/posts").query_param("populate", "*");
                then.status(200).json_body(posts_body());
            })
            .await;

        let posts = client(&server).posts().await.unwrap();
        mock.assert_async().await;
        assert_eq!(posts.len(), 2);
        assert_eq!(posts[0].slug, "first-flight");
        assert!(posts[1].author.is_none());
    }

    #[tokio::test]
    async fn test_post_by_slug() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/api/posts")
                    .query_param("filters[slug][$eq]", "first-flight")
                    .query_param("populate", "*");
                then.status(200).json_body(json!({ "data": [posts_body()["data"][0]] }));
            })
            .await;
        server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/api/posts")
                    .query_param("filters[slug][$eq]", "missing");
                then.status(200).json_body(json!({ "data": [] }));
            })
            .await;

        let client = client(&server);
        let post = client.post_by_slug("first-flight").await.unwrap();
        assert_eq!(post.map(|p| p.id), Some(1));

        // zero records is not-found, not an error
        let missing = client.post_by_slug("missing").await.unwrap();
        assert!(missing.is_none());
    }

    #[tokio::test]
    async fn test_status_error() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/api/categories");
                then.status(500).body("boom");
            })
            .await;

        let err = client(&server).categories().await.unwrap_err();
        assert_eq!(err.kind, FetchErrorKind::Status);
        assert_eq!(err.status, Some(500));
        assert_eq!(err.endpoint, "categories");
    }

    #[tokio::test]
    async fn test_decode_error() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/api/authors");
                then.status(200).body("<html>not json</html>");
            })
            .await;

        let err = client(&server).authors().await.unwrap_err();
        assert_eq!(err.kind, FetchErrorKind::Decode);
    }

    #[tokio::test]
    async fn test_timeout() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/api/authors");
                then.status(200)
                    .delay(Duration::from_millis(500))
                    .json_body(json!({ "data": [] }));
            })
            .await;

        let client = ContentClient::new(&server.base_url(), Duration::from_millis(50)).unwrap();
        let err = client.authors().await.unwrap_err();
        assert!(err.is_timeout());
        assert_eq!(err.status, None);
    }

    #[tokio::test]
    async fn test_cancelled() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/api/posts");
                then.status(200)
                    .delay(Duration::from_millis(500))
                    .json_body(json!({ "data": [] }));
            })
            .await;

        let cancel = CancellationToken::new();
        cancel.cancel();
        let err = client(&server)
            .fetch_with_cancel::<Post>("posts", &cancel)
            .await
            .unwrap_err();
        assert_eq!(err.kind, FetchErrorKind::Cancelled);
    }

    #[tokio::test]
    async fn test_client_cancellation() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/api/categories");
                then.status(200)
                    .delay(Duration::from_millis(500))
                    .json_body(json!({ "data": [] }));
            })
            .await;

        let cancel = CancellationToken::new();
        let client = client(&server).with_cancellation(cancel.child_token());
        let request = tokio::spawn(async move { client.categories().await });
        tokio::time::sleep(Duration::from_millis(50)).await;
        cancel.cancel();

        let err = request.await.unwrap().unwrap_err();
        assert_eq!(err.kind, FetchErrorKind::Cancelled);
    }

    #[tokio::test]
    async fn test_transport_error() {
        // nothing listens on this port
        let client = ContentClient::new("http://127.0.0.1:1", Duration::from_secs(2)).unwrap();
        let err = client.posts().await.unwrap_err();
        assert_eq!(err.kind, FetchErrorKind::Transport);
        assert_eq!(err.status, None);
    }

    #[tokio::test]
    async fn test_load_snapshot() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/api/posts");
                then.status(200).json_body(posts_body());
            })
            .await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/api/categories");
                then.status(200)
                    .json_body(json!({ "data": [{ "id": 11, "name": "Flight" }, { "id": 10, "name": "UAV" }] }));
            })
            .await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/api/authors");
                then.status(503);
            })
            .await;

        let snapshot = client(&server).load_snapshot().await.unwrap();
        assert_eq!(snapshot.posts.len(), 2);
        assert_eq!(snapshot.categories.as_ref().map(Vec::len), Some(2));
        assert!(snapshot.authors.is_none());

        let facets = snapshot.facets();
        assert_eq!(facets.categories[0].name, "Flight");
        assert_eq!(facets.authors.len(), 1);
    }

    #[tokio::test]
    async fn test_load_snapshot_fails_without_posts() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/api/posts");
                then.status(404);
            })
            .await;

        let err = client(&server).load_snapshot().await.unwrap_err();
        assert_eq!(err.status, Some(404));
    }
}
