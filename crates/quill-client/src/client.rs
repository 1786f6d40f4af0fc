//! Main client implementation.

use std::sync::Arc;
use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use reqwest::{Method, RequestBuilder};
use tracing::trace;
use url::Url;

use crate::api::{AuthApi, PostsApi, UsersApi};
use crate::error::{error_message, Envelope, Error, Result};

/// Default timeout for requests.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Quill blog API client.
///
/// Cheap to clone; clones share one connection pool. A clone produced by
/// [`QuillClient::with_bearer`] attaches the token to every request it sends.
///
/// # Example
///
/// ```no_run
/// use quill_client::QuillClient;
///
/// # async fn example() -> quill_client::Result<()> {
/// let client = QuillClient::builder()
///     .base_url("http://localhost:5000")
///     .build()?;
///
/// let post = client.posts().get(0, 1).await?;
/// println!("{}", post.title);
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct QuillClient {
    inner: Arc<ClientInner>,
    bearer: Option<Arc<str>>,
}

/// Inner client state (shared across clones).
struct ClientInner {
    http: reqwest::Client,
    base_url: Url,
    timeout: Duration,
}

impl std::fmt::Debug for QuillClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QuillClient")
            .field("base_url", &self.inner.base_url.as_str())
            .field("authenticated", &self.bearer.is_some())
            .finish()
    }
}

impl QuillClient {
    /// Create a new client builder.
    pub fn builder() -> ClientBuilder {
        ClientBuilder::new()
    }

    /// Get the base URL.
    pub fn base_url(&self) -> &Url {
        &self.inner.base_url
    }

    /// Return a clone that sends `Authorization: Bearer <token>`.
    pub fn with_bearer(&self, token: impl AsRef<str>) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
            bearer: Some(Arc::from(token.as_ref())),
        }
    }

    /// Return a clone without a bearer token.
    pub fn anonymous(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
            bearer: None,
        }
    }

    /// Whether requests from this handle carry a bearer token.
    pub fn is_authenticated(&self) -> bool {
        self.bearer.is_some()
    }

    // ─────────────────────────────────────────────────────────────────────────
    // API accessors
    // ─────────────────────────────────────────────────────────────────────────

    /// Access the token (login) API.
    pub fn auth(&self) -> AuthApi {
        AuthApi::new(self.clone())
    }

    /// Access the posts API.
    pub fn posts(&self) -> PostsApi {
        PostsApi::new(self.clone())
    }

    /// Access the users API.
    pub fn users(&self) -> UsersApi {
        UsersApi::new(self.clone())
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Internal HTTP methods
    // ─────────────────────────────────────────────────────────────────────────

    /// Build a URL for an API path.
    pub(crate) fn url(&self, path: &str) -> Result<Url> {
        let path = path.trim_start_matches('/');
        self.inner
            .base_url
            .join(&format!("api/{}", path))
            .map_err(Error::from)
    }

    fn request(&self, method: Method, path: &str) -> Result<RequestBuilder> {
        let url = self.url(path)?;
        trace!(%method, %url, authenticated = self.bearer.is_some(), "Sending request");
        let mut builder = self
            .inner
            .http
            .request(method, url)
            .timeout(self.inner.timeout);
        if let Some(token) = &self.bearer {
            builder = builder.bearer_auth(token);
        }
        Ok(builder)
    }

    /// Make a GET request.
    pub(crate) async fn get<T: serde::de::DeserializeOwned>(&self, path: &str) -> Result<T> {
        let response = self.request(Method::GET, path)?.send().await?;
        Self::handle_response(response).await
    }

    /// Make a GET request with query parameters.
    pub(crate) async fn get_with_query<T, Q>(&self, path: &str, query: &Q) -> Result<T>
    where
        T: serde::de::DeserializeOwned,
        Q: serde::Serialize + ?Sized,
    {
        let response = self.request(Method::GET, path)?.query(query).send().await?;
        Self::handle_response(response).await
    }

    /// Make a POST request.
    pub(crate) async fn post<T, B>(&self, path: &str, body: &B) -> Result<T>
    where
        T: serde::de::DeserializeOwned,
        B: serde::Serialize + ?Sized,
    {
        let response = self.request(Method::POST, path)?.json(body).send().await?;
        Self::handle_response(response).await
    }

    /// Unwrap the `{result}` / `{error}` envelope.
    ///
    /// The body decides the outcome; the status code is only consulted when
    /// the body is not an envelope at all.
    async fn handle_response<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T> {
        let status = response.status();
        let body = response.bytes().await?;

        match serde_json::from_slice::<Envelope<T>>(&body) {
            Ok(Envelope {
                result: Some(value),
                ..
            }) => Ok(value),
            Ok(Envelope {
                error: Some(err), ..
            }) => Err(Error::Api {
                status: status.as_u16(),
                message: error_message(&err),
            }),
            Ok(_) if status.is_success() => Err(Error::Malformed(
                "response carries neither result nor error".to_string(),
            )),
            Err(e) if status.is_success() => Err(Error::Json(e)),
            _ => Err(Error::Api {
                status: status.as_u16(),
                message: format!("HTTP {}", status.as_u16()),
            }),
        }
    }
}

/// Builder for creating a [`QuillClient`].
#[derive(Debug)]
pub struct ClientBuilder {
    base_url: Option<String>,
    auth_token: Option<String>,
    timeout: Duration,
    user_agent: Option<String>,
}

impl ClientBuilder {
    /// Create a new builder with defaults.
    pub fn new() -> Self {
        Self {
            base_url: None,
            auth_token: None,
            timeout: DEFAULT_TIMEOUT,
            user_agent: None,
        }
    }

    /// Set the base URL for the server.
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Set an initial bearer token.
    pub fn auth_token(mut self, token: impl Into<String>) -> Self {
        self.auth_token = Some(token.into());
        self
    }

    /// Set the request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set a custom user agent.
    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = Some(agent.into());
        self
    }

    /// Build the client.
    pub fn build(self) -> Result<QuillClient> {
        let base_url = self
            .base_url
            .ok_or_else(|| Error::Config("base_url is required".to_string()))?;

        // Parse and normalize base URL
        let mut base_url = Url::parse(&base_url)?;
        if !base_url.path().ends_with('/') {
            base_url.set_path(&format!("{}/", base_url.path()));
        }

        if let Some(token) = &self.auth_token
            && HeaderValue::from_str(&format!("Bearer {}", token)).is_err()
        {
            return Err(Error::Config("Invalid auth token".to_string()));
        }

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let user_agent = self
            .user_agent
            .unwrap_or_else(|| format!("quill-client/{}", env!("CARGO_PKG_VERSION")));

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .user_agent(user_agent)
            .build()?;

        Ok(QuillClient {
            inner: Arc::new(ClientInner {
                http,
                base_url,
                timeout: self.timeout,
            }),
            bearer: self.auth_token.map(Arc::from),
        })
    }
}

impl Default for ClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_requires_base_url() {
        let result = ClientBuilder::new().build();
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_builder_normalizes_trailing_slash() {
        let client = ClientBuilder::new()
            .base_url("http://localhost:5000")
            .build()
            .unwrap();
        assert_eq!(client.base_url().as_str(), "http://localhost:5000/");

        let client = ClientBuilder::new()
            .base_url("http://localhost:5000/blog")
            .build()
            .unwrap();
        assert_eq!(client.base_url().as_str(), "http://localhost:5000/blog/");
    }

    #[test]
    fn test_builder_rejects_header_unsafe_token() {
        let result = ClientBuilder::new()
            .base_url("http://localhost:5000")
            .auth_token("bad\ntoken")
            .build();
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_url_building() {
        let client = ClientBuilder::new()
            .base_url("http://localhost:5000")
            .build()
            .unwrap();

        let url = client.url("user/0/post/1").unwrap();
        assert_eq!(url.as_str(), "http://localhost:5000/api/user/0/post/1");

        let url = client.url("/token").unwrap();
        assert_eq!(url.as_str(), "http://localhost:5000/api/token");
    }

    #[test]
    fn test_with_bearer_shares_base_url() {
        let client = ClientBuilder::new()
            .base_url("http://localhost:5000")
            .build()
            .unwrap();
        assert!(!client.is_authenticated());

        let authed = client.with_bearer("abc");
        assert!(authed.is_authenticated());
        assert_eq!(authed.base_url(), client.base_url());
        assert!(!authed.anonymous().is_authenticated());
    }
}
