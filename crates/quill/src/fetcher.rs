//! Post fetching for the resource cache.

use std::sync::Arc;

use async_trait::async_trait;
use quill_cache::{FetchError, Fetcher, ResourceKey};
use quill_client::{Post, QuillClient};
use quill_session::{FileTokenStore, SessionManager, TokenStore};
use tracing::trace;

/// Posts are addressed by `(owner id, post id)`.
pub type PostKey = ResourceKey;

/// Loads posts over HTTP, authenticated as whoever is logged in at fetch time.
pub struct PostFetcher<S: TokenStore = FileTokenStore> {
    client: QuillClient,
    session: Arc<SessionManager<S>>,
}

impl<S: TokenStore> PostFetcher<S> {
    pub fn new(client: QuillClient, session: Arc<SessionManager<S>>) -> Self {
        Self { client, session }
    }
}

#[async_trait]
impl<S: TokenStore + 'static> Fetcher<PostKey, Post> for PostFetcher<S> {
    async fn fetch(&self, key: &PostKey) -> quill_cache::Result<Post> {
        let client = match self.session.session() {
            Some(session) => self.client.with_bearer(session.raw_token()),
            None => self.client.anonymous(),
        };
        trace!(key = %key, authenticated = client.is_authenticated(), "Fetching post");

        client
            .posts()
            .get(key.owner_id, key.resource_id)
            .await
            .map_err(into_fetch_error)
    }
}

/// Map a client failure onto the cache's error taxonomy.
pub fn into_fetch_error(e: quill_client::Error) -> FetchError {
    use quill_client::Error;
    match e {
        Error::Api { status, message } => FetchError::Server {
            status: (status >= 400).then_some(status),
            message,
        },
        Error::Json(e) => FetchError::Malformed(e.to_string()),
        Error::Malformed(msg) => FetchError::Malformed(msg),
        other => FetchError::Transport(other.to_string()),
    }
}
