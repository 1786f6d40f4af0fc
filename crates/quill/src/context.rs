//! Application wiring: one client, one session, one post cache.

use std::sync::Arc;

use quill_cache::ResourceCache;
use quill_client::{Post, QuillClient, User};
use quill_config::LoadedConfig;
use quill_session::{AuthError, FileTokenStore, Session, SessionManager, StorageError, TokenStore};
use tracing::debug;

use crate::fetcher::{PostFetcher, PostKey};

/// Failed to assemble a [`BlogContext`].
#[derive(Debug, thiserror::Error)]
pub enum ContextError {
    #[error(transparent)]
    Config(#[from] quill_config::ConfigError),

    #[error(transparent)]
    Client(#[from] quill_client::Error),
}

/// Everything a view needs: session state and cached posts.
///
/// Built once per process and handed to consumers; there is no global.
pub struct BlogContext<S: TokenStore + 'static = FileTokenStore> {
    client: QuillClient,
    session: Arc<SessionManager<S>>,
    posts: ResourceCache<PostKey, Post>,
}

impl BlogContext<FileTokenStore> {
    /// Build from a loaded config, storing the token in its data directory.
    pub fn from_config(loaded: &LoadedConfig) -> Result<Self, ContextError> {
        let config = &loaded.config;
        let mut builder = QuillClient::builder()
            .base_url(&config.server)
            .timeout(config.timeout());
        if let Some(agent) = &config.user_agent {
            builder = builder.user_agent(agent);
        }
        let client = builder.build()?;

        let store = FileTokenStore::new(&loaded.data_dir()?);
        debug!(server = %config.server, token = %store.path().display(), "Blog context ready");
        Ok(Self::new(client, store))
    }
}

impl<S: TokenStore + 'static> BlogContext<S> {
    pub fn new(client: QuillClient, store: S) -> Self {
        let session = Arc::new(SessionManager::new(store, Arc::new(client.clone())));
        let posts = ResourceCache::new(PostFetcher::new(client.clone(), Arc::clone(&session)));
        Self {
            client,
            session,
            posts,
        }
    }

    pub fn session(&self) -> &SessionManager<S> {
        &self.session
    }

    pub fn posts(&self) -> &ResourceCache<PostKey, Post> {
        &self.posts
    }

    /// Client carrying the current session's token, if any.
    pub fn client(&self) -> QuillClient {
        match self.session.session() {
            Some(session) => self.client.with_bearer(session.raw_token()),
            None => self.client.anonymous(),
        }
    }

    /// Profile of the logged-in user, or `None` without a usable session.
    pub async fn current_user(&self) -> Result<Option<User>, quill_client::Error> {
        let Some(session) = self.session.session() else {
            return Ok(None);
        };
        let Some(user_id) = session.subject_id() else {
            return Ok(None);
        };
        let user = self
            .client
            .with_bearer(session.raw_token())
            .users()
            .get(user_id)
            .await?;
        Ok(Some(user))
    }

    /// Log in and drop cached outcomes that were fetched as someone else.
    pub async fn login(&self, name: &str, password: &str) -> Result<Session, AuthError> {
        let session = self.session.login(name, password).await?;
        self.posts.clear();
        Ok(session)
    }

    /// Log out and drop cached outcomes fetched with the old token.
    ///
    /// Fetches still in flight answer their callers but are not kept.
    pub fn logout(&self) -> Result<(), StorageError> {
        self.session.logout()?;
        self.posts.clear();
        Ok(())
    }
}
