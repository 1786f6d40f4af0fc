//! Posts API.

use crate::client::QuillClient;
use crate::error::Result;
use crate::types::{CreatePostRequest, ListPostsQuery, Page, Post};

/// Posts API client.
pub struct PostsApi {
    client: QuillClient,
}

impl PostsApi {
    pub(crate) fn new(client: QuillClient) -> Self {
        Self { client }
    }

    /// Get a single post.
    pub async fn get(&self, owner_id: i64, post_id: i64) -> Result<Post> {
        self.client
            .get(&format!("user/{}/post/{}", owner_id, post_id))
            .await
    }

    /// List a page of a user's posts.
    pub async fn list(&self, owner_id: i64, query: &ListPostsQuery) -> Result<Page<Post>> {
        self.client
            .get_with_query(&format!("user/{}/post", owner_id), query)
            .await
    }

    /// Create a post. Requires a bearer token for `owner_id`.
    pub async fn create(&self, owner_id: i64, request: &CreatePostRequest) -> Result<Post> {
        self.client
            .post(&format!("user/{}/post", owner_id), request)
            .await
    }
}
