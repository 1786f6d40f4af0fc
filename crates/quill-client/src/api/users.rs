//! Users API.

use crate::client::QuillClient;
use crate::error::Result;
use crate::types::{Credentials, User};

/// Users API client.
pub struct UsersApi {
    client: QuillClient,
}

impl UsersApi {
    pub(crate) fn new(client: QuillClient) -> Self {
        Self { client }
    }

    /// Get a user by id. Requires a bearer token.
    pub async fn get(&self, user_id: i64) -> Result<User> {
        self.client.get(&format!("user/{}", user_id)).await
    }

    /// Register a new account.
    pub async fn create(&self, credentials: &Credentials) -> Result<User> {
        self.client.post("user", credentials).await
    }
}
