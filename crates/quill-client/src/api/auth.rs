//! Token API.

use tracing::debug;

use crate::client::QuillClient;
use crate::error::Result;
use crate::types::Credentials;

/// Token API client.
pub struct AuthApi {
    client: QuillClient,
}

impl AuthApi {
    pub(crate) fn new(client: QuillClient) -> Self {
        Self { client }
    }

    /// Exchange credentials for a raw bearer token.
    pub async fn token(&self, credentials: &Credentials) -> Result<String> {
        debug!(name = %credentials.name, "Requesting token");
        self.client.post("token", credentials).await
    }
}
