//! Authenticated session management for the Quill blog client.
//!
//! - [`SessionManager`]: login, logout and session restore
//! - [`Claims`]: local, signature-less decoding of the token payload
//! - [`TokenStore`]: the single durable slot holding the token
//!
//! # Example
//!
//! ```rust,ignore
//! use quill_session::{FileTokenStore, SessionManager};
//!
//! let manager = SessionManager::with_client(FileTokenStore::new(&data_dir), client);
//! if !manager.is_logged_in() {
//!     manager.login("martin", "martin4817").await?;
//! }
//! let user_id = manager.session().and_then(|s| s.subject_id());
//! ```

pub mod claims;
pub mod error;
pub mod manager;
pub mod store;

pub use claims::Claims;
#[cfg(feature = "testing")]
pub use claims::unsigned_token;
pub use error::{AuthError, DecodeError, Result, StorageError};
pub use manager::{Authenticator, Session, SessionManager, SharedAuthenticator};
pub use store::{FileTokenStore, MemoryTokenStore, TOKEN_KEY, TokenStore};
