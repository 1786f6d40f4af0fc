//! HTTP client SDK for the Quill blog backend.
//!
//! Every endpoint answers with a `{"result": ...}` or `{"error": ...}`
//! envelope; the client unwraps it into a typed [`Result`].
//!
//! # Example
//!
//! ```no_run
//! use quill_client::{Credentials, QuillClient, Result};
//!
//! # async fn example() -> Result<()> {
//! let client = QuillClient::builder()
//!     .base_url("http://localhost:5000")
//!     .build()?;
//!
//! let token = client
//!     .auth()
//!     .token(&Credentials::new("martin", "martin4817"))
//!     .await?;
//!
//! let page = client
//!     .with_bearer(&token)
//!     .posts()
//!     .list(0, &Default::default())
//!     .await?;
//! println!("{} posts", page.data.len());
//! # Ok(())
//! # }
//! ```
//!
//! # API Coverage
//!
//! - **Auth**: exchange credentials for a token
//! - **Posts**: get, list, create
//! - **Users**: register

pub mod api;
pub mod client;
pub mod error;
pub mod types;

pub use client::{ClientBuilder, QuillClient};
pub use error::{Error, Result};
pub use types::*;
