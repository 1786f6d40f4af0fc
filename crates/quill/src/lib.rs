//! Quill blog client.
//!
//! Wires the session manager and the post cache to the blog backend. The
//! `quill` binary is a thin command-line view over [`BlogContext`].

pub mod context;
pub mod fetcher;

pub use context::{BlogContext, ContextError};
pub use fetcher::{PostFetcher, PostKey, into_fetch_error};
