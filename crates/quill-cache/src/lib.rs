//! Deduplicating resource cache and fetch coordinator.
//!
//! [`ResourceCache`] sits between views and a [`Fetcher`]:
//! - concurrent requests for one key share a single fetch
//! - successes and failures are both kept, so later requests answer at once
//! - callers observe a three-state lifecycle (loading / ready / failed)
//! - [`ResourceCache::invalidate`] and [`ResourceCache::clear`] are the only
//!   ways to refetch a key
//!
//! # Example
//!
//! ```rust,ignore
//! use quill_cache::{FnFetcher, ResourceCache, ResourceKey};
//!
//! let cache = ResourceCache::new(FnFetcher::new(|key: ResourceKey| async move {
//!     fetch_post(key.owner_id, key.resource_id).await
//! }));
//!
//! cache.get(ResourceKey::new(0, 1), |post| render(&post), |err| render_error(&err));
//! let post = cache.load(ResourceKey::new(0, 1)).await?;
//! ```

mod cache;
mod error;
mod fetcher;
mod key;

pub use cache::{CacheKey, CacheStats, LoadState, ResourceCache};
pub use error::{FetchError, Result};
pub use fetcher::{Fetcher, FnFetcher};
pub use key::ResourceKey;
