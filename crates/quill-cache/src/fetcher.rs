//! The fetch primitive the cache coordinates.

use std::future::Future;
use std::marker::PhantomData;

use async_trait::async_trait;

use crate::error::Result;

/// Loads one resource for a key.
///
/// The cache guarantees at most one outstanding call per key; implementations
/// do not need to deduplicate. Timeouts belong here, not in the cache.
#[async_trait]
pub trait Fetcher<K, V>: Send + Sync + 'static
where
    K: Send + Sync + 'static,
    V: Send + 'static,
{
    async fn fetch(&self, key: &K) -> Result<V>;
}

/// Adapts an async closure into a [`Fetcher`].
///
/// ```rust,ignore
/// let fetcher = FnFetcher::new(|key: u32| async move { Ok(format!("value-{key}")) });
/// ```
pub struct FnFetcher<F, K> {
    f: F,
    _key: PhantomData<fn(K)>,
}

impl<F, K> FnFetcher<F, K> {
    pub fn new(f: F) -> Self {
        Self {
            f,
            _key: PhantomData,
        }
    }
}

#[async_trait]
impl<F, Fut, K, V> Fetcher<K, V> for FnFetcher<F, K>
where
    F: Fn(K) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<V>> + Send + 'static,
    K: Clone + Send + Sync + 'static,
    V: Send + 'static,
{
    async fn fetch(&self, key: &K) -> Result<V> {
        (self.f)(key.clone()).await
    }
}
