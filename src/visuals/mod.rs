//! Resolves icons and colors for assets.
//!
//! Metals map to a palette color and currencies to a flag URL without any
//! network call. Crypto icons come from a rate-limited provider and go through
//! the shared [`ImageQueue`]. Successful resolutions are cached for the session.

pub mod queue;

pub use queue::{ImageQueue, QueueTicket};

use crate::core::asset::{AssetClass, AssetKey};
use crate::core::cache::Cache;
use crate::core::visual::{ResolvedVisual, Visual, flag_url, metal_color};
use anyhow::Result;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, instrument};

#[async_trait]
pub trait ImageProvider: Send + Sync {
    /// Looks up an icon URL for a crypto slug. `Ok(None)` means the provider has none.
    async fn fetch_image_url(&self, slug: &str) -> Result<Option<String>>;
}

/// Owned resolver service; construct one per process (or per test).
pub struct VisualResolver {
    cache: Cache<AssetKey, Visual>,
    queue: ImageQueue,
    flags_base_url: String,
}

impl VisualResolver {
    pub fn new(provider: Arc<dyn ImageProvider>, flags_base_url: &str, spacing: Duration) -> Self {
        Self {
            cache: Cache::new(),
            queue: ImageQueue::new(provider, spacing),
            flags_base_url: flags_base_url.to_string(),
        }
    }

    /// Resolves a visual. Dropping the returned future before the crypto request
    /// is dispatched withdraws it from the queue.
    #[instrument(name = "ResolveVisual", skip(self))]
    pub async fn resolve(&self, code: &str, class: AssetClass) -> Visual {
        match class {
            AssetClass::Metal => Visual::Color(metal_color(code).to_string()),
            AssetClass::Currency => Visual::Url(flag_url(&self.flags_base_url, code)),
            AssetClass::Crypto => {
                let key = AssetKey::new(class, code);
                if let Some(cached) = self.cache.get(&key).await {
                    return cached;
                }

                let ticket = self.queue.enqueue(&code.to_lowercase());
                match ticket.wait().await {
                    Some(url) => {
                        let visual = Visual::Url(url);
                        self.cache.put(key, visual.clone()).await;
                        visual
                    }
                    None => {
                        debug!(code, "No image resolved, using placeholder");
                        Visual::Empty
                    }
                }
            }
        }
    }

    /// Resolves and tags the result with the asset it was requested for.
    pub async fn resolve_for(&self, key: AssetKey) -> ResolvedVisual {
        let visual = self.resolve(&key.code, key.class).await;
        ResolvedVisual { key, visual }
    }

    pub fn queued(&self) -> usize {
        self.queue.pending()
    }
}

#[cfg(test)]
mod tests {
    use super::queue::tests::RecordingProvider;
    use super::*;
    use futures::FutureExt;

    fn resolver(provider: Arc<RecordingProvider>) -> VisualResolver {
        VisualResolver::new(provider, "https://flagcdn.com", Duration::from_secs(1))
    }

    #[tokio::test(start_paused = true)]
    async fn test_metal_and_currency_need_no_network() {
        let provider = Arc::new(RecordingProvider::default());
        let resolver = resolver(provider.clone());

        assert_eq!(
            resolver.resolve("gold", AssetClass::Metal).await,
            Visual::Color("#FFD700".to_string())
        );
        assert_eq!(
            resolver.resolve("unobtainium", AssetClass::Metal).await,
            Visual::Color("#B0B0B0".to_string())
        );
        assert_eq!(
            resolver.resolve("EUR", AssetClass::Currency).await,
            Visual::Url("https://flagcdn.com/eu.svg".to_string())
        );
        assert!(provider.slugs().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_crypto_second_resolution_is_cached() {
        let provider = Arc::new(RecordingProvider::default());
        let resolver = resolver(provider.clone());

        let first = resolver.resolve("bitcoin", AssetClass::Crypto).await;
        let second = resolver.resolve("bitcoin", AssetClass::Crypto).await;

        assert_eq!(first, Visual::Url("https://img.test/bitcoin.png".to_string()));
        assert_eq!(first, second);
        assert_eq!(provider.slugs(), vec!["bitcoin"]);
        assert_eq!(resolver.queued(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_crypto_is_empty_and_not_cached() {
        let provider = Arc::new(RecordingProvider::default());
        let resolver = resolver(provider.clone());

        assert_eq!(
            resolver.resolve("broken", AssetClass::Crypto).await,
            Visual::Empty
        );
        assert_eq!(
            resolver.resolve("broken", AssetClass::Crypto).await,
            Visual::Empty
        );
        assert_eq!(provider.slugs(), vec!["broken", "broken"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_concurrent_crypto_requests_are_spaced() {
        let provider = Arc::new(RecordingProvider::default());
        let resolver = resolver(provider.clone());

        let codes = ["bitcoin", "ethereum", "solana"];
        let visuals = futures::future::join_all(
            codes
                .iter()
                .map(|code| resolver.resolve(code, AssetClass::Crypto)),
        )
        .await;

        assert!(visuals.iter().all(|v| matches!(v, Visual::Url(_))));
        assert_eq!(provider.slugs(), codes);
        for pair in provider.times().windows(2) {
            assert!(pair[1] - pair[0] >= Duration::from_secs(1));
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_abandoned_resolution_leaves_the_queue() {
        let provider = Arc::new(RecordingProvider::default());
        let resolver = resolver(provider.clone());

        // Poll once so the request is queued, then abandon it
        let mut abandoned = Box::pin(resolver.resolve("ethereum", AssetClass::Crypto));
        assert!((&mut abandoned).now_or_never().is_none());
        assert_eq!(resolver.queued(), 1);
        drop(abandoned);
        assert_eq!(resolver.queued(), 0);

        resolver.resolve("solana", AssetClass::Crypto).await;
        assert_eq!(provider.slugs(), vec!["solana"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_resolve_for_tags_the_key() {
        let provider = Arc::new(RecordingProvider::default());
        let resolver = resolver(provider);

        let key = AssetKey::new(AssetClass::Metal, "silver");
        let resolved = resolver.resolve_for(key.clone()).await;
        assert_eq!(resolved.key, key);
        assert_eq!(resolved.visual, Visual::Color("#C0C0C0".to_string()));
    }
}
