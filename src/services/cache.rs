use std::sync::Arc;
use std::time::Duration;

use crate::models::ProviderProfile;
use crate::services::store::{RecordStore, StoreError};

/// In-process cache for the read-only provider catalog
///
/// The catalog is shared by every matching request, so it is loaded once
/// per TTL window instead of once per request.
#[derive(Clone)]
pub struct CatalogCache {
    cache: moka::future::Cache<CacheKey, Arc<Vec<ProviderProfile>>>,
}

/// Cache keys
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CacheKey {
    AvailableProviders,
}

impl CatalogCache {
    pub fn new(ttl_secs: u64) -> Self {
        let cache = moka::future::CacheBuilder::new(1)
            .time_to_live(Duration::from_secs(ttl_secs))
            .build();

        Self { cache }
    }

    /// Available providers, loading from the store on a miss
    ///
    /// Concurrent misses share one load. A failed load is not cached.
    pub async fn available_providers(
        &self,
        store: &dyn RecordStore,
    ) -> Result<Arc<Vec<ProviderProfile>>, Arc<StoreError>> {
        self.cache
            .try_get_with(CacheKey::AvailableProviders, async {
                tracing::debug!("Provider catalog cache miss, querying store");
                store.query_available_providers().await.map(Arc::new)
            })
            .await
    }

    /// Drop the cached catalog so the next request reloads it
    pub async fn invalidate(&self) {
        self.cache.invalidate(&CacheKey::AvailableProviders).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{
        AvailabilityStatus, CallerIdentity, ClientProfile, IntakeAnalysis, IntakeRecord,
        MatchResult, Source, StoredMatch,
    };
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use uuid::Uuid;

    #[derive(Default)]
    struct CountingStore {
        loads: AtomicUsize,
    }

    #[async_trait]
    impl RecordStore for CountingStore {
        async fn insert_intake(&self, _: &CallerIdentity, _: &ClientProfile, _: &IntakeAnalysis, _: Source) -> Result<Uuid, StoreError> {
            unimplemented!()
        }

        async fn fetch_intake(&self, _: &CallerIdentity, id: Uuid) -> Result<IntakeRecord, StoreError> {
            Err(StoreError::NotFound(id.to_string()))
        }

        async fn query_available_providers(&self) -> Result<Vec<ProviderProfile>, StoreError> {
            self.loads.fetch_add(1, Ordering::SeqCst);
            Ok(vec![ProviderProfile {
                id: Uuid::new_v4(),
                name: "Cached".to_string(),
                title: String::new(),
                communication_style: String::new(),
                approach_style: String::new(),
                specializations: vec![],
                therapy_types: vec![],
                languages: vec![],
                hourly_rate: None,
                years_experience: None,
                availability_status: AvailabilityStatus::Available,
            }])
        }

        async fn insert_match(&self, _: &CallerIdentity, _: Uuid, _: &MatchResult) -> Result<Uuid, StoreError> {
            unimplemented!()
        }

        async fn list_matches(&self, _: &CallerIdentity, _: Uuid) -> Result<Vec<StoredMatch>, StoreError> {
            Ok(vec![])
        }

        async fn health_check(&self) -> Result<bool, StoreError> {
            Ok(true)
        }
    }

    #[tokio::test]
    async fn test_catalog_loaded_once_until_invalidated() {
        let store = CountingStore::default();
        let cache = CatalogCache::new(60);

        let first = cache.available_providers(&store).await.unwrap();
        let second = cache.available_providers(&store).await.unwrap();
        assert_eq!(first[0].id, second[0].id);
        assert_eq!(store.loads.load(Ordering::SeqCst), 1);

        cache.invalidate().await;
        cache.available_providers(&store).await.unwrap();
        assert_eq!(store.loads.load(Ordering::SeqCst), 2);
    }
}
