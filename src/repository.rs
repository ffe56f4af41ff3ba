//! Offline-first repository composing the remote API and the local store.
//!
//! Reads always come from the local store. Writes try the remote first and
//! fall back to the local store when the remote fails; only a failure of the
//! local step is reported. Sync and search talk to the remote exclusively.

use chrono::{DateTime, Utc};
use futures::stream::{BoxStream, StreamExt};
use std::sync::Arc;

use crate::db::{FeatureFilter, FeatureStore, Preferences};
use crate::error::FeatureError;
use crate::models::{generate_local_id, Feature, FeatureRequest};
use crate::remote::{FeatureApi, DEFAULT_SEARCH_LIMIT};

/// Live listing of local records; see [`FeatureStore::observe`].
pub type FeatureStream = BoxStream<'static, Result<Vec<Feature>, FeatureError>>;

pub struct FeatureRepository {
    api: Arc<dyn FeatureApi>,
    store: FeatureStore,
    preferences: Preferences,
    search_limit: u32,
}

impl FeatureRepository {
    pub fn new(api: Arc<dyn FeatureApi>, store: FeatureStore, preferences: Preferences) -> Self {
        Self {
            api,
            store,
            preferences,
            search_limit: DEFAULT_SEARCH_LIMIT,
        }
    }

    pub fn with_search_limit(mut self, search_limit: u32) -> Self {
        self.search_limit = search_limit;
        self
    }

    /// All local records, most recently updated first, re-emitted on every write.
    pub fn list(&self) -> FeatureStream {
        self.observe(FeatureFilter::All)
    }

    /// Like [`FeatureRepository::list`] but only active records.
    pub fn list_active(&self) -> FeatureStream {
        self.observe(FeatureFilter::Active)
    }

    fn observe(&self, filter: FeatureFilter) -> FeatureStream {
        self.store
            .observe(filter)
            .map(|snapshot| snapshot.map_err(FeatureError::from))
            .boxed()
    }

    pub async fn get_by_id(&self, id: &str) -> Result<Option<Feature>, FeatureError> {
        Ok(self.store.get_by_id(id).await?)
    }

    /// Creates a record on the server, falling back to a local-only record.
    ///
    /// The fallback keeps a non-empty id as is and otherwise assigns a
    /// `local_` id. A local failure after a successful remote create is
    /// returned as an error; the record will arrive with the next sync.
    pub async fn create(&self, feature: &Feature) -> Result<Feature, FeatureError> {
        let request = FeatureRequest::from(feature);

        match self.api.create(&request).await {
            Ok(response) => {
                let created = Feature::from(response);
                tracing::debug!(id = %created.id, "created feature on server");
                Ok(self.store.insert(&created).await?)
            }
            Err(e) => {
                let id = if feature.id.is_empty() {
                    generate_local_id()
                } else {
                    feature.id.clone()
                };
                tracing::warn!(error = %e, %id, "remote create failed, saving locally");
                let local = Feature {
                    id,
                    ..feature.clone()
                };
                Ok(self.store.insert(&local).await?)
            }
        }
    }

    /// Updates a record on the server, falling back to a local update.
    pub async fn update(&self, feature: &Feature) -> Result<Feature, FeatureError> {
        let request = FeatureRequest::from(feature);

        match self.api.update(&feature.id, &request).await {
            Ok(response) => {
                let updated = Feature::from(response);
                Ok(self.store.insert(&updated).await?)
            }
            Err(e) => {
                tracing::warn!(error = %e, id = %feature.id, "remote update failed, updating locally");
                Ok(self.store.update(feature).await?)
            }
        }
    }

    /// Deletes a record remotely and locally.
    ///
    /// The local delete runs whatever the remote outcome; only its failure is
    /// reported.
    pub async fn delete(&self, id: &str) -> Result<(), FeatureError> {
        if let Err(e) = self.api.delete(id).await {
            tracing::warn!(error = %e, %id, "remote delete failed, deleting locally");
        }
        self.store.delete_by_id(id).await?;
        Ok(())
    }

    /// Replaces the local store with the server's complete set.
    ///
    /// All-or-nothing: the table swap runs in one transaction. Returns the
    /// number of records now stored locally.
    pub async fn sync_with_remote(&self) -> Result<usize, FeatureError> {
        let remote = self.api.get_all().await?;
        let features: Vec<Feature> = remote.into_iter().map(Feature::from).collect();

        let count = self.store.replace_all(&features).await?;
        self.preferences
            .set_last_sync_time(Utc::now().timestamp_millis())
            .await?;

        tracing::info!(count, "synced features from server");
        Ok(count)
    }

    /// Searches on the server. There is no local fallback.
    pub async fn search(&self, query: &str) -> Result<Vec<Feature>, FeatureError> {
        let results = self.api.search(query, self.search_limit).await?;
        Ok(results.into_iter().map(Feature::from).collect())
    }

    /// When the last successful sync finished, if ever.
    pub async fn last_sync_time(&self) -> Result<Option<DateTime<Utc>>, FeatureError> {
        let millis = self.preferences.last_sync_time().await?;
        if millis == 0 {
            return Ok(None);
        }
        Ok(DateTime::from_timestamp_millis(millis))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{RemoteError, StoreError};
    use crate::models::{FeatureResponse, LOCAL_ID_PREFIX};
    use crate::testing::{response, test_repository, StubApi};
    use std::time::Duration;

    fn draft(title: &str, description: &str) -> Feature {
        Feature::new(title, description)
    }

    #[tokio::test]
    async fn test_create_remote_success_uses_server_id() {
        let api = Arc::new(StubApi::new());
        let ctx = test_repository(api.clone()).await;

        let created = ctx
            .repo
            .create(&draft("New Feature", "New Description"))
            .await
            .unwrap();

        assert_eq!(created.id, "srv-1");
        assert_eq!(created.title, "New Feature");
        assert!(!created.created_at.is_empty());

        let stored = ctx.repo.get_by_id("srv-1").await.unwrap().unwrap();
        assert_eq!(stored.title, "New Feature");
        assert_eq!(api.remote_features().len(), 1);
    }

    #[tokio::test]
    async fn test_create_remote_failure_falls_back_to_local_id() {
        let api = Arc::new(StubApi::failing());
        let ctx = test_repository(api).await;

        let created = ctx
            .repo
            .create(&Feature::new("A", "B").with_active(true))
            .await
            .unwrap();

        assert!(created.id.starts_with(LOCAL_ID_PREFIX));
        assert_eq!(created.title, "A");
        assert_eq!(created.description, "B");
        assert!(created.is_active);

        let stored = ctx.repo.get_by_id(&created.id).await.unwrap().unwrap();
        assert_eq!(stored, created);
    }

    #[tokio::test]
    async fn test_create_remote_failure_keeps_existing_id() {
        let api = Arc::new(StubApi::failing());
        let ctx = test_repository(api).await;

        let created = ctx
            .repo
            .create(&draft("A", "B").with_id("preset"))
            .await
            .unwrap();
        assert_eq!(created.id, "preset");
    }

    #[tokio::test]
    async fn test_create_double_failure_is_error() {
        let api = Arc::new(StubApi::failing());
        let ctx = test_repository(api).await;

        ctx.store.pool().close().await;

        let result = ctx.repo.create(&draft("A", "B")).await;
        assert!(matches!(result, Err(FeatureError::Store(_))));
    }

    #[tokio::test]
    async fn test_delete_local_failure_is_error() {
        let api = Arc::new(StubApi::new());
        api.seed(vec![response("srv-1", "Remote", true)]);
        let ctx = test_repository(api.clone()).await;

        ctx.store.pool().close().await;

        let result = ctx.repo.delete("srv-1").await;
        assert!(matches!(result, Err(FeatureError::Store(_))));
        // The remote delete still went through
        assert!(api.remote_features().is_empty());
    }

    #[tokio::test]
    async fn test_sync_local_failure_keeps_last_sync_time() {
        let api = Arc::new(StubApi::new());
        api.seed(vec![response("srv-1", "Remote", true)]);
        let ctx = test_repository(api).await;

        ctx.store.pool().close().await;

        let result = ctx.repo.sync_with_remote().await;
        assert!(matches!(result, Err(FeatureError::Store(_))));

        // Reopen the database to check nothing was recorded
        let pool = crate::db::init_db(&ctx.db_path).await.unwrap();
        assert_eq!(Preferences::new(pool).last_sync_time().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_update_remote_success_stores_server_record() {
        let api = Arc::new(StubApi::new());
        api.seed(vec![response("srv-9", "Old", true)]);
        let ctx = test_repository(api.clone()).await;
        ctx.repo.sync_with_remote().await.unwrap();

        let mut feature = ctx.repo.get_by_id("srv-9").await.unwrap().unwrap();
        feature.title = "New".to_string();
        let updated = ctx.repo.update(&feature).await.unwrap();

        assert_eq!(updated.title, "New");
        assert_eq!(api.remote_features()[0].title, "New");
        let stored = ctx.repo.get_by_id("srv-9").await.unwrap().unwrap();
        assert_eq!(stored.title, "New");
    }

    #[tokio::test]
    async fn test_update_remote_failure_updates_locally() {
        let api = Arc::new(StubApi::failing());
        let ctx = test_repository(api).await;

        let mut created = ctx.repo.create(&draft("Before", "Desc")).await.unwrap();
        created.title = "After".to_string();
        created.is_active = false;

        let updated = ctx.repo.update(&created).await.unwrap();
        assert_eq!(updated.id, created.id);
        assert_eq!(updated.title, "After");

        let stored = ctx.repo.get_by_id(&created.id).await.unwrap().unwrap();
        assert_eq!(stored.title, "After");
        assert!(!stored.is_active);
    }

    #[tokio::test]
    async fn test_update_unknown_record_offline_is_not_found() {
        let api = Arc::new(StubApi::failing());
        let ctx = test_repository(api).await;

        let result = ctx.repo.update(&draft("A", "B").with_id("ghost")).await;
        assert!(matches!(
            result,
            Err(FeatureError::Store(StoreError::NotFound(_)))
        ));
    }

    #[tokio::test]
    async fn test_delete_removes_locally_when_remote_fails() {
        let api = Arc::new(StubApi::failing());
        let ctx = test_repository(api.clone()).await;

        let created = ctx.repo.create(&draft("A", "B")).await.unwrap();
        let calls_before = api.calls();

        ctx.repo.delete(&created.id).await.unwrap();

        assert_eq!(api.calls(), calls_before + 1);
        assert!(ctx.repo.get_by_id(&created.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_delete_removes_remote_and_local() {
        let api = Arc::new(StubApi::new());
        let ctx = test_repository(api.clone()).await;

        let created = ctx.repo.create(&draft("A", "B")).await.unwrap();
        ctx.repo.delete(&created.id).await.unwrap();

        assert!(api.remote_features().is_empty());
        assert!(ctx.repo.get_by_id(&created.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_sync_replaces_local_contents() {
        let api = Arc::new(StubApi::failing());
        let ctx = test_repository(api.clone()).await;

        // Offline record that the server never saw
        ctx.repo.create(&draft("Offline", "Only here")).await.unwrap();

        api.set_failing(false);
        api.seed(vec![
            response("r1", "Remote 1", true),
            response("r2", "Remote 2", false),
        ]);

        let count = ctx.repo.sync_with_remote().await.unwrap();
        assert_eq!(count, 2);

        let mut stream = ctx.repo.list();
        let all = stream.next().await.unwrap().unwrap();
        let ids: Vec<&str> = all.iter().map(|f| f.id.as_str()).collect();
        assert_eq!(ids, vec!["r1", "r2"]);

        assert!(ctx.repo.last_sync_time().await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_sync_failure_leaves_local_untouched() {
        let api = Arc::new(StubApi::failing());
        let ctx = test_repository(api).await;

        let created = ctx.repo.create(&draft("Keep", "Me")).await.unwrap();

        let result = ctx.repo.sync_with_remote().await;
        assert!(matches!(result, Err(FeatureError::Remote(_))));
        assert!(ctx.repo.get_by_id(&created.id).await.unwrap().is_some());
        assert!(ctx.repo.last_sync_time().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_search_delegates_to_remote_with_limit() {
        let api = Arc::new(StubApi::new());
        api.seed(
            (0..5)
                .map(|i| response(&format!("r{}", i), &format!("Match {}", i), true))
                .collect::<Vec<FeatureResponse>>(),
        );
        let ctx = test_repository(api.clone()).await;
        let repo = FeatureRepository::new(api.clone(), ctx.store.clone(), ctx.preferences.clone())
            .with_search_limit(3);

        let results = repo.search("match").await.unwrap();
        assert_eq!(results.len(), 3);
        assert_eq!(api.last_search_limit(), Some(3));
    }

    #[tokio::test]
    async fn test_search_failure_has_no_local_fallback() {
        let api = Arc::new(StubApi::failing());
        let ctx = test_repository(api).await;

        ctx.repo.create(&draft("Match", "locally")).await.unwrap();

        let result = ctx.repo.search("Match").await;
        assert!(matches!(
            result,
            Err(FeatureError::Remote(RemoteError::Status { status: 503, .. }))
        ));
    }

    #[tokio::test]
    async fn test_list_active_stream_follows_writes() {
        let api = Arc::new(StubApi::failing());
        let ctx = test_repository(api).await;

        let mut active = ctx.repo.list_active();
        let initial = active.next().await.unwrap().unwrap();
        assert!(initial.is_empty());

        ctx.repo.create(&draft("On", "x")).await.unwrap();
        let next = tokio::time::timeout(Duration::from_secs(5), active.next())
            .await
            .unwrap()
            .unwrap()
            .unwrap();
        assert_eq!(next.len(), 1);

        ctx.repo
            .create(&draft("Off", "y").with_active(false))
            .await
            .unwrap();
        let next = tokio::time::timeout(Duration::from_secs(5), active.next())
            .await
            .unwrap()
            .unwrap()
            .unwrap();
        assert_eq!(next.len(), 1);
        assert_eq!(next[0].title, "On");
    }
}
