//! Test doubles shared by unit tests.

use async_trait::async_trait;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

use crate::db::{init_db, FeatureStore, Preferences};
use crate::error::RemoteError;
use crate::models::{FeatureRequest, FeatureResponse};
use crate::remote::FeatureApi;
use crate::repository::FeatureRepository;

pub fn response(id: &str, title: &str, is_active: bool) -> FeatureResponse {
    FeatureResponse {
        id: id.to_string(),
        title: title.to_string(),
        description: format!("{} description", title),
        is_active,
        created_at: "2023-01-01T00:00:00Z".to_string(),
    }
}

/// In-memory [`FeatureApi`] that can be switched to fail every call.
#[derive(Default)]
pub struct StubApi {
    features: Mutex<Vec<FeatureResponse>>,
    failing: AtomicBool,
    calls: AtomicUsize,
    next_id: AtomicUsize,
    last_search_limit: Mutex<Option<u32>>,
}

impl StubApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        let api = Self::default();
        api.set_failing(true);
        api
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn seed(&self, features: Vec<FeatureResponse>) {
        *self.features.lock().unwrap() = features;
    }

    pub fn remote_features(&self) -> Vec<FeatureResponse> {
        self.features.lock().unwrap().clone()
    }

    /// Number of calls made, including failed ones.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_search_limit(&self) -> Option<u32> {
        *self.last_search_limit.lock().unwrap()
    }

    fn enter(&self) -> Result<(), RemoteError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.failing.load(Ordering::SeqCst) {
            return Err(RemoteError::Status {
                status: 503,
                body: "stub offline".to_string(),
            });
        }
        Ok(())
    }

    fn not_found(id: &str) -> RemoteError {
        RemoteError::Status {
            status: 404,
            body: format!("no feature {}", id),
        }
    }
}

#[async_trait]
impl FeatureApi for StubApi {
    async fn get_all(&self) -> Result<Vec<FeatureResponse>, RemoteError> {
        self.enter()?;
        Ok(self.remote_features())
    }

    async fn get_by_id(&self, id: &str) -> Result<FeatureResponse, RemoteError> {
        self.enter()?;
        self.remote_features()
            .into_iter()
            .find(|f| f.id == id)
            .ok_or_else(|| Self::not_found(id))
    }

    async fn get_active(&self, is_active: bool) -> Result<Vec<FeatureResponse>, RemoteError> {
        self.enter()?;
        Ok(self
            .remote_features()
            .into_iter()
            .filter(|f| f.is_active == is_active)
            .collect())
    }

    async fn create(&self, request: &FeatureRequest) -> Result<FeatureResponse, RemoteError> {
        self.enter()?;
        let n = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        let created = FeatureResponse {
            id: format!("srv-{}", n),
            title: request.title.clone(),
            description: request.description.clone(),
            is_active: request.is_active,
            created_at: "2024-06-01T12:00:00Z".to_string(),
        };
        self.features.lock().unwrap().push(created.clone());
        Ok(created)
    }

    async fn update(
        &self,
        id: &str,
        request: &FeatureRequest,
    ) -> Result<FeatureResponse, RemoteError> {
        self.enter()?;
        let mut features = self.features.lock().unwrap();
        let existing = features
            .iter_mut()
            .find(|f| f.id == id)
            .ok_or_else(|| Self::not_found(id))?;
        existing.title = request.title.clone();
        existing.description = request.description.clone();
        existing.is_active = request.is_active;
        Ok(existing.clone())
    }

    async fn delete(&self, id: &str) -> Result<(), RemoteError> {
        self.enter()?;
        let mut features = self.features.lock().unwrap();
        let before = features.len();
        features.retain(|f| f.id != id);
        if features.len() == before {
            return Err(Self::not_found(id));
        }
        Ok(())
    }

    async fn search(&self, query: &str, limit: u32) -> Result<Vec<FeatureResponse>, RemoteError> {
        self.enter()?;
        *self.last_search_limit.lock().unwrap() = Some(limit);
        let needle = query.to_lowercase();
        Ok(self
            .remote_features()
            .into_iter()
            .filter(|f| f.title.to_lowercase().contains(&needle))
            .take(limit as usize)
            .collect())
    }
}

pub struct TestContext {
    pub repo: Arc<FeatureRepository>,
    pub store: FeatureStore,
    pub preferences: Preferences,
    pub db_path: PathBuf,
    _temp_dir: TempDir, // Keep alive for duration of test
}

pub async fn test_repository(api: Arc<StubApi>) -> TestContext {
    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir.path().join("test.db");
    let pool = init_db(&db_path).await.unwrap();
    let store = FeatureStore::new(pool.clone());
    let preferences = Preferences::new(pool);
    TestContext {
        repo: Arc::new(FeatureRepository::new(
            api,
            store.clone(),
            preferences.clone(),
        )),
        store,
        preferences,
        db_path,
        _temp_dir: temp_dir,
    }
}
