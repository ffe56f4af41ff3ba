//! Use-cases: validation in front of the repository.
//!
//! Invalid input is rejected with a [`ValidationError`] before the
//! repository is touched.

use chrono::{DateTime, Utc};
use std::sync::Arc;

use crate::error::{FeatureError, ValidationError};
use crate::models::Feature;
use crate::repository::{FeatureRepository, FeatureStream};

fn validate(feature: &Feature) -> Result<(), ValidationError> {
    if feature.title.trim().is_empty() {
        return Err(ValidationError::BlankTitle);
    }
    if feature.description.trim().is_empty() {
        return Err(ValidationError::BlankDescription);
    }
    Ok(())
}

/// Read-side use-cases.
#[derive(Clone)]
pub struct GetFeatureData {
    repository: Arc<FeatureRepository>,
}

impl GetFeatureData {
    pub fn new(repository: Arc<FeatureRepository>) -> Self {
        Self { repository }
    }

    pub fn all(&self) -> FeatureStream {
        self.repository.list()
    }

    pub fn active(&self) -> FeatureStream {
        self.repository.list_active()
    }

    pub async fn by_id(&self, id: &str) -> Result<Option<Feature>, FeatureError> {
        self.repository.get_by_id(id).await
    }

    /// Remote search. The query is trimmed; a blank query is rejected.
    pub async fn search(&self, query: &str) -> Result<Vec<Feature>, FeatureError> {
        let query = query.trim();
        if query.is_empty() {
            return Err(ValidationError::BlankQuery.into());
        }
        self.repository.search(query).await
    }
}

/// Write-side use-cases.
#[derive(Clone)]
pub struct SaveFeatureData {
    repository: Arc<FeatureRepository>,
}

impl SaveFeatureData {
    pub fn new(repository: Arc<FeatureRepository>) -> Self {
        Self { repository }
    }

    pub async fn create(&self, feature: &Feature) -> Result<Feature, FeatureError> {
        validate(feature)?;
        self.repository.create(feature).await
    }

    pub async fn update(&self, feature: &Feature) -> Result<Feature, FeatureError> {
        if feature.id.trim().is_empty() {
            return Err(ValidationError::MissingId.into());
        }
        validate(feature)?;
        self.repository.update(feature).await
    }

    pub async fn delete(&self, id: &str) -> Result<(), FeatureError> {
        if id.trim().is_empty() {
            return Err(ValidationError::MissingId.into());
        }
        self.repository.delete(id).await
    }
}

#[derive(Clone)]
pub struct SyncFeatures {
    repository: Arc<FeatureRepository>,
}

impl SyncFeatures {
    pub fn new(repository: Arc<FeatureRepository>) -> Self {
        Self { repository }
    }

    pub async fn sync(&self) -> Result<usize, FeatureError> {
        self.repository.sync_with_remote().await
    }

    pub async fn last_sync_time(&self) -> Result<Option<DateTime<Utc>>, FeatureError> {
        self.repository.last_sync_time().await
    }
}

/// The use-cases a screen needs, built over one repository.
#[derive(Clone)]
pub struct UseCases {
    pub get: GetFeatureData,
    pub save: SaveFeatureData,
    pub sync: SyncFeatures,
}

impl UseCases {
    pub fn new(repository: Arc<FeatureRepository>) -> Self {
        Self {
            get: GetFeatureData::new(repository.clone()),
            save: SaveFeatureData::new(repository.clone()),
            sync: SyncFeatures::new(repository),
        }
    }
}
