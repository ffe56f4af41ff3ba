use std::sync::RwLock;
use uuid::Uuid;

use crate::models::{FeatureRequest, FeatureResponse};

/// In-memory record set served by the development server.
///
/// Records keep insertion order; new records are appended.
#[derive(Debug, Default)]
pub struct MemoryStore {
    features: RwLock<Vec<FeatureResponse>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_features(features: Vec<FeatureResponse>) -> Self {
        Self {
            features: RwLock::new(features),
        }
    }

    pub fn list(&self, active: Option<bool>) -> Vec<FeatureResponse> {
        let features = self.features.read().unwrap_or_else(|e| e.into_inner());
        features
            .iter()
            .filter(|f| active.is_none() || active == Some(f.is_active))
            .cloned()
            .collect()
    }

    pub fn get(&self, id: &str) -> Option<FeatureResponse> {
        let features = self.features.read().unwrap_or_else(|e| e.into_inner());
        features.iter().find(|f| f.id == id).cloned()
    }

    pub fn create(&self, request: FeatureRequest) -> FeatureResponse {
        let created = FeatureResponse {
            id: Uuid::new_v4().to_string(),
            title: request.title,
            description: request.description,
            is_active: request.is_active,
            created_at: chrono::Utc::now().to_rfc3339(),
        };
        let mut features = self.features.write().unwrap_or_else(|e| e.into_inner());
        features.push(created.clone());
        created
    }

    pub fn update(&self, id: &str, request: FeatureRequest) -> Option<FeatureResponse> {
        let mut features = self.features.write().unwrap_or_else(|e| e.into_inner());
        let existing = features.iter_mut().find(|f| f.id == id)?;
        existing.title = request.title;
        existing.description = request.description;
        existing.is_active = request.is_active;
        Some(existing.clone())
    }

    /// Returns false if no record had this id.
    pub fn delete(&self, id: &str) -> bool {
        let mut features = self.features.write().unwrap_or_else(|e| e.into_inner());
        let before = features.len();
        features.retain(|f| f.id != id);
        features.len() != before
    }

    /// Case-insensitive substring match on title or description.
    pub fn search(&self, query: &str, limit: usize) -> Vec<FeatureResponse> {
        let needle = query.to_lowercase();
        let features = self.features.read().unwrap_or_else(|e| e.into_inner());
        features
            .iter()
            .filter(|f| {
                f.title.to_lowercase().contains(&needle)
                    || f.description.to_lowercase().contains(&needle)
            })
            .take(limit)
            .cloned()
            .collect()
    }
}
