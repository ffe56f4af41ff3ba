//! Remote data source for feature records.
//!
//! [`FeatureApi`] is the seam the repository talks to. [`HttpFeatureApi`]
//! speaks the `/template-features` REST surface; [`OfflineApi`] fails every
//! call so that writes take the local fallback path when no server is
//! configured.

mod http;

pub use http::HttpFeatureApi;

use async_trait::async_trait;

use crate::error::RemoteError;
use crate::models::{FeatureRequest, FeatureResponse};

/// Default number of results requested by a search.
pub const DEFAULT_SEARCH_LIMIT: u32 = 20;

#[async_trait]
pub trait FeatureApi: Send + Sync {
    async fn get_all(&self) -> Result<Vec<FeatureResponse>, RemoteError>;

    async fn get_by_id(&self, id: &str) -> Result<FeatureResponse, RemoteError>;

    async fn get_active(&self, is_active: bool) -> Result<Vec<FeatureResponse>, RemoteError>;

    async fn create(&self, request: &FeatureRequest) -> Result<FeatureResponse, RemoteError>;

    async fn update(
        &self,
        id: &str,
        request: &FeatureRequest,
    ) -> Result<FeatureResponse, RemoteError>;

    async fn delete(&self, id: &str) -> Result<(), RemoteError>;

    async fn search(&self, query: &str, limit: u32) -> Result<Vec<FeatureResponse>, RemoteError>;
}

/// A remote that is never reachable.
#[derive(Debug, Clone, Copy, Default)]
pub struct OfflineApi;

#[async_trait]
impl FeatureApi for OfflineApi {
    async fn get_all(&self) -> Result<Vec<FeatureResponse>, RemoteError> {
        Err(RemoteError::NotConfigured)
    }

    async fn get_by_id(&self, _id: &str) -> Result<FeatureResponse, RemoteError> {
        Err(RemoteError::NotConfigured)
    }

    async fn get_active(&self, _is_active: bool) -> Result<Vec<FeatureResponse>, RemoteError> {
        Err(RemoteError::NotConfigured)
    }

    async fn create(&self, _request: &FeatureRequest) -> Result<FeatureResponse, RemoteError> {
        Err(RemoteError::NotConfigured)
    }

    async fn update(
        &self,
        _id: &str,
        _request: &FeatureRequest,
    ) -> Result<FeatureResponse, RemoteError> {
        Err(RemoteError::NotConfigured)
    }

    async fn delete(&self, _id: &str) -> Result<(), RemoteError> {
        Err(RemoteError::NotConfigured)
    }

    async fn search(&self, _query: &str, _limit: u32) -> Result<Vec<FeatureResponse>, RemoteError> {
        Err(RemoteError::NotConfigured)
    }
}
