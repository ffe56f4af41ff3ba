use async_trait::async_trait;
use reqwest::{Method, RequestBuilder, Response};
use std::time::Duration;

use super::FeatureApi;
use crate::config::ApiConfig;
use crate::error::RemoteError;
use crate::models::{FeatureRequest, FeatureResponse};

const COLLECTION_PATH: &str = "/template-features";

/// HTTP client for the `/template-features` REST surface.
#[derive(Debug, Clone)]
pub struct HttpFeatureApi {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
}

impl HttpFeatureApi {
    /// Creates a client for `base_url` (e.g. "http://localhost:8080").
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, RemoteError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: None,
        })
    }

    /// Creates a client from the `api` config section.
    ///
    /// Returns an error if no base URL is configured.
    pub fn from_config(config: &ApiConfig) -> Result<Self, RemoteError> {
        let base_url = config
            .base_url
            .clone()
            .ok_or(RemoteError::NotConfigured)?;
        let api = Self::new(base_url, Duration::from_secs(config.timeout_secs))?;
        Ok(match &config.api_key {
            Some(key) => api.with_api_key(key.clone()),
            None => api,
        })
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn collection_url(&self) -> String {
        format!("{}{}", self.base_url, COLLECTION_PATH)
    }

    fn item_url(&self, id: &str) -> String {
        format!("{}/{}", self.collection_url(), urlencoding::encode(id))
    }

    fn request(&self, method: Method, url: &str) -> RequestBuilder {
        tracing::debug!(%method, url, "feature api request");
        let builder = self.client.request(method, url);
        match &self.api_key {
            Some(key) => builder.header("Authorization", format!("Bearer {}", key)),
            None => builder,
        }
    }
}

async fn expect_success(response: Response) -> Result<Response, RemoteError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    Err(RemoteError::Status {
        status: status.as_u16(),
        body,
    })
}

#[async_trait]
impl FeatureApi for HttpFeatureApi {
    async fn get_all(&self) -> Result<Vec<FeatureResponse>, RemoteError> {
        let response = self
            .request(Method::GET, &self.collection_url())
            .send()
            .await?;
        Ok(expect_success(response).await?.json().await?)
    }

    async fn get_by_id(&self, id: &str) -> Result<FeatureResponse, RemoteError> {
        let response = self.request(Method::GET, &self.item_url(id)).send().await?;
        Ok(expect_success(response).await?.json().await?)
    }

    async fn get_active(&self, is_active: bool) -> Result<Vec<FeatureResponse>, RemoteError> {
        let response = self
            .request(Method::GET, &self.collection_url())
            .query(&[("active", is_active)])
            .send()
            .await?;
        Ok(expect_success(response).await?.json().await?)
    }

    async fn create(&self, request: &FeatureRequest) -> Result<FeatureResponse, RemoteError> {
        let response = self
            .request(Method::POST, &self.collection_url())
            .json(request)
            .send()
            .await?;
        Ok(expect_success(response).await?.json().await?)
    }

    async fn update(
        &self,
        id: &str,
        request: &FeatureRequest,
    ) -> Result<FeatureResponse, RemoteError> {
        let response = self
            .request(Method::PUT, &self.item_url(id))
            .json(request)
            .send()
            .await?;
        Ok(expect_success(response).await?.json().await?)
    }

    async fn delete(&self, id: &str) -> Result<(), RemoteError> {
        let response = self
            .request(Method::DELETE, &self.item_url(id))
            .send()
            .await?;
        expect_success(response).await?;
        Ok(())
    }

    async fn search(&self, query: &str, limit: u32) -> Result<Vec<FeatureResponse>, RemoteError> {
        let url = format!("{}/search", self.collection_url());
        let limit = limit.to_string();
        let response = self
            .request(Method::GET, &url)
            .query(&[("q", query), ("limit", limit.as_str())])
            .send()
            .await?;
        Ok(expect_success(response).await?.json().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn api(base: &str) -> HttpFeatureApi {
        HttpFeatureApi::new(base, Duration::from_secs(5)).unwrap()
    }

    #[test]
    fn test_urls_strip_trailing_slash() {
        let api = api("http://localhost:8080/");
        assert_eq!(api.base_url(), "http://localhost:8080");
        assert_eq!(
            api.collection_url(),
            "http://localhost:8080/template-features"
        );
    }

    #[test]
    fn test_item_url_percent_encodes_id() {
        let api = api("http://localhost:8080");
        assert_eq!(
            api.item_url("a b/c"),
            "http://localhost:8080/template-features/a%20b%2Fc"
        );
    }

    #[test]
    fn test_from_config_requires_base_url() {
        let config = ApiConfig::default();
        assert!(matches!(
            HttpFeatureApi::from_config(&config),
            Err(RemoteError::NotConfigured)
        ));

        let config = ApiConfig {
            base_url: Some("http://example.com".to_string()),
            api_key: Some("secret".to_string()),
            ..ApiConfig::default()
        };
        let api = HttpFeatureApi::from_config(&config).unwrap();
        assert_eq!(api.base_url(), "http://example.com");
        assert_eq!(api.api_key.as_deref(), Some("secret"));
    }

    #[tokio::test]
    async fn test_unreachable_server_is_http_error() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let api = api(&format!("http://{}", addr));
        let result = api.get_all().await;
        assert!(matches!(result, Err(RemoteError::Http(_))));
    }
}
