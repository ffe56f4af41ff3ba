//! Wire types for the `/template-features` HTTP surface.

use serde::{Deserialize, Serialize};

use super::feature::Feature;

/// Body of create and update requests.
///
/// Carries no id or creation time; those are owned by the server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeatureRequest {
    pub title: String,
    pub description: String,
    pub is_active: bool,
}

/// A record as returned by the server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeatureResponse {
    pub id: String,
    pub title: String,
    pub description: String,
    pub is_active: bool,
    pub created_at: String,
}

impl From<&Feature> for FeatureRequest {
    fn from(feature: &Feature) -> Self {
        Self {
            title: feature.title.clone(),
            description: feature.description.clone(),
            is_active: feature.is_active,
        }
    }
}

impl From<FeatureResponse> for Feature {
    fn from(response: FeatureResponse) -> Self {
        Feature {
            id: response.id,
            title: response.title,
            description: response.description,
            is_active: response.is_active,
            created_at: response.created_at,
            last_updated: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_omits_id_and_created_at() {
        let feature = Feature::new("Title", "Body")
            .with_id("local_1_1000")
            .with_created_at("2024-01-01T00:00:00Z");

        let json = serde_json::to_value(FeatureRequest::from(&feature)).unwrap();
        let object = json.as_object().unwrap();

        assert_eq!(object.len(), 3);
        assert_eq!(json["title"], "Title");
        assert_eq!(json["description"], "Body");
        assert_eq!(json["isActive"], true);
        assert!(object.get("id").is_none());
        assert!(object.get("createdAt").is_none());
    }

    #[test]
    fn test_response_parses_camel_case() {
        let json = r#"{
            "id": "abc",
            "title": "Search",
            "description": "Full text search",
            "isActive": false,
            "createdAt": "2023-01-01T00:00:00Z"
        }"#;

        let response: FeatureResponse = serde_json::from_str(json).unwrap();
        let feature = Feature::from(response);

        assert_eq!(feature.id, "abc");
        assert!(!feature.is_active);
        assert_eq!(feature.created_at, "2023-01-01T00:00:00Z");
        assert_eq!(feature.last_updated, 0);
    }
}
