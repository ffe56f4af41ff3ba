mod dto;
mod feature;

pub use dto::{FeatureRequest, FeatureResponse};
pub use feature::{generate_local_id, Feature, LOCAL_ID_PREFIX};
