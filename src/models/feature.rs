use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Prefix marking identifiers that were generated on this device.
pub const LOCAL_ID_PREFIX: &str = "local_";

/// A template feature record.
///
/// An empty `id` denotes a draft that has never been written anywhere.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Feature {
    pub id: String,
    pub title: String,
    pub description: String,
    pub is_active: bool,
    /// Opaque creation timestamp as reported by the server.
    pub created_at: String,
    /// Milliseconds since the Unix epoch of the last local write.
    pub last_updated: i64,
}

impl Feature {
    pub fn new(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            id: String::new(),
            title: title.into(),
            description: description.into(),
            is_active: true,
            created_at: String::new(),
            last_updated: 0,
        }
    }

    /// A blank draft, used when the detail screen starts a new record.
    pub fn empty() -> Self {
        Self {
            is_active: false,
            ..Self::new("", "")
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    pub fn with_active(mut self, is_active: bool) -> Self {
        self.is_active = is_active;
        self
    }

    pub fn with_created_at(mut self, created_at: impl Into<String>) -> Self {
        self.created_at = created_at.into();
        self
    }

    pub fn is_draft(&self) -> bool {
        self.id.is_empty()
    }

    /// Returns true if the id was generated locally rather than by the server.
    pub fn is_local(&self) -> bool {
        self.id.starts_with(LOCAL_ID_PREFIX)
    }
}

/// Generates an identifier of the form `local_<millis>_<1000..=9999>`.
pub fn generate_local_id() -> String {
    let millis = chrono::Utc::now().timestamp_millis();
    let suffix: u16 = rand::rng().random_range(1000..=9999);
    format!("{}{}_{}", LOCAL_ID_PREFIX, millis, suffix)
}

impl fmt::Display for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.title)?;
        writeln!(f, "{}", "=".repeat(self.title.chars().count()))?;
        writeln!(f, "ID: {}", if self.id.is_empty() { "(draft)" } else { &self.id })?;
        writeln!(f, "Active: {}", if self.is_active { "yes" } else { "no" })?;
        if !self.created_at.is_empty() {
            writeln!(f, "Created: {}", self.created_at)?;
        }
        if self.is_local() {
            writeln!(f, "Status: local only (not yet on server)")?;
        }
        if !self.description.is_empty() {
            writeln!(f, "\n{}", self.description)?;
        }
        Ok(())
    }
}
