//! Offline-first client for template feature records.
//!
//! Records live in a local SQLite cache that is always readable. Writes go to
//! the remote service first and fall back to the cache when it is
//! unreachable; an explicit sync replaces the cache with the server's set.

pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod presentation;
pub mod remote;
pub mod repository;
pub mod server;
pub mod usecases;

#[cfg(test)]
mod testing;

pub use error::{FeatureError, RemoteError, StoreError, ValidationError};
pub use models::Feature;
pub use repository::FeatureRepository;
