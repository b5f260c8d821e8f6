/// Configuration management for Activity Service
///
/// Loads configuration from environment variables.
use anyhow::{Context, Result};
use object_storage::StorageConfig;
use serde::{Deserialize, Serialize};

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Database configuration
    pub database: DatabaseConfig,
    /// Object storage configuration
    pub storage: StorageConfig,
    /// Activity feed policy constants
    pub activity: ActivityConfig,
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Database URL
    pub url: String,
    /// Max connections in pool
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Min connections in pool
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
}

/// Per-source window sizes for the activity feed
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivityConfig {
    /// Records fetched per source for the combined view
    #[serde(default = "default_combined_source_limit")]
    pub combined_source_limit: i64,
    /// Records fetched for a single-kind view
    #[serde(default = "default_single_kind_limit")]
    pub single_kind_limit: i64,
}

impl Default for ActivityConfig {
    fn default() -> Self {
        Self {
            combined_source_limit: default_combined_source_limit(),
            single_kind_limit: default_single_kind_limit(),
        }
    }
}

// Default values
fn default_max_connections() -> u32 {
    20
}

fn default_min_connections() -> u32 {
    5
}

fn default_combined_source_limit() -> i64 {
    20
}

fn default_single_kind_limit() -> i64 {
    50
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let database = DatabaseConfig {
            url: std::env::var("DATABASE_URL")
                .context("DATABASE_URL environment variable not set")?,
            max_connections: std::env::var("DB_MAX_CONNECTIONS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or_else(default_max_connections),
            min_connections: std::env::var("DB_MIN_CONNECTIONS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or_else(default_min_connections),
        };

        let storage = StorageConfig::from_env();

        let activity = ActivityConfig {
            combined_source_limit: std::env::var("ACTIVITY_COMBINED_SOURCE_LIMIT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or_else(default_combined_source_limit),
            single_kind_limit: std::env::var("ACTIVITY_SINGLE_KIND_LIMIT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or_else(default_single_kind_limit),
        };

        Ok(Config {
            database,
            storage,
            activity,
        })
    }
}
