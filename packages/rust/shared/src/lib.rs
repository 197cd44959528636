//! Shared types, error model, and configuration for regwatch.
//!
//! This crate is the foundation depended on by all other regwatch crates.
//! It provides:
//! - [`RegwatchError`]: the unified error type
//! - Domain types ([`RegulationRecord`], [`Category`], [`Priority`], [`RegulationType`])
//! - Source definitions ([`SourceDefinition`]) consumed by the generic feed adapter
//! - Configuration ([`AppConfig`], config loading, [`EmailCredentials`])

pub mod config;
pub mod error;
pub mod source;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AppConfig, DashboardConfig, DefaultsConfig, DigestConfig, EmailCredentials, FetchConfig,
    PLACEHOLDER_PASSWORD, SourcesConfig, config_dir, config_file_path, init_config, init_config_at, load_config,
    load_config_from,
};
pub use error::{RegwatchError, Result};
pub use source::{DEFAULT_MAX_ENTRIES, JurisdictionRule, QUERY_PLACEHOLDER, SourceDefinition};
pub use types::{
    Category, DEFAULT_DESCRIPTION_LIMIT, EFFECTIVE_DATE_PLACEHOLDER, MAX_TAGS, Priority,
    RegulationRecord, RegulationType, TRUNCATION_MARKER,
};
