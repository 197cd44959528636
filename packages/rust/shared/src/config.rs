//! Application configuration for regwatch.
//!
//! User config lives at `~/.regwatch/regwatch.toml`.
//! CLI flags override config file values, which override defaults.
//! Email credentials are only ever read from the environment.

use std::path::{Path, PathBuf};

use chrono::{NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

use crate::error::{RegwatchError, Result};
use crate::source::SourceDefinition;
use crate::types::{DEFAULT_DESCRIPTION_LIMIT, MAX_TAGS};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "regwatch.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".regwatch";

/// Password value shipped in setup docs; treated as "not configured".
pub const PLACEHOLDER_PASSWORD: &str = "your-app-password";

/// Environment variables holding the digest credentials.
pub const ENV_EMAIL_FROM: &str = "EMAIL_FROM";
pub const ENV_EMAIL_PASSWORD: &str = "EMAIL_PASSWORD";
pub const ENV_EMAIL_TO: &str = "EMAIL_TO";

// ---------------------------------------------------------------------------
// Config structs (matching regwatch.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Global defaults.
    #[serde(default)]
    pub defaults: DefaultsConfig,

    /// Feed fetching.
    #[serde(default)]
    pub fetch: FetchConfig,

    /// Weekly digest email.
    #[serde(default)]
    pub digest: DigestConfig,

    /// Optional dashboard file patching.
    #[serde(default)]
    pub dashboard: DashboardConfig,

    /// Source catalog selection and user-defined sources.
    #[serde(default)]
    pub sources: SourcesConfig,
}

/// `[defaults]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DefaultsConfig {
    /// Path of the persisted record collection.
    #[serde(default = "default_store_path")]
    pub store_path: String,

    /// Entries published before this date are discarded.
    #[serde(default = "default_cutoff_date")]
    pub cutoff_date: NaiveDate,

    /// Maximum description length in characters.
    #[serde(default = "default_description_limit")]
    pub description_limit: usize,

    /// Maximum tags per record (1..=5).
    #[serde(default = "default_max_tags")]
    pub max_tags: usize,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            store_path: default_store_path(),
            cutoff_date: default_cutoff_date(),
            description_limit: default_description_limit(),
            max_tags: default_max_tags(),
        }
    }
}

fn default_store_path() -> String {
    "regulations.json".into()
}
fn default_cutoff_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 1, 1).expect("valid constant date")
}
fn default_description_limit() -> usize {
    DEFAULT_DESCRIPTION_LIMIT
}
fn default_max_tags() -> usize {
    MAX_TAGS
}

/// `[fetch]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchConfig {
    /// Per-feed request timeout.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// User-Agent header sent with every feed request.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            user_agent: default_user_agent(),
        }
    }
}

fn default_timeout_secs() -> u64 {
    30
}
fn default_user_agent() -> String {
    concat!("regwatch/", env!("CARGO_PKG_VERSION")).into()
}

/// `[digest]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DigestConfig {
    /// Day of the week the digest goes out.
    #[serde(default = "default_weekday")]
    pub weekday: Weekday,

    /// Records dated within this many days before the run qualify.
    #[serde(default = "default_lookback_days")]
    pub lookback_days: i64,

    /// Maximum records listed per category.
    #[serde(default = "default_per_category_limit")]
    pub per_category_limit: usize,

    /// SMTP relay (implicit TLS).
    #[serde(default = "default_smtp_host")]
    pub smtp_host: String,

    #[serde(default = "default_smtp_port")]
    pub smtp_port: u16,

    /// Link to the hosted dashboard, added to the digest footer.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dashboard_url: Option<String>,
}

impl Default for DigestConfig {
    fn default() -> Self {
        Self {
            weekday: default_weekday(),
            lookback_days: default_lookback_days(),
            per_category_limit: default_per_category_limit(),
            smtp_host: default_smtp_host(),
            smtp_port: default_smtp_port(),
            dashboard_url: None,
        }
    }
}

fn default_weekday() -> Weekday {
    Weekday::Mon
}
fn default_lookback_days() -> i64 {
    7
}
fn default_per_category_limit() -> usize {
    15
}
fn default_smtp_host() -> String {
    "smtp.gmail.com".into()
}
fn default_smtp_port() -> u16 {
    465
}

/// `[dashboard]` section.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DashboardConfig {
    /// HTML file embedding `const regulations = [...]`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

/// `[sources]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourcesConfig {
    /// Whether to monitor the built-in catalog.
    #[serde(default = "default_true")]
    pub builtin: bool,

    /// Additional user-defined sources (`[[sources.custom]]`).
    #[serde(default)]
    pub custom: Vec<SourceDefinition>,
}

impl Default for SourcesConfig {
    fn default() -> Self {
        Self {
            builtin: true,
            custom: Vec::new(),
        }
    }
}

fn default_true() -> bool {
    true
}

impl AppConfig {
    /// Reject values that would break record invariants.
    pub fn validate(&self) -> Result<()> {
        if self.defaults.max_tags == 0 || self.defaults.max_tags > MAX_TAGS {
            return Err(RegwatchError::config(format!(
                "defaults.max_tags must be between 1 and {MAX_TAGS}, got {}",
                self.defaults.max_tags
            )));
        }
        if self.defaults.description_limit == 0 {
            return Err(RegwatchError::config(
                "defaults.description_limit must be at least 1",
            ));
        }
        if self.fetch.timeout_secs == 0 {
            return Err(RegwatchError::config("fetch.timeout_secs must be at least 1"));
        }
        if self.digest.lookback_days < 0 {
            return Err(RegwatchError::config("digest.lookback_days must not be negative"));
        }

        for source in &self.sources.custom {
            source.validate().map_err(|e| RegwatchError::config(e.to_string()))?;
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Email credentials (environment only)
// ---------------------------------------------------------------------------

/// SMTP login and recipients for the digest.
#[derive(Clone, PartialEq, Eq)]
pub struct EmailCredentials {
    pub from: String,
    pub password: String,
    pub to: Vec<String>,
}

impl std::fmt::Debug for EmailCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EmailCredentials")
            .field("from", &self.from)
            .field("password", &"<redacted>")
            .field("to", &self.to)
            .finish()
    }
}

impl EmailCredentials {
    /// Read `EMAIL_FROM`, `EMAIL_PASSWORD`, `EMAIL_TO` from the process environment.
    pub fn from_env() -> Option<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build credentials from an arbitrary variable lookup.
    ///
    /// Returns `None` when any value is missing or blank, when the password is
    /// the setup placeholder, or when `EMAIL_TO` holds no addresses.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Option<Self> {
        let non_blank = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let from = non_blank(ENV_EMAIL_FROM)?;
        let password = non_blank(ENV_EMAIL_PASSWORD)?;
        if password == PLACEHOLDER_PASSWORD {
            return None;
        }

        let to: Vec<String> = non_blank(ENV_EMAIL_TO)?
            .split(',')
            .map(str::trim)
            .filter(|addr| !addr.is_empty())
            .map(String::from)
            .collect();
        if to.is_empty() {
            return None;
        }

        Some(Self { from, password, to })
    }
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the config directory (`~/.regwatch/`).
pub fn config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| RegwatchError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the config file (`~/.regwatch/regwatch.toml`).
pub fn config_file_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

/// Load the application config from disk. Returns defaults if the file does not exist.
pub fn load_config() -> Result<AppConfig> {
    let path = config_file_path()?;

    if !path.exists() {
        tracing::debug!(?path, "config file not found, using defaults");
        return Ok(AppConfig::default());
    }

    load_config_from(&path)
}

/// Load the application config from a specific file path and validate it.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| RegwatchError::io(path, e))?;

    let config: AppConfig = toml::from_str(&content).map_err(|e| {
        RegwatchError::config(format!("failed to parse {}: {e}", path.display()))
    })?;
    config.validate()?;
    Ok(config)
}

/// Create the config directory and write a default config file.
/// Returns the path to the created file.
pub fn init_config() -> Result<PathBuf> {
    let path = config_file_path()?;
    init_config_at(&path)?;
    Ok(path)
}

/// Write a default config file at `path`, creating parent directories.
pub fn init_config_at(path: &Path) -> Result<()> {
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir).map_err(|e| RegwatchError::io(dir, e))?;
    }

    let config = AppConfig::default();
    let content =
        toml::to_string_pretty(&config).map_err(|e| RegwatchError::config(e.to_string()))?;

    std::fs::write(path, content).map_err(|e| RegwatchError::io(path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(())
}
