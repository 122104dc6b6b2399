//! Configuration types for listing and serving a bucket.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Environment variable overriding [`ListingConfig::bucket`].
pub const BUCKET_ENV: &str = "BUCKET_LISTING_BUCKET";
/// Environment variable overriding [`ListingConfig::region`].
pub const REGION_ENV: &str = "BUCKET_LISTING_REGION";

/// Largest accepted [`ListingConfig::recent_days`].
pub const MAX_RECENT_DAYS: i64 = 36_500;

/// Configuration for fetching and shaping a bucket listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ListingConfig {
    /// Bucket identifier, usually the host name the listing is served for.
    pub bucket: String,
    /// Storage region of the bucket.
    pub region: String,
    /// Explicit listing endpoint, replacing the one derived from bucket and region.
    pub endpoint: Option<String>,
    /// Width of the "recently modified" window in days.
    pub recent_days: i64,
    /// File count above which the tree root starts collapsed.
    pub large_listing_threshold: usize,
    /// Number of times a failed page request is retried before giving up.
    pub max_retries: u32,
    /// Page titles keyed by bucket.
    pub titles: BTreeMap<String, String>,
}

impl Default for ListingConfig {
    fn default() -> Self {
        Self {
            bucket: String::new(),
            region: "us-west-2".to_string(),
            endpoint: None,
            recent_days: 7,
            large_listing_threshold: 10_000,
            max_retries: 0,
            titles: BTreeMap::new(),
        }
    }
}

impl ListingConfig {
    /// Creates a configuration for `bucket` with default values.
    #[must_use]
    pub fn new(bucket: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            ..Self::default()
        }
    }

    /// Sets the region.
    #[must_use]
    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = region.into();
        self
    }

    /// Sets an explicit listing endpoint.
    #[must_use]
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    /// Sets the recency window in days.
    #[must_use]
    pub const fn with_recent_days(mut self, days: i64) -> Self {
        self.recent_days = days;
        self
    }

    /// Sets the large-listing threshold.
    #[must_use]
    pub const fn with_large_listing_threshold(mut self, threshold: usize) -> Self {
        self.large_listing_threshold = threshold;
        self
    }

    /// Sets the number of page retries.
    #[must_use]
    pub const fn with_max_retries(mut self, retries: u32) -> Self {
        self.max_retries = retries;
        self
    }

    /// Returns the listing endpoint, deriving it from bucket and region
    /// unless one was configured.
    #[must_use]
    pub fn endpoint_url(&self) -> String {
        self.endpoint.clone().unwrap_or_else(|| {
            format!("http://{}.s3.{}.amazonaws.com/", self.bucket, self.region)
        })
    }

    /// Returns the page title for this bucket.
    #[must_use]
    pub fn title(&self) -> String {
        self.titles
            .get(&self.bucket)
            .cloned()
            .unwrap_or_else(|| format!("{} Listing", self.bucket))
    }
}

/// HTTP server configuration for the browser view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Bind address.
    pub host: String,
    /// Bind port.
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
        }
    }
}

/// Complete application configuration combining listing and server settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Listing configuration.
    pub listing: ListingConfig,
    /// Server configuration.
    pub server: ServerConfig,
}

impl AppConfig {
    /// Creates a new config with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the default config file location.
    #[must_use]
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("bucket-listing")
            .join("config.toml")
    }

    /// Loads configuration from `path`, or from [`default_path`](Self::default_path)
    /// when it exists, then applies environment overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if an explicitly given file cannot be read, or if any
    /// file that is read is not valid TOML.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => {
                let default = Self::default_path();
                if default.is_file() {
                    Self::from_file(&default)?
                } else {
                    Self::default()
                }
            }
        };
        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Parses a TOML config file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("{}: {e}", path.display())))?;
        toml::from_str(&contents).map_err(|e| Error::Config(format!("{}: {e}", path.display())))
    }

    /// Applies bucket and region overrides from the environment.
    pub fn apply_env(&mut self, var: impl Fn(&str) -> Option<String>) {
        if let Some(bucket) = var(BUCKET_ENV).filter(|b| !b.is_empty()) {
            self.listing.bucket = bucket;
        }
        if let Some(region) = var(REGION_ENV).filter(|r| !r.is_empty()) {
            self.listing.region = region;
        }
    }

    /// Checks that the configuration names a bucket and a usable recency
    /// window.
    ///
    /// # Errors
    ///
    /// Returns an error if no bucket is configured or `recent_days` lies
    /// outside `0..=MAX_RECENT_DAYS`.
    pub fn validate(&self) -> Result<()> {
        if self.listing.bucket.trim().is_empty() {
            return Err(Error::Config(format!(
                "no bucket configured (set --bucket, {BUCKET_ENV}, or listing.bucket)"
            )));
        }
        if !(0..=MAX_RECENT_DAYS).contains(&self.listing.recent_days) {
            return Err(Error::Config(format!(
                "listing.recent_days must be between 0 and {MAX_RECENT_DAYS}, got {}",
                self.listing.recent_days
            )));
        }
        Ok(())
    }
}
