//! Configuration file handling for txdash.
//!
//! The configuration file is stored at `$TXDASH_HOME/config.json` and holds the address of the
//! remote service, the paths of its two collections and the request timeout and retry settings.

use crate::api::{Backoff, Collection};
use crate::error::Res;
use crate::utils;
use anyhow::{bail, Context};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use url::Url;

const APP_NAME: &str = "txdash";
const CONFIG_VERSION: u8 = 1;
const CONFIG_JSON: &str = "config.json";
pub(crate) const DEFAULT_BASE_URL: &str = "http://localhost:1000";
const DEFAULT_CUSTOMERS_PATH: &str = "customers";
const DEFAULT_TRANSACTIONS_PATH: &str = "transactions";
const DEFAULT_TIMEOUT_SECS: u64 = 30;
const DEFAULT_RETRY_ATTEMPTS: u32 = 3;
const DEFAULT_RETRY_BASE_DELAY_MS: u64 = 250;

/// The `Config` object represents the configuration of the app. You instantiate it by providing
/// the path to `$TXDASH_HOME` and from there it loads `$TXDASH_HOME/config.json`.
#[derive(Debug, Clone)]
pub struct Config {
    root: PathBuf,
    config_path: PathBuf,
    config_file: ConfigFile,
    base_url: Url,
}

impl Config {
    /// Creates the home directory, if needed, and writes an initial `config.json` using
    /// `base_url`, or the default address when it is `None`.
    ///
    /// # Errors
    /// - Returns an error if `base_url` is not an http(s) URL or if any file operation fails.
    pub async fn create(dir: impl Into<PathBuf>, base_url: Option<&str>) -> Res<Self> {
        let maybe_relative = dir.into();
        utils::make_dir(&maybe_relative)
            .await
            .context("Unable to create the txdash home directory")?;
        let root = utils::canonicalize(&maybe_relative).await?;
        let config_path = root.join(CONFIG_JSON);

        let config_file = ConfigFile {
            base_url: base_url.unwrap_or(DEFAULT_BASE_URL).to_string(),
            ..ConfigFile::default()
        };
        let base_url = parse_base_url(&config_file.base_url)?;
        config_file.save(&config_path).await?;

        Ok(Self {
            root,
            config_path,
            config_file,
            base_url,
        })
    }

    /// This will
    /// - validate that `txdash_home` exists and that the config file exists
    /// - load and validate the config file
    /// - return the loaded configuration object
    pub async fn load(txdash_home: impl Into<PathBuf>) -> Res<Self> {
        let maybe_relative = txdash_home.into();
        let root = utils::canonicalize(&maybe_relative)
            .await
            .context("txdash home is missing, run 'txdash init' first")?;

        let config_path = root.join(CONFIG_JSON);
        if !config_path.is_file() {
            bail!("The config file is missing '{}'", config_path.display())
        }
        let config_file = ConfigFile::load(&config_path).await?;
        let base_url = parse_base_url(&config_file.base_url)?;

        Ok(Self {
            root,
            config_path,
            config_file,
            base_url,
        })
    }

    /// Replaces the configured service address for this run only; nothing is written to disk.
    pub fn with_base_url(mut self, base_url: &str) -> Res<Self> {
        self.base_url = parse_base_url(base_url)?;
        self.config_file.base_url = base_url.to_string();
        Ok(self)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// The full URL of one of the two collections.
    pub fn endpoint(&self, collection: Collection) -> Res<Url> {
        let path = match collection {
            Collection::Customers => &self.config_file.customers_path,
            Collection::Transactions => &self.config_file.transactions_path,
        };
        self.base_url
            .join(path.trim_start_matches('/'))
            .with_context(|| format!("Unable to build the {collection} URL from '{path}'"))
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.config_file.timeout_secs)
    }

    pub fn backoff(&self) -> Backoff {
        Backoff::new(
            self.config_file.retry_attempts,
            Duration::from_millis(self.config_file.retry_base_delay_ms),
        )
    }

    /// The configuration as it is stored on disk.
    pub fn to_json(&self) -> Res<serde_json::Value> {
        serde_json::to_value(&self.config_file).context("Unable to serialize config")
    }

    #[cfg(test)]
    pub(crate) fn with_retry(mut self, attempts: u32, base_delay_ms: u64) -> Self {
        self.config_file.retry_attempts = attempts;
        self.config_file.retry_base_delay_ms = base_delay_ms;
        self
    }
}

/// Parses the service address. A trailing slash is added to the path so that collection paths are
/// joined below it rather than replacing its last segment.
fn parse_base_url(s: &str) -> Res<Url> {
    let mut url = Url::parse(s).with_context(|| format!("Invalid base URL '{s}'"))?;
    if !matches!(url.scheme(), "http" | "https") {
        bail!("The base URL must use http or https, got '{s}'")
    }
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}

/// Represents the serialization and deserialization format of the configuration file.
///
/// Example configuration:
/// ```json
/// {
///   "app_name": "txdash",
///   "config_version": 1,
///   "base_url": "http://localhost:1000",
///   "customers_path": "customers",
///   "transactions_path": "transactions",
///   "timeout_secs": 30,
///   "retry_attempts": 3,
///   "retry_base_delay_ms": 250
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq)]
struct ConfigFile {
    /// Application name, should always be "txdash"
    app_name: String,

    /// Configuration file version
    config_version: u8,

    /// Address of the remote service
    base_url: String,

    /// Path of the customers collection, relative to `base_url`
    #[serde(default = "default_customers_path")]
    customers_path: String,

    /// Path of the transactions collection, relative to `base_url`
    #[serde(default = "default_transactions_path")]
    transactions_path: String,

    /// Timeout of a single request
    #[serde(default = "default_timeout_secs")]
    timeout_secs: u64,

    /// How many times a request is attempted before the fetch fails
    #[serde(default = "default_retry_attempts")]
    retry_attempts: u32,

    /// Delay before the first retry; it doubles with every further retry
    #[serde(default = "default_retry_base_delay_ms")]
    retry_base_delay_ms: u64,
}

impl Default for ConfigFile {
    fn default() -> Self {
        Self {
            app_name: APP_NAME.to_string(),
            config_version: CONFIG_VERSION,
            base_url: DEFAULT_BASE_URL.to_string(),
            customers_path: default_customers_path(),
            transactions_path: default_transactions_path(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            retry_attempts: DEFAULT_RETRY_ATTEMPTS,
            retry_base_delay_ms: DEFAULT_RETRY_BASE_DELAY_MS,
        }
    }
}

fn default_customers_path() -> String {
    DEFAULT_CUSTOMERS_PATH.to_string()
}

fn default_transactions_path() -> String {
    DEFAULT_TRANSACTIONS_PATH.to_string()
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

fn default_retry_attempts() -> u32 {
    DEFAULT_RETRY_ATTEMPTS
}

fn default_retry_base_delay_ms() -> u64 {
    DEFAULT_RETRY_BASE_DELAY_MS
}

impl ConfigFile {
    /// Loads a ConfigFile from the specified path.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or parsed, or was not written by txdash
    async fn load(path: impl AsRef<Path>) -> Res<Self> {
        let path = path.as_ref();
        let config: ConfigFile = utils::deserialize(path).await?;

        anyhow::ensure!(
            config.app_name == APP_NAME,
            "Invalid app_name in config file: expected '{}', got '{}'",
            APP_NAME,
            config.app_name
        );
        anyhow::ensure!(
            config.config_version == CONFIG_VERSION,
            "Unsupported config_version {} in {}",
            config.config_version,
            path.display()
        );
        anyhow::ensure!(
            config.timeout_secs > 0,
            "timeout_secs must be greater than zero in {}",
            path.display()
        );

        Ok(config)
    }

    /// Saves the ConfigFile to the specified path.
    async fn save(&self, path: impl AsRef<Path>) -> Res<()> {
        let p = path.as_ref();
        let data = serde_json::to_string_pretty(self).context("Unable to serialize config")?;
        utils::write(p, data)
            .await
            .context("Unable to write config file")
    }
}
