use anyhow::{Context, Result};
use serde::Deserialize;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use crate::cli::Args;
use crate::error::ResolveError;
/// Represents the application configuration loaded from a file
#[derive(Debug, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub network: NetworkConfig,

    #[serde(default)]
    pub catalog: CatalogConfig,

    #[serde(default)]
    pub output: OutputConfig,

    #[serde(default)]
    pub agents: AgentsConfig,
}

#[derive(Debug, Deserialize, Default)]
pub struct NetworkConfig {
    pub timeout: Option<u64>,
    pub workers: Option<usize>,
    pub tor: Option<bool>,
    pub relay: Option<String>,
    pub tor_check_url: Option<String>,
    pub insecure: Option<bool>,
}

#[derive(Debug, Deserialize, Default)]
pub struct CatalogConfig {
    pub general: Option<String>,
    pub restricted: Option<String>,
    pub include_restricted: Option<bool>,
}

#[derive(Debug, Deserialize, Default)]
pub struct OutputConfig {
    pub dir: Option<String>,
    pub format: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
pub struct AgentsConfig {
    pub file: Option<String>,
}

impl Config {
    /// Load configuration from a specific file path
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.as_ref().display()))?;

        Ok(config)
    }

    /// Get the default configuration file path
    /// - Linux/macOS: ~/.config/handlex/config.toml
    /// - Windows: %AppData%\handlex\config.toml
    ///
    /// The directory and an empty config.toml are created when missing.
    pub fn default_path() -> Option<PathBuf> {
        let config_path = config_dir()?.join("config.toml");

        if !config_path.exists() && fs::write(&config_path, "").is_err() {
            return None;
        }

        Some(config_path)
    }

    /// Default location of the user-agent file, next to the config file
    pub fn default_agents_path() -> Option<PathBuf> {
        config_dir().map(|dir| dir.join("user_agents.txt"))
    }

    /// Load configuration based on command line arguments
    /// Priority: --config flag > default path > default values
    ///
    /// An explicit `--config` that cannot be read or parsed is an error;
    /// a broken default file is ignored.
    pub fn load(args: &Args) -> Result<Self> {
        if let Some(path) = &args.config {
            return Self::from_file(path);
        }

        if let Some(default_path) = Self::default_path() {
            if let Ok(config) = Self::from_file(&default_path) {
                return Ok(config);
            }
        }

        Ok(Config::default())
    }

    /// Apply configuration values to Args, respecting priority
    /// Command line arguments take precedence over config file values
    pub fn apply_to_args(self, args: &mut Args) {
        // Network options
        args.timeout = args.timeout.or(self.network.timeout);
        args.workers = args.workers.or(self.network.workers);
        args.relay = args.relay.take().or(self.network.relay);
        args.tor_check_url = args.tor_check_url.take().or(self.network.tor_check_url);

        if !args.tor && self.network.tor.unwrap_or(false) {
            args.tor = true;
        }

        if !args.insecure && self.network.insecure.unwrap_or(false) {
            args.insecure = true;
        }

        // Catalog options
        if args.general_catalog.is_none() {
            args.general_catalog = self.catalog.general.map(PathBuf::from);
        }

        if args.restricted_catalog.is_none() {
            args.restricted_catalog = self.catalog.restricted.map(PathBuf::from);
        }

        if !args.restricted && self.catalog.include_restricted.unwrap_or(false) {
            args.restricted = true;
        }

        // Output options
        if args.output_dir.is_none() {
            args.output_dir = self.output.dir.map(PathBuf::from);
        }

        if args.format.is_none() {
            args.format = self.output.format.map(|format| format.to_lowercase());
        }

        // Agent pool
        if args.agents.is_none() {
            args.agents = self.agents.file.map(PathBuf::from);
        }
    }
}

/// Checks the merged settings before anything touches the network
pub fn validate(args: &Args) -> std::result::Result<(), ResolveError> {
    if args.workers() < 1 {
        return Err(ResolveError::config("workers must be at least 1"));
    }

    if args.timeout() < 1 {
        return Err(ResolveError::config("timeout must be at least 1 second"));
    }

    if args.format() != "plain" && args.format() != "json" {
        return Err(ResolveError::config(format!(
            "unknown report format '{}', expected plain or json",
            args.format()
        )));
    }

    Ok(())
}

/// ~/.config/handlex (or %AppData%\handlex), created when missing
fn config_dir() -> Option<PathBuf> {
    #[cfg(windows)]
    let base = env::var_os("APPDATA").map(PathBuf::from);

    #[cfg(not(windows))]
    let base = home_dir().map(|home| home.join(".config"));

    let dir = base?.join("handlex");
    if !dir.exists() && fs::create_dir_all(&dir).is_err() {
        return None;
    }

    Some(dir)
}

/// Helper function to get the home directory
#[cfg(not(windows))]
fn home_dir() -> Option<PathBuf> {
    env::var_os("HOME").map(PathBuf::from)
}
