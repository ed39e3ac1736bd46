//! Configuration for the inspect tool.
//!
//! Values are layered, later layers winning:
//!
//! 1. built-in defaults
//! 2. an optional TOML file (`--config path`)
//! 3. environment variables
//! 4. command line flags (applied by `main`)
//!
//! Environment variables:
//!
//! - `INSPECT_DIALECT` (default: "v2")
//! - `INSPECT_LOG`     (default: "warn"; `RUST_LOG` still wins if set)
//! - `INSPECT_PRETTY`  (default: "true")

use std::env;
use std::fs;
use std::path::Path;
use std::str::FromStr;

use anyhow::{anyhow, Context, Result};
use codec_protocol::Dialect;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Descriptor dialect, "v1" or "v2".
    pub dialect: String,

    /// Default log filter directive.
    pub log: String,

    /// Pretty-print JSON output.
    pub pretty: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            dialect: "v2".to_string(),
            log: "warn".to_string(),
            pretty: true,
        }
    }
}

impl Config {
    /// Defaults, then `path` if given, then the process environment.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => {
                let text = fs::read_to_string(path)
                    .with_context(|| format!("reading config {}", path.display()))?;
                Self::from_toml(&text)?
            }
            None => Self::default(),
        };
        config.apply_overrides(|key| env::var(key).ok())?;
        Ok(config)
    }

    pub fn from_toml(text: &str) -> Result<Self> {
        let config: Config = toml::from_str(text).context("invalid config file")?;
        config.dialect()?;
        Ok(config)
    }

    /// Apply `INSPECT_*` overrides from `lookup` (the environment, or a map
    /// in tests).
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(dialect) = lookup("INSPECT_DIALECT") {
            self.dialect = dialect;
            self.dialect()?;
        }
        if let Some(log) = lookup("INSPECT_LOG") {
            self.log = log;
        }
        self.pretty = read_or("INSPECT_PRETTY", self.pretty, &lookup)?;
        Ok(())
    }

    pub fn dialect(&self) -> Result<Dialect> {
        self.dialect.parse::<Dialect>().map_err(|e| anyhow!(e))
    }
}

fn read_or<T, F>(key: &str, current: T, lookup: &F) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(val) => val
            .trim()
            .parse::<T>()
            .with_context(|| format!("invalid value for {}: {:?}", key, val)),
        None => Ok(current),
    }
}
