use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::filter::{self, FilterSet, SignatureFilter, SignatureSpec};
use crate::FilterError;

/// Environment variable naming the config file when `-c` is not given.
pub const CONFIG_ENV: &str = "EOS_FILTER_TRACE_CONFIG";

/// Filter selection, as read from a JSON config file.
///
/// ```json
/// {
///   "filters": ["zmq"],
///   "signatures": [
///     { "name": "timer", "required": ["^TimerLoop$"], "allowed": ["^nanosleep$"] }
///   ]
/// }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Built-in filters to enable, by name.
    #[serde(default)]
    pub filters: Vec<String>,
    #[serde(default)]
    pub signatures: Vec<SignatureSpec>,
}

impl Config {
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).context("invalid filter config")
    }

    /// Build the filters this config selects: built-ins first, then
    /// signatures in file order.
    pub fn build_filters(&self) -> Result<FilterSet, FilterError> {
        let mut set = FilterSet::new();
        self.add_to(&mut set)?;
        Ok(set)
    }

    pub fn add_to(&self, set: &mut FilterSet) -> Result<(), FilterError> {
        for name in &self.filters {
            set.push(filter::builtin(name)?);
        }
        for spec in &self.signatures {
            set.push(Box::new(SignatureFilter::new(spec)?));
        }
        Ok(())
    }
}

/// Load the config from `path`, or from the file named by
/// [`CONFIG_ENV`] when no path is given. Without either, the config is empty.
pub fn load_config(path: Option<&Path>) -> Result<Config> {
    let path = match path {
        Some(path) => path.to_path_buf(),
        None => match env::var_os(CONFIG_ENV) {
            Some(path) => PathBuf::from(path),
            None => return Ok(Config::default()),
        },
    };

    log::debug!("loading filter config from {}", path.display());
    let contents = fs::read_to_string(&path)
        .with_context(|| format!("failed to read config file {}", path.display()))?;
    Config::from_json(&contents).with_context(|| format!("in config file {}", path.display()))
}
