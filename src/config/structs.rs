use super::impls::deserialize_level_filter;
use serde::Deserialize;
use std::{collections::HashMap, path::PathBuf};

pub const DEFAULT_STORE_NAME: &str = "nix";
pub const DEFAULT_LOG_LEVEL: log::LevelFilter = log::LevelFilter::Warn;

/// One layer of configuration, as read from a config file.
#[derive(Deserialize, Default, Clone, Debug, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct PartialConfig {
    #[serde(deserialize_with = "deserialize_level_filter", default)]
    pub log_level: Option<log::LevelFilter>,
    pub store_name: Option<String>,
    pub conf_dir: Option<PathBuf>,
    pub tmp_dir: Option<PathBuf>,
}

#[derive(Clone, Debug)]
pub struct Config {
    pub log_level: log::LevelFilter,
    /// Top-level directory name that is substituted, never mirrored.
    pub store_name: String,
    /// Exported to the command as NIX_CONF_DIR.
    pub conf_dir: PathBuf,
    /// Where the sandbox root is created.
    pub tmp_dir: PathBuf,
    pub config_file: Option<PathBuf>,
    /// Which layer each resolved key came from.
    pub sources: HashMap<String, String>,
}
