use super::structs::{Config, DEFAULT_LOG_LEVEL};

use serde::Deserialize;
use std::{
    collections::HashMap,
    fmt::{self, Display},
    path::{Path, PathBuf},
    str::FromStr,
};

impl Config {
    /// Built-in defaults for a given store name.
    pub fn for_store(store_name: &str, tmp_dir: PathBuf) -> Config {
        Config {
            log_level: DEFAULT_LOG_LEVEL,
            store_name: store_name.to_string(),
            conf_dir: default_conf_dir(store_name),
            tmp_dir,
            config_file: None,
            sources: HashMap::new(),
        }
    }

    pub fn source(&self, key: &str) -> &str {
        self.sources.get(key).map(String::as_str).unwrap_or("default")
    }
}

fn default_conf_dir(store_name: &str) -> PathBuf {
    Path::new("/").join(store_name).join("etc/nix")
}

impl Display for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "log_level={} ({})",
            self.log_level,
            self.source("log_level")
        )?;
        writeln!(
            f,
            "store_name={} ({})",
            self.store_name,
            self.source("store_name")
        )?;
        writeln!(
            f,
            "conf_dir={} ({})",
            self.conf_dir.display(),
            self.source("conf_dir")
        )?;
        writeln!(
            f,
            "tmp_dir={} ({})",
            self.tmp_dir.display(),
            self.source("tmp_dir")
        )?;
        match &self.config_file {
            Some(path) => write!(f, "config_file={}", path.display()),
            None => write!(f, "config_file="),
        }
    }
}

pub(crate) fn deserialize_level_filter<'de, D>(
    deserializer: D,
) -> Result<Option<log::LevelFilter>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s: Option<String> = Option::deserialize(deserializer)?;
    s.map_or(Ok(None), |s| {
        log::LevelFilter::from_str(&s)
            .map(Some)
            .map_err(serde::de::Error::custom)
    })
}
