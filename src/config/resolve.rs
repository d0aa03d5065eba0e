use super::PartialConfig;
use super::cli::Args;
use crate::config::{Config, DEFAULT_STORE_NAME};
use crate::util::resolve_uid_gid_home;
use anyhow::{Context, Result, anyhow};
use log::trace;
use std::collections::HashMap;
use std::path::{Component, Path, PathBuf};
use std::str::FromStr;

pub const ENV_CONFIG: &str = "STORE_CHROOT_CONFIG";
pub const ENV_LOG_LEVEL: &str = "STORE_CHROOT_LOG_LEVEL";
pub const ENV_STORE_NAME: &str = "STORE_CHROOT_STORE_NAME";
pub const ENV_CONF_DIR: &str = "STORE_CHROOT_CONF_DIR";
pub const ENV_TMP_DIR: &str = "STORE_CHROOT_TMP_DIR";

/**
 * Layers defaults, the config file, environment variables and command line
 * flags, in increasing order of precedence.
 */
pub fn resolve_config(cli: Args) -> Result<Config> {
    let uid_gid_home = resolve_uid_gid_home()?;
    resolve_config_with(
        cli,
        &|key: &str| std::env::var(key).ok().filter(|v| !v.is_empty()),
        uid_gid_home.home.as_deref(),
    )
}

pub fn resolve_config_with(
    cli: Args,
    env: &dyn Fn(&str) -> Option<String>,
    home: Option<&Path>,
) -> Result<Config> {
    let config_file = if cli.no_config {
        None
    } else if let Some(path) = cli.config.clone() {
        Some(required_config_file(path)?)
    } else if let Some(path) = env(ENV_CONFIG) {
        Some(required_config_file(PathBuf::from(path))?)
    } else {
        find_config_file(env, home)
    };

    let (mut partial_config, mut sources) = match &config_file {
        Some(path) => load_partial(path)?,
        None => {
            trace!("No config file found, using default config");
            (PartialConfig::default(), HashMap::new())
        }
    };

    // Override with environment variables if set
    if let Some(log_level) = env(ENV_LOG_LEVEL) {
        if let Ok(log_level) = log::LevelFilter::from_str(&log_level) {
            partial_config.log_level = Some(log_level);
            sources.insert("log_level".into(), "environment".into());
        } else {
            return Err(anyhow!("Invalid log level: {}", log_level));
        }
    }
    if let Some(store_name) = env(ENV_STORE_NAME) {
        partial_config.store_name = Some(store_name);
        sources.insert("store_name".into(), "environment".into());
    }
    if let Some(conf_dir) = env(ENV_CONF_DIR) {
        partial_config.conf_dir = Some(PathBuf::from(conf_dir));
        sources.insert("conf_dir".into(), "environment".into());
    }
    if let Some(tmp_dir) = env(ENV_TMP_DIR) {
        partial_config.tmp_dir = Some(PathBuf::from(tmp_dir));
        sources.insert("tmp_dir".into(), "environment".into());
    }

    // Override with CLI args if provided (highest precedence)
    merge_configs(
        &mut partial_config,
        &mut sources,
        PartialConfig {
            log_level: cli.log_level,
            store_name: cli.store_name,
            conf_dir: cli.conf_dir,
            tmp_dir: cli.tmp_dir,
        },
        "cli",
    );

    // If nothing else, fill in with some default values
    let store_name = partial_config
        .store_name
        .unwrap_or(DEFAULT_STORE_NAME.to_string());
    let tmp_dir = std::path::absolute(
        partial_config.tmp_dir.unwrap_or_else(std::env::temp_dir),
    )
    .context("Failed to resolve tmp_dir")?;

    let mut config = Config::for_store(&store_name, tmp_dir);
    if let Some(log_level) = partial_config.log_level {
        config.log_level = log_level;
    }
    if let Some(conf_dir) = partial_config.conf_dir {
        config.conf_dir = conf_dir;
    }
    config.config_file = config_file;
    config.sources = sources;

    validate_config(&config)?;

    Ok(config)
}

fn required_config_file(path: PathBuf) -> Result<PathBuf> {
    if !path.is_file() {
        return Err(anyhow!("Config file {} does not exist", path.display()));
    }
    Ok(path)
}

/** $XDG_CONFIG_HOME/store-chroot/config.toml, falling back to ~/.config */
fn find_config_file(
    env: &dyn Fn(&str) -> Option<String>,
    home: Option<&Path>,
) -> Option<PathBuf> {
    let config_home = env("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .filter(|p| p.is_absolute())
        .or_else(|| home.map(|home| home.join(".config")))?;

    let path = config_home.join("store-chroot").join("config.toml");
    path.is_file().then_some(path)
}

pub fn load_partial(
    path: &Path,
) -> Result<(PartialConfig, HashMap<String, String>)> {
    let config_str = std::fs::read_to_string(path)
        .context(format!("Failed to read config file {}", path.display()))?;

    let config: PartialConfig = toml::from_str(&config_str)
        .context(format!("Failed to parse config file {}", path.display()))?;

    let mut merged_config = PartialConfig::default();
    let mut sources = HashMap::new();
    merge_configs(
        &mut merged_config,
        &mut sources,
        config,
        &path.to_string_lossy(),
    );
    trace!("Loaded config file: {}", path.display());

    Ok((merged_config, sources))
}

fn merge_configs(
    base: &mut PartialConfig,
    sources: &mut HashMap<String, String>,
    override_config: PartialConfig,
    source: &str,
) {
    if let Some(log_level) = override_config.log_level {
        base.log_level = Some(log_level);
        sources.insert("log_level".into(), source.into());
    }
    if let Some(store_name) = override_config.store_name {
        base.store_name = Some(store_name);
        sources.insert("store_name".into(), source.into());
    }
    if let Some(conf_dir) = override_config.conf_dir {
        base.conf_dir = Some(conf_dir);
        sources.insert("conf_dir".into(), source.into());
    }
    if let Some(tmp_dir) = override_config.tmp_dir {
        base.tmp_dir = Some(tmp_dir);
        sources.insert("tmp_dir".into(), source.into());
    }
}

fn validate_config(config: &Config) -> Result<()> {
    let mut components = Path::new(&config.store_name).components();
    let single_component = matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    );
    if !single_component || config.store_name.contains('/') {
        return Err(anyhow!(
            "Invalid store name: '{}', must be a single directory name",
            config.store_name
        ));
    }

    if !config.conf_dir.is_absolute() {
        return Err(anyhow!(
            "conf_dir must be an absolute path: {}",
            config.conf_dir.display()
        ));
    }

    Ok(())
}
